//! Route path templates.
//!
//! A template is a path with parameter tokens:
//!
//! - `{id}` required parameter
//! - `{slug?}` optional parameter
//! - `{id<\d+>}` parameter constrained by a regular expression
//! - `(/{page})` optional group, every parameter inside it is optional
//!
//! [`parse`] lists the parameters in declaration order and [`plain`] renders the literal
//! form used as a key of the document's `paths` section (`/users/{id}/{slug}`).

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::iter::Peekable;
use std::str::Chars;

/// A parameter token of a path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathToken {
    pub name: String,
    /// Constraint expression between `<` and `>`
    pub pattern: Option<String>,
    pub optional: bool,
}

/// Parses the parameter tokens of a template, in declaration order.
pub fn parse(path: &str) -> Result<Vec<PathToken>> {
    scan(path).map(|(_, tokens)| tokens)
}

/// Renders the template without constraints, optional markers and groups.
pub fn plain(path: &str) -> Result<String> {
    scan(path).map(|(plain, _)| plain)
}

fn scan(path: &str) -> Result<(String, Vec<PathToken>)> {
    let fail = |message: &str| Error::PathTemplate {
        path: path.to_string(),
        message: message.to_string(),
    };

    let mut plain = String::with_capacity(path.len());
    let mut tokens: Vec<PathToken> = Vec::new();
    let mut seen = HashSet::new();
    let mut group_depth = 0usize;
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '(' => group_depth += 1,
            ')' => {
                group_depth = group_depth
                    .checked_sub(1)
                    .ok_or_else(|| fail("unbalanced `)`"))?;
            }
            '{' => {
                let mut token = read_token(&mut chars).map_err(|message| fail(&message))?;
                token.optional |= group_depth > 0;
                if !seen.insert(token.name.clone()) {
                    return Err(fail(&format!("parameter `{}` is declared twice", token.name)));
                }
                plain.push('{');
                plain.push_str(&token.name);
                plain.push('}');
                tokens.push(token);
            }
            '}' => return Err(fail("unexpected `}`")),
            _ => plain.push(c),
        }
    }

    if group_depth > 0 {
        return Err(fail("unclosed `(`"));
    }

    Ok((plain, tokens))
}

/// Reads a token after its opening brace, consuming the closing one.
fn read_token(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<PathToken, String> {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '_' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    if name.is_empty() {
        return Err("parameter without a name".to_string());
    }

    let mut pattern = None;
    if chars.peek() == Some(&'<') {
        chars.next();
        let mut depth = 1;
        let mut expression = String::new();
        loop {
            match chars.next() {
                Some('<') => {
                    depth += 1;
                    expression.push('<');
                }
                Some('>') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    expression.push('>');
                }
                Some(c) => expression.push(c),
                None => return Err(format!("unterminated pattern of `{}`", name)),
            }
        }
        pattern = Some(expression);
    }

    let optional = chars.peek() == Some(&'?');
    if optional {
        chars.next();
    }

    match chars.next() {
        Some('}') => Ok(PathToken {
            name,
            pattern,
            optional,
        }),
        _ => Err(format!("parameter `{}` is not closed", name)),
    }
}

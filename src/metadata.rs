//! Attribute argument grammar.
//!
//! `#[route(...)]`, `#[operation(...)]` and `#[component(...)]` all carry `key = value`
//! entries. Values are literals, `[...]` sequences, `{ key = value }` mappings, type paths
//! (kept as the last path segment) or `reference(category, Type)` placeholders:
//!
//! ```text
//! #[operation(
//!     summary = "Create a user",
//!     tags = ["users"],
//!     requestBody = { "$ref" = reference(requestBodies, CreateUser) },
//!     responses = { 201 = { description = "Created" } },
//! )]
//! ```

use crate::document::{Mapping, Node, Reference};
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{braced, bracketed, parenthesized, token, Attribute, Ident, LitBool, LitFloat, LitInt, LitStr, Meta, Token};

/// Parsed `key = value` entries of an attribute
#[derive(Debug, Clone, Default)]
pub struct Entries(pub Mapping);

/// Parsed arguments of `#[component(category, key = value, ...)]`
#[derive(Debug, Clone)]
pub struct ComponentArgs {
    pub category: String,
    pub definition: Mapping,
}

/// Returns true if the attribute's last path segment is `name`.
pub fn is_attribute(attr: &Attribute, name: &str) -> bool {
    attr.path()
        .segments
        .last()
        .map(|segment| segment.ident == name)
        .unwrap_or(false)
}

/// Parses the entries of an attribute. A bare `#[name]` has no entries.
pub fn parse_entries(attr: &Attribute) -> syn::Result<Mapping> {
    match &attr.meta {
        Meta::Path(_) => Ok(Mapping::new()),
        Meta::List(_) => attr.parse_args::<Entries>().map(|entries| entries.0),
        Meta::NameValue(meta) => Err(syn::Error::new_spanned(
            meta,
            "expected a parenthesized list of `key = value` entries",
        )),
    }
}

impl Parse for Entries {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut map = Mapping::new();
        while !input.is_empty() {
            let key = parse_key(input)?;
            input.parse::<Token![=]>()?;
            let value = parse_value(input)?;
            if map.insert(key.clone(), value).is_some() {
                return Err(input.error(format!("duplicate key `{}`", key)));
            }
            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }
        Ok(Entries(map))
    }
}

impl Parse for ComponentArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let category = parse_name(input)?;
        let definition = if input.is_empty() {
            Mapping::new()
        } else {
            input.parse::<Token![,]>()?;
            input.parse::<Entries>()?.0
        };
        Ok(ComponentArgs {
            category,
            definition,
        })
    }
}

fn parse_key(input: ParseStream) -> syn::Result<String> {
    if input.peek(LitStr) {
        Ok(input.parse::<LitStr>()?.value())
    } else if input.peek(LitInt) {
        Ok(input.parse::<LitInt>()?.base10_digits().to_string())
    } else if input.peek(Ident::peek_any) {
        Ok(Ident::parse_any(input)?.unraw().to_string())
    } else {
        Err(input.error("expected a key"))
    }
}

/// An identifier or a string literal.
fn parse_name(input: ParseStream) -> syn::Result<String> {
    if input.peek(LitStr) {
        Ok(input.parse::<LitStr>()?.value())
    } else {
        Ok(Ident::parse_any(input)?.unraw().to_string())
    }
}

fn parse_value(input: ParseStream) -> syn::Result<Node> {
    if input.peek(token::Bracket) {
        let content;
        bracketed!(content in input);
        let items = Punctuated::<Value, Token![,]>::parse_terminated(&content)?;
        return Ok(Node::Sequence(items.into_iter().map(|value| value.0).collect()));
    }
    if input.peek(token::Brace) {
        let content;
        braced!(content in input);
        return Ok(Node::Mapping(content.parse::<Entries>()?.0));
    }
    if input.peek(LitStr) {
        return Ok(Node::String(input.parse::<LitStr>()?.value()));
    }
    if input.peek(LitBool) {
        return Ok(Node::Bool(input.parse::<LitBool>()?.value));
    }
    if input.peek(Token![-]) || input.peek(LitInt) || input.peek(LitFloat) {
        return parse_number(input);
    }
    if input.peek(Ident::peek_any) || input.peek(Token![::]) {
        return parse_path_value(input);
    }
    Err(input.error("expected a literal, `[...]`, `{...}`, a type path or `reference(...)`"))
}

fn parse_number(input: ParseStream) -> syn::Result<Node> {
    let negative = input.parse::<Option<Token![-]>>()?.is_some();
    if input.peek(LitInt) {
        let literal = input.parse::<LitInt>()?;
        let value: i64 = literal.base10_parse()?;
        Ok(Node::Integer(if negative { -value } else { value }))
    } else {
        let literal = input.parse::<LitFloat>()?;
        let value: f64 = literal.base10_parse()?;
        Ok(Node::Float(if negative { -value } else { value }))
    }
}

fn parse_path_value(input: ParseStream) -> syn::Result<Node> {
    let path = input.call(syn::Path::parse_mod_style)?;

    if input.peek(token::Paren) {
        if !path.is_ident("reference") {
            return Err(syn::Error::new_spanned(&path, "only `reference(...)` may be called"));
        }
        let content;
        parenthesized!(content in input);
        let category = parse_name(&content)?;
        content.parse::<Token![,]>()?;
        let target = content.call(syn::Path::parse_mod_style)?;
        content.parse::<Option<Token![,]>>()?;
        if !content.is_empty() {
            return Err(content.error("expected `reference(category, Type)`"));
        }
        return Ok(Node::Reference(Reference::new(category, last_segment(&target))));
    }

    if path.is_ident("null") {
        return Ok(Node::Null);
    }
    Ok(Node::String(last_segment(&path)))
}

fn last_segment(path: &syn::Path) -> String {
    path.segments
        .last()
        .map(|segment| segment.ident.unraw().to_string())
        .unwrap_or_default()
}

/// A single value, for use with `Punctuated`
struct Value(Node);

impl Parse for Value {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        parse_value(input).map(Value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use syn::parse_quote;

    fn entries(attr: Attribute) -> Mapping {
        parse_entries(&attr).unwrap()
    }

    #[test]
    fn test_scalars_and_keyword_keys() {
        let map = entries(parse_quote! {
            #[schema(type = "object", minimum = -3, ratio = 0.5, nullable = false, default = null)]
        });

        assert_eq!(map["type"], Node::from("object"));
        assert_eq!(map["minimum"], Node::Integer(-3));
        assert_eq!(map["ratio"], Node::Float(0.5));
        assert_eq!(map["nullable"], Node::Bool(false));
        assert_eq!(map["default"], Node::Null);
    }

    #[test]
    fn test_nested_collections_and_quoted_keys() {
        let map = entries(parse_quote! {
            #[operation(
                tags = ["users", "admin",],
                responses = { 200 = { description = "OK" }, "default" = {} },
            )]
        });

        let tags = map["tags"].as_sequence().unwrap();
        assert_eq!(tags, &[Node::from("users"), Node::from("admin")]);
        let responses = map["responses"].as_mapping().unwrap();
        assert_eq!(responses.keys().collect::<Vec<_>>(), vec!["200", "default"]);
        assert_eq!(
            map["responses"].get_path(&["200", "description"]),
            Some(&Node::from("OK"))
        );
    }

    #[test]
    fn test_type_paths_keep_last_segment() {
        let map = entries(parse_quote! {
            #[route(middlewares = [crate::auth::Authenticate, RateLimit])]
        });

        assert_eq!(
            map["middlewares"],
            Node::Sequence(vec!["Authenticate".into(), "RateLimit".into()])
        );
    }

    #[test]
    fn test_reference_placeholder() {
        let map = entries(parse_quote! {
            #[operation(schema = { "$ref" = reference(schemas, models::User) })]
        });

        assert_eq!(
            map["schema"].get("$ref"),
            Some(&Node::Reference(Reference::new("schemas", "User")))
        );
    }

    #[test]
    fn test_bare_attribute_has_no_entries() {
        assert!(entries(parse_quote!(#[route])).is_empty());
    }

    #[test]
    fn test_invalid_entries() {
        let duplicate: Attribute = parse_quote!(#[route(name = "a", name = "b")]);
        assert!(parse_entries(&duplicate).unwrap_err().to_string().contains("duplicate key"));

        let call: Attribute = parse_quote!(#[route(name = build("a"))]);
        assert!(parse_entries(&call).is_err());

        let name_value: Attribute = parse_quote!(#[route = "x"]);
        assert!(parse_entries(&name_value).is_err());

        let missing_value: Attribute = parse_quote!(#[route(name)]);
        assert!(parse_entries(&missing_value).is_err());
    }

    #[test]
    fn test_component_arguments() {
        let attr: Attribute = parse_quote! {
            #[component(requestBodies, required = true, content = {})]
        };
        let args = attr.parse_args::<ComponentArgs>().unwrap();

        assert_eq!(args.category, "requestBodies");
        assert_eq!(args.definition["required"], Node::Bool(true));

        let bare: Attribute = parse_quote!(#[component("schemas")]);
        let args = bare.parse_args::<ComponentArgs>().unwrap();
        assert_eq!(args.category, "schemas");
        assert!(args.definition.is_empty());
    }
}

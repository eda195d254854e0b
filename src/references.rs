//! Reference resolution.
//!
//! Operation and component metadata may contain `reference(category, Type)` placeholders.
//! Resolving a tree replaces each one with its `#/components/<category>/<name>` pointer and
//! materializes the referenced definition under `components.<category>.<name>`, expanding
//! every component at most once even when definitions reference each other.

use crate::document::{ComponentKey, Node, Reference};
use crate::error::{Error, Result};
use crate::metadata::ComponentArgs;
use crate::universe::TypeUniverse;
use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::{HashSet, VecDeque};

/// Name of the component attribute
pub const COMPONENT_ATTRIBUTE: &str = "component";

/// Supplies the definitions behind reference placeholders
pub trait DefinitionSource {
    /// The definition `reference` points at, or `None` when nothing declares it.
    fn definition(&self, reference: &Reference) -> Result<Option<Node>>;
}

/// Definitions come from `#[component(category, ...)]` attributes on the locator type.
///
/// A type may declare one component per category.
impl DefinitionSource for TypeUniverse {
    fn definition(&self, reference: &Reference) -> Result<Option<Node>> {
        let Some(declared) = self.get(&reference.locator)? else {
            return Ok(None);
        };

        let mut found = None;
        for attr in declared.attributes(COMPONENT_ATTRIBUTE) {
            let args = attr
                .parse_args::<ComponentArgs>()
                .map_err(|e| Error::validation(&declared.name, e.to_string()))?;
            if args.category != reference.category {
                continue;
            }
            if found.is_some() {
                return Err(Error::validation(
                    &declared.name,
                    format!("more than one `{}` component is declared", args.category),
                ));
            }
            found = Some(Node::Mapping(args.definition));
        }
        Ok(found)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    /// Reserved while the definition is being expanded
    Pending,
    Ready(Node),
}

/// Component definitions by `(category, name)`.
///
/// Append-only: the first registration of a key wins and later ones are ignored.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    slots: IndexMap<ComponentKey, Slot>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every component already present in `document`.
    pub fn from_document(document: &Node) -> Self {
        let mut registry = Self::new();
        if let Some(components) = document.get("components").and_then(Node::as_mapping) {
            for (category, entries) in components {
                for (name, definition) in entries.as_mapping().into_iter().flatten() {
                    registry.fill((category.clone(), name.clone()), definition.clone());
                }
            }
        }
        registry
    }

    /// Whether `key` is registered, finished or not.
    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.slots.contains_key(key)
    }

    /// Reserves `key` with an empty slot. Returns false if it was already registered.
    pub fn reserve(&mut self, key: ComponentKey) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.slots.insert(key, Slot::Pending);
        true
    }

    /// Stores the definition of `key` unless a finished one is already registered.
    pub fn fill(&mut self, key: ComponentKey, definition: Node) {
        match self.slots.get_mut(&key) {
            Some(Slot::Ready(_)) => debug!("Component {}/{} is already registered", key.0, key.1),
            Some(slot) => *slot = Slot::Ready(definition),
            None => {
                self.slots.insert(key, Slot::Ready(definition));
            }
        }
    }

    /// The finished definition of `key`.
    pub fn get(&self, key: &ComponentKey) -> Option<&Node> {
        match self.slots.get(key) {
            Some(Slot::Ready(definition)) => Some(definition),
            _ => None,
        }
    }

    /// Finished definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = (&ComponentKey, &Node)> {
        self.slots.iter().filter_map(|(key, slot)| match slot {
            Slot::Ready(definition) => Some((key, definition)),
            Slot::Pending => None,
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Replaces reference placeholders with pointers and materializes their definitions
pub struct ReferenceResolver<'s> {
    source: &'s dyn DefinitionSource,
}

impl<'s> ReferenceResolver<'s> {
    pub fn new(source: &'s dyn DefinitionSource) -> Self {
        Self { source }
    }

    /// Resolves every placeholder in `tree` until none remains.
    ///
    /// Each round collects the placeholders of the tree with their locations, expands the
    /// definitions the registry does not hold yet, substitutes the pointers and writes the
    /// new definitions into `components`. A slot is reserved before its definition is
    /// expanded, so a definition reached again through its own references is not re-entered.
    /// A placeholder without a definition still becomes a pointer, but nothing is registered
    /// for it.
    pub fn resolve(&self, tree: &mut Node, registry: &mut ComponentRegistry) -> Result<()> {
        let mut visited: HashSet<ComponentKey> = HashSet::new();
        let mut round = 0;

        loop {
            let found = tree.references();
            if found.is_empty() {
                break;
            }
            round += 1;
            debug!("Resolution round {}: {} placeholders", round, found.len());

            let mut queue: VecDeque<Reference> = found.iter().map(|(_, r)| r.clone()).collect();
            while let Some(reference) = queue.pop_front() {
                let key = reference.key();
                if registry.contains(&key) || !visited.insert(key.clone()) {
                    continue;
                }

                let Some(mut definition) = self.source.definition(&reference)? else {
                    warn!(
                        "No definition found for {} (declared by `{}`), leaving a dangling pointer",
                        reference.pointer(),
                        reference.locator
                    );
                    continue;
                };

                registry.reserve(key.clone());
                for (location, nested) in definition.references() {
                    if let Some(node) = definition.at_mut(&location) {
                        *node = Node::String(nested.pointer());
                    }
                    queue.push_back(nested);
                }
                debug!("Materialized {}", reference.pointer());
                registry.fill(key, definition);
            }

            for (location, reference) in found {
                if let Some(node) = tree.at_mut(&location) {
                    *node = Node::String(reference.pointer());
                }
            }

            for ((category, name), definition) in registry.definitions() {
                tree.mapping_entry("components")
                    .entry(category.clone())
                    .or_insert_with(Node::mapping)
                    .ensure_mapping()
                    .entry(name.clone())
                    .or_insert_with(|| definition.clone());
            }
        }

        Ok(())
    }
}

//! Namespaces and the flattening rule.

use crate::named_set::{Named, NamedSet};
use crate::name_token;
use crate::ty::TypeDef;

/// A namespace: directly declared types plus nested child namespaces.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamespaceDef {
    pub name: String,
    pub types: NamedSet<TypeDef>,
    pub namespaces: NamedSet<NamespaceDef>,
}

impl NamespaceDef {
    /// Create a namespace with an explicit name.
    pub fn new(name: impl Into<String>) -> Self {
        NamespaceDef {
            name: name.into(),
            types: NamedSet::new(),
            namespaces: NamedSet::new(),
        }
    }

    /// Create a namespace with a random default name.
    pub fn anonymous() -> Self {
        NamespaceDef::new(name_token())
    }

    /// Add a type.
    pub fn with_type(mut self, ty: TypeDef) -> Self {
        self.types.insert(ty);
        self
    }

    /// Add a nested child namespace.
    pub fn with_namespace(mut self, nested: NamespaceDef) -> Self {
        self.namespaces.insert(nested);
        self
    }
}

impl Named for NamespaceDef {
    fn name(&self) -> &str {
        &self.name
    }
}

/// One entry of a flattened namespace tree: the dot-joined path from the
/// top-level ancestor, and the types declared directly at that level.
#[derive(Debug)]
pub struct FlatNamespace<'a> {
    pub name: String,
    pub types: &'a NamedSet<TypeDef>,
}

/// Flatten a namespace tree into (fully-qualified name, type-set) pairs.
///
/// Order-preserving depth-first walk: each namespace is visited exactly
/// once, before its children, and each entry carries only its directly
/// declared types. `A` containing `B` containing `C` yields `A`, `A.B`,
/// `A.B.C`.
pub fn flatten<'a>(namespaces: &'a NamedSet<NamespaceDef>) -> Vec<FlatNamespace<'a>> {
    let mut flat = Vec::new();
    for nsp in namespaces {
        push_flat(None, nsp, &mut flat);
    }
    flat
}

fn push_flat<'a>(prefix: Option<&str>, nsp: &'a NamespaceDef, out: &mut Vec<FlatNamespace<'a>>) {
    let name = match prefix {
        Some(p) => format!("{p}.{}", nsp.name),
        None => nsp.name.clone(),
    };
    out.push(FlatNamespace {
        name: name.clone(),
        types: &nsp.types,
    });
    for child in &nsp.namespaces {
        push_flat(Some(&name), child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flatten_nested() {
        let tree: NamedSet<NamespaceDef> = [NamespaceDef::new("Auto")
            .with_type(TypeDef::class("A"))
            .with_namespace(
                NamespaceDef::new("Space")
                    .with_type(TypeDef::class("B"))
                    .with_namespace(NamespaceDef::new("Deep").with_type(TypeDef::class("C"))),
            )]
        .into_iter()
        .collect();

        let flat = flatten(&tree);
        let names: Vec<&str> = flat.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Auto", "Auto.Space", "Auto.Space.Deep"]);
        // Each entry carries only its directly declared types.
        assert_eq!(flat[0].types.len(), 1);
        assert!(flat[0].types.get("A").is_some());
        assert!(flat[1].types.get("B").is_some());
        assert!(flat[2].types.get("C").is_some());
    }

    #[test]
    fn test_flatten_preserves_sibling_order() {
        let tree: NamedSet<NamespaceDef> = [
            NamespaceDef::new("Zeta"),
            NamespaceDef::new("Alpha").with_namespace(NamespaceDef::new("Inner")),
        ]
        .into_iter()
        .collect();
        let names: Vec<String> = flatten(&tree).into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Alpha", "Alpha.Inner", "Zeta"]);
    }
}

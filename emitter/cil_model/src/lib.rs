//! Assembly model for the cilgen emission engine.
//!
//! This crate contains the canonical object model every backend consumes:
//! - `AssemblyDef` with its manifest, resources, and namespace tree
//! - `NamespaceDef` with nested namespaces and `flatten()`
//! - `TypeDef` / `MemberDef` with closed kind taxonomies
//! - `NamedSet` for ordered-unique-by-name child collections
//! - Pure derivation helpers for effective values of unset fields
//!
//! # Design Philosophy
//!
//! - **Closed taxonomies**: `TypeKind` and `MemberKind` are sum types with
//!   exhaustive matching, so an out-of-range kind cannot exist at runtime.
//! - **Ordinal ordering everywhere**: sibling names are unique and iterate in
//!   byte-wise string order. This ordering is load-bearing — it decides
//!   emission order, so it must be identical for every backend.
//! - **Derivation is backend-independent**: effective file names, versions,
//!   GUIDs, framework labels, and copyright strings are computed here, once,
//!   and nowhere else.

mod assembly;
mod manifest;
mod member;
mod named_set;
mod namespace;
mod resource;
mod ty;
mod version;

pub use assembly::AssemblyDef;
pub use manifest::{Architecture, ManifestDef};
pub use member::{MemberDef, MemberKind};
pub use named_set::{Named, NamedSet};
pub use namespace::{FlatNamespace, NamespaceDef};
pub use resource::ResourceDef;
pub use ty::{TypeDef, TypeKind};
pub use version::{Version, VersionError};

/// Generate a random 8-hex-char token, the default for unset entity names.
pub fn name_token() -> String {
    let hex = uuid::Uuid::new_v4().to_string().replace('-', "");
    hex[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_token_shape() {
        let token = name_token();
        assert_eq!(token.len(), 8);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_name_tokens_differ() {
        assert_ne!(name_token(), name_token());
    }
}

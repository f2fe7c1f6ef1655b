//! Built-in demonstration and verification models.

use cil_model::{
    Architecture, AssemblyDef, ManifestDef, MemberDef, MemberKind, NamespaceDef, ResourceDef,
    TypeDef,
};

/// One namespace exercising every type kind.
fn full_kind_namespace(name: &str) -> NamespaceDef {
    NamespaceDef::new(name)
        .with_type(
            TypeDef::r#enum("MyE")
                .with_member(MemberDef::new("Sat", MemberKind::Constant))
                .with_member(MemberDef::new("Wed", MemberKind::Constant))
                .with_member(MemberDef::new("Fri", MemberKind::Constant)),
        )
        .with_type(TypeDef::r#struct("MyS").with_member(MemberDef::new("Tag", MemberKind::Property)))
        .with_type(TypeDef::delegate("MyD"))
        .with_type(
            TypeDef::interface("MyI")
                .with_member(MemberDef::new("Touch", MemberKind::Method))
                .with_member(MemberDef::new("Label", MemberKind::Property))
                .with_member(MemberDef::new("Changed", MemberKind::Event)),
        )
        .with_type(
            TypeDef::class("MyC")
                .with_member(MemberDef::new("Run", MemberKind::Method))
                .with_member(MemberDef::new("Name", MemberKind::Property))
                .with_member(MemberDef::new("Cells", MemberKind::Indexer))
                .with_member(MemberDef::new("Changed", MemberKind::Event))
                .with_member(MemberDef::new("Tag", MemberKind::Constant)),
        )
}

/// The model the `emit` command generates.
pub fn demo_assembly(name: &str) -> AssemblyDef {
    AssemblyDef::new(name).with_namespace(full_kind_namespace("Auto.Space"))
}

/// The model the `compare` command verifies: every kind, a nested namespace
/// tree, and a pinned GUID so all backends stamp identical metadata.
pub fn verification_assembly(name: &str) -> AssemblyDef {
    AssemblyDef::new(name)
        .with_manifest(ManifestDef {
            company: Some("CilGen".to_string()),
            product: Some("CilGen Verification".to_string()),
            guid: Some(uuid::Uuid::new_v4()),
            architecture: Some(Architecture::AnyCpu),
            ..ManifestDef::default()
        })
        .with_resource(ResourceDef::new("Auto.Strings", Some(16)))
        .with_namespace(
            full_kind_namespace("Auto").with_namespace(
                NamespaceDef::new("Space")
                    .with_type(TypeDef::class("Nested"))
                    .with_namespace(NamespaceDef::new("Deep").with_type(TypeDef::class("Deepest"))),
            ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_model_pins_guid() {
        let ass = verification_assembly("V");
        assert!(ass.manifest.guid.is_some());
        let flat = ass.flat_namespaces();
        let names: Vec<&str> = flat.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Auto", "Auto.Space", "Auto.Space.Deep"]);
    }

    #[test]
    fn test_demo_model_covers_every_kind() {
        let ass = demo_assembly("D");
        let flat = ass.flat_namespaces();
        assert_eq!(flat[0].types.len(), 5);
    }
}

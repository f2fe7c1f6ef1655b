//! Dynamic-builder backend.
//!
//! Drives the define-then-complete builder API in `builder`: every type is
//! defined member by member against a `TypeBuilder` handle, completed, and
//! finally saved as a module image.
//!
//! Ordering profile of this strategy (absorbed by the normalizer):
//! - assembly attributes: product, company, configuration, copyright,
//!   description, file version, relaxations, title, trademark, COM
//!   visibility, target framework, runtime compatibility, GUID;
//! - member groups: methods, constants, properties, events, indexers;
//! - accessor records: get/add before set/remove.

mod builder;

pub use builder::{ModuleBuilder, TypeBuilder};

use std::path::PathBuf;

use cil_backend::{attrs, module_kind, EmitError, ModuleBackend, PlatformResolver, TypeResolver};
use cil_image::{
    FieldFlags, ImageField, ImageParam, TypeFlags, TypeRef, TypeSig,
};
use cil_model::{AssemblyDef, FlatNamespace, MemberDef, MemberKind, TypeDef, TypeKind};

/// The builder-driving emission strategy.
pub struct BuilderBackend {
    resolver: Box<dyn TypeResolver>,
    out_dir: PathBuf,
}

impl BuilderBackend {
    /// Create a backend writing into `out_dir`, resolving against the
    /// platform universe.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        BuilderBackend::with_resolver(out_dir, Box::new(PlatformResolver))
    }

    /// Create a backend with an injected resolver.
    pub fn with_resolver(out_dir: impl Into<PathBuf>, resolver: Box<dyn TypeResolver>) -> Self {
        BuilderBackend {
            resolver,
            out_dir: out_dir.into(),
        }
    }

    fn define_module(&self, ass: &AssemblyDef) -> Result<ModuleBuilder, EmitError> {
        let version = ass.parsed_version()?;
        let mut module = ModuleBuilder::new(
            ass.name.clone(),
            version.parts(),
            ass.file_name(),
            module_kind(ass),
        );
        module.set_custom_attribute(attrs::product(ass));
        module.set_custom_attribute(attrs::company(ass));
        module.set_custom_attribute(attrs::configuration(ass));
        module.set_custom_attribute(attrs::copyright(ass));
        module.set_custom_attribute(attrs::description(ass));
        module.set_custom_attribute(attrs::file_version(ass));
        module.set_custom_attribute(attrs::relaxations(ass));
        module.set_custom_attribute(attrs::title(ass));
        module.set_custom_attribute(attrs::trademark(ass));
        module.set_custom_attribute(attrs::com_visible(ass));
        module.set_custom_attribute(attrs::target_framework(ass));
        module.set_custom_attribute(attrs::runtime_compatibility(ass));
        module.set_custom_attribute(attrs::guid(ass));
        module.set_architecture(ass.manifest.architecture.map(|a| a.label().to_string()));
        for res in &ass.resources {
            module.define_resource(res.name.clone(), res.bytes());
        }
        for nsp in ass.flat_namespaces() {
            for ty in nsp.types {
                self.define_type(&mut module, &nsp, ty)?;
            }
        }
        Ok(module)
    }

    fn define_type(
        &self,
        module: &mut ModuleBuilder,
        nsp: &FlatNamespace<'_>,
        ty: &TypeDef,
    ) -> Result<(), EmitError> {
        let completed = match &ty.kind {
            TypeKind::Enum => define_enum(module, nsp, ty)?,
            TypeKind::Struct => define_struct(module, nsp, ty),
            TypeKind::Delegate => define_delegate(module, nsp, ty),
            TypeKind::Interface => define_interface(module, nsp, ty),
            TypeKind::Class { base } => {
                let base_ref = match base.as_deref() {
                    Some(name) => TypeRef::external(self.resolver.resolve(name)?.full_name),
                    None => TypeRef::external("System.Object"),
                };
                let mut flags = TypeFlags::PUBLIC | TypeFlags::BEFORE_FIELD_INIT;
                if ty.is_abstract {
                    flags |= TypeFlags::ABSTRACT;
                }
                let mut bld = module.define_type(&nsp.name, &ty.name, flags, Some(base_ref));
                define_members(&mut bld, ty);
                bld.define_default_constructor();
                bld
            }
        };
        module.complete_type(completed);
        Ok(())
    }
}

impl ModuleBackend for BuilderBackend {
    fn name(&self) -> &'static str {
        "build"
    }

    fn emit(&mut self, assembly: &AssemblyDef) -> Result<PathBuf, EmitError> {
        let module = self.define_module(assembly)?;
        module.save(&self.out_dir, assembly.manifest.entry_point.as_deref())
    }
}

fn members_of_kind<'a>(
    ty: &'a TypeDef,
    kind: MemberKind,
) -> impl Iterator<Item = &'a MemberDef> + 'a {
    ty.members.iter().filter(move |m| m.kind == kind)
}

fn define_enum(
    module: &ModuleBuilder,
    nsp: &FlatNamespace<'_>,
    ty: &TypeDef,
) -> Result<TypeBuilder, EmitError> {
    let mut bld = module.define_type(
        &nsp.name,
        &ty.name,
        TypeFlags::PUBLIC | TypeFlags::SEALED,
        Some(TypeRef::external("System.Enum")),
    );
    bld.define_field(cil_synth::enum_value_field());
    let mut position = 0;
    for member in members_of_kind(ty, MemberKind::Constant) {
        bld.define_literal(&member.name, position)?;
        position += 1;
    }
    Ok(bld)
}

fn define_struct(module: &ModuleBuilder, nsp: &FlatNamespace<'_>, ty: &TypeDef) -> TypeBuilder {
    let mut flags = TypeFlags::PUBLIC
        | TypeFlags::SEQUENTIAL_LAYOUT
        | TypeFlags::SEALED
        | TypeFlags::BEFORE_FIELD_INIT;
    if ty.is_abstract {
        flags |= TypeFlags::ABSTRACT;
    }
    let mut bld = module.define_type(
        &nsp.name,
        &ty.name,
        flags,
        Some(TypeRef::external("System.ValueType")),
    );
    define_members(&mut bld, ty);
    bld
}

fn define_delegate(module: &ModuleBuilder, nsp: &FlatNamespace<'_>, ty: &TypeDef) -> TypeBuilder {
    let mut bld = module.define_type(
        &nsp.name,
        &ty.name,
        TypeFlags::PUBLIC | TypeFlags::SEALED,
        Some(TypeRef::external("System.MulticastDelegate")),
    );
    for member in cil_synth::delegate_members() {
        bld.define_runtime_method(member);
    }
    bld
}

fn define_interface(module: &ModuleBuilder, nsp: &FlatNamespace<'_>, ty: &TypeDef) -> TypeBuilder {
    let mut bld = module.define_type(
        &nsp.name,
        &ty.name,
        TypeFlags::PUBLIC | TypeFlags::INTERFACE | TypeFlags::ABSTRACT,
        None,
    );
    define_members(&mut bld, ty);
    bld
}

/// Member definition in this strategy's group order: methods, constants,
/// properties, events, indexers. Constructor, Field, and Operator kinds
/// have no emission shape in any backend.
fn define_members(bld: &mut TypeBuilder, ty: &TypeDef) {
    let abstract_owner = ty.is_abstract_owner();
    for member in members_of_kind(ty, MemberKind::Method) {
        let method = bld.define_method(
            &member.name,
            cil_synth::method_flags(abstract_owner),
            TypeSig::Void,
            Vec::new(),
        );
        if !abstract_owner {
            bld.set_body(method, cil_synth::empty_body());
        }
    }
    if !abstract_owner {
        for member in members_of_kind(ty, MemberKind::Constant) {
            bld.define_field(ImageField {
                name: member.name.clone(),
                flags: FieldFlags::PUBLIC,
                sig: TypeSig::Object,
                literal: None,
            });
        }
    }
    for member in members_of_kind(ty, MemberKind::Property) {
        define_property(bld, member, abstract_owner);
    }
    for member in members_of_kind(ty, MemberKind::Event) {
        define_event(bld, member, abstract_owner);
    }
    for member in members_of_kind(ty, MemberKind::Indexer) {
        define_indexer(bld, member, abstract_owner);
    }
    for member in &ty.members {
        match member.kind {
            MemberKind::Method
            | MemberKind::Event
            | MemberKind::Property
            | MemberKind::Indexer
            | MemberKind::Constant => {}
            // No shape for these kinds; carried in the taxonomy only.
            MemberKind::Constructor | MemberKind::Field | MemberKind::Operator => {
                tracing::debug!(member = %member.name, kind = member.kind.label(), "skipping shapeless member kind");
            }
        }
    }
}

fn define_property(bld: &mut TypeBuilder, member: &MemberDef, abstract_owner: bool) {
    let flags = cil_synth::accessor_flags(abstract_owner);
    let get = bld.define_method(&format!("get_{}", member.name), flags, TypeSig::String, Vec::new());
    let set = bld.define_method(
        &format!("set_{}", member.name),
        flags,
        TypeSig::Void,
        vec![ImageParam::new("value", TypeSig::String)],
    );
    if !abstract_owner {
        let field = bld.define_field(cil_synth::property_backing_field(&member.name));
        bld.set_body(get, cil_synth::property_getter_body(field));
        bld.set_body(set, cil_synth::property_setter_body(field));
    }
    bld.define_property(&member.name, TypeSig::String, Vec::new(), get, set);
}

fn define_indexer(bld: &mut TypeBuilder, member: &MemberDef, abstract_owner: bool) {
    let flags = cil_synth::accessor_flags(abstract_owner);
    let index_param = ImageParam::new("index", TypeSig::Int32);
    let get = bld.define_method(
        &format!("get_{}", member.name),
        flags,
        TypeSig::String,
        vec![index_param.clone()],
    );
    let set = bld.define_method(
        &format!("set_{}", member.name),
        flags,
        TypeSig::Void,
        vec![index_param.clone(), ImageParam::new("value", TypeSig::String)],
    );
    if !abstract_owner {
        let field = bld.define_field(cil_synth::indexer_backing_field());
        bld.set_body(get, cil_synth::indexer_getter_body(field));
        bld.set_body(set, cil_synth::indexer_setter_body(field));
    }
    bld.define_property(&member.name, TypeSig::String, vec![index_param], get, set);
}

fn define_event(bld: &mut TypeBuilder, member: &MemberDef, abstract_owner: bool) {
    let flags = cil_synth::accessor_flags(abstract_owner);
    let value_param = ImageParam::new("value", TypeSig::Handler);
    let add = bld.define_method(
        &format!("add_{}", member.name),
        flags,
        TypeSig::Void,
        vec![value_param.clone()],
    );
    let remove = bld.define_method(
        &format!("remove_{}", member.name),
        flags,
        TypeSig::Void,
        vec![value_param],
    );
    if !abstract_owner {
        let field = bld.define_field(cil_synth::event_backing_field(&member.name));
        bld.set_body(add, cil_synth::event_adder_body(field));
        bld.set_body(remove, cil_synth::event_remover_body(field));
    }
    bld.define_event(&member.name, TypeSig::Handler, add, remove);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cil_image::{AccessorKind, MethodBody};
    use cil_model::{ManifestDef, NamespaceDef};
    use pretty_assertions::assert_eq;

    fn build_probe(ty: TypeDef) -> cil_image::ModuleImage {
        let dir = tempfile::tempdir().unwrap();
        let ass = AssemblyDef::new("Probe")
            .with_manifest(ManifestDef {
                guid: Some(uuid::Uuid::new_v4()),
                ..ManifestDef::default()
            })
            .with_namespace(NamespaceDef::new("N").with_type(ty));
        let mut backend = BuilderBackend::new(dir.path());
        let path = backend.emit(&ass).unwrap();
        cil_image::read_image(&path).unwrap()
    }

    #[test]
    fn test_property_records_get_before_set() {
        let ty = TypeDef::class("MyC").with_member(MemberDef::new("P", MemberKind::Property));
        let image = build_probe(ty);
        let prop = &image.types[0].properties[0];
        assert_eq!(prop.accessors[0].kind, AccessorKind::Get);
        assert_eq!(prop.accessors[1].kind, AccessorKind::Set);
    }

    #[test]
    fn test_event_bodies_share_backing_field() {
        let ty = TypeDef::class("MyC").with_member(MemberDef::new("E", MemberKind::Event));
        let image = build_probe(ty);
        let row = &image.types[0];
        let field = row
            .fields
            .iter()
            .position(|f| f.name == "E")
            .unwrap() as u16;
        for name in ["add_E", "remove_E"] {
            let method = row.methods.iter().find(|m| m.name == name).unwrap();
            let MethodBody::Il { ops, .. } = &method.body else {
                panic!("{name} must have an il body");
            };
            assert!(ops.contains(&cil_image::Op::LdFldA(field)));
        }
    }

    #[test]
    fn test_struct_is_sealed_sequential_value_type() {
        let ty = TypeDef::r#struct("MyS");
        let image = build_probe(ty);
        let row = &image.types[0];
        assert!(row
            .flags
            .contains(TypeFlags::SEALED | TypeFlags::SEQUENTIAL_LAYOUT));
        assert_eq!(row.base, Some(TypeRef::external("System.ValueType")));
        assert!(row.methods.is_empty());
    }

    #[test]
    fn test_abstract_class_members_have_no_bodies() {
        let ty = TypeDef::class("MyA")
            .abstract_()
            .with_member(MemberDef::new("P", MemberKind::Property));
        let image = build_probe(ty);
        let row = &image.types[0];
        assert!(row.flags.contains(TypeFlags::ABSTRACT));
        // Only the synthesized constructor carries a body.
        for method in &row.methods {
            if method.name == ".ctor" {
                assert!(matches!(method.body, MethodBody::Il { .. }));
            } else {
                assert_eq!(method.body, MethodBody::Abstract);
            }
        }
        assert!(row.fields.is_empty());
    }
}

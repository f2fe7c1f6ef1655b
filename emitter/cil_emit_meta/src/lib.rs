//! Metadata-writer backend.
//!
//! Builds the module image by direct table construction: type records are
//! assembled field-row by method-row with explicit index bookkeeping, then
//! serialized through a writer session that is released on every exit path.
//!
//! Ordering profile of this strategy (absorbed by the normalizer):
//! - assembly attributes: company, configuration, copyright, description,
//!   file version, product, title, trademark, relaxations, runtime
//!   compatibility, COM visibility, GUID, target framework;
//! - member groups: methods, events, properties, indexers, constants;
//! - accessor records: set/remove before get/add.

mod session;

pub use session::WriterSession;

use std::path::PathBuf;

use cil_backend::{attrs, module_kind, EmitError, ModuleBackend, PlatformResolver, TypeResolver};
use cil_image::{
    AccessorKind, FieldFlags, ImageEvent, ImageMethod, ImageParam, ImageProperty, ImageResource,
    ImageType, MethodBody, ModuleImage, PropertyAccessor, TypeFlags, TypeRef, TypeSig,
};
use cil_model::{AssemblyDef, FlatNamespace, MemberDef, MemberKind, TypeDef, TypeKind};

/// The direct-construction emission strategy.
pub struct MetaBackend {
    resolver: Box<dyn TypeResolver>,
    out_dir: PathBuf,
}

impl MetaBackend {
    /// Create a backend writing into `out_dir`, resolving against the
    /// platform universe.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        MetaBackend::with_resolver(out_dir, Box::new(PlatformResolver))
    }

    /// Create a backend with an injected resolver.
    pub fn with_resolver(out_dir: impl Into<PathBuf>, resolver: Box<dyn TypeResolver>) -> Self {
        MetaBackend {
            resolver,
            out_dir: out_dir.into(),
        }
    }

    fn build_image(&self, ass: &AssemblyDef) -> Result<ModuleImage, EmitError> {
        let version = ass.parsed_version()?;
        let mut image = ModuleImage::new(
            ass.name.clone(),
            version.parts(),
            ass.file_name(),
            module_kind(ass),
        );
        image.architecture = ass.manifest.architecture.map(|a| a.label().to_string());
        image.attributes = vec![
            attrs::company(ass),
            attrs::configuration(ass),
            attrs::copyright(ass),
            attrs::description(ass),
            attrs::file_version(ass),
            attrs::product(ass),
            attrs::title(ass),
            attrs::trademark(ass),
            attrs::relaxations(ass),
            attrs::runtime_compatibility(ass),
            attrs::com_visible(ass),
            attrs::guid(ass),
            attrs::target_framework(ass),
        ];
        image.resources = ass
            .resources
            .iter()
            .map(|r| ImageResource {
                name: r.name.clone(),
                data: r.bytes(),
            })
            .collect();
        for nsp in ass.flat_namespaces() {
            for ty in nsp.types {
                image.types.push(self.emit_type(&nsp, ty)?);
            }
        }
        image.resolve_entry_point(ass.manifest.entry_point.as_deref());
        Ok(image)
    }

    fn emit_type(&self, nsp: &FlatNamespace<'_>, ty: &TypeDef) -> Result<ImageType, EmitError> {
        match &ty.kind {
            TypeKind::Enum => Ok(emit_enum(nsp, ty)),
            TypeKind::Struct => Ok(emit_struct(nsp, ty)),
            TypeKind::Delegate => Ok(emit_delegate(nsp, ty)),
            TypeKind::Interface => Ok(emit_interface(nsp, ty)),
            TypeKind::Class { base } => self.emit_class(nsp, ty, base.as_deref()),
        }
    }

    fn emit_class(
        &self,
        nsp: &FlatNamespace<'_>,
        ty: &TypeDef,
        base: Option<&str>,
    ) -> Result<ImageType, EmitError> {
        let base_ref = match base {
            Some(name) => TypeRef::external(self.resolver.resolve(name)?.full_name),
            None => TypeRef::external("System.Object"),
        };
        let mut flags = TypeFlags::PUBLIC | TypeFlags::BEFORE_FIELD_INIT;
        if ty.is_abstract {
            flags |= TypeFlags::ABSTRACT;
        }
        let mut row = ImageType::new(nsp.name.clone(), ty.name.clone(), flags);
        row.base = Some(base_ref);
        row.push_method(cil_synth::default_constructor());
        add_members(&mut row, ty);
        Ok(row)
    }
}

impl ModuleBackend for MetaBackend {
    fn name(&self) -> &'static str {
        "meta"
    }

    fn emit(&mut self, assembly: &AssemblyDef) -> Result<PathBuf, EmitError> {
        let image = self.build_image(assembly)?;
        let session = WriterSession::open(&self.out_dir, &assembly.file_name())?;
        session.write(&image)
    }
}

fn emit_enum(nsp: &FlatNamespace<'_>, ty: &TypeDef) -> ImageType {
    let mut row = ImageType::new(
        nsp.name.clone(),
        ty.name.clone(),
        TypeFlags::PUBLIC | TypeFlags::SEALED,
    );
    row.base = Some(TypeRef::external("System.Enum"));
    row.push_field(cil_synth::enum_value_field());
    let full = row.full_name();
    let mut position = 0;
    for member in constants(ty) {
        row.push_field(cil_synth::enum_literal(&member.name, &full, position));
        position += 1;
    }
    row
}

fn emit_struct(nsp: &FlatNamespace<'_>, ty: &TypeDef) -> ImageType {
    let mut flags = TypeFlags::PUBLIC
        | TypeFlags::SEQUENTIAL_LAYOUT
        | TypeFlags::SEALED
        | TypeFlags::BEFORE_FIELD_INIT;
    if ty.is_abstract {
        flags |= TypeFlags::ABSTRACT;
    }
    let mut row = ImageType::new(nsp.name.clone(), ty.name.clone(), flags);
    row.base = Some(TypeRef::external("System.ValueType"));
    add_members(&mut row, ty);
    row
}

fn emit_delegate(nsp: &FlatNamespace<'_>, ty: &TypeDef) -> ImageType {
    let mut row = ImageType::new(
        nsp.name.clone(),
        ty.name.clone(),
        TypeFlags::PUBLIC | TypeFlags::SEALED,
    );
    row.base = Some(TypeRef::external("System.MulticastDelegate"));
    for member in cil_synth::delegate_members() {
        row.push_method(member);
    }
    row
}

fn emit_interface(nsp: &FlatNamespace<'_>, ty: &TypeDef) -> ImageType {
    let mut row = ImageType::new(
        nsp.name.clone(),
        ty.name.clone(),
        TypeFlags::PUBLIC | TypeFlags::INTERFACE | TypeFlags::ABSTRACT,
    );
    add_members(&mut row, ty);
    row
}

fn members_of_kind<'a>(
    ty: &'a TypeDef,
    kind: MemberKind,
) -> impl Iterator<Item = &'a MemberDef> + 'a {
    ty.members.iter().filter(move |m| m.kind == kind)
}

fn constants(ty: &TypeDef) -> impl Iterator<Item = &MemberDef> {
    members_of_kind(ty, MemberKind::Constant)
}

/// Member emission in this strategy's group order: methods, events,
/// properties, indexers, constants. Constructor, Field, and Operator kinds
/// have no emission shape in any backend.
fn add_members(row: &mut ImageType, ty: &TypeDef) {
    let abstract_owner = ty.is_abstract_owner();
    for member in members_of_kind(ty, MemberKind::Method) {
        add_method(row, member, abstract_owner);
    }
    for member in members_of_kind(ty, MemberKind::Event) {
        add_event(row, member, abstract_owner);
    }
    for member in members_of_kind(ty, MemberKind::Property) {
        add_property(row, member, abstract_owner);
    }
    for member in members_of_kind(ty, MemberKind::Indexer) {
        add_indexer(row, member, abstract_owner);
    }
    if !abstract_owner {
        for member in constants(ty) {
            row.push_field(cil_image::ImageField {
                name: member.name.clone(),
                flags: FieldFlags::PUBLIC,
                sig: TypeSig::Object,
                literal: None,
            });
        }
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

fn add_method(row: &mut ImageType, member: &MemberDef, abstract_owner: bool) {
    let body = if abstract_owner {
        MethodBody::Abstract
    } else {
        cil_synth::empty_body()
    };
    row.push_method(ImageMethod {
        name: member.name.clone(),
        flags: cil_synth::method_flags(abstract_owner),
        ret: TypeSig::Void,
        params: Vec::new(),
        body,
    });
}

fn add_property(row: &mut ImageType, member: &MemberDef, abstract_owner: bool) {
    let flags = cil_synth::accessor_flags(abstract_owner);
    let (get_body, set_body) = if abstract_owner {
        (MethodBody::Abstract, MethodBody::Abstract)
    } else {
        let field = row.push_field(cil_synth::property_backing_field(&member.name));
        (
            cil_synth::property_getter_body(field),
            cil_synth::property_setter_body(field),
        )
    };
    let set = row.push_method(ImageMethod {
        name: format!("set_{}", member.name),
        flags,
        ret: TypeSig::Void,
        params: vec![ImageParam::new("value", TypeSig::String)],
        body: set_body,
    });
    let get = row.push_method(ImageMethod {
        name: format!("get_{}", member.name),
        flags,
        ret: TypeSig::String,
        params: Vec::new(),
        body: get_body,
    });
    row.properties.push(ImageProperty {
        name: member.name.clone(),
        sig: TypeSig::String,
        params: Vec::new(),
        accessors: vec![
            PropertyAccessor {
                kind: AccessorKind::Set,
                method: set,
            },
            PropertyAccessor {
                kind: AccessorKind::Get,
                method: get,
            },
        ],
    });
}

fn add_indexer(row: &mut ImageType, member: &MemberDef, abstract_owner: bool) {
    let flags = cil_synth::accessor_flags(abstract_owner);
    let (get_body, set_body) = if abstract_owner {
        (MethodBody::Abstract, MethodBody::Abstract)
    } else {
        let field = row.push_field(cil_synth::indexer_backing_field());
        (
            cil_synth::indexer_getter_body(field),
            cil_synth::indexer_setter_body(field),
        )
    };
    let index_param = ImageParam::new("index", TypeSig::Int32);
    let set = row.push_method(ImageMethod {
        name: format!("set_{}", member.name),
        flags,
        ret: TypeSig::Void,
        params: vec![index_param.clone(), ImageParam::new("value", TypeSig::String)],
        body: set_body,
    });
    let get = row.push_method(ImageMethod {
        name: format!("get_{}", member.name),
        flags,
        ret: TypeSig::String,
        params: vec![index_param.clone()],
        body: get_body,
    });
    row.properties.push(ImageProperty {
        name: member.name.clone(),
        sig: TypeSig::String,
        params: vec![index_param],
        accessors: vec![
            PropertyAccessor {
                kind: AccessorKind::Set,
                method: set,
            },
            PropertyAccessor {
                kind: AccessorKind::Get,
                method: get,
            },
        ],
    });
}

fn add_event(row: &mut ImageType, member: &MemberDef, abstract_owner: bool) {
    let flags = cil_synth::accessor_flags(abstract_owner);
    let (add_body, remove_body) = if abstract_owner {
        (MethodBody::Abstract, MethodBody::Abstract)
    } else {
        let field = row.push_field(cil_synth::event_backing_field(&member.name));
        (
            cil_synth::event_adder_body(field),
            cil_synth::event_remover_body(field),
        )
    };
    let value_param = ImageParam::new("value", TypeSig::Handler);
    let remove = row.push_method(ImageMethod {
        name: format!("remove_{}", member.name),
        flags,
        ret: TypeSig::Void,
        params: vec![value_param.clone()],
        body: remove_body,
    });
    let add = row.push_method(ImageMethod {
        name: format!("add_{}", member.name),
        flags,
        ret: TypeSig::Void,
        params: vec![value_param],
        body: add_body,
    });
    row.events.push(ImageEvent {
        name: member.name.clone(),
        handler: TypeSig::Handler,
        accessors: vec![
            PropertyAccessor {
                kind: AccessorKind::Remove,
                method: remove,
            },
            PropertyAccessor {
                kind: AccessorKind::Add,
                method: add,
            },
        ],
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use cil_model::{ManifestDef, NamespaceDef};
    use pretty_assertions::assert_eq;

    fn emit_probe(ty: TypeDef) -> ModuleImage {
        let ass = AssemblyDef::new("Probe")
            .with_manifest(ManifestDef {
                guid: Some(uuid::Uuid::new_v4()),
                ..ManifestDef::default()
            })
            .with_namespace(NamespaceDef::new("N").with_type(ty));
        let backend = MetaBackend::new(".");
        backend.build_image(&ass).unwrap()
    }

    #[test]
    fn test_enum_numbering_is_name_order() {
        let ty = TypeDef::r#enum("Days")
            .with_member(MemberDef::new("Sat", MemberKind::Constant))
            .with_member(MemberDef::new("Wed", MemberKind::Constant))
            .with_member(MemberDef::new("Fri", MemberKind::Constant));
        let image = emit_probe(ty);
        let row = &image.types[0];
        let literals: Vec<(&str, Option<i32>)> = row
            .fields
            .iter()
            .skip(1)
            .map(|f| (f.name.as_str(), f.literal))
            .collect();
        assert_eq!(
            literals,
            vec![("Fri", Some(0)), ("Sat", Some(1)), ("Wed", Some(2))]
        );
        assert_eq!(row.fields[0].name, "value__");
    }

    #[test]
    fn test_delegate_ignores_model_members() {
        let ty = TypeDef::delegate("MyD").with_member(MemberDef::new("M", MemberKind::Method));
        let image = emit_probe(ty);
        let names: Vec<&str> = image.types[0]
            .methods
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec![".ctor", "Invoke", "BeginInvoke", "EndInvoke"]);
    }

    #[test]
    fn test_class_gets_ctor_and_resolved_base() {
        let ty = TypeDef::class_with_base("MyC", "system.uri");
        let image = emit_probe(ty);
        let row = &image.types[0];
        assert_eq!(
            row.base,
            Some(TypeRef::external("System.Uri"))
        );
        assert_eq!(row.methods[0].name, ".ctor");
    }

    #[test]
    fn test_unknown_base_is_resolution_error() {
        let ass = AssemblyDef::new("Probe").with_namespace(
            NamespaceDef::new("N").with_type(TypeDef::class_with_base("MyC", "Contoso.Widget")),
        );
        let backend = MetaBackend::new(".");
        let err = backend.build_image(&ass);
        assert!(matches!(err, Err(EmitError::Resolution { .. })));
    }

    #[test]
    fn test_property_records_set_before_get() {
        let ty = TypeDef::class("MyC").with_member(MemberDef::new("P", MemberKind::Property));
        let image = emit_probe(ty);
        let prop = &image.types[0].properties[0];
        assert_eq!(prop.accessors[0].kind, AccessorKind::Set);
        assert_eq!(prop.accessors[1].kind, AccessorKind::Get);
    }

    #[test]
    fn test_interface_members_are_abstract_without_fields() {
        let ty = TypeDef::interface("MyI")
            .with_member(MemberDef::new("P", MemberKind::Property))
            .with_member(MemberDef::new("E", MemberKind::Event))
            .with_member(MemberDef::new("M", MemberKind::Method));
        let image = emit_probe(ty);
        let row = &image.types[0];
        assert!(row.fields.is_empty());
        assert!(row.methods.iter().all(|m| m.body == MethodBody::Abstract));
    }
}

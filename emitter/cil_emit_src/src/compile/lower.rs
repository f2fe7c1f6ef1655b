//! Lowering parsed declarations to a module image.
//!
//! The compiler synthesizes default implementations itself — auto-property
//! backing fields, map-backed indexers, field-like-event CAS accessors, the
//! delegate quartet, default constructors — exactly the division of labor a
//! platform compiler applies to the same declarations.

use cil_image::{
    AccessorKind, FieldFlags, ImageAttribute, ImageEvent, ImageField, ImageMethod, ImageParam,
    ImageProperty, ImageResource, ImageType, MethodBody, ModuleImage, PropertyAccessor, TypeFlags,
    TypeRef, TypeSig,
};

use super::parse::{MemberDecl, SourceUnit, TypeDecl, TypeDeclKind};
use super::{CompileError, CompileOptions};
use crate::dialect;

/// Lower a parsed unit into a finished image.
pub fn lower(unit: &SourceUnit, options: &CompileOptions) -> Result<ModuleImage, CompileError> {
    let mut version = [1, 0, 0, 0];
    let mut attributes = Vec::new();
    for (short, args) in &unit.attributes {
        if short == "AssemblyVersion" {
            version = parse_version_attr(args)?;
            continue;
        }
        let full = dialect::full_name(short)
            .ok_or_else(|| CompileError::new(0, format!("unknown attribute `{short}`")))?;
        attributes.push(ImageAttribute::new(full, args.clone()));
    }

    let mut image = ModuleImage::new(
        options.assembly_name.clone(),
        version,
        options.file_name.clone(),
        options.kind,
    );
    image.architecture = options.architecture.clone();
    image.attributes = attributes;
    image.resources = options
        .resources
        .iter()
        .map(|(name, data)| ImageResource {
            name: name.clone(),
            data: data.clone(),
        })
        .collect();

    for nsp in &unit.namespaces {
        for ty in &nsp.types {
            image.types.push(lower_type(&nsp.name, ty));
        }
    }
    image.resolve_entry_point(options.entry_point.as_deref());
    Ok(image)
}

fn parse_version_attr(args: &[cil_image::AttrValue]) -> Result<[u16; 4], CompileError> {
    let [cil_image::AttrValue::Str(text)] = args else {
        return Err(CompileError::new(0, "AssemblyVersion takes one string"));
    };
    let mut parts = [0u16; 4];
    for (slot, piece) in parts.iter_mut().zip(text.split('.')) {
        *slot = piece
            .parse::<u16>()
            .map_err(|_| CompileError::new(0, format!("bad version `{text}`")))?;
    }
    Ok(parts)
}

fn lower_type(namespace: &str, decl: &TypeDecl) -> ImageType {
    match &decl.kind {
        TypeDeclKind::Enum { literals } => {
            let mut ty = ImageType::new(
                namespace,
                decl.name.clone(),
                TypeFlags::PUBLIC | TypeFlags::SEALED,
            );
            ty.base = Some(TypeRef::external("System.Enum"));
            ty.push_field(cil_synth::enum_value_field());
            let full = ty.full_name();
            for (position, literal) in literals.iter().enumerate() {
                ty.push_field(cil_synth::enum_literal(literal, &full, position as i32));
            }
            ty
        }
        TypeDeclKind::Delegate => {
            let mut ty = ImageType::new(
                namespace,
                decl.name.clone(),
                TypeFlags::PUBLIC | TypeFlags::SEALED,
            );
            ty.base = Some(TypeRef::external("System.MulticastDelegate"));
            for member in cil_synth::delegate_members() {
                ty.push_method(member);
            }
            ty
        }
        TypeDeclKind::Interface { members } => {
            let mut ty = ImageType::new(
                namespace,
                decl.name.clone(),
                TypeFlags::PUBLIC | TypeFlags::INTERFACE | TypeFlags::ABSTRACT,
            );
            lower_members(&mut ty, members, true);
            ty
        }
        TypeDeclKind::Struct { members } => {
            let mut flags = TypeFlags::PUBLIC
                | TypeFlags::SEQUENTIAL_LAYOUT
                | TypeFlags::SEALED
                | TypeFlags::BEFORE_FIELD_INIT;
            if decl.is_abstract {
                flags |= TypeFlags::ABSTRACT;
            }
            let mut ty = ImageType::new(namespace, decl.name.clone(), flags);
            ty.base = Some(TypeRef::external("System.ValueType"));
            lower_members(&mut ty, members, decl.is_abstract);
            ty
        }
        TypeDeclKind::Class { base, members } => {
            let mut flags = TypeFlags::PUBLIC | TypeFlags::BEFORE_FIELD_INIT;
            if decl.is_abstract {
                flags |= TypeFlags::ABSTRACT;
            }
            let mut ty = ImageType::new(namespace, decl.name.clone(), flags);
            ty.base = Some(TypeRef::external(
                base.clone().unwrap_or_else(|| "System.Object".to_string()),
            ));
            lower_members(&mut ty, members, decl.is_abstract);
            ty.push_method(cil_synth::default_constructor());
            ty
        }
    }
}

/// Members lower in source order; fields and accessors are synthesized at
/// the point of declaration.
fn lower_members(ty: &mut ImageType, members: &[MemberDecl], abstract_owner: bool) {
    for member in members {
        match member {
            MemberDecl::Method(name) => {
                let body = if abstract_owner {
                    MethodBody::Abstract
                } else {
                    cil_synth::empty_body()
                };
                ty.push_method(ImageMethod {
                    name: name.clone(),
                    flags: cil_synth::method_flags(abstract_owner),
                    ret: TypeSig::Void,
                    params: Vec::new(),
                    body,
                });
            }
            MemberDecl::AutoProperty(name) => {
                lower_property(ty, name, None, abstract_owner);
            }
            MemberDecl::Indexer(name) => {
                lower_property(
                    ty,
                    name,
                    Some(ImageParam::new("index", TypeSig::Int32)),
                    abstract_owner,
                );
            }
            MemberDecl::FieldEvent(name) => {
                lower_event(ty, name, abstract_owner);
            }
            MemberDecl::Constant(name) => {
                if !abstract_owner {
                    ty.push_field(ImageField {
                        name: name.clone(),
                        flags: FieldFlags::PUBLIC,
                        sig: TypeSig::Object,
                        literal: None,
                    });
                }
            }
        }
    }
}

fn lower_property(
    ty: &mut ImageType,
    name: &str,
    index_param: Option<ImageParam>,
    abstract_owner: bool,
) {
    let flags = cil_synth::accessor_flags(abstract_owner);
    let (get_body, set_body) = if abstract_owner {
        (MethodBody::Abstract, MethodBody::Abstract)
    } else if index_param.is_some() {
        let field = ty.push_field(cil_synth::indexer_backing_field());
        (
            cil_synth::indexer_getter_body(field),
            cil_synth::indexer_setter_body(field),
        )
    } else {
        let field = ty.push_field(cil_synth::property_backing_field(name));
        (
            cil_synth::property_getter_body(field),
            cil_synth::property_setter_body(field),
        )
    };
    let get_params: Vec<ImageParam> = index_param.iter().cloned().collect();
    let mut set_params = get_params.clone();
    set_params.push(ImageParam::new("value", TypeSig::String));
    let get = ty.push_method(ImageMethod {
        name: format!("get_{name}"),
        flags,
        ret: TypeSig::String,
        params: get_params.clone(),
        body: get_body,
    });
    let set = ty.push_method(ImageMethod {
        name: format!("set_{name}"),
        flags,
        ret: TypeSig::Void,
        params: set_params,
        body: set_body,
    });
    ty.properties.push(ImageProperty {
        name: name.to_string(),
        sig: TypeSig::String,
        params: get_params,
        accessors: vec![
            PropertyAccessor {
                kind: AccessorKind::Get,
                method: get,
            },
            PropertyAccessor {
                kind: AccessorKind::Set,
                method: set,
            },
        ],
    });
}

fn lower_event(ty: &mut ImageType, name: &str, abstract_owner: bool) {
    let flags = cil_synth::accessor_flags(abstract_owner);
    let (add_body, remove_body) = if abstract_owner {
        (MethodBody::Abstract, MethodBody::Abstract)
    } else {
        let field = ty.push_field(cil_synth::event_backing_field(name));
        (
            cil_synth::event_adder_body(field),
            cil_synth::event_remover_body(field),
        )
    };
    let value_param = ImageParam::new("value", TypeSig::Handler);
    let add = ty.push_method(ImageMethod {
        name: format!("add_{name}"),
        flags,
        ret: TypeSig::Void,
        params: vec![value_param.clone()],
        body: add_body,
    });
    let remove = ty.push_method(ImageMethod {
        name: format!("remove_{name}"),
        flags,
        ret: TypeSig::Void,
        params: vec![value_param],
        body: remove_body,
    });
    ty.events.push(ImageEvent {
        name: name.to_string(),
        handler: TypeSig::Handler,
        accessors: vec![
            PropertyAccessor {
                kind: AccessorKind::Add,
                method: add,
            },
            PropertyAccessor {
                kind: AccessorKind::Remove,
                method: remove,
            },
        ],
    });
}

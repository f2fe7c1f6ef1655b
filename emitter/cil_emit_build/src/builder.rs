//! The dynamic module-builder API.
//!
//! A define-then-complete protocol: the backend defines types member by
//! member against builder handles, completes each type, then saves the
//! finished module. The builder owns all image state until `save`.

use std::path::{Path, PathBuf};

use cil_backend::EmitError;
use cil_image::{
    AccessorKind, ImageEvent, ImageField, ImageMethod, ImageParam, ImageProperty, MethodBody,
    MethodFlags, ModuleImage, ModuleKind, PropertyAccessor, TypeFlags, TypeRef, TypeSig,
};

/// Builder for one module image.
pub struct ModuleBuilder {
    image: ModuleImage,
}

impl ModuleBuilder {
    /// Define a dynamic module.
    pub fn new(
        assembly_name: impl Into<String>,
        version: [u16; 4],
        module_name: impl Into<String>,
        kind: ModuleKind,
    ) -> Self {
        ModuleBuilder {
            image: ModuleImage::new(assembly_name, version, module_name, kind),
        }
    }

    /// Stamp an assembly-level attribute.
    pub fn set_custom_attribute(&mut self, attribute: cil_image::ImageAttribute) {
        self.image.attributes.push(attribute);
    }

    /// Set the target architecture label.
    pub fn set_architecture(&mut self, label: Option<String>) {
        self.image.architecture = label;
    }

    /// Embed a resource.
    pub fn define_resource(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.image.resources.push(cil_image::ImageResource {
            name: name.into(),
            data,
        });
    }

    /// Define a type; complete it with [`ModuleBuilder::complete_type`].
    pub fn define_type(
        &self,
        namespace: &str,
        name: &str,
        flags: TypeFlags,
        base: Option<TypeRef>,
    ) -> TypeBuilder {
        let mut ty = cil_image::ImageType::new(namespace, name, flags);
        ty.base = base;
        TypeBuilder { ty }
    }

    /// Bake a completed type into the module.
    pub fn complete_type(&mut self, builder: TypeBuilder) {
        self.image.types.push(builder.ty);
    }

    /// Resolve the entry point and save the module to `out_dir`.
    pub fn save(mut self, out_dir: &Path, entry_point: Option<&str>) -> Result<PathBuf, EmitError> {
        std::fs::create_dir_all(out_dir).map_err(cil_image::ImageError::Io)?;
        self.image.resolve_entry_point(entry_point);
        let path = out_dir.join(&self.image.module_name);
        cil_image::write_image(&path, &self.image)?;
        tracing::debug!(path = %path.display(), "dynamic module saved");
        Ok(path)
    }
}

/// Builder for one type.
pub struct TypeBuilder {
    ty: cil_image::ImageType,
}

impl TypeBuilder {
    /// Whether the type was defined as an enum shape (sealed with the
    /// platform enum base).
    fn is_enum(&self) -> bool {
        self.ty
            .base
            .as_ref()
            .is_some_and(|b| b.full_name == "System.Enum")
    }

    /// Define a field, returning its handle.
    pub fn define_field(&mut self, field: ImageField) -> u16 {
        self.ty.push_field(field)
    }

    /// Define an enum literal valued `position`. Misuse on a non-enum shape
    /// is a contract violation.
    pub fn define_literal(&mut self, name: &str, position: i32) -> Result<u16, EmitError> {
        if !self.is_enum() {
            return Err(EmitError::Unsupported {
                what: format!("literal `{name}` on non-enum type `{}`", self.ty.full_name()),
            });
        }
        let full = self.ty.full_name();
        Ok(self
            .ty
            .push_field(cil_synth::enum_literal(name, &full, position)))
    }

    /// Define a method with a body set later via [`TypeBuilder::set_body`].
    pub fn define_method(
        &mut self,
        name: &str,
        flags: MethodFlags,
        ret: TypeSig,
        params: Vec<ImageParam>,
    ) -> u16 {
        self.ty.push_method(ImageMethod {
            name: name.to_string(),
            flags,
            ret,
            params,
            body: MethodBody::Abstract,
        })
    }

    /// Attach a body to a previously defined method.
    pub fn set_body(&mut self, method: u16, body: MethodBody) {
        if let Some(slot) = self.ty.methods.get_mut(method as usize) {
            slot.body = body;
        }
    }

    /// Define the synthesized default constructor.
    pub fn define_default_constructor(&mut self) {
        self.ty.push_method(cil_synth::default_constructor());
    }

    /// Define a runtime-implemented method (delegate members).
    pub fn define_runtime_method(&mut self, method: ImageMethod) {
        self.ty.push_method(method);
    }

    /// Record a property with get before set.
    pub fn define_property(
        &mut self,
        name: &str,
        sig: TypeSig,
        params: Vec<ImageParam>,
        get: u16,
        set: u16,
    ) {
        self.ty.properties.push(ImageProperty {
            name: name.to_string(),
            sig,
            params,
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

    /// Record an event with add before remove.
    pub fn define_event(&mut self, name: &str, handler: TypeSig, add: u16, remove: u16) {
        self.ty.events.push(ImageEvent {
            name: name.to_string(),
            handler,
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_on_non_enum_is_contract_violation() {
        let module = ModuleBuilder::new("A", [1, 0, 0, 0], "a.dll", ModuleKind::Library);
        let mut ty = module.define_type("N", "T", TypeFlags::PUBLIC, None);
        let err = ty.define_literal("Nope", 0);
        assert!(matches!(err, Err(EmitError::Unsupported { .. })));
    }

    #[test]
    fn test_literal_on_enum_shape() {
        let module = ModuleBuilder::new("A", [1, 0, 0, 0], "a.dll", ModuleKind::Library);
        let mut ty = module.define_type(
            "N",
            "E",
            TypeFlags::PUBLIC | TypeFlags::SEALED,
            Some(TypeRef::external("System.Enum")),
        );
        let index = ty.define_literal("Fri", 0);
        assert!(index.is_ok());
    }
}

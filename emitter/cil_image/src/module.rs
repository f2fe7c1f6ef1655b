//! The module image root.

use serde::{Deserialize, Serialize};

use crate::types::ImageType;

/// Module kind, derived from the model's `is_exe`/`is_gui` pair.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum ModuleKind {
    Console,
    Gui,
    Library,
}

impl ModuleKind {
    /// Listing label.
    pub fn label(self) -> &'static str {
        match self {
            ModuleKind::Console => "console",
            ModuleKind::Gui => "gui",
            ModuleKind::Library => "library",
        }
    }
}

/// One argument of an assembly-level attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrValue {
    Str(String),
    Bool(bool),
    Int(i64),
    /// A named property assignment, e.g. `WrapNonExceptionThrows = true`.
    Named(String, Box<AttrValue>),
}

impl AttrValue {
    /// Render in attribute-argument source form.
    pub fn render(&self) -> String {
        match self {
            AttrValue::Str(s) => format!("\"{s}\""),
            AttrValue::Bool(b) => b.to_string(),
            AttrValue::Int(i) => i.to_string(),
            AttrValue::Named(name, value) => format!("{name} = {}", value.render()),
        }
    }
}

/// An assembly-level custom attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttribute {
    /// Full attribute type name, e.g. `System.Reflection.AssemblyTitleAttribute`.
    pub name: String,
    pub args: Vec<AttrValue>,
}

impl ImageAttribute {
    /// Create an attribute record.
    pub fn new(name: impl Into<String>, args: Vec<AttrValue>) -> Self {
        ImageAttribute {
            name: name.into(),
            args,
        }
    }
}

/// An embedded resource with its materialized bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResource {
    pub name: String,
    pub data: Vec<u8>,
}

/// Token addressing one method in the image.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct MethodToken {
    pub type_index: u32,
    pub method_index: u32,
}

/// A finished module, ready to serialize.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleImage {
    pub assembly_name: String,
    pub version: [u16; 4],
    pub module_name: String,
    pub kind: ModuleKind,
    pub architecture: Option<String>,
    /// Per-emission module identity; fresh on every write, stripped by the
    /// normalizer before comparison.
    pub mvid: String,
    pub attributes: Vec<ImageAttribute>,
    pub resources: Vec<ImageResource>,
    pub types: Vec<ImageType>,
    pub entry_point: Option<MethodToken>,
}

impl ModuleImage {
    /// Create an empty image with a fresh MVID.
    pub fn new(
        assembly_name: impl Into<String>,
        version: [u16; 4],
        module_name: impl Into<String>,
        kind: ModuleKind,
    ) -> Self {
        ModuleImage {
            assembly_name: assembly_name.into(),
            version,
            module_name: module_name.into(),
            kind,
            architecture: None,
            mvid: uuid::Uuid::new_v4().to_string(),
            attributes: Vec::new(),
            resources: Vec::new(),
            types: Vec::new(),
            entry_point: None,
        }
    }

    /// Find a method by `Namespace.Type.Method` path.
    ///
    /// The last dot splits type path from method name; everything before it
    /// must match the type's full name exactly.
    pub fn find_method(&self, path: &str) -> Option<MethodToken> {
        let (type_path, method_name) = path.rsplit_once('.')?;
        for (ti, ty) in self.types.iter().enumerate() {
            if ty.full_name() != type_path {
                continue;
            }
            for (mi, method) in ty.methods.iter().enumerate() {
                if method.name == method_name {
                    return Some(MethodToken {
                        type_index: ti as u32,
                        method_index: mi as u32,
                    });
                }
            }
        }
        None
    }

    /// Resolve and record the entry point from a manifest path, when given.
    ///
    /// Absent or unmatched paths leave the entry point unset; no selection
    /// policy beyond the explicit manifest reference is applied.
    pub fn resolve_entry_point(&mut self, path: Option<&str>) {
        self.entry_point = path.and_then(|p| self.find_method(p));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{MethodFlags, TypeFlags};
    use crate::sig::TypeSig;
    use crate::types::{ImageMethod, MethodBody};
    use pretty_assertions::assert_eq;

    fn probe_image() -> ModuleImage {
        let mut image = ModuleImage::new("P", [1, 0, 0, 0], "P.exe", ModuleKind::Console);
        let mut ty = ImageType::new("FormsTest", "Program", TypeFlags::PUBLIC);
        ty.push_method(ImageMethod {
            name: "Main".to_string(),
            flags: MethodFlags::PUBLIC,
            ret: TypeSig::Void,
            params: Vec::new(),
            body: MethodBody::il(vec![crate::op::Op::Ret]),
        });
        image.types.push(ty);
        image
    }

    #[test]
    fn test_find_method() {
        let image = probe_image();
        let token = image.find_method("FormsTest.Program.Main");
        assert_eq!(
            token,
            Some(MethodToken {
                type_index: 0,
                method_index: 0
            })
        );
        assert_eq!(image.find_method("FormsTest.Program.Missing"), None);
        assert_eq!(image.find_method("Main"), None);
    }

    #[test]
    fn test_resolve_entry_point() {
        let mut image = probe_image();
        image.resolve_entry_point(Some("FormsTest.Program.Main"));
        assert!(image.entry_point.is_some());
        image.resolve_entry_point(None);
        assert!(image.entry_point.is_none());
    }

    #[test]
    fn test_fresh_mvid_per_image() {
        let a = probe_image();
        let b = probe_image();
        assert_ne!(a.mvid, b.mvid);
    }
}

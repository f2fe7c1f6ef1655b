//! Image-level type and member structures.

use serde::{Deserialize, Serialize};

use crate::flags::{FieldFlags, MethodFlags, TypeFlags};
use crate::op::Op;
use crate::sig::TypeSig;

/// Reference to a type outside the image, by full name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub full_name: String,
}

impl TypeRef {
    /// Reference a platform or external type by full name.
    pub fn external(full_name: impl Into<String>) -> Self {
        TypeRef {
            full_name: full_name.into(),
        }
    }
}

/// A method body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodBody {
    /// Declared abstract; no body exists.
    Abstract,
    /// Supplied by the runtime (delegate members).
    Runtime,
    /// Generated instructions with typed local slots.
    Il { locals: Vec<TypeSig>, ops: Vec<Op> },
}

impl MethodBody {
    /// An IL body with no locals.
    pub fn il(ops: Vec<Op>) -> Self {
        MethodBody::Il {
            locals: Vec::new(),
            ops,
        }
    }
}

/// A method parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageParam {
    pub name: String,
    pub sig: TypeSig,
}

impl ImageParam {
    /// Create a named parameter.
    pub fn new(name: impl Into<String>, sig: TypeSig) -> Self {
        ImageParam {
            name: name.into(),
            sig,
        }
    }
}

/// A method in a type's method table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMethod {
    pub name: String,
    pub flags: MethodFlags,
    pub ret: TypeSig,
    pub params: Vec<ImageParam>,
    pub body: MethodBody,
}

/// A field in a type's field table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageField {
    pub name: String,
    pub flags: FieldFlags,
    pub sig: TypeSig,
    /// Literal constant value, for enum literals.
    pub literal: Option<i32>,
}

/// Which accessor a property records at a slot.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum AccessorKind {
    Get,
    Set,
    Add,
    Remove,
}

/// One recorded property/event accessor: kind plus the index of the accessor
/// method in the owning type's method table. Recording order is preserved in
/// the image and in disassembly.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct PropertyAccessor {
    pub kind: AccessorKind,
    pub method: u16,
}

/// A property (or indexer, when it has parameters).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageProperty {
    pub name: String,
    pub sig: TypeSig,
    pub params: Vec<ImageParam>,
    pub accessors: Vec<PropertyAccessor>,
}

/// An event with its handler type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEvent {
    pub name: String,
    pub handler: TypeSig,
    pub accessors: Vec<PropertyAccessor>,
}

/// A type in the image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageType {
    pub namespace: String,
    pub name: String,
    pub flags: TypeFlags,
    pub base: Option<TypeRef>,
    pub fields: Vec<ImageField>,
    pub methods: Vec<ImageMethod>,
    pub properties: Vec<ImageProperty>,
    pub events: Vec<ImageEvent>,
}

impl ImageType {
    /// Create an empty type record.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, flags: TypeFlags) -> Self {
        ImageType {
            namespace: namespace.into(),
            name: name.into(),
            flags,
            base: None,
            fields: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Dot-joined `namespace.name`.
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Append a method, returning its table index.
    pub fn push_method(&mut self, method: ImageMethod) -> u16 {
        let index = self.methods.len() as u16;
        self.methods.push(method);
        index
    }

    /// Append a field, returning its table index.
    pub fn push_field(&mut self, field: ImageField) -> u16 {
        let index = self.fields.len() as u16;
        self.fields.push(field);
        index
    }
}

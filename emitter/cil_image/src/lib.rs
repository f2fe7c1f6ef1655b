//! Portable module image — the loadable artifact of the emission engine.
//!
//! Every backend, whatever its pipeline, finishes by producing a
//! `ModuleImage`: the complete structural description of one emitted module
//! (assembly identity, attributes, resources, types, fields, methods with
//! instruction bodies, properties, events, optional entry point). The image
//! is serialized to disk with bincode behind a small magic/version header;
//! the disassembler reads it back and renders the structural listing used
//! for cross-backend comparison.
//!
//! # Design Philosophy
//!
//! - **Index-linked, not pointer-linked**: properties and events reference
//!   their accessor methods by index into the owning type's method table.
//!   Recorded accessor order is preserved — backends legitimately differ
//!   here, and the normalizer absorbs it.
//! - **Closed signature universe**: `TypeSig` covers exactly what the
//!   emitters need; anything else is a `Named` external reference.

mod flags;
mod io;
mod module;
mod op;
mod sig;
mod types;

pub use flags::{FieldFlags, MethodFlags, TypeFlags};
pub use io::{read_image, write_image, ImageError, FORMAT_VERSION, MAGIC};
pub use module::{
    AttrValue, ImageAttribute, ImageResource, MethodToken, ModuleImage, ModuleKind,
};
pub use op::{Callable, Op};
pub use sig::TypeSig;
pub use types::{
    AccessorKind, ImageEvent, ImageField, ImageMethod, ImageParam, ImageProperty, ImageType,
    MethodBody, PropertyAccessor, TypeRef,
};

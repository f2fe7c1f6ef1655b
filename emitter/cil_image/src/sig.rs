//! The closed signature universe.

use serde::{Deserialize, Serialize};

/// A type signature as it appears in fields, parameters, and return slots.
///
/// Closed over exactly what the emitters produce; external base types and
/// attribute types travel as `Named` references with their full name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeSig {
    Void,
    Int32,
    String,
    Object,
    /// `native int` — method pointers in delegate constructors.
    NativeInt,
    /// The platform multicast handler type.
    Handler,
    AsyncCallback,
    AsyncResult,
    /// The int32-keyed string map backing default indexers.
    StringMap,
    /// An external type referenced by full name.
    Named(String),
}

impl TypeSig {
    /// True for signatures passed and stored by reference.
    pub fn is_reference(&self) -> bool {
        match self {
            TypeSig::Void | TypeSig::Int32 | TypeSig::NativeInt => false,
            TypeSig::String
            | TypeSig::Object
            | TypeSig::Handler
            | TypeSig::AsyncCallback
            | TypeSig::AsyncResult
            | TypeSig::StringMap
            | TypeSig::Named(_) => true,
        }
    }
}

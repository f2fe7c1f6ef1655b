//! Embedded resources.

use crate::named_set::Named;

/// An embedded resource placeholder.
///
/// Actual bytes are out of scope: emission materializes a zero-filled buffer
/// of `length` bytes (empty when unset).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceDef {
    pub name: String,
    pub length: Option<u32>,
}

impl ResourceDef {
    /// Create a resource placeholder.
    pub fn new(name: impl Into<String>, length: Option<u32>) -> Self {
        ResourceDef {
            name: name.into(),
            length,
        }
    }

    /// The zero-filled stand-in contents.
    pub fn bytes(&self) -> Vec<u8> {
        vec![0; self.length.unwrap_or(0) as usize]
    }
}

impl Named for ResourceDef {
    fn name(&self) -> &str {
        &self.name
    }
}

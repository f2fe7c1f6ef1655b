//! Attribute flag sets for types, fields, and methods.

use bitflags::bitflags;

bitflags! {
    /// Type-level attributes.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TypeFlags: u32 {
        const PUBLIC            = 1 << 0;
        const SEALED            = 1 << 1;
        const INTERFACE         = 1 << 2;
        const ABSTRACT          = 1 << 3;
        const SEQUENTIAL_LAYOUT = 1 << 4;
        const BEFORE_FIELD_INIT = 1 << 5;
    }
}

bitflags! {
    /// Field-level attributes.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct FieldFlags: u32 {
        const PUBLIC          = 1 << 0;
        const PRIVATE         = 1 << 1;
        const STATIC          = 1 << 2;
        const LITERAL         = 1 << 3;
        const SPECIAL_NAME    = 1 << 4;
        const RT_SPECIAL_NAME = 1 << 5;
    }
}

bitflags! {
    /// Method-level attributes.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct MethodFlags: u32 {
        const PUBLIC          = 1 << 0;
        const HIDE_BY_SIG     = 1 << 1;
        const SPECIAL_NAME    = 1 << 2;
        const RT_SPECIAL_NAME = 1 << 3;
        const NEW_SLOT        = 1 << 4;
        const VIRTUAL         = 1 << 5;
        const ABSTRACT        = 1 << 6;
    }
}

/// Bitflags serialize as their raw bits; unknown bits survive a round-trip
/// untouched so older readers fail loudly at the semantic layer, not here.
macro_rules! impl_flags_serde {
    ($ty:ident) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u32(self.bits())
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                let bits = <u32 as serde::Deserialize>::deserialize(deserializer)?;
                Ok($ty::from_bits_retain(bits))
            }
        }
    };
}

impl_flags_serde!(TypeFlags);
impl_flags_serde!(FieldFlags);
impl_flags_serde!(MethodFlags);

//! Instruction set for generated method bodies.

use serde::{Deserialize, Serialize};

use crate::sig::TypeSig;

/// A runtime-provided routine a generated body may call.
///
/// These are the only out-of-module calls emitted bodies make: the
/// multicast-delegate combine/remove pair, the atomic compare-exchange used
/// by event accessors, and the map accessors backing default indexers.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Callable {
    Combine,
    Remove,
    CompareExchange,
    MapGet,
    MapSet,
}

impl Callable {
    /// Full display name, as rendered in disassembly listings.
    pub fn full_name(self) -> &'static str {
        match self {
            Callable::Combine => "System.Delegate::Combine",
            Callable::Remove => "System.Delegate::Remove",
            Callable::CompareExchange => "System.Threading.Interlocked::CompareExchange",
            Callable::MapGet => "System.Collections.Generic.Dictionary`2::get_Item",
            Callable::MapSet => "System.Collections.Generic.Dictionary`2::set_Item",
        }
    }
}

/// One instruction of a generated body.
///
/// Field references are indices into the owning type's field table; local
/// references index the body's local slots; `Label`/`BneUn` pair up through
/// small label ids local to one body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Load argument `n` (0 = receiver on instance methods).
    LdArg(u8),
    /// Load the field's value.
    LdFld(u16),
    /// Load the field's address, for compare-exchange.
    LdFldA(u16),
    /// Store into the field.
    StFld(u16),
    /// Load local slot `n`.
    LdLoc(u8),
    /// Store into local slot `n`.
    StLoc(u8),
    /// Call a runtime-provided routine.
    Call(Callable),
    /// Chain the declaring type's base constructor.
    CallBase,
    /// Checked downcast.
    CastClass(TypeSig),
    /// Mark a branch target.
    Label(u8),
    /// Branch to a label when the two topmost values differ.
    BneUn(u8),
    /// Return.
    Ret,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callable_names() {
        assert_eq!(Callable::Combine.full_name(), "System.Delegate::Combine");
        assert_eq!(
            Callable::CompareExchange.full_name(),
            "System.Threading.Interlocked::CompareExchange"
        );
    }
}

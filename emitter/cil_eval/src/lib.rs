//! Interpreter for emitted method bodies.
//!
//! Executes `MethodBody::Il` over constructed instances of image classes so
//! the behavioral contracts of the synthesized defaults can be observed
//! directly: property round-trips, indexer routing through one backing map,
//! and — the interesting one — the event accessors' compare-exchange-retry
//! loop running against a real atomic field under real contention.
//!
//! Handler values are ids into an interned delegate-list table; an event
//! backing field is an atomic id slot, so `CompareExchange` in a body is an
//! actual `compare_exchange` on the field and concurrent `add`/`remove`
//! interleavings behave exactly as they would on the emitted type.

mod delegates;
mod exec;
mod instance;

pub use delegates::{DelegateTable, NO_HANDLERS};
pub use exec::run;
pub use instance::{FieldCell, Instance};

/// A runtime value on the evaluation stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Null,
    /// The receiver.
    This,
    Int(i32),
    Str(String),
    /// A delegate-list id in the [`DelegateTable`].
    Handler(u32),
    /// Address of an instance field, for compare-exchange.
    FieldAddr(u16),
    /// Reference to a map-backed field.
    MapRef(u16),
}

/// Evaluation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("method `{0}` has no executable body")]
    NotExecutable(String),
    #[error("no method `{0}` on the instance type")]
    NoSuchMethod(String),
    #[error("evaluation stack underflow")]
    StackUnderflow,
    #[error("bad field index {0}")]
    BadField(u16),
    #[error("bad local slot {0}")]
    BadLocal(u8),
    #[error("missing argument {0}")]
    BadArgument(u8),
    #[error("unknown branch label {0}")]
    UnknownLabel(u8),
    #[error("expected {expected} on the stack")]
    TypeMismatch { expected: &'static str },
    #[error("key {0} not present in backing map")]
    KeyNotFound(i32),
}

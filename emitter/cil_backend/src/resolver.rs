//! External type resolution.

use crate::error::EmitError;

/// What kind of thing an external name resolves to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExternalKind {
    Class,
    Interface,
    ValueType,
    Delegate,
}

/// A resolved external type description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalType {
    /// Canonical full name, as stamped into base-type references.
    pub full_name: String,
    pub kind: ExternalKind,
}

/// Resolves textual type names against an external type universe.
///
/// Failure is fatal for the emission that asked — a `Resolution` error, not
/// retried.
pub trait TypeResolver {
    /// Resolve `name` to a concrete external type description.
    fn resolve(&self, name: &str) -> Result<ExternalType, EmitError>;
}

/// The closed platform universe the engine links against.
///
/// Lookup is case-insensitive and returns the canonical spelling, so model
/// authors may write `system.uri` and every backend still stamps
/// `System.Uri`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformResolver;

const PLATFORM_TYPES: &[(&str, ExternalKind)] = &[
    ("System.Object", ExternalKind::Class),
    ("System.ValueType", ExternalKind::ValueType),
    ("System.Enum", ExternalKind::ValueType),
    ("System.MulticastDelegate", ExternalKind::Delegate),
    ("System.Delegate", ExternalKind::Delegate),
    ("System.EventHandler", ExternalKind::Delegate),
    ("System.AsyncCallback", ExternalKind::Delegate),
    ("System.IAsyncResult", ExternalKind::Interface),
    ("System.IDisposable", ExternalKind::Interface),
    ("System.String", ExternalKind::Class),
    ("System.Int32", ExternalKind::ValueType),
    ("System.IntPtr", ExternalKind::ValueType),
    ("System.Void", ExternalKind::ValueType),
    ("System.Attribute", ExternalKind::Class),
    ("System.Exception", ExternalKind::Class),
    ("System.EventArgs", ExternalKind::Class),
    ("System.MarshalByRefObject", ExternalKind::Class),
    ("System.Uri", ExternalKind::Class),
];

impl TypeResolver for PlatformResolver {
    fn resolve(&self, name: &str) -> Result<ExternalType, EmitError> {
        PLATFORM_TYPES
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(known, kind)| ExternalType {
                full_name: (*known).to_string(),
                kind: *kind,
            })
            .ok_or_else(|| EmitError::Resolution {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_canonicalizes_case() {
        let ty = PlatformResolver.resolve("system.marshalbyrefobject");
        let Ok(ty) = ty else {
            panic!("platform type must resolve");
        };
        assert_eq!(ty.full_name, "System.MarshalByRefObject");
        assert_eq!(ty.kind, ExternalKind::Class);
    }

    #[test]
    fn test_unknown_name_is_fatal() {
        let err = PlatformResolver.resolve("Contoso.Widget");
        assert!(matches!(
            err,
            Err(EmitError::Resolution { name }) if name == "Contoso.Widget"
        ));
    }
}

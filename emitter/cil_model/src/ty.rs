//! Type definitions.

use crate::member::MemberDef;
use crate::named_set::{Named, NamedSet};
use crate::name_token;

/// The closed set of type kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    /// Concrete class; `base` names an external type, resolved at emission
    /// time, or the platform object root when absent.
    Class { base: Option<String> },
    Interface,
    Struct,
    Enum,
    Delegate,
}

impl TypeKind {
    /// Lowercase label used in logs and diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            TypeKind::Class { .. } => "class",
            TypeKind::Interface => "interface",
            TypeKind::Struct => "struct",
            TypeKind::Enum => "enum",
            TypeKind::Delegate => "delegate",
        }
    }
}

/// A type declared inside a namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
    /// Abstract classes and structs emit declarations only — no bodies, no
    /// backing fields. Interfaces are abstract regardless of this flag.
    pub is_abstract: bool,
    pub members: NamedSet<MemberDef>,
}

impl TypeDef {
    /// Create a type with an explicit name.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        TypeDef {
            name: name.into(),
            kind,
            is_abstract: false,
            members: NamedSet::new(),
        }
    }

    /// A class with no explicit base.
    pub fn class(name: impl Into<String>) -> Self {
        TypeDef::new(name, TypeKind::Class { base: None })
    }

    /// A class deriving from a named external type.
    pub fn class_with_base(name: impl Into<String>, base: impl Into<String>) -> Self {
        TypeDef::new(
            name,
            TypeKind::Class {
                base: Some(base.into()),
            },
        )
    }

    /// An interface.
    pub fn interface(name: impl Into<String>) -> Self {
        TypeDef::new(name, TypeKind::Interface)
    }

    /// A struct.
    pub fn r#struct(name: impl Into<String>) -> Self {
        TypeDef::new(name, TypeKind::Struct)
    }

    /// An enum.
    pub fn r#enum(name: impl Into<String>) -> Self {
        TypeDef::new(name, TypeKind::Enum)
    }

    /// A delegate. Its member list is ignored at emission: delegates always
    /// get the fixed constructor/Invoke/BeginInvoke/EndInvoke quartet.
    pub fn delegate(name: impl Into<String>) -> Self {
        TypeDef::new(name, TypeKind::Delegate)
    }

    /// A type with a random default name.
    pub fn anonymous(kind: TypeKind) -> Self {
        TypeDef {
            name: name_token(),
            kind,
            is_abstract: false,
            members: NamedSet::new(),
        }
    }

    /// Mark the type abstract.
    pub fn abstract_(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Add a member, keeping name uniqueness.
    pub fn with_member(mut self, member: MemberDef) -> Self {
        self.members.insert(member);
        self
    }

    /// Whether this type emits declarations only (no bodies).
    ///
    /// Interfaces always; classes and structs when flagged abstract. Enums
    /// and delegates never — their shapes are fixed.
    pub fn is_abstract_owner(&self) -> bool {
        match self.kind {
            TypeKind::Interface => true,
            TypeKind::Class { .. } | TypeKind::Struct => self.is_abstract,
            TypeKind::Enum | TypeKind::Delegate => false,
        }
    }
}

impl Named for TypeDef {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::MemberKind;

    #[test]
    fn test_abstract_owner() {
        assert!(TypeDef::interface("I").is_abstract_owner());
        assert!(!TypeDef::class("C").is_abstract_owner());
        assert!(TypeDef::class("C").abstract_().is_abstract_owner());
        assert!(TypeDef::r#struct("S").abstract_().is_abstract_owner());
        assert!(!TypeDef::r#enum("E").abstract_().is_abstract_owner());
    }

    #[test]
    fn test_member_names_unique() {
        let ty = TypeDef::class("C")
            .with_member(MemberDef::new("M", MemberKind::Method))
            .with_member(MemberDef::new("M", MemberKind::Property));
        assert_eq!(ty.members.len(), 1);
    }

    #[test]
    fn test_kind_label() {
        assert_eq!(TypeDef::class_with_base("C", "System.Uri").kind.label(), "class");
        assert_eq!(TypeKind::Delegate.label(), "delegate");
    }
}

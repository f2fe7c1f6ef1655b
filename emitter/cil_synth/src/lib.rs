//! Default-implementation synthesizer.
//!
//! The one genuinely algorithmic corner of the engine: given a declared
//! property, indexer, or event, produce the backing storage and accessor
//! bodies the platform would synthesize — auto-property backing fields,
//! map-backed indexers, and the lock-free combine/compare-exchange-retry
//! event accessors. Every pipeline that generates bodies routes through
//! these functions, so the generated instructions agree across backends by
//! construction.
//!
//! Also here: the structurally fixed shapes that do not depend on the model
//! at all — the delegate member quartet, synthesized default constructors,
//! the hidden enum storage field, and enum literal numbering.

use cil_image::{
    Callable, FieldFlags, ImageField, ImageMethod, ImageParam, MethodBody, MethodFlags, Op,
    TypeSig,
};

/// Backing-field name for an auto-implemented property.
pub fn backing_field_name(property: &str) -> String {
    format!("<{property}>k__BackingField")
}

/// Backing-field name for a default indexer's map.
pub const INDEXER_BACKING_FIELD: &str = "idx";

/// The private backing field of an auto-implemented property.
pub fn property_backing_field(property: &str) -> ImageField {
    ImageField {
        name: backing_field_name(property),
        flags: FieldFlags::PRIVATE,
        sig: TypeSig::String,
        literal: None,
    }
}

/// The private map field backing a default indexer.
pub fn indexer_backing_field() -> ImageField {
    ImageField {
        name: INDEXER_BACKING_FIELD.to_string(),
        flags: FieldFlags::PRIVATE,
        sig: TypeSig::StringMap,
        literal: None,
    }
}

/// The private handler field backing a default event.
pub fn event_backing_field(event: &str) -> ImageField {
    ImageField {
        name: event.to_string(),
        flags: FieldFlags::PRIVATE,
        sig: TypeSig::Handler,
        literal: None,
    }
}

/// An empty body: just return.
pub fn empty_body() -> MethodBody {
    MethodBody::il(vec![Op::Ret])
}

/// Auto-property getter: load the backing field.
pub fn property_getter_body(field: u16) -> MethodBody {
    MethodBody::il(vec![Op::LdArg(0), Op::LdFld(field), Op::Ret])
}

/// Auto-property setter: store into the backing field.
pub fn property_setter_body(field: u16) -> MethodBody {
    MethodBody::il(vec![Op::LdArg(0), Op::LdArg(1), Op::StFld(field), Op::Ret])
}

/// Default indexer getter: delegate to the backing map's lookup.
pub fn indexer_getter_body(field: u16) -> MethodBody {
    MethodBody::il(vec![
        Op::LdArg(0),
        Op::LdFld(field),
        Op::LdArg(1),
        Op::Call(Callable::MapGet),
        Op::Ret,
    ])
}

/// Default indexer setter: delegate to the backing map's assignment.
pub fn indexer_setter_body(field: u16) -> MethodBody {
    MethodBody::il(vec![
        Op::LdArg(0),
        Op::LdFld(field),
        Op::LdArg(1),
        Op::LdArg(2),
        Op::Call(Callable::MapSet),
        Op::Ret,
    ])
}

/// The combine/compare-exchange-retry loop shared by event add and remove.
///
/// Read the backing field, combine (or remove) the incoming handler, then
/// attempt an atomic compare-exchange against the value read; on conflict
/// the refreshed field value is already in the loop local, so branch back
/// and retry. Three handler-typed locals: the last-read value, the value the
/// swap was attempted against, and the combined candidate.
fn event_accessor_body(field: u16, transform: Callable) -> MethodBody {
    MethodBody::Il {
        locals: vec![TypeSig::Handler, TypeSig::Handler, TypeSig::Handler],
        ops: vec![
            Op::LdArg(0),
            Op::LdFld(field),
            Op::StLoc(0),
            Op::Label(0),
            Op::LdLoc(0),
            Op::StLoc(1),
            Op::LdLoc(1),
            Op::LdArg(1),
            Op::Call(transform),
            Op::CastClass(TypeSig::Handler),
            Op::StLoc(2),
            Op::LdArg(0),
            Op::LdFldA(field),
            Op::LdLoc(2),
            Op::LdLoc(1),
            Op::Call(Callable::CompareExchange),
            Op::StLoc(0),
            Op::LdLoc(0),
            Op::LdLoc(1),
            Op::BneUn(0),
            Op::Ret,
        ],
    }
}

/// Event adder: CAS-retry loop over `Combine`.
pub fn event_adder_body(field: u16) -> MethodBody {
    event_accessor_body(field, Callable::Combine)
}

/// Event remover: CAS-retry loop over `Remove`.
pub fn event_remover_body(field: u16) -> MethodBody {
    event_accessor_body(field, Callable::Remove)
}

/// Flags for a plain method declaration.
pub fn method_flags(abstract_owner: bool) -> MethodFlags {
    let flags = MethodFlags::PUBLIC | MethodFlags::HIDE_BY_SIG;
    if abstract_owner {
        flags | MethodFlags::ABSTRACT | MethodFlags::VIRTUAL | MethodFlags::NEW_SLOT
    } else {
        flags
    }
}

/// Flags for property, indexer, and event accessors.
pub fn accessor_flags(abstract_owner: bool) -> MethodFlags {
    method_flags(abstract_owner) | MethodFlags::SPECIAL_NAME
}

/// A synthesized public parameterless constructor chaining the base.
pub fn default_constructor() -> ImageMethod {
    ImageMethod {
        name: ".ctor".to_string(),
        flags: MethodFlags::PUBLIC
            | MethodFlags::HIDE_BY_SIG
            | MethodFlags::SPECIAL_NAME
            | MethodFlags::RT_SPECIAL_NAME,
        ret: TypeSig::Void,
        params: Vec::new(),
        body: MethodBody::il(vec![Op::LdArg(0), Op::CallBase, Op::Ret]),
    }
}

/// The hidden instance storage field of an enum.
pub fn enum_value_field() -> ImageField {
    ImageField {
        name: "value__".to_string(),
        flags: FieldFlags::PUBLIC | FieldFlags::SPECIAL_NAME | FieldFlags::RT_SPECIAL_NAME,
        sig: TypeSig::Int32,
        literal: None,
    }
}

/// An enum literal: position index within the owning type's constant list,
/// consecutive from zero in declaration order.
pub fn enum_literal(name: &str, owner_full_name: &str, position: i32) -> ImageField {
    ImageField {
        name: name.to_string(),
        flags: FieldFlags::PUBLIC | FieldFlags::STATIC | FieldFlags::LITERAL,
        sig: TypeSig::Named(owner_full_name.to_string()),
        literal: Some(position),
    }
}

/// The four structurally fixed delegate members, in declaration order.
///
/// All bodies are supplied by the runtime; the model's member list plays no
/// part in a delegate's shape.
pub fn delegate_members() -> Vec<ImageMethod> {
    let mattr =
        MethodFlags::PUBLIC | MethodFlags::HIDE_BY_SIG | MethodFlags::NEW_SLOT | MethodFlags::VIRTUAL;
    vec![
        ImageMethod {
            name: ".ctor".to_string(),
            flags: MethodFlags::PUBLIC
                | MethodFlags::HIDE_BY_SIG
                | MethodFlags::SPECIAL_NAME
                | MethodFlags::RT_SPECIAL_NAME,
            ret: TypeSig::Void,
            params: vec![
                ImageParam::new("object", TypeSig::Object),
                ImageParam::new("method", TypeSig::NativeInt),
            ],
            body: MethodBody::Runtime,
        },
        ImageMethod {
            name: "Invoke".to_string(),
            flags: mattr,
            ret: TypeSig::Void,
            params: Vec::new(),
            body: MethodBody::Runtime,
        },
        ImageMethod {
            name: "BeginInvoke".to_string(),
            flags: mattr,
            ret: TypeSig::AsyncResult,
            params: vec![
                ImageParam::new("callback", TypeSig::AsyncCallback),
                ImageParam::new("object", TypeSig::Object),
            ],
            body: MethodBody::Runtime,
        },
        ImageMethod {
            name: "EndInvoke".to_string(),
            flags: mattr,
            ret: TypeSig::Void,
            params: vec![ImageParam::new("result", TypeSig::AsyncResult)],
            body: MethodBody::Runtime,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_backing_field_name() {
        assert_eq!(backing_field_name("Size"), "<Size>k__BackingField");
    }

    #[test]
    fn test_adder_and_remover_differ_only_in_transform() {
        let add = event_adder_body(3);
        let rem = event_remover_body(3);
        let (MethodBody::Il { ops: add_ops, .. }, MethodBody::Il { ops: rem_ops, .. }) =
            (add, rem)
        else {
            panic!("event accessors must have il bodies");
        };
        assert_eq!(add_ops.len(), rem_ops.len());
        let diffs: Vec<usize> = add_ops
            .iter()
            .zip(&rem_ops)
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(diffs.len(), 1);
        assert_eq!(add_ops[diffs[0]], Op::Call(Callable::Combine));
        assert_eq!(rem_ops[diffs[0]], Op::Call(Callable::Remove));
    }

    #[test]
    fn test_event_body_uses_cas_not_lock() {
        let MethodBody::Il { locals, ops } = event_adder_body(0) else {
            panic!("adder must have an il body");
        };
        assert_eq!(locals, vec![TypeSig::Handler; 3]);
        assert!(ops.contains(&Op::Call(Callable::CompareExchange)));
        assert!(ops.contains(&Op::LdFldA(0)));
        assert!(ops.contains(&Op::BneUn(0)));
    }

    #[test]
    fn test_delegate_quartet() {
        let members = delegate_members();
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec![".ctor", "Invoke", "BeginInvoke", "EndInvoke"]);
        assert!(members.iter().all(|m| m.body == MethodBody::Runtime));
        assert_eq!(members[2].ret, TypeSig::AsyncResult);
        assert_eq!(members[3].params[0].sig, TypeSig::AsyncResult);
    }

    #[test]
    fn test_enum_literal_positions() {
        let lit = enum_literal("Fri", "N.Days", 0);
        assert_eq!(lit.literal, Some(0));
        assert!(lit.flags.contains(FieldFlags::LITERAL | FieldFlags::STATIC));
        assert_eq!(lit.sig, TypeSig::Named("N.Days".to_string()));
    }

    #[test]
    fn test_accessor_flags_abstract() {
        let f = accessor_flags(true);
        assert!(f.contains(MethodFlags::ABSTRACT | MethodFlags::VIRTUAL | MethodFlags::NEW_SLOT));
        let f = accessor_flags(false);
        assert!(!f.contains(MethodFlags::ABSTRACT));
        assert!(f.contains(MethodFlags::SPECIAL_NAME));
    }
}

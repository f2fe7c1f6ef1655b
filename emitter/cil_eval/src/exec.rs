//! The op-loop executor.

use cil_image::{Callable, ImageMethod, MethodBody, Op, TypeSig};

use crate::delegates::DelegateTable;
use crate::instance::Instance;
use crate::{EvalError, Value};

/// Execute a method body against an instance.
pub fn run(
    instance: &Instance<'_>,
    table: &DelegateTable,
    method: &ImageMethod,
    args: &[Value],
) -> Result<Value, EvalError> {
    let MethodBody::Il { locals, ops } = &method.body else {
        return Err(EvalError::NotExecutable(method.name.clone()));
    };
    let mut frame = Frame {
        instance,
        table,
        args,
        stack: Vec::new(),
        locals: vec![Value::Null; locals.len()],
    };
    let mut pc = 0;
    while pc < ops.len() {
        match frame.step(&ops[pc])? {
            Flow::Next => pc += 1,
            Flow::Jump(label) => {
                pc = find_label(ops, label)?;
            }
            Flow::Return => {
                return if method.ret == TypeSig::Void {
                    Ok(Value::Null)
                } else {
                    frame.pop()
                };
            }
        }
    }
    Ok(Value::Null)
}

fn find_label(ops: &[Op], label: u8) -> Result<usize, EvalError> {
    ops.iter()
        .position(|op| *op == Op::Label(label))
        .ok_or(EvalError::UnknownLabel(label))
}

enum Flow {
    Next,
    Jump(u8),
    Return,
}

struct Frame<'r, 'a> {
    instance: &'r Instance<'a>,
    table: &'r DelegateTable,
    args: &'r [Value],
    stack: Vec<Value>,
    locals: Vec<Value>,
}

impl Frame<'_, '_> {
    fn pop(&mut self) -> Result<Value, EvalError> {
        self.stack.pop().ok_or(EvalError::StackUnderflow)
    }

    fn pop_this(&mut self) -> Result<(), EvalError> {
        match self.pop()? {
            Value::This => Ok(()),
            _ => Err(EvalError::TypeMismatch { expected: "this" }),
        }
    }

    fn pop_handler(&mut self) -> Result<u32, EvalError> {
        match self.pop()? {
            Value::Handler(id) => Ok(id),
            Value::Null => Ok(0),
            _ => Err(EvalError::TypeMismatch { expected: "handler" }),
        }
    }

    fn pop_int(&mut self) -> Result<i32, EvalError> {
        match self.pop()? {
            Value::Int(n) => Ok(n),
            _ => Err(EvalError::TypeMismatch { expected: "int32" }),
        }
    }

    fn step(&mut self, op: &Op) -> Result<Flow, EvalError> {
        match op {
            Op::LdArg(0) => self.stack.push(Value::This),
            Op::LdArg(n) => {
                let value = self
                    .args
                    .get(*n as usize - 1)
                    .ok_or(EvalError::BadArgument(*n))?;
                self.stack.push(value.clone());
            }
            Op::LdFld(field) => {
                self.pop_this()?;
                let value = self.instance.load_field(*field)?;
                self.stack.push(value);
            }
            Op::LdFldA(field) => {
                self.pop_this()?;
                self.stack.push(Value::FieldAddr(*field));
            }
            Op::StFld(field) => {
                let value = self.pop()?;
                self.pop_this()?;
                self.instance.store_field(*field, value)?;
            }
            Op::LdLoc(slot) => {
                let value = self
                    .locals
                    .get(*slot as usize)
                    .cloned()
                    .ok_or(EvalError::BadLocal(*slot))?;
                self.stack.push(value);
            }
            Op::StLoc(slot) => {
                let value = self.pop()?;
                let cell = self
                    .locals
                    .get_mut(*slot as usize)
                    .ok_or(EvalError::BadLocal(*slot))?;
                *cell = value;
            }
            Op::Call(callable) => self.call(*callable)?,
            Op::CallBase => {
                // The platform root constructor has no observable effect.
                self.pop_this()?;
            }
            Op::CastClass(_) => {
                // Handler ids and nulls survive the checked downcast as is.
            }
            Op::Label(_) => {}
            Op::BneUn(label) => {
                let b = self.pop()?;
                let a = self.pop()?;
                if a != b {
                    return Ok(Flow::Jump(*label));
                }
            }
            Op::Ret => return Ok(Flow::Return),
        }
        Ok(Flow::Next)
    }

    fn call(&mut self, callable: Callable) -> Result<(), EvalError> {
        match callable {
            Callable::Combine => {
                let b = self.pop_handler()?;
                let a = self.pop_handler()?;
                self.stack.push(Value::Handler(self.table.combine(a, b)));
            }
            Callable::Remove => {
                let b = self.pop_handler()?;
                let a = self.pop_handler()?;
                self.stack.push(Value::Handler(self.table.remove(a, b)));
            }
            Callable::CompareExchange => {
                let comparand = self.pop_handler()?;
                let new = self.pop_handler()?;
                let Value::FieldAddr(field) = self.pop()? else {
                    return Err(EvalError::TypeMismatch {
                        expected: "field address",
                    });
                };
                let previous = self
                    .instance
                    .compare_exchange_handler(field, new, comparand)?;
                self.stack.push(Value::Handler(previous));
            }
            Callable::MapGet => {
                let key = self.pop_int()?;
                let Value::MapRef(field) = self.pop()? else {
                    return Err(EvalError::TypeMismatch { expected: "map" });
                };
                let crate::FieldCell::Map(map) = self.instance.cell(field)? else {
                    return Err(EvalError::TypeMismatch { expected: "map" });
                };
                let value = map
                    .lock()
                    .get(&key)
                    .cloned()
                    .ok_or(EvalError::KeyNotFound(key))?;
                self.stack.push(Value::Str(value));
            }
            Callable::MapSet => {
                let value = match self.pop()? {
                    Value::Str(text) => text,
                    _ => return Err(EvalError::TypeMismatch { expected: "string" }),
                };
                let key = self.pop_int()?;
                let Value::MapRef(field) = self.pop()? else {
                    return Err(EvalError::TypeMismatch { expected: "map" });
                };
                let crate::FieldCell::Map(map) = self.instance.cell(field)? else {
                    return Err(EvalError::TypeMismatch { expected: "map" });
                };
                map.lock().insert(key, value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cil_image::{ImageParam, ImageType, TypeFlags};
    use pretty_assertions::assert_eq;

    fn property_type() -> ImageType {
        let mut ty = ImageType::new("N", "T", TypeFlags::PUBLIC);
        let field = ty.push_field(cil_synth::property_backing_field("P"));
        ty.push_method(ImageMethod {
            name: "get_P".to_string(),
            flags: cil_synth::accessor_flags(false),
            ret: TypeSig::String,
            params: Vec::new(),
            body: cil_synth::property_getter_body(field),
        });
        ty.push_method(ImageMethod {
            name: "set_P".to_string(),
            flags: cil_synth::accessor_flags(false),
            ret: TypeSig::Void,
            params: vec![ImageParam::new("value", TypeSig::String)],
            body: cil_synth::property_setter_body(field),
        });
        ty
    }

    #[test]
    fn test_property_round_trip() {
        let ty = property_type();
        let table = DelegateTable::new();
        let instance = Instance::new(&ty);
        instance
            .call(&table, "set_P", &[Value::Str("hello".to_string())])
            .unwrap();
        let got = instance.call(&table, "get_P", &[]).unwrap();
        assert_eq!(got, Value::Str("hello".to_string()));
    }

    #[test]
    fn test_runtime_body_is_not_executable() {
        let mut ty = ImageType::new("N", "D", TypeFlags::PUBLIC);
        for member in cil_synth::delegate_members() {
            ty.push_method(member);
        }
        let table = DelegateTable::new();
        let instance = Instance::new(&ty);
        let err = instance.call(&table, "Invoke", &[]);
        assert_eq!(err, Err(EvalError::NotExecutable("Invoke".to_string())));
    }

    #[test]
    fn test_event_add_then_remove() {
        let mut ty = ImageType::new("N", "T", TypeFlags::PUBLIC);
        let field = ty.push_field(cil_synth::event_backing_field("E"));
        ty.push_method(ImageMethod {
            name: "add_E".to_string(),
            flags: cil_synth::accessor_flags(false),
            ret: TypeSig::Void,
            params: vec![ImageParam::new("value", TypeSig::Handler)],
            body: cil_synth::event_adder_body(field),
        });
        ty.push_method(ImageMethod {
            name: "remove_E".to_string(),
            flags: cil_synth::accessor_flags(false),
            ret: TypeSig::Void,
            params: vec![ImageParam::new("value", TypeSig::Handler)],
            body: cil_synth::event_remover_body(field),
        });
        let table = DelegateTable::new();
        let instance = Instance::new(&ty);
        let first = table.singleton(11);
        let second = table.singleton(22);
        instance.call(&table, "add_E", &[Value::Handler(first)]).unwrap();
        instance
            .call(&table, "add_E", &[Value::Handler(second)])
            .unwrap();
        let id = instance.handler_field("E").unwrap();
        assert_eq!(table.handlers(id), vec![11, 22]);
        instance
            .call(&table, "remove_E", &[Value::Handler(first)])
            .unwrap();
        let id = instance.handler_field("E").unwrap();
        assert_eq!(table.handlers(id), vec![22]);
    }
}

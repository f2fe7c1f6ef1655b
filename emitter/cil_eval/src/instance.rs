//! Instances of image classes.

use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use cil_image::{ImageType, TypeSig};

use crate::delegates::DelegateTable;
use crate::{EvalError, Value};

/// Storage for one instance field.
#[derive(Debug)]
pub enum FieldCell {
    Str(Mutex<String>),
    Int(Mutex<i32>),
    Map(Mutex<FxHashMap<i32, String>>),
    /// Event backing storage: an atomic delegate-list id. This is the slot
    /// the generated compare-exchange operates on.
    Handler(AtomicU32),
    /// A signature the interpreter has no storage model for.
    Opaque,
}

impl FieldCell {
    fn for_sig(sig: &TypeSig) -> FieldCell {
        match sig {
            TypeSig::String => FieldCell::Str(Mutex::new(String::new())),
            TypeSig::Int32 => FieldCell::Int(Mutex::new(0)),
            TypeSig::StringMap => FieldCell::Map(Mutex::new(FxHashMap::default())),
            TypeSig::Handler => FieldCell::Handler(AtomicU32::new(0)),
            TypeSig::Void
            | TypeSig::Object
            | TypeSig::NativeInt
            | TypeSig::AsyncCallback
            | TypeSig::AsyncResult
            | TypeSig::Named(_) => FieldCell::Opaque,
        }
    }
}

/// A constructed instance of an image class.
///
/// Field cells are individually synchronized, so a shared instance may be
/// driven from several threads — which is the whole point for the event
/// accessor stress scenarios.
pub struct Instance<'a> {
    ty: &'a ImageType,
    cells: Vec<FieldCell>,
}

impl<'a> Instance<'a> {
    /// Construct with default field values.
    pub fn new(ty: &'a ImageType) -> Self {
        Instance {
            ty,
            cells: ty.fields.iter().map(|f| FieldCell::for_sig(&f.sig)).collect(),
        }
    }

    /// The instance's type.
    pub fn ty(&self) -> &'a ImageType {
        self.ty
    }

    pub(crate) fn cell(&self, index: u16) -> Result<&FieldCell, EvalError> {
        self.cells
            .get(index as usize)
            .ok_or(EvalError::BadField(index))
    }

    /// Read a field as a stack value.
    pub fn load_field(&self, index: u16) -> Result<Value, EvalError> {
        Ok(match self.cell(index)? {
            FieldCell::Str(cell) => Value::Str(cell.lock().clone()),
            FieldCell::Int(cell) => Value::Int(*cell.lock()),
            FieldCell::Map(_) => Value::MapRef(index),
            FieldCell::Handler(cell) => Value::Handler(cell.load(Ordering::SeqCst)),
            FieldCell::Opaque => {
                return Err(EvalError::TypeMismatch {
                    expected: "loadable field",
                })
            }
        })
    }

    /// Store a stack value into a field.
    pub fn store_field(&self, index: u16, value: Value) -> Result<(), EvalError> {
        match (self.cell(index)?, value) {
            (FieldCell::Str(cell), Value::Str(text)) => *cell.lock() = text,
            (FieldCell::Int(cell), Value::Int(n)) => *cell.lock() = n,
            (FieldCell::Handler(cell), Value::Handler(id)) => cell.store(id, Ordering::SeqCst),
            (FieldCell::Handler(cell), Value::Null) => cell.store(0, Ordering::SeqCst),
            _ => {
                return Err(EvalError::TypeMismatch {
                    expected: "storable field value",
                })
            }
        }
        Ok(())
    }

    /// Atomically compare-exchange a handler field.
    ///
    /// Returns the previous id, success or not — the generated loop decides
    /// whether to retry by comparing it against its comparand.
    pub fn compare_exchange_handler(
        &self,
        index: u16,
        new: u32,
        comparand: u32,
    ) -> Result<u32, EvalError> {
        let FieldCell::Handler(cell) = self.cell(index)? else {
            return Err(EvalError::TypeMismatch {
                expected: "handler field",
            });
        };
        Ok(
            match cell.compare_exchange(comparand, new, Ordering::SeqCst, Ordering::SeqCst) {
                Ok(previous) | Err(previous) => previous,
            },
        )
    }

    /// Current delegate-list id of a named handler field.
    pub fn handler_field(&self, name: &str) -> Option<u32> {
        let index = self.ty.fields.iter().position(|f| f.name == name)?;
        match self.cells.get(index)? {
            FieldCell::Handler(cell) => Some(cell.load(Ordering::SeqCst)),
            _ => None,
        }
    }

    /// Invoke a method by name.
    pub fn call(
        &self,
        table: &DelegateTable,
        method: &str,
        args: &[Value],
    ) -> Result<Value, EvalError> {
        let found = self
            .ty
            .methods
            .iter()
            .find(|m| m.name == method)
            .ok_or_else(|| EvalError::NoSuchMethod(method.to_string()))?;
        crate::exec::run(self, table, found, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cil_image::TypeFlags;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cells_match_field_sigs() {
        let mut ty = ImageType::new("N", "T", TypeFlags::PUBLIC);
        ty.push_field(cil_image::ImageField {
            name: "s".to_string(),
            flags: cil_image::FieldFlags::PRIVATE,
            sig: TypeSig::String,
            literal: None,
        });
        ty.push_field(cil_image::ImageField {
            name: "h".to_string(),
            flags: cil_image::FieldFlags::PRIVATE,
            sig: TypeSig::Handler,
            literal: None,
        });
        let instance = Instance::new(&ty);
        assert_eq!(instance.load_field(0), Ok(Value::Str(String::new())));
        assert_eq!(instance.load_field(1), Ok(Value::Handler(0)));
        assert_eq!(instance.load_field(9), Err(EvalError::BadField(9)));
    }

    #[test]
    fn test_compare_exchange_semantics() {
        let mut ty = ImageType::new("N", "T", TypeFlags::PUBLIC);
        ty.push_field(cil_image::ImageField {
            name: "h".to_string(),
            flags: cil_image::FieldFlags::PRIVATE,
            sig: TypeSig::Handler,
            literal: None,
        });
        let instance = Instance::new(&ty);
        // Matching comparand swaps and reports the old value.
        assert_eq!(instance.compare_exchange_handler(0, 5, 0), Ok(0));
        // Stale comparand fails and reports the current value.
        assert_eq!(instance.compare_exchange_handler(0, 9, 0), Ok(5));
        assert_eq!(instance.handler_field("h"), Some(5));
    }
}

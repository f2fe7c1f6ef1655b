//! Backend contract for the cilgen emission engine.
//!
//! One capability, three independent implementations (strategy pattern):
//! given a populated `AssemblyDef`, produce a module image at a path.
//! Backends are scoped resources — whatever session state they hold is
//! released in `Drop` on every exit path, success or failure.
//!
//! Also here: the emission error taxonomy and the external type resolver
//! seam with its in-tree platform default.

pub mod attrs;
mod error;
mod resolver;

pub use error::EmitError;
pub use resolver::{ExternalKind, ExternalType, PlatformResolver, TypeResolver};

use std::path::PathBuf;

use cil_image::ModuleKind;
use cil_model::AssemblyDef;

/// One emission strategy.
///
/// `emit` is all-or-nothing: on failure nothing loadable is promised at the
/// output path, the error propagates unmodified, and the backend does not
/// retry. Implementations hold backend-specific state behind this interface
/// and release it in `Drop`.
pub trait ModuleBackend {
    /// Short stable identifier, used in artifact names and diagnostics.
    fn name(&self) -> &'static str;

    /// Emit the assembly, returning the path of the produced module image.
    fn emit(&mut self, assembly: &AssemblyDef) -> Result<PathBuf, EmitError>;
}

/// Module kind derived from the model's executable/GUI pair.
///
/// Backend-independent: all strategies stamp the same kind for the same
/// model.
pub fn module_kind(assembly: &AssemblyDef) -> ModuleKind {
    if assembly.is_exe {
        if assembly.is_gui {
            ModuleKind::Gui
        } else {
            ModuleKind::Console
        }
    } else {
        ModuleKind::Library
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_kind() {
        let lib = AssemblyDef::new("A");
        assert_eq!(module_kind(&lib), ModuleKind::Library);
        let exe = AssemblyDef::new("A").exe();
        assert_eq!(module_kind(&exe), ModuleKind::Console);
        let mut gui = AssemblyDef::new("A").exe();
        gui.is_gui = true;
        assert_eq!(module_kind(&gui), ModuleKind::Gui);
    }
}

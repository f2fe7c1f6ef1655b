//! The in-tree subset compiler, default `SourceCompiler` collaborator.

mod lower;
mod parse;
mod scan;

use std::fmt;

use cil_image::{ModuleImage, ModuleKind};

/// A compilation failure with its source line (0 when no line applies).
///
/// The message travels verbatim into the backend's build error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct CompileError {
    pub line: usize,
    pub message: String,
}

impl CompileError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        CompileError {
            line,
            message: message.into(),
        }
    }
}

/// Compile parameters the source itself does not carry.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    pub assembly_name: String,
    pub file_name: String,
    pub kind: ModuleKind,
    pub architecture: Option<String>,
    pub resources: Vec<(String, Vec<u8>)>,
    pub entry_point: Option<String>,
}

impl fmt::Display for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/target:{} /out:{}",
            self.kind.label(),
            self.file_name
        )
    }
}

/// Compiles declaration source into a module image.
pub trait SourceCompiler {
    /// Compile `source` under `options`.
    fn compile(&self, source: &str, options: &CompileOptions)
        -> Result<ModuleImage, CompileError>;
}

/// The in-tree compiler for the subset dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubsetCompiler;

impl SourceCompiler for SubsetCompiler {
    fn compile(
        &self,
        source: &str,
        options: &CompileOptions,
    ) -> Result<ModuleImage, CompileError> {
        let tokens = scan::scan(source)?;
        let unit = parse::Parser::new(tokens).parse_unit()?;
        lower::lower(&unit, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cil_image::{MethodBody, TypeSig};
    use pretty_assertions::assert_eq;

    fn options() -> CompileOptions {
        CompileOptions {
            assembly_name: "Probe".to_string(),
            file_name: "Probe.dll".to_string(),
            kind: ModuleKind::Library,
            architecture: None,
            resources: Vec::new(),
            entry_point: None,
        }
    }

    #[test]
    fn test_compile_class_with_defaults() {
        let source = "namespace N\n{\n    public class C\n    {\n        public string P { get; set; }\n        public event EventHandler E;\n    }\n}\n";
        let image = SubsetCompiler.compile(source, &options()).unwrap();
        let ty = &image.types[0];
        assert!(ty
            .fields
            .iter()
            .any(|f| f.name == "<P>k__BackingField" && f.sig == TypeSig::String));
        assert!(ty.fields.iter().any(|f| f.name == "E" && f.sig == TypeSig::Handler));
        let adder = ty.methods.iter().find(|m| m.name == "add_E").unwrap();
        let MethodBody::Il { locals, .. } = &adder.body else {
            panic!("field-like event must synthesize a body");
        };
        assert_eq!(locals.len(), 3);
        // The compiler appends the implicit default constructor.
        assert!(ty.methods.iter().any(|m| m.name == ".ctor"));
    }

    #[test]
    fn test_compile_version_attribute_sets_identity() {
        let source = "[assembly: AssemblyVersion(\"2.1.0.0\")]\n";
        let image = SubsetCompiler.compile(source, &options()).unwrap();
        assert_eq!(image.version, [2, 1, 0, 0]);
        // AssemblyVersion is identity, not a recorded custom attribute.
        assert!(image.attributes.is_empty());
    }

    #[test]
    fn test_compile_error_is_diagnosable() {
        let source = "namespace N\n{\n    public class C\n    {\n        public string P { get; }\n    }\n}\n";
        let err = SubsetCompiler.compile(source, &options());
        let Err(err) = err else {
            panic!("compile must fail");
        };
        assert_eq!(err.line, 5);
        assert!(err.message.contains("get and set"));
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let source = "[assembly: Sparkle(\"x\")]\n";
        let err = SubsetCompiler.compile(source, &options());
        assert!(err.is_err());
    }
}

//! Source-compiling backend.
//!
//! Generates declaration-level source text for the model, hands it to a
//! `SourceCompiler` collaborator (the in-tree subset compiler by default),
//! and serializes the compiled image. Compiler diagnostics propagate
//! verbatim inside the build error — there is no retry and no repair.
//!
//! Ordering profile of this strategy (absorbed by the normalizer): members
//! lower in generated-source order, which interleaves kinds by member name;
//! accessors record get/add first; attributes follow the generator's fixed
//! source order.

mod dialect;
mod generate;

pub mod compile;

pub use compile::{CompileError, CompileOptions, SourceCompiler, SubsetCompiler};
pub use generate::generate;

use std::path::PathBuf;

use cil_backend::{module_kind, EmitError, ModuleBackend, PlatformResolver, TypeResolver};
use cil_model::AssemblyDef;

/// The source-compiling emission strategy.
pub struct SrcBackend {
    resolver: Box<dyn TypeResolver>,
    compiler: Box<dyn SourceCompiler>,
    out_dir: PathBuf,
}

impl SrcBackend {
    /// Create a backend writing into `out_dir` with the in-tree compiler.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        SrcBackend {
            resolver: Box::new(PlatformResolver),
            compiler: Box::new(SubsetCompiler),
            out_dir: out_dir.into(),
        }
    }

    /// Replace the compiler collaborator.
    pub fn with_compiler(mut self, compiler: Box<dyn SourceCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    /// Replace the type resolver.
    pub fn with_resolver(mut self, resolver: Box<dyn TypeResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    fn options(&self, ass: &AssemblyDef) -> CompileOptions {
        CompileOptions {
            assembly_name: ass.name.clone(),
            file_name: ass.file_name(),
            kind: module_kind(ass),
            architecture: ass.manifest.architecture.map(|a| a.label().to_string()),
            resources: ass
                .resources
                .iter()
                .map(|r| (r.name.clone(), r.bytes()))
                .collect(),
            entry_point: ass.manifest.entry_point.clone(),
        }
    }
}

impl ModuleBackend for SrcBackend {
    fn name(&self) -> &'static str {
        "src"
    }

    fn emit(&mut self, assembly: &AssemblyDef) -> Result<PathBuf, EmitError> {
        let source = generate(assembly, self.resolver.as_ref())?;
        let options = self.options(assembly);
        tracing::debug!(options = %options, "compiling generated source");
        let image = self
            .compiler
            .compile(&source, &options)
            .map_err(|e| EmitError::Build {
                backend: "src",
                details: e.to_string(),
            })?;
        std::fs::create_dir_all(&self.out_dir).map_err(cil_image::ImageError::Io)?;
        let path = self.out_dir.join(assembly.file_name());
        // Keep the generated source next to the artifact for inspection.
        let source_path = path.with_extension("cs");
        std::fs::write(&source_path, &source).map_err(cil_image::ImageError::Io)?;
        cil_image::write_image(&path, &image)?;
        Ok(path)
    }
}

impl Drop for SrcBackend {
    fn drop(&mut self) {
        tracing::debug!("source compiler provider released");
    }
}

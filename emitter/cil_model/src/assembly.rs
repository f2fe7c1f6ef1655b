//! The root assembly entity and its derivation helpers.

use crate::manifest::ManifestDef;
use crate::named_set::NamedSet;
use crate::namespace::{flatten, FlatNamespace, NamespaceDef};
use crate::name_token;
use crate::resource::ResourceDef;
use crate::version::{Version, VersionError};

/// Root description of an assembly to emit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyDef {
    /// Unique assembly identity; defaults to a random 8-hex-char token.
    pub name: String,
    /// Dotted version string; effective default is `1.0.0.0`.
    pub version: Option<String>,
    /// Output file name; effective default is `{name}.{ext}`.
    pub file_name: Option<String>,
    pub is_exe: bool,
    pub is_gui: bool,
    pub manifest: ManifestDef,
    pub resources: NamedSet<ResourceDef>,
    pub namespaces: NamedSet<NamespaceDef>,
}

impl AssemblyDef {
    /// Create an assembly with an explicit name.
    pub fn new(name: impl Into<String>) -> Self {
        AssemblyDef {
            name: name.into(),
            version: None,
            file_name: None,
            is_exe: false,
            is_gui: false,
            manifest: ManifestDef::default(),
            resources: NamedSet::new(),
            namespaces: NamedSet::new(),
        }
    }

    /// Create an assembly with a random default name.
    pub fn anonymous() -> Self {
        AssemblyDef::new(name_token())
    }

    /// Add a top-level namespace.
    pub fn with_namespace(mut self, nsp: NamespaceDef) -> Self {
        self.namespaces.insert(nsp);
        self
    }

    /// Add a resource placeholder.
    pub fn with_resource(mut self, res: ResourceDef) -> Self {
        self.resources.insert(res);
        self
    }

    /// Set the manifest.
    pub fn with_manifest(mut self, manifest: ManifestDef) -> Self {
        self.manifest = manifest;
        self
    }

    /// Mark as an executable module.
    pub fn exe(mut self) -> Self {
        self.is_exe = true;
        self
    }

    /// Output extension: `exe` for executables, `dll` otherwise.
    pub fn ext(&self) -> &'static str {
        if self.is_exe {
            "exe"
        } else {
            "dll"
        }
    }

    /// Module kind label: `exe` or `library`.
    pub fn kind_label(&self) -> &'static str {
        if self.is_exe {
            "exe"
        } else {
            "library"
        }
    }

    /// Effective output file name.
    pub fn file_name(&self) -> String {
        match &self.file_name {
            Some(f) => f.clone(),
            None => format!("{}.{}", self.name, self.ext()),
        }
    }

    /// Effective version string, `1.0.0.0` when unset.
    pub fn effective_version(&self) -> &str {
        self.version.as_deref().unwrap_or("1.0.0.0")
    }

    /// Parse the effective version. Malformed input is the one failure mode
    /// of the derivation layer.
    pub fn parsed_version(&self) -> Result<Version, VersionError> {
        self.effective_version().parse()
    }

    /// Effective file version: the explicit manifest value, or the assembly
    /// version.
    pub fn file_version(&self) -> String {
        match &self.manifest.file_version {
            Some(v) => v.clone(),
            None => self.effective_version().to_string(),
        }
    }

    /// Flattened namespace sequence in emission order.
    pub fn flat_namespaces(&self) -> Vec<FlatNamespace<'_>> {
        flatten(&self.namespaces)
    }
}

impl Default for AssemblyDef {
    fn default() -> Self {
        AssemblyDef::anonymous()
    }
}

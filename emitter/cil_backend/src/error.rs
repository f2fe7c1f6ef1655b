//! Emission error taxonomy.

use cil_image::ImageError;
use cil_model::VersionError;

/// Everything that can abort an emission.
///
/// All variants propagate unmodified to the caller; there is no local
/// recovery or retry anywhere in the emission path.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// Malformed version string in the model.
    #[error("invalid version: {0}")]
    Format(#[from] VersionError),

    /// An external type name could not be resolved.
    #[error("cannot resolve external type `{name}`")]
    Resolution { name: String },

    /// A contract violation at a collaborator boundary — a programming
    /// error, never a recoverable condition.
    #[error("unsupported emission request: {what}")]
    Unsupported { what: String },

    /// The backend's underlying emission step failed; `details` carries the
    /// collaborator's diagnostics verbatim.
    #[error("backend `{backend}` failed to build: {details}")]
    Build {
        backend: &'static str,
        details: String,
    },

    /// Artifact encode/decode/transport failure.
    #[error(transparent)]
    Image(#[from] ImageError),
}

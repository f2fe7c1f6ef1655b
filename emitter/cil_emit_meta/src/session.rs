//! Writer session.

use std::fs;
use std::path::PathBuf;

use cil_backend::EmitError;
use cil_image::{write_image, ModuleImage};

/// A scoped artifact-writing session.
///
/// Opening ensures the output directory exists; the session logs its release
/// when dropped, so every exit path — including emission failure upstream —
/// observably closes it.
pub struct WriterSession {
    path: PathBuf,
}

impl WriterSession {
    /// Open a session for `file_name` under `out_dir`.
    pub fn open(out_dir: &std::path::Path, file_name: &str) -> Result<Self, EmitError> {
        fs::create_dir_all(out_dir).map_err(cil_image::ImageError::Io)?;
        let path = out_dir.join(file_name);
        tracing::debug!(path = %path.display(), "writer session opened");
        Ok(WriterSession { path })
    }

    /// Serialize the image, returning the artifact path.
    pub fn write(&self, image: &ModuleImage) -> Result<PathBuf, EmitError> {
        write_image(&self.path, image)?;
        Ok(self.path.clone())
    }
}

impl Drop for WriterSession {
    fn drop(&mut self) {
        tracing::debug!(path = %self.path.display(), "writer session released");
    }
}

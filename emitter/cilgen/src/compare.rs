//! Cross-backend comparison pipeline.
//!
//! Emit the same model with every backend, disassemble each artifact,
//! canonicalize the listings, and diff every pair. Each backend's emission
//! attempt is independent — one failure does not stop the others — but any
//! failure blocks the comparison step itself.

use std::fs;
use std::path::{Path, PathBuf};

use cil_backend::{EmitError, ModuleBackend};
use cil_canon::{canonicalize, write_diff, DiffReport};

/// One emitted-and-disassembled backend output.
pub struct BackendListing {
    pub backend: &'static str,
    pub artifact: PathBuf,
    pub listing_path: PathBuf,
    pub canonical: String,
}

/// The diff of one backend pair.
pub struct PairReport {
    pub left: &'static str,
    pub right: &'static str,
    pub diff_path: PathBuf,
    pub report: DiffReport,
}

/// Everything a comparison run produced.
pub struct Comparison {
    pub listings: Vec<BackendListing>,
    pub pairs: Vec<PairReport>,
}

impl Comparison {
    /// True when every pair matched exactly.
    pub fn all_match(&self) -> bool {
        self.pairs.iter().all(|p| p.report.is_match())
    }
}

/// Run the comparison flow for `assembly` across `backends`.
///
/// Listings land at `{out_dir}/{name}.{backend}.il`, diff reports at
/// `{out_dir}/{name}.{left}-{right}.diff`.
pub fn compare_backends(
    assembly: &cil_model::AssemblyDef,
    backends: &mut [Box<dyn ModuleBackend>],
    out_dir: &Path,
) -> Result<Comparison, EmitError> {
    fs::create_dir_all(out_dir).map_err(cil_image::ImageError::Io)?;
    let stem = assembly.name.clone();

    // Every backend gets its independent attempt before any failure
    // propagates.
    let mut listings = Vec::new();
    let mut first_failure = None;
    for backend in backends.iter_mut() {
        match emit_one(assembly, backend.as_mut(), out_dir, &stem) {
            Ok(listing) => listings.push(listing),
            Err(error) => {
                tracing::warn!(backend = backend.name(), %error, "backend emission failed");
                if first_failure.is_none() {
                    first_failure = Some(error);
                }
            }
        }
    }
    if let Some(error) = first_failure {
        return Err(error);
    }

    let mut pairs = Vec::new();
    for i in 0..listings.len() {
        for j in (i + 1)..listings.len() {
            let (left, right) = (&listings[i], &listings[j]);
            let diff_path = out_dir.join(format!("{stem}.{}-{}.diff", left.backend, right.backend));
            let report = write_diff(&left.canonical, &right.canonical, &diff_path)
                .map_err(cil_image::ImageError::Io)?;
            pairs.push(PairReport {
                left: left.backend,
                right: right.backend,
                diff_path,
                report,
            });
        }
    }
    Ok(Comparison { listings, pairs })
}

fn emit_one(
    assembly: &cil_model::AssemblyDef,
    backend: &mut dyn ModuleBackend,
    out_dir: &Path,
    stem: &str,
) -> Result<BackendListing, EmitError> {
    let artifact = backend.emit(assembly)?;
    let image = cil_image::read_image(&artifact)?;
    let raw = cil_dis::disassemble(&image);
    let listing_path = out_dir.join(format!("{stem}.{}.il", backend.name()));
    fs::write(&listing_path, &raw).map_err(cil_image::ImageError::Io)?;
    tracing::debug!(backend = backend.name(), listing = %listing_path.display(), "listing written");
    Ok(BackendListing {
        backend: backend.name(),
        artifact,
        listing_path,
        canonical: canonicalize(&raw),
    })
}

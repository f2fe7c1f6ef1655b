//! CLI command implementations.

use std::path::{Path, PathBuf};

use cil_backend::ModuleBackend;
use cil_emit_build::BuilderBackend;
use cil_emit_meta::MetaBackend;
use cil_emit_src::SrcBackend;

use crate::compare::compare_backends;
use crate::demo;

/// Instantiate a backend by CLI name.
pub fn backend_by_name(name: &str, out_dir: &Path) -> Option<Box<dyn ModuleBackend>> {
    match name {
        "meta" => Some(Box::new(MetaBackend::new(out_dir))),
        "build" => Some(Box::new(BuilderBackend::new(out_dir))),
        "src" => Some(Box::new(SrcBackend::new(out_dir))),
        _ => None,
    }
}

/// All backends, each writing under its own subdirectory of `out_dir`.
pub fn all_backends(out_dir: &Path) -> Vec<Box<dyn ModuleBackend>> {
    vec![
        Box::new(MetaBackend::new(out_dir.join("meta"))),
        Box::new(BuilderBackend::new(out_dir.join("build"))),
        Box::new(SrcBackend::new(out_dir.join("src"))),
    ]
}

/// `cilgen emit <backend> [out_dir]`: emit the demo model once.
pub fn emit_command(backend_name: &str, out_dir: &Path) -> Result<PathBuf, String> {
    let mut backend =
        backend_by_name(backend_name, out_dir).ok_or_else(|| {
            format!("unknown backend `{backend_name}` (expected meta, build, or src)")
        })?;
    let assembly = demo::demo_assembly("TestGen");
    backend
        .emit(&assembly)
        .map_err(|e| format!("emission failed: {e}"))
}

/// `cilgen compare [out_dir]`: emit with every backend and verify zero
/// normalized difference between every pair.
pub fn compare_command(out_dir: &Path) -> Result<(), String> {
    let assembly = demo::verification_assembly("TestMod");
    let mut backends = all_backends(out_dir);
    let comparison = compare_backends(&assembly, &mut backends, out_dir)
        .map_err(|e| format!("comparison failed: {e}"))?;
    for listing in &comparison.listings {
        println!("{:>6}  {}", listing.backend, listing.listing_path.display());
    }
    let mut clean = true;
    for pair in &comparison.pairs {
        let verdict = if pair.report.is_match() {
            "match"
        } else {
            clean = false;
            "DIFFERS"
        };
        println!(
            "{:>6}  {} vs {} ({} inserts, {} deletes) -> {}",
            verdict,
            pair.left,
            pair.right,
            pair.report.inserts,
            pair.report.deletes,
            pair.diff_path.display()
        );
    }
    if clean {
        Ok(())
    } else {
        Err("backend outputs differ after normalization".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_by_name() {
        let dir = std::env::temp_dir();
        assert!(backend_by_name("meta", &dir).is_some());
        assert!(backend_by_name("build", &dir).is_some());
        assert!(backend_by_name("src", &dir).is_some());
        assert!(backend_by_name("native", &dir).is_none());
    }
}

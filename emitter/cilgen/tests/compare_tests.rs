#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Cross-backend equivalence verification.
//!
//! The same model goes through all three emission strategies; each artifact
//! is disassembled, canonicalized, and diffed pairwise. Equivalence means
//! zero inserted and zero deleted lines for every pair.

use std::path::PathBuf;

use pretty_assertions::assert_eq;

use cil_backend::{EmitError, ModuleBackend};
use cil_canon::canonicalize;
use cilgen::commands::{all_backends, backend_by_name};
use cilgen::compare::compare_backends;
use cilgen::demo::{demo_assembly, verification_assembly};

fn emit_with(backend_name: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = backend_by_name(backend_name, dir.path()).unwrap();
    let path = backend.emit(&demo_assembly("TestGen")).unwrap();
    (dir, path)
}

#[test]
fn should_emit_meta() {
    let (_dir, path) = emit_with("meta");
    assert!(path.exists());
    assert!(cil_image::read_image(&path).is_ok());
}

#[test]
fn should_emit_build() {
    let (_dir, path) = emit_with("build");
    assert!(path.exists());
    assert!(cil_image::read_image(&path).is_ok());
}

#[test]
fn should_emit_src() {
    let (_dir, path) = emit_with("src");
    assert!(path.exists());
    assert!(cil_image::read_image(&path).is_ok());
}

#[test]
fn should_compare_il_output() {
    let dir = tempfile::tempdir().unwrap();
    let assembly = verification_assembly("TestMod");
    let mut backends = all_backends(dir.path());
    let comparison = compare_backends(&assembly, &mut backends, dir.path()).unwrap();

    assert_eq!(comparison.listings.len(), 3);
    assert_eq!(comparison.pairs.len(), 3);
    for listing in &comparison.listings {
        assert!(listing.listing_path.exists());
        assert!(listing.artifact.exists());
    }
    for pair in &comparison.pairs {
        assert!(pair.diff_path.exists());
        assert!(
            pair.report.is_match(),
            "{} vs {} differ:\n{}",
            pair.left,
            pair.right,
            pair.report.render()
        );
    }
    assert!(comparison.all_match());
}

#[test]
fn should_compare_executable_with_entry_point() {
    let dir = tempfile::tempdir().unwrap();
    let mut assembly = verification_assembly("ExeMod").exe();
    assembly.manifest.entry_point = Some("Auto.MyC.Run".to_string());
    let mut backends = all_backends(dir.path());
    let comparison = compare_backends(&assembly, &mut backends, dir.path()).unwrap();
    assert!(comparison.all_match());
    for listing in &comparison.listings {
        let image = cil_image::read_image(&listing.artifact).unwrap();
        assert!(image.entry_point.is_some(), "{} lost the entry point", listing.backend);
    }
}

#[test]
fn normalization_is_idempotent_on_real_listings() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = backend_by_name("meta", dir.path()).unwrap();
    let path = backend.emit(&verification_assembly("Idem")).unwrap();
    let listing = cil_dis::disassemble(&cil_image::read_image(&path).unwrap());
    let once = canonicalize(&listing);
    assert_eq!(canonicalize(&once), once);
}

struct BrokenBackend;

impl ModuleBackend for BrokenBackend {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn emit(&mut self, _assembly: &cil_model::AssemblyDef) -> Result<PathBuf, EmitError> {
        Err(EmitError::Build {
            backend: "broken",
            details: "synthetic backend failure".to_string(),
        })
    }
}

#[test]
fn one_failing_backend_blocks_comparison_but_not_other_emissions() {
    let dir = tempfile::tempdir().unwrap();
    let assembly = verification_assembly("Partial");
    let mut backends: Vec<Box<dyn ModuleBackend>> = vec![
        Box::new(BrokenBackend),
        Box::new(cil_emit_meta::MetaBackend::new(dir.path().join("meta"))),
    ];
    let result = compare_backends(&assembly, &mut backends, dir.path());
    let Err(EmitError::Build { backend, details }) = result else {
        panic!("comparison must surface the backend failure");
    };
    assert_eq!(backend, "broken");
    assert_eq!(details, "synthetic backend failure");
    // The healthy backend still made its independent attempt.
    assert!(dir.path().join("meta").join("Partial.dll").exists());
}

#[test]
fn unresolvable_base_surfaces_as_resolution_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut assembly = verification_assembly("BadBase");
    assembly.namespaces = [cil_model::NamespaceDef::new("N")
        .with_type(cil_model::TypeDef::class_with_base("C", "Contoso.Widget"))]
    .into_iter()
    .collect();
    let mut backends = all_backends(dir.path());
    let result = compare_backends(&assembly, &mut backends, dir.path());
    assert!(matches!(result, Err(EmitError::Resolution { .. })));
}

//! cilgen driver library.
//!
//! Glue over the emission engine: demonstration models, backend selection,
//! and the emit/compare flows behind the CLI. The interesting machinery
//! lives in the member crates; this one only sequences it.

pub mod commands;
pub mod compare;
pub mod demo;

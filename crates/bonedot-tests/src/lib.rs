//! BoneDot End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the two BoneDot flows:
//!
//! - Cut: PNG → silhouette → cutter mesh → host cut
//! - Export: scene document → skeleton + baked animation → `.bdsket`
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bonedot-tests
//! ```
//!
//! The [`fixtures`] module writes PNGs and scene documents into temporary
//! directories; [`determinism`] checks that repeated runs produce
//! byte-identical output.

pub mod determinism;
pub mod fixtures;

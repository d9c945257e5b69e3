//! BoneDot CLI library.
//!
//! Command implementations, scene/config loading and log setup for the
//! `bonedot` binary.

pub mod commands;
pub mod input;
pub mod logging;

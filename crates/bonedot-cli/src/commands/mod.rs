//! CLI command implementations

pub mod cutter;
pub mod export;
pub mod sprite;
pub mod trace;
pub mod triangulate;
pub mod uv_sync;
pub mod validate;

mod reporting;

//! Panelpack Core Library
//!
//! Batch helper for comic e-books. Each input is converted to a zip by an
//! external converter, its page images are extracted into a numbered folder,
//! and that folder is optionally repacked into a device-optimized book by an
//! external packer. The heavy lifting happens in those tools; this crate
//! locates them, drives them, and reports what happened.

pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod repack;
pub mod tool;
pub mod unpack;

pub use config::PipelineConfig;
pub use error::{PanelpackError, Result};
pub use pipeline::{BatchSummary, FileReport, Pipeline};
pub use repack::{RepackOutcome, Repacker};
pub use tool::{find_executable, SystemRunner, ToolOutput, ToolRunner};
pub use unpack::{UnpackOutcome, Unpacker};

//! Operations module
//!
//! Coordinates document assembly, statistics and output writing

pub mod assemble;
pub mod generate;
pub mod output;
pub mod stats;

pub use assemble::{CategoryDirectories, ConfigAssembler};
pub use generate::{GenerateOperation, SourceMode};
pub use output::{OutputPaths, render_document, write_output};
pub use stats::Stats;

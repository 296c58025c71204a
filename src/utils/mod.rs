//! Shared helpers: identifier patterns, path handling and log redaction

pub mod path;
pub mod patterns;
pub mod redact;

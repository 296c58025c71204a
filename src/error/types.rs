//! Custom error types with exit codes

use thiserror::Error;

/// Main error type for clashgraft operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MergeError {
    /// Configuration Error - missing credential or invalid settings
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Source Error - a mandatory category produced no usable documents
    #[error("Source error: {message}")]
    Source { message: String },

    /// Network Error - HTTP request failed
    #[error("Network error: {message}")]
    Network { message: String },

    /// Serialization Error - the merged document could not be rendered
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Filesystem Error - file operation failed
    #[error("Filesystem error: {message}")]
    Filesystem { message: String },
}

impl MergeError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Configuration { .. } => 1,
            Self::Source { .. } => 2,
            Self::Network { .. } => 3,
            Self::Serialization { .. } => 4,
            Self::Filesystem { .. } => 5,
        }
    }

    /// Create a configuration error
    #[inline]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a source error
    #[inline]
    pub fn from_source<S: Into<String>>(message: S) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create a network error
    #[inline]
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a serialization error
    #[inline]
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a filesystem error
    #[inline]
    pub fn filesystem<S: Into<String>>(message: S) -> Self {
        Self::Filesystem {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            MergeError::configuration("x").exit_code(),
            MergeError::from_source("x").exit_code(),
            MergeError::network("x").exit_code(),
            MergeError::serialization("x").exit_code(),
            MergeError::filesystem("x").exit_code(),
        ];
        assert_eq!(codes, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn display_includes_category() {
        let err = MergeError::configuration("GITHUB_TOKEN is not set");
        assert_eq!(
            err.to_string(),
            "Configuration error: GITHUB_TOKEN is not set"
        );
    }
}

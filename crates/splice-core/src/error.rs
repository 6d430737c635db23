//! Error types for tree construction and structural edits

use std::path::PathBuf;
use thiserror::Error;

use crate::syntax::SyntaxKind;

/// Main error type for splice operations
#[derive(Debug, Error)]
pub enum SpliceError {
    /// Insertion requested at a line the list does not offer
    #[error("Line {line} is not available for insertion (available: {available:?})")]
    LineUnavailable { line: usize, available: Vec<usize> },

    /// A container was handed a node whose kind it does not accept
    #[error("{container} cannot hold a {found} node")]
    KindMismatch {
        container: SyntaxKind,
        found: SyntaxKind,
    },

    /// Removal or lookup on a container that has nothing to remove
    #[error("{container} has no element to remove")]
    EmptyContainer { container: SyntaxKind },

    /// The node is not an element of the container it was removed from
    #[error("Node is not an element of {container}")]
    NotAnElement { container: SyntaxKind },

    /// Index-based insertion outside `0..=len`
    #[error("Index {index} is out of bounds for {container} with {len} elements")]
    IndexOutOfBounds {
        container: SyntaxKind,
        index: usize,
        len: usize,
    },

    /// The node's kind has a different shape than the requested handle
    #[error("{kind} is not a {expected} container")]
    WrongShape {
        kind: SyntaxKind,
        expected: &'static str,
    },

    /// The root of a tree cannot be detached from it
    #[error("The root node cannot be removed")]
    RootRemoval,

    /// Tree construction failures (unbalanced builder, bad offsets)
    #[error("Build error: {message}")]
    BuildError { message: String },

    /// Malformed parse tree handed to the converter
    #[error("Conversion error: {message}")]
    ConversionError { message: String },

    /// No frontend registered for a language
    #[error("No parser frontend registered for {language}")]
    MissingFrontend { language: String },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Precondition violated by the caller of an edit operation
    Contract,
    Build,
    Conversion,
    Frontend,
    Config,
    Io,
    Internal,
}

impl SpliceError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SpliceError::LineUnavailable { .. }
            | SpliceError::KindMismatch { .. }
            | SpliceError::EmptyContainer { .. }
            | SpliceError::NotAnElement { .. }
            | SpliceError::IndexOutOfBounds { .. }
            | SpliceError::WrongShape { .. }
            | SpliceError::RootRemoval => ErrorKind::Contract,
            SpliceError::BuildError { .. } => ErrorKind::Build,
            SpliceError::ConversionError { .. } => ErrorKind::Conversion,
            SpliceError::MissingFrontend { .. } => ErrorKind::Frontend,
            SpliceError::ConfigError { .. } => ErrorKind::Config,
            SpliceError::IoError { .. } => ErrorKind::Io,
            SpliceError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Whether a caller can retry with a different request.
    ///
    /// Contract errors leave the tree untouched, so the edit can be
    /// re-planned against `available_lines()` / `can_add()`.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Contract)
    }

    /// Create a line-unavailable error
    pub fn line_unavailable(line: usize, available: Vec<usize>) -> Self {
        Self::LineUnavailable { line, available }
    }

    /// Create a kind mismatch error
    pub fn kind_mismatch(container: SyntaxKind, found: SyntaxKind) -> Self {
        Self::KindMismatch { container, found }
    }

    /// Create an empty container error
    pub fn empty_container(container: SyntaxKind) -> Self {
        Self::EmptyContainer { container }
    }

    pub fn wrong_shape(kind: SyntaxKind, expected: &'static str) -> Self {
        Self::WrongShape { kind, expected }
    }

    /// Create a build error
    pub fn build_error(message: impl Into<String>) -> Self {
        Self::BuildError {
            message: message.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion_error(message: impl Into<String>) -> Self {
        Self::ConversionError {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for SpliceError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_errors_are_recoverable() {
        let err = SpliceError::line_unavailable(4, vec![1, 2]);
        assert_eq!(err.kind(), ErrorKind::Contract);
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Line 4 is not available for insertion (available: [1, 2])"
        );
    }

    #[test]
    fn test_kind_mismatch_message() {
        let err = SpliceError::kind_mismatch(SyntaxKind::ArgumentList, SyntaxKind::Class);
        assert_eq!(err.to_string(), "argument_list cannot hold a class node");
    }

    #[test]
    fn test_config_errors_are_fatal() {
        let err = SpliceError::config_error("unknown key `maxEntry`");
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_internal_errors_are_fatal() {
        let err = SpliceError::internal_error("dangling token");
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.is_recoverable());
    }
}

//! Error types and exit codes for godef.
//!
//! `GodefError` is the single error type the CLI reports. Crate-local errors
//! (parse, locate, import, constraint errors) bridge into it with `From`
//! impls next to their definitions.
//!
//! ## Exit Codes
//!
//! - `2`: Invalid arguments (no query, bad flags, unusable expression)
//! - `3`: Resolution errors (nothing at the offset, no declaration, bad import)
//! - `4`: Source errors (unreadable or unparseable input)
//! - `10`: Internal errors

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from the caller.
    InvalidArguments = 2,
    /// The query could not be resolved to a declaration.
    ResolutionError = 3,
    /// The source could not be read or parsed.
    SourceError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GodefError {
    /// Neither an expression nor a non-negative offset was given.
    #[error("no expression or offset specified")]
    NoQuerySpecified,

    #[error("cannot read {path}: {reason}")]
    ReadFailure { path: String, reason: String },

    #[error("cannot parse {file}: {message}")]
    ParseFailure { file: String, message: String },

    /// The expression query did not parse, or is not an identifier or
    /// selector.
    #[error("{message}")]
    UnresolvableExpression { message: String },

    #[error("invalid string literal {literal:?} in import spec")]
    MalformedImportLiteral { literal: String },

    #[error("error finding import path for {path}: {reason}")]
    ImportPathNotFound { path: String, reason: String },

    #[error("no declaration found for {expr}")]
    NoDeclarationFound { expr: String },

    /// Nothing resolvable at the requested offset.
    #[error("no identifier found")]
    NotFound,

    /// No sibling file could be added to the package.
    #[error("no more package files found")]
    NoMoreFiles,

    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("{message}")]
    Output { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&GodefError> for OutputErrorCode {
    fn from(err: &GodefError) -> Self {
        match err {
            GodefError::NoQuerySpecified
            | GodefError::InvalidArguments { .. }
            | GodefError::UnresolvableExpression { .. } => OutputErrorCode::InvalidArguments,
            GodefError::NotFound
            | GodefError::NoDeclarationFound { .. }
            | GodefError::ImportPathNotFound { .. }
            | GodefError::MalformedImportLiteral { .. } => OutputErrorCode::ResolutionError,
            GodefError::ReadFailure { .. } | GodefError::ParseFailure { .. } => {
                OutputErrorCode::SourceError
            }
            GodefError::Output { .. } | GodefError::NoMoreFiles => OutputErrorCode::InternalError,
        }
    }
}

impl From<GodefError> for OutputErrorCode {
    fn from(err: GodefError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl GodefError {
    pub fn invalid_args(message: impl Into<String>) -> Self {
        GodefError::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn read_failure(path: impl Into<String>, reason: impl fmt::Display) -> Self {
        GodefError::ReadFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn unresolvable(message: impl Into<String>) -> Self {
        GodefError::UnresolvableExpression {
            message: message.into(),
        }
    }

    pub fn output(message: impl Into<String>) -> Self {
        GodefError::Output {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

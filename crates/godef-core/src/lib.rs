//! Core types for godef.
//!
//! This crate provides the pieces shared by the syntax engine, the resolver
//! and the CLI:
//! - The resolved definition and its source position
//! - Formatting of a definition into plain or JSON output
//! - Error types and exit codes
//! - Text utilities (exported names, rune offsets)

pub mod error;
pub mod output;
pub mod text;
pub mod types;

pub use error::{GodefError, OutputErrorCode};
pub use output::{format_definition, type_line, write_definition, OutputOptions};
pub use types::{Definition, Kind, Position};

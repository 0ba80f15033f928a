//! godef: go to definition for Go source.
//!
//! This crate provides the `godef` binary. Resolution lives in
//! `godef-engine`; this crate reads the source and prints the result.
//!
//! ## Modules
//!
//! - `cli` - Query execution for one command line
//! - `input` - Source providers (file, stdin, editor buffer)

pub mod cli;
pub mod input;

pub use cli::{run, Invocation};
pub use godef_core::{Definition, GodefError, Kind, OutputErrorCode, OutputOptions};
pub use input::{read_source, Source, SourceProvider};

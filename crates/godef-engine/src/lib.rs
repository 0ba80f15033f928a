//! Definition resolution for Go source.
//!
//! This crate takes a parsed principal file and answers "where is this
//! declared":
//! - Locating the identifier, selector or import at a byte offset
//! - Inferring expression types and looking up fields and methods
//! - Importing packages from GOROOT, GOPATH, modules and vendor directories
//! - Folding sibling files of the same package into the search
//!
//! # Quick Start
//!
//! ```ignore
//! use godef_engine::{find_definition, BuildContext, Query};
//!
//! let def = find_definition(
//!     BuildContext::from_env(),
//!     "main.go",
//!     &src,
//!     &Query::Offset(42),
//!     OutputOptions::default(),
//! )?;
//! println!("{}", def.position);
//! ```

pub mod constraints;
pub mod context;
pub mod gomod;
pub mod import_path;
pub mod importer;
pub mod lookup;
pub mod package;
pub mod resolve;
pub mod types;

pub use context::BuildContext;
pub use import_path::{find_package_dir, ImportError};
pub use importer::Importer;
pub use lookup::{locate, LocateError, ResolvedNode};
pub use package::Package;
pub use resolve::{find_definition, Query, Resolver};
pub use types::{Checker, Type, TypeNode};

//! CLI command implementation.
//!
//! `main.rs` turns flags into an [`Invocation`]; [`run`] reads the source,
//! resolves the query and writes the result.

use std::io::{Read, Write};
use std::path::PathBuf;

use godef_core::{write_definition, GodefError, OutputOptions};
use godef_engine::{find_definition, BuildContext, Query};
use tracing::debug;

use crate::input::{read_source, SourceProvider};

/// One resolved command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub provider: SourceProvider,
    /// Byte offset of the identifier; negative when absent.
    pub offset: i64,
    pub expr: Option<String>,
    pub opts: OutputOptions,
    pub goroot: Option<PathBuf>,
    pub gopath: Option<Vec<PathBuf>>,
}

impl Invocation {
    /// The build context from the environment with command line overrides.
    pub fn build_context(&self) -> BuildContext {
        let mut ctx = BuildContext::from_env();
        if let Some(goroot) = &self.goroot {
            ctx = ctx.with_goroot(goroot.clone());
        }
        if let Some(gopath) = &self.gopath {
            ctx = ctx.with_gopath(gopath.clone());
        }
        ctx
    }
}

/// Run one query, writing the result to `out`.
pub fn run(
    invocation: &Invocation,
    stdin: &mut impl Read,
    out: &mut impl Write,
) -> Result<(), GodefError> {
    let source = read_source(&invocation.provider, stdin)?;
    let offset = match source.cursor {
        Some(cursor) => i64::try_from(cursor.offset).unwrap_or(i64::MAX),
        None => invocation.offset,
    };
    let query = Query::from_args(invocation.expr.as_deref(), offset)?;
    debug!(file = %source.filename, ?query, "query");

    let def = find_definition(
        invocation.build_context(),
        &source.filename,
        &source.src,
        &query,
        invocation.opts,
    )?;

    if let Some(line) = source.backtrack_line() {
        out.write_all(line.as_bytes())
            .map_err(|err| GodefError::output(err.to_string()))?;
    }
    write_definition(out, &def, invocation.opts)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn invocation(provider: SourceProvider, offset: i64) -> Invocation {
        Invocation {
            provider,
            offset,
            expr: None,
            opts: OutputOptions::default(),
            goroot: Some(PathBuf::from("/nonexistent/goroot")),
            gopath: Some(Vec::new()),
        }
    }

    fn run_to_string(invocation: &Invocation, stdin: &[u8]) -> Result<String, GodefError> {
        let mut out = Vec::new();
        run(invocation, &mut &stdin[..], &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn file_query_prints_position() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.go");
        let src = "package a\n\nvar x = 1\n\nvar y = x\n";
        fs::write(&path, src).unwrap();
        let filename = path.to_string_lossy().into_owned();

        let offset = src.rfind('x').unwrap() as i64;
        let inv = invocation(SourceProvider::File(filename.clone()), offset);
        assert_eq!(run_to_string(&inv, b"").unwrap(), format!("{filename}:3:5\n"));
    }

    #[test]
    fn buffer_query_prints_backtrack_line() {
        let content = "package a\n\nvar ñ = 1\n\nvar y = ñ\n";
        let offset = content.rfind('ñ').unwrap();
        let archive = format!("a.go\n{offset}\n{}\n{content}", content.len());
        let inv = invocation(SourceProvider::Buffer, -1);
        let out = run_to_string(&inv, archive.as_bytes()).unwrap();
        assert_eq!(out, format!("\ta.go:#{}\na.go:3:5\n", offset - 1));
    }

    #[test]
    fn missing_query_is_an_argument_error() {
        let inv = invocation(SourceProvider::Stdin("a.go".to_string()), -1);
        let err = run_to_string(&inv, b"package a\n").unwrap_err();
        assert_eq!(err, GodefError::NoQuerySpecified);
        assert_eq!(err.error_code().code(), 2);
    }

    #[test]
    fn overrides_replace_environment_paths() {
        let mut inv = invocation(SourceProvider::Buffer, -1);
        inv.goroot = Some(PathBuf::from("/opt/go"));
        inv.gopath = Some(vec![PathBuf::from("/work")]);
        let ctx = inv.build_context();
        assert_eq!(ctx.goroot, Some(PathBuf::from("/opt/go")));
        assert_eq!(ctx.gopath, vec![PathBuf::from("/work")]);
    }
}

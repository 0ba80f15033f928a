//! Source providers: where the principal file's bytes come from.
//!
//! ## Editor Buffer Format
//!
//! ```text
//! <path>\n
//! <cursor byte offset>\n
//! <content length in bytes>\n
//! <content bytes>
//! ```

use std::fs;
use std::io::Read;

use godef_core::text::byte_offset_to_rune_offset;
use godef_core::GodefError;
use thiserror::Error;
use tracing::debug;

/// Name used for standard input in error messages.
const STDIN: &str = "standard input";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("missing {0} line")]
    MissingLine(&'static str),

    #[error("invalid {field} {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("content is {actual} bytes, header says {expected}")]
    ShortContent { expected: usize, actual: usize },
}

impl From<BufferError> for GodefError {
    fn from(err: BufferError) -> Self {
        GodefError::read_failure("editor buffer", err)
    }
}

/// Where to read the principal file from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceProvider {
    /// Read the named file.
    File(String),
    /// Read standard input; the name still labels positions.
    Stdin(String),
    /// Read an editor buffer archive from standard input.
    Buffer,
}

/// The principal file as handed to the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub filename: String,
    pub src: Vec<u8>,
    /// Cursor carried by an editor buffer.
    pub cursor: Option<Cursor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub offset: usize,
    pub rune_offset: usize,
}

impl Source {
    /// The line printed ahead of the result for editor buffers, so the
    /// editor can return to where the query started.
    pub fn backtrack_line(&self) -> Option<String> {
        self.cursor
            .map(|cursor| format!("\t{}:#{}\n", self.filename, cursor.rune_offset))
    }
}

/// Read the principal file. `stdin` is consulted only by the stdin and
/// buffer providers.
pub fn read_source(provider: &SourceProvider, stdin: &mut impl Read) -> Result<Source, GodefError> {
    match provider {
        SourceProvider::File(filename) => {
            let src = fs::read(filename)
                .map_err(|err| GodefError::read_failure(filename.as_str(), err))?;
            Ok(Source {
                filename: filename.clone(),
                src,
                cursor: None,
            })
        }
        SourceProvider::Stdin(filename) => {
            let src = read_all(stdin)?;
            Ok(Source {
                filename: filename.clone(),
                src,
                cursor: None,
            })
        }
        SourceProvider::Buffer => {
            let data = read_all(stdin)?;
            Ok(parse_buffer(&data)?)
        }
    }
}

fn read_all(stdin: &mut impl Read) -> Result<Vec<u8>, GodefError> {
    let mut src = Vec::new();
    stdin
        .read_to_end(&mut src)
        .map_err(|err| GodefError::read_failure(STDIN, err))?;
    Ok(src)
}

/// Decode an editor buffer archive.
pub fn parse_buffer(data: &[u8]) -> Result<Source, BufferError> {
    let (path, rest) = split_line(data, "path")?;
    let (offset, rest) = split_line(rest, "offset")?;
    let (len, content) = split_line(rest, "length")?;
    let offset = parse_number("offset", offset)?;
    let len = parse_number("length", len)?;
    if content.len() < len {
        return Err(BufferError::ShortContent {
            expected: len,
            actual: content.len(),
        });
    }
    let src = content[..len].to_vec();
    let rune_offset = byte_offset_to_rune_offset(&src, offset);
    debug!(path = %String::from_utf8_lossy(path), offset, rune_offset, "editor buffer");
    Ok(Source {
        filename: String::from_utf8_lossy(path).into_owned(),
        src,
        cursor: Some(Cursor {
            offset,
            rune_offset,
        }),
    })
}

fn split_line<'a>(data: &'a [u8], what: &'static str) -> Result<(&'a [u8], &'a [u8]), BufferError> {
    let newline = data
        .iter()
        .position(|&b| b == b'\n')
        .ok_or(BufferError::MissingLine(what))?;
    Ok((&data[..newline], &data[newline + 1..]))
}

fn parse_number(field: &'static str, raw: &[u8]) -> Result<usize, BufferError> {
    let text = String::from_utf8_lossy(raw);
    text.trim()
        .parse()
        .map_err(|_| BufferError::InvalidNumber {
            field,
            value: text.into_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    mod buffers {
        use super::*;

        #[test]
        fn cursor_counts_runes() {
            let content = "package p\n\n// héllo\nvar x = 1\n";
            let offset = content.find("x =").unwrap();
            let archive = format!("/src/p/a.go\n{offset}\n{}\n{content}", content.len());
            let source = parse_buffer(archive.as_bytes()).unwrap();
            assert_eq!(source.filename, "/src/p/a.go");
            assert_eq!(source.src, content.as_bytes());
            let cursor = source.cursor.unwrap();
            assert_eq!(cursor.offset, offset);
            assert_eq!(cursor.rune_offset, offset - 1);
            assert_eq!(
                source.backtrack_line().as_deref(),
                Some(format!("\t/src/p/a.go:#{}\n", offset - 1).as_str())
            );
        }

        #[test]
        fn content_stops_at_declared_length() {
            let source = parse_buffer(b"a.go\n0\n9\npackage pXXXX").unwrap();
            assert_eq!(source.src, b"package p");
        }

        #[test]
        fn malformed_archives() {
            assert_eq!(
                parse_buffer(b"a.go\n12").unwrap_err(),
                BufferError::MissingLine("offset")
            );
            assert_eq!(
                parse_buffer(b"a.go\nten\n3\nabc").unwrap_err(),
                BufferError::InvalidNumber {
                    field: "offset",
                    value: "ten".to_string()
                }
            );
            let err = parse_buffer(b"a.go\n0\n10\nabc").unwrap_err();
            assert_eq!(
                err,
                BufferError::ShortContent {
                    expected: 10,
                    actual: 3
                }
            );
            assert_eq!(GodefError::from(err).error_code().code(), 4);
        }
    }

    #[test]
    fn stdin_keeps_the_given_name() {
        let mut stdin = &b"package p\n"[..];
        let source = read_source(&SourceProvider::Stdin("p.go".to_string()), &mut stdin).unwrap();
        assert_eq!(source.filename, "p.go");
        assert_eq!(source.src, b"package p\n");
        assert_eq!(source.backtrack_line(), None);
    }

    #[test]
    fn missing_file_is_a_read_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("absent.go");
        let provider = SourceProvider::File(path.to_string_lossy().into_owned());
        let err = read_source(&provider, &mut std::io::empty()).unwrap_err();
        assert!(matches!(err, GodefError::ReadFailure { .. }));
        assert!(err.to_string().contains("absent.go"));
    }
}

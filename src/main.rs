//! Binary entry point for the godef CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Definition of the identifier at byte offset 1234
//! godef -f main.go -o 1234
//!
//! # Definition of an expression, with type and exported members
//! godef -f main.go -a fmt.Stringer
//!
//! # Query an unsaved editor buffer
//! godef --buffer < archive
//! ```

use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use godef::cli::{run, Invocation};
use godef::input::SourceProvider;
use godef_core::{GodefError, OutputOptions};

// ============================================================================
// CLI Structure
// ============================================================================

/// Go to definition for identifiers or package paths.
#[derive(Parser, Debug)]
#[command(name = "godef", version, about = "Go to definition for identifiers or package paths")]
struct Cli {
    /// Source filename.
    #[arg(short = 'f', value_name = "FILE")]
    file: Option<String>,

    /// Byte offset of the identifier in the source.
    #[arg(short = 'o', value_name = "OFFSET", default_value_t = -1, allow_negative_numbers = true)]
    offset: i64,

    /// Read the source from standard input.
    #[arg(short = 'i')]
    stdin: bool,

    /// Print type information.
    #[arg(short = 't')]
    show_type: bool,

    /// Print public type and member information.
    #[arg(short = 'a')]
    members: bool,

    /// Print all type and member information.
    #[arg(short = 'A')]
    all: bool,

    /// Output the location as JSON (type flags are ignored).
    #[arg(long)]
    json: bool,

    /// Read an editor buffer archive from standard input.
    #[arg(long, conflicts_with = "stdin")]
    buffer: bool,

    /// Override GOROOT.
    #[arg(long, value_name = "DIR")]
    goroot: Option<PathBuf>,

    /// Override GOPATH (a path list).
    #[arg(long, value_name = "LIST")]
    gopath: Option<String>,

    /// Debug logging (same as --log-level debug).
    #[arg(long)]
    debug: bool,

    /// Log level for tracing output.
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Identifier or selector expression to resolve instead of an offset.
    expr: Option<String>,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl Cli {
    fn log_level(&self) -> LogLevel {
        if self.debug && self.log_level != LogLevel::Trace {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }

    fn into_invocation(self) -> Result<Invocation, GodefError> {
        let provider = if self.buffer {
            SourceProvider::Buffer
        } else if self.stdin {
            SourceProvider::Stdin(self.file.unwrap_or_default())
        } else {
            match self.file {
                Some(file) => SourceProvider::File(file),
                None => return Err(GodefError::invalid_args("no source file given (use -f, -i or --buffer)")),
            }
        };
        Ok(Invocation {
            provider,
            offset: self.offset,
            expr: self.expr,
            opts: OutputOptions {
                json: self.json,
                show_type: self.show_type,
                members: self.members,
                all: self.all,
            },
            goroot: self.goroot,
            gopath: self
                .gopath
                .map(|list| env::split_paths(&list).collect()),
        })
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.log_level());

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("godef: {err}");
            ExitCode::from(err.error_code().code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn execute(cli: Cli) -> Result<(), GodefError> {
    let invocation = cli.into_invocation()?;
    run(&invocation, &mut io::stdin().lock(), &mut io::stdout().lock())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod cli_parsing {
        use super::*;

        #[test]
        fn offset_defaults_to_absent() {
            let cli = Cli::try_parse_from(["godef", "-f", "a.go"]).unwrap();
            assert_eq!(cli.offset, -1);
            assert_eq!(cli.expr, None);
            assert_eq!(cli.log_level(), LogLevel::Warn);
        }

        #[test]
        fn short_flags_combine() {
            let cli = Cli::try_parse_from(["godef", "-it", "-f", "a.go", "-o", "42"]).unwrap();
            assert!(cli.stdin);
            assert!(cli.show_type);
            let inv = cli.into_invocation().unwrap();
            assert_eq!(inv.provider, SourceProvider::Stdin("a.go".to_string()));
            assert_eq!(inv.offset, 42);
        }

        #[test]
        fn single_positional_expression() {
            let cli = Cli::try_parse_from(["godef", "-f", "a.go", "-A", "fmt.Println"]).unwrap();
            assert_eq!(cli.expr.as_deref(), Some("fmt.Println"));
            assert!(cli.all);
            assert!(Cli::try_parse_from(["godef", "-f", "a.go", "x", "y"]).is_err());
        }

        #[test]
        fn debug_raises_the_log_level() {
            let cli = Cli::try_parse_from(["godef", "--debug", "-f", "a.go"]).unwrap();
            assert_eq!(cli.log_level(), LogLevel::Debug);
            let cli =
                Cli::try_parse_from(["godef", "--debug", "--log-level", "trace", "-f", "a.go"])
                    .unwrap();
            assert_eq!(cli.log_level(), LogLevel::Trace);
        }

        #[test]
        fn buffer_and_stdin_conflict() {
            assert!(Cli::try_parse_from(["godef", "--buffer", "-i"]).is_err());
            let cli = Cli::try_parse_from(["godef", "--buffer", "--json"]).unwrap();
            let inv = cli.into_invocation().unwrap();
            assert_eq!(inv.provider, SourceProvider::Buffer);
            assert!(inv.opts.json);
        }

        #[test]
        fn source_is_required() {
            let cli = Cli::try_parse_from(["godef", "-o", "3"]).unwrap();
            let err = cli.into_invocation().unwrap_err();
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn gopath_is_a_path_list() {
            let list = env::join_paths(["/a", "/b"]).unwrap();
            let cli = Cli::try_parse_from([
                "godef",
                "-f",
                "a.go",
                "--gopath",
                list.to_str().unwrap(),
            ])
            .unwrap();
            let inv = cli.into_invocation().unwrap();
            assert_eq!(
                inv.gopath,
                Some(vec![PathBuf::from("/a"), PathBuf::from("/b")])
            );
        }
    }
}

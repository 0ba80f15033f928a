//! Minimal `go.mod` reading: the module path, requirements and
//! replacements.
//!
//! Each line is split into tokens (bare words, `=>`, quoted strings) with
//! winnow; `module`, `require` and `replace` directives are interpreted,
//! including their parenthesized block forms. Other directives are ignored.

use std::fs;
use std::path::{Path, PathBuf};

use winnow::ascii::space0;
use winnow::combinator::{alt, delimited, preceded, repeat, terminated};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};
use winnow::ModalResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub path: String,
    pub version: String,
}

/// The target of a `replace` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// A directory, relative to the module root unless absolute.
    Dir(PathBuf),
    Module { path: String, version: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub path: String,
    /// Only this version is replaced when present.
    pub version: Option<String>,
    pub target: Replacement,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoMod {
    pub module: String,
    pub requires: Vec<Requirement>,
    pub replaces: Vec<Replace>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Require,
    Replace,
    Other,
}

impl GoMod {
    pub fn parse(text: &str) -> GoMod {
        let mut gomod = GoMod::default();
        let mut block = Block::None;
        for line in text.lines() {
            let line = strip_comment(line);
            let mut input = line;
            let Ok(tokens) = line_tokens.parse_next(&mut input) else {
                continue;
            };
            let words: Vec<&str> = tokens.iter().map(String::as_str).collect();

            if block != Block::None {
                match words.as_slice() {
                    [")"] => block = Block::None,
                    args if block == Block::Require => gomod.add_require(args),
                    args if block == Block::Replace => gomod.add_replace(args),
                    _ => {}
                }
                continue;
            }

            let Some((directive, args)) = words.split_first() else {
                continue;
            };
            if args == ["("] {
                block = match *directive {
                    "require" => Block::Require,
                    "replace" => Block::Replace,
                    _ => Block::Other,
                };
                continue;
            }
            match *directive {
                "module" => {
                    if let Some(path) = args.first() {
                        gomod.module = path.to_string();
                    }
                }
                "require" => gomod.add_require(args),
                "replace" => gomod.add_replace(args),
                _ => {}
            }
        }
        gomod
    }

    fn add_require(&mut self, args: &[&str]) {
        if let [path, version, ..] = args {
            self.requires.push(Requirement {
                path: path.to_string(),
                version: version.to_string(),
            });
        }
    }

    fn add_replace(&mut self, args: &[&str]) {
        let Some(arrow) = args.iter().position(|a| *a == "=>") else {
            return;
        };
        let (old, new) = (&args[..arrow], &args[arrow + 1..]);
        let Some(path) = old.first() else {
            return;
        };
        let target = match new {
            [dir] => Replacement::Dir(PathBuf::from(dir)),
            [path, version] => Replacement::Module {
                path: path.to_string(),
                version: version.to_string(),
            },
            _ => return,
        };
        self.replaces.push(Replace {
            path: path.to_string(),
            version: old.get(1).map(|v| v.to_string()),
            target,
        });
    }

    /// The required version of the module `path`.
    pub fn required_version(&self, path: &str) -> Option<&str> {
        self.requires
            .iter()
            .find(|r| r.path == path)
            .map(|r| r.version.as_str())
    }

    /// The replacement applying to `path` at `version`.
    pub fn replacement(&self, path: &str, version: Option<&str>) -> Option<&Replacement> {
        self.replaces
            .iter()
            .filter(|r| r.path == path)
            .find(|r| r.version.is_none() || r.version.as_deref() == version)
            .map(|r| &r.target)
    }

    /// Module paths this file knows about: the main module, requirements and
    /// replaced paths.
    pub fn known_modules(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.module.as_str())
            .chain(self.requires.iter().map(|r| r.path.as_str()))
            .chain(self.replaces.iter().map(|r| r.path.as_str()))
            .filter(|p| !p.is_empty())
    }
}

/// A module root and its parsed `go.mod`.
#[derive(Debug, Clone)]
pub struct Module {
    pub root: PathBuf,
    pub gomod: GoMod,
}

/// Find the `go.mod` governing `dir`, walking up through its ancestors.
pub fn find_module(dir: &Path) -> Option<Module> {
    for ancestor in dir.ancestors() {
        let candidate = ancestor.join("go.mod");
        if let Ok(text) = fs::read_to_string(&candidate) {
            return Some(Module {
                root: ancestor.to_path_buf(),
                gomod: GoMod::parse(&text),
            });
        }
    }
    None
}

/// Escape a module path for the module cache: upper case letters become
/// `!` followed by the lower case letter.
pub fn escape_module_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) if !line[..idx].contains('"') => &line[..idx],
        _ => line,
    }
}

// ============================================================================
// Tokenizer using winnow
// ============================================================================

fn line_tokens(input: &mut &str) -> ModalResult<Vec<String>> {
    terminated(repeat(0.., preceded(space0, token)), space0).parse_next(input)
}

fn token(input: &mut &str) -> ModalResult<String> {
    alt((
        delimited('"', take_till(0.., |c| c == '"'), '"').map(str::to_string),
        delimited('`', take_till(0.., |c| c == '`'), '`').map(str::to_string),
        "=>".map(str::to_string),
        take_while(1.., |c: char| !c.is_whitespace() && c != '"').map(str::to_string),
    ))
    .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOMOD: &str = r#"module example.com/app // main

go 1.21

require (
	golang.org/x/text v0.14.0 // indirect
	github.com/BurntSushi/toml v1.3.2
)

require rsc.io/quote v1.5.2

replace example.com/lib => ../lib

replace (
	rsc.io/quote v1.5.2 => rsc.io/quote v1.5.1
	"example.com/quoted" => ./quoted
)

exclude golang.org/x/net v0.1.0
"#;

    #[test]
    fn directives() {
        let gomod = GoMod::parse(GOMOD);
        assert_eq!(gomod.module, "example.com/app");
        assert_eq!(gomod.requires.len(), 3);
        assert_eq!(gomod.required_version("golang.org/x/text"), Some("v0.14.0"));
        assert_eq!(gomod.required_version("rsc.io/quote"), Some("v1.5.2"));
        assert_eq!(
            gomod.replacement("example.com/lib", None),
            Some(&Replacement::Dir(PathBuf::from("../lib")))
        );
        assert_eq!(
            gomod.replacement("rsc.io/quote", Some("v1.5.2")),
            Some(&Replacement::Module {
                path: "rsc.io/quote".to_string(),
                version: "v1.5.1".to_string(),
            })
        );
        assert_eq!(gomod.replacement("rsc.io/quote", Some("v1.6.0")), None);
        assert_eq!(
            gomod.replacement("example.com/quoted", None),
            Some(&Replacement::Dir(PathBuf::from("./quoted")))
        );
    }

    #[test]
    fn escaping() {
        assert_eq!(
            escape_module_path("github.com/BurntSushi/toml"),
            "github.com/!burnt!sushi/toml"
        );
    }

    #[test]
    fn find_module_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module example.com/m\n").unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let module = find_module(&nested).unwrap();
        assert_eq!(module.root, dir.path());
        assert_eq!(module.gomod.module, "example.com/m");
    }
}

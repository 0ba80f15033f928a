//! Rendering of definitions for the command line.
//!
//! ## Output Shape
//!
//! ```text
//! /src/p/a.go:12:6          <- position (always, unless path kind)
//! type Foo struct {         <- type line (with type output)
//!     Bar int
//! }
//!     Bar int               <- members (with member output)
//!         /src/p/a.go:13:2
//! ```
//!
//! A `path` definition prints only its value. JSON output prints only the
//! position record and ignores the type and member flags.

use std::io::{self, Write};

use crate::error::GodefError;
use crate::text::is_exported;
use crate::types::{Definition, Kind};

/// Which parts of a definition to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Emit the position as a JSON record.
    pub json: bool,
    /// Emit the type line.
    pub show_type: bool,
    /// Emit exported members of types.
    pub members: bool,
    /// Emit unexported and foreign members too.
    pub all: bool,
}

impl OutputOptions {
    /// Apply flag implications: `all` implies `members`, which implies
    /// `show_type`.
    pub fn normalized(mut self) -> Self {
        self.members |= self.all;
        self.show_type |= self.members;
        self
    }
}

/// Render the type line of a definition.
///
/// Variables and functions omit the kind keyword. Imports render as
/// `import (name "path")`.
pub fn type_line(def: &Definition) -> String {
    let mut out = String::new();
    let mut value_close = "";
    match def.kind {
        Kind::Var | Kind::Func => {}
        Kind::Import => {
            out.push_str("import (");
            value_close = ")";
        }
        kind => {
            out.push_str(kind.as_str());
            out.push(' ');
        }
    }
    out.push_str(&def.name);
    if let Some(ty) = &def.type_str {
        out.push(' ');
        out.push_str(ty);
    }
    if let Some(value) = &def.value {
        if value_close.is_empty() {
            out.push_str(" = ");
        } else {
            out.push(' ');
        }
        out.push_str(value);
        out.push_str(value_close);
    }
    out
}

/// Render a definition to a string.
pub fn format_definition(def: &Definition, opts: OutputOptions) -> Result<String, GodefError> {
    let opts = opts.normalized();
    let mut out = String::new();

    if def.kind == Kind::Path {
        out.push_str(def.value.as_deref().unwrap_or_default());
        out.push('\n');
        return Ok(out);
    }

    if opts.json {
        let json = serde_json::to_string(&def.position)
            .map_err(|e| GodefError::output(format!("JSON marshal error: {e}")))?;
        out.push_str(&json);
        out.push('\n');
        return Ok(out);
    }

    out.push_str(&def.position.to_string());
    out.push('\n');
    if def.kind == Kind::Bad || !opts.show_type {
        return Ok(out);
    }

    out.push_str(&type_line(def));
    out.push('\n');
    if opts.members {
        for member in &def.members {
            if !opts.all && (!member.pkg.is_empty() || !is_exported(&member.name)) {
                continue;
            }
            out.push('\t');
            out.push_str(&type_line(member).replace('\n', "\n\t\t"));
            out.push('\n');
            out.push_str("\t\t");
            out.push_str(&member.position.to_string());
            out.push('\n');
        }
    }
    Ok(out)
}

/// Write a rendered definition to `writer`.
pub fn write_definition(
    writer: &mut impl Write,
    def: &Definition,
    opts: OutputOptions,
) -> Result<(), GodefError> {
    let text = format_definition(def, opts)?;
    write_all(writer, &text).map_err(|e| GodefError::output(e.to_string()))
}

fn write_all(writer: &mut impl Write, text: &str) -> io::Result<()> {
    writer.write_all(text.as_bytes())?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn foo() -> Definition {
        let mut def = Definition::new("Foo", Kind::Type, Position::new("a.go", 3, 6));
        def.type_str = Some("struct {\n\tBar int\n\tbaz string\n}".to_string());
        let mut bar = Definition::new("Bar", Kind::Var, Position::new("a.go", 4, 2));
        bar.type_str = Some("int".to_string());
        let mut baz = Definition::new("baz", Kind::Var, Position::new("a.go", 5, 2));
        baz.type_str = Some("string".to_string());
        let mut m = Definition::new("M", Kind::Func, Position::new("b.go", 9, 15));
        m.type_str = Some("func() (x int, y int)".to_string());
        m.pkg = "example.com/other".to_string();
        def.members = vec![bar, baz, m];
        def
    }

    mod type_lines {
        use super::*;

        #[test]
        fn var_and_func_omit_keyword() {
            let mut def = Definition::new("x", Kind::Var, Position::default());
            def.type_str = Some("int".to_string());
            assert_eq!(type_line(&def), "x int");
            let mut def = Definition::new("f", Kind::Func, Position::default());
            def.type_str = Some("func(a string) error".to_string());
            assert_eq!(type_line(&def), "f func(a string) error");
        }

        #[test]
        fn const_with_value() {
            let mut def = Definition::new("N", Kind::Const, Position::default());
            def.type_str = Some("int".to_string());
            def.value = Some("1 << 3".to_string());
            assert_eq!(type_line(&def), "const N int = 1 << 3");
        }

        #[test]
        fn import_is_parenthesized() {
            let mut def = Definition::new("fmt", Kind::Import, Position::default());
            def.value = Some("\"fmt\"".to_string());
            assert_eq!(type_line(&def), "import (fmt \"fmt\")");
        }

        #[test]
        fn label_is_bare() {
            let def = Definition::new("outer", Kind::Label, Position::default());
            assert_eq!(type_line(&def), "label outer");
        }
    }

    mod formatting {
        use super::*;

        #[test]
        fn plain_prints_position_only() {
            let out = format_definition(&foo(), OutputOptions::default()).unwrap();
            assert_eq!(out, "a.go:3:6\n");
        }

        #[test]
        fn path_prints_value_only() {
            let opts = OutputOptions {
                json: true,
                all: true,
                ..OutputOptions::default()
            };
            let out = format_definition(&Definition::path("/go/src/fmt"), opts).unwrap();
            assert_eq!(out, "/go/src/fmt\n");
        }

        #[test]
        fn json_ignores_type_flags() {
            let opts = OutputOptions {
                json: true,
                show_type: true,
                ..OutputOptions::default()
            };
            let out = format_definition(&foo(), opts).unwrap();
            assert_eq!(out, "{\"filename\":\"a.go\",\"line\":3,\"column\":6}\n");
        }

        #[test]
        fn builtin_position_is_dash() {
            let def = Definition::new("int", Kind::Type, Position::default());
            let opts = OutputOptions {
                show_type: true,
                ..OutputOptions::default()
            };
            assert_eq!(format_definition(&def, opts).unwrap(), "-\ntype int\n");
        }

        #[test]
        fn bad_kind_skips_type_line() {
            let def = Definition::new("x", Kind::Bad, Position::new("a.go", 1, 1));
            let opts = OutputOptions {
                show_type: true,
                ..OutputOptions::default()
            };
            assert_eq!(format_definition(&def, opts).unwrap(), "a.go:1:1\n");
        }

        #[test]
        fn members_skip_unexported_and_foreign() {
            let opts = OutputOptions {
                members: true,
                ..OutputOptions::default()
            };
            let out = format_definition(&foo(), opts).unwrap();
            assert_eq!(
                out,
                "a.go:3:6\ntype Foo struct {\n\tBar int\n\tbaz string\n}\n\tBar int\n\t\ta.go:4:2\n"
            );
        }

        #[test]
        fn all_members_are_indented() {
            let opts = OutputOptions {
                all: true,
                ..OutputOptions::default()
            };
            let out = format_definition(&foo(), opts).unwrap();
            assert!(out.ends_with(
                "\tBar int\n\t\ta.go:4:2\n\tbaz string\n\t\ta.go:5:2\n\tM func() (x int, y int)\n\t\tb.go:9:15\n"
            ));
        }

        #[test]
        fn multiline_member_types_are_reindented() {
            let mut def = Definition::new("T", Kind::Type, Position::new("a.go", 1, 6));
            let mut inner = Definition::new("In", Kind::Var, Position::new("a.go", 2, 2));
            inner.type_str = Some("struct {\n\tX int\n}".to_string());
            def.members = vec![inner];
            let opts = OutputOptions {
                members: true,
                ..OutputOptions::default()
            };
            let out = format_definition(&def, opts).unwrap();
            assert_eq!(out, "a.go:1:6\ntype T\n\tIn struct {\n\t\t\tX int\n\t\t}\n\t\ta.go:2:2\n");
        }

        #[test]
        fn formatting_is_idempotent() {
            let opts = OutputOptions {
                all: true,
                ..OutputOptions::default()
            };
            let def = foo();
            assert_eq!(
                format_definition(&def, opts).unwrap(),
                format_definition(&def, opts).unwrap()
            );
        }
    }

    #[test]
    fn normalized_implications() {
        let opts = OutputOptions {
            all: true,
            ..OutputOptions::default()
        }
        .normalized();
        assert!(opts.members && opts.show_type);
    }

    #[test]
    fn write_definition_writes_bytes() {
        let mut buf = Vec::new();
        write_definition(&mut buf, &foo(), OutputOptions::default()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a.go:3:6\n");
    }
}

//! End-to-end resolution tests over fixture trees.
//!
//! Each test lays out a GOROOT, a GOPATH and a package directory under a
//! temporary directory and queries a principal file by byte offset or by
//! expression.
//!
//! # Organization
//!
//! - `package_tiers`: principal file first, then sibling files
//! - `offsets`: identifiers, selectors, embedded fields, imports
//! - `locals`: block scoped declarations and their inferred types
//! - `output`: type lines and member listings through the formatter

use std::fs;
use std::path::{Path, PathBuf};

use godef_core::{format_definition, Definition, GodefError, Kind, OutputOptions};
use godef_engine::{find_definition, BuildContext, Query, Resolver};
use tempfile::TempDir;

struct Workspace {
    tmp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Workspace {
            tmp: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.tmp.path().join(rel)
    }

    fn write(&self, rel: &str, src: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, src).unwrap();
        path
    }

    fn ctx(&self) -> BuildContext {
        BuildContext {
            goroot: Some(self.path("goroot")),
            goos: "linux".to_string(),
            goarch: "amd64".to_string(),
            ..BuildContext::default()
        }
        .with_gopath(vec![self.path("gopath")])
    }

    fn resolve(&self, rel: &str, query: Query, opts: OutputOptions) -> Result<Definition, GodefError> {
        let path = self.path(rel);
        let src = fs::read(&path).unwrap();
        find_definition(self.ctx(), &path.to_string_lossy(), &src, &query, opts)
    }

    /// Resolve the identifier `delta` bytes into the first `needle` of `rel`.
    fn at(&self, rel: &str, needle: &str, delta: usize) -> Result<Definition, GodefError> {
        self.at_with(rel, needle, delta, OutputOptions::default())
    }

    fn at_with(
        &self,
        rel: &str,
        needle: &str,
        delta: usize,
        opts: OutputOptions,
    ) -> Result<Definition, GodefError> {
        let src = fs::read_to_string(self.path(rel)).unwrap();
        let offset = src.find(needle).unwrap_or_else(|| panic!("{needle:?} not in {rel}")) + delta;
        self.resolve(rel, Query::Offset(offset), opts)
    }
}

fn filename(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

mod package_tiers {
    use super::*;

    #[test]
    fn unexported_sibling_symbol_needs_the_package_tier() {
        let ws = Workspace::new();
        ws.write("app/a.go", "package app\n\nfunc Run() int {\n\treturn helper()\n}\n");
        let b = ws.write("app/b.go", "package app\n\nfunc helper() int { return 1 }\n");

        let def = ws.at("app/a.go", "helper()", 0).unwrap();
        assert_eq!(def.name, "helper");
        assert_eq!(def.kind, Kind::Func);
        assert_eq!(def.position.filename, filename(&b));
        assert_eq!((def.position.line, def.position.column), (3, 6));
    }

    #[test]
    fn siblings_are_parsed_only_when_the_principal_file_falls_short() {
        let ws = Workspace::new();
        let a = ws.write(
            "app/a.go",
            "package app\n\nvar local = 1\n\nfunc Run() int {\n\treturn helper() + local\n}\n",
        );
        let b = ws.write("app/b.go", "package app\n\nfunc helper() int { return 1 }\n");
        let src = fs::read_to_string(&a).unwrap();
        let mut resolver = Resolver::new(ws.ctx(), &filename(&a), src.as_bytes()).unwrap();
        assert_eq!(resolver.package().file_count(), 1);

        let offset = src.find("+ local").unwrap() + 2;
        let def = resolver.resolve(&Query::Offset(offset), OutputOptions::default()).unwrap();
        assert_eq!(def.position.filename, filename(&a));
        assert_eq!(def.position.line, 3);
        assert_eq!(resolver.package().file_count(), 1);

        let def = resolver
            .resolve(&Query::Expression("helper".to_string()), OutputOptions::default())
            .unwrap();
        assert_eq!(def.position.filename, filename(&b));
        assert_eq!(resolver.package().file_count(), 2);
    }

    #[test]
    fn lone_file_stays_alone_when_a_name_is_undeclared() {
        let ws = Workspace::new();
        let a = ws.write("app/a.go", "package app\n\nvar x = missing\n");
        let src = fs::read(&a).unwrap();
        let mut resolver = Resolver::new(ws.ctx(), &filename(&a), &src).unwrap();
        let err = resolver
            .resolve(&Query::Expression("missing".to_string()), OutputOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            GodefError::NoDeclarationFound {
                expr: "missing".to_string()
            }
        );
        assert_eq!(resolver.package().file_count(), 1);
    }

    #[test]
    fn broken_sibling_does_not_block_resolution() {
        let ws = Workspace::new();
        ws.write("app/a.go", "package app\n\nvar total = count + 1\n");
        ws.write("app/broken.go", "package app\n\nfunc oops( {\n");
        let c = ws.write("app/c.go", "package app\n\nvar count = 2\n");
        ws.write("app/other.go", "package other\n\nvar count = 3\n");

        let def = ws.at("app/a.go", "count", 0).unwrap();
        assert_eq!(def.position.filename, filename(&c));
        assert_eq!(def.kind, Kind::Var);
    }

    #[test]
    fn undeclared_name_reports_the_expression() {
        let ws = Workspace::new();
        ws.write("app/a.go", "package app\n\nvar x = missing\n");
        let err = ws.at("app/a.go", "missing", 2).unwrap_err();
        assert_eq!(
            err,
            GodefError::NoDeclarationFound {
                expr: "missing".to_string()
            }
        );
        assert_eq!(err.error_code().code(), 3);
    }

    #[test]
    fn type_output_resolves_against_the_whole_package() {
        let ws = Workspace::new();
        ws.write("app/a.go", "package app\n\nvar p Point\n");
        ws.write(
            "app/b.go",
            "package app\n\ntype Point struct {\n\tX, Y int\n\tlabel string\n}\n\nfunc (p Point) Len() int { return 0 }\n",
        );
        let opts = OutputOptions {
            members: true,
            ..OutputOptions::default()
        };
        let def = ws.at_with("app/a.go", "Point", 1, opts).unwrap();
        assert_eq!(def.kind, Kind::Type);
        let names: Vec<_> = def.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Len", "X", "Y", "label"]);

        let text = format_definition(&def, opts).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[1], "type Point struct {");
        assert!(text.contains("\n\tLen func() int\n"));
        assert!(text.contains("\n\tX int\n\t\t"));
        assert!(!text.contains("\n\tlabel string\n\t\t"));
    }
}

mod offsets {
    use super::*;

    const LIB: &str = "package base\n\n// Base is embedded.\ntype Base struct {\n\tID int\n}\n\nfunc (b *Base) Key() string { return \"\" }\n";

    const MAIN: &str = r#"package main

import (
	"example.com/base"
	"fmt"
)

type Foo struct {
	*base.Base
	Bar int
}

func main() {
	f := Foo{}
	fmt.Println(f.Key(), f.ID)
}
"#;

    fn workspace() -> Workspace {
        let ws = Workspace::new();
        ws.write("gopath/src/example.com/base/base.go", LIB);
        ws.write("goroot/src/fmt/print.go", "package fmt\n\nfunc Println(a ...any) (n int, err error) { return }\n");
        ws.write("app/main.go", MAIN);
        ws
    }

    #[test]
    fn builtin_type_has_no_position() {
        let ws = workspace();
        let def = ws.at("app/main.go", "Bar int", 5).unwrap();
        assert_eq!(def.name, "int");
        assert_eq!(def.kind, Kind::Type);
        assert_eq!(def.position.line, 0);
        assert!(def.position.filename.is_empty());
        assert_eq!(format_definition(&def, OutputOptions::default()).unwrap(), "-\n");
    }

    #[test]
    fn embedded_qualified_type_resolves_to_its_declaration() {
        let ws = workspace();
        let def = ws.at("app/main.go", "base.Base", 6).unwrap();
        assert_eq!(def.name, "Base");
        assert_eq!(def.kind, Kind::Type);
        assert_eq!(def.pkg, "example.com/base");
        assert_eq!(
            def.position.filename,
            filename(&ws.path("gopath/src/example.com/base/base.go"))
        );
        assert_eq!(def.position.line, 4);
    }

    #[test]
    fn selector_token_resolves_the_member() {
        let ws = workspace();
        let def = ws.at("app/main.go", "Println", 3).unwrap();
        assert_eq!(def.name, "Println");
        assert_eq!(def.pkg, "fmt");

        let key = ws.at("app/main.go", "Key()", 0).unwrap();
        assert_eq!((key.name.as_str(), key.position.line), ("Key", 8));
        let id = ws.at("app/main.go", "f.ID", 2).unwrap();
        assert_eq!((id.name.as_str(), id.position.line), ("ID", 5));
    }

    #[test]
    fn package_name_resolves_to_the_import() {
        let ws = workspace();
        let def = ws.at("app/main.go", "fmt.Println", 0).unwrap();
        assert_eq!(def.kind, Kind::Import);
        assert_eq!(def.name, "fmt");
        assert_eq!(def.value.as_deref(), Some("\"fmt\""));
        assert_eq!(def.position.line, 5);
    }

    #[test]
    fn import_spec_resolves_to_its_directory() {
        let ws = workspace();
        for opts in [
            OutputOptions::default(),
            OutputOptions {
                all: true,
                ..OutputOptions::default()
            },
        ] {
            let def = ws.at_with("app/main.go", "\"example.com/base\"", 4, opts).unwrap();
            assert_eq!(def.kind, Kind::Path);
            let dir = filename(&ws.path("gopath/src/example.com/base"));
            assert_eq!(def.value.as_deref(), Some(dir.as_str()));
            assert_eq!(format_definition(&def, opts).unwrap(), format!("{dir}\n"));
        }
    }

    #[test]
    fn missing_import_is_reported() {
        let ws = Workspace::new();
        ws.write("app/main.go", "package main\n\nimport \"nowhere.org/x\"\n");
        let err = ws.at("app/main.go", "nowhere", 0).unwrap_err();
        let GodefError::ImportPathNotFound { path, reason } = &err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(path, "nowhere.org/x");
        assert!(reason.starts_with("cannot find package"));
        assert!(err.to_string().starts_with("error finding import path for nowhere.org/x: "));
    }

    #[test]
    fn expression_takes_precedence_over_offset() {
        let ws = workspace();
        let path = ws.path("app/main.go");
        let query = Query::from_args(Some("base.Base"), 0).unwrap();
        let def = find_definition(
            ws.ctx(),
            &filename(&path),
            MAIN.as_bytes(),
            &query,
            OutputOptions::default(),
        )
        .unwrap();
        assert_eq!(def.name, "Base");
    }

    #[test]
    fn offsets_past_the_end_of_the_file() {
        let ws = Workspace::new();
        ws.write("app/a.go", "package app\n\nvar x = 1\n");
        let len = "package app\n\nvar x = 1\n".len();
        for offset in [len + 1, u32::MAX as usize, u32::MAX as usize + 1 + 17] {
            let err = ws
                .resolve("app/a.go", Query::Offset(offset), OutputOptions::default())
                .unwrap_err();
            assert_eq!(err, GodefError::NotFound, "offset {offset}");
        }
    }

    #[test]
    fn offset_outside_any_identifier() {
        let ws = workspace();
        let err = ws.at("app/main.go", "func main", 1).unwrap_err();
        assert_eq!(err, GodefError::NotFound);
        assert_eq!(err.to_string(), "no identifier found");
    }
}

mod locals {
    use super::*;

    const SRC: &str = r#"package app

type Item struct{ Name string }

func names(items []Item) []string {
	var out []string
	for i, it := range items {
		_ = i
		out = append(out, it.Name)
	}
	byName := map[string]*Item{}
	if v, ok := byName["x"]; ok {
		return []string{v.Name}
	}
	switch x := any(out).(type) {
	case []string:
		return x
	}
loop:
	for {
		break loop
	}
	return out
}
"#;

    fn resolve(needle: &str, delta: usize) -> Definition {
        let ws = Workspace::new();
        ws.write("app/a.go", SRC);
        let opts = OutputOptions {
            show_type: true,
            ..OutputOptions::default()
        };
        ws.at_with("app/a.go", needle, delta, opts).unwrap()
    }

    #[test]
    fn range_variables() {
        let def = resolve("it.Name", 0);
        assert_eq!(def.kind, Kind::Var);
        assert_eq!(def.position.line, 7);
        assert_eq!(def.type_str.as_deref(), Some("Item"));

        let def = resolve("it.Name", 3);
        assert_eq!(def.name, "Name");
        assert_eq!(def.type_str.as_deref(), Some("string"));
    }

    #[test]
    fn comma_ok_and_pointer_fields() {
        let def = resolve("v.Name", 0);
        assert_eq!(def.type_str.as_deref(), Some("*Item"));
        let def = resolve("v.Name", 2);
        assert_eq!((def.name.as_str(), def.position.line), ("Name", 3));
        let def = resolve("; ok", 2);
        assert_eq!(def.type_str.as_deref(), Some("bool"));
    }

    #[test]
    fn type_switch_guard_takes_the_case_type() {
        let def = resolve("return x", 7);
        assert_eq!(def.name, "x");
        assert_eq!(def.type_str.as_deref(), Some("[]string"));
    }

    #[test]
    fn labels() {
        let def = resolve("break loop", 6);
        assert_eq!(def.kind, Kind::Label);
        assert_eq!(def.position.line, 19);
        assert_eq!(def.type_str, None);
    }
}

mod output {
    use super::*;

    #[test]
    fn constants_print_type_and_value() {
        let ws = Workspace::new();
        ws.write(
            "app/a.go",
            "package app\n\nconst (\n\tSmall = 1 << iota\n\tLarge\n)\n\nvar n = Large\n",
        );
        let opts = OutputOptions {
            show_type: true,
            ..OutputOptions::default()
        };
        let def = ws.at_with("app/a.go", "= Large", 2, opts).unwrap();
        let text = format_definition(&def, opts).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].ends_with("a.go:5:2"));
        assert_eq!(lines[1], "const Large int = 1 << iota");
    }

    #[test]
    fn repeated_queries_print_the_same_bytes() {
        let ws = Workspace::new();
        let a = ws.write("app/a.go", "package app\n\nvar p = Point{}\n");
        ws.write(
            "app/b.go",
            "package app\n\ntype Point struct {\n\tX, Y int\n}\n\nfunc (p Point) Len() int { return 0 }\n",
        );
        let opts = OutputOptions {
            all: true,
            ..OutputOptions::default()
        };
        let src = fs::read_to_string(&a).unwrap();
        let offset = src.find("Point{}").unwrap() + 1;
        let query = Query::Offset(offset);

        let printed = |def: Definition| format_definition(&def, opts).unwrap();
        let fresh = || {
            let def = find_definition(ws.ctx(), &filename(&a), src.as_bytes(), &query, opts);
            printed(def.unwrap())
        };
        let first = fresh();
        let second = fresh();
        assert_eq!(first, second);
        assert!(first.contains("\n\tLen func() int\n"));

        let mut resolver = Resolver::new(ws.ctx(), &filename(&a), src.as_bytes()).unwrap();
        let third = printed(resolver.resolve(&query, opts).unwrap());
        let fourth = printed(resolver.resolve(&query, opts).unwrap());
        assert_eq!(third, first);
        assert_eq!(fourth, first);
        assert_eq!(resolver.package().file_count(), 2);
    }

    #[test]
    fn json_ignores_type_flags() {
        let ws = Workspace::new();
        let a = ws.write("app/a.go", "package app\n\nvar n = 1\n\nvar m = n\n");
        let opts = OutputOptions {
            json: true,
            all: true,
            ..OutputOptions::default()
        };
        let def = ws.at_with("app/a.go", "= n", 2, opts).unwrap();
        let text = format_definition(&def, opts).unwrap();
        let expected = format!(
            "{{\"filename\":{},\"line\":3,\"column\":5}}\n",
            serde_json::to_string(&filename(&a)).unwrap()
        );
        assert_eq!(text, expected);
    }
}

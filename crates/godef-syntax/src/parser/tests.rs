// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;
use std::rc::Rc;

use super::*;
use crate::nodes::{Expr, FuncDecl, Stmt};

fn parse(src: &str) -> (Program, ParsedFile) {
    let mut program = Program::new();
    let parsed = parse_file(&mut program, "test.go", src.as_bytes(), ParseConfig::default())
        .expect("package clause should parse");
    (program, parsed)
}

fn parse_ok(src: &str) -> (Program, Rc<File>) {
    let (program, parsed) = parse(src);
    assert!(parsed.errors.is_empty(), "unexpected errors: {:?}", parsed.errors);
    (program, parsed.file)
}

fn func<'a>(file: &'a File, name: &str) -> &'a FuncDecl {
    file.decls
        .iter()
        .find_map(|decl| match decl {
            Decl::Func(func) if func.name.name == name => Some(&**func),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no func {name}"))
}

fn body<'a>(file: &'a File, name: &str) -> &'a [Stmt] {
    &func(file, name).body.as_ref().expect("body").list
}

fn ident(expr: &Expr) -> &Ident {
    expr.as_ident().expect("identifier")
}

mod declarations {
    use super::*;

    #[test]
    fn top_level_objects_go_into_the_package_scope() {
        let (program, file) = parse_ok(
            "package p\n\nconst C = 1\nvar V = C\ntype T struct{}\nfunc F() {}\nfunc (T) M() {}\nfunc init() {}\n",
        );
        let scope = program.scope(file.package_scope);
        for (name, kind) in [
            ("C", ObjKind::Con),
            ("V", ObjKind::Var),
            ("T", ObjKind::Typ),
            ("F", ObjKind::Fun),
        ] {
            let id = scope.lookup(name).unwrap_or_else(|| panic!("{name}"));
            assert_eq!(program.object(id).kind, kind);
        }
        assert_eq!(scope.lookup("M"), None);
        assert_eq!(scope.lookup("init"), None);
        assert_eq!(program.methods(file.package_scope, "T").len(), 1);
        assert_eq!(file.name.name, "p");
    }

    #[test]
    fn const_groups_repeat_the_previous_spec() {
        let (program, file) = parse_ok("package p\n\nconst (\n\tA = iota\n\tB\n\tC\n)\n");
        let id = program.scope(file.package_scope).lookup("B").unwrap();
        let ObjDecl::Value { spec, index } = &program.object(id).decl else {
            panic!("expected value decl");
        };
        assert_eq!(*index, 0);
        assert_eq!(spec.iota, 1);
        assert!(spec.values.is_empty());
        let effective = spec.effective();
        assert_eq!(effective.names[0].name, "A");
        assert_eq!(effective.values.len(), 1);
    }

    #[test]
    fn embedded_fields_get_objects_named_after_their_type() {
        let (program, file) = parse_ok(
            "package p\n\nimport \"example.com/pkg\"\n\ntype S struct {\n\t*pkg.Base\n\tT\n\tname string\n}\n\ntype T int\n",
        );
        let Decl::Gen(gen) = &file.decls[1] else {
            panic!("expected type decl");
        };
        let Spec::Type(spec) = &gen.specs[0] else {
            panic!("expected type spec");
        };
        let Expr::StructType { fields, .. } = &*spec.ty else {
            panic!("expected struct");
        };
        let embedded: Vec<_> = fields
            .list
            .iter()
            .map(|field| field.embedded.map(|id| program.object(id).name.clone()))
            .collect();
        assert_eq!(
            embedded,
            vec![Some("Base".to_string()), Some("T".to_string()), None]
        );
        let name = fields.list[2].names[0].obj().unwrap();
        assert!(matches!(program.object(name).decl, ObjDecl::Field(_)));
    }

    #[test]
    fn imports_are_declared_in_the_file_scope() {
        let (program, file) = parse_ok(
            "package p\n\nimport (\n\t\"fmt\"\n\tstr \"strings\"\n\t. \"math\"\n\t_ \"embed\"\n\t\"gopkg.in/yaml.v3\"\n)\n",
        );
        assert_eq!(file.imports.len(), 5);
        let scope = program.scope(file.file_scope);
        for name in ["fmt", "str", "yaml"] {
            let id = scope.lookup(name).unwrap_or_else(|| panic!("{name}"));
            assert_eq!(program.object(id).kind, ObjKind::Pkg);
            assert!(matches!(program.object(id).decl, ObjDecl::Import(_)));
        }
        assert_eq!(scope.lookup("math"), None);
        assert_eq!(scope.lookup("_"), None);
        assert_eq!(scope.dot_imports.len(), 1);
        assert_eq!(program.scope(file.package_scope).lookup("fmt"), None);
    }

    #[test]
    fn import_names_come_from_the_namer() {
        struct FixedNamer;

        impl ImportNamer for FixedNamer {
            fn import_name(&mut self, path: &str, _src_dir: &Path) -> Option<String> {
                (path == "example.com/thing").then(|| "custom".to_string())
            }
        }

        let mut program = Program::new();
        let mut namer = FixedNamer;
        let config = ParseConfig::new().with_namer(&mut namer);
        let src = "package p\n\nimport (\n\t\"example.com/thing\"\n\t\"example.com/other\"\n)\n";
        let parsed = parse_file(&mut program, "test.go", src.as_bytes(), config).unwrap();
        let scope = program.scope(parsed.file.file_scope);
        assert!(scope.lookup("custom").is_some());
        assert!(scope.lookup("thing").is_none());
        assert!(scope.lookup("other").is_some());
    }

    #[test]
    fn package_path_is_recorded_on_objects() {
        let mut program = Program::new();
        let config = ParseConfig::new().with_package_path("example.com/p");
        let parsed =
            parse_file(&mut program, "p.go", b"package p\n\nvar X int\n", config).unwrap();
        let id = program.scope(parsed.file.package_scope).lookup("X").unwrap();
        assert_eq!(program.object(id).pkg_path, "example.com/p");
    }

    #[test]
    fn package_clause_only_mode_skips_declarations() {
        let mut program = Program::new();
        let config = ParseConfig::new().with_mode(ParseMode::PackageClauseOnly);
        let parsed =
            parse_file(&mut program, "p.go", b"package p\n\nfunc F() {}\n", config).unwrap();
        assert!(parsed.file.decls.is_empty());
        assert!(parsed.errors.is_empty());
        assert_eq!(program.scope(parsed.file.package_scope).lookup("F"), None);
    }
}

mod scopes {
    use super::*;

    #[test]
    fn locals_bind_at_parse_time_and_globals_defer() {
        let (program, file) = parse_ok(
            "package p\n\nvar g int\n\nfunc f(x int) int {\n\ty := x + g\n\treturn y\n}\n",
        );
        let Stmt::Assign(assign) = &body(&file, "f")[0] else {
            panic!("expected assignment");
        };
        let Expr::Binary { x, y, .. } = &*assign.rhs[0] else {
            panic!("expected binary expression");
        };
        let param = ident(x).obj().expect("parameter binding");
        assert!(matches!(program.object(param).decl, ObjDecl::Field(_)));

        let Resolution::Deferred(scope) = ident(y).resolution else {
            panic!("expected deferred lookup");
        };
        assert_eq!(scope, file.file_scope);
        let g = program.lookup(scope, "g").unwrap();
        assert_eq!(program.object(g).kind, ObjKind::Var);
    }

    #[test]
    fn short_var_decls_declare_only_new_names() {
        let (program, file) = parse_ok(
            "package p\n\nfunc f() {\n\ta, b := 1, 2\n\ta, c := 3, 4\n\t_, _ = b, c\n}\n",
        );
        let stmts = body(&file, "f");
        let (Stmt::Assign(first), Stmt::Assign(second)) = (&stmts[0], &stmts[1]) else {
            panic!("expected assignments");
        };
        let a = ident(&first.lhs[0]).obj().unwrap();
        assert_eq!(ident(&second.lhs[0]).obj(), Some(a));

        let c = ident(&second.lhs[1]).obj().unwrap();
        assert_ne!(c, a);
        let ObjDecl::Assign { index, .. } = &program.object(c).decl else {
            panic!("expected assign decl");
        };
        assert_eq!(*index, 1);
    }

    #[test]
    fn range_variables_record_their_operand() {
        let (program, file) = parse_ok(
            "package p\n\nfunc f(xs []string) {\n\tfor i, v := range xs {\n\t\t_, _ = i, v\n\t}\n}\n",
        );
        let Stmt::Range { key, value, x, .. } = &body(&file, "f")[0] else {
            panic!("expected range statement");
        };
        assert_eq!(ident(x).name, "xs");
        let key = ident(key.as_ref().unwrap()).obj().unwrap();
        let value = ident(value.as_ref().unwrap()).obj().unwrap();
        assert!(matches!(
            program.object(key).decl,
            ObjDecl::Range { value: false, .. }
        ));
        assert!(matches!(
            program.object(value).decl,
            ObjDecl::Range { value: true, .. }
        ));
    }

    #[test]
    fn type_switch_clauses_get_their_own_guard_object() {
        let (program, file) = parse_ok(
            "package p\n\nfunc f(v any) {\n\tswitch y := v.(type) {\n\tcase int:\n\t\t_ = y\n\tcase nil, string:\n\t\t_ = y\n\t}\n}\n",
        );
        let Stmt::TypeSwitch { body: block, .. } = &body(&file, "f")[0] else {
            panic!("expected type switch");
        };
        let guard_in = |clause: &Stmt| {
            let Stmt::CaseClause { body, .. } = clause else {
                panic!("expected case clause");
            };
            let Stmt::Assign(assign) = &body[0] else {
                panic!("expected assignment");
            };
            ident(&assign.rhs[0]).obj().unwrap()
        };

        let first = guard_in(&block.list[0]);
        let ObjDecl::TypeSwitch { case_type, .. } = &program.object(first).decl else {
            panic!("expected type switch decl");
        };
        assert_eq!(ident(case_type.as_ref().unwrap()).name, "int");

        let second = guard_in(&block.list[1]);
        assert_ne!(first, second);
        assert!(matches!(
            program.object(second).decl,
            ObjDecl::TypeSwitch {
                case_type: None,
                ..
            }
        ));
    }

    #[test]
    fn labels_resolve_within_the_function() {
        let (program, file) =
            parse_ok("package p\n\nfunc f() {\nouter:\n\tfor {\n\t\tbreak outer\n\t}\n}\n");
        let Stmt::Labeled { label, stmt, .. } = &body(&file, "f")[0] else {
            panic!("expected labeled statement");
        };
        let Stmt::For { body: block, .. } = &**stmt else {
            panic!("expected for");
        };
        let Stmt::Branch {
            label: Some(target),
            ..
        } = &block.list[0]
        else {
            panic!("expected branch");
        };
        let Resolution::Deferred(scope) = target.resolution else {
            panic!("expected deferred label");
        };
        assert_eq!(program.scope(scope).lookup("outer"), label.obj());
        assert_eq!(program.object(label.obj().unwrap()).kind, ObjKind::Lbl);
    }
}

mod generics {
    use super::*;

    #[test]
    fn type_parameters_are_declared() {
        let (program, file) = parse_ok(
            "package p\n\ntype List[T any] struct {\n\tnext *List[T]\n\tval  T\n}\n\nfunc Map[K comparable, V any](m map[K]V) []V {\n\treturn nil\n}\n",
        );
        let Decl::Gen(gen) = &file.decls[0] else {
            panic!("expected type decl");
        };
        let Spec::Type(spec) = &gen.specs[0] else {
            panic!("expected type spec");
        };
        assert_eq!(spec.type_params.as_ref().map(|p| p.list.len()), Some(1));
        let Expr::StructType { fields, .. } = &*spec.ty else {
            panic!("expected struct");
        };
        let param = ident(&fields.list[1].ty).obj().expect("type parameter binding");
        assert!(matches!(
            program.object(param).decl,
            ObjDecl::TypeParam { .. }
        ));

        let map = func(&file, "Map");
        let type_params = map.ty.type_params.as_ref().unwrap();
        assert_eq!(type_params.num_fields(), 2);
        let Expr::MapType { key, .. } = &*map.ty.params.list[0].ty else {
            panic!("expected map parameter");
        };
        assert_eq!(ident(key).obj(), type_params.list[0].names[0].obj());
    }

    #[test]
    fn generic_receivers_register_methods_on_the_base_type() {
        let (program, file) = parse_ok(
            "package p\n\ntype List[T any] []T\n\nfunc (l *List[T]) First() T {\n\treturn (*l)[0]\n}\n",
        );
        let methods = program.methods(file.package_scope, "List");
        assert_eq!(methods.len(), 1);
        assert_eq!(program.object(methods[0]).name, "First");

        let first = func(&file, "First");
        let result = &first.ty.results.as_ref().unwrap().list[0].ty;
        let id = ident(result).obj().expect("receiver type parameter");
        assert!(matches!(program.object(id).decl, ObjDecl::TypeParam { .. }));
    }

    #[test]
    fn instantiation_and_constraints_parse() {
        parse_ok(
            "package p\n\ntype Number interface {\n\t~int | ~float64\n}\n\nfunc Sum[N Number](xs ...N) N {\n\tvar total N\n\tfor _, x := range xs {\n\t\ttotal += x\n\t}\n\treturn total\n}\n\nvar s = Sum[int](1, 2)\nvar p = Pair[string, int]{}\n\ntype Pair[K comparable, V any] struct {\n\tk K\n\tv V\n}\n",
        );
    }
}

mod ambiguity {
    use super::*;

    #[test]
    fn composite_literals_and_control_clauses() {
        parse_ok(
            "package p\n\ntype T struct{ ok bool }\n\nfunc f(a [][]int, i int, m map[string]T) {\n\tfor _, x := range a[i] {\n\t\t_ = x\n\t}\n\tif v := (T{}); v.ok {\n\t}\n\tfor k := range m {\n\t\t_ = k\n\t}\n\tif m[\"a\"] == (T{}) {\n\t}\n\t_ = []T{{ok: true}}\n\t_ = map[string]int{\"a\": 1}\n\tfor range 10 {\n\t}\n}\n",
        );
    }

    #[test]
    fn statements_parse() {
        parse_ok(
            "package p\n\nfunc f(ch chan int, done <-chan struct{}) (n int, err error) {\n\tdefer func() { recover() }()\n\tgo func(c chan<- int) { c <- 1 }(ch)\n\tselect {\n\tcase v, ok := <-ch:\n\t\t_, _ = v, ok\n\tcase <-done:\n\t\treturn\n\tdefault:\n\t}\n\tswitch {\n\tcase n > 0:\n\t\tfallthrough\n\tdefault:\n\t\tn++\n\t}\n\tx := [...]int{1, 2, 3}\n\t_ = x[1:2:3]\n\treturn len(x), nil\n}\n",
        );
    }
}

mod recovery {
    use super::*;

    #[test]
    fn missing_package_clause_fails() {
        let mut program = Program::new();
        let err = parse_file(
            &mut program,
            "test.go",
            b"func main() {}\n",
            ParseConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.message, "expected 'package', found 'func'");
        assert_eq!(err.position.filename, "test.go");
        assert_eq!(err.position.line, 1);
        assert_eq!(err.to_string(), "test.go:1:1: expected 'package', found 'func'");
    }

    #[test]
    fn syntax_errors_leave_a_partial_file() {
        let (program, parsed) = parse("package p\n\nfunc ok() {}\n\nfunc broken( {\n");
        assert!(!parsed.errors.is_empty());
        assert!(program
            .scope(parsed.file.package_scope)
            .lookup("ok")
            .is_some());
    }

    #[test]
    fn parsing_stops_after_too_many_errors() {
        let src = format!("package p\n\n{}", "var = = =\n".repeat(50));
        let (_, parsed) = parse(&src);
        assert!(!parsed.errors.is_empty());
        assert!(parsed.errors.len() <= MAX_ERRORS);
    }
}

mod entry_points {
    use super::*;

    #[test]
    fn parse_expr_resolves_against_a_scope() {
        let (mut program, file) = parse_ok("package p\n\nimport \"fmt\"\n\nvar _ = fmt.Sprint\n");
        let expr = parse_expr(&mut program, file.file_scope, "fmt.Println").unwrap();
        let Expr::Selector { x, sel } = &*expr else {
            panic!("expected selector");
        };
        assert_eq!(sel.name, "Println");
        let Resolution::Deferred(scope) = ident(x).resolution else {
            panic!("expected deferred");
        };
        let pkg = program.lookup(scope, "fmt").unwrap();
        assert_eq!(program.object(pkg).kind, ObjKind::Pkg);
    }

    #[test]
    fn parse_expr_rejects_trailing_tokens() {
        let mut program = Program::new();
        let scope = program.universe();
        let err = parse_expr(&mut program, scope, "a b").unwrap_err();
        assert!(err.message.starts_with("expected end of expression"));
    }

    #[test]
    fn package_names() {
        assert_eq!(
            parse_package_name(b"// comment\npackage foo\n"),
            Some("foo".to_string())
        );
        assert_eq!(parse_package_name(b"/* x */ package bar"), Some("bar".to_string()));
        assert_eq!(parse_package_name(b"package\n"), None);
        assert_eq!(parse_package_name(b"func f() {}"), None);
    }

    #[test]
    fn default_import_names() {
        assert_eq!(default_import_name("fmt"), "fmt");
        assert_eq!(default_import_name("net/http"), "http");
        assert_eq!(default_import_name("github.com/foo/bar/v2"), "bar");
        assert_eq!(default_import_name("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(default_import_name("github.com/mattn/go-sqlite3"), "sqlite3");
        assert_eq!(default_import_name("github.com/a/b-go"), "b");
    }
}

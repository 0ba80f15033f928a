use std::fs;

use godef_syntax::{parse_expr, parse_file, print_expr, ParseConfig, ScopeId};

use super::*;
use crate::context::BuildContext;

const SRC: &str = r#"package p

type Point struct {
	X, Y int
}

func (p Point) Norm() float64 { return 0 }

func (p *Point) Scale(f float64) {}

type Named struct {
	Point
	Name string
}

type Shape interface {
	Area() float64
	fmt
}

type fmt interface {
	String() string
}

type Alias = Point

type List[T any] struct {
	items []T
}

func (l *List[T]) First() T { var zero T; return zero }

func pair() (int, string) { return 0, "" }

func Map[T, U any](xs []T, f func(T) U) []U { return nil }

const Big = 1 << 10

const (
	A = iota
	B
)

var (
	origin    = Point{}
	named     = &Named{}
	n, s      = pair()
	m         = map[string][]byte{}
	v, ok     = m["k"]
	ch        = make(chan Point)
	ints      = List[int]{}
	shape     Shape
	msg       = "hello"
	nums      = [4]int{}
	alias     Alias
	cyclic    = cyclic
)
"#;

struct Fixture {
    program: Program,
    importer: Importer,
    scope: ScopeId,
}

impl Fixture {
    fn new(src: &str) -> Self {
        let mut program = Program::new();
        let parsed =
            parse_file(&mut program, "p.go", src.as_bytes(), ParseConfig::default()).unwrap();
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        Fixture {
            program,
            importer: Importer::new(BuildContext::default()),
            scope: parsed.file.file_scope,
        }
    }

    fn expr(&mut self, text: &str) -> ExprRef {
        parse_expr(&mut self.program, self.scope, text).unwrap()
    }

    /// Printed type and kind of `text`.
    fn type_of(&mut self, text: &str) -> (Option<String>, ObjKind) {
        let expr = self.expr(text);
        let mut checker = Checker::new(&mut self.program, &mut self.importer);
        let ty = checker.expr_type(&expr);
        (ty.expr().map(|e| print_expr(e)), ty.kind)
    }

    fn printed(&mut self, text: &str) -> Option<String> {
        self.type_of(text).0
    }

    /// Name and kind of the object `text` refers to.
    fn object_of(&mut self, text: &str) -> Option<(String, ObjKind)> {
        let expr = self.expr(text);
        let mut checker = Checker::new(&mut self.program, &mut self.importer);
        let (id, _) = checker.expr_object(&expr);
        id.map(|id| {
            let obj = checker.program().object(id);
            (obj.name.clone(), obj.kind)
        })
    }

    fn member_names(&mut self, text: &str) -> Vec<String> {
        let expr = self.expr(text);
        let mut checker = Checker::new(&mut self.program, &mut self.importer);
        let ty = checker.expr_type(&expr);
        checker
            .members(&ty)
            .into_iter()
            .map(|id| checker.program().object(id).name.clone())
            .collect()
    }
}

mod values {
    use super::*;

    #[test]
    fn literals_take_default_types() {
        let mut f = Fixture::new(SRC);
        assert_eq!(f.type_of("1"), (Some("int".to_string()), ObjKind::Con));
        assert_eq!(f.printed("1.5"), Some("float64".to_string()));
        assert_eq!(f.printed("'x'"), Some("rune".to_string()));
        assert_eq!(f.printed("msg"), Some("string".to_string()));
        assert_eq!(f.type_of("Big"), (Some("int".to_string()), ObjKind::Con));
        assert_eq!(f.type_of("B"), (Some("int".to_string()), ObjKind::Con));
        assert_eq!(f.type_of("true"), (Some("bool".to_string()), ObjKind::Con));
    }

    #[test]
    fn multi_value_and_comma_ok() {
        let mut f = Fixture::new(SRC);
        assert_eq!(f.printed("n"), Some("int".to_string()));
        assert_eq!(f.printed("s"), Some("string".to_string()));
        assert_eq!(f.printed("v"), Some("[]byte".to_string()));
        assert_eq!(f.printed("ok"), Some("bool".to_string()));
    }

    #[test]
    fn operators() {
        let mut f = Fixture::new(SRC);
        assert_eq!(f.printed("&origin"), Some("*Point".to_string()));
        assert_eq!(f.printed("*named"), Some("Named".to_string()));
        assert_eq!(f.printed("<-ch"), Some("Point".to_string()));
        assert_eq!(f.printed("n == 1"), Some("bool".to_string()));
        assert_eq!(f.printed("2 * origin.X"), Some("int".to_string()));
        assert_eq!(f.printed("msg[0]"), Some("byte".to_string()));
        assert_eq!(f.printed("nums[1:]"), Some("[]int".to_string()));
        assert_eq!(f.printed("m[\"k\"][0]"), Some("byte".to_string()));
    }

    #[test]
    fn calls_and_conversions() {
        let mut f = Fixture::new(SRC);
        assert_eq!(f.printed("origin.Norm()"), Some("float64".to_string()));
        assert_eq!(f.type_of("float64(1)"), (Some("float64".to_string()), ObjKind::Var));
        assert_eq!(f.printed("new(Point)"), Some("*Point".to_string()));
        assert_eq!(f.printed("make([]Point, 3)"), Some("[]Point".to_string()));
        assert_eq!(f.printed("len(msg)"), Some("int".to_string()));
        assert!(f.type_of("pair()").0.is_none());
    }

    #[test]
    fn generics() {
        let mut f = Fixture::new(SRC);
        assert_eq!(f.printed("ints"), Some("List[int]".to_string()));
        assert_eq!(f.printed("ints.First()"), Some("T".to_string()));
        assert_eq!(
            f.object_of("ints.items"),
            Some(("items".to_string(), ObjKind::Var))
        );
        assert_eq!(f.type_of("Map[int, string]").1, ObjKind::Fun);
    }

    #[test]
    fn cyclic_declarations_have_no_type() {
        let mut f = Fixture::new(SRC);
        assert_eq!(f.printed("cyclic"), None);
    }
}

mod selectors {
    use super::*;

    #[test]
    fn fields_and_methods() {
        let mut f = Fixture::new(SRC);
        assert_eq!(f.object_of("origin.X"), Some(("X".to_string(), ObjKind::Var)));
        assert_eq!(f.object_of("origin.Scale"), Some(("Scale".to_string(), ObjKind::Fun)));
        assert_eq!(f.object_of("Point.Norm"), Some(("Norm".to_string(), ObjKind::Fun)));
        assert_eq!(f.object_of("origin.Missing"), None);
    }

    #[test]
    fn promotion_through_embedding() {
        let mut f = Fixture::new(SRC);
        assert_eq!(f.object_of("named.Y"), Some(("Y".to_string(), ObjKind::Var)));
        assert_eq!(f.object_of("named.Norm"), Some(("Norm".to_string(), ObjKind::Fun)));
        assert_eq!(f.object_of("named.Point"), Some(("Point".to_string(), ObjKind::Var)));
        assert_eq!(f.object_of("shape.String"), Some(("String".to_string(), ObjKind::Fun)));
    }

    #[test]
    fn aliases_share_methods() {
        let mut f = Fixture::new(SRC);
        assert_eq!(f.object_of("alias.Norm"), Some(("Norm".to_string(), ObjKind::Fun)));
    }

    #[test]
    fn member_listing_is_sorted_and_deduplicated() {
        let mut f = Fixture::new(SRC);
        assert_eq!(
            f.member_names("named"),
            vec!["Name", "Norm", "Point", "Scale", "X", "Y"]
        );
        assert_eq!(f.member_names("shape"), vec!["Area", "String"]);
        assert!(f.member_names("msg").is_empty());
    }
}

#[test]
fn underlying_follows_named_types() {
    let mut f = Fixture::new(SRC);
    let expr = f.expr("Named");
    let mut checker = Checker::new(&mut f.program, &mut f.importer);
    let under = checker.underlying(&expr);
    assert!(matches!(&*under, Expr::StructType { .. }));
    let int = checker.predeclared("int");
    let int = int.expr().unwrap();
    assert_eq!(print_expr(&checker.underlying(int)), "int");
}

#[test]
fn imported_package_members() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("goroot/src/strs");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("strs.go"),
        "package strs\n\ntype Builder struct{ n int }\n\nfunc (b *Builder) Len() int { return b.n }\n\nfunc New() *Builder { return nil }\n",
    )
    .unwrap();

    let src = "package p\n\nimport \"strs\"\n\nvar b = strs.New()\n";
    let mut program = Program::new();
    let parsed = parse_file(&mut program, "p.go", src.as_bytes(), ParseConfig::default()).unwrap();
    let ctx = BuildContext {
        goroot: Some(tmp.path().join("goroot")),
        ..BuildContext::default()
    }
    .with_gopath(Vec::new());
    let mut importer = Importer::new(ctx);
    let expr = parse_expr(&mut program, parsed.file.file_scope, "b.Len").unwrap();
    let mut checker = Checker::new(&mut program, &mut importer);
    let (id, ty) = checker.expr_object(&expr);
    let obj = checker.program().object(id.unwrap());
    assert_eq!(obj.name, "Len");
    assert_eq!(obj.pkg_path, "strs");
    assert_eq!(print_expr(ty.expr().unwrap()), "func() int");
}

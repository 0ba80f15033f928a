//! Definition resolution: from a query against one source file to the
//! [`Definition`] of the object it names.
//!
//! ## Tiers
//!
//! 1. The principal file alone, plus the packages it imports.
//! 2. The principal file merged with its sibling files of the same package.
//!
//! The first tier is skipped when type output is requested, so types and
//! members are always described against the whole package.

use godef_core::{Definition, GodefError, Kind, OutputOptions};
use godef_syntax::{
    parse_expr, parse_file, print_expr, unquote, ExprRef, ImportSpec, ObjDecl, ObjId, ObjKind,
    ParseConfig, Program,
};
use tracing::debug;

use crate::context::BuildContext;
use crate::import_path::find_package_dir;
use crate::importer::Importer;
use crate::lookup::{locate, ResolvedNode};
use crate::package::Package;
use crate::types::{Checker, Type};

/// What to look up in the principal file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// The identifier at a byte offset.
    Offset(usize),
    /// An identifier or selector expression, resolved in the file's scope.
    Expression(String),
}

impl Query {
    /// Build a query from an optional expression and an offset that is
    /// negative when absent. The expression wins when both are given.
    pub fn from_args(expr: Option<&str>, offset: i64) -> Result<Query, GodefError> {
        if let Some(expr) = expr.filter(|e| !e.is_empty()) {
            return Ok(Query::Expression(expr.to_string()));
        }
        match usize::try_from(offset) {
            Ok(offset) => Ok(Query::Offset(offset)),
            Err(_) => Err(GodefError::NoQuerySpecified),
        }
    }
}

/// Resolves queries against one principal file.
pub struct Resolver {
    program: Program,
    importer: Importer,
    package: Package,
    src: Vec<u8>,
}

impl Resolver {
    /// Parse the principal file. Syntax errors are tolerated as long as the
    /// package clause parses.
    pub fn new(ctx: BuildContext, filename: &str, src: &[u8]) -> Result<Self, GodefError> {
        let mut program = Program::new();
        let mut importer = Importer::new(ctx);
        let config = ParseConfig::new().with_namer(importer.namer());
        let parsed = parse_file(&mut program, filename, src, config)?;
        for err in &parsed.errors {
            debug!(%err, "syntax error in principal file");
        }
        Ok(Resolver {
            program,
            importer,
            package: Package::new(parsed.file),
            src: src.to_vec(),
        })
    }

    /// The principal file's package, with the siblings merged so far.
    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn resolve(&mut self, query: &Query, opts: OutputOptions) -> Result<Definition, GodefError> {
        let opts = opts.normalized();
        let mut node = match query {
            Query::Expression(text) => self.parse_query(text)?,
            Query::Offset(offset) => {
                let principal = self.package.principal().clone();
                locate(&mut self.program, &principal, &self.src, *offset)?
            }
        };
        let expr = match node {
            ResolvedNode::Import(ref spec) => return self.import_definition(spec),
            ResolvedNode::Identifier(ref expr) | ResolvedNode::Selector(ref expr) => expr.clone(),
        };

        if !opts.show_type {
            if let Some(def) = self.infer(&expr, opts) {
                return Ok(def);
            }
            debug!(expr = %print_expr(&expr), "not declared in principal file, trying package");
        }

        match self
            .package
            .aggregate(&mut self.program, self.importer.namer())
        {
            Ok(added) => debug!(added, "package tier"),
            Err(err) => debug!(%err, "package tier without siblings"),
        }
        if let Query::Expression(text) = query {
            node = self.parse_query(text)?;
        }
        let Some(expr) = node.expr().cloned() else {
            return Err(GodefError::NotFound);
        };
        self.infer(&expr, opts)
            .ok_or_else(|| GodefError::NoDeclarationFound {
                expr: print_expr(&expr),
            })
    }

    /// Parse a query expression against the principal file's scope.
    fn parse_query(&mut self, text: &str) -> Result<ResolvedNode, GodefError> {
        let scope = self.package.principal().file_scope;
        let expr = parse_expr(&mut self.program, scope, text)
            .map_err(|err| GodefError::unresolvable(format!("cannot parse expression: {err}")))?;
        Ok(ResolvedNode::from_expr(expr)?)
    }

    fn infer(&mut self, expr: &ExprRef, opts: OutputOptions) -> Option<Definition> {
        let mut checker = Checker::new(&mut self.program, &mut self.importer);
        let (id, ty) = checker.expr_object(expr);
        let id = id?;
        Some(describe(&mut checker, id, &ty, opts.members))
    }

    fn import_definition(&self, spec: &ImportSpec) -> Result<Definition, GodefError> {
        let literal = &spec.path.value;
        let path = unquote(literal).map_err(|_| GodefError::MalformedImportLiteral {
            literal: literal.clone(),
        })?;
        let dir = find_package_dir(self.importer.context(), &path, &self.package.dir)
            .map_err(|err| err.into_godef_error(&path))?;
        Ok(Definition::path(dir.to_string_lossy()))
    }
}

/// Resolve `query` in the file `filename` with contents `src`.
pub fn find_definition(
    ctx: BuildContext,
    filename: &str,
    src: &[u8],
    query: &Query,
    opts: OutputOptions,
) -> Result<Definition, GodefError> {
    Resolver::new(ctx, filename, src)?.resolve(query, opts)
}

/// Build the definition of object `id` whose inferred type is `ty`.
fn describe(checker: &mut Checker<'_>, id: ObjId, ty: &Type, with_members: bool) -> Definition {
    let obj = checker.program().object(id).clone();
    let position = checker.program().fileset().position(obj.pos);
    let mut def = Definition::new(obj.name.clone(), Kind::from(obj.kind), position);
    def.pkg = obj.pkg_path.clone();

    let printed = || ty.expr().map(|e| print_expr(e));
    match obj.kind {
        ObjKind::Typ => {
            def.type_str = match &obj.decl {
                ObjDecl::Type(spec) => Some(print_expr(&spec.ty)),
                ObjDecl::TypeParam { constraint } => Some(print_expr(constraint)),
                _ => None,
            };
            if with_members {
                for member in checker.members(ty) {
                    let member_ty = checker.object_type(member);
                    def.members.push(describe(checker, member, &member_ty, false));
                }
            }
        }
        ObjKind::Con => {
            def.type_str = printed();
            def.value = match &obj.decl {
                ObjDecl::Value { spec, index } => {
                    spec.effective().values.get(*index).map(|v| print_expr(v))
                }
                _ => None,
            };
        }
        ObjKind::Pkg => {
            def.value = match &obj.decl {
                ObjDecl::Import(spec) => Some(spec.path.value.clone()),
                _ => None,
            };
        }
        ObjKind::Var | ObjKind::Fun => def.type_str = printed(),
        ObjKind::Lbl | ObjKind::Bad => {}
    }
    def
}

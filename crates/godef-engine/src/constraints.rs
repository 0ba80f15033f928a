//! Build constraints: `//go:build` lines, `// +build` lines and
//! `_GOOS`/`_GOARCH` file name suffixes.
//!
//! ## Grammar
//!
//! ```text
//! <expr>   := <and> ("||" <and>)*
//! <and>    := <unary> ("&&" <unary>)*
//! <unary>  := "!" <unary> | "(" <expr> ")" | <tag>
//! <tag>    := [A-Za-z0-9_.]+
//! ```
//!
//! A `// +build` line is a space-separated disjunction of comma-separated
//! conjunctions of possibly negated tags; multiple lines are ANDed. They are
//! consulted only when a file has no `//go:build` line.

use thiserror::Error;
use winnow::ascii::space0;
use winnow::combinator::{alt, delimited, preceded, repeat};
use winnow::prelude::*;
use winnow::token::take_while;
use winnow::ModalResult;

use crate::context::{BuildContext, KNOWN_ARCH, KNOWN_OS};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("invalid //go:build expression '{input}': {message}")]
    InvalidExpression { input: String, message: String },
}

/// A parsed build constraint expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Tag(String),
    Not(Box<Constraint>),
    And(Vec<Constraint>),
    Or(Vec<Constraint>),
}

impl Constraint {
    pub fn eval(&self, ctx: &BuildContext) -> bool {
        match self {
            Constraint::Tag(tag) => ctx.matches_tag(tag),
            Constraint::Not(inner) => !inner.eval(ctx),
            Constraint::And(all) => all.iter().all(|c| c.eval(ctx)),
            Constraint::Or(any) => any.iter().any(|c| c.eval(ctx)),
        }
    }
}

/// Parse the expression following `//go:build`.
pub fn parse_constraint(input: &str) -> Result<Constraint, ConstraintError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ConstraintError::InvalidExpression {
            input: input.to_string(),
            message: "empty expression".to_string(),
        });
    }
    parse_or
        .parse(trimmed)
        .map_err(|e| ConstraintError::InvalidExpression {
            input: trimmed.to_string(),
            message: format!("unexpected input at offset {}", e.offset()),
        })
}

/// Parse the options of a `// +build` line.
pub fn parse_plus_build(line: &str) -> Constraint {
    let options = line
        .split_whitespace()
        .map(|option| {
            let terms = option
                .split(',')
                .map(|term| match term.strip_prefix('!') {
                    Some(tag) => Constraint::Not(Box::new(Constraint::Tag(tag.to_string()))),
                    None => Constraint::Tag(term.to_string()),
                })
                .collect();
            Constraint::And(terms)
        })
        .collect();
    Constraint::Or(options)
}

/// The constraint in the header comments of a source file, if any.
pub fn file_constraint(src: &[u8]) -> Result<Option<Constraint>, ConstraintError> {
    let mut plus_build = Vec::new();
    let mut in_block = false;
    for line in String::from_utf8_lossy(src).lines() {
        let line = line.trim();
        if in_block {
            if line.contains("*/") {
                in_block = false;
            }
            continue;
        }
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("/*") {
            in_block = !rest.contains("*/");
            continue;
        }
        let Some(comment) = line.strip_prefix("//") else {
            break;
        };
        if let Some(expr) = comment.strip_prefix("go:build") {
            if expr.is_empty() || expr.starts_with([' ', '\t']) {
                return parse_constraint(expr).map(Some);
            }
        }
        if let Some(options) = comment.trim_start().strip_prefix("+build") {
            if options.is_empty() || options.starts_with([' ', '\t']) {
                plus_build.push(parse_plus_build(options));
            }
        }
    }
    Ok(match plus_build.len() {
        0 => None,
        1 => plus_build.pop(),
        _ => Some(Constraint::And(plus_build)),
    })
}

/// Whether a file name's `_GOOS`, `_GOARCH` or `_GOOS_GOARCH` suffix (before
/// an optional `_test`) matches the context.
pub fn matches_file_name(ctx: &BuildContext, file_name: &str) -> bool {
    let stem = file_name.strip_suffix(".go").unwrap_or(file_name);
    let Some(idx) = stem.find('_') else {
        return true;
    };
    let mut parts: Vec<&str> = stem[idx..].split('_').collect();
    if parts.len() >= 2 && parts.last() == Some(&"test") {
        parts.pop();
    }
    let n = parts.len();
    let known_os = |s: &str| KNOWN_OS.contains(&s);
    let known_arch = |s: &str| KNOWN_ARCH.contains(&s);
    if n >= 2 && known_os(parts[n - 2]) && known_arch(parts[n - 1]) {
        return ctx.matches_tag(parts[n - 2]) && ctx.matches_tag(parts[n - 1]);
    }
    if n >= 1 && known_os(parts[n - 1]) {
        return ctx.matches_tag(parts[n - 1]);
    }
    if n >= 1 && known_arch(parts[n - 1]) {
        return ctx.matches_tag(parts[n - 1]);
    }
    true
}

/// Whether a file takes part in the build: its name is not ignored, its
/// suffix matches, and its header constraint (if any) holds.
pub fn should_build(ctx: &BuildContext, file_name: &str, src: &[u8]) -> Result<bool, ConstraintError> {
    if file_name.starts_with(['_', '.']) || !matches_file_name(ctx, file_name) {
        return Ok(false);
    }
    Ok(file_constraint(src)?.is_none_or(|c| c.eval(ctx)))
}

// ============================================================================
// Parser implementation using winnow
// ============================================================================

fn parse_or(input: &mut &str) -> ModalResult<Constraint> {
    let first = parse_and(input)?;
    let rest: Vec<Constraint> =
        repeat(0.., preceded((space0, "||", space0), parse_and)).parse_next(input)?;
    let _ = space0.parse_next(input)?;
    Ok(combine(first, rest, Constraint::Or))
}

fn parse_and(input: &mut &str) -> ModalResult<Constraint> {
    let first = parse_unary(input)?;
    let rest: Vec<Constraint> =
        repeat(0.., preceded((space0, "&&", space0), parse_unary)).parse_next(input)?;
    Ok(combine(first, rest, Constraint::And))
}

fn parse_unary(input: &mut &str) -> ModalResult<Constraint> {
    let _ = space0.parse_next(input)?;
    alt((
        preceded('!', parse_unary).map(|c| Constraint::Not(Box::new(c))),
        delimited(('(', space0), parse_or, (space0, ')')),
        parse_tag,
    ))
    .parse_next(input)
}

fn parse_tag(input: &mut &str) -> ModalResult<Constraint> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '.')
        .map(|tag: &str| Constraint::Tag(tag.to_string()))
        .parse_next(input)
}

fn combine(
    first: Constraint,
    rest: Vec<Constraint>,
    build: fn(Vec<Constraint>) -> Constraint,
) -> Constraint {
    if rest.is_empty() {
        first
    } else {
        let mut all = vec![first];
        all.extend(rest);
        build(all)
    }
}

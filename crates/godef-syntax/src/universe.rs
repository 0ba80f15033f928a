// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Predeclared identifiers.
//!
//! Basic types, `true`, `false`, `iota` and `nil` are declared directly.
//! `error`, `any`, `comparable` and the builtin functions come from a small
//! Go prelude parsed into the universe scope; it is registered as a builtin
//! file so none of its positions translate to a location.

use crate::parser::{parse_file, ParseConfig};
use crate::program::Program;
use crate::scope::{ObjDecl, ObjKind};
use crate::token::Pos;

/// Name of the prelude in the file set.
pub const PRELUDE_FILENAME: &str = "<builtin>";

pub const BASIC_TYPES: &[&str] = &[
    "bool",
    "byte",
    "complex64",
    "complex128",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

const PRELUDE: &str = r#"package builtin

type error interface {
	Error() string
}

type any = interface{}

type comparable interface{}

func append[T any](slice []T, elems ...T) []T
func cap(v any) int
func clear(t any)
func close(c any)
func complex(r, i float64) complex128
func copy(dst, src any) int
func delete(m any, key any)
func imag(c complex128) float64
func len(v any) int
func make(t any, size ...int) any
func max[T any](x T, y ...T) T
func min[T any](x T, y ...T) T
func new(t any) any
func panic(v any)
func print(args ...any)
func println(args ...any)
func real(c complex128) float64
func recover() any
"#;

/// Declare every predeclared identifier into the universe scope of `program`.
pub(crate) fn populate(program: &mut Program) {
    let universe = program.universe();

    for name in BASIC_TYPES {
        let id = program.new_object(ObjKind::Typ, name, Pos::NONE, ObjDecl::Builtin, "");
        program.declare(universe, id);
    }
    for name in ["true", "false", "iota"] {
        let id = program.new_object(ObjKind::Con, name, Pos::NONE, ObjDecl::Builtin, "");
        program.declare(universe, id);
    }
    let nil = program.new_object(ObjKind::Var, "nil", Pos::NONE, ObjDecl::Builtin, "");
    program.declare(universe, nil);

    let config = ParseConfig {
        package_scope: Some(universe),
        builtin: true,
        ..ParseConfig::default()
    };
    let parsed = parse_file(program, PRELUDE_FILENAME, PRELUDE.as_bytes(), config);
    debug_assert!(parsed.is_ok_and(|parsed| parsed.errors.is_empty()));
}

/// Whether `name` is a predeclared basic type.
pub fn is_basic_type(name: &str) -> bool {
    BASIC_TYPES.contains(&name)
}

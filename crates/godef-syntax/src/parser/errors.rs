// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use godef_core::{GodefError, Position};
use thiserror::Error;

use crate::token::Pos;

/// A syntax error with its translated position.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{position}: {message}")]
pub struct ParseError {
    pub pos: Pos,
    pub position: Position,
    pub message: String,
}

impl ParseError {
    pub fn new(pos: Pos, position: Position, message: impl Into<String>) -> Self {
        ParseError {
            pos,
            position,
            message: message.into(),
        }
    }
}

impl From<ParseError> for GodefError {
    fn from(err: ParseError) -> Self {
        let file = err.position.filename.clone();
        GodefError::ParseFailure {
            file,
            message: err.to_string(),
        }
    }
}

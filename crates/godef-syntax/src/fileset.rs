// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The position table shared by every file parsed in one invocation.
//!
//! Each file added to a [`FileSet`] receives a base; a [`Pos`] is that base
//! plus a byte offset. Translating a `Pos` back yields a filename, a 1-based
//! line and a 1-based byte column.

use godef_core::Position;
use memchr::memchr_iter;

use crate::token::Pos;

/// Line table and identity of one file registered in a [`FileSet`].
#[derive(Debug, Clone)]
pub struct SourceFileInfo {
    name: String,
    base: u32,
    size: u32,
    /// Byte offsets of the first character of each line.
    lines: Vec<u32>,
    builtin: bool,
}

impl SourceFileInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// True for files holding predeclared objects; their positions are empty.
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// The position of a byte offset within this file.
    pub fn pos(&self, offset: usize) -> Pos {
        Pos(self.base + offset.min(self.size as usize) as u32)
    }

    fn contains(&self, pos: Pos) -> bool {
        pos.0 >= self.base && pos.0 <= self.base + self.size
    }

    fn line_column(&self, offset: u32) -> (u32, u32) {
        let line = match self.lines.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        (line as u32 + 1, offset - self.lines[line] + 1)
    }
}

/// Position table for one invocation.
#[derive(Debug, Clone)]
pub struct FileSet {
    files: Vec<SourceFileInfo>,
    next_base: u32,
}

impl Default for FileSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSet {
    pub fn new() -> Self {
        FileSet {
            files: Vec::new(),
            next_base: 1,
        }
    }

    /// Register a file and return its base.
    pub fn add_file(&mut self, name: &str, src: &[u8]) -> u32 {
        self.add(name, src, false)
    }

    /// Register a file whose positions translate to the empty position.
    pub fn add_builtin_file(&mut self, name: &str, src: &[u8]) -> u32 {
        self.add(name, src, true)
    }

    fn add(&mut self, name: &str, src: &[u8], builtin: bool) -> u32 {
        let base = self.next_base;
        let size = src.len() as u32;
        let mut lines = vec![0];
        lines.extend(memchr_iter(b'\n', src).map(|idx| idx as u32 + 1));
        // A trailing newline does not start a line.
        if lines.last() == Some(&size) && lines.len() > 1 {
            lines.pop();
        }
        self.files.push(SourceFileInfo {
            name: name.to_string(),
            base,
            size,
            lines,
            builtin,
        });
        self.next_base = base + size + 1;
        base
    }

    /// The file containing `pos`.
    pub fn file(&self, pos: Pos) -> Option<&SourceFileInfo> {
        if !pos.is_valid() {
            return None;
        }
        let idx = match self.files.binary_search_by_key(&pos.0, |f| f.base) {
            Ok(idx) => idx,
            Err(0) => return None,
            Err(idx) => idx - 1,
        };
        self.files.get(idx).filter(|f| f.contains(pos))
    }

    /// The byte offset of `pos` within its file.
    pub fn offset(&self, pos: Pos) -> Option<usize> {
        self.file(pos).map(|f| (pos.0 - f.base) as usize)
    }

    /// The name of the file containing `pos`.
    pub fn filename(&self, pos: Pos) -> Option<&str> {
        self.file(pos).map(|f| f.name.as_str())
    }

    /// Translate `pos` to a filename/line/column position.
    ///
    /// Invalid positions and positions inside builtin files yield the empty
    /// position.
    pub fn position(&self, pos: Pos) -> Position {
        match self.file(pos) {
            Some(file) if !file.builtin => {
                let (line, column) = file.line_column(pos.0 - file.base);
                Position::new(file.name.clone(), line, column)
            }
            _ => Position::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        let mut fset = FileSet::new();
        let base = fset.add_file("a.go", b"package a\n\nvar x int\n");
        let pos = Pos(base + 15);
        let position = fset.position(pos);
        assert_eq!(position.filename, "a.go");
        assert_eq!(position.line, 3);
        assert_eq!(position.column, 5);
        assert_eq!(fset.offset(pos), Some(15));
    }

    #[test]
    fn files_do_not_overlap() {
        let mut fset = FileSet::new();
        let a = fset.add_file("a.go", b"package a\n");
        let b = fset.add_file("b.go", b"package a\n");
        assert!(b > a);
        assert_eq!(fset.filename(Pos(a + 3)), Some("a.go"));
        assert_eq!(fset.filename(Pos(b)), Some("b.go"));
        assert_eq!(fset.filename(Pos(b + 10)), Some("b.go"));
    }

    #[test]
    fn builtin_and_invalid_positions_are_empty() {
        let mut fset = FileSet::new();
        let base = fset.add_builtin_file("<builtin>", b"package builtin\n");
        assert_eq!(fset.position(Pos(base + 2)), Position::default());
        assert_eq!(fset.position(Pos::NONE), Position::default());
        assert_eq!(fset.filename(Pos(base + 2)), Some("<builtin>"));
    }
}

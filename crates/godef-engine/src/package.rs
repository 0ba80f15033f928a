//! The principal file's package and its sibling files.
//!
//! A query is first answered from the principal file alone. When that
//! fails, the other `.go` files of the same directory and package are parsed
//! and their top-level declarations merged into the principal file's
//! package scope. Identifiers parsed earlier resolve lazily, so they see the
//! merged declarations without being re-parsed.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use godef_core::GodefError;
use godef_syntax::{
    parse_file, parse_package_name, File, ParseConfig, Program, ScopeId, ScopeKind,
};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::importer::PackageNamer;

#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub dir: PathBuf,
    /// Package scope shared by every file of the package.
    pub scope: ScopeId,
    principal: Rc<File>,
    siblings: Vec<Rc<File>>,
}

impl Package {
    pub fn new(principal: Rc<File>) -> Self {
        Package {
            name: principal.name.name.clone(),
            dir: package_dir(&principal.filename),
            scope: principal.package_scope,
            principal,
            siblings: Vec::new(),
        }
    }

    pub fn principal(&self) -> &Rc<File> {
        &self.principal
    }

    /// All files, principal first.
    pub fn files(&self) -> impl Iterator<Item = &Rc<File>> {
        std::iter::once(&self.principal).chain(&self.siblings)
    }

    pub fn file_count(&self) -> usize {
        1 + self.siblings.len()
    }

    /// Parse the sibling files of the principal file into this package.
    ///
    /// Siblings of another package or with syntax errors are skipped, as are
    /// files merged by an earlier call. Returns [`GodefError::NoMoreFiles`]
    /// when no sibling was added.
    pub fn aggregate(
        &mut self,
        program: &mut Program,
        namer: &mut PackageNamer,
    ) -> Result<usize, GodefError> {
        let known: Vec<OsString> = self
            .files()
            .filter_map(|f| Path::new(&f.filename).file_name().map(OsStr::to_os_string))
            .collect();
        let mut added = 0;
        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let file_name = entry.file_name();
            if !entry.file_type().is_file()
                || !file_name.to_string_lossy().ends_with(".go")
                || known.iter().any(|name| name == file_name)
            {
                continue;
            }
            let filename = sibling_path(&self.dir, file_name);
            if let Some(file) = self.parse_sibling(program, namer, &filename) {
                self.siblings.push(file);
                added += 1;
            }
        }
        if added == 0 {
            return Err(GodefError::NoMoreFiles);
        }
        debug!(package = %self.name, added, "aggregated sibling files");
        Ok(added)
    }

    fn parse_sibling(
        &self,
        program: &mut Program,
        namer: &mut PackageNamer,
        filename: &Path,
    ) -> Option<Rc<File>> {
        let shown = filename.to_string_lossy();
        let src = match fs::read(filename) {
            Ok(src) => src,
            Err(err) => {
                debug!(file = %shown, %err, "skipping unreadable sibling");
                return None;
            }
        };
        if parse_package_name(&src).as_deref() != Some(self.name.as_str()) {
            trace!(file = %shown, "skipping sibling of another package");
            return None;
        }

        let universe = program.universe();
        let staging = program.new_scope(ScopeKind::Package, Some(universe));
        let config = ParseConfig::new()
            .with_package_scope(staging)
            .with_namer(namer);
        let parsed = match parse_file(program, &shown, &src, config) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(file = %shown, %err, "skipping unparseable sibling");
                return None;
            }
        };
        if let Some(first) = parsed.errors.first() {
            debug!(file = %shown, error = %first, "skipping sibling with syntax errors");
            return None;
        }
        program.merge_scope(staging, self.scope);
        Some(parsed.file)
    }
}

/// Directory of `filename`; `.` when it has no directory component.
pub fn package_dir(filename: &str) -> PathBuf {
    match Path::new(filename).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn sibling_path(dir: &Path, file_name: &OsStr) -> PathBuf {
    if dir == Path::new(".") {
        PathBuf::from(file_name)
    } else {
        dir.join(file_name)
    }
}

//! Source importer: parses imported packages into the program on demand.
//!
//! Packages are cached by directory for the lifetime of the importer, so
//! every import of the same package shares one package scope. Files that
//! fail build constraints, test files and files of a minority package name
//! are left out; files that fail to parse are skipped.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use godef_syntax::{parse_file, parse_package_name, ImportNamer, ParseConfig, Program, ScopeId, ScopeKind};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::constraints::should_build;
use crate::context::BuildContext;
use crate::import_path::{find_package_dir, ImportError, ImportResult};

/// A package parsed from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedPackage {
    pub name: String,
    pub path: String,
    pub dir: PathBuf,
    pub scope: ScopeId,
}

/// A buildable source file of a package directory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub src: Vec<u8>,
    pub package_name: String,
}

/// Names imports from the package clause of the imported package.
#[derive(Debug)]
pub struct PackageNamer {
    ctx: BuildContext,
    names: HashMap<PathBuf, Option<String>>,
}

impl PackageNamer {
    pub fn new(ctx: BuildContext) -> Self {
        PackageNamer {
            ctx,
            names: HashMap::new(),
        }
    }

    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }
}

impl ImportNamer for PackageNamer {
    fn import_name(&mut self, path: &str, src_dir: &Path) -> Option<String> {
        let dir = find_package_dir(&self.ctx, path, src_dir).ok()?;
        if let Some(name) = self.names.get(&dir) {
            return name.clone();
        }
        let name = package_files(&self.ctx, &dir)
            .ok()
            .and_then(|files| majority_name(&files));
        self.names.insert(dir, name.clone());
        name
    }
}

#[derive(Debug)]
pub struct Importer {
    namer: PackageNamer,
    packages: HashMap<PathBuf, Option<Rc<ImportedPackage>>>,
}

impl Importer {
    pub fn new(ctx: BuildContext) -> Self {
        Importer {
            namer: PackageNamer::new(ctx),
            packages: HashMap::new(),
        }
    }

    pub fn context(&self) -> &BuildContext {
        self.namer.context()
    }

    /// The import namer to parse files with.
    pub fn namer(&mut self) -> &mut PackageNamer {
        &mut self.namer
    }

    /// Import the package `path` as seen from `src_dir`.
    pub fn import(
        &mut self,
        program: &mut Program,
        path: &str,
        src_dir: &Path,
    ) -> ImportResult<Rc<ImportedPackage>> {
        let dir = find_package_dir(self.context(), path, src_dir)?;
        if let Some(cached) = self.packages.get(&dir) {
            return cached.clone().ok_or(ImportError::NoGoFiles { dir });
        }
        // Claim the slot first so a failing package is not retried.
        self.packages.insert(dir.clone(), None);

        let files = package_files(self.context(), &dir)?;
        let Some(name) = majority_name(&files) else {
            return Err(ImportError::NoGoFiles { dir });
        };

        let universe = program.universe();
        let scope = program.new_scope(ScopeKind::Package, Some(universe));
        for file in files.iter().filter(|f| f.package_name == name) {
            let filename = file.path.to_string_lossy();
            let config = ParseConfig::new()
                .with_package_scope(scope)
                .with_package_path(path)
                .with_namer(&mut self.namer);
            match parse_file(program, &filename, &file.src, config) {
                Ok(parsed) if !parsed.errors.is_empty() => {
                    trace!(file = %filename, errors = parsed.errors.len(), "imported file has syntax errors");
                }
                Ok(_) => {}
                Err(err) => debug!(file = %filename, %err, "skipping unparseable imported file"),
            }
        }

        debug!(path, dir = %dir.display(), package = %name, "imported package");
        let package = Rc::new(ImportedPackage {
            name,
            path: path.to_string(),
            dir: dir.clone(),
            scope,
        });
        self.packages.insert(dir, Some(package.clone()));
        Ok(package)
    }
}

/// Buildable, non-test Go files of `dir`, in file name order.
pub fn package_files(ctx: &BuildContext, dir: &Path) -> ImportResult<Vec<SourceFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if !file_name.ends_with(".go") || file_name.ends_with("_test.go") {
            continue;
        }
        let Ok(src) = fs::read(entry.path()) else {
            continue;
        };
        match should_build(ctx, &file_name, &src) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => {
                debug!(file = %entry.path().display(), %err, "ignoring file with bad build constraint");
                continue;
            }
        }
        let Some(package_name) = parse_package_name(&src) else {
            continue;
        };
        files.push(SourceFile {
            path: entry.path().to_path_buf(),
            src,
            package_name,
        });
    }
    if files.is_empty() {
        return Err(ImportError::NoGoFiles {
            dir: dir.to_path_buf(),
        });
    }
    Ok(files)
}

/// The most common package name among `files`, ignoring `documentation`.
/// Ties go to the name seen first.
fn majority_name(files: &[SourceFile]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for file in files {
        let name = file.package_name.as_str();
        if name == "documentation" {
            continue;
        }
        match counts.iter_mut().find(|(n, _)| *n == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name, 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (name, count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name.to_string())
}

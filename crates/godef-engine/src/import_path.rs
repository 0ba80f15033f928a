//! Import path to package directory.
//!
//! ## Search Order
//!
//! 1. Relative paths (`./x`, `../x`) against the importing directory
//! 2. `GOROOT/src` for standard library paths (no dot in the first element)
//! 3. `vendor/` directories, walking up from the importing directory
//! 4. The enclosing module and its local `replace` directives
//! 5. The module cache, for versions `require`d by the enclosing module
//! 6. `GOPATH/src` entries
//! 7. `GOROOT/src/vendor`

use std::fmt;
use std::path::{Path, PathBuf};

use godef_core::GodefError;
use thiserror::Error;
use tracing::trace;

use crate::context::BuildContext;
use crate::gomod::{escape_module_path, find_module, Module, Replacement};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("cannot find package {path:?} in any of:{}", SearchList(.searched))]
    NotFound {
        path: String,
        searched: Vec<(PathBuf, &'static str)>,
    },

    #[error("import \"C\" is not supported")]
    Cgo,

    #[error("no buildable Go source files in {}", .dir.display())]
    NoGoFiles { dir: PathBuf },
}

struct SearchList<'a>(&'a [(PathBuf, &'static str)]);

impl fmt::Display for SearchList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (dir, origin) in self.0 {
            write!(f, "\n\t{} (from {origin})", dir.display())?;
        }
        Ok(())
    }
}

impl ImportError {
    /// Bridge into the unified error for a specific import path.
    pub fn into_godef_error(self, path: &str) -> GodefError {
        GodefError::ImportPathNotFound {
            path: path.to_string(),
            reason: self.to_string(),
        }
    }
}

pub type ImportResult<T> = Result<T, ImportError>;

// ============================================================================
// Lookup
// ============================================================================

/// Find the directory holding the package `path` imported from `src_dir`.
pub fn find_package_dir(ctx: &BuildContext, path: &str, src_dir: &Path) -> ImportResult<PathBuf> {
    if path == "C" {
        return Err(ImportError::Cgo);
    }
    let src_dir = absolute_dir(src_dir);
    let mut searched = Vec::new();
    let found = search(ctx, path, &src_dir, &mut searched);
    match found {
        Some(dir) => {
            trace!(path, dir = %dir.display(), "import path located");
            Ok(dir)
        }
        None => Err(ImportError::NotFound {
            path: path.to_string(),
            searched,
        }),
    }
}

fn search(
    ctx: &BuildContext,
    path: &str,
    src_dir: &Path,
    searched: &mut Vec<(PathBuf, &'static str)>,
) -> Option<PathBuf> {
    let mut try_dir = |dir: PathBuf, origin: &'static str| -> Option<PathBuf> {
        if dir.is_dir() {
            return Some(dir);
        }
        searched.push((dir, origin));
        None
    };

    if path.starts_with("./") || path.starts_with("../") || path == "." || path == ".." {
        return try_dir(src_dir.join(path), "importing directory");
    }

    let goroot_src = ctx.goroot_src();
    if is_standard(path) {
        if let Some(src) = &goroot_src {
            if let Some(dir) = try_dir(src.join(path), "$GOROOT") {
                return Some(dir);
            }
        }
    }

    for ancestor in src_dir.ancestors() {
        let candidate = ancestor.join("vendor").join(path);
        if candidate.is_dir() {
            return Some(candidate);
        }
    }

    if let Some(module) = find_module(src_dir) {
        if let Some(dir) = in_module(ctx, &module, path) {
            return try_dir(dir, "module");
        }
    }

    for gopath in &ctx.gopath {
        if let Some(dir) = try_dir(gopath.join("src").join(path), "$GOPATH") {
            return Some(dir);
        }
    }

    if let Some(src) = &goroot_src {
        if let Some(dir) = try_dir(src.join("vendor").join(path), "$GOROOT vendor") {
            return Some(dir);
        }
    }
    None
}

/// `dir` made absolute so vendor and module lookups can walk its ancestors.
fn absolute_dir(dir: &Path) -> PathBuf {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf())
}

/// Standard library paths have no dot in their first element.
fn is_standard(path: &str) -> bool {
    path.split('/').next().is_some_and(|first| !first.contains('.'))
}

/// The directory `path` maps to through the module graph of `module`: the
/// module itself, a replaced module, or a required module in the cache.
fn in_module(ctx: &BuildContext, module: &Module, path: &str) -> Option<PathBuf> {
    let gomod = &module.gomod;
    let owner = gomod
        .known_modules()
        .filter(|m| path == *m || path.starts_with(&format!("{m}/")))
        .max_by_key(|m| m.len())?;
    let rest = path[owner.len()..].trim_start_matches('/');
    let version = gomod.required_version(owner);

    let root = match gomod.replacement(owner, version) {
        Some(Replacement::Dir(dir)) if dir.is_absolute() => dir.clone(),
        Some(Replacement::Dir(dir)) => module.root.join(dir),
        Some(Replacement::Module { path, version }) => cache_dir(ctx, path, version)?,
        None if owner == gomod.module => module.root.clone(),
        None => cache_dir(ctx, owner, version?)?,
    };
    Some(if rest.is_empty() { root } else { root.join(rest) })
}

fn cache_dir(ctx: &BuildContext, module: &str, version: &str) -> Option<PathBuf> {
    let cache = ctx.module_cache.as_ref()?;
    Some(cache.join(format!("{}@{}", escape_module_path(module), version)))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn mkdir(root: &Path, rel: &str) -> PathBuf {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn ctx(root: &Path) -> BuildContext {
        BuildContext {
            goroot: Some(root.join("goroot")),
            ..BuildContext::default()
        }
        .with_gopath(vec![root.join("gopath")])
    }

    #[test]
    fn standard_library() {
        let tmp = tempfile::tempdir().unwrap();
        let fmt = mkdir(tmp.path(), "goroot/src/fmt");
        let ctx = ctx(tmp.path());
        assert_eq!(find_package_dir(&ctx, "fmt", tmp.path()).unwrap(), fmt);
    }

    #[test]
    fn vendor_before_gopath() {
        let tmp = tempfile::tempdir().unwrap();
        let app = mkdir(tmp.path(), "gopath/src/app/cmd");
        mkdir(tmp.path(), "gopath/src/example.com/lib");
        let vendored = mkdir(tmp.path(), "gopath/src/app/vendor/example.com/lib");
        let ctx = ctx(tmp.path());
        assert_eq!(find_package_dir(&ctx, "example.com/lib", &app).unwrap(), vendored);
    }

    #[test]
    fn gopath() {
        let tmp = tempfile::tempdir().unwrap();
        let lib = mkdir(tmp.path(), "gopath/src/example.com/lib");
        let ctx = ctx(tmp.path());
        assert_eq!(find_package_dir(&ctx, "example.com/lib", tmp.path()).unwrap(), lib);
    }

    #[test]
    fn module_packages() {
        let tmp = tempfile::tempdir().unwrap();
        let root = mkdir(tmp.path(), "work/app");
        fs::write(
            root.join("go.mod"),
            "module example.com/app\n\nrequire github.com/Foo/bar v1.2.0\n\nreplace example.com/lib => ../lib\n",
        )
        .unwrap();
        let internal = mkdir(&root, "internal/util");
        let lib = mkdir(tmp.path(), "work/lib/sub");
        let cached = mkdir(tmp.path(), "gopath/pkg/mod/github.com/!foo/bar@v1.2.0/baz");
        let ctx = ctx(tmp.path());

        assert_eq!(
            find_package_dir(&ctx, "example.com/app/internal/util", &root).unwrap(),
            internal
        );
        assert_eq!(
            find_package_dir(&ctx, "example.com/lib/sub", &root).unwrap(),
            root.join("../lib/sub")
        );
        assert!(lib.is_dir());
        assert_eq!(
            find_package_dir(&ctx, "github.com/Foo/bar/baz", &root).unwrap(),
            cached
        );
    }

    #[test]
    fn relative() {
        let tmp = tempfile::tempdir().unwrap();
        let sib = mkdir(tmp.path(), "a/sib");
        let dir = mkdir(tmp.path(), "a/b");
        assert_eq!(
            find_package_dir(&ctx(tmp.path()), "../sib", &dir).unwrap(),
            dir.join("../sib")
        );
        assert!(sib.is_dir());
    }

    #[test]
    fn not_found_lists_searched_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = ctx(tmp.path());
        let err = find_package_dir(&ctx, "nothere", tmp.path()).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("cannot find package \"nothere\" in any of:"));
        assert!(message.contains("(from $GOROOT)"));
        assert!(message.contains("(from $GOPATH)"));
        assert_eq!(find_package_dir(&ctx, "C", tmp.path()), Err(ImportError::Cgo));
    }
}

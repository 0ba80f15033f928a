//! Build context: where Go sources live and which files apply.
//!
//! The context is read once from the environment (with CLI overrides) and
//! threaded by reference through the importer and the package locator.

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Operating systems known to build constraints and file name suffixes.
pub const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

/// Architectures known to build constraints and file name suffixes.
pub const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips",
    "mipsle", "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le",
    "riscv", "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

/// Operating systems that satisfy the `unix` constraint.
const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub goroot: Option<PathBuf>,
    pub gopath: Vec<PathBuf>,
    /// Root of the module download cache (`GOMODCACHE`).
    pub module_cache: Option<PathBuf>,
    pub goos: String,
    pub goarch: String,
    pub cgo_enabled: bool,
    /// Extra tags from `-tags` in `GOFLAGS`.
    pub build_tags: Vec<String>,
    /// Highest `go1.N` release tag satisfied.
    pub go_minor: u32,
}

impl Default for BuildContext {
    fn default() -> Self {
        BuildContext {
            goroot: None,
            gopath: Vec::new(),
            module_cache: None,
            goos: host_os().to_string(),
            goarch: host_arch().to_string(),
            cgo_enabled: true,
            build_tags: Vec::new(),
            go_minor: 99,
        }
    }
}

impl BuildContext {
    /// Read the context from `GOROOT`, `GOPATH`, `GOMODCACHE`, `GOOS`,
    /// `GOARCH`, `CGO_ENABLED` and `GOFLAGS`.
    pub fn from_env() -> Self {
        let mut ctx = BuildContext::default();
        ctx.goroot = env_path("GOROOT").or_else(discover_goroot);
        ctx.gopath = match env::var_os("GOPATH") {
            Some(list) if !list.is_empty() => env::split_paths(&list).collect(),
            _ => dirs::home_dir()
                .map(|home| vec![home.join("go")])
                .unwrap_or_default(),
        };
        if let Some(goos) = env_string("GOOS") {
            ctx.goos = goos;
        }
        if let Some(goarch) = env_string("GOARCH") {
            ctx.goarch = goarch;
        }
        if let Some(cgo) = env_string("CGO_ENABLED") {
            ctx.cgo_enabled = cgo == "1";
        }
        if let Some(flags) = env_string("GOFLAGS") {
            ctx.build_tags = tags_from_goflags(&flags);
        }
        ctx.module_cache = env_path("GOMODCACHE");
        ctx.fill_module_cache();
        debug!(
            goroot = ?ctx.goroot,
            gopath = ?ctx.gopath,
            goos = %ctx.goos,
            goarch = %ctx.goarch,
            "build context"
        );
        ctx
    }

    pub fn with_goroot(mut self, goroot: impl Into<PathBuf>) -> Self {
        self.goroot = Some(goroot.into());
        self
    }

    /// Replace the GOPATH list; the module cache follows the first entry
    /// unless `GOMODCACHE` set it.
    pub fn with_gopath(mut self, gopath: Vec<PathBuf>) -> Self {
        let derived = self
            .gopath
            .first()
            .map(|gp| gp.join("pkg").join("mod"));
        if self.module_cache == derived {
            self.module_cache = None;
        }
        self.gopath = gopath;
        self.fill_module_cache();
        self
    }

    fn fill_module_cache(&mut self) {
        if self.module_cache.is_none() {
            self.module_cache = self.gopath.first().map(|gp| gp.join("pkg").join("mod"));
        }
    }

    /// Whether a single build tag is satisfied.
    pub fn matches_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch {
            return true;
        }
        match tag {
            "gc" => true,
            "cgo" => self.cgo_enabled,
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            // android implies linux, ios and illumos imply their parents.
            "linux" => self.goos == "android",
            "darwin" => self.goos == "ios",
            "solaris" => self.goos == "illumos",
            _ => {
                if let Some(minor) = tag.strip_prefix("go1.") {
                    return minor.parse::<u32>().is_ok_and(|m| m <= self.go_minor);
                }
                self.build_tags.iter().any(|t| t == tag)
            }
        }
    }

    /// `GOROOT/src`, if a GOROOT is known.
    pub fn goroot_src(&self) -> Option<PathBuf> {
        self.goroot.as_ref().map(|root| root.join("src"))
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_string(key).map(PathBuf::from)
}

/// Locate GOROOT from the `go` binary on PATH, following symlinks.
fn discover_goroot() -> Option<PathBuf> {
    let go = which::which("go").ok()?;
    let go = go.canonicalize().unwrap_or(go);
    let root = go.parent()?.parent()?;
    if root.join("src").is_dir() {
        return Some(root.to_path_buf());
    }
    ["/usr/local/go", "/usr/lib/go"]
        .iter()
        .map(Path::new)
        .find(|p| p.join("src").is_dir())
        .map(Path::to_path_buf)
}

/// Extract `-tags` values from a `GOFLAGS` string.
fn tags_from_goflags(flags: &str) -> Vec<String> {
    let mut words = flags.split_whitespace();
    let mut tags = Vec::new();
    while let Some(word) = words.next() {
        let value = match word.trim_start_matches('-').split_once('=') {
            Some(("tags", value)) => Some(value.to_string()),
            None if word.trim_start_matches('-') == "tags" => words.next().map(str::to_string),
            _ => None,
        };
        if let Some(value) = value {
            tags.extend(
                value
                    .split([',', ' '])
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
            );
        }
    }
    tags
}

fn host_os() -> &'static str {
    match env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn host_arch() -> &'static str {
    match env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}

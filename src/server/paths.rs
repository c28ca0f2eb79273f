//! Path validation for file serving.
//!
//! A requested file may only be served when its fully resolved location lies
//! under one of the allowed roots (the static root or the photos root) and
//! its extension is on the allowlist. Resolution happens before the prefix
//! check, so `static/../../etc/passwd` is judged by where it actually
//! points rather than by how it starts.
//!
//! Paths that do not exist yet resolve to their would-be location under the
//! deepest existing ancestor. That lets a missing file inside a root surface
//! as "not found" later, while an unresolvable tail containing `..` is
//! refused outright.

use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

/// Extensions that may be served, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: &[&str] = &["html", "js", "jpg"];

/// Checks candidate files against allowed roots and extensions.
#[derive(Debug, Clone)]
pub struct PathValidator {
    roots: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl PathValidator {
    /// Create a validator for `roots` using [`ALLOWED_EXTENSIONS`].
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::with_extensions(roots, ALLOWED_EXTENSIONS)
    }

    /// Create a validator for `roots` and a custom extension allowlist.
    ///
    /// Roots are resolved once here; a root that cannot be resolved admits
    /// nothing.
    pub fn with_extensions<I, P>(roots: I, extensions: &[&str]) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let roots = roots
            .into_iter()
            .filter_map(|root| {
                let resolved = resolve_path(root.as_ref());
                if resolved.is_none() {
                    debug!(root = %root.as_ref().display(), "Ignoring unresolvable root");
                }
                resolved
            })
            .collect();

        Self {
            roots,
            extensions: extensions.iter().map(|ext| ext.to_ascii_lowercase()).collect(),
        }
    }

    /// Resolve `path` and return the resolved location if it may be served.
    pub fn resolve(&self, path: &Path) -> Option<PathBuf> {
        let resolved = resolve_path(path)?;

        let extension_ok = resolved
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.contains(&ext));
        let root_ok = self.roots.iter().any(|root| resolved.starts_with(root));

        if extension_ok && root_ok {
            Some(resolved)
        } else {
            debug!(
                path = %path.display(),
                resolved = %resolved.display(),
                extension_ok,
                root_ok,
                "Rejected path"
            );
            None
        }
    }

    /// Check whether `path` may be served.
    pub fn is_valid(&self, path: &Path) -> bool {
        self.resolve(path).is_some()
    }

    /// The resolved roots.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// One-shot form of [`PathValidator::is_valid`].
pub fn is_valid_path<P: AsRef<Path>>(path: &Path, roots: &[P], extensions: &[&str]) -> bool {
    PathValidator::with_extensions(roots, extensions).is_valid(path)
}

/// Resolve `path` to an absolute, symlink-free form.
///
/// Existing prefixes are canonicalized by the OS. Missing trailing
/// components are appended verbatim, but only plain names; any `.`/`..`
/// or other special component in the missing tail fails resolution.
pub fn resolve_path(path: &Path) -> Option<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(mut resolved) => {
                for name in missing.iter().rev() {
                    resolved.push(name);
                }
                return Some(resolved);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match existing.components().next_back()? {
                    Component::Normal(name) => missing.push(name.to_os_string()),
                    _ => return None,
                }
                existing = existing.parent()?;
            }
            Err(_) => return None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Path resolution scoped to the playbook directory.
//!
//! Every user-supplied relative name (inventory, playbook, edited file) is
//! resolved through [`DirectoryResolver`] before it touches the filesystem.
//! Both the base and the candidate are canonicalized, so `..` segments and
//! symlinks pointing outside the tree are rejected with
//! [`CoreError::PathEscape`].
//!
//! Files that do not exist yet (a save creating a new file) are resolved by
//! canonicalizing the deepest existing ancestor and appending the missing
//! tail, which may only consist of plain name components.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// Resolves relative names against a canonical base directory.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    base: PathBuf,
}

impl DirectoryResolver {
    /// Create a resolver rooted at `base`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if `base` cannot be canonicalized
    /// (missing directory, permission problem).
    pub fn new(base: impl AsRef<Path>) -> Result<Self, CoreError> {
        let base = base.as_ref();
        let canonical = base.canonicalize().map_err(|e| {
            CoreError::NotFound(format!("playbook directory '{}': {e}", base.display()))
        })?;
        Ok(Self { base: canonical })
    }

    /// The canonical base directory.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve `relative` to an absolute path inside the base directory.
    ///
    /// # Errors
    ///
    /// - [`CoreError::PathEscape`] if `relative` is absolute or resolves
    ///   outside the base directory.
    /// - [`CoreError::NotFound`] if a component used as a directory is a
    ///   regular file.
    /// - [`CoreError::Internal`] if canonicalization fails for any other
    ///   reason than the path not existing.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, CoreError> {
        let escape = || CoreError::PathEscape {
            path: relative.to_string(),
        };

        let candidate = Path::new(relative);
        if candidate.is_absolute() {
            return Err(escape());
        }

        let joined = self.base.join(candidate);
        let canonical = match joined.canonicalize() {
            Ok(path) => path,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                canonicalize_missing(&joined).ok_or_else(escape)?
            }
            Err(e) if e.kind() == io::ErrorKind::NotADirectory => {
                return Err(CoreError::NotFound(format!("path '{relative}'")));
            }
            Err(e) => {
                return Err(CoreError::Internal(format!(
                    "cannot canonicalize '{}': {e}",
                    joined.display()
                )))
            }
        };

        if canonical.starts_with(&self.base) {
            Ok(canonical)
        } else {
            Err(escape())
        }
    }
}

/// Canonicalize the deepest existing ancestor of `path` and re-append the
/// missing components.
///
/// Returns `None` when the missing tail contains a `..` or root component,
/// or an entry that exists without resolving (a dangling symlink).
fn canonicalize_missing(path: &Path) -> Option<PathBuf> {
    let mut missing: Vec<OsString> = Vec::new();
    let mut current = path;

    loop {
        match current.canonicalize() {
            Ok(existing) => {
                let mut resolved = existing;
                for part in missing.iter().rev() {
                    resolved.push(part);
                }
                return Some(resolved);
            }
            Err(_) => {
                if current.symlink_metadata().is_ok() {
                    return None;
                }
                missing.push(current.file_name()?.to_os_string());
                current = current.parent()?;
            }
        }
    }
}

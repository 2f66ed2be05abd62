// Path Utilities
//
// Lexical normalization for module paths plus conversion of absolute paths into
// root-relative Unix-style strings for reports.

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Resolve `.` and `..` components without touching the filesystem
///
/// `..` at the start of a relative path is kept; `..` directly under the root
/// is dropped, as the OS would.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            Component::Normal(name) => normalized.push(name),
        }
    }

    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

/// Path a relative import specifier refers to, seen from the importing file
///
/// The result has no extension added; the module cache tries suffixes.
pub fn resolve_module_specifier(from_file: &Path, specifier: &str) -> PathBuf {
    let directory = from_file.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&directory.join(specifier))
}

/// Convert an absolute path to a path relative to `root` with `/` separators
///
/// Both paths are canonicalized when they exist (e.g. `/var` -> `/private/var`
/// on macOS); otherwise they are compared as given.
pub fn to_relative_unix_style(absolute: &Path, root: &Path) -> Result<String> {
    let (path_to_use, root_to_use) = match (absolute.canonicalize(), root.canonicalize()) {
        (Ok(canonical_abs), Ok(canonical_root)) => (canonical_abs, canonical_root),
        _ => (absolute.to_path_buf(), root.to_path_buf()),
    };

    // Canonicalized Windows paths carry a \\?\ prefix that breaks strip_prefix
    #[cfg(windows)]
    fn strip_unc_prefix(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        match path_str.strip_prefix(r"\\?\") {
            Some(stripped) => PathBuf::from(stripped),
            None => path.to_path_buf(),
        }
    }

    #[cfg(not(windows))]
    fn strip_unc_prefix(path: &Path) -> PathBuf {
        path.to_path_buf()
    }

    let normalized_path = strip_unc_prefix(&path_to_use);
    let normalized_root = strip_unc_prefix(&root_to_use);

    let relative = normalized_path
        .strip_prefix(&normalized_root)
        .with_context(|| {
            format!(
                "File path '{}' is not within scan root '{}'",
                normalized_path.display(),
                normalized_root.display()
            )
        })?;

    let path_str = relative.to_str().context("Path contains invalid UTF-8")?;

    let unix_style = if MAIN_SEPARATOR == '\\' {
        path_str.replace('\\', "/")
    } else {
        path_str.to_string()
    };

    Ok(unix_style)
}

//! Path validation
//!
//! Maps untrusted relative paths onto the server root. Every path handed to the
//! filesystem goes through [`resolve`], which canonicalizes with the same
//! primitive the OS uses and compares component-wise against the root.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use log::warn;

use crate::error::StorageError;

/// Characters that are never allowed in a leaf name.
const RESERVED_CHARS: [char; 9] = ['/', '\\', '<', '>', ':', '"', '|', '?', '*'];

/// The directory all requests are confined to
#[derive(Debug, Clone)]
pub struct Root {
    path: PathBuf,
}

impl Root {
    /// Canonicalizes `path`, which must be an existing directory.
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = fs::canonicalize(path)?;
        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                "server root is not a directory",
            ));
        }
        Ok(Self { path })
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// True when `candidate` is the root itself or below it.
    ///
    /// `Path::starts_with` compares whole components, so `/base-evil` is not
    /// inside `/base`.
    pub fn contains(&self, candidate: &Path) -> bool {
        candidate.starts_with(&self.path)
    }
}

/// A path proven to lie inside a [`Root`]. Only [`resolve`] builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    relative: String,
}

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Canonical location relative to the root, `/`-separated, `""` for the root.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    pub fn is_root(&self) -> bool {
        self.relative.is_empty()
    }

    /// Relative path of the containing folder; the root is its own parent.
    pub fn parent_relative(&self) -> &str {
        parent_relative(&self.relative)
    }

    /// Last path component, empty for the root.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .filter(|_| !self.is_root())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Resolves `relative` against `root`, denying anything that would land outside it.
///
/// Leading and trailing slashes are ignored, so `""` and `"/"` both resolve to
/// the root. Existing prefixes are canonicalized (following symlinks the way the
/// OS will), the not-yet-existing tail is appended as-is. A `..` at the root or a
/// symlink leading out of it is denied before anything outside the root is touched.
pub fn resolve(root: &Root, relative: &str) -> Result<ResolvedPath, StorageError> {
    let trimmed = relative.trim_matches('/');
    if trimmed.contains('\0') {
        return Err(denied(relative));
    }

    let mut current = root.as_path().to_path_buf();
    // Number of trailing components of `current` that do not exist yet.
    let mut missing = 0usize;

    for component in Path::new(trimmed).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root would step outside it
                if missing == 0 && current == root.as_path() {
                    return Err(denied(relative));
                }
                current.pop();
                missing = missing.saturating_sub(1);
            }
            Component::Normal(name) => {
                current.push(name);
                if missing > 0 {
                    missing += 1;
                    continue;
                }
                match fs::canonicalize(&current) {
                    Ok(canonical) if root.contains(&canonical) => current = canonical,
                    Ok(_) => return Err(denied(relative)),
                    Err(_) if is_symlink(&current) => return Err(denied(relative)),
                    Err(_) => missing = 1,
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(denied(relative)),
        }
    }

    if !root.contains(&current) {
        return Err(denied(relative));
    }

    let relative_path = current
        .strip_prefix(root.as_path())
        .map_err(|_| denied(relative))?
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");

    Ok(ResolvedPath {
        path: current,
        relative: relative_path,
    })
}

/// Sanitizes an uploaded file or folder name into a safe leaf name.
///
/// Strips separators, control and reserved characters, surrounding whitespace
/// and leading dots. Returns `None` when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !RESERVED_CHARS.contains(c))
        .collect();

    let cleaned = cleaned.trim().trim_start_matches('.').trim_start();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Joins two `/`-separated relative paths.
pub fn join_relative(base: &str, name: &str) -> String {
    let base = base.trim_matches('/');
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}

/// Parent of a `/`-separated relative path, `""` at the top.
pub fn parent_relative(relative: &str) -> &str {
    relative
        .trim_matches('/')
        .rsplit_once('/')
        .map(|(parent, _)| parent)
        .unwrap_or("")
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

fn denied(relative: &str) -> StorageError {
    warn!("Path traversal attempt rejected: {:?}", relative);
    StorageError::AccessDenied(relative.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_root() -> (TempDir, Root) {
        let temp = tempfile::tempdir().expect("tempdir");
        let base = temp.path().join("base");
        fs::create_dir_all(base.join("docs/reports")).expect("create tree");
        fs::write(base.join("docs/readme.txt"), b"hello").expect("write file");
        let root = Root::new(&base).expect("root");
        (temp, root)
    }

    #[test]
    fn empty_and_slash_resolve_to_root() {
        let (_temp, root) = make_root();
        for input in ["", "/", "//", "./"] {
            let resolved = resolve(&root, input).expect("root resolves");
            assert_eq!(resolved.as_path(), root.as_path());
            assert!(resolved.is_root());
        }
    }

    #[test]
    fn nested_paths_stay_inside_root() {
        let (_temp, root) = make_root();
        let resolved = resolve(&root, "/docs/reports/").expect("resolves");
        assert_eq!(resolved.as_path(), root.as_path().join("docs/reports"));
        assert_eq!(resolved.relative(), "docs/reports");
        assert_eq!(resolved.parent_relative(), "docs");
    }

    #[test]
    fn dot_dot_inside_root_is_collapsed() {
        let (_temp, root) = make_root();
        let resolved = resolve(&root, "docs/reports/../readme.txt").expect("resolves");
        assert_eq!(resolved.as_path(), root.as_path().join("docs/readme.txt"));
        assert_eq!(resolved.file_name(), "readme.txt");
    }

    #[test]
    fn traversal_outside_root_is_denied() {
        let (_temp, root) = make_root();
        for input in [
            "..",
            "../",
            "../../etc/passwd",
            "/../../etc/passwd",
            "docs/../../base2",
            "docs/../../../../../../etc",
            "missing/../../..",
        ] {
            assert!(
                matches!(resolve(&root, input), Err(StorageError::AccessDenied(_))),
                "{input} should be denied"
            );
        }
    }

    #[test]
    fn leaving_and_reentering_root_is_denied() {
        let (temp, root) = make_root();
        let root_name = root
            .as_path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .expect("root name");
        assert!(temp.path().join(&root_name).is_dir());

        for input in [
            format!("../{root_name}/docs"),
            format!("docs/../../{root_name}/docs/readme.txt"),
            format!("missing/../../{root_name}"),
        ] {
            assert!(
                matches!(resolve(&root, &input), Err(StorageError::AccessDenied(_))),
                "{input} should be denied"
            );
        }
    }

    #[test]
    fn any_dot_dot_sequence_never_escapes() {
        let (_temp, root) = make_root();
        let segments = ["..", "docs", ".", "reports", "new", "..", "readme.txt"];
        // Every 4-segment combination either resolves inside the root or is denied.
        for a in segments {
            for b in segments {
                for c in segments {
                    for d in segments {
                        let input = format!("{a}/{b}/{c}/{d}");
                        match resolve(&root, &input) {
                            Ok(resolved) => assert!(root.contains(resolved.as_path()), "{input}"),
                            Err(StorageError::AccessDenied(_)) => {}
                            Err(other) => panic!("unexpected error for {input}: {other}"),
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn sibling_with_shared_prefix_is_not_inside_root() {
        let (temp, root) = make_root();
        fs::create_dir_all(temp.path().join("base-evil")).expect("create sibling");

        assert!(!root.contains(&temp.path().join("base-evil")));
        assert!(matches!(
            resolve(&root, "../base-evil"),
            Err(StorageError::AccessDenied(_))
        ));
    }

    #[test]
    fn missing_tail_is_allowed() {
        let (_temp, root) = make_root();
        let resolved = resolve(&root, "docs/new/deeper").expect("resolves");
        assert_eq!(resolved.as_path(), root.as_path().join("docs/new/deeper"));
        assert_eq!(resolved.relative(), "docs/new/deeper");
    }

    #[test]
    fn nul_byte_is_denied() {
        let (_temp, root) = make_root();
        assert!(matches!(
            resolve(&root, "docs/\0evil"),
            Err(StorageError::AccessDenied(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_pointing_outside_root_is_denied() {
        let (temp, root) = make_root();
        let outside = temp.path().join("outside");
        fs::create_dir_all(&outside).expect("create outside");
        fs::write(outside.join("secret.txt"), b"secret").expect("write secret");
        std::os::unix::fs::symlink(&outside, root.as_path().join("escape")).expect("symlink");

        assert!(matches!(
            resolve(&root, "escape/secret.txt"),
            Err(StorageError::AccessDenied(_))
        ));
        assert!(matches!(
            resolve(&root, "escape"),
            Err(StorageError::AccessDenied(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_denied() {
        let (temp, root) = make_root();
        std::os::unix::fs::symlink(
            temp.path().join("not-created-yet"),
            root.as_path().join("dangling"),
        )
        .expect("symlink");

        assert!(matches!(
            resolve(&root, "dangling"),
            Err(StorageError::AccessDenied(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_inside_root_resolves_to_target() {
        let (_temp, root) = make_root();
        std::os::unix::fs::symlink(
            root.as_path().join("docs"),
            root.as_path().join("shortcut"),
        )
        .expect("symlink");

        let resolved = resolve(&root, "shortcut/readme.txt").expect("resolves");
        assert_eq!(resolved.as_path(), root.as_path().join("docs/readme.txt"));
    }

    #[test]
    fn sanitize_strips_separators_and_control_characters() {
        assert_eq!(sanitize_filename("a b.txt").as_deref(), Some("a b.txt"));
        assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("etcpasswd"));
        assert_eq!(sanitize_filename("dir\\file.txt").as_deref(), Some("dirfile.txt"));
        assert_eq!(sanitize_filename("re\nport\t.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(sanitize_filename(".hidden").as_deref(), Some("hidden"));
        assert_eq!(sanitize_filename("  notes.md  ").as_deref(), Some("notes.md"));
    }

    #[test]
    fn sanitize_rejects_names_that_become_empty() {
        for name in ["", "   ", ".", "..", "/", "../", "\0", "***"] {
            assert_eq!(sanitize_filename(name), None, "{name:?}");
        }
    }

    #[test]
    fn relative_helpers() {
        assert_eq!(join_relative("", "a.txt"), "a.txt");
        assert_eq!(join_relative("/docs/", "a.txt"), "docs/a.txt");
        assert_eq!(parent_relative("docs/reports/a.txt"), "docs/reports");
        assert_eq!(parent_relative("a.txt"), "");
        assert_eq!(parent_relative(""), "");
    }
}

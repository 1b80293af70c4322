use filegate_core::AccessError;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// A path that has been validated to live under a guard's base directory.
///
/// Not persisted; recompute it for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Sandbox for caller-supplied relative paths.
#[derive(Debug, Clone)]
pub struct PathGuard {
    base_dir: PathBuf,
}

impl PathGuard {
    /// Create a guard rooted at `base_dir`
    ///
    /// The base directory does not need to exist yet; it is only inspected
    /// when a resolved path does.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve `user_path` under the base directory.
    ///
    /// 1. Normalize lexically (`.` and `..` collapsed without touching disk).
    /// 2. Reject absolute results, results starting with `..`, and raw input
    ///    that still contains a `..` segment.
    /// 3. Join onto the base directory.
    /// 4. A path that does not exist is accepted for creation.
    /// 5. A symlink is resolved; its real path must stay under the base and is
    ///    returned instead of the link.
    /// 6. Anything else is returned as joined.
    pub fn resolve(&self, user_path: impl AsRef<Path>) -> Result<ResolvedPath, AccessError> {
        let user_path = user_path.as_ref();
        let result = self.resolve_inner(user_path);

        if let Err(ref e) = result {
            tracing::warn!(
                base_dir = %self.base_dir.display(),
                path = %user_path.display(),
                error_type = e.error_type(),
                "Rejected caller-supplied path"
            );
        }

        result
    }

    fn resolve_inner(&self, user_path: &Path) -> Result<ResolvedPath, AccessError> {
        let raw = user_path.to_string_lossy();

        if raw.trim().is_empty() {
            return Err(AccessError::PathOutsideBase("empty path".to_string()));
        }

        if raw.contains('\0') {
            return Err(AccessError::PathTraversal(
                "path contains a NUL byte".to_string(),
            ));
        }

        let normalized = normalize_lexically(user_path);

        if normalized.is_absolute() || normalized.has_root() || starts_with_prefix(&normalized) {
            return Err(AccessError::PathTraversal(format!(
                "absolute path not allowed: {}",
                raw
            )));
        }

        if matches!(normalized.components().next(), Some(Component::ParentDir)) {
            return Err(AccessError::PathTraversal(format!(
                "path escapes base directory: {}",
                raw
            )));
        }

        // Checked on the raw input as well, in case normalization hid a segment.
        if has_parent_segment(&raw) {
            return Err(AccessError::PathTraversal(format!(
                "path contains '..': {}",
                raw
            )));
        }

        if normalized == Path::new(".") {
            return Err(AccessError::PathOutsideBase(
                "path resolves to the base directory itself".to_string(),
            ));
        }

        let full_path = self.base_dir.join(&normalized);

        if full_path.strip_prefix(&self.base_dir).is_err() {
            return Err(AccessError::PathOutsideBase(format!(
                "{} is outside {}",
                full_path.display(),
                self.base_dir.display()
            )));
        }

        let metadata = match fs::symlink_metadata(&full_path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.check_nearest_existing_ancestor(&full_path)?;
                return Ok(ResolvedPath(full_path));
            }
            Err(e) => {
                return Err(AccessError::Io(format!(
                    "failed to inspect {}: {}",
                    full_path.display(),
                    e
                )));
            }
        };

        let base_canonical = self.canonical_base()?;

        if metadata.file_type().is_symlink() {
            let real_path = fs::canonicalize(&full_path).map_err(|e| {
                AccessError::Io(format!(
                    "failed to resolve symlink {}: {}",
                    full_path.display(),
                    e
                ))
            })?;

            if real_path.strip_prefix(&base_canonical).is_err() {
                return Err(AccessError::SymlinkEscape(format!(
                    "{} points outside base directory",
                    full_path.display()
                )));
            }
            reject_base_itself(&real_path, &base_canonical, &full_path)?;

            return Ok(ResolvedPath(real_path));
        }

        // The entry itself is not a link, but a directory on the way to it may be.
        let real_path = fs::canonicalize(&full_path)?;
        if real_path.strip_prefix(&base_canonical).is_err() {
            return Err(AccessError::SymlinkEscape(format!(
                "{} resolves outside base directory",
                full_path.display()
            )));
        }
        reject_base_itself(&real_path, &base_canonical, &full_path)?;

        Ok(ResolvedPath(full_path))
    }

    fn canonical_base(&self) -> Result<PathBuf, AccessError> {
        fs::canonicalize(&self.base_dir).map_err(|e| {
            AccessError::Io(format!(
                "failed to canonicalize base directory {}: {}",
                self.base_dir.display(),
                e
            ))
        })
    }

    /// For a path about to be created, make sure the closest directory that
    /// already exists still lives under the base.
    fn check_nearest_existing_ancestor(&self, full_path: &Path) -> Result<(), AccessError> {
        for ancestor in full_path.ancestors().skip(1) {
            if ancestor.strip_prefix(&self.base_dir).is_err() {
                break;
            }

            match fs::symlink_metadata(ancestor) {
                Ok(_) => {
                    let base_canonical = self.canonical_base()?;
                    let real_ancestor = fs::canonicalize(ancestor)?;
                    if real_ancestor.strip_prefix(&base_canonical).is_err() {
                        return Err(AccessError::SymlinkEscape(format!(
                            "{} resolves outside base directory",
                            ancestor.display()
                        )));
                    }
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}

/// A path whose real location is the base directory names no entry inside it.
fn reject_base_itself(
    real_path: &Path,
    base_canonical: &Path,
    full_path: &Path,
) -> Result<(), AccessError> {
    if real_path == base_canonical {
        return Err(AccessError::PathOutsideBase(format!(
            "{} resolves to the base directory itself",
            full_path.display()
        )));
    }
    Ok(())
}

/// Resolve `user_path` under `base_dir`. See [`PathGuard::resolve`].
pub fn resolve(
    base_dir: impl AsRef<Path>,
    user_path: impl AsRef<Path>,
) -> Result<ResolvedPath, AccessError> {
    PathGuard::new(base_dir.as_ref()).resolve(user_path)
}

/// Collapse `.` and `..` components without touching the filesystem.
///
/// Leading `..` components that cannot be collapsed are kept, and `..` directly
/// under a root stays at the root. An empty result is returned as `.`.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }

    parts.iter().map(|c| c.as_os_str()).collect()
}

fn starts_with_prefix(path: &Path) -> bool {
    matches!(path.components().next(), Some(Component::Prefix(_)))
}

/// Whether any `/`- or `\`-separated segment of the raw input is `..`.
fn has_parent_segment(raw: &str) -> bool {
    raw.split(['/', '\\']).any(|segment| segment == "..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn normalize_collapses_dots() {
        assert_eq!(normalize_lexically(Path::new("a/./b")), PathBuf::from("a/b"));
        assert_eq!(normalize_lexically(Path::new("a/b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize_lexically(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize_lexically(Path::new("./")), PathBuf::from("."));
        assert_eq!(normalize_lexically(Path::new("a/..")), PathBuf::from("."));
        assert_eq!(normalize_lexically(Path::new("/../etc")), PathBuf::from("/etc"));
    }

    #[test]
    fn rejects_traversal_and_absolute_paths() {
        let dir = tempdir().unwrap();
        let guard = PathGuard::new(dir.path());

        for bad in ["../../etc/passwd", "/etc/passwd", "a/../../b", "..", "../x"] {
            let err = guard.resolve(bad).unwrap_err();
            assert!(
                matches!(err, AccessError::PathTraversal(_)),
                "{} gave {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn rejects_parent_segment_even_when_it_normalizes_away() {
        let dir = tempdir().unwrap();
        let guard = PathGuard::new(dir.path());

        assert!(matches!(
            guard.resolve("a/../b"),
            Err(AccessError::PathTraversal(_))
        ));
        assert!(matches!(
            guard.resolve("a\\..\\b"),
            Err(AccessError::PathTraversal(_))
        ));
    }

    #[test]
    fn dots_inside_names_are_fine() {
        let dir = tempdir().unwrap();
        let guard = PathGuard::new(dir.path());

        let resolved = guard.resolve("report..v2.txt").unwrap();
        assert_eq!(resolved.as_path(), dir.path().join("report..v2.txt"));
    }

    #[test]
    fn rejects_empty_and_base_itself() {
        let dir = tempdir().unwrap();
        let guard = PathGuard::new(dir.path());

        assert!(matches!(guard.resolve(""), Err(AccessError::PathOutsideBase(_))));
        assert!(matches!(guard.resolve("."), Err(AccessError::PathOutsideBase(_))));
        assert!(matches!(guard.resolve("./"), Err(AccessError::PathOutsideBase(_))));
    }

    #[test]
    fn nonexistent_path_is_accepted() {
        let dir = tempdir().unwrap();
        let guard = PathGuard::new(dir.path());

        let resolved = guard.resolve("new/sub/file.bin").unwrap();
        assert_eq!(resolved.as_path(), dir.path().join("new/sub/file.bin"));
    }

    #[test]
    fn existing_file_is_returned_as_joined() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("hello.txt"), b"hi").unwrap();

        let resolved = resolve(dir.path(), "./hello.txt").unwrap();
        assert_eq!(resolved.into_path_buf(), dir.path().join("hello.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_inside_base_resolves_to_target() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("real.txt");
        fs::write(&target, b"data").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

        let resolved = PathGuard::new(dir.path()).resolve("link.txt").unwrap();
        assert_eq!(resolved.as_path(), fs::canonicalize(&target).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escaping_base_is_rejected() {
        let base = tempdir().unwrap();
        let outside = tempdir().unwrap();
        let secret = outside.path().join("secret.txt");
        fs::write(&secret, b"secret").unwrap();
        std::os::unix::fs::symlink(&secret, base.path().join("escape.txt")).unwrap();

        let err = PathGuard::new(base.path()).resolve("escape.txt").unwrap_err();
        assert!(matches!(err, AccessError::SymlinkEscape(_)));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_escaping_base_is_rejected() {
        let base = tempdir().unwrap();
        let outside = tempdir().unwrap();
        fs::write(outside.path().join("passwd"), b"root").unwrap();
        std::os::unix::fs::symlink(outside.path(), base.path().join("etc")).unwrap();

        let guard = PathGuard::new(base.path());
        assert!(matches!(
            guard.resolve("etc/passwd"),
            Err(AccessError::SymlinkEscape(_))
        ));
        assert!(matches!(
            guard.resolve("etc/new-file"),
            Err(AccessError::SymlinkEscape(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_base_itself_is_rejected() {
        let base = tempdir().unwrap();
        std::os::unix::fs::symlink(base.path(), base.path().join("root")).unwrap();

        let guard = PathGuard::new(base.path());
        assert!(matches!(
            guard.resolve("root"),
            Err(AccessError::PathOutsideBase(_))
        ));
        assert!(matches!(
            guard.resolve("root/root"),
            Err(AccessError::PathOutsideBase(_))
        ));

        // Entries reached through the link are still inside the base.
        fs::write(base.path().join("file.txt"), b"data").unwrap();
        assert!(guard.resolve("root/file.txt").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_fails_closed() {
        let base = tempdir().unwrap();
        std::os::unix::fs::symlink(base.path().join("missing"), base.path().join("dangling"))
            .unwrap();

        let err = PathGuard::new(base.path()).resolve("dangling").unwrap_err();
        assert!(matches!(err, AccessError::Io(_)));
    }
}

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu, ensure};

use crate::ext::normalize_path;

/// Checks that `target` may be the subject of a destructive operation.
///
/// The target must be absolute and lie strictly below `project_root`, both after
/// resolving `.` and `..` lexically and after resolving symbolic links on disk, so a
/// link inside the root cannot redirect the operation elsewhere. The comparison is
/// component-wise, so `/srv/site-old` is not inside `/srv/site`. Returns the
/// lexically normalised target.
pub fn ensure_inside_root(project_root: &Path, target: &Path) -> Result<PathBuf, PathGuardError> {
    ensure!(
        target.is_absolute(),
        NotAbsoluteSnafu {
            path: target.to_path_buf()
        }
    );
    ensure!(
        project_root.is_absolute(),
        RootNotAbsoluteSnafu {
            root: project_root.to_path_buf()
        }
    );

    let root = normalize_path(project_root);
    let normalized = normalize_path(target);
    check_below(target, &normalized, &root)?;

    let resolved_root = resolve_existing(&root)?;
    let resolved = resolve_existing(&normalized)?;
    check_below(target, &resolved, &resolved_root)?;

    Ok(normalized)
}

fn check_below(target: &Path, candidate: &Path, root: &Path) -> Result<(), PathGuardError> {
    ensure!(
        candidate.starts_with(root),
        OutsideRootSnafu {
            path: target.to_path_buf(),
            root: root.to_path_buf(),
        }
    );
    ensure!(
        candidate != root,
        IsProjectRootSnafu {
            path: target.to_path_buf()
        }
    );
    Ok(())
}

/// Canonicalizes the deepest existing ancestor of `path` and appends the missing tail.
fn resolve_existing(path: &Path) -> Result<PathBuf, PathGuardError> {
    let mut existing = path;
    let mut missing: Vec<OsString> = Vec::new();
    loop {
        match std::fs::canonicalize(existing) {
            Ok(resolved) => {
                return Ok(missing
                    .iter()
                    .rev()
                    .fold(resolved, |resolved, name| resolved.join(name)));
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        missing.push(name.to_os_string());
                        existing = parent;
                    }
                    _ => {
                        return Err(err).context(ResolveSnafu {
                            path: path.to_path_buf(),
                        });
                    }
                }
            }
            Err(err) => {
                return Err(err).context(ResolveSnafu {
                    path: path.to_path_buf(),
                });
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum PathGuardError {
    #[snafu(display("Path must be absolute: {}", path.display()))]
    NotAbsolute { path: PathBuf },
    #[snafu(display("Project root must be absolute: {}", root.display()))]
    RootNotAbsolute { root: PathBuf },
    #[snafu(display("Path must be inside project root {}: {}", root.display(), path.display()))]
    OutsideRoot { path: PathBuf, root: PathBuf },
    #[snafu(display("Path is the project root itself: {}", path.display()))]
    IsProjectRoot { path: PathBuf },
    #[snafu(display("Failed to resolve {}", path.display()))]
    Resolve {
        path: PathBuf,
        source: std::io::Error,
    },
}

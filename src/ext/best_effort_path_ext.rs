use std::path::{Component, Path, PathBuf};

/// Display form of a path for error messages and logs.
///
/// Uses the canonical path when the entry exists, otherwise a lexically normalised
/// absolute path. Never follow links with this when the link itself is the subject.
pub fn best_effort_path_display(path: &Path) -> String {
    match path.canonicalize() {
        Ok(canonical_path) => canonical_path.display().to_string(),
        Err(_) => match std::path::absolute(path) {
            Ok(absolute_path) => normalize_path(&absolute_path).display().to_string(),
            Err(_) => normalize_path(path).display().to_string(),
        },
    }
}

/// Resolves `.` and `..` components without touching the filesystem.
///
/// `..` never climbs above the root of an absolute path.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                match components.last() {
                    Some(Component::RootDir | Component::Prefix(_)) => {}
                    Some(Component::ParentDir) | None => components.push(component),
                    Some(_) => {
                        components.pop();
                    }
                }
            }
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

/// Joins a possibly relative `path` onto `base` and normalises the result.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    normalize_path(&base.join(path))
}

pub trait BestEffortPathExt {
    fn best_effort_path_display(&self) -> String;
}

impl BestEffortPathExt for Path {
    fn best_effort_path_display(&self) -> String {
        best_effort_path_display(self)
    }
}

impl BestEffortPathExt for PathBuf {
    fn best_effort_path_display(&self) -> String {
        best_effort_path_display(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/a/b/../c", "/a/c")]
    #[case("/a/./b/", "/a/b")]
    #[case("/../a", "/a")]
    #[case("a/../../b", "../b")]
    #[case("./a", "a")]
    fn normalizes_lexically(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_path(Path::new(input)), PathBuf::from(expected));
    }

    #[test]
    fn resolve_against_keeps_absolute_paths() {
        assert_eq!(
            resolve_against(Path::new("/work"), Path::new("/srv/site/../x")),
            PathBuf::from("/srv/x")
        );
        assert_eq!(
            resolve_against(Path::new("/work"), Path::new("site/./dist")),
            PathBuf::from("/work/site/dist")
        );
    }

    #[test]
    fn display_of_missing_path_is_absolute() {
        let display = Path::new("/definitely/not/../here").best_effort_path_display();
        assert_eq!(display, "/definitely/here");
    }
}

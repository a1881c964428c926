use crate::config::CONFIG_FILE;
use crate::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable that pins the project root.
pub const ROOT_ENV: &str = "TASKLY_ROOT";

/// Resolve the project root.
///
/// Priority: explicit `--root`, then `TASKLY_ROOT`, then the nearest ancestor of
/// the current directory that looks like the solution root.
pub fn project_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let cwd = env::current_dir()
        .map_err(|e| Error::internal_io(e.to_string(), Some("read current dir".to_string())))?;

    resolve_root(explicit, env::var(ROOT_ENV).ok().as_deref(), &cwd)
}

/// [`project_root`] with the environment value and starting directory supplied.
pub fn resolve_root(explicit: Option<&Path>, env_root: Option<&str>, cwd: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return existing_dir(&expand(path), "--root");
    }

    if let Some(value) = env_root.filter(|v| !v.trim().is_empty()) {
        return existing_dir(&expand(Path::new(value)), ROOT_ENV);
    }

    find_root_from(cwd).ok_or_else(|| {
        Error::project_root_not_found(cwd.to_string_lossy().to_string(), root_markers())
    })
}

/// Walk upward from `start` until a directory carrying a root marker is found.
pub fn find_root_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| is_project_root(dir))
        .map(Path::to_path_buf)
}

pub fn is_project_root(dir: &Path) -> bool {
    if dir.join(CONFIG_FILE).is_file() {
        return true;
    }

    if has_solution_file(dir) {
        return true;
    }

    dir.join("src").is_dir() && dir.join("tests").is_dir()
}

fn has_solution_file(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };

    entries.filter_map(|e| e.ok()).any(|entry| {
        entry
            .path()
            .extension()
            .is_some_and(|ext| ext == "sln" || ext == "slnx")
    })
}

fn root_markers() -> Vec<String> {
    vec![
        CONFIG_FILE.to_string(),
        "*.sln".to_string(),
        "*.slnx".to_string(),
        "src/ + tests/".to_string(),
    ]
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string())
}

fn existing_dir(path: &Path, source: &str) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(Error::validation_invalid_argument(
            "root",
            format!("{} does not point to a directory: {}", source, path.display()),
            Some(path.to_string_lossy().to_string()),
            None,
        ));
    }
    Ok(path.to_path_buf())
}

/// Join a configured relative path (always written with `/`) onto the root.
pub fn join(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}

/// Display a path relative to the root when possible; the root itself is `.`.
pub fn relative(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
        Err(_) => path.to_string_lossy().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_root_by_solution_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Taskly.sln"), "").unwrap();
        let nested = dir.path().join("src").join("Api");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_root_from(&nested).unwrap(), dir.path());
    }

    #[test]
    fn finds_root_by_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{}").unwrap();
        let nested = dir.path().join("scripts");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_root_from(&nested).unwrap(), dir.path());
    }

    #[test]
    fn finds_root_by_src_and_tests_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("tests").join("UnitTests")).unwrap();

        let nested = dir.path().join("tests").join("UnitTests");
        assert_eq!(find_root_from(&nested).unwrap(), dir.path());
    }

    #[test]
    fn explicit_root_must_exist() {
        let err = project_root(Some(Path::new("/nonexistent/taskly/root"))).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn explicit_root_wins() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(project_root(Some(dir.path())).unwrap(), dir.path());
    }

    #[test]
    fn env_root_beats_markers_but_not_explicit_root() {
        let marked = tempfile::tempdir().unwrap();
        fs::write(marked.path().join("Taskly.sln"), "").unwrap();
        let from_env = tempfile::tempdir().unwrap();
        let explicit = tempfile::tempdir().unwrap();
        let env_value = from_env.path().to_string_lossy().to_string();

        let root = resolve_root(None, Some(&env_value), marked.path()).unwrap();
        assert_eq!(root, from_env.path());

        let root = resolve_root(Some(explicit.path()), Some(&env_value), marked.path()).unwrap();
        assert_eq!(root, explicit.path());

        let root = resolve_root(None, Some("  "), marked.path()).unwrap();
        assert_eq!(root, marked.path());
    }

    #[test]
    fn env_root_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_root(None, Some("/nonexistent/taskly/root"), dir.path()).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
        assert!(err.message.starts_with(ROOT_ENV));
    }

    #[test]
    fn unmarked_directory_is_root_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("scratch");
        fs::create_dir_all(&nested).unwrap();

        let err = resolve_root(None, None, &nested).unwrap_err();
        assert_eq!(err.code.as_str(), "project.root_not_found");
        assert_eq!(err.details["startDir"], nested.to_string_lossy().as_ref());
        assert_eq!(err.details["markers"][0], CONFIG_FILE);
    }

    #[test]
    fn join_splits_forward_slashes() {
        let root = Path::new("/repo");
        assert_eq!(
            join(root, "src/Api/appsettings.json"),
            Path::new("/repo").join("src").join("Api").join("appsettings.json")
        );
    }

    #[test]
    fn relative_strips_root() {
        let root = Path::new("/repo");
        assert_eq!(
            relative(root, Path::new("/repo/src/Api/Api.csproj")),
            "src/Api/Api.csproj"
        );
        assert_eq!(relative(root, Path::new("/elsewhere/x")), "/elsewhere/x");
        assert_eq!(relative(root, root), ".");
    }
}

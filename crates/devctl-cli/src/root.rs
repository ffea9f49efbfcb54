use std::path::{Path, PathBuf};

/// Resolve the directory command discovery starts from.
///
/// Priority:
/// 1. `--cwd` flag / `DEVCTL_CWD` env var (passed in as `explicit`),
///    resolved against the current directory when relative
/// 2. The current directory
/// 3. `.` if the current directory cannot be read
pub fn resolve_cwd(explicit: Option<&Path>) -> PathBuf {
    let current = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match explicit {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => current.join(p),
        None => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_absolute_wins() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_cwd(Some(dir.path())), dir.path());
    }

    #[test]
    fn relative_is_joined_to_current_dir() {
        let current = std::env::current_dir().unwrap();
        assert_eq!(resolve_cwd(Some(Path::new("sub"))), current.join("sub"));
    }

    #[test]
    fn defaults_to_current_dir() {
        assert_eq!(resolve_cwd(None), std::env::current_dir().unwrap());
    }
}

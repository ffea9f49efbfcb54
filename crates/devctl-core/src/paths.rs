use crate::error::{DevctlError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File name constants
// ---------------------------------------------------------------------------

/// Project-local config names, in tie-break order within one directory.
pub const PROJECT_CONFIG_FILES: &[&str] = &[".devctl.yaml", ".devctl.yml"];

pub const DEVCTL_HOME_VAR: &str = "DEVCTL_HOME";
pub const DEVCTL_HOME_DIR: &str = ".devctl";
pub const GLOBAL_CONFIG_FILE: &str = "config.yml";
pub const PLUGINS_DIR: &str = "plugins";
pub const PLUGIN_COMMANDS_FILE: &str = "commands.yml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `$DEVCTL_HOME`, else `~/.devctl`.
pub fn devctl_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DEVCTL_HOME_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    home::home_dir()
        .map(|h| h.join(DEVCTL_HOME_DIR))
        .ok_or(DevctlError::HomeNotFound)
}

pub fn global_config_path(home: &Path) -> PathBuf {
    home.join(GLOBAL_CONFIG_FILE)
}

pub fn plugins_dir(home: &Path) -> PathBuf {
    home.join(PLUGINS_DIR)
}

pub fn plugin_commands_path(home: &Path, plugin: &str) -> PathBuf {
    plugins_dir(home).join(plugin).join(PLUGIN_COMMANDS_FILE)
}

/// Every project config file from `start` up to the filesystem root.
///
/// Closest directory first; within a directory, `PROJECT_CONFIG_FILES` order.
pub fn project_config_files(start: &Path) -> Vec<PathBuf> {
    start
        .ancestors()
        .flat_map(|dir| PROJECT_CONFIG_FILES.iter().map(move |name| dir.join(name)))
        .filter(|p| p.is_file())
        .collect()
}

/// Nearest ancestor of `start` (inclusive) containing a `.git` entry.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

pub mod config;
pub mod context;
pub mod plugins;
pub mod run;
pub mod version;

use devctl_core::catalog::{self, Discovery, MergeReport};
use devctl_core::config::CommandsFile;
use devctl_core::paths;
use devctl_core::registry::Registry;
use devctl_core::sanitizer::{SanitizeMode, Sanitizer, SanitizerConfig};
use std::path::Path;

/// Everything discovered for one invocation: where we looked, what got
/// registered, and how the sanitizer is configured.
pub struct Session {
    pub discovery: Discovery,
    pub registry: Registry,
    pub report: MergeReport,
    pub sanitizer: SanitizerConfig,
}

impl Session {
    pub fn load(cwd: &Path, mode: SanitizeMode) -> Self {
        let home = match paths::devctl_home() {
            Ok(home) => Some(home),
            Err(e) => {
                tracing::warn!(error = %e, "plugin and global commands unavailable");
                None
            }
        };
        let discovery = Discovery::new(cwd, home);
        let (registry, report) = catalog::load(&discovery);
        let sanitizer = sanitizer_config(&discovery, mode);
        Session {
            discovery,
            registry,
            report,
            sanitizer,
        }
    }

    pub fn sanitizer(&self) -> Sanitizer {
        Sanitizer::new(self.sanitizer)
    }
}

/// Mode from the environment plus allowances from the global file. A global
/// file that fails to parse is already reported by the merge, so its
/// allowances silently fall back to off.
fn sanitizer_config(discovery: &Discovery, mode: SanitizeMode) -> SanitizerConfig {
    let settings = discovery
        .global_file()
        .and_then(|path| CommandsFile::load(&path).ok())
        .and_then(|file| file.sanitizer)
        .unwrap_or_default();
    SanitizerConfig::new(mode)
        .with_allow_pipes(settings.allow_pipes)
        .with_allow_redirects(settings.allow_redirects)
}

//! Command discovery across trust tiers and merging into one [`Registry`].
//!
//! Tiers are processed strictly in [`Tier`] order: Core, project-local
//! files (closest directory first), plugin sets (by plugin name), then the
//! global file. The first source to claim a name keeps it.
//!
//! Two policies are explicit here rather than falling out of control flow:
//!
//! - **Protected names**: a non-Core definition using a built-in name is
//!   skipped and recorded as [`SkipReason::Protected`]. It is never an error.
//! - **Best-effort loading**: a source that fails to load is recorded in
//!   [`MergeReport::errors`] and the remaining sources are still merged.

use crate::builtin::{core_definitions, is_protected};
use crate::config::CommandsFile;
use crate::definition::{CommandDefinition, Tier};
use crate::error::{DevctlError, Result};
use crate::paths;
use crate::registry::{Registration, Registry};
use serde::Serialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// CommandSource
// ---------------------------------------------------------------------------

pub trait CommandSource {
    fn tier(&self) -> Tier;
    /// Human-readable origin, e.g. a file path or plugin name.
    fn label(&self) -> String;
    fn load(&self) -> Result<Vec<CommandDefinition>>;
}

/// The compiled-in built-ins.
pub struct CoreSource;

impl CommandSource for CoreSource {
    fn tier(&self) -> Tier {
        Tier::Core
    }

    fn label(&self) -> String {
        "built-in".to_string()
    }

    fn load(&self) -> Result<Vec<CommandDefinition>> {
        Ok(core_definitions())
    }
}

/// One YAML file in the project-local or global tier.
pub struct ConfigFileSource {
    path: PathBuf,
    tier: Tier,
}

impl ConfigFileSource {
    pub fn new(path: impl Into<PathBuf>, tier: Tier) -> Self {
        Self {
            path: path.into(),
            tier,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CommandSource for ConfigFileSource {
    fn tier(&self) -> Tier {
        self.tier
    }

    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Vec<CommandDefinition>> {
        let file = CommandsFile::load(&self.path)?;
        Ok(file.definitions(self.tier, self.tier.as_str()))
    }
}

/// The default command set bundled with one installed plugin.
pub struct PluginSetSource {
    plugin: String,
    path: PathBuf,
}

impl PluginSetSource {
    pub fn new(plugin: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            plugin: plugin.into(),
            path: path.into(),
        }
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }
}

impl CommandSource for PluginSetSource {
    fn tier(&self) -> Tier {
        Tier::Plugin
    }

    fn label(&self) -> String {
        format!("plugin:{}", self.plugin)
    }

    fn load(&self) -> Result<Vec<CommandDefinition>> {
        let file = CommandsFile::load(&self.path)?;
        Ok(file.definitions(Tier::Plugin, &self.label()))
    }
}

/// Definitions handed over in memory, e.g. by a plugin host.
pub struct StaticSource {
    label: String,
    tier: Tier,
    definitions: Vec<CommandDefinition>,
}

impl StaticSource {
    pub fn new(label: impl Into<String>, tier: Tier, definitions: Vec<CommandDefinition>) -> Self {
        Self {
            label: label.into(),
            tier,
            definitions,
        }
    }
}

impl CommandSource for StaticSource {
    fn tier(&self) -> Tier {
        self.tier
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn load(&self) -> Result<Vec<CommandDefinition>> {
        Ok(self
            .definitions
            .iter()
            .cloned()
            .map(|mut def| {
                def.tier = self.tier;
                def
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Filesystem locations consulted during discovery.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub cwd: PathBuf,
    /// devctl home; `None` disables the plugin and global tiers.
    pub home: Option<PathBuf>,
}

impl Discovery {
    pub fn new(cwd: impl Into<PathBuf>, home: Option<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            home,
        }
    }

    pub fn project_files(&self) -> Vec<PathBuf> {
        paths::project_config_files(&self.cwd)
    }

    /// Installed plugin sets as (plugin name, commands file), by name.
    pub fn plugin_sets(&self) -> Vec<(String, PathBuf)> {
        let Some(home) = &self.home else {
            return Vec::new();
        };
        let Ok(entries) = std::fs::read_dir(paths::plugins_dir(home)) else {
            return Vec::new();
        };
        let mut sets: Vec<(String, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                // Skip hidden and scratch dirs
                if name.starts_with('.') || name.starts_with('_') {
                    return None;
                }
                let file = paths::plugin_commands_path(home, &name);
                file.is_file().then_some((name, file))
            })
            .collect();
        sets.sort();
        sets
    }

    pub fn global_file(&self) -> Option<PathBuf> {
        let path = paths::global_config_path(self.home.as_ref()?);
        path.is_file().then_some(path)
    }

    /// Every source in tier order.
    pub fn sources(&self) -> Vec<Box<dyn CommandSource>> {
        let mut sources: Vec<Box<dyn CommandSource>> = vec![Box::new(CoreSource)];
        for path in self.project_files() {
            sources.push(Box::new(ConfigFileSource::new(path, Tier::ProjectLocal)));
        }
        for (plugin, path) in self.plugin_sets() {
            sources.push(Box::new(PluginSetSource::new(plugin, path)));
        }
        if let Some(path) = self.global_file() {
            sources.push(Box::new(ConfigFileSource::new(path, Tier::Global)));
        }
        sources
    }
}

// ---------------------------------------------------------------------------
// MergeReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Name is a protected built-in.
    Protected,
    /// Name was already claimed by an earlier source.
    Shadowed { by: Tier },
    /// The command registered but this alias collided and was dropped.
    AliasDropped { alias: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct Skipped {
    pub name: String,
    pub tier: Tier,
    pub source: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registered {
    pub name: String,
    pub tier: Tier,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub label: String,
    pub tier: Tier,
    pub loaded: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceError {
    pub source: String,
    pub tier: Tier,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeReport {
    pub sources: Vec<SourceSummary>,
    pub registered: Vec<Registered>,
    pub skipped: Vec<Skipped>,
    pub errors: Vec<SourceError>,
}

impl MergeReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Names a given source actually contributed to the registry.
    pub fn registered_from(&self, source: &str) -> Vec<&str> {
        self.registered
            .iter()
            .filter(|r| r.source == source)
            .map(|r| r.name.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Protected-name policy: `Some(Protected)` when a non-Core definition
/// tries to use a built-in name.
pub fn protected_collision(def: &CommandDefinition) -> Option<SkipReason> {
    (def.tier != Tier::Core && is_protected(&def.name)).then_some(SkipReason::Protected)
}

/// Merge `sources` into a fresh registry. Sources are stably re-ordered by
/// tier so a lower-priority tier can never be processed first.
pub fn merge(sources: &[Box<dyn CommandSource>]) -> (Registry, MergeReport) {
    let mut ordered: Vec<&dyn CommandSource> = sources.iter().map(|s| s.as_ref()).collect();
    ordered.sort_by_key(|s| s.tier());

    let mut registry = Registry::new();
    let mut report = MergeReport::default();

    for source in ordered {
        let label = source.label();
        let tier = source.tier();
        let definitions = match source.load() {
            Ok(defs) => defs,
            Err(e) => {
                tracing::warn!(source = %label, error = %e, "skipping command source");
                report.errors.push(SourceError {
                    source: label,
                    tier,
                    message: e.to_string(),
                });
                continue;
            }
        };
        report.sources.push(SourceSummary {
            label: label.clone(),
            tier,
            loaded: definitions.len(),
        });

        for def in definitions {
            merge_one(&mut registry, &mut report, &label, def);
        }
    }

    (registry, report)
}

fn merge_one(registry: &mut Registry, report: &mut MergeReport, label: &str, def: CommandDefinition) {
    let skip = |reason: SkipReason| Skipped {
        name: def.name.clone(),
        tier: def.tier,
        source: label.to_string(),
        reason,
    };

    if let Some(reason) = protected_collision(&def) {
        report.skipped.push(skip(reason));
        return;
    }

    match registry.register_definition(&def) {
        Ok(Registration::Registered { dropped_aliases }) => {
            tracing::debug!(command = %def.name, tier = %def.tier, source = %label, "registered");
            report.registered.push(Registered {
                name: def.name.clone(),
                tier: def.tier,
                source: label.to_string(),
            });
            for alias in dropped_aliases {
                report.skipped.push(skip(SkipReason::AliasDropped { alias }));
            }
        }
        Ok(Registration::Protected) => report.skipped.push(skip(SkipReason::Protected)),
        Err(DevctlError::DuplicateCommand(_)) => {
            let by = registry.tier_of(&def.name).unwrap_or(def.tier);
            tracing::debug!(command = %def.name, source = %label, %by, "shadowed by earlier source");
            report.skipped.push(skip(SkipReason::Shadowed { by }));
        }
        Err(e) => report.errors.push(SourceError {
            source: label.to_string(),
            tier: def.tier,
            message: e.to_string(),
        }),
    }
}

/// Discover every source under `discovery` and merge them.
pub fn load(discovery: &Discovery) -> (Registry, MergeReport) {
    merge(&discovery.sources())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

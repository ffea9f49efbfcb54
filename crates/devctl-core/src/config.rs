use crate::builtin::is_protected;
use crate::definition::{CommandDefinition, Tier};
use crate::error::{DevctlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// CommandSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSpec {
    pub cmd: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub interactive: bool,
}

/// A command entry is either a bare template string or a full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandEntry {
    Template(String),
    Full(CommandSpec),
}

impl CommandEntry {
    pub fn template(&self) -> &str {
        match self {
            CommandEntry::Template(t) => t,
            CommandEntry::Full(spec) => &spec.cmd,
        }
    }

    fn aliases(&self) -> Vec<String> {
        match self {
            CommandEntry::Template(_) => Vec::new(),
            CommandEntry::Full(spec) => spec
                .alias
                .iter()
                .chain(spec.aliases.iter())
                .cloned()
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// SanitizerSettings
// ---------------------------------------------------------------------------

/// Pipe/redirect allowances. Read from the global file only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizerSettings {
    #[serde(default)]
    pub allow_pipes: bool,
    #[serde(default)]
    pub allow_redirects: bool,
}

// ---------------------------------------------------------------------------
// CommandsFile (top-level)
// ---------------------------------------------------------------------------

/// One devctl configuration file. Unknown top-level keys are ignored so
/// project files can carry settings for other tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandsFile {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<String, CommandEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanitizer: Option<SanitizerSettings>,
}

impl CommandsFile {
    /// Parse YAML text. An empty or comment-only document is an empty file.
    pub fn parse(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let value: serde_yaml::Value = serde_yaml::from_str(text)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value)
    }

    /// Read and parse `path`. Any failure is a `ConfigParse` naming the file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DevctlError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&text).map_err(|e| DevctlError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Definitions in name order, tagged with `tier`. Entries without an
    /// explicit category get `default_category`.
    pub fn definitions(&self, tier: Tier, default_category: &str) -> Vec<CommandDefinition> {
        self.commands
            .iter()
            .map(|(name, entry)| {
                let mut def = CommandDefinition::new(name.as_str(), entry.template(), tier)
                    .with_category(default_category);
                def.aliases = entry.aliases();
                if let CommandEntry::Full(spec) = entry {
                    def.description = spec.description.clone();
                    def.env = spec.env.clone();
                    def.hidden = spec.hidden;
                    def.interactive = spec.interactive;
                    if let Some(cat) = &spec.category {
                        def.category = cat.clone();
                    }
                }
                def
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for (name, entry) in &self.commands {
            // 1. Names must be usable as a single CLI word
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("command name '{name}' must be a single non-empty word"),
                });
            }

            // 2. Protected names never take effect
            if is_protected(name) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "command '{name}' shadows a built-in command and will be ignored"
                    ),
                });
            }

            // 3. Empty templates
            if entry.template().trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("command '{name}' has an empty cmd"),
                });
            }

            // 4. Aliases
            for alias in entry.aliases() {
                if alias == *name {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!("command '{name}' lists itself as an alias"),
                    });
                } else if is_protected(&alias) {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!(
                            "alias '{alias}' of command '{name}' is a built-in name and will be dropped"
                        ),
                    });
                } else if self.commands.contains_key(&alias) {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Warning,
                        message: format!(
                            "alias '{alias}' of command '{name}' collides with another command"
                        ),
                    });
                }
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

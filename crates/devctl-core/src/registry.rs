//! Name → command store with alias resolution.
//!
//! Canonical names and aliases share one namespace: an alias can never
//! shadow another command's name or alias. Protected built-in names are
//! only accepted from the Core tier; any other tier registering one is
//! ignored without an error.

use crate::builtin::is_protected;
use crate::definition::{CommandDefinition, Tier};
use crate::error::{DevctlError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandKind {
    Builtin,
    Custom { definition: CommandDefinition },
}

/// A concrete command produced by a factory, with registry metadata stamped on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    pub name: String,
    pub description: String,
    pub category: String,
    pub aliases: Vec<String>,
    pub hidden: bool,
    pub tier: Tier,
    #[serde(flatten)]
    pub kind: CommandKind,
}

impl Command {
    pub fn definition(&self) -> Option<&CommandDefinition> {
        match &self.kind {
            CommandKind::Custom { definition } => Some(definition),
            CommandKind::Builtin => None,
        }
    }
}

pub type Factory = Arc<dyn Fn() -> Command + Send + Sync>;

/// Factory for a definition: built-ins for Core, custom commands otherwise.
pub fn definition_factory(def: CommandDefinition) -> Factory {
    Arc::new(move || Command {
        name: def.name.clone(),
        description: def.description.clone(),
        category: String::new(),
        aliases: Vec::new(),
        hidden: false,
        tier: def.tier,
        kind: if def.is_builtin() {
            CommandKind::Builtin
        } else {
            CommandKind::Custom {
                definition: def.clone(),
            }
        },
    })
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub category: String,
    pub description: String,
    pub aliases: Vec<String>,
    pub hidden: bool,
}

impl Metadata {
    pub fn from_definition(def: &CommandDefinition) -> Self {
        Self {
            category: def.category.clone(),
            description: def.description.clone(),
            aliases: def.aliases.clone(),
            hidden: def.hidden,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// Registered; any aliases that collided were dropped.
    Registered { dropped_aliases: Vec<String> },
    /// A non-Core tier tried to claim a protected name and was ignored.
    Protected,
}

struct Entry {
    factory: Factory,
    metadata: Metadata,
    tier: Tier,
}

#[derive(Default)]
pub struct Registry {
    entries: BTreeMap<String, Entry>,
    aliases: BTreeMap<String, String>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("commands", &self.entries.keys().collect::<Vec<_>>())
            .field("aliases", &self.aliases)
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &str,
        tier: Tier,
        factory: Factory,
        mut metadata: Metadata,
    ) -> Result<Registration> {
        if tier != Tier::Core && is_protected(name) {
            tracing::debug!(command = %name, %tier, "ignoring protected command name");
            return Ok(Registration::Protected);
        }
        if self.is_taken(name) {
            return Err(DevctlError::DuplicateCommand(name.to_string()));
        }

        let mut kept: Vec<String> = Vec::new();
        let mut dropped = Vec::new();
        for alias in std::mem::take(&mut metadata.aliases) {
            let collides = alias == name
                || kept.contains(&alias)
                || self.is_taken(&alias)
                || (tier != Tier::Core && is_protected(&alias));
            if collides {
                tracing::debug!(command = %name, alias = %alias, "dropping colliding alias");
                dropped.push(alias);
            } else {
                kept.push(alias);
            }
        }

        for alias in &kept {
            self.aliases.insert(alias.clone(), name.to_string());
        }
        metadata.aliases = kept;
        self.entries.insert(
            name.to_string(),
            Entry {
                factory,
                metadata,
                tier,
            },
        );
        Ok(Registration::Registered {
            dropped_aliases: dropped,
        })
    }

    /// Register a definition with its own factory and metadata.
    pub fn register_definition(&mut self, def: &CommandDefinition) -> Result<Registration> {
        self.register(
            &def.name,
            def.tier,
            definition_factory(def.clone()),
            Metadata::from_definition(def),
        )
    }

    fn is_taken(&self, name: &str) -> bool {
        self.entries.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Canonical name for `name`, checking aliases first.
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if let Some(canonical) = self.aliases.get(name) {
            return Some(canonical.as_str());
        }
        self.entries.contains_key(name).then_some(name)
    }

    pub fn get(&self, name: &str) -> Option<&Factory> {
        let canonical = self.resolve(name)?;
        self.entries.get(canonical).map(|e| &e.factory)
    }

    pub fn get_metadata(&self, name: &str) -> Option<&Metadata> {
        let canonical = self.resolve(name)?;
        self.entries.get(canonical).map(|e| &e.metadata)
    }

    pub fn tier_of(&self, name: &str) -> Option<Tier> {
        let canonical = self.resolve(name)?;
        self.entries.get(canonical).map(|e| e.tier)
    }

    /// Instantiate one command, alias-aware.
    pub fn create(&self, name: &str) -> Option<Command> {
        let canonical = self.resolve(name)?;
        self.entries.get(canonical).map(instantiate)
    }

    /// Instantiate every registered command, sorted by canonical name.
    pub fn create_all(&self) -> Vec<Command> {
        self.entries.values().map(instantiate).collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, e)| e.metadata.category == category)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn categories(&self) -> Vec<String> {
        let mut cats: Vec<String> = self
            .entries
            .values()
            .map(|e| e.metadata.category.clone())
            .collect();
        cats.sort();
        cats.dedup();
        cats
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn instantiate(entry: &Entry) -> Command {
    let mut cmd = (entry.factory)();
    cmd.aliases = entry.metadata.aliases.clone();
    cmd.hidden = entry.metadata.hidden;
    cmd.category = entry.metadata.category.clone();
    if cmd.description.is_empty() {
        cmd.description = entry.metadata.description.clone();
    }
    cmd
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

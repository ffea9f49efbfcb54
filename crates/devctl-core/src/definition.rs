use serde::Serialize;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Where a command definition came from. Declaration order is priority
/// order: earlier tiers always win a name collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Core,
    ProjectLocal,
    Plugin,
    Global,
}

impl Tier {
    pub fn all() -> &'static [Tier] {
        &[Tier::Core, Tier::ProjectLocal, Tier::Plugin, Tier::Global]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Core => "core",
            Tier::ProjectLocal => "project",
            Tier::Plugin => "plugin",
            Tier::Global => "global",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CommandDefinition
// ---------------------------------------------------------------------------

/// A named command as declared by one source. Built-in definitions carry
/// an empty template; they are handled by the CLI front end directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    pub template: String,
    pub aliases: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub category: String,
    pub tier: Tier,
    pub interactive: bool,
    pub hidden: bool,
}

impl CommandDefinition {
    pub fn new(name: impl Into<String>, template: impl Into<String>, tier: Tier) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            template: template.into(),
            aliases: Vec::new(),
            env: BTreeMap::new(),
            category: tier.as_str().to_string(),
            tier,
            interactive: false,
            hidden: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn is_builtin(&self) -> bool {
        self.tier == Tier::Core
    }
}

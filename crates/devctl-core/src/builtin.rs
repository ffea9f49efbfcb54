//! Built-in commands compiled into devctl.
//!
//! Every built-in name is protected: no project, plugin, or global
//! definition can replace it, whatever order sources are loaded in.

use crate::definition::{CommandDefinition, Tier};

pub const PROTECTED_COMMANDS: &[&str] = &[
    "help",
    "setup",
    "plugins",
    "plugin",
    "self-update",
    "update",
    "upgrade",
    "version",
    "completion",
    "global",
    "config",
    "context",
    "shell-test",
    "docker-test",
    "container-test",
];

pub fn is_protected(name: &str) -> bool {
    PROTECTED_COMMANDS.contains(&name)
}

struct Builtin {
    name: &'static str,
    description: &'static str,
    category: &'static str,
    hidden: bool,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "help",
        description: "Help about any command",
        category: "core",
        hidden: false,
    },
    Builtin {
        name: "setup",
        description: "Interactive project setup",
        category: "setup",
        hidden: false,
    },
    Builtin {
        name: "plugins",
        description: "List installed plugins and the commands they bundle",
        category: "plugins",
        hidden: false,
    },
    Builtin {
        name: "plugin",
        description: "Manage a single plugin",
        category: "plugins",
        hidden: true,
    },
    Builtin {
        name: "self-update",
        description: "Update devctl to the latest release",
        category: "setup",
        hidden: false,
    },
    Builtin {
        name: "update",
        description: "Alias of self-update",
        category: "setup",
        hidden: true,
    },
    Builtin {
        name: "upgrade",
        description: "Alias of self-update",
        category: "setup",
        hidden: true,
    },
    Builtin {
        name: "version",
        description: "Print version information",
        category: "core",
        hidden: false,
    },
    Builtin {
        name: "completion",
        description: "Generate shell completion scripts",
        category: "core",
        hidden: false,
    },
    Builtin {
        name: "global",
        description: "Run commands against the user-wide configuration",
        category: "setup",
        hidden: false,
    },
    Builtin {
        name: "config",
        description: "Inspect and validate command configuration",
        category: "core",
        hidden: false,
    },
    Builtin {
        name: "context",
        description: "Show the detected project context",
        category: "core",
        hidden: false,
    },
    Builtin {
        name: "shell-test",
        description: "Run the test suite inside a shell",
        category: "testing",
        hidden: true,
    },
    Builtin {
        name: "docker-test",
        description: "Run the test suite inside docker",
        category: "testing",
        hidden: true,
    },
    Builtin {
        name: "container-test",
        description: "Run the test suite inside the app container",
        category: "testing",
        hidden: true,
    },
];

/// Definitions for every built-in, in protected-list order.
pub fn core_definitions() -> Vec<CommandDefinition> {
    BUILTINS
        .iter()
        .map(|b| {
            let mut def = CommandDefinition::new(b.name, "", Tier::Core)
                .with_description(b.description)
                .with_category(b.category);
            def.hidden = b.hidden;
            def
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_follow_protected_list_order() {
        let names: Vec<String> = core_definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, PROTECTED_COMMANDS);
    }

    #[test]
    fn builtins_are_core_tier_and_protected() {
        for def in core_definitions() {
            assert_eq!(def.tier, Tier::Core);
            assert!(def.template.is_empty());
            assert!(is_protected(&def.name));
        }
    }

    #[test]
    fn custom_names_are_not_protected() {
        for name in ["test", "up", "lint", "Help", "help2"] {
            assert!(!is_protected(name), "{name}");
        }
    }
}

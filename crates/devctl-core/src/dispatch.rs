//! Resolve a custom command, push it through the sanitizer, and run it.
//!
//! The registry, sanitizer, and shell runner are passed in explicitly;
//! nothing here reads process-wide state.

use crate::error::{DevctlError, Result};
use crate::exec::ShellRunner;
use crate::registry::{CommandKind, Registry};
use crate::sanitizer::Sanitizer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::IsTerminal;

/// A command that passed every validation stage and is ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedCommand {
    pub name: String,
    pub command: String,
    pub env: BTreeMap<String, String>,
    pub interactive: bool,
}

pub struct Dispatcher<'a> {
    registry: &'a Registry,
    sanitizer: &'a Sanitizer,
    runner: &'a dyn ShellRunner,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a Registry, sanitizer: &'a Sanitizer, runner: &'a dyn ShellRunner) -> Self {
        Self {
            registry,
            sanitizer,
            runner,
        }
    }

    /// Resolve `name` (alias-aware) and produce the final command string.
    pub fn prepare(&self, name: &str, args: &[String]) -> Result<PreparedCommand> {
        let command = self
            .registry
            .create(name)
            .ok_or_else(|| DevctlError::CommandNotFound(name.to_string()))?;
        let definition = match command.kind {
            CommandKind::Custom { definition } => definition,
            CommandKind::Builtin => return Err(DevctlError::BuiltinNotRunnable(command.name)),
        };

        let final_command = self.sanitizer.prepare(&definition.template, args)?;
        Ok(PreparedCommand {
            name: command.name,
            command: final_command,
            env: definition.env,
            interactive: definition.interactive,
        })
    }

    /// Run a prepared command. A non-zero exit is an `Execution` error.
    pub fn execute(&self, prepared: &PreparedCommand) -> Result<()> {
        if prepared.interactive && !std::io::stdin().is_terminal() {
            tracing::warn!(
                command = %prepared.name,
                "interactive command started without a terminal on stdin"
            );
        }
        let code = self.runner.run(&prepared.command, &prepared.env)?;
        if code != 0 {
            return Err(DevctlError::Execution {
                command: prepared.name.clone(),
                code,
            });
        }
        Ok(())
    }

    pub fn run(&self, name: &str, args: &[String]) -> Result<()> {
        let prepared = self.prepare(name, args)?;
        self.execute(&prepared)
    }
}

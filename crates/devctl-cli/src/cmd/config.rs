use crate::cmd::Session;
use crate::output::{print_fields, print_json, print_table};
use clap::Subcommand;
use devctl_core::config::{CommandsFile, ConfigWarning, WarnLevel};
use devctl_core::registry::{Command, CommandKind};
use devctl_core::sanitizer::{SanitizeMode, Sanitizer, SanitizerConfig};
use devctl_core::DevctlError;
use serde::Serialize;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// List every registered command
    List {
        /// Include hidden commands
        #[arg(long)]
        all: bool,
    },

    /// Show the resolved definition of one command (aliases accepted)
    Show {
        /// Command name or alias
        name: String,
    },

    /// Validate every config file for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(session: &Session, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::List { all } => list(session, all, json),
        ConfigSubcommand::Show { name } => show(session, &name, json),
        ConfigSubcommand::Validate => validate(session, json),
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(session: &Session, all: bool, json: bool) -> anyhow::Result<()> {
    let commands: Vec<Command> = session
        .registry
        .create_all()
        .into_iter()
        .filter(|c| all || !c.hidden)
        .collect();

    if json {
        return print_json(&commands);
    }

    let rows: Vec<Vec<String>> = commands
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                c.tier.to_string(),
                c.category.clone(),
                c.aliases.join(", "),
                c.description.clone(),
            ]
        })
        .collect();
    print_table(&["NAME", "TIER", "CATEGORY", "ALIASES", "DESCRIPTION"], &rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(session: &Session, name: &str, json: bool) -> anyhow::Result<()> {
    let command = session
        .registry
        .create(name)
        .ok_or_else(|| DevctlError::CommandNotFound(name.to_string()))?;

    if json {
        return print_json(&command);
    }

    let mut fields = vec![
        ("name", command.name.clone()),
        ("tier", command.tier.to_string()),
        ("category", command.category.clone()),
        ("description", command.description.clone()),
        ("aliases", command.aliases.join(", ")),
        ("hidden", command.hidden.to_string()),
    ];
    match &command.kind {
        CommandKind::Builtin => fields.push(("template", "(built-in)".to_string())),
        CommandKind::Custom { definition } => {
            fields.push(("template", definition.template.clone()));
            fields.push(("interactive", definition.interactive.to_string()));
            for (key, value) in &definition.env {
                fields.push(("env", format!("{key}={value}")));
            }
        }
    }
    print_fields(&fields);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct FileReport {
    path: PathBuf,
    warnings: Vec<ConfigWarning>,
}

#[derive(Serialize)]
struct TemplateFinding {
    command: String,
    message: String,
}

fn validate(session: &Session, json: bool) -> anyhow::Result<()> {
    let global = session.discovery.global_file();
    let mut files: Vec<PathBuf> = session.discovery.project_files();
    files.extend(session.discovery.plugin_sets().into_iter().map(|(_, p)| p));
    files.extend(global.clone());

    let mut reports = Vec::new();
    for path in files {
        // Parse failures are carried by the merge report
        let Ok(file) = CommandsFile::load(&path) else {
            continue;
        };
        let mut warnings = file.validate();
        if file.sanitizer.is_some() && global.as_ref() != Some(&path) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "sanitizer settings are only read from the global config file"
                    .to_string(),
            });
        }
        if !warnings.is_empty() {
            reports.push(FileReport { path, warnings });
        }
    }

    // Template findings as strict mode would see them, whatever the
    // environment selects.
    let strict = Sanitizer::new(SanitizerConfig {
        mode: SanitizeMode::Strict,
        ..session.sanitizer
    });
    let findings: Vec<TemplateFinding> = session
        .registry
        .create_all()
        .iter()
        .filter_map(|c| {
            let def = c.definition()?;
            let err = strict.validate_template(&def.template).err()?;
            Some(TemplateFinding {
                command: c.name.clone(),
                message: err.validation().map_or_else(
                    || err.to_string(),
                    |(_, category)| format!("template contains a {category}: {}", def.template),
                ),
            })
        })
        .collect();

    let errors = &session.report.errors;
    if json {
        let value = serde_json::json!({
            "files": reports,
            "load_errors": errors,
            "template_findings": findings,
        });
        print_json(&value)?;
    } else if reports.is_empty() && errors.is_empty() && findings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for report in &reports {
            println!("{}:", report.path.display());
            for w in &report.warnings {
                let prefix = match w.level {
                    WarnLevel::Warning => "warning",
                    WarnLevel::Error => "error",
                };
                println!("  [{prefix}] {}", w.message);
            }
        }
        for e in errors {
            println!("[error] {}", e.message);
        }
        for f in &findings {
            println!("[warning] {}: {}", f.command, f.message);
        }
    }

    let has_errors = !errors.is_empty()
        || reports
            .iter()
            .flat_map(|r| &r.warnings)
            .any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}

use crate::cmd::Session;
use crate::output::{print_json, print_table};
use clap::Subcommand;
use serde::Serialize;

#[derive(Subcommand)]
pub enum PluginsSubcommand {
    /// List installed plugin command sets and what they contribute
    List,
}

#[derive(Serialize)]
struct PluginEntry {
    name: String,
    path: String,
    /// Commands from this plugin that made it into the registry.
    commands: Vec<String>,
    /// Load failure, if the commands file did not parse.
    error: Option<String>,
}

pub fn run(session: &Session, subcmd: PluginsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PluginsSubcommand::List => list(session, json),
    }
}

fn list(session: &Session, json: bool) -> anyhow::Result<()> {
    let entries: Vec<PluginEntry> = session
        .discovery
        .plugin_sets()
        .into_iter()
        .map(|(name, path)| {
            let label = format!("plugin:{name}");
            let commands = session
                .report
                .registered_from(&label)
                .into_iter()
                .map(String::from)
                .collect();
            let error = session
                .report
                .errors
                .iter()
                .find(|e| e.source == label)
                .map(|e| e.message.clone());
            PluginEntry {
                name,
                path: path.display().to_string(),
                commands,
                error,
            }
        })
        .collect();

    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No plugins installed.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            let commands = match &e.error {
                Some(err) => format!("(failed to load: {err})"),
                None => e.commands.join(", "),
            };
            vec![e.name.clone(), commands, e.path.clone()]
        })
        .collect();
    print_table(&["PLUGIN", "COMMANDS", "PATH"], &rows);
    Ok(())
}

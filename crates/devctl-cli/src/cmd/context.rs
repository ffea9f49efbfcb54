use crate::cmd::Session;
use crate::output::{print_fields, print_json};
use devctl_core::catalog::{SkipReason, Skipped, SourceError};
use devctl_core::paths;
use devctl_core::sanitizer::SanitizerConfig;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct Context<'a> {
    cwd: &'a PathBuf,
    project_root: Option<PathBuf>,
    config_files: Vec<PathBuf>,
    plugins: Vec<String>,
    devctl_home: Option<&'a PathBuf>,
    global_config: Option<PathBuf>,
    sanitizer: &'a SanitizerConfig,
    docker: Option<PathBuf>,
    docker_compose: Option<PathBuf>,
    commands: usize,
    skipped: &'a [Skipped],
    load_errors: &'a [SourceError],
}

pub fn run(session: &Session, json: bool) -> anyhow::Result<()> {
    let discovery = &session.discovery;
    let ctx = Context {
        cwd: &discovery.cwd,
        project_root: paths::find_project_root(&discovery.cwd),
        config_files: discovery.project_files(),
        plugins: discovery.plugin_sets().into_iter().map(|(name, _)| name).collect(),
        devctl_home: discovery.home.as_ref(),
        global_config: discovery.global_file(),
        sanitizer: &session.sanitizer,
        docker: which::which("docker").ok(),
        docker_compose: which::which("docker-compose").ok(),
        commands: session.registry.len(),
        skipped: &session.report.skipped,
        load_errors: &session.report.errors,
    };

    if json {
        return print_json(&ctx);
    }

    let found = |p: &Option<PathBuf>| {
        p.as_ref()
            .map_or_else(|| "not found".to_string(), |p| p.display().to_string())
    };
    let list = |items: Vec<String>| {
        if items.is_empty() {
            "none".to_string()
        } else {
            items.join(", ")
        }
    };

    print_fields(&[
        ("Working dir", ctx.cwd.display().to_string()),
        ("Project root", found(&ctx.project_root)),
        (
            "Config files",
            list(ctx.config_files.iter().map(|p| p.display().to_string()).collect()),
        ),
        ("Plugins", list(ctx.plugins.clone())),
        ("devctl home", found(&ctx.devctl_home.cloned())),
        ("Global config", found(&ctx.global_config)),
        (
            "Sanitize mode",
            format!(
                "{} (pipes {}, redirects {})",
                ctx.sanitizer.mode,
                allowed(ctx.sanitizer.allow_pipes),
                allowed(ctx.sanitizer.allow_redirects),
            ),
        ),
        ("docker", found(&ctx.docker)),
        ("docker-compose", found(&ctx.docker_compose)),
        ("Commands", ctx.commands.to_string()),
    ]);

    for s in ctx.skipped {
        let why = match &s.reason {
            SkipReason::Protected => "built-in name".to_string(),
            SkipReason::Shadowed { by } => format!("shadowed by {by} tier"),
            SkipReason::AliasDropped { alias } => format!("alias '{alias}' dropped"),
        };
        println!("skipped: {} from {} ({why})", s.name, s.source);
    }
    for e in ctx.load_errors {
        println!("load error: {}", e.message);
    }
    Ok(())
}

fn allowed(flag: bool) -> &'static str {
    if flag {
        "allowed"
    } else {
        "blocked"
    }
}

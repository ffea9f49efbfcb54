use crate::cmd::Session;
use crate::output::print_json;
use anyhow::bail;
use devctl_core::dispatch::Dispatcher;
use devctl_core::exec::SystemShell;
use devctl_core::DevctlError;

/// Dispatch `argv[0]` as a custom command with the rest as its arguments.
pub fn run(session: &Session, argv: &[String], dry_run: bool, json: bool) -> anyhow::Result<()> {
    let Some((name, args)) = argv.split_first() else {
        bail!("no command given");
    };

    let sanitizer = session.sanitizer();
    let shell = SystemShell::in_dir(&session.discovery.cwd);
    let dispatcher = Dispatcher::new(&session.registry, &sanitizer, &shell);

    let prepared = match dispatcher.prepare(name, args) {
        Ok(p) => p,
        Err(DevctlError::CommandNotFound(name)) => bail!(
            "unknown command '{name}'\nRun 'devctl config list' to see available commands"
        ),
        Err(DevctlError::BuiltinNotRunnable(name)) => {
            bail!("built-in command '{name}' is not available in this build")
        }
        Err(e) => return Err(e.into()),
    };

    if dry_run {
        if json {
            print_json(&prepared)?;
        } else {
            println!("{}", prepared.command);
        }
        return Ok(());
    }

    dispatcher.execute(&prepared)?;
    Ok(())
}

#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// A project directory plus an isolated devctl home.
struct Sandbox {
    project: TempDir,
    home: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Sandbox {
            project: TempDir::new().unwrap(),
            home: TempDir::new().unwrap(),
        }
    }

    fn devctl(&self) -> Command {
        self.devctl_in(self.project.path())
    }

    fn devctl_in(&self, dir: &Path) -> Command {
        let mut cmd = Command::cargo_bin("devctl").unwrap();
        cmd.current_dir(dir)
            .env("DEVCTL_HOME", self.home.path())
            .env_remove("DEVCTL_SANITIZE_MODE")
            .env_remove("DEVCTL_CWD")
            .env_remove("RUST_LOG");
        cmd
    }

    fn project_file(&self, text: &str) {
        write(&self.project.path().join(".devctl.yml"), text);
    }

    fn global_file(&self, text: &str) {
        write(&self.home.path().join("config.yml"), text);
    }

    fn plugin(&self, name: &str, text: &str) {
        write(
            &self.home.path().join("plugins").join(name).join("commands.yml"),
            text,
        );
    }
}

fn write(path: &Path, text: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, text).unwrap();
}

// ---------------------------------------------------------------------------
// built-ins
// ---------------------------------------------------------------------------

#[test]
fn version_prints_package_version() {
    let sb = Sandbox::new();
    sb.devctl()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!("devctl ", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn config_list_shows_builtins_and_project_commands() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  up:\n    cmd: docker compose up -d\n    description: Start services\n    alias: u\n");

    sb.devctl()
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("version"))
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("Start services"))
        .stdout(predicate::str::contains("project"))
        // hidden built-ins only with --all
        .stdout(predicate::str::contains("docker-test").not());

    sb.devctl()
        .args(["config", "list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docker-test"));
}

#[test]
fn config_show_resolves_aliases() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  test:\n    cmd: go test $@\n    alias: t\n    env:\n      GOFLAGS: -count=1\n");

    let output = sb
        .devctl()
        .args(["config", "show", "t", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["name"], "test");
    assert_eq!(value["tier"], "project_local");
    assert_eq!(value["kind"], "custom");
    assert_eq!(value["definition"]["template"], "go test $@");
    assert_eq!(value["definition"]["env"]["GOFLAGS"], "-count=1");
}

#[test]
fn context_json_reports_discovery() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  up: docker compose up -d\n");
    sb.plugin("db", "commands:\n  migrate: echo migrating\n");

    let output = sb.devctl().args(["context", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["sanitizer"]["mode"], "strict");
    assert_eq!(value["plugins"][0], "db");
    assert_eq!(value["config_files"].as_array().unwrap().len(), 1);
    assert!(value["commands"].as_u64().unwrap() > 15);
}

#[test]
fn rust_log_raises_the_log_level() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  up: docker compose up -d\n");

    sb.devctl()
        .env("RUST_LOG", "debug")
        .args(["--dry-run", "up"])
        .assert()
        .success()
        .stderr(predicate::str::contains("DEBUG"))
        .stderr(predicate::str::contains("registered"));

    sb.devctl()
        .args(["--dry-run", "up"])
        .assert()
        .success()
        .stderr(predicate::str::contains("DEBUG").not());
}

// ---------------------------------------------------------------------------
// custom command dispatch
// ---------------------------------------------------------------------------

#[test]
fn custom_command_expands_and_runs() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  greet: echo hello $1\n");

    sb.devctl()
        .args(["greet", "world"])
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn alias_dispatches_to_command() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  greet:\n    cmd: echo hi\n    alias: g\n");

    sb.devctl().arg("g").assert().success().stdout("hi\n");
}

#[test]
fn variadic_placeholder_joins_arguments() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  say: echo $@\n");

    sb.devctl()
        .args(["--dry-run", "say", "a", "b", "c"])
        .assert()
        .success()
        .stdout("echo a b c\n");
}

#[test]
fn dry_run_prints_final_command_without_running() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  touch: touch $1\n");

    sb.devctl()
        .args(["--dry-run", "touch", "marker"])
        .assert()
        .success()
        .stdout("touch marker\n");
    assert!(!sb.project.path().join("marker").exists());
}

#[test]
fn env_overrides_reach_the_command() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  hola:\n    cmd: echo \"$GREETING\"\n    env:\n      GREETING: hola\n");

    sb.devctl().arg("hola").assert().success().stdout("hola\n");
}

#[test]
fn non_zero_exit_code_is_propagated() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  fail: exit 3\n");

    sb.devctl()
        .arg("fail")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("exited with status 3"));
}

#[test]
fn unknown_command_fails() {
    let sb = Sandbox::new();
    sb.devctl()
        .arg("nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown command 'nope'"));
}

#[test]
fn unbound_placeholder_fails_before_running() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  greet: echo hello $1\n");

    sb.devctl()
        .arg("greet")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unbound placeholder $1"));
}

#[test]
fn cwd_flag_selects_project() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  greet: echo from project\n");
    let elsewhere = TempDir::new().unwrap();

    sb.devctl_in(elsewhere.path())
        .arg("--cwd")
        .arg(sb.project.path())
        .arg("greet")
        .assert()
        .success()
        .stdout("from project\n");
}

// ---------------------------------------------------------------------------
// sanitizer
// ---------------------------------------------------------------------------

#[test]
fn argument_injection_is_rejected_with_bypass_hint() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  greet: echo hello $1\n");

    sb.devctl()
        .args(["greet", "x; touch pwned"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("arguments validation failed"))
        .stderr(predicate::str::contains("dangerous pattern"))
        .stderr(predicate::str::contains("DEVCTL_SANITIZE_MODE=disabled"));
    assert!(!sb.project.path().join("pwned").exists());
}

#[test]
fn command_substitution_in_argument_is_rejected() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  greet: echo hello $1\n");

    sb.devctl()
        .args(["greet", "$(whoami)"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("command substitution"));
}

#[test]
fn template_with_pipe_is_rejected_in_strict_mode() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  logs: docker compose logs | less\n");

    sb.devctl()
        .args(["--dry-run", "logs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("template validation failed"))
        .stderr(predicate::str::contains("pipe operator"));
}

#[test]
fn global_allow_pipes_exempts_templates_only() {
    let sb = Sandbox::new();
    sb.global_file("sanitizer:\n  allow_pipes: true\n");
    sb.project_file("commands:\n  count: echo $1 | wc -c\n");

    sb.devctl()
        .args(["--dry-run", "count", "abc"])
        .assert()
        .success()
        .stdout("echo abc | wc -c\n");

    sb.devctl()
        .args(["--dry-run", "count", "a|b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pipe operator"));
}

#[test]
fn disabled_mode_skips_checks_loudly() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  greet: echo hello $1\n");

    sb.devctl()
        .env("DEVCTL_SANITIZE_MODE", "disabled")
        .args(["--dry-run", "greet", "a;b"])
        .assert()
        .success()
        .stdout("echo hello a;b\n")
        .stderr(predicate::str::contains("sanitization is DISABLED"));
}

#[test]
fn warn_mode_logs_and_continues() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  greet: echo hello $1\n");

    sb.devctl()
        .env("DEVCTL_SANITIZE_MODE", "warn")
        .args(["--dry-run", "greet", "a && b"])
        .assert()
        .success()
        .stdout("echo hello a && b\n")
        .stderr(predicate::str::contains("allowed by warn mode"));
}

#[test]
fn script_mode_trusts_template_but_not_arguments() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  both: echo one && echo $1\n");

    sb.devctl()
        .env("DEVCTL_SANITIZE_MODE", "script")
        .args(["both", "two"])
        .assert()
        .success()
        .stdout("one\ntwo\n");

    sb.devctl()
        .env("DEVCTL_SANITIZE_MODE", "script")
        .args(["both", "two; id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("arguments validation failed"));
}

#[test]
fn unrecognized_mode_warns_and_stays_strict() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  greet: echo hello $1\n");

    sb.devctl()
        .env("DEVCTL_SANITIZE_MODE", "bogus")
        .args(["greet", "a;b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized DEVCTL_SANITIZE_MODE value 'bogus'"))
        .stderr(predicate::str::contains("dangerous pattern"));
}

// ---------------------------------------------------------------------------
// tiers and merging
// ---------------------------------------------------------------------------

#[test]
fn protected_names_cannot_be_overridden() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  version: echo hijacked\n  setup: echo hijacked\n");

    sb.devctl()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hijacked").not());

    sb.devctl()
        .arg("setup")
        .assert()
        .failure()
        .stdout(predicate::str::contains("hijacked").not())
        .stderr(predicate::str::contains("not available in this build"));
}

#[test]
fn nearest_project_file_wins() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  whoami: echo parent\n  up: echo parent up\n");
    let child = sb.project.path().join("services").join("api");
    write(&child.join(".devctl.yml"), "commands:\n  whoami: echo child\n");

    sb.devctl_in(&child).arg("whoami").assert().success().stdout("child\n");
    sb.devctl_in(&child).arg("up").assert().success().stdout("parent up\n");
}

#[test]
fn project_beats_plugin_beats_global() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  a: echo project\n");
    sb.plugin("tools", "commands:\n  a: echo plugin\n  b: echo plugin\n");
    sb.global_file("commands:\n  a: echo global\n  b: echo global\n  c: echo global\n");

    sb.devctl().arg("a").assert().success().stdout("project\n");
    sb.devctl().arg("b").assert().success().stdout("plugin\n");
    sb.devctl().arg("c").assert().success().stdout("global\n");
}

#[test]
fn plugins_list_shows_contributed_commands() {
    let sb = Sandbox::new();
    sb.plugin("db", "commands:\n  migrate: echo migrating\n");

    sb.devctl()
        .args(["plugins", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("db"))
        .stdout(predicate::str::contains("migrate"));

    sb.devctl().arg("migrate").assert().success().stdout("migrating\n");
}

#[test]
fn malformed_file_is_tolerated_but_fails_validation() {
    let sb = Sandbox::new();
    write(&sb.project.path().join(".devctl.yaml"), "commands: [not, a, map\n");
    sb.project_file("commands:\n  greet: echo still works\n");

    sb.devctl().arg("greet").assert().success().stdout("still works\n");

    sb.devctl()
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("failed to parse"))
        .stderr(predicate::str::contains("config validation found errors"));
}

#[test]
fn config_validate_passes_clean_project() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  up: docker compose up -d\n");

    sb.devctl()
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_reports_risky_templates() {
    let sb = Sandbox::new();
    sb.project_file("commands:\n  logs: docker compose logs | less\n  help: echo nope\n");

    sb.devctl()
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("logs: template contains a pipe operator"))
        .stdout(predicate::str::contains("shadows a built-in command"));
}

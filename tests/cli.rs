//! CLI tests through the compiled binary

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::{create_project, read_or_empty, touch, LAYERED_PROJECT, LAYERED_TARGETS};

fn polyrun() -> Command {
    let mut cmd = Command::cargo_bin("polyrun").unwrap();
    cmd.env_remove("POLYRUN_LOG");
    cmd
}

#[test]
fn test_help() {
    polyrun()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("toolchains"));
}

#[test]
fn test_list_plain() {
    let (_dir, root) = create_project(LAYERED_PROJECT, LAYERED_TARGETS);

    polyrun()
        .current_dir(&root)
        .args(["list", "-f", "plain"])
        .assert()
        .success()
        .stdout("app\ndocs\nlib\nproto\n");
}

#[test]
fn test_list_json() {
    let (_dir, root) = create_project(LAYERED_PROJECT, LAYERED_TARGETS);

    let output = polyrun()
        .current_dir(&root)
        .args(["list", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["project"], "layered");
    assert_eq!(json["version"], "0.9.0");
    assert_eq!(json["targets"].as_array().unwrap().len(), 4);
    assert_eq!(json["targets"][0]["name"], "app");
    assert_eq!(json["targets"][0]["depends_on"][0], "lib");
}

#[test]
fn test_order() {
    let (_dir, root) = create_project(LAYERED_PROJECT, LAYERED_TARGETS);

    polyrun()
        .current_dir(&root)
        .arg("order")
        .assert()
        .success()
        .stdout("proto\nlib\napp\ndocs\n");

    polyrun()
        .current_dir(&root)
        .args(["order", "-t", "app"])
        .assert()
        .success()
        .stdout("proto\nlib\napp\n");
}

#[test]
fn test_order_unknown_target() {
    let (_dir, root) = create_project(LAYERED_PROJECT, LAYERED_TARGETS);

    polyrun()
        .current_dir(&root)
        .args(["order", "-t", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown target 'nope'"));
}

#[test]
fn test_config_flag_from_elsewhere() {
    let (_dir, root) = create_project(LAYERED_PROJECT, LAYERED_TARGETS);
    let elsewhere = tempfile::TempDir::new().unwrap();

    polyrun()
        .current_dir(elsewhere.path())
        .arg("-c")
        .arg(root.join("polyrun.toml"))
        .args(["list", "-f", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("proto"));
}

#[cfg(unix)]
#[test]
fn test_run_warns_on_skip_and_succeeds() {
    let (_dir, root) = create_project(LAYERED_PROJECT, LAYERED_TARGETS);

    polyrun()
        .current_dir(&root)
        .args(["run", "test"])
        .assert()
        .success()
        .stderr(predicate::str::contains("skipped test"))
        .stderr(predicate::str::contains("explicitly disabled"));

    let log = read_or_empty(&root.join("log.txt"));
    assert_eq!(log, "proto:test\nlib:test\napp:test\n");
}

#[cfg(unix)]
#[test]
fn test_run_selected_target_with_dependencies() {
    let (_dir, root) = create_project(LAYERED_PROJECT, LAYERED_TARGETS);

    polyrun()
        .current_dir(&root)
        .args(["run", "build", "-t", "lib"])
        .assert()
        .success();

    let log = read_or_empty(&root.join("log.txt"));
    assert_eq!(log, "proto:build\nlib:build\n");
}

#[cfg(unix)]
#[test]
fn test_run_passes_over_dependency_without_command() {
    let (_dir, root) = create_project(
        r#"
        [defaults]
        auto_detect = false

        [targets.proto.commands]
        gen = "touch generated.txt"

        [targets.app]
        depends_on = ["proto"]
        [targets.app.commands]
        build = "touch built.txt"
        "#,
        &["proto", "app"],
    );

    polyrun()
        .current_dir(&root)
        .args(["run", "build", "-t", "app"])
        .assert()
        .success();

    assert!(root.join("app/built.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_run_selected_target_without_command_fails() {
    let (_dir, root) = create_project(
        r#"
        [defaults]
        auto_detect = false

        [targets.proto.commands]
        gen = "touch generated.txt"
        "#,
        &["proto"],
    );

    polyrun()
        .current_dir(&root)
        .args(["run", "build", "-t", "proto"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not defined for target 'proto'"));
}

#[cfg(unix)]
#[test]
fn test_run_zero_timeout_disables_default() {
    let (_dir, root) = create_project(
        r#"
        [defaults]
        auto_detect = false
        timeout = 1

        [targets.a.commands]
        slow = "sleep 2 && touch slept.txt"
        "#,
        &["a"],
    );

    polyrun()
        .current_dir(&root)
        .args(["run", "slow"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timed out after 1s"));

    polyrun()
        .current_dir(&root)
        .args(["run", "slow", "--timeout", "0"])
        .assert()
        .success();

    assert!(root.join("a/slept.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_run_failure_stops() {
    let (_dir, root) = create_project(
        r#"
        [defaults]
        auto_detect = false

        [targets.a.commands]
        build = "exit 4"

        [targets.b]
        depends_on = ["a"]
        [targets.b.commands]
        build = "touch built.txt"
        "#,
        &["a", "b"],
    );

    polyrun()
        .current_dir(&root)
        .args(["run", "build"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exit code 4"));

    assert!(!root.join("b/built.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_run_env_and_args() {
    let (_dir, root) = create_project(
        r#"
        [defaults]
        auto_detect = false

        [targets.a.commands]
        show = "echo \"$GREETING\""
        "#,
        &["a"],
    );

    polyrun()
        .current_dir(&root)
        .args(["run", "show", "-e", "GREETING=hi", "--", "there"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hi there"));
}

#[test]
fn test_missing_config() {
    let dir = tempfile::TempDir::new().unwrap();

    polyrun()
        .current_dir(dir.path())
        .arg("-c")
        .arg(dir.path().join("polyrun.toml"))
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_detect_plain() {
    let dir = tempfile::TempDir::new().unwrap();
    touch(&dir.path().join("package.json"));
    touch(&dir.path().join("pnpm-lock.yaml"));

    polyrun()
        .args(["detect", "-f", "plain"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout("pnpm\n");
}

#[test]
fn test_toolchains_show_builtin() {
    let dir = tempfile::TempDir::new().unwrap();

    polyrun()
        .current_dir(dir.path())
        .args(["toolchains", "cargo", "-f", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("ci"));
}

#[test]
fn test_toolchains_unknown() {
    let dir = tempfile::TempDir::new().unwrap();

    polyrun()
        .current_dir(dir.path())
        .args(["toolchains", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown toolchain 'nope'"));
}

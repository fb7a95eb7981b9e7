#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use filetime::{set_file_mtime, FileTime};
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

struct Sandbox {
    home: TempDir,
    src: TempDir,
    mounts: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: TempDir::new().expect("home"),
            src: TempDir::new().expect("src"),
            mounts: TempDir::new().expect("mounts"),
        }
    }

    fn source(&self, name: &str) -> PathBuf {
        let path = self.src.path().join(name);
        fs::write(&path, format!("content of {name}")).expect("write source");
        set_file_mtime(&path, FileTime::from_unix_time(1_700_000_000, 0)).expect("mtime");
        path
    }

    fn pattern(&self, glob: &str) -> String {
        self.src.path().join(glob).to_string_lossy().into_owned()
    }

    fn remote(&self, host: &str, name: &str) -> PathBuf {
        let relative = self.src.path().strip_prefix("/").expect("absolute");
        self.mounts.path().join(host).join(relative).join(name)
    }

    fn log(&self) -> PathBuf {
        self.home.path().join("logs").join("fanout.log")
    }

    /// `fanout push` with the net-mount layout rooted in the sandbox.
    fn push(&self, pattern: &str, hosts: &str) -> Command {
        let mut cmd = fanout_cmd(self.home.path());
        cmd.arg("push")
            .arg(self.pattern(pattern))
            .args(["--to", hosts])
            .args(["--local-host", "BUILD01"])
            .args(["--layout", "net-mount"])
            .arg("--mount-root")
            .arg(self.mounts.path());
        cmd
    }
}

fn fanout_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fanout"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn place_newer(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
    set_file_mtime(path, FileTime::from_unix_time(1_800_000_000, 0)).unwrap();
}

#[test]
fn push_copies_to_every_target_except_local_host() {
    let sb = Sandbox::new();
    sb.source("a.cmd");
    sb.source("b.cmd");

    sb.push("*.cmd", "web02,build01,web01")
        .arg("--log-file")
        .arg(sb.log())
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(contains("Files (2) | Targets (2): web01, web02"))
        .stdout(contains("[Y/N]"))
        .stdout(contains("4 copied, 0 failed"));

    for host in ["web01", "web02"] {
        for name in ["a.cmd", "b.cmd"] {
            let copied = fs::read_to_string(sb.remote(host, name)).expect("copied");
            assert_eq!(copied, format!("content of {name}"));
        }
    }
    assert!(!sb.mounts.path().join("build01").exists());

    let log = fs::read_to_string(sb.log()).expect("audit log");
    let lines: Vec<_> = log.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|l| l.contains(";Success;") && l.ends_with(";;")));
}

#[test]
fn no_matching_files_fails_before_any_prompt() {
    let sb = Sandbox::new();

    sb.push("*.nothing", "web01")
        .assert()
        .failure()
        .stdout(contains("[Y/N]").not())
        .stderr(contains("no source files found"));

    assert!(fs::read_dir(sb.mounts.path()).unwrap().next().is_none());
}

#[test]
fn only_local_host_as_target_is_an_error() {
    let sb = Sandbox::new();
    sb.source("run.cmd");

    sb.push("run.cmd", "build01")
        .assert()
        .failure()
        .stderr(contains("no targets in scope"));
}

#[test]
fn declining_overwrite_keeps_newer_remote_copy() {
    let sb = Sandbox::new();
    sb.source("app.config");
    let newer = sb.remote("web01", "app.config");
    place_newer(&newer, "hotfix");

    sb.push("app.config", "web01,web02")
        .arg("--log-file")
        .arg(sb.log())
        .write_stdin("y\nn\n")
        .assert()
        .failure()
        .stdout(contains("is newer than app.config"))
        .stdout(contains("Overwrite newer files"))
        .stderr(contains("declined"));

    assert_eq!(fs::read_to_string(&newer).unwrap(), "hotfix");
    assert!(!sb.remote("web02", "app.config").exists());
    assert!(!sb.log().exists());
}

#[test]
fn unrecognised_answers_are_asked_again() {
    let sb = Sandbox::new();
    sb.source("run.cmd");

    sb.push("run.cmd", "web01")
        .write_stdin("maybe\nyes\nY\n")
        .assert()
        .success();

    assert!(sb.remote("web01", "run.cmd").exists());
}

#[test]
fn closed_stdin_aborts_without_copying() {
    let sb = Sandbox::new();
    sb.source("run.cmd");

    sb.push("run.cmd", "web01")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(contains("operator prompt failed"));

    assert!(!sb.remote("web01", "run.cmd").exists());
}

#[test]
fn dry_run_writes_nothing() {
    let sb = Sandbox::new();
    sb.source("run.cmd");
    let newer = sb.remote("web02", "run.cmd");
    place_newer(&newer, "remote");

    sb.push("run.cmd", "web01,web02")
        .arg("--dry-run")
        .arg("--log-file")
        .arg(sb.log())
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("Files (1) | Targets (2)"))
        .stdout(contains("is newer than run.cmd"))
        .stdout(contains("[Y/N]").not());

    assert!(!sb.mounts.path().join("web01").exists());
    assert_eq!(fs::read_to_string(&newer).unwrap(), "remote");
    assert!(!sb.log().exists());
}

#[test]
fn uncreatable_destination_is_reported_and_other_targets_succeed() {
    let sb = Sandbox::new();
    sb.source("a.cmd");
    sb.source("b.cmd");
    fs::write(sb.mounts.path().join("web02"), "not a directory").unwrap();

    sb.push("*.cmd", "web01,web02")
        .arg("--yes")
        .arg("--log-file")
        .arg(sb.log())
        .assert()
        .failure()
        .stdout(contains("web02: destination not found"))
        .stdout(contains("2 copied, 0 failed, 2 destination(s) missing"));

    assert!(sb.remote("web01", "a.cmd").exists());
    assert!(sb.remote("web01", "b.cmd").exists());
    let log = fs::read_to_string(sb.log()).unwrap();
    assert_eq!(log.lines().count(), 2);
    assert!(!log.contains("web02"));
}

#[test]
fn second_push_raises_no_conflicts() {
    let sb = Sandbox::new();
    sb.source("run.cmd");

    sb.push("run.cmd", "web01").arg("--yes").assert().success();
    sb.push("run.cmd", "web01")
        .arg("--yes")
        .assert()
        .success()
        .stdout(contains("is newer than").not())
        .stdout(contains("1 copied"));
}

#[test]
fn config_supplies_hosts_layout_and_log() {
    let sb = Sandbox::new();
    sb.source("run.cmd");
    let config_dir = sb.home.path().join(".fanout");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.yaml"),
        format!(
            "hosts: [web01, build01]\nlocal_host: build01\nlayout: net-mount\nmount_root: {}\nlog_file: {}\n",
            sb.mounts.path().display(),
            sb.log().display()
        ),
    )
    .unwrap();

    fanout_cmd(sb.home.path())
        .arg("push")
        .arg(sb.pattern("run.cmd"))
        .arg("--yes")
        .assert()
        .success()
        .stdout(contains("Targets (1): web01"));

    assert!(sb.remote("web01", "run.cmd").exists());
    assert_eq!(fs::read_to_string(sb.log()).unwrap().lines().count(), 1);
}

#[test]
fn admin_share_layout_is_refused_off_windows() {
    let sb = Sandbox::new();
    sb.source("run.cmd");

    fanout_cmd(sb.home.path())
        .arg("push")
        .arg(sb.pattern("run.cmd"))
        .args(["--to", "web01", "--local-host", "build01", "--layout", "admin-share"])
        .assert()
        .failure()
        .stderr(contains("admin-share layout is not supported"));
}

#[test]
fn input_closing_mid_run_still_logs_finished_copies() {
    let sb = Sandbox::new();
    sb.source("a.cmd");
    sb.source("b.cmd");
    let newer = sb.remote("web01", "b.cmd");
    place_newer(&newer, "hotfix");

    sb.push("*.cmd", "web01")
        .arg("--log-file")
        .arg(sb.log())
        .write_stdin("Y\n")
        .assert()
        .failure()
        .stderr(contains("run aborted"))
        .stderr(contains("operator prompt failed"));

    assert!(sb.remote("web01", "a.cmd").exists());
    assert_eq!(fs::read_to_string(&newer).unwrap(), "hotfix");
    let log = fs::read_to_string(sb.log()).expect("audit log written");
    let lines: Vec<_> = log.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("a.cmd;"));
    assert!(lines[0].contains(";Success;"));
}

#[test]
fn malformed_target_name_is_rejected_before_prompting() {
    let sb = Sandbox::new();
    sb.source("run.cmd");

    sb.push("run.cmd", "web01,web/02")
        .assert()
        .failure()
        .stdout(contains("[Y/N]").not())
        .stderr(contains("invalid target host name 'web/02'"));

    assert!(!sb.mounts.path().join("web01").exists());
}

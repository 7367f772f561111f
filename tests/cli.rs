use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn mcdtask(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mcdtask").expect("binary built");
    cmd.arg("--data-dir").arg(dir.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn add_then_list_and_detail() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;

    mcdtask(&dir)
        .args(["add", "tower.floor1", "glass", "walls"])
        .assert()
        .success()
        .stdout(contains("Added task tower.floor1"));

    mcdtask(&dir)
        .args(["list", "tower"])
        .assert()
        .success()
        .stdout(contains("tower.floor1").and(contains("glass walls")));

    mcdtask(&dir)
        .args(["detail", "tower"])
        .assert()
        .success()
        .stdout(contains("Task:         tower").and(contains("floor1")));

    assert!(dir.path().join("mc_task.json").exists());
    assert!(dir.path().join("responsible.json").exists());
    assert!(dir.path().join("config.json").exists());
    Ok(())
}

#[test]
fn detail_without_path_shows_the_whole_tree() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    mcdtask(&dir).args(["add", "tower.floor1"]).assert().success();
    mcdtask(&dir).args(["add", "farm"]).assert().success();

    mcdtask(&dir)
        .args(["detail"])
        .assert()
        .success()
        .stdout(
            contains("All tasks:")
                .and(contains("farm"))
                .and(contains("tower"))
                .and(contains("floor1")),
        );
    Ok(())
}

#[test]
fn adding_an_existing_task_fails_with_user_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    mcdtask(&dir).args(["add", "tower"]).assert().success();

    mcdtask(&dir)
        .args(["add", "tower"])
        .assert()
        .code(2)
        .stderr(contains("already exists"));
    Ok(())
}

#[test]
fn missing_task_reports_nearest_ancestor() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    mcdtask(&dir).args(["add", "tower"]).assert().success();

    mcdtask(&dir)
        .args(["del", "tower.floor1"])
        .assert()
        .code(2)
        .stderr(contains("tower has no sub-task named floor1"));
    Ok(())
}

#[test]
fn responsibility_follows_renames() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    mcdtask(&dir).args(["add", "tower.floor1"]).assert().success();
    mcdtask(&dir)
        .args(["responsible", "tower.floor1", "Steve", "Alex"])
        .assert()
        .success()
        .stdout(contains("Added 2 responsible player(s)"));

    mcdtask(&dir)
        .args(["rename", "tower", "castle"])
        .assert()
        .success();

    mcdtask(&dir)
        .args(["player", "Steve"])
        .assert()
        .success()
        .stdout(contains("castle.floor1"));

    let responsible = fs::read_to_string(dir.path().join("responsible.json"))?;
    assert!(responsible.contains("castle.floor1"));
    assert!(!responsible.contains("tower"));
    Ok(())
}

#[test]
fn unresponsible_defaults_to_the_caller() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    mcdtask(&dir).args(["add", "farm"]).assert().success();
    mcdtask(&dir)
        .args(["--as", "Steve", "res", "farm"])
        .assert()
        .success();

    mcdtask(&dir)
        .args(["--as", "Steve", "unres", "farm"])
        .assert()
        .success()
        .stdout(contains("Removed 1 responsible player(s)"));
    Ok(())
}

#[test]
fn permission_table_is_enforced() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    mcdtask(&dir).args(["add", "farm"]).assert().success();

    mcdtask(&dir)
        .args(["--level", "0", "del", "farm"])
        .assert()
        .code(2)
        .stderr(contains("Permission denied"));

    mcdtask(&dir)
        .args(["--level", "0", "list", "--show", "all"])
        .assert()
        .success()
        .stdout(contains("farm"));
    Ok(())
}

#[test]
fn server_line_moves_a_renamed_players_tasks() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    mcdtask(&dir).args(["add", "farm"]).assert().success();
    mcdtask(&dir).args(["res", "farm", "Alex"]).assert().success();

    mcdtask(&dir)
        .args(["server-line", "Steve (formerly known as Alex) joined the game"])
        .assert()
        .success()
        .stdout(contains("Moved responsibilities of Alex to Steve"));

    mcdtask(&dir)
        .args(["player", "Steve"])
        .assert()
        .success()
        .stdout(contains("farm"));
    Ok(())
}

#[test]
fn malformed_data_exits_with_persistence_code() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("mc_task.json"), "not json")?;

    mcdtask(&dir)
        .args(["list"])
        .assert()
        .code(1)
        .stderr(contains("Malformed data file"));
    Ok(())
}

use std::fs;

use mcd_task::context::TaskContext;
use mcd_task::data_folder::DataFolder;
use mcd_task::error::Error;
use mcd_task::path::PathKey;
use mcd_task::tree::TaskTree;
use serde_json::Value;
use tempfile::TempDir;

fn p(s: &str) -> PathKey {
    PathKey::parse(s)
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn fresh_folder_gets_all_three_files() {
    let dir = TempDir::new().unwrap();
    let folder = DataFolder::new(dir.path().join("task"));
    let ctx = TaskContext::open(folder.clone()).unwrap();

    let tasks = read_json(&folder.task_file());
    assert_eq!(tasks["title"], "TaskManager");
    assert_eq!(tasks["done"], false);
    assert_eq!(tasks["priority"], Value::Null);
    assert_eq!(tasks["sub_tasks"], Value::Array(vec![]));

    assert_eq!(read_json(&folder.responsible_file()), serde_json::json!({}));

    let config = read_json(&folder.config_file());
    assert_eq!(config["overview_maximum_task_amount"], 10);
    assert_eq!(ctx.config.permission_of("responsible"), 2);
}

#[test]
fn task_file_is_nested_records() {
    let dir = TempDir::new().unwrap();
    let folder = DataFolder::new(dir.path());
    let mut ctx = TaskContext::open(folder.clone()).unwrap();
    ctx.tree.add_task(&p("tower.floor1"), "glass walls").unwrap();
    ctx.tree.set_priority(&p("tower.floor1"), Some(5)).unwrap();

    let tasks = read_json(&folder.task_file());
    let tower = &tasks["sub_tasks"][0];
    assert_eq!(tower["title"], "tower");
    let floor = &tower["sub_tasks"][0];
    assert_eq!(floor["title"], "floor1");
    assert_eq!(floor["description"], "glass walls");
    assert_eq!(floor["priority"], 5);
    assert_eq!(floor["permission"], 0);
    assert_eq!(floor["sub_tasks"], Value::Array(vec![]));
}

#[test]
fn responsible_file_is_a_flat_player_map() {
    let dir = TempDir::new().unwrap();
    let folder = DataFolder::new(dir.path());
    let mut ctx = TaskContext::open(folder.clone()).unwrap();
    ctx.tree.add_task(&p("tower.floor1"), "").unwrap();
    ctx.tree.add_task(&p("farm"), "").unwrap();
    ctx.tree.set_responsible(&p("tower.floor1"), &["Steve", "Alex"]).unwrap();
    ctx.tree.set_responsible(&p("farm"), &["Steve"]).unwrap();

    assert_eq!(
        read_json(&folder.responsible_file()),
        serde_json::json!({
            "Alex": ["tower.floor1"],
            "Steve": ["farm", "tower.floor1"],
        })
    );
}

#[test]
fn hand_written_files_are_loaded() {
    let dir = TempDir::new().unwrap();
    let task_file = dir.path().join("mc_task.json");
    let responsible_file = dir.path().join("responsible.json");
    fs::write(
        &task_file,
        r#"{"title": "TaskManager", "sub_tasks": [
            {"title": "tower", "done": true, "deadline": 1700000000.5,
             "sub_tasks": [{"title": "floor1", "desc": "glass"}]}
        ]}"#,
    )
    .unwrap();
    fs::write(&responsible_file, r#"{"Steve": ["tower.floor1"]}"#).unwrap();

    let tree = TaskTree::load(&task_file, &responsible_file).unwrap();
    let tower = tree.get(&p("tower")).unwrap();
    assert!(tower.done);
    assert_eq!(tower.deadline, 1_700_000_000.5);
    assert_eq!(tree.get(&p("tower.floor1")).unwrap().description, "glass");
    assert!(tree.responsibles_of(&p("tower.floor1")).contains("Steve"));
}

#[test]
fn malformed_task_file_is_reported_and_kept() {
    let dir = TempDir::new().unwrap();
    let task_file = dir.path().join("mc_task.json");
    fs::write(&task_file, "{\"title\": ").unwrap();

    let err = TaskTree::load(&task_file, dir.path().join("responsible.json")).unwrap_err();
    assert!(matches!(err, Error::Malformed { .. }));
    assert!(!err.is_user_error());
    assert_eq!(fs::read_to_string(&task_file).unwrap(), "{\"title\": ");
}

#[test]
fn batch_writes_once_with_everything() {
    let dir = TempDir::new().unwrap();
    let task_file = dir.path().join("mc_task.json");
    let mut tree = TaskTree::load(&task_file, dir.path().join("responsible.json")).unwrap();

    tree.batch(|t| {
        t.add_task(&p("a"), "")?;
        t.add_task(&p("b"), "")?;
        // nothing written until the batch ends
        let on_disk = fs::read_to_string(&task_file).unwrap();
        assert!(!on_disk.contains("\"a\""));
        Ok(())
    })
    .unwrap();

    let reloaded = TaskTree::load(&task_file, dir.path().join("responsible.json")).unwrap();
    assert!(reloaded.exists(&p("a")));
    assert!(reloaded.exists(&p("b")));
}

#[test]
fn failed_mutation_leaves_files_unchanged() {
    let dir = TempDir::new().unwrap();
    let task_file = dir.path().join("mc_task.json");
    let mut tree = TaskTree::load(&task_file, dir.path().join("responsible.json")).unwrap();
    tree.add_task(&p("tower"), "").unwrap();
    let before = fs::read_to_string(&task_file).unwrap();

    assert!(tree.set_priority(&p("tower.nope"), Some(1)).is_err());
    assert!(tree.set_permission(&p("tower"), 9).is_err());
    assert_eq!(fs::read_to_string(&task_file).unwrap(), before);
}

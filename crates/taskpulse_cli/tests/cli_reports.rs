use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_taskpulse"))
        .args(args)
        .env("TASKPULSE_DATA_DIR", data_dir)
        .env("TASKPULSE_CONFIG_PATH", data_dir.join("missing-config.json"))
        .env("TASKPULSE_DISABLE_NOTIFICATIONS", "1")
        .env("RUST_LOG", "off")
        .env_remove("OPENAI_API_KEY")
        .output()
        .expect("failed to run taskpulse")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn write_tasks(data_dir: &Path, tasks: serde_json::Value) -> std::path::PathBuf {
    let path = data_dir.join("import.json");
    std::fs::write(&path, serde_json::to_string_pretty(&tasks).unwrap()).unwrap();
    path
}

fn sample_tasks() -> serde_json::Value {
    serde_json::json!([
        {
            "id": "task-1",
            "name": "Release",
            "assignees": ["ana@example.com"],
            "priority": "High",
            "status": "In Progress",
            "createdAt": "2020-01-01T00:00:00Z",
            "dueDate": "2020-01-31T00:00:00Z"
        },
        {
            "id": "task-2",
            "name": "Docs",
            "assignees": ["ana@example.com"],
            "priority": "Low",
            "status": "Done",
            "createdAt": "2020-01-01T00:00:00Z",
            "date": "2020-01-08T00:00:00Z"
        },
        {
            "id": "task-3",
            "name": "Build",
            "parentId": "task-1",
            "assignees": ["ana@example.com"],
            "priority": "Medium",
            "status": "Todo"
        }
    ])
}

#[test]
fn import_then_export_keeps_every_task() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path(), sample_tasks());

    let imported = stdout_json(&run(
        dir.path(),
        &["import", file.to_str().unwrap(), "--json"],
    ));
    assert_eq!(imported["count"], 3);

    let exported = stdout_json(&run(dir.path(), &["export"]));
    let ids: Vec<&str> = exported
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["task-1", "task-2", "task-3"]);
}

#[test]
fn import_rejects_non_array_payload() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path(), serde_json::json!({ "tasks": [] }));

    let output = run(dir.path(), &["import", file.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: invalid_input"));
}

#[test]
fn burndown_after_due_date_has_zero_ideal() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path(), sample_tasks());
    stdout_json(&run(dir.path(), &["import", file.to_str().unwrap(), "--json"]));

    let estimate = stdout_json(&run(dir.path(), &["burndown", "--json"]));

    assert_eq!(estimate["actual"], 1);
    assert_eq!(estimate["ideal"], 0);
}

#[test]
fn burndown_record_appends_history_once_per_day() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path(), sample_tasks());
    stdout_json(&run(dir.path(), &["import", file.to_str().unwrap(), "--json"]));

    stdout_json(&run(dir.path(), &["burndown", "--record", "--json"]));
    stdout_json(&run(dir.path(), &["burndown", "--record", "--json"]));

    let raw = std::fs::read_to_string(dir.path().join("burndown.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let history = stored["items"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["actual"], 1);
}

#[test]
fn stats_reports_progress_and_lead_time() {
    let dir = TempDir::new().unwrap();
    let file = write_tasks(dir.path(), sample_tasks());
    stdout_json(&run(dir.path(), &["import", file.to_str().unwrap(), "--json"]));

    let stats = stdout_json(&run(dir.path(), &["stats", "--json"]));

    assert_eq!(stats["activeMainTasks"], 1);
    assert_eq!(stats["inProgressTasks"], 1);
    assert_eq!(stats["teamSize"], 0);
    // task-1 has one open child (0) and task-2 is done (100).
    assert_eq!(stats["overallProgress"], 50);
    // 2020-01-01 is a Wednesday; five weekdays until the 8th.
    assert_eq!(stats["averageLeadTimeDays"], 5.0);
}

#[test]
fn advisor_commands_fail_cleanly_without_api_key() {
    let dir = TempDir::new().unwrap();

    for args in [
        vec!["summary"],
        vec!["notify"],
        vec!["suggest-description", "Migrate billing"],
    ] {
        let output = run(dir.path(), &args);
        assert!(!output.status.success(), "{args:?} should fail");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("ERROR: advisor_error"), "stderr: {stderr}");
    }
}

#[test]
fn unknown_config_override_is_rejected() {
    let dir = TempDir::new().unwrap();

    let output = run(
        dir.path(),
        &["--config-override", "theme=dark", "task", "list"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown config field"));
}

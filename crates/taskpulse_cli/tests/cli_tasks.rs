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

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = args.to_vec();
    full.push("--json");
    let output = run(data_dir, &full);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn stored_tasks(data_dir: &Path) -> Vec<serde_json::Value> {
    let raw = std::fs::read_to_string(data_dir.join("tasks.json")).unwrap();
    let envelope: serde_json::Value = serde_json::from_str(&raw).unwrap();
    envelope["items"].as_array().cloned().unwrap_or_default()
}

#[test]
fn add_creates_task_with_generated_id() {
    let dir = TempDir::new().unwrap();

    let task = run_json(
        dir.path(),
        &[
            "task",
            "add",
            "Write docs",
            "--assignee",
            "ana@example.com",
            "--priority",
            "high",
            "--due",
            "2030-01-15",
        ],
    );

    assert!(task["id"].as_str().unwrap().starts_with("task-"));
    assert_eq!(task["priority"], "High");
    assert_eq!(task["status"], "Todo");
    assert_eq!(task["dueDate"], "2030-01-15T00:00:00Z");
    assert!(task["createdAt"].is_string());
    assert_eq!(stored_tasks(dir.path()).len(), 1);
}

#[test]
fn add_done_task_stamps_completion_date() {
    let dir = TempDir::new().unwrap();

    let task = run_json(
        dir.path(),
        &[
            "task",
            "add",
            "Already shipped",
            "--assignee",
            "ana@example.com",
            "--status",
            "done",
        ],
    );

    assert!(task["date"].is_string());
}

#[test]
fn add_without_assignee_is_rejected() {
    let dir = TempDir::new().unwrap();

    let output = run(dir.path(), &["task", "add", "Orphan"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"), "stderr: {stderr}");
}

#[test]
fn finishing_last_subtask_promotes_parent() {
    let dir = TempDir::new().unwrap();
    let base = ["--assignee", "ana@example.com"];

    let mut args = vec!["task", "add", "Release", "--id", "task-1"];
    args.extend(base);
    run_json(dir.path(), &args);
    let mut args = vec!["task", "add", "Build", "--id", "task-2", "--parent", "task-1"];
    args.extend(base);
    run_json(dir.path(), &args);

    let updated = run_json(dir.path(), &["task", "update", "task-2", "--status", "Done"]);
    assert_eq!(updated["status"], "Done");

    let parent = run_json(dir.path(), &["task", "show", "task-1"]);
    assert_eq!(parent["status"], "Done");
    assert!(parent["date"].is_string());

    let progress = run_json(dir.path(), &["task", "progress"]);
    let entries = progress.as_array().unwrap();
    assert!(entries.iter().all(|entry| entry["progress"] == 100));
}

#[test]
fn strict_completion_override_rejects_done_with_open_subtasks() {
    let dir = TempDir::new().unwrap();
    run_json(
        dir.path(),
        &["task", "add", "Release", "--id", "task-1", "--assignee", "a@b.io"],
    );
    run_json(
        dir.path(),
        &[
            "task", "add", "Build", "--id", "task-2", "--parent", "task-1", "--assignee", "a@b.io",
        ],
    );

    let output = run(
        dir.path(),
        &[
            "--config-override",
            "strict-completion=true",
            "task",
            "update",
            "task-1",
            "--status",
            "done",
        ],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"), "stderr: {stderr}");
    assert_eq!(stored_tasks(dir.path())[0]["status"], "Todo");
}

#[test]
fn delete_removes_subtree() {
    let dir = TempDir::new().unwrap();
    for (id, parent) in [("task-1", None), ("task-2", Some("task-1")), ("task-3", None)] {
        let mut args = vec!["task", "add", id, "--id", id, "--assignee", "a@b.io"];
        if let Some(parent) = parent {
            args.extend(["--parent", parent]);
        }
        run_json(dir.path(), &args);
    }

    let outcome = run_json(dir.path(), &["task", "delete", "task-1"]);
    assert_eq!(outcome["removed"].as_array().unwrap().len(), 2);

    let remaining = stored_tasks(dir.path());
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["id"], "task-3");

    let output = run(dir.path(), &["task", "delete", "task-1"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: not_found"));
}

#[test]
fn update_without_fields_is_rejected() {
    let dir = TempDir::new().unwrap();
    run_json(
        dir.path(),
        &["task", "add", "Release", "--id", "task-1", "--assignee", "a@b.io"],
    );

    let output = run(dir.path(), &["task", "update", "task-1"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nothing to update"));
}

#[test]
fn help_needed_list_shows_open_requests_until_cleared() {
    let dir = TempDir::new().unwrap();
    run_json(
        dir.path(),
        &[
            "task", "add", "Release", "--id", "task-1", "--assignee", "a@b.io", "--needs-help",
        ],
    );
    run_json(
        dir.path(),
        &[
            "task", "add", "Docs", "--id", "task-2", "--assignee", "a@b.io", "--needs-help",
            "--status", "done",
        ],
    );
    run_json(
        dir.path(),
        &["task", "add", "Build", "--id", "task-3", "--assignee", "a@b.io"],
    );

    let listed = run_json(dir.path(), &["task", "list", "--help-needed"]);
    let ids: Vec<_> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["task-1".to_string()]);

    let updated = run_json(
        dir.path(),
        &["task", "update", "task-1", "--needs-help", "false"],
    );
    assert_eq!(updated["needsHelp"], false);
    let listed = run_json(dir.path(), &["task", "list", "--help-needed"]);
    assert!(listed.as_array().unwrap().is_empty());
}

#[test]
fn list_prints_table_in_plain_mode() {
    let dir = TempDir::new().unwrap();
    run_json(
        dir.path(),
        &["task", "add", "Release", "--id", "task-1", "--assignee", "a@b.io"],
    );

    let output = run(dir.path(), &["task", "list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Release"));
    assert!(stdout.contains("0%"));
}

#[test]
fn unknown_subcommand_reports_invalid_input() {
    let dir = TempDir::new().unwrap();

    let output = run(dir.path(), &["teleport"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("ERROR: invalid_input"));
}

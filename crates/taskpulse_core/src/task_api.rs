use crate::cascade::{apply_cascade, stamp_completion};
use crate::error::AppError;
use crate::ids::unique_id;
use crate::model::{NewTask, TASK_ID_PREFIX, Task, TaskPatch, TaskStatus};
use crate::progress::{TaskProgress, children_of, progress_report};
use crate::storage::json_store::{Collection, Store};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub message: String,
    /// Ids of the deleted task and every descendant, in visit order.
    pub removed: Vec<String>,
}

pub fn list_tasks(store: &Store) -> Result<Vec<Task>, AppError> {
    store.load(Collection::Tasks)
}

pub fn get_task(store: &Store, id: &str) -> Result<Task, AppError> {
    let trimmed_id = required_id(id)?;
    list_tasks(store)?
        .into_iter()
        .find(|task| task.id == trimmed_id)
        .ok_or_else(|| AppError::not_found(format!("task {trimmed_id} not found")))
}

/// Open tasks whose assignees asked for a hand.
pub fn help_needed_tasks(store: &Store) -> Result<Vec<Task>, AppError> {
    let mut tasks = list_tasks(store)?;
    tasks.retain(Task::wants_help);
    Ok(tasks)
}

pub fn task_progress(store: &Store) -> Result<Vec<TaskProgress>, AppError> {
    let tasks = list_tasks(store)?;
    Ok(progress_report(&tasks))
}

pub fn create_task(store: &Store, new_task: NewTask, now: OffsetDateTime) -> Result<Task, AppError> {
    let name = new_task.name.trim();
    if name.is_empty() {
        return Err(AppError::invalid_input("name is required"));
    }
    let assignees = clean_assignees(new_task.assignees)?;

    let mut tasks = list_tasks(store)?;

    let id = match new_task.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => {
            if tasks.iter().any(|task| task.id == id) {
                return Err(AppError::invalid_input(format!("task {id} already exists")));
            }
            id.to_string()
        }
        _ => unique_id(TASK_ID_PREFIX, now, |candidate| {
            tasks.iter().any(|task| task.id == candidate)
        }),
    };

    let parent_id = match new_task.parent_id.as_deref().map(str::trim) {
        Some(parent) if !parent.is_empty() => {
            if !tasks.iter().any(|task| task.id == parent) {
                return Err(AppError::invalid_input(format!(
                    "parent task {parent} not found"
                )));
            }
            Some(parent.to_string())
        }
        _ => None,
    };

    let date = (new_task.status == TaskStatus::Done).then_some(now);
    let task = Task {
        id,
        name: name.to_string(),
        description: new_task.description,
        assignees,
        priority: new_task.priority,
        status: new_task.status,
        parent_id,
        due_date: new_task.due_date,
        date,
        created_at: Some(now),
        needs_help: new_task.needs_help,
    };

    tasks.push(task.clone());
    store.save(Collection::Tasks, &tasks)?;
    tracing::info!(task_id = %task.id, "task created");

    Ok(task)
}

/// Merges `patch`, keeps the completion date in step with the status, then
/// lets the cascade promote the rollup target. Returns the task as stored,
/// which includes any promotion of the task itself.
///
/// Marking a parent `Done` while children are still open is allowed and
/// logged unless `strict_completion` is set.
pub fn update_task(
    store: &Store,
    id: &str,
    patch: TaskPatch,
    strict_completion: bool,
    now: OffsetDateTime,
) -> Result<Task, AppError> {
    let trimmed_id = required_id(id)?;
    let mut tasks = list_tasks(store)?;
    let index = tasks
        .iter()
        .position(|task| task.id == trimmed_id)
        .ok_or_else(|| AppError::not_found(format!("task {trimmed_id} not found")))?;

    validate_patch(&tasks, trimmed_id, &patch)?;

    let previous = tasks[index].status;
    if patch.status == Some(TaskStatus::Done) && previous != TaskStatus::Done {
        let open_children = children_of(trimmed_id, &tasks)
            .filter(|child| !child.is_done())
            .count();
        if open_children > 0 {
            if strict_completion {
                return Err(AppError::invalid_input(format!(
                    "task {trimmed_id} has {open_children} open subtasks"
                )));
            }
            tracing::warn!(task_id = trimmed_id, open_children, "task marked done with open subtasks");
        }
    }

    let task = &mut tasks[index];
    apply_patch(task, patch)?;
    stamp_completion(task, previous, now);

    if let Some(promoted) = apply_cascade(trimmed_id, &mut tasks, now) {
        tracing::debug!(task_id = trimmed_id, promoted = %promoted, "cascade fired");
    }

    store.save(Collection::Tasks, &tasks)?;
    tracing::info!(task_id = trimmed_id, "task updated");

    Ok(tasks[index].clone())
}

/// Removes the task and its transitive descendants. Nothing is written when
/// the id is unknown.
pub fn delete_task(store: &Store, id: &str) -> Result<DeleteOutcome, AppError> {
    let trimmed_id = required_id(id)?;
    let mut tasks = list_tasks(store)?;
    if !tasks.iter().any(|task| task.id == trimmed_id) {
        return Err(AppError::not_found(format!("task {trimmed_id} not found")));
    }

    let removed = descendants_with_self(trimmed_id, &tasks);
    let doomed: HashSet<&str> = removed.iter().map(String::as_str).collect();
    tasks.retain(|task| !doomed.contains(task.id.as_str()));
    store.save(Collection::Tasks, &tasks)?;

    tracing::info!(task_id = trimmed_id, removed = removed.len(), "task deleted");
    Ok(DeleteOutcome {
        message: "Task and subtasks deleted successfully".to_string(),
        removed,
    })
}

/// Replaces the whole collection. The payload must be a JSON array of tasks.
pub fn import_tasks(store: &Store, payload: serde_json::Value) -> Result<usize, AppError> {
    if !payload.is_array() {
        return Err(AppError::invalid_input(
            "invalid data format: expected an array of tasks",
        ));
    }
    let tasks: Vec<Task> = serde_json::from_value(payload)
        .map_err(|err| AppError::invalid_input(format!("invalid task data: {err}")))?;

    let mut seen = HashSet::new();
    for task in &tasks {
        if !seen.insert(task.id.as_str()) {
            return Err(AppError::invalid_input(format!("duplicate task id {}", task.id)));
        }
    }

    store.save(Collection::Tasks, &tasks)?;
    tracing::info!(count = tasks.len(), "tasks imported");
    Ok(tasks.len())
}

/// Pretty-printed JSON array, the same shape `import_tasks` accepts.
pub fn export_tasks(store: &Store) -> Result<String, AppError> {
    let tasks = list_tasks(store)?;
    serde_json::to_string_pretty(&tasks).map_err(|err| AppError::invalid_data(err.to_string()))
}

fn required_id(id: &str) -> Result<&str, AppError> {
    let trimmed_id = id.trim();
    if trimmed_id.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    Ok(trimmed_id)
}

fn clean_assignees(assignees: Vec<String>) -> Result<Vec<String>, AppError> {
    let mut cleaned: Vec<String> = Vec::with_capacity(assignees.len());
    for email in assignees {
        let email = email.trim();
        if !email.is_empty() && !cleaned.iter().any(|existing| existing == email) {
            cleaned.push(email.to_string());
        }
    }
    if cleaned.is_empty() {
        return Err(AppError::invalid_input("at least one assignee is required"));
    }
    Ok(cleaned)
}

fn validate_patch(tasks: &[Task], id: &str, patch: &TaskPatch) -> Result<(), AppError> {
    if let Some(name) = &patch.name
        && name.trim().is_empty()
    {
        return Err(AppError::invalid_input("name is required"));
    }

    if let Some(Some(parent)) = &patch.parent_id {
        let parent = parent.trim();
        if parent == id {
            return Err(AppError::invalid_input("a task cannot be its own parent"));
        }
        if !tasks.iter().any(|task| task.id == parent) {
            return Err(AppError::invalid_input(format!(
                "parent task {parent} not found"
            )));
        }
        if ancestors(parent, tasks).any(|ancestor| ancestor == id) {
            return Err(AppError::invalid_input(format!(
                "task {parent} is a descendant of {id}"
            )));
        }
    }

    Ok(())
}

fn apply_patch(task: &mut Task, patch: TaskPatch) -> Result<(), AppError> {
    if let Some(name) = patch.name {
        task.name = name.trim().to_string();
    }
    if let Some(description) = patch.description {
        task.description = description;
    }
    if let Some(assignees) = patch.assignees {
        task.assignees = clean_assignees(assignees)?;
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    if let Some(status) = patch.status {
        task.status = status;
    }
    if let Some(parent_id) = patch.parent_id {
        task.parent_id = parent_id
            .map(|parent| parent.trim().to_string())
            .filter(|parent| !parent.is_empty());
    }
    if let Some(due_date) = patch.due_date {
        task.due_date = due_date;
    }
    if let Some(needs_help) = patch.needs_help {
        task.needs_help = needs_help;
    }
    Ok(())
}

/// Walks `parentId` links upward from `start`, stopping at a repeat.
fn ancestors<'a>(start: &'a str, tasks: &'a [Task]) -> impl Iterator<Item = &'a str> {
    let mut seen = HashSet::new();
    let mut current = Some(start);
    std::iter::from_fn(move || {
        let id = current?;
        if !seen.insert(id) {
            return None;
        }
        current = tasks
            .iter()
            .find(|task| task.id == id)
            .and_then(|task| task.parent_id.as_deref());
        Some(id)
    })
}

fn descendants_with_self(root: &str, tasks: &[Task]) -> Vec<String> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::from([root]);

    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        order.push(id.to_string());
        queue.extend(children_of(id, tasks).map(|child| child.id.as_str()));
    }

    order
}

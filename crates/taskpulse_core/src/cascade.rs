use crate::model::{Task, TaskStatus};
use crate::progress::compute_progress;
use time::OffsetDateTime;

/// Promotes the rollup target of `updated_task_id` to `Done` once its
/// progress reaches 100. The target is the parent when the task has one,
/// otherwise the task itself. Only one level is examined.
///
/// Returns the id of the promoted task. A missing task or dangling parent is
/// a no-op.
pub fn apply_cascade(
    updated_task_id: &str,
    tasks: &mut [Task],
    now: OffsetDateTime,
) -> Option<String> {
    let updated = tasks.iter().find(|task| task.id == updated_task_id)?;
    let target_id = updated
        .parent_id
        .clone()
        .unwrap_or_else(|| updated.id.clone());

    let Some(index) = tasks.iter().position(|task| task.id == target_id) else {
        tracing::debug!(task_id = updated_task_id, parent_id = %target_id, "rollup target missing");
        return None;
    };

    let snapshot: &[Task] = tasks;
    if snapshot[index].status == TaskStatus::Done {
        return None;
    }
    if compute_progress(&snapshot[index], snapshot) != 100 {
        return None;
    }

    let target = &mut tasks[index];
    target.status = TaskStatus::Done;
    target.date = Some(now);
    tracing::info!(task_id = %target.id, trigger = updated_task_id, "task completed by cascade");
    Some(target.id.clone())
}

/// Keeps the completion date in step with a status change: stamped on the
/// transition into `Done`, cleared on the way out, untouched otherwise.
pub fn stamp_completion(task: &mut Task, previous: TaskStatus, now: OffsetDateTime) {
    match (previous == TaskStatus::Done, task.status == TaskStatus::Done) {
        (false, true) => task.date = Some(now),
        (true, false) => task.date = None,
        _ => {}
    }
}

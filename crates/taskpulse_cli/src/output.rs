//! Plain-text rendering for terminal output. JSON output bypasses this module.

use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskpulse_core::burndown::BurndownEstimate;
use taskpulse_core::model::Task;
use taskpulse_core::model::timestamp::format_calendar_date;
use taskpulse_core::progress::TaskProgress;
use taskpulse_core::stats::ProjectStats;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Priority")]
    priority: &'static str,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Parent")]
    parent: String,
    #[tabled(rename = "Due")]
    due: String,
}

impl From<&TaskProgress> for TaskRow {
    fn from(entry: &TaskProgress) -> Self {
        let task = &entry.task;
        Self {
            // Subtasks are indented under the ID column so trees stay readable.
            id: if task.is_main() {
                task.id.clone()
            } else {
                format!("  {}", task.id)
            },
            name: task.name.clone(),
            status: task.status.label(),
            priority: task.priority.label(),
            progress: format!("{}%", entry.progress),
            parent: task.parent_id.clone().unwrap_or_else(|| "-".to_string()),
            due: due_label(task),
        }
    }
}

fn due_label(task: &Task) -> String {
    task.due_date
        .and_then(|due| format_calendar_date(due.date()).ok())
        .unwrap_or_else(|| "-".to_string())
}

/// Main tasks first, each followed by its direct subtasks.
pub fn render_task_table(entries: &[TaskProgress]) -> String {
    let mut rows = Vec::with_capacity(entries.len());
    for main in entries.iter().filter(|entry| entry.task.is_main()) {
        rows.push(TaskRow::from(main));
        rows.extend(
            entries
                .iter()
                .filter(|entry| entry.task.parent_id.as_deref() == Some(main.task.id.as_str()))
                .map(TaskRow::from),
        );
    }
    // Subtasks whose parent is missing would otherwise vanish from the listing.
    rows.extend(
        entries
            .iter()
            .filter(|entry| {
                entry.task.parent_id.as_deref().is_some_and(|parent| {
                    !entries
                        .iter()
                        .any(|candidate| candidate.task.is_main() && candidate.task.id == parent)
                })
            })
            .map(TaskRow::from),
    );

    let mut table = Table::new(rows);
    table.with(Style::modern());
    table.to_string()
}

pub fn render_task_detail(task: &Task, progress: u8) -> String {
    let mut lines = vec![
        format!("{} ({})", task.name, task.id),
        format!("Status:    {}", task.status.label()),
        format!("Priority:  {}", task.priority.label()),
        format!("Progress:  {progress}%"),
        format!("Assignees: {}", task.assignees.join(", ")),
        format!("Due:       {}", due_label(task)),
    ];
    if let Some(parent) = &task.parent_id {
        lines.push(format!("Parent:    {parent}"));
    }
    if task.wants_help() {
        lines.push("Help:      requested".to_string());
    }
    if !task.description.is_empty() {
        lines.push(String::new());
        lines.push(task.description.clone());
    }
    lines.join("\n")
}

#[derive(Tabled)]
struct WorkloadRow {
    #[tabled(rename = "Member")]
    name: String,
    #[tabled(rename = "Open tasks")]
    open_tasks: usize,
}

pub fn render_stats(stats: &ProjectStats) -> String {
    let lead_time = stats
        .average_lead_time_days
        .map(|days| format!("{days:.1} business days"))
        .unwrap_or_else(|| "-".to_string());
    let mut out = format!(
        "Active main tasks: {}\nIn progress:       {}\nTeam size:         {}\nOverall progress:  {}%\nAverage lead time: {}",
        stats.active_main_tasks,
        stats.in_progress_tasks,
        stats.team_size,
        stats.overall_progress,
        lead_time,
    );

    if !stats.workload.is_empty() {
        let rows = stats.workload.iter().map(|entry| WorkloadRow {
            name: entry.name.clone(),
            open_tasks: entry.open_tasks,
        });
        let mut table = Table::new(rows);
        table.with(Style::modern());
        out.push_str("\n\n");
        out.push_str(&table.to_string());
    }
    out
}

pub fn render_burndown(estimate: &BurndownEstimate) -> String {
    format!(
        "Remaining main tasks: {} (ideal {})",
        estimate.actual, estimate.ideal
    )
}

//! Dashboard figures derived from the task and user collections.

use crate::model::{Task, TaskStatus, User};
use crate::progress::compute_progress;
use serde::Serialize;
use time::{Date, Weekday};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub active_main_tasks: usize,
    pub in_progress_tasks: usize,
    pub team_size: usize,
    pub overall_progress: u8,
    pub workload: Vec<Workload>,
    /// Mean business days from creation to completion, one decimal.
    pub average_lead_time_days: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workload {
    pub user_id: String,
    pub name: String,
    pub open_tasks: usize,
}

pub fn project_stats(tasks: &[Task], users: &[User]) -> ProjectStats {
    let main_tasks: Vec<&Task> = tasks.iter().filter(|task| task.is_main()).collect();

    let overall_progress = if main_tasks.is_empty() {
        0
    } else {
        let sum: u32 = main_tasks
            .iter()
            .map(|task| u32::from(compute_progress(task, tasks)))
            .sum();
        (f64::from(sum) / main_tasks.len() as f64).round() as u8
    };

    ProjectStats {
        active_main_tasks: main_tasks.iter().filter(|task| !task.is_done()).count(),
        in_progress_tasks: tasks
            .iter()
            .filter(|task| task.status == TaskStatus::InProgress)
            .count(),
        team_size: users.len(),
        overall_progress,
        workload: workload(tasks, users),
        average_lead_time_days: average_lead_time(tasks),
    }
}

fn workload(tasks: &[Task], users: &[User]) -> Vec<Workload> {
    let mut rows: Vec<Workload> = users
        .iter()
        .map(|user| Workload {
            user_id: user.id.clone(),
            name: user.name.clone(),
            open_tasks: tasks
                .iter()
                .filter(|task| !task.is_done())
                .filter(|task| {
                    task.assignees
                        .iter()
                        .any(|email| email.eq_ignore_ascii_case(&user.email))
                })
                .count(),
        })
        .collect();
    rows.sort_by(|a, b| b.open_tasks.cmp(&a.open_tasks).then_with(|| a.name.cmp(&b.name)));
    rows
}

fn average_lead_time(tasks: &[Task]) -> Option<f64> {
    let samples: Vec<i64> = tasks
        .iter()
        .filter(|task| task.is_done())
        .filter_map(|task| {
            let created = task.creation_time()?;
            let completed = task.date?;
            Some(business_days_between(created.date(), completed.date()))
        })
        .collect();

    if samples.is_empty() {
        return None;
    }
    let mean = samples.iter().sum::<i64>() as f64 / samples.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

/// Weekdays in `[start, end)`; zero when `end` is not after `start`.
pub fn business_days_between(start: Date, end: Date) -> i64 {
    let mut count = 0;
    let mut day = start;
    while day < end {
        if !matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday) {
            count += 1;
        }
        let Some(next) = day.next_day() else {
            break;
        };
        day = next;
    }
    count
}

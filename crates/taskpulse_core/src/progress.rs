//! Weighted completion of a task from the priorities of its children.

use crate::model::{Task, TaskStatus};
use serde::Serialize;
use std::fmt;

/// Completion percentage in `0..=100`.
///
/// A `Done` task is always 100. A leaf reports 1 while `In Progress` so the
/// bar visibly moves, otherwise 0. With children the result is the share of
/// priority weight held by `Done` children, rounded.
pub fn compute_progress(task: &Task, all_tasks: &[Task]) -> u8 {
    if task.status == TaskStatus::Done {
        return 100;
    }

    let mut total_weight = 0u32;
    let mut completed_weight = 0u32;
    let mut has_children = false;

    for child in children_of(&task.id, all_tasks) {
        has_children = true;
        let weight = child.priority.weight();
        total_weight += weight;
        if child.status == TaskStatus::Done {
            completed_weight += weight;
        }
    }

    if !has_children {
        return match task.status {
            TaskStatus::InProgress => 1,
            _ => 0,
        };
    }

    if total_weight == 0 {
        return 0;
    }

    let ratio = f64::from(completed_weight) * 100.0 / f64::from(total_weight);
    ratio.round() as u8
}

pub fn children_of<'a>(parent_id: &'a str, all_tasks: &'a [Task]) -> impl Iterator<Item = &'a Task> {
    all_tasks
        .iter()
        .filter(move |task| task.parent_id.as_deref() == Some(parent_id))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: u8,
    pub lightness: u8,
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientStops {
    pub start: Hsl,
    pub end: Hsl,
}

impl GradientStops {
    pub fn css(&self) -> String {
        format!("linear-gradient(to right, {}, {})", self.start, self.end)
    }
}

const HUE_SHIFT: f64 = 20.0;

/// Red at 0, green at 100; out-of-range input is clamped.
pub fn progress_to_gradient(progress: i32) -> GradientStops {
    let clamped = progress.clamp(0, 100);
    let hue = f64::from(clamped) * 120.0 / 100.0;
    GradientStops {
        start: Hsl {
            hue,
            saturation: 70,
            lightness: 50,
        },
        end: Hsl {
            hue: hue + HUE_SHIFT,
            saturation: 70,
            lightness: 60,
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskProgress {
    #[serde(flatten)]
    pub task: Task,
    pub progress: u8,
    pub gradient: String,
}

pub fn progress_report(all_tasks: &[Task]) -> Vec<TaskProgress> {
    all_tasks
        .iter()
        .map(|task| {
            let progress = compute_progress(task, all_tasks);
            TaskProgress {
                task: task.clone(),
                progress,
                gradient: progress_to_gradient(i32::from(progress)).css(),
            }
        })
        .collect()
}

//! Actual vs. ideal remaining main tasks.

use crate::error::AppError;
use crate::model::{BurndownPoint, Task};
use crate::storage::json_store::{Collection, Store};
use serde::Serialize;
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BurndownEstimate {
    /// Main tasks not yet `Done`; always an exact recount.
    pub actual: u32,
    /// Where a straight line from the first creation date to the last due
    /// date says the count should be today.
    pub ideal: u32,
}

pub fn estimate_burndown(tasks: &[Task], today: Date) -> BurndownEstimate {
    let main_tasks: Vec<&Task> = tasks.iter().filter(|task| task.is_main()).collect();
    let total = main_tasks.len() as u32;
    let actual = main_tasks.iter().filter(|task| !task.is_done()).count() as u32;

    let start = main_tasks
        .iter()
        .filter_map(|task| task.creation_time())
        .map(|created| created.date())
        .min();
    let end = main_tasks
        .iter()
        .filter_map(|task| task.due_date)
        .map(|due| due.date())
        .max();

    let (Some(start), Some(end)) = (start, end) else {
        return BurndownEstimate {
            actual,
            ideal: total,
        };
    };

    let span_days = (end - start).whole_days().max(1);
    let elapsed_days = (today - start).whole_days().max(0);
    let velocity = f64::from(total) / span_days as f64;
    let remaining = f64::from(total) - velocity * elapsed_days as f64;

    BurndownEstimate {
        actual,
        ideal: remaining.round().max(0.0) as u32,
    }
}

pub fn list_history(store: &Store) -> Result<Vec<BurndownPoint>, AppError> {
    let mut points: Vec<BurndownPoint> = store.load(Collection::Burndown)?;
    points.sort_by_key(|point| point.date);
    Ok(points)
}

pub fn replace_history(
    store: &Store,
    mut points: Vec<BurndownPoint>,
) -> Result<Vec<BurndownPoint>, AppError> {
    points.sort_by_key(|point| point.date);
    points.dedup_by_key(|point| point.date);
    store.save(Collection::Burndown, &points)?;
    Ok(points)
}

/// Upserts the point for `today` from the current task set.
pub fn record_snapshot(store: &Store, today: Date) -> Result<BurndownPoint, AppError> {
    let tasks: Vec<Task> = store.load(Collection::Tasks)?;
    let estimate = estimate_burndown(&tasks, today);
    let point = BurndownPoint {
        date: today,
        actual: estimate.actual,
        ideal: estimate.ideal,
    };

    let mut points = list_history(store)?;
    match points.iter_mut().find(|existing| existing.date == today) {
        Some(existing) => *existing = point,
        None => points.push(point),
    }
    points.sort_by_key(|point| point.date);
    store.save(Collection::Burndown, &points)?;

    tracing::info!(date = %today, actual = point.actual, ideal = point.ideal, "recorded burndown point");
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::{estimate_burndown, list_history, record_snapshot, replace_history};
    use crate::model::{BurndownPoint, Priority, Task, TaskStatus};
    use crate::storage::json_store::{Collection, Store};
    use time::macros::{date, datetime};
    use time::{Date, Duration, OffsetDateTime};

    const START: OffsetDateTime = datetime!(2025-03-01 09:00:00 UTC);

    fn main_task(index: i64, status: TaskStatus) -> Task {
        Task {
            id: format!("task-{index}"),
            name: format!("task {index}"),
            description: String::new(),
            assignees: vec!["ana@example.com".to_string()],
            priority: Priority::Medium,
            status,
            parent_id: None,
            due_date: Some(START + Duration::days(20)),
            date: None,
            created_at: Some(START + Duration::days(index)),
            needs_help: false,
        }
    }

    fn project(done: usize) -> Vec<Task> {
        (0..10)
            .map(|index| {
                let status = if (index as usize) < done {
                    TaskStatus::Done
                } else {
                    TaskStatus::Todo
                };
                main_task(index, status)
            })
            .collect()
    }

    #[test]
    fn actual_counts_open_main_tasks() {
        let mut tasks = project(4);
        let mut sub = main_task(99, TaskStatus::Todo);
        sub.parent_id = Some("task-0".to_string());
        tasks.push(sub);

        let estimate = estimate_burndown(&tasks, date!(2025 - 03 - 05));
        assert_eq!(estimate.actual, 6);
    }

    #[test]
    fn ideal_decreases_as_days_pass() {
        let tasks = project(4);
        let start: Date = START.date();

        let mut previous = estimate_burndown(&tasks, start).ideal;
        assert_eq!(previous, 10);
        for day in (2..=20).step_by(2) {
            let current = estimate_burndown(&tasks, start + Duration::days(day)).ideal;
            assert!(current < previous, "day {day}: {current} >= {previous}");
            previous = current;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn ideal_is_floored_after_due_date() {
        let tasks = project(0);
        let late = START.date() + Duration::days(45);

        let estimate = estimate_burndown(&tasks, late);
        assert_eq!(estimate.ideal, 0);
        assert_eq!(estimate.actual, 10);
    }

    #[test]
    fn before_start_ideal_is_the_full_count() {
        let tasks = project(0);
        let early = START.date() - Duration::days(3);
        assert_eq!(estimate_burndown(&tasks, early).ideal, 10);
    }

    #[test]
    fn without_due_dates_ideal_stays_flat() {
        let mut tasks = project(2);
        for task in &mut tasks {
            task.due_date = None;
        }
        let estimate = estimate_burndown(&tasks, START.date() + Duration::days(10));
        assert_eq!(estimate.ideal, 10);
        assert_eq!(estimate.actual, 8);
    }

    #[test]
    fn empty_project_is_zero() {
        let estimate = estimate_burndown(&[], date!(2025 - 03 - 01));
        assert_eq!(estimate.actual, 0);
        assert_eq!(estimate.ideal, 0);
    }

    #[test]
    fn snapshot_upserts_todays_point() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        store.save(Collection::Tasks, &project(4)).unwrap();
        let today = START.date() + Duration::days(10);

        record_snapshot(&store, today).unwrap();
        let mut tasks = project(5);
        tasks[9].status = TaskStatus::Done;
        store.save(Collection::Tasks, &tasks).unwrap();
        let point = record_snapshot(&store, today).unwrap();

        let history = list_history(&store).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], point);
        assert_eq!(point.actual, 4);
        assert_eq!(point.ideal, 5);
    }

    #[test]
    fn replace_history_sorts_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let points = vec![
            BurndownPoint { date: date!(2025 - 03 - 03), actual: 7, ideal: 8 },
            BurndownPoint { date: date!(2025 - 03 - 01), actual: 10, ideal: 10 },
            BurndownPoint { date: date!(2025 - 03 - 03), actual: 6, ideal: 8 },
        ];

        let saved = replace_history(&store, points).unwrap();

        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].date, date!(2025 - 03 - 01));
        assert_eq!(list_history(&store).unwrap(), saved);
    }
}

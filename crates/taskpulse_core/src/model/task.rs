use crate::error::AppError;
use crate::model::timestamp;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignees: Vec<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(
        default,
        with = "timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<OffsetDateTime>,
    /// Completion time, stamped on the transition into `Done`.
    #[serde(
        default,
        with = "timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<OffsetDateTime>,
    #[serde(
        default,
        with = "timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
    /// Raised by an assignee asking teammates for a hand; cleared when
    /// someone offers help.
    #[serde(default)]
    pub needs_help: bool,
}

impl Task {
    pub fn is_main(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn wants_help(&self) -> bool {
        self.needs_help && !self.is_done()
    }

    /// Explicit `createdAt`, or for legacy records the epoch milliseconds
    /// embedded in a `task-<ms>` id.
    pub fn creation_time(&self) -> Option<OffsetDateTime> {
        self.created_at.or_else(|| timestamp_from_id(&self.id))
    }
}

pub const TASK_ID_PREFIX: &str = "task";
const ID_PREFIX: &str = "task-";

fn timestamp_from_id(id: &str) -> Option<OffsetDateTime> {
    let head = id.get(..ID_PREFIX.len())?;
    if !head.eq_ignore_ascii_case(ID_PREFIX) {
        return None;
    }
    let millis: i64 = id[ID_PREFIX.len()..].parse().ok()?;
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}

/// Ordered by severity, so `Critical > High > Medium > Low`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn weight(self) -> u32 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Backlog,
    #[default]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::Todo => "Todo",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

/// Case-insensitive; spaces, dashes and underscores are interchangeable.
fn normalize_label(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '-' | '_'))
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_label(raw).as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(AppError::invalid_input(format!("unknown priority: {raw}"))),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_label(raw).as_str() {
            "backlog" => Ok(Self::Backlog),
            "todo" => Ok(Self::Todo),
            "inprogress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(AppError::invalid_input(format!("unknown status: {raw}"))),
        }
    }
}

/// Payload for creating a task. Missing id and `createdAt` are filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default, with = "timestamp::optional")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub needs_help: bool,
}

/// The fields a task update may touch. `id`, `createdAt` and the completion
/// `date` are not patchable; unknown fields are ignored so a full task
/// object can be sent as a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignees: Option<Vec<String>>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "timestamp::double_option")]
    pub parent_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "timestamp::patch::deserialize")]
    pub due_date: Option<Option<OffsetDateTime>>,
    #[serde(default)]
    pub needs_help: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::{Priority, Task, TaskPatch, TaskStatus};
    use time::macros::datetime;

    fn task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            name: "demo".to_string(),
            description: String::new(),
            assignees: vec!["ana@example.com".to_string()],
            priority: Priority::Medium,
            status: TaskStatus::Todo,
            parent_id: None,
            due_date: None,
            date: None,
            created_at: None,
            needs_help: false,
        }
    }

    #[test]
    fn priority_orders_by_severity() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn status_uses_dashboard_wire_names() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let parsed: TaskStatus = serde_json::from_str("\"Backlog\"").unwrap();
        assert_eq!(parsed, TaskStatus::Backlog);
    }

    #[test]
    fn labels_parse_loosely() {
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("In Progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("CRITICAL".parse::<Priority>().unwrap(), Priority::Critical);
        assert_eq!("urgent".parse::<Priority>().unwrap_err().code(), "invalid_input");
    }

    #[test]
    fn creation_time_prefers_explicit_field() {
        let mut legacy = task("TASK-1700000000000");
        assert_eq!(
            legacy.creation_time(),
            Some(datetime!(2023-11-14 22:13:20 UTC))
        );

        legacy.created_at = Some(datetime!(2024-01-01 00:00:00 UTC));
        assert_eq!(
            legacy.creation_time(),
            Some(datetime!(2024-01-01 00:00:00 UTC))
        );

        assert_eq!(task("MEETING-12").creation_time(), None);
        assert_eq!(task("task-abc").creation_time(), None);
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let patch: TaskPatch =
            serde_json::from_str(r#"{"parentId": null, "status": "Done"}"#).unwrap();
        assert_eq!(patch.parent_id, Some(None));
        assert_eq!(patch.due_date, None);
        assert_eq!(patch.status, Some(TaskStatus::Done));

        let patch: TaskPatch = serde_json::from_str(r#"{"dueDate": "2025-05-01"}"#).unwrap();
        assert_eq!(patch.due_date, Some(Some(datetime!(2025-05-01 00:00:00 UTC))));
    }

    #[test]
    fn full_task_object_is_accepted_as_patch() {
        let raw = r#"{"id":"task-1","name":"renamed","priority":"High","status":"Todo","createdAt":"2025-01-01T00:00:00Z"}"#;
        let patch: TaskPatch = serde_json::from_str(raw).unwrap();
        assert_eq!(patch.name.as_deref(), Some("renamed"));
        assert_eq!(patch.priority, Some(Priority::High));
    }
}

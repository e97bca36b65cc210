use crate::error::AppError;
use crate::ids::unique_id;
use crate::model::{Meeting, MeetingPatch, NewMeeting};
use crate::storage::json_store::{Collection, Store};
use time::OffsetDateTime;

/// Most recent first.
pub fn list_meetings(store: &Store) -> Result<Vec<Meeting>, AppError> {
    let mut meetings: Vec<Meeting> = store.load(Collection::Meetings)?;
    meetings.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(meetings)
}

pub fn get_meeting(store: &Store, id: &str) -> Result<Meeting, AppError> {
    let trimmed_id = id.trim();
    store
        .load::<Meeting>(Collection::Meetings)?
        .into_iter()
        .find(|meeting| meeting.id == trimmed_id)
        .ok_or_else(|| AppError::not_found(format!("meeting {trimmed_id} not found")))
}

pub fn create_meeting(
    store: &Store,
    new_meeting: NewMeeting,
    now: OffsetDateTime,
) -> Result<Meeting, AppError> {
    let title = new_meeting.title.trim();
    if title.is_empty() {
        return Err(AppError::invalid_input("title is required"));
    }

    let mut meetings: Vec<Meeting> = store.load(Collection::Meetings)?;
    let id = match new_meeting.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => {
            if meetings.iter().any(|meeting| meeting.id == id) {
                return Err(AppError::invalid_input(format!("meeting {id} already exists")));
            }
            id.to_string()
        }
        _ => unique_id("meeting", now, |candidate| {
            meetings.iter().any(|meeting| meeting.id == candidate)
        }),
    };

    let meeting = Meeting {
        id,
        date: new_meeting.date,
        title: title.to_string(),
        attendees: new_meeting.attendees,
        raw_notes: new_meeting.raw_notes,
        summary: new_meeting.summary,
        action_items: new_meeting.action_items,
    };
    meetings.push(meeting.clone());
    store.save(Collection::Meetings, &meetings)?;
    tracing::info!(meeting_id = %meeting.id, "meeting created");

    Ok(meeting)
}

/// Fields left out of `patch` keep their stored values, action items
/// included.
pub fn update_meeting(store: &Store, id: &str, patch: MeetingPatch) -> Result<Meeting, AppError> {
    let trimmed_id = id.trim();
    let mut meetings: Vec<Meeting> = store.load(Collection::Meetings)?;
    let meeting = meetings
        .iter_mut()
        .find(|meeting| meeting.id == trimmed_id)
        .ok_or_else(|| AppError::not_found(format!("meeting {trimmed_id} not found")))?;

    if let Some(title) = patch.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::invalid_input("title is required"));
        }
        meeting.title = title.to_string();
    }
    if let Some(date) = patch.date {
        meeting.date = date;
    }
    if let Some(attendees) = patch.attendees {
        meeting.attendees = attendees;
    }
    if let Some(raw_notes) = patch.raw_notes {
        meeting.raw_notes = raw_notes;
    }
    if let Some(summary) = patch.summary {
        meeting.summary = summary;
    }
    if let Some(action_items) = patch.action_items {
        meeting.action_items = action_items;
    }

    let updated = meeting.clone();
    store.save(Collection::Meetings, &meetings)?;
    tracing::info!(meeting_id = trimmed_id, "meeting updated");
    Ok(updated)
}

pub fn delete_meeting(store: &Store, id: &str) -> Result<Meeting, AppError> {
    let trimmed_id = id.trim();
    let mut meetings: Vec<Meeting> = store.load(Collection::Meetings)?;
    let index = meetings
        .iter()
        .position(|meeting| meeting.id == trimmed_id)
        .ok_or_else(|| AppError::not_found(format!("meeting {trimmed_id} not found")))?;

    let removed = meetings.remove(index);
    store.save(Collection::Meetings, &meetings)?;
    tracing::info!(meeting_id = trimmed_id, "meeting deleted");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::{create_meeting, delete_meeting, get_meeting, list_meetings, update_meeting};
    use crate::model::{ActionItem, MeetingPatch, NewMeeting, TaskStatus};
    use crate::storage::json_store::Store;
    use time::OffsetDateTime;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-04-10 12:00:00 UTC);

    fn new_meeting(id: &str, date: OffsetDateTime) -> NewMeeting {
        NewMeeting {
            id: Some(id.to_string()),
            date,
            title: format!("sync {id}"),
            attendees: vec!["ana@example.com".to_string()],
            raw_notes: String::new(),
            summary: String::new(),
            action_items: vec![ActionItem {
                id: format!("{id}-a1"),
                description: "send minutes".to_string(),
                owner: "ana@example.com".to_string(),
                status: TaskStatus::Todo,
            }],
        }
    }

    #[test]
    fn list_is_sorted_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        create_meeting(&store, new_meeting("m1", datetime!(2025-04-01 09:00 UTC)), NOW).unwrap();
        create_meeting(&store, new_meeting("m2", datetime!(2025-04-08 09:00 UTC)), NOW).unwrap();
        create_meeting(&store, new_meeting("m3", datetime!(2025-04-03 09:00 UTC)), NOW).unwrap();

        let ids: Vec<String> = list_meetings(&store)
            .unwrap()
            .into_iter()
            .map(|meeting| meeting.id)
            .collect();
        assert_eq!(ids, vec!["m2", "m3", "m1"]);
    }

    #[test]
    fn patch_without_action_items_preserves_them() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let created =
            create_meeting(&store, new_meeting("m1", datetime!(2025-04-01 09:00 UTC)), NOW)
                .unwrap();

        let patch: MeetingPatch =
            serde_json::from_str(r#"{"summary": "Agreed on scope", "title": "Kickoff"}"#).unwrap();
        let updated = update_meeting(&store, "m1", patch).unwrap();

        assert_eq!(updated.summary, "Agreed on scope");
        assert_eq!(updated.title, "Kickoff");
        assert_eq!(updated.action_items, created.action_items);
        assert_eq!(get_meeting(&store, "m1").unwrap(), updated);
    }

    #[test]
    fn missing_meetings_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        assert_eq!(get_meeting(&store, "nope").unwrap_err().code(), "not_found");
        assert_eq!(
            update_meeting(&store, "nope", MeetingPatch::default())
                .unwrap_err()
                .code(),
            "not_found"
        );
        assert_eq!(delete_meeting(&store, "nope").unwrap_err().code(), "not_found");
    }

    #[test]
    fn generated_meeting_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let mut payload = new_meeting("x", datetime!(2025-04-01 09:00 UTC));
        payload.id = None;

        let created = create_meeting(&store, payload, NOW).unwrap();
        assert!(created.id.starts_with("meeting-"));
        assert_eq!(delete_meeting(&store, &created.id).unwrap().id, created.id);
        assert!(list_meetings(&store).unwrap().is_empty());
    }
}

use super::{AudioClip, LanguageModel, prompts};
use crate::burndown::estimate_burndown;
use crate::error::AppError;
use crate::model::{ActionItem, AiDirective, Meeting, Task, TaskStatus};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Risk,
    Positive,
    Suggestion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub notification: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub summary: String,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactedNotes {
    pub redacted_summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerLines {
    pub name: String,
    #[serde(default)]
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub raw_transcript: String,
    pub speakers: Vec<SpeakerLines>,
    pub highlights: Vec<String>,
    pub initial_summary: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptAnalysis {
    #[serde(default)]
    speakers: Vec<SpeakerLines>,
    #[serde(default)]
    highlights: Vec<String>,
    initial_summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingPrep {
    pub overall_sentiment: Sentiment,
    pub sentiment_reasoning: String,
    #[serde(default)]
    pub discussion_points: Vec<String>,
    #[serde(default)]
    pub questions_to_ask: Vec<String>,
    #[serde(default)]
    pub talking_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedDescription {
    pub suggested_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BurndownSuggestion {
    /// Always the exact recount, whatever the model said.
    pub suggested_actual: u32,
    pub suggested_ideal: u32,
    pub reasoning: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBurndownSuggestion {
    suggested_ideal: f64,
    #[serde(default)]
    reasoning: String,
}

/// One directive chosen uniformly at random, or `None` when there are none.
pub fn pick_directive(directives: &[AiDirective]) -> Option<&AiDirective> {
    if directives.is_empty() {
        return None;
    }
    let roll = getrandom::u64().unwrap_or_else(|err| {
        tracing::debug!(error = %err, "no randomness available, using first directive");
        0
    });
    directives.get((roll % directives.len() as u64) as usize)
}

pub fn notification(
    model: &dyn LanguageModel,
    tasks: &[Task],
    directives: &[AiDirective],
    language: &str,
) -> Result<Notification, AppError> {
    let directive = pick_directive(directives).map(|directive| directive.text.as_str());
    let prompt = prompts::notification(&task_digest(tasks), directive, language);
    ask(model, "notification", &prompt)
}

pub fn project_summary(
    model: &dyn LanguageModel,
    tasks: &[Task],
    directives: &[AiDirective],
    language: &str,
) -> Result<ProjectSummary, AppError> {
    let texts: Vec<&str> = directives.iter().map(|d| d.text.as_str()).collect();
    let prompt = prompts::project_summary(&to_json(tasks)?, &to_json(&texts)?, language);
    ask(model, "project_summary", &prompt)
}

pub fn redact_notes(
    model: &dyn LanguageModel,
    notes: &str,
    language: &str,
) -> Result<RedactedNotes, AppError> {
    if notes.trim().is_empty() {
        return Err(AppError::invalid_input("notes are required"));
    }
    ask(model, "redact_notes", &prompts::redact_notes(notes.trim(), language))
}

/// Speech to text, then a second call that splits the transcript by speaker.
pub fn transcribe_audio(
    model: &dyn LanguageModel,
    audio_data_uri: &str,
    attendees: &[String],
    language: &str,
) -> Result<Transcript, AppError> {
    let clip = AudioClip::from_data_uri(audio_data_uri)?;
    let raw_transcript = model.transcribe(&clip)?;
    if raw_transcript.trim().is_empty() {
        return Err(AppError::advisor("transcription returned no text"));
    }

    let prompt = prompts::analyse_transcript(&raw_transcript, &to_json(attendees)?, language);
    let analysis: TranscriptAnalysis = ask(model, "transcribe_audio", &prompt)?;

    Ok(Transcript {
        raw_transcript,
        speakers: analysis.speakers,
        highlights: analysis.highlights,
        initial_summary: analysis.initial_summary,
    })
}

/// Context is the action items of the meeting just before `meeting_id`
/// (none for the first one), every task assigned to an attendee, and all
/// directives.
pub fn meeting_prep(
    model: &dyn LanguageModel,
    meetings: &[Meeting],
    tasks: &[Task],
    directives: &[AiDirective],
    meeting_id: &str,
    attendee_emails: &[String],
    language: &str,
) -> Result<MeetingPrep, AppError> {
    let meeting_id = meeting_id.trim();
    if meeting_id.is_empty() {
        return Err(AppError::invalid_input("meetingId is required"));
    }

    let mut chronological: Vec<&Meeting> = meetings.iter().collect();
    chronological.sort_by_key(|meeting| meeting.date);
    let position = chronological
        .iter()
        .position(|meeting| meeting.id == meeting_id)
        .ok_or_else(|| AppError::not_found(format!("meeting {meeting_id} not found")))?;
    let previous_items: &[ActionItem] = match position.checked_sub(1) {
        Some(previous) => &chronological[previous].action_items,
        None => &[],
    };

    let attendee_tasks: Vec<&Task> = tasks
        .iter()
        .filter(|task| {
            task.assignees.iter().any(|assignee| {
                attendee_emails
                    .iter()
                    .any(|email| email.trim().eq_ignore_ascii_case(assignee))
            })
        })
        .collect();

    let prompt = prompts::meeting_prep(
        &to_json(previous_items)?,
        &to_json(&attendee_tasks)?,
        &to_json(directives)?,
        language,
    );
    ask(model, "meeting_prep", &prompt)
}

pub fn suggest_description(
    model: &dyn LanguageModel,
    task_name: &str,
    language: &str,
) -> Result<SuggestedDescription, AppError> {
    let task_name = task_name.trim();
    if task_name.is_empty() {
        return Err(AppError::invalid_input("taskName is required"));
    }
    ask(
        model,
        "suggest_description",
        &prompts::suggest_description(task_name, language),
    )
}

pub fn suggest_burndown(
    model: &dyn LanguageModel,
    tasks: &[Task],
    today: Date,
    language: &str,
) -> Result<BurndownSuggestion, AppError> {
    let prompt = prompts::suggest_burndown(&to_json(tasks)?, today, language);
    let raw: RawBurndownSuggestion = ask(model, "suggest_burndown", &prompt)?;
    let estimate = estimate_burndown(tasks, today);

    Ok(BurndownSuggestion {
        suggested_actual: estimate.actual,
        suggested_ideal: raw.suggested_ideal.round().max(0.0) as u32,
        reasoning: raw.reasoning,
    })
}

fn ask<T: DeserializeOwned>(
    model: &dyn LanguageModel,
    flow: &'static str,
    prompt: &str,
) -> Result<T, AppError> {
    tracing::debug!(flow, "asking language model");
    let answer = model.generate(prompt).inspect_err(|err| {
        tracing::warn!(flow, error = %err, "language model call failed");
    })?;
    parse_answer(&answer).inspect_err(|err| {
        tracing::warn!(flow, error = %err, "unusable language model answer");
    })
}

/// Accepts a bare JSON object, optionally wrapped in a Markdown code fence or
/// surrounded by prose.
fn parse_answer<T: DeserializeOwned>(answer: &str) -> Result<T, AppError> {
    let start = answer.find('{');
    let end = answer.rfind('}');
    let object = match (start, end) {
        (Some(start), Some(end)) if start < end => &answer[start..=end],
        _ => return Err(AppError::advisor("model answer contains no JSON object")),
    };
    serde_json::from_str(object)
        .map_err(|err| AppError::advisor(format!("model answer does not match the expected shape: {err}")))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Plain-text status digest: counts per status, then every open main task.
fn task_digest(tasks: &[Task]) -> String {
    let count = |status: TaskStatus| tasks.iter().filter(|task| task.status == status).count();
    let mut digest = format!(
        "{} tasks: {} backlog, {} todo, {} in progress, {} done.",
        tasks.len(),
        count(TaskStatus::Backlog),
        count(TaskStatus::Todo),
        count(TaskStatus::InProgress),
        count(TaskStatus::Done),
    );

    for task in tasks.iter().filter(|task| task.is_main() && !task.is_done()) {
        digest.push_str(&format!(
            "\n- {} [{}, {}]",
            task.name,
            task.priority.label(),
            task.status.label()
        ));
        if let Some(due) = task.due_date {
            digest.push_str(&format!(" due {}", due.date()));
        }
    }
    digest
}

//! Prompt templates. Each one ends by spelling out the JSON object the
//! answer must be.

use time::Date;

fn answer_rules(language: &str, shape: &str) -> String {
    format!(
        "Write every text value in {language}.\n\
         Reply with a single JSON object and nothing else, shaped exactly like:\n{shape}"
    )
}

pub fn notification(digest: &str, directive: Option<&str>, language: &str) -> String {
    let directive = directive.unwrap_or("(none)");
    format!(
        "You are an assistant that writes notifications for a project management dashboard.\n\
         Based on the project status below and the directive, write one short, informative \
         notification of at most two sentences. Classify it as a risk, a positive observation \
         or an optimisation suggestion. If there is a risk, explain it. When a directive is \
         present, let it steer what you pick.\n\n\
         Project status:\n{digest}\n\n\
         Directive: {directive}\n\n{}",
        answer_rules(
            language,
            r#"{"notification": "<text>", "type": "risk" | "positive" | "suggestion"}"#
        )
    )
}

pub fn project_summary(tasks_json: &str, directives_json: &str, language: &str) -> String {
    format!(
        "You are the lead strategic analyst on a project and brief the management board.\n\
         Analyse the tasks and the strategic directives below.\n\n\
         Tasks: {tasks_json}\n\
         Directives: {directives_json}\n\n\
         1. summary: two or three sentences on the overall state of the project and progress \
         in its key areas.\n\
         2. risks: the two or three most important risks, such as late critical tasks, work \
         piling up in one status, or conflicts with the directives.\n\
         3. recommendations: two or three concrete steps that reduce those risks.\n\n{}",
        answer_rules(
            language,
            r#"{"summary": "<text>", "risks": ["<text>"], "recommendations": ["<text>"]}"#
        )
    )
}

pub fn redact_notes(notes: &str, language: &str) -> String {
    format!(
        "You turn raw, informal meeting notes into a concise and professional meeting summary.\n\n\
         Original notes:\n{notes}\n\n\
         Organise the summary into sections such as key decisions, action items and main \
         discussion topics. Use formal language, drop digressions and repetition, and use \
         bullet points so someone who missed the meeting can follow it.\n\n{}",
        answer_rules(language, r#"{"redactedSummary": "<text>"}"#)
    )
}

pub fn analyse_transcript(transcript: &str, attendees_json: &str, language: &str) -> String {
    format!(
        "You analyse meeting transcripts and turn them into structured notes.\n\n\
         Attendees: {attendees_json}\n\
         Raw transcript:\n---\n{transcript}\n---\n\n\
         1. speakers: attribute every utterance to one attendee, or \"Unknown\" when unsure, \
         grouping each person's lines together.\n\
         2. highlights: the key decisions, action items, open questions and conclusions.\n\
         3. initialSummary: a two or three sentence paragraph on the main topics and outcome.\n\n{}",
        answer_rules(
            language,
            r#"{"speakers": [{"name": "<name>", "lines": ["<text>"]}], "highlights": ["<text>"], "initialSummary": "<text>"}"#
        )
    )
}

pub fn meeting_prep(
    previous_action_items_json: &str,
    attendee_tasks_json: &str,
    directives_json: &str,
    language: &str,
) -> String {
    format!(
        "You help a project manager prepare for a team meeting.\n\n\
         Action items from the previous meeting: {previous_action_items_json}\n\
         Current tasks of the attendees: {attendee_tasks_json}\n\
         Project directives: {directives_json}\n\n\
         1. overallSentiment and sentimentReasoning: positive when most items are done or \
         moving, neutral when progress and problems balance, negative when many key items are \
         blocked or not started. Justify it in one sentence.\n\
         2. discussionPoints: two or three topics, focused on unfinished action items and \
         tasks that look stuck in Todo or Backlog.\n\
         3. questionsToAsk: two or three questions that get at the causes of those problems.\n\
         4. talkingPoints: one or two concrete achievements worth praising.\n\
         Stay concise and ground every point in the data.\n\n{}",
        answer_rules(
            language,
            r#"{"overallSentiment": "positive" | "neutral" | "negative", "sentimentReasoning": "<text>", "discussionPoints": ["<text>"], "questionsToAsk": ["<text>"], "talkingPoints": ["<text>"]}"#
        )
    )
}

pub fn suggest_description(task_name: &str, language: &str) -> String {
    format!(
        "You are a project management expert who writes clear task descriptions.\n\
         Turn the short task name below into a detailed, professional description that says \
         what the goal is, what the key parts are, and where to start.\n\n\
         Task name:\n{task_name}\n\n{}",
        answer_rules(language, r#"{"suggestedDescription": "<text>"}"#)
    )
}

pub fn suggest_burndown(tasks_json: &str, today: Date, language: &str) -> String {
    format!(
        "You are a project analyst helping a project manager fill in a burndown chart.\n\n\
         Today is {today}.\n\
         All tasks: {tasks_json}\n\n\
         1. suggestedActual: the number of main tasks (no parentId) whose status is not Done.\n\
         2. suggestedIdeal: how many main tasks should remain today on a straight line from \
         the creation of the first task to the latest dueDate, rounded to a whole number.\n\
         3. reasoning: one or two sentences on how you got both numbers.\n\n{}",
        answer_rules(
            language,
            r#"{"suggestedActual": <number>, "suggestedIdeal": <number>, "reasoning": "<text>"}"#
        )
    )
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{ActionKind, ActionStatus, FlowAction};
use crate::reconciler::{EntryKey, ViewEntry};
use crate::sections::TaskView;

/// Render-ready form of one view-entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDisplay {
    pub headline: String,
    pub detail: Vec<String>,
    pub in_progress: bool,
}

pub fn entry_display(entry: &ViewEntry) -> EntryDisplay {
    match entry {
        ViewEntry::SubflowSummary(summary) => EntryDisplay {
            headline: summary.text.primary.clone(),
            detail: summary.text.secondary.iter().cloned().collect(),
            in_progress: summary.text.secondary.is_some(),
        },
        ViewEntry::Action(entry) => EntryDisplay {
            headline: entry.action.action_type.clone(),
            detail: action_detail(&entry.action),
            in_progress: entry.action.action_status.is_non_terminal(),
        },
    }
}

fn action_detail(action: &FlowAction) -> Vec<String> {
    match action.kind() {
        ActionKind::UserRequest => user_request_detail(action),
        ActionKind::Generate => text_lines(&generate_result_text(action)),
        _ => text_lines(&action.action_result),
    }
}

fn text_lines(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.lines().map(str::to_string).collect()
}

#[derive(Debug, Deserialize)]
struct ActionResultPayload {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    approved: Option<bool>,
}

/// Completed generation results arrive as `{"content": ...}` wrappers; show
/// the inner content and fall back to the raw result on any decode failure.
fn generate_result_text(action: &FlowAction) -> String {
    if action.action_status != ActionStatus::Complete || action.action_result.trim().is_empty() {
        return action.action_result.clone();
    }
    match serde_json::from_str::<ActionResultPayload>(&action.action_result) {
        Ok(ActionResultPayload {
            content: Some(content),
            ..
        }) => content,
        _ => action.action_result.clone(),
    }
}

fn user_request_detail(action: &FlowAction) -> Vec<String> {
    let request_kind = param_str(action, "requestKind");
    if action.action_status == ActionStatus::Pending {
        return match request_kind {
            Some("free_form") => vec![
                request_content(action, "No request content provided.").to_string(),
                "Awaiting your response...".to_string(),
            ],
            Some("approval") => {
                let approve = param_str(action, "approveButtonText").unwrap_or("Approve");
                let reject = param_str(action, "rejectButtonText").unwrap_or("Reject");
                vec![
                    request_content(action, "No request content provided.").to_string(),
                    format!("Awaiting decision: {approve} / {reject}"),
                ]
            }
            Some(other) => vec![format!("Unsupported request kind: {other}")],
            None => vec!["Missing or invalid request kind.".to_string()],
        };
    }
    completed_user_request(action, request_kind)
}

fn completed_user_request(action: &FlowAction, request_kind: Option<&str>) -> Vec<String> {
    let mut out = vec![format!(
        "Original request: {}",
        request_content(action, "No original request content available.")
    )];
    if action.action_result.is_empty() {
        out.push("No action result available.".to_string());
        return out;
    }
    match serde_json::from_str::<ActionResultPayload>(&action.action_result) {
        Ok(result) => {
            if request_kind == Some("approval") {
                let status = if result.approved == Some(true) {
                    "Approved"
                } else {
                    "Rejected"
                };
                out.push(format!("Status: {status}"));
            }
            match result.content.filter(|content| !content.trim().is_empty()) {
                Some(content) => out.push(format!("Result: {content}")),
                None => match request_kind {
                    Some("free_form") => out.push("Result: No content submitted.".to_string()),
                    Some("approval") => out.push("Result: No comments provided.".to_string()),
                    _ => {}
                },
            }
        }
        // Unparseable results are shown raw rather than failing the render.
        Err(_) => out.push(format!("Result: {}", action.action_result)),
    }
    out
}

fn request_content<'a>(action: &'a FlowAction, fallback: &'a str) -> &'a str {
    param_str(action, "requestContent").unwrap_or(fallback)
}

fn param_str<'a>(action: &'a FlowAction, key: &str) -> Option<&'a str> {
    action.action_params.get(key).and_then(Value::as_str)
}

// Serializable snapshot of a whole task view, used by headless replay.

#[derive(Debug, Serialize)]
pub struct TaskViewReport {
    pub sections: Vec<SectionReport>,
}

#[derive(Debug, Serialize)]
pub struct SectionReport {
    pub id: String,
    pub title: String,
    pub entries: Vec<EntryReport>,
}

#[derive(Debug, Serialize)]
pub struct EntryReport {
    pub kind: &'static str,
    pub key: String,
    pub headline: String,
    pub detail: Vec<String>,
    pub in_progress: bool,
}

pub fn task_view_report(view: &TaskView) -> TaskViewReport {
    TaskViewReport {
        sections: view
            .sections()
            .iter()
            .map(|section| SectionReport {
                id: section.id.clone(),
                title: view.section_title(&section.id),
                entries: section.view.entries().iter().map(entry_report).collect(),
            })
            .collect(),
    }
}

fn entry_report(entry: &ViewEntry) -> EntryReport {
    let display = entry_display(entry);
    let kind = match entry {
        ViewEntry::Action(_) => "action",
        ViewEntry::SubflowSummary(_) => "subflow_summary",
    };
    let key = match entry.key() {
        EntryKey::Action(id) | EntryKey::Subflow(id) => id,
    };
    EntryReport {
        kind,
        key,
        headline: display.headline,
        detail: display.detail,
        in_progress: display.in_progress,
    }
}

#[cfg(test)]
#[path = "../tests/unit/display_tests.rs"]
mod tests;

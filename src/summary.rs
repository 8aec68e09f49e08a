use std::collections::BTreeSet;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::models::{ActionKind, FlowAction, Subflow, SubflowStatus};

const THINKING: &str = "Thinking...";
const LOOKING_UP_FALLBACK: &str = "Looking up code...";
const SEARCHING_FALLBACK: &str = "Searching...";
const READING_FALLBACK: &str = "Reading files...";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SummaryText {
    pub primary: String,
    pub secondary: Option<String>,
}

/// Status text for a summarized subflow: the primary line follows the
/// subflow status alone; the secondary line only exists while the subflow
/// is still in its started/in-progress bucket.
pub fn render(action: Option<&FlowAction>, subflow: &Subflow) -> SummaryText {
    let primary = match subflow.status {
        SubflowStatus::Complete => "Found Relevant Code",
        SubflowStatus::Failed => "Failed to Find Code",
        SubflowStatus::Started | SubflowStatus::InProgress => "Finding Relevant Code",
    };
    let secondary = if subflow.status.is_terminal() {
        None
    } else {
        Some(secondary_text(action))
    };
    SummaryText {
        primary: primary.to_string(),
        secondary,
    }
}

fn secondary_text(action: Option<&FlowAction>) -> String {
    let Some(action) = action else {
        return THINKING.to_string();
    };
    match action.kind() {
        ActionKind::ToolCall(tool) => tool_status_text(&tool, &action.action_params),
        _ => THINKING.to_string(),
    }
}

fn tool_status_text(tool: &str, params: &Map<String, Value>) -> String {
    let display_name = format_tool_name(tool);
    match display_name.to_lowercase().as_str() {
        "retrieve code context" => retrieve_code_context_status(params),
        "bulk search repository" => bulk_search_repository_status(params),
        "read file lines" => read_file_lines_status(params),
        "get help or input" => "Waiting for input...".to_string(),
        _ => display_name,
    }
}

fn format_tool_name(tool: &str) -> String {
    let spaced = tool.replace('_', " ");
    let trimmed = spaced.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// Per-tool param sub-schemas. Decoding is strict enough to reject shape
// mismatches but ignores unknown fields, so a failed decode falls back to
// the generic per-tool message instead of failing the render.

#[derive(Debug, Deserialize)]
struct RetrieveCodeContextParams {
    #[serde(default)]
    code_context_requests: Vec<CodeContextRequest>,
}

#[derive(Debug, Deserialize)]
struct CodeContextRequest {
    file_path: String,
}

#[derive(Debug, Deserialize)]
struct BulkSearchRepositoryParams {
    #[serde(default)]
    searches: Vec<RepositorySearch>,
}

#[derive(Debug, Deserialize)]
struct RepositorySearch {
    search_term: String,
}

#[derive(Debug, Deserialize)]
struct ReadFileLinesParams {
    #[serde(default)]
    file_lines: Vec<FileLine>,
}

#[derive(Debug, Deserialize)]
struct FileLine {
    file_path: String,
}

fn decode_params<T: DeserializeOwned>(params: &Map<String, Value>) -> Option<T> {
    serde_json::from_value(Value::Object(params.clone())).ok()
}

fn retrieve_code_context_status(params: &Map<String, Value>) -> String {
    let Some(decoded) = decode_params::<RetrieveCodeContextParams>(params) else {
        return LOOKING_UP_FALLBACK.to_string();
    };
    let paths: BTreeSet<&str> = decoded
        .code_context_requests
        .iter()
        .map(|request| request.file_path.as_str())
        .collect();
    match paths.len() {
        0 => LOOKING_UP_FALLBACK.to_string(),
        1 => format!(
            "Looking up: {}",
            paths.first().expect("set with one element")
        ),
        _ => "Looking up: multiple files".to_string(),
    }
}

fn bulk_search_repository_status(params: &Map<String, Value>) -> String {
    let Some(decoded) = decode_params::<BulkSearchRepositoryParams>(params) else {
        return SEARCHING_FALLBACK.to_string();
    };
    match decoded.searches.as_slice() {
        [] => SEARCHING_FALLBACK.to_string(),
        [only] => format!("Searching: {}", only.search_term),
        [first, rest @ ..] => {
            format!("Searching: {} (and {} more)", first.search_term, rest.len())
        }
    }
}

fn read_file_lines_status(params: &Map<String, Value>) -> String {
    let Some(decoded) = decode_params::<ReadFileLinesParams>(params) else {
        return READING_FALLBACK.to_string();
    };
    let paths: BTreeSet<&str> = decoded
        .file_lines
        .iter()
        .map(|entry| entry.file_path.as_str())
        .collect();
    match paths.len() {
        0 => READING_FALLBACK.to_string(),
        1 => format!("Reading: {}", paths.first().expect("set with one element")),
        _ => "Reading: multiple files".to_string(),
    }
}

#[cfg(test)]
#[path = "../tests/unit/summary_tests.rs"]
mod tests;

use super::*;

use chrono::{TimeZone, Utc};
use serde_json::{Map, json};

use crate::models::{Subflow, SubflowStatus};
use crate::reconciler::{ActionEntry, SummaryEntry};
use crate::summary::SummaryText;

fn action(action_type: &str, status: ActionStatus, result: &str) -> FlowAction {
    FlowAction {
        id: "a-1".to_string(),
        flow_id: "flow-1".to_string(),
        subflow_id: None,
        workspace_id: "ws-1".to_string(),
        created: Utc.timestamp_opt(0, 0).single().expect("valid timestamp"),
        updated: Utc.timestamp_opt(1, 0).single().expect("valid timestamp"),
        action_type: action_type.to_string(),
        action_params: Map::new(),
        action_status: status,
        action_result: result.to_string(),
        is_human_action: false,
    }
}

fn with_params(mut flow_action: FlowAction, params: serde_json::Value) -> FlowAction {
    flow_action.action_params = match params {
        Value::Object(map) => map,
        _ => panic!("params must be an object"),
    };
    flow_action
}

fn action_entry(flow_action: FlowAction) -> ViewEntry {
    ViewEntry::Action(ActionEntry {
        action: flow_action,
    })
}

#[test]
fn default_entries_show_type_and_raw_result() {
    let display = entry_display(&action_entry(action(
        "other_type",
        ActionStatus::Complete,
        "all done",
    )));
    assert_eq!(display.headline, "other_type");
    assert_eq!(display.detail, vec!["all done".to_string()]);
    assert!(!display.in_progress);
}

#[test]
fn non_terminal_entries_are_in_progress() {
    let display = entry_display(&action_entry(action("other_type", ActionStatus::Started, "")));
    assert!(display.in_progress);
    assert!(display.detail.is_empty());
}

#[test]
fn completed_generate_results_show_extracted_content() {
    let display = entry_display(&action_entry(action(
        "generate.code",
        ActionStatus::Complete,
        r#"{"content": "fn main() {}"}"#,
    )));
    assert_eq!(display.detail, vec!["fn main() {}".to_string()]);
}

#[test]
fn generate_results_fall_back_to_raw_text() {
    let display = entry_display(&action_entry(action(
        "generate.code",
        ActionStatus::Complete,
        "not json at all",
    )));
    assert_eq!(display.detail, vec!["not json at all".to_string()]);

    // In-flight generations are shown raw even if they happen to be JSON.
    let display = entry_display(&action_entry(action(
        "generate.code",
        ActionStatus::Started,
        r#"{"content": "partial"}"#,
    )));
    assert_eq!(display.detail, vec![r#"{"content": "partial"}"#.to_string()]);
}

#[test]
fn pending_free_form_request_shows_content_and_hint() {
    let flow_action = with_params(
        action("user_request.free_form", ActionStatus::Pending, ""),
        json!({"requestKind": "free_form", "requestContent": "Which database?"}),
    );
    let display = entry_display(&action_entry(flow_action));
    assert_eq!(
        display.detail,
        vec![
            "Which database?".to_string(),
            "Awaiting your response...".to_string(),
        ]
    );
    assert!(display.in_progress);
}

#[test]
fn pending_approval_request_shows_button_texts() {
    let flow_action = with_params(
        action("user_request.approval", ActionStatus::Pending, ""),
        json!({
            "requestKind": "approval",
            "requestContent": "Apply the migration?",
            "approveButtonText": "Ship it",
            "rejectButtonText": "Hold off"
        }),
    );
    let display = entry_display(&action_entry(flow_action));
    assert_eq!(
        display.detail,
        vec![
            "Apply the migration?".to_string(),
            "Awaiting decision: Ship it / Hold off".to_string(),
        ]
    );
}

#[test]
fn pending_approval_request_uses_default_button_texts() {
    let flow_action = with_params(
        action("user_request.approval", ActionStatus::Pending, ""),
        json!({"requestKind": "approval", "requestContent": "Proceed?"}),
    );
    let display = entry_display(&action_entry(flow_action));
    assert_eq!(display.detail[1], "Awaiting decision: Approve / Reject");
}

#[test]
fn unknown_request_kinds_degrade_to_a_notice() {
    let flow_action = with_params(
        action("user_request.free_form", ActionStatus::Pending, ""),
        json!({"requestKind": "multiple_choice"}),
    );
    let display = entry_display(&action_entry(flow_action));
    assert_eq!(
        display.detail,
        vec!["Unsupported request kind: multiple_choice".to_string()]
    );

    let flow_action = action("user_request.free_form", ActionStatus::Pending, "");
    let display = entry_display(&action_entry(flow_action));
    assert_eq!(
        display.detail,
        vec!["Missing or invalid request kind.".to_string()]
    );
}

#[test]
fn completed_approval_shows_status_and_comments() {
    let flow_action = with_params(
        action(
            "user_request.approval",
            ActionStatus::Complete,
            r#"{"approved": true, "content": "Looks good"}"#,
        ),
        json!({"requestKind": "approval", "requestContent": "Apply the migration?"}),
    );
    let display = entry_display(&action_entry(flow_action));
    assert_eq!(
        display.detail,
        vec![
            "Original request: Apply the migration?".to_string(),
            "Status: Approved".to_string(),
            "Result: Looks good".to_string(),
        ]
    );
}

#[test]
fn completed_rejection_without_comments() {
    let flow_action = with_params(
        action(
            "user_request.approval",
            ActionStatus::Complete,
            r#"{"approved": false}"#,
        ),
        json!({"requestKind": "approval", "requestContent": "Apply the migration?"}),
    );
    let display = entry_display(&action_entry(flow_action));
    assert_eq!(
        display.detail,
        vec![
            "Original request: Apply the migration?".to_string(),
            "Status: Rejected".to_string(),
            "Result: No comments provided.".to_string(),
        ]
    );
}

#[test]
fn completed_free_form_without_content() {
    let flow_action = with_params(
        action("user_request.free_form", ActionStatus::Complete, r#"{}"#),
        json!({"requestKind": "free_form", "requestContent": "Which database?"}),
    );
    let display = entry_display(&action_entry(flow_action));
    assert_eq!(
        display.detail,
        vec![
            "Original request: Which database?".to_string(),
            "Result: No content submitted.".to_string(),
        ]
    );
}

#[test]
fn completed_request_with_empty_result() {
    let flow_action = with_params(
        action("user_request.free_form", ActionStatus::Complete, ""),
        json!({"requestKind": "free_form"}),
    );
    let display = entry_display(&action_entry(flow_action));
    assert_eq!(
        display.detail,
        vec![
            "Original request: No original request content available.".to_string(),
            "No action result available.".to_string(),
        ]
    );
}

#[test]
fn unparseable_request_results_are_shown_raw() {
    let flow_action = with_params(
        action(
            "user_request.free_form",
            ActionStatus::Complete,
            "plain words",
        ),
        json!({"requestKind": "free_form", "requestContent": "Which database?"}),
    );
    let display = entry_display(&action_entry(flow_action));
    assert_eq!(display.detail[1], "Result: plain words");
}

#[test]
fn summary_entries_map_straight_to_display() {
    let entry = ViewEntry::SubflowSummary(SummaryEntry {
        subflow_id: "sf-1".to_string(),
        text: SummaryText {
            primary: "Finding Relevant Code".to_string(),
            secondary: Some("Searching: foo".to_string()),
        },
    });
    let display = entry_display(&entry);
    assert_eq!(display.headline, "Finding Relevant Code");
    assert_eq!(display.detail, vec!["Searching: foo".to_string()]);
    assert!(display.in_progress);

    let entry = ViewEntry::SubflowSummary(SummaryEntry {
        subflow_id: "sf-1".to_string(),
        text: SummaryText {
            primary: "Found Relevant Code".to_string(),
            secondary: None,
        },
    });
    let display = entry_display(&entry);
    assert!(display.detail.is_empty());
    assert!(!display.in_progress);
}

#[test]
fn task_view_report_captures_sections_and_entries() {
    let mut view = TaskView::new();
    let coding = Subflow {
        workspace_id: "ws-1".to_string(),
        id: "sf-coding".to_string(),
        name: "Coding".to_string(),
        subflow_type: "coding".to_string(),
        description: None,
        status: SubflowStatus::Started,
        parent_subflow_id: None,
        flow_id: "flow-1".to_string(),
        result: None,
    };
    let mut coding_action = action("other_type", ActionStatus::Complete, "wrote code");
    coding_action.subflow_id = Some("sf-coding".to_string());
    view.handle_action(coding_action, Some(coding));

    let report = task_view_report(&view);
    let value = serde_json::to_value(&report).expect("report should encode");
    assert_eq!(value["sections"][0]["id"], json!("coding"));
    assert_eq!(value["sections"][0]["title"], json!("Coding"));
    let entry = &value["sections"][0]["entries"][0];
    assert_eq!(entry["kind"], json!("action"));
    assert_eq!(entry["key"], json!("a-1"));
    assert_eq!(entry["headline"], json!("other_type"));
    assert_eq!(entry["detail"], json!(["wrote code"]));
    assert_eq!(entry["in_progress"], json!(false));
}

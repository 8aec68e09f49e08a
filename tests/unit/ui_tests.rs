use super::*;

use chrono::{TimeZone, Utc};
use serde_json::Map;

use crate::feed::FeedEvent;
use crate::models::{ActionStatus, FlowAction, FlowEvent, Subflow, SubflowStatus};

fn screen() -> Rect {
    Rect::new(0, 0, 100, 40)
}

fn app_with_actions(count: usize) -> App {
    let mut app = App::default();
    for index in 0..count {
        let action = FlowAction {
            id: format!("a-{index}"),
            flow_id: "flow-1".to_string(),
            subflow_id: Some("sf-coding".to_string()),
            workspace_id: "ws-1".to_string(),
            created: Utc.timestamp_opt(0, 0).single().expect("valid timestamp"),
            updated: Utc.timestamp_opt(1, 0).single().expect("valid timestamp"),
            action_type: format!("step_{index}"),
            action_params: Map::new(),
            action_status: ActionStatus::Complete,
            action_result: "done".to_string(),
            is_human_action: false,
        };
        let subflow = Subflow {
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
        app.apply_feed_event(FeedEvent::Flow(FlowEvent::ActionChanged {
            flow_action: action,
            subflow: Some(subflow),
        }));
    }
    app
}

#[test]
fn hit_test_finds_both_panes() {
    assert_eq!(pane_hit_test(screen(), 10, 5), Some(Pane::Log));
    assert_eq!(pane_hit_test(screen(), 70, 5), Some(Pane::Execution));
}

#[test]
fn hit_test_misses_the_status_bar() {
    assert_eq!(pane_hit_test(screen(), 10, 38), None);
}

#[test]
fn max_scroll_is_zero_when_content_fits() {
    let app = App::default();
    assert_eq!(log_max_scroll(screen(), &app), 0);
    assert_eq!(execution_max_scroll(screen(), &app), 0);
}

#[test]
fn execution_max_scroll_grows_with_content() {
    let app = app_with_actions(40);
    let small_screen = Rect::new(0, 0, 60, 12);

    let (_, execution, _) = pane_areas(small_screen);
    let content = pane_content_area(execution);
    let total_lines = app.execution_lines(content_text_width(content)).len() as u16;
    let visible_lines = content.height - 2;

    assert_eq!(
        execution_max_scroll(small_screen, &app),
        total_lines - visible_lines
    );
    assert!(execution_max_scroll(small_screen, &app) > 0);
}

#[test]
fn active_pane_max_scroll_tracks_focus() {
    let mut app = app_with_actions(40);
    let small_screen = Rect::new(0, 0, 60, 12);

    app.set_active_pane(Pane::Execution);
    assert_eq!(
        active_pane_max_scroll(small_screen, &app),
        execution_max_scroll(small_screen, &app)
    );

    app.set_active_pane(Pane::Log);
    assert_eq!(
        active_pane_max_scroll(small_screen, &app),
        log_max_scroll(small_screen, &app)
    );
}

#[test]
fn degenerate_screens_do_not_underflow() {
    let app = app_with_actions(10);
    let tiny = Rect::new(0, 0, 3, 2);
    assert_eq!(execution_max_scroll(tiny, &app), 0);
    assert_eq!(log_max_scroll(tiny, &app), 0);
}

#[test]
fn status_line_mentions_feed_end() {
    let mut app = App::default();
    app.apply_feed_event(FeedEvent::Finished);
    assert!(status_line_text(&app).starts_with("Feed ended"));
}

#[test]
fn status_line_includes_progress_text() {
    let mut app = App::default();
    app.apply_feed_event(FeedEvent::Flow(FlowEvent::ProgressText {
        text: "Summarizing changes".to_string(),
        parent_id: "flow-1".to_string(),
    }));
    assert!(status_line_text(&app).starts_with("Summarizing changes"));
}

#[test]
fn status_line_shows_working_indicator_while_in_progress() {
    let mut app = App::default();
    let action = FlowAction {
        id: "a-1".to_string(),
        flow_id: "flow-1".to_string(),
        subflow_id: None,
        workspace_id: "ws-1".to_string(),
        created: Utc.timestamp_opt(0, 0).single().expect("valid timestamp"),
        updated: Utc.timestamp_opt(1, 0).single().expect("valid timestamp"),
        action_type: "other_type".to_string(),
        action_params: Map::new(),
        action_status: ActionStatus::Started,
        action_result: String::new(),
        is_human_action: false,
    };
    app.apply_feed_event(FeedEvent::Flow(FlowEvent::ActionChanged {
        flow_action: action,
        subflow: None,
    }));

    assert!(status_line_text(&app).starts_with("Working"));
}

#[test]
fn working_dots_cycle_over_ticks() {
    assert_eq!(working_dots(0), "");
    assert_eq!(working_dots(15), ".");
    assert_eq!(working_dots(30), "..");
    assert_eq!(working_dots(45), "...");
    assert_eq!(working_dots(60), "");
}

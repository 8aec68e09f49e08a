use crate::display;
use crate::feed::FeedEvent;
use crate::models::FlowEvent;
use crate::sections::TaskView;
use crate::text_layout::wrap_word;

const MAX_LOG_LINES: usize = 2000;
const DETAIL_INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Log,
    Execution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionLineKind {
    Blank,
    SectionTitle,
    Headline,
    Detail,
    ActiveDetail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionLine {
    pub kind: ExecutionLineKind,
    pub text: String,
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub ticks: u64,
    pub active_pane: Pane,
    log_lines: Vec<String>,
    log_scroll: u16,
    execution_scroll: u16,
    follow_latest: bool,
    task_view: TaskView,
    progress_text: Option<String>,
    feed_finished: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            running: true,
            ticks: 0,
            active_pane: Pane::Execution,
            log_lines: vec![
                "Flow activity appears here as events arrive.".to_string(),
                "Press f to toggle follow, Tab to switch panes, q to quit.".to_string(),
            ],
            log_scroll: 0,
            execution_scroll: 0,
            follow_latest: true,
            task_view: TaskView::new(),
            progress_text: None,
            feed_finished: false,
        }
    }
}

impl App {
    pub fn on_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn next_pane(&mut self) {
        self.active_pane = match self.active_pane {
            Pane::Log => Pane::Execution,
            Pane::Execution => Pane::Log,
        };
    }

    pub fn prev_pane(&mut self) {
        // Two panes, so the cycle is its own inverse.
        self.next_pane();
    }

    pub fn set_active_pane(&mut self, pane: Pane) {
        self.active_pane = pane;
    }

    pub fn task_view(&self) -> &TaskView {
        &self.task_view
    }

    pub fn log_scroll(&self) -> u16 {
        self.log_scroll
    }

    pub fn execution_scroll(&self) -> u16 {
        self.execution_scroll
    }

    pub fn follow_latest(&self) -> bool {
        self.follow_latest
    }

    pub fn toggle_follow(&mut self) {
        self.follow_latest = !self.follow_latest;
    }

    pub fn progress_text(&self) -> Option<&str> {
        self.progress_text.as_deref()
    }

    pub fn feed_finished(&self) -> bool {
        self.feed_finished
    }

    pub fn scroll_active_up(&mut self, lines: u16) {
        match self.active_pane {
            Pane::Log => self.log_scroll = self.log_scroll.saturating_sub(lines),
            Pane::Execution => {
                self.execution_scroll = self.execution_scroll.saturating_sub(lines);
                self.follow_latest = false;
            }
        }
    }

    pub fn scroll_active_down(&mut self, lines: u16, max_scroll: u16) {
        match self.active_pane {
            Pane::Log => {
                self.log_scroll = self.log_scroll.saturating_add(lines).min(max_scroll);
            }
            Pane::Execution => {
                self.execution_scroll = self.execution_scroll.saturating_add(lines).min(max_scroll);
                // Reaching the bottom re-engages follow mode.
                self.follow_latest = self.execution_scroll >= max_scroll;
            }
        }
    }

    pub fn set_execution_scroll(&mut self, scroll: u16) {
        self.execution_scroll = scroll;
    }

    pub fn apply_feed_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Flow(FlowEvent::ActionChanged {
                flow_action,
                subflow,
            }) => {
                self.push_log(format!(
                    "action {} {} [{}]",
                    flow_action.action_type,
                    flow_action.id,
                    flow_action.action_status.label()
                ));
                self.task_view.handle_action(flow_action, subflow);
            }
            FeedEvent::Flow(FlowEvent::SubflowChanged { subflow }) => {
                self.push_log(format!(
                    "subflow {} [{}]",
                    subflow.name,
                    subflow.status.label()
                ));
                self.task_view.handle_subflow_update(subflow);
            }
            FeedEvent::Flow(FlowEvent::ProgressText { text, .. }) => {
                self.progress_text = Some(text);
            }
            FeedEvent::Flow(FlowEvent::EndStream { parent_id }) => {
                self.push_log(format!("stream ended for {parent_id}"));
            }
            FeedEvent::Malformed { line_number, error } => {
                self.push_log(format!("Malformed feed line {line_number}: {error}"));
            }
            FeedEvent::System(message) => {
                self.push_log(message);
            }
            FeedEvent::Finished => {
                self.feed_finished = true;
                self.progress_text = None;
                self.push_log("Feed ended.".to_string());
            }
        }
    }

    pub fn log_display_lines(&self, width: u16) -> Vec<String> {
        self.log_lines
            .iter()
            .flat_map(|line| wrap_word(line, width))
            .collect()
    }

    pub fn has_in_progress_entries(&self) -> bool {
        self.task_view.sections().iter().any(|section| {
            section
                .view
                .entries()
                .iter()
                .any(|entry| display::entry_display(entry).in_progress)
        })
    }

    /// Flattens the sectioned execution view into display lines for the
    /// right pane. The same builder backs rendering and scroll clamping so
    /// the two can never disagree on line counts.
    pub fn execution_lines(&self, width: u16) -> Vec<ExecutionLine> {
        let width = width.max(1);
        let mut lines = Vec::new();
        for section in self.task_view.sections() {
            if !lines.is_empty() {
                lines.push(ExecutionLine {
                    kind: ExecutionLineKind::Blank,
                    text: String::new(),
                });
            }
            for wrapped in wrap_word(&self.task_view.section_title(&section.id), width) {
                lines.push(ExecutionLine {
                    kind: ExecutionLineKind::SectionTitle,
                    text: wrapped,
                });
            }
            for entry in section.view.entries() {
                let entry_display = display::entry_display(entry);
                for wrapped in wrap_word(&entry_display.headline, width) {
                    lines.push(ExecutionLine {
                        kind: ExecutionLineKind::Headline,
                        text: wrapped,
                    });
                }
                let detail_kind = if entry_display.in_progress {
                    ExecutionLineKind::ActiveDetail
                } else {
                    ExecutionLineKind::Detail
                };
                let detail_width = width.saturating_sub(DETAIL_INDENT.len() as u16).max(1);
                for detail in &entry_display.detail {
                    for wrapped in wrap_word(detail, detail_width) {
                        lines.push(ExecutionLine {
                            kind: detail_kind,
                            text: format!("{DETAIL_INDENT}{wrapped}"),
                        });
                    }
                }
            }
        }
        if lines.is_empty() {
            lines.push(ExecutionLine {
                kind: ExecutionLineKind::Detail,
                text: "Waiting for flow activity...".to_string(),
            });
        }
        lines
    }

    fn push_log(&mut self, line: String) {
        self.log_lines.push(line);
        if self.log_lines.len() > MAX_LOG_LINES {
            let excess = self.log_lines.len() - MAX_LOG_LINES;
            self.log_lines.drain(0..excess);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/app_tests.rs"]
mod tests;

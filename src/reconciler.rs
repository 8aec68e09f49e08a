use std::collections::HashMap;

use crate::models::{FlowAction, Subflow};
use crate::summary::{self, SummaryText};

/// Subflow types that collapse into a single rolling status line instead of
/// one view-entry per action.
pub const SUMMARIZED_SUBFLOW_TYPES: &[&str] = &["code_context"];

pub fn is_summarized(subflow_type: &str) -> bool {
    SUMMARIZED_SUBFLOW_TYPES.contains(&subflow_type)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey {
    Action(String),
    Subflow(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEntry {
    Action(ActionEntry),
    SubflowSummary(SummaryEntry),
}

impl ViewEntry {
    pub fn key(&self) -> EntryKey {
        match self {
            ViewEntry::Action(entry) => EntryKey::Action(entry.action.id.clone()),
            ViewEntry::SubflowSummary(entry) => EntryKey::Subflow(entry.subflow_id.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionEntry {
    pub action: FlowAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryEntry {
    pub subflow_id: String,
    pub text: SummaryText,
}

#[derive(Debug, Clone)]
struct CodeContextSubflowState {
    subflow: Subflow,
    latest_non_terminal_action: Option<FlowAction>,
}

/// Reconciles a stream of flow-action and subflow updates into an ordered
/// list of view-entries. Each distinct key (action id, or subflow id for
/// summarized subflows) maps to at most one entry; entries keep the order
/// their key was first seen and are never removed.
#[derive(Debug, Default)]
pub struct ExecutionView {
    entries: Vec<ViewEntry>,
    index: HashMap<EntryKey, usize>,
    summary_states: HashMap<String, CodeContextSubflowState>,
}

impl ExecutionView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ViewEntry] {
        &self.entries
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, key: &EntryKey) -> bool {
        self.index.contains_key(key)
    }

    #[cfg(test)]
    pub fn has_summary_state(&self, subflow_id: &str) -> bool {
        self.summary_states.contains_key(subflow_id)
    }

    pub fn process_action(&mut self, action: FlowAction, subflow: Option<&Subflow>) {
        match subflow {
            Some(subflow) if is_summarized(&subflow.subflow_type) => {
                self.process_summarized(action, subflow);
            }
            _ => self.process_action_entry(action),
        }
    }

    /// Applies a subflow-status-only update. Only summarized subflows are
    /// affected: an existing summary entry is re-rendered with the tracked
    /// action unchanged; creating state here never creates a view-entry, so
    /// no empty summary shows up before the first action is observed.
    pub fn update_subflow(&mut self, subflow: Subflow) {
        if !is_summarized(&subflow.subflow_type) {
            return;
        }
        let subflow_id = subflow.id.clone();
        let state = self
            .summary_states
            .entry(subflow_id.clone())
            .and_modify(|state| state.subflow = subflow.clone())
            .or_insert_with(|| CodeContextSubflowState {
                subflow,
                latest_non_terminal_action: None,
            });
        let text = summary::render(state.latest_non_terminal_action.as_ref(), &state.subflow);
        if self.index.contains_key(&EntryKey::Subflow(subflow_id.clone())) {
            self.upsert_summary_entry(&subflow_id, text);
        }
    }

    fn process_action_entry(&mut self, action: FlowAction) {
        let key = EntryKey::Action(action.id.clone());
        match self.index.get(&key) {
            Some(&slot) => {
                if let ViewEntry::Action(entry) = &mut self.entries[slot] {
                    entry.action = action;
                }
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(ViewEntry::Action(ActionEntry { action }));
            }
        }
    }

    fn process_summarized(&mut self, action: FlowAction, subflow: &Subflow) {
        let state = self
            .summary_states
            .entry(subflow.id.clone())
            .and_modify(|state| state.subflow = subflow.clone())
            .or_insert_with(|| CodeContextSubflowState {
                subflow: subflow.clone(),
                latest_non_terminal_action: None,
            });

        if action.action_status.is_non_terminal() {
            let newer = state
                .latest_non_terminal_action
                .as_ref()
                .is_none_or(|current| action.updated > current.updated);
            if newer {
                state.latest_non_terminal_action = Some(action);
            }
        } else if state
            .latest_non_terminal_action
            .as_ref()
            .is_some_and(|current| current.id == action.id)
        {
            // The tracked action just reached a terminal status. Older
            // non-terminal actions for the same subflow do not resurrect it.
            state.latest_non_terminal_action = None;
        }

        let text = summary::render(state.latest_non_terminal_action.as_ref(), &state.subflow);
        self.upsert_summary_entry(&subflow.id, text);
    }

    fn upsert_summary_entry(&mut self, subflow_id: &str, text: SummaryText) {
        let key = EntryKey::Subflow(subflow_id.to_string());
        match self.index.get(&key) {
            Some(&slot) => {
                if let ViewEntry::SubflowSummary(entry) = &mut self.entries[slot] {
                    entry.text = text;
                }
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(ViewEntry::SubflowSummary(SummaryEntry {
                    subflow_id: subflow_id.to_string(),
                    text,
                }));
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/reconciler_tests.rs"]
mod tests;

use std::collections::{HashMap, HashSet};

use crate::models::{FlowAction, Subflow};
use crate::reconciler::ExecutionView;

pub const SECTION_REQUIREMENTS_PLANNING: &str = "requirements-planning";
pub const SECTION_CODING: &str = "coding";
pub const SECTION_UNCATEGORIZED: &str = "uncategorized";

const TYPE_DEV_REQUIREMENTS: &str = "dev_requirements";
const TYPE_DEV_PLAN: &str = "dev_plan";
const TYPE_LLM_STEP: &str = "llm_step";
const TYPE_CODING: &str = "coding";
const TYPE_PASS_TESTS: &str = "pass_tests";

/// Local cache of every subflow seen on the feed, used to resolve a
/// subflow's primary ancestor without any backend round-trip.
#[derive(Debug, Default)]
pub struct SubflowCatalog {
    subflows: HashMap<String, Subflow>,
}

impl SubflowCatalog {
    pub fn insert(&mut self, subflow: &Subflow) {
        self.subflows.insert(subflow.id.clone(), subflow.clone());
    }

    pub fn get(&self, id: &str) -> Option<&Subflow> {
        self.subflows.get(id)
    }

    /// Nearest ancestor (self included) whose type drives sectioning.
    /// Missing parents and parent cycles end the walk.
    pub fn find_primary(&self, subflow: &Subflow) -> Option<Subflow> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = subflow;
        loop {
            if is_primary_type(&current.subflow_type) {
                return Some(current.clone());
            }
            let parent_id = current.parent_subflow_id.as_deref()?;
            if !visited.insert(parent_id) {
                tracing::warn!(subflow_id = %subflow.id, "subflow parent cycle detected");
                return None;
            }
            match self.get(parent_id) {
                Some(parent) => current = parent,
                None => {
                    tracing::warn!(%parent_id, "parent subflow not in catalog");
                    return None;
                }
            }
        }
    }
}

fn is_primary_type(subflow_type: &str) -> bool {
    matches!(
        subflow_type,
        TYPE_DEV_REQUIREMENTS | TYPE_DEV_PLAN | TYPE_LLM_STEP | TYPE_CODING | TYPE_PASS_TESTS
    )
}

#[derive(Debug)]
pub struct Section {
    pub id: String,
    pub view: ExecutionView,
}

/// Groups the flow's execution into titled sections, one `ExecutionView`
/// each, in the order their section id was first seen.
#[derive(Debug, Default)]
pub struct TaskView {
    sections: Vec<Section>,
    index: HashMap<String, usize>,
    catalog: SubflowCatalog,
    has_requirements_subflow: bool,
    has_planning_subflow: bool,
}

impl TaskView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[cfg(test)]
    pub fn catalog(&self) -> &SubflowCatalog {
        &self.catalog
    }

    pub fn handle_action(&mut self, action: FlowAction, subflow: Option<Subflow>) {
        let Some(subflow) = subflow else {
            return self.handle_unsectioned_action(action);
        };
        self.observe_subflow(&subflow);
        let section_id = self.determine_section_id(&subflow);
        let slot = self.ensure_section(&section_id);
        self.sections[slot].view.process_action(action, Some(&subflow));
    }

    /// Subflow-status-only update. Routes to the section that already holds
    /// the subflow, if any; it never creates a visible section on its own.
    pub fn handle_subflow_update(&mut self, subflow: Subflow) {
        self.observe_subflow(&subflow);
        let section_id = self.determine_section_id(&subflow);
        if let Some(&slot) = self.index.get(&section_id) {
            self.sections[slot].view.update_subflow(subflow);
        } else {
            tracing::debug!(subflow_id = %subflow.id, "subflow update before any action; catalog only");
        }
    }

    pub fn section_title(&self, section_id: &str) -> String {
        match section_id {
            SECTION_REQUIREMENTS_PLANNING => {
                match (self.has_requirements_subflow, self.has_planning_subflow) {
                    (true, true) => "Requirements and Planning".to_string(),
                    (true, false) => "Requirements".to_string(),
                    (false, true) => "Planning".to_string(),
                    (false, false) => "Requirements/Planning".to_string(),
                }
            }
            SECTION_CODING => "Coding".to_string(),
            SECTION_UNCATEGORIZED => "Unknown".to_string(),
            other => other.to_string(),
        }
    }

    pub fn determine_section_id(&self, subflow: &Subflow) -> String {
        match self.catalog.find_primary(subflow) {
            Some(primary) => match primary.subflow_type.as_str() {
                TYPE_DEV_REQUIREMENTS | TYPE_DEV_PLAN => SECTION_REQUIREMENTS_PLANNING.to_string(),
                TYPE_LLM_STEP | TYPE_PASS_TESTS => primary.name.clone(),
                TYPE_CODING => SECTION_CODING.to_string(),
                _ => SECTION_UNCATEGORIZED.to_string(),
            },
            None => SECTION_UNCATEGORIZED.to_string(),
        }
    }

    // Actions without a subflow attach to the most recent section, unless it
    // is the requirements/planning section or no section exists yet.
    fn handle_unsectioned_action(&mut self, action: FlowAction) {
        let reuse_last = self
            .sections
            .last()
            .is_some_and(|section| section.id != SECTION_REQUIREMENTS_PLANNING);
        let slot = if reuse_last {
            self.sections.len() - 1
        } else {
            self.ensure_section(SECTION_UNCATEGORIZED)
        };
        self.sections[slot].view.process_action(action, None);
    }

    fn observe_subflow(&mut self, subflow: &Subflow) {
        self.catalog.insert(subflow);
        match subflow.subflow_type.as_str() {
            TYPE_DEV_REQUIREMENTS => self.has_requirements_subflow = true,
            TYPE_DEV_PLAN => self.has_planning_subflow = true,
            _ => {}
        }
    }

    fn ensure_section(&mut self, section_id: &str) -> usize {
        if let Some(&slot) = self.index.get(section_id) {
            return slot;
        }
        let slot = self.sections.len();
        self.sections.push(Section {
            id: section_id.to_string(),
            view: ExecutionView::new(),
        });
        self.index.insert(section_id.to_string(), slot);
        slot
    }
}

#[cfg(test)]
#[path = "../tests/unit/sections_tests.rs"]
mod tests;

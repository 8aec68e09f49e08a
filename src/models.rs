use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Started,
    Complete,
    Failed,
}

impl ActionStatus {
    pub fn is_non_terminal(self) -> bool {
        matches!(self, ActionStatus::Pending | ActionStatus::Started)
    }

    pub fn label(self) -> &'static str {
        match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Started => "started",
            ActionStatus::Complete => "complete",
            ActionStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubflowStatus {
    InProgress,
    Started,
    Complete,
    Failed,
}

impl SubflowStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SubflowStatus::Complete | SubflowStatus::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            SubflowStatus::InProgress => "in_progress",
            SubflowStatus::Started => "started",
            SubflowStatus::Complete => "complete",
            SubflowStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowAction {
    pub id: String,
    pub flow_id: String,
    #[serde(default)]
    pub subflow_id: Option<String>,
    pub workspace_id: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub action_type: String,
    #[serde(default)]
    pub action_params: Map<String, Value>,
    pub action_status: ActionStatus,
    #[serde(default)]
    pub action_result: String,
    #[serde(default)]
    pub is_human_action: bool,
}

impl FlowAction {
    pub fn kind(&self) -> ActionKind {
        ActionKind::of(&self.action_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subflow {
    pub workspace_id: String,
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub subflow_type: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: SubflowStatus,
    #[serde(default)]
    pub parent_subflow_id: Option<String>,
    pub flow_id: String,
    #[serde(default)]
    pub result: Option<String>,
}

/// Classification of `action_type` strings. All wire-format sniffing lives
/// here so renderers can match on a closed set of kinds instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    ToolCall(String),
    UserRequest,
    Generate,
    Other,
}

impl ActionKind {
    pub fn of(action_type: &str) -> Self {
        if let Some(tool) = action_type.strip_prefix("tool_call.") {
            return ActionKind::ToolCall(tool.to_string());
        }
        if action_type.starts_with("user_request") {
            return ActionKind::UserRequest;
        }
        if action_type.starts_with("generate.") {
            return ActionKind::Generate;
        }
        ActionKind::Other
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType", rename_all = "snake_case")]
pub enum FlowEvent {
    #[serde(rename_all = "camelCase")]
    ActionChanged {
        flow_action: FlowAction,
        #[serde(default)]
        subflow: Option<Subflow>,
    },
    #[serde(rename_all = "camelCase")]
    SubflowChanged { subflow: Subflow },
    #[serde(rename_all = "camelCase")]
    ProgressText { text: String, parent_id: String },
    #[serde(rename_all = "camelCase")]
    EndStream { parent_id: String },
}

#[cfg(test)]
#[path = "../tests/unit/models_tests.rs"]
mod tests;

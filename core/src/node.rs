//! LogicalNode - the folded state of one history group.
//!
//! A node is what the timeline renders: one row per step (or per function
//! execution), regardless of how many raw events and retries produced it.

use crate::event::{CancelPayload, GroupId, StepType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeScope {
    Function,
    Step,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Scheduled,
    Started,
    Running,
    Sleeping,
    Waiting,
    Completed,
    Failed,
    Errored,
    Cancelled,
}

impl NodeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NodeStatus::Completed | NodeStatus::Failed | NodeStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepConfig {
    pub until: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForEventConfig {
    pub event_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    pub timeout: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForEventResult {
    pub event_id: Option<String>,
    pub timed_out: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeFunctionConfig {
    pub event_id: String,
    pub function_id: String,
    pub correlation_id: String,
    pub timeout: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeFunctionResult {
    pub event_id: Option<String>,
    pub run_id: Option<String>,
    pub timed_out: bool,
}

/// Who or what cancelled the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cancellation {
    pub event_id: Option<String>,
    pub expression: Option<String>,
    pub user_id: Option<String>,
}

impl From<&CancelPayload> for Cancellation {
    fn from(cancel: &CancelPayload) -> Self {
        Self {
            event_id: cancel.event_id.clone(),
            expression: cancel.expression.clone(),
            user_id: cancel.user_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalNode {
    pub group_id: GroupId,
    /// Unset while the group has only produced events that don't reveal its scope.
    pub scope: Option<NodeScope>,
    pub status: NodeStatus,
    pub attempt: u32,
    pub name: Option<String>,
    pub url: Option<String>,
    pub step_type: Option<StepType>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub sleep_config: Option<SleepConfig>,
    pub wait_for_event_config: Option<WaitForEventConfig>,
    pub wait_for_event_result: Option<WaitForEventResult>,
    pub invoke_function_config: Option<InvokeFunctionConfig>,
    pub invoke_function_result: Option<InvokeFunctionResult>,
    pub cancellation: Option<Cancellation>,
    /// History item whose payload holds this node's output or error.
    pub output_item_id: Option<String>,
}

impl LogicalNode {
    /// Node for a group seen for the first time.
    pub fn new(group_id: impl Into<GroupId>, attempt: u32) -> Self {
        Self {
            group_id: group_id.into(),
            scope: None,
            status: NodeStatus::Scheduled,
            attempt,
            name: None,
            url: None,
            step_type: None,
            scheduled_at: None,
            started_at: None,
            ended_at: None,
            sleep_config: None,
            wait_for_event_config: None,
            wait_for_event_result: None,
            invoke_function_config: None,
            invoke_function_result: None,
            cancellation: None,
            output_item_id: None,
        }
    }

    pub fn is_function(&self) -> bool {
        self.scope == Some(NodeScope::Function)
    }

    pub fn is_step(&self) -> bool {
        self.scope == Some(NodeScope::Step)
    }
}

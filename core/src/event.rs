use crate::error::HistoryResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

pub type GroupId = String;

/// Closed set of lifecycle transitions recorded in a run's history.
///
/// Wire names are the backend's history type tags. Anything else fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryEventKind {
    FunctionScheduled,
    FunctionStarted,
    FunctionCompleted,
    FunctionFailed,
    FunctionCancelled,
    FunctionStatusUpdated,
    StepScheduled,
    StepStarted,
    StepCompleted,
    StepFailed,
    StepErrored,
    StepSleeping,
    StepWaiting,
    StepInvoking,
    #[serde(rename = "None")]
    NoOp,
}

impl HistoryEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryEventKind::FunctionScheduled => "function.scheduled",
            HistoryEventKind::FunctionStarted => "function.started",
            HistoryEventKind::FunctionCompleted => "function.completed",
            HistoryEventKind::FunctionFailed => "function.failed",
            HistoryEventKind::FunctionCancelled => "function.cancelled",
            HistoryEventKind::FunctionStatusUpdated => "function.status-updated",
            HistoryEventKind::StepScheduled => "step.scheduled",
            HistoryEventKind::StepStarted => "step.started",
            HistoryEventKind::StepCompleted => "step.completed",
            HistoryEventKind::StepFailed => "step.failed",
            HistoryEventKind::StepErrored => "step.errored",
            HistoryEventKind::StepSleeping => "step.sleeping",
            HistoryEventKind::StepWaiting => "step.waiting",
            HistoryEventKind::StepInvoking => "step.invoking",
            HistoryEventKind::NoOp => "none",
        }
    }
}

impl fmt::Display for HistoryEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of SDK operation a step is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepType {
    Run,
    Send,
    Sleep,
    Wait,
    Invoke,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepPayload {
    pub until: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForEventPayload {
    pub event_name: String,
    #[serde(default)]
    pub expression: Option<String>,
    pub timeout: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitResultPayload {
    #[serde(rename = "eventID", default)]
    pub event_id: Option<String>,
    /// True when the wait ended because its timeout elapsed.
    pub timeout: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeFunctionPayload {
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(rename = "functionID")]
    pub function_id: String,
    #[serde(rename = "correlationID")]
    pub correlation_id: String,
    pub timeout: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeFunctionResultPayload {
    #[serde(rename = "eventID", default)]
    pub event_id: Option<String>,
    #[serde(rename = "runID", default)]
    pub run_id: Option<String>,
    pub timeout: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelPayload {
    #[serde(rename = "eventID", default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(rename = "userID", default)]
    pub user_id: Option<String>,
}

/// One immutable entry of a run's history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHistoryEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: HistoryEventKind,
    #[serde(rename = "groupID")]
    pub group_id: GroupId,
    pub attempt: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_type: Option<StepType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep: Option<SleepPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for_event: Option<WaitForEventPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_result: Option<WaitResultPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoke_function: Option<InvokeFunctionPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoke_function_result: Option<InvokeFunctionResultPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel: Option<CancelPayload>,
}

impl RawHistoryEvent {
    /// Bare event with no payload; fields are filled in with the `with_*` builders.
    pub fn new(
        id: impl Into<String>,
        kind: HistoryEventKind,
        group_id: impl Into<GroupId>,
        attempt: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            group_id: group_id.into(),
            attempt,
            created_at,
            function_version: None,
            step_name: None,
            step_type: None,
            url: None,
            sleep: None,
            wait_for_event: None,
            wait_result: None,
            invoke_function: None,
            invoke_function_result: None,
            cancel: None,
        }
    }

    pub fn with_step_name(mut self, name: impl Into<String>) -> Self {
        self.step_name = Some(name.into());
        self
    }

    pub fn with_step_type(mut self, step_type: StepType) -> Self {
        self.step_type = Some(step_type);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_sleep(mut self, until: DateTime<Utc>) -> Self {
        self.sleep = Some(SleepPayload { until });
        self
    }

    pub fn with_wait_for_event(mut self, wait: WaitForEventPayload) -> Self {
        self.wait_for_event = Some(wait);
        self
    }

    pub fn with_wait_result(mut self, event_id: Option<String>, timeout: bool) -> Self {
        self.wait_result = Some(WaitResultPayload { event_id, timeout });
        self
    }

    pub fn with_invoke_function(mut self, invoke: InvokeFunctionPayload) -> Self {
        self.invoke_function = Some(invoke);
        self
    }

    pub fn with_invoke_function_result(mut self, result: InvokeFunctionResultPayload) -> Self {
        self.invoke_function_result = Some(result);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelPayload) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Decode a JSON array of history items as returned by the backend.
pub fn decode_history(raw: &str) -> HistoryResult<Vec<RawHistoryEvent>> {
    Ok(serde_json::from_str(raw)?)
}

/// Represents a source of history events (e.g. a polling query or a push subscription).
#[async_trait]
pub trait HistorySource: Send {
    /// Returns the next event in delivery order, or None once the source is exhausted.
    async fn next_event(&mut self) -> Option<RawHistoryEvent>;
}

/// In-memory source over an already fetched history.
#[derive(Debug, Default)]
pub struct VecSource {
    events: VecDeque<RawHistoryEvent>,
}

impl VecSource {
    pub fn new(events: impl IntoIterator<Item = RawHistoryEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl HistorySource for VecSource {
    async fn next_event(&mut self) -> Option<RawHistoryEvent> {
        self.events.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HistoryError;

    #[test]
    fn test_decode_backend_item() {
        let raw = r#"[{
            "id": "01HB0000000000000000000001",
            "type": "StepWaiting",
            "groupID": "g-1",
            "attempt": 0,
            "createdAt": "2023-09-01T10:00:00Z",
            "functionVersion": 3,
            "stepName": "wait-for-bar",
            "waitForEvent": {
                "eventName": "bar",
                "expression": "async.data.id == event.data.id",
                "timeout": "2023-09-02T10:00:00Z"
            }
        }]"#;

        let events = decode_history(raw).unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.kind, HistoryEventKind::StepWaiting);
        assert_eq!(event.group_id, "g-1");
        assert_eq!(event.function_version, Some(3));
        let wait = event.wait_for_event.as_ref().unwrap();
        assert_eq!(wait.event_name, "bar");
        assert_eq!(
            wait.expression.as_deref(),
            Some("async.data.id == event.data.id")
        );
    }

    #[test]
    fn test_decode_none_and_result_payloads() {
        let raw = r#"[
            {"id": "a", "type": "None", "groupID": "g", "attempt": 0, "createdAt": "2023-09-01T10:00:00Z"},
            {"id": "b", "type": "StepCompleted", "groupID": "g", "attempt": 1,
             "createdAt": "2023-09-01T10:00:01Z", "waitResult": {"eventID": null, "timeout": true}}
        ]"#;

        let events = decode_history(raw).unwrap();
        assert_eq!(events[0].kind, HistoryEventKind::NoOp);
        let result = events[1].wait_result.as_ref().unwrap();
        assert_eq!(result.event_id, None);
        assert!(result.timeout);
    }

    #[test]
    fn test_unknown_tag_fails_decoding() {
        let raw = r#"[{"id": "a", "type": "StepTeleported", "groupID": "g", "attempt": 0,
                       "createdAt": "2023-09-01T10:00:00Z"}]"#;
        let err = decode_history(raw).unwrap_err();
        assert!(matches!(err, HistoryError::Decode(_)));
    }

    #[test]
    fn test_kind_display_uses_dotted_names() {
        assert_eq!(HistoryEventKind::FunctionCancelled.to_string(), "function.cancelled");
        assert_eq!(HistoryEventKind::NoOp.to_string(), "none");
    }

    #[tokio::test]
    async fn test_vec_source_yields_in_order() {
        let now = Utc::now();
        let mut source = VecSource::new(vec![
            RawHistoryEvent::new("1", HistoryEventKind::FunctionScheduled, "fn", 0, now),
            RawHistoryEvent::new("2", HistoryEventKind::FunctionStarted, "fn", 0, now),
        ]);

        assert_eq!(source.remaining(), 2);
        assert_eq!(source.next_event().await.unwrap().id, "1");
        assert_eq!(source.next_event().await.unwrap().id, "2");
        assert!(source.next_event().await.is_none());
    }
}

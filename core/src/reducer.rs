//! Reducer table: one pure transformation per history event kind.
//!
//! Every reducer takes the node by value and returns the patched node.
//! Fields a reducer does not own are carried forward untouched.

use crate::config::ParserConfig;
use crate::event::{HistoryEventKind, RawHistoryEvent};
use crate::node::{
    Cancellation, InvokeFunctionConfig, InvokeFunctionResult, LogicalNode, NodeScope, NodeStatus,
    SleepConfig, WaitForEventConfig, WaitForEventResult,
};
use crate::normalize::{normalize_step_name, normalize_url};

/// Apply `event` to `node`: the kind-specific reducer, then the common updater.
pub fn reduce(node: LogicalNode, event: &RawHistoryEvent, config: &ParserConfig) -> LogicalNode {
    let node = match event.kind {
        HistoryEventKind::FunctionScheduled => function_scheduled(node, event),
        HistoryEventKind::FunctionStarted => function_started(node, event),
        HistoryEventKind::FunctionCompleted => function_completed(node, event),
        HistoryEventKind::FunctionFailed => function_failed(node, event),
        HistoryEventKind::FunctionCancelled => function_cancelled(node, event),
        HistoryEventKind::StepScheduled => step_scheduled(node, event, config),
        HistoryEventKind::StepStarted => step_started(node, event, config),
        HistoryEventKind::StepSleeping => step_sleeping(node, event),
        HistoryEventKind::StepWaiting => step_waiting(node, event),
        HistoryEventKind::StepInvoking => step_invoking(node, event, config),
        HistoryEventKind::StepCompleted => step_completed(node, event, config),
        HistoryEventKind::StepFailed => step_failed(node, event, config),
        HistoryEventKind::StepErrored => step_errored(node),
        HistoryEventKind::FunctionStatusUpdated | HistoryEventKind::NoOp => node,
    };
    update_common(node, event)
}

fn update_common(mut node: LogicalNode, event: &RawHistoryEvent) -> LogicalNode {
    node.attempt = event.attempt;
    node
}

fn function_scheduled(mut node: LogicalNode, event: &RawHistoryEvent) -> LogicalNode {
    node.status = NodeStatus::Scheduled;
    node.scheduled_at = Some(event.created_at);
    node
}

// Status stays `scheduled` on start.
// TODO: confirm with product whether a started function should report `started`.
fn function_started(mut node: LogicalNode, event: &RawHistoryEvent) -> LogicalNode {
    node.status = NodeStatus::Scheduled;
    node.scheduled_at = Some(event.created_at);
    node
}

fn function_completed(mut node: LogicalNode, event: &RawHistoryEvent) -> LogicalNode {
    node.scope = Some(NodeScope::Function);
    node.status = NodeStatus::Completed;
    node.ended_at = Some(event.created_at);
    node
}

fn function_failed(mut node: LogicalNode, event: &RawHistoryEvent) -> LogicalNode {
    node.scope = Some(NodeScope::Function);
    node.status = NodeStatus::Failed;
    node.ended_at = Some(event.created_at);
    node
}

fn function_cancelled(mut node: LogicalNode, event: &RawHistoryEvent) -> LogicalNode {
    node.scope = Some(NodeScope::Function);
    node.status = NodeStatus::Cancelled;
    node.ended_at = Some(event.created_at);
    if let Some(cancel) = &event.cancel {
        node.cancellation = Some(Cancellation::from(cancel));
    }
    node
}

fn step_scheduled(
    mut node: LogicalNode,
    event: &RawHistoryEvent,
    config: &ParserConfig,
) -> LogicalNode {
    node = as_step(node, event);
    node.status = NodeStatus::Scheduled;
    node.scheduled_at = Some(event.created_at);
    node.name = normalize_step_name(event.step_name.as_deref(), config);
    node
}

fn step_started(
    mut node: LogicalNode,
    event: &RawHistoryEvent,
    config: &ParserConfig,
) -> LogicalNode {
    node = as_step(node, event);
    node.status = NodeStatus::Started;
    node.started_at = Some(event.created_at);
    if let Some(url) = &event.url {
        node.url = Some(normalize_url(url, config));
    }
    node
}

fn step_sleeping(mut node: LogicalNode, event: &RawHistoryEvent) -> LogicalNode {
    node = as_step(node, event);
    node.status = NodeStatus::Sleeping;
    node.ended_at = None;
    if let Some(sleep) = &event.sleep {
        node.sleep_config = Some(SleepConfig { until: sleep.until });
    }
    node
}

fn step_waiting(mut node: LogicalNode, event: &RawHistoryEvent) -> LogicalNode {
    node = as_step(node, event);
    node.status = NodeStatus::Waiting;
    if let Some(wait) = &event.wait_for_event {
        node.wait_for_event_config = Some(WaitForEventConfig {
            event_name: wait.event_name.clone(),
            expression: wait.expression.clone(),
            timeout: wait.timeout,
        });
    }
    node
}

fn step_invoking(
    mut node: LogicalNode,
    event: &RawHistoryEvent,
    config: &ParserConfig,
) -> LogicalNode {
    node = as_step(node, event);
    node.status = NodeStatus::Waiting;
    node = with_known_name(node, event, config);
    if let Some(invoke) = &event.invoke_function {
        node.invoke_function_config = Some(InvokeFunctionConfig {
            event_id: invoke.event_id.clone(),
            function_id: invoke.function_id.clone(),
            correlation_id: invoke.correlation_id.clone(),
            timeout: invoke.timeout,
        });
    }
    node
}

fn step_completed(
    mut node: LogicalNode,
    event: &RawHistoryEvent,
    config: &ParserConfig,
) -> LogicalNode {
    node = as_step(node, event);
    node.status = NodeStatus::Completed;
    node.ended_at = Some(event.created_at);
    node.output_item_id = Some(event.id.clone());
    node = with_known_name(node, event, config);
    // A timed-out wait still completes the step.
    if let Some(result) = &event.wait_result {
        node.wait_for_event_result = Some(WaitForEventResult {
            event_id: result.event_id.clone(),
            timed_out: result.timeout,
        });
    }
    if let Some(result) = &event.invoke_function_result {
        node.invoke_function_result = Some(InvokeFunctionResult {
            event_id: result.event_id.clone(),
            run_id: result.run_id.clone(),
            timed_out: result.timeout,
        });
    }
    node
}

fn step_failed(
    mut node: LogicalNode,
    event: &RawHistoryEvent,
    config: &ParserConfig,
) -> LogicalNode {
    node = as_step(node, event);
    node.status = NodeStatus::Failed;
    node.ended_at = Some(event.created_at);
    node.output_item_id = Some(event.id.clone());
    with_known_name(node, event, config)
}

// A retry is about to happen; the attempt bump comes from the common updater.
fn step_errored(mut node: LogicalNode) -> LogicalNode {
    node.scope = Some(NodeScope::Step);
    node.status = NodeStatus::Errored;
    node
}

fn as_step(mut node: LogicalNode, event: &RawHistoryEvent) -> LogicalNode {
    node.scope = Some(NodeScope::Step);
    if let Some(step_type) = event.step_type {
        node.step_type = Some(step_type);
    }
    node
}

/// Later events only overwrite the name once the real step identity is known.
fn with_known_name(
    mut node: LogicalNode,
    event: &RawHistoryEvent,
    config: &ParserConfig,
) -> LogicalNode {
    if let Some(name) = normalize_step_name(event.step_name.as_deref(), config) {
        node.name = Some(name);
    }
    node
}

//! HistoryParser - folds a run's raw history into logical nodes.
//!
//! Events must be appended in ascending `created_at` order. The parser does not
//! validate ordering; a chronologically earlier event appended late simply
//! overwrites the fields it owns.

use crate::config::ParserConfig;
use crate::event::{GroupId, HistoryEventKind, HistorySource, RawHistoryEvent};
use crate::node::{LogicalNode, NodeStatus};
use crate::reducer::reduce;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::sync::Arc;

/// Nodes keyed by group, in first-sighting order.
pub type NodeMap = IndexMap<GroupId, LogicalNode, ahash::RandomState>;

/// Point-in-time view of the node collection. Later appends never change it.
pub type Snapshot = Arc<NodeMap>;

#[derive(Debug, Clone, Default)]
pub struct HistoryParser {
    nodes: Snapshot,
    config: ParserConfig,
}

impl HistoryParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            nodes: Snapshot::default(),
            config,
        }
    }

    /// Seed a parser by replaying an initial batch in order.
    pub fn from_events(events: impl IntoIterator<Item = RawHistoryEvent>) -> Self {
        Self::from_events_with_config(events, ParserConfig::default())
    }

    pub fn from_events_with_config(
        events: impl IntoIterator<Item = RawHistoryEvent>,
        config: ParserConfig,
    ) -> Self {
        let mut parser = Self::with_config(config);
        parser.extend(events);
        parser
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn append(&mut self, event: RawHistoryEvent) {
        tracing::debug!(
            group_id = %event.group_id,
            kind = %event.kind,
            attempt = event.attempt,
            "appending history event"
        );

        // Clones the map only while a snapshot of it is still held elsewhere.
        let nodes = Arc::make_mut(&mut self.nodes);
        let current = nodes
            .get(&event.group_id)
            .cloned()
            .unwrap_or_else(|| LogicalNode::new(event.group_id.clone(), event.attempt));
        let next = reduce(current, &event, &self.config);
        let ended_at = next.ended_at;
        nodes.insert(event.group_id.clone(), next);

        if event.kind == HistoryEventKind::FunctionCancelled {
            if let Some(ended_at) = ended_at {
                let cancelled = propagate_cancellation(nodes, ended_at);
                if cancelled > 0 {
                    tracing::info!(
                        group_id = %event.group_id,
                        cancelled,
                        "run cancelled; force-terminated in-flight nodes"
                    );
                }
            }
        }
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = RawHistoryEvent>) {
        for event in events {
            self.append(event);
        }
    }

    /// Drain `source`, appending each event in delivery order.
    ///
    /// Returns the number of events applied.
    pub async fn consume<S>(&mut self, source: &mut S) -> usize
    where
        S: HistorySource + ?Sized,
    {
        let mut applied = 0;
        while let Some(event) = source.next_event().await {
            self.append(event);
            applied += 1;
        }
        tracing::debug!(applied, nodes = self.len(), "history source exhausted");
        applied
    }

    pub fn nodes(&self) -> &NodeMap {
        &self.nodes
    }

    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.nodes)
    }

    pub fn node(&self, group_id: &str) -> Option<&LogicalNode> {
        self.nodes.get(group_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Force every node without an `ended_at` into `cancelled` at `ended_at`.
///
/// Returns how many nodes were rewritten.
pub fn propagate_cancellation(nodes: &mut NodeMap, ended_at: DateTime<Utc>) -> usize {
    let mut cancelled = 0;
    for node in nodes.values_mut().filter(|node| node.ended_at.is_none()) {
        node.status = NodeStatus::Cancelled;
        node.ended_at = Some(ended_at);
        cancelled += 1;
    }
    cancelled
}

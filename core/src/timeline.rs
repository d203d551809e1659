use crate::node::LogicalNode;
use crate::parser::Snapshot;
use serde::Serialize;

/// Render-ready ordering of a node snapshot.
///
/// Rows are sorted by `scheduled_at`; nodes not yet scheduled come first and
/// ties keep first-sighting order.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Timeline {
    rows: Vec<LogicalNode>,
}

impl Timeline {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut rows: Vec<LogicalNode> = snapshot.values().cloned().collect();
        // Stable sort; `None` orders before any timestamp.
        rows.sort_by_key(|node| node.scheduled_at);
        Self { rows }
    }

    pub fn rows(&self) -> &[LogicalNode] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn function_node(&self) -> Option<&LogicalNode> {
        self.rows.iter().find(|node| node.is_function())
    }

    pub fn steps(&self) -> impl Iterator<Item = &LogicalNode> {
        self.rows.iter().filter(|node| node.is_step())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{HistoryEventKind, RawHistoryEvent};
    use crate::parser::HistoryParser;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_693_562_400 + secs, 0).unwrap()
    }

    #[test]
    fn test_rows_sorted_by_scheduled_at_with_unscheduled_first() {
        let mut parser = HistoryParser::new();
        parser.append(RawHistoryEvent::new("1", HistoryEventKind::StepScheduled, "late", 0, at(20)));
        parser.append(RawHistoryEvent::new("2", HistoryEventKind::FunctionScheduled, "fn", 0, at(0)));
        // Never scheduled: only a start was observed.
        parser.append(RawHistoryEvent::new("3", HistoryEventKind::StepStarted, "orphan", 0, at(25)));
        parser.append(RawHistoryEvent::new("4", HistoryEventKind::StepScheduled, "early", 0, at(10)));
        parser.append(RawHistoryEvent::new("5", HistoryEventKind::FunctionCompleted, "fn", 0, at(30)));

        let timeline = Timeline::from_snapshot(&parser.snapshot());
        let order: Vec<_> = timeline.rows().iter().map(|n| n.group_id.as_str()).collect();

        assert_eq!(order, vec!["orphan", "fn", "early", "late"]);
        assert_eq!(timeline.function_node().unwrap().group_id, "fn");
        assert_eq!(timeline.steps().count(), 3);
    }

    #[test]
    fn test_empty_snapshot() {
        let timeline = Timeline::from_snapshot(&HistoryParser::new().snapshot());
        assert!(timeline.is_empty());
        assert!(timeline.function_node().is_none());
    }
}

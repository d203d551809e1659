use crate::config::ParserConfig;
use crate::event::{GroupId, HistoryEventKind, RawHistoryEvent};
use crate::node::LogicalNode;
use crate::parser::HistoryParser;
use serde::Serialize;

/// HistoryReplay folds a recorded history one event at a time.
/// Each step exposes the affected node right after the event was applied,
/// which makes intermediate states observable.
pub struct HistoryReplay {
    events: Vec<RawHistoryEvent>,
    parser: HistoryParser,
    cursor: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayFrame {
    pub index: usize,
    pub group_id: GroupId,
    pub kind: HistoryEventKind,
    pub node: LogicalNode,
}

impl HistoryReplay {
    pub fn new(events: Vec<RawHistoryEvent>) -> Self {
        Self::with_config(events, ParserConfig::default())
    }

    pub fn with_config(events: Vec<RawHistoryEvent>, config: ParserConfig) -> Self {
        Self {
            events,
            parser: HistoryParser::with_config(config),
            cursor: 0,
        }
    }

    /// Advance the replay by one event.
    /// Returns the frame or None if finished.
    pub fn next_step(&mut self) -> Option<ReplayFrame> {
        let event = self.events.get(self.cursor)?.clone();
        let index = self.cursor;
        self.cursor += 1;

        let group_id = event.group_id.clone();
        let kind = event.kind;
        self.parser.append(event);

        let node = self.parser.node(&group_id)?.clone();
        Some(ReplayFrame {
            index,
            group_id,
            kind,
            node,
        })
    }

    /// Parser state after the events replayed so far.
    pub fn parser(&self) -> &HistoryParser {
        &self.parser
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }

    /// Reset replay to start
    pub fn reset(&mut self) {
        self.parser = HistoryParser::with_config(self.parser.config().clone());
        self.cursor = 0;
    }
}

impl Iterator for HistoryReplay {
    type Item = ReplayFrame;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_step()
    }
}

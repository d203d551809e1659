//! History folding commands
//!
//! Each command reads a recorded history (JSON array of history items),
//! folds it and renders the result as JSON.

use anyhow::{Context, Result};
use runhistory_core::{
    decode_history, HistoryParser, HistoryReplay, ParserConfig, RawHistoryEvent, Timeline,
    VecSource,
};
use serde::Serialize;
use std::io::Read;

/// Read history from a file, or stdin when the path is `-`.
pub fn load_history(input: &str) -> Result<Vec<RawHistoryEvent>> {
    let raw = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read history from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read history file: {}", input))?
    };
    decode_history(&raw).with_context(|| format!("Failed to parse history: {}", input))
}

pub fn load_config(path: Option<&str>) -> Result<ParserConfig> {
    match path {
        Some(path) => ParserConfig::load(path)
            .with_context(|| format!("Failed to load parser config: {}", path)),
        None => Ok(ParserConfig::default()),
    }
}

/// Folded node collection, keyed by group id.
pub async fn fold(events: Vec<RawHistoryEvent>, config: ParserConfig) -> Result<serde_json::Value> {
    let mut source = VecSource::new(events);
    let mut parser = HistoryParser::with_config(config);
    parser.consume(&mut source).await;
    Ok(serde_json::to_value(parser.nodes())?)
}

/// Nodes in render order.
pub fn timeline(events: Vec<RawHistoryEvent>, config: ParserConfig) -> Result<serde_json::Value> {
    let parser = HistoryParser::from_events_with_config(events, config);
    Ok(serde_json::to_value(Timeline::from_snapshot(&parser.snapshot()))?)
}

/// One frame per event, with the touched node after that event.
pub fn replay(events: Vec<RawHistoryEvent>, config: ParserConfig) -> Result<serde_json::Value> {
    let frames: Vec<_> = HistoryReplay::with_config(events, config).collect();
    Ok(serde_json::to_value(frames)?)
}

pub fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}

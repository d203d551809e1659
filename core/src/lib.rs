//! Run-history parser: folds the low-level event log of a durable function
//! run into one logical node per step, suitable for timeline rendering.
//!
//! **IMPORTANT**: This crate is pure - no network, no persistence, no async runtime.

pub mod config;
pub mod error;
pub mod event;
pub mod node;
pub mod normalize;
pub mod parser;
pub mod reducer;
pub mod replay;
pub mod timeline;

pub use config::ParserConfig;
pub use error::{HistoryError, HistoryResult};
pub use event::{
    decode_history, GroupId, HistoryEventKind, HistorySource, RawHistoryEvent, StepType,
    VecSource,
};
pub use node::{LogicalNode, NodeScope, NodeStatus};
pub use parser::{propagate_cancellation, HistoryParser, NodeMap, Snapshot};
pub use replay::{HistoryReplay, ReplayFrame};
pub use timeline::Timeline;

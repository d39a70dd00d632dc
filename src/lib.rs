//! Causal structure discovery over detected anomaly events.
//!
//! Motif occurrences per series become indicator events, correlated
//! duplicates are merged, dead times are estimated for every ordered pair,
//! and Granger F-tests decide between no relation, a direct cause and a
//! hidden common cause. The result is a weighted directed graph exportable
//! as Graphviz DOT.

pub mod algo;
pub mod config;
pub mod dot;
pub mod engine;
pub mod error;
pub mod event;
pub mod granger;
pub mod graph;
pub mod input;
pub mod lag;
pub mod pool;

pub use config::{CausalParams, EngineConfig};
pub use engine::{CausalEngine, granger_causality};
pub use error::{CausalError, Result};
pub use event::{Event, MotifOccurrence};
pub use granger::{PairOutcome, Verdict};
pub use graph::{CausalGraph, Edge, Node, NodeId};
pub use input::{DiscoveryInput, SeriesOccurrences};
pub use lag::DeadTimes;

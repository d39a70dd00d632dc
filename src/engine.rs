//! Causal Discovery Engine
//!
//! Orchestrates the pipeline on one batch:
//!
//! 1. Events per series, reduced to a fixed point (`input`, `event`)
//! 2. Pairwise dead times (`lag`)
//! 3. Granger tests for every ordered pair (`granger`)
//! 4. Graph synthesis from the verdicts (`graph`)
//!
//! Pair work fans out over the worker pool; verdicts come back sorted by
//! `(cause, effect)` and are applied here, on one thread, so node numbering
//! and edge order are the same for any worker count.

use crate::config::{CausalParams, EngineConfig};
use crate::error::Result;
use crate::event::Event;
use crate::granger::{CausalityTester, PairOutcome, Verdict};
use crate::graph::{CausalGraph, NodeId};
use crate::input::DiscoveryInput;
use crate::lag::DeadTimes;
use tracing::info;

#[derive(Debug, Default)]
pub struct CausalEngine {
    config: EngineConfig,
}

impl CausalEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn params(&self) -> &CausalParams {
        &self.config.params
    }

    /// Validate `input`, build its events and discover their graph.
    pub fn discover(&self, input: &DiscoveryInput) -> Result<CausalGraph> {
        let events = input.to_events(self.params())?;
        Ok(self.granger_causality(&events))
    }

    /// Graph over already-built events of equal length.
    pub fn granger_causality(&self, events: &[Event]) -> CausalGraph {
        let (graph, _) = self.granger_causality_with_outcomes(events);
        graph
    }

    /// Like [`granger_causality`](Self::granger_causality), also returning
    /// every pair's test statistics.
    pub fn granger_causality_with_outcomes(
        &self,
        events: &[Event],
    ) -> (CausalGraph, Vec<PairOutcome>) {
        let mut graph = CausalGraph::from_events(events);
        if events.is_empty() {
            return (graph, Vec::new());
        }

        let params = self.params();
        let workers = self.config.effective_workers();

        let dead_times = DeadTimes::estimate(events, params.max_lag, workers);
        let tester = CausalityTester::new(events, &dead_times, params);
        let outcomes = tester.test_all(workers);

        for outcome in &outcomes {
            apply_verdict(&mut graph, outcome);
        }

        info!(
            events = events.len(),
            workers,
            nodes = graph.len(),
            edges = graph.edge_count(),
            hidden = graph.hidden_count(),
            "causal graph built"
        );
        (graph, outcomes)
    }
}

fn apply_verdict(graph: &mut CausalGraph, outcome: &PairOutcome) {
    let cause = NodeId::new(outcome.cause);
    let effect = NodeId::new(outcome.effect);
    match outcome.verdict {
        Verdict::Unrelated => {}
        Verdict::Direct { weight } => graph.add_edge(cause, effect, weight),
        Verdict::HiddenCommonCause => {
            graph.add_hidden_cause(cause, effect);
        }
    }
}

/// Discovery with the default parameters.
pub fn granger_causality(events: &[Event]) -> CausalGraph {
    CausalEngine::default().granger_causality(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MotifOccurrence;
    use crate::graph::Node;

    fn pulse(series: &str, begin: usize, end: usize) -> Event {
        Event::from_occurrence(MotifOccurrence::new(begin, end), 60, series)
    }

    #[test]
    fn test_empty_events_give_empty_graph() {
        let graph = granger_causality(&[]);
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_single_event_has_no_edges() {
        let graph = granger_causality(&[pulse("x", 4, 9)]);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_direct_edge_weighted_by_dead_time() {
        let events = vec![pulse("x", 14, 18), pulse("y", 20, 29), pulse("z", 45, 50)];
        let graph = granger_causality(&events);
        let edges: Vec<(String, String, usize)> = graph
            .edges()
            .map(|e| {
                let name = |id| graph.node(id).map(Node::name).unwrap_or_default();
                (name(e.cause), name(e.effect), e.weight)
            })
            .collect();
        assert_eq!(edges, vec![("x_14".to_string(), "y_20".to_string(), 6)]);
        assert_eq!(graph.hidden_count(), 0);
    }

    #[test]
    fn test_hidden_cause_appended_behind_events() {
        let events = vec![pulse("a", 20, 29), pulse("b", 20, 31), pulse("c", 45, 50)];
        let (graph, outcomes) = CausalEngine::default().granger_causality_with_outcomes(&events);
        assert_eq!(outcomes.len(), 6);
        assert_eq!(graph.len(), 5);
        assert_eq!(graph.hidden_count(), 2);
        assert!(graph.nodes()[..3].iter().all(|n| n.edges.is_empty()), "no direct edges");
        assert!(graph.nodes()[3..].iter().all(|n| n.hidden && n.edges.len() == 2));
    }

    #[test]
    fn test_zero_length_events_do_not_panic() {
        let graph = granger_causality(&[Event::new("a", vec![]), Event::new("b", vec![])]);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.nodes()[0].begin, 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.params.lag_order = 0;
        assert!(CausalEngine::new(config).is_err());
    }
}

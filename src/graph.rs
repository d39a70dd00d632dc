//! Causal Graph
//!
//! Arena of nodes addressed by [`NodeId`]. Each event owns one node in event
//! order; hidden common causes are appended behind them as they are found.
//! Edges live on their cause node as `(cause, effect, weight)` triples, so
//! the structure holds no references and serializes as-is.

use crate::event::Event;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Arena index as an id. Graphs are limited to `u32::MAX + 1` nodes.
    pub fn new(idx: usize) -> Self {
        debug_assert!(u32::try_from(idx).is_ok(), "node index {} exceeds u32", idx);
        Self(idx as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub cause: NodeId,
    pub effect: NodeId,
    pub weight: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub series: String,
    /// First active sample of the event; equals the window length for an
    /// event that never fires. Always 0 for hidden nodes.
    pub begin: usize,
    pub hidden: bool,
    pub edges: Vec<Edge>,
}

impl Node {
    /// `"{series}_{begin}"`, or the bare label for hidden nodes.
    pub fn name(&self) -> String {
        if self.hidden {
            self.series.clone()
        } else {
            format!("{}_{}", self.series, self.begin)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CausalGraph {
    nodes: Vec<Node>,
    hidden_count: usize,
}

impl CausalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// One node per event, index-aligned with `events`.
    pub fn from_events(events: &[Event]) -> Self {
        let nodes = events
            .iter()
            .map(|event| Node {
                series: event.series().to_string(),
                begin: event.first_active(),
                hidden: false,
                edges: Vec::new(),
            })
            .collect();
        Self {
            nodes,
            hidden_count: 0,
        }
    }

    pub fn add_node(&mut self, series: impl Into<String>, begin: usize) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node {
            series: series.into(),
            begin,
            hidden: false,
            edges: Vec::new(),
        });
        id
    }

    pub fn add_edge(&mut self, cause: NodeId, effect: NodeId, weight: usize) {
        debug_assert!(effect.index() < self.nodes.len(), "effect {:?} out of range", effect);
        self.nodes[cause.index()].edges.push(Edge {
            cause,
            effect,
            weight,
        });
    }

    /// Append `hidden{n}` with zero-weight edges to `a` then `b`.
    pub fn add_hidden_cause(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node {
            series: format!("hidden{}", self.hidden_count),
            begin: 0,
            hidden: true,
            edges: Vec::new(),
        });
        self.hidden_count += 1;
        self.add_edge(id, a, 0);
        self.add_edge(id, b, 0);
        id
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edges in cause-node order, then each node's own order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.nodes.iter().flat_map(|node| node.edges.iter())
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.edges.len()).sum()
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MotifOccurrence;

    #[test]
    fn test_nodes_follow_events() {
        let events = vec![
            Event::from_occurrence(MotifOccurrence::new(3, 5), 10, "cpu"),
            Event::from_occurrence(MotifOccurrence::new(0, 1), 10, "mem"),
        ];
        let graph = CausalGraph::from_events(&events);
        let names: Vec<String> = graph.nodes().iter().map(Node::name).collect();
        assert_eq!(names, vec!["cpu_3", "mem_0"]);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_silent_event_begins_past_window() {
        let events = vec![Event::new("idle", vec![0.0; 8])];
        let graph = CausalGraph::from_events(&events);
        assert_eq!(graph.nodes()[0].begin, 8, "all-zero event keeps the sentinel");
        assert_eq!(graph.nodes()[0].name(), "idle_8");
    }

    #[test]
    fn test_hidden_nodes_are_numbered_and_appended() {
        let mut graph = CausalGraph::new();
        let a = graph.add_node("a", 20);
        let b = graph.add_node("b", 20);

        let h0 = graph.add_hidden_cause(a, b);
        let h1 = graph.add_hidden_cause(b, a);
        assert_eq!(graph.hidden_count(), 2);
        assert_eq!(graph.len(), 4);

        let hidden = graph.node(h0).expect("hidden node stored");
        assert!(hidden.hidden);
        assert_eq!(hidden.name(), "hidden0");
        assert_eq!(graph.node(h1).map(Node::name).as_deref(), Some("hidden1"));

        let edges: Vec<(NodeId, NodeId, usize)> =
            graph.edges().map(|e| (e.cause, e.effect, e.weight)).collect();
        assert_eq!(edges, vec![(h0, a, 0), (h0, b, 0), (h1, b, 0), (h1, a, 0)]);
    }

    #[test]
    fn test_edges_owned_by_cause() {
        let mut graph = CausalGraph::new();
        let x = graph.add_node("x", 0);
        let y = graph.add_node("y", 5);
        graph.add_edge(x, y, 3);
        assert_eq!(graph.nodes()[0].edges.len(), 1);
        assert!(graph.nodes()[1].edges.is_empty());
    }

    #[test]
    fn test_node_id_spans_u32() {
        let last = u32::MAX as usize;
        assert_eq!(NodeId::new(last).index(), last);
        assert_eq!(NodeId::new(0), NodeId::default());
    }

    #[test]
    #[cfg(all(debug_assertions, target_pointer_width = "64"))]
    #[should_panic(expected = "exceeds u32")]
    fn test_node_id_overflow_caught() {
        let _ = NodeId::new(u32::MAX as usize + 1);
    }

    #[test]
    fn test_graph_serializes() {
        let mut graph = CausalGraph::new();
        let x = graph.add_node("x", 0);
        let y = graph.add_node("y", 5);
        graph.add_edge(x, y, 3);
        let json = serde_json::to_value(&graph).expect("graph serializes");
        assert_eq!(json["nodes"][0]["edges"][0]["effect"], 1);
        assert_eq!(json["hidden_count"], 0);
    }
}

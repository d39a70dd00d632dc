//! Graphviz export.

use crate::graph::CausalGraph;
use std::io::{self, Write};

/// Write `digraph G { ... }` with one `cause -> effect[label="w"];` line per
/// edge, in cause-node order.
pub fn write_dot<W: Write>(out: &mut W, graph: &CausalGraph) -> io::Result<()> {
    writeln!(out, "digraph G {{")?;
    for node in graph.nodes() {
        let cause = node.name();
        for edge in &node.edges {
            let effect = graph
                .node(edge.effect)
                .map(|n| n.name())
                .unwrap_or_default();
            writeln!(out, "{} -> {}[label=\"{}\"];", cause, effect, edge.weight)?;
        }
    }
    writeln!(out, "}}")
}

pub fn to_dot(graph: &CausalGraph) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_dot(&mut buf, graph);
    String::from_utf8_lossy(&buf).into_owned()
}

use super::IndexedGraph;
use crate::core::Result;
use petgraph::Direction;
use std::collections::{BTreeSet, HashSet};

/// Nodes are qualified function names; an edge `f -> g` means `f` calls `g`.
/// Recursion shows up as a self-loop or a cycle.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    graph: IndexedGraph,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function(&mut self, qualified_name: &str) -> Result<()> {
        self.graph.add_node(qualified_name).map(|_| ())
    }

    pub fn add_call(&mut self, caller: &str, callee: &str) -> Result<bool> {
        self.graph.add_edge(caller, callee)
    }

    pub fn functions(&self) -> Vec<&str> {
        self.graph.nodes()
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.graph.contains(qualified_name)
    }

    pub fn callers(&self, qualified_name: &str) -> Vec<&str> {
        self.graph.predecessors(qualified_name)
    }

    pub fn callees(&self, qualified_name: &str) -> Vec<&str> {
        self.graph.successors(qualified_name)
    }

    /// Transitive callers within `max_depth` call levels
    pub fn upstream(&self, qualified_name: &str, max_depth: Option<usize>) -> BTreeSet<String> {
        self.graph
            .bfs_within(qualified_name, Direction::Incoming, max_depth)
    }

    /// Transitive callees within `max_depth` call levels
    pub fn downstream(&self, qualified_name: &str, max_depth: Option<usize>) -> BTreeSet<String> {
        self.graph
            .bfs_within(qualified_name, Direction::Outgoing, max_depth)
    }

    pub fn reachable_from<'a, I>(&self, roots: I) -> HashSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.graph.reachable_from(roots)
    }

    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.graph.edges()
    }

    pub fn function_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

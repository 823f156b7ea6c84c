//! Index-addressed directed graphs over string keys.
//!
//! Both the file dependency graph and the call graph are an
//! [`IndexedGraph`]: a `petgraph` [`DiGraph`] plus a key -> [`NodeIndex`] map.
//! Query results are sorted by key so every consumer sees the same order on
//! every run.

pub mod builder;
pub mod call_graph;
pub mod context;
pub mod file_graph;
pub mod resolver;

pub use builder::GraphBuilder;
pub use call_graph::CallGraph;
pub use context::{AnalysisContext, FunctionRegistry, ModuleInfo};
pub use file_graph::FileDependencyGraph;
pub use resolver::{Binding, ModuleIndex};

use crate::core::{AnalysisError, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Default)]
pub struct IndexedGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl IndexedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adding a key twice is an invariant violation
    pub fn add_node(&mut self, key: &str) -> Result<NodeIndex> {
        if self.index.contains_key(key) {
            return Err(AnalysisError::invariant(format!("duplicate node '{key}'")));
        }
        let idx = self.graph.add_node(key.to_string());
        self.index.insert(key.to_string(), idx);
        Ok(idx)
    }

    /// Returns `false` when the edge already existed. Both endpoints must
    /// already be nodes.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<bool> {
        let (Some(&a), Some(&b)) = (self.index.get(from), self.index.get(to)) else {
            return Err(AnalysisError::invariant(format!(
                "edge '{from}' -> '{to}' references an absent node"
            )));
        };
        if self.graph.find_edge(a, b).is_some() {
            return Ok(false);
        }
        self.graph.add_edge(a, b, ());
        Ok(true)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes(&self) -> Vec<&str> {
        let mut nodes: Vec<&str> = self.graph.node_weights().map(String::as_str).collect();
        nodes.sort_unstable();
        nodes
    }

    pub fn edges(&self) -> Vec<(&str, &str)> {
        let mut edges: Vec<(&str, &str)> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (self.graph[a].as_str(), self.graph[b].as_str()))
            .collect();
        edges.sort_unstable();
        edges
    }

    pub fn successors(&self, key: &str) -> Vec<&str> {
        self.neighbors(key, Direction::Outgoing)
    }

    pub fn predecessors(&self, key: &str) -> Vec<&str> {
        self.neighbors(key, Direction::Incoming)
    }

    fn neighbors(&self, key: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.index.get(key) else {
            return Vec::new();
        };
        let mut neighbors: Vec<&str> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].as_str())
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Nodes within `max_depth` hops of `start` (unbounded when `None`),
    /// following edges in `direction`. `start` itself is never included,
    /// even when it lies on a cycle.
    pub fn bfs_within(
        &self,
        start: &str,
        direction: Direction,
        max_depth: Option<usize>,
    ) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        let Some(&origin) = self.index.get(start) else {
            return found;
        };

        let mut visited = HashSet::from([origin]);
        let mut queue = VecDeque::from([(origin, 0usize)]);
        while let Some((node, depth)) = queue.pop_front() {
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }
            for next in self.graph.neighbors_directed(node, direction) {
                if visited.insert(next) {
                    found.insert(self.graph[next].clone());
                    queue.push_back((next, depth + 1));
                }
            }
        }
        found
    }

    /// Every node reachable from any of `starts` along outgoing edges,
    /// the starts included. Unknown starts are ignored.
    pub fn reachable_from<'a, I>(&self, starts: I) -> HashSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();
        for start in starts {
            if let Some(&idx) = self.index.get(start) {
                if visited.insert(idx) {
                    queue.push_back(idx);
                }
            }
        }

        while let Some(node) = queue.pop_front() {
            for next in self.graph.neighbors(node) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited
            .into_iter()
            .map(|idx| self.graph[idx].clone())
            .collect()
    }
}

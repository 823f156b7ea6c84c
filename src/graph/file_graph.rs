use super::IndexedGraph;
use crate::core::Result;

/// Nodes are file ids; an edge `a -> b` means `a` imports `b`.
#[derive(Debug, Clone, Default)]
pub struct FileDependencyGraph {
    graph: IndexedGraph,
}

impl FileDependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, file: &str) -> Result<()> {
        self.graph.add_node(file).map(|_| ())
    }

    /// Self-imports are ignored; repeated imports collapse into one edge
    pub fn add_dependency(&mut self, from: &str, to: &str) -> Result<bool> {
        if from == to {
            return Ok(false);
        }
        self.graph.add_edge(from, to)
    }

    pub fn files(&self) -> Vec<&str> {
        self.graph.nodes()
    }

    pub fn dependencies(&self, file: &str) -> Vec<&str> {
        self.graph.successors(file)
    }

    pub fn dependents(&self, file: &str) -> Vec<&str> {
        self.graph.predecessors(file)
    }

    pub fn contains(&self, file: &str) -> bool {
        self.graph.contains(file)
    }

    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.graph.edges()
    }

    pub fn file_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_import_is_not_an_edge() {
        let mut graph = FileDependencyGraph::new();
        graph.add_file("a.py").unwrap();
        assert!(!graph.add_dependency("a.py", "a.py").unwrap());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_dependencies_and_dependents() {
        let mut graph = FileDependencyGraph::new();
        for file in ["a.py", "b.py", "c.py"] {
            graph.add_file(file).unwrap();
        }
        graph.add_dependency("a.py", "c.py").unwrap();
        graph.add_dependency("b.py", "c.py").unwrap();

        assert_eq!(graph.dependencies("a.py"), vec!["c.py"]);
        assert_eq!(graph.dependents("c.py"), vec!["a.py", "b.py"]);
        assert_eq!(graph.files(), vec!["a.py", "b.py", "c.py"]);
    }
}

use crate::core::{Category, Evidence, Issue, Location, Severity};
use crate::graph::FileDependencyGraph;
use std::collections::{BTreeSet, HashMap};

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

/// Detect circular imports with a three-state DFS.
///
/// Roots and successors are visited in file-id order, and each cycle is
/// rotated to start at its smallest file id, so the result is identical
/// across runs and independent of where traversal happens to start.
pub fn detect_cycles(graph: &FileDependencyGraph) -> Vec<Vec<String>> {
    let mut state: HashMap<&str, VisitState> = HashMap::new();
    let mut path: Vec<&str> = Vec::new();
    let mut cycles: BTreeSet<Vec<String>> = BTreeSet::new();

    for file in graph.files() {
        if !state.contains_key(file) {
            dfs_detect_cycles(graph, file, &mut state, &mut path, &mut cycles);
        }
    }

    cycles.into_iter().collect()
}

fn dfs_detect_cycles<'g>(
    graph: &'g FileDependencyGraph,
    file: &'g str,
    state: &mut HashMap<&'g str, VisitState>,
    path: &mut Vec<&'g str>,
    cycles: &mut BTreeSet<Vec<String>>,
) {
    state.insert(file, VisitState::InProgress);
    path.push(file);

    for dep in graph.dependencies(file) {
        match state.get(dep) {
            None => dfs_detect_cycles(graph, dep, state, path, cycles),
            Some(VisitState::InProgress) => {
                if let Some(start) = path.iter().position(|f| *f == dep) {
                    let cycle = canonicalize(&path[start..]);
                    if cycle.len() >= 2 {
                        cycles.insert(cycle);
                    }
                }
            }
            Some(VisitState::Done) => {}
        }
    }

    path.pop();
    state.insert(file, VisitState::Done);
}

/// Rotate so the lexicographically smallest file comes first
pub fn canonicalize(cycle: &[&str]) -> Vec<String> {
    let Some(min) = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, f)| **f)
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };
    cycle[min..]
        .iter()
        .chain(&cycle[..min])
        .map(|f| f.to_string())
        .collect()
}

pub fn render_cycle(cycle: &[String]) -> String {
    let mut chain = cycle.join(" -> ");
    if let Some(first) = cycle.first() {
        chain.push_str(" -> ");
        chain.push_str(first);
    }
    chain
}

pub fn cycle_findings(graph: &FileDependencyGraph) -> Vec<Issue> {
    detect_cycles(graph)
        .into_iter()
        .map(|cycle| {
            let rendered = render_cycle(&cycle);
            Issue::new(
                Category::Correctness,
                Severity::Critical,
                Location::file(&cycle[0]).with_symbol(&rendered),
                Evidence::DependencyCycle {
                    cycle: cycle.clone(),
                },
                format!(
                    "Circular import between {} files: {rendered}",
                    cycle.len()
                ),
            )
        })
        .collect()
}

use tree_sitter::Node;

/// Node kinds that each add one independent path through a function
const DECISION_POINTS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "for_statement",
    "while_statement",
    "except_clause",
    "except_group_clause",
    "boolean_operator",
    "conditional_expression",
    "for_in_clause",
    "if_clause",
    "case_clause",
];

/// McCabe complexity: 1 + decision points anywhere under `node`, nested
/// functions and lambdas included
pub fn calculate_cyclomatic_complexity(node: Node) -> u32 {
    1 + count_decision_points(node)
}

pub fn count_decision_points(node: Node) -> u32 {
    let own = u32::from(DECISION_POINTS.contains(&node.kind()));
    let mut cursor = node.walk();
    let nested: u32 = node
        .children(&mut cursor)
        .map(count_decision_points)
        .sum();
    own + nested
}

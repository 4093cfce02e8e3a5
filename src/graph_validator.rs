use std::collections::HashSet;

use crate::graph_model::{Graph, Subgraph};

pub fn validate(graph: &Graph) -> Vec<String> {
    let mut issues = Vec::new();

    let Some(root) = &graph.high_level else {
        issues.push("Missing 'high_level' field".to_string());
        return issues;
    };

    let mut node_ids: HashSet<&str> = HashSet::new();

    for node in &root.nodes {
        match node.id.as_deref() {
            Some(id) => {
                node_ids.insert(id);
            }
            None => {
                let shown = serde_json::to_string(node).unwrap_or_default();
                issues.push(format!("Node missing 'id': {shown}"));
            }
        }
    }

    // Depth-first pre-order, children visited in input order.
    let mut stack: Vec<(&Subgraph, String)> = root
        .children
        .iter()
        .rev()
        .map(|child| (child, child.path_segment().to_string()))
        .collect();
    while let Some((subgraph, path)) = stack.pop() {
        for node in &subgraph.nodes {
            match node.id.as_deref() {
                Some(id) => {
                    node_ids.insert(id);
                }
                None => issues.push(format!("Node in {path} missing 'id'")),
            }
        }
        for child in subgraph.children.iter().rev() {
            stack.push((child, format!("{path}/{}", child.path_segment())));
        }
    }

    for edge in &graph.edge_index {
        let known = |id: &&str| id.is_empty() || node_ids.contains(id);
        if let Some(source) = edge.source.as_deref().filter(|s| !known(s)) {
            issues.push(format!("Edge source '{source}' not found in nodes"));
        }
        if let Some(target) = edge.target.as_deref().filter(|t| !known(t)) {
            issues.push(format!("Edge target '{target}' not found in nodes"));
        }
        if edge.kind.is_none() {
            issues.push(format!(
                "Edge {} -> {} missing 'type'",
                edge.source.as_deref().unwrap_or("None"),
                edge.target.as_deref().unwrap_or("None")
            ));
        }
    }

    if !issues.is_empty() {
        tracing::debug!(count = issues.len(), "graph validation found issues");
    }
    issues
}

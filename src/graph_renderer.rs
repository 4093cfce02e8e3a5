use crate::edge_label::edge_label;
use crate::error::{Error, Result};
use crate::graph_model::{Edge, Graph, GraphLevel, Node, Subgraph};
use crate::sanitize::{escape_label, sanitize_id};

const HEADER: &str = "graph TD";
const INDENT: &str = "    ";

enum Frame<'a> {
    Open {
        subgraph: &'a Subgraph,
        depth: usize,
        parent: Option<usize>,
    },
    Close {
        subgraph: &'a Subgraph,
        depth: usize,
    },
}

pub fn render(graph: &Graph, level: GraphLevel) -> Result<String> {
    match level {
        GraphLevel::High => render_high(graph),
        GraphLevel::Module | GraphLevel::Detailed => Err(Error::UnsupportedLevel(level)),
    }
}

fn render_high(graph: &Graph) -> Result<String> {
    let empty = Subgraph::default();
    let root = graph.high_level.as_ref().unwrap_or(&empty);
    let mut lines = vec![HEADER.to_string()];

    for node in &root.nodes {
        let line = node_line(node, 1).ok_or_else(|| Error::MissingNodeId {
            scope: "high_level".to_string(),
        })?;
        lines.push(line);
    }

    tracing::debug!(
        nodes = root.nodes.len(),
        subgraphs = root.children.len(),
        "rendering high-level graph"
    );
    for child in &root.children {
        render_subgraph(child, 1, &mut lines)?;
    }

    for edge in top_level_edges(graph) {
        lines.push(edge_line(edge, 1)?);
    }

    Ok(lines.join("\n"))
}

fn top_level_edges(graph: &Graph) -> &[Edge] {
    if !graph.edge_index.is_empty() {
        tracing::debug!(count = graph.edge_index.len(), "using edge_index");
        return &graph.edge_index;
    }
    match &graph.metadata {
        Some(metadata) if !metadata.edges.is_empty() => {
            tracing::debug!(count = metadata.edges.len(), "falling back to metadata.edges");
            metadata.edges.as_slice()
        }
        _ => &[],
    }
}

/// Emit a subgraph block and everything nested under it.
///
/// Nesting is walked with an explicit stack so arbitrarily deep input cannot
/// overflow the call stack. Output order: open line, nodes, nested blocks,
/// `end`, then the subgraph's own edges.
fn render_subgraph(subgraph: &Subgraph, depth: usize, lines: &mut Vec<String>) -> Result<()> {
    // (parent index, path segment) per visited subgraph; joined only on error.
    let mut scopes: Vec<(Option<usize>, &str)> = Vec::new();
    let mut stack = vec![Frame::Open {
        subgraph,
        depth,
        parent: None,
    }];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Open {
                subgraph,
                depth,
                parent,
            } => {
                let scope = scopes.len();
                scopes.push((parent, subgraph.path_segment()));

                let indent = INDENT.repeat(depth);
                lines.push(format!("{indent}subgraph \"{}\"", subgraph.title()));
                for node in &subgraph.nodes {
                    let line = node_line(node, depth + 1)
                        .ok_or_else(|| Error::MissingNodeId {
                            scope: scope_path(&scopes, scope),
                        })?;
                    lines.push(line);
                }

                stack.push(Frame::Close { subgraph, depth });
                for child in subgraph.children.iter().rev() {
                    stack.push(Frame::Open {
                        subgraph: child,
                        depth: depth + 1,
                        parent: Some(scope),
                    });
                }
            }
            Frame::Close { subgraph, depth } => {
                lines.push(format!("{}end", INDENT.repeat(depth)));
                for edge in &subgraph.edges {
                    lines.push(edge_line(edge, depth + 1)?);
                }
            }
        }
    }

    Ok(())
}

fn scope_path(scopes: &[(Option<usize>, &str)], mut index: usize) -> String {
    let mut segments = Vec::new();
    loop {
        let (parent, segment) = scopes[index];
        segments.push(segment);
        match parent {
            Some(p) => index = p,
            None => break,
        }
    }
    segments.reverse();
    segments.join("/")
}

fn node_line(node: &Node, depth: usize) -> Option<String> {
    let id = node.id.as_deref()?;
    let label = node.label.as_deref().unwrap_or(id);
    Some(format!(
        "{}{}[\"{}\"]",
        INDENT.repeat(depth),
        sanitize_id(id),
        escape_label(label)
    ))
}

fn edge_line(edge: &Edge, depth: usize) -> Result<String> {
    let source = edge
        .source
        .as_deref()
        .ok_or(Error::MissingEdgeEndpoint { endpoint: "source" })?;
    let target = edge
        .target
        .as_deref()
        .ok_or(Error::MissingEdgeEndpoint { endpoint: "target" })?;

    if edge.relationship_kind().is_none() {
        tracing::debug!(
            source,
            target,
            relationship = edge.relationship().unwrap_or(""),
            "edge relationship is not a known kind"
        );
    }

    Ok(format!(
        "{}{} -->|{}| {}",
        INDENT.repeat(depth),
        sanitize_id(source),
        edge_label(edge),
        sanitize_id(target)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_model::parse_graph;

    fn render_json(json: &str) -> String {
        render(&parse_graph(json).unwrap(), GraphLevel::High).unwrap()
    }

    #[test]
    fn render_empty_graph_is_header_only() {
        assert_eq!(render_json(r#"{"high_level": {}}"#), "graph TD");
    }

    #[test]
    fn render_without_high_level_still_emits_edges() {
        let output = render_json(r#"{"edge_index": [{"source": "a", "target": "b"}]}"#);
        assert_eq!(output, "graph TD\n    Na -->|relates| Nb");
    }

    #[test]
    fn render_node_label_defaults_to_id() {
        let output = render_json(r#"{"high_level": {"nodes": [{"id": "svc.api"}]}}"#);
        assert_eq!(output, "graph TD\n    Nsvc_api[\"svc.api\"]");
    }

    #[test]
    fn render_escapes_node_label_quotes() {
        let output =
            render_json(r#"{"high_level": {"nodes": [{"id": "a", "label": "say \"hi\""}]}}"#);
        assert_eq!(output, "graph TD\n    Na[\"say \\\"hi\\\"\"]");
    }

    #[test]
    fn render_subgraph_title_fallbacks() {
        let output = render_json(
            r#"{"high_level": {"children": [{"id": "g", "label": "Group"}, {"id": "h"}, {}]}}"#,
        );
        let expected = "\
graph TD
    subgraph \"Group\"
    end
    subgraph \"h\"
    end
    subgraph \"unnamed\"
    end";
        assert_eq!(output, expected);
    }

    #[test]
    fn render_nested_indentation() {
        let output = render_json(
            r#"{"high_level": {"children": [
                {"id": "outer", "nodes": [{"id": "x"}], "children": [
                    {"id": "inner", "nodes": [{"id": "y"}],
                     "edges": [{"source": "y", "target": "x", "type": "uses"}]}
                ], "edges": [{"source": "x", "target": "y"}]}
            ]}}"#,
        );
        let expected = "\
graph TD
    subgraph \"outer\"
        Nx[\"x\"]
        subgraph \"inner\"
            Ny[\"y\"]
        end
            Ny -->|uses| Nx
    end
        Nx -->|relates| Ny";
        assert_eq!(output, expected);
    }

    #[test]
    fn render_siblings_keep_input_order() {
        let output = render_json(
            r#"{"high_level": {"children": [
                {"id": "a", "children": [{"id": "a1"}, {"id": "a2"}]},
                {"id": "b"}
            ]}}"#,
        );
        let titles: Vec<&str> = output
            .lines()
            .filter(|l| l.trim_start().starts_with("subgraph"))
            .map(str::trim)
            .collect();
        assert_eq!(
            titles,
            vec![
                "subgraph \"a\"",
                "subgraph \"a1\"",
                "subgraph \"a2\"",
                "subgraph \"b\""
            ]
        );
    }

    #[test]
    fn render_deep_nesting_from_json() {
        let depth = 1_000;
        let mut json = String::from(r#"{"high_level": {"children": ["#);
        for i in 0..depth {
            json.push_str(&format!(
                r#"{{"id": "g{i}", "nodes": [{{"id": "n{i}"}}], "edges": [{{"source": "n{i}", "target": "n{i}", "type": "self"}}], "children": ["#
            ));
        }
        json.push_str(&"]}".repeat(depth));
        json.push_str("]}}");

        let output = render_json(&json);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1 + depth * 4);
        assert_eq!(lines[1], "    subgraph \"g0\"");
        assert_eq!(lines[2], "        Nn0[\"n0\"]");

        let innermost = format!("{}subgraph \"g{}\"", INDENT.repeat(depth), depth - 1);
        let close = format!("{}end", INDENT.repeat(depth));
        let last = depth - 1;
        let edge = format!("{}Nn{last} -->|self| Nn{last}", INDENT.repeat(depth + 1));
        assert_eq!(lines[depth * 2 - 1], innermost);
        assert_eq!(lines[depth * 2 + 1], close);
        assert_eq!(lines[depth * 2 + 2], edge);
        assert_eq!(*lines.last().unwrap(), "        Nn0 -->|self| Nn0");
    }

    #[test]
    fn render_prefers_edge_index_over_metadata() {
        let output = render_json(
            r#"{"high_level": {},
                "edge_index": [{"source": "a", "target": "b", "type": "calls"}],
                "metadata": {"edges": [{"source": "c", "target": "d", "type": "uses"}]}}"#,
        );
        assert_eq!(output, "graph TD\n    Na -->|calls| Nb");
    }

    #[test]
    fn render_falls_back_to_metadata_edges() {
        let output = render_json(
            r#"{"high_level": {}, "edge_index": [],
                "metadata": {"edges": [{"source": "c", "target": "d", "type": "uses"}]}}"#,
        );
        assert_eq!(output, "graph TD\n    Nc -->|uses| Nd");
    }

    #[test]
    fn render_rejects_unimplemented_levels() {
        let graph = parse_graph(r#"{"high_level": {}}"#).unwrap();
        for level in [GraphLevel::Module, GraphLevel::Detailed] {
            let err = render(&graph, level).unwrap_err();
            assert!(matches!(err, Error::UnsupportedLevel(l) if l == level));
        }
    }

    #[test]
    fn render_missing_node_id_is_error() {
        let graph =
            parse_graph(r#"{"high_level": {"children": [{"id": "g", "nodes": [{"label": "x"}]}]}}"#)
                .unwrap();
        let err = render(&graph, GraphLevel::High).unwrap_err();
        assert!(matches!(err, Error::MissingNodeId { ref scope } if scope == "g"));
    }

    #[test]
    fn render_missing_nested_node_id_reports_path() {
        let graph = parse_graph(
            r#"{"high_level": {"children": [{"id": "a", "children": [
                {"id": "b", "nodes": [{"id": "ok"}]},
                {"children": [{"id": "c", "nodes": [{}]}]}
            ]}]}}"#,
        )
        .unwrap();
        let err = render(&graph, GraphLevel::High).unwrap_err();
        assert!(matches!(err, Error::MissingNodeId { ref scope } if scope == "a/unnamed/c"));
    }

    #[test]
    fn render_missing_edge_target_is_error() {
        let graph = parse_graph(r#"{"edge_index": [{"source": "a", "type": "calls"}]}"#).unwrap();
        let err = render(&graph, GraphLevel::High).unwrap_err();
        assert!(matches!(err, Error::MissingEdgeEndpoint { endpoint: "target" }));
    }
}

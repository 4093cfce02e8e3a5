use crate::graph_model::Edge;

const FALLBACK_LABEL: &str = "relates";

pub fn edge_label(edge: &Edge) -> String {
    let Some(semantics) = edge.semantics() else {
        return plain_label(edge);
    };

    if let Some(description) = semantics
        .business_description
        .as_deref()
        .filter(|d| !d.is_empty())
    {
        return if semantics.is_async() {
            format!("{description} (async)")
        } else {
            description.to_string()
        };
    }

    let mut parts: Vec<&str> = Vec::new();
    if semantics.is_data_flow {
        parts.push("data");
    }
    if semantics.is_control_flow {
        parts.push("control");
    }
    if semantics.is_async() {
        parts.push("async");
    }
    if semantics.is_bidirectional() {
        parts.push("bidirectional");
    }

    if parts.is_empty() {
        return plain_label(edge);
    }

    let relationship = edge.relationship().unwrap_or("");
    let combined = parts.join(" ");
    if relationship.is_empty() {
        combined
    } else {
        format!("{combined} {relationship}")
    }
}

fn plain_label(edge: &Edge) -> String {
    edge.kind.as_deref().unwrap_or(FALLBACK_LABEL).to_string()
}

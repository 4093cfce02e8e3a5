use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_level: Option<Subgraph>,
    #[serde(default)]
    pub edge_index: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GraphMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub children: Vec<Subgraph>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Subgraph {
    pub fn title(&self) -> &str {
        self.label
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("unnamed")
    }

    pub fn path_segment(&self) -> &str {
        self.id.as_deref().unwrap_or("unnamed")
    }
}

// Nesting depth is unbounded, so children are torn down from a heap stack.
impl Drop for Subgraph {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut child) = stack.pop() {
            stack.append(&mut child.children);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EdgeMetadata>,
}

impl Edge {
    pub fn semantics(&self) -> Option<&Semantics> {
        self.metadata.as_ref().and_then(|m| m.semantics.as_ref())
    }

    pub fn relationship(&self) -> Option<&str> {
        match self.semantics().and_then(|s| s.relationship_type.as_ref()) {
            Some(explicit) => explicit.as_deref(),
            None => self.kind.as_deref(),
        }
    }

    pub fn relationship_kind(&self) -> Option<RelationshipType> {
        self.relationship().and_then(|r| r.parse().ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantics: Option<Semantics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Semantics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_data_flow: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_control_flow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    // `Some(None)` is an explicit null; it suppresses the type-tag fallback.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub relationship_type: Option<Option<String>>,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl Semantics {
    pub fn is_async(&self) -> bool {
        self.call_type.as_deref() == Some("async")
    }

    pub fn is_bidirectional(&self) -> bool {
        self.direction.as_deref() == Some("bidirectional")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum GraphLevel {
    #[default]
    High,
    Module,
    Detailed,
}

impl GraphLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            GraphLevel::High => "high",
            GraphLevel::Module => "module",
            GraphLevel::Detailed => "detailed",
        }
    }
}

impl fmt::Display for GraphLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraphLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(GraphLevel::High),
            "module" => Ok(GraphLevel::Module),
            "detailed" => Ok(GraphLevel::Detailed),
            other => Err(format!("unknown graph level: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipType {
    Import,
    Inheritance,
    Composition,
    Reference,
    Call,
    Implementation,
}

impl RelationshipType {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipType::Import => "import",
            RelationshipType::Inheritance => "inheritance",
            RelationshipType::Composition => "composition",
            RelationshipType::Reference => "reference",
            RelationshipType::Call => "call",
            RelationshipType::Implementation => "implementation",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "import" => Ok(RelationshipType::Import),
            "inheritance" => Ok(RelationshipType::Inheritance),
            "composition" => Ok(RelationshipType::Composition),
            "reference" => Ok(RelationshipType::Reference),
            "call" => Ok(RelationshipType::Call),
            "implementation" => Ok(RelationshipType::Implementation),
            other => Err(format!("unknown relationship type: {other}")),
        }
    }
}

pub fn parse_graph(input: &str) -> crate::error::Result<Graph> {
    let mut de = serde_json::Deserializer::from_str(input);
    de.disable_recursion_limit();
    let graph = Graph::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(graph)
}

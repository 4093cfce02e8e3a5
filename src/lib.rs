pub mod edge_label;
pub mod error;
pub mod graph_model;
pub mod graph_renderer;
pub mod graph_validator;
pub mod sanitize;

pub use error::{Error, Result};
pub use graph_model::{Graph, GraphLevel, parse_graph};
pub use graph_renderer::render;
pub use graph_validator::validate;

pub fn convert(input: &str, level: GraphLevel) -> Result<String> {
    let graph = parse_graph(input)?;
    render(&graph, level)
}

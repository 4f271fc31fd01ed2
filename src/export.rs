//! Read-only projections of the graph: JSON document, CSV table, and table rows.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::model::{Attributes, Graph, NodeId, RECOGNIZED_ATTRIBUTES};

#[derive(Debug, Serialize)]
pub struct GraphDocument<'a> {
    pub nodes: Vec<NodeRecord<'a>>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Serialize)]
pub struct NodeRecord<'a> {
    pub id: String,
    pub name: &'a str,
    pub properties: &'a Attributes,
}

#[derive(Debug, Serialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
}

impl<'a> GraphDocument<'a> {
    pub fn from_graph(graph: &'a Graph) -> Self {
        Self {
            nodes: graph
                .nodes()
                .iter()
                .map(|node| NodeRecord {
                    id: node.id.to_string(),
                    name: &node.name,
                    properties: &node.attributes,
                })
                .collect(),
            edges: graph
                .edges()
                .iter()
                .map(|edge| EdgeRecord {
                    source: edge.start.to_string(),
                    target: edge.end.to_string(),
                })
                .collect(),
        }
    }
}

pub fn to_json(graph: &Graph) -> Result<String> {
    Ok(serde_json::to_string_pretty(&GraphDocument::from_graph(graph))?)
}

/// One row per node: recognized attributes plus outgoing neighbor names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRow {
    pub id: NodeId,
    pub name: String,
    pub attributes: [String; 3],
    pub connections: Vec<String>,
}

pub fn table_rows(graph: &Graph) -> Vec<TableRow> {
    graph
        .nodes()
        .iter()
        .map(|node| TableRow {
            id: node.id,
            name: node.name.clone(),
            attributes: RECOGNIZED_ATTRIBUTES
                .map(|key| node.attribute(key).unwrap_or_default().to_owned()),
            connections: graph.outgoing_names(node.id),
        })
        .collect()
}

pub const CSV_HEADER: &str = "id,name,city,language,team,connections";

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

pub fn to_csv(graph: &Graph) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for row in table_rows(graph) {
        let mut fields = Vec::with_capacity(6);
        fields.push(quote(&row.id.to_string()));
        fields.push(quote(&row.name));
        fields.extend(row.attributes.iter().map(|value| quote(value)));
        fields.push(quote(&row.connections.join(";")));
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

pub fn write_json(graph: &Graph, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_json(graph)?)?;
    info!(path = %path.display(), nodes = graph.node_count(), "exported JSON");
    Ok(())
}

pub fn write_csv(graph: &Graph, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_csv(graph))?;
    info!(path = %path.display(), nodes = graph.node_count(), "exported CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn alice_and_bob() -> (Graph, NodeId, NodeId) {
        let mut graph = Graph::new();
        let mut attributes = Attributes::new();
        attributes.insert("city".to_owned(), "Oslo".to_owned());
        attributes.insert("language".to_owned(), "Norwegian".to_owned());
        attributes.insert("team".to_owned(), "Core".to_owned());
        let alice = graph.add_node("Alice".to_owned(), attributes, Vec3::ZERO, 0.9);
        let bob = graph.add_node("Bob".to_owned(), Attributes::new(), Vec3::ZERO, 0.9);
        graph.connect(alice, bob);
        (graph, alice, bob)
    }

    #[test]
    fn json_lists_nodes_and_edges() {
        let (graph, alice, bob) = alice_and_bob();
        let value: serde_json::Value =
            serde_json::from_str(&to_json(&graph).expect("json")).expect("parse");

        let edges = value["edges"].as_array().expect("edges array");
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0]["source"], alice.to_string());
        assert_eq!(edges[0]["target"], bob.to_string());
        assert_eq!(value["nodes"][0]["name"], "Alice");
        assert_eq!(value["nodes"][0]["properties"]["city"], "Oslo");
        assert_eq!(value["nodes"][1]["properties"], serde_json::json!({}));
    }

    #[test]
    fn csv_quotes_everything_and_lists_outgoing_names() {
        let (graph, _, _) = alice_and_bob();
        let csv = to_csv(&graph);
        let lines = csv.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], r#""n0","Alice","Oslo","Norwegian","Core","Bob""#);
        assert_eq!(lines[2], r#""n1","Bob","","","","""#);
    }

    #[test]
    fn csv_doubles_embedded_quotes() {
        let mut graph = Graph::new();
        graph.add_node(r#"Dwayne "The Rock""#.to_owned(), Attributes::new(), Vec3::ZERO, 0.9);
        let csv = to_csv(&graph);
        assert!(csv.contains(r#""Dwayne ""The Rock""","#));
    }

    #[test]
    fn write_json_creates_file() {
        let (graph, _, _) = alice_and_bob();
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("graph.json");

        write_json(&graph, &path).expect("write");

        let written = std::fs::read_to_string(&path).expect("read back");
        assert!(written.contains("\"Alice\""));
    }
}

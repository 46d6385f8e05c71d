use crate::error::Result;
use crate::memory::InMemoryLineageStore;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Output format for a whole-graph export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// One JSON object per vertex with its in/out edges
    #[default]
    Json,
    GraphMl,
}

#[derive(Serialize)]
struct AdjacentEdge<'a> {
    id: &'a str,
    label: &'a str,
    vertex: &'a str,
}

#[derive(Serialize)]
struct AdjacencyEntry<'a> {
    id: &'a str,
    display_name: &'a str,
    type_label: &'a str,
    is_process: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: &'a BTreeMap<String, Value>,
    in_edges: Vec<AdjacentEdge<'a>>,
    out_edges: Vec<AdjacentEdge<'a>>,
}

pub fn export(store: &InMemoryLineageStore, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => export_adjacency_json(store),
        ExportFormat::GraphMl => Ok(export_graphml(store)),
    }
}

/// Adjacency-list JSON, one line per vertex
pub fn export_adjacency_json(store: &InMemoryLineageStore) -> Result<String> {
    let graph = &store.graph;
    let mut out = String::new();
    for idx in graph.node_indices() {
        let vertex = &graph[idx];
        let in_edges = graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| AdjacentEdge {
                id: &e.weight().id,
                label: &e.weight().label,
                vertex: &graph[e.source()].id,
            })
            .collect();
        let out_edges = graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| AdjacentEdge {
                id: &e.weight().id,
                label: &e.weight().label,
                vertex: &graph[e.target()].id,
            })
            .collect();
        let entry = AdjacencyEntry {
            id: &vertex.id,
            display_name: &vertex.display_name,
            type_label: &vertex.type_label,
            is_process: vertex.is_process,
            properties: &vertex.properties,
            in_edges,
            out_edges,
        };
        out.push_str(&serde_json::to_string(&entry)?);
        out.push('\n');
    }
    Ok(out)
}

pub fn export_graphml(store: &InMemoryLineageStore) -> String {
    let graph = &store.graph;
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n");
    out.push_str("  <key id=\"displayName\" for=\"node\" attr.name=\"displayName\" attr.type=\"string\"/>\n");
    out.push_str("  <key id=\"typeLabel\" for=\"node\" attr.name=\"typeLabel\" attr.type=\"string\"/>\n");
    out.push_str("  <key id=\"isProcess\" for=\"node\" attr.name=\"isProcess\" attr.type=\"boolean\"/>\n");
    out.push_str("  <key id=\"label\" for=\"edge\" attr.name=\"label\" attr.type=\"string\"/>\n");
    out.push_str("  <graph id=\"lineage\" edgedefault=\"directed\">\n");

    for vertex in graph.node_weights() {
        let _ = writeln!(out, "    <node id=\"{}\">", escape_xml(&vertex.id));
        let _ = writeln!(
            out,
            "      <data key=\"displayName\">{}</data>",
            escape_xml(&vertex.display_name)
        );
        let _ = writeln!(
            out,
            "      <data key=\"typeLabel\">{}</data>",
            escape_xml(&vertex.type_label)
        );
        let _ = writeln!(out, "      <data key=\"isProcess\">{}</data>", vertex.is_process);
        out.push_str("    </node>\n");
    }

    for edge in graph.edge_weights() {
        let _ = writeln!(
            out,
            "    <edge id=\"{}\" source=\"{}\" target=\"{}\">",
            escape_xml(&edge.id),
            escape_xml(&edge.source),
            escape_xml(&edge.destination)
        );
        let _ = writeln!(out, "      <data key=\"label\">{}</data>", escape_xml(&edge.label));
        out.push_str("    </edge>\n");
    }

    out.push_str("  </graph>\n</graphml>\n");
    out
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

use crate::error::{LineageError, Result};
use crate::store::{Direction, LineageStore};
use lineage_protocol::{LineageEdge, LineageVertex};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// JSON layout accepted by [`InMemoryLineageStore`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineageDocument {
    #[serde(default)]
    pub vertices: Vec<LineageVertex>,
    #[serde(default)]
    pub edges: Vec<LineageEdge>,
}

/// Lineage graph held in memory (petgraph), indexed by node id
#[derive(Debug, Clone, Default)]
pub struct InMemoryLineageStore {
    pub(crate) graph: DiGraph<LineageVertex, LineageEdge>,
    node_index: HashMap<String, NodeIndex>,
}

impl InMemoryLineageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: LineageDocument) -> Result<Self> {
        let mut store = Self::new();
        for vertex in document.vertices {
            store.add_vertex(vertex)?;
        }
        for edge in document.edges {
            store.add_edge(edge)?;
        }
        log::debug!(
            "Loaded lineage graph: {} vertices, {} edges",
            store.vertex_count(),
            store.edge_count()
        );
        Ok(store)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let document: LineageDocument = serde_json::from_slice(bytes)?;
        Self::from_document(document)
    }

    pub fn add_vertex(&mut self, vertex: LineageVertex) -> Result<NodeIndex> {
        if vertex.id.trim().is_empty() {
            return Err(LineageError::InvalidGraph("vertex id must not be empty".to_string()));
        }
        if self.node_index.contains_key(&vertex.id) {
            return Err(LineageError::InvalidGraph(format!(
                "duplicate vertex id {}",
                vertex.id
            )));
        }
        let id = vertex.id.clone();
        let idx = self.graph.add_node(vertex);
        self.node_index.insert(id, idx);
        Ok(idx)
    }

    pub fn add_edge(&mut self, edge: LineageEdge) -> Result<()> {
        let source = self.index_of(&edge.source, &edge.id)?;
        let destination = self.index_of(&edge.destination, &edge.id)?;
        self.graph.add_edge(source, destination, edge);
        Ok(())
    }

    fn index_of(&self, id: &str, edge_id: &str) -> Result<NodeIndex> {
        self.node_index.get(id).copied().ok_or_else(|| {
            LineageError::InvalidGraph(format!("edge {edge_id} references unknown vertex {id}"))
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl LineageStore for InMemoryLineageStore {
    fn find_vertex(&self, id: &str) -> Result<Option<LineageVertex>> {
        Ok(self
            .node_index
            .get(id)
            .and_then(|&idx| self.graph.node_weight(idx))
            .cloned())
    }

    fn adjacent(
        &self,
        id: &str,
        label: &str,
        direction: Direction,
    ) -> Result<Vec<(LineageEdge, LineageVertex)>> {
        let Some(&idx) = self.node_index.get(id) else {
            return Ok(Vec::new());
        };
        let petgraph_direction = match direction {
            Direction::Incoming => petgraph::Direction::Incoming,
            Direction::Outgoing => petgraph::Direction::Outgoing,
        };

        Ok(self
            .graph
            .edges_directed(idx, petgraph_direction)
            .filter(|e| e.weight().label == label)
            .map(|e| {
                let far = match direction {
                    Direction::Incoming => e.source(),
                    Direction::Outgoing => e.target(),
                };
                (e.weight().clone(), self.graph[far].clone())
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(id: &str) -> LineageVertex {
        LineageVertex {
            id: id.to_string(),
            display_name: id.to_string(),
            type_label: "Table".to_string(),
            is_process: false,
            properties: Default::default(),
        }
    }

    fn edge(id: &str, source: &str, destination: &str, label: &str) -> LineageEdge {
        LineageEdge {
            id: id.to_string(),
            source: source.to_string(),
            destination: destination.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_adjacent_filters_label_and_direction() {
        let store = InMemoryLineageStore::from_document(LineageDocument {
            vertices: vec![vertex("a"), vertex("b"), vertex("c")],
            edges: vec![
                edge("e1", "a", "b", "flow"),
                edge("e2", "b", "c", "flow"),
                edge("e3", "c", "b", "semantic"),
            ],
        })
        .unwrap();

        let upstream = store.adjacent("b", "flow", Direction::Incoming).unwrap();
        assert_eq!(upstream.len(), 1);
        assert_eq!(upstream[0].1.id, "a");

        let downstream = store.adjacent("b", "flow", Direction::Outgoing).unwrap();
        assert_eq!(downstream[0].0.id, "e2");
        assert_eq!(downstream[0].1.id, "c");

        assert!(store.adjacent("missing", "flow", Direction::Outgoing).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_duplicate_vertex() {
        let err = InMemoryLineageStore::from_document(LineageDocument {
            vertices: vec![vertex("a"), vertex("a")],
            edges: vec![],
        })
        .unwrap_err();
        assert!(matches!(err, LineageError::InvalidGraph(_)));
    }

    #[test]
    fn test_rejects_edge_to_unknown_vertex() {
        let err = InMemoryLineageStore::from_document(LineageDocument {
            vertices: vec![vertex("a")],
            edges: vec![edge("e1", "a", "zz", "flow")],
        })
        .unwrap_err();
        assert!(err.to_string().contains("zz"));
    }
}

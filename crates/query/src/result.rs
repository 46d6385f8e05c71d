use lineage_protocol::{LineageEdge, LineageResponse, LineageVertex};
use std::collections::{BTreeSet, HashMap};

/// Vertices and edges selected by a lineage query.
///
/// Iteration order is unspecified; use [`LineageResult::into_sorted_response`]
/// when a stable order matters.
#[derive(Debug, Clone, Default)]
pub struct LineageResult {
    vertices: HashMap<String, LineageVertex>,
    edges: HashMap<String, LineageEdge>,
    terminals: BTreeSet<String>,
}

impl LineageResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the vertex was already present
    pub fn add_vertex(&mut self, vertex: LineageVertex) -> bool {
        if self.vertices.contains_key(&vertex.id) {
            return false;
        }
        self.vertices.insert(vertex.id.clone(), vertex);
        true
    }

    pub fn add_edge(&mut self, edge: LineageEdge) {
        self.edges.entry(edge.id.clone()).or_insert(edge);
    }

    pub fn mark_terminal(&mut self, id: &str) {
        self.terminals.insert(id.to_string());
    }

    pub fn vertex(&self, id: &str) -> Option<&LineageVertex> {
        self.vertices.get(id)
    }

    pub fn contains_vertex(&self, id: &str) -> bool {
        self.vertices.contains_key(id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &LineageVertex> {
        self.vertices.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &LineageEdge> {
        self.edges.values()
    }

    /// Terminal vertex ids of an ultimate source/destination walk
    pub fn terminals(&self) -> &BTreeSet<String> {
        &self.terminals
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    /// Drop every vertex matching `remove` together with the edges touching it
    pub fn remove_vertices_where(&mut self, mut remove: impl FnMut(&LineageVertex) -> bool) -> usize {
        let before = self.vertices.len();
        self.vertices.retain(|_, vertex| !remove(vertex));
        let vertices = &self.vertices;
        self.edges.retain(|_, edge| {
            vertices.contains_key(&edge.source) && vertices.contains_key(&edge.destination)
        });
        self.terminals.retain(|id| vertices.contains_key(id));
        before - self.vertices.len()
    }

    pub fn into_response(self) -> LineageResponse {
        LineageResponse {
            vertices: self.vertices.into_values().collect(),
            edges: self.edges.into_values().collect(),
            terminals: self.terminals.into_iter().collect(),
        }
    }

    /// Response with vertices and edges ordered by id
    pub fn into_sorted_response(self) -> LineageResponse {
        let mut response = self.into_response();
        response.vertices.sort_by(|a, b| a.id.cmp(&b.id));
        response.edges.sort_by(|a, b| a.id.cmp(&b.id));
        response
    }
}

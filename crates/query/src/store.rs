use crate::error::Result;
use lineage_protocol::{LineageEdge, LineageVertex};

/// Direction of a single hop relative to the current vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Follow edges pointing at the vertex (upstream)
    Incoming,
    /// Follow edges leaving the vertex (downstream)
    Outgoing,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Incoming, Direction::Outgoing];
}

/// Traversal source over the persisted lineage graph.
///
/// Implementations are read-only; concurrent queries are as isolated as the
/// backing store makes them.
pub trait LineageStore {
    /// Vertex with node id `id`
    fn find_vertex(&self, id: &str) -> Result<Option<LineageVertex>>;

    /// Edges labelled `label` incident to `id` in `direction`, each paired
    /// with the vertex at its far end
    fn adjacent(
        &self,
        id: &str,
        label: &str,
        direction: Direction,
    ) -> Result<Vec<(LineageEdge, LineageVertex)>>;
}

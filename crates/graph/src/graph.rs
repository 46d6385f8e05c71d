use crate::types::{ContextEdge, ContextGraph, Entity, RelationshipKind};
use lineage_protocol::{AssetContextResponse, ContextEdge as WireEdge, ContextNode};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

impl ContextGraph {
    /// Entities reached from `guid` over outgoing edges of `kind`
    pub fn outgoing(&self, guid: &str, kind: RelationshipKind) -> Vec<&Entity> {
        self.neighbors(guid, kind, Direction::Outgoing)
    }

    /// Entities pointing at `guid` over edges of `kind`
    pub fn incoming(&self, guid: &str, kind: RelationshipKind) -> Vec<&Entity> {
        self.neighbors(guid, kind, Direction::Incoming)
    }

    fn neighbors(&self, guid: &str, kind: RelationshipKind, direction: Direction) -> Vec<&Entity> {
        let Some(idx) = self.find_node(guid) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, direction)
            .filter(|e| e.weight().relationship_type == kind.type_name())
            .filter_map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                self.get_node(other)
            })
            .collect()
    }

    /// All edges as (from, to, edge)
    pub fn edges(&self) -> impl Iterator<Item = (&Entity, &Entity, &ContextEdge)> {
        self.graph
            .edge_references()
            .map(move |e| (&self.graph[e.source()], &self.graph[e.target()], e.weight()))
    }

    /// Edges of a single relationship type
    pub fn edges_of_type(&self, kind: RelationshipKind) -> Vec<(&Entity, &Entity, &ContextEdge)> {
        self.edges()
            .filter(|(_, _, edge)| edge.relationship_type == kind.type_name())
            .collect()
    }

    pub fn to_response(&self) -> AssetContextResponse {
        let nodes = self
            .nodes()
            .map(|entity| ContextNode {
                guid: entity.guid.clone(),
                type_name: entity.type_name.clone(),
                properties: entity.properties.clone(),
            })
            .collect();

        let edges = self
            .edges()
            .map(|(from, to, edge)| WireEdge {
                guid: edge.relationship_guid.clone(),
                type_name: edge.relationship_type.clone(),
                from: from.guid.clone(),
                to: to.guid.clone(),
            })
            .collect();

        AssetContextResponse {
            seed: self.seed().to_string(),
            nodes,
            edges,
        }
    }
}

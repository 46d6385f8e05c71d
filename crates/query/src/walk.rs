use crate::error::Result;
use crate::result::LineageResult;
use crate::store::{Direction, LineageStore};
use lineage_protocol::LineageVertex;
use std::collections::{HashSet, VecDeque};

/// How a scope walks the lineage graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WalkPlan {
    pub labels: Vec<String>,
    pub directions: Vec<Direction>,
    /// `None` walks until the frontier is exhausted
    pub max_hops: Option<usize>,
    /// Record vertices without a further edge in the walked direction
    pub track_terminals: bool,
}

/// Frontier / visited bookkeeping for one walk
struct WalkState {
    frontier: VecDeque<(String, usize)>,
    visited: HashSet<String>,
}

impl WalkState {
    fn new(start: &str) -> Self {
        let mut visited = HashSet::new();
        visited.insert(start.to_string());
        Self {
            frontier: VecDeque::from([(start.to_string(), 0)]),
            visited,
        }
    }

    fn next(&mut self) -> Option<(String, usize)> {
        self.frontier.pop_front()
    }

    /// Returns `true` the first time `id` is reached
    fn visit(&mut self, id: &str, depth: usize, max_hops: Option<usize>) -> bool {
        if !self.visited.insert(id.to_string()) {
            return false;
        }
        if max_hops.map_or(true, |max| depth < max) {
            self.frontier.push_back((id.to_string(), depth));
        }
        true
    }
}

/// Walk from `start` according to `plan`.
///
/// A start vertex without any matching edge yields an empty result.
pub(crate) fn walk<S: LineageStore + ?Sized>(
    store: &S,
    start: &LineageVertex,
    plan: &WalkPlan,
) -> Result<LineageResult> {
    let mut result = LineageResult::new();
    let mut state = WalkState::new(&start.id);
    result.add_vertex(start.clone());

    while let Some((current, depth)) = state.next() {
        let mut expanded = false;
        for &direction in &plan.directions {
            for label in &plan.labels {
                for (edge, vertex) in store.adjacent(&current, label, direction)? {
                    expanded = true;
                    result.add_edge(edge);
                    if state.visit(&vertex.id, depth + 1, plan.max_hops) {
                        result.add_vertex(vertex);
                    }
                }
            }
        }
        if plan.track_terminals && !expanded && current != start.id {
            result.mark_terminal(&current);
        }
    }

    if result.edge_count() == 0 {
        return Ok(LineageResult::new());
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryLineageStore, LineageDocument};
    use lineage_protocol::LineageEdge;

    fn vertex(id: &str) -> LineageVertex {
        LineageVertex {
            id: id.to_string(),
            display_name: id.to_string(),
            type_label: "Table".to_string(),
            is_process: false,
            properties: Default::default(),
        }
    }

    fn chain(ids: &[&str]) -> InMemoryLineageStore {
        let edges = ids
            .windows(2)
            .map(|w| LineageEdge {
                id: format!("{}->{}", w[0], w[1]),
                source: w[0].to_string(),
                destination: w[1].to_string(),
                label: "flow".to_string(),
            })
            .collect();
        InMemoryLineageStore::from_document(LineageDocument {
            vertices: ids.iter().map(|id| vertex(id)).collect(),
            edges,
        })
        .unwrap()
    }

    fn plan(directions: Vec<Direction>, max_hops: Option<usize>) -> WalkPlan {
        WalkPlan {
            labels: vec!["flow".to_string()],
            directions,
            max_hops,
            track_terminals: true,
        }
    }

    #[test]
    fn test_hop_limit_bounds_walk() {
        let store = chain(&["a", "b", "c", "d"]);
        let start = vertex("d");
        let one_hop = walk(&store, &start, &plan(vec![Direction::Incoming], Some(1))).unwrap();
        assert_eq!(one_hop.vertex_count(), 2);
        assert_eq!(one_hop.edge_count(), 1);
    }

    #[test]
    fn test_cycle_terminates_without_terminals() {
        let mut store = chain(&["a", "b"]);
        store
            .add_edge(LineageEdge {
                id: "b->a".to_string(),
                source: "b".to_string(),
                destination: "a".to_string(),
                label: "flow".to_string(),
            })
            .unwrap();
        let result = walk(&store, &vertex("a"), &plan(vec![Direction::Incoming], None)).unwrap();
        assert_eq!(result.vertex_count(), 2);
        assert!(result.terminals().is_empty());
    }

    #[test]
    fn test_isolated_start_is_empty() {
        let store = chain(&["solo"]);
        let result = walk(&store, &vertex("solo"), &plan(Direction::BOTH.to_vec(), None)).unwrap();
        assert!(result.is_empty());
    }
}

//! Side-link forest validation
//!
//! Builds a directed graph with an edge from every record to each face it
//! owns and checks that the result is a forest one level deep.

use std::collections::HashMap;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::models::Card;

/// Error during side-link validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FaceGraphError {
    #[error("Face '{face}' is claimed by {owners} owners")]
    MultipleOwners { face: String, owners: usize },
    #[error("Side links form a cycle")]
    Cycle,
    #[error("Face '{0}' is attached to a primary and owns sides of its own")]
    NestedFace(String),
}

/// Summary of a successful forest check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceForestReport {
    pub primaries: usize,
    pub faces: usize,
}

struct FaceGraph {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl FaceGraph {
    fn node(&mut self, id: String) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(&id) {
            return idx;
        }
        let idx = self.graph.add_node(id.clone());
        self.nodes.insert(id, idx);
        idx
    }

    /// Add `card` and, recursively, every face it owns
    fn add(&mut self, card: &Card, fallback_id: String) -> NodeIndex {
        let id = card.uuid.clone().unwrap_or(fallback_id);
        let owner = self.node(id.clone());
        for (side, face) in card.sides() {
            let child = self.add(face, format!("{id}#{side}"));
            self.graph.add_edge(owner, child, ());
        }
        owner
    }
}

/// Check that the side links of `cards` form a one-level forest.
///
/// Records without a `uuid` get a positional id, so they can only collide with
/// each other through their owner.
pub fn check_face_forest(cards: &[Card]) -> Result<FaceForestReport, FaceGraphError> {
    let mut fg = FaceGraph {
        graph: DiGraph::new(),
        nodes: HashMap::new(),
    };
    for (idx, card) in cards.iter().enumerate() {
        fg.add(card, format!("#{idx}"));
    }

    if is_cyclic_directed(&fg.graph) {
        return Err(FaceGraphError::Cycle);
    }

    let mut report = FaceForestReport::default();
    for idx in fg.graph.node_indices() {
        let owners = fg.graph.neighbors_directed(idx, Direction::Incoming).count();
        let owned = fg.graph.neighbors_directed(idx, Direction::Outgoing).count();
        if owners > 1 {
            return Err(FaceGraphError::MultipleOwners {
                face: fg.graph[idx].clone(),
                owners,
            });
        }
        if owners == 1 && owned > 0 {
            return Err(FaceGraphError::NestedFace(fg.graph[idx].clone()));
        }
        if owners == 0 {
            report.primaries += 1;
        } else {
            report.faces += 1;
        }
    }
    Ok(report)
}

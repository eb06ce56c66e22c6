use crate::position::Position;
use petgraph::graph::{DiGraph, NodeIndex};

/// a directed graph over cells. cells are opaque indices; edges record
/// adjacency only, with no payload of their own.
#[derive(Debug, Clone)]
pub struct PlayGraph {
    graph: DiGraph<(), ()>,
    nodes: Vec<NodeIndex>,
}

impl PlayGraph {
    /// build a play graph from an adjacency list: `adjacency[i]` lists the
    /// cells reachable from cell `i`.
    pub fn new(adjacency: Vec<Vec<usize>>) -> Self {
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..adjacency.len()).map(|_| graph.add_node(())).collect();
        for (from, neighbors) in adjacency.iter().enumerate() {
            for &to in neighbors {
                graph.add_edge(nodes[from], nodes[to], ());
            }
        }
        Self { graph, nodes }
    }

    /// a play graph with `n` isolated cells and no edges.
    pub fn disconnected(n: usize) -> Self {
        Self::new(vec![Vec::new(); n])
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// neighboring positions, always addressed by top-of-stack.
    pub fn neighbors(&self, position: &Position) -> Vec<Position> {
        self.graph
            .neighbors(self.nodes[position.cell()])
            .map(|idx| Position::top(idx.index()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_round_trips() {
        let g = PlayGraph::new(vec![vec![1, 2], vec![2], vec![]]);
        assert_eq!(g.size(), 3);
        let mut n0 = g
            .neighbors(&Position::top(0))
            .into_iter()
            .map(|p| p.cell())
            .collect::<Vec<_>>();
        n0.sort_unstable();
        assert_eq!(n0, vec![1, 2]);
        assert!(g.neighbors(&Position::top(2)).is_empty());
    }

    #[test]
    fn disconnected_has_no_edges() {
        let g = PlayGraph::disconnected(3);
        assert!(g.neighbors(&Position::top(1)).is_empty());
    }
}

use super::collection::Collection;
use super::state::BeliefState;
use crate::graph::PlayGraph;
use crate::piece_type::PieceType;
use crate::player::PlayerId;
use crate::position::Position;
use crate::pov::PointOfView;
use crate::value::PieceValue;

struct Declared {
    piece_type: PieceType,
    true_value: PieceValue,
    position: Position,
    observers: Vec<PlayerId>,
}

/// assembles a [`BeliefState`] from ground-truth pieces: their true
/// value, where they sit, and who has already observed them. pieces
/// sharing a [`PieceType`] become one collection, with the value counts
/// derived from how many of them truly hold each value.
pub struct BeliefStateBuilder {
    num_players: usize,
    graph: PlayGraph,
    declared: Vec<Declared>,
}

impl BeliefStateBuilder {
    pub fn new(num_players: usize, graph: PlayGraph) -> Self {
        Self {
            num_players,
            graph,
            declared: Vec::new(),
        }
    }

    /// declare one piece of ground truth. `observers` are the players (if
    /// any) who already know this piece's true value before the state is
    /// built.
    pub fn with_piece(
        mut self,
        piece_type: PieceType,
        true_value: PieceValue,
        position: Position,
        observers: Vec<PlayerId>,
    ) -> Self {
        self.declared.push(Declared {
            piece_type,
            true_value,
            position,
            observers,
        });
        self
    }

    pub fn build(self, pov: PointOfView) -> BeliefState {
        let mut groups: Vec<(PieceType, Vec<usize>)> = Vec::new();
        for (i, d) in self.declared.iter().enumerate() {
            match groups.iter_mut().find(|(ty, _)| *ty == d.piece_type) {
                Some((_, members)) => members.push(i),
                None => groups.push((d.piece_type.clone(), vec![i])),
            }
        }

        let mut collections = Vec::with_capacity(groups.len());
        for (piece_type, members) in groups {
            let mut counts = vec![0usize; piece_type.size()];
            for &i in &members {
                counts[piece_type.index_of(&self.declared[i].true_value)] += 1;
            }
            let mut collection = Collection::new(piece_type.clone(), counts);
            for (local, &i) in members.iter().enumerate() {
                let d = &self.declared[i];
                collection.place(local, d.position);
                let seen = collection.add_observers(local, &d.observers, pov, self.num_players);
                if seen {
                    let value = piece_type.index_of(&d.true_value);
                    collection.assign_piece_value(local, value);
                }
            }
            collection.finalize();
            collections.push(collection);
        }

        BeliefState::new(pov, self.num_players, self.graph, collections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{AttributeValue, PieceAttribute};

    fn suit(name: &str) -> PieceValue {
        PieceValue::new(vec![PieceAttribute::new("suit", AttributeValue::Str(name.into()))])
    }

    #[test]
    fn unseen_piece_starts_undetermined_but_counted() {
        let piece_type = PieceType::new(vec![suit("clubs"), suit("hearts")]);
        let state = BeliefStateBuilder::new(2, PlayGraph::disconnected(1))
            .with_piece(piece_type.clone(), suit("clubs"), Position::slot(0, 0), vec![])
            .with_piece(piece_type, suit("hearts"), Position::slot(0, 1), vec![])
            .build(PointOfView::Private(0));
        let pieces = state.get_pieces_at(0);
        assert_eq!(pieces.len(), 2);
        assert!(!pieces[0].is_determined());
        assert!((pieces[0].probability(&suit("clubs")) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn observed_piece_starts_determined_for_the_observer() {
        let piece_type = PieceType::new(vec![suit("clubs"), suit("hearts")]);
        let state = BeliefStateBuilder::new(2, PlayGraph::disconnected(1))
            .with_piece(piece_type.clone(), suit("clubs"), Position::slot(0, 0), vec![0])
            .with_piece(piece_type, suit("hearts"), Position::slot(0, 1), vec![])
            .build(PointOfView::Private(0));
        let pieces = state.get_pieces_at(0);
        assert!(pieces[0].is_determined());
        assert_eq!(pieces[0].value(), &suit("clubs"));
    }

    #[test]
    fn world_pov_sees_anything_anyone_has_observed() {
        let piece_type = PieceType::new(vec![suit("clubs"), suit("hearts")]);
        let state = BeliefStateBuilder::new(2, PlayGraph::disconnected(1))
            .with_piece(piece_type.clone(), suit("clubs"), Position::slot(0, 0), vec![1])
            .with_piece(piece_type, suit("hearts"), Position::slot(0, 1), vec![0])
            .build(PointOfView::World);
        assert!(state.is_determined());
    }
}

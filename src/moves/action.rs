use super::primitive::Move;
use super::transition::ProbTransition;
use crate::belief::BeliefState;
use rand::RngCore;

/// an ordered sequence of moves applied as one unit. `apply` convolves
/// every move's branches together, multiplying probabilities across the
/// cartesian product; `apply_inplace` just runs each move's sampled
/// resolution in turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Action {
    moves: Vec<Move>,
}

impl Action {
    pub fn new(moves: Vec<Move>) -> Self {
        Self { moves }
    }

    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn apply(&self, state: &BeliefState) -> Vec<ProbTransition> {
        let mut branches = vec![ProbTransition::new(state.clone(), 1.0)];
        for mv in &self.moves {
            let mut next = Vec::new();
            for branch in branches {
                for t in mv.apply(&branch.state) {
                    next.push(ProbTransition::new(t.state, branch.probability * t.probability));
                }
            }
            branches = next;
        }
        branches
    }

    pub fn apply_inplace(&self, state: &mut BeliefState, rng: &mut dyn RngCore) {
        for mv in &self.moves {
            mv.apply_inplace(state, rng);
        }
    }
}

impl FromIterator<Move> for Action {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::BeliefStateBuilder;
    use crate::graph::PlayGraph;
    use crate::moves::primitive::RevealScope;
    use crate::piece_type::PieceType;
    use crate::position::Position;
    use crate::pov::PointOfView;
    use crate::value::{AttributeValue, PieceAttribute, PieceValue};

    fn suit(name: &str) -> PieceValue {
        PieceValue::new(vec![PieceAttribute::new("suit", AttributeValue::Str(name.into()))])
    }

    #[test]
    fn two_reveals_convolve_probabilities() {
        let piece_type = PieceType::new(vec![suit("clubs"), suit("hearts")]);
        let state = BeliefStateBuilder::new(2, PlayGraph::disconnected(1))
            .with_piece(piece_type.clone(), suit("clubs"), Position::slot(0, 0), vec![])
            .with_piece(piece_type, suit("hearts"), Position::slot(0, 1), vec![])
            .build(PointOfView::Private(0));

        let action = Action::new(vec![
            Move::Reveal {
                scope: RevealScope::Position(Position::slot(0, 0)),
                observers: vec![0],
            },
            Move::Reveal {
                scope: RevealScope::Position(Position::slot(0, 1)),
                observers: vec![0],
            },
        ]);
        let branches = action.apply(&state);
        // the second piece is forced once the first is known, so only two
        // joint outcomes survive, each at probability one half.
        assert_eq!(branches.len(), 2);
        for b in &branches {
            assert!((b.probability - 0.5).abs() < 1e-6);
            assert!(b.state.is_determined());
        }
    }
}

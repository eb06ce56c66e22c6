use super::transition::ProbTransition;
use crate::belief::BeliefState;
use crate::player::PlayerId;
use crate::position::Position;
use crate::value::PieceValue;
use crate::variable::VariableValue;
use rand::RngCore;
use std::fmt::Debug;

/// where a [`Move::Reveal`] applies: a single slot, or an entire stack
/// (every occupied position at a cell, revealed in stack order with each
/// piece's marginals reflecting the narrowing from the pieces before it).
#[derive(Debug, Clone, PartialEq)]
pub enum RevealScope {
    Position(Position),
    Stack(usize),
}

/// one indivisible change to a belief state. every variant but
/// [`Move::Reveal`] is deterministic (a single successor at probability
/// one); `Reveal` branches over which value the revealed piece turns out
/// to hold.
///
/// the closed set covers every primitive the engine itself understands.
/// [`Move::Custom`] is the escape hatch for game-specific bookkeeping that
/// doesn't belong in the core algebra.
#[derive(Debug, Clone)]
pub enum Move {
    MovePiece { from: Position, to: Position },
    RemovePiece { position: Position },
    RemovePieceValue { position: Position, value: PieceValue },
    RemovePieceValues { position: Position, values: Vec<PieceValue> },
    AssignPieceValue { position: Position, value: PieceValue },
    Reveal { scope: RevealScope, observers: Vec<PlayerId> },
    SetObservers { position: Position, observers: Vec<PlayerId> },
    Shuffle { cell: usize },
    SetNextPlayer { player: PlayerId },
    SetNextPlayers { players: Vec<PlayerId> },
    SetVariable { name: String, value: VariableValue },
    Custom(Box<dyn CustomMove>),
}

/// the extensibility seam for move types a specific game needs that the
/// core algebra does not already express.
pub trait CustomMove: Debug {
    fn apply(&self, state: &BeliefState) -> Vec<ProbTransition>;
    fn apply_inplace(&self, state: &mut BeliefState, rng: &mut dyn RngCore);
    fn clone_box(&self) -> Box<dyn CustomMove>;
}

impl Clone for Box<dyn CustomMove> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// structural equality for the built-in variants; a [`Move::Custom`] is
/// compared by its debug representation, since a game-specific move has
/// no structural shape the core algebra can inspect.
impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Move::MovePiece { from: f1, to: t1 }, Move::MovePiece { from: f2, to: t2 }) => f1 == f2 && t1 == t2,
            (Move::RemovePiece { position: p1 }, Move::RemovePiece { position: p2 }) => p1 == p2,
            (
                Move::RemovePieceValue { position: p1, value: v1 },
                Move::RemovePieceValue { position: p2, value: v2 },
            ) => p1 == p2 && v1 == v2,
            (
                Move::RemovePieceValues { position: p1, values: v1 },
                Move::RemovePieceValues { position: p2, values: v2 },
            ) => p1 == p2 && v1 == v2,
            (
                Move::AssignPieceValue { position: p1, value: v1 },
                Move::AssignPieceValue { position: p2, value: v2 },
            ) => p1 == p2 && v1 == v2,
            (
                Move::Reveal { scope: s1, observers: o1 },
                Move::Reveal { scope: s2, observers: o2 },
            ) => s1 == s2 && o1 == o2,
            (
                Move::SetObservers { position: p1, observers: o1 },
                Move::SetObservers { position: p2, observers: o2 },
            ) => p1 == p2 && o1 == o2,
            (Move::Shuffle { cell: c1 }, Move::Shuffle { cell: c2 }) => c1 == c2,
            (Move::SetNextPlayer { player: p1 }, Move::SetNextPlayer { player: p2 }) => p1 == p2,
            (Move::SetNextPlayers { players: p1 }, Move::SetNextPlayers { players: p2 }) => p1 == p2,
            (
                Move::SetVariable { name: n1, value: v1 },
                Move::SetVariable { name: n2, value: v2 },
            ) => n1 == n2 && v1 == v2,
            (Move::Custom(a), Move::Custom(b)) => format!("{a:?}") == format!("{b:?}"),
            _ => false,
        }
    }
}

impl Move {
    /// every probability-weighted way this move could resolve against
    /// `state`, leaving `state` itself untouched.
    pub fn apply(&self, state: &BeliefState) -> Vec<ProbTransition> {
        match self {
            Move::MovePiece { from, to } => {
                let mut next = state.clone();
                next.move_piece(*from, *to);
                single(next)
            }
            Move::RemovePiece { position } => {
                let mut next = state.clone();
                next.remove_piece(*position);
                single(next)
            }
            Move::RemovePieceValue { position, value } => {
                let mut next = state.clone();
                next.remove_piece_value(*position, value);
                single(next)
            }
            Move::RemovePieceValues { position, values } => {
                let mut next = state.clone();
                next.remove_piece_values(*position, values);
                single(next)
            }
            Move::AssignPieceValue { position, value } => {
                let mut next = state.clone();
                next.assign_piece_value(*position, value);
                single(next)
            }
            Move::Reveal { scope, observers } => reveal(state, scope, observers),
            Move::SetObservers { position, observers } => {
                let mut next = state.clone();
                next.hide(*position);
                next.add_observers(*position, observers);
                single(next)
            }
            Move::Shuffle { cell } => {
                let mut next = state.clone();
                next.hide_cell(*cell);
                next.shuffle(*cell);
                single(next)
            }
            Move::SetNextPlayer { player } => {
                let mut next = state.clone();
                next.set_current_player(*player);
                single(next)
            }
            Move::SetNextPlayers { players } => {
                let mut next = state.clone();
                next.set_current_players(players.clone());
                single(next)
            }
            Move::SetVariable { name, value } => {
                let mut next = state.clone();
                next.set_variable(name.clone(), value.clone());
                single(next)
            }
            Move::Custom(custom) => custom.apply(state),
        }
    }

    /// sample one resolution of this move and apply it to `state` in
    /// place. every variant but `Reveal` folds its chosen branch's
    /// probability into the state's running total; `Reveal` samples the
    /// revealed identity uniformly among the piece's remaining candidates
    /// and leaves the running probability untouched, matching a player
    /// drawing a card rather than the engine reweighting its belief.
    pub fn apply_inplace(&self, state: &mut BeliefState, rng: &mut dyn RngCore) {
        match self {
            Move::Custom(custom) => custom.apply_inplace(state, rng),
            Move::Reveal { scope, observers } => reveal_inplace(state, scope, observers, rng),
            _ => {
                let branches = self.apply(state);
                let (chosen, weight) = sample(branches, rng);
                *state = chosen;
                state.scale_probability(weight);
            }
        }
    }
}

fn single(next: BeliefState) -> Vec<ProbTransition> {
    vec![ProbTransition::new(next, 1.0)]
}

fn reveal(state: &BeliefState, scope: &RevealScope, observers: &[PlayerId]) -> Vec<ProbTransition> {
    match scope {
        RevealScope::Position(position) => reveal_one(state.clone(), *position, observers),
        RevealScope::Stack(cell) => {
            let positions = stack_positions(state, *cell);
            let mut branches = vec![(state.clone(), 1.0)];
            for position in positions {
                let mut next_branches = Vec::new();
                for (branch_state, branch_weight) in branches {
                    for t in reveal_one(branch_state, position, observers) {
                        next_branches.push((t.state, branch_weight * t.probability));
                    }
                }
                branches = next_branches;
            }
            branches
                .into_iter()
                .map(|(s, w)| ProbTransition::new(s, w))
                .collect()
        }
    }
}

fn reveal_one(mut next: BeliefState, position: Position, observers: &[PlayerId]) -> Vec<ProbTransition> {
    let seen = next.add_observers(position, observers);
    if !seen {
        return single(next);
    }
    let piece = next.get_piece_at(position);
    piece
        .values()
        .iter()
        .map(|value| {
            let weight = piece.probability(value);
            let mut branch = next.clone();
            branch.assign_piece_value(position, value);
            ProbTransition::new(branch, weight)
        })
        .collect()
}

fn reveal_inplace(state: &mut BeliefState, scope: &RevealScope, observers: &[PlayerId], rng: &mut dyn RngCore) {
    match scope {
        RevealScope::Position(position) => reveal_one_inplace(state, *position, observers, rng),
        RevealScope::Stack(cell) => {
            for position in stack_positions(state, *cell) {
                reveal_one_inplace(state, position, observers, rng);
            }
        }
    }
}

fn reveal_one_inplace(state: &mut BeliefState, position: Position, observers: &[PlayerId], rng: &mut dyn RngCore) {
    if !state.add_observers(position, observers) {
        return;
    }
    let piece = state.get_piece_at(position);
    let values = piece.values();
    let index = ((uniform01(rng) * values.len() as f64) as usize).min(values.len() - 1);
    let value = values[index].clone();
    state.assign_piece_value(position, &value);
}

fn stack_positions(state: &BeliefState, cell: usize) -> Vec<Position> {
    state
        .get_pieces_at(cell)
        .iter()
        .enumerate()
        .map(|(stack, _)| Position::slot(cell, stack))
        .collect()
}

fn sample(branches: Vec<ProbTransition>, rng: &mut dyn RngCore) -> (BeliefState, f64) {
    let total: f64 = branches.iter().map(|t| t.probability).sum();
    assert!(total > 0.0, "a move produced no feasible branch");
    let mut x = uniform01(rng) * total;
    for t in &branches {
        if x < t.probability {
            return (t.state.clone(), t.probability);
        }
        x -= t.probability;
    }
    let last = branches.last().expect("a move produced no feasible branch");
    (last.state.clone(), last.probability)
}

fn uniform01(rng: &mut dyn RngCore) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PlayGraph;
    use crate::piece_type::PieceType;
    use crate::pov::PointOfView;
    use crate::value::{AttributeValue, PieceAttribute};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn suit(name: &str) -> PieceValue {
        PieceValue::new(vec![PieceAttribute::new("suit", AttributeValue::Str(name.into()))])
    }

    fn two_card_state() -> BeliefState {
        let piece_type = PieceType::new(vec![suit("clubs"), suit("hearts")]);
        crate::belief::BeliefStateBuilder::new(2, PlayGraph::disconnected(1))
            .with_piece(piece_type.clone(), suit("clubs"), Position::slot(0, 0), vec![])
            .with_piece(piece_type, suit("hearts"), Position::slot(0, 1), vec![])
            .build(PointOfView::Private(0))
    }

    #[test]
    fn reveal_of_unseen_single_position_branches_by_marginal() {
        let state = two_card_state();
        let mv = Move::Reveal {
            scope: RevealScope::Position(Position::slot(0, 0)),
            observers: vec![0],
        };
        let branches = mv.apply(&state);
        assert_eq!(branches.len(), 2);
        for t in &branches {
            assert!((t.probability - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn reveal_to_a_non_observer_does_not_branch() {
        let state = two_card_state();
        let mv = Move::Reveal {
            scope: RevealScope::Position(Position::slot(0, 0)),
            observers: vec![1],
        };
        let branches = mv.apply(&state);
        assert_eq!(branches.len(), 1);
        assert!((branches[0].probability - 1.0).abs() < 1e-9);
    }

    #[test]
    fn reveal_inplace_samples_uniformly_and_does_not_reweight() {
        let state = two_card_state();
        let mv = Move::Reveal {
            scope: RevealScope::Position(Position::slot(0, 0)),
            observers: vec![0],
        };
        let mut rng = SmallRng::seed_from_u64(7);
        let mut next = state.clone();
        mv.apply_inplace(&mut next, &mut rng);
        assert!(next.get_piece_at(Position::slot(0, 0)).is_determined());
        assert!((next.total_probability() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn shuffle_move_clears_observers_and_loses_narrowing() {
        let mut state = two_card_state();
        state.assign_piece_value(Position::slot(0, 0), &suit("clubs"));
        let mv = Move::Shuffle { cell: 0 };
        let branches = mv.apply(&state);
        assert_eq!(branches.len(), 1);
        assert!(!branches[0].state.get_piece_at(Position::slot(0, 0)).is_determined());
    }
}

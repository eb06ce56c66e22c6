//! the external-collaborator contracts a concrete game and its agents
//! implement. `Agent` takes the game by reference at call time rather
//! than storing it, since Rust does not want a trait implementor holding
//! a borrowed trait object across mutable calls.

use crate::belief::BeliefState;
use crate::graph::PlayGraph;
use crate::moves::{Action, ProbTransition};
use crate::player::PlayerId;
use crate::pov::PointOfView;
use rand::RngCore;

/// one of a player's legal actions, labeled with the a-priori probability
/// a chance player would have chosen it. meaningful only when queried for
/// [`crate::player::CHANCE`]; a real player's actions carry whatever
/// label the game finds useful for diagnostics.
#[derive(Debug, Clone)]
pub struct ProbAction {
    pub action: Action,
    pub prior_probability: f64,
}

impl ProbAction {
    pub fn new(action: Action, prior_probability: f64) -> Self {
        Self {
            action,
            prior_probability,
        }
    }
}

/// a concrete game: its board topology, its legal moves, and when it
/// ends. belief states are supplied by the driver, not owned here.
pub trait Game {
    fn name(&self) -> &str;
    fn num_players(&self) -> usize;
    fn play_graph(&self) -> &PlayGraph;
    fn initial_state(&self, pov: PointOfView) -> BeliefState;
    fn legal_actions(&self, state: &BeliefState, player: PlayerId) -> Vec<ProbAction>;
    fn is_terminal(&self, state: &BeliefState) -> bool;
    /// one entry per seat, valid once [`Self::is_terminal`] holds.
    fn returns(&self, state: &BeliefState) -> Vec<f64>;

    /// convolve several players' simultaneous actions against `state`.
    fn apply_joint_action(&self, state: &BeliefState, actions: &[Action]) -> Vec<ProbTransition> {
        let mut branches = vec![ProbTransition::new(state.clone(), 1.0)];
        for action in actions {
            let mut next = Vec::new();
            for branch in branches {
                for t in action.apply(&branch.state) {
                    next.push(ProbTransition::new(t.state, branch.probability * t.probability));
                }
            }
            branches = next;
        }
        branches
    }

    fn apply_joint_action_inplace(&self, state: &mut BeliefState, actions: &[Action], rng: &mut dyn RngCore) {
        for action in actions {
            action.apply_inplace(state, rng);
        }
    }
}

/// a decision maker for one seat. `act` sees only its own belief state
/// plus whatever the public state reveals, never the world state.
pub trait Agent {
    fn set_player(&mut self, player: PlayerId);
    fn act(&mut self, game: &dyn Game, private: &BeliefState, public: &BeliefState) -> Action;
}

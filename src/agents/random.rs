use crate::belief::BeliefState;
use crate::game::{Agent, Game};
use crate::moves::Action;
use crate::player::PlayerId;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// picks uniformly among its legal actions every turn.
pub struct RandomAgent {
    player: PlayerId,
    rng: SmallRng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            player: crate::player::INVALID,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn set_player(&mut self, player: PlayerId) {
        self.player = player;
    }

    fn act(&mut self, game: &dyn Game, private: &BeliefState, _public: &BeliefState) -> Action {
        let legal = game.legal_actions(private, self.player);
        assert!(!legal.is_empty(), "random agent asked to act with no legal actions");
        let x = (self.rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64);
        let index = ((x * legal.len() as f64) as usize).min(legal.len() - 1);
        legal[index].action.clone()
    }
}

use crate::belief::BeliefState;
use crate::determinize;
use crate::game::{Agent, Game};
use crate::moves::Action;
use crate::player::PlayerId;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// evaluates each legal action by determinizing the private belief state
/// into `n_samples` full worlds and, from each, playing out `n_samples`
/// random rollouts (capped at `rollout_cap` joint actions), averaging the
/// resulting return for this agent's seat.
pub struct DeterminizedMcAgent {
    player: PlayerId,
    n_samples: usize,
    rollout_cap: usize,
    marginal_greedy: bool,
    rng: SmallRng,
}

impl DeterminizedMcAgent {
    pub fn new(seed: u64, n_samples: usize, rollout_cap: usize, marginal_greedy: bool) -> Self {
        Self {
            player: crate::player::INVALID,
            n_samples,
            rollout_cap,
            marginal_greedy,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn determinize(&mut self, state: &BeliefState) -> BeliefState {
        if self.marginal_greedy {
            determinize::marginal_greedy(state, &mut self.rng)
        } else {
            determinize::uniform(state, &mut self.rng)
        }
    }

    fn rollout(&mut self, game: &dyn Game, mut state: BeliefState) -> f64 {
        let mut steps = 0;
        while !game.is_terminal(&state) && steps < self.rollout_cap {
            let player = state.current_player();
            let legal = game.legal_actions(&state, player);
            let x = uniform01(&mut self.rng) * legal.len() as f64;
            let index = (x as usize).min(legal.len() - 1);
            legal[index].action.apply_inplace(&mut state, &mut self.rng);
            steps += 1;
        }
        let returns = game.returns(&state);
        returns.get(self.player.max(0) as usize).copied().unwrap_or(0.0)
    }
}

fn uniform01(rng: &mut SmallRng) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

impl Agent for DeterminizedMcAgent {
    fn set_player(&mut self, player: PlayerId) {
        self.player = player;
    }

    fn act(&mut self, game: &dyn Game, private: &BeliefState, _public: &BeliefState) -> Action {
        let legal = game.legal_actions(private, self.player);
        assert!(!legal.is_empty(), "mc agent asked to act with no legal actions");
        if legal.len() == 1 {
            return legal[0].action.clone();
        }
        let mut best_action = legal[0].action.clone();
        let mut best_score = f64::MIN;
        for candidate in &legal {
            let mut total = 0.0;
            for _ in 0..self.n_samples {
                let world = self.determinize(private);
                let mut state = world;
                candidate.action.apply_inplace(&mut state, &mut self.rng);
                total += self.rollout(game, state);
            }
            let average = total / self.n_samples as f64;
            if average > best_score {
                best_score = average;
                best_action = candidate.action.clone();
            }
        }
        best_action
    }
}

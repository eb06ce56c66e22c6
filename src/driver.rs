//! drives world/private/public belief states through a game in lockstep.
//! a faulted episode always returns the zero vector, rather than
//! whatever partial `returns()` the world state happens to report at the
//! point the loop broke.

use crate::error::DriverFault;
use crate::game::{Agent, Game};
use crate::moves::Action;
use crate::player::{PlayerId, CHANCE};
use crate::pov::PointOfView;
use crate::belief::BeliefState;
use rand::RngCore;

pub struct Driver<'g> {
    game: &'g dyn Game,
    world: BeliefState,
    public: BeliefState,
    private: Vec<BeliefState>,
}

impl<'g> Driver<'g> {
    pub fn new(game: &'g dyn Game) -> Self {
        let world = game.initial_state(PointOfView::World);
        let public = game.initial_state(PointOfView::Public);
        let private = (0..game.num_players())
            .map(|p| game.initial_state(PointOfView::Private(p as i32)))
            .collect();
        Self {
            game,
            world,
            public,
            private,
        }
    }

    pub fn world(&self) -> &BeliefState {
        &self.world
    }

    pub fn public(&self) -> &BeliefState {
        &self.public
    }

    pub fn private(&self, player: i32) -> &BeliefState {
        &self.private[player as usize]
    }

    /// advance one ply: every current player (chance included) chooses
    /// its own action, the resulting joint action is applied to the world,
    /// and every private/public belief state is advanced to whichever of
    /// its own successors is consistent with the new world. chance samples
    /// uniformly among its legal actions, treating `prior_probability` as
    /// a label rather than a sampling weight.
    pub fn step(&mut self, agents: &mut [Box<dyn Agent>], rng: &mut dyn RngCore) -> Result<(), DriverFault> {
        let current_players: Vec<PlayerId> = self.world.current_players().to_vec();
        assert!(!current_players.is_empty(), "step called on a terminal state");

        let mut actions = Vec::with_capacity(current_players.len());
        for player in current_players {
            let legal = self.game.legal_actions(&self.world, player);
            assert!(!legal.is_empty(), "a non-terminal state must offer at least one legal action");

            let chosen = if player == CHANCE {
                let index = sample_index(legal.len(), rng);
                legal[index].action.clone()
            } else {
                let action = agents[player as usize].act(self.game, &self.private[player as usize], &self.public);
                if !legal.iter().any(|pa| pa.action == action) {
                    return Err(DriverFault::IllegalAction { player });
                }
                action
            };
            actions.push(chosen);
        }

        let old_public = self.public.clone();
        let old_private = self.private.clone();
        self.game.apply_joint_action_inplace(&mut self.world, &actions, rng);

        self.public = advance(self.game, &actions, &old_public, &self.world)
            .ok_or(DriverFault::InconsistentSuccessor { holder: None })?;
        for (p, old) in old_private.iter().enumerate() {
            self.private[p] = advance(self.game, &actions, old, &self.world)
                .ok_or(DriverFault::InconsistentSuccessor { holder: Some(p as i32) })?;
        }
        Ok(())
    }

    /// run plies until the game ends, logging and zeroing out the
    /// returns if an agent or the engine ever desynchronizes.
    pub fn play(&mut self, agents: &mut [Box<dyn Agent>], rng: &mut dyn RngCore) -> Vec<f64> {
        loop {
            if self.game.is_terminal(&self.world) {
                return self.game.returns(&self.world);
            }
            if let Err(fault) = self.step(agents, rng) {
                log::warn!("driver fault, ending episode early: {fault}");
                return vec![0.0; self.game.num_players()];
            }
        }
    }
}

fn advance(game: &dyn Game, actions: &[Action], old: &BeliefState, world: &BeliefState) -> Option<BeliefState> {
    game.apply_joint_action(old, actions)
        .into_iter()
        .find(|t| t.state.is_consistent_with(world))
        .map(|t| t.state)
}

fn sample_index(len: usize, rng: &mut dyn RngCore) -> usize {
    let x = (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64);
    ((x * len as f64) as usize).min(len - 1)
}

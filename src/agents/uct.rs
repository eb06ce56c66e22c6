use crate::belief::BeliefState;
use crate::determinize;
use crate::game::{Agent, Game};
use crate::moves::Action;
use crate::player::{PlayerId, CHANCE};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

const DEFAULT_SAMPLES: usize = 10;
const DEFAULT_ITERATIONS: usize = 1000;
const DEFAULT_ROLLOUT_CAP: usize = 200;

struct ActionInfo {
    action: Action,
    n_visits: u32,
    sum_results: f64,
}

/// a node of one determinized root's search tree. every node's state is
/// fully determined: once a belief state has been sampled down to a
/// single world, the rest of the tree treats it as perfect information.
struct NodeUct {
    state: BeliefState,
    n_visits: u32,
    actions: Vec<ActionInfo>,
    children: Vec<Option<Box<NodeUct>>>,
}

impl NodeUct {
    fn new(state: BeliefState) -> Self {
        Self {
            state,
            n_visits: 0,
            actions: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// runs `n_samples` independent determinized roots, each searched for
/// `n_iterations` playouts of determinized UCT, and sums visit counts
/// for this agent's root-level action across every root before picking
/// the max.
pub struct DeterminizedUctAgent {
    player: PlayerId,
    n_samples: usize,
    n_iterations: usize,
    rollout_cap: usize,
    marginal_greedy: bool,
    rng: SmallRng,
}

impl DeterminizedUctAgent {
    pub fn new(seed: u64, marginal_greedy: bool) -> Self {
        Self::with_budget(seed, DEFAULT_SAMPLES, DEFAULT_ITERATIONS, DEFAULT_ROLLOUT_CAP, marginal_greedy)
    }

    pub fn with_budget(
        seed: u64,
        n_samples: usize,
        n_iterations: usize,
        rollout_cap: usize,
        marginal_greedy: bool,
    ) -> Self {
        Self {
            player: crate::player::INVALID,
            n_samples,
            n_iterations,
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

    fn uniform01(&mut self) -> f64 {
        (self.rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    fn select_action_index(&mut self, player: PlayerId, node: &NodeUct) -> usize {
        if let Some(unvisited) = node.actions.iter().position(|a| a.n_visits == 0) {
            return unvisited;
        }
        if player == CHANCE {
            return node
                .actions
                .iter()
                .enumerate()
                .min_by_key(|(_, a)| a.n_visits)
                .map(|(i, _)| i)
                .expect("node has at least one legal action");
        }
        let total = node.n_visits as f64;
        node.actions
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let mean = a.sum_results / a.n_visits as f64;
                let bonus = (2.0 * total.ln() / a.n_visits as f64).sqrt();
                (i, mean + bonus)
            })
            .fold((0, f64::MIN), |best, (i, score)| if score > best.1 { (i, score) } else { best })
            .0
    }

    fn rollout(&mut self, game: &dyn Game, mut state: BeliefState) -> f64 {
        let mut steps = 0;
        while !game.is_terminal(&state) && steps < self.rollout_cap {
            let player = state.current_player();
            let legal = game.legal_actions(&state, player);
            let index = ((self.uniform01() * legal.len() as f64) as usize).min(legal.len() - 1);
            legal[index].action.apply_inplace(&mut state, &mut self.rng);
            steps += 1;
        }
        let returns = game.returns(&state);
        returns.get(self.player as usize).copied().unwrap_or(0.0)
    }

    fn playout(&mut self, game: &dyn Game, node: &mut NodeUct) -> f64 {
        if game.is_terminal(&node.state) {
            let returns = game.returns(&node.state);
            return returns.get(self.player as usize).copied().unwrap_or(0.0);
        }
        if node.actions.is_empty() {
            let player = node.state.current_player();
            let legal = game.legal_actions(&node.state, player);
            node.actions = legal
                .into_iter()
                .map(|pa| ActionInfo {
                    action: pa.action,
                    n_visits: 0,
                    sum_results: 0.0,
                })
                .collect();
            node.children = (0..node.actions.len()).map(|_| None).collect();
        }
        let player = node.state.current_player();
        let index = self.select_action_index(player, node);

        let result = if node.children[index].is_none() {
            let mut next_state = node.state.clone();
            node.actions[index].action.apply_inplace(&mut next_state, &mut self.rng);
            let result = self.rollout(game, next_state.clone());
            let mut child = NodeUct::new(next_state);
            child.n_visits = 1;
            node.children[index] = Some(Box::new(child));
            result
        } else {
            let child = node.children[index].as_mut().expect("checked above");
            self.playout(game, child)
        };

        node.actions[index].n_visits += 1;
        node.actions[index].sum_results += result;
        node.n_visits += 1;
        result
    }
}

impl Agent for DeterminizedUctAgent {
    fn set_player(&mut self, player: PlayerId) {
        self.player = player;
    }

    fn act(&mut self, game: &dyn Game, private: &BeliefState, _public: &BeliefState) -> Action {
        let legal_root = game.legal_actions(private, self.player);
        assert!(!legal_root.is_empty(), "uct agent asked to act with no legal actions");
        if legal_root.len() == 1 {
            return legal_root[0].action.clone();
        }

        let mut total_visits = vec![0u32; legal_root.len()];
        for _ in 0..self.n_samples {
            let root_state = self.determinize(private);
            let mut root = NodeUct::new(root_state);
            for _ in 0..self.n_iterations {
                self.playout(game, &mut root);
            }
            for info in &root.actions {
                if let Some(i) = legal_root.iter().position(|pa| pa.action == info.action) {
                    total_visits[i] += info.n_visits;
                }
            }
        }

        let best = total_visits
            .iter()
            .enumerate()
            .max_by_key(|(_, &v)| v)
            .map(|(i, _)| i)
            .expect("legal_root is non-empty");
        legal_root[best].action.clone()
    }
}

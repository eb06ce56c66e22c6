//! runs self-play episodes of a bundled demo game (Kuhn Poker) between two
//! configurable agents. lives under `src/bin/`, outside the library, since
//! it is a consumer of the engine rather than part of it.

use clap::{Parser, ValueEnum};
use credence::agents::{DeterminizedMcAgent, DeterminizedUctAgent, RandomAgent};
use credence::belief::{BeliefState, BeliefStateBuilder};
use credence::game::{Agent, Game, ProbAction};
use credence::graph::PlayGraph;
use credence::moves::{Action, Move, RevealScope};
use credence::piece_type::PieceType;
use credence::player::{self, PlayerId};
use credence::position::Position;
use credence::pov::PointOfView;
use credence::value::{AttributeValue, PieceAttribute, PieceValue};
use credence::variable::VariableValue;
use credence::Driver;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn rank(name: &str) -> PieceValue {
    PieceValue::new(vec![PieceAttribute::new("rank", AttributeValue::Str(name.into()))])
}

fn wins(a: &PieceValue, b: &PieceValue) -> bool {
    if *a == rank("K") {
        return true;
    }
    if *a == rank("Q") {
        return *b == rank("J");
    }
    false
}

/// a fixed two-player, three-card betting game: each player antes one
/// chip, is dealt one of three ranks, and in turn may check, bet, call or
/// fold, with the better hand taking the pot at showdown.
struct KuhnPoker {
    card_type: PieceType,
    play_graph: PlayGraph,
}

impl KuhnPoker {
    fn new() -> Self {
        Self {
            card_type: PieceType::new(vec![rank("J"), rank("Q"), rank("K")]),
            play_graph: PlayGraph::disconnected(3),
        }
    }

    fn first_better(&self, state: &BeliefState) -> PlayerId {
        match state.variable("first_better") {
            Some(VariableValue::Int(v)) => *v as PlayerId,
            _ => player::INVALID,
        }
    }

    fn pot(&self, state: &BeliefState) -> i64 {
        match state.variable("pot") {
            Some(VariableValue::Int(v)) => *v,
            _ => 0,
        }
    }

    fn players_money(&self, state: &BeliefState) -> Vec<i64> {
        match state.variable("players_money") {
            Some(VariableValue::Ints(v)) => v.clone(),
            _ => vec![0, 0],
        }
    }
}

impl Game for KuhnPoker {
    fn name(&self) -> &str {
        "Kuhn Poker"
    }

    fn num_players(&self) -> usize {
        2
    }

    fn play_graph(&self) -> &PlayGraph {
        &self.play_graph
    }

    fn initial_state(&self, pov: PointOfView) -> BeliefState {
        let mut state = BeliefStateBuilder::new(2, self.play_graph.clone())
            .with_piece(self.card_type.clone(), rank("J"), Position::slot(0, 0), vec![])
            .with_piece(self.card_type.clone(), rank("Q"), Position::slot(0, 1), vec![])
            .with_piece(self.card_type.clone(), rank("K"), Position::slot(0, 2), vec![])
            .build(pov);
        state.set_variable("pot", VariableValue::Int(2));
        state.set_variable("players_money", VariableValue::Ints(vec![-1, -1]));
        state.set_variable("first_better", VariableValue::Int(player::INVALID as i64));
        state
    }

    fn legal_actions(&self, state: &BeliefState, requested: PlayerId) -> Vec<ProbAction> {
        if !state.current_players().contains(&requested) {
            return Vec::new();
        }

        if requested == player::CHANCE {
            let remaining = state.get_pieces_at(0).len();
            let target = 3 - remaining as i32;
            let mut moves = vec![
                Move::MovePiece {
                    from: Position::top(0),
                    to: Position::top((target + 1) as usize),
                },
                Move::Reveal {
                    scope: RevealScope::Position(Position::top((target + 1) as usize)),
                    observers: vec![target],
                },
            ];
            if target == 1 {
                moves.push(Move::SetNextPlayer { player: 0 });
            }
            return vec![ProbAction::new(Action::new(moves), 1.0)];
        }

        let player = requested;
        let mut actions = Vec::new();
        if self.first_better(state) == player::INVALID {
            // check
            let mut check = Vec::new();
            if player == 1 {
                check.push(Move::Reveal {
                    scope: RevealScope::Position(Position::top(1)),
                    observers: vec![0, 1],
                });
                check.push(Move::Reveal {
                    scope: RevealScope::Position(Position::top(2)),
                    observers: vec![0, 1],
                });
                check.push(Move::SetNextPlayers { players: vec![] });
            } else {
                check.push(Move::SetNextPlayer { player: 1 - player });
            }
            actions.push(ProbAction::new(Action::new(check), 1.0));

            // bet
            let mut money = self.players_money(state);
            money[player as usize] -= 1;
            let bet = vec![
                Move::SetVariable {
                    name: "first_better".into(),
                    value: VariableValue::Int(player as i64),
                },
                Move::SetVariable {
                    name: "pot".into(),
                    value: VariableValue::Int(self.pot(state) + 1),
                },
                Move::SetVariable {
                    name: "players_money".into(),
                    value: VariableValue::Ints(money),
                },
                Move::SetNextPlayer { player: 1 - player },
            ];
            actions.push(ProbAction::new(Action::new(bet), 1.0));
        } else {
            // call
            let mut call_money = self.players_money(state);
            call_money[player as usize] -= 1;
            let call = vec![
                Move::SetVariable {
                    name: "pot".into(),
                    value: VariableValue::Int(self.pot(state) + 1),
                },
                Move::SetVariable {
                    name: "players_money".into(),
                    value: VariableValue::Ints(call_money),
                },
                Move::Reveal {
                    scope: RevealScope::Position(Position::top(1)),
                    observers: vec![0, 1],
                },
                Move::Reveal {
                    scope: RevealScope::Position(Position::top(2)),
                    observers: vec![0, 1],
                },
                Move::SetNextPlayers { players: vec![] },
            ];
            actions.push(ProbAction::new(Action::new(call), 1.0));

            // fold
            let fold = vec![
                Move::Reveal {
                    scope: RevealScope::Position(Position::top(1)),
                    observers: vec![0, 1],
                },
                Move::Reveal {
                    scope: RevealScope::Position(Position::top(2)),
                    observers: vec![0, 1],
                },
                Move::SetNextPlayers { players: vec![] },
            ];
            actions.push(ProbAction::new(Action::new(fold), 1.0));
        }
        actions
    }

    fn is_terminal(&self, state: &BeliefState) -> bool {
        state.current_players().is_empty()
    }

    fn returns(&self, state: &BeliefState) -> Vec<f64> {
        if !self.is_terminal(state) {
            return vec![0.0, 0.0];
        }
        let mut money = self.players_money(state);
        let pot = self.pot(state);
        let first_better = self.first_better(state);
        let card0 = state.get_piece_at(Position::top(1)).value().clone();
        let card1 = state.get_piece_at(Position::top(2)).value().clone();

        if first_better == player::INVALID {
            if wins(&card0, &card1) {
                money[0] += pot;
            } else {
                money[1] += pot;
            }
        } else if pot == 4 {
            if wins(&card0, &card1) {
                money[0] += pot;
            } else {
                money[1] += pot;
            }
        } else {
            money[first_better as usize] += pot;
        }
        money.into_iter().map(|m| m as f64).collect()
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum AgentKind {
    Random,
    Mc,
    Uct,
}

impl AgentKind {
    fn build(self, seed: u64, n_samples: usize, n_iterations: usize, rollout_cap: usize, marginal_greedy: bool) -> Box<dyn Agent> {
        match self {
            AgentKind::Random => Box::new(RandomAgent::new(seed)),
            AgentKind::Mc => Box::new(DeterminizedMcAgent::new(seed, n_samples, rollout_cap, marginal_greedy)),
            AgentKind::Uct => Box::new(DeterminizedUctAgent::with_budget(seed, n_samples, n_iterations, rollout_cap, marginal_greedy)),
        }
    }
}

/// self-play runner for the bundled Kuhn Poker demo game.
#[derive(Parser, Debug)]
#[command(name = "selfplay", about = "run self-play episodes of a demo belief-state game")]
struct Cli {
    /// number of episodes to play
    #[arg(long, default_value_t = 100)]
    episodes: u32,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// seat 0's agent
    #[arg(long, value_enum, default_value_t = AgentKind::Uct)]
    agent0: AgentKind,

    /// seat 1's agent
    #[arg(long, value_enum, default_value_t = AgentKind::Random)]
    agent1: AgentKind,

    /// determinized samples per decision (mc/uct agents)
    #[arg(long, default_value_t = 10)]
    n_samples: usize,

    /// UCT playout iterations per determinized root
    #[arg(long, default_value_t = 1000)]
    n_iterations: usize,

    /// rollout length cap, in joint actions
    #[arg(long, default_value_t = 200)]
    rollout_cap: usize,

    /// determinize by sampling the marginal-greedy order instead of iid uniform
    #[arg(long, default_value_t = false)]
    marginal_greedy: bool,
}

fn init_logging() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{time}.log")).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let game = KuhnPoker::new();
    let mut rng = SmallRng::seed_from_u64(cli.seed);

    let mut agent0 = cli.agent0.build(cli.seed, cli.n_samples, cli.n_iterations, cli.rollout_cap, cli.marginal_greedy);
    agent0.set_player(0);
    let mut agent1 = cli.agent1.build(cli.seed.wrapping_add(1), cli.n_samples, cli.n_iterations, cli.rollout_cap, cli.marginal_greedy);
    agent1.set_player(1);
    let mut agents: Vec<Box<dyn Agent>> = vec![agent0, agent1];

    let mut totals = vec![0.0f64; game.num_players()];
    for episode in 0..cli.episodes {
        let mut driver = Driver::new(&game);
        let returns = driver.play(&mut agents, &mut rng);
        log::info!("episode {episode}: returns {returns:?}");
        for (p, r) in returns.iter().enumerate() {
            totals[p] += r;
        }
    }

    println!("played {} episodes of {}", cli.episodes, game.name());
    for (p, total) in totals.iter().enumerate() {
        println!("  seat {p}: total {total:.1}, average {:.3}", total / cli.episodes as f64);
    }
}

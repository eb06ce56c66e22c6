//! concrete `Agent` implementations: a uniform random baseline, a
//! determinized Monte Carlo evaluator, and a determinized UCT searcher.

mod mc;
mod random;
mod uct;

pub use mc::DeterminizedMcAgent;
pub use random::RandomAgent;
pub use uct::DeterminizedUctAgent;

use crate::belief::BeliefState;

/// one weighted successor of applying a move or action to a belief state.
/// a list of these should always sum its probabilities to (approximately)
/// one, since they partition the ways chance could have resolved the
/// move.
#[derive(Debug, Clone)]
pub struct ProbTransition {
    pub state: BeliefState,
    pub probability: f64,
}

impl ProbTransition {
    pub fn new(state: BeliefState, probability: f64) -> Self {
        Self { state, probability }
    }
}

use crate::player::PlayerId;
use std::fmt::{self, Display, Formatter};

/// a fault the driver can recover from by ending the episode early,
/// distinct from the engine's internal contract-violation panics.
/// these happen when an *external* collaborator (an agent) misbehaves,
/// not when the engine's own invariants are broken.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverFault {
    /// an agent returned an action outside `legal_actions`.
    IllegalAction { player: PlayerId },
    /// after applying the world's sampled joint action, no transition of
    /// a player's or the public's belief state was consistent with it.
    /// `holder` is `None` for the public belief state.
    InconsistentSuccessor { holder: Option<PlayerId> },
}

impl Display for DriverFault {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::IllegalAction { player } => write!(f, "player {player} returned an action outside legal_actions"),
            Self::InconsistentSuccessor { holder: Some(player) } => {
                write!(f, "no successor belief state for player {player} matched the sampled world transition")
            }
            Self::InconsistentSuccessor { holder: None } => {
                write!(f, "no successor public belief state matched the sampled world transition")
            }
        }
    }
}

impl std::error::Error for DriverFault {}

use crate::player::PlayerId;

/// the observer policy that governs when an observer set "sees" a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointOfView {
    /// any non-empty observer set counts as seen.
    World,
    /// only an observer set containing every player counts as seen.
    Public,
    /// any observer set containing this player counts as seen.
    Private(PlayerId),
}

impl PointOfView {
    /// whether `observers` (the piece's current observer set) is "seen"
    /// from this point of view, given the game has `num_players` seats.
    pub fn sees(&self, observers: &[PlayerId], num_players: usize) -> bool {
        if observers.is_empty() {
            return false;
        }
        match self {
            Self::World => true,
            Self::Public => observers.len() == num_players,
            Self::Private(p) => observers.contains(p),
        }
    }
}

impl std::fmt::Display for PointOfView {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::World => write!(f, "world"),
            Self::Public => write!(f, "public"),
            Self::Private(p) => write!(f, "private({p})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_sees_any_nonempty() {
        assert!(PointOfView::World.sees(&[0], 2));
        assert!(!PointOfView::World.sees(&[], 2));
    }

    #[test]
    fn public_requires_everyone() {
        assert!(!PointOfView::Public.sees(&[0], 2));
        assert!(PointOfView::Public.sees(&[0, 1], 2));
    }

    #[test]
    fn private_requires_membership() {
        assert!(PointOfView::Private(1).sees(&[0, 1], 2));
        assert!(!PointOfView::Private(1).sees(&[0], 2));
    }
}

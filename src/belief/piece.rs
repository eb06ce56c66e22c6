use crate::player::PlayerId;
use crate::value::{PieceAttribute, PieceValue};
use std::fmt::{self, Display, Formatter};

/// a read-only snapshot of one piece's current belief: which values it
/// could still hold, the estimated probability of each, and who has
/// observed it. produced fresh from a collection on every query, never
/// stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    values: Vec<PieceValue>,
    probabilities: Vec<f64>,
    observers: Vec<PlayerId>,
}

impl Piece {
    pub(crate) fn new(values: Vec<PieceValue>, probabilities: Vec<f64>, observers: Vec<PlayerId>) -> Self {
        debug_assert_eq!(values.len(), probabilities.len());
        Self {
            values,
            probabilities,
            observers,
        }
    }

    /// candidate values still consistent with this piece, ascending by
    /// the owning piece type's declared order.
    pub fn values(&self) -> &[PieceValue] {
        &self.values
    }

    pub fn observers(&self) -> &[PlayerId] {
        &self.observers
    }

    pub fn is_determined(&self) -> bool {
        self.values.len() == 1
    }

    /// the single remaining value. panics if the piece is not yet
    /// determined.
    pub fn value(&self) -> &PieceValue {
        assert!(self.is_determined(), "piece has more than one candidate value");
        &self.values[0]
    }

    /// the estimated probability of `value`, or `0.0` if it is not among
    /// this piece's candidates.
    pub fn probability(&self, value: &PieceValue) -> f64 {
        self.values
            .iter()
            .position(|v| v == value)
            .map(|i| self.probabilities[i])
            .unwrap_or(0.0)
    }

    /// true if some candidate value carries `attribute`.
    pub fn can_have(&self, attribute: &PieceAttribute) -> bool {
        self.values.iter().any(|v| v.has(attribute))
    }

    /// true if some candidate value does not carry `attribute`.
    pub fn can_not_have(&self, attribute: &PieceAttribute) -> bool {
        self.values.iter().any(|v| !v.has(attribute))
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.is_determined() {
            write!(f, "{}", self.values[0])
        } else {
            write!(f, "{{")?;
            for (i, v) in self.values.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{v}@{:.3}", self.probabilities[i])?;
            }
            write!(f, "}}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::AttributeValue;

    fn red(name: &str) -> PieceValue {
        PieceValue::new(vec![PieceAttribute::new("color", AttributeValue::Str(name.into()))])
    }

    #[test]
    fn determined_piece_reports_its_single_value() {
        let p = Piece::new(vec![red("red")], vec![1.0], vec![0, 1]);
        assert!(p.is_determined());
        assert_eq!(p.value(), &red("red"));
    }

    #[test]
    fn undetermined_piece_exposes_probabilities() {
        let p = Piece::new(vec![red("red"), red("blue")], vec![0.25, 0.75], vec![]);
        assert!(!p.is_determined());
        assert_eq!(p.probability(&red("blue")), 0.75);
        assert_eq!(p.probability(&red("green")), 0.0);
    }

    #[test]
    fn can_have_and_can_not_have_are_existence_checks() {
        let p = Piece::new(vec![red("red"), red("blue")], vec![0.5, 0.5], vec![]);
        let attr = PieceAttribute::new("color", AttributeValue::Str("red".into()));
        assert!(p.can_have(&attr));
        assert!(p.can_not_have(&attr));
        let determined = Piece::new(vec![red("red")], vec![1.0], vec![]);
        assert!(determined.can_have(&attr));
        assert!(!determined.can_not_have(&attr));
    }
}

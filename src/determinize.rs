//! sampling a fully-determined world out of a belief state. both
//! strategies narrow one piece at a time, re-propagating the count
//! constraint after every assignment, and multiply the running
//! probability by the marginal of whatever value was chosen -- never by
//! a flat `1/|values|`, since values are rarely equally likely once the
//! count constraint and prior observations are folded in.

use crate::belief::BeliefState;
use crate::position::Position;
use rand::RngCore;

/// assign every undetermined piece to a value sampled uniformly among its
/// feasible candidates, weighting the resulting probability by that
/// value's belief-propagation marginal.
pub fn uniform(state: &BeliefState, rng: &mut dyn RngCore) -> BeliefState {
    let mut next = state.clone();
    for position in next.all_positions() {
        let piece = next.get_piece_at(position);
        if piece.is_determined() {
            continue;
        }
        let values = piece.values();
        let index = (uniform01(rng) * values.len() as f64) as usize;
        let index = index.min(values.len() - 1);
        let value = values[index].clone();
        let weight = piece.probability(&value);
        next.assign_piece_value(position, &value);
        next.scale_probability(weight);
    }
    next
}

/// repeatedly assign the piece whose best remaining candidate has the
/// single largest marginal anywhere in the state, sampling that piece's
/// value proportional to its own marginals. greedy in which piece goes
/// next, not in which value it receives.
pub fn marginal_greedy(state: &BeliefState, rng: &mut dyn RngCore) -> BeliefState {
    let mut next = state.clone();
    loop {
        let mut best: Option<(Position, f64)> = None;
        for position in next.all_positions() {
            let piece = next.get_piece_at(position);
            if piece.is_determined() {
                continue;
            }
            let top = piece
                .values()
                .iter()
                .map(|v| piece.probability(v))
                .fold(f64::MIN, f64::max);
            let better = match best {
                Some((_, b)) => top > b,
                None => true,
            };
            if better {
                best = Some((position, top));
            }
        }
        let Some((position, _)) = best else {
            break;
        };
        let piece = next.get_piece_at(position);
        let values = piece.values();
        let weights: Vec<f64> = values.iter().map(|v| piece.probability(v)).collect();
        let index = sample_weighted(&weights, rng);
        let value = values[index].clone();
        let weight = weights[index];
        next.assign_piece_value(position, &value);
        next.scale_probability(weight);
    }
    next
}

fn sample_weighted(weights: &[f64], rng: &mut dyn RngCore) -> usize {
    let total: f64 = weights.iter().sum();
    let mut x = uniform01(rng) * total;
    for (i, &w) in weights.iter().enumerate() {
        if x < w {
            return i;
        }
        x -= w;
    }
    weights.len() - 1
}

fn uniform01(rng: &mut dyn RngCore) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::BeliefStateBuilder;
    use crate::graph::PlayGraph;
    use crate::piece_type::PieceType;
    use crate::pov::PointOfView;
    use crate::value::{AttributeValue, PieceAttribute, PieceValue};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn suit(name: &str) -> PieceValue {
        PieceValue::new(vec![PieceAttribute::new("suit", AttributeValue::Str(name.into()))])
    }

    fn deck_state() -> BeliefState {
        let piece_type = PieceType::new(vec![suit("clubs"), suit("hearts"), suit("spades")]);
        let mut builder = BeliefStateBuilder::new(1, PlayGraph::disconnected(1));
        for (i, value) in [suit("clubs"), suit("hearts"), suit("spades")].into_iter().enumerate() {
            builder = builder.with_piece(piece_type.clone(), value, Position::slot(0, i), vec![]);
        }
        builder.build(PointOfView::Private(0))
    }

    #[test]
    fn uniform_determinization_fully_resolves_the_state() {
        let state = deck_state();
        let mut rng = SmallRng::seed_from_u64(1);
        let resolved = uniform(&state, &mut rng);
        assert!(resolved.is_determined());
        assert!(resolved.total_probability() > 0.0 && resolved.total_probability() <= 1.0);
    }

    #[test]
    fn marginal_greedy_determinization_fully_resolves_the_state() {
        let state = deck_state();
        let mut rng = SmallRng::seed_from_u64(2);
        let resolved = marginal_greedy(&state, &mut rng);
        assert!(resolved.is_determined());
        assert!(resolved.total_probability() > 0.0 && resolved.total_probability() <= 1.0);
    }

    #[test]
    fn determinizations_preserve_the_per_value_counts() {
        let state = deck_state();
        let mut rng = SmallRng::seed_from_u64(3);
        let resolved = marginal_greedy(&state, &mut rng);
        let mut seen = vec![
            resolved.get_piece_at(Position::slot(0, 0)).value().clone(),
            resolved.get_piece_at(Position::slot(0, 1)).value().clone(),
            resolved.get_piece_at(Position::slot(0, 2)).value().clone(),
        ];
        seen.sort_by_key(|v| v.to_string());
        let mut expected = vec![suit("clubs"), suit("hearts"), suit("spades")];
        expected.sort_by_key(|v| v.to_string());
        assert_eq!(seen, expected);
    }
}

//! loopy belief propagation over a collection's count constraint.
//!
//! the factor graph has one variable node per piece and one factor node
//! per value; factor `v` enforces that exactly `counts[v]` of its
//! connected pieces take value `v`. messages are damped, and each
//! factor's outgoing messages are computed with a forward/backward
//! prefix-sum convolution over its connected pieces rather than brute
//! force, since a factor can be connected to every piece in the
//! collection.

use crate::constraint::CollectionModel;

const MAX_ITERATIONS: usize = 100;
const CONVERGENCE_TOLERANCE: f64 = 1e-6;
const DAMPING_START: f64 = 0.5;
const DAMPING_STEP: f64 = 0.025;

/// an (off, on) unnormalized belief pair for a single piece/value edge.
type Message = (f64, f64);

/// damped loopy BP estimator of per-piece, per-value marginals under a
/// collection's exact-count constraint. holds its own message state so
/// repeated calls to [`Self::update`] only redo the work when the
/// underlying model's domains actually changed.
#[derive(Debug, Clone)]
pub struct BeliefPropagation {
    n_pieces: usize,
    n_values: usize,
    var_to_factor: Vec<Vec<Message>>,
    factor_to_var: Vec<Vec<Message>>,
    marginals: Vec<Vec<f64>>,
    last_domains: Option<Vec<Vec<bool>>>,
}

impl BeliefPropagation {
    pub fn new(n_pieces: usize, n_values: usize) -> Self {
        Self {
            n_pieces,
            n_values,
            var_to_factor: vec![vec![(0.0, 0.0); n_values]; n_pieces],
            factor_to_var: vec![vec![(0.0, 0.0); n_values]; n_pieces],
            marginals: vec![vec![0.0; n_values]; n_pieces],
            last_domains: None,
        }
    }

    /// the current estimate that `piece` holds `value`. valid only after
    /// at least one call to [`Self::update`].
    pub fn probability(&self, piece: usize, value: usize) -> f64 {
        self.marginals[piece][value]
    }

    pub fn marginals_of(&self, piece: usize) -> &[f64] {
        &self.marginals[piece]
    }

    /// bring the marginals up to date with `model`. a no-op if the
    /// model's domains are unchanged since the last call.
    pub fn update(&mut self, model: &CollectionModel) {
        let domains = model.domains().to_vec();
        if self.last_domains.as_ref() == Some(&domains) {
            return;
        }
        self.reset_variable_messages_and_marginals(model);
        self.reset_constraint_messages(model);

        let mut damping = DAMPING_START;
        for _ in 0..MAX_ITERATIONS {
            self.compute_constraint_messages(model, damping);
            self.normalize_constraint_messages();
            let max_change = self.compute_variable_messages_and_marginals(model);
            damping = (damping + DAMPING_STEP).min(1.0);
            if max_change < CONVERGENCE_TOLERANCE {
                log::trace!("belief propagation converged early, max_change={max_change}");
                break;
            }
        }
        self.last_domains = Some(domains);
    }

    fn reset_variable_messages_and_marginals(&mut self, model: &CollectionModel) {
        for piece in 0..self.n_pieces {
            let size = model.domain_size(piece).max(1) as f64;
            for value in 0..self.n_values {
                let allowed = model.domain(piece)[value];
                self.var_to_factor[piece][value] = if allowed { (1.0, 1.0) } else { (0.0, 0.0) };
                self.marginals[piece][value] = if allowed { 1.0 / size } else { 0.0 };
            }
        }
    }

    fn reset_constraint_messages(&mut self, model: &CollectionModel) {
        for piece in 0..self.n_pieces {
            for value in 0..self.n_values {
                let allowed = model.domain(piece)[value];
                self.factor_to_var[piece][value] = if allowed { (1.0, 1.0) } else { (0.0, 0.0) };
            }
        }
    }

    /// factor -> variable messages, one factor (value) at a time, using a
    /// forward/backward convolution over the pieces connected to it.
    fn compute_constraint_messages(&mut self, model: &CollectionModel, damping: f64) {
        for value in 0..self.n_values {
            let required = model.required_count(value) as i64;
            let mut fixed_on = 0i64;
            let mut free: Vec<usize> = Vec::new();
            for piece in 0..self.n_pieces {
                if !model.domain(piece)[value] {
                    continue;
                }
                if model.is_singleton(piece) {
                    fixed_on += 1;
                } else {
                    free.push(piece);
                }
            }
            let target = required - fixed_on;
            let m = free.len();
            if m == 0 {
                continue;
            }

            let weights: Vec<Message> = free.iter().map(|&p| self.var_to_factor[p][value]).collect();

            let mut prefix: Vec<Vec<f64>> = Vec::with_capacity(m + 1);
            prefix.push(vec![1.0]);
            for &(off, on) in &weights {
                prefix.push(convolve_one(prefix.last().unwrap(), off, on));
            }
            let mut suffix: Vec<Vec<f64>> = vec![Vec::new(); m + 1];
            suffix[m] = vec![1.0];
            for idx in (0..m).rev() {
                let (off, on) = weights[idx];
                suffix[idx] = convolve_one(&suffix[idx + 1], off, on);
            }

            for (idx, &piece) in free.iter().enumerate() {
                let raw_on = coefficient(&prefix[idx], &suffix[idx + 1], target - 1);
                let raw_off = coefficient(&prefix[idx], &suffix[idx + 1], target);
                let (old_off, old_on) = self.factor_to_var[piece][value];
                let new_off = damping * raw_off + (1.0 - damping) * old_off;
                let new_on = damping * raw_on + (1.0 - damping) * old_on;
                self.factor_to_var[piece][value] = (new_off, new_on);
            }
        }
    }

    fn normalize_constraint_messages(&mut self) {
        for piece in 0..self.n_pieces {
            for value in 0..self.n_values {
                let (off, on) = self.factor_to_var[piece][value];
                let total = off + on;
                if total > 0.0 {
                    self.factor_to_var[piece][value] = (off / total, on / total);
                }
            }
        }
    }

    /// recompute every piece's marginal belief and its outgoing messages
    /// to every factor it touches. returns the largest marginal change
    /// observed, for the convergence check.
    fn compute_variable_messages_and_marginals(&mut self, model: &CollectionModel) -> f64 {
        let mut max_change = 0.0_f64;
        for piece in 0..self.n_pieces {
            let domain: Vec<usize> = (0..self.n_values).filter(|&v| model.domain(piece)[v]).collect();
            if domain.len() <= 1 {
                continue;
            }

            let mut beliefs = vec![0.0; domain.len()];
            for (i, &v) in domain.iter().enumerate() {
                let (_, on) = self.factor_to_var[piece][v];
                let mut product = on;
                for (j, &v2) in domain.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    product *= self.factor_to_var[piece][v2].0;
                }
                beliefs[i] = product;
            }
            let total: f64 = beliefs.iter().sum();
            for (i, &v) in domain.iter().enumerate() {
                let belief = if total > 0.0 { beliefs[i] / total } else { 1.0 / domain.len() as f64 };
                max_change = max_change.max((belief - self.marginals[piece][v]).abs());
                self.marginals[piece][v] = belief;
            }

            for (i, &v) in domain.iter().enumerate() {
                let on_excl: f64 = domain
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, &v2)| self.factor_to_var[piece][v2].0)
                    .product();
                let mut off_excl = 0.0;
                for (j, &vj) in domain.iter().enumerate() {
                    if j == i {
                        continue;
                    }
                    let (_, on_j) = self.factor_to_var[piece][vj];
                    let product: f64 = domain
                        .iter()
                        .enumerate()
                        .filter(|&(l, _)| l != i && l != j)
                        .map(|(_, &vl)| self.factor_to_var[piece][vl].0)
                        .product();
                    off_excl += on_j * product;
                }
                self.var_to_factor[piece][v] = (off_excl, on_excl);
            }
        }
        max_change
    }
}

/// multiply polynomial `base` (coefficients of ascending degree) by the
/// binary factor `off + on * z`.
fn convolve_one(base: &[f64], off: f64, on: f64) -> Vec<f64> {
    let mut out = vec![0.0; base.len() + 1];
    for (s, &c) in base.iter().enumerate() {
        out[s] += c * off;
        out[s + 1] += c * on;
    }
    out
}

/// the coefficient of `z^degree` in the product of `prefix` and `suffix`,
/// without materializing the full convolution.
fn coefficient(prefix: &[f64], suffix: &[f64], degree: i64) -> f64 {
    if degree < 0 {
        return 0.0;
    }
    let degree = degree as usize;
    let mut total = 0.0;
    for s in 0..=degree.min(prefix.len().saturating_sub(1)) {
        if let Some(&c) = suffix.get(degree - s) {
            total += prefix[s] * c;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_collection_has_marginal_one() {
        let model = CollectionModel::new(vec![3]);
        let mut bp = BeliefPropagation::new(3, 1);
        bp.update(&model);
        for piece in 0..3 {
            assert!((bp.probability(piece, 0) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn symmetric_two_two_collection_is_uniform() {
        // four pieces, exactly two 0s and two 1s, no other restriction:
        // every piece should end up with marginal 0.5 on each value.
        let model = CollectionModel::new(vec![2, 2]);
        let mut bp = BeliefPropagation::new(4, 2);
        bp.update(&model);
        for piece in 0..4 {
            assert!((bp.probability(piece, 0) - 0.5).abs() < 1e-3);
            assert!((bp.probability(piece, 1) - 0.5).abs() < 1e-3);
        }
    }

    #[test]
    fn a_removed_value_pushes_marginal_elsewhere() {
        // three pieces, exactly one 0 and two 1s; piece 0 cannot be 1, so
        // it must be the 0 and the other two must be 1.
        let mut model = CollectionModel::new(vec![1, 2]);
        model.remove(0, 1);
        assert_eq!(model.status(), crate::constraint::Status::Solved);
        let mut bp = BeliefPropagation::new(3, 2);
        bp.update(&model);
        assert!((bp.probability(0, 0) - 1.0).abs() < 1e-9);
        assert!((bp.probability(1, 1) - 1.0).abs() < 1e-9);
        assert!((bp.probability(2, 1) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn update_is_a_no_op_when_domains_are_unchanged() {
        let model = CollectionModel::new(vec![2, 2]);
        let mut bp = BeliefPropagation::new(4, 2);
        bp.update(&model);
        let before = bp.marginals.clone();
        bp.update(&model);
        assert_eq!(before, bp.marginals);
    }
}

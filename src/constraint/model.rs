use super::status::Status;

/// a collection-local constraint store: one domain per piece, restricted by
/// an exact-count requirement per value (`counts[v]` pieces must end up
/// holding value `v`). this is the global cardinality constraint at the
/// heart of every collection's consistency check.
///
/// propagation is a bitset fixpoint, not a search: it tightens domains
/// whenever a value has exactly as many remaining candidates as it still
/// needs (forcing them all to take it), or no candidates left to give
/// (removing it from everyone else). it is sound but not complete --
/// [`CollectionModel::has_solution`] falls back to search for the cases
/// propagation alone cannot resolve.
#[derive(Debug, Clone)]
pub struct CollectionModel {
    n_values: usize,
    counts: Vec<usize>,
    domains: Vec<Vec<bool>>,
}

impl CollectionModel {
    /// a fresh model over `counts.len()` values and `counts.iter().sum()`
    /// pieces, every piece starting free over every value.
    pub fn new(counts: Vec<usize>) -> Self {
        let n_values = counts.len();
        let n_pieces = counts.iter().sum();
        Self {
            n_values,
            counts,
            domains: vec![vec![true; n_values]; n_pieces],
        }
    }

    pub fn n_pieces(&self) -> usize {
        self.domains.len()
    }

    pub fn n_values(&self) -> usize {
        self.n_values
    }

    pub fn domain(&self, piece: usize) -> &[bool] {
        &self.domains[piece]
    }

    pub fn domains(&self) -> &[Vec<bool>] {
        &self.domains
    }

    pub fn domain_size(&self, piece: usize) -> usize {
        self.domains[piece].iter().filter(|&&b| b).count()
    }

    pub fn is_singleton(&self, piece: usize) -> bool {
        self.domain_size(piece) == 1
    }

    /// feasible values for `piece`, ascending.
    pub fn values(&self, piece: usize) -> Vec<usize> {
        (0..self.n_values)
            .filter(|&v| self.domains[piece][v])
            .collect()
    }

    /// the single feasible value of a resolved piece.
    pub fn value(&self, piece: usize) -> usize {
        let mut it = (0..self.n_values).filter(|&v| self.domains[piece][v]);
        let v = it.next().expect("piece domain is never empty outside a failed model");
        assert!(it.next().is_none(), "value() called on a non-singleton domain");
        v
    }

    /// add the restriction `piece != value`. does not propagate; call
    /// [`Self::status`] to bring the model to a fixed point.
    pub fn remove(&mut self, piece: usize, value: usize) {
        self.domains[piece][value] = false;
    }

    /// add the restriction `piece != value` for every `value` in `values`.
    pub fn remove_values(&mut self, piece: usize, values: &[usize]) {
        for &v in values {
            self.domains[piece][v] = false;
        }
    }

    /// collapse `piece`'s domain to the singleton `{value}`.
    pub fn assign(&mut self, piece: usize, value: usize) {
        for (v, slot) in self.domains[piece].iter_mut().enumerate() {
            *slot = v == value;
        }
    }

    /// restrict `piece`'s domain to the intersection with `allowed`.
    pub fn restrict_to(&mut self, piece: usize, allowed: &[bool]) {
        for (slot, &ok) in self.domains[piece].iter_mut().zip(allowed.iter()) {
            *slot = *slot && ok;
        }
    }

    pub fn required_count(&self, value: usize) -> usize {
        self.counts[value]
    }

    /// propagate the count constraint to a fixed point and report the
    /// resulting status. idempotent: calling it again once at a fixed
    /// point is a no-op.
    pub fn status(&mut self) -> Status {
        loop {
            if self.domains.iter().any(|d| !d.iter().any(|&b| b)) {
                return Status::Failed;
            }
            let mut changed = false;
            for v in 0..self.n_values {
                let assigned = (0..self.n_pieces())
                    .filter(|&i| self.is_singleton(i) && self.domains[i][v])
                    .count();
                let required = self.counts[v];
                if assigned > required {
                    return Status::Failed;
                }
                let remaining = required - assigned;
                let candidates: Vec<usize> = (0..self.n_pieces())
                    .filter(|&i| !self.is_singleton(i) && self.domains[i][v])
                    .collect();
                if candidates.len() < remaining {
                    return Status::Failed;
                }
                if remaining == 0 {
                    for &i in &candidates {
                        self.domains[i][v] = false;
                        changed = true;
                    }
                } else if candidates.len() == remaining {
                    for &i in &candidates {
                        self.assign(i, v);
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        if (0..self.n_pieces()).all(|i| self.is_singleton(i)) {
            Status::Solved
        } else {
            Status::Branching
        }
    }

    /// whether at least one full assignment exists that is consistent with
    /// the current domains and the count constraint. non-destructive:
    /// searches over clones, smallest-domain variable first, smallest
    /// value first, matching the branching order a Gecode-style DFS
    /// enumerator would use.
    pub fn has_solution(&self) -> bool {
        let mut probe = self.clone();
        match probe.status() {
            Status::Failed => false,
            Status::Solved => true,
            Status::Branching => probe.search(),
        }
    }

    fn search(&self) -> bool {
        let piece = (0..self.n_pieces())
            .filter(|&i| !self.is_singleton(i))
            .min_by_key(|&i| self.domain_size(i))
            .expect("branching status implies some piece is unresolved");
        for v in self.values(piece) {
            let mut branch = self.clone();
            branch.assign(piece, v);
            match branch.status() {
                Status::Failed => continue,
                Status::Solved => return true,
                Status::Branching => {
                    if branch.search() {
                        return true;
                    }
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_model_is_branching_when_more_than_one_value() {
        let mut m = CollectionModel::new(vec![1, 1]);
        assert_eq!(m.status(), Status::Branching);
    }

    #[test]
    fn single_value_collection_solves_immediately() {
        let mut m = CollectionModel::new(vec![3]);
        assert_eq!(m.status(), Status::Solved);
        for i in 0..3 {
            assert_eq!(m.value(i), 0);
        }
    }

    #[test]
    fn exhausting_a_value_forces_the_rest() {
        // two pieces, values {0,1}, exactly one 0 and one 1.
        let mut m = CollectionModel::new(vec![1, 1]);
        m.assign(0, 0);
        assert_eq!(m.status(), Status::Solved);
        assert_eq!(m.value(1), 1);
    }

    #[test]
    fn removing_the_only_feasible_value_fails() {
        let mut m = CollectionModel::new(vec![1]);
        m.remove(0, 0);
        assert_eq!(m.status(), Status::Failed);
    }

    #[test]
    fn over_assigning_a_saturated_value_fails() {
        let mut m = CollectionModel::new(vec![1, 1]);
        m.assign(0, 0);
        m.assign(1, 0);
        assert_eq!(m.status(), Status::Failed);
    }

    #[test]
    fn has_solution_survives_branching_ambiguity() {
        let mut m = CollectionModel::new(vec![2, 2]);
        // remove value 0 from piece 3 only; still satisfiable (pieces 0,1,2
        // can cover the two 0s and two 1s among themselves).
        m.remove(3, 0);
        assert_eq!(m.status(), Status::Branching);
        assert!(m.has_solution());
    }

    #[test]
    fn has_solution_detects_unsatisfiable_branching() {
        // three pieces, need exactly two 0s and two 1s out of three slots:
        // impossible regardless of assignment.
        let mut m = CollectionModel::new(vec![2, 2]);
        m.domains.truncate(3);
        assert!(!m.has_solution());
    }
}

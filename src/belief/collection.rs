use super::piece::Piece;
use crate::bp::BeliefPropagation;
use crate::constraint::{CollectionModel, Status};
use crate::piece_type::PieceType;
use crate::player::PlayerId;
use crate::pov::PointOfView;
use crate::position::Position;

/// every piece of one [`PieceType`] in a belief state, tied together by
/// the single count constraint they all share: an unrestricted model kept
/// around for [`Self::shuffle`], a working model carrying the accumulated
/// restrictions, and a belief-propagation estimator refreshed after every
/// mutation.
#[derive(Debug, Clone)]
pub struct Collection {
    piece_type: PieceType,
    original_model: CollectionModel,
    model: CollectionModel,
    bp: BeliefPropagation,
    observers: Vec<Vec<PlayerId>>,
    positions: Vec<Option<Position>>,
}

impl Collection {
    pub fn new(piece_type: PieceType, counts: Vec<usize>) -> Self {
        let n_pieces: usize = counts.iter().sum();
        let n_values = counts.len();
        let model = CollectionModel::new(counts);
        Self {
            piece_type,
            original_model: model.clone(),
            model,
            bp: BeliefPropagation::new(n_pieces, n_values),
            observers: vec![Vec::new(); n_pieces],
            positions: vec![None; n_pieces],
        }
    }

    pub fn piece_type(&self) -> &PieceType {
        &self.piece_type
    }

    pub fn n_pieces(&self) -> usize {
        self.model.n_pieces()
    }

    pub fn position_of(&self, local: usize) -> Option<Position> {
        self.positions[local]
    }

    pub fn place(&mut self, local: usize, position: Position) {
        self.positions[local] = Some(position);
    }

    pub fn clear_position(&mut self, local: usize) {
        self.positions[local] = None;
    }

    pub fn local_at(&self, position: Position) -> Option<usize> {
        self.positions.iter().position(|p| *p == Some(position))
    }

    pub fn locals_at_cell(&self, cell: usize) -> Vec<usize> {
        (0..self.positions.len())
            .filter(|&i| self.positions[i].is_some_and(|p| p.cell() == cell))
            .collect()
    }

    /// every piece's recorded cell/stack slot, `None` where a piece has
    /// been removed from the board, indexed by local piece id.
    pub fn positions(&self) -> &[Option<Position>] {
        &self.positions
    }

    pub fn placed_positions(&self) -> impl Iterator<Item = (usize, Position)> + '_ {
        self.positions
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|p| (i, p)))
    }

    pub fn max_stack_at(&self, cell: usize) -> Option<usize> {
        self.positions
            .iter()
            .filter_map(|p| p.filter(|p| p.cell() == cell).and_then(|p| p.stack()))
            .max()
    }

    pub fn refresh_bp(&mut self) {
        self.bp.update(&self.model);
    }

    pub fn piece(&self, local: usize) -> Piece {
        let values = self
            .piece_type
            .values()
            .iter()
            .enumerate()
            .filter(|(v, _)| self.model.domain(local)[*v])
            .map(|(_, value)| value.clone())
            .collect();
        let probabilities = (0..self.model.n_values())
            .filter(|&v| self.model.domain(local)[v])
            .map(|v| self.bp.probability(local, v))
            .collect();
        Piece::new(values, probabilities, self.observers[local].clone())
    }

    pub fn is_solved(&self) -> bool {
        (0..self.n_pieces()).all(|i| self.model.is_singleton(i))
    }

    fn assert_consistent(&mut self, what: &str) {
        let status = self.model.status();
        assert!(!status.is_failed(), "{what} left the collection unsatisfiable");
    }

    /// bring a freshly constructed collection to its first fixed point and
    /// seed its belief-propagation estimate. idempotent.
    pub fn finalize(&mut self) {
        self.assert_consistent("building");
        self.refresh_bp();
    }

    pub fn remove_piece_value(&mut self, local: usize, value: usize) {
        self.model.remove(local, value);
        self.assert_consistent("removing a piece value");
        self.refresh_bp();
    }

    pub fn remove_piece_values(&mut self, local: usize, values: &[usize]) {
        self.model.remove_values(local, values);
        self.assert_consistent("removing piece values");
        self.refresh_bp();
    }

    pub fn assign_piece_value(&mut self, local: usize, value: usize) {
        self.model.assign(local, value);
        self.assert_consistent("assigning a piece value");
        self.refresh_bp();
    }

    /// union `new_observers` into the piece's observer set and report
    /// whether the resulting set is seen from `pov`. the caller decides
    /// whether to follow up with [`Self::assign_piece_value`].
    pub fn add_observers(
        &mut self,
        local: usize,
        new_observers: &[PlayerId],
        pov: PointOfView,
        num_players: usize,
    ) -> bool {
        let set = &mut self.observers[local];
        set.extend_from_slice(new_observers);
        set.sort_unstable();
        set.dedup();
        pov.sees(set, num_players)
    }

    pub fn remove_observers(&mut self, local: usize, observers: &[PlayerId]) {
        self.observers[local].retain(|o| !observers.contains(o));
    }

    pub fn hide(&mut self, local: usize) {
        self.observers[local].clear();
    }

    /// shuffle the pieces of this collection that currently sit at
    /// `cell`. counts are derived only from pieces nobody has observed;
    /// observed pieces at the cell lose their narrowing entirely, since a
    /// shuffle severs the link between a previously known position and
    /// the identity that used to occupy it. every piece elsewhere keeps
    /// its prior domain, carried over onto a freshly reset model.
    pub fn shuffle(&mut self, cell: usize) {
        let at_cell = self.locals_at_cell(cell);
        if at_cell.is_empty() {
            return;
        }
        let mut counts = vec![0usize; self.model.n_values()];
        for &i in &at_cell {
            if !self.observers[i].is_empty() {
                continue;
            }
            for v in self.model.values(i) {
                counts[v] += 1;
            }
        }

        let mut fresh = self.original_model.clone();
        for i in 0..self.n_pieces() {
            if at_cell.contains(&i) {
                continue;
            }
            let prior = self.model.domain(i).to_vec();
            fresh.restrict_to(i, &prior);
        }
        for &i in &at_cell {
            if !self.observers[i].is_empty() {
                continue;
            }
            for v in 0..fresh.n_values() {
                if counts[v] == 0 {
                    fresh.remove(i, v);
                }
            }
        }

        let status = fresh.status();
        assert!(!status.is_failed(), "shuffle produced an unsatisfiable collection");
        self.model = fresh;
        self.refresh_bp();
    }

    /// whether restricting `local` away from every value in `not_values`
    /// still leaves at least one full assignment of the collection.
    /// non-destructive.
    pub fn assignment_possible(&self, local: usize, not_values: &[usize]) -> bool {
        let mut probe = self.model.clone();
        for &v in not_values {
            probe.remove(local, v);
        }
        match probe.status() {
            Status::Failed => false,
            Status::Solved => true,
            Status::Branching => probe.has_solution(),
        }
    }

    pub fn domain_matches(&self, other: &Collection) -> bool {
        self.piece_type == other.piece_type
            && (0..self.n_pieces()).all(|i| self.model.domain(i) == other.model.domain(i))
    }

    pub fn observers_match(&self, other: &Collection) -> bool {
        self.observers == other.observers
    }

    /// whether `world`'s domains are each a subset of this collection's,
    /// i.e. everything `world` still considers possible is something we
    /// already considered possible too.
    pub fn admits(&self, world: &Collection) -> bool {
        self.piece_type == world.piece_type
            && (0..self.n_pieces()).all(|i| {
                world
                    .model
                    .domain(i)
                    .iter()
                    .zip(self.model.domain(i).iter())
                    .all(|(&w, &s)| !w || s)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{AttributeValue, PieceAttribute, PieceValue};

    fn suits() -> PieceType {
        PieceType::new(vec![
            PieceValue::new(vec![PieceAttribute::new("suit", AttributeValue::Str("clubs".into()))]),
            PieceValue::new(vec![PieceAttribute::new("suit", AttributeValue::Str("hearts".into()))]),
        ])
    }

    #[test]
    fn remove_then_assign_resolves_a_pair() {
        let mut c = Collection::new(suits(), vec![1, 1]);
        c.remove_piece_value(0, 1);
        assert!(c.piece(0).is_determined());
        assert!(c.piece(1).is_determined());
        assert_eq!(c.piece(1).value(), &suits().value_at(1).clone());
    }

    #[test]
    #[should_panic(expected = "unsatisfiable")]
    fn over_assigning_panics() {
        let mut c = Collection::new(suits(), vec![1, 1]);
        c.assign_piece_value(0, 0);
        c.assign_piece_value(1, 0);
    }

    #[test]
    fn shuffle_resets_unseen_pieces_within_their_prior_cell_domain() {
        let mut c = Collection::new(suits(), vec![1, 1]);
        c.place(0, Position::top(0));
        c.place(1, Position::top(0));
        c.remove_piece_value(0, 1);
        assert!(c.piece(0).is_determined());
        c.shuffle(0);
        assert!(!c.piece(0).is_determined());
        assert!(!c.piece(1).is_determined());
    }

    #[test]
    fn observed_piece_seen_by_private_pov_is_reported_seen() {
        let mut c = Collection::new(suits(), vec![1, 1]);
        let seen = c.add_observers(0, &[0], PointOfView::Private(0), 2);
        assert!(seen);
        let seen_other = c.add_observers(1, &[0], PointOfView::Private(1), 2);
        assert!(!seen_other);
    }

    #[test]
    fn assignment_possible_previews_without_mutating() {
        let mut c = Collection::new(suits(), vec![1, 1]);
        c.place(0, Position::top(0));
        assert!(c.assignment_possible(0, &[1]));
        assert!(!c.piece(0).is_determined());
    }
}

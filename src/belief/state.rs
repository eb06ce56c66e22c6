use super::collection::Collection;
use super::piece::Piece;
use crate::graph::PlayGraph;
use crate::player::PlayerId;
use crate::pov::PointOfView;
use crate::position::Position;
use crate::value::PieceValue;
use crate::variable::{Variable, VariableValue};
use std::fmt::{self, Display, Formatter};

/// one player's (or the world's, or the public's) belief about the whole
/// game: a play graph, one collection per piece type, named game
/// variables, the ordered set of current players to act (possibly
/// including the chance player, possibly empty once the game has ended),
/// and the running probability of having reached this state along
/// whatever branch produced it.
///
/// every piece lives in exactly one collection for its whole life; moving
/// it only changes its recorded [`Position`], never its collection.
#[derive(Debug, Clone)]
pub struct BeliefState {
    pov: PointOfView,
    num_players: usize,
    graph: PlayGraph,
    collections: Vec<Collection>,
    variables: Vec<Variable>,
    current_players: Vec<PlayerId>,
    total_probability: f64,
}

impl BeliefState {
    pub(crate) fn new(pov: PointOfView, num_players: usize, graph: PlayGraph, collections: Vec<Collection>) -> Self {
        Self {
            pov,
            num_players,
            graph,
            collections,
            variables: Vec::new(),
            current_players: vec![crate::player::CHANCE],
            total_probability: 1.0,
        }
    }

    pub fn point_of_view(&self) -> PointOfView {
        self.pov
    }

    pub fn num_players(&self) -> usize {
        self.num_players
    }

    pub fn graph(&self) -> &PlayGraph {
        &self.graph
    }

    /// the ordered set of players to act this ply; empty once the game
    /// has ended.
    pub fn current_players(&self) -> &[PlayerId] {
        &self.current_players
    }

    /// the sole player to act. panics if more than one player is current;
    /// callers that only handle turn-based play use this instead of
    /// matching on [`Self::current_players`] themselves.
    pub fn current_player(&self) -> PlayerId {
        match self.current_players.as_slice() {
            [player] => *player,
            players => panic!("current_player called with {} current players", players.len()),
        }
    }

    pub fn set_current_players(&mut self, players: Vec<PlayerId>) {
        self.current_players = players;
    }

    pub fn set_current_player(&mut self, player: PlayerId) {
        self.current_players = vec![player];
    }

    pub fn total_probability(&self) -> f64 {
        self.total_probability
    }

    pub fn scale_probability(&mut self, factor: f64) {
        self.total_probability *= factor;
    }

    pub fn variable(&self, name: &str) -> Option<&VariableValue> {
        self.variables.iter().find(|v| v.name() == name).map(Variable::value)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: VariableValue) {
        let name = name.into();
        match self.variables.iter_mut().find(|v| v.name() == name) {
            Some(slot) => *slot = Variable::new(name, value),
            None => self.variables.push(Variable::new(name, value)),
        }
    }

    fn locate(&self, position: Position) -> (usize, usize) {
        let resolved = self.resolve(position);
        self.collections
            .iter()
            .enumerate()
            .find_map(|(c, coll)| coll.local_at(resolved).map(|local| (c, local)))
            .expect("no piece occupies the requested position")
    }

    /// resolve a possibly top-of-stack position to the concrete slot it
    /// currently refers to.
    fn resolve(&self, position: Position) -> Position {
        if position.has_stack() {
            return position;
        }
        let top = self
            .collections
            .iter()
            .filter_map(|c| c.max_stack_at(position.cell()))
            .max()
            .expect("top-of-stack position addresses an empty cell");
        Position::slot(position.cell(), top)
    }

    /// every currently occupied position, in no particular order.
    pub fn all_positions(&self) -> Vec<Position> {
        self.collections
            .iter()
            .flat_map(|c| c.placed_positions().map(|(_, p)| p))
            .collect()
    }

    pub fn get_piece_at(&self, position: Position) -> Piece {
        let (c, local) = self.locate(position);
        self.collections[c].piece(local)
    }

    /// every piece at `cell`, ordered by stack index ascending.
    pub fn get_pieces_at(&self, cell: usize) -> Vec<Piece> {
        let mut slots: Vec<(usize, Piece)> = Vec::new();
        for collection in &self.collections {
            for local in collection.locals_at_cell(cell) {
                let stack = collection
                    .position_of(local)
                    .and_then(|p| p.stack())
                    .unwrap_or(0);
                slots.push((stack, collection.piece(local)));
            }
        }
        slots.sort_by_key(|(stack, _)| *stack);
        slots.into_iter().map(|(_, piece)| piece).collect()
    }

    pub fn move_piece(&mut self, from: Position, to: Position) {
        let (c, local) = self.locate(from);
        let target = if to.has_stack() {
            to
        } else {
            let next = self.collections[c].max_stack_at(to.cell()).map_or(0, |s| s + 1);
            Position::slot(to.cell(), next)
        };
        self.collections[c].place(local, target);
    }

    pub fn remove_piece(&mut self, position: Position) {
        let (c, local) = self.locate(position);
        self.collections[c].clear_position(local);
    }

    fn value_index(&self, collection: usize, value: &PieceValue) -> usize {
        self.collections[collection].piece_type().index_of(value)
    }

    pub fn remove_piece_value(&mut self, position: Position, value: &PieceValue) {
        let (c, local) = self.locate(position);
        let v = self.value_index(c, value);
        self.collections[c].remove_piece_value(local, v);
    }

    pub fn remove_piece_values(&mut self, position: Position, values: &[PieceValue]) {
        let (c, local) = self.locate(position);
        let indices: Vec<usize> = values.iter().map(|v| self.value_index(c, v)).collect();
        self.collections[c].remove_piece_values(local, &indices);
    }

    pub fn assign_piece_value(&mut self, position: Position, value: &PieceValue) {
        let (c, local) = self.locate(position);
        let v = self.value_index(c, value);
        self.collections[c].assign_piece_value(local, v);
    }

    /// union `observers` into the piece's observer set. returns whether
    /// the piece is now seen from this state's own point of view.
    pub fn add_observers(&mut self, position: Position, observers: &[PlayerId]) -> bool {
        let (c, local) = self.locate(position);
        let pov = self.pov;
        let n = self.num_players;
        self.collections[c].add_observers(local, observers, pov, n)
    }

    pub fn remove_observers(&mut self, position: Position, observers: &[PlayerId]) {
        let (c, local) = self.locate(position);
        self.collections[c].remove_observers(local, observers);
    }

    pub fn hide(&mut self, position: Position) {
        let (c, local) = self.locate(position);
        self.collections[c].hide(local);
    }

    /// clear the observer set of every piece currently at `cell`, across
    /// every collection.
    pub fn hide_cell(&mut self, cell: usize) {
        for collection in &mut self.collections {
            for local in collection.locals_at_cell(cell) {
                collection.hide(local);
            }
        }
    }

    pub fn shuffle(&mut self, cell: usize) {
        for collection in &mut self.collections {
            collection.shuffle(cell);
        }
    }

    pub fn assignment_possible(&self, position: Position, not_values: &[PieceValue]) -> bool {
        let (c, local) = self.locate(position);
        let indices: Vec<usize> = not_values.iter().map(|v| self.value_index(c, v)).collect();
        self.collections[c].assignment_possible(local, &indices)
    }

    pub fn is_determined(&self) -> bool {
        self.collections.iter().all(Collection::is_solved)
    }

    /// whether this state still considers every possibility `other`
    /// considers possible: matching collections with every piece sitting
    /// at the same cell/stack slot, each domain here a superset of the
    /// corresponding one there, identical observer bookkeeping, and
    /// identical public state (variables, current players).
    pub fn is_consistent_with(&self, other: &BeliefState) -> bool {
        if self.collections.len() != other.collections.len() {
            return false;
        }
        if self.current_players != other.current_players || self.variables != other.variables {
            return false;
        }
        self.collections.iter().zip(other.collections.iter()).all(|(mine, theirs)| {
            mine.positions() == theirs.positions() && mine.admits(theirs) && mine.observers_match(theirs)
        })
    }
}

impl Display for BeliefState {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "belief state [{}], current players {:?}", self.pov, self.current_players)?;
        for cell in 0..self.graph.size() {
            let pieces = self.get_pieces_at(cell);
            if pieces.is_empty() {
                continue;
            }
            write!(f, "  cell {cell}: ")?;
            for (i, piece) in pieces.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{piece}")?;
            }
            writeln!(f)?;
        }
        for variable in &self.variables {
            writeln!(f, "  {variable}")?;
        }
        Ok(())
    }
}

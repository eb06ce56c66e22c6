/// the outcome of propagating a [`super::model::CollectionModel`] to a
/// fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// every piece's domain is a singleton.
    Solved,
    /// at least one piece still has more than one feasible value, but no
    /// contradiction has been found.
    Branching,
    /// the count constraint and the accumulated restrictions cannot be
    /// satisfied simultaneously.
    Failed,
}

impl Status {
    pub fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }
}

//! the per-collection global cardinality constraint: a bitset domain per
//! piece, tightened under an exact-count requirement per value. Gecode's
//! `count()` propagator and a `DFS` search engine solve the same problem;
//! this module is a from-scratch Rust equivalent of both.

mod model;
mod status;

pub use model::CollectionModel;
pub use status::Status;

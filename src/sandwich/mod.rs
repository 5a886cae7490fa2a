//! Bounded-degree interval graph sandwich search.
//!
//! Given a vertex set with a mandatory and a forbidden graph, find one interval per vertex so
//! that every mandatory pair overlaps and no forbidden pair does, while never keeping more than
//! `max_width - 1` intervals open during the left-to-right construction.

pub mod cut;
pub mod instance;
pub mod interval;
pub mod solver;

pub use cut::{Cut, ExtensionRejected};
pub use instance::SandwichInstance;
pub use interval::{Interval, VertexInterval};
pub use solver::{ProblemSolver, SolveOutcome, SolverConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_WIDTH};

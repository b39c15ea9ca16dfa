//! Integer programming model for capacity-bounded requirement tags, and its solvers.

#[cfg(feature = "cp-sat")]
mod backend_cp_sat;
mod backend_microlp;
mod model_capacity;
mod solve;

pub use model_capacity::{CapacityModel, Slot};
pub use solve::{SolveOutcome, SolveStatus, solve};

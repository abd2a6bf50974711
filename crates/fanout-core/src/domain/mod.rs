//! Domain model (ids, invocation, loop outcomes, worker errors).

pub mod errors;
pub mod ids;
pub mod invocation;
pub mod outcome;

pub use errors::{ErrorKind, WorkError};
pub use ids::{RunId, WorkerId};
pub use invocation::{Capability, Invocation};
pub use outcome::{LoopOutcome, LoopState};

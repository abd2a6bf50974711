//! Queue module: the work queue, its leases and the completion ledger.

mod ledger;
mod memory;

pub use memory::{Lease, WorkQueue};

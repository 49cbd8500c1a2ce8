pub mod allocator;
pub mod fleet;
pub mod ledger;
pub mod locks;
pub mod reports;
pub mod retry;

#[cfg(test)]
mod testing;

pub use allocator::SeatAllocator;
pub use fleet::InMemoryFleet;
pub use ledger::{InMemoryLedger, SequenceIdGenerator};
pub use locks::CruiseLocks;
pub use reports::Reports;
pub use retry::RetryPolicy;

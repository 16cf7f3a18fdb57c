pub mod commands;
pub mod coordinator;
pub mod engine;
pub mod environment;
pub mod objects;
pub mod parameters;
pub mod storage;

pub use coordinator::{Coordinator, CoordinatorError};
pub use objects::{AccessGrant, ContributionRecord, Locator, Transcript};
pub use storage::ObjectStore;

#[cfg(test)]
mod testing;

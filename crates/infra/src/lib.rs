//! Infrastructure layer: storage, directory loading and the move transaction service.

pub mod move_service;
pub mod seed;
pub mod store;

pub use move_service::{FailureTrigger, MoveServiceConfig, MoveTransactionService};
pub use seed::{demo_directory, load_directory, DirectoryDocument, SeedError, DEMO_DIRECTORY};
pub use store::{InMemoryChannelStore, MoveSnapshot, MoveUnitOfWork, StoreError};

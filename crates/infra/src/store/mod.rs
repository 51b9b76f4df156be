//! Company + audit storage.
//!
//! Only an in-memory implementation exists; the company directory and the
//! audit trail are both owned by the host process.

mod in_memory;
mod r#trait;

pub use in_memory::InMemoryChannelStore;
pub use r#trait::{MoveSnapshot, MoveUnitOfWork, StoreError};

#[cfg(test)]
pub(crate) use in_memory::poison;

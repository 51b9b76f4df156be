//! `channel-core`: shared building blocks for the reseller/customer domain.
//!
//! Pure domain primitives only (identifiers and errors).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{CompanyId, MoveId, PriceListId, ServiceId};

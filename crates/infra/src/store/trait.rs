use std::sync::Arc;

use thiserror::Error;

use channel_core::{CompanyId, DomainError};
use channel_directory::{Company, CompanyPatch, CompanyRepository};
use channel_events::EventEnvelope;
use channel_moves::{AuditTrailStore, MoveError, MoveEvent};

/// Store-level failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,

    #[error("company {0} not found")]
    NotFound(CompanyId),

    /// The record changed between the caller's read and the write.
    #[error("concurrency conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<StoreError> for MoveError {
    fn from(err: StoreError) -> Self {
        MoveError::Storage(err.to_string())
    }
}

/// The records a move is validated against, read together.
///
/// `source` is whatever the customer's current reseller id points at, if
/// anything; callers check its kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveSnapshot {
    pub customer: Option<Company>,
    pub source: Option<Company>,
    pub destination: Option<Company>,
}

/// Company records and their audit trail behind one transactional boundary.
///
/// `record_move` applies the customer update and appends the audit event as a
/// single unit: either both are visible afterwards or neither is.
pub trait MoveUnitOfWork:
    CompanyRepository<Error = StoreError> + AuditTrailStore<Error = StoreError>
{
    /// Customer, its current reseller and `destination_id` as of one instant.
    fn move_snapshot(
        &self,
        customer_id: CompanyId,
        destination_id: CompanyId,
    ) -> Result<MoveSnapshot, StoreError>;

    /// Reassign `customer_id` and record `event`.
    ///
    /// Fails with [`StoreError::Conflict`] if the customer no longer belongs
    /// to `expected_reseller`.
    fn record_move(
        &self,
        customer_id: CompanyId,
        expected_reseller: CompanyId,
        patch: CompanyPatch,
        event: MoveEvent,
    ) -> Result<(Company, EventEnvelope<MoveEvent>), StoreError>;
}

impl<S> MoveUnitOfWork for Arc<S>
where
    S: MoveUnitOfWork + ?Sized,
{
    fn move_snapshot(
        &self,
        customer_id: CompanyId,
        destination_id: CompanyId,
    ) -> Result<MoveSnapshot, StoreError> {
        (**self).move_snapshot(customer_id, destination_id)
    }

    fn record_move(
        &self,
        customer_id: CompanyId,
        expected_reseller: CompanyId,
        patch: CompanyPatch,
        event: MoveEvent,
    ) -> Result<(Company, EventEnvelope<MoveEvent>), StoreError> {
        (**self).record_move(customer_id, expected_reseller, patch, event)
    }
}

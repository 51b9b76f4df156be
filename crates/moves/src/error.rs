//! Move failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use channel_core::{CompanyId, PriceListId};

/// Message shown instead of any technical failure detail.
pub const SUPPORT_MESSAGE: &str = "We couldn't complete the move. Please try again or contact support.";

/// Why a commit was refused.
///
/// Validation variants display their own text. Technical variants must be
/// shown through [`MoveError::display_message`], which masks them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("Only end customers can be moved.")]
    NotACustomer,

    #[error("Destination reseller is invalid.")]
    InvalidDestination,

    #[error("Customer is already assigned to this reseller.")]
    AlreadyAssigned,

    #[error("Destination price list selection is required.")]
    NoPriceListSelected,

    /// Deterministic backend failure used to exercise the failure path.
    #[error("simulated technical failure (reseller {reseller_id}, price list {price_list_id})")]
    SimulatedTechnicalFailure {
        reseller_id: CompanyId,
        price_list_id: PriceListId,
    },

    /// The store could not apply the move.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Stable discriminator for [`MoveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveErrorKind {
    NotACustomer,
    InvalidDestination,
    AlreadyAssigned,
    NoPriceListSelected,
    SimulatedTechnicalFailure,
    StorageFailure,
}

impl MoveErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveErrorKind::NotACustomer => "not_a_customer",
            MoveErrorKind::InvalidDestination => "invalid_destination",
            MoveErrorKind::AlreadyAssigned => "already_assigned",
            MoveErrorKind::NoPriceListSelected => "no_price_list_selected",
            MoveErrorKind::SimulatedTechnicalFailure => "simulated_technical_failure",
            MoveErrorKind::StorageFailure => "storage_failure",
        }
    }
}

impl core::fmt::Display for MoveErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MoveError {
    pub fn kind(&self) -> MoveErrorKind {
        match self {
            MoveError::NotACustomer => MoveErrorKind::NotACustomer,
            MoveError::InvalidDestination => MoveErrorKind::InvalidDestination,
            MoveError::AlreadyAssigned => MoveErrorKind::AlreadyAssigned,
            MoveError::NoPriceListSelected => MoveErrorKind::NoPriceListSelected,
            MoveError::SimulatedTechnicalFailure { .. } => MoveErrorKind::SimulatedTechnicalFailure,
            MoveError::Storage(_) => MoveErrorKind::StorageFailure,
        }
    }

    pub fn is_technical(&self) -> bool {
        matches!(
            self,
            MoveError::SimulatedTechnicalFailure { .. } | MoveError::Storage(_)
        )
    }

    /// Text safe to show the user.
    pub fn display_message(&self) -> String {
        if self.is_technical() {
            SUPPORT_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

/// Failure response shape handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveFailure {
    pub kind: MoveErrorKind,
    pub message: String,
}

impl From<&MoveError> for MoveFailure {
    fn from(err: &MoveError) -> Self {
        Self {
            kind: err.kind(),
            message: err.display_message(),
        }
    }
}

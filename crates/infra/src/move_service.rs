//! Move transaction service: validates a move request and commits it.
//!
//! Validation runs in a fixed order against one [`MoveSnapshot`] and stops at
//! the first failure. A successful commit updates the customer and appends the
//! audit event through [`MoveUnitOfWork::record_move`], so callers never
//! observe one without the other.

use std::str::FromStr;

use chrono::Utc;
use tracing::{info, warn};

use channel_core::{CompanyId, DomainError, PriceListId};
use channel_directory::{Company, CompanyPatch, PriceList};
use channel_moves::{EffectiveDate, MoveCommitter, MoveError, MoveEvent, MoveReceipt, MoveRequest};

use crate::store::{MoveSnapshot, MoveUnitOfWork};

/// Destination that deterministically fails with a technical error.
///
/// Used to exercise the failure path end to end. Parsed from
/// `<reseller id>:<price list id>`, e.g. `4:PL-CF-PRO`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureTrigger {
    pub reseller_id: CompanyId,
    pub price_list_id: PriceListId,
}

impl FailureTrigger {
    pub fn new(reseller_id: CompanyId, price_list_id: impl Into<PriceListId>) -> Self {
        Self {
            reseller_id,
            price_list_id: price_list_id.into(),
        }
    }

    /// Whether `request` targets this trigger.
    ///
    /// Checked against the requested ids, resolved or not.
    pub fn fires_for(&self, request: &MoveRequest) -> bool {
        request.destination_reseller_id == self.reseller_id
            && request.destination_price_list_ids.contains(&self.price_list_id)
    }
}

impl FromStr for FailureTrigger {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (reseller, price_list) = s.trim().split_once(':').ok_or_else(|| {
            DomainError::validation(format!(
                "failure trigger '{s}' must look like <reseller id>:<price list id>"
            ))
        })?;
        Ok(Self {
            reseller_id: reseller.trim().parse()?,
            price_list_id: price_list.trim().parse()?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MoveServiceConfig {
    /// No trigger means every valid move commits.
    pub failure_trigger: Option<FailureTrigger>,
}

/// Commits customer moves against a [`MoveUnitOfWork`].
#[derive(Debug, Clone)]
pub struct MoveTransactionService<S> {
    store: S,
    config: MoveServiceConfig,
}

impl<S: MoveUnitOfWork> MoveTransactionService<S> {
    pub fn new(store: S, config: MoveServiceConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &MoveServiceConfig {
        &self.config
    }

    /// Validate and commit `request`.
    ///
    /// On any error no company record or audit entry has changed.
    pub fn move_customer(&self, request: &MoveRequest) -> Result<MoveReceipt, MoveError> {
        let result = self.try_move(request);
        match &result {
            Ok(receipt) => info!(
                customer_id = %request.customer_id,
                destination_reseller_id = %request.destination_reseller_id,
                from = %receipt.move_event.before_reseller_name,
                to = %receipt.move_event.after_reseller_name,
                "customer moved"
            ),
            Err(err) => warn!(
                customer_id = %request.customer_id,
                destination_reseller_id = %request.destination_reseller_id,
                kind = %err.kind(),
                error = %err,
                "customer move rejected"
            ),
        }
        result
    }

    fn try_move(&self, request: &MoveRequest) -> Result<MoveReceipt, MoveError> {
        let MoveSnapshot {
            customer,
            source,
            destination,
        } = self
            .store
            .move_snapshot(request.customer_id, request.destination_reseller_id)?;

        let customer_company = customer.ok_or(MoveError::NotACustomer)?;
        let customer = customer_company.as_customer().ok_or(MoveError::NotACustomer)?;

        let destination = destination.ok_or(MoveError::InvalidDestination)?;
        let destination_reseller = destination
            .as_reseller()
            .ok_or(MoveError::InvalidDestination)?;

        if customer.reseller_id() == destination.id() {
            return Err(MoveError::AlreadyAssigned);
        }

        let selected = resolve_price_lists(
            &request.destination_price_list_ids,
            destination_reseller.price_lists(),
        );
        if selected.is_empty() {
            return Err(MoveError::NoPriceListSelected);
        }

        if let Some(trigger) = self
            .config
            .failure_trigger
            .as_ref()
            .filter(|t| t.fires_for(request))
        {
            return Err(MoveError::SimulatedTechnicalFailure {
                reseller_id: trigger.reseller_id,
                price_list_id: trigger.price_list_id.clone(),
            });
        }

        let source = source.filter(|c| c.as_reseller().is_some());

        let event = MoveEvent {
            occurred_at: Utc::now(),
            before_reseller_name: source
                .as_ref()
                .map(|r| r.name().to_string())
                .unwrap_or_else(|| format!("Reseller {}", customer.reseller_id())),
            after_reseller_name: destination.name().to_string(),
            before_price_list_names: price_list_names(
                customer.current_price_list_ids(),
                source.as_ref(),
            ),
            after_price_list_names: selected.iter().map(|pl| pl.name.clone()).collect(),
            effective_date: EffectiveDate::Immediate,
        };

        let patch = CompanyPatch::Reassign {
            reseller_id: destination.id(),
            price_list_ids: selected.iter().map(|pl| pl.id.clone()).collect(),
        };

        let (_, envelope) = self.store.record_move(
            request.customer_id,
            customer.reseller_id(),
            patch,
            event,
        )?;

        let message = format!(
            "Customer successfully moved from {} to {}.",
            source.as_ref().map(Company::name).unwrap_or("previous reseller"),
            destination.name(),
        );

        Ok(MoveReceipt {
            move_event: envelope.into_payload(),
            message,
        })
    }
}

impl<S: MoveUnitOfWork> MoveCommitter for MoveTransactionService<S> {
    fn commit(&self, request: &MoveRequest) -> Result<MoveReceipt, MoveError> {
        self.move_customer(request)
    }
}

/// Requested ids that the destination owns, in request order, without repeats.
fn resolve_price_lists<'a>(requested: &[PriceListId], owned: &'a [PriceList]) -> Vec<&'a PriceList> {
    let mut selected: Vec<&PriceList> = Vec::with_capacity(requested.len());
    for id in requested {
        if selected.iter().any(|pl| &pl.id == id) {
            continue;
        }
        if let Some(pl) = owned.iter().find(|pl| &pl.id == id) {
            selected.push(pl);
        }
    }
    selected
}

/// Display names for `ids`; ids the reseller no longer owns fall back to the raw id.
fn price_list_names(ids: &[PriceListId], reseller: Option<&Company>) -> Vec<String> {
    let owner = reseller.and_then(Company::as_reseller);
    ids.iter()
        .map(|id| {
            owner
                .and_then(|r| r.price_list(id))
                .map(|pl| pl.name.clone())
                .unwrap_or_else(|| id.to_string())
        })
        .collect()
}

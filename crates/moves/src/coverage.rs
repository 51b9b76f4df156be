//! Coverage check: which of a customer's services a price-list selection
//! fails to offer.

use serde::Serialize;

use channel_directory::{PriceList, SubscribedService};

/// Services in `customer_services` that none of `selected` offers.
///
/// Keeps the customer's subscription order. An empty selection reports every
/// service as missing; callers decide whether that counts as a conflict.
pub fn missing_services<'a, I>(customer_services: &[SubscribedService], selected: I) -> Vec<SubscribedService>
where
    I: IntoIterator<Item = &'a PriceList>,
{
    let selected: Vec<&PriceList> = selected.into_iter().collect();

    customer_services
        .iter()
        .filter(|sub| !selected.iter().any(|list| list.covers(sub.service_id())))
        .cloned()
        .collect()
}

/// Outcome of checking a selection against a customer's subscriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    selected_count: usize,
    missing: Vec<SubscribedService>,
}

impl CoverageReport {
    pub fn evaluate(customer_services: &[SubscribedService], selected: &[&PriceList]) -> Self {
        Self {
            selected_count: selected.len(),
            missing: missing_services(customer_services, selected.iter().copied()),
        }
    }

    pub fn missing(&self) -> &[SubscribedService] {
        &self.missing
    }

    /// True only when something is selected and it leaves services uncovered.
    pub fn has_conflict(&self) -> bool {
        self.selected_count > 0 && !self.missing.is_empty()
    }
}

/// Shorthand for [`CoverageReport::has_conflict`].
pub fn has_coverage_conflict(customer_services: &[SubscribedService], selected: &[&PriceList]) -> bool {
    CoverageReport::evaluate(customer_services, selected).has_conflict()
}

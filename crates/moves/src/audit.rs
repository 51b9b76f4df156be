//! Audit trail of completed moves: the store port and the log view built on it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use channel_core::CompanyId;
use channel_events::EventEnvelope;

use crate::event::MoveEvent;

/// Append-only, per-customer log of moves.
///
/// No update or delete operations exist. A customer with no recorded moves
/// has an empty history.
pub trait AuditTrailStore: Send + Sync {
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Recorded moves for `customer_id`, newest first.
    fn history(&self, customer_id: CompanyId) -> Result<Vec<EventEnvelope<MoveEvent>>, Self::Error>;

    /// Record `event` as the newest entry for `customer_id`.
    fn append(
        &self,
        customer_id: CompanyId,
        event: MoveEvent,
    ) -> Result<EventEnvelope<MoveEvent>, Self::Error>;

    /// Payloads of [`AuditTrailStore::history`].
    fn events(&self, customer_id: CompanyId) -> Result<Vec<MoveEvent>, Self::Error> {
        Ok(self
            .history(customer_id)?
            .into_iter()
            .map(EventEnvelope::into_payload)
            .collect())
    }
}

impl<S> AuditTrailStore for Arc<S>
where
    S: AuditTrailStore + ?Sized,
{
    type Error = S::Error;

    fn history(&self, customer_id: CompanyId) -> Result<Vec<EventEnvelope<MoveEvent>>, Self::Error> {
        (**self).history(customer_id)
    }

    fn append(
        &self,
        customer_id: CompanyId,
        event: MoveEvent,
    ) -> Result<EventEnvelope<MoveEvent>, Self::Error> {
        (**self).append(customer_id, event)
    }
}

/// Who performed an audited operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditActor {
    pub name: String,
    pub code: String,
}

/// One row of a customer's audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub occurred_at: DateTime<Utc>,
    pub timezone: &'static str,
    pub status: &'static str,
    pub event: &'static str,
    pub operation_prefix: &'static str,
    pub operation_target: String,
    pub operation_suffix: String,
    pub users: Vec<AuditActor>,
}

impl AuditEntry {
    pub fn from_move(event: &MoveEvent) -> Self {
        Self {
            occurred_at: event.occurred_at,
            timezone: "GMT+0",
            status: "Successful",
            event: "Move Customer",
            operation_prefix: "Customer moved from",
            operation_target: event.before_reseller_name.clone(),
            operation_suffix: format!(
                "to {}. Price lists: {} → {}. Effective date: {}.",
                event.after_reseller_name,
                event.before_price_list_names.join(", "),
                event.after_price_list_names.join(", "),
                event.effective_date,
            ),
            users: vec![AuditActor {
                name: "System".to_string(),
                code: "Move workflow".to_string(),
            }],
        }
    }

    /// Full operation sentence.
    pub fn operation(&self) -> String {
        format!(
            "{} {} {}",
            self.operation_prefix, self.operation_target, self.operation_suffix
        )
    }

    /// e.g. "10 Feb 2026"
    pub fn date_label(&self) -> String {
        self.occurred_at.format("%-d %b %Y").to_string()
    }

    /// e.g. "11:22:00 AM"
    pub fn time_label(&self) -> String {
        self.occurred_at.format("%-I:%M:%S %p").to_string()
    }

    /// Case-insensitive match of `query` against every rendered field.
    ///
    /// A blank query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let mut haystack = vec![
            self.status.to_string(),
            self.event.to_string(),
            self.operation_prefix.to_string(),
            self.operation_target.clone(),
            self.operation_suffix.clone(),
        ];
        for user in &self.users {
            haystack.push(user.name.clone());
            haystack.push(user.code.clone());
        }
        haystack.push(self.date_label());
        haystack.push(self.time_label());
        haystack.push(self.timezone.to_string());

        haystack.join(" ").to_lowercase().contains(&needle)
    }
}

/// Audit log rows for a customer, newest first, filtered by `query`.
pub fn audit_log<S: AuditTrailStore + ?Sized>(
    store: &S,
    customer_id: CompanyId,
    query: &str,
) -> Result<Vec<AuditEntry>, S::Error> {
    Ok(store
        .events(customer_id)?
        .iter()
        .map(AuditEntry::from_move)
        .filter(|entry| entry.matches(query))
        .collect())
}

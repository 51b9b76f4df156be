use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use channel_core::CompanyId;
use channel_directory::{Company, CompanyPatch, CompanyRepository};
use channel_events::EventEnvelope;
use channel_moves::{AuditTrailStore, MoveEvent};

use super::r#trait::{MoveSnapshot, MoveUnitOfWork, StoreError};

#[derive(Debug, Default)]
struct State {
    companies: BTreeMap<CompanyId, Company>,
    /// Oldest first; reads reverse it.
    audit: HashMap<CompanyId, Vec<EventEnvelope<MoveEvent>>>,
}

impl State {
    fn append(&mut self, customer_id: CompanyId, event: MoveEvent) -> EventEnvelope<MoveEvent> {
        let stream = self.audit.entry(customer_id).or_default();
        let next = stream.last().map(|e| e.sequence_number()).unwrap_or(0) + 1;
        let envelope = EventEnvelope::record(customer_id, next, event);
        stream.push(envelope.clone());
        envelope
    }
}

/// In-memory company directory and audit trail.
///
/// Intended for tests and the demo CLI. Reads hand out clones.
#[derive(Debug, Default)]
pub struct InMemoryChannelStore {
    state: RwLock<State>,
}

impl InMemoryChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a company record as-is.
    pub fn insert_company(&self, company: Company) -> Result<(), StoreError> {
        self.write()?.companies.insert(company.id(), company);
        Ok(())
    }

    /// Seed prior history for `customer_id`, oldest event first.
    pub fn import_history(
        &self,
        customer_id: CompanyId,
        events: impl IntoIterator<Item = MoveEvent>,
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;
        for event in events {
            state.append(customer_id, event);
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }
}

impl CompanyRepository for InMemoryChannelStore {
    type Error = StoreError;

    fn find(&self, id: CompanyId) -> Result<Option<Company>, StoreError> {
        Ok(self.read()?.companies.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Company>, StoreError> {
        Ok(self.read()?.companies.values().cloned().collect())
    }

    fn update(&self, id: CompanyId, patch: CompanyPatch) -> Result<Company, StoreError> {
        let mut state = self.write()?;
        let company = state.companies.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        company.apply_patch(&patch)?;
        Ok(company.clone())
    }
}

impl AuditTrailStore for InMemoryChannelStore {
    type Error = StoreError;

    fn history(&self, customer_id: CompanyId) -> Result<Vec<EventEnvelope<MoveEvent>>, StoreError> {
        let state = self.read()?;
        Ok(state
            .audit
            .get(&customer_id)
            .map(|stream| stream.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    fn append(
        &self,
        customer_id: CompanyId,
        event: MoveEvent,
    ) -> Result<EventEnvelope<MoveEvent>, StoreError> {
        Ok(self.write()?.append(customer_id, event))
    }
}

impl MoveUnitOfWork for InMemoryChannelStore {
    fn move_snapshot(
        &self,
        customer_id: CompanyId,
        destination_id: CompanyId,
    ) -> Result<MoveSnapshot, StoreError> {
        let state = self.read()?;
        let customer = state.companies.get(&customer_id).cloned();
        let source = customer
            .as_ref()
            .and_then(Company::as_customer)
            .and_then(|c| state.companies.get(&c.reseller_id()).cloned());

        Ok(MoveSnapshot {
            customer,
            source,
            destination: state.companies.get(&destination_id).cloned(),
        })
    }

    fn record_move(
        &self,
        customer_id: CompanyId,
        expected_reseller: CompanyId,
        patch: CompanyPatch,
        event: MoveEvent,
    ) -> Result<(Company, EventEnvelope<MoveEvent>), StoreError> {
        // Both writes happen under one guard so no reader sees half a move.
        let mut state = self.write()?;

        let company = state
            .companies
            .get_mut(&customer_id)
            .ok_or(StoreError::NotFound(customer_id))?;

        let current = company.as_customer().map(|c| c.reseller_id());
        if current != Some(expected_reseller) {
            return Err(StoreError::Conflict(format!(
                "customer {customer_id} expected at reseller {expected_reseller}, found {current:?}"
            )));
        }

        // apply_patch validates before mutating, so a failure leaves the record untouched.
        company.apply_patch(&patch)?;
        let updated = company.clone();
        let envelope = state.append(customer_id, event);

        Ok((updated, envelope))
    }
}


/// Panic while holding the write guard so every later access sees a poisoned lock.
#[cfg(test)]
pub(crate) fn poison(store: &InMemoryChannelStore) {
    let result = std::thread::scope(|scope| {
        scope
            .spawn(|| {
                let _guard = store.state.write();
                panic!("writer died holding the lock");
            })
            .join()
    });
    assert!(result.is_err());
    assert!(store.state.is_poisoned());
}

//! Loading a company directory (and prior move history) from JSON.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use channel_core::{CompanyId, DomainError};
use channel_directory::Company;
use channel_moves::MoveEvent;

use crate::store::{InMemoryChannelStore, StoreError};

/// Directory bundled with the crate: five resellers, two customers and one
/// prior move of customer 6.
pub const DEMO_DIRECTORY: &str = include_str!("../fixtures/demo_directory.json");

/// Serialized directory snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryDocument {
    pub companies: Vec<Company>,
    /// Per customer, newest first.
    #[serde(default)]
    pub move_history: BTreeMap<CompanyId, Vec<MoveEvent>>,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("directory is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("company {0} appears more than once")]
    DuplicateCompany(CompanyId),

    #[error("move history recorded for {0}, which is not a known customer")]
    UnknownCustomer(CompanyId),

    #[error(transparent)]
    Invariant(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DirectoryDocument {
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the directory invariants every customer must satisfy.
    pub fn validate(&self) -> Result<(), SeedError> {
        let mut seen = HashSet::new();
        for company in &self.companies {
            if !seen.insert(company.id()) {
                return Err(SeedError::DuplicateCompany(company.id()));
            }
        }

        for company in &self.companies {
            if let Some(customer) = company.as_customer() {
                let reseller = self
                    .companies
                    .iter()
                    .find(|c| c.id() == customer.reseller_id());
                company.check_assignment(reseller)?;
            }
        }

        for customer_id in self.move_history.keys() {
            let known = self
                .companies
                .iter()
                .any(|c| c.id() == *customer_id && c.as_customer().is_some());
            if !known {
                return Err(SeedError::UnknownCustomer(*customer_id));
            }
        }

        Ok(())
    }

    /// Validate and load into a fresh store.
    pub fn into_store(self) -> Result<InMemoryChannelStore, SeedError> {
        self.validate()?;

        let store = InMemoryChannelStore::new();
        let company_count = self.companies.len();
        for company in self.companies {
            store.insert_company(company)?;
        }
        for (customer_id, events) in self.move_history {
            store.import_history(customer_id, events.into_iter().rev())?;
        }

        debug!(companies = company_count, "directory loaded");
        Ok(store)
    }
}

/// Parse, validate and load `json`.
pub fn load_directory(json: &str) -> Result<InMemoryChannelStore, SeedError> {
    DirectoryDocument::from_json(json)?.into_store()
}

pub fn demo_directory() -> Result<InMemoryChannelStore, SeedError> {
    load_directory(DEMO_DIRECTORY)
}

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use channel_core::{CompanyId, PriceListId};

use crate::company::{Company, CompanyKind};

/// Partial update applied to a stored company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CompanyPatch {
    /// Point a customer at a new reseller and replace its price lists.
    Reassign {
        reseller_id: CompanyId,
        price_list_ids: Vec<PriceListId>,
    },
}

/// Access to company records supplied by the external directory.
///
/// Implementations return owned snapshots; callers never hold references into
/// the store. Reads are fallible: an unknown id is `Ok(None)`, a store that
/// cannot be read is an error.
pub trait CompanyRepository: Send + Sync {
    type Error: core::fmt::Debug + core::fmt::Display;

    fn find(&self, id: CompanyId) -> Result<Option<Company>, Self::Error>;

    /// All companies, ordered by id.
    fn list(&self) -> Result<Vec<Company>, Self::Error>;

    /// Apply `patch` and return the updated record.
    fn update(&self, id: CompanyId, patch: CompanyPatch) -> Result<Company, Self::Error>;

    fn resellers(&self) -> Result<Vec<Company>, Self::Error> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|c| c.kind() == CompanyKind::Reseller)
            .collect())
    }
}

impl<R> CompanyRepository for Arc<R>
where
    R: CompanyRepository + ?Sized,
{
    type Error = R::Error;

    fn find(&self, id: CompanyId) -> Result<Option<Company>, Self::Error> {
        (**self).find(id)
    }

    fn list(&self) -> Result<Vec<Company>, Self::Error> {
        (**self).list()
    }

    fn update(&self, id: CompanyId, patch: CompanyPatch) -> Result<Company, Self::Error> {
        (**self).update(id, patch)
    }

    fn resellers(&self) -> Result<Vec<Company>, Self::Error> {
        (**self).resellers()
    }
}

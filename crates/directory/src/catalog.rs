use serde::{Deserialize, Serialize};

use channel_core::{PriceListId, ServiceId};

/// A sellable catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub sku: String,
}

impl Service {
    pub fn new(id: impl Into<ServiceId>, name: impl Into<String>, sku: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sku: sku.into(),
        }
    }
}

/// A customer's active subscription to a service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedService {
    #[serde(flatten)]
    pub service: Service,
    /// Protected prices survive a reseller move unchanged.
    #[serde(default)]
    pub price_protected: bool,
}

impl SubscribedService {
    pub fn new(service: Service, price_protected: bool) -> Self {
        Self {
            service,
            price_protected,
        }
    }

    pub fn service_id(&self) -> &ServiceId {
        &self.service.id
    }

    pub fn name(&self) -> &str {
        &self.service.name
    }

    pub fn sku(&self) -> &str {
        &self.service.sku
    }
}

/// Named bundle of services offered by one reseller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceList {
    pub id: PriceListId,
    pub name: String,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl PriceList {
    pub fn new(id: impl Into<PriceListId>, name: impl Into<String>, services: Vec<Service>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            services,
        }
    }

    pub fn covers(&self, service_id: &ServiceId) -> bool {
        self.services.iter().any(|s| &s.id == service_id)
    }
}

use serde::{Deserialize, Serialize};

use channel_core::{CompanyId, DomainError, DomainResult, PriceListId};

use crate::catalog::{PriceList, SubscribedService};
use crate::repository::CompanyPatch;

/// Company variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanyKind {
    Reseller,
    Customer,
}

impl core::fmt::Display for CompanyKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CompanyKind::Reseller => f.write_str("Reseller"),
            CompanyKind::Customer => f.write_str("Customer"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contacts {
    pub primary: Option<Contact>,
    pub technical: Option<Contact>,
    pub billing: Option<Contact>,
}

/// Attributes shared by every company variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub name: String,
    /// Short code shown next to the name (e.g. `r3sqy`).
    pub code: String,
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub contacts: Contacts,
    #[serde(default)]
    pub support_email: Option<String>,
}

impl CompanyProfile {
    pub fn named(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            ..Self::default()
        }
    }
}

/// Reseller data: the price lists it offers, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reseller {
    #[serde(default)]
    price_lists: Vec<PriceList>,
}

impl Reseller {
    pub fn price_lists(&self) -> &[PriceList] {
        &self.price_lists
    }

    pub fn price_list(&self, id: &PriceListId) -> Option<&PriceList> {
        self.price_lists.iter().find(|p| &p.id == id)
    }

    pub fn owns(&self, id: &PriceListId) -> bool {
        self.price_list(id).is_some()
    }
}

/// Customer data: owning reseller, applied price lists and subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    reseller_id: CompanyId,
    #[serde(default)]
    current_price_list_ids: Vec<PriceListId>,
    #[serde(default)]
    services: Vec<SubscribedService>,
}

impl Customer {
    pub fn reseller_id(&self) -> CompanyId {
        self.reseller_id
    }

    pub fn current_price_list_ids(&self) -> &[PriceListId] {
        &self.current_price_list_ids
    }

    pub fn services(&self) -> &[SubscribedService] {
        &self.services
    }
}

/// Variant-specific data. Fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CompanyRole {
    Reseller(Reseller),
    Customer(Customer),
}

/// A company in the two-tier hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    id: CompanyId,
    #[serde(flatten)]
    profile: CompanyProfile,
    #[serde(flatten)]
    role: CompanyRole,
}

impl Company {
    pub fn reseller(id: CompanyId, profile: CompanyProfile, price_lists: Vec<PriceList>) -> Self {
        Self {
            id,
            profile,
            role: CompanyRole::Reseller(Reseller { price_lists }),
        }
    }

    pub fn customer(
        id: CompanyId,
        profile: CompanyProfile,
        reseller_id: CompanyId,
        current_price_list_ids: Vec<PriceListId>,
        services: Vec<SubscribedService>,
    ) -> Self {
        Self {
            id,
            profile,
            role: CompanyRole::Customer(Customer {
                reseller_id,
                current_price_list_ids,
                services,
            }),
        }
    }

    pub fn id(&self) -> CompanyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn profile(&self) -> &CompanyProfile {
        &self.profile
    }

    pub fn role(&self) -> &CompanyRole {
        &self.role
    }

    pub fn kind(&self) -> CompanyKind {
        match self.role {
            CompanyRole::Reseller(_) => CompanyKind::Reseller,
            CompanyRole::Customer(_) => CompanyKind::Customer,
        }
    }

    pub fn as_reseller(&self) -> Option<&Reseller> {
        match &self.role {
            CompanyRole::Reseller(r) => Some(r),
            CompanyRole::Customer(_) => None,
        }
    }

    pub fn as_customer(&self) -> Option<&Customer> {
        match &self.role {
            CompanyRole::Customer(c) => Some(c),
            CompanyRole::Reseller(_) => None,
        }
    }

    /// Apply a patch in place.
    ///
    /// The variant never changes; patching a reseller with a customer-only
    /// patch is an invariant violation.
    pub fn apply_patch(&mut self, patch: &CompanyPatch) -> DomainResult<()> {
        match (patch, &mut self.role) {
            (
                CompanyPatch::Reassign {
                    reseller_id,
                    price_list_ids,
                },
                CompanyRole::Customer(customer),
            ) => {
                if price_list_ids.is_empty() {
                    return Err(DomainError::invariant(
                        "a reassigned customer needs at least one price list",
                    ));
                }
                customer.reseller_id = *reseller_id;
                customer.current_price_list_ids = price_list_ids.clone();
                Ok(())
            }
            (CompanyPatch::Reassign { .. }, CompanyRole::Reseller(_)) => Err(DomainError::invariant(
                format!("company {} is a reseller and cannot be reassigned", self.id),
            )),
        }
    }

    /// Check that this customer points at `reseller` and only uses price
    /// lists that reseller owns.
    pub fn check_assignment(&self, reseller: Option<&Company>) -> DomainResult<()> {
        let Some(customer) = self.as_customer() else {
            return Ok(());
        };

        let owner = reseller
            .filter(|r| r.id == customer.reseller_id)
            .and_then(|r| r.as_reseller())
            .ok_or_else(|| {
                DomainError::invariant(format!(
                    "customer {} references reseller {} which does not exist",
                    self.id, customer.reseller_id
                ))
            })?;

        if let Some(foreign) = customer
            .current_price_list_ids
            .iter()
            .find(|id| !owner.owns(id))
        {
            return Err(DomainError::invariant(format!(
                "customer {} uses price list {} not owned by reseller {}",
                self.id, foreign, customer.reseller_id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Service;

    fn m365() -> Service {
        Service::new("SVC-M365", "Microsoft 365 Business Basic", "M365-BASIC")
    }

    fn bluepeak() -> Company {
        Company::reseller(
            CompanyId::new(2),
            CompanyProfile::named("BluePeak Networks", "r3sqy"),
            vec![
                PriceList::new("PL-BP-CORE", "BluePeak Core", vec![m365()]),
                PriceList::new("PL-BP-GROWTH", "BluePeak Growth", vec![m365()]),
            ],
        )
    }

    fn acme(price_lists: Vec<PriceListId>) -> Company {
        Company::customer(
            CompanyId::new(6),
            CompanyProfile::named("Acme Corporation", "acme1"),
            CompanyId::new(2),
            price_lists,
            vec![SubscribedService::new(m365(), true)],
        )
    }

    #[test]
    fn kind_follows_variant() {
        assert_eq!(bluepeak().kind(), CompanyKind::Reseller);
        assert_eq!(acme(vec![]).kind(), CompanyKind::Customer);
        assert!(bluepeak().as_customer().is_none());
    }

    #[test]
    fn reseller_keeps_price_list_insertion_order() {
        let reseller = bluepeak();
        let names: Vec<&str> = reseller
            .as_reseller()
            .unwrap()
            .price_lists()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["BluePeak Core", "BluePeak Growth"]);
    }

    #[test]
    fn reassign_patch_updates_customer() {
        let mut customer = acme(vec![PriceListId::from("PL-BP-CORE")]);
        customer
            .apply_patch(&CompanyPatch::Reassign {
                reseller_id: CompanyId::new(3),
                price_list_ids: vec![PriceListId::from("PL-CP-ONE")],
            })
            .unwrap();

        let data = customer.as_customer().unwrap();
        assert_eq!(data.reseller_id(), CompanyId::new(3));
        assert_eq!(data.current_price_list_ids(), &[PriceListId::from("PL-CP-ONE")]);
    }

    #[test]
    fn reassign_patch_rejects_resellers_and_empty_lists() {
        let mut reseller = bluepeak();
        let err = reseller
            .apply_patch(&CompanyPatch::Reassign {
                reseller_id: CompanyId::new(3),
                price_list_ids: vec![PriceListId::from("PL-CP-ONE")],
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(reseller, bluepeak());

        let mut customer = acme(vec![PriceListId::from("PL-BP-CORE")]);
        let before = customer.clone();
        let err = customer
            .apply_patch(&CompanyPatch::Reassign {
                reseller_id: CompanyId::new(3),
                price_list_ids: vec![],
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(customer, before);
    }

    #[test]
    fn check_assignment_detects_foreign_price_lists() {
        let reseller = bluepeak();
        assert!(acme(vec![PriceListId::from("PL-BP-CORE")])
            .check_assignment(Some(&reseller))
            .is_ok());

        let err = acme(vec![PriceListId::from("PL-CP-ONE")])
            .check_assignment(Some(&reseller))
            .unwrap_err();
        match err {
            DomainError::InvariantViolation(msg) => assert!(msg.contains("PL-CP-ONE")),
            _ => panic!("Expected InvariantViolation for foreign price list"),
        }

        assert!(acme(vec![]).check_assignment(None).is_err());
    }

    #[test]
    fn deserializes_tagged_directory_records() {
        let json = r#"{
            "id": 6,
            "type": "Customer",
            "name": "Acme Corporation",
            "code": "acme1",
            "resellerId": 2,
            "currentPriceListIds": ["PL-BP-CORE"],
            "services": [
                {"id": "SVC-M365", "name": "Microsoft 365 Business Basic", "sku": "M365-BASIC", "priceProtected": true}
            ]
        }"#;

        let company: Company = serde_json::from_str(json).unwrap();
        assert_eq!(company.kind(), CompanyKind::Customer);
        assert_eq!(company.name(), "Acme Corporation");
        let customer = company.as_customer().unwrap();
        assert_eq!(customer.reseller_id(), CompanyId::new(2));
        assert!(customer.services()[0].price_protected);
    }
}

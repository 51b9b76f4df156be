//! Company directory domain (resellers, customers, price lists).
//!
//! Plain records plus the invariants that tie customers to their reseller.
//! Storage lives behind [`CompanyRepository`]; this crate does no IO.

pub mod catalog;
pub mod company;
pub mod repository;

pub use catalog::{PriceList, Service, SubscribedService};
pub use company::{
    Address, Company, CompanyKind, CompanyProfile, CompanyRole, Contact, Contacts, Customer,
    Reseller,
};
pub use repository::{CompanyPatch, CompanyRepository};

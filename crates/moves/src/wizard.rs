//! Move-customer wizard.
//!
//! A three-step state machine: **Context** → **Destination** → **Confirm**.
//!
//! ```text
//! (step, event)              guard                      next
//! (Context,     Advance)     always                     Destination
//! (Destination, Advance)     destination ready          Confirm
//! (Destination, Back)        -                          Context
//! (Confirm,     Back)        -                          Destination
//! (any,         Reset)       -                          Context
//! anything else              -                          unchanged
//! ```
//!
//! "Destination ready" means a reseller is selected, at least one price list
//! is in effect and the coverage check finds no uncovered service. The check
//! is recomputed on every reseller or price-list change.
//!
//! The wizard never touches directory records. It snapshots what it needs on
//! open and hands a [`MoveRequest`] to a [`MoveCommitter`] on confirm.

use serde::Serialize;

use channel_core::{CompanyId, DomainError, DomainResult, PriceListId};
use channel_directory::{Company, CompanyRepository, PriceList, SubscribedService};

use crate::coverage::CoverageReport;
use crate::error::MoveError;
use crate::event::{EffectiveDate, MoveReceipt, MoveRequest};

/// Billing impact shown on the Confirm step.
pub const BILLING_IMPACT: [&str; 4] = [
    "Billing items will be closed for old reseller and created for new reseller.",
    "Services under price protection will retain their price.",
    "Non-protected services may change price according to the destination price list at the time of move.",
    "Move does not retroactively re-rate completed billing periods.",
];

pub const ACKNOWLEDGEMENT_LABEL: &str =
    "I understand this may affect pricing and billing for this customer.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Context,
    Destination,
    Confirm,
}

impl WizardStep {
    /// 1-based position for "Step n of 3" labels.
    pub fn position(&self) -> usize {
        match self {
            WizardStep::Context => 1,
            WizardStep::Destination => 2,
            WizardStep::Confirm => 3,
        }
    }

    pub const COUNT: usize = 3;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardEvent {
    Advance,
    Back,
    Reset,
}

/// Pure transition function.
///
/// `guard` is whether the current step's precondition holds; it only matters
/// for `Advance` out of Destination.
pub fn transition(step: WizardStep, event: WizardEvent, guard: bool) -> WizardStep {
    match (step, event) {
        (_, WizardEvent::Reset) => WizardStep::Context,
        (WizardStep::Context, WizardEvent::Advance) => WizardStep::Destination,
        (WizardStep::Destination, WizardEvent::Advance) if guard => WizardStep::Confirm,
        (WizardStep::Destination, WizardEvent::Back) => WizardStep::Context,
        (WizardStep::Confirm, WizardEvent::Back) => WizardStep::Destination,
        (current, _) => current,
    }
}

/// Something that can commit a move (the transaction service, or a fake).
pub trait MoveCommitter {
    fn commit(&self, request: &MoveRequest) -> Result<MoveReceipt, MoveError>;
}

impl<C: MoveCommitter + ?Sized> MoveCommitter for &C {
    fn commit(&self, request: &MoveRequest) -> Result<MoveReceipt, MoveError> {
        (**self).commit(request)
    }
}

/// Result of pressing the commit action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Not on Confirm, not acknowledged, or nothing to commit. Nothing happened.
    Blocked,
    Moved(MoveReceipt),
    /// The committer refused; the wizard kept its state and shows the error.
    Failed(MoveError),
}

/// Context step contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSummary {
    pub customer_id: CompanyId,
    pub customer_name: String,
    pub reseller_id: CompanyId,
    pub reseller_name: Option<String>,
    pub price_list_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change<T> {
    pub from: T,
    pub to: T,
}

/// Before/after summary shown on the Confirm step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSummary {
    pub reseller: Change<String>,
    pub price_lists: Change<Vec<String>>,
    pub effective_date: EffectiveDate,
}

/// One open move workflow for a single customer.
#[derive(Debug, Clone)]
pub struct MoveWizard {
    customer: Company,
    current_reseller: Option<Company>,
    candidates: Vec<Company>,
    step: WizardStep,
    selected_reseller: Option<CompanyId>,
    selected_price_list: Option<PriceListId>,
    coverage: CoverageReport,
    acknowledged: bool,
    error: Option<String>,
}

impl MoveWizard {
    /// Start a workflow for `customer`.
    ///
    /// `resellers` is the reseller catalog; the customer's current reseller is
    /// taken out of it and never offered as a destination.
    pub fn new(
        customer: Company,
        current_reseller: Option<Company>,
        resellers: Vec<Company>,
    ) -> DomainResult<Self> {
        let Some(data) = customer.as_customer() else {
            return Err(DomainError::validation(format!(
                "company {} is not an end customer",
                customer.id()
            )));
        };
        let current_id = data.reseller_id();

        let candidates = resellers
            .into_iter()
            .filter(|r| r.as_reseller().is_some() && r.id() != current_id)
            .collect();

        Ok(Self {
            customer,
            current_reseller: current_reseller.filter(|r| r.as_reseller().is_some()),
            candidates,
            step: WizardStep::Context,
            selected_reseller: None,
            selected_price_list: None,
            coverage: CoverageReport::default(),
            acknowledged: false,
            error: None,
        })
    }

    /// Load everything the wizard needs for `customer_id` from `repo`.
    ///
    /// Store failures surface as the repository's own error; an unknown or
    /// non-customer id becomes a [`DomainError`] converted into it.
    pub fn open<R>(repo: &R, customer_id: CompanyId) -> Result<Self, R::Error>
    where
        R: CompanyRepository + ?Sized,
        R::Error: From<DomainError>,
    {
        let customer = repo
            .find(customer_id)?
            .ok_or_else(|| DomainError::not_found(format!("company {customer_id}")))?;
        let current = match customer.as_customer() {
            Some(c) => repo.find(c.reseller_id())?,
            None => None,
        };
        Ok(Self::new(customer, current, repo.resellers()?)?)
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn customer(&self) -> &Company {
        &self.customer
    }

    fn customer_services(&self) -> &[SubscribedService] {
        self.customer
            .as_customer()
            .map(|c| c.services())
            .unwrap_or_default()
    }

    fn current_reseller_id(&self) -> CompanyId {
        self.customer
            .as_customer()
            .map(|c| c.reseller_id())
            .unwrap_or_else(|| self.customer.id())
    }

    fn current_price_list_names(&self) -> Vec<String> {
        let owner = self.current_reseller.as_ref().and_then(|r| r.as_reseller());
        self.customer
            .as_customer()
            .map(|c| c.current_price_list_ids())
            .unwrap_or_default()
            .iter()
            .map(|id| {
                owner
                    .and_then(|r| r.price_list(id))
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| id.to_string())
            })
            .collect()
    }

    pub fn context(&self) -> ContextSummary {
        ContextSummary {
            customer_id: self.customer.id(),
            customer_name: self.customer.name().to_string(),
            reseller_id: self.current_reseller_id(),
            reseller_name: self.current_reseller.as_ref().map(|r| r.name().to_string()),
            price_list_names: self.current_price_list_names(),
        }
    }

    // --- Destination ------------------------------------------------------

    /// Resellers the customer may move to.
    pub fn candidates(&self) -> &[Company] {
        &self.candidates
    }

    pub fn selected_reseller(&self) -> Option<&Company> {
        let id = self.selected_reseller?;
        self.candidates.iter().find(|c| c.id() == id)
    }

    fn ensure_on_destination(&self) -> DomainResult<()> {
        if self.step != WizardStep::Destination {
            return Err(DomainError::validation(
                "destination can only be changed on the destination step",
            ));
        }
        Ok(())
    }

    /// Choose the destination reseller. Clears any chosen price list.
    pub fn select_reseller(&mut self, reseller_id: CompanyId) -> DomainResult<()> {
        self.ensure_on_destination()?;
        if !self.candidates.iter().any(|c| c.id() == reseller_id) {
            return Err(DomainError::validation(format!(
                "reseller {reseller_id} is not a valid destination"
            )));
        }

        self.selected_reseller = Some(reseller_id);
        self.selected_price_list = None;
        self.recompute_coverage();
        tracing::debug!(customer_id = %self.customer.id(), %reseller_id, "destination reseller selected");
        Ok(())
    }

    /// Drop the destination reseller (and its price list).
    pub fn clear_reseller(&mut self) -> DomainResult<()> {
        self.ensure_on_destination()?;
        self.selected_reseller = None;
        self.selected_price_list = None;
        self.recompute_coverage();
        Ok(())
    }

    /// Price lists offered by the selected destination, in reseller order.
    pub fn destination_price_lists(&self) -> &[PriceList] {
        self.selected_reseller()
            .and_then(|r| r.as_reseller())
            .map(|r| r.price_lists())
            .unwrap_or_default()
    }

    /// The selector is only shown when there is a real choice.
    pub fn price_list_selector_visible(&self) -> bool {
        self.destination_price_lists().len() > 1
    }

    /// Choose the destination price list (single-valued).
    pub fn select_price_list(&mut self, price_list_id: PriceListId) -> DomainResult<()> {
        self.ensure_on_destination()?;
        let Some(reseller) = self.selected_reseller() else {
            return Err(DomainError::validation("select a destination reseller first"));
        };
        if !reseller.as_reseller().is_some_and(|r| r.owns(&price_list_id)) {
            return Err(DomainError::validation(format!(
                "price list {price_list_id} is not offered by reseller {}",
                reseller.id()
            )));
        }

        self.selected_price_list = Some(price_list_id);
        self.recompute_coverage();
        Ok(())
    }

    /// Price lists that would be applied: the only one the destination has,
    /// or the user's choice.
    pub fn effective_price_list_ids(&self) -> Vec<PriceListId> {
        match self.destination_price_lists() {
            [only] => vec![only.id.clone()],
            _ => self.selected_price_list.iter().cloned().collect(),
        }
    }

    pub fn selected_price_lists(&self) -> Vec<&PriceList> {
        let ids = self.effective_price_list_ids();
        self.destination_price_lists()
            .iter()
            .filter(|p| ids.contains(&p.id))
            .collect()
    }

    fn recompute_coverage(&mut self) {
        let report = CoverageReport::evaluate(self.customer_services(), &self.selected_price_lists());
        if report.has_conflict() {
            tracing::debug!(
                customer_id = %self.customer.id(),
                missing = report.missing().len(),
                "destination does not cover all services"
            );
        }
        self.coverage = report;
    }

    pub fn coverage(&self) -> &CoverageReport {
        &self.coverage
    }

    /// Uncovered services for the current selection (empty until a price
    /// list is in effect).
    pub fn missing_services(&self) -> &[SubscribedService] {
        if self.effective_price_list_ids().is_empty() {
            return &[];
        }
        self.coverage.missing()
    }

    pub fn has_coverage_conflict(&self) -> bool {
        self.coverage.has_conflict()
    }

    fn destination_ready(&self) -> bool {
        self.selected_reseller.is_some()
            && !self.effective_price_list_ids().is_empty()
            && !self.has_coverage_conflict()
    }

    // --- Confirm ----------------------------------------------------------

    pub fn billing_disclosure(&self) -> &'static [&'static str] {
        &BILLING_IMPACT
    }

    pub fn summary(&self) -> Option<MoveSummary> {
        let destination = self.selected_reseller()?;
        Some(MoveSummary {
            reseller: Change {
                from: self
                    .current_reseller
                    .as_ref()
                    .map(|r| r.name().to_string())
                    .unwrap_or_else(|| "-".to_string()),
                to: destination.name().to_string(),
            },
            price_lists: Change {
                from: self.current_price_list_names(),
                to: self
                    .selected_price_lists()
                    .iter()
                    .map(|p| p.name.clone())
                    .collect(),
            },
            effective_date: EffectiveDate::Immediate,
        })
    }

    pub fn acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// Toggle the billing acknowledgement. Ignored outside Confirm.
    pub fn set_acknowledged(&mut self, acknowledged: bool) {
        if self.step == WizardStep::Confirm {
            self.acknowledged = acknowledged;
        }
    }

    pub fn commit_payload(&self) -> Option<MoveRequest> {
        let destination = self.selected_reseller?;
        let ids = self.effective_price_list_ids();
        if ids.is_empty() {
            return None;
        }
        Some(MoveRequest {
            customer_id: self.customer.id(),
            destination_reseller_id: destination,
            destination_price_list_ids: ids,
        })
    }

    pub fn can_commit(&self) -> bool {
        self.step == WizardStep::Confirm && self.acknowledged && self.commit_payload().is_some()
    }

    /// Commit through `committer`.
    ///
    /// On success the wizard resets; the caller reopens it from fresh records
    /// for any further move. On failure every selection stays and the error is
    /// kept for inline display (technical failures masked).
    pub fn confirm<C: MoveCommitter + ?Sized>(&mut self, committer: &C) -> ConfirmOutcome {
        if !self.can_commit() {
            return ConfirmOutcome::Blocked;
        }
        let Some(request) = self.commit_payload() else {
            return ConfirmOutcome::Blocked;
        };

        match committer.commit(&request) {
            Ok(receipt) => {
                self.reset();
                ConfirmOutcome::Moved(receipt)
            }
            Err(err) => {
                tracing::debug!(customer_id = %request.customer_id, kind = %err.kind(), "move refused");
                self.error = Some(err.display_message());
                ConfirmOutcome::Failed(err)
            }
        }
    }

    // --- Errors and navigation -------------------------------------------

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Show an externally supplied message inline.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    fn guard(&self) -> bool {
        match self.step {
            WizardStep::Context => true,
            WizardStep::Destination => self.destination_ready(),
            WizardStep::Confirm => false,
        }
    }

    /// Whether `advance` would move forward (drives the continue action).
    pub fn can_advance(&self) -> bool {
        transition(self.step, WizardEvent::Advance, self.guard()) != self.step
    }

    fn fire(&mut self, event: WizardEvent) {
        let from = self.step;
        self.step = transition(from, event, self.guard());
        if from != self.step {
            tracing::debug!(customer_id = %self.customer.id(), ?from, to = ?self.step, "wizard step changed");
        }
    }

    /// Move forward if the current step allows it. Clears any pending error.
    pub fn advance(&mut self) {
        self.error = None;
        self.fire(WizardEvent::Advance);
    }

    /// Move one step back. Leaving Confirm drops the acknowledgement.
    pub fn back(&mut self) {
        self.fire(WizardEvent::Back);
        if self.step != WizardStep::Confirm {
            self.acknowledged = false;
        }
    }

    /// Return to Context with nothing selected.
    pub fn reset(&mut self) {
        self.fire(WizardEvent::Reset);
        self.selected_reseller = None;
        self.selected_price_list = None;
        self.coverage = CoverageReport::default();
        self.acknowledged = false;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use channel_directory::{CompanyProfile, Service};
    use proptest::prelude::*;

    fn m365() -> Service {
        Service::new("SVC-M365", "Microsoft 365 Business Basic", "M365-BASIC")
    }

    fn backup() -> Service {
        Service::new("SVC-BACKUP", "Cloud Backup", "CLD-BKP")
    }

    fn emailsec() -> Service {
        Service::new("SVC-EMAILSEC", "Email Security", "EML-SEC")
    }

    fn bluehex() -> Company {
        Company::reseller(
            CompanyId::new(1),
            CompanyProfile::named("BlueHex IT", "hpkya"),
            vec![PriceList::new("PL-BH-STD", "BlueHex Standard", vec![m365(), backup(), emailsec()])],
        )
    }

    fn bluepeak() -> Company {
        Company::reseller(
            CompanyId::new(2),
            CompanyProfile::named("BluePeak Networks", "r3sqy"),
            vec![
                PriceList::new("PL-BP-CORE", "BluePeak Core", vec![m365(), backup(), emailsec()]),
                PriceList::new("PL-BP-GROWTH", "BluePeak Growth", vec![m365()]),
            ],
        )
    }

    fn corefusion() -> Company {
        Company::reseller(
            CompanyId::new(4),
            CompanyProfile::named("CoreFusion Tech", "crvbm"),
            vec![
                PriceList::new("PL-CF-PRO", "CoreFusion Pro", vec![m365()]),
                PriceList::new("PL-CF-SECURE", "CoreFusion Secure", vec![m365()]),
            ],
        )
    }

    fn acme() -> Company {
        Company::customer(
            CompanyId::new(6),
            CompanyProfile::named("Acme Corporation", "acme1"),
            CompanyId::new(2),
            vec![PriceListId::from("PL-BP-CORE")],
            vec![
                SubscribedService::new(m365(), true),
                SubscribedService::new(backup(), false),
                SubscribedService::new(emailsec(), false),
            ],
        )
    }

    fn wizard() -> MoveWizard {
        MoveWizard::new(acme(), Some(bluepeak()), vec![bluehex(), bluepeak(), corefusion()]).unwrap()
    }

    /// Committer that records requests and answers with a canned result.
    struct FakeCommitter {
        result: Result<MoveReceipt, MoveError>,
        calls: RefCell<Vec<MoveRequest>>,
    }

    impl FakeCommitter {
        fn answering(result: Result<MoveReceipt, MoveError>) -> Self {
            Self {
                result,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl MoveCommitter for FakeCommitter {
        fn commit(&self, request: &MoveRequest) -> Result<MoveReceipt, MoveError> {
            self.calls.borrow_mut().push(request.clone());
            self.result.clone()
        }
    }

    fn receipt() -> MoveReceipt {
        MoveReceipt {
            move_event: crate::event::MoveEvent {
                occurred_at: chrono::Utc::now(),
                before_reseller_name: "BluePeak Networks".to_string(),
                after_reseller_name: "BlueHex IT".to_string(),
                before_price_list_names: vec!["BluePeak Core".to_string()],
                after_price_list_names: vec!["BlueHex Standard".to_string()],
                effective_date: EffectiveDate::Immediate,
            },
            message: "Customer successfully moved from BluePeak Networks to BlueHex IT.".to_string(),
        }
    }

    fn at_confirm_for_bluehex() -> MoveWizard {
        let mut w = wizard();
        w.advance();
        w.select_reseller(CompanyId::new(1)).unwrap();
        w.advance();
        assert_eq!(w.step(), WizardStep::Confirm);
        w
    }

    #[test]
    fn transition_table() {
        use WizardEvent::*;
        use WizardStep::*;

        assert_eq!(transition(Context, Advance, false), Destination);
        assert_eq!(transition(Destination, Advance, false), Destination);
        assert_eq!(transition(Destination, Advance, true), Confirm);
        assert_eq!(transition(Confirm, Advance, true), Confirm);
        assert_eq!(transition(Context, Back, true), Context);
        assert_eq!(transition(Destination, Back, false), Context);
        assert_eq!(transition(Confirm, Back, false), Destination);
        assert_eq!(transition(Confirm, Reset, false), Context);
    }

    #[test]
    fn opens_on_context_with_current_assignment() {
        let w = wizard();
        assert_eq!(w.step(), WizardStep::Context);
        assert!(w.can_advance());

        let ctx = w.context();
        assert_eq!(ctx.customer_name, "Acme Corporation");
        assert_eq!(ctx.reseller_name.as_deref(), Some("BluePeak Networks"));
        assert_eq!(ctx.price_list_names, vec!["BluePeak Core".to_string()]);
    }

    #[test]
    fn current_reseller_is_not_a_candidate() {
        let w = wizard();
        let ids: Vec<CompanyId> = w.candidates().iter().map(Company::id).collect();
        assert_eq!(ids, vec![CompanyId::new(1), CompanyId::new(4)]);
    }

    #[test]
    fn rejects_opening_for_a_reseller() {
        let err = MoveWizard::new(bluehex(), None, vec![bluepeak()]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn single_price_list_is_auto_selected_and_selector_hidden() {
        let mut w = wizard();
        w.advance();
        w.select_reseller(CompanyId::new(1)).unwrap();

        assert!(!w.price_list_selector_visible());
        assert_eq!(w.effective_price_list_ids(), vec![PriceListId::from("PL-BH-STD")]);
        assert!(!w.has_coverage_conflict());
        assert!(w.can_advance());
    }

    #[test]
    fn multiple_price_lists_require_a_choice() {
        let mut w = wizard();
        w.advance();
        w.select_reseller(CompanyId::new(4)).unwrap();

        assert!(w.price_list_selector_visible());
        assert!(w.effective_price_list_ids().is_empty());
        assert!(w.missing_services().is_empty());
        assert!(!w.can_advance());

        w.advance();
        assert_eq!(w.step(), WizardStep::Destination);
    }

    #[test]
    fn uncovered_services_block_advancing() {
        let mut w = wizard();
        w.advance();
        w.select_reseller(CompanyId::new(4)).unwrap();
        w.select_price_list(PriceListId::from("PL-CF-PRO")).unwrap();

        assert!(w.has_coverage_conflict());
        let missing: Vec<&str> = w.missing_services().iter().map(|s| s.service_id().as_str()).collect();
        assert_eq!(missing, vec!["SVC-BACKUP", "SVC-EMAILSEC"]);

        w.advance();
        assert_eq!(w.step(), WizardStep::Destination);
        assert!(w.commit_payload().is_some());
    }

    #[test]
    fn changing_reseller_clears_price_list_and_conflict() {
        let mut w = wizard();
        w.advance();
        w.select_reseller(CompanyId::new(4)).unwrap();
        w.select_price_list(PriceListId::from("PL-CF-PRO")).unwrap();
        assert!(w.has_coverage_conflict());

        w.select_reseller(CompanyId::new(1)).unwrap();
        assert!(!w.has_coverage_conflict());
        assert_eq!(w.effective_price_list_ids(), vec![PriceListId::from("PL-BH-STD")]);
    }

    #[test]
    fn foreign_selections_are_rejected_without_state_change() {
        let mut w = wizard();
        w.advance();

        assert!(w.select_reseller(CompanyId::new(2)).is_err());
        assert!(w.select_price_list(PriceListId::from("PL-BH-STD")).is_err());

        w.select_reseller(CompanyId::new(4)).unwrap();
        assert!(w.select_price_list(PriceListId::from("PL-BH-STD")).is_err());
        assert!(w.effective_price_list_ids().is_empty());
    }

    #[test]
    fn selections_are_locked_outside_destination() {
        let mut w = wizard();
        assert!(w.select_reseller(CompanyId::new(1)).is_err());

        let mut w = at_confirm_for_bluehex();
        assert!(w.select_reseller(CompanyId::new(4)).is_err());
        assert_eq!(w.selected_reseller().map(Company::id), Some(CompanyId::new(1)));
    }

    #[test]
    fn confirm_requires_acknowledgement() {
        let mut w = at_confirm_for_bluehex();
        let committer = FakeCommitter::answering(Ok(receipt()));

        assert!(!w.can_commit());
        assert_eq!(w.confirm(&committer), ConfirmOutcome::Blocked);
        assert!(committer.calls.borrow().is_empty());

        w.set_acknowledged(true);
        assert!(w.can_commit());
    }

    #[test]
    fn summary_shows_before_and_after() {
        let w = at_confirm_for_bluehex();
        let summary = w.summary().unwrap();

        assert_eq!(summary.reseller.from, "BluePeak Networks");
        assert_eq!(summary.reseller.to, "BlueHex IT");
        assert_eq!(summary.price_lists.from, vec!["BluePeak Core".to_string()]);
        assert_eq!(summary.price_lists.to, vec!["BlueHex Standard".to_string()]);
        assert_eq!(summary.effective_date.label(), "Immediate");
        assert_eq!(w.billing_disclosure().len(), 4);
    }

    #[test]
    fn successful_confirm_sends_payload_and_resets() {
        let mut w = at_confirm_for_bluehex();
        w.set_acknowledged(true);
        let committer = FakeCommitter::answering(Ok(receipt()));

        match w.confirm(&committer) {
            ConfirmOutcome::Moved(r) => {
                assert_eq!(r.message, "Customer successfully moved from BluePeak Networks to BlueHex IT.")
            }
            other => panic!("Expected Moved outcome, got {other:?}"),
        }

        let calls = committer.calls.borrow();
        assert_eq!(
            calls.as_slice(),
            &[MoveRequest {
                customer_id: CompanyId::new(6),
                destination_reseller_id: CompanyId::new(1),
                destination_price_list_ids: vec![PriceListId::from("PL-BH-STD")],
            }]
        );
        assert_eq!(w.step(), WizardStep::Context);
        assert!(w.selected_reseller().is_none());
    }

    #[test]
    fn failed_confirm_keeps_selections_and_shows_error() {
        let mut w = at_confirm_for_bluehex();
        w.set_acknowledged(true);
        let committer = FakeCommitter::answering(Err(MoveError::AlreadyAssigned));

        match w.confirm(&committer) {
            ConfirmOutcome::Failed(MoveError::AlreadyAssigned) => {}
            other => panic!("Expected AlreadyAssigned failure, got {other:?}"),
        }
        assert_eq!(w.step(), WizardStep::Confirm);
        assert!(w.acknowledged());
        assert_eq!(w.error(), Some("Customer is already assigned to this reseller."));
        assert_eq!(w.selected_reseller().map(Company::id), Some(CompanyId::new(1)));
    }

    #[test]
    fn technical_failure_is_masked_inline() {
        let mut w = at_confirm_for_bluehex();
        w.set_acknowledged(true);
        let committer = FakeCommitter::answering(Err(MoveError::SimulatedTechnicalFailure {
            reseller_id: CompanyId::new(1),
            price_list_id: PriceListId::from("PL-BH-STD"),
        }));

        w.confirm(&committer);
        assert_eq!(w.error(), Some(crate::error::SUPPORT_MESSAGE));
    }

    #[test]
    fn back_from_confirm_keeps_selection_but_drops_acknowledgement() {
        let mut w = at_confirm_for_bluehex();
        w.set_acknowledged(true);
        w.back();

        assert_eq!(w.step(), WizardStep::Destination);
        assert!(!w.acknowledged());
        assert_eq!(w.effective_price_list_ids(), vec![PriceListId::from("PL-BH-STD")]);

        w.back();
        w.back();
        assert_eq!(w.step(), WizardStep::Context);
    }

    #[test]
    fn advance_and_reset_clear_pending_error() {
        let mut w = wizard();
        w.set_error("Destination reseller is invalid.");
        w.advance();
        assert!(w.error().is_none());

        w.set_error("again");
        w.reset();
        assert!(w.error().is_none());
    }

    #[test]
    fn reset_mid_flow_starts_over() {
        let mut w = wizard();
        w.advance();
        w.select_reseller(CompanyId::new(4)).unwrap();
        w.select_price_list(PriceListId::from("PL-CF-SECURE")).unwrap();

        w.reset();
        assert_eq!(w.step(), WizardStep::Context);
        assert!(w.selected_reseller().is_none());
        assert!(w.effective_price_list_ids().is_empty());
        assert!(!w.has_coverage_conflict());
        assert!(w.commit_payload().is_none());

        w.advance();
        assert_eq!(w.step(), WizardStep::Destination);
        assert!(w.destination_price_lists().is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        SelectReseller(usize),
        SelectPriceList(usize),
        ClearReseller,
        Advance,
        Back,
        Reset,
        Acknowledge,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..4).prop_map(Op::SelectReseller),
            (0usize..3).prop_map(Op::SelectPriceList),
            Just(Op::ClearReseller),
            Just(Op::Advance),
            Just(Op::Back),
            Just(Op::Reset),
            Just(Op::Acknowledge),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: no sequence of user actions reaches Confirm while the
        /// chosen destination leaves a service uncovered.
        #[test]
        fn never_confirms_a_conflicting_destination(ops in prop::collection::vec(op(), 0..40)) {
            let reseller_ids = [1u64, 2, 4, 99];
            let price_list_ids = ["PL-CF-PRO", "PL-CF-SECURE", "PL-BH-STD"];
            let mut w = wizard();

            for op in ops {
                match op {
                    Op::SelectReseller(i) => { let _ = w.select_reseller(CompanyId::new(reseller_ids[i])); }
                    Op::SelectPriceList(i) => { let _ = w.select_price_list(PriceListId::from(price_list_ids[i])); }
                    Op::ClearReseller => { let _ = w.clear_reseller(); }
                    Op::Advance => w.advance(),
                    Op::Back => w.back(),
                    Op::Reset => w.reset(),
                    Op::Acknowledge => w.set_acknowledged(true),
                }

                if w.step() == WizardStep::Confirm {
                    prop_assert!(!w.has_coverage_conflict());
                    prop_assert!(w.commit_payload().is_some());
                    let fresh = CoverageReport::evaluate(
                        w.customer().as_customer().unwrap().services(),
                        &w.selected_price_lists(),
                    );
                    prop_assert!(fresh.missing().is_empty());
                }
            }
        }
    }
}

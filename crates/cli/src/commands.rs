//! Subcommand implementations. Each returns the JSON document to print.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use serde_json::{json, Value};

use channel_auth::PermissionSet;
use channel_core::{CompanyId, PriceListId};
use channel_directory::{CompanyKind, CompanyRepository};
use channel_infra::{
    demo_directory, load_directory, InMemoryChannelStore, MoveServiceConfig, MoveTransactionService,
};
use channel_moves::{
    audit_log, move_action_access, ConfirmOutcome, MoveFailure, MoveNotification, MoveWizard,
    WizardStep,
};

use crate::config::{Cli, Command};

/// Printed document plus whether the command achieved what was asked.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub document: Value,
    pub success: bool,
}

impl Output {
    fn ok(document: Value) -> Self {
        Self { document, success: true }
    }

    fn refused(document: Value) -> Self {
        Self { document, success: false }
    }
}

pub fn open_store(directory: Option<&Path>) -> anyhow::Result<InMemoryChannelStore> {
    match directory {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading directory {}", path.display()))?;
            load_directory(&json).with_context(|| format!("loading directory {}", path.display()))
        }
        None => demo_directory().context("loading bundled demo directory"),
    }
}

pub fn run(cli: &Cli) -> anyhow::Result<Output> {
    let store = Arc::new(open_store(cli.directory.as_deref())?);
    let permissions = cli.permissions();

    match &cli.command {
        Command::Companies => Ok(Output::ok(companies(store.as_ref(), &permissions)?)),
        Command::History { customer, search } => history(
            store.as_ref(),
            CompanyId::new(*customer),
            search.as_deref().unwrap_or(""),
        )
        .map(Output::ok),
        Command::Move {
            customer,
            to,
            price_list,
            acknowledge,
        } => move_customer(
            store,
            cli.service_config(),
            &permissions,
            MoveArgs {
                customer: CompanyId::new(*customer),
                to: CompanyId::new(*to),
                price_list: price_list.as_deref().map(PriceListId::from),
                acknowledge: *acknowledge,
            },
        ),
    }
}

pub fn companies<R: CompanyRepository + ?Sized>(
    repo: &R,
    permissions: &PermissionSet,
) -> Result<Value, R::Error> {
    let rows: Vec<Value> = repo
        .list()?
        .iter()
        .map(|company| {
            let reseller_id = company.as_customer().map(|c| c.reseller_id());
            json!({
                "id": company.id(),
                "name": company.name(),
                "code": company.profile().code,
                "type": company.kind(),
                "resellerId": reseller_id,
                "moveAction": move_action_access(company, permissions),
            })
        })
        .collect();
    Ok(Value::Array(rows))
}

pub fn history(store: &InMemoryChannelStore, customer_id: CompanyId, search: &str) -> anyhow::Result<Value> {
    let Some(customer) = store.find(customer_id)? else {
        bail!("company {customer_id} not found");
    };
    if customer.kind() != CompanyKind::Customer {
        bail!("company {customer_id} is a reseller and has no move history");
    }

    let rows: Vec<Value> = audit_log(store, customer_id, search)?
        .iter()
        .map(|entry| {
            json!({
                "date": entry.date_label(),
                "time": entry.time_label(),
                "timezone": entry.timezone,
                "status": entry.status,
                "event": entry.event,
                "operation": entry.operation(),
                "users": entry.users,
            })
        })
        .collect();

    Ok(json!({
        "customerId": customer_id,
        "customerName": customer.name(),
        "entries": rows,
    }))
}

#[derive(Debug, Clone)]
pub struct MoveArgs {
    pub customer: CompanyId,
    pub to: CompanyId,
    pub price_list: Option<PriceListId>,
    pub acknowledge: bool,
}

/// Drive the wizard end to end: Context, Destination, Confirm, commit.
pub fn move_customer(
    store: Arc<InMemoryChannelStore>,
    config: MoveServiceConfig,
    permissions: &PermissionSet,
    args: MoveArgs,
) -> anyhow::Result<Output> {
    let customer = store
        .find(args.customer)?
        .with_context(|| format!("company {} not found", args.customer))?;

    let access = move_action_access(&customer, permissions);
    if !access.is_enabled() {
        return Ok(Output::refused(json!({
            "status": "not_permitted",
            "moveAction": access,
        })));
    }

    let mut wizard = MoveWizard::open(store.as_ref(), args.customer)?;
    wizard.advance();
    wizard.select_reseller(args.to)?;
    if let Some(price_list) = args.price_list {
        wizard.select_price_list(price_list)?;
    }

    if wizard.has_coverage_conflict() {
        let missing: Vec<&str> = wizard.missing_services().iter().map(|s| s.name()).collect();
        return Ok(Output::refused(json!({
            "status": "coverage_conflict",
            "missingServices": missing,
        })));
    }

    wizard.advance();
    if wizard.step() != WizardStep::Confirm {
        return Ok(Output::refused(json!({
            "status": "incomplete",
            "message": "Select a destination price list to continue.",
            "priceLists": wizard.destination_price_lists(),
        })));
    }

    let summary = wizard.summary();
    wizard.set_acknowledged(args.acknowledge);

    let service = MoveTransactionService::new(store, config);
    match wizard.confirm(&service) {
        ConfirmOutcome::Moved(receipt) => Ok(Output::ok(json!({
            "status": "moved",
            "summary": summary,
            "notification": MoveNotification::from(&receipt),
            "receipt": receipt,
        }))),
        ConfirmOutcome::Failed(err) => Ok(Output::refused(json!({
            "status": "failed",
            "error": MoveFailure::from(&err),
        }))),
        ConfirmOutcome::Blocked => Ok(Output::refused(json!({
            "status": "acknowledgement_required",
            "billingImpact": wizard.billing_disclosure(),
            "summary": summary,
        }))),
    }
}

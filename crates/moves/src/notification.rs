//! What the presentation layer shows around a move: the action itself and
//! the notification after it succeeds.

use serde::Serialize;

use channel_auth::{ActionAccess, Permission, PermissionSet};
use channel_directory::{Company, CompanyKind};

use crate::event::MoveReceipt;

pub const MOVE_DENIED_REASON: &str =
    "You don't have permission to move customers. Contact your administrator.";

/// How the "Move customer" action is offered for `company`.
///
/// Resellers never get the action.
pub fn move_action_access(company: &Company, permissions: &PermissionSet) -> ActionAccess {
    if company.kind() != CompanyKind::Customer {
        return ActionAccess::Hidden;
    }
    permissions.access(&Permission::MOVE_CUSTOMER, MOVE_DENIED_REASON)
}

/// Follow-up link offered with a move notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLink {
    /// Switch the company view to its audit log.
    AuditHistory,
    /// Handled by the external billing collaborator.
    BillingDetails,
}

impl NotificationLink {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationLink::AuditHistory => "View audit history",
            NotificationLink::BillingDetails => "View billing details",
        }
    }
}

/// Transient success notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveNotification {
    pub message: String,
    pub links: Vec<NotificationLink>,
}

impl From<&MoveReceipt> for MoveNotification {
    fn from(receipt: &MoveReceipt) -> Self {
        Self {
            message: receipt.message.clone(),
            links: vec![NotificationLink::AuditHistory, NotificationLink::BillingDetails],
        }
    }
}

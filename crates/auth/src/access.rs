use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::Permission;

/// How an action is presented when its permission is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeniedBehavior {
    /// Do not offer the action at all.
    Hidden,
    /// Offer the action greyed out, with an explanation.
    #[default]
    Disabled,
}

/// Resolved presentation state of a guarded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActionAccess {
    Enabled,
    Disabled { reason: String },
    Hidden,
}

impl ActionAccess {
    pub fn is_enabled(&self) -> bool {
        matches!(self, ActionAccess::Enabled)
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, ActionAccess::Hidden)
    }
}

/// Permissions granted to the current user, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    granted: HashSet<Permission>,
    #[serde(default)]
    denied_behavior: DeniedBehavior,
}

impl PermissionSet {
    pub fn new(granted: impl IntoIterator<Item = Permission>, denied_behavior: DeniedBehavior) -> Self {
        Self {
            granted: granted.into_iter().collect(),
            denied_behavior,
        }
    }

    /// Build a set from a single boolean flag for `permission`.
    pub fn from_flag(permission: Permission, allowed: bool, denied_behavior: DeniedBehavior) -> Self {
        let granted = if allowed { vec![permission] } else { Vec::new() };
        Self::new(granted, denied_behavior)
    }

    pub fn denied_behavior(&self) -> DeniedBehavior {
        self.denied_behavior
    }

    pub fn allows(&self, required: &Permission) -> bool {
        self.granted.contains(required) || self.granted.iter().any(Permission::is_wildcard)
    }

    /// Decide how an action guarded by `required` is offered.
    ///
    /// `reason` is shown next to a disabled action.
    pub fn access(&self, required: &Permission, reason: &str) -> ActionAccess {
        if self.allows(required) {
            return ActionAccess::Enabled;
        }
        match self.denied_behavior {
            DeniedBehavior::Hidden => ActionAccess::Hidden,
            DeniedBehavior::Disabled => ActionAccess::Disabled {
                reason: reason.to_string(),
            },
        }
    }
}

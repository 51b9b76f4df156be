use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use channel_core::{CompanyId, PriceListId};
use channel_events::Event;

/// When a move takes effect.
///
/// Moves always apply immediately; the label is kept as data because the
/// audit view prints it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EffectiveDate {
    #[default]
    Immediate,
}

impl EffectiveDate {
    pub fn label(&self) -> &'static str {
        match self {
            EffectiveDate::Immediate => "Immediate",
        }
    }
}

impl core::fmt::Display for EffectiveDate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Event: a customer was moved to another reseller.
///
/// Names are captured at commit time so later renames do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveEvent {
    pub occurred_at: DateTime<Utc>,
    pub before_reseller_name: String,
    pub after_reseller_name: String,
    pub before_price_list_names: Vec<String>,
    pub after_price_list_names: Vec<String>,
    #[serde(default)]
    pub effective_date: EffectiveDate,
}

impl Event for MoveEvent {
    fn event_type(&self) -> &'static str {
        "moves.customer.moved"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Commit payload gathered by the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub customer_id: CompanyId,
    pub destination_reseller_id: CompanyId,
    pub destination_price_list_ids: Vec<PriceListId>,
}

/// Successful commit: the recorded event plus a confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveReceipt {
    pub move_event: MoveEvent,
    pub message: String,
}

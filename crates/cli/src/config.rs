//! Process configuration: flags with environment fallbacks.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use channel_auth::{DeniedBehavior, Permission, PermissionSet};
use channel_core::DomainError;
use channel_infra::{FailureTrigger, MoveServiceConfig};
use channel_observability::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "channel")]
#[command(version)]
#[command(about = "Reassign end customers between resellers")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory document (JSON); the bundled demo directory when absent
    #[arg(long, env = "CHANNEL_DIRECTORY", global = true)]
    pub directory: Option<PathBuf>,

    /// Log format: json or pretty
    #[arg(long, env = "CHANNEL_LOG_FORMAT", global = true, default_value = "pretty")]
    pub log_format: LogFormat,

    /// <reseller id>:<price list id> that always fails, or `none`
    #[arg(long, env = "CHANNEL_FAILURE_TRIGGER", global = true, default_value = "4:PL-CF-PRO")]
    pub failure_trigger: TriggerSetting,

    /// Whether the current user may move customers
    #[arg(long, env = "CHANNEL_CAN_MOVE", global = true, default_value_t = true, action = ArgAction::Set)]
    pub can_move: bool,

    /// How the move action is offered when not permitted
    #[arg(long, env = "CHANNEL_DENIED_BEHAVIOR", global = true, value_enum, default_value = "disabled")]
    pub denied_behavior: DeniedArg,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List companies and whether each can be moved
    Companies,

    /// Show a customer's audit log, newest first
    History {
        customer: u64,

        /// Case-insensitive filter over every rendered field
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Move a customer to another reseller
    Move {
        customer: u64,

        /// Destination reseller id
        #[arg(long)]
        to: u64,

        /// Destination price list (optional when the reseller has only one)
        #[arg(long)]
        price_list: Option<String>,

        /// Acknowledge the billing impact
        #[arg(long)]
        acknowledge: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeniedArg {
    Hidden,
    Disabled,
}

impl From<DeniedArg> for DeniedBehavior {
    fn from(arg: DeniedArg) -> Self {
        match arg {
            DeniedArg::Hidden => DeniedBehavior::Hidden,
            DeniedArg::Disabled => DeniedBehavior::Disabled,
        }
    }
}

/// Parsed `--failure-trigger` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSetting(pub Option<FailureTrigger>);

impl FromStr for TriggerSetting {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("none") {
            return Ok(Self(None));
        }
        s.parse().map(|trigger| Self(Some(trigger)))
    }
}

impl Cli {
    pub fn permissions(&self) -> PermissionSet {
        PermissionSet::from_flag(
            Permission::MOVE_CUSTOMER,
            self.can_move,
            self.denied_behavior.into(),
        )
    }

    pub fn service_config(&self) -> MoveServiceConfig {
        MoveServiceConfig {
            failure_trigger: self.failure_trigger.0.clone(),
        }
    }
}

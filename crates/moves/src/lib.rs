//! Customer move workflow (reassigning an end customer to another reseller).
//!
//! Pure domain logic: the coverage check, the wizard state machine, the move
//! event and its failure taxonomy, and the audit log view. Committing a move
//! against real records happens in `channel-infra`.

pub mod audit;
pub mod coverage;
pub mod error;
pub mod event;
pub mod notification;
pub mod wizard;

pub use audit::{audit_log, AuditActor, AuditEntry, AuditTrailStore};
pub use coverage::{has_coverage_conflict, missing_services, CoverageReport};
pub use error::{MoveError, MoveErrorKind, MoveFailure, SUPPORT_MESSAGE};
pub use event::{EffectiveDate, MoveEvent, MoveReceipt, MoveRequest};
pub use notification::{move_action_access, MoveNotification, NotificationLink};
pub use wizard::{
    transition, ConfirmOutcome, ContextSummary, MoveCommitter, MoveSummary, MoveWizard,
    WizardEvent, WizardStep,
};

//! Audit actor supply and per-write audit context.
//!
//! # Responsibility
//! - Define the pluggable source of the "current actor" identifier.
//! - Capture one actor + timestamp pair for a single write operation.
//!
//! # Invariants
//! - A captured `AuditContext` always carries a non-blank actor of at most
//!   `AUDITOR_MAX_CHARS` characters.
//! - Entities never read the clock or the provider themselves; writes receive
//!   an explicit `AuditContext`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum length of `created_by` / `modified_by` values.
pub const AUDITOR_MAX_CHARS: usize = 100;

/// Actor used when no identity source has been configured.
pub const DEFAULT_AUDITOR: &str = "board";

/// Supplier of the identifier written to `created_by` / `modified_by`.
///
/// Implementations must be cheap to call; they are invoked once per write.
pub trait AuditorProvider: Send + Sync {
    /// Returns the current actor, or `None` when no actor is available.
    fn current_auditor(&self) -> Option<String>;
}

impl<F> AuditorProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn current_auditor(&self) -> Option<String> {
        self()
    }
}

/// Provider that always answers with the same actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedAuditor {
    actor: String,
}

impl FixedAuditor {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
        }
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }
}

impl Default for FixedAuditor {
    fn default() -> Self {
        Self::new(DEFAULT_AUDITOR)
    }
}

impl AuditorProvider for FixedAuditor {
    fn current_auditor(&self) -> Option<String> {
        Some(self.actor.clone())
    }
}

/// Errors raised while capturing an audit context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// Provider returned no actor.
    MissingAuditor,
    /// Actor is blank after trim.
    BlankAuditor,
    /// Actor exceeds `AUDITOR_MAX_CHARS`.
    AuditorTooLong { actual: usize },
}

impl Display for AuditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAuditor => write!(f, "no current auditor available"),
            Self::BlankAuditor => write!(f, "auditor must not be blank"),
            Self::AuditorTooLong { actual } => write!(
                f,
                "auditor must be at most {AUDITOR_MAX_CHARS} characters, got {actual}"
            ),
        }
    }
}

impl Error for AuditError {}

/// Actor and timestamp applied to one insert or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditContext {
    actor: String,
    at_epoch_ms: i64,
}

impl AuditContext {
    /// Builds a context from explicit values.
    ///
    /// # Errors
    /// - `BlankAuditor` / `AuditorTooLong` when `actor` violates column rules.
    pub fn new(actor: impl Into<String>, at_epoch_ms: i64) -> Result<Self, AuditError> {
        let actor = actor.into();
        if actor.trim().is_empty() {
            return Err(AuditError::BlankAuditor);
        }
        let actual = actor.chars().count();
        if actual > AUDITOR_MAX_CHARS {
            return Err(AuditError::AuditorTooLong { actual });
        }
        Ok(Self { actor, at_epoch_ms })
    }

    /// Captures the provider's current actor at the current wall-clock time.
    pub fn capture(provider: &dyn AuditorProvider) -> Result<Self, AuditError> {
        let actor = provider
            .current_auditor()
            .ok_or(AuditError::MissingAuditor)?;
        Self::new(actor, now_epoch_ms())
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn at_epoch_ms(&self) -> i64 {
        self.at_epoch_ms
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

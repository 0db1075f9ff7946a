//! Created/modified metadata shared by every persisted entity.

use crate::audit::AuditContext;
use serde::Serialize;

/// Audit columns attached to every persisted row.
///
/// Only present on entities that have been written at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFields {
    created_at: i64,
    created_by: String,
    modified_at: i64,
    modified_by: String,
}

impl AuditFields {
    /// Initial metadata for an insert: created and modified are identical.
    pub(crate) fn for_insert(ctx: &AuditContext) -> Self {
        Self {
            created_at: ctx.at_epoch_ms(),
            created_by: ctx.actor().to_string(),
            modified_at: ctx.at_epoch_ms(),
            modified_by: ctx.actor().to_string(),
        }
    }

    pub(crate) fn from_columns(
        created_at: i64,
        created_by: String,
        modified_at: i64,
        modified_by: String,
    ) -> Self {
        Self {
            created_at,
            created_by,
            modified_at,
            modified_by,
        }
    }

    /// Applies an update: only the modified pair changes.
    pub(crate) fn touch(&mut self, ctx: &AuditContext) {
        self.modified_at = ctx.at_epoch_ms();
        self.modified_by = ctx.actor().to_string();
    }

    /// Unix epoch milliseconds of the insert.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    /// Unix epoch milliseconds of the latest write.
    pub fn modified_at(&self) -> i64 {
        self.modified_at
    }

    pub fn modified_by(&self) -> &str {
        &self.modified_by
    }
}

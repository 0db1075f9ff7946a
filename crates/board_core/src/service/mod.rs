//! Use-case services above repository contracts.
//!
//! # Invariants
//! - Services never bypass repository validation/persistence contracts.
//! - Every write captures exactly one `AuditContext` from the configured
//!   `AuditorProvider`.

pub mod board_service;

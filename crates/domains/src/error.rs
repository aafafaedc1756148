//! # AppError
//!
//! Centralized error handling for the SkillBridge workspace.
//! Every port and service returns this type so the failure kind survives
//! all the way to the transport boundary.

use thiserror::Error;

use crate::models::BookingStatus;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or out-of-range input (e.g. bad date, rating above 5)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Resource not found, or not owned by the requester
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Missing, invalid or expired credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Wrong role or ownership for the requested action
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Uniqueness violation (slot already booked, duplicate review, ...)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Status change not present in the transition graph
    #[error("cannot transition from '{from}' to '{to}'")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    /// A state requirement is unmet (booking not completed, edit window expired)
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Infrastructure failure (e.g. DB down, hashing failure)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound(entity.to_string(), id.to_string())
    }
}

/// A specialized Result type for SkillBridge logic.
pub type Result<T> = std::result::Result<T, AppError>;

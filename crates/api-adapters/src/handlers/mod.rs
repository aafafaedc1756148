//! # Handlers
//!
//! Thin translation between HTTP and the `services` layer: extract, call,
//! wrap the result in JSON. Business rules never live here.

pub mod accounts;
pub mod availability;
pub mod bookings;
pub mod calendar;
pub mod catalog;
pub mod notifications;
pub mod reviews;
pub mod system;

use serde::Serialize;

use crate::error::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;

/// `{"message": "..."}` acknowledgement body.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

impl Message {
    pub fn new(message: &'static str) -> axum::Json<Self> {
        axum::Json(Self { message })
    }
}

//! Prometheus counters for the booking lifecycle.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

use domains::{AppError, BookingStatus};

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct TransitionLabels {
    status: String,
}

pub struct Metrics {
    registry: Registry,
    bookings_created: Counter,
    booking_transitions: Family<TransitionLabels, Counter>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let bookings_created = Counter::default();
        registry.register(
            "skillbridge_bookings_created",
            "Bookings created",
            bookings_created.clone(),
        );

        let booking_transitions = Family::<TransitionLabels, Counter>::default();
        registry.register(
            "skillbridge_booking_transitions",
            "Booking status changes, by target status",
            booking_transitions.clone(),
        );

        Self {
            registry,
            bookings_created,
            booking_transitions,
        }
    }

    pub fn booking_created(&self) {
        self.bookings_created.inc();
    }

    pub fn booking_transitioned(&self, to: BookingStatus) {
        self.booking_transitions
            .get_or_create(&TransitionLabels {
                status: to.as_str().to_string(),
            })
            .inc();
    }

    /// OpenMetrics text exposition of every registered metric.
    pub fn render(&self) -> Result<String, AppError> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)
            .map_err(|e| AppError::Internal(format!("metrics encoding failed: {e}")))?;
        Ok(buffer)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

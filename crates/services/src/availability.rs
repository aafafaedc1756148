//! Weekly working hours, one row per provider and weekday.

use std::sync::Arc;

use domains::{AppError, Availability, AvailabilityRepo, AvailabilitySlot, Identity, Result, Role};

use crate::require_role;

const PROVIDERS_ONLY: &str = "Only providers can perform this action";

pub struct AvailabilityService {
    availability: Arc<dyn AvailabilityRepo>,
}

impl AvailabilityService {
    pub fn new(availability: Arc<dyn AvailabilityRepo>) -> Self {
        Self { availability }
    }

    pub async fn my_availability(&self, identity: &Identity) -> Result<Vec<Availability>> {
        require_role(identity, Role::Provider, PROVIDERS_ONLY)?;
        self.availability.list_availability(identity.user_id).await
    }

    pub async fn provider_availability(&self, provider_id: i64) -> Result<Vec<Availability>> {
        self.availability.list_availability(provider_id).await
    }

    /// Upserts the caller's hours for `slot.day_of_week` (0 = Monday).
    pub async fn set_availability(
        &self,
        identity: &Identity,
        slot: AvailabilitySlot,
    ) -> Result<Availability> {
        require_role(identity, Role::Provider, PROVIDERS_ONLY)?;
        if !(0..=6).contains(&slot.day_of_week) {
            return Err(AppError::ValidationError(
                "day_of_week must be between 0 (Monday) and 6 (Sunday)".into(),
            ));
        }
        self.availability.upsert_availability(identity.user_id, slot).await
    }

    pub async fn delete_availability(&self, identity: &Identity, availability_id: i64) -> Result<()> {
        require_role(identity, Role::Provider, PROVIDERS_ONLY)?;
        if self
            .availability
            .delete_availability(availability_id, identity.user_id)
            .await?
        {
            Ok(())
        } else {
            Err(AppError::not_found("Availability", availability_id))
        }
    }
}

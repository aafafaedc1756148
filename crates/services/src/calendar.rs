//! Provider calendar: free-form entries plus the ones the booking lifecycle adds.

use std::sync::Arc;

use serde::Deserialize;

use domains::{
    AppError, CalendarEvent, CalendarEventPatch, CalendarRepo, Clock, EventType, Identity,
    NewCalendarEvent, Result, Role,
};

use crate::require_role;

const PROVIDERS_ONLY: &str = "Only providers can perform this action";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewEventRequest {
    pub title: String,
    #[serde(default)]
    pub event_type: EventType,
    pub start_datetime: String,
    pub end_datetime: Option<String>,
    pub color: Option<String>,
}

pub struct CalendarService {
    calendar: Arc<dyn CalendarRepo>,
    clock: Arc<dyn Clock>,
}

impl CalendarService {
    pub fn new(calendar: Arc<dyn CalendarRepo>, clock: Arc<dyn Clock>) -> Self {
        Self { calendar, clock }
    }

    pub async fn list(&self, identity: &Identity) -> Result<Vec<CalendarEvent>> {
        require_role(identity, Role::Provider, PROVIDERS_ONLY)?;
        self.calendar.list_events(identity.user_id).await
    }

    pub async fn create(&self, identity: &Identity, request: NewEventRequest) -> Result<CalendarEvent> {
        require_role(identity, Role::Provider, PROVIDERS_ONLY)?;
        if request.title.trim().is_empty() {
            return Err(AppError::ValidationError("title must not be empty".into()));
        }
        self.calendar
            .create_event(NewCalendarEvent {
                provider_id: identity.user_id,
                title: request.title,
                event_type: request.event_type,
                start_datetime: request.start_datetime,
                end_datetime: request.end_datetime,
                color: request.color,
                created_at: self.clock.now(),
            })
            .await
    }

    pub async fn update(
        &self,
        identity: &Identity,
        event_id: i64,
        patch: CalendarEventPatch,
    ) -> Result<CalendarEvent> {
        require_role(identity, Role::Provider, PROVIDERS_ONLY)?;
        let mut event = self
            .calendar
            .get_event(event_id, identity.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Event", event_id))?;
        patch.apply(&mut event);
        self.calendar.update_event(event).await
    }

    pub async fn delete(&self, identity: &Identity, event_id: i64) -> Result<()> {
        require_role(identity, Role::Provider, PROVIDERS_ONLY)?;
        if self.calendar.delete_event(event_id, identity.user_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Event", event_id))
        }
    }
}

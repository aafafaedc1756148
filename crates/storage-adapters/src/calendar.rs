use async_trait::async_trait;
use sqlx::SqliteConnection;

use domains::{AppError, CalendarEvent, CalendarRepo, NewCalendarEvent, Result};

use crate::rows;
use crate::{internal, SqliteStore};

/// Inserts a calendar entry on an open connection or transaction.
pub(crate) async fn insert_event(
    conn: &mut SqliteConnection,
    event: NewCalendarEvent,
) -> Result<CalendarEvent> {
    let row = sqlx::query(
        "INSERT INTO calendar_events (provider_id, title, event_type, start_datetime, end_datetime, color, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         RETURNING *",
    )
    .bind(event.provider_id)
    .bind(&event.title)
    .bind(event.event_type.as_str())
    .bind(&event.start_datetime)
    .bind(&event.end_datetime)
    .bind(&event.color)
    .bind(event.created_at)
    .fetch_one(&mut *conn)
    .await
    .map_err(internal)?;

    rows::calendar_event(&row).map_err(internal)
}

#[async_trait]
impl CalendarRepo for SqliteStore {
    async fn list_events(&self, provider_id: i64) -> Result<Vec<CalendarEvent>> {
        let found = sqlx::query(
            "SELECT * FROM calendar_events WHERE provider_id = ? ORDER BY start_datetime, id",
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;
        rows::all(found, rows::calendar_event).map_err(internal)
    }

    async fn create_event(&self, event: NewCalendarEvent) -> Result<CalendarEvent> {
        let mut conn = self.pool.acquire().await.map_err(internal)?;
        insert_event(&mut conn, event).await
    }

    async fn get_event(&self, id: i64, provider_id: i64) -> Result<Option<CalendarEvent>> {
        sqlx::query("SELECT * FROM calendar_events WHERE id = ? AND provider_id = ?")
            .bind(id)
            .bind(provider_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .map(|row| rows::calendar_event(&row))
            .transpose()
            .map_err(internal)
    }

    async fn update_event(&self, event: CalendarEvent) -> Result<CalendarEvent> {
        let row = sqlx::query(
            "UPDATE calendar_events
             SET title = ?, event_type = ?, start_datetime = ?, end_datetime = ?, color = ?
             WHERE id = ? AND provider_id = ?
             RETURNING *",
        )
        .bind(&event.title)
        .bind(event.event_type.as_str())
        .bind(&event.start_datetime)
        .bind(&event.end_datetime)
        .bind(&event.color)
        .bind(event.id)
        .bind(event.provider_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::not_found("Event", event.id))?;

        rows::calendar_event(&row).map_err(internal)
    }

    async fn delete_event(&self, id: i64, provider_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = ? AND provider_id = ?")
            .bind(id)
            .bind(provider_id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(result.rows_affected() > 0)
    }
}

use async_trait::async_trait;

use domains::{Availability, AvailabilityRepo, AvailabilitySlot, Result};

use crate::rows;
use crate::{internal, write_error, SqliteStore};

#[async_trait]
impl AvailabilityRepo for SqliteStore {
    async fn list_availability(&self, provider_id: i64) -> Result<Vec<Availability>> {
        let found = sqlx::query(
            "SELECT * FROM provider_availability WHERE provider_id = ? ORDER BY day_of_week",
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;
        rows::all(found, rows::availability).map_err(internal)
    }

    async fn upsert_availability(
        &self,
        provider_id: i64,
        slot: AvailabilitySlot,
    ) -> Result<Availability> {
        let row = sqlx::query(
            "INSERT INTO provider_availability (provider_id, day_of_week, start_time, end_time)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (provider_id, day_of_week)
             DO UPDATE SET start_time = excluded.start_time, end_time = excluded.end_time
             RETURNING *",
        )
        .bind(provider_id)
        .bind(slot.day_of_week)
        .bind(&slot.start_time)
        .bind(&slot.end_time)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error("Availability already set for that day"))?;

        rows::availability(&row).map_err(internal)
    }

    async fn delete_availability(&self, id: i64, provider_id: i64) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM provider_availability WHERE id = ? AND provider_id = ?")
                .bind(id)
                .bind(provider_id)
                .execute(&self.pool)
                .await
                .map_err(internal)?;
        Ok(result.rows_affected() > 0)
    }
}

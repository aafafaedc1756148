use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

use domains::{AppError, NewService, Result, Service, ServiceFilter, ServiceRepo};

use crate::rows;
use crate::{internal, write_error, SqliteStore};

/// Trims a filter value, dropping it when empty.
fn like_pattern(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(|value| format!("%{value}%"))
}

#[async_trait]
impl ServiceRepo for SqliteStore {
    async fn create_service(
        &self,
        provider_id: i64,
        service: NewService,
        created_at: DateTime<Utc>,
    ) -> Result<Service> {
        let row = sqlx::query(
            "INSERT INTO services (provider_id, service_name, description, min_price, category, image_url, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(provider_id)
        .bind(&service.service_name)
        .bind(&service.description)
        .bind(service.min_price)
        .bind(&service.category)
        .bind(&service.image_url)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error("Service already exists"))?;

        rows::service(&row).map_err(internal)
    }

    async fn get_service(&self, id: i64) -> Result<Option<Service>> {
        sqlx::query("SELECT * FROM services WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .map(|row| rows::service(&row))
            .transpose()
            .map_err(internal)
    }

    /// `LIKE` is case-insensitive for ASCII in SQLite, which is what the
    /// search box needs.
    async fn list_services(&self, filter: ServiceFilter) -> Result<Vec<Service>> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT s.* FROM services s JOIN users u ON u.id = s.provider_id WHERE 1 = 1",
        );

        if let Some(category) = like_pattern(filter.category) {
            query.push(" AND s.category LIKE ").push_bind(category);
        }
        if let Some(search) = like_pattern(filter.search) {
            query
                .push(" AND (s.service_name LIKE ")
                .push_bind(search.clone())
                .push(" OR s.description LIKE ")
                .push_bind(search)
                .push(")");
        }
        if let Some(location) = like_pattern(filter.location) {
            query.push(" AND u.location LIKE ").push_bind(location);
        }
        query.push(" ORDER BY s.id");

        let found = query.build().fetch_all(&self.pool).await.map_err(internal)?;
        rows::all(found, rows::service).map_err(internal)
    }

    async fn list_by_provider(&self, provider_id: i64) -> Result<Vec<Service>> {
        let found = sqlx::query("SELECT * FROM services WHERE provider_id = ? ORDER BY id")
            .bind(provider_id)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;
        rows::all(found, rows::service).map_err(internal)
    }

    async fn categories(&self) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT DISTINCT category FROM services ORDER BY category")
            .fetch_all(&self.pool)
            .await
            .map_err(internal)
    }

    async fn update_service(&self, service: Service) -> Result<Service> {
        let row = sqlx::query(
            "UPDATE services
             SET service_name = ?, description = ?, min_price = ?, category = ?, image_url = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(&service.service_name)
        .bind(&service.description)
        .bind(service.min_price)
        .bind(&service.category)
        .bind(&service.image_url)
        .bind(service.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::not_found("Service", service.id))?;

        rows::service(&row).map_err(internal)
    }

    async fn delete_service(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Service", id));
        }
        Ok(())
    }
}

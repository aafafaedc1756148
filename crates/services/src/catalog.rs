//! # Catalog
//!
//! Provider-owned service listings and the public search over them.

use std::sync::Arc;

use tracing::info;

use domains::{
    AppError, Clock, Identity, NewService, PlatformStats, Result, Role, Service, ServiceFilter,
    ServicePatch, ServiceRepo, StatsRepo,
};

use crate::require_role;

const PROVIDERS_ONLY: &str = "Only providers can perform this action";

pub struct CatalogService {
    services: Arc<dyn ServiceRepo>,
    stats: Arc<dyn StatsRepo>,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    pub fn new(
        services: Arc<dyn ServiceRepo>,
        stats: Arc<dyn StatsRepo>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            services,
            stats,
            clock,
        }
    }

    pub async fn list_services(&self, filter: ServiceFilter) -> Result<Vec<Service>> {
        self.services.list_services(filter).await
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        self.services.categories().await
    }

    pub async fn get_service(&self, id: i64) -> Result<Service> {
        self.services
            .get_service(id)
            .await?
            .ok_or_else(|| AppError::not_found("Service", id))
    }

    pub async fn provider_services(&self, provider_id: i64) -> Result<Vec<Service>> {
        self.services.list_by_provider(provider_id).await
    }

    pub async fn my_services(&self, identity: &Identity) -> Result<Vec<Service>> {
        require_role(identity, Role::Provider, PROVIDERS_ONLY)?;
        self.services.list_by_provider(identity.user_id).await
    }

    pub async fn create_service(&self, identity: &Identity, service: NewService) -> Result<Service> {
        require_role(identity, Role::Provider, PROVIDERS_ONLY)?;
        validate_listing(&service.service_name, &service.category, service.min_price)?;
        let created = self
            .services
            .create_service(identity.user_id, service, self.clock.now())
            .await?;
        info!(service_id = created.id, provider_id = created.provider_id, "service listed");
        Ok(created)
    }

    pub async fn update_service(
        &self,
        identity: &Identity,
        id: i64,
        patch: ServicePatch,
    ) -> Result<Service> {
        let mut service = self.owned_service(identity, id).await?;
        patch.apply(&mut service);
        validate_listing(&service.service_name, &service.category, service.min_price)?;
        self.services.update_service(service).await
    }

    /// Existing bookings keep their `service_id`; see DESIGN.md.
    pub async fn delete_service(&self, identity: &Identity, id: i64) -> Result<()> {
        let service = self.owned_service(identity, id).await?;
        self.services.delete_service(service.id).await?;
        info!(service_id = id, provider_id = identity.user_id, "service deleted");
        Ok(())
    }

    pub async fn platform_stats(&self) -> Result<PlatformStats> {
        self.stats.platform_stats().await
    }

    async fn owned_service(&self, identity: &Identity, id: i64) -> Result<Service> {
        require_role(identity, Role::Provider, PROVIDERS_ONLY)?;
        self.services
            .get_service(id)
            .await?
            .filter(|service| service.provider_id == identity.user_id)
            .ok_or_else(|| AppError::not_found("Service", id))
    }
}

fn validate_listing(name: &str, category: &str, min_price: f64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::ValidationError("service_name must not be empty".into()));
    }
    if category.trim().is_empty() {
        return Err(AppError::ValidationError("category must not be empty".into()));
    }
    if !(min_price >= 0.0) {
        return Err(AppError::ValidationError("min_price must not be negative".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{MockClock, MockServiceRepo, MockStatsRepo};

    fn catalog(services: MockServiceRepo) -> CatalogService {
        let mut clock = MockClock::new();
        clock.expect_now().returning(Utc::now);
        CatalogService::new(Arc::new(services), Arc::new(MockStatsRepo::new()), Arc::new(clock))
    }

    fn listing(provider_id: i64) -> Service {
        Service {
            id: 5,
            provider_id,
            service_name: "Pipe repair".into(),
            description: None,
            min_price: 40.0,
            category: "Plumbing".into(),
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_cannot_edit_another_providers_service() {
        let mut services = MockServiceRepo::new();
        services.expect_get_service().returning(|_| Ok(Some(listing(8))));
        services.expect_update_service().never();

        let err = catalog(services)
            .update_service(&Identity { user_id: 7, role: Role::Provider }, 5, ServicePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }

    #[tokio::test]
    async fn test_rejects_negative_price() {
        let err = catalog(MockServiceRepo::new())
            .create_service(
                &Identity { user_id: 7, role: Role::Provider },
                NewService {
                    service_name: "Pipe repair".into(),
                    description: None,
                    min_price: -1.0,
                    category: "Plumbing".into(),
                    image_url: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_users_cannot_list_services() {
        let err = catalog(MockServiceRepo::new())
            .my_services(&Identity { user_id: 3, role: Role::User })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}

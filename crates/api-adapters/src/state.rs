use std::sync::Arc;

use domains::{
    AuthProvider, AvailabilityRepo, BookingRepo, CalendarRepo, Clock, NotificationRepo,
    ReviewRepo, ServiceRepo, StatsRepo, UserRepo,
};
use services::{
    AccountService, AvailabilityService, BookingService, CalendarService, CatalogService,
    NotificationService, ReviewService,
};

use crate::metrics::Metrics;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub catalog: Arc<CatalogService>,
    pub bookings: Arc<BookingService>,
    pub reviews: Arc<ReviewService>,
    pub calendar: Arc<CalendarService>,
    pub availability: Arc<AvailabilityService>,
    pub notifications: Arc<NotificationService>,
    pub auth: Arc<dyn AuthProvider>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Wires every service to a store implementing all repository ports.
    pub fn new<S>(store: Arc<S>, auth: Arc<dyn AuthProvider>, clock: Arc<dyn Clock>) -> Self
    where
        S: UserRepo
            + ServiceRepo
            + BookingRepo
            + ReviewRepo
            + CalendarRepo
            + AvailabilityRepo
            + NotificationRepo
            + StatsRepo
            + 'static,
    {
        let users: Arc<dyn UserRepo> = store.clone();
        let services: Arc<dyn ServiceRepo> = store.clone();
        let bookings: Arc<dyn BookingRepo> = store.clone();

        Self {
            accounts: Arc::new(AccountService::new(users.clone(), auth.clone(), clock.clone())),
            catalog: Arc::new(CatalogService::new(
                services.clone(),
                store.clone(),
                clock.clone(),
            )),
            bookings: Arc::new(BookingService::new(
                bookings.clone(),
                services,
                users.clone(),
                clock.clone(),
            )),
            reviews: Arc::new(ReviewService::new(store.clone(), bookings, users, clock.clone())),
            calendar: Arc::new(CalendarService::new(store.clone(), clock)),
            availability: Arc::new(AvailabilityService::new(store.clone())),
            notifications: Arc::new(NotificationService::new(store)),
            auth,
            metrics: Arc::new(Metrics::new()),
        }
    }
}

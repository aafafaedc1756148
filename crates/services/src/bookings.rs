//! # Booking Lifecycle
//!
//! Validates new bookings, guards the status graph by role, and plans the
//! notifications and calendar entries each transition writes. Planning is
//! pure; the store commits the plan together with the status change.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use domains::{
    AppError, Booking, BookingDetails, BookingRepo, BookingStatus, Clock, EventType, Identity,
    NewBooking, NewCalendarEvent, NewNotification, Result, Role, ServiceRepo, SideEffect,
    UserRepo,
};

use crate::require_role;

/// Highlight color of calendar entries created for accepted bookings.
pub const BOOKING_EVENT_COLOR: &str = "#6366f1";

/// Calendar title used when the booked service no longer exists.
const FALLBACK_SERVICE_NAME: &str = "Service";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookingRequest {
    pub service_id: i64,
    pub provider_id: i64,
    pub problem_description: Option<String>,
    pub booking_date: String,
    pub booking_time: String,
}

pub struct BookingService {
    bookings: Arc<dyn BookingRepo>,
    services: Arc<dyn ServiceRepo>,
    users: Arc<dyn UserRepo>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingRepo>,
        services: Arc<dyn ServiceRepo>,
        users: Arc<dyn UserRepo>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            services,
            users,
            clock,
        }
    }

    /// Creates a `pending` booking and notifies the provider in one unit.
    pub async fn create_booking(
        &self,
        identity: &Identity,
        request: BookingRequest,
    ) -> Result<Booking> {
        require_role(identity, Role::User, "Only users can book services")?;

        // 1. Date sanity
        let now = self.clock.now();
        let date = parse_booking_date(&request.booking_date)?;
        if date < now.date_naive() {
            return Err(AppError::ValidationError("Cannot book in the past".into()));
        }

        // 2. Slot conflict. The store's unique index catches anyone racing past this.
        if self
            .bookings
            .find_active_booking(request.provider_id, &request.booking_date, &request.booking_time)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Provider already has a booking at that time".into(),
            ));
        }

        let requester = self
            .users
            .get_user(identity.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", identity.user_id))?;

        // 3. Persist booking + provider notification atomically
        let notification = NewNotification {
            user_id: request.provider_id,
            title: "New Booking Request".into(),
            message: format!(
                "{} sent you a new booking request for {} at {}.",
                requester.name, request.booking_date, request.booking_time
            ),
            created_at: now,
        };
        let booking = self
            .bookings
            .create_booking(
                NewBooking {
                    user_id: identity.user_id,
                    provider_id: request.provider_id,
                    service_id: request.service_id,
                    problem_description: request.problem_description,
                    booking_date: request.booking_date,
                    booking_time: request.booking_time,
                    created_at: now,
                },
                notification,
            )
            .await?;

        info!(
            booking_id = booking.id,
            provider_id = booking.provider_id,
            date = %booking.booking_date,
            time = %booking.booking_time,
            "booking created"
        );
        Ok(booking)
    }

    /// Moves a booking along the status graph.
    ///
    /// The role guard runs before the graph guard so a party without standing
    /// learns nothing about whether the move would have been valid.
    pub async fn transition_status(
        &self,
        identity: &Identity,
        booking_id: i64,
        new_status: BookingStatus,
    ) -> Result<Booking> {
        let booking = self
            .bookings
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking", booking_id))?;

        authorize_transition(identity, &booking, new_status)?;

        if !booking.status.can_transition_to(new_status) {
            return Err(AppError::InvalidTransition {
                from: booking.status,
                to: new_status,
            });
        }

        let service_name = if new_status == BookingStatus::Accepted {
            self.services
                .get_service(booking.service_id)
                .await?
                .map(|service| service.service_name)
        } else {
            None
        };

        let effects = plan_side_effects(&booking, new_status, service_name.as_deref(), self.clock.now());
        let updated = self
            .bookings
            .apply_transition(booking.id, booking.status, new_status, effects)
            .await?;

        info!(
            booking_id = updated.id,
            from = %booking.status,
            to = %updated.status,
            requester = identity.user_id,
            "booking status changed"
        );
        Ok(updated)
    }

    pub async fn bookings_for_user(&self, identity: &Identity) -> Result<Vec<BookingDetails>> {
        require_role(identity, Role::User, "Only users can perform this action")?;
        self.bookings.list_for_user(identity.user_id).await
    }

    pub async fn bookings_for_provider(&self, identity: &Identity) -> Result<Vec<BookingDetails>> {
        require_role(identity, Role::Provider, "Only providers can perform this action")?;
        self.bookings.list_for_provider(identity.user_id).await
    }
}

/// Strict `YYYY-MM-DD`.
fn parse_booking_date(raw: &str) -> Result<NaiveDate> {
    let invalid = || AppError::ValidationError("Invalid date format. Use YYYY-MM-DD".into());
    if raw.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())
}

fn authorize_transition(identity: &Identity, booking: &Booking, to: BookingStatus) -> Result<()> {
    match to {
        BookingStatus::Accepted
        | BookingStatus::Rejected
        | BookingStatus::Ongoing
        | BookingStatus::Completed
            if identity.user_id != booking.provider_id =>
        {
            Err(AppError::Forbidden(
                "Only the provider can perform this action".into(),
            ))
        }
        BookingStatus::Disputed if identity.user_id != booking.user_id => Err(
            AppError::Forbidden("Only the user can dispute a booking".into()),
        ),
        BookingStatus::Pending
            if identity.user_id != booking.user_id && identity.user_id != booking.provider_id =>
        {
            Err(AppError::Forbidden(
                "Only a party to the booking can perform this action".into(),
            ))
        }
        BookingStatus::Pending
        | BookingStatus::Accepted
        | BookingStatus::Rejected
        | BookingStatus::Ongoing
        | BookingStatus::Completed
        | BookingStatus::Disputed => Ok(()),
    }
}

/// The writes that accompany moving `booking` to `to`.
pub fn plan_side_effects(
    booking: &Booking,
    to: BookingStatus,
    service_name: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<SideEffect> {
    let notify = |user_id: i64, title: &str, message: String| {
        SideEffect::Notify(NewNotification {
            user_id,
            title: title.to_string(),
            message,
            created_at: now,
        })
    };
    let date = &booking.booking_date;

    match to {
        BookingStatus::Accepted => vec![
            notify(
                booking.user_id,
                "Booking Accepted",
                format!("Your booking on {date} was accepted!"),
            ),
            SideEffect::Schedule(NewCalendarEvent {
                provider_id: booking.provider_id,
                title: format!("Booking: {}", service_name.unwrap_or(FALLBACK_SERVICE_NAME)),
                event_type: EventType::Booking,
                start_datetime: format!("{}T{}", booking.booking_date, booking.booking_time),
                end_datetime: None,
                color: Some(BOOKING_EVENT_COLOR.to_string()),
                created_at: now,
            }),
        ],
        BookingStatus::Rejected => vec![notify(
            booking.user_id,
            "Booking Rejected",
            format!("Your booking on {date} was rejected."),
        )],
        BookingStatus::Ongoing => vec![notify(
            booking.user_id,
            "Work Started",
            format!("Provider has started working on your booking ({date})."),
        )],
        BookingStatus::Completed => vec![notify(
            booking.user_id,
            "Work Completed",
            format!("Provider marked booking ({date}) as completed. Please confirm."),
        )],
        BookingStatus::Disputed => vec![notify(
            booking.provider_id,
            "Dispute Raised",
            format!("User raised a dispute on booking #{}.", booking.id),
        )],
        BookingStatus::Pending => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domains::{MockBookingRepo, MockClock, MockServiceRepo, MockUserRepo, Service, User};
    use mockall::predicate::eq;

    const USER_ID: i64 = 3;
    const PROVIDER_ID: i64 = 7;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    fn clock() -> Arc<MockClock> {
        let mut clock = MockClock::new();
        clock.expect_now().return_const(now());
        Arc::new(clock)
    }

    fn user_identity() -> Identity {
        Identity { user_id: USER_ID, role: Role::User }
    }

    fn provider_identity() -> Identity {
        Identity { user_id: PROVIDER_ID, role: Role::Provider }
    }

    fn alice() -> User {
        User {
            id: USER_ID,
            name: "Alice".into(),
            email: "alice@example.com".into(),
            role: Role::User,
            mobile: None,
            age: None,
            location: None,
            bio: None,
            avatar_url: None,
            created_at: now(),
        }
    }

    fn booking(status: BookingStatus) -> Booking {
        Booking {
            id: 11,
            user_id: USER_ID,
            provider_id: PROVIDER_ID,
            service_id: 5,
            problem_description: Some("Leaking tap".into()),
            booking_date: "2099-01-01".into(),
            booking_time: "10:00".into(),
            status,
            created_at: now(),
        }
    }

    fn request(date: &str) -> BookingRequest {
        BookingRequest {
            service_id: 5,
            provider_id: PROVIDER_ID,
            problem_description: None,
            booking_date: date.into(),
            booking_time: "10:00".into(),
        }
    }

    fn engine(bookings: MockBookingRepo, services: MockServiceRepo, users: MockUserRepo) -> BookingService {
        BookingService::new(Arc::new(bookings), Arc::new(services), Arc::new(users), clock())
    }

    fn with_booking(status: BookingStatus) -> MockBookingRepo {
        let mut bookings = MockBookingRepo::new();
        bookings
            .expect_get_booking()
            .with(eq(11))
            .returning(move |_| Ok(Some(booking(status))));
        bookings
    }

    #[tokio::test]
    async fn test_create_booking_is_pending_and_notifies_provider() {
        let mut bookings = MockBookingRepo::new();
        bookings
            .expect_find_active_booking()
            .withf(|provider, date, time| *provider == PROVIDER_ID && date == "2099-01-01" && time == "10:00")
            .returning(|_, _, _| Ok(None));
        bookings
            .expect_create_booking()
            .withf(|new, notification| {
                new.user_id == USER_ID
                    && notification.user_id == PROVIDER_ID
                    && notification.title == "New Booking Request"
                    && notification.message.contains("Alice")
                    && notification.message.contains("2099-01-01 at 10:00")
            })
            .times(1)
            .returning(|new, _| {
                Ok(Booking {
                    id: 1,
                    user_id: new.user_id,
                    provider_id: new.provider_id,
                    service_id: new.service_id,
                    problem_description: new.problem_description,
                    booking_date: new.booking_date,
                    booking_time: new.booking_time,
                    status: BookingStatus::Pending,
                    created_at: new.created_at,
                })
            });
        let mut users = MockUserRepo::new();
        users.expect_get_user().with(eq(USER_ID)).returning(|_| Ok(Some(alice())));

        let engine = engine(bookings, MockServiceRepo::new(), users);
        let created = engine.create_booking(&user_identity(), request("2099-01-01")).await.unwrap();

        assert_eq!(created.status, BookingStatus::Pending);
        assert_eq!(created.created_at, now());
    }

    #[tokio::test]
    async fn test_create_booking_allows_today() {
        let mut bookings = MockBookingRepo::new();
        bookings.expect_find_active_booking().returning(|_, _, _| Ok(None));
        bookings
            .expect_create_booking()
            .times(1)
            .returning(|_, _| Ok(booking(BookingStatus::Pending)));
        let mut users = MockUserRepo::new();
        users.expect_get_user().returning(|_| Ok(Some(alice())));

        let engine = engine(bookings, MockServiceRepo::new(), users);
        assert!(engine.create_booking(&user_identity(), request("2026-10-19")).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_booking_rejects_past_date() {
        let engine = engine(MockBookingRepo::new(), MockServiceRepo::new(), MockUserRepo::new());
        let err = engine
            .create_booking(&user_identity(), request("2026-10-18"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(msg) if msg.contains("past")));
    }

    #[tokio::test]
    async fn test_create_booking_rejects_malformed_dates() {
        let engine = engine(MockBookingRepo::new(), MockServiceRepo::new(), MockUserRepo::new());
        for raw in ["01/01/2099", "2099-02-30", "2099-1-1", "", "tomorrow"] {
            let err = engine.create_booking(&user_identity(), request(raw)).await.unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)), "{raw} accepted");
        }
    }

    #[tokio::test]
    async fn test_create_booking_conflicts_with_active_slot() {
        let mut bookings = MockBookingRepo::new();
        bookings
            .expect_find_active_booking()
            .returning(|_, _, _| Ok(Some(booking(BookingStatus::Accepted))));
        bookings.expect_create_booking().never();

        let engine = engine(bookings, MockServiceRepo::new(), MockUserRepo::new());
        let err = engine
            .create_booking(&user_identity(), request("2099-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_providers_cannot_create_bookings() {
        let engine = engine(MockBookingRepo::new(), MockServiceRepo::new(), MockUserRepo::new());
        let err = engine
            .create_booking(&provider_identity(), request("2099-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_transition_unknown_booking_is_not_found() {
        let mut bookings = MockBookingRepo::new();
        bookings.expect_get_booking().returning(|_| Ok(None));
        let engine = engine(bookings, MockServiceRepo::new(), MockUserRepo::new());

        let err = engine
            .transition_status(&provider_identity(), 404, BookingStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(entity, id) if entity == "Booking" && id == "404"));
    }

    #[tokio::test]
    async fn test_pending_cannot_jump_to_ongoing() {
        let engine = engine(with_booking(BookingStatus::Pending), MockServiceRepo::new(), MockUserRepo::new());
        let err = engine
            .transition_status(&provider_identity(), 11, BookingStatus::Ongoing)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition { from: BookingStatus::Pending, to: BookingStatus::Ongoing }
        ));
    }

    #[tokio::test]
    async fn test_provider_cannot_dispute() {
        let engine = engine(with_booking(BookingStatus::Completed), MockServiceRepo::new(), MockUserRepo::new());
        let err = engine
            .transition_status(&provider_identity(), 11, BookingStatus::Disputed)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_role_guard_runs_before_graph_guard() {
        // completed -> accepted is not in the graph, but the user has no standing at all.
        let engine = engine(with_booking(BookingStatus::Completed), MockServiceRepo::new(), MockUserRepo::new());
        let err = engine
            .transition_status(&user_identity(), 11, BookingStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_stranger_requesting_pending_is_forbidden() {
        // completed -> pending is not in the graph; a stranger must not learn that.
        let engine = engine(with_booking(BookingStatus::Completed), MockServiceRepo::new(), MockUserRepo::new());
        let stranger = Identity { user_id: 99, role: Role::User };
        let err = engine
            .transition_status(&stranger, 11, BookingStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_party_requesting_pending_hits_the_graph_guard() {
        let engine = engine(with_booking(BookingStatus::Completed), MockServiceRepo::new(), MockUserRepo::new());
        let err = engine
            .transition_status(&user_identity(), 11, BookingStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition { from: BookingStatus::Completed, to: BookingStatus::Pending }
        ));
    }

    #[tokio::test]
    async fn test_other_provider_cannot_accept() {
        let engine = engine(with_booking(BookingStatus::Pending), MockServiceRepo::new(), MockUserRepo::new());
        let stranger = Identity { user_id: 99, role: Role::Provider };
        let err = engine
            .transition_status(&stranger, 11, BookingStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_accept_schedules_calendar_event_with_service_name() {
        let mut bookings = with_booking(BookingStatus::Pending);
        bookings
            .expect_apply_transition()
            .withf(|id, from, to, effects| {
                let calendar: Vec<_> = effects
                    .iter()
                    .filter_map(|effect| match effect {
                        SideEffect::Schedule(event) => Some(event),
                        SideEffect::Notify(_) => None,
                    })
                    .collect();
                *id == 11
                    && *from == BookingStatus::Pending
                    && *to == BookingStatus::Accepted
                    && calendar.len() == 1
                    && calendar[0].title == "Booking: Pipe repair"
                    && calendar[0].start_datetime == "2099-01-01T10:00"
                    && calendar[0].provider_id == PROVIDER_ID
            })
            .times(1)
            .returning(|_, _, to, _| Ok(booking(to)));
        let mut services = MockServiceRepo::new();
        services.expect_get_service().with(eq(5)).returning(|_| {
            Ok(Some(Service {
                id: 5,
                provider_id: PROVIDER_ID,
                service_name: "Pipe repair".into(),
                description: None,
                min_price: 40.0,
                category: "Plumbing".into(),
                image_url: None,
                created_at: now(),
            }))
        });

        let engine = engine(bookings, services, MockUserRepo::new());
        let updated = engine
            .transition_status(&provider_identity(), 11, BookingStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Accepted);
    }

    #[tokio::test]
    async fn test_accept_falls_back_when_service_was_deleted() {
        let mut bookings = with_booking(BookingStatus::Pending);
        bookings
            .expect_apply_transition()
            .withf(|_, _, _, effects| {
                effects.iter().any(|effect| {
                    matches!(effect, SideEffect::Schedule(event) if event.title == "Booking: Service")
                })
            })
            .times(1)
            .returning(|_, _, to, _| Ok(booking(to)));
        let mut services = MockServiceRepo::new();
        services.expect_get_service().returning(|_| Ok(None));

        let engine = engine(bookings, services, MockUserRepo::new());
        engine
            .transition_status(&provider_identity(), 11, BookingStatus::Accepted)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_user_dispute_notifies_provider() {
        let mut bookings = with_booking(BookingStatus::Completed);
        bookings
            .expect_apply_transition()
            .withf(|_, _, _, effects| {
                effects.len() == 1
                    && matches!(
                        &effects[0],
                        SideEffect::Notify(n) if n.user_id == PROVIDER_ID
                            && n.title == "Dispute Raised"
                            && n.message.contains("#11")
                    )
            })
            .times(1)
            .returning(|_, _, to, _| Ok(booking(to)));

        let engine = engine(bookings, MockServiceRepo::new(), MockUserRepo::new());
        let updated = engine
            .transition_status(&user_identity(), 11, BookingStatus::Disputed)
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Disputed);
    }

    #[test]
    fn test_each_transition_notifies_the_right_party() {
        let cases = [
            (BookingStatus::Accepted, USER_ID, "Booking Accepted"),
            (BookingStatus::Rejected, USER_ID, "Booking Rejected"),
            (BookingStatus::Ongoing, USER_ID, "Work Started"),
            (BookingStatus::Completed, USER_ID, "Work Completed"),
            (BookingStatus::Disputed, PROVIDER_ID, "Dispute Raised"),
        ];
        for (to, recipient, title) in cases {
            let effects = plan_side_effects(&booking(BookingStatus::Pending), to, Some("X"), now());
            let notices: Vec<_> = effects
                .iter()
                .filter_map(|effect| match effect {
                    SideEffect::Notify(n) => Some(n),
                    SideEffect::Schedule(_) => None,
                })
                .collect();
            assert_eq!(notices.len(), 1, "{to}");
            assert_eq!(notices[0].user_id, recipient, "{to}");
            assert_eq!(notices[0].title, title, "{to}");
        }
    }

    #[test]
    fn test_only_accept_touches_the_calendar() {
        for to in BookingStatus::ALL {
            let effects = plan_side_effects(&booking(BookingStatus::Pending), to, None, now());
            let scheduled = effects
                .iter()
                .filter(|effect| matches!(effect, SideEffect::Schedule(_)))
                .count();
            assert_eq!(scheduled, usize::from(to == BookingStatus::Accepted), "{to}");
        }
    }
}

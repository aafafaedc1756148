//! Row → domain model mapping.

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use domains::{
    AppError, Availability, Booking, BookingDetails, CalendarEvent, Notification, Review, Service,
    User,
};

type RowResult<T> = std::result::Result<T, sqlx::Error>;

/// Decodes a TEXT column through the type's `FromStr`.
fn parse<T>(row: &SqliteRow, column: &str) -> RowResult<T>
where
    T: FromStr<Err = AppError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|err: AppError| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    })
}

pub(crate) fn user(row: &SqliteRow) -> RowResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role: parse(row, "role")?,
        mobile: row.try_get("mobile")?,
        age: row.try_get("age")?,
        location: row.try_get("location")?,
        bio: row.try_get("bio")?,
        avatar_url: row.try_get("avatar_url")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn service(row: &SqliteRow) -> RowResult<Service> {
    Ok(Service {
        id: row.try_get("id")?,
        provider_id: row.try_get("provider_id")?,
        service_name: row.try_get("service_name")?,
        description: row.try_get("description")?,
        min_price: row.try_get("min_price")?,
        category: row.try_get("category")?,
        image_url: row.try_get("image_url")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn booking(row: &SqliteRow) -> RowResult<Booking> {
    Ok(Booking {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        provider_id: row.try_get("provider_id")?,
        service_id: row.try_get("service_id")?,
        problem_description: row.try_get("problem_description")?,
        booking_date: row.try_get("booking_date")?,
        booking_time: row.try_get("booking_time")?,
        status: parse(row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Expects the joined columns `service_name`, `counterpart_name` and `review_rating`.
pub(crate) fn booking_details(row: &SqliteRow) -> RowResult<BookingDetails> {
    Ok(BookingDetails {
        booking: booking(row)?,
        service_name: row.try_get("service_name")?,
        counterpart_name: row.try_get("counterpart_name")?,
        review_rating: row.try_get("review_rating")?,
    })
}

pub(crate) fn review(row: &SqliteRow) -> RowResult<Review> {
    Ok(Review {
        id: row.try_get("id")?,
        booking_id: row.try_get("booking_id")?,
        user_id: row.try_get("user_id")?,
        provider_id: row.try_get("provider_id")?,
        rating: row.try_get("rating")?,
        feedback: row.try_get("feedback")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn calendar_event(row: &SqliteRow) -> RowResult<CalendarEvent> {
    Ok(CalendarEvent {
        id: row.try_get("id")?,
        provider_id: row.try_get("provider_id")?,
        title: row.try_get("title")?,
        event_type: parse(row, "event_type")?,
        start_datetime: row.try_get("start_datetime")?,
        end_datetime: row.try_get("end_datetime")?,
        color: row.try_get("color")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn availability(row: &SqliteRow) -> RowResult<Availability> {
    Ok(Availability {
        id: row.try_get("id")?,
        provider_id: row.try_get("provider_id")?,
        day_of_week: row.try_get("day_of_week")?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
    })
}

pub(crate) fn notification(row: &SqliteRow) -> RowResult<Notification> {
    Ok(Notification {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        is_read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Maps every row, failing on the first one that does not decode.
pub(crate) fn all<T>(
    rows: Vec<SqliteRow>,
    map: fn(&SqliteRow) -> RowResult<T>,
) -> RowResult<Vec<T>> {
    rows.iter().map(map).collect()
}

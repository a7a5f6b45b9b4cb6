//! Train catalog

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{info, warn};
use train_booking_core::{Error, Operator, Principal, Result, Train, TrainPayload};
use uuid::Uuid;

use crate::database::Database;
use crate::storage::WriteBatch;

/// Formats accepted next to RFC 3339, read as UTC
///
/// `%.f` also matches seconds without a fraction.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a schedule timestamp
///
/// Accepts RFC 3339 (`2030-05-01T08:30:00+02:00`), a naive date-time in one of
/// [`NAIVE_FORMATS`], or a bare date meaning midnight. Naive values are UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(time) = NaiveDateTime::parse_from_str(text, format) {
            return Some(time.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|time| time.and_utc())
}

/// Add a train run by one of the caller's operators
pub fn add_train(db: &Database, caller: &Principal, payload: TrainPayload) -> Result<Train> {
    if payload.name.trim().is_empty() {
        return Err(Error::InvalidArgument("train name must not be empty".into()));
    }
    if payload.operator.trim().is_empty() {
        return Err(Error::InvalidArgument("train operator must not be empty".into()));
    }
    if parse_timestamp(&payload.departure_time).is_none() {
        return Err(Error::InvalidArgument(format!(
            "departure time {:?} is not a timestamp",
            payload.departure_time
        )));
    }

    let operator = db.get::<Operator>(&payload.operator)?.ok_or_else(|| {
        Error::InvalidPayload(format!("Operator with name {} not found", payload.operator))
    })?;
    if operator.principal != *caller {
        warn!(operator = %operator.name, %caller, "train rejected for foreign operator");
        return Err(Error::InvalidPayload(format!(
            "Operator {} is not registered by {caller}",
            operator.name
        )));
    }

    if db.all::<Train>()?.iter().any(|train| train.name == payload.name) {
        return Err(Error::InvalidPayload(format!(
            "Train with name {} already exists",
            payload.name
        )));
    }

    let train = Train {
        id: Uuid::new_v4().to_string(),
        operator: operator.name,
        name: payload.name,
        image: payload.image,
        departure_time: payload.departure_time,
        arrival_time: payload.arrival_time,
        time_taken: payload.time_taken,
        price: payload.price,
        available_seats: payload.available_seats,
        booked_seats: 0,
    };

    let mut batch = WriteBatch::default();
    batch.put(&train)?;
    db.commit(batch)?;

    info!(train_id = %train.id, operator = %train.operator, seats = train.available_seats, "added train");
    Ok(train)
}

pub fn get_train(db: &Database, id: &str) -> Result<Train> {
    db.get::<Train>(id)?
        .ok_or_else(|| Error::NotFound(format!("Train with id {id} not found")))
}

pub fn get_trains(db: &Database) -> Result<Vec<Train>> {
    Ok(db.all()?)
}

use eyre::Result;
use train_booking_core::{Operator, OperatorPayload, Train, TrainPayload, User, UserPayload};
use train_booking_tests::{OperatorSession, TestCtx};

/// A departure far enough ahead to stay bookable
#[allow(unused)]
pub const FUTURE: &str = "2999-06-01T08:00:00Z";
/// A departure that has long passed
#[allow(unused)]
pub const PAST: &str = "2001-06-01T08:00:00Z";

#[allow(unused)]
pub fn train_payload(operator: &str, name: &str, seats: u64, departure: &str) -> TrainPayload {
    TrainPayload {
        operator: operator.into(),
        name: name.into(),
        image: format!("https://img.example.com/{name}.png"),
        departure_time: departure.into(),
        arrival_time: "2999-06-01T11:45:00Z".into(),
        time_taken: "3h45m".into(),
        price: 120,
        available_seats: seats,
    }
}

/// Registers an operator for a fresh principal.
#[allow(unused)]
pub async fn register_operator<'a>(
    ctx: &'a TestCtx,
    name: &str,
) -> Result<(OperatorSession<'a>, Operator)> {
    let session = ctx.api.create_operator_session(None);
    let operator = session
        .add_operator(&OperatorPayload {
            name: name.into(),
            address: "Platform 9, Central Station".into(),
            phone_number: "+44 20 7946 0000".into(),
        })
        .await?
        .result?;
    assert_eq!(operator.principal, session.caller);
    Ok((session, operator))
}

/// Adds a train that must be accepted.
#[allow(unused)]
pub async fn add_train(
    session: &OperatorSession<'_>,
    operator: &str,
    name: &str,
    seats: u64,
    departure: &str,
) -> Result<Train> {
    let train = session
        .add_train(&train_payload(operator, name, seats, departure))
        .await?
        .result?;
    assert_eq!(train.booked_seats, 0, "A new train must not have booked seats.");
    Ok(train)
}

/// Registers a user that must be accepted.
#[allow(unused)]
pub async fn add_user(ctx: &TestCtx, name: &str) -> Result<User> {
    let user = ctx
        .api
        .add_user(&UserPayload {
            name: name.into(),
            phone_number: format!("+1 555 {}", name.len()),
            email: format!("{}@example.com", name.to_lowercase()),
        })
        .await?
        .result?;
    assert!(user.tickets.is_empty(), "A new user must not hold tickets.");
    Ok(user)
}

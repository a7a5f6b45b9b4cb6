//! Ticket ledger: booking, cancellation and the joined ticket view
//!
//! Booking and cancellation move seats between `availableSeats` and
//! `bookedSeats` of a train, so the capacity of a train never changes. The
//! train, the ticket and the holder's ticket set are written in one batch.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use train_booking_core::{
    CancelTicket, Error, Result, Ticket, TicketInfo, TicketPayload, Train, User,
};
use uuid::Uuid;

use crate::database::Database;
use crate::storage::WriteBatch;
use crate::trains::parse_timestamp;

fn find_user(db: &Database, id: &str) -> Result<User> {
    db.get::<User>(id)?
        .ok_or_else(|| Error::NotFound(format!("User with id {id} not found")))
}

fn find_train(db: &Database, id: &str) -> Result<Train> {
    db.get::<Train>(id)?
        .ok_or_else(|| Error::NotFound(format!("Train with id {id} not found")))
}

fn find_ticket(db: &Database, id: &str) -> Result<Ticket> {
    db.get::<Ticket>(id)?
        .ok_or_else(|| Error::NotFound(format!("Ticket with id {id} not found")))
}

/// Book `payload.number_of_seats` seats, as of `now`
pub fn create_ticket(db: &Database, payload: TicketPayload, now: DateTime<Utc>) -> Result<TicketInfo> {
    if payload.number_of_seats == 0 {
        return Err(Error::InvalidArgument("number of seats must be positive".into()));
    }

    let mut user = find_user(db, &payload.user_id)?;
    let mut train = find_train(db, &payload.train_id)?;

    match parse_timestamp(&train.departure_time) {
        Some(departure) if departure >= now => {}
        Some(_) => {
            warn!(train_id = %train.id, "booking rejected, train departed");
            return Err(Error::InvalidPayload(format!(
                "Train with id {} has already departed",
                train.id
            )));
        }
        None => {
            return Err(Error::InvalidPayload(format!(
                "Train with id {} has no valid departure time",
                train.id
            )));
        }
    }

    let ticket_id = Uuid::new_v4().to_string();
    // Only an id collision can trip this
    if user.holds(&ticket_id) {
        return Err(Error::InvalidPayload(format!(
            "User with id {} already booked a ticket for train {}",
            user.id, train.id
        )));
    }

    if payload.number_of_seats > train.available_seats {
        warn!(
            train_id = %train.id,
            seats = payload.number_of_seats,
            available = train.available_seats,
            "booking rejected, not enough seats"
        );
        return Err(Error::InvalidPayload(format!(
            "No available seats for train {}: requested {}, available {}",
            train.id, payload.number_of_seats, train.available_seats
        )));
    }

    train.available_seats -= payload.number_of_seats;
    train.booked_seats += payload.number_of_seats;

    let ticket = Ticket {
        id: ticket_id,
        train_id: train.id.clone(),
        user_id: user.id.clone(),
        number_of_seats: payload.number_of_seats,
    };
    user.tickets.push(ticket.id.clone());

    let mut batch = WriteBatch::default();
    batch.put(&train)?;
    batch.put(&ticket)?;
    batch.put(&user)?;
    db.commit(batch)?;

    info!(
        ticket_id = %ticket.id,
        train_id = %train.id,
        user_id = %user.id,
        seats = ticket.number_of_seats,
        "booked ticket"
    );
    Ok(TicketInfo::new(&ticket, &train, &user))
}

pub fn get_tickets(db: &Database) -> Result<Vec<Ticket>> {
    Ok(db.all()?)
}

pub fn get_ticket_info(db: &Database, id: &str) -> Result<TicketInfo> {
    let ticket = find_ticket(db, id)?;
    let train = find_train(db, &ticket.train_id)?;
    let user = find_user(db, &ticket.user_id)?;
    Ok(TicketInfo::new(&ticket, &train, &user))
}

/// Cancel a ticket held by `payload.user_id` and release its seats
pub fn cancel_ticket(db: &Database, payload: CancelTicket) -> Result<CancelTicket> {
    let ticket = find_ticket(db, &payload.ticket_id)?;
    let mut user = find_user(db, &payload.user_id)?;
    if ticket.user_id != user.id {
        return Err(Error::NotFound(format!(
            "Ticket with id {} not found for user {}",
            ticket.id, user.id
        )));
    }
    let mut train = find_train(db, &ticket.train_id)?;

    train.booked_seats = train
        .booked_seats
        .checked_sub(ticket.number_of_seats)
        .ok_or_else(|| {
            Error::Storage(format!("seat counters of train {} are inconsistent", train.id))
        })?;
    train.available_seats += ticket.number_of_seats;
    user.tickets.retain(|id| *id != ticket.id);

    let mut batch = WriteBatch::default();
    batch.put(&train)?;
    batch.put(&user)?;
    batch.remove::<Ticket>(&ticket.id);
    db.commit(batch)?;

    info!(
        ticket_id = %ticket.id,
        train_id = %train.id,
        user_id = %user.id,
        seats = ticket.number_of_seats,
        "cancelled ticket"
    );
    Ok(CancelTicket {
        ticket_id: ticket.id,
        user_id: user.id,
    })
}

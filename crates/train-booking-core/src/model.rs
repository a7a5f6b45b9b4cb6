//! Records kept in the four stores and the payloads that create them
//!
//! All types use camelCase field names on the wire. Payload fields default to
//! empty values so that a partially filled payload reaches validation instead
//! of failing to parse.

use serde::{Deserialize, Serialize};

use crate::Principal;

/// A transport operator, keyed by its name
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    /// Unique name, also the key in the operator store
    pub name: String,
    /// The caller that registered the operator
    pub principal: Principal,
    /// Contact phone number
    pub phone_number: String,
    /// Postal address
    #[serde(default)]
    pub address: String,
}

/// Payload of `addOperator`
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperatorPayload {
    /// Unique operator name
    pub name: String,
    /// Postal address
    pub address: String,
    /// Contact phone number
    pub phone_number: String,
}

/// A train listing with its seat counters
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Train {
    /// Generated identifier
    pub id: String,
    /// Name of the operator running the train
    pub operator: String,
    /// Display name
    pub name: String,
    /// Image URL
    pub image: String,
    /// Departure timestamp (RFC 3339 or `YYYY-MM-DD HH:MM[:SS]` in UTC)
    pub departure_time: String,
    /// Arrival timestamp
    pub arrival_time: String,
    /// Free-form travel duration
    pub time_taken: String,
    /// Price of one seat
    pub price: u64,
    /// Seats that can still be booked
    pub available_seats: u64,
    /// Seats held by tickets
    pub booked_seats: u64,
}

impl Train {
    /// Total capacity, which booking and cancellation never change
    #[inline]
    pub fn capacity(&self) -> u64 {
        self.available_seats + self.booked_seats
    }
}

/// Payload of `addTrain`
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainPayload {
    /// Name of an already registered operator
    pub operator: String,
    /// Display name, unique among trains
    pub name: String,
    /// Image URL
    pub image: String,
    /// Departure timestamp
    pub departure_time: String,
    /// Arrival timestamp
    pub arrival_time: String,
    /// Free-form travel duration
    pub time_taken: String,
    /// Price of one seat
    pub price: u64,
    /// Initial number of bookable seats
    pub available_seats: u64,
}

/// A booking of one or more seats on a train
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Generated identifier
    pub id: String,
    /// Train the seats are booked on
    pub train_id: String,
    /// User holding the ticket
    pub user_id: String,
    /// Number of booked seats
    pub number_of_seats: u64,
}

/// Payload of `createTicket`
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketPayload {
    /// Train to book
    pub train_id: String,
    /// User booking the seats
    pub user_id: String,
    /// Number of seats to book
    pub number_of_seats: u64,
}

/// Denormalized view of a ticket joined with its train and user
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketInfo {
    /// Ticket identifier
    pub id: String,
    /// Train identifier
    pub train_id: String,
    /// User identifier
    pub user_id: String,
    /// Departure timestamp of the train
    pub departure_time: String,
    /// Arrival timestamp of the train
    pub arrival_time: String,
    /// Travel duration of the train
    pub time_taken: String,
    /// Price of one seat
    pub price: u64,
    /// Number of booked seats
    pub number_of_seats: u64,
    /// Name of the ticket holder
    pub user_name: String,
    /// Phone number of the ticket holder
    pub user_phone_number: String,
}

impl TicketInfo {
    /// Join `ticket` with the train and user it references
    pub fn new(ticket: &Ticket, train: &Train, user: &User) -> Self {
        Self {
            id: ticket.id.clone(),
            train_id: train.id.clone(),
            user_id: user.id.clone(),
            departure_time: train.departure_time.clone(),
            arrival_time: train.arrival_time.clone(),
            time_taken: train.time_taken.clone(),
            price: train.price,
            number_of_seats: ticket.number_of_seats,
            user_name: user.name.clone(),
            user_phone_number: user.phone_number.clone(),
        }
    }
}

/// A rider and the tickets they hold
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Generated identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Contact phone number
    pub phone_number: String,
    /// Contact email
    pub email: String,
    /// Identifiers of held tickets, without duplicates
    #[serde(rename = "ticket", default)]
    pub tickets: Vec<String>,
}

impl User {
    /// Whether the user holds the ticket `ticket_id`
    #[inline]
    pub fn holds(&self, ticket_id: &str) -> bool {
        self.tickets.iter().any(|id| id == ticket_id)
    }
}

/// Payload of `addUser`
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPayload {
    /// Display name
    pub name: String,
    /// Contact phone number
    pub phone_number: String,
    /// Contact email
    pub email: String,
}

impl UserPayload {
    /// Whether no field carries any content
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.phone_number, &self.email]
            .iter()
            .all(|field| field.trim().is_empty())
    }
}

/// Payload of `cancelTicket`, echoed back on success
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CancelTicket {
    /// Ticket to cancel
    pub ticket_id: String,
    /// User holding the ticket
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_uses_ticket_field_on_the_wire() {
        let user = User {
            id: "u1".into(),
            name: "Alice".into(),
            phone_number: "555".into(),
            email: "alice@example.com".into(),
            tickets: vec!["t1".into()],
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["ticket"][0], "t1");
        assert_eq!(json["phoneNumber"], "555");
    }

    #[test]
    fn partial_payload_parses_with_defaults() {
        let payload: TrainPayload = serde_json::from_str(r#"{"name": "Express"}"#).unwrap();
        assert_eq!(payload.name, "Express");
        assert!(payload.operator.is_empty());
        assert_eq!(payload.available_seats, 0);
    }

    #[test]
    fn blank_user_payload_is_empty() {
        let payload = UserPayload {
            name: "  ".into(),
            ..Default::default()
        };
        assert!(payload.is_empty());
    }
}

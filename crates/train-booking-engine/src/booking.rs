//! The request handler tying the four components together

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info};
use train_booking_core::{
    CancelTicket, Operator, OperatorPayload, Principal, Request, RequestHandler, RequestKind,
    Result, Ticket, TicketInfo, TicketPayload, Train, TrainPayload, User, UserPayload,
};

use crate::database::Database;
use crate::storage::Storage;
use crate::{operators, tickets, trains, users};

/// A request handler executing booking operations one at a time
///
/// Every operation runs to completion under a single lock, so no operation
/// ever observes the partial state of another.
pub struct Booking(Mutex<Database>);

impl Booking {
    /// Create a booking system on top of `storage`
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self(Mutex::new(Database::new(storage)))
    }

    /// Register an operator owned by `caller`
    pub fn add_operator(&self, caller: &Principal, payload: OperatorPayload) -> Result<Operator> {
        operators::add_operator(&self.0.lock(), caller, payload)
    }

    /// Look up an operator by name
    pub fn get_operator(&self, name: &str) -> Result<Operator> {
        operators::get_operator(&self.0.lock(), name)
    }

    /// List all operators
    pub fn get_operators(&self) -> Result<Vec<Operator>> {
        operators::get_operators(&self.0.lock())
    }

    /// Add a train run by one of `caller`'s operators
    pub fn add_train(&self, caller: &Principal, payload: TrainPayload) -> Result<Train> {
        trains::add_train(&self.0.lock(), caller, payload)
    }

    /// Look up a train by id
    pub fn get_train(&self, id: &str) -> Result<Train> {
        trains::get_train(&self.0.lock(), id)
    }

    /// List all trains
    pub fn get_trains(&self) -> Result<Vec<Train>> {
        trains::get_trains(&self.0.lock())
    }

    /// Book seats on a train that has not departed yet
    pub fn create_ticket(&self, payload: TicketPayload) -> Result<TicketInfo> {
        tickets::create_ticket(&self.0.lock(), payload, Utc::now())
    }

    /// List all tickets
    pub fn get_tickets(&self) -> Result<Vec<Ticket>> {
        tickets::get_tickets(&self.0.lock())
    }

    /// Join a ticket with its train and user
    pub fn get_ticket_info(&self, id: &str) -> Result<TicketInfo> {
        tickets::get_ticket_info(&self.0.lock(), id)
    }

    /// Cancel a ticket and release its seats
    pub fn cancel_ticket(&self, payload: CancelTicket) -> Result<CancelTicket> {
        tickets::cancel_ticket(&self.0.lock(), payload)
    }

    /// Register a user
    pub fn add_user(&self, payload: UserPayload) -> Result<User> {
        users::add_user(&self.0.lock(), payload)
    }

    /// Look up a user by id; `None` if absent
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        users::get_user(&self.0.lock(), id)
    }

    /// List all users
    pub fn get_users(&self) -> Result<Vec<User>> {
        users::get_users(&self.0.lock())
    }
}

impl RequestHandler for Booking {
    fn handle(&self, mut rq: Request) {
        let kind = *rq.kind();
        debug!(?kind, caller = %rq.caller(), key = ?rq.key(), "handling request");

        match kind {
            RequestKind::AddOperator => {
                let caller = rq.caller().clone();
                let result = rq
                    .read_json()
                    .and_then(|payload| self.add_operator(&caller, payload));
                rq.respond(result);
            }
            RequestKind::GetOperators => rq.respond(self.get_operators()),
            RequestKind::GetOperator => {
                let result = rq.require_key().and_then(|name| self.get_operator(name));
                rq.respond(result);
            }

            RequestKind::AddTrain => {
                let caller = rq.caller().clone();
                let result = rq
                    .read_json()
                    .and_then(|payload| self.add_train(&caller, payload));
                rq.respond(result);
            }
            RequestKind::GetTrains => rq.respond(self.get_trains()),
            RequestKind::GetTrain => {
                let result = rq.require_key().and_then(|id| self.get_train(id));
                rq.respond(result);
            }

            RequestKind::CreateTicket => {
                let result = rq.read_json().and_then(|payload| self.create_ticket(payload));
                rq.respond(result);
            }
            RequestKind::GetTickets => rq.respond(self.get_tickets()),
            RequestKind::GetTicketInfo => {
                let result = rq.require_key().and_then(|id| self.get_ticket_info(id));
                rq.respond(result);
            }
            RequestKind::CancelTicket => {
                let result = rq.read_json().and_then(|payload| self.cancel_ticket(payload));
                rq.respond(result);
            }

            RequestKind::AddUser => {
                let result = rq.read_json().and_then(|payload| self.add_user(payload));
                rq.respond(result);
            }
            RequestKind::GetUsers => rq.respond(self.get_users()),
            RequestKind::GetUser => {
                let result = rq.require_key().and_then(|id| self.get_user(id));
                rq.respond(result);
            }
        }
    }

    fn shutdown(self) {
        // Dropping the storage closes the database file
        drop(self.0.into_inner());
        info!("booking system shut down");
    }
}

use std::io;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Error, Principal};

/// Kind of the request
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(u8)]
pub enum RequestKind {
    /// Register an operator under the caller's principal
    AddOperator,
    /// List all operators
    GetOperators,
    /// Look up one operator by name
    ///
    /// 📌 Hint: The name is the request key.
    GetOperator,

    /// Add a train run by an operator of the caller
    AddTrain,
    /// List all trains
    GetTrains,
    /// Look up one train by id
    ///
    /// 📌 Hint: The id is the request key.
    GetTrain,

    /// Book seats on a train for a user
    CreateTicket,
    /// List all tickets
    GetTickets,
    /// Look up the joined view of a ticket by id
    ///
    /// 📌 Hint: The id is the request key.
    GetTicketInfo,
    /// Cancel a ticket and release its seats
    CancelTicket,

    /// Register a user
    AddUser,
    /// List all users
    GetUsers,
    /// Look up one user by id, answering `null` if absent
    ///
    /// 📌 Hint: The id is the request key.
    GetUser,
}

impl RequestKind {
    /// All request kinds
    pub const ALL: [RequestKind; 13] = [
        RequestKind::AddOperator,
        RequestKind::GetOperators,
        RequestKind::GetOperator,
        RequestKind::AddTrain,
        RequestKind::GetTrains,
        RequestKind::GetTrain,
        RequestKind::CreateTicket,
        RequestKind::GetTickets,
        RequestKind::GetTicketInfo,
        RequestKind::CancelTicket,
        RequestKind::AddUser,
        RequestKind::GetUsers,
        RequestKind::GetUser,
    ];

    /// Whether the request addresses a single record through a key
    #[inline]
    pub fn takes_key(&self) -> bool {
        use RequestKind::*;
        matches!(self, GetOperator | GetTrain | GetTicketInfo | GetUser)
    }

    /// Method and path under which the request is served
    ///
    /// For requests taking a key, the key is appended as a last path segment.
    pub fn route(&self) -> (RequestMethod, &'static str) {
        use RequestKind::*;
        use RequestMethod::*;
        match self {
            AddOperator => (Post, "/api/operators"),
            GetOperators => (Get, "/api/operators"),
            GetOperator => (Get, "/api/operators/"),
            AddTrain => (Post, "/api/trains"),
            GetTrains => (Get, "/api/trains"),
            GetTrain => (Get, "/api/trains/"),
            CreateTicket => (Post, "/api/tickets"),
            GetTickets => (Get, "/api/tickets"),
            GetTicketInfo => (Get, "/api/tickets/"),
            CancelTicket => (Post, "/api/tickets/cancel"),
            AddUser => (Post, "/api/users"),
            GetUsers => (Get, "/api/users"),
            GetUser => (Get, "/api/users/"),
        }
    }
}

/// Request sent by a client
///
/// 📌 Hint: The booking engine primarily interacts with instances of this
/// class.
pub struct Request {
    kind: RequestKind,
    caller: Principal,
    key: Option<String>,
    raw: Box<dyn RawRequest + Send>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("kind", &self.kind)
            .field("caller", &self.caller)
            .field("key", &self.key)
            .field("raw", &format_args!(".."))
            .finish()
    }
}

/// HTTP request method
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum RequestMethod {
    /// GET request
    Get,
    /// POST request, may have a payload
    Post,
}

/// Interface for handling booking requests
pub trait RequestHandler {
    /// Handle a request from a client
    ///
    /// This method may be called concurrently from different threads.
    fn handle(&self, request: Request);

    /// Shut the booking system down
    ///
    /// Flushes and closes the storage backend.
    fn shutdown(self);
}

/// A raw request, implemented by the transport (HTTP server or test harness)
pub trait RawRequest {
    /// Read the request body
    fn read_bytes(&mut self) -> io::Result<Vec<u8>>;

    /// Respond with a JSON document
    fn respond_with_json(self: Box<Self>, json: String, caller: &Principal);
    /// Respond with a failed operation
    fn respond_with_err(self: Box<Self>, err: Error, caller: &Principal);
}

impl Request {
    /// Get the request's kind
    #[inline]
    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }

    /// Get the identity of the caller
    ///
    /// If the transport did not identify the caller, this is
    /// [`Principal::anonymous()`].
    #[inline]
    pub fn caller(&self) -> &Principal {
        &self.caller
    }

    /// Get the key addressed by the request (an id or operator name)
    #[inline]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Get the key addressed by the request, or fail with
    /// [`Error::InvalidArgument`]
    pub fn require_key(&self) -> Result<&str, Error> {
        match self.key() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(Error::InvalidArgument(format!(
                "{:?} requires a key",
                self.kind
            ))),
        }
    }

    /// Read the request body and parse it as JSON
    ///
    /// A body that cannot be read or parsed yields
    /// [`Error::InvalidArgument`]; an empty body is treated as `{}`.
    ///
    /// 📌 Hint: This method has side effects and should be called only once per
    /// request.
    pub fn read_json<T: DeserializeOwned>(&mut self) -> Result<T, Error> {
        let body = self
            .raw
            .read_bytes()
            .map_err(|e| Error::InvalidArgument(format!("unreadable payload: {e}")))?;
        let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &body
        };
        serde_json::from_slice(body)
            .map_err(|e| Error::InvalidArgument(format!("invalid payload: {e}")))
    }

    /// Respond with the JSON encoding of `value`
    ///
    /// This method blocks until the response has been sent.
    pub fn respond_with_value<T: Serialize>(self, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.raw.respond_with_json(json, &self.caller),
            Err(e) => self
                .raw
                .respond_with_err(Error::Storage(format!("encoding failed: {e}")), &self.caller),
        }
    }

    /// Respond with an error
    ///
    /// This method blocks until the response has been sent.
    #[inline]
    pub fn respond_with_err(self, err: Error) {
        self.raw.respond_with_err(err, &self.caller);
    }

    /// Respond with the outcome of an operation
    #[inline]
    pub fn respond<T: Serialize>(self, result: Result<T, Error>) {
        match result {
            Ok(value) => self.respond_with_value(&value),
            Err(err) => self.respond_with_err(err),
        }
    }

    /// Create a new request from a [`RawRequest`]
    ///
    /// 📌 Hint: Normally, there should not be a need to use this function
    /// (unless you create your own transport or testing infrastructure).
    #[inline]
    pub fn from_raw(
        kind: RequestKind,
        caller: Principal,
        key: Option<String>,
        raw: Box<dyn RawRequest + Send>,
    ) -> Self {
        Self {
            kind,
            caller,
            key,
            raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::UserPayload;

    struct FakeRequest {
        body: Vec<u8>,
        replies: mpsc::Sender<Result<String, Error>>,
    }

    impl RawRequest for FakeRequest {
        fn read_bytes(&mut self) -> io::Result<Vec<u8>> {
            Ok(std::mem::take(&mut self.body))
        }

        fn respond_with_json(self: Box<Self>, json: String, _caller: &Principal) {
            self.replies.send(Ok(json)).unwrap();
        }

        fn respond_with_err(self: Box<Self>, err: Error, _caller: &Principal) {
            self.replies.send(Err(err)).unwrap();
        }
    }

    fn request(body: &[u8]) -> (Request, mpsc::Receiver<Result<String, Error>>) {
        let (replies, receiver) = mpsc::channel();
        let raw = Box::new(FakeRequest {
            body: body.to_vec(),
            replies,
        });
        let rq = Request::from_raw(RequestKind::AddUser, Principal::anonymous(), None, raw);
        (rq, receiver)
    }

    #[test]
    fn read_json_parses_body() {
        let (mut rq, _) = request(br#"{"name": "Alice", "email": "a@example.com"}"#);
        let payload: UserPayload = rq.read_json().unwrap();
        assert_eq!(payload.name, "Alice");
        assert_eq!(payload.phone_number, "");

        let (mut rq, _) = request(b" \r\n");
        let payload: UserPayload = rq.read_json().unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn bad_bodies_are_invalid_arguments() {
        let bodies: [&[u8]; 3] = [b"{\"name\": ", b"\xff\xfe{}", b"42"];
        for body in bodies {
            let (mut rq, _) = request(body);
            let result = rq.read_json::<UserPayload>();
            assert!(matches!(result, Err(Error::InvalidArgument(_))), "{body:?}");
        }
    }

    #[test]
    fn respond_routes_outcome() {
        let (rq, replies) = request(b"");
        rq.respond(Ok(vec![1, 2]));
        assert_eq!(replies.recv().unwrap().unwrap(), "[1,2]");

        let (rq, replies) = request(b"");
        rq.respond::<()>(Err(Error::NotFound("gone".into())));
        assert!(matches!(replies.recv().unwrap(), Err(Error::NotFound(_))));
    }
}

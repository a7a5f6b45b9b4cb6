use std::sync::Arc;

use eyre::Result;
use flume::Sender;
use nanorand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::oneshot;
use train_booking_core::{
    CancelTicket, Error, Operator, OperatorPayload, Principal, RequestKind, Ticket, TicketInfo,
    TicketPayload, Train, TrainPayload, User, UserPayload,
};

pub mod mock;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self.0, Error::NotFound(_))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.0, Error::InvalidArgument(_))
    }

    pub fn is_invalid_payload(&self) -> bool {
        matches!(self.0, Error::InvalidPayload(_))
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug)]
enum Response {
    Json { body: String, caller: Principal },
    Error { err: Error, caller: Principal },
}

impl Response {
    fn into_api_response<T: DeserializeOwned>(self) -> Result<ApiResponse<T>> {
        Ok(match self {
            Response::Json { body, caller } => ApiResponse {
                caller,
                result: Ok(serde_json::from_str(&body)?),
            },
            Response::Error { err, caller } => ApiResponse {
                caller,
                result: Err(ApiError(err)),
            },
        })
    }
}

struct RequestMsg {
    kind: RequestKind,
    key: Option<String>,
    payload: Option<String>,
    caller: Principal,
    response_channel: oneshot::Sender<Response>,
}

pub struct Api {
    /// One channel per worker thread
    channels: Arc<Vec<Sender<RequestMsg>>>,

    my_channel: Sender<RequestMsg>,
    my_index: usize,
}

impl Api {
    fn new(channels: Vec<Sender<RequestMsg>>) -> Self {
        let my_channel = channels[0].clone();
        Self {
            channels: Arc::new(channels),
            my_channel,
            my_index: 0,
        }
    }
}

impl Clone for Api {
    fn clone(&self) -> Self {
        let my_index = (self.my_index + 1) % self.channels.len();
        Self {
            channels: self.channels.clone(),
            my_channel: self.channels[my_index].clone(),
            my_index,
        }
    }
}

const NO_REQUEST_OPTIONS: RequestOptions = RequestOptions { caller: None };

impl Api {
    async fn make_request(
        &self,
        kind: RequestKind,
        key: Option<String>,
        payload: Option<String>,
        options: &RequestOptions,
    ) -> Result<Response> {
        let (sender, receiver) = oneshot::channel();
        let msg = RequestMsg {
            kind,
            key,
            payload,
            caller: options.caller.clone().unwrap_or_default(),
            response_channel: sender,
        };
        self.my_channel.send_async(msg).await?;
        Ok(receiver.await?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        kind: RequestKind,
        key: Option<&str>,
    ) -> Result<ApiResponse<T>> {
        let key = key.map(str::to_owned);
        self.make_request(kind, key, None, &NO_REQUEST_OPTIONS)
            .await?
            .into_api_response()
    }

    async fn post<P: Serialize, T: DeserializeOwned>(
        &self,
        kind: RequestKind,
        payload: &P,
        options: &RequestOptions,
    ) -> Result<ApiResponse<T>> {
        let payload = serde_json::to_string(payload)?;
        self.post_raw(kind, payload, options).await
    }

    /// Send `body` verbatim, e.g. to test malformed payloads
    pub async fn post_raw<T: DeserializeOwned>(
        &self,
        kind: RequestKind,
        body: impl Into<String>,
        options: &RequestOptions,
    ) -> Result<ApiResponse<T>> {
        self.make_request(kind, None, Some(body.into()), options)
            .await?
            .into_api_response()
    }

    pub async fn add_operator(
        &self,
        payload: &OperatorPayload,
        options: &RequestOptions,
    ) -> Result<ApiResponse<Operator>> {
        self.post(RequestKind::AddOperator, payload, options).await
    }

    pub async fn get_operators(&self) -> Result<ApiResponse<Vec<Operator>>> {
        self.get(RequestKind::GetOperators, None).await
    }

    pub async fn get_operator(&self, name: &str) -> Result<ApiResponse<Operator>> {
        self.get(RequestKind::GetOperator, Some(name)).await
    }

    pub async fn add_train(
        &self,
        payload: &TrainPayload,
        options: &RequestOptions,
    ) -> Result<ApiResponse<Train>> {
        self.post(RequestKind::AddTrain, payload, options).await
    }

    pub async fn get_trains(&self) -> Result<ApiResponse<Vec<Train>>> {
        self.get(RequestKind::GetTrains, None).await
    }

    pub async fn get_train(&self, id: &str) -> Result<ApiResponse<Train>> {
        self.get(RequestKind::GetTrain, Some(id)).await
    }

    pub async fn create_ticket(&self, payload: &TicketPayload) -> Result<ApiResponse<TicketInfo>> {
        self.post(RequestKind::CreateTicket, payload, &NO_REQUEST_OPTIONS)
            .await
    }

    pub async fn get_tickets(&self) -> Result<ApiResponse<Vec<Ticket>>> {
        self.get(RequestKind::GetTickets, None).await
    }

    pub async fn get_ticket_info(&self, id: &str) -> Result<ApiResponse<TicketInfo>> {
        self.get(RequestKind::GetTicketInfo, Some(id)).await
    }

    pub async fn cancel_ticket(&self, payload: &CancelTicket) -> Result<ApiResponse<CancelTicket>> {
        self.post(RequestKind::CancelTicket, payload, &NO_REQUEST_OPTIONS)
            .await
    }

    pub async fn add_user(&self, payload: &UserPayload) -> Result<ApiResponse<User>> {
        self.post(RequestKind::AddUser, payload, &NO_REQUEST_OPTIONS)
            .await
    }

    pub async fn get_users(&self) -> Result<ApiResponse<Vec<User>>> {
        self.get(RequestKind::GetUsers, None).await
    }

    pub async fn get_user(&self, id: &str) -> Result<ApiResponse<Option<User>>> {
        self.get(RequestKind::GetUser, Some(id)).await
    }

    /// Create a session for `caller`, or for a random principal
    pub fn create_operator_session(&self, caller: Option<Principal>) -> OperatorSession {
        let caller = caller.unwrap_or_else(random_principal);
        OperatorSession { api: self, caller }
    }
}

/// A principal in the textual shape hosts hand out, e.g. `h3k9q-2bd7x-...`
pub fn random_principal() -> Principal {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz234567";
    let mut rng = nanorand::tls_rng();
    let groups: Vec<String> = (0..5)
        .map(|_| {
            (0..5)
                .map(|_| ALPHABET[rng.generate_range(0..ALPHABET.len())] as char)
                .collect()
        })
        .collect();
    Principal::new(groups.join("-"))
}

pub struct ApiResponse<T> {
    /// Principal the request was made as
    pub caller: Principal,
    pub result: ApiResult<T>,
}

/// Requests made as one operator principal
pub struct OperatorSession<'a> {
    pub api: &'a Api,
    pub caller: Principal,
}

impl<'a> OperatorSession<'a> {
    fn request_options(&self) -> RequestOptions {
        RequestOptions {
            caller: Some(self.caller.clone()),
        }
    }

    pub async fn add_operator(&self, payload: &OperatorPayload) -> Result<ApiResponse<Operator>> {
        self.api
            .add_operator(payload, &self.request_options())
            .await
    }

    pub async fn add_train(&self, payload: &TrainPayload) -> Result<ApiResponse<Train>> {
        self.api.add_train(payload, &self.request_options()).await
    }
}

#[derive(Clone, Default)]
pub struct RequestOptions {
    pub caller: Option<Principal>,
}

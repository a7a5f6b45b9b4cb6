//! 🏗 HTTP request implementation

use std::io;
use std::io::Read;

use tiny_http::{Header, Method, Response};
use tracing::warn;
use train_booking_core::{Error, Principal, RequestKind};

const ROUTES: &str = "🦀 could not find the service you are looking for!

Valid requests are:
  POST /api/operators
  GET  /api/operators
  GET  /api/operators/{name}
  POST /api/trains
  GET  /api/trains
  GET  /api/trains/{id}
  POST /api/tickets
  GET  /api/tickets
  GET  /api/tickets/{id}
  POST /api/tickets/cancel
  POST /api/users
  GET  /api/users
  GET  /api/users/{id}";

struct HTTPRequest(tiny_http::Request);

impl train_booking_core::RawRequest for HTTPRequest {
    fn read_bytes(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.0.body_length().unwrap_or(0));
        self.0.as_reader().read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn respond_with_json(self: Box<Self>, json: String, caller: &Principal) {
        self.respond(Response::from_data(json.into_bytes()), caller)
    }

    fn respond_with_err(self: Box<Self>, err: Error, caller: &Principal) {
        let body = serde_json::to_string(&err).unwrap_or_else(|_| err.to_string());
        self.respond(
            Response::from_data(body.into_bytes()).with_status_code(status_code(&err)),
            caller,
        )
    }
}

impl HTTPRequest {
    /// Add HTTP headers (CORS, content type, X-Principal) to `res` and send it
    fn respond<R: Read>(self, mut res: Response<R>, caller: &Principal) {
        add_response_cors_headers(&mut res);
        add_header(&mut res, b"Content-Type", b"application/json");
        add_header(&mut res, b"X-Principal", caller.as_str().as_bytes());
        send(self.0, res);
    }
}

/// HTTP status code for a failed operation
pub fn status_code(err: &Error) -> u16 {
    match err {
        Error::NotFound(_) => 404,
        Error::InvalidArgument(_) => 400,
        Error::InvalidPayload(_) => 409,
        Error::Storage(_) => 500,
    }
}

/// Map a method and URL path to a request kind and the key it addresses
pub fn route(method: &Method, url: &str) -> Option<(RequestKind, Option<String>)> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let path = path.strip_suffix('/').unwrap_or(path);

    let exact = RequestKind::ALL.into_iter().find(|kind| {
        let (kind_method, kind_path) = kind.route();
        !kind.takes_key() && is_method(method, kind_method) && kind_path == path
    });
    if let Some(kind) = exact {
        return Some((kind, None));
    }

    RequestKind::ALL
        .into_iter()
        .filter(|kind| kind.takes_key())
        .find_map(|kind| {
            let (kind_method, prefix) = kind.route();
            if !is_method(method, kind_method) {
                return None;
            }
            let key = path.strip_prefix(prefix)?;
            if key.is_empty() || key.contains('/') {
                return None;
            }
            let key = urlencoding::decode(key).ok()?.into_owned();
            Some((kind, Some(key)))
        })
}

fn is_method(method: &Method, expected: train_booking_core::RequestMethod) -> bool {
    matches!(
        (method, expected),
        (Method::Get, train_booking_core::RequestMethod::Get)
            | (Method::Post, train_booking_core::RequestMethod::Post)
    )
}

/// Parse the given HTTP request
///
/// If [`None`] is returned, the request was already answered with a
/// corresponding error message.
pub fn parse(rq: tiny_http::Request) -> Option<train_booking_core::Request> {
    let (kind, key) = match (rq.method(), rq.url()) {
        (Method::Options, _) => {
            let mut res = Response::empty(204);
            add_response_cors_headers(&mut res);
            send(rq, res);
            return None;
        }
        (method @ (Method::Get | Method::Post), url) => match route(method, url) {
            Some(route) => route,
            None => {
                let mut res = Response::from_string(ROUTES).with_status_code(404);
                add_response_cors_headers(&mut res);
                send(rq, res);
                return None;
            }
        },
        _ => {
            let mut res = Response::empty(405);
            add_response_cors_headers(&mut res);
            send(rq, res);
            return None;
        }
    };

    let caller = rq
        .headers()
        .iter()
        .find(|hdr| hdr.field.equiv("x-principal"))
        .map(|hdr| hdr.value.as_str().trim())
        .filter(|text| !text.is_empty())
        .map(Principal::new)
        .unwrap_or_else(Principal::anonymous);

    Some(train_booking_core::Request::from_raw(
        kind,
        caller,
        key,
        Box::new(HTTPRequest(rq)),
    ))
}

fn send<R: Read>(rq: tiny_http::Request, res: Response<R>) {
    if let Err(e) = rq.respond(res) {
        warn!(error = %e, "HTTP response failed");
    }
}

fn add_header<R: Read>(res: &mut Response<R>, field: &[u8], value: &[u8]) {
    if let Ok(header) = Header::from_bytes(field, value) {
        res.add_header(header);
    }
}

/// Add CORS headers to `res`
fn add_response_cors_headers<R: Read>(res: &mut Response<R>) {
    add_header(res, b"Access-Control-Request-Method", b"*");
    add_header(res, b"Access-Control-Allow-Origin", b"*");
    add_header(res, b"Access-Control-Allow-Headers", b"*");
    add_header(res, b"Access-Control-Expose-Headers", b"*");
}

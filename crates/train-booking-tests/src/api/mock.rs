//! Mock transport driving the `train-booking-engine` crate directly

use std::sync::Arc;

use eyre::{eyre, Result};
use tokio::sync::oneshot;
use tokio::task::{self, JoinHandle};
use train_booking_core::{Error, Principal, RawRequest, Request, RequestHandler};
use train_booking_engine::Booking;

use super::{Api, RequestMsg, Response};

pub struct MockServer {
    booking: Arc<Booking>,
    join_handles: Vec<JoinHandle<()>>,
}

struct MockRawRequest {
    payload: Option<String>,
    response_channel: oneshot::Sender<Response>,
}

pub async fn start(workers: u16, config: train_booking_core::Config) -> Result<(MockServer, Api)> {
    let booking = Arc::new(
        task::spawn_blocking(move || train_booking_engine::launch(&config)).await??,
    );

    let it = (0..workers).map(|_| {
        let (sender, receiver) = flume::bounded::<RequestMsg>(65536);
        let booking = booking.clone();
        let handle = task::spawn_blocking(move || {
            let booking = &*booking;
            for msg in receiver.into_iter() {
                let raw = Box::new(MockRawRequest {
                    payload: msg.payload,
                    response_channel: msg.response_channel,
                });
                booking.handle(Request::from_raw(msg.kind, msg.caller, msg.key, raw))
            }
        });
        (sender, handle)
    });
    let (senders, join_handles) = it.unzip();

    let mock_server = MockServer {
        booking,
        join_handles,
    };
    Ok((mock_server, Api::new(senders)))
}

impl MockServer {
    pub async fn shutdown(self) -> Result<()> {
        for handle in self.join_handles {
            handle.await?;
        }
        let booking = Arc::into_inner(self.booking)
            .ok_or_else(|| eyre!("booking system is still referenced"))?;
        task::spawn_blocking(move || booking.shutdown()).await?;
        Ok(())
    }
}

impl RawRequest for MockRawRequest {
    fn read_bytes(&mut self) -> std::io::Result<Vec<u8>> {
        Ok(self.payload.take().unwrap_or_default().into_bytes())
    }

    fn respond_with_json(self: Box<Self>, body: String, caller: &Principal) {
        let response = Response::Json {
            body,
            caller: caller.clone(),
        };
        // The test may have given up on the response already
        let _ = self.response_channel.send(response);
    }

    fn respond_with_err(self: Box<Self>, err: Error, caller: &Principal) {
        let response = Response::Error {
            err,
            caller: caller.clone(),
        };
        let _ = self.response_channel.send(response);
    }
}

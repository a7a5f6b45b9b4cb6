use eyre::Result;
use futures::future::join_all;
use train_booking_core::{CancelTicket, TicketPayload};
use train_booking_tests::{Api, TestCtxBuilder};

mod util;

/// Clients spread round-robin over the worker threads
fn clients(api: &Api) -> impl Iterator<Item = Api> {
    std::iter::successors(Some(api.clone()), |prev| Some(prev.clone()))
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn concurrent_bookings_never_oversell() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?.with_workers(4).build().await?;

    let (session, operator) = util::register_operator(&ctx, "RushHour").await?;
    let train = util::add_train(&session, &operator.name, "Commuter", 25, util::FUTURE).await?;

    let mut users = Vec::new();
    for i in 0..20 {
        users.push(util::add_user(&ctx, &format!("Passenger{i}")).await?);
    }

    // Each client asks for two seats; at most twelve can succeed
    let requests = users.iter().zip(clients(&ctx.api)).map(|(user, api)| {
        let payload = TicketPayload {
            train_id: train.id.clone(),
            user_id: user.id.clone(),
            number_of_seats: 2,
        };
        async move { api.create_ticket(&payload).await }
    });

    let mut booked = 0;
    for response in join_all(requests).await {
        match response?.result {
            Ok(info) => {
                assert_eq!(info.number_of_seats, 2);
                booked += 1;
            }
            Err(err) => assert!(err.is_invalid_payload(), "Unexpected error: {err}."),
        }
    }
    assert_eq!(booked, 12);

    let train = ctx.api.get_train(&train.id).await?.result?;
    assert_eq!(train.booked_seats, 24);
    assert_eq!(train.available_seats, 1);
    assert_eq!(train.capacity(), 25);

    let tickets = ctx.api.get_tickets().await?.result?;
    assert_eq!(tickets.len(), 12);
    let seats: u64 = tickets.iter().map(|t| t.number_of_seats).sum();
    assert_eq!(seats, train.booked_seats);

    ctx.finish().await?;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn concurrent_cancellations_restore_capacity() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?.with_workers(4).build().await?;

    let (session, operator) = util::register_operator(&ctx, "RushHour").await?;
    let train = util::add_train(&session, &operator.name, "Shuttle", 30, util::FUTURE).await?;

    let mut bookings = Vec::new();
    for i in 0..10 {
        let user = util::add_user(&ctx, &format!("Rider{i}")).await?;
        let info = ctx
            .api
            .create_ticket(&TicketPayload {
                train_id: train.id.clone(),
                user_id: user.id.clone(),
                number_of_seats: 3,
            })
            .await?
            .result?;
        bookings.push((user.id, info.id));
    }
    assert_eq!(ctx.api.get_train(&train.id).await?.result?.available_seats, 0);

    let requests = bookings
        .into_iter()
        .zip(clients(&ctx.api))
        .map(|((user_id, ticket_id), api)| async move {
            api.cancel_ticket(&CancelTicket { ticket_id, user_id }).await
        });
    for response in join_all(requests).await {
        response?.result?;
    }

    let train = ctx.api.get_train(&train.id).await?.result?;
    assert_eq!(train.available_seats, 30);
    assert_eq!(train.booked_seats, 0);
    assert!(ctx.api.get_tickets().await?.result?.is_empty());

    ctx.finish().await?;
    Ok(())
}

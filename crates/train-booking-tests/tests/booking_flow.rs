use eyre::Result;
use train_booking_core::{CancelTicket, TicketPayload};
use train_booking_tests::TestCtxBuilder;

mod util;

#[tokio::test]
#[ntest::timeout(20_000)]
async fn book_and_cancel_restores_seats() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?.build().await?;

    let (session, operator) = util::register_operator(&ctx, "NorthRail").await?;
    let train = util::add_train(&session, &operator.name, "Express 1", 10, util::FUTURE).await?;
    let alice = util::add_user(&ctx, "Alice").await?;

    let info = ctx
        .api
        .create_ticket(&TicketPayload {
            train_id: train.id.clone(),
            user_id: alice.id.clone(),
            number_of_seats: 3,
        })
        .await?
        .result?;
    assert_eq!(info.number_of_seats, 3);
    assert_eq!(info.user_name, "Alice");
    assert_eq!(info.price, train.price);

    let booked = ctx.api.get_train(&train.id).await?.result?;
    assert_eq!(booked.available_seats, 7);
    assert_eq!(booked.booked_seats, 3);

    let user = ctx.api.get_user(&alice.id).await?.result?.expect("user exists");
    assert_eq!(user.tickets, vec![info.id.clone()]);

    let cancelled = ctx
        .api
        .cancel_ticket(&CancelTicket {
            ticket_id: info.id.clone(),
            user_id: alice.id.clone(),
        })
        .await?
        .result?;
    assert_eq!(cancelled.ticket_id, info.id);

    let restored = ctx.api.get_train(&train.id).await?.result?;
    assert_eq!(restored.available_seats, 10);
    assert_eq!(restored.booked_seats, 0);

    let err = ctx.api.get_ticket_info(&info.id).await?.result.unwrap_err();
    assert!(err.is_not_found(), "A cancelled ticket must be gone, got {err}.");

    let user = ctx.api.get_user(&alice.id).await?.result?.expect("user exists");
    assert!(user.tickets.is_empty());
    assert!(ctx.api.get_tickets().await?.result?.is_empty());

    ctx.finish().await?;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn ticket_info_matches_records() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?.build().await?;

    let (session, operator) = util::register_operator(&ctx, "Coastline").await?;
    let train = util::add_train(&session, &operator.name, "Sea Breeze", 50, util::FUTURE).await?;
    let bob = util::add_user(&ctx, "Bob").await?;

    let mut ids = Vec::new();
    for seats in [1, 2, 4] {
        let info = ctx
            .api
            .create_ticket(&TicketPayload {
                train_id: train.id.clone(),
                user_id: bob.id.clone(),
                number_of_seats: seats,
            })
            .await?
            .result?;
        ids.push(info.id);
    }

    for id in &ids {
        let info = ctx.api.get_ticket_info(id).await?.result?;
        assert_eq!(&info.id, id);
        assert_eq!(info.train_id, train.id);
        assert_eq!(info.user_id, bob.id);
        assert_eq!(info.departure_time, train.departure_time);
        assert_eq!(info.arrival_time, train.arrival_time);
        assert_eq!(info.time_taken, train.time_taken);
        assert_eq!(info.user_phone_number, bob.phone_number);
    }

    let user = ctx.api.get_user(&bob.id).await?.result?.expect("user exists");
    assert_eq!(user.tickets, ids, "Each booking must be listed exactly once.");

    let booked = ctx.api.get_train(&train.id).await?.result?;
    assert_eq!(booked.booked_seats, 7);
    assert_eq!(booked.available_seats, 43);
    assert_eq!(ctx.api.get_tickets().await?.result?.len(), 3);

    ctx.finish().await?;
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn listings_contain_created_records() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?.build().await?;

    let (north, north_op) = util::register_operator(&ctx, "NorthRail").await?;
    let (south, south_op) = util::register_operator(&ctx, "SouthLine").await?;
    util::add_train(&north, &north_op.name, "Highlander", 20, util::FUTURE).await?;
    util::add_train(&south, &south_op.name, "Riviera", 30, util::FUTURE).await?;
    util::add_user(&ctx, "Carol").await?;

    let mut operators: Vec<_> = ctx
        .api
        .get_operators()
        .await?
        .result?
        .into_iter()
        .map(|op| op.name)
        .collect();
    operators.sort();
    assert_eq!(operators, ["NorthRail", "SouthLine"]);

    let fetched = ctx.api.get_operator("SouthLine").await?.result?;
    assert_eq!(fetched.principal, south.caller);

    let trains = ctx.api.get_trains().await?.result?;
    assert_eq!(trains.len(), 2);
    assert!(trains.iter().any(|t| t.name == "Riviera" && t.operator == "SouthLine"));
    assert_eq!(ctx.api.get_users().await?.result?.len(), 1);

    ctx.finish().await?;
    Ok(())
}

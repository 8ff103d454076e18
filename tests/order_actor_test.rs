use order_commander::model::{
    MessageState, Notice, OrderCreate, OrderId, PaymentState, SiteNotice, Stage, User,
};
use order_commander::order_actor::{Gate, OrderError};
use order_commander::services::TransactionId;

fn params() -> OrderCreate {
    OrderCreate {
        user: User::new("Jim", "ABCD"),
        item: "book".into(),
        price: 10.0,
    }
}

/// Racing settlements against the real actor: exactly one wins.
#[tokio::test]
async fn test_concurrent_settlements_commit_once() {
    let (actor, client) = order_commander::order_actor::new(32);
    let handle = tokio::spawn(actor.run());

    let id = client.create_order(params()).await.unwrap();
    assert_eq!(id, OrderId(1));

    let mut tasks = Vec::new();
    for i in 0..10 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            let outcome = if i % 2 == 0 {
                PaymentState::Done
            } else {
                PaymentState::NotDone
            };
            client
                .settle_payment(id, outcome, Some(TransactionId(format!("pay_{i}"))))
                .await
                .unwrap()
        }));
    }

    let mut committed = 0;
    for task in tasks {
        if task.await.unwrap() {
            committed += 1;
        }
    }
    assert_eq!(committed, 1);

    let order = client.snapshot(id).await.unwrap();
    assert!(order.payment.is_settled());
    assert!(order.payment_transaction.is_some());

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_begin_admits_one_claimant() {
    let (actor, client) = order_commander::order_actor::new(32);
    tokio::spawn(actor.run());
    let id = client.create_order(params()).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            client
                .begin(id, Stage::Message(Notice::PaymentTrying))
                .await
                .unwrap()
        }));
    }

    let mut open = 0;
    for task in tasks {
        match task.await.unwrap() {
            Gate::Open => open += 1,
            Gate::InFlight => {}
            Gate::Settled => panic!("stage should still be pending"),
        }
    }
    assert_eq!(open, 1);

    assert!(client
        .record_notice(id, Notice::PaymentTrying)
        .await
        .unwrap());
    assert_eq!(
        client
            .begin(id, Stage::Message(Notice::PaymentTrying))
            .await
            .unwrap(),
        Gate::Settled
    );
    assert_eq!(
        client.snapshot(id).await.unwrap().message,
        MessageState::PaymentTrying
    );
}

#[tokio::test]
async fn test_invalid_order_rejected_with_domain_error() {
    let (actor, client) = order_commander::order_actor::new(8);
    tokio::spawn(actor.run());

    let mut invalid = params();
    invalid.price = -1.0;
    let result = client.create_order(invalid).await;
    assert!(
        matches!(result, Err(OrderError::InvalidOrder(_))),
        "unexpected: {result:?}"
    );

    // The rejected order did not consume an ID.
    let id = client.create_order(params()).await.unwrap();
    assert_eq!(id, OrderId(1));
}

#[tokio::test]
async fn test_missing_order_is_not_found() {
    let (actor, client) = order_commander::order_actor::new(8);
    tokio::spawn(actor.run());

    assert!(client.get(OrderId(42)).await.unwrap().is_none());
    assert!(matches!(
        client.mark_escalated(OrderId(42)).await,
        Err(OrderError::NotFound(_))
    ));
    assert!(matches!(
        client.snapshot(OrderId(42)).await,
        Err(OrderError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_first_site_notice_wins() {
    let (actor, client) = order_commander::order_actor::new(8);
    tokio::spawn(actor.run());
    let id = client.create_order(params()).await.unwrap();

    assert!(client
        .show_site_notice(id, SiteNotice::PaymentPending)
        .await
        .unwrap());
    assert!(!client
        .show_site_notice(id, SiteNotice::PaymentSucceeded)
        .await
        .unwrap());
    assert_eq!(
        client.snapshot(id).await.unwrap().site_notice,
        Some(SiteNotice::PaymentPending)
    );
}

#[tokio::test]
async fn test_actor_stops_when_clients_dropped() {
    let (actor, client) = order_commander::order_actor::new(8);
    let handle = tokio::spawn(actor.run());

    let other = client.clone();
    drop(client);
    other.create_order(params()).await.unwrap();
    drop(other);

    handle.await.unwrap();
}

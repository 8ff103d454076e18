//! End-to-end scenarios against the simulated services.
//!
//! Every test runs with the Tokio clock paused, so retry delays, deadlines and the drain
//! interval elapse instantly once all tasks are idle. `settle` jumps far past every deadline,
//! after which the record and the capability logs are final.

use order_commander::commander::{Commander, CommanderError};
use order_commander::config::{CommanderConfig, ConfigError};
use order_commander::lifecycle::CommanderSystem;
use order_commander::model::{
    DeferredTask, MessageState, Notice, OrderCreate, OrderId, PaymentState, SiteNotice, Stage,
    User,
};
use order_commander::services::simulated::SimulatedServices;
use order_commander::services::{ServiceError, ServiceKind, TransactionId};
use std::time::Duration;

fn start() -> (SimulatedServices, CommanderSystem) {
    let sim = SimulatedServices::new();
    let system = CommanderSystem::start(CommanderConfig::default(), sim.services()).unwrap();
    (sim, system)
}

fn book_order() -> OrderCreate {
    OrderCreate {
        user: User::new("Jim", "ABCD"),
        item: "book".into(),
        price: 10.0,
    }
}

fn unavailable(kind: ServiceKind, times: usize) -> Vec<ServiceError> {
    vec![ServiceError::Unavailable(kind); times]
}

/// Lets every background task run to completion.
async fn settle() {
    tokio::time::sleep(Duration::from_secs(600)).await;
}

async fn place(commander: &Commander) -> OrderId {
    commander.place_order(book_order()).await.unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_all_services_up() {
    let (sim, system) = start();
    let commander = &system.commander;

    let id = place(commander).await;
    settle().await;

    let order = commander.order(id).await.unwrap();
    assert_eq!(order.payment, PaymentState::Done);
    assert_eq!(order.message, MessageState::PaymentSucceeded);
    assert!(!order.escalated);
    assert_eq!(order.site_notice, Some(SiteNotice::PaymentSucceeded));
    assert_eq!(order.shipping_transaction, Some(TransactionId("ship_1".into())));
    assert_eq!(order.payment_transaction, Some(TransactionId("pay_1".into())));

    assert_eq!(sim.notices_for(id).await, vec![Notice::PaymentSucceeded]);
    assert_eq!(commander.queue().stats().await.unwrap().enqueued, 0);

    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_payment_recovers_within_retries() {
    let (sim, system) = start();
    sim.payment_faults
        .extend(unavailable(ServiceKind::Payment, 2))
        .await;

    let id = place(&system.commander).await;
    settle().await;

    let order = system.commander.order(id).await.unwrap();
    assert_eq!(order.payment, PaymentState::Done);
    assert_eq!(sim.notices_for(id).await, vec![Notice::PaymentSucceeded]);
    assert_eq!(sim.payment.call_count().await, 1);
    assert_eq!(system.commander.queue().stats().await.unwrap().enqueued, 0);

    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_payment_unavailable_until_deadline() {
    let (sim, system) = start();
    sim.payment_faults
        .extend(unavailable(ServiceKind::Payment, 12))
        .await;

    let id = place(&system.commander).await;
    settle().await;

    let order = system.commander.order(id).await.unwrap();
    assert_eq!(order.payment, PaymentState::NotDone);
    assert_eq!(order.message, MessageState::PaymentFailed);
    assert_eq!(order.site_notice, Some(SiteNotice::PaymentPending));
    assert_eq!(
        sim.notices_for(id).await,
        vec![Notice::PaymentTrying, Notice::PaymentFailed]
    );
    assert_eq!(sim.payment.call_count().await, 0);

    let stats = system.commander.queue().stats().await.unwrap();
    assert_eq!(stats.enqueued, 1);
    assert_eq!(stats.expired, 1);
    assert_eq!(stats.resolved, 0);
    assert_eq!(stats.len, 0);

    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_expired_payment_task_is_not_replayed() {
    let sim = SimulatedServices::new();
    let mut config = CommanderConfig::default();
    config.retry.delay_ms = 0;
    config.deadlines.queue_task_ms = 3_000;
    config.deadlines.payment_ms = 30_000;
    let system = CommanderSystem::start(config, sim.services()).unwrap();
    sim.payment_faults
        .extend(unavailable(ServiceKind::Payment, 1_000))
        .await;

    let id = place(&system.commander).await;
    settle().await;

    // One initial run plus the replays inside the task's window, three attempts each.
    let used = 1_000 - sim.payment_faults.remaining().await;
    assert!(used <= 15, "payment attempts: {used}");

    let stats = system.commander.queue().stats().await.unwrap();
    assert_eq!(stats.enqueued, 1);
    assert_eq!(stats.expired, 1);
    assert_eq!(stats.len, 0);

    let order = system.commander.order(id).await.unwrap();
    assert_eq!(order.payment, PaymentState::Trying);
    assert_eq!(sim.payment.call_count().await, 0);

    settle().await;
    assert_eq!(1_000 - sim.payment_faults.remaining().await, used);

    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_item_unavailable_escalates_without_payment() {
    let (sim, system) = start();
    sim.shipping_faults
        .push(ServiceError::ItemUnavailable("book".into()))
        .await;

    let id = place(&system.commander).await;
    settle().await;

    let order = system.commander.order(id).await.unwrap();
    assert!(order.escalated);
    assert_eq!(order.payment, PaymentState::Trying);
    assert_eq!(order.site_notice, Some(SiteNotice::ItemUnavailable));
    assert_eq!(sim.payment.call_count().await, 0);
    assert_eq!(sim.employee_handle.call_count().await, 1);
    assert!(sim.notices_for(id).await.is_empty());
    assert_eq!(system.commander.queue().stats().await.unwrap().enqueued, 0);

    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_messaging_down_past_its_deadline() {
    let (sim, system) = start();
    sim.messaging_faults
        .extend(unavailable(ServiceKind::Messaging, 30))
        .await;

    let id = place(&system.commander).await;
    settle().await;

    let order = system.commander.order(id).await.unwrap();
    assert_eq!(order.payment, PaymentState::Done);
    assert_eq!(order.message, MessageState::NoneSent);
    assert!(order.escalated);
    assert_eq!(sim.messaging.call_count().await, 0);
    assert_eq!(sim.employee_handle.call_count().await, 1);
    assert_eq!(system.commander.queue().len().await.unwrap(), 0);

    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_shipping_unavailable_is_returned_to_caller() {
    let (sim, system) = start();
    sim.shipping_faults
        .extend(unavailable(ServiceKind::Shipping, 3))
        .await;

    let err = system
        .commander
        .place_order(book_order())
        .await
        .unwrap_err();
    let CommanderError::ShippingUnavailable { order: id, source } = err else {
        panic!("expected ShippingUnavailable");
    };
    assert_eq!(source, ServiceError::Unavailable(ServiceKind::Shipping));

    settle().await;
    let order = system.commander.order(id).await.unwrap();
    assert_eq!(order.site_notice, Some(SiteNotice::OrderNotPlaced));
    assert_eq!(order.payment, PaymentState::Trying);
    assert!(!order.escalated);
    assert_eq!(sim.payment.call_count().await, 0);

    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_invalid_payment_details_convert_to_cash_on_delivery() {
    let (sim, system) = start();
    sim.payment_faults
        .push(ServiceError::PaymentDetailsInvalid)
        .await;

    let id = place(&system.commander).await;
    settle().await;

    let order = system.commander.order(id).await.unwrap();
    assert_eq!(order.payment, PaymentState::NotDone);
    assert_eq!(order.site_notice, Some(SiteNotice::ConvertedToCashOnDelivery));
    assert_eq!(sim.notices_for(id).await, vec![Notice::PaymentFailed]);
    assert_eq!(system.commander.queue().stats().await.unwrap().enqueued, 0);

    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_replaying_finished_stages_calls_nothing() {
    let (sim, system) = start();
    let commander = &system.commander;

    let id = place(commander).await;
    settle().await;
    assert_eq!(sim.payment.call_count().await, 1);
    assert_eq!(sim.messaging.call_count().await, 1);

    for stage in [
        Stage::Payment,
        Stage::Message(Notice::PaymentTrying),
        Stage::Message(Notice::PaymentFailed),
        Stage::Message(Notice::PaymentSucceeded),
        Stage::Payment,
    ] {
        commander.run_stage(id, stage).await.unwrap();
    }
    settle().await;

    assert_eq!(sim.payment.call_count().await, 1);
    assert_eq!(sim.messaging.call_count().await, 1);
    let order = commander.order(id).await.unwrap();
    assert_eq!(order.message, MessageState::PaymentSucceeded);

    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_satisfied_task_is_dequeued_without_calling() {
    let (sim, system) = start();
    let commander = &system.commander;

    let id = commander.orders().create_order(book_order()).await.unwrap();
    assert!(commander.orders().mark_escalated(id).await.unwrap());
    commander
        .queue()
        .push(DeferredTask::new(id, Stage::Escalation))
        .await
        .unwrap();

    commander.drain_queue();
    settle().await;

    let stats = commander.queue().stats().await.unwrap();
    assert_eq!(stats.resolved, 1);
    assert_eq!(stats.len, 0);
    assert_eq!(sim.employee_handle.call_count().await, 0);

    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stale_task_expires() {
    let (sim, system) = start();
    let commander = &system.commander;
    sim.employee_faults
        .extend(unavailable(ServiceKind::EmployeeHandle, 60))
        .await;

    let id = commander.orders().create_order(book_order()).await.unwrap();
    commander.update_queue(id, Stage::Escalation).await.unwrap();
    settle().await;

    let stats = commander.queue().stats().await.unwrap();
    assert!(stats.expired >= 1, "stats: {stats:?}");
    assert_eq!(stats.len, 0);
    assert_eq!(sim.employee_handle.call_count().await, 0);
    assert!(!commander.order(id).await.unwrap().escalated);

    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_failed_payment_queue_write_abandons_payment() {
    let (sim, system) = start();
    sim.payment_faults
        .extend(unavailable(ServiceKind::Payment, 3))
        .await;
    sim.queue_faults
        .extend(unavailable(ServiceKind::Queue, 3))
        .await;

    let id = place(&system.commander).await;
    settle().await;

    let order = system.commander.order(id).await.unwrap();
    assert_eq!(order.payment, PaymentState::NotDone);
    assert!(order.escalated);
    assert_eq!(
        sim.notices_for(id).await,
        vec![Notice::PaymentTrying, Notice::PaymentFailed]
    );
    assert_eq!(system.commander.queue().stats().await.unwrap().enqueued, 0);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_config_is_rejected_at_start() {
    let mut config = CommanderConfig::default();
    config.deadlines.payment_ms = config.deadlines.queue_ms;

    let result = CommanderSystem::start(config, SimulatedServices::new().services());
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[tokio::test]
async fn test_closed_commander_refuses_orders() {
    let (_sim, system) = start();
    system.commander.close();

    let result = system.commander.place_order(book_order()).await;
    assert!(matches!(result, Err(CommanderError::ShuttingDown)));

    system.shutdown().await.unwrap();
}

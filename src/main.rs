//! # Order Commander Demo
//!
//! Replays a handful of failure scenarios against the simulated services and prints the final
//! record of each order. Pass a TOML file to override the demo timings:
//!
//! ```bash
//! RUST_LOG=info cargo run -- commander.toml
//! ```

use order_commander::config::{CommanderConfig, DeadlineConfig, RetryConfig};
use order_commander::lifecycle::{setup_tracing, CommanderSystem};
use order_commander::model::{OrderCreate, User};
use order_commander::services::simulated::SimulatedServices;
use order_commander::services::{ServiceError, ServiceKind};
use tracing::{error, info, Instrument};

/// Same proportions as the defaults, scaled down to run in a few seconds.
fn demo_config() -> CommanderConfig {
    CommanderConfig {
        retry: RetryConfig {
            attempts: 3,
            delay_ms: 300,
        },
        deadlines: DeadlineConfig {
            queue_ms: 2_400,
            queue_task_ms: 600,
            payment_ms: 1_200,
            message_ms: 1_500,
            employee_ms: 2_400,
        },
        channel_capacity: 64,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => CommanderConfig::from_file(path).await?,
        None => demo_config(),
    };
    let settle = config.queue_time() + config.queue_task_time();

    let sim = SimulatedServices::new();
    let system = CommanderSystem::start(config, sim.services())?;
    let commander = system.commander.clone();

    let scenarios: Vec<(&str, Vec<(ServiceKind, ServiceError)>)> = vec![
        ("all services up", vec![]),
        (
            "payment recovers within retries",
            vec![
                (
                    ServiceKind::Payment,
                    ServiceError::Unavailable(ServiceKind::Payment),
                ),
                (
                    ServiceKind::Payment,
                    ServiceError::Unavailable(ServiceKind::Payment),
                ),
            ],
        ),
        (
            "payment details invalid",
            vec![(ServiceKind::Payment, ServiceError::PaymentDetailsInvalid)],
        ),
        (
            "item unavailable",
            vec![(
                ServiceKind::Shipping,
                ServiceError::ItemUnavailable("book".into()),
            )],
        ),
        (
            "shipping down",
            vec![
                (
                    ServiceKind::Shipping,
                    ServiceError::Unavailable(ServiceKind::Shipping)
                );
                3
            ],
        ),
        (
            "payment down until its deadline",
            vec![
                (
                    ServiceKind::Payment,
                    ServiceError::Unavailable(ServiceKind::Payment)
                );
                12
            ],
        ),
    ];

    let mut placed = Vec::new();
    for (name, faults) in scenarios {
        for (kind, fault) in faults {
            let injector = match kind {
                ServiceKind::Shipping => &sim.shipping_faults,
                ServiceKind::Payment => &sim.payment_faults,
                ServiceKind::Messaging => &sim.messaging_faults,
                ServiceKind::EmployeeHandle => &sim.employee_faults,
                ServiceKind::Queue => &sim.queue_faults,
            };
            injector.push(fault).await;
        }

        let params = OrderCreate {
            user: User::new("Jim", "ABCD"),
            item: "book".into(),
            price: 10.0,
        };
        let span = tracing::info_span!("scenario", scenario = name);
        match commander.place_order(params).instrument(span).await {
            Ok(id) => {
                info!(scenario = name, order = %id, "Order placed");
                placed.push((name, id));
            }
            Err(e) => error!(scenario = name, error = %e, "Order not placed"),
        }

        // Scenarios share fault lists; let each one consume its own before the next.
        tokio::time::sleep(settle).await;
    }

    for (name, id) in placed {
        let order = commander.order(id).await?;
        info!(
            scenario = name,
            order = %id,
            payment = ?order.payment,
            message = ?order.message,
            escalated = order.escalated,
            "Final state"
        );
    }
    let stats = commander.queue().stats().await?;
    info!(?stats, "Queue");

    drop(commander);
    system.shutdown().await?;
    Ok(())
}

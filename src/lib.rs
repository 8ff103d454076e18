//! # Order Commander
//!
//! > **Eventually consistent order placement over unreliable services.**
//!
//! Placing an order touches four independent services (shipping, payment, customer messaging
//! and a manual-handling desk) plus a durable queue. None of them share a transaction. This
//! crate drives an order through all of them and guarantees that each order either completes
//! or ends in a well-defined failure that a human is told about.
//!
//! ## 🏗️ Design
//!
//! ### Idempotent records behind an actor
//! Order records live in a generic [`ResourceActor`](framework::ResourceActor). Transitions
//! are synchronous and applied one at a time, so "check the record, then change it" is a
//! single step even when several stage tasks race on the same order. Payment moves out of
//! `Trying` once, a terminal customer message is final, escalation happens once.
//!
//! ### Retries, deadlines, deferral
//! Every remote call goes through the [`Retry`](retry::Retry) executor. A stage that still
//! fails becomes a deferred task as long as its deadline (measured from order creation) has
//! not passed. A background loop replays deferred tasks until they succeed or expire.
//!
//! ### One owner for the queue
//! The deferred-task queue is owned by its own actor ([`queue_actor`]), which keeps the item
//! counter and the stored tasks in step.
//!
//! ## 🗺️ Module Tour
//!
//! - [`framework`]: the generic record actor and its client.
//! - [`model`]: the order record, progress markers and deferred tasks.
//! - [`order_actor`]: the transitions an order accepts.
//! - [`queue_actor`]: the deferred-task queue.
//! - [`clients`]: typed handles for both actors.
//! - [`services`]: capability traits, fault injection and in-memory implementations.
//! - [`retry`]: bounded retry executor.
//! - [`commander`]: the stages, the queue writer and the drain loop.
//! - [`config`]: retry policy and deadlines, loadable from TOML.
//! - [`lifecycle`]: [`CommanderSystem`](lifecycle::CommanderSystem) startup/shutdown and tracing.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Replay the demo scenarios against simulated services
//! RUST_LOG=info cargo run
//!
//! cargo test
//! ```

pub mod clients;
pub mod commander;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod queue_actor;
pub mod retry;
pub mod services;

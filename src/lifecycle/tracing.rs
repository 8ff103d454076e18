//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing_subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden; every line carries structured fields instead.
//!
//! ```bash
//! RUST_LOG=info cargo run
//!
//! # Actor requests and guard decisions
//! RUST_LOG=debug cargo run
//! ```
//!
//! Stage work runs inside spans, so one order can be followed across tasks:
//!
//! ```text
//! INFO place_order: Shipping request accepted order=order_1 transaction=ship_1
//! WARN stage: Payment unavailable, deferring order=order_1 stage=payment error=payment service unavailable
//! INFO stage: Site notice order=order_1 notice=There was an error in payment. ...
//! INFO enqueue: Task queued order=order_1 kind=payment len=1
//! INFO drain:task: Task dequeued order=order_1 kind=payment reason=Resolved len=0
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

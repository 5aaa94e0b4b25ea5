//! Race orchestration: two retrying workers, one result cell, one deadline.
//!
//! A call to [`Handler::perform_operation`] moves through
//! `RUNNING -> {SUCCEEDED, FAILED, TIMED_OUT}` exactly once:
//!
//! - **Cell**: [`ResultCell`] is a claim-if-empty slot created per call. The
//!   first claim wins; later claims observe the winner.
//! - **Workers**: [`run_worker`] drives one backend path, sleeping on
//!   `RetryAfter`, bailing out on `Failure`, claiming the cell on `Success`.
//! - **Coordinator**: [`Handler`] spawns both workers on the shared
//!   [`WorkerPool`](crate::WorkerPool) and waits for the first of: a worker
//!   exit, the deadline, or cancellation. Losing workers are never aborted.
//!
//! # Example
//!
//! ```rust
//! use status_race::testing::{Script, ScriptedClient};
//! use status_race::{ApplicationStatus, BackendResponse, Handler, HandlerConfig};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let client = ScriptedClient::new(
//!     Script::new().respond(BackendResponse::Failure),
//!     Script::new()
//!         .respond_after(Duration::from_millis(50), BackendResponse::success("app1", "OK")),
//! );
//! let handler = Handler::new(client, HandlerConfig::new(2, Duration::from_secs(1))).unwrap();
//!
//! // An explicit backend failure beats a slower success.
//! assert_eq!(handler.perform_operation("app1").await, ApplicationStatus::failure(0));
//! # });
//! ```

mod cell;
mod coordinator;
mod worker;

pub use cell::{Claim, ResultCell};
pub use coordinator::{Handler, NO_RESULT_MESSAGE, POOL_EXHAUSTED_MESSAGE};
pub use worker::{run_worker, WorkerExit};

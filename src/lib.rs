//! # Status Race
//!
//! > *"Ask twice, believe the first"*
//!
//! Answers "what is the status of application X?" by querying two redundant
//! backend paths concurrently and returning whichever produces a usable answer
//! first, honouring per-call retry-after hints and an overall deadline.
//!
//! ## How a call plays out
//!
//! - Both paths are queried by their own worker. `RetryAfter` makes that worker
//!   sleep and try again; `Success` claims the per-call [`ResultCell`];
//!   `Failure` ends the whole operation.
//! - The first committed outcome, the first unrecoverable failure or the
//!   deadline, whichever comes first, decides the [`ApplicationStatus`].
//! - Losing workers are never aborted. They finish their current call or
//!   backoff, see the decided cell and exit.
//!
//! ## Quick Example
//!
//! ```rust
//! use status_race::{ApplicationStatus, BackendResponse, Handler, HandlerConfig, StatusClient};
//! use std::time::Duration;
//!
//! struct StatusService;
//!
//! impl StatusClient for StatusService {
//!     async fn query_primary(&self, _id: &str) -> BackendResponse {
//!         BackendResponse::retry_after(Duration::from_secs(30))
//!     }
//!
//!     async fn query_secondary(&self, id: &str) -> BackendResponse {
//!         BackendResponse::success(id, "APPROVED")
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let config = HandlerConfig::new(8, Duration::from_secs(2));
//! let handler = Handler::new(StatusService, config).unwrap();
//!
//! match handler.perform_operation("app-42").await {
//!     ApplicationStatus::Success { application_status, .. } => {
//!         assert_eq!(application_status, "APPROVED");
//!     }
//!     ApplicationStatus::Failure { retry_count, .. } => {
//!         panic!("gave up after {} retries", retry_count);
//!     }
//! }
//! # });
//! ```
//!
//! For a runnable walkthrough, see `demos/race_patterns.rs`.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod blocking;
pub mod client;
pub mod config;
pub mod error;
pub mod pool;
pub mod race;
pub mod response;
pub mod testing;

// Re-exports
pub use blocking::BlockingHandler;
pub use client::{BackendPath, Blocking, BlockingStatusClient, StatusClient};
pub use config::{HandlerConfig, PoolExhaustion};
pub use error::{ConfigError, PoolExhausted};
pub use pool::WorkerPool;
pub use race::{Claim, Handler, ResultCell, WorkerExit};
pub use response::{ApplicationStatus, BackendResponse};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::blocking::BlockingHandler;
    pub use crate::client::{BackendPath, StatusClient};
    pub use crate::config::{HandlerConfig, PoolExhaustion};
    pub use crate::race::Handler;
    pub use crate::response::{ApplicationStatus, BackendResponse};
}

//! Testing utilities for code built on the status race.
//!
//! Provides a scripted in-memory backend, assertion macros for outcomes and,
//! behind the `proptest` feature, `Arbitrary` impls for the response types.
//!
//! # Examples
//!
//! ## ScriptedClient
//!
//! ```rust
//! use status_race::testing::{Script, ScriptedClient};
//! use status_race::{BackendPath, BackendResponse, StatusClient};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let client = ScriptedClient::new(
//!     Script::new()
//!         .retry_times(2, Duration::from_millis(1))
//!         .respond(BackendResponse::success("app1", "APPROVED")),
//!     Script::new().respond(BackendResponse::Failure),
//! );
//!
//! assert!(client.query_primary("app1").await.delay().is_some());
//! assert_eq!(client.calls(BackendPath::Primary), 1);
//! # });
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use status_race::{ApplicationStatus, assert_succeeded, assert_failed};
//!
//! assert_succeeded!(ApplicationStatus::success("app1", "APPROVED"), "app1", "APPROVED");
//! assert_failed!(ApplicationStatus::failure(3), 3);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::client::{BackendPath, StatusClient};
use crate::response::BackendResponse;

/// One scripted backend reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Simulated call latency.
    pub latency: Duration,
    /// What the call returns.
    pub response: BackendResponse,
}

/// An ordered list of replies for one backend path.
///
/// Replies are consumed front to back. Once only one is left it repeats
/// forever; an empty script always answers [`BackendResponse::Failure`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    steps: VecDeque<Step>,
}

impl Script {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an immediate reply.
    pub fn respond(self, response: BackendResponse) -> Self {
        self.respond_after(Duration::ZERO, response)
    }

    /// Append a reply that takes `latency` to arrive.
    pub fn respond_after(mut self, latency: Duration, response: BackendResponse) -> Self {
        self.steps.push_back(Step { latency, response });
        self
    }

    /// Append `times` immediate retry-after replies with the given delay.
    pub fn retry_times(mut self, times: usize, delay: Duration) -> Self {
        for _ in 0..times {
            self = self.respond(BackendResponse::retry_after(delay));
        }
        self
    }

    /// Number of scripted replies.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if nothing is scripted.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[derive(Debug)]
struct ScriptState {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicU32,
}

impl ScriptState {
    fn new(script: Script) -> Self {
        Self {
            steps: Mutex::new(script.steps),
            calls: AtomicU32::new(0),
        }
    }

    async fn next(&self) -> BackendResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut steps = self.steps.lock().unwrap_or_else(PoisonError::into_inner);
            if steps.len() > 1 {
                steps.pop_front()
            } else {
                steps.front().cloned()
            }
        };

        match step {
            Some(Step { latency, response }) => {
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
                response
            }
            None => BackendResponse::Failure,
        }
    }
}

/// An in-memory [`StatusClient`] that replays one [`Script`] per path.
///
/// Latency is simulated with `tokio::time::sleep`, so tests can run under a
/// paused clock.
#[derive(Debug)]
pub struct ScriptedClient {
    primary: ScriptState,
    secondary: ScriptState,
}

impl ScriptedClient {
    /// Create a client from one script per path.
    pub fn new(primary: Script, secondary: Script) -> Self {
        Self {
            primary: ScriptState::new(primary),
            secondary: ScriptState::new(secondary),
        }
    }

    /// Number of queries made on `path` so far.
    pub fn calls(&self, path: BackendPath) -> u32 {
        match path {
            BackendPath::Primary => self.primary.calls.load(Ordering::SeqCst),
            BackendPath::Secondary => self.secondary.calls.load(Ordering::SeqCst),
        }
    }
}

impl StatusClient for ScriptedClient {
    async fn query_primary(&self, _id: &str) -> BackendResponse {
        self.primary.next().await
    }

    async fn query_secondary(&self, _id: &str) -> BackendResponse {
        self.secondary.next().await
    }
}

/// Assert that an outcome is a success, optionally with a given id and status.
///
/// # Example
///
/// ```rust
/// use status_race::{ApplicationStatus, assert_succeeded};
///
/// let outcome = ApplicationStatus::success("app1", "APPROVED");
/// assert_succeeded!(outcome.clone());
/// assert_succeeded!(outcome, "app1", "APPROVED");
/// ```
#[macro_export]
macro_rules! assert_succeeded {
    ($outcome:expr) => {
        match $outcome {
            $crate::ApplicationStatus::Success { .. } => {}
            other => panic!("Expected Success, got {:?}", other),
        }
    };
    ($outcome:expr, $id:expr, $status:expr) => {
        match $outcome {
            $crate::ApplicationStatus::Success {
                application_id,
                application_status,
            } => {
                assert_eq!(application_id, $id);
                assert_eq!(application_status, $status);
            }
            other => panic!("Expected Success, got {:?}", other),
        }
    };
}

/// Assert that an outcome is a failure, optionally with a given retry count.
///
/// # Example
///
/// ```rust
/// use status_race::{ApplicationStatus, assert_failed};
///
/// assert_failed!(ApplicationStatus::timed_out());
/// assert_failed!(ApplicationStatus::failure(2), 2);
/// ```
#[macro_export]
macro_rules! assert_failed {
    ($outcome:expr) => {
        match $outcome {
            $crate::ApplicationStatus::Failure { .. } => {}
            other => panic!("Expected Failure, got {:?}", other),
        }
    };
    ($outcome:expr, $retry_count:expr) => {
        match $outcome {
            $crate::ApplicationStatus::Failure { retry_count, .. } => {
                assert_eq!(retry_count, $retry_count);
            }
            other => panic!("Expected Failure, got {:?}", other),
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl Arbitrary for crate::ApplicationStatus {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            ("[a-z0-9]{1,12}", "[A-Z_]{1,12}")
                .prop_map(|(id, status)| crate::ApplicationStatus::success(id, status)),
            (proptest::option::of("[a-z ]{1,20}"), any::<u32>()).prop_map(
                |(message, retry_count)| crate::ApplicationStatus::Failure {
                    message,
                    retry_count
                }
            ),
        ]
        .boxed()
    }
}

#[cfg(feature = "proptest")]
impl Arbitrary for BackendResponse {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            ("[a-z0-9]{1,12}", "[A-Z_]{1,12}")
                .prop_map(|(id, status)| BackendResponse::success(id, status)),
            (0u64..5_000).prop_map(|ms| BackendResponse::retry_after(Duration::from_millis(ms))),
            Just(BackendResponse::Failure),
        ]
        .boxed()
    }
}

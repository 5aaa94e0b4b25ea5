//! A synchronous front for callers that are not async.

use std::time::Duration;

use tokio::runtime::Runtime;

use crate::client::StatusClient;
use crate::config::HandlerConfig;
use crate::error::ConfigError;
use crate::race::Handler;
use crate::response::ApplicationStatus;

/// A [`Handler`] bundled with the runtime its workers run on.
///
/// The runtime gets one thread per pool slot. Do not call
/// [`perform_operation`](BlockingHandler::perform_operation) from inside
/// another tokio runtime; use [`Handler`] there.
///
/// # Example
///
/// ```rust
/// use status_race::testing::{Script, ScriptedClient};
/// use status_race::{ApplicationStatus, BackendResponse, BlockingHandler, HandlerConfig};
/// use std::time::Duration;
///
/// let client = ScriptedClient::new(
///     Script::new().respond(BackendResponse::success("app1", "APPROVED")),
///     Script::new().respond(BackendResponse::retry_after(Duration::from_millis(10))),
/// );
/// let config = HandlerConfig::new(2, Duration::from_secs(1));
/// let handler = BlockingHandler::new(client, config).unwrap();
///
/// assert_eq!(
///     handler.perform_operation("app1"),
///     ApplicationStatus::success("app1", "APPROVED")
/// );
/// ```
#[derive(Debug)]
pub struct BlockingHandler<C> {
    handler: Handler<C>,
    runtime: Runtime,
}

impl<C: StatusClient> BlockingHandler<C> {
    /// Validate `config` and start a runtime sized to its pool.
    pub fn new(client: C, config: HandlerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.pool_size())
            .thread_name("status-race-worker")
            .enable_time()
            .build()?;
        let handler = Handler::new(client, config)?;
        Ok(Self { handler, runtime })
    }

    /// Ask both backend paths for the status of `id`, blocking the calling
    /// thread for at most the operation timeout.
    pub fn perform_operation(&self, id: &str) -> ApplicationStatus {
        self.runtime.block_on(self.handler.perform_operation(id))
    }

    /// The wrapped async handler.
    pub fn handler(&self) -> &Handler<C> {
        &self.handler
    }

    /// Shut the runtime down, giving in-flight workers up to `grace` to finish.
    pub fn shutdown(self, grace: Duration) {
        self.runtime.shutdown_timeout(grace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{BackendPath, Blocking, BlockingStatusClient};
    use crate::response::BackendResponse;
    use crate::testing::{Script, ScriptedClient};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    #[test]
    fn test_blocking_unrecoverable_failure() {
        let handler = BlockingHandler::new(
            ScriptedClient::new(
                Script::new().respond(BackendResponse::Failure),
                Script::new(),
            ),
            HandlerConfig::new(2, Duration::from_secs(1)),
        )
        .unwrap();

        assert_eq!(handler.perform_operation("app1"), ApplicationStatus::failure(0));
    }

    #[test]
    fn test_blocking_timeout_is_bounded() {
        let handler = BlockingHandler::new(
            ScriptedClient::new(
                Script::new().respond(BackendResponse::retry_after(Duration::from_secs(30))),
                Script::new().respond(BackendResponse::retry_after(Duration::from_secs(30))),
            ),
            HandlerConfig::new(2, Duration::from_millis(100)),
        )
        .unwrap();

        let start = Instant::now();
        assert_eq!(handler.perform_operation("app1"), ApplicationStatus::timed_out());
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(handler.handler().client().calls(BackendPath::Primary), 1);

        handler.shutdown(Duration::from_millis(10));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let err = BlockingHandler::new(
            ScriptedClient::new(Script::new(), Script::new()),
            HandlerConfig::new(1, Duration::from_secs(1)),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::PoolTooSmall { pool_size: 1 });
    }

    struct SlowThenApproved {
        primary_calls: AtomicU32,
    }

    impl BlockingStatusClient for SlowThenApproved {
        fn query_primary(&self, id: &str) -> BackendResponse {
            let n = self.primary_calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                BackendResponse::retry_after(Duration::from_millis(5))
            } else {
                BackendResponse::success(id, "APPROVED")
            }
        }

        fn query_secondary(&self, _id: &str) -> BackendResponse {
            std::thread::sleep(Duration::from_millis(200));
            BackendResponse::retry_after(Duration::from_secs(10))
        }
    }

    #[test]
    fn test_blocking_client_through_blocking_handler() {
        let handler = BlockingHandler::new(
            Blocking::new(SlowThenApproved {
                primary_calls: AtomicU32::new(0),
            }),
            HandlerConfig::new(2, Duration::from_secs(2)),
        )
        .unwrap();

        assert_eq!(
            handler.perform_operation("app7"),
            ApplicationStatus::success("app7", "APPROVED")
        );
        assert_eq!(
            handler
                .handler()
                .client()
                .get_ref()
                .primary_calls
                .load(Ordering::SeqCst),
            3
        );

        handler.shutdown(Duration::from_millis(500));
    }
}

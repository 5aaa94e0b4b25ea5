//! The race coordinator.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, debug_span, info, info_span, warn, Instrument};

use crate::client::{BackendPath, StatusClient};
use crate::config::{HandlerConfig, PoolExhaustion};
use crate::error::{ConfigError, PoolExhausted};
use crate::pool::{Reservation, WorkerPool};
use crate::race::cell::ResultCell;
use crate::race::worker::{run_worker, WorkerExit};
use crate::response::ApplicationStatus;

/// Message of the failure returned when the pool rejects an operation.
pub const POOL_EXHAUSTED_MESSAGE: &str = "worker pool exhausted";
/// Message of the failure returned when both workers ended without an outcome.
pub const NO_RESULT_MESSAGE: &str = "no backend path produced a result";

/// Races the two backend paths of a [`StatusClient`] under a deadline.
///
/// Every call to [`perform_operation`](Handler::perform_operation) gets its own
/// [`ResultCell`] and two fresh workers; nothing is shared between calls except
/// the client and the [`WorkerPool`]. Calls must be made from inside a tokio
/// runtime. For a synchronous entry point see
/// [`BlockingHandler`](crate::BlockingHandler).
///
/// # Example
///
/// ```rust
/// use status_race::{ApplicationStatus, BackendResponse, Handler, HandlerConfig, StatusClient};
/// use std::time::Duration;
///
/// struct Flaky;
///
/// impl StatusClient for Flaky {
///     async fn query_primary(&self, _id: &str) -> BackendResponse {
///         BackendResponse::retry_after(Duration::from_secs(60))
///     }
///
///     async fn query_secondary(&self, id: &str) -> BackendResponse {
///         BackendResponse::success(id, "APPROVED")
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let handler = Handler::new(Flaky, HandlerConfig::new(4, Duration::from_secs(1))).unwrap();
///
/// assert_eq!(
///     handler.perform_operation("app1").await,
///     ApplicationStatus::success("app1", "APPROVED")
/// );
/// # });
/// ```
#[derive(Debug)]
pub struct Handler<C> {
    client: Arc<C>,
    pool: WorkerPool,
    operation_timeout: Duration,
    exhaustion: PoolExhaustion,
}

/// What ended the coordinator's wait.
#[derive(Debug)]
enum RaceEnd {
    Exit(WorkerExit),
    Rejected(PoolExhausted),
    NoResult,
    TimedOut,
    Cancelled,
}

impl<C: StatusClient> Handler<C> {
    /// Build a handler with its own pool of `config.pool_size()` slots.
    pub fn new(client: C, config: HandlerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            client: Arc::new(client),
            pool: WorkerPool::new(config.pool_size()),
            operation_timeout: config.operation_timeout(),
            exhaustion: config.exhaustion(),
        })
    }

    /// Build a handler that draws workers from an existing pool.
    ///
    /// Several handlers may share one pool; the exhaustion policy defaults to
    /// [`PoolExhaustion::Wait`].
    pub fn with_pool(
        client: C,
        pool: WorkerPool,
        operation_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        ConfigError::check(pool.size(), operation_timeout)?;
        Ok(Self {
            client: Arc::new(client),
            pool,
            operation_timeout,
            exhaustion: PoolExhaustion::Wait,
        })
    }

    /// Set the pool exhaustion policy.
    pub fn with_exhaustion(mut self, exhaustion: PoolExhaustion) -> Self {
        self.exhaustion = exhaustion;
        self
    }

    /// The backend client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The worker pool.
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// The overall deadline per operation.
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Ask both backend paths for the status of `id` and return the first
    /// usable answer.
    ///
    /// Never fails: unrecoverable backend failures, the deadline and pool
    /// rejection all come back as [`ApplicationStatus::Failure`]. Returns no
    /// later than the operation timeout; losing workers are left running until
    /// their current call or backoff ends.
    pub async fn perform_operation(&self, id: &str) -> ApplicationStatus {
        self.perform_operation_until(id, std::future::pending()).await
    }

    /// Like [`perform_operation`](Handler::perform_operation), but stop waiting
    /// as soon as `cancel` completes.
    ///
    /// Cancellation is handled exactly like the deadline elapsing.
    pub async fn perform_operation_until<F>(&self, id: &str, cancel: F) -> ApplicationStatus
    where
        F: Future<Output = ()>,
    {
        let span = info_span!("perform_operation", id = %id);
        self.race(id, cancel).instrument(span).await
    }

    async fn race<F>(&self, id: &str, cancel: F) -> ApplicationStatus
    where
        F: Future<Output = ()>,
    {
        let started = Instant::now();
        let cell = Arc::new(ResultCell::new());

        let first_exit = async {
            let reservation = match self
                .pool
                .reserve(BackendPath::BOTH.len(), self.exhaustion)
                .await
            {
                Ok(reservation) => Arc::new(reservation),
                Err(exhausted) => return RaceEnd::Rejected(exhausted),
            };

            let mut workers: FuturesUnordered<JoinHandle<WorkerExit>> = BackendPath::BOTH
                .into_iter()
                .map(|path| self.spawn_worker(path, id, &cell, &reservation))
                .collect();

            while let Some(joined) = workers.next().await {
                match joined {
                    Ok(exit) => return RaceEnd::Exit(exit),
                    Err(err) => warn!(error = %err, "worker ended without an outcome"),
                }
            }
            RaceEnd::NoResult
        };

        let end = tokio::select! {
            end = first_exit => end,
            _ = tokio::time::sleep(self.operation_timeout) => RaceEnd::TimedOut,
            _ = cancel => RaceEnd::Cancelled,
        };

        let outcome = settle(&cell, end);
        debug!(elapsed = ?started.elapsed(), outcome = %outcome, "operation finished");
        outcome
    }

    fn spawn_worker(
        &self,
        path: BackendPath,
        id: &str,
        cell: &Arc<ResultCell>,
        reservation: &Arc<Reservation>,
    ) -> JoinHandle<WorkerExit> {
        let client = Arc::clone(&self.client);
        let cell = Arc::clone(cell);
        let reservation = Arc::clone(reservation);
        let id = id.to_owned();
        let span = debug_span!("worker", path = %path);

        tokio::spawn(
            async move {
                let _reservation = reservation;
                run_worker(|| client.query(path, &id), &cell).await
            }
            .instrument(span),
        )
    }
}

/// Turn whatever ended the wait into the single outcome for the caller.
///
/// Every write here is claim-if-empty, so a value a worker committed first is
/// never replaced. When an unrecoverable failure, the deadline or cancellation
/// loses the claim, the committed value is handed back instead.
fn settle(cell: &ResultCell, end: RaceEnd) -> ApplicationStatus {
    match end {
        RaceEnd::Exit(WorkerExit::Committed(outcome)) => {
            info!(success = outcome.is_success(), "operation decided");
            outcome
        }
        RaceEnd::Exit(WorkerExit::Unrecoverable(failure)) => {
            let retry_count = failure.retry_count();
            let claim = cell.claim(failure);
            if claim.is_won() {
                warn!(retry_count = ?retry_count, "operation failed");
            } else {
                debug!("unrecoverable failure arrived after a commit");
            }
            claim.value().clone()
        }
        RaceEnd::Rejected(exhausted) => {
            warn!(
                requested = exhausted.requested,
                available = exhausted.available,
                "rejecting operation, worker pool exhausted"
            );
            ApplicationStatus::failure_with_message(POOL_EXHAUSTED_MESSAGE, 0)
        }
        RaceEnd::NoResult => cell
            .claim(ApplicationStatus::failure_with_message(NO_RESULT_MESSAGE, 0))
            .value()
            .clone(),
        RaceEnd::TimedOut => claim_timeout(cell, "deadline elapsed"),
        RaceEnd::Cancelled => claim_timeout(cell, "wait cancelled"),
    }
}

fn claim_timeout(cell: &ResultCell, reason: &'static str) -> ApplicationStatus {
    let claim = cell.claim(ApplicationStatus::timed_out());
    if claim.is_won() {
        warn!(reason, "no backend path answered in time");
    } else {
        debug!(reason, "keeping outcome committed before the wait ended");
    }
    claim.value().clone()
}

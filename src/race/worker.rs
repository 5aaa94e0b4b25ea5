//! One retrying worker per backend path.

use std::future::Future;

use tracing::{debug, info, warn};

use crate::race::cell::ResultCell;
use crate::response::{ApplicationStatus, BackendResponse};

/// How a worker's loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerExit {
    /// The cell holds a value; this is it. The worker may or may not have
    /// been the one to write it.
    Committed(ApplicationStatus),
    /// The backend reported a failure that must end the whole operation.
    Unrecoverable(ApplicationStatus),
}

impl WorkerExit {
    /// The outcome carried by either variant.
    pub fn into_outcome(self) -> ApplicationStatus {
        match self {
            Self::Committed(outcome) | Self::Unrecoverable(outcome) => outcome,
        }
    }
}

/// Drive one backend path until the operation is decided.
///
/// Each iteration first checks the shared cell and stops if another party
/// already committed. Otherwise it calls `query` once and then:
///
/// - `Failure` ends the loop with [`WorkerExit::Unrecoverable`], carrying this
///   worker's retry count.
/// - `RetryAfter { delay }` bumps the retry count and sleeps for `delay`. The
///   sleep is not clipped to any deadline.
/// - `Success` claims the cell if it is still empty and returns whatever the
///   cell holds afterwards.
///
/// # Example
///
/// ```rust
/// use status_race::{ApplicationStatus, BackendResponse, ResultCell, WorkerExit};
/// use status_race::race::run_worker;
///
/// # tokio_test::block_on(async {
/// let cell = ResultCell::new();
/// let exit = run_worker(|| async { BackendResponse::success("app1", "APPROVED") }, &cell).await;
///
/// assert_eq!(
///     exit,
///     WorkerExit::Committed(ApplicationStatus::success("app1", "APPROVED"))
/// );
/// # });
/// ```
pub async fn run_worker<Q, Fut>(mut query: Q, cell: &ResultCell) -> WorkerExit
where
    Q: FnMut() -> Fut,
    Fut: Future<Output = BackendResponse>,
{
    let mut retry_count = 0u32;

    loop {
        if let Some(claimed) = cell.get() {
            debug!(retry_count, "operation already decided, stopping");
            return WorkerExit::Committed(claimed.clone());
        }

        match query().await {
            BackendResponse::Failure => {
                warn!(retry_count, "backend reported unrecoverable failure");
                return WorkerExit::Unrecoverable(ApplicationStatus::failure(retry_count));
            }
            BackendResponse::RetryAfter { delay } => {
                retry_count = retry_count.saturating_add(1);
                debug!(retry_count, ?delay, "backend asked to retry later");
                tokio::time::sleep(delay).await;
            }
            BackendResponse::Success {
                application_id,
                application_status,
            } => {
                let claim = cell.claim(ApplicationStatus::Success {
                    application_id,
                    application_status,
                });
                if claim.is_won() {
                    info!(retry_count, "committed backend success");
                } else {
                    debug!(retry_count, "backend succeeded after the operation was decided");
                }
                return WorkerExit::Committed(claim.value().clone());
            }
        }
    }
}

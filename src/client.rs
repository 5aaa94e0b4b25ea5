//! The backend client seam.
//!
//! The status service exposes two equivalent query paths. [`StatusClient`] is
//! the async interface the race drives; [`BlockingStatusClient`] plus the
//! [`Blocking`] adapter lets a synchronous client be plugged in without
//! stalling the runtime.

use std::future::Future;
use std::sync::Arc;

use crate::response::BackendResponse;

/// Which of the two backend query paths a worker drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendPath {
    /// The first query operation.
    Primary,
    /// The second, equivalent query operation.
    Secondary,
}

impl BackendPath {
    /// Both paths, in launch order.
    pub const BOTH: [BackendPath; 2] = [BackendPath::Primary, BackendPath::Secondary];

    /// Short lowercase name, used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for BackendPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status service with two redundant query operations.
///
/// Implementors may write `async fn` for both methods as long as the
/// resulting futures are `Send`.
///
/// # Example
///
/// ```rust
/// use status_race::{BackendResponse, StatusClient};
///
/// struct AlwaysApproved;
///
/// impl StatusClient for AlwaysApproved {
///     async fn query_primary(&self, id: &str) -> BackendResponse {
///         BackendResponse::success(id, "APPROVED")
///     }
///
///     async fn query_secondary(&self, id: &str) -> BackendResponse {
///         BackendResponse::success(id, "APPROVED")
///     }
/// }
/// ```
pub trait StatusClient: Send + Sync + 'static {
    /// Query the status through the first path.
    fn query_primary(&self, id: &str) -> impl Future<Output = BackendResponse> + Send;

    /// Query the status through the second path.
    fn query_secondary(&self, id: &str) -> impl Future<Output = BackendResponse> + Send;

    /// Query through the given path.
    fn query(&self, path: BackendPath, id: &str) -> impl Future<Output = BackendResponse> + Send {
        async move {
            match path {
                BackendPath::Primary => self.query_primary(id).await,
                BackendPath::Secondary => self.query_secondary(id).await,
            }
        }
    }
}

impl<C: StatusClient> StatusClient for Arc<C> {
    fn query_primary(&self, id: &str) -> impl Future<Output = BackendResponse> + Send {
        (**self).query_primary(id)
    }

    fn query_secondary(&self, id: &str) -> impl Future<Output = BackendResponse> + Send {
        (**self).query_secondary(id)
    }
}

/// A status service whose query operations block the calling thread.
pub trait BlockingStatusClient: Send + Sync + 'static {
    /// Query the status through the first path.
    fn query_primary(&self, id: &str) -> BackendResponse;

    /// Query the status through the second path.
    fn query_secondary(&self, id: &str) -> BackendResponse;
}

/// Adapts a [`BlockingStatusClient`] into a [`StatusClient`].
///
/// Every query runs on tokio's blocking thread pool. A blocking call that
/// panics re-raises the panic in the awaiting task, the same as an async
/// client that panics.
#[derive(Debug)]
pub struct Blocking<C> {
    inner: Arc<C>,
}

impl<C: BlockingStatusClient> Blocking<C> {
    /// Wrap a blocking client.
    pub fn new(inner: C) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Access the wrapped client.
    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    async fn run(&self, path: BackendPath, id: &str) -> BackendResponse {
        let inner = Arc::clone(&self.inner);
        let id = id.to_owned();
        let joined = tokio::task::spawn_blocking(move || match path {
            BackendPath::Primary => inner.query_primary(&id),
            BackendPath::Secondary => inner.query_secondary(&id),
        })
        .await;

        match joined {
            Ok(response) => response,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => {
                // Only happens while the runtime shuts down, which drops this
                // task anyway.
                tracing::debug!(
                    path = %path,
                    error = %err,
                    "blocking backend call cancelled"
                );
                std::future::pending().await
            }
        }
    }
}

impl<C: BlockingStatusClient> StatusClient for Blocking<C> {
    fn query_primary(&self, id: &str) -> impl Future<Output = BackendResponse> + Send {
        self.run(BackendPath::Primary, id)
    }

    fn query_secondary(&self, id: &str) -> impl Future<Output = BackendResponse> + Send {
        self.run(BackendPath::Secondary, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Counting {
        primary: AtomicU32,
        secondary: AtomicU32,
    }

    impl BlockingStatusClient for Counting {
        fn query_primary(&self, id: &str) -> BackendResponse {
            self.primary.fetch_add(1, Ordering::SeqCst);
            BackendResponse::success(id, "FROM_PRIMARY")
        }

        fn query_secondary(&self, _id: &str) -> BackendResponse {
            self.secondary.fetch_add(1, Ordering::SeqCst);
            BackendResponse::Failure
        }
    }

    struct Panicking;

    impl BlockingStatusClient for Panicking {
        fn query_primary(&self, _id: &str) -> BackendResponse {
            panic!("backend exploded")
        }

        fn query_secondary(&self, id: &str) -> BackendResponse {
            BackendResponse::success(id, "OK")
        }
    }

    #[tokio::test]
    async fn test_blocking_adapter_routes_paths() {
        let client = Blocking::new(Counting {
            primary: AtomicU32::new(0),
            secondary: AtomicU32::new(0),
        });

        assert_eq!(
            client.query(BackendPath::Primary, "app1").await,
            BackendResponse::success("app1", "FROM_PRIMARY")
        );
        assert_eq!(
            client.query(BackendPath::Secondary, "app1").await,
            BackendResponse::Failure
        );
        assert_eq!(client.get_ref().primary.load(Ordering::SeqCst), 1);
        assert_eq!(client.get_ref().secondary.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blocking_panic_resumes_in_caller() {
        let client = Arc::new(Blocking::new(Panicking));

        let primary = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.query_primary("x").await })
        };
        let err = primary.await.unwrap_err();
        assert!(err.is_panic());
        assert_eq!(
            err.into_panic().downcast_ref::<&str>(),
            Some(&"backend exploded")
        );

        assert!(client.query_secondary("x").await.is_success());
    }

    #[test]
    fn test_path_names() {
        assert_eq!(BackendPath::Primary.to_string(), "primary");
        assert_eq!(BackendPath::BOTH[1], BackendPath::Secondary);
    }
}

//! Response and outcome types.
//!
//! - [`BackendResponse`]: what a single backend query returns
//! - [`ApplicationStatus`]: the one outcome handed back per operation

use std::time::Duration;

/// A tagged response from one backend query.
///
/// # Examples
///
/// ```rust
/// use status_race::BackendResponse;
/// use std::time::Duration;
///
/// let ok = BackendResponse::success("app1", "APPROVED");
/// assert!(ok.is_success());
///
/// let later = BackendResponse::retry_after(Duration::from_millis(50));
/// assert_eq!(later.delay(), Some(Duration::from_millis(50)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BackendResponse {
    /// The backend resolved the application status.
    Success {
        /// Identifier of the application.
        application_id: String,
        /// Backend-reported status string.
        application_status: String,
    },
    /// The backend is busy; ask again after `delay`.
    RetryAfter {
        /// Server-suggested wait before the next attempt.
        delay: Duration,
    },
    /// The backend says this request cannot succeed.
    Failure,
}

impl BackendResponse {
    /// Create a success response.
    pub fn success(
        application_id: impl Into<String>,
        application_status: impl Into<String>,
    ) -> Self {
        Self::Success {
            application_id: application_id.into(),
            application_status: application_status.into(),
        }
    }

    /// Create a retry-after response.
    pub fn retry_after(delay: Duration) -> Self {
        Self::RetryAfter { delay }
    }

    /// Returns true for [`BackendResponse::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The suggested delay, if this is a retry-after response.
    pub fn delay(&self) -> Option<Duration> {
        match self {
            Self::RetryAfter { delay } => Some(*delay),
            _ => None,
        }
    }
}

/// The final outcome of one `perform_operation` call.
///
/// Exactly one of these is returned per call; failures are data, never panics
/// or errors.
///
/// # Examples
///
/// ```rust
/// use status_race::ApplicationStatus;
///
/// let timed_out = ApplicationStatus::timed_out();
/// assert!(!timed_out.is_success());
/// assert_eq!(timed_out.retry_count(), Some(0));
///
/// let ok = ApplicationStatus::success("app1", "APPROVED");
/// assert_eq!(ok.application_id(), Some("app1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ApplicationStatus {
    /// One backend path resolved the status.
    Success {
        /// Identifier of the application.
        application_id: String,
        /// Backend-reported status string.
        application_status: String,
    },
    /// No usable answer.
    Failure {
        /// Optional human-readable reason.
        message: Option<String>,
        /// Retry-after responses seen by the path that failed.
        retry_count: u32,
    },
}

impl ApplicationStatus {
    /// Create a success outcome.
    pub fn success(
        application_id: impl Into<String>,
        application_status: impl Into<String>,
    ) -> Self {
        Self::Success {
            application_id: application_id.into(),
            application_status: application_status.into(),
        }
    }

    /// Create a failure outcome with no message.
    pub fn failure(retry_count: u32) -> Self {
        Self::Failure {
            message: None,
            retry_count,
        }
    }

    /// Create a failure outcome carrying a reason.
    pub fn failure_with_message(message: impl Into<String>, retry_count: u32) -> Self {
        Self::Failure {
            message: Some(message.into()),
            retry_count,
        }
    }

    /// The outcome reported when the deadline elapses or the wait is cancelled.
    pub fn timed_out() -> Self {
        Self::failure(0)
    }

    /// Returns true for [`ApplicationStatus::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns true for [`ApplicationStatus::Failure`].
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The retry count of a failure, `None` for a success.
    pub fn retry_count(&self) -> Option<u32> {
        match self {
            Self::Failure { retry_count, .. } => Some(*retry_count),
            Self::Success { .. } => None,
        }
    }

    /// The application id of a success, `None` for a failure.
    pub fn application_id(&self) -> Option<&str> {
        match self {
            Self::Success { application_id, .. } => Some(application_id),
            Self::Failure { .. } => None,
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success {
                application_id,
                application_status,
            } => write!(f, "{}: {}", application_id, application_status),
            Self::Failure {
                message: Some(message),
                retry_count,
            } => write!(f, "failure after {} retries: {}", retry_count, message),
            Self::Failure {
                message: None,
                retry_count,
            } => write!(f, "failure after {} retries", retry_count),
        }
    }
}

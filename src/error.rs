//! Error types for handler construction.
//!
//! Nothing here is returned from `perform_operation`; every runtime failure of
//! an operation is reported as an [`ApplicationStatus::Failure`] value.
//!
//! [`ApplicationStatus::Failure`]: crate::ApplicationStatus::Failure

use std::time::Duration;

/// Invalid handler configuration, or a runtime that could not be built.
///
/// # Examples
///
/// ```rust
/// use status_race::{ConfigError, HandlerConfig};
/// use std::time::Duration;
///
/// let err = HandlerConfig::new(1, Duration::from_secs(1)).validate().unwrap_err();
/// assert_eq!(err, ConfigError::PoolTooSmall { pool_size: 1 });
/// ```
#[derive(Debug)]
pub enum ConfigError {
    /// Each operation occupies two worker slots, so fewer can never run.
    PoolTooSmall {
        /// The rejected pool size.
        pool_size: usize,
    },
    /// More slots than the pool's semaphore can hand out.
    PoolTooLarge {
        /// The rejected pool size.
        pool_size: usize,
    },
    /// A zero operation timeout would fail every call before it starts.
    ZeroTimeout,
    /// The runtime backing a blocking handler failed to start.
    Runtime(std::io::Error),
}

impl ConfigError {
    /// Smallest pool that can run one operation.
    pub const MIN_POOL_SIZE: usize = 2;
    /// Largest pool a [`WorkerPool`](crate::WorkerPool) can be built with.
    pub const MAX_POOL_SIZE: usize = tokio::sync::Semaphore::MAX_PERMITS;

    pub(crate) fn check(pool_size: usize, operation_timeout: Duration) -> Result<(), Self> {
        if pool_size < Self::MIN_POOL_SIZE {
            return Err(Self::PoolTooSmall { pool_size });
        }
        if pool_size > Self::MAX_POOL_SIZE {
            return Err(Self::PoolTooLarge { pool_size });
        }
        if operation_timeout.is_zero() {
            return Err(Self::ZeroTimeout);
        }
        Ok(())
    }
}

impl PartialEq for ConfigError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::PoolTooSmall { pool_size: a }, Self::PoolTooSmall { pool_size: b }) => a == b,
            (Self::PoolTooLarge { pool_size: a }, Self::PoolTooLarge { pool_size: b }) => a == b,
            (Self::ZeroTimeout, Self::ZeroTimeout) => true,
            (Self::Runtime(a), Self::Runtime(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PoolTooSmall { pool_size } => write!(
                f,
                "pool size {} is too small, at least {} slots are required",
                pool_size,
                Self::MIN_POOL_SIZE
            ),
            Self::PoolTooLarge { pool_size } => write!(
                f,
                "pool size {} is too large, at most {} slots are supported",
                pool_size,
                Self::MAX_POOL_SIZE
            ),
            Self::ZeroTimeout => write!(f, "operation timeout must be greater than zero"),
            Self::Runtime(e) => write!(f, "failed to build runtime: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Runtime(e)
    }
}

/// Returned when the worker pool has no free slots and the handler is set to
/// reject rather than wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolExhausted {
    /// Slots the operation asked for.
    pub requested: usize,
    /// Slots free at the time of the request.
    pub available: usize,
}

impl std::fmt::Display for PoolExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "worker pool exhausted ({} requested, {} available)",
            self.requested, self.available
        )
    }
}

impl std::error::Error for PoolExhausted {}

#[cfg(test)]
mod error_tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_check_rejects_small_pool() {
        assert_eq!(
            ConfigError::check(0, Duration::from_secs(1)),
            Err(ConfigError::PoolTooSmall { pool_size: 0 })
        );
        assert!(ConfigError::check(2, Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_check_rejects_pool_beyond_semaphore_limit() {
        let too_large = ConfigError::MAX_POOL_SIZE + 1;
        assert_eq!(
            ConfigError::check(too_large, Duration::from_secs(1)),
            Err(ConfigError::PoolTooLarge {
                pool_size: too_large
            })
        );
        assert!(ConfigError::check(ConfigError::MAX_POOL_SIZE, Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_check_rejects_zero_timeout() {
        assert_eq!(
            ConfigError::check(4, Duration::ZERO),
            Err(ConfigError::ZeroTimeout)
        );
    }

    #[test]
    fn test_display_and_source() {
        let err = ConfigError::PoolTooSmall { pool_size: 1 };
        assert!(err.to_string().contains("at least 2"));
        assert!(err.source().is_none());

        let io = ConfigError::from(std::io::Error::other("no threads"));
        assert!(io.to_string().contains("no threads"));
        assert!(io.source().is_some());
    }

    #[test]
    fn test_pool_exhausted_display() {
        let err = PoolExhausted {
            requested: 2,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "worker pool exhausted (2 requested, 1 available)"
        );
    }
}

//! Handler configuration.
//!
//! Configuration is plain data: build it, validate it, hand it to
//! [`Handler::new`](crate::Handler::new).

use std::time::Duration;

use crate::error::ConfigError;

/// What an operation does when the worker pool has no free slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoolExhaustion {
    /// Queue until slots free up. Waiting counts against the operation timeout.
    #[default]
    Wait,
    /// Return a failure outcome immediately.
    Reject,
}

/// Settings for a [`Handler`](crate::Handler).
///
/// # Examples
///
/// ```rust
/// use status_race::{HandlerConfig, PoolExhaustion};
/// use std::time::Duration;
///
/// let config = HandlerConfig::new(4, Duration::from_secs(2))
///     .with_exhaustion(PoolExhaustion::Reject);
///
/// assert_eq!(config.pool_size(), 4);
/// assert_eq!(config.operation_timeout(), Duration::from_secs(2));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HandlerConfig {
    pool_size: usize,
    operation_timeout: Duration,
    exhaustion: PoolExhaustion,
}

impl HandlerConfig {
    /// Default number of worker slots.
    pub const DEFAULT_POOL_SIZE: usize = 8;
    /// Default deadline per operation.
    pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(15);

    /// Create a config with the given pool size and deadline.
    pub fn new(pool_size: usize, operation_timeout: Duration) -> Self {
        Self {
            pool_size,
            operation_timeout,
            exhaustion: PoolExhaustion::Wait,
        }
    }

    /// Set the pool size.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Set the overall deadline per operation.
    pub fn with_operation_timeout(mut self, operation_timeout: Duration) -> Self {
        self.operation_timeout = operation_timeout;
        self
    }

    /// Set the pool exhaustion policy.
    pub fn with_exhaustion(mut self, exhaustion: PoolExhaustion) -> Self {
        self.exhaustion = exhaustion;
        self
    }

    /// Number of concurrent worker slots.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Overall deadline per operation.
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Pool exhaustion policy.
    pub fn exhaustion(&self) -> PoolExhaustion {
        self.exhaustion
    }

    /// Check that a handler built from this config can run operations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check(self.pool_size, self.operation_timeout)
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_POOL_SIZE, Self::DEFAULT_OPERATION_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = HandlerConfig::default();
        assert_eq!(config.pool_size(), 8);
        assert_eq!(config.exhaustion(), PoolExhaustion::Wait);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = HandlerConfig::default()
            .with_pool_size(2)
            .with_operation_timeout(Duration::from_millis(250));
        assert_eq!(config.pool_size(), 2);
        assert_eq!(config.operation_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_validate_errors() {
        assert_eq!(
            HandlerConfig::default().with_pool_size(1).validate(),
            Err(ConfigError::PoolTooSmall { pool_size: 1 })
        );
        assert_eq!(
            HandlerConfig::default()
                .with_operation_timeout(Duration::ZERO)
                .validate(),
            Err(ConfigError::ZeroTimeout)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let config: HandlerConfig = serde_json::from_str(r#"{"pool_size": 3}"#).unwrap();
        assert_eq!(config.pool_size(), 3);
        assert_eq!(
            config.operation_timeout(),
            HandlerConfig::DEFAULT_OPERATION_TIMEOUT
        );
        assert_eq!(config.exhaustion(), PoolExhaustion::Wait);
    }
}

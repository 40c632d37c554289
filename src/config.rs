//! Connection configuration.
//!
//! [`ConnectionConfig`] collects the limits and timers a connection runs
//! with. It can be built in code through
//! [`ConnectionBuilder`](crate::ConnectionBuilder) or deserialised from any
//! `serde` format, with durations given in milliseconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frame::{
    DEFAULT_MAX_FRAME_SIZE,
    DEFAULT_MAX_PAYLOAD_SIZE,
    FRAME_HEADER_LEN,
    ITEM_FIXED_LEN,
    min_item_len,
};

/// Default number of submitted notifications retained for replay.
pub const DEFAULT_REPLAY_CAPACITY: usize = 10_000;
/// Default interval after which a pending frame is flushed regardless of
/// traffic.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5 * 60);
/// Default quiet period after a submission before the pending frame is
/// flushed.
pub const DEFAULT_COALESCE_DELAY: Duration = Duration::from_millis(10);

/// Errors returned when validating a [`ConnectionConfig`].
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The replay history must hold at least one entry.
    #[error("replay capacity must be at least 1")]
    ZeroReplayCapacity,
    /// The payload limit cannot be expressed in an item's 16-bit length.
    #[error("max payload size {size} exceeds {max}")]
    PayloadSizeOutOfRange {
        /// Configured size.
        size: usize,
        /// Largest representable size.
        max: usize,
    },
    /// The frame limit cannot hold the largest item, or exceeds a 32-bit
    /// length.
    #[error("max frame size {size} must be between {min} and {max}")]
    FrameSizeOutOfRange {
        /// Configured size.
        size: usize,
        /// Smallest frame holding one maximum-size item.
        min: usize,
        /// Largest representable frame.
        max: usize,
    },
    /// Timer intervals must be non-zero.
    #[error("flush interval and coalesce delay must be non-zero")]
    ZeroInterval,
    /// The coalescing delay must not outlast the periodic flush.
    #[error("coalesce delay {coalesce:?} exceeds flush interval {flush:?}")]
    CoalesceExceedsFlush {
        /// Configured coalescing delay.
        coalesce: Duration,
        /// Configured flush interval.
        flush: Duration,
    },
}

/// Limits and timers for one connection.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use pushframe::ConnectionConfig;
///
/// let config = ConnectionConfig {
///     replay_capacity: 500,
///     coalesce_delay: Duration::from_millis(25),
///     ..ConnectionConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Number of submitted notifications kept for loss reporting.
    pub replay_capacity: usize,
    /// Largest frame written to the transport, header included.
    pub max_frame_size: usize,
    /// Largest marshaled payload body accepted per notification.
    pub max_payload_size: usize,
    /// Interval after which a pending frame is flushed with no further
    /// traffic.
    #[serde(with = "millis")]
    pub flush_interval: Duration,
    /// Quiet period after a submission before the pending frame is flushed.
    #[serde(with = "millis")]
    pub coalesce_delay: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            replay_capacity: DEFAULT_REPLAY_CAPACITY,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            coalesce_delay: DEFAULT_COALESCE_DELAY,
        }
    }
}

impl ConnectionConfig {
    /// Largest payload limit an item length field can describe.
    pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize - ITEM_FIXED_LEN;

    /// Smallest frame limit that still fits one item of `max_payload_size`.
    #[must_use]
    pub fn min_frame_size(&self) -> usize {
        FRAME_HEADER_LEN + min_item_len() + self.max_payload_size
    }

    /// Check the configuration and return it unchanged if usable.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first invalid setting.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.replay_capacity == 0 {
            return Err(ConfigError::ZeroReplayCapacity);
        }
        if self.max_payload_size > Self::MAX_PAYLOAD_SIZE {
            return Err(ConfigError::PayloadSizeOutOfRange {
                size: self.max_payload_size,
                max: Self::MAX_PAYLOAD_SIZE,
            });
        }
        let max_frame = usize::try_from(u32::MAX)
            .unwrap_or(usize::MAX)
            .saturating_add(FRAME_HEADER_LEN);
        if self.max_frame_size < self.min_frame_size() || self.max_frame_size > max_frame {
            return Err(ConfigError::FrameSizeOutOfRange {
                size: self.max_frame_size,
                min: self.min_frame_size(),
                max: max_frame,
            });
        }
        if self.flush_interval.is_zero() || self.coalesce_delay.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.coalesce_delay > self.flush_interval {
            return Err(ConfigError::CoalesceExceedsFlush {
                coalesce: self.coalesce_delay,
                flush: self.flush_interval,
            });
        }
        Ok(self)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ConnectionConfig::default();
        assert_eq!(config.validate(), Ok(config));
        assert_eq!(config.replay_capacity, 10_000);
        assert_eq!(config.max_frame_size, 65_535);
        assert_eq!(config.max_payload_size, 256);
    }

    #[rstest]
    #[case::zero_capacity(
        ConnectionConfig { replay_capacity: 0, ..ConnectionConfig::default() },
        ConfigError::ZeroReplayCapacity
    )]
    #[case::zero_flush(
        ConnectionConfig { flush_interval: Duration::ZERO, ..ConnectionConfig::default() },
        ConfigError::ZeroInterval
    )]
    #[case::zero_coalesce(
        ConnectionConfig { coalesce_delay: Duration::ZERO, ..ConnectionConfig::default() },
        ConfigError::ZeroInterval
    )]
    #[case::coalesce_too_long(
        ConnectionConfig {
            flush_interval: Duration::from_millis(5),
            coalesce_delay: Duration::from_millis(6),
            ..ConnectionConfig::default()
        },
        ConfigError::CoalesceExceedsFlush {
            coalesce: Duration::from_millis(6),
            flush: Duration::from_millis(5),
        }
    )]
    #[case::payload_too_large(
        ConnectionConfig { max_payload_size: 65_495, ..ConnectionConfig::default() },
        ConfigError::PayloadSizeOutOfRange { size: 65_495, max: 65_494 }
    )]
    fn invalid_settings_are_rejected(
        #[case] config: ConnectionConfig,
        #[case] expected: ConfigError,
    ) {
        assert_eq!(config.validate(), Err(expected));
    }

    #[test]
    fn frame_must_hold_largest_item() {
        let config = ConnectionConfig {
            max_frame_size: 5 + 3 + 41 + 255,
            ..ConnectionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FrameSizeOutOfRange { min: 305, .. })
        ));
        let fits = ConnectionConfig {
            max_frame_size: 305,
            ..config
        };
        assert!(fits.validate().is_ok());
    }

    #[test]
    fn deserialises_partial_json_with_millis() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{"replay_capacity": 42, "coalesce_delay": 25}"#)
                .expect("valid config json");
        assert_eq!(config.replay_capacity, 42);
        assert_eq!(config.coalesce_delay, Duration::from_millis(25));
        assert_eq!(config.flush_interval, DEFAULT_FLUSH_INTERVAL);
    }

    #[test]
    fn serialises_durations_as_millis() {
        let json = serde_json::to_value(ConnectionConfig::default()).expect("serialises");
        assert_eq!(json["flush_interval"], 300_000);
        assert_eq!(json["coalesce_delay"], 10);
    }
}

//! Sensor error types
//!
//! Only setup can fail. Decoding never returns errors: a bad pulse is
//! simply not an update.

use crate::config::ConfigError;

/// Sensor error with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// S01: Another sensor already owns this edge channel
    ChannelInUse,
    /// S02: Configuration rejected
    InvalidConfig(ConfigError),
    /// S03: Platform refused the edge interrupt registration (raw code)
    Attach(i32),
}

impl SensorError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ChannelInUse => "S01",
            Self::InvalidConfig(_) => "S02",
            Self::Attach(_) => "S03",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::ChannelInUse => "channel in use",
            Self::InvalidConfig(err) => err.message(),
            Self::Attach(_) => "edge interrupt attach failed",
        }
    }
}

impl core::fmt::Display for SensorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Attach(raw) => write!(f, "{}: {} ({})", self.code(), self.message(), raw),
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}

impl From<ConfigError> for SensorError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(SensorError::ChannelInUse.to_string(), "S01: channel in use");
        assert_eq!(
            SensorError::from(ConfigError::ZeroTimeBase).to_string(),
            "S02: zero time base"
        );
        assert_eq!(
            SensorError::Attach(-1).to_string(),
            "S03: edge interrupt attach failed (-1)"
        );
    }
}

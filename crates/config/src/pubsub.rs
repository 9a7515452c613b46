//! Pub/sub delivery settings

use serde::Deserialize;

/// Policy applied when a subscriber's event queue is full
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackPressurePolicy {
    /// Discard the oldest queued event to make room for the newest
    #[default]
    DropOldest,
}

/// Pub/sub configuration
///
/// # Example
///
/// ```toml
/// [pubsub]
/// max_queue_size = 100
/// back_pressure_policy = "drop_oldest"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PubSubConfig {
    /// Per-subscriber event queue capacity
    /// Default: 100
    pub max_queue_size: usize,

    /// What to do when a subscriber's queue is full
    /// Default: drop_oldest
    pub back_pressure_policy: BackPressurePolicy,
}

impl Default for PubSubConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 100,
            back_pressure_policy: BackPressurePolicy::DropOldest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PubSubConfig::default();
        assert_eq!(config.max_queue_size, 100);
        assert_eq!(config.back_pressure_policy, BackPressurePolicy::DropOldest);
    }

    #[test]
    fn test_deserialize_policy() {
        let config: PubSubConfig =
            toml::from_str("back_pressure_policy = \"drop_oldest\"").unwrap();
        assert_eq!(config.back_pressure_policy, BackPressurePolicy::DropOldest);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result: Result<PubSubConfig, _> = toml::from_str("back_pressure_policy = \"block\"");
        assert!(result.is_err());
    }
}

//! Configuration validation
//!
//! Catches mistakes at startup instead of surfacing them as runtime
//! misbehavior: duplicate lot ids, impossible occupancy, port collisions.

use std::collections::HashMap;

use crate::Config;
use crate::error::{ConfigError, Result};

impl Config {
    /// Validate the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns the first problem found; the config is unusable until fixed.
    pub fn validate(&self) -> Result<()> {
        self.validate_lots()?;
        self.validate_ports()?;
        self.validate_sizes()?;
        Ok(())
    }

    fn validate_lots(&self) -> Result<()> {
        if self.lots.is_empty() {
            return Err(ConfigError::NoLots);
        }

        let mut seen = std::collections::HashSet::new();
        for lot in &self.lots {
            if !seen.insert(lot.id.as_str()) {
                return Err(ConfigError::duplicate_lot(&lot.id));
            }
            if lot.capacity == 0 {
                return Err(ConfigError::ZeroCapacity {
                    id: lot.id.clone(),
                });
            }
            if lot.occupied > lot.capacity {
                return Err(ConfigError::OccupiedExceedsCapacity {
                    id: lot.id.clone(),
                    occupied: lot.occupied,
                    capacity: lot.capacity,
                });
            }
        }

        Ok(())
    }

    fn validate_ports(&self) -> Result<()> {
        let listeners = [
            ("line", self.server.line_port),
            ("rpc", self.server.rpc_port),
            ("sensor", self.server.sensor_port),
            ("pubsub", self.server.pubsub_port),
        ];

        let mut by_port: HashMap<u16, Vec<&str>> = HashMap::new();
        for (name, port) in listeners {
            by_port.entry(port).or_default().push(name);
        }

        for (port, names) in by_port {
            if names.len() > 1 {
                return Err(ConfigError::duplicate_port(port, names.join(", ")));
            }
        }

        Ok(())
    }

    fn validate_sizes(&self) -> Result<()> {
        if self.ingest.workers == 0 {
            return Err(ConfigError::invalid_value(
                "ingest.workers",
                "must be at least 1",
            ));
        }
        if self.ingest.queue_size == 0 {
            return Err(ConfigError::invalid_value(
                "ingest.queue_size",
                "must be at least 1",
            ));
        }
        if self.pubsub.max_queue_size == 0 {
            return Err(ConfigError::invalid_value(
                "pubsub.max_queue_size",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::Config;
    use crate::error::ConfigError;

    const VALID: &str = r#"
[[lots]]
id = "LOT-A"
capacity = 10
occupied = 2
"#;

    #[test]
    fn test_valid_config() {
        let config = Config::from_str(VALID).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_no_lots_rejected() {
        let config = Config::from_str("").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::NoLots)));
    }

    #[test]
    fn test_duplicate_lot_rejected() {
        let toml = r#"
[[lots]]
id = "LOT-A"
capacity = 10

[[lots]]
id = "LOT-A"
capacity = 5
"#;
        let config = Config::from_str(toml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateLot { .. })
        ));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let toml = r#"
[[lots]]
id = "LOT-A"
capacity = 0
"#;
        let config = Config::from_str(toml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroCapacity { .. })
        ));
    }

    #[test]
    fn test_overfull_lot_rejected() {
        let toml = r#"
[[lots]]
id = "LOT-A"
capacity = 5
occupied = 9
"#;
        let config = Config::from_str(toml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OccupiedExceedsCapacity { .. })
        ));
    }

    #[test]
    fn test_duplicate_port_rejected() {
        let toml = r#"
[server]
line_port = 5000
rpc_port = 5000

[[lots]]
id = "LOT-A"
capacity = 10
"#;
        let config = Config::from_str(toml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicatePort { port: 5000, .. })
        ));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let toml = r#"
[ingest]
workers = 0

[[lots]]
id = "LOT-A"
capacity = 10
"#;
        let config = Config::from_str(toml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}

//! Configuration loading and validation for the health checker

use crate::service::ServiceConfig;
use healthcheck::PoolConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(#[from] ValidationErrors),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URLs to probe
    pub services: Vec<String>,

    #[serde(default)]
    pub pool: PoolSettings,

    #[serde(default)]
    pub probe: ProbeSettings,

    #[serde(default)]
    pub schedule: ScheduleSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationErrors> {
        if let Err(e) = validate_services(&self.services) {
            let mut errors = ValidationErrors::new();
            errors.add("services", e);
            return Err(errors);
        }
        self.pool.validate()?;
        self.probe.validate()?;
        self.schedule.validate()?;
        Ok(())
    }
}

/// Worker pool settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PoolSettings {
    #[validate(range(min = 1, max = 1024))]
    pub workers: usize,

    #[validate(range(min = 1, max = 100000))]
    pub queue_capacity: usize,

    #[validate(range(min = 1, max = 100000))]
    pub result_capacity: usize,
}

/// Probe settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProbeSettings {
    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_timeout")]
    pub timeout: Duration,
}

/// Job generation settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ScheduleSettings {
    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_interval")]
    pub interval: Duration,
}

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
}

// Default implementations

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            workers: 3,
            queue_capacity: 100,
            result_capacity: 100,
        }
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
        }
    }
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(20),
        }
    }
}

// Custom validators

fn validate_services(services: &[String]) -> Result<(), ValidationError> {
    if services.is_empty() {
        return Err(ValidationError::new("services_empty"));
    }
    if services.iter().any(|s| s.trim().is_empty()) {
        return Err(ValidationError::new("service_url_blank"));
    }
    Ok(())
}

fn validate_timeout(timeout: &Duration) -> Result<(), ValidationError> {
    let millis = timeout.as_millis();
    if millis < 1 || millis > 300_000 {
        return Err(ValidationError::new("timeout_out_of_range"));
    }
    Ok(())
}

fn validate_interval(interval: &Duration) -> Result<(), ValidationError> {
    let millis = interval.as_millis();
    if millis < 100 || millis > 86_400_000 {
        return Err(ValidationError::new("interval_out_of_range"));
    }
    Ok(())
}

// Configuration loading implementation

impl Config {
    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to the runtime service configuration
    pub fn to_service_config(&self) -> ServiceConfig {
        ServiceConfig {
            urls: self.services.iter().map(|s| s.trim().to_string()).collect(),
            pool: PoolConfig {
                worker_count: self.pool.workers,
                queue_capacity: self.pool.queue_capacity,
            },
            result_capacity: self.pool.result_capacity,
            timeout: self.probe.timeout,
            interval: self.schedule.interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let yaml = r#"
services:
  - https://example.com
  - http://localhost:8080/health
"#;

        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.services.len(), 2);
        assert_eq!(config.pool.workers, 3);
        assert_eq!(config.pool.queue_capacity, 100);
        assert_eq!(config.pool.result_capacity, 100);
        assert_eq!(config.probe.timeout, Duration::from_secs(3));
        assert_eq!(config.schedule.interval, Duration::from_secs(20));
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn test_full_yaml_parsing() {
        let yaml = r#"
services:
  - https://example.com

pool:
  workers: 8
  queue_capacity: 500
  result_capacity: 50

probe:
  timeout: 1500ms

schedule:
  interval: 1m

logging:
  level: debug
  format: json
"#;

        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.pool.workers, 8);
        assert_eq!(config.pool.queue_capacity, 500);
        assert_eq!(config.pool.result_capacity, 50);
        assert_eq!(config.probe.timeout, Duration::from_millis(1500));
        assert_eq!(config.schedule.interval, Duration::from_secs(60));
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.logging.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let yaml = r#"
services: [https://example.com]
pool:
  workers: 5
"#;

        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.pool.workers, 5);
        assert_eq!(config.pool.queue_capacity, 100);
    }

    #[test]
    fn test_missing_services_is_parse_error() {
        let yaml = r#"
pool:
  workers: 2
"#;

        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_empty_services_is_invalid() {
        assert!(matches!(
            Config::from_yaml("services: []"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            Config::from_yaml("services: ['  ']"),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_invalid_worker_count() {
        let yaml = r#"
services: [https://example.com]
pool:
  workers: 0  # Invalid: < 1
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_invalid_durations() {
        let yaml = r#"
services: [https://example.com]
probe:
  timeout: 10m  # Invalid: > 5m
"#;
        assert!(Config::from_yaml(yaml).is_err());

        let yaml = r#"
services: [https://example.com]
schedule:
  interval: 10ms  # Invalid: < 100ms
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_malformed_urls_are_accepted() {
        // Reported per probe, not at startup
        let config = Config::from_yaml("services: ['not a url']").unwrap();
        assert_eq!(config.services, vec!["not a url".to_string()]);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Config::load_from_file("/nonexistent/healthchecker.yaml"),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_config_to_service_config_conversion() {
        let yaml = r#"
services:
  - " https://example.com "
pool:
  workers: 2
  queue_capacity: 10
probe:
  timeout: 500ms
schedule:
  interval: 5s
"#;
        let service_config = Config::from_yaml(yaml).unwrap().to_service_config();

        assert_eq!(service_config.urls, vec!["https://example.com".to_string()]);
        assert_eq!(service_config.pool.worker_count, 2);
        assert_eq!(service_config.pool.queue_capacity, 10);
        assert_eq!(service_config.result_capacity, 100);
        assert_eq!(service_config.timeout, Duration::from_millis(500));
        assert_eq!(service_config.interval, Duration::from_secs(5));
    }
}

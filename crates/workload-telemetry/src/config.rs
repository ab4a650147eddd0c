// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::constants::{
    DEFAULT_FAILURE_PROBABILITY, DEFAULT_ITERATIONS, DEFAULT_LOG_GROUP, DEFAULT_METRIC_NAMESPACE,
    DEFAULT_REGION, DEFAULT_REQUEST_TIMEOUT_SECS, MAX_LOG_GROUP_NAME_LEN,
};
use crate::error::ConfigError;
use crate::util::parse_metric_namespace;
use std::env;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Value ranges and error rate used to synthesize the workload.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationProfile {
    /// Simulated processing time of one request, in seconds
    pub processing_secs: RangeInclusive<f64>,
    /// Requests reported per iteration
    pub request_count: RangeInclusive<u32>,
    /// Reported memory utilization, in percent
    pub memory_percent: RangeInclusive<f64>,
    /// Probability that an iteration is classified as failed
    pub failure_probability: f64,
}

impl Default for SimulationProfile {
    fn default() -> Self {
        Self {
            processing_secs: 0.1..=2.0,
            request_count: 1..=10,
            memory_percent: 30.0..=90.0,
            failure_probability: DEFAULT_FAILURE_PROBABILITY,
        }
    }
}

impl SimulationProfile {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.failure_probability) {
            return Err(ConfigError::Invalid(format!(
                "Failure probability must be within [0, 1], got {}",
                self.failure_probability
            )));
        }
        check_range("processing time", &self.processing_secs)?;
        check_range("memory utilization", &self.memory_percent)?;
        if self.request_count.start() > self.request_count.end() {
            return Err(ConfigError::Invalid(format!(
                "Request count range {:?} is empty",
                self.request_count
            )));
        }
        if *self.processing_secs.start() < 0.0 {
            return Err(ConfigError::Invalid(
                "Processing time cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_range(what: &str, range: &RangeInclusive<f64>) -> Result<(), ConfigError> {
    if !range.start().is_finite() || !range.end().is_finite() || range.start() > range.end() {
        return Err(ConfigError::Invalid(format!(
            "{what} range {range:?} is empty or not finite"
        )));
    }
    Ok(())
}

/// Configuration for the workload simulation and its telemetry destinations
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Log group that receives the narration stream
    pub log_group: String,
    /// Grouping key for every published metric
    pub namespace: String,
    /// Backend region, used to derive default endpoints
    pub region: String,
    /// Overrides the logs endpoint (mostly for tests and local proxies)
    pub logs_url: Option<String>,
    /// Overrides the metrics endpoint
    pub metrics_url: Option<String>,
    /// HTTPS proxy URL
    pub https_proxy: Option<String>,
    /// Timeout for each backend request
    pub request_timeout: Duration,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
    /// Number of simulated requests per run
    pub iterations: u32,
    pub simulation: SimulationProfile,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_group: DEFAULT_LOG_GROUP.to_string(),
            namespace: DEFAULT_METRIC_NAMESPACE.to_string(),
            region: DEFAULT_REGION.to_string(),
            logs_url: None,
            metrics_url: None,
            https_proxy: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_level: "info".to_string(),
            iterations: DEFAULT_ITERATIONS,
            simulation: SimulationProfile::default(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let log_group = env::var("TELEMETRY_LOG_GROUP")
            .map(|val| val.trim().to_string())
            .unwrap_or(defaults.log_group);
        let namespace = match env::var("TELEMETRY_METRIC_NAMESPACE") {
            Ok(val) => parse_metric_namespace(&val).ok_or_else(|| {
                ConfigError::Invalid(format!("Invalid metric namespace '{val}'"))
            })?,
            Err(_) => defaults.namespace,
        };
        let region = env::var("TELEMETRY_REGION").unwrap_or(defaults.region);
        let logs_url = env::var("TELEMETRY_LOGS_URL").ok();
        let metrics_url = env::var("TELEMETRY_METRICS_URL").ok();
        let https_proxy = env::var("TELEMETRY_PROXY_HTTPS")
            .or_else(|_| env::var("HTTPS_PROXY"))
            .ok();
        let request_timeout = env::var("TELEMETRY_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        let log_level = env::var("TELEMETRY_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or(defaults.log_level);
        let iterations = env::var("TELEMETRY_ITERATIONS")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(defaults.iterations);
        let failure_probability = env::var("TELEMETRY_FAILURE_PROBABILITY")
            .ok()
            .and_then(|val| val.parse::<f64>().ok())
            .unwrap_or(defaults.simulation.failure_probability);

        let config = Self {
            log_group,
            namespace,
            region,
            logs_url,
            metrics_url,
            https_proxy,
            request_timeout,
            log_level,
            iterations,
            simulation: SimulationProfile {
                failure_probability,
                ..defaults.simulation
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let group = self.log_group.as_str();
        if group.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "TELEMETRY_LOG_GROUP cannot be empty".to_string(),
            ));
        }
        if group.trim() != group {
            return Err(ConfigError::Invalid(format!(
                "TELEMETRY_LOG_GROUP '{group}' has surrounding whitespace"
            )));
        }
        if group.len() > MAX_LOG_GROUP_NAME_LEN {
            return Err(ConfigError::Invalid(format!(
                "TELEMETRY_LOG_GROUP cannot exceed {MAX_LOG_GROUP_NAME_LEN} characters"
            )));
        }

        if parse_metric_namespace(&self.namespace).is_none() {
            return Err(ConfigError::Invalid(format!(
                "Invalid metric namespace '{}'",
                self.namespace
            )));
        }

        if self.region.trim().is_empty() && (self.logs_url.is_none() || self.metrics_url.is_none())
        {
            return Err(ConfigError::Invalid(
                "TELEMETRY_REGION cannot be empty unless both endpoints are overridden"
                    .to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        self.simulation.validate()
    }

    pub fn logs_endpoint(&self) -> String {
        self.logs_url
            .clone()
            .unwrap_or_else(|| format!("https://logs.{}.amazonaws.com", self.region))
    }

    pub fn metrics_endpoint(&self) -> String {
        self.metrics_url
            .clone()
            .unwrap_or_else(|| format!("https://monitoring.{}.amazonaws.com", self.region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duplicate::duplicate_item;
    use serial_test::serial;

    const ENV_VARS: [&str; 11] = [
        "TELEMETRY_LOG_GROUP",
        "TELEMETRY_METRIC_NAMESPACE",
        "TELEMETRY_REGION",
        "TELEMETRY_LOGS_URL",
        "TELEMETRY_METRICS_URL",
        "TELEMETRY_PROXY_HTTPS",
        "HTTPS_PROXY",
        "TELEMETRY_REQUEST_TIMEOUT_SECS",
        "TELEMETRY_LOG_LEVEL",
        "TELEMETRY_ITERATIONS",
        "TELEMETRY_FAILURE_PROBABILITY",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = TelemetryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.iterations, 100);
        assert_eq!(config.log_group, "/aws/application/logs");
        assert_eq!(config.namespace, "Application/Custom");
    }

    #[test]
    fn test_validate_empty_log_group() {
        let config = TelemetryConfig {
            log_group: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_padded_log_group() {
        let config = TelemetryConfig {
            log_group: " /aws/application/logs ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let config = TelemetryConfig {
            log_level: "verbose".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_failure_probability_out_of_range() {
        for p in [-0.1, 1.5, f64::NAN] {
            let config = TelemetryConfig {
                simulation: SimulationProfile {
                    failure_probability: p,
                    ..Default::default()
                },
                ..Default::default()
            };
            assert!(config.validate().is_err(), "probability {p} should be rejected");
        }
    }

    #[test]
    fn test_validate_inverted_ranges() {
        #[allow(clippy::reversed_empty_ranges)]
        let profile = SimulationProfile {
            memory_percent: 90.0..=30.0,
            ..Default::default()
        };
        assert!(profile.validate().is_err());

        #[allow(clippy::reversed_empty_ranges)]
        let profile = SimulationProfile {
            request_count: 10..=1,
            ..Default::default()
        };
        assert!(profile.validate().is_err());

        let profile = SimulationProfile {
            processing_secs: -1.0..=1.0,
            ..Default::default()
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_validate_empty_region_requires_overrides() {
        let config = TelemetryConfig {
            region: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TelemetryConfig {
            region: String::new(),
            logs_url: Some("http://127.0.0.1:4566".to_string()),
            metrics_url: Some("http://127.0.0.1:4566".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[duplicate_item(
        test_name                   region_name         expected_logs                               expected_metrics;
        [test_us_east_1_endpoints]  ["us-east-1"]       ["https://logs.us-east-1.amazonaws.com"]    ["https://monitoring.us-east-1.amazonaws.com"];
        [test_eu_west_1_endpoints]  ["eu-west-1"]       ["https://logs.eu-west-1.amazonaws.com"]    ["https://monitoring.eu-west-1.amazonaws.com"];
        [test_ap_south_1_endpoints] ["ap-south-1"]      ["https://logs.ap-south-1.amazonaws.com"]   ["https://monitoring.ap-south-1.amazonaws.com"];
    )]
    #[test]
    fn test_name() {
        let config = TelemetryConfig {
            region: region_name.to_string(),
            ..Default::default()
        };
        assert_eq!(config.logs_endpoint(), expected_logs);
        assert_eq!(config.metrics_endpoint(), expected_metrics);
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = TelemetryConfig::from_env().expect("default env should be valid");
        assert_eq!(config.log_group, "/aws/application/logs");
        assert_eq!(config.iterations, 100);
        assert_eq!(config.simulation, SimulationProfile::default());
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var("TELEMETRY_LOG_GROUP", " /demo/logs ");
        env::set_var("TELEMETRY_METRIC_NAMESPACE", " Demo/Workload ");
        env::set_var("TELEMETRY_ITERATIONS", "7");
        env::set_var("TELEMETRY_FAILURE_PROBABILITY", "0.5");
        env::set_var("TELEMETRY_LOGS_URL", "http://127.0.0.1:4566");
        env::set_var("TELEMETRY_LOG_LEVEL", "DEBUG");
        env::set_var("HTTPS_PROXY", "http://proxy.local:3128");

        let config = TelemetryConfig::from_env().expect("overrides should be valid");
        assert_eq!(config.log_group, "/demo/logs");
        assert_eq!(config.namespace, "Demo/Workload");
        assert_eq!(config.iterations, 7);
        assert_eq!(config.simulation.failure_probability, 0.5);
        assert_eq!(config.logs_endpoint(), "http://127.0.0.1:4566");
        assert_eq!(
            config.metrics_endpoint(),
            "https://monitoring.us-east-1.amazonaws.com"
        );
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.https_proxy.as_deref(),
            Some("http://proxy.local:3128")
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_unparseable_numbers_fall_back() {
        clear_env();
        env::set_var("TELEMETRY_ITERATIONS", "many");
        env::set_var("TELEMETRY_REQUEST_TIMEOUT_SECS", "soon");
        let config = TelemetryConfig::from_env().expect("fallbacks should be valid");
        assert_eq!(config.iterations, 100);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_namespace() {
        clear_env();
        env::set_var("TELEMETRY_METRIC_NAMESPACE", "AWS/Reserved");
        assert!(TelemetryConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_probability() {
        clear_env();
        env::set_var("TELEMETRY_FAILURE_PROBABILITY", "2");
        let err = TelemetryConfig::from_env().expect_err("probability 2 should be rejected");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: Failure probability must be within [0, 1], got 2"
        );
        clear_env();
    }
}

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use reqwest::StatusCode;

/// Failure to deliver a single log record or metric batch.
///
/// These are never fatal: callers log them on the diagnostic channel and move on.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Error sending request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{status}: backend rejected request: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Sequencing cursor rejected as stale: {0}")]
    StaleCursor(String),

    #[error("Request throttled: {0}")]
    Throttled(String),

    #[error("Refusing to publish an empty metric batch")]
    EmptyBatch,

    #[error("Failed to prepare payload: {0}")]
    Payload(String),
}

/// Stream creation failed for a reason other than the stream already existing.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Failed to create log stream {group}:{stream}: {reason}")]
    StreamCreation {
        group: String,
        stream: String,
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_error_display() {
        let error = DeliveryError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "500 Internal Server Error: backend rejected request: boom"
        );
        assert_eq!(
            DeliveryError::EmptyBatch.to_string(),
            "Refusing to publish an empty metric batch"
        );
    }

    #[test]
    fn test_setup_error_display() {
        let error = SetupError::StreamCreation {
            group: "/aws/application/logs".to_string(),
            stream: "app-instance-1".to_string(),
            reason: "AccessDeniedException".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to create log stream /aws/application/logs:app-instance-1: AccessDeniedException"
        );
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::Invalid("failure probability out of range".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid configuration: failure probability out of range"
        );
    }
}

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Utility functions for naming log streams and metric namespaces.

use crate::constants::{MAX_METRIC_NAMESPACE_LEN, STREAM_NAME_PREFIX};

/// Parses and validates a metric namespace according to the backend's naming rules.
///
/// A valid namespace must:
/// - Not be empty or contain only whitespace
/// - Be at most 255 characters long
/// - Not start with the reserved `AWS/` prefix
/// - Contain only ASCII alphanumerics, spaces, or one of `. - _ / # :`
///
/// Whitespace is automatically trimmed from the input.
///
/// # Examples
///
/// ```
/// use workload_telemetry::util::parse_metric_namespace;
///
/// assert_eq!(parse_metric_namespace("Application/Custom"), Some("Application/Custom".to_string()));
/// assert_eq!(parse_metric_namespace("AWS/EC2"), None);
/// assert_eq!(parse_metric_namespace("my@app"), None);
/// ```
pub fn parse_metric_namespace(namespace: &str) -> Option<String> {
    let trimmed = namespace.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.len() > MAX_METRIC_NAMESPACE_LEN {
        tracing::error!(
            "TELEMETRY_METRIC_NAMESPACE is longer than {} characters. Ignoring namespace.",
            MAX_METRIC_NAMESPACE_LEN
        );
        return None;
    }

    if trimmed.starts_with("AWS/") {
        tracing::error!(
            "TELEMETRY_METRIC_NAMESPACE must not use the reserved 'AWS/' prefix, got: '{}'. Ignoring namespace.",
            trimmed
        );
        return None;
    }

    if let Some(invalid_char) = trimmed.chars().find(|&ch| {
        !ch.is_ascii_alphanumeric() && !matches!(ch, '.' | '-' | '_' | '/' | '#' | ':' | ' ')
    }) {
        tracing::error!(
            "TELEMETRY_METRIC_NAMESPACE contains invalid character '{}' in '{}'. Ignoring namespace.",
            invalid_char,
            trimmed
        );
        return None;
    }

    Some(trimmed.to_string())
}

/// Stream name unique to this process: start time in seconds plus the pid, so
/// two instances launched in the same second still write to distinct streams.
pub fn process_stream_name(started_at_secs: i64) -> String {
    format!(
        "{}-{}-{}",
        STREAM_NAME_PREFIX,
        started_at_secs,
        std::process::id()
    )
}

/// [`process_stream_name`] for a process starting now.
pub fn current_process_stream_name() -> String {
    process_stream_name(chrono::Utc::now().timestamp())
}

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, SecondsFormat, Utc};
use derive_more::{Display, Into};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[display("INFO")]
    Info,
    #[display("ERROR")]
    Error,
}

/// Opaque proof-of-last-write token handed out by the log backend.
///
/// Only the backend gives these meaning; the writer stores the latest one and
/// presents it on the next append.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Into, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequencingCursor(String);

impl SequencingCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub severity: Severity,
    pub message: String,
}

impl LogRecord {
    pub fn new(timestamp_ms: i64, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp_ms,
            severity,
            message: message.into(),
        }
    }

    /// Text shipped to the backend: `[LEVEL] <iso-8601 time> - <message>`.
    pub fn rendered(&self) -> String {
        let at = DateTime::<Utc>::from_timestamp_millis(self.timestamp_ms)
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        format!("[{}] {} - {}", self.severity, at, self.message)
    }
}

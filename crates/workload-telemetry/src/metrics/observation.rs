// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Serialize, Serializer};

/// Units understood by the metrics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum Unit {
    Count,
    Milliseconds,
    Seconds,
    Percent,
    Bytes,
    None,
}

/// One named, timestamped sample. Observations are independent of each other.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricObservation {
    #[serde(rename = "MetricName")]
    pub name: String,
    pub value: f64,
    pub unit: Unit,
    #[serde(serialize_with = "epoch_seconds")]
    pub timestamp: DateTime<Utc>,
}

impl MetricObservation {
    /// Observation stamped with the current wall-clock time.
    pub fn new(name: impl Into<String>, value: f64, unit: Unit) -> Self {
        Self::at(name, value, unit, Utc::now())
    }

    pub fn at(name: impl Into<String>, value: f64, unit: Unit, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            value,
            unit,
            timestamp,
        }
    }
}

// The JSON protocol encodes timestamps as fractional epoch seconds.
#[allow(clippy::cast_precision_loss)]
fn epoch_seconds<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(ts.timestamp_millis() as f64 / 1000.0)
}

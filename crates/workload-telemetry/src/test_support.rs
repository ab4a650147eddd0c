// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-memory backends and a scripted random source for unit tests.

#![allow(clippy::unwrap_used)]

use crate::emitter::RandomSource;
use crate::error::{DeliveryError, SetupError};
use crate::logs::{LogBackend, LogRecord, PutOutcome, SequencingCursor, StreamCreation};
use crate::metrics::{MetricObservation, MetricSink};
use async_trait::async_trait;
use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::sync::Mutex;

/// Log backend that keeps every accepted record, or rejects everything.
#[derive(Default)]
pub(crate) struct RecordingLogBackend {
    records: Mutex<Vec<LogRecord>>,
    unavailable: bool,
}

impl RecordingLogBackend {
    pub(crate) fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub(crate) fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogBackend for RecordingLogBackend {
    async fn create_stream(
        &self,
        _group: &str,
        _stream: &str,
    ) -> Result<StreamCreation, SetupError> {
        Ok(StreamCreation::Created)
    }

    async fn put_record(
        &self,
        _group: &str,
        _stream: &str,
        record: &LogRecord,
        _cursor: Option<&SequencingCursor>,
    ) -> Result<PutOutcome, DeliveryError> {
        if self.unavailable {
            return Err(DeliveryError::Throttled("Rate exceeded".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        records.push(record.clone());
        Ok(PutOutcome::accepted(Some(SequencingCursor::new(
            records.len().to_string(),
        ))))
    }
}

/// Metric sink that keeps every published observation, failing on chosen names.
#[derive(Default)]
pub(crate) struct RecordingMetricSink {
    published: Mutex<Vec<(String, MetricObservation)>>,
    failing: HashSet<String>,
}

impl RecordingMetricSink {
    pub(crate) fn failing_on(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|name| (*name).to_string()).collect(),
            ..Default::default()
        }
    }

    pub(crate) fn observations(&self) -> Vec<MetricObservation> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(_, o)| o.clone())
            .collect()
    }

    pub(crate) fn namespaces(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(ns, _)| ns.clone())
            .collect()
    }
}

#[async_trait]
impl MetricSink for RecordingMetricSink {
    async fn publish(
        &self,
        namespace: &str,
        observations: &[MetricObservation],
    ) -> Result<(), DeliveryError> {
        if observations.is_empty() {
            return Err(DeliveryError::EmptyBatch);
        }
        if observations.iter().any(|o| self.failing.contains(&o.name)) {
            return Err(DeliveryError::Payload("scripted failure".to_string()));
        }
        self.published.lock().unwrap().extend(
            observations
                .iter()
                .map(|o| (namespace.to_string(), o.clone())),
        );
        Ok(())
    }
}

/// Always draws the low end of every range and a fixed failure outcome.
pub(crate) struct FixedRandomSource {
    fail: bool,
}

impl FixedRandomSource {
    pub(crate) fn failing() -> Self {
        Self { fail: true }
    }

    pub(crate) fn succeeding() -> Self {
        Self { fail: false }
    }
}

impl RandomSource for FixedRandomSource {
    fn uniform(&mut self, range: &RangeInclusive<f64>) -> f64 {
        *range.start()
    }

    fn integer(&mut self, range: &RangeInclusive<u32>) -> u32 {
        *range.start()
    }

    fn chance(&mut self, _probability: f64) -> bool {
        self.fail
    }
}

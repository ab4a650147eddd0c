// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Simulated workload that narrates itself through a log stream and reports
//! numeric signals to a metric sink.
//!
//! Each iteration is one simulated request:
//!
//! 1. suspend for the simulated processing time
//! 2. `ProcessingTime` (ms) and `RequestCount`
//! 3. one INFO or ERROR log line, then `SuccessCount` or `ErrorCount`
//! 4. `MemoryUtilization` (%)
//! 5. a progress line on stdout
//!
//! Delivery problems never stop the loop. A failed metric is narrated as an
//! ERROR record; a failed log append is reported by the writer and dropped.

use crate::config::SimulationProfile;
use crate::constants::{
    ERROR_COUNT, MEMORY_UTILIZATION, PROCESSING_TIME, REQUEST_COUNT, SUCCESS_COUNT,
};
use crate::logs::{LogStreamWriter, Severity};
use crate::metrics::{MetricObservation, MetricSink, Unit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Source of every random draw the simulation makes.
pub trait RandomSource: Send {
    /// Uniform draw from `range`, inclusive on both ends.
    fn uniform(&mut self, range: &RangeInclusive<f64>) -> f64;
    /// Uniform integer from `range`, inclusive on both ends.
    fn integer(&mut self, range: &RangeInclusive<u32>) -> u32;
    /// `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool;
}

pub struct StdRandomSource(StdRng);

impl StdRandomSource {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for StdRandomSource {
    fn uniform(&mut self, range: &RangeInclusive<f64>) -> f64 {
        let (low, high) = (*range.start(), *range.end());
        if low < high {
            self.0.gen_range(low..=high)
        } else {
            low
        }
    }

    fn integer(&mut self, range: &RangeInclusive<u32>) -> u32 {
        let (low, high) = (*range.start(), *range.end());
        if low < high {
            self.0.gen_range(low..=high)
        } else {
            low
        }
    }

    fn chance(&mut self, probability: f64) -> bool {
        if probability.is_nan() || probability <= 0.0 {
            false
        } else if probability >= 1.0 {
            true
        } else {
            self.0.gen_bool(probability)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    NotStarted,
    Running,
    Completed,
    /// The shutdown token fired during a simulated request.
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub state: RunState,
    /// Iterations that ran to the end
    pub iterations: u32,
    /// Iterations classified as failed by the simulation
    pub failures: u32,
    pub metrics_sent: u32,
    pub metrics_failed: u32,
}

pub struct TelemetryEmitter {
    writer: LogStreamWriter,
    sink: Arc<dyn MetricSink + Send + Sync>,
    namespace: String,
    profile: SimulationProfile,
    rng: Box<dyn RandomSource>,
    cancel: CancellationToken,
    state: RunState,
}

impl TelemetryEmitter {
    pub fn new(
        writer: LogStreamWriter,
        sink: Arc<dyn MetricSink + Send + Sync>,
        namespace: impl Into<String>,
        profile: SimulationProfile,
    ) -> Self {
        Self {
            writer,
            sink,
            namespace: namespace.into(),
            profile,
            rng: Box::new(StdRandomSource::from_entropy()),
            cancel: CancellationToken::new(),
            state: RunState::NotStarted,
        }
    }

    #[must_use]
    pub fn with_random_source(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    /// Lets `token` interrupt the simulated processing delay.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn writer(&self) -> &LogStreamWriter {
        &self.writer
    }

    /// Runs `iteration_count` simulated requests. An emitter runs once; later
    /// calls return immediately with the terminal state.
    pub async fn run(&mut self, iteration_count: u32) -> RunSummary {
        let mut summary = RunSummary::default();
        if self.state != RunState::NotStarted {
            warn!("Workload already ran ({:?}), ignoring run", self.state);
            summary.state = self.state;
            return summary;
        }

        self.state = RunState::Running;
        info!(
            "Starting {iteration_count} simulated requests, narrating to {}:{}",
            self.writer.group(),
            self.writer.stream_name()
        );
        self.writer.append(Severity::Info, "Application started").await;

        for i in 0..iteration_count {
            let processing_secs = self.rng.uniform(&self.profile.processing_secs);
            if !self.simulate_work(processing_secs).await {
                warn!("Workload cancelled after {i} of {iteration_count} requests");
                self.writer
                    .append(
                        Severity::Info,
                        format!("Application cancelled after {i} requests"),
                    )
                    .await;
                self.state = RunState::Cancelled;
                summary.state = self.state;
                return summary;
            }

            self.emit_metric(
                PROCESSING_TIME,
                processing_secs * 1000.0,
                Unit::Milliseconds,
                &mut summary,
            )
            .await;

            let request_count = self.rng.integer(&self.profile.request_count);
            self.emit_metric(
                REQUEST_COUNT,
                f64::from(request_count),
                Unit::Count,
                &mut summary,
            )
            .await;

            if self.rng.chance(self.profile.failure_probability) {
                summary.failures += 1;
                self.writer
                    .append(Severity::Error, format!("Processing failed for request {i}"))
                    .await;
                self.emit_metric(ERROR_COUNT, 1.0, Unit::Count, &mut summary)
                    .await;
            } else {
                self.writer
                    .append(
                        Severity::Info,
                        format!("Successfully processed request {i}"),
                    )
                    .await;
                self.emit_metric(SUCCESS_COUNT, 1.0, Unit::Count, &mut summary)
                    .await;
            }

            let memory_percent = self.rng.uniform(&self.profile.memory_percent);
            self.emit_metric(
                MEMORY_UTILIZATION,
                memory_percent,
                Unit::Percent,
                &mut summary,
            )
            .await;

            summary.iterations += 1;
            println!("Processed request {}/{}", i + 1, iteration_count);
        }

        self.writer
            .append(Severity::Info, "Application completed")
            .await;
        self.state = RunState::Completed;
        summary.state = self.state;
        info!(
            "Workload completed: {} requests, {} failed, {} metrics sent, {} metrics failed",
            summary.iterations, summary.failures, summary.metrics_sent, summary.metrics_failed
        );
        summary
    }

    /// Returns `false` if cancelled before the simulated work finished.
    async fn simulate_work(&self, secs: f64) -> bool {
        let duration = Duration::try_from_secs_f64(secs).unwrap_or_default();
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => false,
            () = tokio::time::sleep(duration) => true,
        }
    }

    async fn emit_metric(&mut self, name: &str, value: f64, unit: Unit, summary: &mut RunSummary) {
        let observation = MetricObservation::new(name, value, unit);
        match self
            .sink
            .publish(&self.namespace, std::slice::from_ref(&observation))
            .await
        {
            Ok(()) => {
                summary.metrics_sent += 1;
                debug!("Sent metric {name}: {value}");
            }
            Err(e) => {
                summary.metrics_failed += 1;
                error!("Failed to send metric {name}: {e}");
                self.writer
                    .append(Severity::Error, format!("Failed to send metric {name}: {e}"))
                    .await;
            }
        }
    }
}

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::SetupError;
use crate::logs::backend::{LogBackend, PutOutcome, StreamCreation};
use crate::logs::record::{LogRecord, SequencingCursor, Severity};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Delivered,
    /// The backend did not accept the record; it has been discarded.
    Dropped,
}

/// Ordered, single-writer appender for one log stream.
///
/// Each append presents the cursor returned by the previous successful
/// append. A failed append drops its record and keeps the last good cursor,
/// so the next append retries the same sequence position. The writer is not
/// meant to be shared: one stream, one writer, one loop.
pub struct LogStreamWriter {
    backend: Arc<dyn LogBackend + Send + Sync>,
    group: String,
    stream_name: String,
    cursor: Option<SequencingCursor>,
    last_timestamp_ms: i64,
    delivered: u64,
    dropped: u64,
}

impl LogStreamWriter {
    /// Binds a writer to `group/stream_name` without touching the backend.
    pub fn new(
        backend: Arc<dyn LogBackend + Send + Sync>,
        group: impl Into<String>,
        stream_name: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            group: group.into(),
            stream_name: stream_name.into(),
            cursor: None,
            last_timestamp_ms: i64::MIN,
            delivered: 0,
            dropped: 0,
        }
    }

    /// Binds a writer and makes sure its stream exists.
    pub async fn connect(
        backend: Arc<dyn LogBackend + Send + Sync>,
        group: impl Into<String>,
        stream_name: impl Into<String>,
    ) -> Result<Self, SetupError> {
        let writer = Self::new(backend, group, stream_name);
        writer.ensure_stream().await?;
        Ok(writer)
    }

    /// Idempotent: a stream that already exists is not an error.
    pub async fn ensure_stream(&self) -> Result<StreamCreation, SetupError> {
        let outcome = self
            .backend
            .create_stream(&self.group, &self.stream_name)
            .await?;
        debug!(
            "Log stream {}:{} ready ({:?})",
            self.group, self.stream_name, outcome
        );
        Ok(outcome)
    }

    /// Appends one record stamped with the current time.
    ///
    /// Never fails: delivery errors are reported locally and the record is
    /// dropped. A cursor issued alongside a refused record is still kept.
    pub async fn append(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
    ) -> AppendOutcome {
        let timestamp_ms = self.next_timestamp(Utc::now().timestamp_millis());
        let record = LogRecord::new(timestamp_ms, severity, message);

        match self
            .backend
            .put_record(
                &self.group,
                &self.stream_name,
                &record,
                self.cursor.as_ref(),
            )
            .await
        {
            Ok(PutOutcome { next, rejected }) => {
                if let Some(next) = next {
                    self.cursor = Some(next);
                }
                match rejected {
                    Some(reason) => {
                        error!("Failed to send log: record rejected: {reason}");
                        self.dropped += 1;
                        AppendOutcome::Dropped
                    }
                    None => {
                        self.delivered += 1;
                        AppendOutcome::Delivered
                    }
                }
            }
            Err(e) => {
                error!("Failed to send log: {e}");
                self.dropped += 1;
                AppendOutcome::Dropped
            }
        }
    }

    /// Clamps `now_ms` so timestamps on this stream never go backwards.
    fn next_timestamp(&mut self, now_ms: i64) -> i64 {
        let timestamp_ms = now_ms.max(self.last_timestamp_ms);
        self.last_timestamp_ms = timestamp_ms;
        timestamp_ms
    }

    pub fn cursor(&self) -> Option<&SequencingCursor> {
        self.cursor.as_ref()
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::{DeliveryError, SetupError};
use crate::http::{post_operation, ShippingError};
use crate::logs::record::{LogRecord, SequencingCursor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const LOGS_CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const CREATE_LOG_STREAM_TARGET: &str = "Logs_20140328.CreateLogStream";
const PUT_LOG_EVENTS_TARGET: &str = "Logs_20140328.PutLogEvents";

/// Outcome of an idempotent stream creation that is not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamCreation {
    Created,
    AlreadyExists,
}

/// Result of an append call the backend answered successfully.
///
/// The backend can refuse the record itself and still issue the next cursor;
/// that cursor must be kept or later appends present a used-up position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOutcome {
    pub next: Option<SequencingCursor>,
    /// Why the record was refused, if it was.
    pub rejected: Option<&'static str>,
}

impl PutOutcome {
    pub fn accepted(next: Option<SequencingCursor>) -> Self {
        Self {
            next,
            rejected: None,
        }
    }

    pub fn rejected(next: Option<SequencingCursor>, reason: &'static str) -> Self {
        Self {
            next,
            rejected: Some(reason),
        }
    }
}

#[async_trait]
pub trait LogBackend {
    /// Creates `group/stream`. An existing stream is reported as
    /// [`StreamCreation::AlreadyExists`], never as an error.
    async fn create_stream(&self, group: &str, stream: &str)
        -> Result<StreamCreation, SetupError>;

    /// Appends one record. `cursor` is `None` only for the first append to a
    /// stream; on success the backend returns the cursor for the next append,
    /// even when it refused the record.
    async fn put_record(
        &self,
        group: &str,
        stream: &str,
        record: &LogRecord,
        cursor: Option<&SequencingCursor>,
    ) -> Result<PutOutcome, DeliveryError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateLogStreamRequest<'a> {
    log_group_name: &'a str,
    log_stream_name: &'a str,
}

#[derive(Serialize)]
struct InputLogEvent {
    timestamp: i64,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PutLogEventsRequest<'a> {
    log_group_name: &'a str,
    log_stream_name: &'a str,
    log_events: [InputLogEvent; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    sequence_token: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RejectedLogEventsInfo {
    too_new_log_event_start_index: Option<i64>,
    too_old_log_event_end_index: Option<i64>,
    expired_log_event_end_index: Option<i64>,
}

impl RejectedLogEventsInfo {
    fn reason(&self) -> Option<&'static str> {
        if self.too_new_log_event_start_index.is_some() {
            Some("timestamp too far in the future")
        } else if self.too_old_log_event_end_index.is_some() {
            Some("timestamp too old")
        } else if self.expired_log_event_end_index.is_some() {
            Some("timestamp past retention")
        } else {
            None
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PutLogEventsResponse {
    next_sequence_token: Option<String>,
    rejected_log_events_info: Option<RejectedLogEventsInfo>,
}

/// [`LogBackend`] speaking the CloudWatch Logs JSON protocol.
#[derive(Debug, Clone)]
pub struct HttpLogBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpLogBackend {
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl LogBackend for HttpLogBackend {
    async fn create_stream(
        &self,
        group: &str,
        stream: &str,
    ) -> Result<StreamCreation, SetupError> {
        let body = CreateLogStreamRequest {
            log_group_name: group,
            log_stream_name: stream,
        };
        match post_operation(
            &self.client,
            &self.endpoint,
            CREATE_LOG_STREAM_TARGET,
            LOGS_CONTENT_TYPE,
            &body,
        )
        .await
        {
            Ok(_) => Ok(StreamCreation::Created),
            Err(e) if e.kind() == Some("ResourceAlreadyExistsException") => {
                debug!("Log stream {group}:{stream} already exists");
                Ok(StreamCreation::AlreadyExists)
            }
            Err(e) => Err(SetupError::StreamCreation {
                group: group.to_string(),
                stream: stream.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn put_record(
        &self,
        group: &str,
        stream: &str,
        record: &LogRecord,
        cursor: Option<&SequencingCursor>,
    ) -> Result<PutOutcome, DeliveryError> {
        let body = PutLogEventsRequest {
            log_group_name: group,
            log_stream_name: stream,
            log_events: [InputLogEvent {
                timestamp: record.timestamp_ms,
                message: record.rendered(),
            }],
            sequence_token: cursor.map(SequencingCursor::as_str),
        };
        let bytes = post_operation(
            &self.client,
            &self.endpoint,
            PUT_LOG_EVENTS_TARGET,
            LOGS_CONTENT_TYPE,
            &body,
        )
        .await?;

        let resp: PutLogEventsResponse = if bytes.is_empty() {
            PutLogEventsResponse::default()
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| ShippingError::Payload(format!("unreadable response: {e}")))?
        };

        let next = resp.next_sequence_token.map(SequencingCursor::new);
        match resp
            .rejected_log_events_info
            .as_ref()
            .and_then(RejectedLogEventsInfo::reason)
        {
            Some(reason) => Ok(PutOutcome::rejected(next, reason)),
            None => Ok(PutOutcome::accepted(next)),
        }
    }
}

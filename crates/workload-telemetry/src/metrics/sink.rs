// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::constants::MAX_METRIC_DATUMS_PER_REQUEST;
use crate::error::DeliveryError;
use crate::http::post_operation;
use crate::metrics::observation::MetricObservation;
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

const METRICS_CONTENT_TYPE: &str = "application/x-amz-json-1.0";
const PUT_METRIC_DATA_TARGET: &str = "GraniteServiceVersion20100801.PutMetricData";

#[async_trait]
pub trait MetricSink {
    /// Publishes a non-empty batch of observations under `namespace`.
    async fn publish(
        &self,
        namespace: &str,
        observations: &[MetricObservation],
    ) -> Result<(), DeliveryError>;
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PutMetricDataRequest<'a> {
    namespace: &'a str,
    metric_data: &'a [MetricObservation],
}

/// [`MetricSink`] speaking the CloudWatch metrics JSON protocol.
#[derive(Debug, Clone)]
pub struct HttpMetricSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMetricSink {
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl MetricSink for HttpMetricSink {
    async fn publish(
        &self,
        namespace: &str,
        observations: &[MetricObservation],
    ) -> Result<(), DeliveryError> {
        if observations.is_empty() {
            return Err(DeliveryError::EmptyBatch);
        }
        if observations.len() > MAX_METRIC_DATUMS_PER_REQUEST {
            return Err(DeliveryError::Payload(format!(
                "{} observations exceed the limit of {MAX_METRIC_DATUMS_PER_REQUEST} per request",
                observations.len()
            )));
        }

        let body = PutMetricDataRequest {
            namespace,
            metric_data: observations,
        };
        post_operation(
            &self.client,
            &self.endpoint,
            PUT_METRIC_DATA_TARGET,
            METRICS_CONTENT_TYPE,
            &body,
        )
        .await?;
        debug!(
            "Published {} observations to {namespace}",
            observations.len()
        );
        Ok(())
    }
}

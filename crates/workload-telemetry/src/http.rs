// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP plumbing shared by the log and metric backends.
//!
//! Both backends speak the CloudWatch JSON protocol: every call is a `POST /`
//! whose operation is selected by the `X-Amz-Target` header, and whose errors
//! come back as a JSON body carrying an `__type` discriminator.

use crate::config::TelemetryConfig;
use crate::error::DeliveryError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error};

pub(crate) const TARGET_HEADER: &str = "X-Amz-Target";

/// Creates a reqwest client builder using rustls.
pub fn create_reqwest_client_builder() -> Result<ClientBuilder, Box<dyn Error>> {
    Ok(reqwest::Client::builder().use_rustls_tls())
}

/// Builds the client both backends share, falling back to a direct connection
/// when the proxy setting cannot be parsed.
#[must_use]
pub fn get_client(config: &TelemetryConfig) -> reqwest::Client {
    match build_client(config, true) {
        Ok(client) => client,
        Err(e) => {
            error!(
                "Unable to parse proxy configuration: {}, falling back to direct connection",
                e
            );
            match build_client(config, false) {
                Ok(client) => client,
                Err(inner) => {
                    error!(
                        "Failed to build HTTP client without proxy: {}, using reqwest defaults",
                        inner
                    );
                    reqwest::Client::new()
                }
            }
        }
    }
}

fn build_client(
    config: &TelemetryConfig,
    allow_proxy: bool,
) -> Result<reqwest::Client, Box<dyn Error>> {
    let mut client = create_reqwest_client_builder()?
        .timeout(config.request_timeout)
        .pool_idle_timeout(Some(Duration::from_secs(270)))
        .tcp_keepalive(Some(Duration::from_secs(120)));

    if allow_proxy {
        if let Some(https_proxy) = &config.https_proxy {
            debug!("Using HTTPS proxy {https_proxy}");
            client = client.proxy(reqwest::Proxy::https(https_proxy)?);
        }
    }
    Ok(client.build()?)
}

/// Why a backend call did not produce a usable response.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ShippingError {
    #[error("failed to prepare payload: {0}")]
    Payload(String),
    #[error("{0}")]
    Transport(#[source] reqwest::Error),
    #[error("{status} {kind}: {message}")]
    Destination {
        status: StatusCode,
        kind: String,
        message: String,
    },
}

impl ShippingError {
    /// The backend's error type, without any `namespace#` prefix.
    pub(crate) fn kind(&self) -> Option<&str> {
        match self {
            Self::Destination { kind, .. } => Some(kind.rsplit('#').next().unwrap_or(kind)),
            _ => None,
        }
    }
}

impl From<ShippingError> for DeliveryError {
    fn from(err: ShippingError) -> Self {
        match err.kind() {
            Some("ThrottlingException") => return DeliveryError::Throttled(err.to_string()),
            Some("InvalidSequenceTokenException") | Some("DataAlreadyAcceptedException") => {
                return DeliveryError::StaleCursor(err.to_string())
            }
            _ => {}
        }
        match err {
            ShippingError::Payload(msg) => DeliveryError::Payload(msg),
            ShippingError::Transport(e) => DeliveryError::Transport(e),
            ShippingError::Destination {
                status,
                kind,
                message,
            } => DeliveryError::Status {
                status,
                message: format!("{kind}: {message}"),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type", default)]
    kind: String,
    #[serde(default, alias = "Message")]
    message: String,
}

/// Sends one JSON-protocol operation and returns the raw success body.
pub(crate) async fn post_operation<T: Serialize>(
    client: &reqwest::Client,
    endpoint: &str,
    target: &str,
    content_type: &str,
    body: &T,
) -> Result<Vec<u8>, ShippingError> {
    let payload = serde_json::to_vec(body).map_err(|e| ShippingError::Payload(e.to_string()))?;

    let resp = client
        .post(endpoint)
        .header(CONTENT_TYPE, content_type)
        .header(TARGET_HEADER, target)
        .body(payload)
        .send()
        .await
        .map_err(ShippingError::Transport)?;

    let status = resp.status();
    let bytes = resp.bytes().await.map_err(ShippingError::Transport)?;
    if status.is_success() {
        return Ok(bytes.to_vec());
    }

    let parsed: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
    let message = if parsed.message.is_empty() {
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        parsed.message
    };
    Err(ShippingError::Destination {
        status,
        kind: parsed.kind,
        message,
    })
}

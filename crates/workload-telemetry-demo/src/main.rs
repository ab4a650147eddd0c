// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use anyhow::Context;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use workload_telemetry::{
    config::TelemetryConfig,
    emitter::{RunState, TelemetryEmitter},
    http::get_client,
    logs::{HttpLogBackend, LogStreamWriter},
    metrics::HttpMetricSink,
    util::current_process_stream_name,
};

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let config = TelemetryConfig::from_env().context("loading telemetry configuration")?;

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", config.log_level);
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).context("could not parse log level in configuration")?,
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    debug!("Logging subsystem enabled");

    let client = get_client(&config);
    let log_backend = Arc::new(HttpLogBackend::new(client.clone(), config.logs_endpoint()));
    let metric_sink = Arc::new(HttpMetricSink::new(client, config.metrics_endpoint()));

    let stream_name = current_process_stream_name();
    let writer = LogStreamWriter::connect(log_backend, config.log_group.clone(), stream_name)
        .await
        .context("log stream setup failed")?;
    info!(
        "Narrating to {}:{}, publishing metrics under {}",
        writer.group(),
        writer.stream_name(),
        config.namespace
    );

    let shutdown = CancellationToken::new();
    let shutdown_on_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received interrupt, stopping workload");
                shutdown_on_signal.cancel();
            }
            Err(e) => error!("Unable to listen for shutdown signal: {e}"),
        }
    });

    let mut emitter = TelemetryEmitter::new(
        writer,
        metric_sink,
        config.namespace.clone(),
        config.simulation.clone(),
    )
    .with_cancellation(shutdown);

    let summary = emitter.run(config.iterations).await;
    if summary.state == RunState::Completed {
        println!(
            "Workload completed: {} requests processed, {} failed",
            summary.iterations, summary.failures
        );
    }
    Ok(())
}

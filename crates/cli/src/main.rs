// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use vivstream::accumulator::StreamOutcome;
use vivstream::client::SimulationClient;
use vivstream::config::Config;
use vivstream::update::{error_message, updates_from};

/// Exit status when the stream ended before a document parsed.
const EXIT_NO_DOCUMENT: i32 = 3;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    init_tracing(&config);

    match run(config).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("fatal: {e:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr; stdout carries the parsed document.
    match config.log_format.as_str() {
        "json" => {
            fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).json().init();
        }
        _ => {
            fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        }
    }
}

async fn run(config: Config) -> anyhow::Result<i32> {
    let client = SimulationClient::from_config(&config)?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    info!(url = %config.run_url(), "streaming vivarium run");
    let reader = client.reader().cancel_token(cancel);
    let outcome = client.run_vivarium(&config.duration, config.vivarium_id(), reader).await?;

    let doc = match outcome {
        StreamOutcome::Document(doc) => doc,
        StreamOutcome::NoDocument => {
            warn!("stream ended without a valid document");
            return Ok(EXIT_NO_DOCUMENT);
        }
    };

    if let Some(msg) = error_message(&doc) {
        anyhow::bail!("simulation server reported an error: {msg}");
    }
    match updates_from(&doc) {
        Ok(updates) => info!(updates = updates.len(), "received vivarium updates"),
        Err(e) => info!(err = %e, "document is not an update list"),
    }

    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(0)
}

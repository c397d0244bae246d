//! RTBF comment manager
//!
//! Long-running daemon that enforces a two-stage retention policy on a
//! Reddit account's comments: old comments are overwritten with
//! replacement text, older ones are deleted.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod error;

#[cfg(test)]
mod test_utils;


use adapters::{LlmClient, RedditClientImpl};
use app::{MutationQueue, PollCycleService, Scheduler, StrategyService};
use config::{Config, StrategyKind};
use domain::ports::PlatformClient;

/// How long queued mutations may keep draining after shutdown
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config::log_filter_from_env().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting comment manager...");

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    config.log_summary();

    // Create adapters
    let reddit = Arc::new(
        RedditClientImpl::new(config.reddit.clone()).context("Failed to build Reddit client")?,
    );
    let rewriter = if config.strategy.kind == StrategyKind::ExternalRewrite {
        Some(Arc::new(
            LlmClient::new(&config.llm).context("Failed to build LLM client")?,
        ))
    } else {
        None
    };

    match reddit.authenticate().await {
        Ok(username) => tracing::info!("Authenticated as: {}", username),
        Err(e) => {
            tracing::error!(error = %e, "Authentication failed");
            return Err(e).context("Reddit authentication failed");
        }
    }

    // Create services
    let (queue, worker) = MutationQueue::spawn(reddit.clone(), config.schedule.mutation_delay);
    let resolver = Arc::new(StrategyService::from_config(
        &config.strategy,
        &config.llm,
        rewriter,
    ));
    let cycle = PollCycleService::new(
        reddit,
        resolver,
        queue,
        config.policy.clone(),
        config.schedule.scan_limit,
    );

    let mut scheduler = Scheduler::new(cycle, &config.schedule);
    let cycles = scheduler.run_until(shutdown_signal()).await;
    let scheduler_state = scheduler.state();

    // Dropping the scheduler closes the queue so the worker can drain and exit
    drop(scheduler);
    if tokio::time::timeout(SHUTDOWN_GRACE, worker).await.is_err() {
        tracing::warn!(
            "Mutation queue still busy after {} seconds, abandoning pending mutations",
            SHUTDOWN_GRACE.as_secs()
        );
    }

    tracing::info!(cycles, state = ?scheduler_state, "Comment manager stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

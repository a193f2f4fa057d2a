//! wikisent application binary - composition root.
//!
//! 1. Resolve configuration (CLI > env > TOML file > defaults)
//! 2. Build the encoder and an in-memory flat index
//! 3. Index the data file
//! 4. Run the requested task: one-shot prompt, prompt loop, or REST gateway

mod cli;
mod repl;
mod setup;

use std::path::Path;

use clap::Parser;

use wikisent_api::state::AppState;
use wikisent_core::config::WikisentConfig;
use wikisent_core::error::WikisentError;

use cli::{CliArgs, Task};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Logged after tracing is up, since the level comes from here.
    let config_file = args.resolve_config_path();
    let loaded = config_file
        .exists()
        .then(|| WikisentConfig::load(&config_file));
    let base = match &loaded {
        Some(Ok(config)) => config.clone(),
        _ => WikisentConfig::default(),
    };
    let config = args.resolve(base)?;

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting wikisent v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Some(Ok(_)) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(Err(e)) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Invalid config file, using defaults"
        ),
        None => tracing::info!(path = %config_file.display(), "No config file, using defaults"),
    }

    // Pipeline.
    let pipeline = setup::build_pipeline(&config)?;
    setup::ingest_data_file(
        &pipeline,
        Path::new(&config.data.data_file),
        config.data.max_docs,
    )?;

    match args.task {
        Task::Index => {
            prompt(pipeline, 1, config.search.score_threshold, true).await?;
        }
        Task::Query => {
            let answered = prompt(
                pipeline,
                config.search.top_k,
                config.search.score_threshold,
                false,
            )
            .await?;
            tracing::info!(queries = answered, "Prompt closed");
        }
        Task::QueryRestful => {
            wikisent_api::serve(AppState::new(config, pipeline)).await?;
        }
    }

    Ok(())
}

/// Run the console prompt on a blocking thread; stdin reads block.
async fn prompt(
    pipeline: wikisent_vector::Pipeline,
    top_k: usize,
    threshold: f64,
    once: bool,
) -> Result<usize, WikisentError> {
    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        repl::run_prompt_loop(&pipeline, stdin.lock(), stdout.lock(), top_k, threshold, once)
    })
    .await
    .map_err(|e| WikisentError::Io(std::io::Error::other(e)))?
}

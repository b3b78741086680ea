use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use nf_core::{CategoryFilter, ProcessingStatus};
use tracing::info;

mod logging;
mod settings;
mod wiring;

use settings::Settings;

#[derive(Parser, Debug)]
#[command(author, version, about = "Personalized news aggregation backend", long_about = None)]
pub struct Cli {
    /// Settings file; `nf.toml` in the working directory is used when present.
    #[arg(long, short, env = "NF_CONFIG")]
    config: Option<PathBuf>,
    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API, with hourly aggregation in the background.
    Serve {
        /// Override the bind address from the settings file.
        #[arg(long)]
        bind: Option<String>,
        #[arg(long)]
        no_scheduler: bool,
    },
    /// Run the pipeline once for a category and print the run state.
    Run {
        #[arg(long)]
        category: String,
    },
    /// Ingest raw articles for every catalog interest.
    Aggregate {
        /// Do a single pass instead of looping until Ctrl-C.
        #[arg(long)]
        once: bool,
    },
    /// Make sure the interest catalog exists and print it.
    Seed,
    /// Put the failed articles of a category back to pending.
    Requeue {
        #[arg(long)]
        category: Option<String>,
    },
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    let settings = Settings::load(cli.config.as_deref())?;
    let services = wiring::build(&settings).await?;

    match cli.command {
        Commands::Serve { bind, no_scheduler } => {
            let enrichment = services.enrich(&settings)?;
            let scheduler = (settings.scheduler.enabled && !no_scheduler).then(|| services.scheduler.clone().spawn());

            let app = nf_web::create_app(wiring::app_state(&services, &enrichment, &settings));
            let bind = bind.unwrap_or_else(|| settings.server.bind.clone());
            nf_web::serve(app, &bind, shutdown_signal()).await?;

            if let Some(scheduler) = scheduler {
                scheduler.shutdown().await;
            }
        }
        Commands::Run { category } => {
            let state = services.enrich(&settings)?.pipeline.run(Some(&category)).await;
            println!("{}", serde_json::to_string_pretty(&state)?);
            if state.is_failed() {
                bail!("pipeline run failed: {}", state.error.unwrap_or_default());
            }
        }
        Commands::Aggregate { once } => {
            if once {
                let written = services.scheduler.run_once().await?;
                info!(written, "aggregation pass complete");
            } else {
                let handle = services.scheduler.spawn();
                shutdown_signal().await;
                handle.shutdown().await;
            }
        }
        Commands::Seed => {
            for interest in services.stores.interests.list_interests().await? {
                println!("{:>3}  {}", interest.id, interest.name);
            }
        }
        Commands::Requeue { category } => {
            let filter = CategoryFilter::parse(category.as_deref());
            let failed = services
                .stores
                .articles
                .query_by_status_and_category(ProcessingStatus::Failed, &filter)
                .await?;
            let urls: Vec<String> = failed.into_iter().map(|a| a.url).collect();
            let requeued = services.stores.articles.mark_status(&urls, ProcessingStatus::Pending).await?;
            info!(requeued, category = filter.as_key(), "failed articles requeued");
        }
    }

    Ok(())
}

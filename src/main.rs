//! envdash: terminal dashboard and control CLI for the smart-environment
//! service-composition backend.
//!
//! Run with:  `RUST_LOG=info envdash watch`

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use envdash_app::{actions, CompositionSource, CompositionStore, Dashboard, OutputMode};
use envdash_config::{BackendConfig, ConfigOrigin};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "envdash", version, about = "Smart-environment dashboard")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/envdash/envdash.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Live dashboard (the default).
    Watch {
        /// Refresh once, print and exit.
        #[arg(long)]
        once: bool,
        /// Print the chart data as one JSON document per refresh.
        #[arg(long)]
        json: bool,
    },
    /// Start the backend's sensor pipeline.
    Start,
    /// Stop the backend's sensor pipeline.
    Stop,
    /// Print the backend system status.
    Status,
    /// List the services the backend can compose.
    Services,
    /// Create a service composition for a goal using the current readings.
    Compose {
        #[arg(long)]
        goal: String,
        /// Comma-separated constraints.
        #[arg(long, default_value = "")]
        constraints: String,
    },
    /// Work with an existing composition.
    #[command(subcommand)]
    Composition(CompositionCommand),
}

#[derive(Subcommand, Debug)]
enum CompositionCommand {
    /// Render a composition as Markdown.
    Show(SourceArgs),
    /// Save a composition on the backend.
    Save(SourceArgs),
    /// Validate a composition.
    Validate(SourceArgs),
    /// Dry-run a composition.
    Simulate(SourceArgs),
    /// Execute a composition against the real environment.
    Execute {
        #[command(flatten)]
        source: SourceArgs,
        /// Confirm execution.
        #[arg(long)]
        yes: bool,
    },
    /// List previously created compositions.
    History,
}

/// Picks the composition; the latest created one when neither flag is given.
#[derive(Args, Debug)]
struct SourceArgs {
    /// Composition id known to the backend.
    #[arg(long, conflicts_with = "file")]
    id: Option<String>,
    /// Composition JSON file.
    #[arg(long)]
    file: Option<PathBuf>,
}

impl SourceArgs {
    fn source(&self) -> CompositionSource {
        match (&self.id, &self.file) {
            (Some(id), _) => CompositionSource::Id(id.clone()),
            (None, Some(path)) => CompositionSource::File(path.clone()),
            (None, None) => CompositionSource::Latest,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(envdash_config::default_path);
    // Logging is configured from the file, so report a missing one only once
    // the subscriber is up.
    let (config, origin) = envdash_config::load_with_origin(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    // Structured logging on stderr; RUST_LOG wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("envdash v{} starting", env!("CARGO_PKG_VERSION"));
    if origin == ConfigOrigin::Defaults {
        envdash_config::warn_missing(&config_path);
    }

    let command = cli.command.unwrap_or(Command::Watch { once: false, json: false });

    let backend = BackendConfig {
        base_url: cli.base_url.clone().unwrap_or_else(|| config.backend.base_url.clone()),
        ..config.backend.clone()
    };
    let client = envdash_api::ApiClient::from_config(&backend);
    let store = CompositionStore::default_location();

    let output = match command {
        Command::Watch { once, json } => {
            let mode = if json { OutputMode::ChartJson } else { OutputMode::Text };
            let dashboard = Dashboard::new(config, config_path, cli.base_url);
            if once {
                envdash_app::run_once(dashboard, mode).await?;
            } else {
                envdash_app::run(dashboard, mode).await?;
            }
            return Ok(());
        }
        Command::Start => actions::start_system(&client).await,
        Command::Stop => actions::stop_system(&client).await,
        Command::Status => actions::system_status(&client).await,
        Command::Services => actions::available_services(&client).await,
        Command::Compose { goal, constraints } => {
            actions::compose(&client, &store, &goal, &constraints).await
        }
        Command::Composition(sub) => match sub {
            CompositionCommand::Show(s) => actions::show(&s.source(), &client, &store).await,
            CompositionCommand::Save(s) => actions::save(&s.source(), &client, &store).await,
            CompositionCommand::Validate(s) => actions::validate(&s.source(), &client, &store).await,
            CompositionCommand::Simulate(s) => actions::simulate(&s.source(), &client, &store).await,
            CompositionCommand::Execute { source, yes } => {
                actions::execute(&source.source(), &client, &store, yes).await
            }
            CompositionCommand::History => actions::history(&client).await,
        },
    }?;

    println!("{}", output.trim_end());
    Ok(())
}

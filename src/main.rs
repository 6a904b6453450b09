//! ClipGrab
//!
//! Downloads a video from a page URL with site-aware fallback strategies and
//! exports queued clips and still frames from it.
//!
//! # Usage
//!
//! ```bash
//! clipgrab fetch "https://www.youtube.com/watch?v=..."
//! clipgrab probe talk.mp4
//! clipgrab strategies "https://vimeo.com/12345"
//! clipgrab export --source talk.mp4 --queue queue.toml
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use clipgrab::adapters::{ChannelEventAdapter, FanOutEventAdapter, TracingEventAdapter};
use clipgrab::app::DefaultAppContainer;
use clipgrab::cli::{commands, Cli, Commands, Reporter};
use clipgrab::config_initialization::initialize_configuration_hierarchy;
use clipgrab::ports::EventPort;
use clipgrab::utils::logging::LoggingSystem;

/// Main entry point for the ClipGrab CLI application
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let reporter = Reporter::new(cli.json);

    match run(cli, reporter).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            reporter.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, reporter: Reporter) -> Result<ExitCode> {
    let loaded = initialize_configuration_hierarchy(&cli)?;
    let logging = LoggingSystem::new(loaded.config.logging.clone());
    logging.initialize()?;
    logging.log_system_info();
    info!(
        file = ?loaded.file,
        env_overrides = loaded.env_overrides,
        cli_overrides = loaded.cli_overrides,
        "Configuration loaded"
    );

    if let Commands::Strategies(args) = &cli.command {
        commands::strategies(reporter, args)?;
        return Ok(ExitCode::SUCCESS);
    }

    let (channel, events) = ChannelEventAdapter::new();
    let event_port: Arc<dyn EventPort> = Arc::new(FanOutEventAdapter::new(vec![
        Arc::new(TracingEventAdapter::new()) as Arc<dyn EventPort>,
        Arc::new(channel) as Arc<dyn EventPort>,
    ]));
    let printer = reporter.spawn_event_printer(events);

    let container = DefaultAppContainer::new(&loaded.config, event_port);
    let outcome = match &cli.command {
        Commands::Fetch(args) => commands::fetch(&container, reporter, args)
            .await
            .map(|_| ExitCode::SUCCESS),
        Commands::Probe(args) => commands::probe(&container, reporter, args)
            .await
            .map(|_| ExitCode::SUCCESS),
        Commands::Export(args) => commands::export(&container, &loaded.config, reporter, args)
            .await
            .map(|result| {
                if result.failed > 0 {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            }),
        Commands::Strategies(_) => Ok(ExitCode::SUCCESS),
    };

    // The printer stops once the last event sender is gone
    drop(container);
    if let Err(e) = printer.await {
        error!("Event printer stopped abnormally: {}", e);
    }
    outcome
}

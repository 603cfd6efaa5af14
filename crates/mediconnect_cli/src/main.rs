mod commands;
mod output;
mod shell;
mod tracing_writer;

use clap::Parser;
use mediconnect_core::{CareStore, LifecyclePolicy, config};
use miette::Result;
use std::path::PathBuf;
use tracing::info;

use crate::commands::{Commands, Context};
use crate::output::Output;

#[derive(Parser)]
#[command(name = "mediconnect")]
#[command(about = "MediConnect appointments, prescriptions and reviews from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Session directory (overrides config)
    #[arg(long)]
    session_dir: Option<PathBuf>,

    /// Allow any status change, e.g. reopening cancelled appointments
    #[arg(long)]
    permissive: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .rgb_colors(miette::RgbColors::Preferred)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))?;
    miette::set_panic_hook();
    let cli = Cli::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    let filter = if cli.debug {
        EnvFilter::new("mediconnect_core=debug,mediconnect_cli=debug")
    } else {
        // Show info level for our crates, warn for everything else
        EnvFilter::new("mediconnect_core=info,mediconnect_cli=info,warn")
    };

    fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_timer(tracing_subscriber::fmt::time::LocalTime::rfc_3339())
        .with_writer(tracing_writer::init_tracing_writer())
        .compact()
        .init();

    let mut config = if let Some(config_path) = &cli.config {
        info!("Loading config from: {:?}", config_path);
        config::load_config(config_path).await?
    } else {
        info!("Loading config from standard locations");
        config::load_config_from_standard_locations().await?
    };

    // Apply CLI overrides
    if let Some(session_dir) = &cli.session_dir {
        info!("Overriding session directory with: {:?}", session_dir);
        config.session.directory = Some(session_dir.clone());
    }
    if cli.permissive {
        config.lifecycle.policy = LifecyclePolicy::Permissive;
    }

    tracing::debug!(
        "Session directory: {}",
        config.session.resolved_directory().display()
    );

    let mut store = CareStore::open_with_files(&config).await?;

    match cli.command {
        Commands::Shell => shell::run(&mut store, &config).await,
        command => {
            let mut ctx = Context {
                store: &mut store,
                config: &config,
                output: Output::new(),
                interactive: false,
            };
            commands::run(&mut ctx, command).await
        }
    }
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use graphwerk_layout::{LayoutController, LayoutRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::{prelude::*, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// RON configuration file, defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available layouts
    List,

    /// Show the parameters and buttons of a layout
    Describe { layout: String },

    /// Lay out a graph and print the positions as JSON
    Run {
        layout: String,

        /// JSON graph document
        #[arg(long)]
        graph: PathBuf,

        /// Parameter value, repeatable
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = commands::parse_assignment)]
        settings: Vec<(String, String)>,

        /// Apply a layout button to the settings first
        #[arg(long)]
        button: Option<String>,

        /// Milliseconds a worker layout may run before being stopped
        #[arg(long, default_value_t = 1000)]
        duration: u64,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let config = config::load(args.config.as_deref())?;
    debug!("Configuration: {config:?}");
    if let Command::Config = args.command {
        println!("{}", config::render(&config)?);
        return Ok(());
    }

    let registry = LayoutRegistry::with_builtins(&config)?;
    let mut controller = LayoutController::new(Arc::new(registry), config);

    match args.command {
        Command::List => print!("{}", commands::list(&controller)),
        Command::Describe { layout } => {
            print!("{}", commands::describe(controller.layout(&layout)?))
        }
        Command::Run {
            layout,
            graph,
            settings,
            button,
            duration,
        } => {
            let graph = commands::load_graph(&graph)?;
            let mapping = commands::run(
                &mut controller,
                commands::RunRequest {
                    layout: &layout,
                    graph: &graph,
                    assignments: &settings,
                    button: button.as_deref(),
                    duration: Duration::from_millis(duration),
                },
            )?;
            let json = serde_json::to_string_pretty(&mapping).context("cannot encode positions")?;
            println!("{json}");
        }
        Command::Config => {}
    }
    Ok(())
}

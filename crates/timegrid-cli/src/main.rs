use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "timegrid-cli", version, about = "Timegrid CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the calendar column hierarchy for a view mode
    Calendar(commands::calendar::CalendarArgs),
    /// Print the grid layout for a view mode
    Grid(commands::grid::GridArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run a placement script against a fresh timeline and print its events
    Replay(commands::replay::ReplayArgs),
}

/// Logs go to stderr so JSON on stdout stays parseable. `RUST_LOG` overrides
/// the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Calendar(args) => commands::calendar::run(args),
        Commands::Grid(args) => commands::grid::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Replay(args) => commands::replay::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

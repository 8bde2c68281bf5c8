use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod notify;
mod render;

#[derive(Parser)]
#[command(
    name = "studygarden",
    version,
    about = "Study Garden: focus timer, to-do list and reward garden"
)]
struct Cli {
    /// Print events and results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Focus timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Show or spend rewards
    Rewards {
        #[command(subcommand)]
        action: Option<commands::rewards::RewardsAction>,
    },
    /// Garden and shop
    Garden {
        #[command(subcommand)]
        action: commands::garden::GardenAction,
    },
    /// Per-day goal notes
    Calendar {
        #[command(subcommand)]
        action: commands::calendar::CalendarAction,
    },
    /// Recent activity
    Log,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("STUDYGARDEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let out = render::Output::new(cli.json);
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action, out),
        Commands::Timer { action } => commands::timer::run(action, out),
        Commands::Rewards { action } => commands::rewards::run(action.unwrap_or_default(), out),
        Commands::Garden { action } => commands::garden::run(action, out),
        Commands::Calendar { action } => commands::calendar::run(action, out),
        Commands::Log => commands::log::run(out),
        Commands::Config { action } => commands::config::run(action, out),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

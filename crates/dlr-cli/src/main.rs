use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use dlr_cli::cli::{Cli, Commands, GridCommands};

mod commands;

use commands::{base_case, critical_temp, grid, report, screen, sweep};

fn main() {
    let cli = Cli::parse();

    // logs go to stderr so stdout stays clean for tables, JSON, and CSV
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let result = match &cli.command {
        Some(Commands::Grid { command }) => match command {
            GridCommands::Info { data_dir } => grid::info(data_dir),
        },
        Some(Commands::BaseCase(args)) => base_case::handle(args),
        Some(Commands::Screen(args)) => screen::handle(args),
        Some(Commands::Sweep(args)) => sweep::handle(args),
        Some(Commands::CriticalTemp(args)) => critical_temp::handle(args),
        Some(Commands::Report(args)) => report::handle(args),
        None => {
            info!("No subcommand provided. Use `dlr --help` for more information.");
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

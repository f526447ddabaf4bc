use crate::report::{run_places, run_report, PlacesArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use vacancy_atlas::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Vacancy Atlas",
    about = "Serve and report housing vacancy rates from the national view down to block groups",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Fetch one layer and print its summary, top regions and full table
    Report(ReportArgs),
    /// List selectable states, or the counties of one state
    Places(PlacesArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args).await,
        Command::Places(args) => run_places(args).await,
    }
}

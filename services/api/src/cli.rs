use crate::resolve::{run_resolve, ResolveArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use gourmet_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Gourmet Search Orchestrator",
    about = "Turn free-form restaurant requests into gourmet API searches",
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
    /// Resolve an extraction JSON against the taxonomy without calling any
    /// external service
    Resolve(ResolveArgs),
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
        Command::Resolve(args) => run_resolve(args),
    }
}

use crate::demo::{run_catalog, run_demo, run_evaluate, EvaluateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use eco_eval::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Eco-evaluation",
    about = "Score the environmental and social footprint of museum exhibitions",
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
    /// Validate and score an answer file (JSON responses or CSV sheet)
    Evaluate(EvaluateArgs),
    /// Print the criteria tree with effective weights
    Catalog,
    /// Score a built-in sample exhibition
    Demo,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the store backend (memory or file)
    #[arg(long)]
    pub(crate) store: Option<String>,
    /// Override the directory used by the file store
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
        Command::Catalog => run_catalog(),
        Command::Demo => run_demo(),
    }
}

use crate::report::{run_batch, run_options, run_predict, BatchArgs, PredictArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credit_approval::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Credit Card Approval Predictor",
    about = "Score credit card applications over HTTP or from the command line",
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
    /// Score a single applicant described by command-line flags
    Predict(PredictArgs),
    /// Score every applicant in a CSV file
    Batch(BatchArgs),
    /// List the choices and numeric ranges the application form accepts
    Options,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the directory holding the feature schema and model artifacts
    #[arg(long)]
    pub(crate) model_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Predict(args) => run_predict(args),
        Command::Batch(args) => run_batch(args),
        Command::Options => run_options(),
    }
}

use crate::assess::{run_assess, run_batch, AssessArgs, BatchArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use scope_triage::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Scope Referral Triage",
    about = "Classify colonoscopy referrals and serve the triage API",
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
    /// Evaluate a single referral from key=value fields or a JSON file
    Assess(AssessArgs),
    /// Evaluate every row of a CSV export without sending notifications
    Batch(BatchArgs),
    /// Walk through the reference referral scenarios
    Demo(DemoArgs),
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
        Command::Assess(args) => run_assess(args).await,
        Command::Batch(args) => run_batch(args),
        Command::Demo(args) => run_demo(args),
    }
}

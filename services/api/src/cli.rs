use crate::curate::{list_experiments, run_curate, show_experiment, CurateArgs, ExperimentArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use tool_curator::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Tool Curator",
    about = "Score, match, and promote discovered AI tools from the command line",
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
    /// Curate a CSV or JSON tool export and print the decision report
    Curate(CurateArgs),
    /// Inspect persisted A/B experiments
    Experiment {
        #[command(subcommand)]
        command: ExperimentCommand,
    },
    /// Run the sample tools through curation, posting, analytics, and the catalog
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ExperimentCommand {
    /// Print sample counts, means, and the winner of one experiment
    Status(ExperimentArgs),
    /// List known experiment names
    List,
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
        Command::Curate(args) => run_curate(args),
        Command::Experiment {
            command: ExperimentCommand::Status(args),
        } => show_experiment(args),
        Command::Experiment {
            command: ExperimentCommand::List,
        } => list_experiments(),
        Command::Demo(args) => run_demo(args),
    }
}

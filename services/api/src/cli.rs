use crate::demo::{print_checklist_schema, run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use offboarding::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "offboarding-api",
    about = "Run the faculty relieving clearance service or walk through it from the command line",
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
    /// Print the department checklist items in clearance order
    Checklist,
    /// Walk a sample request through checklist updates and a decision
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
        Command::Checklist => {
            print_checklist_schema();
            Ok(())
        }
        Command::Demo(args) => run_demo(args),
    }
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use sellwise_application::TaskKind;
use sellwise_core::error::TaskError;
use std::process::ExitCode;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "sellwise")]
#[command(about = "Sellwise CLI - schema-validated AI agents for marketplace sellers", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available tasks
    Tasks,
    /// Show a task's input fields and output schema
    Describe {
        /// Task name, e.g. keyword-finder
        task: TaskKind,
    },
    /// Run one task and print the validated result
    Run(commands::run::RunArgs),
    /// Inspect saved results
    Vault {
        #[command(subcommand)]
        action: VaultAction,
    },
    /// Create the config directory, a secret.json template and a default config.toml
    Init,
}

#[derive(Subcommand)]
enum VaultAction {
    /// List saved results
    List,
    /// Print one saved result
    Get { key: String },
    /// Delete one saved result
    Remove { key: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match dispatch(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Tasks => commands::tasks::list(),
        Commands::Describe { task } => commands::describe::show(task)?,
        Commands::Run(args) => commands::run::execute(args).await?,
        Commands::Vault { action } => match action {
            VaultAction::List => commands::vault::list()?,
            VaultAction::Get { key } => commands::vault::get(&key)?,
            VaultAction::Remove { key } => commands::vault::remove(&key)?,
        },
        Commands::Init => commands::init::run()?,
    }

    Ok(())
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<TaskError>() {
        Some(task_error) => eprintln!("error[{}]: {}", task_error.kind(), task_error),
        None => eprintln!("error: {:#}", err),
    }
}

use clap::{Parser, Subcommand};
use commands::{
    batch::{run_batch, BatchArgs},
    info::run_info,
    locate::{run_locate, LocateArgs},
    shell::run_shell,
    LoadArgs,
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(author, version)]
struct Cli {
    #[command(flatten)]
    load: LoadArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactively look up coordinates
    Shell,

    /// Look up a single coordinate
    Locate(LocateArgs),

    /// Look up a list of coordinates
    Batch(BatchArgs),

    /// Show information about the loaded regions and the spatial index
    Info,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Shell => run_shell(&cli.load),
        Commands::Locate(args) => run_locate(&cli.load, args),
        Commands::Batch(args) => run_batch(&cli.load, args),
        Commands::Info => run_info(&cli.load),
    }
}

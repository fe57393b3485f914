use anyhow::Context;
use clap::Parser;
use sdg_processor::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = command_name(&cli);
    run(cli)
        .await
        .with_context(|| format!("sdg-processor {} failed", command))
}

fn command_name(cli: &Cli) -> &'static str {
    use sdg_processor::cli::Commands;
    match cli.command {
        Commands::Format { .. } => "format",
        Commands::Concentration { .. } => "concentration",
        Commands::Saturation { .. } => "saturation",
        Commands::Process { .. } => "process",
        Commands::Info { .. } => "info",
    }
}

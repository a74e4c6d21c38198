use anyhow::Result;
use clap::Parser;
use scanshelf::cli::{Cli, Commands};
use scanshelf::{commands, logging, AppContext};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    // Values from a .env file feed the `env` fallbacks of the CLI arguments
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet)?;

    let cx = AppContext::from_cli(&cli)?;
    debug!("Using data directory {}", cx.config.data_dir.display());

    match cli.command {
        Commands::Import(args) => commands::handle_import(args, &cx).await?,
        Commands::List {} => commands::handle_list(&cx).await?,
        Commands::Show(args) => commands::handle_show(args, &cx).await?,
        Commands::Rename(args) => commands::handle_rename(args, &cx).await?,
        Commands::RenamePage(args) => commands::handle_rename_page(args, &cx).await?,
        Commands::Pdf(args) => commands::handle_pdf(args, &cx).await?,
    }

    Ok(())
}

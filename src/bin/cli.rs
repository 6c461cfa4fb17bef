use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use voxpass::cmd::{Cli, Commands};
use voxpass::db::{create_pool, repository::Repository};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let database_url = match cli.database_url {
        Some(url) => url,
        None => std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
    };

    let pool = create_pool(&database_url).await?;
    let repo = Arc::new(Repository::new(Arc::new(pool)));

    match cli.command {
        Commands::Profile(cmd) => cmd.execute(&repo).await?,
        Commands::Device(cmd) => cmd.execute(&repo).await?,
        Commands::Referral(cmd) => cmd.execute(&repo).await?,
        Commands::Quota(cmd) => cmd.execute(&repo).await?,
    }

    Ok(())
}

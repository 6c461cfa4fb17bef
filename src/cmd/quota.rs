use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;

use crate::db::repository::Repository;

/// The counters are append-only at runtime; these are the only operations
/// that ever decrease them. Intended to run from cron on the first of the
/// month and the first of the year.
#[derive(Subcommand)]
pub enum QuotaCommands {
    /// Zero every profile's monthly audio counter
    ResetMonthly,

    /// Zero every profile's monthly and yearly audio counters
    ResetYearly,
}

impl QuotaCommands {
    pub async fn execute(&self, repo: &Arc<Repository>) -> Result<()> {
        match self {
            QuotaCommands::ResetMonthly => {
                let rows = repo.reset_monthly_counts().await?;
                println!("Reset monthly counters on {} profiles", rows);
                Ok(())
            }

            QuotaCommands::ResetYearly => {
                let rows = repo.reset_yearly_counts().await?;
                println!("Reset monthly+yearly counters on {} profiles", rows);
                Ok(())
            }
        }
    }
}

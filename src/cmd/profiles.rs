use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use uuid::Uuid;

use crate::db::models::PlanTier;
use crate::db::repository::Repository;

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show a profile with its quota counters
    Show { user_id: String },

    /// Create a profile (or update its name/plan if it exists)
    Create {
        /// User id; a fresh UUID is generated when omitted
        #[arg(long)]
        user_id: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_enum)]
        plan: Option<PlanTier>,
    },

    /// Change a profile's subscription plan
    SetPlan {
        user_id: String,

        #[arg(value_enum)]
        plan: PlanTier,
    },
}

impl ProfileCommands {
    pub async fn execute(&self, repo: &Arc<Repository>) -> Result<()> {
        match self {
            ProfileCommands::Show { user_id } => {
                match repo.get_profile(user_id).await? {
                    Some(profile) => println!("{:#?}", profile),
                    None => println!("No profile for {}", user_id),
                }
                Ok(())
            }

            ProfileCommands::Create {
                user_id,
                name,
                plan,
            } => {
                let user_id = user_id
                    .clone()
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                let profile = repo
                    .upsert_profile(
                        &user_id,
                        name.as_deref(),
                        plan.unwrap_or(PlanTier::Free),
                    )
                    .await?;
                println!("{:#?}", profile);
                Ok(())
            }

            ProfileCommands::SetPlan { user_id, plan } => {
                let profile = repo.set_plan(user_id, *plan).await?;
                println!("{} -> {:?}", profile.id, profile.subscription_plan);
                Ok(())
            }
        }
    }
}

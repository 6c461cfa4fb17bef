use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;

use crate::db::repository::Repository;
use crate::invites::InviteGate;

#[derive(Subcommand)]
pub enum ReferralCommands {
    /// Check whether an invite code would be accepted right now
    Validate { code: String },

    /// Referral dashboard numbers for a user
    Stats { user_id: String },
}

impl ReferralCommands {
    pub async fn execute(&self, repo: &Arc<Repository>) -> Result<()> {
        let gate = InviteGate::new(Arc::clone(repo));

        match self {
            ReferralCommands::Validate { code } => {
                let decision = gate.validate(code).await;
                match decision.reason {
                    Some(reason) => println!("invalid: {}", reason),
                    None => println!("valid"),
                }
                Ok(())
            }

            ReferralCommands::Stats { user_id } => {
                match gate.stats(user_id).await? {
                    Some(stats) => println!("{:#?}", stats),
                    None => println!("No profile for {}", user_id),
                }
                Ok(())
            }
        }
    }
}

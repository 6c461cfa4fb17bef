use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;

use crate::db::repository::Repository;
use crate::utils::logs_fmt::abbrev;

#[derive(Subcommand)]
pub enum DeviceCommands {
    /// Show the play counter for one device fingerprint
    Show { fingerprint: String },

    /// List the most recently active devices
    List {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

impl DeviceCommands {
    pub async fn execute(&self, repo: &Arc<Repository>) -> Result<()> {
        match self {
            DeviceCommands::Show { fingerprint } => {
                match repo.get_device(fingerprint).await? {
                    Some(device) => println!("{:#?}", device),
                    None => println!("No tracking row for {}", abbrev(fingerprint)),
                }
                Ok(())
            }

            DeviceCommands::List { limit } => {
                let devices = repo.list_devices(*limit).await?;
                for device in devices {
                    println!(
                        "{}  plays={}  last={}",
                        abbrev(&device.device_fingerprint),
                        device.audio_tours_accessed,
                        device.last_accessed
                    );
                }
                Ok(())
            }
        }
    }
}

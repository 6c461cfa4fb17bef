pub mod devices;
pub mod profiles;
pub mod quota;
pub mod referrals;

use clap::{Parser, Subcommand};

use crate::cmd::{
    devices::DeviceCommands, profiles::ProfileCommands, quota::QuotaCommands,
    referrals::ReferralCommands,
};

#[derive(Parser)]
#[command(name = "voxpass")]
#[command(about = "Admin CLI for the voxpass entitlement service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database URL (falls back to the DATABASE_URL env var)
    #[arg(long, global = true)]
    pub database_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect and manage user profiles
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Inspect anonymous device counters
    #[command(subcommand)]
    Device(DeviceCommands),

    /// Invite validation and referral stats
    #[command(subcommand)]
    Referral(ReferralCommands),

    /// Quota window maintenance (run from cron)
    #[command(subcommand)]
    Quota(QuotaCommands),
}

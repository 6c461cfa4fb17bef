pub mod access;
pub mod backend;
pub mod cmd;
pub mod db;
pub mod identity;
pub mod invites;
pub mod utils;

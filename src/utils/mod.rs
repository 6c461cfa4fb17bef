pub mod config;
pub mod error;
pub mod logs_fmt;

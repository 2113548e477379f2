//! Common functionality for branchcast.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod aggregate;
pub mod analysis;
pub mod branch;
pub mod cli;
pub mod forecast;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod projection;
pub mod roi;
pub mod settings;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the path to the branchcast configuration directory
pub fn get_branchcast_config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_default().join("branchcast")
}

//! The network model: the full collection of branches considered together.
use crate::branch::BranchMap;
use crate::input::load_network;
use anyhow::Result;
use std::path::Path;

pub mod parameters;
pub use parameters::NetworkParameters;

/// A network of laundry branches together with its forecast parameters.
pub struct Network {
    /// Parameters from the network parameters file
    pub parameters: NetworkParameters,
    /// The network's branches, keyed by ID in input order
    pub branches: BranchMap,
}

impl Network {
    /// Read a network model from the specified directory.
    ///
    /// Every branch's forecast series is computed as part of loading, so a returned
    /// `Network` always carries fully-populated monthly data.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Network> {
        load_network(model_dir.as_ref())
    }
}

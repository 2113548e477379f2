//! Defines the `NetworkParameters` struct, which represents the contents of `network.toml`.
use crate::forecast::DEFAULT_MONTHS_TO_FORECAST;
use crate::input::{input_err_msg, read_toml};
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::Deserialize;
use std::path::Path;

const NETWORK_PARAMETERS_FILE_NAME: &str = "network.toml";

fn default_months_to_forecast() -> u32 {
    DEFAULT_MONTHS_TO_FORECAST
}

/// Represents the contents of the entire network parameters file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct NetworkParameters {
    /// How many months each branch's forecast should cover
    #[serde(default = "default_months_to_forecast")]
    pub months_to_forecast: u32,
}

/// Check that the `months_to_forecast` parameter is valid
fn check_months_to_forecast(value: u32) -> Result<()> {
    ensure!(value >= 1, "months_to_forecast must be at least 1");

    Ok(())
}

impl NetworkParameters {
    /// Read a network parameters file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The file contents as a [`NetworkParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<NetworkParameters> {
        let file_path = model_dir.as_ref().join(NETWORK_PARAMETERS_FILE_NAME);
        let parameters: NetworkParameters = read_toml(&file_path)?;

        parameters
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(parameters)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        check_months_to_forecast(self.months_to_forecast)?;

        if self.months_to_forecast > 12 {
            warn!(
                "Forecasting {} months; the 12-month seasonal pattern repeats beyond a year",
                self.months_to_forecast
            );
        }

        Ok(())
    }
}

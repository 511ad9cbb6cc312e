//! Config file loading.

use std::path::Path;

use hdspin_core::{RunParameters, SimulationParameters};

use crate::error::{HarnessError, HarnessResult};

/// Read and parse a JSON config file.
pub fn load_config(path: &Path) -> HarnessResult<SimulationParameters> {
    let text = std::fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
    parse_config(&text).map_err(|source| HarnessError::Config {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_config(text: &str) -> Result<SimulationParameters, serde_json::Error> {
    serde_json::from_str(text)
}

/// Load and validate. Every configuration error surfaces here, before any
/// directory or file is touched.
pub fn resolve(path: &Path) -> HarnessResult<RunParameters> {
    Ok(RunParameters::derive(&load_config(path)?)?)
}

/// Pretty JSON of the derived parameter record.
pub fn to_pretty_json(params: &RunParameters) -> HarnessResult<String> {
    Ok(serde_json::to_string_pretty(params)?)
}

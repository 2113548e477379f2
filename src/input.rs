//! Common routines for handling input data.
use crate::branch::BranchID;
use crate::model::{Network, NetworkParameters};
use anyhow::{Context, Result, ensure};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub mod branch;
pub mod parameters;
pub mod setup_costs;

use branch::read_branches;

/// The error message to display if an input file is invalid.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().to_string_lossy())
}

/// Parse a TOML file at the specified path.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let contents = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    toml::from_str(&contents).with_context(|| input_err_msg(file_path))
}

/// Read every record from a CSV file into a `Vec`.
fn read_csv_vec<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    csv::Reader::from_path(file_path)
        .and_then(|reader| reader.into_deserialize().collect())
        .with_context(|| input_err_msg(file_path))
}

/// Read a series of records from a CSV file.
///
/// # Arguments
///
/// * `file_path`: Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<impl Iterator<Item = T>> {
    let records = read_csv_vec(file_path)?;
    ensure!(
        !records.is_empty(),
        "CSV file cannot be empty: {}",
        file_path.display()
    );

    Ok(records.into_iter())
}

/// Read records from a CSV file that may be absent.
///
/// A missing file yields no records rather than an error.
pub fn read_csv_optional<T: DeserializeOwned>(file_path: &Path) -> Result<impl Iterator<Item = T>> {
    let records = if file_path.exists() {
        read_csv_vec(file_path)?
    } else {
        Vec::new()
    };

    Ok(records.into_iter())
}

/// Look up a branch ID from its string representation.
///
/// # Returns
///
/// A copy of the ID in `ids`, or an error if not found.
pub fn get_branch_id(ids: &HashSet<BranchID>, id: &str) -> Result<BranchID> {
    let found = ids
        .get(id)
        .with_context(|| format!("Unknown branch ID {id} found"))?;

    Ok(found.clone())
}

/// Read a network model from the specified directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The fully-assembled network, with every branch's forecast series computed.
pub fn load_network(model_dir: &Path) -> Result<Network> {
    let parameters = NetworkParameters::from_path(model_dir)?;
    let branches = read_branches(model_dir, parameters.months_to_forecast)?;

    Ok(Network {
        parameters,
        branches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        value: f64,
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("records.csv");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id,value\na,1\nb,2").unwrap();
        }

        let records: Vec<Record> = read_csv(&file_path).unwrap().collect();
        assert_eq!(
            records,
            vec![
                Record {
                    id: "a".to_string(),
                    value: 1.0
                },
                Record {
                    id: "b".to_string(),
                    value: 2.0
                },
            ]
        );
    }

    #[test]
    fn test_read_csv_empty_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("records.csv");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id,value").unwrap();
        }

        assert!(read_csv::<Record>(&file_path).is_err());
    }

    #[test]
    fn test_read_csv_optional_missing_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("records.csv"); // NB: doesn't exist
        let records: Vec<Record> = read_csv_optional(&file_path).unwrap().collect();
        assert!(records.is_empty());
    }

    #[test]
    fn test_get_branch_id() {
        let ids: HashSet<BranchID> = ["main".into()].into_iter().collect();
        assert_eq!(get_branch_id(&ids, "main").unwrap(), "main".into());
        assert!(get_branch_id(&ids, "other").is_err());
    }
}

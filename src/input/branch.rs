//! Code for reading branch definitions from CSV files and assembling branches.
use super::*;
use crate::branch::{Branch, BranchMap};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use unicase::UniCase;

const BRANCHES_FILE_NAME: &str = "branches.csv";

/// A branch record retrieved from a CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct BranchRow {
    branch_id: String,
    name: String,
    location: String,
}

/// Read every branch in the model, deriving each branch's forecast series.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `months_to_forecast` - How many months each branch's forecast should cover
pub fn read_branches(model_dir: &Path, months_to_forecast: u32) -> Result<BranchMap> {
    let definitions = read_branch_definitions(model_dir)?;
    let ids: HashSet<BranchID> = definitions.keys().cloned().collect();
    let mut metrics = parameters::read_branch_parameters(model_dir, &ids)?;
    let mut setup_costs = setup_costs::read_setup_costs(model_dir, &ids)?;

    let mut branches = BranchMap::new();
    for (id, row) in definitions {
        let metrics = metrics
            .remove(&id)
            .with_context(|| format!("Missing business parameters for branch {id}"))?;
        let costs = setup_costs
            .remove(&id)
            .with_context(|| format!("Missing setup costs for branch {id}"))?;
        let branch = Branch::new(
            id.clone(),
            row.name,
            row.location,
            metrics,
            costs,
            months_to_forecast,
        )?;
        branches.insert(id, branch);
    }

    Ok(branches)
}

/// Read branch definitions from a CSV file.
fn read_branch_definitions(model_dir: &Path) -> Result<IndexMap<BranchID, BranchRow>> {
    let file_path = model_dir.join(BRANCHES_FILE_NAME);
    let iter = read_csv(&file_path)?;
    read_branch_definitions_from_iter(iter).with_context(|| input_err_msg(&file_path))
}

/// Read branch definitions from an iterator, checking IDs are unique ignoring case.
fn read_branch_definitions_from_iter<I>(iter: I) -> Result<IndexMap<BranchID, BranchRow>>
where
    I: Iterator<Item = BranchRow>,
{
    let mut definitions = IndexMap::new();
    let mut seen = HashSet::new();
    for row in iter {
        ensure!(!row.branch_id.is_empty(), "Branch ID cannot be empty");

        let id = BranchID::from(row.branch_id.as_str());
        ensure!(
            seen.insert(UniCase::new(row.branch_id.clone())),
            "Duplicate branch ID {id} (branch IDs are case-insensitive)"
        );
        definitions.insert(id, row);
    }

    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn branch_row(branch_id: &str) -> BranchRow {
        BranchRow {
            branch_id: branch_id.to_string(),
            name: "Main Branch".to_string(),
            location: "City Center".to_string(),
        }
    }

    #[test]
    fn test_read_branch_definitions_from_iter() {
        let rows = [branch_row("main"), branch_row("westside")];
        let definitions = read_branch_definitions_from_iter(rows.into_iter()).unwrap();
        assert_eq!(definitions.len(), 2);
        assert!(definitions.contains_key("main"));
        assert!(definitions.contains_key("westside"));
    }

    #[test]
    fn test_duplicate_ids_rejected_ignoring_case() {
        let rows = [branch_row("main"), branch_row("MAIN")];
        assert!(read_branch_definitions_from_iter(rows.into_iter()).is_err());
    }

    #[test]
    fn test_empty_id_rejected() {
        let rows = [branch_row("")];
        assert!(read_branch_definitions_from_iter(rows.into_iter()).is_err());
    }

    /// A full model directory loads into a branch map with computed forecasts
    #[test]
    fn test_read_branches() {
        let dir = tempdir().unwrap();
        let write_file = |name: &str, contents: &str| {
            let mut file = File::create(dir.path().join(name)).unwrap();
            writeln!(file, "{contents}").unwrap();
        };
        write_file(
            BRANCHES_FILE_NAME,
            "branch_id,name,location\nmain,Main Branch,City Center",
        );
        write_file(
            "branch_parameters.csv",
            "branch_id,daily_orders,branch_capacity,monthly_growth_rate,average_order_price,\
             detergent_cost,packaging_cost,other_material_costs,delivery_cost_per_customer,\
             monthly_rent,monthly_staff_cost_per_person,monthly_utilities,staff_count,forecast_mode\n\
             main,10,20,0,10,0.5,0.25,0.25,0.5,1000,400,150,2,single-growth",
        );
        write_file(
            "setup_costs.csv",
            "branch_id,construction_cost,equipment_cost,licensing_cost,initial_inventory_cost\n\
             main,4000,2000,700,500",
        );

        let branches = read_branches(dir.path(), 12).unwrap();
        assert_eq!(branches.len(), 1);
        let branch = &branches["main"];
        assert_eq!(branch.name, "Main Branch");
        assert_eq!(branch.monthly_data.len(), 12);
    }

    /// A parameters row for an unknown branch fails the load
    #[test]
    fn test_read_branches_missing_parameters() {
        let dir = tempdir().unwrap();
        let write_file = |name: &str, contents: &str| {
            let mut file = File::create(dir.path().join(name)).unwrap();
            writeln!(file, "{contents}").unwrap();
        };
        write_file(
            BRANCHES_FILE_NAME,
            "branch_id,name,location\nmain,Main Branch,City Center",
        );
        write_file(
            "branch_parameters.csv",
            "branch_id,daily_orders,branch_capacity,monthly_growth_rate,average_order_price,\
             detergent_cost,packaging_cost,other_material_costs,delivery_cost_per_customer,\
             monthly_rent,monthly_staff_cost_per_person,monthly_utilities,staff_count,forecast_mode\n\
             other,10,20,0,10,0.5,0.25,0.25,0.5,1000,400,150,2,single-growth",
        );
        write_file(
            "setup_costs.csv",
            "branch_id,construction_cost,equipment_cost,licensing_cost,initial_inventory_cost\n\
             main,4000,2000,700,500",
        );

        assert!(read_branches(dir.path(), 12).is_err());
    }
}

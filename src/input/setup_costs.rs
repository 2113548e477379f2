//! Code for reading each branch's one-time setup costs from a CSV file.
use super::*;
use crate::branch::BranchSetupCosts;
use crate::units::Money;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

const SETUP_COSTS_FILE_NAME: &str = "setup_costs.csv";

/// A setup costs record retrieved from a CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct SetupCostsRaw {
    branch_id: String,
    construction_cost: Money,
    equipment_cost: Money,
    licensing_cost: Money,
    initial_inventory_cost: Money,
}

/// Read the one-time setup costs for every branch.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `branch_ids` - All possible IDs of branches
pub fn read_setup_costs(
    model_dir: &Path,
    branch_ids: &HashSet<BranchID>,
) -> Result<HashMap<BranchID, BranchSetupCosts>> {
    let file_path = model_dir.join(SETUP_COSTS_FILE_NAME);
    let iter = read_csv(&file_path)?;
    read_setup_costs_from_iter(iter, branch_ids).with_context(|| input_err_msg(&file_path))
}

/// Read setup cost records from an iterator.
fn read_setup_costs_from_iter<I>(
    iter: I,
    branch_ids: &HashSet<BranchID>,
) -> Result<HashMap<BranchID, BranchSetupCosts>>
where
    I: Iterator<Item = SetupCostsRaw>,
{
    let mut costs_map = HashMap::new();
    for row in iter {
        let id = get_branch_id(branch_ids, &row.branch_id)?;
        let costs = BranchSetupCosts {
            construction_cost: row.construction_cost,
            equipment_cost: row.equipment_cost,
            licensing_cost: row.licensing_cost,
            initial_inventory_cost: row.initial_inventory_cost,
        };
        costs
            .validate()
            .with_context(|| format!("Invalid setup costs for branch {id}"))?;

        ensure!(
            costs_map.insert(id.clone(), costs).is_none(),
            "Multiple setup cost entries for branch {id}"
        );
    }

    Ok(costs_map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch_ids() -> HashSet<BranchID> {
        ["main".into()].into_iter().collect()
    }

    fn costs_row(branch_id: &str, construction_cost: Money) -> SetupCostsRaw {
        SetupCostsRaw {
            branch_id: branch_id.to_string(),
            construction_cost,
            equipment_cost: Money(2000.0),
            licensing_cost: Money(700.0),
            initial_inventory_cost: Money(500.0),
        }
    }

    #[test]
    fn test_read_setup_costs_from_iter() {
        let rows = [costs_row("main", Money(4000.0))];
        let costs = read_setup_costs_from_iter(rows.into_iter(), &branch_ids()).unwrap();
        assert_eq!(
            costs[&BranchID::from("main")].total_investment(),
            Money(7200.0)
        );
    }

    #[test]
    fn test_unknown_branch_rejected() {
        let rows = [costs_row("other", Money(4000.0))];
        assert!(read_setup_costs_from_iter(rows.into_iter(), &branch_ids()).is_err());
    }

    #[test]
    fn test_negative_cost_rejected() {
        let rows = [costs_row("main", Money(-1.0))];
        assert!(read_setup_costs_from_iter(rows.into_iter(), &branch_ids()).is_err());
    }

    #[test]
    fn test_duplicate_entries_rejected() {
        let rows = [
            costs_row("main", Money(4000.0)),
            costs_row("main", Money(4000.0)),
        ];
        assert!(read_setup_costs_from_iter(rows.into_iter(), &branch_ids()).is_err());
    }
}

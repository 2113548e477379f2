//! Code for reading each branch's business parameters from CSV files.
//!
//! Scalar parameters come from `branch_parameters.csv`; the optional
//! `growth_rates.csv` and `fixed_orders.csv` files carry per-month overrides for the
//! monthly-growth and fixed-orders forecast modes.
use super::*;
use crate::branch::BusinessMetrics;
use crate::forecast::{ForecastMode, MONTH_NAMES, MonthlyProfile};
use crate::units::{Dimensionless, Money, MoneyPerOrder, Orders};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

const BRANCH_PARAMETERS_FILE_NAME: &str = "branch_parameters.csv";
const GROWTH_RATES_FILE_NAME: &str = "growth_rates.csv";
const FIXED_ORDERS_FILE_NAME: &str = "fixed_orders.csv";

/// A business parameters record retrieved from a CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct BranchParametersRaw {
    branch_id: String,
    daily_orders: Orders,
    branch_capacity: Orders,
    monthly_growth_rate: Dimensionless,
    average_order_price: MoneyPerOrder,
    detergent_cost: MoneyPerOrder,
    packaging_cost: MoneyPerOrder,
    other_material_costs: MoneyPerOrder,
    delivery_cost_per_customer: MoneyPerOrder,
    monthly_rent: Money,
    monthly_staff_cost_per_person: Money,
    monthly_utilities: Money,
    staff_count: u32,
    forecast_mode: String,
}

/// A per-month growth rate override retrieved from a CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct GrowthRateRaw {
    branch_id: String,
    month: u32,
    growth_rate: Dimensionless,
}

impl GrowthRateRaw {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.growth_rate.is_finite(),
            "Invalid value for growth_rate ({})",
            self.growth_rate
        );

        Ok(())
    }
}

/// A per-month fixed order count retrieved from a CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct FixedOrdersRaw {
    branch_id: String,
    month: u32,
    orders: Orders,
}

impl FixedOrdersRaw {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.orders.is_finite() && self.orders >= Orders(0.0),
            "Invalid value for orders ({}). Must be >=0.",
            self.orders
        );

        Ok(())
    }
}

/// Store a per-month override, rejecting out-of-range and duplicate months.
fn insert_profile_entry<T: Copy>(
    profiles: &mut HashMap<BranchID, MonthlyProfile<T>>,
    id: BranchID,
    month: u32,
    value: T,
) -> Result<()> {
    ensure!(
        (1..=12).contains(&month),
        "Month {month} is out of range (must be 1-12)"
    );

    let index = (month - 1) as usize;
    let slot = &mut profiles.entry(id.clone()).or_insert([None; 12])[index];
    ensure!(
        slot.replace(value).is_none(),
        "Duplicate entry for {} for branch {id}",
        MONTH_NAMES[index]
    );

    Ok(())
}

/// Read per-month growth rate overrides, grouped by branch.
fn read_growth_rates(
    model_dir: &Path,
    branch_ids: &HashSet<BranchID>,
) -> Result<HashMap<BranchID, MonthlyProfile<Dimensionless>>> {
    let file_path = model_dir.join(GROWTH_RATES_FILE_NAME);
    let iter = read_csv_optional(&file_path)?;
    read_growth_rates_from_iter(iter, branch_ids).with_context(|| input_err_msg(&file_path))
}

/// Read growth rate overrides from an iterator.
fn read_growth_rates_from_iter<I>(
    iter: I,
    branch_ids: &HashSet<BranchID>,
) -> Result<HashMap<BranchID, MonthlyProfile<Dimensionless>>>
where
    I: Iterator<Item = GrowthRateRaw>,
{
    let mut profiles = HashMap::new();
    for row in iter {
        row.validate()?;
        let id = get_branch_id(branch_ids, &row.branch_id)?;
        insert_profile_entry(&mut profiles, id, row.month, row.growth_rate)?;
    }

    Ok(profiles)
}

/// Read per-month fixed order counts, grouped by branch.
fn read_fixed_orders(
    model_dir: &Path,
    branch_ids: &HashSet<BranchID>,
) -> Result<HashMap<BranchID, MonthlyProfile<Orders>>> {
    let file_path = model_dir.join(FIXED_ORDERS_FILE_NAME);
    let iter = read_csv_optional(&file_path)?;
    read_fixed_orders_from_iter(iter, branch_ids).with_context(|| input_err_msg(&file_path))
}

/// Read fixed order counts from an iterator.
fn read_fixed_orders_from_iter<I>(
    iter: I,
    branch_ids: &HashSet<BranchID>,
) -> Result<HashMap<BranchID, MonthlyProfile<Orders>>>
where
    I: Iterator<Item = FixedOrdersRaw>,
{
    let mut profiles = HashMap::new();
    for row in iter {
        row.validate()?;
        let id = get_branch_id(branch_ids, &row.branch_id)?;
        insert_profile_entry(&mut profiles, id, row.month, row.orders)?;
    }

    Ok(profiles)
}

/// Read the business parameters for every branch.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `branch_ids` - All possible IDs of branches
///
/// # Returns
///
/// Each branch's fully-normalised business parameters, keyed by branch ID.
pub fn read_branch_parameters(
    model_dir: &Path,
    branch_ids: &HashSet<BranchID>,
) -> Result<HashMap<BranchID, BusinessMetrics>> {
    let growth_rates = read_growth_rates(model_dir, branch_ids)?;
    let fixed_orders = read_fixed_orders(model_dir, branch_ids)?;

    let file_path = model_dir.join(BRANCH_PARAMETERS_FILE_NAME);
    let iter = read_csv(&file_path)?;
    read_branch_parameters_from_iter(iter, branch_ids, &growth_rates, &fixed_orders)
        .with_context(|| input_err_msg(&file_path))
}

/// Read and normalise business parameters from an iterator of raw records.
fn read_branch_parameters_from_iter<I>(
    iter: I,
    branch_ids: &HashSet<BranchID>,
    growth_rates: &HashMap<BranchID, MonthlyProfile<Dimensionless>>,
    fixed_orders: &HashMap<BranchID, MonthlyProfile<Orders>>,
) -> Result<HashMap<BranchID, BusinessMetrics>>
where
    I: Iterator<Item = BranchParametersRaw>,
{
    let mut metrics_map = HashMap::new();
    for row in iter {
        let id = get_branch_id(branch_ids, &row.branch_id)?;
        let mode = ForecastMode::normalise(
            &row.forecast_mode,
            row.monthly_growth_rate,
            growth_rates.get(&id),
            fixed_orders.get(&id),
            row.daily_orders,
        );
        let metrics = BusinessMetrics {
            daily_orders: row.daily_orders,
            branch_capacity: row.branch_capacity,
            average_order_price: row.average_order_price,
            detergent_cost: row.detergent_cost,
            packaging_cost: row.packaging_cost,
            other_material_costs: row.other_material_costs,
            delivery_cost_per_customer: row.delivery_cost_per_customer,
            monthly_rent: row.monthly_rent,
            monthly_staff_cost_per_person: row.monthly_staff_cost_per_person,
            monthly_utilities: row.monthly_utilities,
            staff_count: row.staff_count,
            mode,
        };
        metrics
            .validate()
            .with_context(|| format!("Invalid business parameters for branch {id}"))?;

        ensure!(
            metrics_map.insert(id.clone(), metrics).is_none(),
            "Multiple parameter entries for branch {id}"
        );
    }

    Ok(metrics_map)
}

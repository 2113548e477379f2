//! Branches represent the individual laundry locations that make up a network.
//!
//! Each branch owns its business parameters, one-off setup costs and the monthly forecast
//! series derived from them. The series is regenerated wholesale whenever the parameters
//! are set; it is never patched in place.
use crate::forecast::{self, DAYS_PER_MONTH, ForecastMode, MonthlyMetrics};
use crate::units::{Dimensionless, Money, MoneyPerOrder, Orders};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// A unique identifier for a branch (e.g. "city-centre").
#[derive(Clone, std::hash::Hash, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BranchID(pub Rc<str>);

impl std::borrow::Borrow<str> for BranchID {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BranchID {
    fn from(s: &str) -> Self {
        BranchID(Rc::from(s))
    }
}

impl From<String> for BranchID {
    fn from(s: String) -> Self {
        BranchID(Rc::from(s))
    }
}

/// A map of [`Branch`]es keyed by branch ID.
///
/// Iteration follows input order, which is what makes ranking tie-breaks stable.
pub type BranchMap = IndexMap<BranchID, Branch>;

/// A single laundry location together with its derived forecast data.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    /// A unique identifier for the branch
    pub id: BranchID,
    /// The display name of the branch (e.g. "Main Branch")
    pub name: String,
    /// Where the branch is located (e.g. "City Center")
    pub location: String,
    /// The business parameters the forecast is projected from
    pub metrics: BusinessMetrics,
    /// The forecast series derived from `metrics`
    pub monthly_data: Vec<MonthlyMetrics>,
    /// One-off costs incurred when the branch was opened
    pub setup_costs: BranchSetupCosts,
}

impl Branch {
    /// Create a branch, deriving its monthly series from the supplied parameters.
    pub fn new(
        id: BranchID,
        name: String,
        location: String,
        metrics: BusinessMetrics,
        setup_costs: BranchSetupCosts,
        months_to_forecast: u32,
    ) -> Result<Branch> {
        setup_costs.validate()?;
        let monthly_data = forecast::calculate_metrics(&metrics, months_to_forecast)
            .with_context(|| format!("Invalid business parameters for branch {id}"))?;

        Ok(Branch {
            id,
            name,
            location,
            metrics,
            monthly_data,
            setup_costs,
        })
    }

    /// Replace the branch's business parameters.
    ///
    /// The monthly series is regenerated from scratch; on error the branch is left unchanged.
    pub fn set_metrics(&mut self, metrics: BusinessMetrics, months_to_forecast: u32) -> Result<()> {
        self.monthly_data = forecast::calculate_metrics(&metrics, months_to_forecast)?;
        self.metrics = metrics;

        Ok(())
    }
}

/// The business parameters a branch forecast is projected from.
///
/// All cost, price and capacity fields must be non-negative; growth rates may be negative.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessMetrics {
    /// Orders received per day at the start of the forecast
    pub daily_orders: Orders,
    /// The maximum number of orders the branch can process per day
    pub branch_capacity: Orders,
    /// Average price charged per order
    pub average_order_price: MoneyPerOrder,
    /// Detergent cost per order
    pub detergent_cost: MoneyPerOrder,
    /// Packaging cost per order
    pub packaging_cost: MoneyPerOrder,
    /// Other material costs per order
    pub other_material_costs: MoneyPerOrder,
    /// Delivery cost per customer order
    pub delivery_cost_per_customer: MoneyPerOrder,
    /// Rent paid per month
    pub monthly_rent: Money,
    /// Salary cost per staff member per month
    pub monthly_staff_cost_per_person: Money,
    /// Utility bills per month
    pub monthly_utilities: Money,
    /// Number of staff employed (non-negativity enforced by the type)
    pub staff_count: u32,
    /// How monthly order volume is projected
    pub mode: ForecastMode,
}

/// Check that a numeric parameter is a finite, non-negative number
fn check_non_negative(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "{name} must be a non-negative number (got {value})"
    );

    Ok(())
}

impl BusinessMetrics {
    /// Check that every numeric parameter is valid.
    ///
    /// Fails if any cost, price or capacity field is negative, infinite or NaN.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("daily_orders", self.daily_orders.value()),
            ("branch_capacity", self.branch_capacity.value()),
            ("average_order_price", self.average_order_price.value()),
            ("detergent_cost", self.detergent_cost.value()),
            ("packaging_cost", self.packaging_cost.value()),
            ("other_material_costs", self.other_material_costs.value()),
            (
                "delivery_cost_per_customer",
                self.delivery_cost_per_customer.value(),
            ),
            ("monthly_rent", self.monthly_rent.value()),
            (
                "monthly_staff_cost_per_person",
                self.monthly_staff_cost_per_person.value(),
            ),
            ("monthly_utilities", self.monthly_utilities.value()),
        ];
        for (name, value) in fields {
            check_non_negative(name, value)?;
        }

        self.mode.validate()
    }

    /// The fixed monthly cost of running the branch.
    ///
    /// Constant across every month of a forecast: it depends only on rent, staffing and
    /// utilities, none of which vary with order volume.
    pub fn fixed_costs(&self) -> Money {
        let staff = Dimensionless(f64::from(self.staff_count));
        self.monthly_rent + self.monthly_staff_cost_per_person * staff + self.monthly_utilities
    }

    /// Material costs per order, summed over all material categories.
    pub fn material_costs_per_order(&self) -> MoneyPerOrder {
        self.detergent_cost + self.packaging_cost + self.other_material_costs
    }

    /// The maximum number of orders the branch can process in a month.
    pub fn monthly_capacity(&self) -> Orders {
        self.branch_capacity * DAYS_PER_MONTH
    }
}

/// The one-time capital costs incurred when opening a branch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BranchSetupCosts {
    /// Cost of fitting out the premises
    pub construction_cost: Money,
    /// Cost of washers, dryers and other equipment
    pub equipment_cost: Money,
    /// Licensing and permit fees
    pub licensing_cost: Money,
    /// Cost of the initial detergent/packaging inventory
    pub initial_inventory_cost: Money,
}

impl BranchSetupCosts {
    /// The total up-front investment for the branch.
    pub fn total_investment(&self) -> Money {
        self.construction_cost + self.equipment_cost + self.licensing_cost
            + self.initial_inventory_cost
    }

    /// Check that every setup cost is a finite, non-negative number.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("construction_cost", self.construction_cost.value()),
            ("equipment_cost", self.equipment_cost.value()),
            ("licensing_cost", self.licensing_cost.value()),
            ("initial_inventory_cost", self.initial_inventory_cost.value()),
        ];
        for (name, value) in fields {
            check_non_negative(name, value)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, business_metrics};
    use rstest::rstest;

    #[rstest]
    fn test_validate_ok(business_metrics: BusinessMetrics) {
        assert!(business_metrics.validate().is_ok());
    }

    #[rstest]
    fn test_validate_negative_field(mut business_metrics: BusinessMetrics) {
        business_metrics.monthly_rent = Money(-1.0);
        assert_error!(
            business_metrics.validate(),
            "monthly_rent must be a non-negative number (got -1)"
        );
    }

    #[rstest]
    fn test_validate_non_finite_field(mut business_metrics: BusinessMetrics) {
        business_metrics.average_order_price = MoneyPerOrder(f64::NAN);
        assert!(business_metrics.validate().is_err());
    }

    #[rstest]
    fn test_fixed_costs(business_metrics: BusinessMetrics) {
        // rent 1000 + 2 staff at 400 + utilities 150
        assert_eq!(business_metrics.fixed_costs(), Money(1950.0));
    }

    #[rstest]
    fn test_monthly_capacity(business_metrics: BusinessMetrics) {
        assert_eq!(business_metrics.monthly_capacity(), Orders(600.0));
    }

    #[test]
    fn test_total_investment() {
        let costs = BranchSetupCosts {
            construction_cost: Money(4000.0),
            equipment_cost: Money(2000.0),
            licensing_cost: Money(700.0),
            initial_inventory_cost: Money(500.0),
        };
        assert_eq!(costs.total_investment(), Money(7200.0));
    }

    #[rstest]
    fn test_set_metrics_replaces_series(business_metrics: BusinessMetrics) {
        let mut branch = Branch::new(
            "main".into(),
            "Main Branch".to_string(),
            "City Center".to_string(),
            business_metrics.clone(),
            BranchSetupCosts::default(),
            12,
        )
        .unwrap();
        let old_series = branch.monthly_data.clone();

        let mut updated = business_metrics;
        updated.average_order_price = MoneyPerOrder(20.0);
        branch.set_metrics(updated, 12).unwrap();

        // Whole series replaced, same length, different revenue
        assert_eq!(branch.monthly_data.len(), old_series.len());
        assert!(branch.monthly_data[0].revenue > old_series[0].revenue);
    }

    #[rstest]
    fn test_set_metrics_invalid_leaves_series(business_metrics: BusinessMetrics) {
        let mut branch = Branch::new(
            "main".into(),
            "Main Branch".to_string(),
            "City Center".to_string(),
            business_metrics.clone(),
            BranchSetupCosts::default(),
            12,
        )
        .unwrap();
        let old_series = branch.monthly_data.clone();

        let mut bad = business_metrics;
        bad.daily_orders = Orders(-5.0);
        assert!(branch.set_metrics(bad, 12).is_err());
        assert_eq!(branch.monthly_data, old_series);
    }

    #[rstest]
    fn test_growth_rate_may_be_negative(mut business_metrics: BusinessMetrics) {
        business_metrics.mode = ForecastMode::SingleGrowth {
            rate: Dimensionless(-5.0),
        };
        assert!(business_metrics.validate().is_ok());
    }
}

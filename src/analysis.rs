//! Derived metrics for a single branch's forecast series.
//!
//! Everything here is computed from an already-projected [`MonthlyMetrics`] series;
//! degenerate-but-expected inputs (an empty series, a first month with no orders) give a
//! `None` or empty result rather than an error.
use crate::forecast::{DAYS_PER_MONTH, MonthlyMetrics};
use crate::units::{Dimensionless, Money, MoneyPerOrder, Orders};
use serde::{Deserialize, Serialize};

/// Profit margins below this percentage trigger a low-margin warning.
pub const LOW_MARGIN_THRESHOLD: Dimensionless = Dimensionless(20.0);

/// Cost per order for the first month of a forecast, split by category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Detergent, packaging and other material costs per order
    pub materials: MoneyPerOrder,
    /// Delivery cost per order
    pub marketing: MoneyPerOrder,
    /// Fixed costs spread over the month's orders
    pub fixed: MoneyPerOrder,
    /// All costs per order
    pub total: MoneyPerOrder,
}

/// Per-month means and whole-period totals for a forecast series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BranchAverages {
    /// Mean monthly revenue
    pub avg_revenue: Money,
    /// Mean monthly order count
    pub avg_orders: Orders,
    /// Mean monthly profit margin (percent)
    pub avg_profit_margin: Dimensionless,
    /// Mean monthly net profit
    pub avg_net_profit: Money,
    /// Mean monthly total costs
    pub avg_total_costs: Money,
    /// Mean monthly fixed costs
    pub avg_fixed_costs: Money,
    /// Mean monthly materials cost
    pub avg_materials_cost: Money,
    /// Revenue summed over the whole forecast
    pub total_annual_revenue: Money,
    /// Costs summed over the whole forecast
    pub total_annual_costs: Money,
    /// Net profit summed over the whole forecast
    pub total_annual_profit: Money,
    /// Orders summed over the whole forecast
    pub total_annual_orders: Orders,
}

/// Something about a branch's forecast that an operator should look at.
#[derive(Debug, Clone, PartialEq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Warning {
    /// Some month's orders reach the branch's monthly capacity
    AtCapacity {
        /// The branch's daily capacity
        branch_capacity: Orders,
    },
    /// The first month's profit margin is below [`LOW_MARGIN_THRESHOLD`]
    LowMargin,
    /// The forecast ends with fewer orders than it starts with
    DecliningOrders,
}

impl Warning {
    /// The operator-facing message for this warning.
    pub fn message(&self) -> String {
        match self {
            Warning::AtCapacity { branch_capacity } => format!(
                "Branch is operating at maximum capacity ({branch_capacity} orders/day)."
            ),
            Warning::LowMargin => {
                "Low profit margin. Consider adjusting prices or reducing costs.".to_string()
            }
            Warning::DecliningOrders => {
                "Orders are projected to decline over the forecast period.".to_string()
            }
        }
    }
}

/// Split the first month's costs into cost per order by category.
///
/// Returns `None` for an empty series and for a first month with no orders, since a
/// per-order figure is meaningless in both cases.
pub fn calculate_cost_breakdown(series: &[MonthlyMetrics]) -> Option<CostBreakdown> {
    let first = series.first()?;
    if first.orders == Orders(0.0) {
        return None;
    }

    Some(CostBreakdown {
        materials: first.materials_cost / first.orders,
        marketing: first.delivery_cost / first.orders,
        fixed: first.fixed_costs / first.orders,
        total: first.total_costs / first.orders,
    })
}

/// Inspect a forecast series for conditions an operator should know about.
///
/// An empty series produces no warnings.
pub fn calculate_warnings(series: &[MonthlyMetrics], branch_capacity: Orders) -> Vec<Warning> {
    let Some(first) = series.first() else {
        return Vec::new();
    };

    let mut warnings = Vec::new();

    let monthly_capacity = branch_capacity * DAYS_PER_MONTH;
    if series.iter().any(|month| month.orders >= monthly_capacity) {
        warnings.push(Warning::AtCapacity { branch_capacity });
    }

    if first.profit_margin < LOW_MARGIN_THRESHOLD {
        warnings.push(Warning::LowMargin);
    }

    if let Some(last) = series.last() {
        if series.len() > 1 && last.orders < first.orders {
            warnings.push(Warning::DecliningOrders);
        }
    }

    warnings
}

/// Compute per-month means and whole-period totals for a forecast series.
///
/// Returns `None` for an empty series.
pub fn calculate_averages(series: &[MonthlyMetrics]) -> Option<BranchAverages> {
    if series.is_empty() {
        return None;
    }

    let months = Dimensionless::from_count(series.len());
    let total_revenue: Money = series.iter().map(|month| month.revenue).sum();
    let total_orders: Orders = series.iter().map(|month| month.orders).sum();
    let total_profit_margin: Dimensionless = series.iter().map(|month| month.profit_margin).sum();
    let total_net_profit: Money = series.iter().map(|month| month.net_profit).sum();
    let total_costs: Money = series.iter().map(|month| month.total_costs).sum();
    let total_fixed_costs: Money = series.iter().map(|month| month.fixed_costs).sum();
    let total_materials_costs: Money = series.iter().map(|month| month.materials_cost).sum();

    Some(BranchAverages {
        avg_revenue: total_revenue / months,
        avg_orders: total_orders / months,
        avg_profit_margin: total_profit_margin / months,
        avg_net_profit: total_net_profit / months,
        avg_total_costs: total_costs / months,
        avg_fixed_costs: total_fixed_costs / months,
        avg_materials_cost: total_materials_costs / months,
        total_annual_revenue: total_revenue,
        total_annual_costs: total_costs,
        total_annual_profit: total_net_profit,
        total_annual_orders: total_orders,
    })
}

//! Rolling per-branch results up into network-wide figures.
//!
//! Network averages are a simple mean of the per-branch figures: a small branch counts
//! for as much as a large one. Rankings break ties by input order.
use crate::analysis::LOW_MARGIN_THRESHOLD;
use crate::branch::{Branch, BranchID, BranchMap};
use crate::forecast::MonthlyMetrics;
use crate::units::{Dimensionless, Money, Orders, PERCENT};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;

/// Network average utilization above this percentage triggers a health warning.
pub const NETWORK_UTILIZATION_THRESHOLD: Dimensionless = Dimensionless(80.0);

/// A single branch running above this percentage of capacity triggers a health warning.
pub const BRANCH_UTILIZATION_THRESHOLD: Dimensionless = Dimensionless(85.0);

/// Whole-period totals and headline ratios for one branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BranchSummary {
    /// Revenue summed over the branch's forecast
    pub total_revenue: Money,
    /// Net profit summed over the branch's forecast
    pub total_profit: Money,
    /// Total profit as a percentage of total revenue
    pub average_margin: Dimensionless,
    /// Orders summed over the branch's forecast
    pub total_orders: Orders,
    /// Final-month orders as a percentage of monthly capacity
    pub average_utilization: Dimensionless,
}

/// Totals and equal-weight averages over every branch in a network.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSummary {
    /// Revenue summed over all branches
    pub total_revenue: Money,
    /// Net profit summed over all branches
    pub total_profit: Money,
    /// Orders summed over all branches
    pub total_orders: Orders,
    /// Mean of the per-branch average margins (not volume-weighted)
    pub average_margin: Dimensionless,
    /// Mean of the per-branch utilizations (not volume-weighted)
    pub average_utilization: Dimensionless,
    /// Each branch's summary, in input order
    pub branch_summaries: IndexMap<BranchID, BranchSummary>,
}

impl NetworkSummary {
    /// Branches ordered by descending total profit (ties keep input order).
    pub fn ranked_by_profit(&self) -> Vec<(&BranchID, &BranchSummary)> {
        self.branch_summaries
            .iter()
            .sorted_by(|a, b| {
                b.1.total_profit
                    .value()
                    .total_cmp(&a.1.total_profit.value())
            })
            .collect()
    }

    /// The branch with the highest total profit, if the network is non-empty.
    pub fn best_performer(&self) -> Option<&BranchID> {
        Some(self.ranked_by_profit().first()?.0)
    }

    /// The branch with the lowest total profit, if the network is non-empty.
    pub fn worst_performer(&self) -> Option<&BranchID> {
        Some(self.ranked_by_profit().last()?.0)
    }
}

/// A network-wide condition worth flagging to an operator.
#[derive(Debug, Clone, Copy, PartialEq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum HealthFinding {
    /// Average utilization across branches is above [`NETWORK_UTILIZATION_THRESHOLD`]
    HighAverageUtilization {
        /// Mean final-month utilization across all branches (percent)
        average: Dimensionless,
    },
    /// Some branches run above [`BRANCH_UTILIZATION_THRESHOLD`] of capacity
    BranchesNearCapacity {
        /// How many branches are affected
        count: u32,
    },
    /// Average final-month margin across branches is below [`LOW_MARGIN_THRESHOLD`]
    LowAverageMargin {
        /// Mean final-month profit margin across all branches (percent)
        average: Dimensionless,
    },
    /// Some branches end the forecast below [`LOW_MARGIN_THRESHOLD`] margin
    LowMarginBranches {
        /// How many branches are affected
        count: u32,
    },
}

/// "es" when `count` calls for a plural, otherwise the empty string.
fn plural_es(count: u32) -> &'static str {
    if count > 1 { "es" } else { "" }
}

impl HealthFinding {
    /// The operator-facing warning message for this finding.
    pub fn message(&self) -> String {
        match self {
            HealthFinding::HighAverageUtilization { average } => format!(
                "Average capacity utilization is {:.1}% across all branches",
                average.value()
            ),
            HealthFinding::BranchesNearCapacity { count } => format!(
                "{count} branch{} operating above 85% capacity",
                plural_es(*count)
            ),
            HealthFinding::LowAverageMargin { average } => format!(
                "Average profit margin is below target at {:.1}%",
                average.value()
            ),
            HealthFinding::LowMarginBranches { count } => format!(
                "{count} branch{} operating below 20% profit margin",
                plural_es(*count)
            ),
        }
    }

    /// The suggested action for this finding.
    pub fn recommendation(&self) -> &'static str {
        match self {
            HealthFinding::HighAverageUtilization { .. } => {
                "Consider expanding capacity or opening new branches"
            }
            HealthFinding::BranchesNearCapacity { .. } => {
                "Optimize resource allocation across branches"
            }
            HealthFinding::LowAverageMargin { .. } => "Review pricing strategy and cost structure",
            HealthFinding::LowMarginBranches { .. } => {
                "Implement cost-saving measures in underperforming branches"
            }
        }
    }
}

/// The final month of a branch's forecast.
///
/// Panics if the series is empty; a [`Branch`] is always constructed with at least one
/// month of data.
fn last_month(branch: &Branch) -> &MonthlyMetrics {
    branch
        .monthly_data
        .last()
        .expect("branch has an empty forecast series")
}

/// A branch's final-month orders as a percentage of its monthly capacity.
fn utilization(branch: &Branch) -> Dimensionless {
    let capacity = branch.metrics.monthly_capacity();
    if capacity == Orders(0.0) {
        return Dimensionless(0.0);
    }

    last_month(branch).orders / capacity * PERCENT
}

/// Summarise a branch's whole forecast into totals and headline ratios.
///
/// The branch must have at least one month of forecast data.
pub fn calculate_branch_summary(branch: &Branch) -> BranchSummary {
    let total_revenue: Money = branch.monthly_data.iter().map(|m| m.revenue).sum();
    let total_profit: Money = branch.monthly_data.iter().map(|m| m.net_profit).sum();
    let total_orders: Orders = branch.monthly_data.iter().map(|m| m.orders).sum();
    let average_margin = if total_revenue == Money(0.0) {
        Dimensionless(0.0)
    } else {
        total_profit / total_revenue * PERCENT
    };

    BranchSummary {
        total_revenue,
        total_profit,
        average_margin,
        total_orders,
        average_utilization: utilization(branch),
    }
}

/// Roll every branch's summary up into network totals and averages.
///
/// An empty network gives all-zero metrics and an empty summary list.
pub fn calculate_overall_metrics(branches: &BranchMap) -> NetworkSummary {
    let branch_summaries: IndexMap<_, _> = branches
        .iter()
        .map(|(id, branch)| (id.clone(), calculate_branch_summary(branch)))
        .collect();

    if branch_summaries.is_empty() {
        return NetworkSummary {
            total_revenue: Money(0.0),
            total_profit: Money(0.0),
            total_orders: Orders(0.0),
            average_margin: Dimensionless(0.0),
            average_utilization: Dimensionless(0.0),
            branch_summaries,
        };
    }

    let count = Dimensionless::from_count(branch_summaries.len());
    NetworkSummary {
        total_revenue: branch_summaries.values().map(|s| s.total_revenue).sum(),
        total_profit: branch_summaries.values().map(|s| s.total_profit).sum(),
        total_orders: branch_summaries.values().map(|s| s.total_orders).sum(),
        average_margin: branch_summaries
            .values()
            .map(|s| s.average_margin)
            .sum::<Dimensionless>()
            / count,
        average_utilization: branch_summaries
            .values()
            .map(|s| s.average_utilization)
            .sum::<Dimensionless>()
            / count,
        branch_summaries,
    }
}

/// Check the final forecast month of every branch for network-wide problems.
///
/// An empty network produces no findings.
pub fn network_health(branches: &BranchMap) -> Vec<HealthFinding> {
    if branches.is_empty() {
        return Vec::new();
    }

    let mut total_utilization = Dimensionless(0.0);
    let mut total_margin = Dimensionless(0.0);
    let mut high_utilization_branches = 0u32;
    let mut low_margin_branches = 0u32;

    for branch in branches.values() {
        let utilization = utilization(branch);
        let margin = last_month(branch).profit_margin;

        total_utilization += utilization;
        total_margin += margin;

        if utilization > BRANCH_UTILIZATION_THRESHOLD {
            high_utilization_branches += 1;
        }
        if margin < LOW_MARGIN_THRESHOLD {
            low_margin_branches += 1;
        }
    }

    let count = Dimensionless::from_count(branches.len());
    let avg_utilization = total_utilization / count;
    let avg_margin = total_margin / count;

    let mut findings = Vec::new();
    if avg_utilization > NETWORK_UTILIZATION_THRESHOLD {
        findings.push(HealthFinding::HighAverageUtilization {
            average: avg_utilization,
        });
    }
    if high_utilization_branches > 0 {
        findings.push(HealthFinding::BranchesNearCapacity {
            count: high_utilization_branches,
        });
    }
    if avg_margin < LOW_MARGIN_THRESHOLD {
        findings.push(HealthFinding::LowAverageMargin {
            average: avg_margin,
        });
    }
    if low_margin_branches > 0 {
        findings.push(HealthFinding::LowMarginBranches {
            count: low_margin_branches,
        });
    }

    findings
}

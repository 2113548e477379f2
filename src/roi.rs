//! Return-on-investment figures for branches and for the whole network.
//!
//! The forecast date is an explicit argument throughout so these stay pure functions;
//! the CLI passes the current date (or the `--as-of` override).
use crate::branch::{Branch, BranchID, BranchMap};
use crate::units::{Dimensionless, Money, PERCENT};
use anyhow::{Result, bail};
use chrono::{Months, NaiveDate};
use serde::Serialize;
use std::fmt;

/// How long until a branch's setup investment is recovered.
///
/// An explicit sentinel rather than a floating-point infinity, so an unreachable
/// breakeven can never leak into date arithmetic or serialised output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MonthsToRoi {
    /// The investment is recovered after this many months of average profit
    Reached(u32),
    /// The branch never breaks even on its current trajectory
    Never,
}

impl MonthsToRoi {
    /// The number of months, or `None` if breakeven is never reached.
    pub fn months(self) -> Option<u32> {
        match self {
            MonthsToRoi::Reached(months) => Some(months),
            MonthsToRoi::Never => None,
        }
    }

    /// The calendar date `self` months on from `today`, if breakeven is reached.
    pub fn projected_date(self, today: NaiveDate) -> Option<NaiveDate> {
        today.checked_add_months(Months::new(self.months()?))
    }
}

impl fmt::Display for MonthsToRoi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthsToRoi::Reached(months) => write!(f, "{months}"),
            MonthsToRoi::Never => write!(f, "never"),
        }
    }
}

/// Return-on-investment figures for a single branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiMetrics {
    /// The branch's total setup investment
    pub total_investment: Money,
    /// Mean net profit per forecast month
    pub monthly_profit: Money,
    /// Months of average profit needed to recover the investment
    pub months_to_roi: MonthsToRoi,
    /// The calendar date breakeven is projected for, when it is reachable
    pub projected_roi_date: Option<NaiveDate>,
    /// Cumulative forecast profit as a percentage of the investment
    pub current_roi_percentage: Dimensionless,
    /// Whether the cumulative profit has recovered the investment
    pub is_roi_reached: bool,
}

/// A branch singled out by the network ROI ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiRanking {
    /// The branch's ID
    pub branch_id: BranchID,
    /// The branch's display name
    pub branch_name: String,
    /// How long the branch takes to break even; `None` when it never does
    pub months_to_roi: Option<u32>,
}

/// Return-on-investment figures for the whole network.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkRoiMetrics {
    /// Setup investment summed over every branch
    pub total_network_investment: Money,
    /// Mean of the per-branch average monthly profits
    pub average_monthly_profit: Money,
    /// Total investment divided by total monthly profit; `None` when the network's
    /// combined monthly profit is zero
    pub average_months_to_roi: Option<Dimensionless>,
    /// The branch that breaks even soonest
    pub fastest_roi: RoiRanking,
    /// The branch that breaks even last
    pub slowest_roi: RoiRanking,
    /// The calendar date network breakeven is projected for, when meaningful
    pub projected_network_roi_date: Option<NaiveDate>,
    /// Cumulative network profit as a percentage of total investment
    pub current_network_roi_percentage: Dimensionless,
    /// Whether the network as a whole has recovered its investment
    pub is_network_roi_reached: bool,
}

/// Round a non-negative month count up to a whole number of months.
fn ceil_months(months: Dimensionless) -> u32 {
    let months = months.value().ceil().clamp(0.0, f64::from(u32::MAX));
    // Clamped to the u32 range and non-negative
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let months = months as u32;
    months
}

/// Cumulative profit as a percentage of the amount invested.
///
/// A zero investment is trivially recovered, so it reports 100% when the cumulative
/// profit is positive and 0% otherwise, keeping the figure finite.
fn roi_percentage(total_profit: Money, total_investment: Money) -> Dimensionless {
    if total_investment == Money(0.0) {
        return if total_profit > Money(0.0) {
            Dimensionless(100.0)
        } else {
            Dimensionless(0.0)
        };
    }

    total_profit / total_investment * PERCENT
}

/// Compute ROI figures for a single branch.
///
/// The branch must have at least one month of forecast data.
///
/// # Arguments
///
/// * `branch` - The branch to evaluate
/// * `today` - The date breakeven projections are counted from
pub fn calculate_branch_roi(branch: &Branch, today: NaiveDate) -> RoiMetrics {
    assert!(
        !branch.monthly_data.is_empty(),
        "branch {} has an empty forecast series",
        branch.id
    );

    let total_investment = branch.setup_costs.total_investment();
    let total_profit: Money = branch.monthly_data.iter().map(|m| m.net_profit).sum();
    let monthly_profit = total_profit / Dimensionless::from_count(branch.monthly_data.len());

    let months_to_roi = if monthly_profit > Money(0.0) {
        MonthsToRoi::Reached(ceil_months(total_investment / monthly_profit))
    } else {
        MonthsToRoi::Never
    };

    let current_roi_percentage = roi_percentage(total_profit, total_investment);

    RoiMetrics {
        total_investment,
        monthly_profit,
        months_to_roi,
        projected_roi_date: months_to_roi.projected_date(today),
        current_roi_percentage,
        is_roi_reached: current_roi_percentage >= Dimensionless(100.0),
    }
}

/// Compute ROI figures across the whole network.
///
/// Fails if the network has no branches. The average months to breakeven divides the
/// network's total investment by its total monthly profit rather than averaging the
/// per-branch horizons, so one branch that never breaks even cannot drag the figure to
/// infinity.
pub fn calculate_network_roi(branches: &BranchMap, today: NaiveDate) -> Result<NetworkRoiMetrics> {
    if branches.is_empty() {
        bail!("No branches provided for ROI calculation");
    }

    let rois: Vec<(&Branch, RoiMetrics)> = branches
        .values()
        .map(|branch| (branch, calculate_branch_roi(branch, today)))
        .collect();

    let total_network_investment: Money = rois.iter().map(|(_, roi)| roi.total_investment).sum();
    let total_monthly_profit: Money = rois.iter().map(|(_, roi)| roi.monthly_profit).sum();
    let average_monthly_profit =
        total_monthly_profit / Dimensionless::from_count(branches.len());

    // Stable sort: ties and a sole branch keep input order
    let mut ranked = rois.clone();
    ranked.sort_by_key(|(_, roi)| roi.months_to_roi);
    let to_ranking = |(branch, roi): &(&Branch, RoiMetrics)| RoiRanking {
        branch_id: branch.id.clone(),
        branch_name: branch.name.clone(),
        months_to_roi: roi.months_to_roi.months(),
    };
    let fastest_roi = to_ranking(ranked.first().expect("network has no branches"));
    let slowest_roi = to_ranking(ranked.last().expect("network has no branches"));

    let average_months_to_roi = (total_monthly_profit != Money(0.0))
        .then(|| total_network_investment / total_monthly_profit);
    let projected_network_roi_date = average_months_to_roi
        .filter(|months| months.value() >= 0.0)
        .and_then(|months| today.checked_add_months(Months::new(ceil_months(months))));

    let total_network_profit: Money = branches
        .values()
        .flat_map(|branch| branch.monthly_data.iter().map(|m| m.net_profit))
        .sum();
    let current_network_roi_percentage =
        roi_percentage(total_network_profit, total_network_investment);

    Ok(NetworkRoiMetrics {
        total_network_investment,
        average_monthly_profit,
        average_months_to_roi,
        fastest_roi,
        slowest_roi,
        projected_network_roi_date,
        current_network_roi_percentage,
        is_network_roi_reached: current_network_roi_percentage >= Dimensionless(100.0),
    })
}

//! The forecast engine: projects a branch's business parameters into a monthly series.
//!
//! Monthly order volume is projected under one of three modes (a single compounding
//! growth rate, a per-month growth rate table, or a per-month fixed order count); the
//! cost model applied to each month's orders is identical across all three.
use crate::branch::BusinessMetrics;
use crate::units::{Dimensionless, Money, Orders, PERCENT};
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::{Deserialize, Serialize};

/// The number of months projected when a network doesn't say otherwise.
pub const DEFAULT_MONTHS_TO_FORECAST: u32 = 12;

/// Days per month assumed when scaling daily figures to monthly ones.
pub const DAYS_PER_MONTH: Dimensionless = Dimensionless(30.0);

/// The seasonally-varying growth curve assumed for branches with no growth table of
/// their own (percent per month, January first).
pub const DEFAULT_MONTHLY_GROWTH_RATES: [Dimensionless; 12] = [
    Dimensionless(2.0),
    Dimensionless(2.0),
    Dimensionless(3.0),
    Dimensionless(3.0),
    Dimensionless(4.0),
    Dimensionless(5.0),
    Dimensionless(5.0),
    Dimensionless(4.0),
    Dimensionless(3.0),
    Dimensionless(3.0),
    Dimensionless(2.0),
    Dimensionless(2.0),
];

/// The order count assumed for every month of a branch with no fixed-orders table.
pub const DEFAULT_FIXED_MONTHLY_ORDERS: Orders = Orders(300.0);

/// Calendar month names for the 12-month cycle, used in messages.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Per-month override values for the repeating 12-month cycle (January first).
pub type MonthlyProfile<T> = [Option<T>; 12];

/// How a branch's monthly order volume is projected.
#[derive(Debug, Clone, PartialEq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ForecastMode {
    /// Orders compound by a single percentage every month
    SingleGrowth {
        /// Growth applied at the end of each month (percent, may be negative)
        rate: Dimensionless,
    },
    /// Orders compound by a different percentage for each month of the year
    MonthlyGrowth {
        /// Growth applied at the end of each cycle month (percent, may be negative)
        rates: [Dimensionless; 12],
    },
    /// Orders are looked up per month with no compounding
    FixedOrders {
        /// Order count for each cycle month
        orders: [Orders; 12],
    },
}

/// Populate a 12-month table from a (possibly partial) profile.
///
/// Entries the profile doesn't set fall back to `fallback`; a missing or empty profile
/// is replaced with `default` wholesale.
fn fill_profile<T: Copy>(
    profile: Option<&MonthlyProfile<T>>,
    fallback: T,
    default: [T; 12],
) -> [T; 12] {
    match profile {
        Some(profile) if profile.iter().any(Option::is_some) => {
            (*profile).map(|entry| entry.unwrap_or(fallback))
        }
        _ => default,
    }
}

impl ForecastMode {
    /// Build a fully-populated forecast mode from raw configuration values.
    ///
    /// Branch records written by older versions of the configuration may carry an
    /// unknown mode label or lack the per-month tables; both are corrected here (with a
    /// logged warning for the former) rather than rejected, so that such records remain
    /// computable.
    pub fn normalise(
        label: &str,
        growth_rate: Dimensionless,
        growth_rates: Option<&MonthlyProfile<Dimensionless>>,
        fixed_orders: Option<&MonthlyProfile<Orders>>,
        daily_orders: Orders,
    ) -> ForecastMode {
        match label {
            "single-growth" => ForecastMode::SingleGrowth { rate: growth_rate },
            "monthly-growth" => ForecastMode::MonthlyGrowth {
                rates: fill_profile(growth_rates, growth_rate, DEFAULT_MONTHLY_GROWTH_RATES),
            },
            "fixed-orders" => ForecastMode::FixedOrders {
                orders: fill_profile(
                    fixed_orders,
                    daily_orders * DAYS_PER_MONTH,
                    [DEFAULT_FIXED_MONTHLY_ORDERS; 12],
                ),
            },
            unknown => {
                warn!("Unknown forecast mode '{unknown}'; assuming single-growth");
                ForecastMode::SingleGrowth { rate: growth_rate }
            }
        }
    }

    /// Check that the mode's parameters are valid.
    ///
    /// Growth rates may be negative (a shrinking branch) but must be finite; fixed
    /// order counts must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        match self {
            ForecastMode::SingleGrowth { rate } => {
                ensure!(
                    rate.is_finite(),
                    "monthly_growth_rate must be a finite number (got {rate})"
                );
            }
            ForecastMode::MonthlyGrowth { rates } => {
                for (rate, month) in rates.iter().zip(MONTH_NAMES) {
                    ensure!(
                        rate.is_finite(),
                        "Growth rate for {month} must be a finite number (got {rate})"
                    );
                }
            }
            ForecastMode::FixedOrders { orders } => {
                for (orders, month) in orders.iter().zip(MONTH_NAMES) {
                    ensure!(
                        orders.is_finite() && *orders >= Orders(0.0),
                        "Order count for {month} must be a non-negative number (got {orders})"
                    );
                }
            }
        }

        Ok(())
    }
}

/// One point in a branch's forecast series.
///
/// Produced only by [`calculate_metrics`] and immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMetrics {
    /// 1-based position in the forecast
    pub month: u32,
    /// Orders processed this month (after the capacity cap)
    pub orders: Orders,
    /// Takings from all orders
    pub revenue: Money,
    /// Cost of delivering orders to customers
    pub delivery_cost: Money,
    /// Cost of detergent, packaging and other materials
    pub materials_cost: Money,
    /// Rent, staffing and utilities (identical every month)
    pub fixed_costs: Money,
    /// All costs combined
    pub total_costs: Money,
    /// Revenue less total costs
    pub net_profit: Money,
    /// Net profit as a percentage of revenue (zero when there is no revenue)
    pub profit_margin: Dimensionless,
}

/// Position in the repeating 12-month cycle for a 1-based forecast month.
///
/// Months beyond 12 wrap around, so longer horizons repeat the seasonal pattern.
fn cycle_index(month: u32) -> usize {
    ((month - 1) % 12) as usize
}

/// The multiplier corresponding to a percentage growth rate.
fn growth_factor(rate: Dimensionless) -> Dimensionless {
    Dimensionless(1.0) + rate / PERCENT
}

/// Project the capped order count for each month under a compounding growth mode.
///
/// The cap applies to the month being recorded; the projection for the following month
/// grows from the recorded (capped) figure and is itself left uncapped until that month
/// is realised, so a branch at capacity keeps projecting above it.
fn compound_orders(
    start: Orders,
    capacity: Orders,
    months: u32,
    rate_for_month: impl Fn(u32) -> Dimensionless,
) -> Vec<Orders> {
    let mut series = Vec::new();
    let mut orders = start;
    for month in 1..=months {
        orders = orders.min(capacity);
        series.push(orders);
        orders = orders * growth_factor(rate_for_month(month));
    }

    series
}

/// Project the capped order count for each month of the forecast.
fn project_orders(metrics: &BusinessMetrics, months: u32) -> Vec<Orders> {
    let capacity = metrics.monthly_capacity();
    let start = metrics.daily_orders * DAYS_PER_MONTH;

    match &metrics.mode {
        ForecastMode::SingleGrowth { rate } => compound_orders(start, capacity, months, |_| *rate),
        ForecastMode::MonthlyGrowth { rates } => {
            compound_orders(start, capacity, months, |month| rates[cycle_index(month)])
        }
        // No compounding: each month's count is looked up independently
        ForecastMode::FixedOrders { orders } => (1..=months)
            .map(|month| orders[cycle_index(month)].min(capacity))
            .collect(),
    }
}

/// The cost model applied to a single month's orders (identical across forecast modes).
fn month_financials(metrics: &BusinessMetrics, month: u32, orders: Orders) -> MonthlyMetrics {
    let revenue = orders * metrics.average_order_price;
    let delivery_cost = orders * metrics.delivery_cost_per_customer;
    let materials_cost = orders * metrics.material_costs_per_order();
    let fixed_costs = metrics.fixed_costs();
    let total_costs = delivery_cost + materials_cost + fixed_costs;
    let net_profit = revenue - total_costs;
    let profit_margin = if revenue == Money(0.0) {
        Dimensionless(0.0)
    } else {
        net_profit / revenue * PERCENT
    };

    MonthlyMetrics {
        month,
        orders,
        revenue,
        delivery_cost,
        materials_cost,
        fixed_costs,
        total_costs,
        net_profit,
        profit_margin,
    }
}

/// Project a monthly metrics series from a branch's business parameters.
///
/// This is a pure function of its inputs: calling it twice with the same parameters
/// produces an identical series. Validation failures are raised before any point of the
/// series is produced.
///
/// # Arguments
///
/// * `metrics` - The branch's business parameters
/// * `months_to_forecast` - How many months to project (at least 1)
pub fn calculate_metrics(
    metrics: &BusinessMetrics,
    months_to_forecast: u32,
) -> Result<Vec<MonthlyMetrics>> {
    metrics.validate().context("Invalid business metrics")?;
    ensure!(
        months_to_forecast >= 1,
        "months_to_forecast must be at least 1"
    );

    let series = project_orders(metrics, months_to_forecast)
        .into_iter()
        .zip(1u32..)
        .map(|(orders, month)| month_financials(metrics, month, orders))
        .collect();

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, business_metrics, zero_cost_metrics};
    use crate::units::MoneyPerOrder;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    /// Orders grow by 50% each month from a base of 100/day with a 1000/day capacity
    #[rstest]
    fn test_single_growth_compounds(mut zero_cost_metrics: BusinessMetrics) {
        zero_cost_metrics.mode = ForecastMode::SingleGrowth {
            rate: Dimensionless(50.0),
        };
        let series = calculate_metrics(&zero_cost_metrics, 3).unwrap();
        assert_approx_eq!(Orders, series[0].orders, Orders(3000.0));
        assert_approx_eq!(Orders, series[1].orders, Orders(4500.0));
        assert_approx_eq!(Orders, series[2].orders, Orders(6750.0));
    }

    /// With zero growth and no costs, every month matches the first
    #[rstest]
    fn test_zero_growth_is_constant(zero_cost_metrics: BusinessMetrics) {
        let series = calculate_metrics(&zero_cost_metrics, 12).unwrap();
        assert_eq!(series.len(), 12);
        for month in &series {
            assert_eq!(month.orders, Orders(3000.0));
            assert_eq!(month.revenue, Money(150_000.0));
            assert_eq!(month.net_profit, Money(150_000.0));
            assert_eq!(month.profit_margin, Dimensionless(100.0));
        }
    }

    /// A 50 orders/day capacity caps the 100/day base at 1500 orders/month
    #[rstest]
    fn test_capacity_caps_orders(mut zero_cost_metrics: BusinessMetrics) {
        zero_cost_metrics.branch_capacity = Orders(50.0);
        let series = calculate_metrics(&zero_cost_metrics, 12).unwrap();
        assert_eq!(series[0].orders, Orders(1500.0));
        assert_eq!(series[0].revenue, Money(75_000.0));
    }

    /// A branch at capacity keeps projecting growth, but realised orders stay capped
    #[rstest]
    fn test_orders_never_exceed_capacity_when_growing(mut zero_cost_metrics: BusinessMetrics) {
        zero_cost_metrics.branch_capacity = Orders(50.0);
        zero_cost_metrics.mode = ForecastMode::SingleGrowth {
            rate: Dimensionless(10.0),
        };
        let series = calculate_metrics(&zero_cost_metrics, 24).unwrap();
        for month in &series {
            assert!(month.orders <= Orders(1500.0));
        }
    }

    /// Fixed order counts are used as-is, ignoring the daily orders parameter
    #[rstest]
    fn test_fixed_orders_ignore_daily_orders(mut zero_cost_metrics: BusinessMetrics) {
        zero_cost_metrics.mode = ForecastMode::FixedOrders {
            orders: [Orders(500.0); 12],
        };
        let series = calculate_metrics(&zero_cost_metrics, 12).unwrap();
        for month in &series {
            assert_eq!(month.orders, Orders(500.0));
        }
    }

    /// Fixed order counts are still capped at monthly capacity
    #[rstest]
    fn test_fixed_orders_capped(mut zero_cost_metrics: BusinessMetrics) {
        zero_cost_metrics.branch_capacity = Orders(10.0);
        zero_cost_metrics.mode = ForecastMode::FixedOrders {
            orders: [Orders(500.0); 12],
        };
        let series = calculate_metrics(&zero_cost_metrics, 12).unwrap();
        for month in &series {
            assert_eq!(month.orders, Orders(300.0));
        }
    }

    /// Each month applies its own growth rate from the table
    #[rstest]
    fn test_monthly_growth_applies_per_month_rates(mut business_metrics: BusinessMetrics) {
        let mut rates = [Dimensionless(0.0); 12];
        rates[0] = Dimensionless(10.0);
        rates[1] = Dimensionless(20.0);
        business_metrics.mode = ForecastMode::MonthlyGrowth { rates };

        let series = calculate_metrics(&business_metrics, 3).unwrap();
        assert_approx_eq!(Orders, series[0].orders, Orders(300.0));
        assert_approx_eq!(Orders, series[1].orders, Orders(330.0));
        assert_approx_eq!(Orders, series[2].orders, Orders(396.0));
    }

    /// Horizons beyond a year repeat the 12-month cycle
    #[rstest]
    fn test_cycle_repeats_beyond_twelve_months(mut business_metrics: BusinessMetrics) {
        let mut orders = [Orders(100.0); 12];
        orders[0] = Orders(250.0);
        orders[11] = Orders(50.0);
        business_metrics.mode = ForecastMode::FixedOrders { orders };

        let series = calculate_metrics(&business_metrics, 24).unwrap();
        assert_eq!(series[12].orders, series[0].orders);
        assert_eq!(series[23].orders, series[11].orders);
        assert_eq!(series[12].orders, Orders(250.0));
    }

    /// totalCosts and netProfit satisfy their defining identities in every month
    #[rstest]
    fn test_cost_sum_identities(mut business_metrics: BusinessMetrics) {
        business_metrics.mode = ForecastMode::SingleGrowth {
            rate: Dimensionless(7.5),
        };
        let series = calculate_metrics(&business_metrics, 12).unwrap();
        for month in &series {
            assert_approx_eq!(
                Money,
                month.total_costs,
                month.delivery_cost + month.materials_cost + month.fixed_costs
            );
            assert_approx_eq!(Money, month.net_profit, month.revenue - month.total_costs);
        }
    }

    /// Fixed costs do not vary with order volume
    #[rstest]
    fn test_fixed_costs_constant_across_series(mut business_metrics: BusinessMetrics) {
        business_metrics.mode = ForecastMode::SingleGrowth {
            rate: Dimensionless(25.0),
        };
        let series = calculate_metrics(&business_metrics, 12).unwrap();
        for month in &series {
            assert_eq!(month.fixed_costs, series[0].fixed_costs);
        }
    }

    /// Zero configured orders give zero revenue and a zero (not NaN) margin
    #[rstest]
    fn test_zero_orders_zero_margin(mut business_metrics: BusinessMetrics) {
        business_metrics.daily_orders = Orders(0.0);
        let series = calculate_metrics(&business_metrics, 12).unwrap();
        assert_eq!(series[0].revenue, Money(0.0));
        assert_eq!(series[0].profit_margin, Dimensionless(0.0));
    }

    /// The engine is a pure function: identical inputs give an identical series
    #[rstest]
    fn test_idempotent(business_metrics: BusinessMetrics) {
        let first = calculate_metrics(&business_metrics, 12).unwrap();
        let second = calculate_metrics(&business_metrics, 12).unwrap();
        assert_eq!(first, second);
    }

    #[rstest]
    fn test_negative_field_rejected(mut business_metrics: BusinessMetrics) {
        business_metrics.detergent_cost = MoneyPerOrder(-0.1);
        assert!(calculate_metrics(&business_metrics, 12).is_err());
    }

    #[rstest]
    fn test_zero_months_rejected(business_metrics: BusinessMetrics) {
        assert_error!(
            calculate_metrics(&business_metrics, 0),
            "months_to_forecast must be at least 1"
        );
    }

    #[test]
    fn test_normalise_unknown_label() {
        let mode = ForecastMode::normalise(
            "quarterly-growth",
            Dimensionless(5.0),
            None,
            None,
            Orders(10.0),
        );
        assert_eq!(
            mode,
            ForecastMode::SingleGrowth {
                rate: Dimensionless(5.0)
            }
        );
    }

    #[test]
    fn test_normalise_missing_tables_get_defaults() {
        let mode =
            ForecastMode::normalise("monthly-growth", Dimensionless(5.0), None, None, Orders(10.0));
        assert_eq!(
            mode,
            ForecastMode::MonthlyGrowth {
                rates: DEFAULT_MONTHLY_GROWTH_RATES
            }
        );

        let mode =
            ForecastMode::normalise("fixed-orders", Dimensionless(5.0), None, None, Orders(10.0));
        assert_eq!(
            mode,
            ForecastMode::FixedOrders {
                orders: [DEFAULT_FIXED_MONTHLY_ORDERS; 12]
            }
        );
    }

    #[test]
    fn test_normalise_partial_growth_table_falls_back_to_scalar() {
        let mut profile: MonthlyProfile<Dimensionless> = [None; 12];
        profile[0] = Some(Dimensionless(10.0));
        let mode = ForecastMode::normalise(
            "monthly-growth",
            Dimensionless(3.0),
            Some(&profile),
            None,
            Orders(10.0),
        );

        let ForecastMode::MonthlyGrowth { rates } = mode else {
            panic!("expected monthly-growth mode");
        };
        assert_eq!(rates[0], Dimensionless(10.0));
        assert_eq!(rates[1], Dimensionless(3.0));
        assert_eq!(rates[11], Dimensionless(3.0));
    }

    #[test]
    fn test_normalise_partial_orders_table_falls_back_to_daily_orders() {
        let mut profile: MonthlyProfile<Orders> = [None; 12];
        profile[2] = Some(Orders(450.0));
        let mode = ForecastMode::normalise(
            "fixed-orders",
            Dimensionless(0.0),
            None,
            Some(&profile),
            Orders(10.0),
        );

        let ForecastMode::FixedOrders { orders } = mode else {
            panic!("expected fixed-orders mode");
        };
        assert_eq!(orders[2], Orders(450.0));
        assert_eq!(orders[0], Orders(300.0));
        assert_eq!(orders[11], Orders(300.0));
    }

    #[test]
    fn test_mode_labels() {
        let mode = ForecastMode::SingleGrowth {
            rate: Dimensionless(0.0),
        };
        assert_eq!(mode.to_string(), "single-growth");
        let mode = ForecastMode::MonthlyGrowth {
            rates: DEFAULT_MONTHLY_GROWTH_RATES,
        };
        assert_eq!(mode.to_string(), "monthly-growth");
        let mode = ForecastMode::FixedOrders {
            orders: [DEFAULT_FIXED_MONTHLY_ORDERS; 12],
        };
        assert_eq!(mode.to_string(), "fixed-orders");
    }

    #[rstest]
    fn test_infinite_growth_rate_rejected(mut business_metrics: BusinessMetrics) {
        business_metrics.mode = ForecastMode::SingleGrowth {
            rate: Dimensionless(f64::INFINITY),
        };
        assert!(calculate_metrics(&business_metrics, 12).is_err());
    }

    #[rstest]
    fn test_negative_fixed_orders_rejected(mut business_metrics: BusinessMetrics) {
        let mut orders = [Orders(100.0); 12];
        orders[3] = Orders(-1.0);
        business_metrics.mode = ForecastMode::FixedOrders { orders };
        assert_error!(
            calculate_metrics(&business_metrics, 12),
            "Invalid business metrics"
        );
    }
}

//! Fixtures for tests
use crate::branch::{Branch, BranchMap, BranchSetupCosts, BusinessMetrics};
use crate::forecast::ForecastMode;
use crate::units::{Dimensionless, Money, MoneyPerOrder, Orders};
use indexmap::indexmap;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Parameters for a modest branch: 300 orders and 600 capacity per month, 20% margin
#[fixture]
pub fn business_metrics() -> BusinessMetrics {
    BusinessMetrics {
        daily_orders: Orders(10.0),
        branch_capacity: Orders(20.0),
        average_order_price: MoneyPerOrder(10.0),
        detergent_cost: MoneyPerOrder(0.5),
        packaging_cost: MoneyPerOrder(0.25),
        other_material_costs: MoneyPerOrder(0.25),
        delivery_cost_per_customer: MoneyPerOrder(0.5),
        monthly_rent: Money(1000.0),
        monthly_staff_cost_per_person: Money(400.0),
        monthly_utilities: Money(150.0),
        staff_count: 2,
        mode: ForecastMode::SingleGrowth {
            rate: Dimensionless(0.0),
        },
    }
}

/// Parameters with no costs at all: every order is pure profit
#[fixture]
pub fn zero_cost_metrics() -> BusinessMetrics {
    BusinessMetrics {
        daily_orders: Orders(100.0),
        branch_capacity: Orders(1000.0),
        average_order_price: MoneyPerOrder(50.0),
        detergent_cost: MoneyPerOrder(0.0),
        packaging_cost: MoneyPerOrder(0.0),
        other_material_costs: MoneyPerOrder(0.0),
        delivery_cost_per_customer: MoneyPerOrder(0.0),
        monthly_rent: Money(0.0),
        monthly_staff_cost_per_person: Money(0.0),
        monthly_utilities: Money(0.0),
        staff_count: 0,
        mode: ForecastMode::SingleGrowth {
            rate: Dimensionless(0.0),
        },
    }
}

#[fixture]
pub fn setup_costs() -> BranchSetupCosts {
    BranchSetupCosts {
        construction_cost: Money(4000.0),
        equipment_cost: Money(2000.0),
        licensing_cost: Money(700.0),
        initial_inventory_cost: Money(500.0),
    }
}

/// A profitable branch: 600 profit per month against a 7200 investment
#[fixture]
pub fn branch(business_metrics: BusinessMetrics, setup_costs: BranchSetupCosts) -> Branch {
    Branch::new(
        "main".into(),
        "Main Branch".to_string(),
        "City Center".to_string(),
        business_metrics,
        setup_costs,
        12,
    )
    .unwrap()
}

/// A loss-making branch: 25 lost per month, so it never breaks even
#[fixture]
pub fn loss_making_branch() -> Branch {
    let metrics = BusinessMetrics {
        daily_orders: Orders(5.0),
        branch_capacity: Orders(10.0),
        average_order_price: MoneyPerOrder(10.0),
        detergent_cost: MoneyPerOrder(0.5),
        packaging_cost: MoneyPerOrder(0.25),
        other_material_costs: MoneyPerOrder(0.25),
        delivery_cost_per_customer: MoneyPerOrder(0.5),
        monthly_rent: Money(800.0),
        monthly_staff_cost_per_person: Money(400.0),
        monthly_utilities: Money(100.0),
        staff_count: 1,
        mode: ForecastMode::SingleGrowth {
            rate: Dimensionless(0.0),
        },
    };
    Branch::new(
        "westside".into(),
        "Westside".to_string(),
        "West End".to_string(),
        metrics,
        BranchSetupCosts {
            construction_cost: Money(3000.0),
            equipment_cost: Money(1500.0),
            licensing_cost: Money(300.0),
            initial_inventory_cost: Money(200.0),
        },
        12,
    )
    .unwrap()
}

/// A two-branch network: one profitable, one loss-making
#[fixture]
pub fn branches(branch: Branch, loss_making_branch: Branch) -> BranchMap {
    indexmap! {
        branch.id.clone() => branch,
        loss_making_branch.id.clone() => loss_making_branch,
    }
}

//! This module defines the unit types used for business quantities and their conversions.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{AddAssign, Div, Mul};

macro_rules! unit_methods {
    ($name:ident) => {
        impl $name {
            /// Creates a new instance of the unit type from a f64 value.
            pub const fn new(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Whether the value is neither infinite nor NaN.
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// The smaller of `self` and `other`.
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|v| v.0).sum())
            }
        }

        impl float_cmp::ApproxEq for $name {
            type Margin = float_cmp::F64Margin;

            fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
                self.0.approx_eq(other.0, margin.into())
            }
        }
    };
}

/// Represents a dimensionless quantity (ratios, percentages, growth factors).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
)]
pub struct Dimensionless(pub f64);

/// Multiplier for converting a ratio into a percentage.
pub const PERCENT: Dimensionless = Dimensionless(100.0);

unit_methods!(Dimensionless);

impl Dimensionless {
    /// The number of items in a collection as a dimensionless quantity.
    pub fn from_count(count: usize) -> Self {
        // Counts in this domain are at most tens of branches times a few dozen months
        #[allow(clippy::cast_precision_loss)]
        let count = count as f64;
        Self(count)
    }
}

impl Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 / rhs.0)
    }
}

impl From<f64> for Dimensionless {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

impl From<Dimensionless> for f64 {
    fn from(val: Dimensionless) -> Self {
        val.0
    }
}

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            PartialOrd,
            Serialize,
            Deserialize,
            derive_more::Add,
            derive_more::Sub,
        )]
        pub struct $name(pub f64);

        unit_methods!($name);

        impl Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }

        impl Div for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 * rhs.0)
            }
        }
        impl Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::new(self.0 * lhs.0)
            }
        }
    };
}

macro_rules! impl_div {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl Div<$Rhs> for $Lhs {
            type Output = $Out;
            fn div(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 / rhs.0)
            }
        }
    };
}

// Base quantities
unit_struct!(Money);
unit_struct!(Orders);

// Derived quantities
unit_struct!(MoneyPerOrder);

// Multiplication rules
impl_mul!(Orders, MoneyPerOrder, Money);

// Division rules
impl_div!(Money, Orders, MoneyPerOrder);

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_revenue_from_orders_and_price() {
        let revenue = Orders(300.0) * MoneyPerOrder(12.5);
        assert_approx_eq!(Money, revenue, Money(3750.0));
    }

    #[test]
    fn test_cost_per_order() {
        let per_order = Money(600.0) / Orders(300.0);
        assert_approx_eq!(MoneyPerOrder, per_order, MoneyPerOrder(2.0));
    }

    #[test]
    fn test_ratio_of_moneys() {
        let ratio = Money(600.0) / Money(3000.0);
        assert_approx_eq!(Dimensionless, ratio, Dimensionless(0.2));
    }

    #[test]
    fn test_growth_factor() {
        let grown =
            Orders(100.0) * (Dimensionless(1.0) + Dimensionless(5.0) / Dimensionless(100.0));
        assert_approx_eq!(Orders, grown, Orders(105.0));
    }

    #[test]
    fn test_min_caps_orders() {
        assert_eq!(Orders(3000.0).min(Orders(1500.0)), Orders(1500.0));
        assert_eq!(Orders(1000.0).min(Orders(1500.0)), Orders(1000.0));
    }
}

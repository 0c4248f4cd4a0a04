//! Interpolation helpers shared by timeseries lookups and the historical CO2 record.

use crate::timeseries::{FloatValue, Time};
use ndarray::ArrayView1;

/// Where a target time falls relative to a sorted set of knots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    /// The target coincides with the knot at this index
    Exact(usize),
    /// The target lies strictly between two neighbouring knots
    Between(usize, usize),
    /// The target precedes the first knot
    Before,
    /// The target follows the last knot
    After,
}

/// Locate `target` within strictly increasing `knots`.
///
/// Exact matches use floating-point equality so that a knot value is always
/// returned untouched.
pub fn bracket(knots: ArrayView1<Time>, target: Time) -> Bracket {
    let n = knots.len();
    if n == 0 || target < knots[0] {
        return Bracket::Before;
    }
    if target > knots[n - 1] {
        return Bracket::After;
    }
    // Index of the first knot >= target
    let upper = knots
        .iter()
        .position(|k| *k >= target)
        .unwrap_or(n - 1);
    if knots[upper] == target {
        Bracket::Exact(upper)
    } else {
        Bracket::Between(upper - 1, upper)
    }
}

/// Linear interpolation between two points.
pub fn linear(target: Time, p0: (Time, FloatValue), p1: (Time, FloatValue)) -> FloatValue {
    let (t0, y0) = p0;
    let (t1, y1) = p1;
    if t1 == t0 {
        return y0;
    }
    y0 + (y1 - y0) * (target - t0) / (t1 - t0)
}

/// Exponential interpolation between two points.
///
/// `ln(y)` is interpolated linearly in time, which keeps the result strictly
/// between two distinct positive end points. Non-positive values have no
/// logarithm so the interpolation falls back to [`linear`].
pub fn log_linear(target: Time, p0: (Time, FloatValue), p1: (Time, FloatValue)) -> FloatValue {
    let (t0, y0) = p0;
    let (t1, y1) = p1;
    if y0 <= 0.0 || y1 <= 0.0 {
        return linear(target, p0, p1);
    }
    linear(target, (t0, y0.ln()), (t1, y1.ln())).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn bracket_classifies_targets() {
        let knots = array![1850.0, 1900.0, 1950.0];
        assert_eq!(bracket(knots.view(), 1800.0), Bracket::Before);
        assert_eq!(bracket(knots.view(), 1850.0), Bracket::Exact(0));
        assert_eq!(bracket(knots.view(), 1875.0), Bracket::Between(0, 1));
        assert_eq!(bracket(knots.view(), 1950.0), Bracket::Exact(2));
        assert_eq!(bracket(knots.view(), 1951.0), Bracket::After);
    }

    #[test]
    fn linear_midpoint() {
        assert_eq!(linear(1.5, (1.0, 10.0), (2.0, 20.0)), 15.0);
    }

    #[test]
    fn log_linear_midpoint_is_geometric_mean() {
        let value = log_linear(1.5, (1.0, 100.0), (2.0, 400.0));
        assert_relative_eq!(value, 200.0, epsilon = 1e-9);
    }

    #[test]
    fn log_linear_falls_back_for_non_positive_values() {
        let value = log_linear(1.5, (1.0, 0.0), (2.0, 10.0));
        assert_eq!(value, 5.0);
    }

    #[test]
    fn log_linear_stays_between_end_points() {
        let value = log_linear(2004.0, (2000.0, 369.71), (2010.0, 389.9));
        assert!(value > 369.71 && value < 389.9, "got {value}");
    }
}

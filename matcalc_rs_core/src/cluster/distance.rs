use std::{fmt, str::FromStr};

use ndarray::ArrayView1;

use crate::{
    error::{MatcalcError, Result},
    toolkit::array::corr,
};

/// Distance between two points of equal dimension. Missing coordinates are
/// `NaN`. Implementations never return `NaN`: an undefined distance is
/// `+inf`, so it can never be the closest pair.
pub type DistFunc = fn(&[f64], &[f64]) -> f64;

/// Euclidean distance over the coordinates present in both points, `+inf`
/// when fewer than two are shared.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    let (n, ss) = a
        .iter()
        .zip(b)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .fold((0usize, 0.0), |(n, ss), (x, y)| (n + 1, ss + (x - y).powi(2)));
    if n < 2 {
        f64::INFINITY
    } else {
        ss.sqrt()
    }
}

/// Correlation distance `1 - r`, in `[0, 2]`.
///
/// `r` is the pearson correlation over the jointly present coordinates; when
/// it is undefined (fewer than two such coordinates, or either side has zero
/// variance) the distance is `+inf`.
pub fn pearsond(a: &[f64], b: &[f64]) -> f64 {
    let r = corr(ArrayView1::from(a), ArrayView1::from(b));
    if r.is_nan() {
        f64::INFINITY
    } else {
        1.0 - r
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceMetric {
    Euclidean,
    #[default]
    Correlation,
}

impl DistanceMetric {
    pub fn func(&self) -> DistFunc {
        match self {
            DistanceMetric::Euclidean => euclidean,
            DistanceMetric::Correlation => pearsond,
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Euclidean => f.write_str("Euclidean"),
            DistanceMetric::Correlation => f.write_str("Correlation"),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = MatcalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "correlation" | "pearson" => Ok(DistanceMetric::Correlation),
            _ => Err(MatcalcError::InvalidArgument(format!(
                "unknown distance metric: {s}"
            ))),
        }
    }
}

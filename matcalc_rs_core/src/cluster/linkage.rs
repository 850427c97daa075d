use std::{fmt, str::FromStr};

use itertools::Itertools;

use super::DistFunc;
use crate::error::{MatcalcError, Result};

/// Distance between two clusters, given the raw points of their members.
pub type Linkage = fn(&[&[f64]], &[&[f64]], DistFunc) -> f64;

/// Nearest cross-cluster pair.
pub fn single_linkage(a: &[&[f64]], b: &[&[f64]], dist: DistFunc) -> f64 {
    a.iter()
        .cartesian_product(b)
        .map(|(x, y)| dist(*x, *y))
        .fold(f64::INFINITY, f64::min)
}

/// Mean over all cross-cluster pairs, `+inf` if either cluster is empty.
pub fn average_linkage(a: &[&[f64]], b: &[&[f64]], dist: DistFunc) -> f64 {
    let pairs = a.len() * b.len();
    if pairs == 0 {
        return f64::INFINITY;
    }
    let total: f64 = a
        .iter()
        .cartesian_product(b)
        .map(|(x, y)| dist(*x, *y))
        .sum();
    total / pairs as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkageMethod {
    Single,
    #[default]
    Average,
}

impl LinkageMethod {
    pub fn func(&self) -> Linkage {
        match self {
            LinkageMethod::Single => single_linkage,
            LinkageMethod::Average => average_linkage,
        }
    }
}

impl fmt::Display for LinkageMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkageMethod::Single => f.write_str("Single"),
            LinkageMethod::Average => f.write_str("Average"),
        }
    }
}

impl FromStr for LinkageMethod {
    type Err = MatcalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "single" => Ok(LinkageMethod::Single),
            "average" => Ok(LinkageMethod::Average),
            _ => Err(MatcalcError::InvalidArgument(format!(
                "unknown linkage: {s}"
            ))),
        }
    }
}

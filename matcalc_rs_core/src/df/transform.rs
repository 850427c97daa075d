//! Value transforms. Each returns a new frame with the same labels and
//! metadata as its input.

use std::f64::consts::E;

use ndarray::{Array1, Array2, ArrayView1};

use super::{Cell, DataFrame};
use crate::{
    error::{MatcalcError, Result},
    toolkit::array::{max, mean, mean_axis1, median_axis1, min, std, std_axis1, sum_axis1},
};

/// `log_base(x + pseudocount)`. Non-positive arguments produce missing
/// values (`x + p < 0`) or `-inf` (`x + p == 0`); negative results are kept.
pub fn log(df: &DataFrame, base: f64, pseudocount: f64) -> Result<DataFrame> {
    if !(base > 0.0 && base != 1.0 && base.is_finite()) {
        return Err(MatcalcError::InvalidArgument(format!(
            "log base must be positive and not 1, got {base}"
        )));
    }
    let label = if base == 2.0 {
        "Log2".to_string()
    } else if base == 10.0 {
        "Log10".to_string()
    } else if base == E {
        "Ln".to_string()
    } else {
        format!("Log{base}")
    };
    let name = if pseudocount != 0.0 {
        format!("{label}(x + {pseudocount})")
    } else {
        format!("{label}(x)")
    };
    let out = if base == 2.0 {
        df.map_num(|x| (x + pseudocount).log2())
    } else if base == 10.0 {
        df.map_num(|x| (x + pseudocount).log10())
    } else if base == E {
        df.map_num(|x| (x + pseudocount).ln())
    } else {
        let ln_base = base.ln();
        df.map_num(|x| (x + pseudocount).ln() / ln_base)
    };
    Ok(out.with_name(name))
}

pub fn log2(df: &DataFrame, pseudocount: f64) -> Result<DataFrame> {
    log(df, 2.0, pseudocount)
}

pub fn log10(df: &DataFrame, pseudocount: f64) -> Result<DataFrame> {
    log(df, 10.0, pseudocount)
}

pub fn ln(df: &DataFrame, pseudocount: f64) -> Result<DataFrame> {
    log(df, E, pseudocount)
}

pub fn add(df: &DataFrame, a: f64) -> DataFrame {
    df.map_num(|x| x + a)
}

/// Divides every cell of row `i` by `values[i]`.
pub fn row_div(df: &DataFrame, values: &[f64]) -> Result<DataFrame> {
    if values.len() != df.nrows() {
        return Err(MatcalcError::ShapeMismatch {
            expected: df.nrows(),
            actual: values.len(),
        });
    }
    Ok(df.apply(|cell, row, _| match cell {
        Cell::Num(v) => Cell::from(v / values[row]),
        _ => Cell::Na,
    }))
}

pub fn row_sums(df: &DataFrame) -> Vec<f64> {
    sum_axis1(&df.to_f64().view(), 1)
}

pub fn col_sums(df: &DataFrame) -> Vec<f64> {
    sum_axis1(&df.to_f64().t(), 1)
}

pub fn row_means(df: &DataFrame) -> Vec<f64> {
    mean_axis1(&df.to_f64().view(), 1)
}

pub fn col_means(df: &DataFrame) -> Vec<f64> {
    mean_axis1(&df.to_f64().t(), 1)
}

pub fn row_medians(df: &DataFrame) -> Vec<f64> {
    median_axis1(&df.to_f64().view(), 1)
}

/// sample standard deviation of every row
pub fn row_stdevs(df: &DataFrame) -> Vec<f64> {
    std_axis1(&df.to_f64().view(), 1)
}

/// `(x - mean) / stdev` with the moments of `a`. Constant input, or a zero
/// or undefined stdev, maps every present value to `0`.
fn standardize(a: ArrayView1<f64>) -> Array1<f64> {
    let (m, sd) = (mean(a), std(a));
    let degenerate = !(sd.is_finite() && sd > 0.0) || min(a) == max(a);
    a.mapv(|x| {
        if x.is_nan() {
            f64::NAN
        } else if degenerate {
            0.0
        } else {
            (x - m) / sd
        }
    })
}

/// Per-row z-score. A constant row becomes all zeros rather than `NaN`.
///
/// A frame without rows comes back as is (still empty); callers should check
/// [`DataFrame::is_empty`] before chaining further work.
pub fn row_zscore(df: &DataFrame) -> Result<DataFrame> {
    if df.nrows() == 0 {
        return Ok(df.clone());
    }
    let values = df.to_f64();
    let mut z = Array2::<f64>::zeros(values.dim());
    for (mut out, row) in z.rows_mut().into_iter().zip(values.rows()) {
        out.assign(&standardize(row));
    }
    Ok(df.with_f64(z)?.with_name("Row Z-score"))
}

/// Per-column z-score, see [`row_zscore`].
pub fn col_zscore(df: &DataFrame) -> Result<DataFrame> {
    Ok(row_zscore(&df.t())?.t().with_name("Col Z-score"))
}

/// Z-score against the moments of the whole matrix.
pub fn zscore(df: &DataFrame) -> Result<DataFrame> {
    if df.nrows() == 0 {
        return Ok(df.clone());
    }
    let values = df.to_f64();
    let flat = Array1::from_iter(values.iter().copied());
    let z = standardize(flat.view()).into_shape(values.dim()).map_err(|_| {
        MatcalcError::ShapeMismatch {
            expected: values.len(),
            actual: flat.len(),
        }
    })?;
    Ok(df.with_f64(z)?.with_name("Z-score"))
}

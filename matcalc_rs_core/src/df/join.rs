//! Joining several frames over their shared labels.
//!
//! Metadata tables are not carried over: the inputs rarely agree on their
//! metadata columns.

use itertools::Itertools;
use ndarray::{concatenate, Axis};

use super::{DataFrame, Index, Label};
use crate::error::{MatcalcError, Result};

/// Stacks `frames` vertically, keeping only the columns present in every
/// frame, in the column order of the first frame.
pub fn row_join(frames: &[DataFrame]) -> Result<DataFrame> {
    let (first, rest) = frames
        .split_first()
        .ok_or_else(|| MatcalcError::EmptyInput("no frames to join".into()))?;
    let common: Vec<Label> = first
        .columns()
        .iter()
        .filter(|label| rest.iter().all(|df| df.columns().contains(label)))
        .unique()
        .cloned()
        .collect();
    let parts: Vec<DataFrame> = frames
        .iter()
        .map(|df| df.loc(None, Some(&common)))
        .collect::<Result<_>>()?;
    let views = parts.iter().map(DataFrame::values).collect_vec();
    let values = concatenate(Axis(0), &views).map_err(|_| MatcalcError::ShapeMismatch {
        expected: common.len(),
        actual: parts.iter().map(DataFrame::ncols).max().unwrap_or(0),
    })?;
    let index = Index::concat(&parts.iter().map(DataFrame::index).collect_vec());
    Ok(DataFrame::new(values, index, Index::new(common))?.with_name(first.name()))
}

/// Places `frames` side by side, keeping only the row labels present in
/// every frame, in the row order of the first frame.
pub fn col_join(frames: &[DataFrame]) -> Result<DataFrame> {
    let transposed = frames.iter().map(DataFrame::t).collect_vec();
    Ok(row_join(&transposed)?.t())
}

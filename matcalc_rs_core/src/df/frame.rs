use std::sync::Arc;

use ndarray::ArcArray2;

use super::{Cell, Index};

mod indexing;
mod meta;
mod ops;

pub use indexing::{Loc, Selector};

/// A labeled 2D table.
///
/// - `values` is row-major with shape `(index.len(), columns.len())`.
/// - `row_meta` (if any) has one row per row of `values` and always carries
///   the same row index; `col_meta` (if any) has one row per column and
///   carries `columns` as its row index.
///
/// Storage is `Arc`-backed, so `clone` is cheap; all operations return new
/// frames and the receiver is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    name: String,
    index: Index,
    columns: Index,
    values: ArcArray2<Cell>,
    row_meta: Option<Arc<DataFrame>>,
    col_meta: Option<Arc<DataFrame>>,
}

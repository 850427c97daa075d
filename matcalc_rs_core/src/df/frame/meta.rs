use std::sync::Arc;

use ndarray::{Array2, ArrayView2};

use super::DataFrame;
use crate::{
    df::{Cell, Index, Label, Shape},
    error::{MatcalcError, Result},
};

impl DataFrame {
    pub fn new(values: Array2<Cell>, index: Index, columns: Index) -> Result<Self> {
        let (nrows, ncols) = values.dim();
        if index.len() != nrows {
            return Err(MatcalcError::ShapeMismatch {
                expected: nrows,
                actual: index.len(),
            });
        }
        if columns.len() != ncols {
            return Err(MatcalcError::ShapeMismatch {
                expected: ncols,
                actual: columns.len(),
            });
        }
        Ok(Self {
            name: String::new(),
            index,
            columns,
            values: values.into_shared(),
            row_meta: None,
            col_meta: None,
        })
    }

    pub fn empty() -> Self {
        Self {
            name: String::new(),
            index: Index::default(),
            columns: Index::default(),
            values: Array2::default((0, 0)).into_shared(),
            row_meta: None,
            col_meta: None,
        }
    }

    /// Builds a frame from already tokenized rows, with a `1..=n` row index
    /// and `A, B, ...` column names. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|row| row.len() != ncols) {
            return Err(MatcalcError::ShapeMismatch {
                expected: ncols,
                actual: row.len(),
            });
        }
        let flat: Vec<Cell> = rows.into_iter().flatten().collect();
        let values = Array2::from_shape_vec((nrows, ncols), flat).map_err(|_| {
            MatcalcError::ShapeMismatch {
                expected: nrows * ncols,
                actual: nrows * ncols,
            }
        })?;
        DataFrame::new(values, Index::range(nrows), Index::excel(ncols))
    }

    /// Numeric constructor, `NaN`s become [`Cell::Na`].
    pub fn from_f64(values: ArrayView2<f64>, index: Index, columns: Index) -> Result<Self> {
        DataFrame::new(values.mapv(Cell::from), index, columns)
    }

    /// Same labels and metadata, new numeric values of the same shape.
    pub(crate) fn with_f64(&self, values: Array2<f64>) -> Result<Self> {
        if values.dim() != self.shape() {
            return Err(MatcalcError::ShapeMismatch {
                expected: self.size(),
                actual: values.len(),
            });
        }
        let mut df = self.clone();
        df.values = values.mapv(Cell::from).into_shared();
        Ok(df)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn set_name(&self, name: impl Into<String>) -> Self {
        self.clone().with_name(name)
    }

    /// Attaches row metadata. `meta` must have one row per row of `self`; its
    /// index is replaced by `self`'s row index.
    pub fn with_row_meta(mut self, meta: DataFrame) -> Result<Self> {
        let meta = meta.set_index(self.index.clone())?;
        self.row_meta = Some(Arc::new(meta));
        Ok(self)
    }

    /// Attaches column metadata. `meta` must have one row per column of
    /// `self`; its index is replaced by `self`'s columns.
    pub fn with_col_meta(mut self, meta: DataFrame) -> Result<Self> {
        let meta = meta.set_index(self.columns.clone())?;
        self.col_meta = Some(Arc::new(meta));
        Ok(self)
    }

    pub fn without_meta(mut self) -> Self {
        self.row_meta = None;
        self.col_meta = None;
        self
    }

    /// Replaces the row labels, the row metadata follows.
    pub fn set_index(&self, index: Index) -> Result<Self> {
        if index.len() != self.nrows() {
            return Err(MatcalcError::ShapeMismatch {
                expected: self.nrows(),
                actual: index.len(),
            });
        }
        let mut df = self.clone();
        if let Some(meta) = &self.row_meta {
            df.row_meta = Some(Arc::new(meta.set_index(index.clone())?));
        }
        df.index = index;
        Ok(df)
    }

    /// Replaces the column labels, the column metadata follows.
    pub fn set_columns(&self, columns: Index) -> Result<Self> {
        if columns.len() != self.ncols() {
            return Err(MatcalcError::ShapeMismatch {
                expected: self.ncols(),
                actual: columns.len(),
            });
        }
        let mut df = self.clone();
        if let Some(meta) = &self.col_meta {
            df.col_meta = Some(Arc::new(meta.set_index(columns.clone())?));
        }
        df.columns = columns;
        Ok(df)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn index(&self) -> &Index {
        &self.index
    }

    #[inline]
    pub fn columns(&self) -> &Index {
        &self.columns
    }

    #[inline]
    pub fn values(&self) -> ArrayView2<Cell> {
        self.values.view()
    }

    #[inline]
    pub fn row_meta(&self) -> Option<&DataFrame> {
        self.row_meta.as_deref()
    }

    #[inline]
    pub fn col_meta(&self) -> Option<&DataFrame> {
        self.col_meta.as_deref()
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.values.dim()
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// `true` when the frame has no rows or no columns
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn row_names(&self) -> Vec<String> {
        self.index.strs()
    }

    pub fn col_names(&self) -> Vec<String> {
        self.columns.strs()
    }

    pub fn row_name(&self, row: usize) -> Option<&Label> {
        self.index.get(row)
    }

    pub fn col_name(&self, col: usize) -> Option<&Label> {
        self.columns.get(col)
    }

    /// Dense numeric projection, missing and text cells become `NaN`.
    pub fn to_f64(&self) -> Array2<f64> {
        self.values.map(Cell::as_f64)
    }

    /// Rows of [`DataFrame::to_f64`] as owned vectors.
    pub fn to_f64_rows(&self) -> Vec<Vec<f64>> {
        self.values
            .rows()
            .into_iter()
            .map(|row| row.iter().map(Cell::as_f64).collect())
            .collect()
    }
}

use std::sync::Arc;

use ndarray::{Array2, ArrayView1, Axis};

use super::DataFrame;
use crate::{
    df::{Cell, Index, Label},
    error::{MatcalcError, Result},
};

impl DataFrame {
    /// Transpose: swaps the values' axes, `index` / `columns`, and the row /
    /// column metadata. `df.t().t() == df`.
    pub fn t(&self) -> Self {
        Self {
            name: self.name.clone(),
            index: self.columns.clone(),
            columns: self.index.clone(),
            values: self.values.clone().reversed_axes(),
            row_meta: self.col_meta.clone(),
            col_meta: self.row_meta.clone(),
        }
    }

    /// Deep copy: new label arrays, a duplicated matrix and copied metadata.
    pub fn copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            index: self.index.iter().cloned().collect::<Index>().with_name(self.index.name()),
            columns: self
                .columns
                .iter()
                .cloned()
                .collect::<Index>()
                .with_name(self.columns.name()),
            values: self.values.to_owned().into_shared(),
            row_meta: self.row_meta.as_ref().map(|meta| Arc::new(meta.copy())),
            col_meta: self.col_meta.as_ref().map(|meta| Arc::new(meta.copy())),
        }
    }

    /// Returns a frame with column `name` replaced, or appended when it does
    /// not exist. With `append`, an existing `name` is never replaced: the new
    /// column gets a suffixed label (`name_1`, ...). Appending also appends a
    /// row of missing values to the column metadata.
    pub fn set_col(&self, name: impl Into<Label>, values: Vec<Cell>, append: bool) -> Result<Self> {
        let name = name.into();
        let (nrows, ncols) = self.shape();
        let fresh = nrows == 0 && ncols == 0;
        if values.len() != nrows && !fresh {
            return Err(MatcalcError::ShapeMismatch {
                expected: nrows,
                actual: values.len(),
            });
        }
        if !append {
            if let Some(pos) = self.columns.find(&name) {
                let mut data = self.values.to_owned();
                data.column_mut(pos).assign(&ArrayView1::from(&values));
                let mut df = self.clone();
                df.values = data.into_shared();
                return Ok(df);
            }
        }

        let label = self.columns.unique_label(name);
        let mut df = self.clone();
        if fresh {
            let nrows = values.len();
            df.values = Array2::from_shape_vec((nrows, 1), values)
                .map_err(|_| MatcalcError::ShapeMismatch {
                    expected: nrows,
                    actual: nrows,
                })?
                .into_shared();
            df.index = Index::range(nrows);
            df.row_meta = None;
        } else {
            let mut data = self.values.to_owned();
            data.push_column(ArrayView1::from(&values))
                .map_err(|_| MatcalcError::ShapeMismatch {
                    expected: nrows,
                    actual: values.len(),
                })?;
            df.values = data.into_shared();
        }
        if let Some(meta) = &self.col_meta {
            let blank = vec![Cell::Na; meta.ncols()];
            df.col_meta = Some(Arc::new(meta.t().set_col(label.clone(), blank, false)?.t()));
        }
        df.columns = self.columns.push(label);
        Ok(df)
    }

    /// Row counterpart of [`DataFrame::set_col`].
    pub fn set_row(&self, name: impl Into<Label>, values: Vec<Cell>, append: bool) -> Result<Self> {
        Ok(self.t().set_col(name, values, append)?.t())
    }

    /// Sets column `name` of the row metadata, creating the metadata table
    /// when the frame has none.
    pub fn annotate_rows(&self, name: impl Into<Label>, values: Vec<Cell>) -> Result<Self> {
        let meta = match &self.row_meta {
            Some(meta) => meta.as_ref().clone(),
            None => DataFrame::new(
                Array2::default((self.nrows(), 0)),
                self.index.clone(),
                Index::default(),
            )?,
        };
        self.clone().with_row_meta(meta.set_col(name, values, false)?)
    }

    /// Column counterpart of [`DataFrame::annotate_rows`].
    pub fn annotate_cols(&self, name: impl Into<Label>, values: Vec<Cell>) -> Result<Self> {
        Ok(self.t().annotate_rows(name, values)?.t())
    }

    /// Global minimum over numeric cells, `NaN` if there are none.
    pub fn min(&self) -> f64 {
        self.values
            .iter()
            .filter_map(Cell::num)
            .fold(f64::NAN, |acc, x| if acc.is_nan() || x < acc { x } else { acc })
    }

    /// Global maximum over numeric cells, `NaN` if there are none.
    pub fn max(&self) -> f64 {
        self.values
            .iter()
            .filter_map(Cell::num)
            .fold(f64::NAN, |acc, x| if acc.is_nan() || x > acc { x } else { acc })
    }

    /// Element-wise `f(cell, row, col)`, same shape as `self`.
    pub fn map<T, F>(&self, f: F) -> Array2<T>
    where
        F: Fn(&Cell, usize, usize) -> T,
    {
        Array2::from_shape_fn(self.shape(), |(i, j)| f(&self.values[[i, j]], i, j))
    }

    /// Like [`DataFrame::map`] but keeps the labels and metadata.
    pub fn apply<F>(&self, f: F) -> Self
    where
        F: Fn(&Cell, usize, usize) -> Cell,
    {
        let mut df = self.clone();
        df.values = self.map(f).into_shared();
        df
    }

    /// Numeric element-wise transform. Missing and text cells stay missing,
    /// `NaN` results become missing.
    pub fn map_num<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        self.apply(|cell, _, _| match cell {
            Cell::Num(v) => Cell::from(f(*v)),
            _ => Cell::Na,
        })
    }

    /// Reduces each row to one value.
    pub fn row_map<T, F>(&self, f: F) -> Vec<T>
    where
        F: Fn(ArrayView1<Cell>, usize) -> T,
    {
        self.values
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(i, row)| f(row, i))
            .collect()
    }

    /// Reduces each column to one value.
    pub fn col_map<T, F>(&self, f: F) -> Vec<T>
    where
        F: Fn(ArrayView1<Cell>, usize) -> T,
    {
        self.values
            .axis_iter(Axis(1))
            .enumerate()
            .map(|(i, col)| f(col, i))
            .collect()
    }
}

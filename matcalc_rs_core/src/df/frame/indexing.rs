use std::{ops::RangeFull, sync::Arc};

use ndarray::Axis;

use super::DataFrame;
use crate::{
    df::{Cell, Label, Series},
    error::{MatcalcError, Result},
};

/// Addresses a single row or column, either by position or by label.
#[derive(Debug, Clone, PartialEq)]
pub enum Loc {
    Pos(usize),
    Label(Label),
}

impl From<usize> for Loc {
    fn from(v: usize) -> Self {
        Loc::Pos(v)
    }
}
impl From<Label> for Loc {
    fn from(v: Label) -> Self {
        Loc::Label(v)
    }
}
impl From<&Label> for Loc {
    fn from(v: &Label) -> Self {
        Loc::Label(v.clone())
    }
}
impl From<&str> for Loc {
    fn from(v: &str) -> Self {
        Loc::Label(v.into())
    }
}
impl From<String> for Loc {
    fn from(v: String) -> Self {
        Loc::Label(v.into())
    }
}

/// Positional selector of [`DataFrame::iloc`]: `..` (all), one position, or an
/// explicit list (which may reorder or repeat positions).
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    All,
    One(usize),
    Many(Vec<usize>),
}

impl From<RangeFull> for Selector {
    fn from(_: RangeFull) -> Self {
        Selector::All
    }
}
impl From<usize> for Selector {
    fn from(v: usize) -> Self {
        Selector::One(v)
    }
}
impl From<Vec<usize>> for Selector {
    fn from(v: Vec<usize>) -> Self {
        Selector::Many(v)
    }
}
impl From<&[usize]> for Selector {
    fn from(v: &[usize]) -> Self {
        Selector::Many(v.to_vec())
    }
}
impl From<&Vec<usize>> for Selector {
    fn from(v: &Vec<usize>) -> Self {
        Selector::Many(v.clone())
    }
}

impl Selector {
    pub fn positions(&self, len: usize) -> Result<Vec<usize>> {
        let positions = match self {
            Selector::All => return Ok((0..len).collect()),
            Selector::One(i) => vec![*i],
            Selector::Many(v) => v.clone(),
        };
        match positions.iter().find(|&&p| p >= len) {
            Some(&index) => Err(MatcalcError::IndexOutOfBounds { index, len }),
            None => Ok(positions),
        }
    }
}

impl DataFrame {
    fn row_pos(&self, row: Loc) -> Result<usize> {
        match row {
            Loc::Pos(i) if i < self.nrows() => Ok(i),
            Loc::Pos(index) => Err(MatcalcError::IndexOutOfBounds {
                index,
                len: self.nrows(),
            }),
            Loc::Label(label) => self.index().position(&label),
        }
    }

    fn col_pos(&self, col: Loc) -> Result<usize> {
        match col {
            Loc::Pos(i) if i < self.ncols() => Ok(i),
            Loc::Pos(index) => Err(MatcalcError::IndexOutOfBounds {
                index,
                len: self.ncols(),
            }),
            Loc::Label(label) => self.columns().position(&label),
        }
    }

    /// the cell at a row / column position or label
    pub fn get(&self, row: impl Into<Loc>, col: impl Into<Loc>) -> Result<&Cell> {
        let row = self.row_pos(row.into())?;
        let col = self.col_pos(col.into())?;
        Ok(&self.values[[row, col]])
    }

    pub fn col(&self, col: impl Into<Loc>) -> Result<Series> {
        let pos = self.col_pos(col.into())?;
        Ok(Series::new(
            self.columns()
                .get(pos)
                .cloned()
                .unwrap_or(Label::Num(pos as i64)),
            self.index().clone(),
            self.values.column(pos).to_vec(),
        ))
    }

    pub fn row(&self, row: impl Into<Loc>) -> Result<Series> {
        let pos = self.row_pos(row.into())?;
        Ok(Series::new(
            self.index()
                .get(pos)
                .cloned()
                .unwrap_or(Label::Num(pos as i64)),
            self.columns().clone(),
            self.values.row(pos).to_vec(),
        ))
    }

    /// Positional slicing. Row / column metadata are sliced identically.
    pub fn iloc(&self, rows: impl Into<Selector>, cols: impl Into<Selector>) -> Result<Self> {
        let rows = rows.into().positions(self.nrows())?;
        let cols = cols.into().positions(self.ncols())?;
        let values = self
            .values
            .select(Axis(0), &rows)
            .select(Axis(1), &cols)
            .into_shared();
        let row_meta = match &self.row_meta {
            Some(meta) => Some(Arc::new(meta.iloc(&rows, ..)?)),
            None => None,
        };
        let col_meta = match &self.col_meta {
            Some(meta) => Some(Arc::new(meta.iloc(&cols, ..)?)),
            None => None,
        };
        Ok(Self {
            name: self.name.clone(),
            index: self.index.filter(&rows)?,
            columns: self.columns.filter(&cols)?,
            values,
            row_meta,
            col_meta,
        })
    }

    /// Label-based slicing, `None` keeps the whole axis. Fails with
    /// [`MatcalcError::KeyNotFound`] on the first unknown label.
    pub fn loc(&self, rows: Option<&[Label]>, cols: Option<&[Label]>) -> Result<Self> {
        let rows = match rows {
            Some(labels) => Selector::Many(
                labels
                    .iter()
                    .map(|label| self.index().position(label))
                    .collect::<Result<_>>()?,
            ),
            None => Selector::All,
        };
        let cols = match cols {
            Some(labels) => Selector::Many(
                labels
                    .iter()
                    .map(|label| self.columns().position(label))
                    .collect::<Result<_>>()?,
            ),
            None => Selector::All,
        };
        self.iloc(rows, cols)
    }
}

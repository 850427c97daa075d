use super::{Cell, Index, Label};

/// One row or one column of a [`super::DataFrame`], keyed by the opposite axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: Label,
    pub index: Index,
    pub values: Vec<Cell>,
}

impl Series {
    pub fn new(name: Label, index: Index, values: Vec<Cell>) -> Self {
        Self {
            name,
            index,
            values,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, pos: usize) -> Option<&Cell> {
        self.values.get(pos)
    }

    /// numeric values, missing and text cells become `NaN`
    pub fn to_f64(&self) -> Vec<f64> {
        self.values.iter().map(Cell::as_f64).collect()
    }

    pub fn strs(&self) -> Vec<String> {
        self.values.iter().map(ToString::to_string).collect()
    }
}

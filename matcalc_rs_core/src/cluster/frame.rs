use std::collections::HashMap;

use super::ClusterTree;
use crate::{
    df::{DataFrame, Selector},
    error::{MatcalcError, Result},
};

/// A frame together with the dendrograms of its rows and / or columns, as
/// handed to renderers. Renderers only read it.
///
/// A row tree always has one leaf per row of `df`, a column tree one leaf
/// per column.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterFrame {
    df: DataFrame,
    row_tree: Option<ClusterTree>,
    col_tree: Option<ClusterTree>,
    secondary_tables: HashMap<String, DataFrame>,
}

impl ClusterFrame {
    pub fn new(df: DataFrame) -> Self {
        Self {
            df,
            row_tree: None,
            col_tree: None,
            secondary_tables: HashMap::new(),
        }
    }

    pub fn with_row_tree(mut self, tree: ClusterTree) -> Result<Self> {
        if tree.len() != self.df.nrows() {
            return Err(MatcalcError::ShapeMismatch {
                expected: self.df.nrows(),
                actual: tree.len(),
            });
        }
        self.row_tree = Some(tree);
        Ok(self)
    }

    pub fn with_col_tree(mut self, tree: ClusterTree) -> Result<Self> {
        if tree.len() != self.df.ncols() {
            return Err(MatcalcError::ShapeMismatch {
                expected: self.df.ncols(),
                actual: tree.len(),
            });
        }
        self.col_tree = Some(tree);
        Ok(self)
    }

    pub fn with_secondary_table(mut self, name: impl Into<String>, table: DataFrame) -> Self {
        self.secondary_tables.insert(name.into(), table);
        self
    }

    #[inline]
    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    #[inline]
    pub fn row_tree(&self) -> Option<&ClusterTree> {
        self.row_tree.as_ref()
    }

    #[inline]
    pub fn col_tree(&self) -> Option<&ClusterTree> {
        self.col_tree.as_ref()
    }

    pub fn secondary_table(&self, name: &str) -> Option<&DataFrame> {
        self.secondary_tables.get(name)
    }

    pub fn secondary_tables(&self) -> &HashMap<String, DataFrame> {
        &self.secondary_tables
    }

    /// `df` with rows and columns laid out in leaf order. Axes without a tree
    /// keep their order.
    pub fn ordered(&self) -> Result<DataFrame> {
        let selector = |tree: &Option<ClusterTree>| match tree {
            Some(tree) => Selector::Many(tree.leaves.clone()),
            None => Selector::All,
        };
        self.df
            .iloc(selector(&self.row_tree), selector(&self.col_tree))
    }
}

//! # df
//!
//! a labeled 2D table model: [`Cell`] values addressed by a row [`Index`] and a
//! column [`Index`], with optional row / column metadata tables that follow
//! every structural operation.

mod cell;
mod index;
mod series;

pub mod filter;
pub mod frame;
pub mod join;
pub mod transform;

pub use cell::{Cell, NA_TOKENS};
pub use frame::{DataFrame, Loc, Selector};
pub use index::{Index, Label};
pub use series::Series;

/// `(n_rows, n_cols)`
pub type Shape = (usize, usize);

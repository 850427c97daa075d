//! # matcalc_core
//!
//! The labeled matrix model behind a genomics workbench, together with the
//! statistics and clustering engines that heatmaps, k-means and row filters
//! are built on.
//!
//! # Design
//!
//! Every operation is value-returning: transforms, slices and clusterings hand
//! back new [`df::DataFrame`]s / [`cluster::ClusterTree`]s and never touch
//! their inputs. Storage is `Arc`-backed, so cloning a frame is cheap and a
//! write path only ever mutates a private copy.
//!
//! There is no global state in this crate, so every entry point is reentrant
//! and can be driven from worker threads by the host.

pub mod cluster;
pub mod df;
pub mod error;
pub mod pipeline;
pub mod toolkit;

pub use error::{MatcalcError, Result};

//! # cluster
//!
//! Pairwise distances, linkage rules and the two clustering engines built on
//! them: agglomerative [`HCluster`] (producing a [`ClusterTree`]) and
//! [`kmeans`]. Both cluster the *rows* of a [`DataFrame`](crate::df::DataFrame);
//! run them on `df.t()` to cluster columns.

mod distance;
mod frame;
mod hcluster;
mod kmeans;
mod linkage;

pub use distance::{euclidean, pearsond, DistFunc, DistanceMetric};
pub use frame::ClusterFrame;
pub use hcluster::{ClusterTree, HCluster, Merge, Node};
pub use kmeans::{kmeans, KMeans, KMeansConfig, KMeansResult, CLUSTER_COLUMN};
pub use linkage::{average_linkage, single_linkage, Linkage, LinkageMethod};

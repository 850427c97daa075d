//! Agglomerative clustering into a dendrogram.

use itertools::Itertools;
use tracing::{debug, instrument, trace};

use super::{DistFunc, DistanceMetric, Linkage, LinkageMethod};
use crate::{
    df::DataFrame,
    error::{MatcalcError, Result},
};

/// A child of a merge: either an input row, or an earlier merge (by its
/// position in [`ClusterTree::merges`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    Leaf(usize),
    Merge(usize),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Merge {
    pub left: Node,
    pub right: Node,
    /// linkage distance between `left` and `right` when they were merged
    pub height: f64,
    /// number of leaves under this merge
    pub size: usize,
}

/// Result of [`HCluster::run`] over `n` rows.
///
/// - `leaves` is the in-order leaf sequence, a permutation of `0..n`.
/// - `merges` are in merge order; the last one is the root.
/// - `coords[m]` is the bracket drawn for `merges[m]`:
///   `[(left x, left height), (left x, height), (right x, height), (right x, right height)]`,
///   with x in `[0, 1]` along the leaf axis and heights normalized by the
///   largest finite merge height. Infinite heights are drawn at `1`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterTree {
    pub leaves: Vec<usize>,
    pub coords: Vec<[[f64; 2]; 4]>,
    pub merges: Vec<Merge>,
}

impl ClusterTree {
    #[inline]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn root(&self) -> Option<Node> {
        match self.merges.len() {
            0 if self.leaves.len() == 1 => Some(Node::Leaf(self.leaves[0])),
            0 => None,
            m => Some(Node::Merge(m - 1)),
        }
    }

    /// Merge heights, the largest first.
    pub fn heights(&self) -> Vec<f64> {
        self.merges
            .iter()
            .map(|merge| merge.height)
            .sorted_by(|a, b| b.total_cmp(a))
            .collect()
    }

    fn build(n: usize, merges: Vec<Merge>) -> Self {
        let root = match merges.len() {
            0 => Node::Leaf(0),
            m => Node::Merge(m - 1),
        };
        let mut leaves = Vec::with_capacity(n);
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf(i) => leaves.push(i),
                Node::Merge(m) => {
                    stack.push(merges[m].right);
                    stack.push(merges[m].left);
                }
            }
        }

        let span = n.saturating_sub(1).max(1) as f64;
        let mut leaf_x = vec![0.0; n];
        for (pos, &leaf) in leaves.iter().enumerate() {
            leaf_x[leaf] = pos as f64 / span;
        }
        let max_height = merges
            .iter()
            .map(|merge| merge.height)
            .filter(|h| h.is_finite())
            .fold(0.0, f64::max);
        let scale = |h: f64| {
            if h.is_infinite() {
                1.0
            } else if max_height > 0.0 {
                h / max_height
            } else {
                0.0
            }
        };

        // children always precede their parent in `merges`
        let mut merge_x: Vec<f64> = Vec::with_capacity(merges.len());
        let mut coords = Vec::with_capacity(merges.len());
        for merge in &merges {
            let place = |node: Node| match node {
                Node::Leaf(i) => (leaf_x[i], 0.0),
                Node::Merge(m) => (merge_x[m], scale(merges[m].height)),
            };
            let (lx, ly) = place(merge.left);
            let (rx, ry) = place(merge.right);
            let y = scale(merge.height);
            coords.push([[lx, ly], [lx, y], [rx, y], [rx, ry]]);
            merge_x.push((lx + rx) / 2.0);
        }

        Self {
            leaves,
            coords,
            merges,
        }
    }
}

/// Agglomerative clustering of the rows of a frame with a given linkage and
/// point distance.
///
/// At every step the closest pair of clusters is merged. Ties are resolved
/// in favour of the lowest `(i, j)` pair over the current cluster list, where
/// a merged cluster takes the place of `i` and `j` is removed, so a run is
/// fully deterministic. Cluster distances are cached between steps and only
/// the merged cluster's distances are recomputed.
///
/// The engine does not cap its input size; callers are expected to.
#[derive(Debug, Clone, Copy)]
pub struct HCluster {
    linkage: Linkage,
    dist: DistFunc,
}

impl Default for HCluster {
    fn default() -> Self {
        Self::from_methods(LinkageMethod::default(), DistanceMetric::default())
    }
}

impl HCluster {
    pub fn new(linkage: Linkage, dist: DistFunc) -> Self {
        Self { linkage, dist }
    }

    pub fn from_methods(linkage: LinkageMethod, metric: DistanceMetric) -> Self {
        Self::new(linkage.func(), metric.func())
    }

    fn cluster_distance(&self, points: &[Vec<f64>], a: &[usize], b: &[usize]) -> f64 {
        let a = a.iter().map(|&i| points[i].as_slice()).collect_vec();
        let b = b.iter().map(|&i| points[i].as_slice()).collect_vec();
        (self.linkage)(&a, &b, self.dist)
    }

    #[instrument(skip_all, fields(rows = df.nrows(), cols = df.ncols()))]
    pub fn run(&self, df: &DataFrame) -> Result<ClusterTree> {
        let n = df.nrows();
        if n == 0 {
            return Err(MatcalcError::EmptyInput(
                "cannot cluster a frame without rows".into(),
            ));
        }
        let points = df.to_f64_rows();

        // (node, member rows) per live cluster
        let mut clusters: Vec<(Node, Vec<usize>)> =
            (0..n).map(|i| (Node::Leaf(i), vec![i])).collect();
        let mut dist = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i + 1..n {
                let d = self.cluster_distance(&points, &clusters[i].1, &clusters[j].1);
                dist[i][j] = d;
                dist[j][i] = d;
            }
        }
        debug!("computed {} initial distances", n * n.saturating_sub(1) / 2);

        let mut merges = Vec::with_capacity(n - 1);
        while clusters.len() > 1 {
            let (i, j, height) = closest_pair(&dist);
            let (right, right_members) = clusters.remove(j);
            dist.remove(j);
            dist.iter_mut().for_each(|row| {
                row.remove(j);
            });

            let (node, members) = &mut clusters[i];
            members.extend(right_members);
            let merge = Merge {
                left: *node,
                right,
                height,
                size: members.len(),
            };
            trace!(?merge, "merge #{}", merges.len());
            *node = Node::Merge(merges.len());
            merges.push(merge);

            for k in 0..clusters.len() {
                if k == i {
                    continue;
                }
                let (a, b) = if k < i { (k, i) } else { (i, k) };
                let d = self.cluster_distance(&points, &clusters[a].1, &clusters[b].1);
                dist[i][k] = d;
                dist[k][i] = d;
            }
        }
        debug!(merges = merges.len(), "clustering finished");

        Ok(ClusterTree::build(n, merges))
    }
}

/// The first minimal `(i, j)`, `i < j`, in row-major scan order. Infinite
/// distances still merge once nothing closer is left.
fn closest_pair(dist: &[Vec<f64>]) -> (usize, usize, f64) {
    let mut best = (0, 1, dist[0][1]);
    for (i, row) in dist.iter().enumerate() {
        for (j, &d) in row.iter().enumerate().skip(i + 1) {
            if d < best.2 {
                best = (i, j, d);
            }
        }
    }
    best
}

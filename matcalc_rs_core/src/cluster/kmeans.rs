use itertools::Itertools;
use ndarray::{Array2, Axis};
use tracing::{debug, instrument, trace, warn};

use super::{DistFunc, DistanceMetric};
use crate::{
    df::{Cell, DataFrame},
    error::{MatcalcError, Result},
    toolkit::array::mean,
};

/// Row / column metadata column that k-means writes cluster ids to.
pub const CLUSTER_COLUMN: &str = "Cluster";

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KMeansConfig {
    pub n_clusters: usize,
    pub max_iter: usize,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_clusters: 5,
            max_iter: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansResult {
    /// cluster id per input row, in input order
    pub labels: Vec<usize>,
    /// `n_clusters x n_features`, may hold `NaN` for dimensions missing in
    /// every member of a cluster
    pub centroids: Array2<f64>,
    pub n_iter: usize,
    pub converged: bool,
}

/// Lloyd's k-means over the rows of a frame.
///
/// Seeding is deterministic: the first centroid is row 0, each further one is
/// the row farthest from the centroids picked so far (lowest row on ties).
/// Rows at an undefined (infinite) distance are only picked once no row at
/// a finite distance is left.
/// Rows join their nearest centroid (lowest centroid on ties); a cluster left
/// without rows keeps its previous centroid.
#[derive(Debug, Clone)]
pub struct KMeans {
    config: KMeansConfig,
    dist: DistFunc,
}

impl KMeans {
    pub fn new(config: KMeansConfig, dist: DistFunc) -> Self {
        Self { config, dist }
    }

    pub fn with_metric(config: KMeansConfig, metric: DistanceMetric) -> Self {
        Self::new(config, metric.func())
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    fn seed(&self, points: &[Vec<f64>], k: usize) -> Vec<usize> {
        let mut seeds = vec![0];
        let mut nearest = points
            .iter()
            .map(|p| (self.dist)(p, &points[0]))
            .collect_vec();
        while seeds.len() < k {
            let mut pick: Option<(usize, f64)> = None;
            for (i, &d) in nearest.iter().enumerate() {
                if seeds.contains(&i) {
                    continue;
                }
                let better = match pick {
                    None => true,
                    Some((_, best)) if best.is_finite() => d.is_finite() && d > best,
                    Some(_) => d.is_finite(),
                };
                if better {
                    pick = Some((i, d));
                }
            }
            let Some((next, _)) = pick else { break };
            seeds.push(next);
            for (i, p) in points.iter().enumerate() {
                nearest[i] = nearest[i].min((self.dist)(p, &points[next]));
            }
        }
        seeds
    }

    fn assign(&self, points: &[Vec<f64>], centroids: &Array2<f64>) -> Vec<usize> {
        let centroids = centroids.rows().into_iter().map(|c| c.to_vec()).collect_vec();
        points
            .iter()
            .map(|p| {
                let mut best = (0, f64::INFINITY);
                for (c, centroid) in centroids.iter().enumerate() {
                    let d = (self.dist)(p, centroid);
                    if d < best.1 {
                        best = (c, d);
                    }
                }
                best.0
            })
            .collect()
    }

    fn update(values: &Array2<f64>, labels: &[usize], centroids: &mut Array2<f64>) {
        for (c, mut centroid) in centroids.rows_mut().into_iter().enumerate() {
            let members = labels
                .iter()
                .positions(|&label| label == c)
                .collect_vec();
            if members.is_empty() {
                continue;
            }
            let rows = values.select(Axis(0), &members);
            for (j, col) in rows.columns().into_iter().enumerate() {
                centroid[j] = mean(col);
            }
        }
    }

    #[instrument(skip_all, fields(rows = df.nrows(), cols = df.ncols(), k = self.config.n_clusters))]
    pub fn run(&self, df: &DataFrame) -> Result<KMeansResult> {
        let (n, k) = (df.nrows(), self.config.n_clusters);
        if k == 0 || k > n {
            return Err(MatcalcError::InvalidClusterCount { k, n });
        }
        let values = df.to_f64();
        let points = df.to_f64_rows();

        let seeds = self.seed(&points, k);
        debug!(?seeds, "seeded centroids");
        let mut centroids = values.select(Axis(0), &seeds);
        let mut labels = self.assign(&points, &centroids);
        let mut n_iter = 0;
        let mut converged = false;
        while n_iter < self.config.max_iter {
            n_iter += 1;
            Self::update(&values, &labels, &mut centroids);
            let next = self.assign(&points, &centroids);
            let moved = labels.iter().zip(&next).filter(|(a, b)| a != b).count();
            trace!(iteration = n_iter, moved, "reassigned rows");
            labels = next;
            if moved == 0 {
                converged = true;
                break;
            }
        }
        if converged {
            debug!(n_iter, "k-means converged");
        } else {
            warn!(
                max_iter = self.config.max_iter,
                "k-means did not converge, keeping the last assignment"
            );
        }

        Ok(KMeansResult {
            labels,
            centroids,
            n_iter,
            converged,
        })
    }

    /// [`KMeans::run`], also writing the cluster ids to the
    /// [`CLUSTER_COLUMN`] of the row metadata.
    pub fn annotate(&self, df: &DataFrame) -> Result<(DataFrame, Vec<usize>)> {
        let labels = self.run(df)?.labels;
        let ids = labels.iter().map(|&c| Cell::from(c)).collect_vec();
        Ok((df.annotate_rows(CLUSTER_COLUMN, ids)?, labels))
    }
}

/// Clusters the rows of `df` into `k` groups.
///
/// Returns the frame, unchanged apart from a `Cluster` column in its row
/// metadata, and the cluster id of every row in input order. Reorder with
/// [`argsort`](crate::toolkit::array::argsort) + [`DataFrame::iloc`] for a
/// cluster-contiguous layout.
pub fn kmeans(df: &DataFrame, k: usize, dist: DistFunc) -> Result<(DataFrame, Vec<usize>)> {
    let config = KMeansConfig {
        n_clusters: k,
        ..Default::default()
    };
    KMeans::new(config, dist).annotate(df)
}

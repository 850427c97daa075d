//! # pipeline
//!
//! The heatmap and k-means workflows, each driven by a typed settings struct.
//!
//! A workflow owns the checks that the engines leave to their callers (the
//! size caps below) and reports "nothing to do" as `Ok(None)`: that happens
//! when the input, or what is left of it after filtering, is empty.

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::{
    cluster::{ClusterFrame, DistanceMetric, HCluster, KMeans, KMeansConfig, LinkageMethod},
    df::{
        filter::RowFilterMethod,
        transform::{log2, row_zscore},
        DataFrame,
    },
    error::MatcalcError,
    toolkit::array::argsort,
};

/// Largest row / column count that may be clustered hierarchically.
pub const MAX_CLUSTER_ITEMS: usize = 1000;
/// Largest row / column count that may be drawn without clustering.
pub const MAX_HEATMAP_DIM: usize = 10000;

/// A workflow over a single input frame.
pub trait Workflow {
    type Output;

    fn name(&self) -> &'static str;
    fn run(&self, df: &DataFrame) -> Result<Option<Self::Output>>;
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct HeatmapSettings {
    pub filter_rows: bool,
    pub row_filter_method: RowFilterMethod,
    pub top_rows: usize,
    pub apply_log2: bool,
    pub apply_row_zscore: bool,
    pub apply_transpose: bool,
    pub cluster_rows: bool,
    pub cluster_cols: bool,
    pub linkage: LinkageMethod,
    pub distance: DistanceMetric,
    /// workers for the per-row filter statistic
    pub nthreads: usize,
}

impl Default for HeatmapSettings {
    fn default() -> Self {
        Self {
            filter_rows: false,
            row_filter_method: RowFilterMethod::Stdev,
            top_rows: 200,
            apply_log2: true,
            apply_row_zscore: true,
            apply_transpose: false,
            cluster_rows: false,
            cluster_cols: false,
            linkage: LinkageMethod::Average,
            distance: DistanceMetric::Correlation,
            nthreads: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct KMeansSettings {
    pub filter_rows: bool,
    pub row_filter_method: RowFilterMethod,
    pub top_rows: usize,
    pub apply_log2: bool,
    pub apply_zscore: bool,
    pub clusters: usize,
    pub max_iter: usize,
    pub cluster_rows: bool,
    pub cluster_cols: bool,
    pub distance: DistanceMetric,
    pub sort_by_cluster: bool,
    pub nthreads: usize,
}

impl Default for KMeansSettings {
    fn default() -> Self {
        Self {
            filter_rows: false,
            row_filter_method: RowFilterMethod::Stdev,
            top_rows: 1000,
            apply_log2: false,
            apply_zscore: true,
            clusters: 5,
            max_iter: KMeansConfig::default().max_iter,
            cluster_rows: true,
            cluster_cols: false,
            distance: DistanceMetric::Correlation,
            sort_by_cluster: true,
            nthreads: 1,
        }
    }
}

/// Fails when an axis is too long for what is about to be done with it.
fn check_limit(axis: &'static str, len: usize, clustered: bool) -> crate::Result<()> {
    let limit = if clustered {
        MAX_CLUSTER_ITEMS
    } else {
        MAX_HEATMAP_DIM
    };
    if len > limit {
        return Err(MatcalcError::LimitExceeded { axis, len, limit });
    }
    Ok(())
}

/// filter -> size caps -> log2(x + 1) -> row z-score -> transpose -> row /
/// column dendrograms
#[instrument(skip_all, fields(rows = df.nrows(), cols = df.ncols()))]
pub fn run_heatmap(df: &DataFrame, settings: &HeatmapSettings) -> Result<Option<ClusterFrame>> {
    if df.is_empty() {
        debug!("empty input, nothing to plot");
        return Ok(None);
    }
    let mut df = df.clone();
    if settings.filter_rows {
        df = settings
            .row_filter_method
            .filter_with_threads(&df, settings.top_rows, settings.nthreads)
            .context("failed to filter rows")?;
        if df.is_empty() {
            debug!("no rows left after filtering");
            return Ok(None);
        }
    }
    check_limit("rows", df.nrows(), settings.cluster_rows)?;
    check_limit("columns", df.ncols(), settings.cluster_cols)?;

    if settings.apply_log2 {
        df = log2(&df, 1.0).context("failed to log transform")?;
    }
    if settings.apply_row_zscore {
        df = row_zscore(&df).context("failed to z-score rows")?;
    }
    if settings.apply_transpose {
        df = df.t();
    }

    let hc = HCluster::from_methods(settings.linkage, settings.distance);
    let mut cf = ClusterFrame::new(df.clone());
    // a transpose may have swapped the axes since the caps were checked
    if settings.cluster_rows && df.nrows() <= MAX_CLUSTER_ITEMS {
        let tree = hc.run(&df).context("failed to cluster rows")?;
        cf = cf.with_row_tree(tree)?;
    }
    if settings.cluster_cols && df.ncols() <= MAX_CLUSTER_ITEMS {
        let tree = hc.run(&df.t()).context("failed to cluster columns")?;
        cf = cf.with_col_tree(tree)?;
    }
    info!(
        shape = ?df.shape(),
        rows_clustered = cf.row_tree().is_some(),
        cols_clustered = cf.col_tree().is_some(),
        "heatmap ready"
    );
    Ok(Some(cf))
}

/// log2(x + 1) -> row z-score -> filter -> k-means over rows and / or
/// columns, optionally reordered so that each cluster is contiguous. Cluster
/// ids are written to the `Cluster` column of the row / column metadata.
#[instrument(skip_all, fields(rows = df.nrows(), cols = df.ncols(), k = settings.clusters))]
pub fn run_kmeans(df: &DataFrame, settings: &KMeansSettings) -> Result<Option<DataFrame>> {
    if df.is_empty() {
        debug!("empty input, nothing to cluster");
        return Ok(None);
    }
    let mut df = df.clone();
    if settings.apply_log2 {
        df = log2(&df, 1.0).context("failed to log transform")?;
    }
    if settings.apply_zscore {
        df = row_zscore(&df).context("failed to z-score rows")?;
    }
    if settings.filter_rows {
        df = settings
            .row_filter_method
            .filter_with_threads(&df, settings.top_rows, settings.nthreads)
            .context("failed to filter rows")?;
        if df.is_empty() {
            debug!("no rows left after filtering");
            return Ok(None);
        }
    }

    let km = KMeans::with_metric(
        KMeansConfig {
            n_clusters: settings.clusters,
            max_iter: settings.max_iter,
        },
        settings.distance,
    );
    if settings.cluster_rows {
        let (clustered, labels) = km.annotate(&df).context("failed to cluster rows")?;
        df = clustered;
        if settings.sort_by_cluster {
            df = df.iloc(argsort(&labels), ..)?;
        }
    }
    if settings.cluster_cols {
        let (clustered, labels) = km.annotate(&df.t()).context("failed to cluster columns")?;
        df = clustered.t();
        if settings.sort_by_cluster {
            df = df.iloc(.., argsort(&labels))?;
        }
    }
    info!(shape = ?df.shape(), "k-means ready");
    Ok(Some(df.with_name("K-means")))
}

impl Workflow for HeatmapSettings {
    type Output = ClusterFrame;

    fn name(&self) -> &'static str {
        "Heatmap"
    }

    fn run(&self, df: &DataFrame) -> Result<Option<ClusterFrame>> {
        run_heatmap(df, self)
    }
}

impl Workflow for KMeansSettings {
    type Output = DataFrame;

    fn name(&self) -> &'static str {
        "K-means"
    }

    fn run(&self, df: &DataFrame) -> Result<Option<DataFrame>> {
        run_kmeans(df, self)
    }
}

/// Settings of every workflow, keyed by the workflow they belong to.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AppSettings {
    Heatmap(HeatmapSettings),
    KMeans(KMeansSettings),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppOutput {
    Heatmap(ClusterFrame),
    KMeans(DataFrame),
}

impl AppSettings {
    pub fn name(&self) -> &'static str {
        match self {
            AppSettings::Heatmap(settings) => settings.name(),
            AppSettings::KMeans(settings) => settings.name(),
        }
    }

    pub fn run(&self, df: &DataFrame) -> Result<Option<AppOutput>> {
        let output = match self {
            AppSettings::Heatmap(settings) => settings.run(df)?.map(AppOutput::Heatmap),
            AppSettings::KMeans(settings) => settings.run(df)?.map(AppOutput::KMeans),
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::CLUSTER_COLUMN;
    use crate::df::{Cell, Index};
    use itertools::Itertools;
    use ndarray::Array2;

    /// `n` rows in two groups of opposite trend over 4 samples
    fn expression(n: usize) -> DataFrame {
        let values = Array2::from_shape_fn((n, 4), |(i, j)| {
            let trend = (if i % 2 == 0 { j } else { 3 - j }) as f64;
            10.0 * trend + i as f64 * 0.01 + 1.0
        });
        DataFrame::from_f64(values.view(), Index::range(n), Index::excel(4)).unwrap()
    }

    fn parity(name: &str) -> usize {
        name.parse::<usize>().unwrap() % 2
    }

    #[test]
    fn test_default_settings() {
        let heatmap = HeatmapSettings::default();
        assert_eq!(heatmap.linkage, LinkageMethod::Average);
        assert_eq!(heatmap.distance, DistanceMetric::Correlation);
        assert_eq!(heatmap.top_rows, 200);
        let kmeans = KMeansSettings::default();
        assert_eq!(kmeans.clusters, 5);
        assert!(kmeans.cluster_rows && kmeans.sort_by_cluster);
        assert_eq!(AppSettings::KMeans(kmeans).name(), "K-means");
    }

    #[test]
    fn test_heatmap() {
        let settings = HeatmapSettings {
            filter_rows: true,
            top_rows: 6,
            cluster_rows: true,
            cluster_cols: true,
            ..Default::default()
        };
        let cf = run_heatmap(&expression(10), &settings).unwrap().unwrap();
        assert_eq!(cf.df().shape(), (6, 4));
        assert_eq!(cf.row_tree().unwrap().len(), 6);
        assert_eq!(cf.col_tree().unwrap().len(), 4);
        // the two trends end up on either side of the root
        let names = cf.df().row_names();
        let sides = cf.row_tree().unwrap().leaves.iter().map(|&i| parity(&names[i]));
        assert_eq!(sides.dedup().count(), 2);
    }

    #[test]
    fn test_threaded_filter() {
        let settings = HeatmapSettings {
            filter_rows: true,
            top_rows: 5,
            ..Default::default()
        };
        let threaded = HeatmapSettings {
            nthreads: 4,
            ..settings.clone()
        };
        let df = expression(12);
        let expected = run_heatmap(&df, &settings).unwrap().unwrap();
        let actual = run_heatmap(&df, &threaded).unwrap().unwrap();
        assert_eq!(actual.df(), expected.df());
    }

    #[test]
    fn test_heatmap_limits() {
        let settings = HeatmapSettings {
            cluster_rows: true,
            ..Default::default()
        };
        let err = run_heatmap(&expression(MAX_CLUSTER_ITEMS + 1), &settings).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MatcalcError>(),
            Some(&MatcalcError::LimitExceeded {
                axis: "rows",
                len: MAX_CLUSTER_ITEMS + 1,
                limit: MAX_CLUSTER_ITEMS
            })
        );
    }

    #[test]
    fn test_empty_input_cancels() {
        let empty = DataFrame::empty();
        assert!(run_heatmap(&empty, &HeatmapSettings::default()).unwrap().is_none());
        assert!(run_kmeans(&empty, &KMeansSettings::default()).unwrap().is_none());
        let settings = AppSettings::Heatmap(HeatmapSettings {
            filter_rows: true,
            top_rows: 0,
            ..Default::default()
        });
        assert!(settings.run(&expression(4)).unwrap().is_none());
    }

    #[test]
    fn test_kmeans() {
        let settings = KMeansSettings {
            clusters: 2,
            cluster_cols: true,
            ..Default::default()
        };
        let out = run_kmeans(&expression(8), &settings).unwrap().unwrap();
        assert_eq!(out.name(), "K-means");
        assert_eq!(out.shape(), (8, 4));

        let rows = out.row_meta().unwrap();
        assert_eq!(rows.index(), out.index());
        let ids = rows.col(CLUSTER_COLUMN).unwrap().to_f64();
        assert!(ids.windows(2).all(|w| w[0] <= w[1]));
        // rows of one trend share a cluster
        let names = out.row_names();
        for (name, id) in names.iter().zip(&ids) {
            assert_eq!(*id == ids[0], parity(name) == parity(&names[0]));
        }

        let cols = out.col_meta().unwrap();
        assert_eq!(cols.index(), out.columns());
        assert!(cols.col(CLUSTER_COLUMN).is_ok());
    }

    #[test]
    fn test_kmeans_bad_cluster_count() {
        let settings = KMeansSettings {
            clusters: 9,
            ..Default::default()
        };
        let err = run_kmeans(&expression(8), &settings).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MatcalcError>(),
            Some(&MatcalcError::InvalidClusterCount { k: 9, n: 8 })
        );
        let output = AppSettings::KMeans(KMeansSettings {
            clusters: 2,
            ..Default::default()
        })
        .run(&expression(8))
        .unwrap();
        assert!(matches!(output, Some(AppOutput::KMeans(df)) if df.get(0, 0).unwrap() != &Cell::Na));
    }
}

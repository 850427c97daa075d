//! Row filters: top-N by a per-row statistic, and label matching.

use std::{fmt, str::FromStr};

use itertools::Itertools;

use super::{DataFrame, Index};
use crate::{
    error::{MatcalcError, Result},
    toolkit::array::{argsort_desc, mean_axis1, median_axis1, std_axis1},
};

/// The statistic a top-N row filter ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowFilterMethod {
    Mean,
    Median,
    #[default]
    Stdev,
}

impl RowFilterMethod {
    pub fn name(&self) -> &'static str {
        match self {
            RowFilterMethod::Mean => "mean",
            RowFilterMethod::Median => "median",
            RowFilterMethod::Stdev => "stdev",
        }
    }

    /// Per-row statistic, computed on `nthreads` workers when `nthreads > 1`.
    pub fn stats(&self, df: &DataFrame, nthreads: usize) -> Vec<f64> {
        let values = df.to_f64();
        let view = values.view();
        match self {
            RowFilterMethod::Mean => mean_axis1(&view, nthreads),
            RowFilterMethod::Median => median_axis1(&view, nthreads),
            RowFilterMethod::Stdev => std_axis1(&view, nthreads),
        }
    }

    pub fn filter(&self, df: &DataFrame, top: usize) -> Result<DataFrame> {
        self.filter_with_threads(df, top, 1)
    }

    pub fn filter_with_threads(
        &self,
        df: &DataFrame,
        top: usize,
        nthreads: usize,
    ) -> Result<DataFrame> {
        top_rows_by(df, &self.stats(df, nthreads), top)
            .map(|out| out.with_name(format!("Filter rows using {}, top {top}", self.name())))
    }
}

impl fmt::Display for RowFilterMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowFilterMethod::Mean => f.write_str("Mean"),
            RowFilterMethod::Median => f.write_str("Median"),
            RowFilterMethod::Stdev => f.write_str("Stdev"),
        }
    }
}

impl FromStr for RowFilterMethod {
    type Err = MatcalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(RowFilterMethod::Mean),
            "median" => Ok(RowFilterMethod::Median),
            "stdev" | "std" => Ok(RowFilterMethod::Stdev),
            _ => Err(MatcalcError::InvalidArgument(format!(
                "unknown row filter method: {s}"
            ))),
        }
    }
}

/// Keeps the `min(top, nrows)` rows with the largest `stats`, ordered by
/// descending statistic. Ties keep their original relative order and rows
/// whose statistic is undefined (`NaN`) rank last.
pub fn top_rows_by(df: &DataFrame, stats: &[f64], top: usize) -> Result<DataFrame> {
    if stats.len() != df.nrows() {
        return Err(MatcalcError::ShapeMismatch {
            expected: df.nrows(),
            actual: stats.len(),
        });
    }
    let order = argsort_desc(stats).into_iter().take(top).collect_vec();
    df.iloc(order, ..)
}

pub fn mean_filter(df: &DataFrame, top: usize) -> Result<DataFrame> {
    RowFilterMethod::Mean.filter(df, top)
}

pub fn median_filter(df: &DataFrame, top: usize) -> Result<DataFrame> {
    RowFilterMethod::Median.filter(df, top)
}

pub fn stdev_filter(df: &DataFrame, top: usize) -> Result<DataFrame> {
    RowFilterMethod::Stdev.filter(df, top)
}

/// How [`filter_rows_by_id`] / [`filter_cols_by_id`] compare labels to ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchOptions {
    pub case_sensitive: bool,
    /// the whole label must equal an id, instead of containing it
    pub match_entire_cell: bool,
    /// output in the order of `ids` instead of the table order
    pub keep_order: bool,
}

fn match_positions(index: &Index, ids: &[&str], options: MatchOptions) -> Vec<usize> {
    let norm = |s: &str| {
        if options.case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    };
    let labels = index
        .iter()
        .map(|l| norm(l.to_string().as_str()))
        .collect_vec();
    let ids = ids.iter().map(|id| norm(*id)).collect_vec();
    let matches = |label: &str, id: &str| {
        if options.match_entire_cell {
            label == id
        } else {
            label.contains(id)
        }
    };
    if options.keep_order {
        ids.iter()
            .flat_map(|id| {
                let hits = labels
                    .iter()
                    .positions(|label| matches(label.as_str(), id.as_str()))
                    .collect_vec();
                if options.match_entire_cell {
                    hits.into_iter().take(1).collect_vec()
                } else {
                    hits
                }
            })
            .collect()
    } else {
        labels
            .iter()
            .positions(|label| ids.iter().any(|id| matches(label.as_str(), id.as_str())))
            .collect()
    }
}

pub fn filter_rows_by_id(df: &DataFrame, ids: &[&str], options: MatchOptions) -> Result<DataFrame> {
    df.iloc(match_positions(df.index(), ids, options), ..)
}

pub fn filter_cols_by_id(df: &DataFrame, ids: &[&str], options: MatchOptions) -> Result<DataFrame> {
    df.iloc(.., match_positions(df.columns(), ids, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::df::{frame::tests::get_test_df, Cell};
    use ndarray::array;

    fn genes() -> DataFrame {
        let values = array![
            [1.0, 1.0, 1.0],
            [5.0, 5.0, 5.0],
            [0.0, 10.0, 5.0],
            [1.0, 1.0, 1.0],
            [f64::NAN, f64::NAN, f64::NAN],
        ];
        let row_meta = DataFrame::from_rows((0..5usize).map(|i| vec![Cell::from(i)]).collect()).unwrap();
        DataFrame::from_f64(
            values.view(),
            ["TP53", "BRCA1", "Myc", "tp63", "EGFR"].into_iter().collect(),
            ["s1", "s2", "S3"].into_iter().collect(),
        )
        .unwrap()
        .with_row_meta(row_meta)
        .unwrap()
    }

    #[test]
    fn test_mean_filter() {
        let df = genes();
        let out = mean_filter(&df, 3).unwrap();
        assert_eq!(out.row_names(), vec!["BRCA1", "Myc", "TP53"]);
        assert_eq!(out.name(), "Filter rows using mean, top 3");
        assert_eq!(out.row_meta().unwrap().index(), out.index());

        // clamped to the number of rows, NaN statistics last
        let out = mean_filter(&df, 100).unwrap();
        assert_eq!(out.nrows(), 5);
        assert_eq!(out.row_names(), vec!["BRCA1", "Myc", "TP53", "tp63", "EGFR"]);
    }

    #[test]
    fn test_stdev_and_median_filter() {
        let df = genes();
        let out = stdev_filter(&df, 1).unwrap();
        assert_eq!(out.row_names(), vec!["Myc"]);
        // ties on the median keep table order
        let out = median_filter(&df, 2).unwrap();
        assert_eq!(out.row_names(), vec!["BRCA1", "Myc"]);
    }

    #[test]
    fn test_filter_keeps_meta_in_sync() {
        let df = get_test_df();
        let out = mean_filter(&df, 2).unwrap();
        assert_eq!(out.row_names(), vec!["r2", "r1"]);
        assert_eq!(out.row_meta().unwrap().index(), out.index());
        assert_eq!(out.col_meta().unwrap().index(), out.columns());
        assert_eq!(
            out.row_meta().unwrap().col("Group").unwrap().strs(),
            vec!["c", "b"]
        );

        // equal stdevs keep table order, the undefined one is dropped
        let out = stdev_filter(&df, 2).unwrap();
        assert_eq!(out.row_names(), vec!["r0", "r2"]);
        assert_eq!(out.row_meta().unwrap().index(), out.index());
        assert_eq!(out.col_meta().unwrap().index(), out.columns());
        assert_eq!(out.col_meta().unwrap(), df.col_meta().unwrap());
    }

    #[test]
    fn test_filter_with_threads() {
        let df = genes();
        for method in [RowFilterMethod::Mean, RowFilterMethod::Median, RowFilterMethod::Stdev] {
            let stats = method.stats(&df, 1);
            let threaded = method.stats(&df, 4);
            assert_eq!(stats.len(), threaded.len());
            for (a, b) in stats.iter().zip(&threaded) {
                assert!(a == b || (a.is_nan() && b.is_nan()));
            }
            assert_eq!(
                method.filter_with_threads(&df, 3, 4).unwrap(),
                method.filter(&df, 3).unwrap()
            );
        }
    }

    #[test]
    fn test_filter_empty() {
        let df = genes().iloc(Vec::<usize>::new(), ..).unwrap();
        let out = stdev_filter(&df, 10).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.ncols(), 3);
    }

    #[test]
    fn test_parse_method() {
        assert_eq!("Stdev".parse::<RowFilterMethod>().unwrap(), RowFilterMethod::Stdev);
        assert_eq!("median".parse::<RowFilterMethod>().unwrap(), RowFilterMethod::Median);
        assert!("mode".parse::<RowFilterMethod>().is_err());
    }

    #[test]
    fn test_filter_by_id() {
        let df = genes();
        let out = filter_rows_by_id(&df, &["tp"], MatchOptions::default()).unwrap();
        assert_eq!(out.row_names(), vec!["TP53", "tp63"]);

        let options = MatchOptions {
            case_sensitive: true,
            ..Default::default()
        };
        let out = filter_rows_by_id(&df, &["tp"], options).unwrap();
        assert_eq!(out.row_names(), vec!["tp63"]);

        let options = MatchOptions {
            match_entire_cell: true,
            keep_order: true,
            ..Default::default()
        };
        let out = filter_rows_by_id(&df, &["myc", "tp53", "nope"], options).unwrap();
        assert_eq!(out.row_names(), vec!["Myc", "TP53"]);

        let out = filter_cols_by_id(&df, &["s3"], MatchOptions::default()).unwrap();
        assert_eq!(out.col_names(), vec!["S3"]);
    }
}

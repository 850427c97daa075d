use matcalc_core::{
    cluster::{
        euclidean, kmeans, single_linkage, ClusterFrame, DistanceMetric, HCluster, LinkageMethod,
        CLUSTER_COLUMN,
    },
    df::{
        filter::{mean_filter, stdev_filter},
        join::col_join,
        transform::{log2, row_zscore},
        Cell, DataFrame, Label,
    },
    pipeline::{run_heatmap, AppOutput, AppSettings, HeatmapSettings},
    toolkit::array::argsort,
    MatcalcError,
};

/// whitespace separated rows, the first token of each row is its label
fn table(text: &str, header: &str) -> DataFrame {
    let (names, cells): (Vec<&str>, Vec<Vec<Cell>>) = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut tokens = line.split_whitespace();
            let name = tokens.next().unwrap();
            (name, tokens.map(Cell::from_token).collect::<Vec<_>>())
        })
        .unzip();
    DataFrame::from_rows(cells)
        .unwrap()
        .set_index(names.into_iter().collect())
        .unwrap()
        .set_columns(header.split_whitespace().collect())
        .unwrap()
}

fn expression() -> DataFrame {
    table(
        "
        TP53  1    2    3    4
        BRCA1 1.2  2.1  2.9  4.2
        MYC   8    6    NA   2
        EGFR  7.5  6.1  4    1.5
        GAPDH 5    5    5    5
        ",
        "s1 s2 s3 s4",
    )
}

#[test]
fn parsed_tokens_become_cells() {
    let df = expression();
    assert_eq!(df.shape(), (5, 4));
    assert_eq!(df.get("MYC", "s3").unwrap(), &Cell::Na);
    assert_eq!(df.get("EGFR", "s1").unwrap(), &Cell::Num(7.5));
    assert!(df.get("KRAS", "s1").is_err());
}

#[test]
fn transforms_leave_the_source_alone() {
    let df = expression();
    let z = row_zscore(&log2(&df, 1.0).unwrap()).unwrap();
    assert_eq!(df, expression());
    // constant rows become zeros, missing values stay missing
    let gapdh = z.row("GAPDH").unwrap().to_f64();
    assert_eq!(gapdh, vec![0.0; 4]);
    assert_eq!(z.get("MYC", "s3").unwrap(), &Cell::Na);
    assert_eq!(z.t().t(), z);
}

#[test]
fn filters_keep_metadata_in_sync() {
    let annotations = table(
        "
        TP53  tumor_suppressor
        BRCA1 dna_repair
        MYC   oncogene
        EGFR  receptor
        GAPDH housekeeping
        ",
        "Role",
    );
    let df = expression().with_row_meta(annotations).unwrap();
    let top = stdev_filter(&df, 2).unwrap();
    assert_eq!(top.row_names(), vec!["MYC", "EGFR"]);
    assert_eq!(top.row_meta().unwrap().index(), top.index());
    assert_eq!(
        top.row_meta().unwrap().get("MYC", "Role").unwrap(),
        &Cell::from("oncogene")
    );
    assert_eq!(mean_filter(&df, 10).unwrap().nrows(), 5);
}

#[test]
fn cluster_rows_and_columns() {
    let df = table(
        "
        A 1  2  3
        B 1  2  3
        C 10 20 30
        ",
        "x y z",
    );
    let hc = HCluster::new(single_linkage, euclidean);
    let rows = hc.run(&df).unwrap();
    let cols = hc.run(&df.t()).unwrap();
    assert_eq!(rows.merges[0].height, 0.0);
    let a = rows.leaves.iter().position(|&l| l == 0).unwrap();
    let b = rows.leaves.iter().position(|&l| l == 1).unwrap();
    assert_eq!(a.abs_diff(b), 1);

    let cf = ClusterFrame::new(df).with_row_tree(rows).unwrap().with_col_tree(cols).unwrap();
    let ordered = cf.ordered().unwrap();
    assert_eq!(ordered.shape(), (3, 3));
}

#[test]
fn kmeans_then_sort_by_cluster() {
    let df = row_zscore(&expression()).unwrap();
    let (clustered, clusters) = kmeans(&df, 2, DistanceMetric::Correlation.func()).unwrap();
    assert_eq!(clusters.len(), 5);
    assert!(clusters.iter().all(|&c| c < 2));
    let sorted = clustered.iloc(argsort(&clusters), ..).unwrap();
    let ids = sorted.row_meta().unwrap().col(CLUSTER_COLUMN).unwrap().to_f64();
    assert!(ids.windows(2).all(|w| w[0] <= w[1]));
    // rising and falling genes never share a cluster
    let id = |gene: &str| sorted.row_meta().unwrap().get(gene, CLUSTER_COLUMN).unwrap().clone();
    assert_eq!(id("TP53"), id("BRCA1"));
    assert_eq!(id("MYC"), id("EGFR"));
    assert_ne!(id("TP53"), id("MYC"));

    assert_eq!(
        kmeans(&df, 6, euclidean).unwrap_err(),
        MatcalcError::InvalidClusterCount { k: 6, n: 5 }
    );
}

#[test]
fn join_then_run_heatmap() {
    let left = expression().iloc(.., vec![0, 1]).unwrap();
    let right = expression().iloc(vec![4, 3, 2, 1, 0], vec![2, 3]).unwrap();
    let joined = col_join(&[left, right]).unwrap();
    assert_eq!(joined.shape(), (5, 4));
    assert_eq!(joined.col_name(3), Some(&Label::from("s4")));

    let settings = AppSettings::Heatmap(HeatmapSettings {
        cluster_rows: true,
        cluster_cols: true,
        linkage: LinkageMethod::Average,
        distance: DistanceMetric::Euclidean,
        ..Default::default()
    });
    let Some(AppOutput::Heatmap(cf)) = settings.run(&joined).unwrap() else {
        panic!("expected a heatmap");
    };
    assert_eq!(cf.row_tree().unwrap().coords.len(), 4);
    assert_eq!(cf.col_tree().unwrap().coords.len(), 3);
    assert!(run_heatmap(&DataFrame::empty(), &HeatmapSettings::default())
        .unwrap()
        .is_none());
}

#![allow(dead_code)]

use std::collections::BTreeMap;

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use reservecraft::ir::SparseMatrix;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Amounts that are exact in decimal, with plenty of zeros.
pub fn arb_amount() -> BoxedStrategy<f64> {
    prop_oneof![
        2 => Just(0.0),
        3 => (1u32..=400).prop_map(|v| f64::from(v) / 4.0),
    ]
    .boxed()
}

/// A dense matrix (row-major values) with its extents.
pub fn arb_dense(max_rows: usize, max_cols: usize) -> BoxedStrategy<(usize, usize, Vec<f64>)> {
    (1..=max_rows, 1..=max_cols)
        .prop_flat_map(|(nrow, ncol)| {
            prop::collection::vec(arb_amount(), nrow * ncol)
                .prop_map(move |values| (nrow, ncol, values))
        })
        .boxed()
}

/// Triplets that may repeat cells and carry zeros.
pub fn arb_triplets(
    max_rows: usize,
    max_cols: usize,
    max_len: usize,
) -> BoxedStrategy<(usize, usize, Vec<(usize, usize, f64)>)> {
    (1..=max_rows, 1..=max_cols)
        .prop_flat_map(move |(nrow, ncol)| {
            prop::collection::vec((0..nrow, 0..ncol, arb_amount()), 0..=max_len)
                .prop_map(move |triplets| (nrow, ncol, triplets))
        })
        .boxed()
}

/// Costs where roughly one cell in four is missing.
pub fn arb_costs(max_len: usize) -> BoxedStrategy<Vec<Option<f64>>> {
    prop::collection::vec(
        prop_oneof![
            1 => Just(None),
            3 => (1u32..=200).prop_map(|v| Some(f64::from(v))),
        ],
        1..=max_len,
    )
    .boxed()
}

/// Cell-wise sums of a triplet list, zeros dropped.
pub fn summed_cells(matrix: &SparseMatrix) -> BTreeMap<(usize, usize), f64> {
    let mut cells = BTreeMap::new();
    for (row, col, value) in matrix.iter() {
        *cells.entry((row, col)).or_insert(0.0) += value;
    }
    cells.retain(|_, v| *v != 0.0);
    cells
}

/// Checks the canonical layout: column-major order, one entry per cell,
/// no stored zeros.
pub fn assert_canonical(matrix: &SparseMatrix) -> Result<(), String> {
    let keys: Vec<(usize, usize)> = matrix.iter().map(|(r, c, _)| (c, r)).collect();
    if keys.windows(2).any(|w| w[0] >= w[1]) {
        return Err(format!("entries not strictly column-major: {keys:?}"));
    }
    if matrix.iter().any(|(_, _, v)| v == 0.0) {
        return Err("stored zero".to_string());
    }
    if matrix.iter().any(|(r, c, _)| r >= matrix.nrow || c >= matrix.ncol) {
        return Err("entry outside declared extents".to_string());
    }
    if matrix.labels.is_some() {
        return Err("labels kept".to_string());
    }
    Ok(())
}

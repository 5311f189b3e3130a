#![allow(dead_code)]

use reservecraft::ir::{Grid, GridLayer, PlanningUnitInput};
use reservecraft::ModelInputs;

pub const SIDE: usize = 5;
pub const N_CELLS: usize = SIDE * SIDE;
pub const N_FEATURES: usize = 4;

/// Costs near 100, deterministic per cell.
pub fn cost_values() -> Vec<f64> {
    (0..N_CELLS)
        .map(|i| 100.0 + ((i * 7) % 21) as f64 - 10.0)
        .collect()
}

pub fn cost_grid() -> Grid {
    Grid::new(SIDE, SIDE, vec![GridLayer::from_values("cost", cost_values())])
}

/// A cost grid whose cells at the given 1-based ids have no cost.
pub fn cost_grid_with_missing(missing: &[usize]) -> Grid {
    let values = cost_values()
        .into_iter()
        .enumerate()
        .map(|(offset, v)| (!missing.contains(&(offset + 1))).then_some(v))
        .collect();
    Grid::new(SIDE, SIDE, vec![GridLayer::new("cost", values)])
}

/// Four binary feature layers, each present in at least one cell.
pub fn feature_grid() -> Grid {
    let layers = (0..N_FEATURES)
        .map(|f| {
            let values = (0..N_CELLS).map(|i| if (i + f) % 3 == 0 { 1.0 } else { 0.0 });
            GridLayer::from_values(format!("species_{}", f + 1), values)
        })
        .collect();
    Grid::new(SIDE, SIDE, layers)
}

pub fn grid_inputs(costs: Grid) -> ModelInputs {
    ModelInputs::new(PlanningUnitInput::Grid(costs)).with_features(feature_grid())
}

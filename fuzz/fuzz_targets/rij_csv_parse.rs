//! Fuzz target for long-format representation table CSV parsing.
//!
//! Parsed tables are pushed through the matrix builder as well, so malformed
//! indices and amounts reach the table normalisation path.
//!
//! Run with:
//!   cargo +nightly fuzz run rij_csv_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use reservecraft::ir::io_rij_csv::from_rij_csv_slice;
use reservecraft::rij::{build_rij, RijInput};

fuzz_target!(|data: &[u8]| {
    // 1MB is plenty for a representation table.
    if data.len() > 1024 * 1024 {
        return;
    }

    if let Ok(table) = from_rij_csv_slice(data) {
        let _ = build_rij(&RijInput::Table(table), 64, None);
    }
});

//! Fuzz target for problem JSON parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run problem_json_parse
//!
//! Or with a corpus:
//!   cargo +nightly fuzz run problem_json_parse fuzz/corpus/problem_json_parse/

#![no_main]

use libfuzzer_sys::fuzz_target;
use reservecraft::ir::io_problem::from_problem_json_slice;
use reservecraft::summarize::CellCentroidSummarizer;
use reservecraft::validation::validate_problem;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    // Errors are fine; panics are not.
    if let Ok(problem) = from_problem_json_slice(data) {
        let _ = validate_problem(&problem, &CellCentroidSummarizer);
    }
});

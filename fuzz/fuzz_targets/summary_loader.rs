#![no_main]

use libfuzzer_sys::fuzz_target;
use umbral::analysis::{analyze, AnalysisConfig};
use umbral::loader::read_summary;

fuzz_target!(|data: &[u8]| {
    // Arbitrary tables must either load or error, never panic
    if let Ok(mut dataset) = read_summary(data, b',') {
        let _ = analyze(&mut dataset, &AnalysisConfig::default());
    }
});

// Integration Test Utilities
//
// Helpers for writing sweep summary tables into temporary directories

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Harness summary header (volts, accuracy fraction, watts)
pub const HARNESS_HEADER: &str =
    "timestamp,voltage,accuracy,status,duration,avg_power_watts,avg_current_amps";

/// Single descending sweep with a cliff at 500 mV
///
/// Baseline ~70%, power falls from 10 W to 6 W.
pub const CLIFF_SWEEP: &str = "\
timestamp,voltage,accuracy,status,duration,avg_power_watts,avg_current_amps
2025-01-10 10:00:00,0.9000,0.7000,SUCCESS,12.0,10.0,11.1
2025-01-10 10:01:00,0.8000,0.7100,SUCCESS,12.1,9.0,11.2
2025-01-10 10:02:00,0.7000,0.6900,SUCCESS,12.2,8.0,11.4
2025-01-10 10:03:00,0.6000,0.6800,SUCCESS (GUI Ignored),12.3,7.0,11.6
2025-01-10 10:04:00,0.5000,0.1000,CRASH (Exit Code -11),3.0,6.0,12.0
";

/// Same sweep without any power column
pub const NO_POWER_SWEEP: &str = "\
voltage,accuracy
0.9000,0.7000
0.8000,0.7100
0.7000,0.6900
0.6000,0.6800
0.5000,0.1000
";

/// Two sweep runs, the second reset to 0.9 V
pub const TWO_RUN_SWEEP: &str = "\
voltage,accuracy,avg_power_watts
0.9000,0.7000,10.0
0.6000,0.6800,7.0
0.5000,0.1000,6.0
0.9000,0.7100,10.1
0.6000,0.6900,7.1
0.5000,0.0500,6.1
";

/// A temp directory holding one summary file
pub struct SweepFixture {
    _dir: TempDir,
    pub path: PathBuf,
}

impl SweepFixture {
    /// Write `content` to `file_name` inside a fresh temp directory
    pub fn new(file_name: &str, content: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(file_name);
        fs::write(&path, content).unwrap();
        Self { _dir: dir, path }
    }

    /// Path to a sibling file in the same temp directory
    pub fn sibling(&self, file_name: &str) -> PathBuf {
        self.path.with_file_name(file_name)
    }
}

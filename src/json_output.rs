//! JSON output format for analyzed sweeps
//!
//! A single document with the analysis result, the per-sample run ids, and
//! the figure specifications for an external renderer.

use crate::analysis::AnalysisResult;
use crate::plot_data::FigureSpec;
use crate::record::{PowerSource, SweepRecord};
use serde::{Deserialize, Serialize};

/// One sample as emitted in JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSample {
    pub run_id: u32,
    pub voltage_mv: f64,
    pub accuracy_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_w: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_a: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_s: Option<f64>,
    /// Harness status text ("SUCCESS", "CRASH (Exit Code -11)", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub in_critical_region: bool,
}

/// Complete JSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    pub version: String,
    pub model: String,
    pub power_source: PowerSource,
    pub result: AnalysisResult,
    pub samples: Vec<JsonSample>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub figures: Vec<FigureSpec>,
}

impl JsonOutput {
    /// Create a new JSON document for an analyzed sweep
    pub fn new(
        model: impl Into<String>,
        power_source: PowerSource,
        records: &[SweepRecord],
        result: AnalysisResult,
    ) -> Self {
        let region = result.region();
        let samples = records
            .iter()
            .map(|r| JsonSample {
                run_id: r.run_id().unwrap_or(1),
                voltage_mv: r.voltage_mv,
                accuracy_pct: r.accuracy_pct,
                power_w: r.power_w,
                current_a: r.current_a,
                duration_s: r.duration_s,
                status: r.status.as_ref().map(ToString::to_string),
                in_critical_region: region.contains(r.voltage_mv),
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            model: model.into(),
            power_source,
            result,
            samples,
            figures: Vec::new(),
        }
    }

    /// Attach renderer figure specifications
    pub fn set_figures(&mut self, figures: Vec<FigureSpec>) {
        self.figures = figures;
    }

    /// Serialize to pretty JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

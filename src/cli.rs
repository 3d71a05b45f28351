//! CLI argument parsing for Umbral

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for analysis results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report (default)
    Text,
    /// JSON document with results, samples and figure specs
    Json,
    /// CSV rows annotated with run id and critical-region membership
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "umbral")]
#[command(version)]
#[command(
    about = "Locate the accuracy cliff in undervolt sweeps and quantify power savings",
    long_about = None
)]
pub struct Cli {
    /// Sweep summary table (CSV, or TSV for .tsv/.txt)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write output to FILE instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Model name for titles (default: file stem without `summary_`)
    #[arg(short = 'm', long = "model", value_name = "NAME")]
    pub model: Option<String>,

    /// Analysis configuration (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Voltage rise (mV) that starts a new run
    #[arg(long = "jump-threshold-mv", value_name = "MV")]
    pub jump_threshold_mv: Option<f64>,

    /// Accuracy drop (percentage points) below baseline that marks the knee
    #[arg(long = "drop-threshold-pct", value_name = "PCT")]
    pub drop_threshold_pct: Option<f64>,

    /// Half-width (mV) of the window for representative power
    #[arg(long = "power-window-mv", value_name = "MV")]
    pub power_window_mv: Option<f64>,

    /// Omit figure specifications from JSON output
    #[arg(long = "no-figures")]
    pub no_figures: bool,

    /// Enable debug tracing on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_input() {
        let cli = Cli::parse_from(["umbral", "summary_ResNet18.csv"]);
        assert_eq!(cli.input, PathBuf::from("summary_ResNet18.csv"));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.output.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["umbral"]).is_err());
    }

    #[test]
    fn test_cli_format_json() {
        let cli = Cli::parse_from(["umbral", "--format", "json", "a.csv"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_threshold_overrides() {
        let cli = Cli::parse_from([
            "umbral",
            "--jump-threshold-mv",
            "30",
            "--drop-threshold-pct",
            "2.5",
            "--power-window-mv",
            "1",
            "a.csv",
        ]);
        assert_eq!(cli.jump_threshold_mv, Some(30.0));
        assert_eq!(cli.drop_threshold_pct, Some(2.5));
        assert_eq!(cli.power_window_mv, Some(1.0));
    }

    #[test]
    fn test_cli_model_and_config() {
        let cli = Cli::parse_from(["umbral", "-m", "VGG16", "-c", "umbral.toml", "a.csv"]);
        assert_eq!(cli.model.as_deref(), Some("VGG16"));
        assert_eq!(cli.config, Some(PathBuf::from("umbral.toml")));
    }
}

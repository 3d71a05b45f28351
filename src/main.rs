use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use tracing_subscriber::EnvFilter;
use umbral::{
    analysis::{analyze, AnalysisConfig},
    cli::{Cli, OutputFormat},
    csv_output::CsvOutput,
    json_output::JsonOutput,
    loader, plot_data,
};

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Resolve the analysis configuration: file first, then flag overrides
fn build_config(args: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };

    if let Some(mv) = args.jump_threshold_mv {
        config.run_jump_threshold_mv = mv;
    }
    if let Some(pct) = args.drop_threshold_pct {
        config.knee_drop_pct = pct;
    }
    if let Some(mv) = args.power_window_mv {
        config.power_window_mv = mv;
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid analysis configuration: {}", e))?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let config = build_config(&args)?;
    let model = args
        .model
        .clone()
        .unwrap_or_else(|| loader::model_name_from_path(&args.input));

    let mut dataset = loader::load_summary(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    tracing::info!("Processing model: {}", model);
    let result = analyze(&mut dataset, &config)?;

    let rendered = match args.format {
        OutputFormat::Text => {
            format!("=== {} ===\n\n{}", model, result.to_report_string())
        }
        OutputFormat::Json => {
            let figures = if args.no_figures {
                Vec::new()
            } else {
                plot_data::build_figures(&model, &dataset, &result)
            };
            let mut output =
                JsonOutput::new(&model, dataset.power_source(), dataset.records(), result);
            output.set_figures(figures);
            let mut json = output.to_json()?;
            json.push('\n');
            json
        }
        OutputFormat::Csv => CsvOutput::from_records(dataset.records(), &result.region()).to_csv(),
    };

    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{rendered}"),
    }

    Ok(())
}

//! Umbral - accuracy-cliff analysis for undervolt sweeps
//!
//! This library loads undervolt sweep summaries (voltage, accuracy and
//! optional power per inference run), splits them into sweep runs, locates
//! the voltage where accuracy collapses, bounds the critical region around
//! it and quantifies the power saved by running near that edge.

pub mod analysis;
pub mod cli;
pub mod csv_output;
pub mod json_output;
pub mod loader;
pub mod plot_data;
pub mod record;

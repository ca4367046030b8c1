//! Fit Trainer - repetition counting with voice cues
//!
//! Usage: `fit-trainer [CONFIG.json | EXERCISE]`

mod app;
mod config;
mod counting_service;
mod notifier;
mod set_journal;

use anyhow::Context;
use app::TrainerApp;
use config::TrainerConfig;
use fit_processing::Exercise;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn load_config(arg: Option<String>) -> anyhow::Result<TrainerConfig> {
    let Some(arg) = arg else {
        return Ok(TrainerConfig::default());
    };

    if arg.ends_with(".json") || Path::new(&arg).is_file() {
        TrainerConfig::load(&arg).with_context(|| format!("Failed to load configuration from {}", arg))
    } else {
        let exercise = Exercise::from_name(&arg)?;
        Ok(TrainerConfig::for_exercise(exercise))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config(std::env::args().nth(1))?;
    tracing::info!(
        exercise = %config.session.exercise,
        thresholds = ?config.session.effective_thresholds(),
        pattern = config.stream.simulation.pattern.description(),
        "Starting Fit Trainer"
    );
    tracing::info!(tip = config.session.exercise.form_tip(), "Form tip");

    let summary = TrainerApp::new(config)?.run().await?;
    println!("{}", summary.report());

    Ok(())
}

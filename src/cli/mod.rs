// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// `clap` and delegates every bit of work to Layer 2.
//
// Subcommands:
//   1. `train`    — fit the orientation model on feature files
//   2. `evaluate` — score a saved checkpoint on feature files
//   3. `extract`  — turn a coefficient CSV into a feature CSV
//   4. `catalog`  — list active and excluded features

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, ExtractArgs, TrainArgs};

use crate::application::train_use_case::TrainConfig;
use crate::features::FeatureCatalog;

/// Model outputs in column order
const OUTPUT_NAMES: [&str; 2] = ["pitch", "roll"];

#[derive(Parser, Debug)]
#[command(
    name = "emg-wrist",
    version = "0.1.0",
    about = "Estimate wrist pitch/roll from EMG wavelet features with a BiLSTM."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case. No computation here.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Extract(args)  => run_extract(args),
            Commands::Catalog        => run_catalog(),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    let config = match &args.config {
        Some(path) => TrainConfig::from_json_file(path)?,
        None       => args.into(),
    };
    tracing::info!("Starting training on feature files in: {}", config.data_dir);

    let weights = TrainUseCase::new(config).execute()?;
    println!("Training complete. Model saved to {}", weights.display());
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let use_case = EvaluateUseCase::new(args.checkpoint_dir, args.checkpoint, args.device);
    let report = use_case.evaluate(&args.data_dir)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Sequences: {}", report.sequences);
        println!("MSE:       {:.6}", report.mse);
        for (k, mse) in report.per_output_mse.iter().enumerate() {
            let name = OUTPUT_NAMES.get(k).copied().unwrap_or("output");
            println!("  {:<7}  {:.6}", format!("{name}:"), mse);
        }
    }
    Ok(())
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    use crate::application::extract_use_case::ExtractUseCase;

    let written = ExtractUseCase::new(args.into()).execute()?;
    println!("Extracted {written} windows.");
    Ok(())
}

fn run_catalog() -> Result<()> {
    let catalog = FeatureCatalog::standard();
    println!("Feature catalog v{} ({} active)", catalog.version(), catalog.len());
    for kind in catalog.features() {
        println!("  {:<6} min samples {}", kind.name(), kind.min_samples());
    }
    println!("Excluded:");
    for ex in catalog.excluded() {
        println!("  {:<6} {}", ex.kind.name(), ex.rationale);
    }
    Ok(())
}

// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Subcommands and their flags. Conversions into application
// configs live here so Layer 2 never sees clap types.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::{extract_use_case::ExtractConfig, train_use_case::TrainConfig};
use crate::ml::backend::DeviceChoice;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the orientation model on per-band feature files
    Train(TrainArgs),

    /// Evaluate a saved checkpoint on per-band feature files
    Evaluate(EvaluateArgs),

    /// Compute window features from a wavelet coefficient CSV
    Extract(ExtractArgs),

    /// List the feature catalog
    Catalog,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// JSON training config; when given, the other flags are ignored
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory with `<key>_<band>_features.csv` and ground-truth files
    #[arg(long, default_value = "data/features")]
    pub data_dir: String,

    /// Where checkpoints and the loss log are written
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of EMG channels per band file
    #[arg(long, default_value_t = 5)]
    pub channels: usize,

    #[arg(long, default_value_t = 128)]
    pub hidden_size: usize,

    /// Stacked BiLSTM layers
    #[arg(long, default_value_t = 1)]
    pub num_layers: usize,

    /// Consecutive windows per training sequence
    #[arg(long, default_value_t = 5)]
    pub seq_length: usize,

    /// Sequences per batch
    #[arg(long, default_value_t = 4)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 100)]
    pub epochs: usize,

    #[arg(long, default_value_t = 0.001)]
    pub lr: f64,

    /// Seed for weight init and sequence shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Features to zero out, e.g. `--ignore mav,wamp`
    #[arg(long = "ignore", value_delimiter = ',')]
    pub ignored_features: Vec<String>,

    /// `auto` (wgpu) or `cpu` (ndarray)
    #[arg(long, default_value_t = DeviceChoice::Auto)]
    pub device: DeviceChoice,

    /// Log the batch loss every N batches
    #[arg(long, default_value_t = 100)]
    pub log_every: usize,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:         a.data_dir,
            checkpoint_dir:   a.checkpoint_dir,
            channels:         a.channels,
            hidden_size:      a.hidden_size,
            num_layers:       a.num_layers,
            seq_length:       a.seq_length,
            batch_size:       a.batch_size,
            epochs:           a.epochs,
            lr:               a.lr,
            seed:             a.seed,
            ignored_features: a.ignored_features,
            device:           a.device,
            log_every:        a.log_every,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[arg(long, default_value = "data/features")]
    pub data_dir: String,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Checkpoint name (`model_<timestamp>`); defaults to the latest
    #[arg(long)]
    pub checkpoint: Option<String>,

    #[arg(long, default_value_t = DeviceChoice::Auto)]
    pub device: DeviceChoice,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Coefficient CSV, one column per channel
    #[arg(long)]
    pub input: PathBuf,

    /// Feature CSV to write
    #[arg(long)]
    pub output: PathBuf,

    /// Samples per window
    #[arg(long, default_value_t = 200)]
    pub window: usize,

    /// Samples between window starts
    #[arg(long, default_value_t = 50)]
    pub step: usize,
}

impl From<ExtractArgs> for ExtractConfig {
    fn from(a: ExtractArgs) -> Self {
        ExtractConfig { input: a.input, output: a.output, window: a.window, step: a.step }
    }
}

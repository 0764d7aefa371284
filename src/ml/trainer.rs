// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Minibatch Adam training over shuffled sequence batches.
//
// State machine:
//   Uninitialized → Training { epoch, batch } → Trained
//
// Per batch:
//   forward → MSE loss → backward → one Adam step.
// Gradients are rebuilt from the loss every step
// (GradientsParams::from_grads), so nothing accumulates
// across batches, and step N has fully updated the model
// before batch N+1 runs forward.
//
// A non-finite loss stops training at that batch; it is
// reported in the outcome and never retried.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{ensure, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    data::dataset::Dataset,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::SequenceBatcher, dataset::OrientationDataset};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{OrientationModel, OrientationModelConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    Uninitialized,
    Training { epoch: usize, batch: usize },
    Trained,
}

/// Where training stopped because the loss stopped being finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Divergence {
    pub epoch: usize,
    pub batch: usize,
    pub loss:  f64,
}

/// Cooperative stop request, checked between batches only.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct TrainOutcome<B: AutodiffBackend> {
    /// Trained weights without the autodiff wrapper
    pub model:      OrientationModel<B::InnerBackend>,
    pub history:    Vec<EpochMetrics>,
    pub divergence: Option<Divergence>,
    pub cancelled:  bool,
}

pub struct Trainer<B: AutodiffBackend> {
    cfg:     TrainConfig,
    device:  B::Device,
    state:   TrainerState,
    cancel:  CancelToken,
    metrics: Option<MetricsLogger>,
}

impl<B: AutodiffBackend> Trainer<B> {
    pub fn new(cfg: &TrainConfig, device: B::Device) -> Self {
        Self {
            cfg:     cfg.clone(),
            device,
            state:   TrainerState::Uninitialized,
            cancel:  CancelToken::new(),
            metrics: None,
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_metrics(mut self, logger: MetricsLogger) -> Self {
        self.metrics = Some(logger);
        self
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    pub fn fit(
        &mut self,
        model_cfg: &OrientationModelConfig,
        dataset:   OrientationDataset,
    ) -> Result<TrainOutcome<B>> {
        let cfg = &self.cfg;
        ensure!(
            dataset.input_width() == model_cfg.input_size,
            "dataset has {} input columns but the model expects {}",
            dataset.input_width(), model_cfg.input_size
        );
        ensure!(
            dataset.target_width() == model_cfg.output_size,
            "dataset has {} target columns but the model predicts {}",
            dataset.target_width(), model_cfg.output_size
        );
        ensure!(
            dataset.len() >= cfg.batch_size,
            "dataset holds {} sequences, not enough for one batch of {}",
            dataset.len(), cfg.batch_size
        );

        B::seed(cfg.seed);

        // ── Build model ───────────────────────────────────────────────────────
        let mut model: OrientationModel<B> = model_cfg.init(&self.device);
        tracing::info!(
            "Model ready: {} BiLSTM layer(s), hidden={}, input={}",
            model_cfg.num_layers, model_cfg.hidden_size, model_cfg.input_size
        );

        // ── Adam optimiser ────────────────────────────────────────────────────
        let mut optim = AdamConfig::new().init();

        // ── Data loader: shuffles whole sequences, never rows ─────────────────
        let batch_rows  = cfg.batch_size * dataset.seq_length();
        let num_samples = dataset.rows();
        let batcher = SequenceBatcher::<B>::new(
            self.device.clone(),
            dataset.seq_length(),
            dataset.input_width(),
            dataset.target_width(),
        );
        let loader = DataLoaderBuilder::new(batcher)
            .batch_size(cfg.batch_size)
            .shuffle(cfg.seed)
            .build(dataset);

        let mut history    = Vec::with_capacity(cfg.epochs);
        let mut divergence = None;
        let mut cancelled  = false;
        let mut best_loss  = f64::INFINITY;

        // ── Epoch loop ────────────────────────────────────────────────────────
        'epochs: for epoch in 1..=cfg.epochs {
            println!("Epoch {epoch}\n-------------------------------");

            let mut loss_sum = 0.0f64;
            let mut batches  = 0usize;

            for (batch_id, batch) in loader.iter().enumerate() {
                if self.cancel.is_cancelled() {
                    tracing::warn!("Training cancelled at epoch {} batch {}", epoch, batch_id);
                    cancelled = true;
                    break 'epochs;
                }
                self.state = TrainerState::Training { epoch, batch: batch_id };

                let (loss, _) = model.forward_loss(batch.inputs, batch.targets);
                let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

                if !loss_val.is_finite() {
                    tracing::warn!("Non-finite loss {} at epoch {} batch {}", loss_val, epoch, batch_id);
                    divergence = Some(Divergence { epoch, batch: batch_id, loss: loss_val });
                    break 'epochs;
                }

                // Backward pass + Adam update
                let grads = loss.backward();
                let grads = GradientsParams::from_grads(grads, &model);
                model = optim.step(cfg.lr, model, grads);

                loss_sum += loss_val;
                batches  += 1;

                if batch_id % cfg.log_every.max(1) == 0 {
                    let current = (batch_id + 1) * batch_rows;
                    tracing::info!("loss: {:>7.6}  [{:>5}/{:>5}]", loss_val, current, num_samples);
                }
            }

            let metrics = EpochMetrics::new(epoch, loss_sum / batches.max(1) as f64, batches);
            println!("Epoch {:>3}/{} | mean_loss={:.6} | batches={}",
                epoch, cfg.epochs, metrics.mean_loss, metrics.batches);
            if metrics.is_improvement(best_loss) {
                best_loss = metrics.mean_loss;
                tracing::debug!("New best mean loss {:.6} at epoch {}", best_loss, epoch);
            }
            if let Some(logger) = &self.metrics {
                logger.log(&metrics)?;
            }
            history.push(metrics);
        }

        self.state = TrainerState::Trained;
        tracing::info!("Training complete after {} epoch(s)", history.len());

        Ok(TrainOutcome { model: model.valid(), history, divergence, cancelled })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    /// Targets are a simple function of the inputs so the loss can fall.
    fn toy_dataset(rows: usize, width: usize, cfg: &TrainConfig) -> OrientationDataset {
        let inputs: Vec<f32> = (0..rows * width).map(|i| ((i as f32) * 0.13).sin()).collect();
        let targets: Vec<f32> = inputs
            .chunks(width)
            .flat_map(|r| [r[0] * 0.5, r[1] * -0.5])
            .collect();
        OrientationDataset::new(inputs, width, targets, 2, cfg.seq_length, cfg.batch_size).unwrap()
    }

    fn small_config(epochs: usize) -> TrainConfig {
        TrainConfig {
            epochs,
            hidden_size: 8,
            lr: 0.01,
            ..TrainConfig::default()
        }
    }

    fn model_config(cfg: &TrainConfig, width: usize) -> OrientationModelConfig {
        OrientationModelConfig::new(width)
            .with_hidden_size(cfg.hidden_size)
            .with_num_layers(cfg.num_layers)
    }

    #[test]
    fn test_training_reaches_trained_state_and_lowers_loss() {
        let cfg = small_config(15);
        let dataset = toy_dataset(80, 4, &cfg);
        let mut trainer = Trainer::<TestBackend>::new(&cfg, Default::default());
        assert_eq!(trainer.state(), TrainerState::Uninitialized);

        let outcome = trainer.fit(&model_config(&cfg, 4), dataset).unwrap();
        assert_eq!(trainer.state(), TrainerState::Trained);
        assert_eq!(outcome.history.len(), 15);
        assert!(outcome.divergence.is_none());
        assert!(!outcome.cancelled);

        // 80 rows / (4 × 5) = 4 full batches per epoch
        assert!(outcome.history.iter().all(|m| m.batches == 4));
        let first = outcome.history.first().unwrap().mean_loss;
        let last  = outcome.history.last().unwrap().mean_loss;
        assert!(last < first, "loss did not decrease: {first} → {last}");
    }

    #[test]
    fn test_cancel_before_first_batch() {
        let cfg = small_config(3);
        let dataset = toy_dataset(40, 4, &cfg);
        let token = CancelToken::new();
        token.cancel();

        let mut trainer = Trainer::<TestBackend>::new(&cfg, Default::default())
            .with_cancel_token(token);
        let outcome = trainer.fit(&model_config(&cfg, 4), dataset).unwrap();
        assert!(outcome.cancelled);
        assert!(outcome.history.is_empty());
    }

    #[test]
    fn test_non_finite_targets_stop_training() {
        let cfg = small_config(5);
        let inputs = vec![0.1f32; 20 * 3];
        let mut targets = vec![0.0f32; 20 * 2];
        targets[0] = f32::NAN;
        let dataset = OrientationDataset::new(inputs, 3, targets, 2, 5, 4).unwrap();

        let mut trainer = Trainer::<TestBackend>::new(&cfg, Default::default());
        let outcome = trainer.fit(&model_config(&cfg, 3), dataset).unwrap();
        let d = outcome.divergence.expect("divergence should be reported");
        assert_eq!((d.epoch, d.batch), (1, 0));
    }

    #[test]
    fn test_rejects_width_mismatch() {
        let cfg = small_config(1);
        let dataset = toy_dataset(40, 4, &cfg);
        let mut trainer = Trainer::<TestBackend>::new(&cfg, Default::default());
        assert!(trainer.fit(&model_config(&cfg, 5), dataset).is_err());
    }

    #[test]
    fn test_rejects_target_width_mismatch() {
        let cfg = small_config(1);
        let dataset = OrientationDataset::new(vec![0.1f32; 20 * 4], 4, vec![0.0f32; 20 * 3], 3, 5, 4).unwrap();
        let mut trainer = Trainer::<TestBackend>::new(&cfg, Default::default());
        let err = trainer.fit(&model_config(&cfg, 4), dataset).err().unwrap();
        assert!(err.to_string().contains("3 target columns"));
        assert_eq!(trainer.state(), TrainerState::Uninitialized);
    }
}

// ============================================================
// Layer 5 — Orientation Model
// ============================================================
// Bidirectional LSTM regressor:
//
//   [batch, seq, input_size]
//       │  BiLstm × num_layers   (layer 0: input_size → 2·hidden,
//       │                         later:   2·hidden   → 2·hidden)
//       ▼
//   [batch, seq, 2·hidden]
//       │  Linear(2·hidden → output_size), applied per timestep
//       ▼
//   [batch, seq, output_size]   (pitch, roll)

use burn::{
    nn::{
        loss::{MseLoss, Reduction},
        BiLstm, BiLstmConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct OrientationModelConfig {
    /// Width of one feature vector (channels × catalog × bands)
    pub input_size:  usize,
    #[config(default = 128)]
    pub hidden_size: usize,
    #[config(default = 1)]
    pub num_layers:  usize,
    /// pitch & roll
    #[config(default = 2)]
    pub output_size: usize,
}

impl OrientationModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> OrientationModel<B> {
        let layers: Vec<BiLstm<B>> = (0..self.num_layers.max(1))
            .map(|i| {
                let d_input = if i == 0 { self.input_size } else { 2 * self.hidden_size };
                BiLstmConfig::new(d_input, self.hidden_size, true).init(device)
            })
            .collect();
        let head = LinearConfig::new(2 * self.hidden_size, self.output_size).init(device);
        OrientationModel { layers, head }
    }
}

#[derive(Module, Debug)]
pub struct OrientationModel<B: Backend> {
    pub layers: Vec<BiLstm<B>>,
    pub head:   Linear<B>,
}

impl<B: Backend> OrientationModel<B> {
    /// inputs: [batch, seq, input_size] → [batch, seq, output_size]
    pub fn forward(&self, inputs: Tensor<B, 3>) -> Tensor<B, 3> {
        let mut x = inputs;
        for layer in &self.layers {
            let (output, _state) = layer.forward(x, None);
            x = output;
        }
        self.head.forward(x)
    }

    /// Mean squared error over every (batch, timestep, output) element.
    pub fn forward_loss(&self, inputs: Tensor<B, 3>, targets: Tensor<B, 3>) -> (Tensor<B, 1>, Tensor<B, 3>) {
        let output = self.forward(inputs);
        let loss = MseLoss::new().forward(output.clone(), targets, Reduction::Mean);
        (loss, output)
    }
}

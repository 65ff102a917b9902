//! Image classifier with train/eval modes and named parameters

use crate::autograd::{self, Tensor};
use rand::rngs::StdRng;
use rand::Rng;

/// Execution mode of the model
///
/// Mode only changes internal behavior (dropout, gradient tape), never the
/// interface: both modes map an image batch to class-score logits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Dropout active, forward pass builds the backward tape
    Train,
    /// Dropout disabled, plain forward math with no gradient tracking
    Eval,
}

/// Two-layer classification head: flatten -> linear -> ReLU -> dropout -> linear
///
/// Parameters are named (`fc1.weight`, `fc1.bias`, `fc2.weight`, `fc2.bias`)
/// for the checkpoint store. The dropout stream is owned by the model and
/// reseedable, so test-time behavior can be decoupled from training history.
#[derive(Debug)]
pub struct ImageClassifier {
    name: String,
    version: String,
    in_features: usize,
    hidden: usize,
    num_classes: usize,
    dropout_p: f32,
    w1: Tensor,
    b1: Tensor,
    w2: Tensor,
    b2: Tensor,
    mode: Mode,
    dropout_rng: StdRng,
}

impl ImageClassifier {
    /// Build a classifier with uniform He-style initialization drawn from `init_rng`
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        in_features: usize,
        hidden: usize,
        num_classes: usize,
        dropout_p: f32,
        init_rng: &mut StdRng,
        dropout_rng: StdRng,
    ) -> Self {
        let w1 = init_uniform(hidden * in_features, in_features, init_rng);
        let b1 = Tensor::zeros(hidden, true);
        let w2 = init_uniform(num_classes * hidden, hidden, init_rng);
        let b2 = Tensor::zeros(num_classes, true);

        Self {
            name: name.into(),
            version: version.into(),
            in_features,
            hidden,
            num_classes,
            dropout_p,
            w1,
            b1,
            w2,
            b2,
            mode: Mode::Train,
            dropout_rng,
        }
    }

    /// Registry name of the backbone
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry version of the backbone
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Flattened input size expected per example
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Number of output classes
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Current execution mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch between training and inference behavior
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Replace the dropout stream (used by the tester to decouple test-time
    /// randomness from training)
    pub fn reseed_dropout(&mut self, rng: StdRng) {
        self.dropout_rng = rng;
    }

    /// Map a flattened image batch (batch x in_features) to logits
    /// (batch x num_classes)
    ///
    /// In `Train` mode the pass builds the backward tape and applies
    /// dropout; in `Eval` mode it runs plain math through the same GEMM, so
    /// logits are bit-identical across modes up to the dropout layer.
    pub fn forward(&mut self, inputs: &Tensor, batch: usize) -> Tensor {
        debug_assert_eq!(inputs.len(), batch * self.in_features);

        match self.mode {
            Mode::Train => {
                let h = autograd::linear(inputs, &self.w1, &self.b1, batch, self.in_features, self.hidden);
                let h = autograd::relu(&h);
                let h = autograd::dropout(&h, self.dropout_p, &mut self.dropout_rng);
                autograd::linear(&h, &self.w2, &self.b2, batch, self.hidden, self.num_classes)
            }
            Mode::Eval => {
                let h = crate::autograd::matmul_relu_infer(
                    inputs.data().as_slice().unwrap(),
                    self.w1.data().as_slice().unwrap(),
                    self.b1.data().as_slice().unwrap(),
                    batch,
                    self.in_features,
                    self.hidden,
                );
                let logits = crate::autograd::linear_infer(
                    &h,
                    self.w2.data().as_slice().unwrap(),
                    self.b2.data().as_slice().unwrap(),
                    batch,
                    self.hidden,
                    self.num_classes,
                );
                Tensor::from_vec(logits, false)
            }
        }
    }

    /// Full named parameter set, in a fixed order
    pub fn named_parameters(&self) -> Vec<(&'static str, &Tensor)> {
        vec![
            ("fc1.weight", &self.w1),
            ("fc1.bias", &self.b1),
            ("fc2.weight", &self.w2),
            ("fc2.bias", &self.b2),
        ]
    }

    /// Mutable parameter references in the same fixed order (optimizer seam)
    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.w1, &mut self.b1, &mut self.w2, &mut self.b2]
    }

    /// Mutable parameter lookup by name (checkpoint-load seam)
    pub fn get_parameter_mut(&mut self, name: &str) -> Option<&mut Tensor> {
        match name {
            "fc1.weight" => Some(&mut self.w1),
            "fc1.bias" => Some(&mut self.b1),
            "fc2.weight" => Some(&mut self.w2),
            "fc2.bias" => Some(&mut self.b2),
            _ => None,
        }
    }
}

fn init_uniform(len: usize, fan_in: usize, rng: &mut StdRng) -> Tensor {
    let bound = (6.0f32 / fan_in as f32).sqrt();
    let data: Vec<f32> = (0..len).map(|_| rng.gen_range(-bound..bound)).collect();
    Tensor::from_vec(data, true)
}

use serde::{Deserialize, Serialize};

pub static IRIS_MODEL_CONFIG: ModelConfig = ModelConfig {
    inputs: 4,
    hidden: &[7],
    outputs: 3,
    activation: "sigmoid",
};

/// Flowers evaluated after training in the browser demo.
pub static REFERENCE_FLOWERS: [[f32; 4]; 3] = [
    [5.0, 3.4, 1.5, 0.2],
    [7.0, 3.2, 4.7, 1.4],
    [6.2, 3.4, 5.4, 2.3],
];

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub inputs: usize,
    pub hidden: &'static [usize],
    pub outputs: usize,
    pub activation: &'static str,
}

impl ModelConfig {
    /// `(neurons, inputs)` for every layer, input side first.
    pub fn layer_shapes(&self) -> Vec<(usize, usize)> {
        let widths: Vec<usize> = std::iter::once(self.inputs)
            .chain(self.hidden.iter().copied())
            .chain(std::iter::once(self.outputs))
            .collect();

        widths
            .windows(2)
            .map(|pair| (pair[1], pair[0]))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub learning_rate: f32,
    pub seed: u64,
    pub log_every: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 2000,
            learning_rate: 0.1,
            seed: 42,
            log_every: 100,
        }
    }
}

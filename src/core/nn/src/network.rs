use crate::functional::mean_squared_error;
use crate::layer::{LayerOutput, NeuralLayer};
use crate::sample::Sample;
use anyhow::{anyhow, ensure};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt;

type ErrorCallback = Box<dyn FnMut(f32)>;

/// Feed-forward network trained with online gradient descent.
pub struct NeuralNetwork {
    layers: Vec<NeuralLayer>,
    dataset: Vec<Sample>,
    error_callback: Option<ErrorCallback>,
    rng: StdRng,
}

impl fmt::Debug for NeuralNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NeuralNetwork")
            .field("layers", &self.layers)
            .field("n_samples", &self.dataset.len())
            .field("has_error_callback", &self.error_callback.is_some())
            .finish()
    }
}

impl NeuralNetwork {
    pub fn new(dataset: Vec<Sample>) -> Self {
        Self::with_rng(dataset, StdRng::from_entropy())
    }

    /// Same as `new`, but the per-epoch shuffle order is reproducible.
    pub fn with_seed(dataset: Vec<Sample>, seed: u64) -> Self {
        Self::with_rng(dataset, StdRng::seed_from_u64(seed))
    }

    fn with_rng(dataset: Vec<Sample>, rng: StdRng) -> Self {
        NeuralNetwork {
            layers: Vec::new(),
            dataset,
            error_callback: None,
            rng,
        }
    }

    pub fn from_layers(layers: Vec<NeuralLayer>) -> anyhow::Result<Self> {
        let mut network = Self::new(Vec::new());
        for layer in layers {
            network.add_layer(layer)?;
        }
        Ok(network)
    }
}

impl NeuralNetwork {
    pub fn add_layer(&mut self, layer: NeuralLayer) -> anyhow::Result<()> {
        let expected_inputs = match self.layers.last() {
            Some(previous) => Some(previous.neurons()),
            None => self.dataset.first().map(|sample| sample.inputs.len()),
        };

        if let Some(expected_inputs) = expected_inputs {
            ensure!(
                layer.inputs() == expected_inputs,
                "layer {} expects {} inputs, but receives {}",
                self.layers.len(),
                layer.inputs(),
                expected_inputs
            );
        }

        self.layers.push(layer);
        Ok(())
    }

    /// Registers a callback that receives the mean squared error after every
    /// training epoch.
    pub fn error<F>(&mut self, callback: F)
    where
        F: FnMut(f32) + 'static,
    {
        self.error_callback = Some(Box::new(callback));
    }

    pub fn layers(&self) -> &[NeuralLayer] {
        &self.layers
    }

    pub fn into_layers(self) -> Vec<NeuralLayer> {
        self.layers
    }

    pub fn dataset(&self) -> &[Sample] {
        &self.dataset
    }

    pub fn set_dataset(&mut self, dataset: Vec<Sample>) {
        self.dataset = dataset;
    }

    pub fn n_inputs(&self) -> Option<usize> {
        self.layers.first().map(NeuralLayer::inputs)
    }

    pub fn n_outputs(&self) -> Option<usize> {
        self.layers.last().map(NeuralLayer::neurons)
    }
}

impl NeuralNetwork {
    pub fn evaluate(&self, sample: &Sample) -> anyhow::Result<Vec<f32>> {
        let n_inputs = self
            .n_inputs()
            .ok_or_else(|| anyhow!("network has no layers"))?;
        ensure!(
            sample.inputs.len() == n_inputs,
            "expected {} inputs, got {}",
            n_inputs,
            sample.inputs.len()
        );

        let outputs = self.forward(&sample.inputs);
        Ok(outputs
            .into_iter()
            .last()
            .map(|output| output.activation)
            .unwrap_or_default())
    }

    /// Trains for `epochs` passes over the dataset and returns the mean
    /// squared error of the last epoch.
    pub fn train(&mut self, epochs: usize, learning_rate: f32) -> anyhow::Result<f32> {
        self.train_with_progress(epochs, learning_rate, |_, _| {})
    }

    /// Like `train`, but `on_epoch` also receives `(epoch, error)`. The
    /// registered error callback still sees every epoch.
    pub fn train_with_progress<F>(
        &mut self,
        epochs: usize,
        learning_rate: f32,
        mut on_epoch: F,
    ) -> anyhow::Result<f32>
    where
        F: FnMut(usize, f32),
    {
        ensure!(epochs > 0, "epochs must be positive");
        self.validate_dataset()?;

        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        let mut last_error = 0f32;
        let mut error_callback = self.error_callback.take();

        for epoch in 0..epochs {
            order.shuffle(&mut self.rng);

            let mut total_error = 0f32;
            for &sample_idx in &order {
                total_error += self.train_sample(sample_idx, learning_rate);
            }

            last_error = total_error / self.dataset.len() as f32;
            if let Some(callback) = error_callback.as_mut() {
                callback(last_error);
            }
            on_epoch(epoch, last_error);
        }

        self.error_callback = error_callback;

        debug!("trained {} epochs, error {}", epochs, last_error);

        Ok(last_error)
    }

    fn validate_dataset(&self) -> anyhow::Result<()> {
        let (n_inputs, n_outputs) = match (self.n_inputs(), self.n_outputs()) {
            (Some(n_inputs), Some(n_outputs)) => (n_inputs, n_outputs),
            _ => return Err(anyhow!("network has no layers")),
        };
        ensure!(!self.dataset.is_empty(), "dataset is empty");

        for (idx, sample) in self.dataset.iter().enumerate() {
            let outputs = sample
                .outputs
                .as_ref()
                .ok_or_else(|| anyhow!("sample {} has no expected outputs", idx))?;
            ensure!(
                sample.inputs.len() == n_inputs,
                "sample {} has {} inputs, network expects {}",
                idx,
                sample.inputs.len(),
                n_inputs
            );
            ensure!(
                outputs.len() == n_outputs,
                "sample {} has {} outputs, network produces {}",
                idx,
                outputs.len(),
                n_outputs
            );
        }

        Ok(())
    }

    fn forward(&self, x: &[f32]) -> Vec<LayerOutput> {
        let mut outputs: Vec<LayerOutput> = Vec::with_capacity(self.layers.len());

        for layer in &self.layers {
            let input = outputs
                .last()
                .map_or(x, |output| output.activation.as_slice());
            let output = layer.forward(input);
            outputs.push(output);
        }

        outputs
    }

    fn train_sample(&mut self, sample_idx: usize, learning_rate: f32) -> f32 {
        let sample = &self.dataset[sample_idx];
        let target = match &sample.outputs {
            Some(target) => target,
            None => unreachable!("dataset validated before training"),
        };

        let outputs = self.forward(&sample.inputs);
        let prediction = &outputs[outputs.len() - 1].activation;
        let error = mean_squared_error(prediction, target);

        let mut gradient: Vec<f32> = prediction
            .iter()
            .zip(target.iter())
            .map(|(o, t)| o - t)
            .collect();

        let inputs = sample.inputs.clone();

        for layer_idx in (0..self.layers.len()).rev() {
            let layer = &mut self.layers[layer_idx];
            let delta = layer.delta(&gradient, &outputs[layer_idx]);

            if layer_idx > 0 {
                gradient = layer.input_gradient(&delta);
            }

            let layer_input = match layer_idx {
                0 => &inputs,
                _ => &outputs[layer_idx - 1].activation,
            };
            layer.apply_gradient(&delta, layer_input, learning_rate);
        }

        error
    }
}

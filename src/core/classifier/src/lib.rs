pub mod config;

use crate::config::{ModelConfig, TrainConfig};
use anyhow::{anyhow, ensure};
use dataset::iris::{FlowerClass, N_CLASSES, N_FEATURES};
use log::info;
use nn::activation::activation_by_name;
use nn::functional::softmax_one_row;
use nn::layer::NeuralLayer;
use nn::network::NeuralNetwork;
use nn::sample::Sample;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use web_time::Instant;

#[derive(Debug)]
pub struct IrisClassifier {
    network: NeuralNetwork,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub class: FlowerClass,
    pub confidence: f32,
    pub outputs: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainReport {
    pub epochs: usize,
    pub final_error: f32,
    pub seconds: f64,
}

impl IrisClassifier {
    pub fn new(config: &ModelConfig, dataset: Vec<Sample>, seed: u64) -> anyhow::Result<Self> {
        ensure!(
            config.inputs == N_FEATURES && config.outputs == N_CLASSES,
            "model must map {} features to {} classes",
            N_FEATURES,
            N_CLASSES
        );

        let mut rng = StdRng::seed_from_u64(seed);
        let mut network = NeuralNetwork::with_seed(dataset, seed);

        for (neurons, inputs) in config.layer_shapes() {
            let activation = activation_by_name(config.activation)?;
            network.add_layer(NeuralLayer::random(neurons, inputs, activation, &mut rng))?;
        }

        Ok(IrisClassifier { network })
    }

    pub fn from_network(network: NeuralNetwork) -> anyhow::Result<Self> {
        ensure!(
            network.n_inputs() == Some(N_FEATURES) && network.n_outputs() == Some(N_CLASSES),
            "network must map {} features to {} classes",
            N_FEATURES,
            N_CLASSES
        );

        Ok(IrisClassifier { network })
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    pub fn set_dataset(&mut self, dataset: Vec<Sample>) {
        self.network.set_dataset(dataset);
    }

    /// Registers a callback that receives the training error after every
    /// epoch, independently of `TrainConfig::log_every`.
    pub fn error<F>(&mut self, callback: F)
    where
        F: FnMut(f32) + 'static,
    {
        self.network.error(callback);
    }
}

impl IrisClassifier {
    /// Trains on the network's dataset. `on_progress` receives
    /// `(epoch, error)` every `log_every` epochs and after the last one;
    /// the `error` callback fires on every epoch.
    pub fn train<F>(&mut self, config: &TrainConfig, mut on_progress: F) -> anyhow::Result<TrainReport>
    where
        F: FnMut(usize, f32),
    {
        ensure!(config.epochs > 0, "epochs must be positive");

        let begin = Instant::now();
        let log_every = config.log_every.max(1);
        let last_epoch = config.epochs.saturating_sub(1);

        let final_error =
            self.network
                .train_with_progress(config.epochs, config.learning_rate, |epoch, error| {
                    if epoch % log_every == 0 || epoch == last_epoch {
                        on_progress(epoch, error);
                    }
                })?;

        let report = TrainReport {
            epochs: config.epochs,
            final_error,
            seconds: begin.elapsed().as_secs_f64(),
        };

        info!(
            "Trained {} epochs in {:.3}s, error {}",
            report.epochs, report.seconds, report.final_error
        );

        Ok(report)
    }

    pub fn predict(&self, features: &[f32]) -> anyhow::Result<Prediction> {
        let outputs = self.network.evaluate(&Sample::predict(features.to_vec()))?;
        let class = FlowerClass::from_one_hot(&outputs)?;

        let probs = softmax_one_row(outputs.clone());
        let confidence = probs.iter().fold(0f32, |acc, &p| acc.max(p));

        Ok(Prediction {
            class,
            confidence,
            outputs,
        })
    }

    /// Share of labelled samples whose predicted class matches the target.
    pub fn accuracy(&self, samples: &[Sample]) -> anyhow::Result<f32> {
        ensure!(!samples.is_empty(), "no samples to score");

        let mut correct = 0usize;
        for sample in samples {
            let target = sample
                .outputs
                .as_ref()
                .ok_or_else(|| anyhow!("cannot score an unlabeled sample"))?;

            if self.predict(&sample.inputs)?.class == FlowerClass::from_one_hot(target)? {
                correct += 1;
            }
        }

        Ok(correct as f32 / samples.len() as f32)
    }
}

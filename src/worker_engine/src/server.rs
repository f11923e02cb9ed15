use crate::protocol::{
    AccuracyResponse, DatasetLoadedResponse, ImportWeightsRequest, LoadDatasetRequest,
    PredictRequest, PredictionResponse, Request, Response, TrainRequest, TrainedResponse,
    WeightsResponse,
};
use anyhow::{anyhow, ensure};
use classifier::config::{TrainConfig, IRIS_MODEL_CONFIG};
use classifier::IrisClassifier;
use dataset::{csv_to_dataset, train_test_split};
use log::{error, info};
use nn::network::NeuralNetwork;
use nn::sample::Sample;
use speedy::{Readable, Writable};
use state_dict::{to_safetensors, FromStateDict};
use wasm_bindgen::prelude::wasm_bindgen;

/// Owns the dataset and model inside the worker and answers serialized
/// requests from the page.
#[wasm_bindgen]
#[derive(Default)]
pub struct ClassifierServer {
    train_set: Vec<Sample>,
    test_set: Vec<Sample>,
    classifier: Option<IrisClassifier>,
}

#[wasm_bindgen]
impl ClassifierServer {
    pub fn wasm_new() -> Self {
        ClassifierServer::default()
    }

    pub fn serve_serialized(&mut self, request: &[u8]) -> Vec<u8> {
        let response = match Request::read_from_buffer(request) {
            Ok(request) => self.serve(request),
            Err(err) => Response::error(format!("malformed request: {}", err)),
        };

        response.write_to_vec().unwrap_or_else(|err| {
            error!("failed to encode response: {}", err);
            Vec::new()
        })
    }
}

impl ClassifierServer {
    pub fn serve(&mut self, request: Request) -> Response {
        let response = match request {
            Request::LoadDataset(request) => self.serve_load_dataset(request),
            Request::Train(request) => self.serve_train(request),
            Request::Predict(request) => self.serve_predict(request),
            Request::Accuracy => self.serve_accuracy(),
            Request::ExportWeights => self.serve_export_weights(),
            Request::ImportWeights(request) => self.serve_import_weights(request),
            Request::Reset => {
                self.classifier = None;
                Ok(Response::Reset)
            }
        };

        response.unwrap_or_else(|err| {
            error!("request failed: {:#}", err);
            Response::error(format!("{:#}", err))
        })
    }

    fn classifier(&self) -> anyhow::Result<&IrisClassifier> {
        self.classifier
            .as_ref()
            .ok_or_else(|| anyhow!("model is not trained yet"))
    }

    fn serve_load_dataset(&mut self, request: LoadDatasetRequest) -> anyhow::Result<Response> {
        ensure!(
            (0f32..1f32).contains(&request.test_ratio),
            "test ratio must be in [0, 1)"
        );

        let samples = csv_to_dataset(&request.csv)?;
        let (train_set, test_set) = train_test_split(samples, request.test_ratio, request.seed);
        ensure!(
            !train_set.is_empty(),
            "test ratio {} leaves no training samples",
            request.test_ratio
        );
        info!(
            "Dataset loaded: {} train, {} test",
            train_set.len(),
            test_set.len()
        );

        self.train_set = train_set;
        self.test_set = test_set;

        Ok(Response::DatasetLoaded(DatasetLoadedResponse {
            n_train: self.train_set.len(),
            n_test: self.test_set.len(),
        }))
    }

    fn serve_train(&mut self, request: TrainRequest) -> anyhow::Result<Response> {
        ensure!(!self.train_set.is_empty(), "no dataset loaded");

        let config = TrainConfig {
            epochs: request.epochs,
            learning_rate: request.learning_rate,
            seed: request.seed,
            ..TrainConfig::default()
        };

        let (mut classifier, retraining) = match self.classifier.take() {
            Some(classifier) => (classifier, true),
            None => (
                IrisClassifier::new(&IRIS_MODEL_CONFIG, self.train_set.clone(), config.seed)?,
                false,
            ),
        };
        classifier.set_dataset(self.train_set.clone());
        classifier.error(|err| info!("error({})", err));

        let result = classifier.train(&config, |_, _| {});

        // A fresh model that failed its first run stays unset.
        if result.is_ok() || retraining {
            self.classifier = Some(classifier);
        }
        let report = result?;

        Ok(Response::Trained(TrainedResponse {
            epochs: report.epochs,
            final_error: report.final_error,
            seconds: report.seconds,
        }))
    }

    fn serve_predict(&mut self, request: PredictRequest) -> anyhow::Result<Response> {
        let prediction = self.classifier()?.predict(&request.features)?;

        Ok(Response::Prediction(PredictionResponse {
            class: prediction.class.to_string(),
            confidence: prediction.confidence,
            outputs: prediction.outputs,
        }))
    }

    fn serve_accuracy(&mut self) -> anyhow::Result<Response> {
        let classifier = self.classifier()?;

        let train = classifier.accuracy(&self.train_set)?;
        let test = match self.test_set.is_empty() {
            true => None,
            false => Some(classifier.accuracy(&self.test_set)?),
        };

        Ok(Response::Accuracy(AccuracyResponse { train, test }))
    }

    fn serve_export_weights(&mut self) -> anyhow::Result<Response> {
        let weights = to_safetensors(self.classifier()?.network())?;

        Ok(Response::Weights(WeightsResponse { weights }))
    }

    fn serve_import_weights(&mut self, request: ImportWeightsRequest) -> anyhow::Result<Response> {
        let network = NeuralNetwork::from_safetensors(&request.weights)?;
        let mut classifier = IrisClassifier::from_network(network)?;
        classifier.set_dataset(self.train_set.clone());

        self.classifier = Some(classifier);

        Ok(Response::WeightsImported)
    }
}

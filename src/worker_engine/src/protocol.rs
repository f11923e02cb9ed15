use serde::{Deserialize, Serialize};
use speedy::{Readable, Writable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Readable, Writable)]
pub enum Request {
    LoadDataset(LoadDatasetRequest),
    Train(TrainRequest),
    Predict(PredictRequest),
    Accuracy,
    ExportWeights,
    ImportWeights(ImportWeightsRequest),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Readable, Writable)]
pub struct LoadDatasetRequest {
    pub csv: String,
    pub test_ratio: f32,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Readable, Writable)]
pub struct TrainRequest {
    pub epochs: usize,
    pub learning_rate: f32,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Readable, Writable)]
pub struct PredictRequest {
    pub features: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Readable, Writable)]
pub struct ImportWeightsRequest {
    pub weights: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Readable, Writable)]
pub enum Response {
    DatasetLoaded(DatasetLoadedResponse),
    Trained(TrainedResponse),
    Prediction(PredictionResponse),
    Accuracy(AccuracyResponse),
    Weights(WeightsResponse),
    WeightsImported,
    Reset,
    Error(ErrorResponse),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Readable, Writable)]
pub struct DatasetLoadedResponse {
    pub n_train: usize,
    pub n_test: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Readable, Writable)]
pub struct TrainedResponse {
    pub epochs: usize,
    pub final_error: f32,
    pub seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Readable, Writable)]
pub struct PredictionResponse {
    pub class: String,
    pub confidence: f32,
    pub outputs: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Readable, Writable)]
pub struct AccuracyResponse {
    pub train: f32,
    pub test: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Readable, Writable)]
pub struct WeightsResponse {
    pub weights: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Readable, Writable)]
pub struct ErrorResponse {
    pub message: String,
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(ErrorResponse {
            message: message.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request = Request::Predict(PredictRequest {
            features: vec![5.0, 3.4, 1.5, 0.2],
        });

        let bytes = request.write_to_vec().unwrap();
        assert_eq!(Request::read_from_buffer(&bytes).unwrap(), request);
    }

    #[test]
    fn test_truncated_response_fails_to_decode() {
        let response = Response::Accuracy(AccuracyResponse {
            train: 0.9,
            test: Some(0.8),
        });
        let bytes = response.write_to_vec().unwrap();

        assert!(Response::read_from_buffer(&bytes[..bytes.len() - 2]).is_err());
    }
}

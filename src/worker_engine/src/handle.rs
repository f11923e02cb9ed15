use crate::protocol::{
    AccuracyResponse, DatasetLoadedResponse, ErrorResponse, LoadDatasetRequest, PredictRequest,
    PredictionResponse, Request, Response, TrainRequest, TrainedResponse,
};
use anyhow::anyhow;
use speedy::{Readable, Writable};
use tokio::sync::mpsc;
use web_sys::Worker;

/// Page-side end of the worker connection. Responses arrive through the
/// sender returned by `get_sender`, which the worker's `onmessage` feeds.
pub struct ClassifierHandle {
    worker: Worker,
    response_rx: mpsc::Receiver<Vec<u8>>,
    response_tx: mpsc::Sender<Vec<u8>>,
}

impl ClassifierHandle {
    pub fn new(worker: Worker) -> Self {
        let (response_tx, response_rx) = mpsc::channel(1);

        Self {
            worker,
            response_rx,
            response_tx,
        }
    }

    pub fn get_sender(&self) -> mpsc::Sender<Vec<u8>> {
        self.response_tx.clone()
    }
}

impl ClassifierHandle {
    async fn send_serialized(&mut self, request: &Request) -> anyhow::Result<Vec<u8>> {
        let bytes = request.write_to_vec()?;

        self.worker
            .post_message(&bytes.into())
            .map_err(|err| anyhow!("failed to post request: {:?}", err))?;

        self.response_rx
            .recv()
            .await
            .ok_or_else(|| anyhow!("worker connection closed"))
    }

    pub async fn call(&mut self, request: Request) -> anyhow::Result<Response> {
        let bytes = self.send_serialized(&request).await?;

        match Response::read_from_buffer(&bytes)? {
            Response::Error(ErrorResponse { message }) => Err(anyhow!(message)),
            response => Ok(response),
        }
    }
}

impl ClassifierHandle {
    pub async fn load_dataset(
        &mut self,
        csv: String,
        test_ratio: f32,
        seed: u64,
    ) -> anyhow::Result<DatasetLoadedResponse> {
        let request = Request::LoadDataset(LoadDatasetRequest {
            csv,
            test_ratio,
            seed,
        });

        match self.call(request).await? {
            Response::DatasetLoaded(response) => Ok(response),
            other => Err(unexpected(other)),
        }
    }

    pub async fn train(
        &mut self,
        epochs: usize,
        learning_rate: f32,
        seed: u64,
    ) -> anyhow::Result<TrainedResponse> {
        let request = Request::Train(TrainRequest {
            epochs,
            learning_rate,
            seed,
        });

        match self.call(request).await? {
            Response::Trained(response) => Ok(response),
            other => Err(unexpected(other)),
        }
    }

    pub async fn predict(&mut self, features: Vec<f32>) -> anyhow::Result<PredictionResponse> {
        match self.call(Request::Predict(PredictRequest { features })).await? {
            Response::Prediction(response) => Ok(response),
            other => Err(unexpected(other)),
        }
    }

    pub async fn accuracy(&mut self) -> anyhow::Result<AccuracyResponse> {
        match self.call(Request::Accuracy).await? {
            Response::Accuracy(response) => Ok(response),
            other => Err(unexpected(other)),
        }
    }

    pub async fn export_weights(&mut self) -> anyhow::Result<Vec<u8>> {
        match self.call(Request::ExportWeights).await? {
            Response::Weights(response) => Ok(response.weights),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(response: Response) -> anyhow::Error {
    anyhow!("unexpected response from worker: {:?}", response)
}

use crate::api::to_js_error;
use tokio::sync::mpsc;
use wasm_bindgen::prelude::{wasm_bindgen, JsError};
use web_sys::Worker;
use worker_engine::handle::ClassifierHandle;

/// Page-side wrapper around a worker running `ClassifierServer`. Every
/// method returns the worker's answer as JSON.
#[wasm_bindgen]
pub struct ClassifierClient {
    handle: ClassifierHandle,
}

#[wasm_bindgen]
impl ClassifierClient {
    pub fn new(worker: Worker) -> Self {
        ClassifierClient {
            handle: ClassifierHandle::new(worker),
        }
    }

    pub fn get_worker_response_sender(&self) -> WorkerResponseSender {
        WorkerResponseSender {
            response_tx: self.handle.get_sender(),
        }
    }

    pub async fn load_dataset(
        &mut self,
        csv: String,
        test_ratio: f32,
        seed: u64,
    ) -> Result<String, JsError> {
        let response = self
            .handle
            .load_dataset(csv, test_ratio, seed)
            .await
            .map_err(to_js_error)?;

        Ok(serde_json::to_string(&response)?)
    }

    pub async fn train(
        &mut self,
        epochs: usize,
        learning_rate: f32,
        seed: u64,
    ) -> Result<String, JsError> {
        let response = self
            .handle
            .train(epochs, learning_rate, seed)
            .await
            .map_err(to_js_error)?;

        Ok(serde_json::to_string(&response)?)
    }

    pub async fn predict(&mut self, features: Vec<f32>) -> Result<String, JsError> {
        let response = self
            .handle
            .predict(features)
            .await
            .map_err(to_js_error)?;

        Ok(serde_json::to_string(&response)?)
    }

    pub async fn accuracy(&mut self) -> Result<String, JsError> {
        let response = self.handle.accuracy().await.map_err(to_js_error)?;

        Ok(serde_json::to_string(&response)?)
    }

    pub async fn export_weights(&mut self) -> Result<Vec<u8>, JsError> {
        self.handle.export_weights().await.map_err(to_js_error)
    }
}

/// Handed to the worker's `onmessage` so responses reach the pending call.
#[wasm_bindgen]
pub struct WorkerResponseSender {
    response_tx: mpsc::Sender<Vec<u8>>,
}

#[wasm_bindgen]
impl WorkerResponseSender {
    pub async fn register_response(&mut self, data: Vec<u8>) -> Result<(), JsError> {
        self.response_tx
            .send(data)
            .await
            .map_err(|_| JsError::new("classifier client was dropped"))
    }
}

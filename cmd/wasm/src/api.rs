use classifier::config::REFERENCE_FLOWERS;
use classifier::IrisClassifier;
use log::info;
use nn::sample::Sample;
use state_dict::to_safetensors;
use wasm_bindgen::prelude::{wasm_bindgen, JsError};

#[wasm_bindgen]
pub struct IrisAPI {
    pub(crate) classifier: IrisClassifier,
    pub(crate) dataset: Vec<Sample>,
}

#[wasm_bindgen]
impl IrisAPI {
    /// JSON-encoded prediction for `[sepal_length, sepal_width,
    /// petal_length, petal_width]`.
    pub fn predict(&self, features: Vec<f32>) -> Result<String, JsError> {
        let prediction = self.classifier.predict(&features).map_err(to_js_error)?;

        Ok(serde_json::to_string(&prediction)?)
    }

    pub fn reference_predictions(&self) -> Result<Vec<String>, JsError> {
        REFERENCE_FLOWERS
            .iter()
            .map(|flower| self.predict(flower.to_vec()))
            .collect()
    }

    pub fn accuracy(&self) -> Result<f32, JsError> {
        if self.dataset.is_empty() {
            return Err(JsError::new("no dataset to score against"));
        }

        let accuracy = self
            .classifier
            .accuracy(&self.dataset)
            .map_err(to_js_error)?;
        info!("Accuracy: {}", accuracy);

        Ok(accuracy)
    }

    pub fn export_weights(&self) -> Result<Vec<u8>, JsError> {
        to_safetensors(self.classifier.network()).map_err(to_js_error)
    }
}

pub(crate) fn to_js_error(err: anyhow::Error) -> JsError {
    JsError::new(&format!("{:#}", err))
}

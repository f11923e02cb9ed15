use crate::api::{to_js_error, IrisAPI};
use classifier::config::{TrainConfig, IRIS_MODEL_CONFIG, REFERENCE_FLOWERS};
use classifier::IrisClassifier;
use loader::{AssetPaths, Bootstrap, HttpSource};
use log::{error, info};
use tokio::sync::mpsc;
use wasm_bindgen::prelude::{wasm_bindgen, JsError};

/// Fetches the dataset, trains the network and hands back an `IrisAPI`.
#[wasm_bindgen]
pub struct IrisLoader {
    base_url: String,
    train_config: TrainConfig,
    status_tx: mpsc::UnboundedSender<StatusMessage>,
    status_rx: Option<mpsc::UnboundedReceiver<StatusMessage>>,
}

enum StatusMessage {
    Message(String),
    Done,
}

#[wasm_bindgen]
impl IrisLoader {
    pub fn new(base_url: String) -> Self {
        let (status_tx, status_rx) = mpsc::unbounded_channel();

        IrisLoader {
            base_url,
            train_config: TrainConfig::default(),
            status_tx,
            status_rx: Some(status_rx),
        }
    }

    /// Overrides training parameters from JSON; missing fields keep their
    /// defaults.
    pub fn set_train_config(&mut self, config_json: &str) -> Result<(), JsError> {
        self.train_config = serde_json::from_str(config_json)?;
        Ok(())
    }

    /// Can be taken once.
    pub fn get_status_receiver(&mut self) -> Option<StatusReceiver> {
        self.status_rx
            .take()
            .map(|status_rx| StatusReceiver { status_rx })
    }

    pub async fn into_iris_api(self) -> Result<IrisAPI, JsError> {
        let result = self.do_into_iris_api().await;
        self.finish(result)
    }

    /// Skips training and restores previously exported weights.
    pub async fn into_pretrained_api(self) -> Result<IrisAPI, JsError> {
        let result = self.do_into_pretrained_api().await;
        self.finish(result)
    }
}

impl IrisLoader {
    fn bootstrap(&self) -> Bootstrap<HttpSource> {
        Bootstrap::new(HttpSource::new(self.base_url.clone()), AssetPaths::default())
    }

    fn finish(&self, result: anyhow::Result<IrisAPI>) -> Result<IrisAPI, JsError> {
        match result {
            Ok(api) => {
                self.send_status(StatusMessage::Done);
                Ok(api)
            }
            Err(err) => {
                error!("{:#}", err);
                self.send_str_status(format!("{:#}", err));
                self.send_status(StatusMessage::Done);
                Err(to_js_error(err))
            }
        }
    }

    async fn do_into_iris_api(&self) -> anyhow::Result<IrisAPI> {
        let bootstrap = self.bootstrap();
        let config = &self.train_config;

        self.send_str_status("Loading dataset".to_string());
        let dataset = bootstrap.load_dataset().await?;

        info!("Creating the network...");
        let mut classifier = IrisClassifier::new(&IRIS_MODEL_CONFIG, dataset.clone(), config.seed)?;
        classifier.error(|err| info!("error({})", err));

        info!("Training...");
        classifier.train(config, |epoch, err| {
            self.send_str_status(format!(
                "Training: {}/{}, error {:.5}",
                epoch + 1,
                config.epochs,
                err
            ));
        })?;
        info!("Done!!");

        for flower in REFERENCE_FLOWERS.iter() {
            let prediction = classifier.predict(flower)?;
            info!(
                "Evaluate {:?} = {:?} ({})",
                flower, prediction.outputs, prediction.class
            );
        }

        Ok(IrisAPI {
            classifier,
            dataset,
        })
    }

    async fn do_into_pretrained_api(&self) -> anyhow::Result<IrisAPI> {
        let bootstrap = self.bootstrap();

        self.send_str_status("Loading weights".to_string());
        let network = bootstrap.load_network().await?;
        let classifier = IrisClassifier::from_network(network)?;

        // Accuracy is still reported when the dataset is reachable.
        let dataset = match bootstrap.load_dataset().await {
            Ok(dataset) => dataset,
            Err(err) => {
                info!("dataset unavailable, accuracy disabled: {:#}", err);
                Vec::new()
            }
        };

        Ok(IrisAPI {
            classifier,
            dataset,
        })
    }

    fn send_str_status(&self, status: String) {
        self.send_status(StatusMessage::Message(status))
    }

    fn send_status(&self, status: StatusMessage) {
        // Nobody listening is fine; statuses are advisory.
        let _ = self.status_tx.send(status);
    }
}

#[wasm_bindgen]
pub struct StatusReceiver {
    status_rx: mpsc::UnboundedReceiver<StatusMessage>,
}

#[wasm_bindgen]
impl StatusReceiver {
    /// Next status line, or `"done"` once loading has finished.
    pub async fn get_status(&mut self) -> String {
        let message = self.status_rx.recv().await.unwrap_or(StatusMessage::Done);

        match message {
            StatusMessage::Message(output) => output,
            StatusMessage::Done => "done".to_string(),
        }
    }
}

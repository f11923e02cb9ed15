use crate::paths::AssetPaths;
use crate::source::AssetSource;
use anyhow::{ensure, Context};
use dataset::csv_to_dataset;
use log::info;
use nn::network::NeuralNetwork;
use nn::sample::Sample;
use state_dict::FromStateDict;

const WASM_MAGIC: &[u8] = b"\0asm";

/// The fetched module binary and the glue script that has to be imported
/// next to instantiate it.
#[derive(Debug, Clone, PartialEq)]
pub struct WasmPayload {
    pub binary: Vec<u8>,
    pub glue_script: String,
}

pub struct Bootstrap<S> {
    source: S,
    paths: AssetPaths,
}

impl<S> Bootstrap<S>
where
    S: AssetSource,
{
    pub fn new(source: S, paths: AssetPaths) -> Self {
        Bootstrap { source, paths }
    }

    pub fn paths(&self) -> &AssetPaths {
        &self.paths
    }

    /// Downloads the module binary. The glue script is only handed back once
    /// the binary is in hand, so it is never imported without one. This is
    /// the order `web/src/loader.js` follows inside the worker.
    pub async fn fetch_binary(&self) -> anyhow::Result<WasmPayload> {
        let binary = self
            .source
            .fetch(&self.paths.wasm_binary)
            .await
            .context("failed to load wasm binary")?;

        ensure!(
            binary.starts_with(WASM_MAGIC),
            "{} is not a wasm module",
            self.paths.wasm_binary
        );

        info!("wasm has loaded ({} bytes)", binary.len());

        Ok(WasmPayload {
            binary,
            glue_script: self.paths.glue_script.clone(),
        })
    }

    /// Fetches the glue script named by `payload`.
    pub async fn load_glue_script(&self, payload: &WasmPayload) -> anyhow::Result<String> {
        let script = self
            .source
            .fetch(&payload.glue_script)
            .await
            .context("failed to load glue script")?;
        let script = String::from_utf8(script).context("glue script is not valid utf-8")?;
        ensure!(
            !script.trim().is_empty(),
            "{} is empty",
            payload.glue_script
        );

        Ok(script)
    }

    pub async fn load_dataset(&self) -> anyhow::Result<Vec<Sample>> {
        let data = self
            .source
            .fetch(&self.paths.dataset)
            .await
            .context("failed to load dataset")?;
        let data = String::from_utf8(data).context("dataset is not valid utf-8")?;

        csv_to_dataset(&data)
    }

    pub async fn load_network(&self) -> anyhow::Result<NeuralNetwork> {
        let data = self
            .source
            .fetch(&self.paths.model)
            .await
            .context("failed to load model weights")?;

        NeuralNetwork::from_safetensors(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use nn::activation::Sigmoid;
    use nn::layer::NeuralLayer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingSource {
        files: HashMap<String, Vec<u8>>,
        requests: RefCell<Vec<String>>,
    }

    impl RecordingSource {
        fn with_file(mut self, path: &str, data: &[u8]) -> Self {
            self.files.insert(path.to_string(), data.to_vec());
            self
        }
    }

    #[async_trait(?Send)]
    impl AssetSource for RecordingSource {
        async fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>> {
            self.requests.borrow_mut().push(path.to_string());
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("404 Not Found"))
        }
    }

    const MODULE: &[u8] = b"\0asm\x01\0\0\0";

    #[test]
    fn test_fetch_binary_requests_binary_path_only() {
        let paths = AssetPaths::default();
        let source = RecordingSource::default().with_file(&paths.wasm_binary, MODULE);
        let bootstrap = Bootstrap::new(source, paths.clone());

        let payload = block_on(bootstrap.fetch_binary()).unwrap();

        assert_eq!(payload.binary, MODULE);
        assert_eq!(payload.glue_script, paths.glue_script);
        assert_eq!(
            *bootstrap.source.requests.borrow(),
            vec![paths.wasm_binary.clone()]
        );
    }

    #[test]
    fn test_glue_script_is_requested_after_binary() {
        let paths = AssetPaths::default();
        let source = RecordingSource::default()
            .with_file(&paths.wasm_binary, MODULE)
            .with_file(&paths.glue_script, b"let wasm_bindgen;");
        let bootstrap = Bootstrap::new(source, paths.clone());

        let payload = block_on(bootstrap.fetch_binary()).unwrap();
        let script = block_on(bootstrap.load_glue_script(&payload)).unwrap();

        assert_eq!(script, "let wasm_bindgen;");
        assert_eq!(
            *bootstrap.source.requests.borrow(),
            vec![paths.wasm_binary.clone(), paths.glue_script.clone()]
        );
    }

    #[test]
    fn test_missing_glue_script() {
        let paths = AssetPaths::default();
        let source = RecordingSource::default().with_file(&paths.wasm_binary, MODULE);
        let bootstrap = Bootstrap::new(source, paths);

        let payload = block_on(bootstrap.fetch_binary()).unwrap();
        let err = block_on(bootstrap.load_glue_script(&payload)).unwrap_err();
        assert_eq!(err.to_string(), "failed to load glue script");
    }

    #[test]
    fn test_failed_binary_fetch_surfaces_error() {
        let bootstrap = Bootstrap::new(RecordingSource::default(), AssetPaths::default());

        let err = block_on(bootstrap.fetch_binary()).unwrap_err();
        assert_eq!(err.to_string(), "failed to load wasm binary");
        assert_eq!(format!("{:#}", err), "failed to load wasm binary: 404 Not Found");
    }

    #[test]
    fn test_html_error_page_is_not_a_module() {
        let paths = AssetPaths::default();
        let source =
            RecordingSource::default().with_file(&paths.wasm_binary, b"<html>not found</html>");

        let err = block_on(Bootstrap::new(source, paths).fetch_binary()).unwrap_err();
        assert!(err.to_string().contains("is not a wasm module"));
    }

    #[test]
    fn test_load_dataset() {
        let csv = b"sepal_length,sepal_width,petal_length,petal_width,class\n\
                    5.1,3.5,1.4,0.2,setosa\n";
        let paths = AssetPaths::default();
        let source = RecordingSource::default().with_file(&paths.dataset, csv);
        let bootstrap = Bootstrap::new(source, paths);

        let dataset = block_on(bootstrap.load_dataset()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(
            *bootstrap.source.requests.borrow(),
            vec!["/dataset/iris.csv".to_string()]
        );
    }

    #[test]
    fn test_load_dataset_rejects_binary_garbage() {
        let paths = AssetPaths::default();
        let source = RecordingSource::default().with_file(&paths.dataset, &[0xff, 0xfe]);

        let err = block_on(Bootstrap::new(source, paths).load_dataset()).unwrap_err();
        assert_eq!(err.to_string(), "dataset is not valid utf-8");
    }

    #[test]
    fn test_load_network() {
        let mut network = NeuralNetwork::new(Vec::new());
        network
            .add_layer(NeuralLayer::with_rng(
                3,
                4,
                Sigmoid,
                &mut StdRng::seed_from_u64(5),
            ))
            .unwrap();
        let weights = state_dict::to_safetensors(&network).unwrap();

        let paths = AssetPaths::default();
        let source = RecordingSource::default().with_file(&paths.model, &weights);
        let restored = block_on(Bootstrap::new(source, paths).load_network()).unwrap();

        assert_eq!(restored.layers()[0].weights(), network.layers()[0].weights());
    }
}

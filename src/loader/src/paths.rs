pub const WASM_BINARY_PATH: &str = "./wasm/iris_wasm_bg.wasm";
pub const GLUE_SCRIPT_PATH: &str = "./wasm/iris_wasm.js";
pub const DATASET_PATH: &str = "/dataset/iris.csv";
pub const MODEL_PATH: &str = "/model/iris.safetensors";

/// Locations of everything the worker pulls in at start-up, relative to the
/// page (or to a directory on disk for native use).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    pub wasm_binary: String,
    pub glue_script: String,
    pub dataset: String,
    pub model: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        AssetPaths {
            wasm_binary: WASM_BINARY_PATH.to_string(),
            glue_script: GLUE_SCRIPT_PATH.to_string(),
            dataset: DATASET_PATH.to_string(),
            model: MODEL_PATH.to_string(),
        }
    }
}

/// Joins `path` onto `base` with exactly one `/` between them. Absolute URLs
/// and an empty base return `path` unchanged.
pub fn resolve(base: &str, path: &str) -> String {
    if base.is_empty() || path.contains("://") {
        return path.to_string();
    }

    let path = path.strip_prefix("./").unwrap_or(path);

    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

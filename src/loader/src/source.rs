use crate::paths::resolve;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use log::{debug, warn};
use std::future::Future;
use std::path::PathBuf;
use tokio::sync::mpsc;

#[async_trait(?Send)]
pub trait AssetSource {
    async fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>>;
}

/// Fetches assets over HTTP with `ehttp` (browser `fetch` on wasm).
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    retries: usize,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpSource {
            base_url: base_url.into(),
            retries: 2,
        }
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    pub fn url(&self, path: &str) -> String {
        resolve(&self.base_url, path)
    }
}

pub async fn fetch_url(url: &str) -> anyhow::Result<ehttp::Response> {
    let (tx, rx) = mpsc::unbounded_channel();

    let request = ehttp::Request::get(url);
    ehttp::fetch(request, move |result: ehttp::Result<ehttp::Response>| {
        // The receiver only goes away if the caller stopped waiting.
        let _ = tx.send(result);
    });

    recv_response(url, rx).await
}

pub(crate) async fn recv_response(
    url: &str,
    mut rx: mpsc::UnboundedReceiver<ehttp::Result<ehttp::Response>>,
) -> anyhow::Result<ehttp::Response> {
    rx.recv()
        .await
        .ok_or_else(|| anyhow!("fetch of {} finished without a response", url))?
        .map_err(|err| anyhow!("fetch of {} failed: {}", url, err))
}

pub async fn get_data(url: &str) -> anyhow::Result<Vec<u8>> {
    response_bytes(url, fetch_url(url).await?)
}

/// Non-2xx responses are errors carrying the status text.
pub fn response_bytes(url: &str, response: ehttp::Response) -> anyhow::Result<Vec<u8>> {
    if !response.ok {
        return Err(anyhow!(
            "{} ({}) for {}",
            response.status_text,
            response.status,
            url
        ));
    }

    Ok(response.bytes)
}

/// Runs `attempt` until it succeeds, at most `retries + 1` times.
pub(crate) async fn with_retries<F, Fut>(
    url: &str,
    retries: usize,
    mut attempt: F,
) -> anyhow::Result<Vec<u8>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<Vec<u8>>>,
{
    let mut n_retries = 0;
    loop {
        match attempt().await {
            Ok(bytes) => return Ok(bytes),
            Err(err) if n_retries < retries => {
                warn!("retrying {} after error: {}", url, err);
                n_retries += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[async_trait(?Send)]
impl AssetSource for HttpSource {
    async fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        let url = self.url(path);
        debug!("fetching {}", url);

        with_retries(&url, self.retries, || get_data(&url)).await
    }
}

/// Reads assets from a directory laid out like the web root.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSource { root: root.into() }
    }

    pub fn file_path(&self, path: &str) -> PathBuf {
        let relative = path.strip_prefix("./").unwrap_or(path);
        self.root.join(relative.trim_start_matches('/'))
    }
}

#[async_trait(?Send)]
impl AssetSource for FileSource {
    async fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        let file_path = self.file_path(path);
        debug!("reading {}", file_path.display());

        std::fs::read(&file_path).with_context(|| format!("failed to read {}", file_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;
    use std::fs;

    fn response(ok: bool, status: u16, status_text: &str, bytes: &[u8]) -> ehttp::Response {
        ehttp::Response {
            url: "http://host/wasm/iris_wasm_bg.wasm".to_string(),
            ok,
            status,
            status_text: status_text.to_string(),
            headers: ehttp::Headers::default(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_dropped_fetch_is_an_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(tx);

        let err = block_on(recv_response("http://host/iris.csv", rx)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "fetch of http://host/iris.csv finished without a response"
        );
    }

    #[test]
    fn test_network_error_is_reported() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(Err("connection refused".to_string())).unwrap();

        let err = block_on(recv_response("http://host/a.wasm", rx)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "fetch of http://host/a.wasm failed: connection refused"
        );
    }

    #[test]
    fn test_not_found_is_an_error() {
        let url = "http://host/wasm/iris_wasm_bg.wasm";

        let err = response_bytes(url, response(false, 404, "Not Found", b"missing")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Not Found (404) for http://host/wasm/iris_wasm_bg.wasm"
        );
        assert_eq!(
            response_bytes(url, response(true, 200, "OK", b"\0asm")).unwrap(),
            b"\0asm"
        );
    }

    #[test]
    fn test_retries_stop_after_limit() {
        let attempts = Cell::new(0);

        let err = block_on(with_retries("http://host/a.wasm", 2, || {
            attempts.set(attempts.get() + 1);
            async { Err::<Vec<u8>, _>(anyhow!("Service Unavailable (503)")) }
        }))
        .unwrap_err();

        assert_eq!(attempts.get(), 3);
        assert_eq!(err.to_string(), "Service Unavailable (503)");
    }

    #[test]
    fn test_retry_recovers() {
        let attempts = Cell::new(0);

        let bytes = block_on(with_retries("http://host/a.wasm", 2, || {
            attempts.set(attempts.get() + 1);
            let n = attempts.get();
            async move {
                match n {
                    1 => Err(anyhow!("flaky")),
                    _ => Ok(vec![n as u8]),
                }
            }
        }))
        .unwrap();

        assert_eq!(attempts.get(), 2);
        assert_eq!(bytes, vec![2]);
    }

    #[test]
    fn test_zero_retries_tries_once() {
        let attempts = Cell::new(0);

        assert!(block_on(with_retries("http://host/a.wasm", 0, || {
            attempts.set(attempts.get() + 1);
            async { Err::<Vec<u8>, _>(anyhow!("down")) }
        }))
        .is_err());
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn test_http_url() {
        let source = HttpSource::new("http://localhost:8000/");

        assert_eq!(
            source.url("./wasm/iris_wasm_bg.wasm"),
            "http://localhost:8000/wasm/iris_wasm_bg.wasm"
        );
    }

    #[test]
    fn test_file_source() {
        let root = std::env::temp_dir().join(format!("loader-file-source-{}", std::process::id()));
        fs::create_dir_all(root.join("dataset")).unwrap();
        fs::write(root.join("dataset/iris.csv"), b"header\n").unwrap();

        let source = FileSource::new(&root);
        assert_eq!(block_on(source.fetch("/dataset/iris.csv")).unwrap(), b"header\n");
        assert_eq!(block_on(source.fetch("./dataset/iris.csv")).unwrap(), b"header\n");

        let err = block_on(source.fetch("/missing.csv")).unwrap_err();
        assert!(err.to_string().starts_with("failed to read"));

        fs::remove_dir_all(root).unwrap();
    }
}

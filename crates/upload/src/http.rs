//! `reqwest`-backed [`MintBackend`].

use std::time::Duration;

use assetmint_protocol::constants::{COMPLETE_PATH, MINT_PATH, PREPARE_PATH};
use assetmint_protocol::messages::{
    CompleteUploadRequest, CompleteUploadResponse, PrepareUploadRequest, PrepareUploadResponse,
    StartMintRequest, StartMintResponse,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::backend::{BackendError, BackendFuture, MintBackend};

/// HTTP client for the upload and mint API.
///
/// Every request carries `Authorization: Bearer <api_key>` when a key is
/// configured.
#[derive(Clone)]
pub struct HttpMintBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpMintBackend {
    /// Creates a backend rooted at `base_url`.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        if !api_key.is_empty() {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {api_key}"))
                    .map_err(|_| BackendError::InvalidKey)?,
            );
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POSTs `body` as JSON and decodes the JSON answer.
    async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "backend request");
        let resp = self.http.post(&url).json(body).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl MintBackend for HttpMintBackend {
    fn prepare_upload<'a>(
        &'a self,
        request: &'a PrepareUploadRequest,
    ) -> BackendFuture<'a, PrepareUploadResponse> {
        Box::pin(self.post(PREPARE_PATH, request))
    }

    fn complete_upload<'a>(
        &'a self,
        request: &'a CompleteUploadRequest,
    ) -> BackendFuture<'a, CompleteUploadResponse> {
        Box::pin(self.post(COMPLETE_PATH, request))
    }

    fn start_mint<'a>(
        &'a self,
        request: &'a StartMintRequest,
    ) -> BackendFuture<'a, StartMintResponse> {
        Box::pin(self.post(MINT_PATH, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetmint_protocol::types::{ContentCategory, MintMetadata, UploadSource};
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Starts a mock HTTP server that captures one request and answers
    /// with `status` and a JSON `body`.
    async fn mock_server(
        status: u16,
        body: &str,
    ) -> (String, Arc<Mutex<String>>, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}/api/");
        let body = body.to_string();
        let captured = Arc::new(Mutex::new(String::new()));
        let cap = Arc::clone(&captured);

        let handle = tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut data = Vec::new();
                let mut buf = vec![0u8; 8192];
                let (head_end, content_length) = loop {
                    let n = stream.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        return;
                    }
                    data.extend_from_slice(&buf[..n]);
                    if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
                        let head = String::from_utf8_lossy(&data[..pos]).to_lowercase();
                        let len = head
                            .lines()
                            .find_map(|l| l.strip_prefix("content-length:"))
                            .and_then(|v| v.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        break (pos + 4, len);
                    }
                };
                while data.len() < head_end + content_length {
                    let n = stream.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    data.extend_from_slice(&buf[..n]);
                }
                *cap.lock().unwrap() = String::from_utf8_lossy(&data).into_owned();

                let resp = format!(
                    "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(resp.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (url, captured, handle)
    }

    fn backend(url: &str, key: &str) -> HttpMintBackend {
        HttpMintBackend::new(url, key, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let b = backend("https://api.example.com/v1/", "");
        assert_eq!(b.base_url(), "https://api.example.com/v1");
    }

    #[test]
    fn invalid_key_is_rejected() {
        let result = HttpMintBackend::new("http://localhost", "bad\nkey", Duration::from_secs(1));
        assert!(matches!(result, Err(BackendError::InvalidKey)));
    }

    #[tokio::test]
    async fn prepare_posts_json_with_bearer() {
        let json = r#"{"fileId":"f1","uploadId":"u1","chunkCount":1,"chunkSize":1024,"parts":[{"partNumber":1,"url":"https://s3/1"}]}"#;
        let (url, captured, handle) = mock_server(200, json).await;

        let req = PrepareUploadRequest {
            device_id: "dev-1".into(),
            metadata: r#"{"title":"Test"}"#.into(),
            category: ContentCategory::Image,
            source: UploadSource::Upload,
            size: 10,
            private: Some(false),
        };
        let resp = backend(&url, "secret").prepare_upload(&req).await.unwrap();
        assert_eq!(resp.file_id, "f1");
        assert_eq!(resp.parts.len(), 1);

        let raw = captured.lock().unwrap().clone();
        assert!(raw.starts_with("POST /api/uploads/prepare"));
        assert!(raw.to_lowercase().contains("authorization: bearer secret"));
        assert!(raw.contains(r#""deviceId":"dev-1""#));
        assert!(raw.contains(r#""source":"upload""#));

        handle.abort();
    }

    #[tokio::test]
    async fn complete_hits_complete_path() {
        let (url, captured, handle) = mock_server(200, r#"{"status":"success"}"#).await;

        let req = CompleteUploadRequest {
            file_id: "f1".into(),
            mime_type: "image/png".into(),
            chunks: vec![],
            disable_thumbnail: None,
        };
        let resp = backend(&url, "").complete_upload(&req).await.unwrap();
        assert!(resp.is_success());

        let raw = captured.lock().unwrap().clone();
        assert!(raw.starts_with("POST /api/uploads/complete"));
        assert!(!raw.to_lowercase().contains("authorization:"));

        handle.abort();
    }

    #[tokio::test]
    async fn start_mint_parses_optional_fields() {
        let (url, captured, handle) =
            mock_server(200, r#"{"status":"queued","contractAddress":"0xabc"}"#).await;

        let req = StartMintRequest {
            file_id: "f1".into(),
            editions: Some(1),
            contract_id: Some("col-1".into()),
            share_with_community: None,
            metadata: MintMetadata::default(),
        };
        let resp = backend(&url, "k").start_mint(&req).await.unwrap();
        assert_eq!(resp.status.as_deref(), Some("queued"));
        assert_eq!(resp.contract_address.as_deref(), Some("0xabc"));
        assert!(resp.token_id.is_none());
        assert!(captured.lock().unwrap().starts_with("POST /api/mints"));

        handle.abort();
    }

    #[tokio::test]
    async fn error_status_maps_to_api_error() {
        let (url, _captured, handle) = mock_server(403, r#"{"error":"forbidden"}"#).await;

        let req = CompleteUploadRequest {
            file_id: "f1".into(),
            mime_type: "image/png".into(),
            chunks: vec![],
            disable_thumbnail: None,
        };
        let err = backend(&url, "k").complete_upload(&req).await.unwrap_err();
        match err {
            BackendError::Api { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("forbidden"));
            }
            other => panic!("unexpected: {other:?}"),
        }

        handle.abort();
    }

    #[tokio::test]
    async fn malformed_body_is_json_error() {
        let (url, _captured, handle) = mock_server(200, "not json").await;

        let req = StartMintRequest {
            file_id: "f1".into(),
            editions: None,
            contract_id: None,
            share_with_community: None,
            metadata: MintMetadata::default(),
        };
        let err = backend(&url, "k").start_mint(&req).await.unwrap_err();
        assert!(matches!(err, BackendError::Json(_)));

        handle.abort();
    }
}

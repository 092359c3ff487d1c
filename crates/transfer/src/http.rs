//! `reqwest`-backed chunk sink.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use assetmint_protocol::constants::CHUNK_CONTENT_TYPE;
use bytes::Bytes;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tracing::trace;

use crate::transport::{ByteProgress, ChunkSink, Headers};
use crate::{AttemptError, PROGRESS_FRAME_SIZE, TransferError};

/// PUTs chunks to pre-signed URLs over HTTP.
///
/// The body is streamed in [`PROGRESS_FRAME_SIZE`] frames so progress can
/// be reported while the request is being written. Pre-signed URLs carry
/// their own authorization, so no auth header is added.
#[derive(Clone)]
pub struct ReqwestChunkSink {
    http: reqwest::Client,
}

impl ReqwestChunkSink {
    /// Creates a sink whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransferError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Wraps an existing client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

/// Splits `body` into [`PROGRESS_FRAME_SIZE`] frames sharing its buffer.
fn split_frames(body: &Bytes) -> Vec<Bytes> {
    (0..body.len())
        .step_by(PROGRESS_FRAME_SIZE)
        .map(|start| body.slice(start..(start + PROGRESS_FRAME_SIZE).min(body.len())))
        .collect()
}

impl ChunkSink for ReqwestChunkSink {
    fn put<'a>(
        &'a self,
        url: &'a str,
        body: &'a [u8],
        progress: ByteProgress,
    ) -> Pin<Box<dyn Future<Output = Result<Headers, AttemptError>> + Send + 'a>> {
        Box::pin(async move {
            let total = body.len() as u64;
            let frames = split_frames(&Bytes::copy_from_slice(body));

            let mut loaded: u64 = 0;
            let stream = futures_util::stream::iter(frames.into_iter().map(move |frame| {
                loaded += frame.len() as u64;
                progress(loaded, total);
                Ok::<_, std::io::Error>(frame)
            }));

            let resp = self
                .http
                .put(url)
                .header(CONTENT_TYPE, CHUNK_CONTENT_TYPE)
                .header(CONTENT_LENGTH, total)
                .body(reqwest::Body::wrap_stream(stream))
                .send()
                .await
                .map_err(|e| AttemptError::Network(e.to_string()))?;

            let status = resp.status();
            trace!(status = status.as_u16(), bytes = total, "chunk PUT response");
            if !status.is_success() {
                return Err(AttemptError::Status(status.as_u16()));
            }

            let headers = resp
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            Ok(headers)
        })
    }
}

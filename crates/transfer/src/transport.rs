use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{AttemptError, TransferError};

/// Response headers of a PUT, keyed by header name.
pub type Headers = HashMap<String, String>;

/// Byte-level progress of one PUT: `(loaded, total)`.
pub type ByteProgress = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Fractional progress of one chunk transfer, `0.0..=1.0`.
pub type ChunkProgress = Arc<dyn Fn(f64) + Send + Sync>;

/// Performs a single raw-binary PUT.
///
/// Implemented over `reqwest` by [`ReqwestChunkSink`](crate::ReqwestChunkSink);
/// tests substitute scripted sinks. A sink reports
/// [`AttemptError::Aborted`] when its own abort mechanism fired.
pub trait ChunkSink: Send + Sync {
    /// PUTs `body` to `url` and returns the response headers on a 2xx.
    fn put<'a>(
        &'a self,
        url: &'a str,
        body: &'a [u8],
        progress: ByteProgress,
    ) -> Pin<Box<dyn Future<Output = Result<Headers, AttemptError>> + Send + 'a>>;
}

/// Retry schedule for a chunk PUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles per attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay after the failed attempt with 0-based index `attempt_index`.
    pub fn delay_for_attempt(&self, attempt_index: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt_index).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Extracts the ETag from response headers.
///
/// The lookup ignores header-name case. One leading and one trailing
/// quote (single or double) are removed. Returns an empty string when the
/// header is absent.
pub fn extract_integrity_token(headers: &Headers) -> String {
    let Some(raw) = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("etag"))
        .map(|(_, value)| value.trim())
    else {
        return String::new();
    };

    let unquoted = raw.strip_prefix(['"', '\'']).unwrap_or(raw);
    let unquoted = unquoted.strip_suffix(['"', '\'']).unwrap_or(unquoted);
    unquoted.to_string()
}

/// Uploads single chunks with bounded retry and exponential backoff.
#[derive(Clone)]
pub struct ChunkTransport {
    sink: Arc<dyn ChunkSink>,
    policy: RetryPolicy,
}

impl ChunkTransport {
    /// Creates a transport with the default policy (3 attempts, 1 s base).
    pub fn new(sink: Arc<dyn ChunkSink>) -> Self {
        Self::with_policy(sink, RetryPolicy::default())
    }

    pub fn with_policy(sink: Arc<dyn ChunkSink>, policy: RetryPolicy) -> Self {
        Self { sink, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// PUTs `bytes` to `url` and returns the normalized integrity token.
    ///
    /// Cancellation is checked before every attempt, raced against the
    /// in-flight request and against every backoff sleep. A missing ETag
    /// counts as a failed attempt.
    pub async fn send(
        &self,
        url: &str,
        bytes: &[u8],
        on_progress: Option<ChunkProgress>,
        cancel: &CancellationToken,
    ) -> Result<String, TransferError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let progress: ByteProgress = match on_progress {
            Some(cb) => Arc::new(move |loaded, total| {
                if total > 0 {
                    cb((loaded as f64 / total as f64).clamp(0.0, 1.0));
                }
            }),
            None => Arc::new(|_, _| {}),
        };

        let mut attempt: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(TransferError::Cancelled);
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TransferError::Cancelled),
                result = self.sink.put(url, bytes, Arc::clone(&progress)) => result,
            };

            let failure = match outcome {
                Ok(headers) => {
                    let token = extract_integrity_token(&headers);
                    if !token.is_empty() {
                        debug!(attempt = attempt + 1, bytes = bytes.len(), "chunk uploaded");
                        return Ok(token);
                    }
                    AttemptError::MissingIntegrityToken
                }
                Err(AttemptError::Aborted) => return Err(TransferError::Cancelled),
                Err(e) => e,
            };

            attempt += 1;
            if attempt >= max_attempts {
                warn!(attempts = attempt, error = %failure, "chunk upload retries exhausted");
                return Err(TransferError::RetriesExhausted {
                    attempts: attempt,
                    last: failure,
                });
            }

            let delay = self.policy.delay_for_attempt(attempt - 1);
            warn!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "chunk upload attempt failed, retrying"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TransferError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

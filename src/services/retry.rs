//! Bounded retry with exponential backoff around document extraction.

use std::time::Duration;

use serde_json::Value;

use crate::domain::EncodedDocument;
use crate::providers::ai::{DocumentExtractor, ExtractResult};

/// How rate-limited extraction calls are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total calls made, including the first.
    pub max_attempts: u32,
    /// Sleep before the second attempt. Doubles after each retry.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(5),
        }
    }
}

/// Calls the extractor, retrying only on rate limiting.
///
/// Any other error is returned immediately. A rate limit on the final
/// attempt is returned as-is.
pub async fn extract_with_retry(
    extractor: &dyn DocumentExtractor,
    document: &EncodedDocument,
    policy: RetryPolicy,
) -> ExtractResult<Value> {
    let mut backoff = policy.initial_backoff;
    let mut attempt = 1;

    loop {
        match extractor.extract(document).await {
            Err(e) if e.is_rate_limited() && attempt < policy.max_attempts => {
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    backoff_secs = backoff.as_secs_f64(),
                    "Extraction rate limited, backing off"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ai::{ExtractionError, MockDocumentExtractor};
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn document() -> EncodedDocument {
        EncodedDocument {
            media_type: "application/pdf".to_string(),
            data: "JVBERg==".to_string(),
        }
    }

    /// Mock that is rate limited for the first `limited` calls, then succeeds.
    fn limited_then_ok(limited: u32, calls: Arc<AtomicU32>) -> MockDocumentExtractor {
        let mut mock = MockDocumentExtractor::new();
        mock.expect_extract().returning(move |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < limited {
                Err(ExtractionError::RateLimited)
            } else {
                Ok(json!({"ok": true}))
            }
        });
        mock
    }

    #[tokio::test(start_paused = true)]
    async fn two_rate_limits_then_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let mock = limited_then_ok(2, calls.clone());

        let started = tokio::time::Instant::now();
        let value = extract_with_retry(&mock, &document(), RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(value, json!({"ok": true}));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 5s then 10s
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(15));
        assert!(elapsed < Duration::from_secs(16));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_on_last_attempt_is_returned() {
        let calls = Arc::new(AtomicU32::new(0));
        let mock = limited_then_ok(10, calls.clone());

        let err = extract_with_retry(&mock, &document(), RetryPolicy::default())
            .await
            .unwrap_err();

        assert!(err.is_rate_limited());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn other_errors_are_not_retried() {
        let mut mock = MockDocumentExtractor::new();
        mock.expect_extract().times(1).returning(|_| {
            Err(ExtractionError::Upstream {
                status: 400,
                message: "bad request".to_string(),
            })
        });

        let started = tokio::time::Instant::now();
        let err = extract_with_retry(&mock, &document(), RetryPolicy::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Upstream { status: 400, .. }));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn success_on_first_attempt() {
        let mut mock = MockDocumentExtractor::new();
        mock.expect_extract()
            .times(1)
            .returning(|_| Ok(json!({"a": 1})));

        let value = extract_with_retry(&mock, &document(), RetryPolicy::default())
            .await
            .unwrap();
        assert_eq!(value, json!({"a": 1}));
    }
}

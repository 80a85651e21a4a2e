// src/services/fetcher.rs

//! Paced, retrying JSON fetcher for the Are.na API.
//!
//! Every attempt, the first one included, waits `request_delay_ms` before it
//! goes out. Transient failures (retryable statuses, transport and decode
//! errors) are retried with exponential backoff until `max_attempts` is spent;
//! anything else fails on the spot.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::{ErrorClass, FetchError};
use crate::models::{ApiConfig, FetchConfig};

/// Anything that can resolve an API path to a JSON document.
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// Fetch `path` (relative to the API base) and decode it as JSON.
    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError>;
}

/// HTTP implementation of [`JsonSource`] with pacing and backoff.
pub struct RetryFetcher {
    client: Client,
    base_url: String,
    policy: FetchConfig,
}

impl RetryFetcher {
    /// Create a fetcher over a client that already carries auth headers.
    pub fn new(client: Client, api: &ApiConfig, policy: FetchConfig) -> Self {
        Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            policy,
        }
    }

    /// Wait before retrying after failed attempt `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.policy.backoff_base_ms.saturating_mul(factor))
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// One request, no retries.
    async fn attempt(&self, url: &str) -> Result<Value, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl JsonSource for RetryFetcher {
    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.url_for(path);
        let pacing = Duration::from_millis(self.policy.request_delay_ms);
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            if !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }

            let error = match self.attempt(&url).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            match error.class(&self.policy.retryable_statuses) {
                ErrorClass::Fatal => return Err(error),
                ErrorClass::Transient if attempt < max_attempts => {
                    let delay = self.backoff_delay(attempt);
                    log::warn!(
                        "Retry {}/{} for {} ({}), waiting {:?}",
                        attempt,
                        max_attempts,
                        url,
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                ErrorClass::Transient => {
                    return Err(FetchError::Exhausted {
                        url,
                        attempts: attempt,
                        last: Box::new(error),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::utils::http::create_async_client;

    fn fast_policy(max_attempts: u32) -> FetchConfig {
        FetchConfig {
            request_delay_ms: 0,
            max_attempts,
            backoff_base_ms: 0,
            ..FetchConfig::default()
        }
    }

    fn fetcher(server: &MockServer, policy: FetchConfig) -> RetryFetcher {
        let api = ApiConfig {
            base_url: format!("{}/v2/", server.uri()),
            ..ApiConfig::default()
        };
        let client = create_async_client(&api, "secret").unwrap();
        RetryFetcher::new(client, &api, policy)
    }

    async fn request_count(server: &MockServer) -> usize {
        server.received_requests().await.unwrap_or_default().len()
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let api = ApiConfig::default();
        let fetcher = RetryFetcher::new(Client::new(), &api, FetchConfig::default());
        assert_eq!(fetcher.backoff_delay(1), Duration::from_secs(10));
        assert_eq!(fetcher.backoff_delay(2), Duration::from_secs(20));
        assert_eq!(fetcher.backoff_delay(3), Duration::from_secs(40));
        assert_eq!(fetcher.backoff_delay(4), Duration::from_secs(80));
    }

    #[tokio::test]
    async fn test_fetch_sends_bearer_and_decodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/channels/stones/contents"))
            .and(query_param("page", "2"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"contents": [{"id": 1}]})))
            .expect(1)
            .mount(&server)
            .await;

        let value = fetcher(&server, fast_policy(5))
            .fetch_json("/channels/stones/contents?per=50&page=2")
            .await
            .unwrap();
        assert_eq!(value["contents"][0]["id"], 1);
    }

    #[tokio::test]
    async fn test_transient_status_is_retried() {
        let server = MockServer::start().await;
        Mock::given(path("/v2/users/1/channels"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(path("/v2/users/1/channels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"channels": []})))
            .mount(&server)
            .await;

        let value = fetcher(&server, fast_policy(5))
            .fetch_json("/users/1/channels")
            .await
            .unwrap();
        assert_eq!(value, json!({"channels": []}));
        assert_eq!(request_count(&server).await, 3);
    }

    #[tokio::test]
    async fn test_client_error_fails_without_retry() {
        let server = MockServer::start().await;
        Mock::given(path("/v2/channels/missing/contents"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher(&server, fast_policy(5))
            .fetch_json("/channels/missing/contents")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert_eq!(request_count(&server).await, 1);
    }

    #[tokio::test]
    async fn test_exhaustion_wraps_last_cause() {
        let server = MockServer::start().await;
        Mock::given(path("/v2/flaky"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = fetcher(&server, fast_policy(3))
            .fetch_json("/flaky")
            .await
            .unwrap_err();
        match err {
            FetchError::Exhausted { attempts, last, .. } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, FetchError::Status { status: 502, .. }));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(request_count(&server).await, 3);
    }

    #[tokio::test]
    async fn test_first_attempt_is_paced() {
        let server = MockServer::start().await;
        Mock::given(path("/v2/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let policy = FetchConfig {
            request_delay_ms: 100,
            ..fast_policy(1)
        };
        let started = std::time::Instant::now();
        fetcher(&server, policy).fetch_json("/ok").await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_pacing_and_backoff_are_slept() {
        let server = MockServer::start().await;
        Mock::given(path("/v2/busy"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(path("/v2/busy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let policy = FetchConfig {
            request_delay_ms: 100,
            backoff_base_ms: 50,
            ..fast_policy(3)
        };
        let started = std::time::Instant::now();
        let value = fetcher(&server, policy).fetch_json("/busy").await.unwrap();

        // two paced attempts plus one backoff of 50 * 2^1
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert_eq!(value, json!({"ok": true}));
        assert_eq!(request_count(&server).await, 2);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        let api = ApiConfig {
            base_url: "http://127.0.0.1:1/v2".into(),
            ..ApiConfig::default()
        };
        let client = create_async_client(&api, "secret").unwrap();
        let fetcher = RetryFetcher::new(client, &api, fast_policy(2));

        let err = fetcher.fetch_json("/users/1/channels").await.unwrap_err();
        match err {
            FetchError::Exhausted { attempts, last, .. } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*last, FetchError::Transport { .. }));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_retried() {
        let server = MockServer::start().await;
        Mock::given(path("/v2/garbled"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops"))
            .mount(&server)
            .await;

        let err = fetcher(&server, fast_policy(2))
            .fetch_json("/garbled")
            .await
            .unwrap_err();
        match err {
            FetchError::Exhausted { attempts, last, .. } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*last, FetchError::Decode { .. }));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }
}

//! Cohere embeddings implementation with key rotation and backoff.
//!
//! The provider enforces per-minute and per-month quotas per API key, so the
//! client carries a pool of keys: transient limits wait out a cooldown on the
//! same key, exhausted or unauthorized keys are removed from the pool for the
//! rest of the process lifetime.

use super::{Embedder, EmbeddingKind, InputType};
use crate::config::EmbeddingSettings;
use crate::error::{MinneError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default Cohere v2 embed endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.cohere.com/v2/embed";

/// Default embedding model.
pub const DEFAULT_MODEL: &str = "embed-english-v3.0";

const DEFAULT_MAX_RETRIES: usize = 45;
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// What to do after a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait out a provider-imposed cooldown, then retry with the same key.
    Cooldown(Duration),
    /// Remove the key from the pool permanently and retry immediately.
    RemoveKey,
    /// Linear backoff scaled by the attempt count, then advance to the next key.
    Backoff,
}

/// Classify a failed embedding response into a retry decision.
///
/// The provider distinguishes quota types only in the free-text body, so the
/// string matching lives here and nowhere else.
pub fn classify_failure(status: u16, body: &str) -> RetryDecision {
    match status {
        429 => {
            if body.contains("calls / month") || body.contains("calls per month") {
                RetryDecision::RemoveKey
            } else if body.contains("calls / minute") {
                RetryDecision::Cooldown(Duration::from_secs(20))
            } else if body.contains("try again later") {
                RetryDecision::Cooldown(Duration::from_secs(10))
            } else {
                RetryDecision::Backoff
            }
        }
        401 => RetryDecision::RemoveKey,
        _ => RetryDecision::Backoff,
    }
}

/// Shared pool of provider API keys.
///
/// Holds a working list drawn from a master pool. Keys removed for quota or
/// authorization failures are gone from both lists until restart; the working
/// list is refilled from the master pool when it runs dry.
pub struct KeyPool {
    inner: Mutex<KeyPoolInner>,
}

struct KeyPoolInner {
    working: Vec<String>,
    master: Vec<String>,
}

impl KeyPool {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            inner: Mutex::new(KeyPoolInner {
                working: keys.clone(),
                master: keys,
            }),
        }
    }

    /// The key to use for the next request, refilling the working list from
    /// the master pool if needed.
    pub fn current(&self) -> Result<String> {
        let mut inner = self.inner.lock().unwrap();
        if inner.working.is_empty() {
            debug!("Working key list empty, refilling from master pool");
            inner.working = inner.master.clone();
        }
        inner
            .working
            .first()
            .cloned()
            .ok_or(MinneError::KeysExhausted)
    }

    /// Move past the current working key without removing it from the master
    /// pool.
    pub fn advance(&self) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.working.is_empty() {
            inner.working.remove(0);
        }
    }

    /// Remove a key from both lists permanently. Remove-if-present, so
    /// concurrent callers racing on the same key are harmless.
    pub fn remove(&self, key: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.working.retain(|k| k != key);
        inner.master.retain(|k| k != key);
        warn!("Removed embedding API key from pool ({} left)", inner.master.len());
    }

    /// Number of keys remaining in the master pool.
    pub fn remaining(&self) -> usize {
        self.inner.lock().unwrap().master.len()
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: &'a [&'a str],
    input_type: &'a str,
    embedding_types: [&'a str; 1],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: HashMap<String, Vec<Vec<f32>>>,
}

/// Raw reply from the embedding endpoint, before policy is applied.
pub(crate) struct ApiReply {
    pub status: u16,
    pub body: String,
}

/// Transport seam so the retry policy is testable without a network.
#[async_trait]
pub(crate) trait EmbedApi: Send + Sync {
    async fn post_embed(&self, api_key: &str, payload: &str) -> Result<ApiReply>;
}

struct HttpEmbedApi {
    client: reqwest::Client,
    endpoint: String,
}

#[async_trait]
impl EmbedApi for HttpEmbedApi {
    async fn post_embed(&self, api_key: &str, payload: &str) -> Result<ApiReply> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .header("Authorization", format!("bearer {}", api_key))
            .body(payload.to_string())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(ApiReply { status, body })
    }
}

type CacheKey = (String, String, InputType, EmbeddingKind);

/// Cohere-backed embedder with key rotation, backoff and caching.
pub struct CohereEmbedder {
    api: Box<dyn EmbedApi>,
    keys: KeyPool,
    model: String,
    kind: EmbeddingKind,
    max_retries: usize,
    base_delay: Duration,
    // Process-lifetime cache; identical requests never hit the network twice
    cache: Mutex<HashMap<CacheKey, Vec<f32>>>,
}

impl CohereEmbedder {
    /// Create a new Cohere embedder with default endpoint and model.
    pub fn new(api_keys: Vec<String>) -> Result<Self> {
        Self::with_config(api_keys, DEFAULT_ENDPOINT, DEFAULT_MODEL)
    }

    /// Create a Cohere embedder with custom endpoint and model.
    pub fn with_config(api_keys: Vec<String>, endpoint: &str, model: &str) -> Result<Self> {
        if api_keys.is_empty() {
            return Err(MinneError::Config(
                "no embedding API keys configured".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            api: Box::new(HttpEmbedApi {
                client,
                endpoint: endpoint.to_string(),
            }),
            keys: KeyPool::new(api_keys),
            model: model.to_string(),
            kind: EmbeddingKind::Float,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Build an embedder from configuration.
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        Self::with_config(settings.api_keys.clone(), &settings.endpoint, &settings.model)
    }

    /// The shared key pool.
    pub fn key_pool(&self) -> &KeyPool {
        &self.keys
    }

    #[cfg(test)]
    fn with_api(mut self, api: Box<dyn EmbedApi>, base_delay: Duration) -> Self {
        self.api = api;
        self.base_delay = base_delay;
        self
    }

    async fn embed_uncached(&self, text: &str, input_type: InputType) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: &self.model,
            texts: &[text],
            input_type: input_type.as_str(),
            embedding_types: [self.kind.as_str()],
        };
        let payload = serde_json::to_string(&request)?;

        for attempt in 0..self.max_retries {
            let api_key = self.keys.current()?;

            let reply = match self.api.post_embed(&api_key, &payload).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!("Embedding request failed: {}", e);
                    if attempt + 1 == self.max_retries {
                        return Err(e);
                    }
                    tokio::time::sleep(self.base_delay * (attempt as u32 + 1)).await;
                    self.keys.advance();
                    continue;
                }
            };

            if (200..300).contains(&reply.status) {
                let parsed: EmbedResponse = serde_json::from_str(&reply.body)?;
                let vectors = parsed
                    .embeddings
                    .get(self.kind.as_str())
                    .ok_or_else(|| {
                        MinneError::Embedding(format!(
                            "response missing '{}' embeddings",
                            self.kind.as_str()
                        ))
                    })?;
                return vectors.first().cloned().ok_or_else(|| {
                    MinneError::Embedding("empty embedding response".to_string())
                });
            }

            match classify_failure(reply.status, &reply.body) {
                RetryDecision::Cooldown(delay) => {
                    warn!(
                        "Provider rate limit (status {}), waiting {:?}",
                        reply.status, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::RemoveKey => {
                    self.keys.remove(&api_key);
                }
                RetryDecision::Backoff => {
                    let snippet: String = reply.body.chars().take(200).collect();
                    warn!(
                        "Embedding call failed (status {}): {}",
                        reply.status, snippet
                    );
                    if attempt + 1 == self.max_retries {
                        return Err(MinneError::Embedding(format!(
                            "provider error {} after {} attempts",
                            reply.status,
                            self.max_retries
                        )));
                    }
                    tokio::time::sleep(self.base_delay * (attempt as u32 + 1)).await;
                    self.keys.advance();
                }
            }
        }

        Err(MinneError::Embedding(format!(
            "failed to get embedding after {} attempts",
            self.max_retries
        )))
    }
}

#[async_trait]
impl Embedder for CohereEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str, input_type: InputType) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(MinneError::InvalidInput(
                "cannot embed empty text".to_string(),
            ));
        }

        let cache_key = (text.to_string(), self.model.clone(), input_type, self.kind);
        if let Some(cached) = self.cache.lock().unwrap().get(&cache_key) {
            debug!("Embedding cache hit");
            return Ok(cached.clone());
        }

        let embedding = self.embed_uncached(text, input_type).await?;
        self.cache
            .lock()
            .unwrap()
            .insert(cache_key, embedding.clone());
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct FakeApi {
        replies: Mutex<VecDeque<ApiReply>>,
        keys_seen: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn new(replies: Vec<ApiReply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                keys_seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EmbedApi for FakeApi {
        async fn post_embed(&self, api_key: &str, _payload: &str) -> Result<ApiReply> {
            self.keys_seen.lock().unwrap().push(api_key.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| MinneError::Embedding("fake exhausted".to_string()))
        }
    }

    fn ok_reply() -> ApiReply {
        ApiReply {
            status: 200,
            body: r#"{"embeddings": {"float": [[0.1, 0.2, 0.3]]}}"#.to_string(),
        }
    }

    fn embedder_with(keys: Vec<&str>, replies: Vec<ApiReply>) -> CohereEmbedder {
        let keys = keys.into_iter().map(String::from).collect();
        CohereEmbedder::new(keys)
            .unwrap()
            .with_api(Box::new(FakeApi::new(replies)), Duration::from_millis(1))
    }

    #[test]
    fn test_classify_monthly_quota() {
        let decision = classify_failure(429, "You have exceeded 1000 API calls / month");
        assert_eq!(decision, RetryDecision::RemoveKey);
    }

    #[test]
    fn test_classify_per_minute() {
        let decision = classify_failure(429, "limit of 100 calls / minute reached");
        assert_eq!(decision, RetryDecision::Cooldown(Duration::from_secs(20)));
    }

    #[test]
    fn test_classify_generic_429() {
        let decision = classify_failure(429, "Please wait and try again later");
        assert_eq!(decision, RetryDecision::Cooldown(Duration::from_secs(10)));

        let decision = classify_failure(429, "too many requests");
        assert_eq!(decision, RetryDecision::Backoff);
    }

    #[test]
    fn test_classify_unauthorized_and_server_error() {
        assert_eq!(classify_failure(401, "invalid api token"), RetryDecision::RemoveKey);
        assert_eq!(classify_failure(503, "service unavailable"), RetryDecision::Backoff);
    }

    #[test]
    fn test_key_pool_refill_and_exhaustion() {
        let pool = KeyPool::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(pool.current().unwrap(), "a");
        pool.advance();
        assert_eq!(pool.current().unwrap(), "b");
        // Working list runs dry, refilled from master
        pool.advance();
        assert_eq!(pool.current().unwrap(), "a");

        pool.remove("a");
        pool.remove("b");
        assert!(matches!(pool.current(), Err(MinneError::KeysExhausted)));
    }

    #[tokio::test]
    async fn test_key_rotation_on_unauthorized() {
        let embedder = embedder_with(
            vec!["key-a", "key-b"],
            vec![
                ApiReply {
                    status: 401,
                    body: "invalid api token".to_string(),
                },
                ok_reply(),
            ],
        );

        let embedding = embedder.embed("hello", InputType::Classification).await.unwrap();
        assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
        // Key A was removed permanently, only key B remains
        assert_eq!(embedder.key_pool().remaining(), 1);
        assert_eq!(embedder.key_pool().current().unwrap(), "key-b");
    }

    #[tokio::test]
    async fn test_cache_avoids_second_call() {
        let embedder = embedder_with(vec!["key-a"], vec![ok_reply()]);

        let first = embedder.embed("hello", InputType::Classification).await.unwrap();
        // The fake has no replies left; only the cache can answer
        let second = embedder.embed("hello", InputType::Classification).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_different_input_type_misses_cache() {
        let embedder = embedder_with(vec!["key-a"], vec![ok_reply(), ok_reply()]);

        embedder.embed("hello", InputType::Classification).await.unwrap();
        let result = embedder.embed("hello", InputType::SearchQuery).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_backoff_then_success() {
        let embedder = embedder_with(
            vec!["key-a"],
            vec![
                ApiReply {
                    status: 503,
                    body: "upstream hiccup".to_string(),
                },
                ok_reply(),
            ],
        );

        let embedding = embedder.embed("hi", InputType::Classification).await.unwrap();
        assert_eq!(embedding.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let embedder = embedder_with(vec!["key-a"], vec![]);
        assert!(embedder.embed("", InputType::Classification).await.is_err());
    }
}

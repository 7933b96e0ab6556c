//! Embedding providers: a local feature-hashing embedder and an HTTP client
//! for TEI / Ollama embedding servers.

use crate::{AgentError, Result};
use minirag_core::text::words;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use tracing::{debug, warn};

const DEFAULT_EMBED_PROVIDER: &str = "hash";
const DEFAULT_TEI_URL: &str = "http://localhost:8081";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_EMBED_MODEL: &str = "nomic-embed-text:latest";
const DEFAULT_TEI_MAX_BATCH: usize = 32;

/// all-MiniLM-L6-v2 width
pub const DEFAULT_HASH_DIMENSION: usize = 384;

/// Tokens this short carry no topic signal for the hashing embedder
const MIN_TOKEN_CHARS: usize = 4;

pub(crate) fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parsed value of `key`; unparsable values are logged and ignored
pub(crate) fn env_usize(key: &str) -> Option<usize> {
    let value = std::env::var(key).ok()?;
    match value.trim().parse::<usize>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a non-negative integer", key, value);
            None
        }
    }
}

/// Like [`env_usize`] for settings where zero is meaningless
pub(crate) fn env_positive_usize(key: &str) -> Option<usize> {
    env_usize(key).filter(|value| {
        if *value == 0 {
            warn!("Ignoring {}=0", key);
        }
        *value > 0
    })
}

/// Turns texts into fixed-length vectors
pub trait Embedder: Send + Sync {
    /// Embed several texts, one vector per text, in order
    fn embed_batch(&self, texts: &[String]) -> impl Future<Output = Result<Vec<Vec<f32>>>> + Send;

    /// Embed a single text
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>>> + Send {
        async move {
            let mut embeddings = self.embed_batch(&[text.to_string()]).await?;
            embeddings
                .pop()
                .ok_or_else(|| AgentError::Embedding("No embedding returned".into()))
        }
    }
}

/// Deterministic bag-of-words embedder.
///
/// Lower-cased word tokens of at least four characters are hashed (FNV-1a)
/// into `dimension` buckets and the counts are L2-normalized. Texts sharing
/// vocabulary end up close; texts sharing nothing sit at squared distance 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Dimension from `HASH_EMBED_DIM`
    pub fn from_env() -> Self {
        Self::new(env_positive_usize("HASH_EMBED_DIM").unwrap_or(DEFAULT_HASH_DIMENSION))
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in words(text).filter(|w| w.chars().count() >= MIN_TOKEN_CHARS) {
            let bucket = fnv1a(token.to_lowercase().as_bytes()) % self.dimension as u64;
            vector[bucket as usize] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSION)
    }
}

impl Embedder for HashEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TeiProvider {
    Tei,
    Ollama,
}

/// Client for a remote embeddings server
#[derive(Debug, Clone)]
pub struct TeiClient {
    client: Client,
    base_url: String,
    provider: TeiProvider,
    model: String,
    max_batch: usize,
}

impl TeiClient {
    /// Text-Embeddings-Inference server at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            provider: TeiProvider::Tei,
            model: DEFAULT_OLLAMA_EMBED_MODEL.to_string(),
            max_batch: env_positive_usize("TEI_MAX_BATCH").unwrap_or(DEFAULT_TEI_MAX_BATCH),
        }
    }

    /// Ollama server at `base_url` serving `model`
    pub fn ollama(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: TeiProvider::Ollama,
            model: model.into(),
            ..Self::new(base_url)
        }
    }

    /// TEI or Ollama client configured from `TEI_URL` / `TEI_MODEL`
    pub fn from_env(ollama: bool) -> Self {
        if ollama {
            let url = env_or_default("TEI_URL", DEFAULT_OLLAMA_URL);
            let model = env_or_default("TEI_MODEL", DEFAULT_OLLAMA_EMBED_MODEL);
            Self::ollama(url, model)
        } else {
            Self::new(env_or_default("TEI_URL", DEFAULT_TEI_URL))
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<bool> {
        let url = match self.provider {
            TeiProvider::Tei => format!("{}/health", self.base_url),
            TeiProvider::Ollama => format!("{}/api/tags", self.base_url),
        };
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }

    async fn tei_embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embed", self.base_url);
        let mut results = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.max_batch) {
            let request = TeiEmbedBatchRequest {
                inputs: chunk,
                truncate: true,
            };

            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await?;

            results.extend(parse_embeddings_response(response)?);
        }

        Ok(results)
    }

    async fn ollama_embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = OllamaEmbedRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<OllamaEmbedResponse>()
            .await?;

        Ok(response.embedding)
    }
}

impl Embedder for TeiClient {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Requesting embeddings for {} texts from {}", texts.len(), self.base_url);

        let embeddings = match self.provider {
            TeiProvider::Tei => self.tei_embed_batch(texts).await?,
            TeiProvider::Ollama => {
                let mut results = Vec::with_capacity(texts.len());
                for text in texts {
                    results.push(self.ollama_embed(text).await?);
                }
                results
            }
        };

        if embeddings.len() != texts.len() {
            return Err(AgentError::Embedding(format!(
                "Requested {} embeddings, received {}",
                texts.len(),
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }
}

/// The embedder selected by configuration
#[derive(Debug, Clone)]
pub enum ConfiguredEmbedder {
    Hash(HashEmbedder),
    Remote(TeiClient),
}

impl ConfiguredEmbedder {
    /// `hash`, `tei` or `ollama`
    pub fn from_provider(provider: &str) -> Result<Self> {
        match provider.trim().to_ascii_lowercase().as_str() {
            "hash" => Ok(Self::Hash(HashEmbedder::from_env())),
            "tei" => Ok(Self::Remote(TeiClient::from_env(false))),
            "ollama" => Ok(Self::Remote(TeiClient::from_env(true))),
            other => Err(AgentError::Embedding(format!(
                "Unknown embedding provider: {} (expected hash, tei or ollama)",
                other
            ))),
        }
    }

    /// Provider from `EMBED_PROVIDER`, defaulting to the local hashing embedder
    pub fn from_env() -> Result<Self> {
        Self::from_provider(&env_or_default("EMBED_PROVIDER", DEFAULT_EMBED_PROVIDER))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Hash(embedder) => format!("hash ({} dims)", embedder.dimension()),
            Self::Remote(client) => format!("remote ({})", client.base_url()),
        }
    }

    /// Local embedders are always available
    pub async fn health(&self) -> Result<bool> {
        match self {
            Self::Hash(_) => Ok(true),
            Self::Remote(client) => client.health().await,
        }
    }
}

impl Embedder for ConfiguredEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self {
            Self::Hash(embedder) => embedder.embed_batch(texts).await,
            Self::Remote(client) => client.embed_batch(texts).await,
        }
    }
}

#[derive(Serialize)]
struct TeiEmbedBatchRequest<'a> {
    inputs: &'a [String],
    truncate: bool,
}

#[derive(Serialize)]
struct OllamaEmbedRequest {
    model: String,
    prompt: String,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embedding: Vec<f32>,
}

fn parse_embeddings_response(value: Value) -> Result<Vec<Vec<f32>>> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                return Ok(Vec::new());
            }
            if items.first().map(|v| v.is_array()).unwrap_or(false) {
                serde_json::from_value(Value::Array(items)).map_err(|e| {
                    AgentError::Embedding(format!("Invalid TEI embeddings response: {}", e))
                })
            } else {
                let single: Vec<f32> =
                    serde_json::from_value(Value::Array(items)).map_err(|e| {
                        AgentError::Embedding(format!("Invalid TEI embedding array: {}", e))
                    })?;
                Ok(vec![single])
            }
        }
        other => Err(AgentError::Embedding(format!(
            "Unexpected TEI response format: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_hash_embedding_is_normalized_and_deterministic() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed_text("The capital of France is Paris");
        let b = embedder.embed_text("The capital of France is Paris");

        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
        assert!((dot(&a, &a) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hash_embedding_ignores_short_tokens_and_case() {
        let embedder = HashEmbedder::default();

        assert!(embedder.embed_text("is it of an").iter().all(|v| *v == 0.0));
        assert_eq!(embedder.embed_text("PARIS"), embedder.embed_text("paris"));
    }

    #[test]
    fn test_shared_words_are_closer() {
        let embedder = HashEmbedder::default();
        let query = embedder.embed_text("capital of France");
        let paris = embedder.embed_text("The capital of France is Paris.");
        let everest = embedder.embed_text("Mount Everest is the highest mountain.");

        assert!(dot(&query, &paris) > dot(&query, &everest));
    }

    #[tokio::test]
    async fn test_embed_defaults_to_batch() {
        let embedder = HashEmbedder::new(16);
        let single = embedder.embed("machine learning").await.unwrap();
        let batch = embedder
            .embed_batch(&["machine learning".to_string()])
            .await
            .unwrap();

        assert_eq!(vec![single], batch);
    }

    #[test]
    fn test_configured_provider_names() {
        assert!(matches!(
            ConfiguredEmbedder::from_provider("HASH").unwrap(),
            ConfiguredEmbedder::Hash(_)
        ));
        assert!(matches!(
            ConfiguredEmbedder::from_provider("ollama").unwrap(),
            ConfiguredEmbedder::Remote(_)
        ));
        assert!(ConfiguredEmbedder::from_provider("faiss").is_err());
    }

    #[test]
    fn test_parse_embeddings_response() {
        let batch = parse_embeddings_response(json!([[0.1, 0.2], [0.3, 0.4]])).unwrap();
        assert_eq!(batch, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);

        let single = parse_embeddings_response(json!([0.5, 0.6])).unwrap();
        assert_eq!(single, vec![vec![0.5, 0.6]]);

        assert!(parse_embeddings_response(json!({"error": "overloaded"})).is_err());
    }
}

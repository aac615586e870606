//! HTTP dictionary provider
//!
//! Talks to a hosted dictionary service with a single JSON endpoint:
//!
//! ```text
//! POST {endpoint}
//! {"source": "en", "target": "es", "words": ["house", "tree"]}
//!
//! 200 OK
//! {"entries": {"house": {...WordEntry...}, "tree": null}}
//! ```
//!
//! # Configuration
//!
//! `from_env()` reads the endpoint from `XENOLEXIA_DICTIONARY_URL` and an
//! optional bearer token from `XENOLEXIA_DICTIONARY_TOKEN`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::dictionary::provider::DictionaryProvider;
use crate::dictionary::LookupTable;
use crate::error::{DictionaryError, DictionaryResult};
use crate::models::{LanguagePair, WordEntry};

pub const ENDPOINT_ENV: &str = "XENOLEXIA_DICTIONARY_URL";
pub const TOKEN_ENV: &str = "XENOLEXIA_DICTIONARY_TOKEN";

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    entries: HashMap<String, Option<WordEntry>>,
}

#[derive(Clone)]
pub struct RemoteDictionary {
    endpoint: String,
    api_token: Option<String>,
    client: reqwest::Client,
}

impl RemoteDictionary {
    /// Maximum number of words per request
    const MAX_BATCH_SIZE: usize = 256;

    /// Create a provider for the dictionary service at `endpoint`
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Base http(s) URL of the service
    /// * `api_token` - Optional bearer token; blank tokens are ignored
    ///
    /// # Returns
    ///
    /// * `Ok(RemoteDictionary)` - Provider with a 30 second request timeout
    /// * `Err(DictionaryError::Config)` - If the endpoint is empty or not an http(s) URL
    ///
    /// # Example
    ///
    /// ```ignore
    /// let remote = RemoteDictionary::new("https://dict.example.org".to_string(), None)?;
    /// let table = remote.lookup_words(&words, &languages).await?;
    /// ```
    pub fn new(endpoint: String, api_token: Option<String>) -> DictionaryResult<Self> {
        if endpoint.trim().is_empty() {
            return Err(DictionaryError::Config("Dictionary endpoint cannot be empty".to_string()));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(DictionaryError::Config(format!(
                "Dictionary endpoint must be an http(s) URL: {}",
                endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DictionaryError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            api_token: api_token.filter(|t| !t.trim().is_empty()),
            client,
        })
    }

    /// Create from `XENOLEXIA_DICTIONARY_URL` and the optional `XENOLEXIA_DICTIONARY_TOKEN`
    pub fn from_env() -> DictionaryResult<Self> {
        let endpoint = std::env::var(ENDPOINT_ENV).map_err(|_| {
            DictionaryError::Config(format!("{} environment variable not set", ENDPOINT_ENV))
        })?;
        Self::new(endpoint, std::env::var(TOKEN_ENV).ok())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn chunk_batch(words: &[String]) -> Vec<&[String]> {
        words.chunks(Self::MAX_BATCH_SIZE).collect()
    }

    async fn lookup_chunk(
        &self,
        words: &[String],
        languages: &LanguagePair,
    ) -> DictionaryResult<HashMap<String, Option<WordEntry>>> {
        let body = json!({
            "source": languages.source,
            "target": languages.target,
            "words": words,
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(if status.is_client_error() {
                DictionaryError::Config(format!("Dictionary client error ({}): {}", status, error_text))
            } else {
                DictionaryError::Lookup(format!("Dictionary server error ({}): {}", status, error_text))
            });
        }

        let parsed: LookupResponse = response
            .json()
            .await
            .map_err(|e| DictionaryError::Parse(format!("Failed to parse dictionary response: {}", e)))?;
        Ok(parsed.entries)
    }
}

impl std::fmt::Debug for RemoteDictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteDictionary")
            .field("endpoint", &self.endpoint)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[async_trait]
impl DictionaryProvider for RemoteDictionary {
    async fn lookup_words(
        &self,
        words: &[String],
        languages: &LanguagePair,
    ) -> DictionaryResult<LookupTable> {
        let mut table = LookupTable::with_capacity(words.len());
        if words.is_empty() {
            return Ok(table);
        }

        for chunk in Self::chunk_batch(words) {
            let mut found = self.lookup_chunk(chunk, languages).await?;
            for word in chunk {
                // Entries the service answers for words we did not ask about are dropped
                table.insert(word.clone(), found.remove(word).flatten());
            }
        }
        Ok(table)
    }

    fn provider_name(&self) -> &str {
        "Remote Dictionary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_endpoint() {
        match RemoteDictionary::new("  ".to_string(), None) {
            Err(DictionaryError::Config(msg)) => assert!(msg.contains("empty")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_new_rejects_non_http_endpoint() {
        assert!(RemoteDictionary::new("ftp://example.org".to_string(), None).is_err());
    }

    #[test]
    fn test_blank_token_is_dropped() {
        let provider =
            RemoteDictionary::new("https://dict.example.org/lookup".to_string(), Some(" ".to_string()))
                .unwrap();
        assert!(provider.api_token.is_none());
    }

    #[test]
    fn test_chunking() {
        let words: Vec<String> = (0..600).map(|i| format!("w{}", i)).collect();
        let chunks = RemoteDictionary::chunk_batch(&words);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 256);
        assert_eq!(chunks[2].len(), 88);
        assert!(RemoteDictionary::chunk_batch(&[]).is_empty());
    }

    #[test]
    fn test_debug_masks_token() {
        let provider = RemoteDictionary::new(
            "https://dict.example.org/lookup".to_string(),
            Some("secret-token".to_string()),
        )
        .unwrap();
        let debug = format!("{:?}", provider);
        assert!(debug.contains("***"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"entries": {"house": null}}"#;
        let parsed: LookupResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.entries.get("house"), Some(&None));
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        // Port 9 (discard) would fail if contacted
        let provider = RemoteDictionary::new("http://127.0.0.1:9/lookup".to_string(), None).unwrap();
        let pair = LanguagePair::new("en", "es").unwrap();
        assert!(provider.lookup_words(&[], &pair).await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_service_lookup() {
        if std::env::var(ENDPOINT_ENV).is_err() {
            eprintln!("Skipping: {} not set", ENDPOINT_ENV);
            return;
        }
        let provider = RemoteDictionary::from_env().unwrap();
        let pair = LanguagePair::new("en", "es").unwrap();
        let table = provider.lookup_words(&["house".to_string()], &pair).await.unwrap();
        assert!(table.contains_key("house"));
    }
}

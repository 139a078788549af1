//! Claim extraction.
//!
//! Two interchangeable claim sources sit behind [`ClaimSource`]: a
//! model-based extractor and a lexicon-driven pattern extractor. Which one
//! runs first is a configuration-time decision; a model failure mid-story
//! degrades transparently to the pattern path for that story only.

pub mod model;
pub mod pattern;
pub mod vocab;

use async_trait::async_trait;
use fabula_agent::ModelClient;
use tracing::{debug, warn};

use crate::config::{ExtractionConfig, ExtractionMode};
use crate::types::{Claim, Result, VeracityError};

pub use model::ModelExtractor;
pub use pattern::PatternExtractor;

/// A source of raw claims for a backstory.
#[async_trait]
pub trait ClaimSource: Send + Sync {
    async fn claims(&self, backstory: &str, character: &str) -> Result<Vec<Claim>>;
}

/// The claim extractor: source selection, fallback, filtering, enrichment.
pub struct ClaimExtractor {
    mode: ExtractionMode,
    model: ModelExtractor,
    pattern: PatternExtractor,
    config: ExtractionConfig,
}

impl ClaimExtractor {
    /// Build an extractor.
    ///
    /// Fails at construction when the configuration asks for model
    /// extraction with no backend and fallback disabled; that combination
    /// could never produce claims.
    pub fn new(client: ModelClient, config: ExtractionConfig) -> Result<Self> {
        if config.mode == ExtractionMode::Model
            && !client.is_enabled()
            && !config.fallback_on_error
        {
            return Err(VeracityError::Config(
                "model extraction requested with no backend and fallback disabled".to_string(),
            ));
        }

        Ok(Self {
            mode: config.mode,
            model: ModelExtractor::new(client, config.max_claims),
            pattern: PatternExtractor::new(config.clone()),
            config,
        })
    }

    /// Extract, filter, enrich and bound the claims for one backstory.
    pub async fn extract(&self, backstory: &str, character: &str) -> Result<Vec<Claim>> {
        let raw = match self.mode {
            ExtractionMode::Pattern => self.pattern.claims(backstory, character).await?,
            ExtractionMode::Model => match self.model.claims(backstory, character).await {
                Ok(claims) if !claims.is_empty() => claims,
                Ok(_) => {
                    debug!(character, "model returned no claims, using pattern path");
                    self.pattern.claims(backstory, character).await?
                }
                Err(error) if self.config.fallback_on_error => {
                    warn!(character, %error, "model extraction failed, using pattern path");
                    self.pattern.claims(backstory, character).await?
                }
                Err(error) => return Err(error),
            },
        };

        let mut claims: Vec<Claim> = raw
            .into_iter()
            .filter(|claim| !vocab::is_vague(claim, &self.config))
            .take(self.config.max_claims)
            .collect();

        for claim in &mut claims {
            vocab::enrich(claim, character, &self.config);
        }
        claims.retain(vocab::has_checkable_vocabulary);

        if claims.is_empty() {
            return Err(VeracityError::NoClaims);
        }

        debug!(character, count = claims.len(), "claims ready");
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use fabula_agent::{LlmError, MockBackend, ModelClient, RetryPolicy};

    fn model_config() -> ExtractionConfig {
        ExtractionConfig {
            mode: ExtractionMode::Model,
            ..ExtractionConfig::default()
        }
    }

    fn fast_client(backend: MockBackend) -> ModelClient {
        ModelClient::new(Arc::new(backend)).with_policy(RetryPolicy {
            max_attempts: 2,
            malformed_attempts: 1,
            base_delay_ms: 1,
            request_timeout_ms: 1_000,
        })
    }

    #[tokio::test]
    async fn pattern_mode_never_touches_the_model() {
        let backend = Arc::new(MockBackend::default());
        let extractor = ClaimExtractor::new(
            ModelClient::new(backend.clone()),
            ExtractionConfig::default(),
        )
        .unwrap();

        let claims = extractor
            .extract("John is brave. John fought the dragon.", "John")
            .await
            .unwrap();

        assert!(!claims.is_empty());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_pattern_for_the_story() {
        let backend = MockBackend::default()
            .push_error(LlmError::RateLimited { retry_after_ms: None })
            .push_error(LlmError::RateLimited { retry_after_ms: None });
        let extractor = ClaimExtractor::new(fast_client(backend), model_config()).unwrap();

        let claims = extractor
            .extract("John is brave. John fought the dragon.", "John")
            .await
            .unwrap();

        // Pattern path produced the claims despite the model path failing.
        assert!(claims.iter().any(|c| c.id == "trait_brave"));
    }

    #[tokio::test]
    async fn model_claims_are_enriched_like_pattern_claims() {
        let backend = MockBackend::default().with_response(
            r#"[{"id": "trait_brave", "text": "John is brave", "kind": "trait", "importance": "high"}]"#,
        );
        let extractor = ClaimExtractor::new(fast_client(backend), model_config()).unwrap();

        let claims = extractor.extract("John is brave.", "John").await.unwrap();
        assert!(claims[0].vocabulary.iter().any(|t| t == "courageous"));
    }

    #[tokio::test]
    async fn claim_count_is_bounded() {
        let backstory = (0..30)
            .map(|n| format!("John rescued the traveler number {n} from the pass. "))
            .collect::<String>();
        let extractor =
            ClaimExtractor::new(ModelClient::disabled(), ExtractionConfig::default()).unwrap();

        let claims = extractor.extract(&backstory, "John").await.unwrap();
        assert!(claims.len() <= ExtractionConfig::default().max_claims);
    }

    #[tokio::test]
    async fn vague_claims_are_discarded() {
        let extractor =
            ClaimExtractor::new(ModelClient::disabled(), ExtractionConfig::default()).unwrap();

        let claims = extractor
            .extract(
                "John had a complex and interesting past. John was brave in the war.",
                "John",
            )
            .await
            .unwrap();

        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].id, "trait_brave");
    }

    #[test]
    fn model_mode_without_backend_or_fallback_is_a_config_error() {
        let config = ExtractionConfig {
            mode: ExtractionMode::Model,
            fallback_on_error: false,
            ..ExtractionConfig::default()
        };
        let result = ClaimExtractor::new(ModelClient::disabled(), config);
        assert!(matches!(result, Err(VeracityError::Config(_))));
    }
}

//! Per-backstory orchestration.
//!
//! Wires the stages together: load and index the novel (once per book),
//! extract claims, retrieve evidence and verify each claim in sequence, then
//! aggregate. [`StoryPipeline::evaluate`] is total - every failure mode
//! resolves to a well-formed conservative verdict so one bad story can never
//! abort a batch.

use std::sync::Arc;

use chronicle::{NovelIndex, NovelTextSource};
use dashmap::DashMap;
use fabula_agent::ModelClient;
use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregate::aggregate;
use crate::cache::{cache_key, CacheStore, MemoryStore};
use crate::config::VeracityConfig;
use crate::extract::ClaimExtractor;
use crate::retrieve::EvidenceRetriever;
use crate::types::{
    AggregateVerdict, Claim, EvidenceItem, PredictionRecord, Result, StoryRecord, Verification,
};
use crate::verify::ClaimVerifier;

/// Length of the text prefix used in cache keys, mirroring the keying of
/// cached model responses on (identity prefix, evidence count).
const CACHE_PREFIX_CHARS: usize = 100;

/// End-to-end backstory verification pipeline.
///
/// One instance per worker: the novel-index cache inside is shared read-only
/// once built, so cloning the pipeline per thread is not required, but each
/// parallel batch driver should use its own cache store session.
pub struct StoryPipeline {
    config: VeracityConfig,
    source: Arc<dyn NovelTextSource>,
    extractor: ClaimExtractor,
    retriever: EvidenceRetriever,
    verifier: ClaimVerifier,
    cache: Arc<dyn CacheStore>,
    indexes: DashMap<String, Arc<NovelIndex>>,
}

impl StoryPipeline {
    /// Build a pipeline. Fails only on configuration errors; everything at
    /// evaluation time degrades instead of propagating.
    pub fn new(
        config: VeracityConfig,
        client: ModelClient,
        source: Arc<dyn NovelTextSource>,
    ) -> Result<Self> {
        let extractor = ClaimExtractor::new(client.clone(), config.extraction.clone())?;
        let retriever = EvidenceRetriever::new(config.retrieval.clone());
        let verifier = ClaimVerifier::new(client, config.verification.clone());

        Ok(Self {
            config,
            source,
            extractor,
            retriever,
            verifier,
            cache: Arc::new(MemoryStore::new()),
            indexes: DashMap::new(),
        })
    }

    /// Replace the default in-memory cache store.
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = cache;
        self
    }

    /// Evaluate one backstory. Never fails: unprocessable stories get the
    /// conservative default verdict with the cause in the rationale.
    pub async fn evaluate(&self, record: &StoryRecord) -> AggregateVerdict {
        info!(
            story_id = record.id,
            character = %record.character,
            book = %record.book_name,
            "evaluating backstory"
        );

        match self.evaluate_inner(record).await {
            Ok(verdict) => verdict,
            Err(error) => {
                warn!(story_id = record.id, %error, "story failed, conservative default");
                AggregateVerdict::conservative_default(format!(
                    "story could not be processed: {error}"
                ))
            }
        }
    }

    /// Evaluate a batch sequentially, producing one prediction per record.
    pub async fn evaluate_batch(&self, records: &[StoryRecord]) -> Vec<PredictionRecord> {
        let run_id = Uuid::new_v4();
        info!(%run_id, stories = records.len(), "batch evaluation started");

        let mut predictions = Vec::with_capacity(records.len());
        for record in records {
            let verdict = self.evaluate(record).await;
            predictions.push(PredictionRecord {
                id: record.id,
                label: verdict.prediction,
            });
        }

        info!(%run_id, "batch evaluation finished");
        predictions
    }

    async fn evaluate_inner(&self, record: &StoryRecord) -> Result<AggregateVerdict> {
        let index = self.index_for(&record.book_name)?;
        let claims = self.claims_for(record).await?;

        let mut verifications = Vec::with_capacity(claims.len());
        for claim in &claims {
            let evidence = self
                .retriever
                .retrieve(claim, &record.character, &index);
            let verification = self.verified(claim, &evidence).await;
            verifications.push(verification);
        }

        Ok(aggregate(&verifications, &self.config.aggregation))
    }

    /// The index for a book: built once, then shared read-only.
    fn index_for(&self, book_name: &str) -> Result<Arc<NovelIndex>> {
        let map_key = book_name.to_lowercase();
        if let Some(index) = self.indexes.get(&map_key) {
            return Ok(Arc::clone(&index));
        }

        let store_key = cache_key("novel", &[&map_key]);
        if let Some(value) = self.cache.get(&store_key) {
            if let Ok(index) = serde_json::from_value::<NovelIndex>(value) {
                let index = Arc::new(index);
                self.indexes.insert(map_key, Arc::clone(&index));
                return Ok(index);
            }
        }

        let text = self.source.load(book_name)?;
        let index = Arc::new(NovelIndex::build(&text, &self.config.index)?);

        if let Ok(value) = serde_json::to_value(&*index) {
            self.cache.put(&store_key, value);
        }
        self.indexes.insert(map_key, Arc::clone(&index));
        Ok(index)
    }

    async fn claims_for(&self, record: &StoryRecord) -> Result<Vec<Claim>> {
        let prefix: String = record.content.chars().take(CACHE_PREFIX_CHARS).collect();
        let key = cache_key("claims", &[&record.character, &prefix]);

        if let Some(value) = self.cache.get(&key) {
            if let Ok(claims) = serde_json::from_value::<Vec<Claim>>(value) {
                if !claims.is_empty() {
                    return Ok(claims);
                }
            }
        }

        let claims = self
            .extractor
            .extract(&record.content, &record.character)
            .await?;
        if let Ok(value) = serde_json::to_value(&claims) {
            self.cache.put(&key, value);
        }
        Ok(claims)
    }

    async fn verified(&self, claim: &Claim, evidence: &[EvidenceItem]) -> Verification {
        let prefix: String = claim.text.chars().take(CACHE_PREFIX_CHARS).collect();
        let key = cache_key("verify", &[&prefix, &evidence.len().to_string()]);

        if let Some(value) = self.cache.get(&key) {
            if let Ok(verification) = serde_json::from_value::<Verification>(value) {
                return verification;
            }
        }

        let verification = self.verifier.verify(claim, evidence).await;
        if let Ok(value) = serde_json::to_value(&verification) {
            self.cache.put(&key, value);
        }
        verification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle::MemorySource;

    fn record(book: &str, character: &str, content: &str) -> StoryRecord {
        StoryRecord {
            id: 1,
            book_name: book.into(),
            character: character.into(),
            content: content.into(),
            label: None,
        }
    }

    fn pipeline_for(book: &str, text: &str) -> StoryPipeline {
        let source = Arc::new(MemorySource::new().with_novel(book, text));
        StoryPipeline::new(VeracityConfig::default(), ModelClient::disabled(), source).unwrap()
    }

    #[tokio::test]
    async fn missing_novel_gets_the_conservative_default() {
        let pipeline = pipeline_for("present book", &"text ".repeat(200));
        let verdict = pipeline
            .evaluate(&record("absent book", "John", "John is brave."))
            .await;

        assert_eq!(verdict.prediction, 0);
        assert_eq!(verdict.confidence, 0.5);
        assert!(verdict.rationale.contains("could not be processed"));
    }

    #[tokio::test]
    async fn novel_index_is_built_once_per_book() {
        let filler = "the caravan crossed the dunes and John led while John watched the stars "
            .repeat(6);
        let pipeline = pipeline_for("desert", &filler);

        let story = record("desert", "John", "John is brave. John crossed the dunes.");
        pipeline.evaluate(&story).await;
        assert_eq!(pipeline.indexes.len(), 1);

        pipeline.evaluate(&story).await;
        assert_eq!(pipeline.indexes.len(), 1);
    }

    #[tokio::test]
    async fn verifications_are_cached_by_claim_and_evidence_count() {
        let filler =
            "John kept the watch and John never left the wall through the long night ".repeat(6);
        let pipeline = pipeline_for("wall", &filler);
        let story = record("wall", "John", "John is brave.");

        pipeline.evaluate(&story).await;
        let cached = pipeline.cache.get(&cache_key(
            "claims",
            &["John", "John is brave."],
        ));
        assert!(cached.is_some());
    }
}

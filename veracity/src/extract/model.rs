//! Model-based claim extraction.

use async_trait::async_trait;
use fabula_agent::{GenerationRequest, ModelClient};
use serde_json::Value;
use tracing::debug;

use crate::extract::ClaimSource;
use crate::types::{Claim, ClaimType, Importance, Result};

/// Claim source backed by a language model.
#[derive(Clone)]
pub struct ModelExtractor {
    client: ModelClient,
    max_claims: usize,
}

impl ModelExtractor {
    pub fn new(client: ModelClient, max_claims: usize) -> Self {
        Self { client, max_claims }
    }

    fn build_prompt(&self, backstory: &str, character: &str) -> GenerationRequest {
        let prompt = format!(
            "Extract testable claims from this character backstory. Return ONLY a JSON array.\n\n\
             Character: {character}\n\
             Backstory: {backstory}\n\n\
             Extract specific, factual, falsifiable claims. Each claim should be:\n\
             - SPECIFIC: concrete events, traits, relationships, or skills\n\
             - VERIFIABLE: provable true or false from the novel text\n\
             - ATOMIC: one distinct fact per claim\n\n\
             Return a JSON array with this structure:\n\
             [{{\"id\": \"descriptive_snake_case_id\", \"text\": \"Full sentence describing the claim\", \
             \"kind\": \"event|trait|fear|relationship|skill|belief|motivation\", \
             \"importance\": \"high|medium|low\"}}]\n\n\
             Focus on high-importance claims. Limit to {max} claims.",
            max = self.max_claims
        );

        GenerationRequest::new(prompt)
            .with_system(
                "You are an expert at decomposing character backstories into \
                 atomic, checkable assertions.",
            )
            .with_max_output_tokens(1024)
            .with_json_output()
    }

    fn claims_from_value(value: Value) -> Vec<Claim> {
        // Accept either a bare array or an object wrapping one under "claims".
        let entries = match value {
            Value::Array(entries) => entries,
            Value::Object(mut map) => match map.remove("claims") {
                Some(Value::Array(entries)) => entries,
                _ => return Vec::new(),
            },
            _ => return Vec::new(),
        };

        entries
            .into_iter()
            .enumerate()
            .filter_map(|(n, entry)| {
                let text = entry.get("text")?.as_str()?.trim().to_string();
                if text.is_empty() {
                    return None;
                }
                let id = entry
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("claim_{n}"));
                let kind = entry
                    .get("kind")
                    .or_else(|| entry.get("claim_type"))
                    .and_then(Value::as_str)
                    .map(ClaimType::from_label)
                    .unwrap_or(ClaimType::Event);
                let importance = entry
                    .get("importance")
                    .and_then(Value::as_str)
                    .map(Importance::from_label)
                    .unwrap_or(Importance::Medium);

                let mut claim = Claim::new(id, text, kind, importance);
                if let Some(sub_kind) = entry.get("event_type").and_then(Value::as_str) {
                    claim.sub_kind = Some(sub_kind.to_string());
                }
                Some(claim)
            })
            .collect()
    }
}

#[async_trait]
impl ClaimSource for ModelExtractor {
    async fn claims(&self, backstory: &str, character: &str) -> Result<Vec<Claim>> {
        let request = self.build_prompt(backstory, character);
        let value = self.client.generate_structured(request).await?;
        let claims = Self::claims_from_value(value);
        debug!(count = claims.len(), character, "model extraction complete");
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use fabula_agent::MockBackend;

    #[test]
    fn parses_bare_arrays_and_wrapped_objects() {
        let array = serde_json::json!([
            {"id": "trait_brave", "text": "John is brave", "kind": "trait", "importance": "high"},
            {"text": "John fled the war", "kind": "event"}
        ]);
        let claims = ModelExtractor::claims_from_value(array);
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].kind, ClaimType::Trait);
        assert_eq!(claims[0].importance, Importance::High);
        assert_eq!(claims[1].id, "claim_1");

        let wrapped = serde_json::json!({"claims": [{"text": "x y z", "kind": "skill"}]});
        let claims = ModelExtractor::claims_from_value(wrapped);
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].kind, ClaimType::Skill);
    }

    #[test]
    fn entries_without_text_are_skipped() {
        let value = serde_json::json!([{"id": "empty"}, {"text": "  "}]);
        assert!(ModelExtractor::claims_from_value(value).is_empty());
    }

    #[tokio::test]
    async fn extracts_through_a_model_client() {
        let backend = Arc::new(MockBackend::default().with_response(
            r#"[{"id": "trait_brave", "text": "John is brave", "kind": "trait", "importance": "high"}]"#,
        ));
        let extractor = ModelExtractor::new(ModelClient::new(backend), 12);

        let claims = extractor.claims("John is brave.", "John").await.unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].id, "trait_brave");
    }
}

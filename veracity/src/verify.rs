//! Per-claim verification.
//!
//! A model judge, when configured, sees the claim and its top excerpts and
//! returns a structured judgment. Any call or parse failure degrades to a
//! deterministic scoring heuristic; verification never raises.

use fabula_agent::{parse_structured_response, GenerationRequest, LlmError, ModelClient};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::VerificationConfig;
use crate::types::{Claim, ClaimType, EvidenceItem, EvidenceKind, Judgment, Verification};

/// Judges one claim against its evidence set.
#[derive(Clone)]
pub struct ClaimVerifier {
    client: ModelClient,
    config: VerificationConfig,
}

impl ClaimVerifier {
    pub fn new(client: ModelClient, config: VerificationConfig) -> Self {
        Self { client, config }
    }

    /// Judge a claim. Total: model failures fall back to the heuristic.
    pub async fn verify(&self, claim: &Claim, evidence: &[EvidenceItem]) -> Verification {
        if self.client.is_enabled() {
            match self.model_judgment(claim, evidence).await {
                Ok(verification) => return verification,
                Err(error) => {
                    warn!(claim = %claim.id, %error, "model judgment failed, using heuristic");
                }
            }
        }
        self.heuristic(claim, evidence)
    }

    async fn model_judgment(
        &self,
        claim: &Claim,
        evidence: &[EvidenceItem],
    ) -> Result<Verification, LlmError> {
        let request = self.build_prompt(claim, evidence);
        let text = self.client.generate(request).await?;

        match parse_structured_response(&text) {
            Ok(value) => Ok(self.verification_from_value(value, evidence)),
            // Some models answer in prose; salvage an explicit judgment
            // before giving up on the response.
            Err(parse_error) => self
                .salvage_plain_text(&text)
                .ok_or(parse_error),
        }
    }

    fn build_prompt(&self, claim: &Claim, evidence: &[EvidenceItem]) -> GenerationRequest {
        let supporting = format_excerpts(evidence, EvidenceKind::Supporting, self.config.max_excerpts);
        let contradicting =
            format_excerpts(evidence, EvidenceKind::Contradicting, self.config.max_excerpts);

        let prompt = format!(
            "You are evaluating a character backstory claim against novel evidence.\n\n\
             CLAIM: {claim_text}\n\
             TYPE: {claim_kind}\n\n\
             SUPPORTING EVIDENCE:\n{supporting}\n\n\
             CONTRADICTING EVIDENCE:\n{contradicting}\n\n\
             Weigh actions above dialogue and dialogue above thoughts.\n\
             Return ONLY JSON:\n\
             {{\"judgment\": \"consistent\" or \"contradicted\", \"confidence\": 0.0 to 1.0, \
             \"rationale\": \"one or two sentences\", \"key_passages\": [\"excerpts\"]}}\n\n\
             Rules:\n\
             - \"consistent\": evidence supports or does not contradict the claim\n\
             - \"contradicted\": evidence explicitly contradicts the claim\n\
             - If evidence is weak or missing, default to \"consistent\" with low confidence",
            claim_text = claim.text,
            claim_kind = claim.kind.label(),
        );

        GenerationRequest::new(prompt)
            .with_max_output_tokens(512)
            .with_json_output()
    }

    fn verification_from_value(&self, value: Value, evidence: &[EvidenceItem]) -> Verification {
        let judgment = match value
            .get("judgment")
            .and_then(Value::as_str)
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("contradicted") | Some("inconsistent") => Judgment::Contradicted,
            Some("uncertain") => Judgment::Uncertain,
            _ => Judgment::Consistent,
        };
        let confidence = value
            .get("confidence")
            .and_then(Value::as_f64)
            .map(|c| c as f32)
            .unwrap_or(0.5)
            .clamp(0.0, 1.0);
        let rationale = value
            .get("rationale")
            .and_then(Value::as_str)
            .unwrap_or("model judgment")
            .to_string();
        let key_passages = value
            .get("key_passages")
            .and_then(Value::as_array)
            .map(|passages| {
                passages
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_else(|| top_excerpts(evidence, 2));

        Verification {
            judgment,
            confidence,
            rationale,
            key_passages,
            model_assisted: true,
        }
    }

    fn salvage_plain_text(&self, text: &str) -> Option<Verification> {
        let lower = text.to_lowercase();
        let contradicted = ["contradicted", "contradiction", "inconsistent", "false"]
            .iter()
            .any(|w| lower.contains(w));
        let consistent = ["consistent", "matches", "supports", "true"]
            .iter()
            .any(|w| lower.contains(w));

        let judgment = if contradicted {
            Judgment::Contradicted
        } else if consistent {
            Judgment::Consistent
        } else {
            return None;
        };

        debug!("salvaged judgment from prose response");
        Some(Verification {
            judgment,
            confidence: self.config.salvage_confidence,
            rationale: text.chars().take(200).collect(),
            key_passages: Vec::new(),
            model_assisted: true,
        })
    }

    /// Deterministic decision policy over the evidence scores.
    fn heuristic(&self, claim: &Claim, evidence: &[EvidenceItem]) -> Verification {
        let supporting: Vec<&EvidenceItem> = evidence
            .iter()
            .filter(|item| item.kind == EvidenceKind::Supporting)
            .collect();
        let contradicting: Vec<&EvidenceItem> = evidence
            .iter()
            .filter(|item| item.kind == EvidenceKind::Contradicting)
            .collect();

        if evidence.is_empty() {
            return self.no_evidence_default(claim);
        }

        let config = &self.config;

        if contradicting.is_empty() && !supporting.is_empty() {
            let confidence = self.scaled_confidence(supporting.len());
            return Verification {
                judgment: Judgment::Consistent,
                confidence,
                rationale: format!(
                    "{} supporting passage(s), no contradictions",
                    supporting.len()
                ),
                key_passages: passages_of(&supporting, 2),
                model_assisted: false,
            };
        }

        if supporting.is_empty() && !contradicting.is_empty() {
            let confidence = self.scaled_confidence(contradicting.len());
            return Verification {
                judgment: Judgment::Contradicted,
                confidence,
                rationale: format!(
                    "{} contradicting passage(s), no support",
                    contradicting.len()
                ),
                key_passages: passages_of(&contradicting, 2),
                model_assisted: false,
            };
        }

        let support_score: f32 = supporting.iter().map(|item| item.weight).sum();
        let contradiction_score: f32 = contradicting.iter().map(|item| item.weight).sum();

        if !supporting.is_empty() || !contradicting.is_empty() {
            if contradicting.len() >= config.contradiction_count_override {
                return if contradiction_score > config.contradiction_fraction * support_score {
                    Verification {
                        judgment: Judgment::Contradicted,
                        confidence: self.scaled_confidence(contradicting.len()),
                        rationale: format!(
                            "{} contradicting passages outweigh support ({:.1} vs {:.1})",
                            contradicting.len(),
                            contradiction_score,
                            support_score
                        ),
                        key_passages: passages_of(&contradicting, 2),
                        model_assisted: false,
                    }
                } else {
                    Verification {
                        judgment: Judgment::Consistent,
                        confidence: config.mixed_default_confidence,
                        rationale: format!(
                            "{} contradictions present but support dominates ({:.1} vs {:.1})",
                            contradicting.len(),
                            support_score,
                            contradiction_score
                        ),
                        key_passages: passages_of(&supporting, 2),
                        model_assisted: false,
                    }
                };
            }

            let net = support_score - config.contradiction_weight * contradiction_score;
            if net > config.net_score_threshold {
                return Verification {
                    judgment: Judgment::Consistent,
                    confidence: self.net_confidence(net),
                    rationale: format!("net evidence score {net:.1} favors the claim"),
                    key_passages: passages_of(&supporting, 2),
                    model_assisted: false,
                };
            }
            if net < -config.net_score_threshold {
                return Verification {
                    judgment: Judgment::Contradicted,
                    confidence: self.net_confidence(-net),
                    rationale: format!("net evidence score {net:.1} against the claim"),
                    key_passages: passages_of(&contradicting, 2),
                    model_assisted: false,
                };
            }
        }

        // Mixed, weak signal: do not penalize an ambiguous claim.
        Verification {
            judgment: Judgment::Consistent,
            confidence: config.mixed_default_confidence,
            rationale: format!(
                "weak or mixed evidence ({} supporting, {} contradicting)",
                supporting.len(),
                contradicting.len()
            ),
            key_passages: top_excerpts(evidence, 2),
            model_assisted: false,
        }
    }

    /// No evidence at all: unverifiable is not false for soft claims, while
    /// unexplainable specificity reads as fabrication for the rest.
    fn no_evidence_default(&self, claim: &Claim) -> Verification {
        if self.is_soft(claim) {
            Verification {
                judgment: Judgment::Consistent,
                confidence: self.config.soft_default_confidence,
                rationale: format!(
                    "no evidence found; unverifiable {} claim defaults to consistent",
                    claim.kind.label()
                ),
                key_passages: Vec::new(),
                model_assisted: false,
            }
        } else {
            Verification {
                judgment: Judgment::Contradicted,
                confidence: self.config.specific_default_confidence,
                rationale: format!(
                    "no evidence found for specific {} claim{}",
                    claim.kind.label(),
                    claim
                        .sub_kind
                        .as_deref()
                        .map(|s| format!(" ({s})"))
                        .unwrap_or_default()
                ),
                key_passages: Vec::new(),
                model_assisted: false,
            }
        }
    }

    fn is_soft(&self, claim: &Claim) -> bool {
        if self.config.soft_claim_kinds.contains(&claim.kind) {
            return true;
        }
        if claim.kind == ClaimType::Event {
            return match claim.sub_kind.as_deref() {
                // An event with no detected sub-type is a generic life event.
                None => true,
                Some(sub_kind) => self
                    .config
                    .soft_event_sub_kinds
                    .iter()
                    .any(|s| s == sub_kind),
            };
        }
        false
    }

    fn scaled_confidence(&self, count: usize) -> f32 {
        (0.5 + self.config.evidence_confidence_step * count as f32).min(self.config.confidence_cap)
    }

    fn net_confidence(&self, magnitude: f32) -> f32 {
        (0.5 + magnitude / 10.0).min(self.config.confidence_cap)
    }
}

fn format_excerpts(evidence: &[EvidenceItem], kind: EvidenceKind, limit: usize) -> String {
    let lines: Vec<String> = evidence
        .iter()
        .filter(|item| item.kind == kind)
        .take(limit)
        .enumerate()
        .map(|(n, item)| {
            let preview: String = item.excerpt.chars().take(300).collect();
            format!("{}. [{:?}] \"{preview}\"", n + 1, item.scene)
        })
        .collect();

    if lines.is_empty() {
        "None found.".to_string()
    } else {
        lines.join("\n")
    }
}

fn passages_of(items: &[&EvidenceItem], limit: usize) -> Vec<String> {
    items
        .iter()
        .take(limit)
        .map(|item| item.excerpt.chars().take(200).collect())
        .collect()
}

fn top_excerpts(evidence: &[EvidenceItem], limit: usize) -> Vec<String> {
    evidence
        .iter()
        .take(limit)
        .map(|item| item.excerpt.chars().take(200).collect())
        .collect()
}

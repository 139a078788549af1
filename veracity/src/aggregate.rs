//! Verdict aggregation.
//!
//! Deterministic, explainable combination of per-claim verifications into
//! one binary verdict. Override rules run before counting so that a couple
//! of confident contradictions cannot be outvoted by a pile of weakly
//! consistent claims.

use tracing::debug;

use crate::config::AggregationConfig;
use crate::types::{AggregateVerdict, Judgment, Verification};

/// Combine all claim verifications for one backstory.
pub fn aggregate(verifications: &[Verification], config: &AggregationConfig) -> AggregateVerdict {
    if verifications.is_empty() {
        return AggregateVerdict::conservative_default("no claims were verified");
    }

    let total = verifications.len();
    let contradicted: Vec<&Verification> = verifications
        .iter()
        .filter(|v| v.judgment == Judgment::Contradicted)
        .collect();
    let consistent_count = verifications
        .iter()
        .filter(|v| v.judgment == Judgment::Consistent)
        .count();

    let strong: Vec<&Verification> = contradicted
        .iter()
        .copied()
        .filter(|v| v.confidence > config.strong_contradiction_threshold)
        .collect();

    // Rule 1: multiple high-confidence contradictions settle it.
    if strong.len() >= config.min_strong_contradictions {
        let confidence = strong
            .iter()
            .map(|v| v.confidence)
            .fold(f32::MIN, f32::max);
        return AggregateVerdict {
            prediction: 0,
            confidence,
            rationale: format!(
                "{}/{} claims contradicted, {} with high confidence",
                contradicted.len(),
                total,
                strong.len()
            ),
        };
    }

    // Rule 2: a single overwhelming contradiction outweighs everything else.
    if contradicted.len() == 1 && contradicted[0].confidence > config.single_contradiction_threshold
    {
        return AggregateVerdict {
            prediction: 0,
            confidence: contradicted[0].confidence,
            rationale: format!(
                "1/{} claims contradicted with overwhelming confidence: {}",
                total, contradicted[0].rationale
            ),
        };
    }

    let mean_confidence =
        verifications.iter().map(|v| v.confidence).sum::<f32>() / total as f32;

    // Rule 3: count comparison; ties break toward consistent.
    if contradicted.len() > consistent_count {
        return AggregateVerdict {
            prediction: 0,
            confidence: mean_confidence,
            rationale: format!("{}/{} claims contradicted", contradicted.len(), total),
        };
    }
    if strong.is_empty() {
        return AggregateVerdict {
            prediction: 1,
            confidence: mean_confidence,
            rationale: format!(
                "{}/{} claims consistent, no strong contradictions",
                consistent_count, total
            ),
        };
    }

    // Rule 4: a consistent majority shadowed by one strong (but not
    // overwhelming) contradiction; fall back to a confidence-weighted vote.
    debug!("aggregation fell through to weighted vote");
    weighted_vote(verifications, total, contradicted.len())
}

fn weighted_vote(
    verifications: &[Verification],
    total: usize,
    contradicted_count: usize,
) -> AggregateVerdict {
    let mut total_weight = 0.0f32;
    let mut weighted_consistency = 0.0f32;
    for verification in verifications {
        let vote = match verification.judgment {
            Judgment::Consistent => 1.0,
            Judgment::Uncertain => 0.5,
            Judgment::Contradicted => 0.0,
        };
        weighted_consistency += vote * verification.confidence;
        total_weight += verification.confidence;
    }

    let average = if total_weight > 0.0 {
        weighted_consistency / total_weight
    } else {
        0.5
    };

    AggregateVerdict {
        prediction: u8::from(average >= 0.5),
        confidence: ((average - 0.5).abs() * 2.0).clamp(0.0, 1.0),
        rationale: format!(
            "{contradicted_count}/{total} claims contradicted (weighted consistency {average:.2})"
        ),
    }
}

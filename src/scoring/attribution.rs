use serde::Serialize;

use crate::dataset::IndicatorId;

/// One indicator's part in a (province, sector) score.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    pub indicator: IndicatorId,
    pub weight: f64,
    /// Province's normalized value for the indicator, in `[0, 100]`
    pub normalized: f64,
    /// Points this indicator adds to the score: `weight * normalized / Σ weight`
    pub points: f64,
    /// Fraction of the weighted sum: `weight * normalized / Σ weight * normalized`
    pub share: f64,
}

/// Decompose a score into per-indicator contribution shares.
///
/// Only indicators with a non-zero weight are reported, sorted by share descending
/// (indicator order on ties). When the weighted sum is zero there is nothing to
/// attribute and the result is empty.
pub fn attribute(weights: &[f64], normalized: &[f64]) -> Vec<Attribution> {
    let total_weight: f64 = weights.iter().sum();
    let weighted_sum: f64 = weights.iter().zip(normalized).map(|(w, n)| w * n).sum();
    if total_weight <= 0.0 || weighted_sum <= 0.0 {
        return Vec::new();
    }

    let mut attributions: Vec<Attribution> = weights
        .iter()
        .zip(normalized)
        .enumerate()
        .filter(|(_, (w, _))| **w > 0.0)
        .map(|(i, (&weight, &normalized))| {
            let weighted = weight * normalized;
            Attribution {
                indicator: IndicatorId(i),
                weight,
                normalized,
                points: weighted / total_weight,
                share: weighted / weighted_sum,
            }
        })
        .collect();

    attributions.sort_by(|a, b| {
        b.share
            .total_cmp(&a.share)
            .then_with(|| a.indicator.cmp(&b.indicator))
    });
    attributions
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasonKind {
    /// Among the largest contributors
    Strength,
    /// The weakest weighted contributor
    Risk,
}

/// A structured justification for a ranking position.
#[derive(Debug, Clone, PartialEq)]
pub struct Reason {
    pub kind: ReasonKind,
    pub indicator: IndicatorId,
    pub share: f64,
}

/// Pick the top `strengths` contributors and, optionally, the weakest one as a risk.
///
/// The risk is omitted when it is already listed as a strength.
pub fn select_reasons(
    attributions: &[Attribution],
    strengths: usize,
    include_risk: bool,
) -> Vec<Reason> {
    let mut reasons: Vec<Reason> = attributions
        .iter()
        .take(strengths)
        .map(|a| Reason {
            kind: ReasonKind::Strength,
            indicator: a.indicator,
            share: a.share,
        })
        .collect();

    if include_risk && attributions.len() > strengths {
        if let Some(weakest) = attributions.last() {
            reasons.push(Reason {
                kind: ReasonKind::Risk,
                indicator: weakest.indicator,
                share: weakest.share,
            });
        }
    }
    reasons
}

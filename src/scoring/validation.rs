use super::config::EnginePolicy;
use super::normalize::SCALE_MAX;
use crate::dataset::{SectorId, SectorWeightProfile};

/// Validate engine policy values.
/// Returns all validation errors at once (not just the first).
pub fn validate_policy(policy: &EnginePolicy) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if !policy.tie_epsilon.is_finite() || policy.tie_epsilon < 0.0 {
        errors.push(format!(
            "policy.tie_epsilon: must be a finite non-negative number (got {})",
            policy.tie_epsilon
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that every sector's weights can be scored.
/// Returns one error per sector whose weights sum to zero, or whose sum times the
/// scale maximum overflows (which bounds every weighted sum of normalized values).
pub fn validate_profile(profile: &SectorWeightProfile) -> Result<(), Vec<String>> {
    let errors: Vec<String> = (0..profile.sector_count())
        .map(SectorId)
        .filter_map(|s| {
            let total = profile.total_weight(s);
            if total <= 0.0 {
                Some(format!(
                    "sector '{}': all indicator weights are zero",
                    profile.sector_name(s)
                ))
            } else if !(total * SCALE_MAX).is_finite() {
                Some(format!(
                    "sector '{}': weights sum to {}, too large to score",
                    profile.sector_name(s),
                    total
                ))
            } else {
                None
            }
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

use crate::models::{IdentityKey, RawCandidate};
use std::collections::HashSet;

/// Fold a merged candidate list into an identity-unique list.
///
/// Single pass, stable, first-writer-wins: the first candidate seen for a
/// given identity key is kept whole and later records with the same key are
/// dropped entirely (no field-level merge). Source priority is therefore
/// implicit in the concatenation order the orchestrator produced.
pub fn dedupe(candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
    let mut seen: HashSet<IdentityKey> = HashSet::with_capacity(candidates.len());
    let mut unique = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let key = candidate.identity_key();
        if seen.insert(key) {
            unique.push(candidate);
        } else {
            tracing::debug!(
                "Dropping duplicate candidate '{}' ({}) from {}",
                candidate.name,
                candidate.company,
                candidate.source
            );
        }
    }

    unique
}

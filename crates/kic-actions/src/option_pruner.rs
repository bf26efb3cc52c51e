//! Merges live course counts into a slot's answer options.
//!
//! A count key belongs to the first not-yet-matched option whose command value (lower-cased)
//! is a substring of the key (lower-cased); `/undecided` stands for `egal`. Zero counts remove
//! the option, positive counts are appended to its title. Alternate keys are only tried for
//! options the primary keys left unmatched.

use crate::catalog::CandidateOption;
use kic_core::CountResult;
use std::collections::BTreeMap;

pub fn prune(candidates: Vec<CandidateOption>, counts: &CountResult) -> Vec<CandidateOption> {
    let mut candidates = candidates;
    let mut matched = vec![false; candidates.len()];
    let mut removed = vec![false; candidates.len()];

    apply_counts(&mut candidates, &counts.values, &mut matched, &mut removed);
    if matched.iter().any(|m| !m) {
        if let Some(alternatives) = &counts.alternatives {
            apply_counts(&mut candidates, alternatives, &mut matched, &mut removed);
        }
    }

    let before = candidates.len();
    let pruned: Vec<CandidateOption> = candidates
        .into_iter()
        .zip(removed)
        .filter_map(|(candidate, removed)| (!removed).then_some(candidate))
        .collect();
    tracing::debug!(
        target: "kic::actions",
        param = %counts.param,
        before,
        after = pruned.len(),
        "Options pruned"
    );
    pruned
}

fn apply_counts(
    candidates: &mut [CandidateOption],
    counts: &BTreeMap<String, u64>,
    matched: &mut [bool],
    removed: &mut [bool],
) {
    for (key, count) in counts {
        let key = key.to_lowercase();
        let hit = candidates.iter().enumerate().position(|(i, candidate)| {
            !matched[i] && key.contains(&candidate.command.match_value().to_lowercase())
        });
        let Some(i) = hit else {
            continue;
        };
        matched[i] = true;
        if *count == 0 {
            removed[i] = true;
        } else {
            candidates[i].title.push_str(&format!(" ({})", count));
        }
    }
}

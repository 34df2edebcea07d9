//! Candidate branch ordering
//!
//! `Ranked` explores cheap constraint systems first:
//! score = (1 + |reaching|) × mean size of reaching constraints, where the
//! reaching set includes the negated target. Locations already seen with both
//! polarities on this path are left out. The two `NegateAll*` policies keep
//! every branch, in recorded or shuffled order.

use crate::config::RankingPolicy;
use crate::features::symbolic::domain::{BranchLocation, PathCondition};
use ahash::AHashMap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;

/// Indices of the branches to negate, best first
pub fn rank_candidates(
    path: &PathCondition,
    policy: RankingPolicy,
    excluded: &BTreeSet<BranchLocation>,
    rng: &mut StdRng,
) -> Vec<usize> {
    let mut candidates: Vec<usize> = (0..path.len())
        .filter(|&i| {
            path.get(i)
                .is_some_and(|b| !excluded.contains(&b.location))
        })
        .collect();

    match policy {
        RankingPolicy::Ranked => {
            let both = locations_with_both_polarities(path);
            candidates.retain(|&i| path.get(i).is_some_and(|b| !both.contains(&b.location)));

            let mut scored: Vec<(usize, f64)> = candidates
                .into_iter()
                .map(|i| (i, branch_score(path, i)))
                .collect();
            scored.sort_by(|a, b| a.1.total_cmp(&b.1));
            scored.into_iter().map(|(i, _)| i).collect()
        }
        RankingPolicy::NegateAllInOrder => candidates,
        RankingPolicy::NegateAllShuffled => {
            candidates.shuffle(rng);
            candidates
        }
    }
}

/// Cost estimate of negating branch `index`; lower is explored first
pub fn branch_score(path: &PathCondition, index: usize) -> f64 {
    let Some(branch) = path.get(index) else {
        return f64::INFINITY;
    };
    let mut reaching = path.reaching_constraints(index);
    reaching.push(branch.flipped_constraint());

    let count = reaching.len() as f64;
    let total: usize = reaching.iter().map(|c| c.size()).sum();
    (1.0 + count) * (total as f64 / count)
}

fn locations_with_both_polarities(path: &PathCondition) -> BTreeSet<BranchLocation> {
    let mut seen: AHashMap<&BranchLocation, (bool, bool)> = AHashMap::new();
    for branch in path.branches() {
        let entry = seen.entry(&branch.location).or_default();
        if branch.taken {
            entry.0 = true;
        } else {
            entry.1 = true;
        }
    }
    seen.into_iter()
        .filter(|(_, (t, f))| *t && *f)
        .map(|(loc, _)| loc.clone())
        .collect()
}

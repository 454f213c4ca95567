//! Pair counting over the quadtree index.
//!
//! For every target the tree is queried at the widest bin edge, and each
//! match is binned by its exact haversine separation. Every unordered pair
//! is therefore seen twice — once from each end — matching the convention of
//! the surrounding pipeline; halve the counts for unique pairs.

use rayon::prelude::*;

use skycorr_core::constants::RAD_TO_DEG;
use skycorr_core::{CorrResult, Source};
use skycorr_index::SkyQuadTree;

use crate::bins::{LogBins, PairCounts};

/// Counts binned pairs between `targets` and the tree's contents.
///
/// Targets fan out over the rayon worker pool; each worker accumulates a
/// local [`PairCounts`] and the partials merge at the end, so workers never
/// contend on shared counts. Separations at or below the tree's identity
/// floor are already excluded by the query itself.
///
/// # Errors
/// [`skycorr_core::CorrError::PreconditionViolation`] if the tree has not
/// been aggregated.
pub fn count_pairs(
    tree: &SkyQuadTree,
    targets: &[Source],
    bins: &LogBins,
) -> CorrResult<PairCounts> {
    let max_angle = bins.max();

    targets
        .par_iter()
        .map(|target| {
            let matches = tree.find_sources(target, max_angle)?;
            let mut local = PairCounts::zeros(bins);
            for source in matches {
                let separation_deg = source.haversine_distance(target) * RAD_TO_DEG;
                if let Some(bin) = bins.index_of(separation_deg) {
                    local.record(bin);
                }
            }
            Ok(local)
        })
        .try_reduce(|| PairCounts::zeros(bins), |a, b| Ok(a.merged(b)))
}

/// Exhaustive O(n²) reference counter with the same conventions as
/// [`count_pairs`]: both orderings of each pair, separations below
/// `min_angle_rad` dropped.
pub fn count_pairs_brute(
    sources: &[Source],
    bins: &LogBins,
    min_angle_rad: f64,
) -> PairCounts {
    let mut counts = PairCounts::zeros(bins);

    for (i, a) in sources.iter().enumerate() {
        for (j, b) in sources.iter().enumerate() {
            if i == j {
                continue;
            }
            let separation = a.haversine_distance(b);
            if !(separation > min_angle_rad) {
                continue;
            }
            if let Some(bin) = counts_bin(bins, separation) {
                counts.record(bin);
            }
        }
    }

    counts
}

fn counts_bin(bins: &LogBins, separation_rad: f64) -> Option<usize> {
    bins.index_of(separation_rad * RAD_TO_DEG)
}

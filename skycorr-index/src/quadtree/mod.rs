//! Fixed-depth spherical quadtree over a declared RA/Dec box.
//!
//! The index answers one question fast: which stored sources lie within a
//! given angle of a target position, without touching all O(n²) pairs. The
//! partition is declared up front — [`TreeConfig`] fixes the depth and
//! bounding box, construction materializes all `4^depth` leaves — and the
//! lifecycle is strictly build → fill → [`SkyQuadTree::aggregate`] → query.
//!
//! Queries prune geometrically: at each branch only the quadrants the search
//! circle can reach are descended, and subtrees with an aggregated count of
//! zero are skipped outright. The pruning tests are deliberately cheap
//! approximations (exact Dec gaps, a flat-sky RA gap) that only ever
//! over-include candidates; the final accept test at the leaves is the exact
//! haversine separation.
//!
//! # RA wrap-around
//!
//! Boxes crossing the 0°/360° seam are not handled. The `ra_offset`
//! configuration shifts the RA origin of the whole tree — set it once so the
//! shifted box avoids the seam, and every insert and query applies the same
//! shift. Nothing detects a box that still crosses the seam.
//!
//! # Concurrency
//!
//! Filling is single-threaded. Once aggregated the tree is immutable and
//! queries take `&self`, so any number of threads may query concurrently;
//! [`SkyQuadTree::find_sources_batch`] fans a whole target set out over a
//! worker pool.

mod node;

use std::fmt;

use rayon::prelude::*;

use skycorr_core::constants::MIN_ANGLE_RAD;
use skycorr_core::{CorrError, CorrResult, Source};

use node::SkyNode;

/// Depth ceiling: 4^20 leaves is already far past any sane configuration.
pub const MAX_DEPTH: u32 = 20;

/// A rectangular RA/Dec region, degrees, exclusive of wrap-around handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyBounds {
    pub min_ra: f64,
    pub max_ra: f64,
    pub min_dec: f64,
    pub max_dec: f64,
}

impl SkyBounds {
    /// Validates that both axes have strictly positive extent.
    ///
    /// # Errors
    /// [`CorrError::InvalidConfiguration`] on a degenerate or inverted box.
    pub fn new(min_ra: f64, max_ra: f64, min_dec: f64, max_dec: f64) -> CorrResult<Self> {
        if !(min_ra < max_ra) {
            return Err(CorrError::invalid_configuration(
                "SkyBounds::new",
                "min_ra must be strictly below max_ra",
            ));
        }
        if !(min_dec < max_dec) {
            return Err(CorrError::invalid_configuration(
                "SkyBounds::new",
                "min_dec must be strictly below max_dec",
            ));
        }
        Ok(Self {
            min_ra,
            max_ra,
            min_dec,
            max_dec,
        })
    }
}

/// Construction parameters for a [`SkyQuadTree`].
#[derive(Debug, Clone, Copy)]
pub struct TreeConfig {
    /// Levels below the root; the tree has `4^depth` leaves.
    pub depth: u32,
    /// The indexed region.
    pub bounds: SkyBounds,
    /// Uniform RA shift applied to the box and to every inserted or queried
    /// source. Per-tree state, fixed at construction.
    pub ra_offset: f64,
    /// Identity-exclusion floor in radians; matches closer than this are
    /// dropped. Defaults to one arcsecond.
    pub min_angle: f64,
}

impl TreeConfig {
    pub fn new(depth: u32, bounds: SkyBounds) -> Self {
        Self {
            depth,
            bounds,
            ra_offset: 0.0,
            min_angle: MIN_ANGLE_RAD,
        }
    }

    pub fn with_ra_offset(mut self, ra_offset: f64) -> Self {
        self.ra_offset = ra_offset;
        self
    }

    pub fn with_min_angle(mut self, min_angle_rad: f64) -> Self {
        self.min_angle = min_angle_rad;
        self
    }
}

/// The spherical quadtree index.
///
/// ```
/// use skycorr_core::Source;
/// use skycorr_index::quadtree::{SkyBounds, SkyQuadTree, TreeConfig};
///
/// let bounds = SkyBounds::new(0.0, 10.0, 0.0, 10.0)?;
/// let mut tree = SkyQuadTree::new(TreeConfig::new(2, bounds))?;
///
/// tree.insert(Source::new(1.0, 1.0));
/// tree.insert(Source::new(5.0, 5.0));
/// tree.insert(Source::new(9.0, 9.0));
/// tree.aggregate();
///
/// let target = Source::new(5.0, 5.0);
/// let matches = tree.find_sources(&target, 7.5)?;
/// assert_eq!(matches.len(), 2); // the target itself is excluded
/// # Ok::<(), skycorr_core::CorrError>(())
/// ```
#[derive(Debug)]
pub struct SkyQuadTree {
    config: TreeConfig,
    root: SkyNode,
    aggregated: bool,
    inserted: usize,
}

impl SkyQuadTree {
    /// Builds the empty partition: every node down to the `4^depth` leaves
    /// is materialized here, before any source arrives.
    ///
    /// # Errors
    /// [`CorrError::InvalidConfiguration`] for depth 0, depth beyond
    /// [`MAX_DEPTH`], or a degenerate bounding box.
    pub fn new(config: TreeConfig) -> CorrResult<Self> {
        if config.depth == 0 {
            return Err(CorrError::invalid_configuration(
                "SkyQuadTree::new",
                "depth must be at least 1",
            ));
        }
        if config.depth > MAX_DEPTH {
            return Err(CorrError::invalid_configuration(
                "SkyQuadTree::new",
                "depth exceeds the supported maximum of 20",
            ));
        }
        // Bounds may have been assembled by struct literal; re-validate.
        let b = SkyBounds::new(
            config.bounds.min_ra,
            config.bounds.max_ra,
            config.bounds.min_dec,
            config.bounds.max_dec,
        )?;

        let root = SkyNode::build(
            config.depth,
            b.min_ra + config.ra_offset,
            b.max_ra + config.ra_offset,
            b.min_dec,
            b.max_dec,
        );

        Ok(Self {
            config,
            root,
            aggregated: false,
            inserted: 0,
        })
    }

    /// Routes one source to its leaf.
    ///
    /// Sources outside the declared bounds are not rejected; they route to
    /// the nearest edge leaf. Inserting clears the aggregated state, so
    /// [`Self::aggregate`] must run again before the next query.
    pub fn insert(&mut self, source: Source) {
        self.root.insert(source, self.config.ra_offset);
        self.inserted += 1;
        self.aggregated = false;
    }

    /// Bulk insertion.
    pub fn extend<I>(&mut self, sources: I)
    where
        I: IntoIterator<Item = Source>,
    {
        for source in sources {
            self.insert(source);
        }
    }

    /// Runs the bottom-up statistics pass (subtree counts and densities) and
    /// marks the tree queryable. Required after the last insertion; queries
    /// prune on these counts.
    pub fn aggregate(&mut self) {
        self.root.aggregate();
        self.aggregated = true;
    }

    pub fn is_aggregated(&self) -> bool {
        self.aggregated
    }

    /// Sources inserted so far.
    pub fn len(&self) -> usize {
        self.inserted
    }

    pub fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    /// Root subtree count from the last aggregation pass.
    pub fn root_count(&self) -> usize {
        self.root.count()
    }

    /// Total solid angle of the indexed region, square degrees.
    pub fn area(&self) -> f64 {
        self.root.area()
    }

    pub fn depth(&self) -> u32 {
        self.config.depth
    }

    pub fn bounds(&self) -> SkyBounds {
        self.config.bounds
    }

    pub fn leaf_count(&self) -> usize {
        4usize.pow(self.config.depth)
    }

    /// Every stored source within `(min_angle, angle_deg]` of the target.
    ///
    /// The floor excludes the target itself (and exact duplicates) when it
    /// was inserted into the tree. The returned references borrow the tree.
    ///
    /// # Errors
    /// [`CorrError::PreconditionViolation`] if [`Self::aggregate`] has not
    /// run since the last insertion — unaggregated counts would silently
    /// defeat the pruning.
    pub fn find_sources(&self, target: &Source, angle_deg: f64) -> CorrResult<Vec<&Source>> {
        self.require_aggregated("find_sources")?;
        let mut out = Vec::new();
        self.root.find_sources(
            target,
            angle_deg,
            self.config.ra_offset,
            self.config.min_angle,
            &mut out,
        );
        Ok(out)
    }

    /// [`Self::find_sources`] fanned out over a target set on the rayon
    /// worker pool. The tree is shared immutably across workers; results
    /// come back in target order.
    pub fn find_sources_batch(
        &self,
        targets: &[Source],
        angle_deg: f64,
    ) -> CorrResult<Vec<Vec<&Source>>> {
        self.require_aggregated("find_sources_batch")?;
        Ok(targets
            .par_iter()
            .map(|target| {
                let mut out = Vec::new();
                self.root.find_sources(
                    target,
                    angle_deg,
                    self.config.ra_offset,
                    self.config.min_angle,
                    &mut out,
                );
                out
            })
            .collect())
    }

    fn require_aggregated(&self, operation: &str) -> CorrResult<()> {
        if !self.aggregated {
            return Err(CorrError::precondition_violation(
                operation,
                "aggregate() must run after the last insertion and before queries",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for SkyQuadTree {
    /// Dumps the node hierarchy, one line per node, children after parents.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.dump(f)
    }
}

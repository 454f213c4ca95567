//! Quadtree nodes.
//!
//! A node is either a `Leaf` holding the sources routed into its cell, or a
//! `Branch` owning exactly four children that tile its extent. The four
//! quadrants are laid out
//!
//! ```text
//!   2   3
//!   0   1
//! ```
//!
//! with 0 at low RA / low Dec and indices advancing RA-first. The structure
//! is fixed at construction: a tree of depth d always has 4^d leaves, however
//! the sources are distributed.

use std::fmt;

use skycorr_core::constants::DEG_TO_RAD;
use skycorr_core::math::{flat_ra_gap, patch_solid_angle};
use skycorr_core::Source;

#[derive(Debug)]
pub(crate) struct SkyNode {
    ra_center: f64,
    dec_center: f64,
    delta_ra: f64,
    delta_dec: f64,
    /// Approximate solid angle of the cell, square degrees. A branch carries
    /// the sum of its children's areas, never an independent recomputation.
    area: f64,
    /// Sources in this subtree. Zero until the aggregation pass runs.
    count: usize,
    density: f64,
    kind: NodeKind,
}

#[derive(Debug)]
enum NodeKind {
    Leaf { sources: Vec<Source> },
    Branch { children: Box<[SkyNode; 4]> },
}

impl SkyNode {
    /// Recursively constructs the subtree for one cell of the partition.
    ///
    /// `depth` counts the levels remaining below this node: 0 produces a
    /// leaf, anything larger a branch over the four equal sub-boxes split at
    /// the cell center.
    pub(crate) fn build(depth: u32, min_ra: f64, max_ra: f64, min_dec: f64, max_dec: f64) -> Self {
        let delta_ra = 0.5 * (max_ra - min_ra);
        let ra_center = max_ra - delta_ra;
        let delta_dec = 0.5 * (max_dec - min_dec);
        let dec_center = max_dec - delta_dec;

        if depth == 0 {
            return Self {
                ra_center,
                dec_center,
                delta_ra,
                delta_dec,
                area: patch_solid_angle(min_ra, max_ra, min_dec, max_dec),
                count: 0,
                density: 0.0,
                kind: NodeKind::Leaf {
                    sources: Vec::new(),
                },
            };
        }

        let children = Box::new([
            Self::build(depth - 1, min_ra, ra_center, min_dec, dec_center),
            Self::build(depth - 1, ra_center, max_ra, min_dec, dec_center),
            Self::build(depth - 1, min_ra, ra_center, dec_center, max_dec),
            Self::build(depth - 1, ra_center, max_ra, dec_center, max_dec),
        ]);
        let area = children.iter().map(|c| c.area).sum();

        Self {
            ra_center,
            dec_center,
            delta_ra,
            delta_dec,
            area,
            count: 0,
            density: 0.0,
            kind: NodeKind::Branch { children },
        }
    }

    /// Which quadrant the (offset-adjusted) coordinates fall into.
    ///
    /// The same comparison routes insertion and queries, so a source and a
    /// query at the same position always land in the same child.
    fn quadrant(&self, ra: f64, dec: f64) -> usize {
        if ra < self.ra_center {
            if dec < self.dec_center {
                0
            } else {
                2
            }
        } else if dec < self.dec_center {
            1
        } else {
            3
        }
    }

    /// Routes a source down to its leaf. No occupancy limit: a leaf holds
    /// however many sources its cell receives.
    pub(crate) fn insert(&mut self, source: Source, ra_offset: f64) {
        let q = self.quadrant(source.ra + ra_offset, source.dec);
        match &mut self.kind {
            NodeKind::Leaf { sources } => sources.push(source),
            NodeKind::Branch { children } => children[q].insert(source, ra_offset),
        }
    }

    /// Post-order statistics pass: leaf counts from their source lists,
    /// branch counts as child sums, densities as count over area.
    pub(crate) fn aggregate(&mut self) {
        match &mut self.kind {
            NodeKind::Leaf { sources } => {
                self.count = sources.len();
            }
            NodeKind::Branch { children } => {
                let mut total = 0;
                for child in children.iter_mut() {
                    child.aggregate();
                    total += child.count;
                }
                self.count = total;
            }
        }
        self.density = self.count as f64 / self.area;
    }

    /// Collects every source within `(min_angle_rad, angle_deg]` of the
    /// target into `out`.
    ///
    /// Branch: the target's own quadrant is always a candidate (the target
    /// may sit arbitrarily close to its cell boundary). The vertically
    /// adjacent quadrant joins when the search angle exceeds the Dec gap to
    /// the split, the horizontally adjacent one when it exceeds the flat-sky
    /// RA gap. Three candidates imply the search square crosses both split
    /// lines, so the diagonal quadrant must join too — square intersection
    /// rather than circle intersection, deliberately over-inclusive.
    /// Children with an aggregated count of zero are never descended.
    ///
    /// Leaf: exact haversine test against every held source. The floor
    /// excludes the target itself and numerically identical duplicates.
    pub(crate) fn find_sources<'a>(
        &'a self,
        target: &Source,
        angle_deg: f64,
        ra_offset: f64,
        min_angle_rad: f64,
        out: &mut Vec<&'a Source>,
    ) {
        match &self.kind {
            NodeKind::Leaf { sources } => {
                let angle_rad = angle_deg * DEG_TO_RAD;
                for source in sources {
                    let separation = source.haversine_distance(target);
                    if !(separation > angle_rad) && separation > min_angle_rad {
                        out.push(source);
                    }
                }
            }
            NodeKind::Branch { children } => {
                let target_ra = target.ra + ra_offset;
                let q = self.quadrant(target_ra, target.dec);

                let mut selected = [false; 4];
                selected[q] = true;
                let mut picked = 1;

                let dec_gap = if q < 2 {
                    self.dec_center - target.dec
                } else {
                    target.dec - self.dec_center
                };
                if angle_deg > dec_gap {
                    selected[q ^ 2] = true;
                    picked += 1;
                }

                let ra_gap = if q % 2 == 0 {
                    flat_ra_gap(self.ra_center, target_ra, target.dec)
                } else {
                    flat_ra_gap(target_ra, self.ra_center, target.dec)
                };
                if angle_deg > ra_gap {
                    selected[q ^ 1] = true;
                    picked += 1;
                }

                if picked == 3 {
                    selected = [true; 4];
                }

                for (child, wanted) in children.iter().zip(selected) {
                    if wanted && child.count > 0 {
                        child.find_sources(target, angle_deg, ra_offset, min_angle_rad, out);
                    }
                }
            }
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn area(&self) -> f64 {
        self.area
    }

    /// One line per node, children after their parent, `L`/`N` tagged.
    pub(crate) fn dump(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            NodeKind::Leaf { .. } => "L",
            NodeKind::Branch { .. } => "N",
        };
        writeln!(
            f,
            "{} {:8} {:12.6} {:6.2} [{:12.6}:{:12.6},{:12.6}:{:12.6}]",
            tag,
            self.count,
            self.area,
            self.density,
            self.ra_center - self.delta_ra,
            self.ra_center + self.delta_ra,
            self.dec_center - self.delta_dec,
            self.dec_center + self.delta_dec,
        )?;
        if let NodeKind::Branch { children } = &self.kind {
            for child in children.iter() {
                child.dump(f)?;
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn children(&self) -> Option<&[SkyNode; 4]> {
        match &self.kind {
            NodeKind::Leaf { .. } => None,
            NodeKind::Branch { children } => Some(children),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk<'a>(node: &'a SkyNode, visit: &mut impl FnMut(&'a SkyNode)) {
        visit(node);
        if let Some(children) = node.children() {
            for child in children {
                walk(child, visit);
            }
        }
    }

    #[test]
    fn test_area_equals_child_sum() {
        let root = SkyNode::build(3, 0.0, 40.0, -20.0, 20.0);
        walk(&root, &mut |node| {
            if let Some(children) = node.children() {
                let sum: f64 = children.iter().map(|c| c.area()).sum();
                assert_eq!(node.area(), sum);
            }
        });
    }

    #[test]
    fn test_leaf_count_at_depth() {
        let root = SkyNode::build(3, 0.0, 10.0, 0.0, 10.0);
        let mut leaves = 0;
        walk(&root, &mut |node| {
            if node.children().is_none() {
                leaves += 1;
            }
        });
        assert_eq!(leaves, 64);
    }

    #[test]
    fn test_children_tile_parent() {
        let root = SkyNode::build(1, 0.0, 10.0, 0.0, 10.0);
        let children = root.children().unwrap();
        // Quadrant 0 is low-RA/low-Dec, 3 is high-RA/high-Dec
        assert_eq!(children[0].ra_center, 2.5);
        assert_eq!(children[0].dec_center, 2.5);
        assert_eq!(children[1].ra_center, 7.5);
        assert_eq!(children[1].dec_center, 2.5);
        assert_eq!(children[2].ra_center, 2.5);
        assert_eq!(children[2].dec_center, 7.5);
        assert_eq!(children[3].ra_center, 7.5);
        assert_eq!(children[3].dec_center, 7.5);
    }

    #[test]
    fn test_insert_routes_to_expected_quadrant() {
        let mut root = SkyNode::build(1, 0.0, 10.0, 0.0, 10.0);
        root.insert(Source::new(1.0, 1.0), 0.0);
        root.insert(Source::new(9.0, 1.0), 0.0);
        root.insert(Source::new(1.0, 9.0), 0.0);
        root.insert(Source::new(9.0, 9.0), 0.0);
        root.insert(Source::new(5.0, 5.0), 0.0); // boundary: >= center goes high
        root.aggregate();

        let counts: Vec<usize> = root.children().unwrap().iter().map(|c| c.count()).collect();
        assert_eq!(counts, vec![1, 1, 1, 2]);
        assert_eq!(root.count(), 5);
    }

    #[test]
    fn test_aggregate_count_conservation() {
        let mut root = SkyNode::build(2, 0.0, 10.0, 0.0, 10.0);
        for i in 0..50 {
            let frac = i as f64 / 50.0;
            root.insert(Source::new(10.0 * frac, 10.0 * (1.0 - frac)), 0.0);
        }
        root.aggregate();

        walk(&root, &mut |node| {
            if let Some(children) = node.children() {
                let sum: usize = children.iter().map(|c| c.count()).sum();
                assert_eq!(node.count(), sum);
            }
        });
        assert_eq!(root.count(), 50);
    }

    #[test]
    fn test_density_after_aggregate() {
        let mut root = SkyNode::build(1, 0.0, 10.0, 0.0, 10.0);
        root.insert(Source::new(2.0, 2.0), 0.0);
        root.aggregate();
        assert!((root.density - 1.0 / root.area()).abs() < 1e-15);
    }

    #[test]
    fn test_count_zero_before_aggregate() {
        let mut root = SkyNode::build(1, 0.0, 10.0, 0.0, 10.0);
        root.insert(Source::new(2.0, 2.0), 0.0);
        assert_eq!(root.count(), 0);
    }
}

//! Jackknife resampling regions.
//!
//! Error estimation for correlation measurements resamples the catalog by
//! spatial region: drop one region, re-measure, repeat. The partitioner here
//! is a full binary BSP tree of a configured level over the sources' unit
//! vectors — at each split the Cartesian axis with the largest spread is cut
//! at its mean, so regions follow the actual footprint of the data rather
//! than a fixed RA/Dec grid. A tree of level L yields `2^L` regions with
//! sequential ids.

use skycorr_core::{Axis, CorrError, CorrResult, Source};

/// Level ceiling, matching the quadtree's depth ceiling.
pub const MAX_LEVEL: u32 = 20;

#[derive(Debug)]
enum JkNode {
    Leaf {
        id: usize,
    },
    Split {
        axis: Axis,
        value: f64,
        left: Box<JkNode>,
        right: Box<JkNode>,
    },
}

/// Assigns sources to jackknife regions.
#[derive(Debug)]
pub struct JackknifeTree {
    root: JkNode,
    regions: usize,
}

impl JackknifeTree {
    /// Partitions `sources` into `2^level` regions.
    ///
    /// Splitting is data-driven: statistics over the slice pick the widest
    /// Cartesian axis, the slice is sorted on it, and the cut index starts
    /// at the median and walks to the mean boundary. Region ids are assigned
    /// left-to-right in construction order.
    ///
    /// # Errors
    /// [`CorrError::InvalidConfiguration`] for level 0, level beyond
    /// [`MAX_LEVEL`], fewer sources than regions, or data so degenerate a
    /// split would leave one side empty.
    pub fn build(level: u32, sources: &[Source]) -> CorrResult<Self> {
        if level == 0 {
            return Err(CorrError::invalid_configuration(
                "JackknifeTree::build",
                "level must be at least 1",
            ));
        }
        if level > MAX_LEVEL {
            return Err(CorrError::invalid_configuration(
                "JackknifeTree::build",
                "level exceeds the supported maximum of 20",
            ));
        }
        let leaves = 1usize << level;
        if sources.len() < leaves {
            return Err(CorrError::invalid_configuration(
                "JackknifeTree::build",
                "fewer sources than requested regions",
            ));
        }

        let mut points: Vec<[f64; 3]> = sources.iter().map(|s| s.unit_vector()).collect();
        let mut next_id = 0;
        let root = build_node(level, &mut points, &mut next_id)?;

        Ok(Self {
            root,
            regions: next_id,
        })
    }

    /// Number of regions (`2^level`).
    pub fn regions(&self) -> usize {
        self.regions
    }

    /// The region id a source belongs to, in `0..regions()`.
    pub fn region(&self, source: &Source) -> usize {
        let mut node = &self.root;
        loop {
            match node {
                JkNode::Leaf { id } => return *id,
                JkNode::Split {
                    axis,
                    value,
                    left,
                    right,
                } => {
                    node = if source.cartesian(*axis) < *value {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn build_node(level: u32, points: &mut [[f64; 3]], next_id: &mut usize) -> CorrResult<JkNode> {
    if level == 0 {
        let id = *next_id;
        *next_id += 1;
        return Ok(JkNode::Leaf { id });
    }

    if points.len() < 2 {
        return Err(CorrError::invalid_configuration(
            "JackknifeTree::build",
            "sources too clustered to split into the requested regions",
        ));
    }

    let (axis, value) = widest_axis(points);
    points.sort_by(|a, b| {
        component(a, axis)
            .partial_cmp(&component(b, axis))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let split = split_index(points, axis, value);

    let (lo, hi) = points.split_at_mut(split);
    let left = build_node(level - 1, lo, next_id)?;
    let right = build_node(level - 1, hi, next_id)?;

    Ok(JkNode::Split {
        axis,
        value,
        left: Box::new(left),
        right: Box::new(right),
    })
}

#[inline]
fn component(point: &[f64; 3], axis: Axis) -> f64 {
    match axis {
        Axis::X => point[0],
        Axis::Y => point[1],
        Axis::Z => point[2],
    }
}

fn stats(points: &[[f64; 3]], axis: Axis) -> (f64, f64) {
    let n = points.len() as f64;
    let mean = points.iter().map(|p| component(p, axis)).sum::<f64>() / n;
    let variance = points
        .iter()
        .map(|p| {
            let d = component(p, axis) - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean, libm::sqrt(variance))
}

/// The axis with the largest standard deviation, and its mean as the split
/// value.
fn widest_axis(points: &[[f64; 3]]) -> (Axis, f64) {
    let (mean_x, sigma_x) = stats(points, Axis::X);
    let (mean_y, sigma_y) = stats(points, Axis::Y);
    let (mean_z, sigma_z) = stats(points, Axis::Z);

    if sigma_x > sigma_y {
        if sigma_x > sigma_z {
            (Axis::X, mean_x)
        } else {
            (Axis::Z, mean_z)
        }
    } else if sigma_y > sigma_z {
        (Axis::Y, mean_y)
    } else {
        (Axis::Z, mean_z)
    }
}

/// Cut index into a slice sorted on `axis`: start at the median, walk toward
/// the mean boundary, and keep both halves non-empty.
fn split_index(points: &[[f64; 3]], axis: Axis, value: f64) -> usize {
    let mut index = points.len() / 2;

    if value < component(&points[index], axis) {
        while index > 0 && component(&points[index - 1], axis) >= value {
            index -= 1;
        }
    } else {
        while index < points.len() && component(&points[index], axis) <= value {
            index += 1;
        }
    }

    index.clamp(1, points.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_sources() -> Vec<Source> {
        let mut sources = Vec::new();
        for i in 0..8 {
            for j in 0..8 {
                sources.push(Source::new(10.0 + i as f64, -5.0 + j as f64));
            }
        }
        sources
    }

    #[test]
    fn test_rejects_level_zero() {
        let err = JackknifeTree::build(0, &grid_sources()).unwrap_err();
        assert!(matches!(err, CorrError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_rejects_too_few_sources() {
        let sources = vec![Source::new(0.0, 0.0), Source::new(1.0, 1.0)];
        assert!(JackknifeTree::build(2, &sources).is_err());
    }

    #[test]
    fn test_region_count() {
        let tree = JackknifeTree::build(3, &grid_sources()).unwrap();
        assert_eq!(tree.regions(), 8);
    }

    #[test]
    fn test_all_sources_assigned_in_range() {
        let sources = grid_sources();
        let tree = JackknifeTree::build(2, &sources).unwrap();
        for source in &sources {
            assert!(tree.region(source) < tree.regions());
        }
    }

    #[test]
    fn test_regions_roughly_balanced() {
        // Mean-centered splits over a uniform grid stay close to even
        let sources = grid_sources();
        let tree = JackknifeTree::build(2, &sources).unwrap();

        let mut counts = vec![0usize; tree.regions()];
        for source in &sources {
            counts[tree.region(source)] += 1;
        }
        for &count in &counts {
            assert!(count >= 8, "unbalanced region: {:?}", counts);
        }
    }

    #[test]
    fn test_assignment_deterministic() {
        let sources = grid_sources();
        let a = JackknifeTree::build(2, &sources).unwrap();
        let b = JackknifeTree::build(2, &sources).unwrap();
        for source in &sources {
            assert_eq!(a.region(source), b.region(source));
        }
    }

    #[test]
    fn test_spatially_separated_clumps_split_apart() {
        let mut sources = Vec::new();
        for i in 0..16 {
            sources.push(Source::new(10.0 + 0.1 * i as f64, 0.0));
            sources.push(Source::new(60.0 + 0.1 * i as f64, 0.0));
        }
        let tree = JackknifeTree::build(1, &sources).unwrap();

        let low = tree.region(&Source::new(10.5, 0.0));
        let high = tree.region(&Source::new(60.5, 0.0));
        assert_ne!(low, high);
    }
}

//! Catalog loading, separation binning and pair counting.
//!
//! The pipeline layer over the quadtree index:
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Text/gzip catalog reading, precomputed-record round-trips |
//! | [`bins`] | [`LogBins`] geometric separation bins, [`PairCounts`] accumulator |
//! | [`paircount`] | [`count_pairs`] over the index, [`count_pairs_brute`] reference |
//!
//! # Quick Start
//!
//! ```no_run
//! use skycorr_index::{SkyBounds, SkyQuadTree, TreeConfig};
//! use skycorr_pairs::{count_pairs, read_sources, LogBins};
//!
//! let sources = read_sources("catalog.dat", 0, 1)?;
//!
//! let bounds = SkyBounds::new(0.0, 10.0, 0.0, 10.0)?;
//! let mut tree = SkyQuadTree::new(TreeConfig::new(4, bounds))?;
//! tree.extend(sources.iter().copied());
//! tree.aggregate();
//!
//! let bins = LogBins::new(2.0 / 3600.0, 1.0, 16)?;
//! let counts = count_pairs(&tree, &sources, &bins)?;
//! println!("{:?}", counts.counts());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod bins;
pub mod catalog;
pub mod paircount;

pub use bins::{LogBins, PairCounts};
pub use catalog::{
    read_precomputed, read_redshift_sources, read_sources, read_sources_filtered,
    write_precomputed,
};
pub use paircount::{count_pairs, count_pairs_brute};

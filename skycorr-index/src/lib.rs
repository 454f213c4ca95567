//! Spatial indexes for sky correlation measurements.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`quadtree`] | Fixed-depth RA/Dec quadtree with angle-bounded neighbor queries |
//! | [`jackknife`] | Variance-split BSP partitioner for resampling regions |
//!
//! The quadtree is the workhorse: build it once over a declared box, fill it
//! from a catalog, aggregate, then run an angle-bounded query for every
//! source in the catalog (serially or fanned out over a worker pool). The
//! jackknife tree shares the build-once philosophy but splits on the data
//! itself rather than fixed quadrants.

pub mod jackknife;
pub mod quadtree;

pub use jackknife::JackknifeTree;
pub use quadtree::{SkyBounds, SkyQuadTree, TreeConfig};

//! Core types for angular correlation measurements over sky catalogs.
//!
//! This crate holds the pieces every other `skycorr` crate builds on:
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`source`] | [`Source`] records with precomputed trigonometry and distance methods |
//! | [`math`] | Haversine separation, flat-sky RA gap, patch solid angle |
//! | [`constants`] | Angular conversion factors, the arcsecond identity floor |
//! | [`errors`] | [`CorrError`] / [`CorrResult`] |
//!
//! # Quick Start
//!
//! ```
//! use skycorr_core::Source;
//!
//! let a = Source::new(10.0, 10.0);
//! let b = Source::new(11.0, 11.0);
//!
//! // Exact form, radians
//! let sep = a.haversine_distance(&b);
//! assert!(sep > 0.0);
//!
//! // Precomputed form: no trig evaluated per comparison
//! let cos_sep = a.cos_theta(&b);
//! assert!((sep.cos() - cos_sep).abs() < 1e-9);
//! ```

pub mod constants;
pub mod errors;
pub mod math;
pub mod source;

pub use errors::{CorrError, CorrResult};
pub use source::{Axis, Source};

//! Sources decorated with redshift and comoving distance.

use std::fmt;

use skycorr_core::{CorrResult, Source};

use crate::distance::Cosmology;

/// A [`Source`] with a redshift and its precomputed line-of-sight comoving
/// distance.
///
/// The comoving distance is evaluated once at construction, so spatial
/// separations during correlation measurements need no further integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedshiftSource {
    /// The angular position with precomputed trig.
    pub source: Source,
    /// Redshift.
    pub z: f64,
    /// Line-of-sight comoving distance at `z`, in h⁻¹ Mpc.
    pub comoving: f64,
}

impl RedshiftSource {
    /// Creates a redshift source, integrating the comoving distance under
    /// `cosmology`.
    ///
    /// # Errors
    /// Propagates a non-convergent distance integral.
    pub fn new(ra_deg: f64, dec_deg: f64, z: f64, cosmology: &Cosmology) -> CorrResult<Self> {
        let comoving = cosmology.comoving_distance(z)?;
        Ok(Self {
            source: Source::new(ra_deg, dec_deg),
            z,
            comoving,
        })
    }

    /// Rebuilds from stored columns (precomputed catalog parsing path).
    pub fn from_precomputed(source: Source, z: f64, comoving: f64) -> Self {
        Self { source, z, comoving }
    }

    /// Difference of line-of-sight comoving distances, in h⁻¹ Mpc.
    pub fn delta_distance(&self, other: &RedshiftSource) -> f64 {
        (self.comoving - other.comoving).abs()
    }

    /// Squared 3-D comoving separation, in (h⁻¹ Mpc)².
    ///
    /// Law of cosines on the two lines of sight, with the angle from the
    /// precomputed cosine form; assumes a flat universe. Left squared so
    /// correlation loops can square the bin edges once instead of taking a
    /// root per pair.
    pub fn comoving_separation2(&self, other: &RedshiftSource) -> f64 {
        let d1 = self.comoving;
        let d2 = other.comoving;
        d1 * d1 + d2 * d2 - 2.0 * d1 * d2 * self.source.cos_theta(&other.source)
    }

    /// 3-D comoving separation, in h⁻¹ Mpc.
    pub fn comoving_separation(&self, other: &RedshiftSource) -> f64 {
        libm::sqrt(self.comoving_separation2(other))
    }
}

impl fmt::Display for RedshiftSource {
    /// Record format: `ra dec z sin_ra cos_ra sin_dec cos_dec comoving`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:13.10} {:13.10} {:6.4} {:14.12} {:14.12} {:14.12} {:14.12} {:15.10}",
            self.source.ra,
            self.source.dec,
            self.z,
            self.source.sin_ra,
            self.source.cos_ra,
            self.source.sin_dec,
            self.source.cos_dec,
            self.comoving
        )
    }
}

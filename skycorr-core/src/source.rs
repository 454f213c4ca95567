//! Source records with precomputed trigonometry.
//!
//! A [`Source`] holds one sky position (RA/Dec, degrees) together with the
//! sine and cosine of both coordinates, computed once at construction.
//! Correlation measurements compare every source against thousands of
//! neighbors; with the trig precomputed, [`Source::cos_theta`] reduces each
//! comparison to additions and multiplications.
//!
//! The precomputed form has a limiting accuracy of a few milliarcseconds —
//! `cos_theta` of a source with itself does not come out exactly 1. Distance
//! tests that must resolve an arcsecond-scale floor use
//! [`Source::haversine_distance`] instead.

use std::fmt;

use crate::constants::DEG_TO_RAD;
use crate::math::{clamp_unit, haversine_separation};

/// Cartesian axis selector for [`Source::cartesian`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// One sky position with precomputed trigonometric terms.
///
/// Constructed by [`Source::new`] (which derives the trig values) or
/// [`Source::from_precomputed`] (which trusts stored values, for catalogs
/// written by [`fmt::Display`]). Immutable after creation; `Copy` — nodes
/// and result sets share these freely.
///
/// Coordinates are degrees. RA is semantically [0, 360) and Dec [-90, 90],
/// but nothing validates or wraps: NaN and out-of-range inputs propagate
/// into NaN distances rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Source {
    /// Right ascension, in degrees.
    pub ra: f64,
    /// Declination, in degrees.
    pub dec: f64,
    /// sin(ra)
    pub sin_ra: f64,
    /// cos(ra)
    pub cos_ra: f64,
    /// sin(dec)
    pub sin_dec: f64,
    /// cos(dec)
    pub cos_dec: f64,
}

impl Source {
    /// Creates a source from RA/Dec in degrees, precomputing the trig terms.
    pub fn new(ra_deg: f64, dec_deg: f64) -> Self {
        let (sin_ra, cos_ra) = libm::sincos(ra_deg * DEG_TO_RAD);
        let (sin_dec, cos_dec) = libm::sincos(dec_deg * DEG_TO_RAD);

        Self {
            ra: ra_deg,
            dec: dec_deg,
            sin_ra,
            cos_ra,
            sin_dec,
            cos_dec,
        }
    }

    /// Rebuilds a source from stored precomputed columns without recomputing.
    ///
    /// Used when parsing catalogs previously written in the [`fmt::Display`]
    /// record format. The caller is responsible for the trig columns being
    /// consistent with `ra`/`dec`.
    pub fn from_precomputed(
        ra: f64,
        dec: f64,
        sin_ra: f64,
        cos_ra: f64,
        sin_dec: f64,
        cos_dec: f64,
    ) -> Self {
        Self {
            ra,
            dec,
            sin_ra,
            cos_ra,
            sin_dec,
            cos_dec,
        }
    }

    /// Exact angular separation in radians, via the haversine identity.
    ///
    /// Computed from the raw coordinates, not the precomputed trig, so the
    /// self-distance is exactly 0. This is the form used wherever an
    /// arcsecond-scale comparison matters.
    pub fn haversine_distance(&self, other: &Source) -> f64 {
        haversine_separation(
            self.ra * DEG_TO_RAD,
            self.dec * DEG_TO_RAD,
            other.ra * DEG_TO_RAD,
            other.dec * DEG_TO_RAD,
        )
    }

    /// Cosine of the angular separation, from precomputed terms only.
    ///
    /// The spherical law of cosines with `cos(Δra)` expanded through the
    /// angle-difference identity, so no trig function is evaluated here:
    ///
    /// `cosθ = cdec₁·cdec₂·(cra₁·cra₂ + sra₁·sra₂) + sdec₁·sdec₂`
    ///
    /// Not exact at very small separations: `cos_theta(a, a)` can fall a few
    /// ulps short of 1, which limits the resolvable angle to roughly 4
    /// milliarcseconds. Callers needing the identity to hold use
    /// [`Self::haversine_distance`].
    #[inline]
    pub fn cos_theta(&self, other: &Source) -> f64 {
        self.cos_dec * other.cos_dec * (self.cos_ra * other.cos_ra + self.sin_ra * other.sin_ra)
            + self.sin_dec * other.sin_dec
    }

    /// Angular separation in radians from the precomputed cosine form.
    ///
    /// The argument is clamped into `acos`'s domain first; drift past ±1
    /// yields 0 or π rather than NaN.
    #[inline]
    pub fn angular_distance(&self, other: &Source) -> f64 {
        libm::acos(clamp_unit(self.cos_theta(other)))
    }

    /// [`Self::angular_distance`] converted to degrees.
    pub fn angular_distance_degrees(&self, other: &Source) -> f64 {
        self.angular_distance(other).to_degrees()
    }

    /// One Cartesian component of the unit vector to this source.
    ///
    /// x = cos(dec)·cos(ra), y = cos(dec)·sin(ra), z = sin(dec). Uses only
    /// precomputed terms; the jackknife partitioner splits on these.
    #[inline]
    pub fn cartesian(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.cos_dec * self.cos_ra,
            Axis::Y => self.cos_dec * self.sin_ra,
            Axis::Z => self.sin_dec,
        }
    }

    /// The full unit vector `[x, y, z]` to this source.
    pub fn unit_vector(&self) -> [f64; 3] {
        [
            self.cartesian(Axis::X),
            self.cartesian(Axis::Y),
            self.cartesian(Axis::Z),
        ]
    }
}

impl fmt::Display for Source {
    /// Fixed-precision record format: `ra dec sin_ra cos_ra sin_dec cos_dec`.
    ///
    /// Twelve fractional digits on the trig columns — ten significant figures
    /// is the floor for numerical stability when records are parsed back.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:13.10} {:13.10} {:14.12} {:14.12} {:14.12} {:14.12}",
            self.ra, self.dec, self.sin_ra, self.cos_ra, self.sin_dec, self.cos_dec
        )
    }
}

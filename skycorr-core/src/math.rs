use crate::constants::{DEG_TO_RAD, RAD_TO_DEG};

/// Clamps a cosine/sine value into [-1, 1] before an inverse trig call.
/// Floating-point drift can push |x| fractionally past 1.
#[inline]
pub fn clamp_unit(x: f64) -> f64 {
    x.clamp(-1.0, 1.0)
}

/// Great-circle separation in radians via the haversine identity.
///
/// Numerically stable at small separations, unlike the spherical law of
/// cosines whose `acos` argument saturates near 1. The `min(1, ·)` guard
/// keeps rounding error out of `asin`'s domain.
#[inline]
pub fn haversine_separation(ra1_rad: f64, dec1_rad: f64, ra2_rad: f64, dec2_rad: f64) -> f64 {
    let half_dra = 0.5 * (ra1_rad - ra2_rad);
    let half_ddec = 0.5 * (dec1_rad - dec2_rad);

    let sin_ddec = libm::sin(half_ddec);
    let sin_dra = libm::sin(half_dra);

    let h = sin_ddec * sin_ddec + libm::cos(dec1_rad) * libm::cos(dec2_rad) * sin_dra * sin_dra;

    2.0 * libm::asin(libm::sqrt(h).min(1.0))
}

/// Flat-sky width of an RA difference at a given declination, in degrees.
///
/// `(ra1 - ra2) * cos(dec)` — a linear approximation, valid only for small
/// angles. Used as a cheap pruning pre-filter, never as a final accept test.
#[inline]
pub fn flat_ra_gap(ra1_deg: f64, ra2_deg: f64, dec_deg: f64) -> f64 {
    (ra1_deg - ra2_deg) * libm::cos(dec_deg * DEG_TO_RAD)
}

/// Approximate solid angle of an ra/dec-aligned patch, in square degrees.
///
/// Small-patch formula `Δra * (sin(dec_max) - sin(dec_min))`; not exact for
/// large patches, which is acceptable for the cell sizes the index produces.
#[inline]
pub fn patch_solid_angle(min_ra_deg: f64, max_ra_deg: f64, min_dec_deg: f64, max_dec_deg: f64) -> f64 {
    let sin_span = libm::sin(max_dec_deg * DEG_TO_RAD) - libm::sin(min_dec_deg * DEG_TO_RAD);
    (max_ra_deg - min_ra_deg) * sin_span * RAD_TO_DEG
}

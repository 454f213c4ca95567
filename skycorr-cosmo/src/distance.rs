//! Cosmological distance measures.
//!
//! Line-of-sight comoving, angular-diameter, and luminosity distances for a
//! flat FLRW cosmology, following the conventions of Hogg, astro-ph/9905116.
//! All distances are in units of h⁻¹ Mpc; the Hubble constant enters only
//! through the dimensionless `h0` scale factor.

use skycorr_core::constants::HUBBLE_DISTANCE_MPC;
use skycorr_core::CorrResult;

use crate::integrate::Trapezoid;

/// A flat two-component cosmology (matter + cosmological constant).
///
/// The default is the concordance model Ωm = 0.3, ΩΛ = 0.7, h = 1.
#[derive(Debug, Clone, Copy)]
pub struct Cosmology {
    omega_m: f64,
    omega_l: f64,
    h0: f64,
    integrator: Trapezoid,
}

impl Default for Cosmology {
    fn default() -> Self {
        Self::concordance()
    }
}

impl Cosmology {
    /// Cosmology with explicit density parameters and Hubble scale.
    pub fn new(omega_m: f64, omega_l: f64, h0: f64) -> Self {
        Self {
            omega_m,
            omega_l,
            h0,
            integrator: Trapezoid::new(),
        }
    }

    /// The concordance model: Ωm = 0.3, ΩΛ = 0.7, h = 1.
    pub fn concordance() -> Self {
        Self::new(0.3, 0.7, 1.0)
    }

    /// The dimensionless Hubble evolution E(z) = √(Ωm(1+z)³ + ΩΛ).
    pub fn evolution(&self, z: f64) -> f64 {
        libm::sqrt(self.omega_m * libm::pow(1.0 + z, 3.0) + self.omega_l)
    }

    /// Line-of-sight comoving distance D_C(z), in h⁻¹ Mpc.
    ///
    /// `(3000/h) ∫₀ᶻ dz'/E(z')`, evaluated by the extended trapezoid rule.
    ///
    /// # Errors
    /// [`skycorr_core::CorrError::MathError`] if the integral fails to
    /// converge.
    pub fn comoving_distance(&self, z: f64) -> CorrResult<f64> {
        let integral = self.integrator.integrate(|zp| 1.0 / self.evolution(zp), 0.0, z)?;
        Ok((HUBBLE_DISTANCE_MPC / self.h0) * integral)
    }

    /// Angular-diameter distance D_A(z) = D_C(z)/(1+z), in h⁻¹ Mpc.
    pub fn angular_diameter_distance(&self, z: f64) -> CorrResult<f64> {
        Ok(self.comoving_distance(z)? / (1.0 + z))
    }

    /// Luminosity distance D_L(z) = D_C(z)·(1+z), in h⁻¹ Mpc.
    pub fn luminosity_distance(&self, z: f64) -> CorrResult<f64> {
        Ok(self.comoving_distance(z)? * (1.0 + z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evolution_at_zero() {
        let c = Cosmology::concordance();
        assert!((c.evolution(0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_evolution_monotonic() {
        let c = Cosmology::concordance();
        assert!(c.evolution(1.0) > c.evolution(0.5));
        assert!(c.evolution(0.5) > c.evolution(0.0));
    }

    #[test]
    fn test_comoving_distance_at_zero() {
        let c = Cosmology::concordance();
        assert_eq!(c.comoving_distance(0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_luminosity_distance_reference_value() {
        // z = 0.558 reference point: 2265.876909 from this rule,
        // 2264.797863 from Romberg integration of the same integrand.
        let c = Cosmology::concordance();
        let dl = c.luminosity_distance(0.558).unwrap();
        assert!((dl - 2265.876909).abs() < 0.1);
    }

    #[test]
    fn test_distance_ordering() {
        // D_A < D_C < D_L at every positive redshift
        let c = Cosmology::concordance();
        let z = 0.843;
        let dm = c.comoving_distance(z).unwrap();
        let da = c.angular_diameter_distance(z).unwrap();
        let dl = c.luminosity_distance(z).unwrap();
        assert!(da < dm);
        assert!(dm < dl);
    }

    #[test]
    fn test_hubble_scaling() {
        let unit = Cosmology::new(0.3, 0.7, 1.0);
        let seventy = Cosmology::new(0.3, 0.7, 0.7);
        let dm_unit = unit.comoving_distance(0.5).unwrap();
        let dm_seventy = seventy.comoving_distance(0.5).unwrap();
        assert!((dm_seventy - dm_unit / 0.7).abs() < 1e-6 * dm_unit);
    }
}

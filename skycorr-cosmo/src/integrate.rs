//! Extended trapezoid integration.
//!
//! The distance integrals in this crate are smooth one-dimensional functions
//! over short ranges, so the extended trapezoid rule with interval doubling
//! converges in a handful of iterations. Each iteration halves the step,
//! reusing all previously sampled points.

use skycorr_core::{CorrError, CorrResult};

const DEFAULT_EPSILON: f64 = 1e-6;
const DEFAULT_MAX_ITERATIONS: usize = 25;

/// Extended trapezoid integrator with a relative convergence test.
#[derive(Debug, Clone, Copy)]
pub struct Trapezoid {
    epsilon: f64,
    max_iterations: usize,
}

impl Default for Trapezoid {
    fn default() -> Self {
        Self::new()
    }
}

impl Trapezoid {
    /// Integrator with the default tolerance (1e-6 relative, 25 doublings).
    pub fn new() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Integrator with a custom relative tolerance and iteration budget.
    pub fn with_tolerance(epsilon: f64, max_iterations: usize) -> Self {
        Self {
            epsilon,
            max_iterations,
        }
    }

    /// Integrates `f` over `[start, end]`.
    ///
    /// Equal limits short-circuit to 0 — the z = 0 case in distance
    /// calculations. Convergence is declared when successive refinements
    /// agree to within the relative tolerance.
    ///
    /// # Errors
    /// [`CorrError::MathError`] if the iteration budget is exhausted without
    /// convergence.
    pub fn integrate<F>(&self, f: F, start: f64, end: f64) -> CorrResult<f64>
    where
        F: Fn(f64) -> f64,
    {
        if start == end {
            return Ok(0.0);
        }

        let span = end - start;
        let mut result = 0.5 * span * (f(start) + f(end));
        let mut num_points = 1usize;
        let mut old_result = result;

        for _ in 1..self.max_iterations {
            let delta = span / num_points as f64;
            let mut midpoint_sum = 0.0;
            for i in 0..num_points {
                midpoint_sum += f(start + (i as f64 + 0.5) * delta);
            }

            result = 0.5 * (result + span * midpoint_sum / num_points as f64);
            num_points *= 2;

            if (result - old_result).abs() < self.epsilon * old_result.abs() {
                return Ok(result);
            }
            old_result = result;
        }

        Err(CorrError::math_error(
            "Trapezoid::integrate",
            "extended trapezoid rule did not converge",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_identity() {
        let t = Trapezoid::new();
        let result = t.integrate(|x| x, 0.0, 1.0).unwrap();
        assert!((result - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_integrate_equal_limits() {
        let t = Trapezoid::new();
        assert_eq!(t.integrate(|x| x * x, 2.0, 2.0).unwrap(), 0.0);
    }

    #[test]
    fn test_integrate_quadratic() {
        let t = Trapezoid::new();
        let result = t.integrate(|x| x * x, 0.0, 3.0).unwrap();
        assert!((result - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_integrate_inverse_evolution() {
        // The integrand of the comoving-distance integral at z = 0.558:
        // 3000 * (1 + z) * ∫ dz/E(z) is the luminosity distance.
        let t = Trapezoid::new();
        let integral = t
            .integrate(
                |z| 1.0 / libm::sqrt(0.3 * libm::pow(1.0 + z, 3.0) + 0.7),
                0.0,
                0.558,
            )
            .unwrap();
        let dl = 3000.0 * 1.558 * integral;
        assert!((dl - 2265.876909).abs() < 0.1);
    }

    #[test]
    fn test_no_convergence_is_error() {
        // One iteration cannot satisfy the convergence test
        let t = Trapezoid::with_tolerance(1e-12, 2);
        let err = t.integrate(|x| x * x * x, 0.0, 2.0).unwrap_err();
        assert!(err.to_string().contains("did not converge"));
    }
}

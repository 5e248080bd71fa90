use super::SimError;

/// Implements the constitutive model relating saturation to mobility and fractional flow
///
/// With the relative permeabilities `k_rw = s²` and `k_ro = (1 - s)²` and the viscosity
/// ratio `μ_rel = μ_w / μ_o` (water w.r.t. oil):
///
/// ```text
/// λ(s) = s²/μ_rel + (1 - s)²
///
///                s²
/// F(s) = ————————————————————
///        s² + μ_rel (1 - s)²
/// ```
///
/// The functions are evaluated at integration points without clamping `s`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mobility {
    /// Viscosity ratio μ_rel > 0
    mu_rel: f64,
}

impl Mobility {
    /// Allocates a new instance
    pub fn new(mu_rel: f64) -> Result<Self, SimError> {
        if !(mu_rel > 0.0) || !mu_rel.is_finite() {
            return Err(SimError::Configuration("mu_rel must be > 0.0".to_string()));
        }
        Ok(Mobility { mu_rel })
    }

    /// Returns the viscosity ratio
    pub fn mu_rel(&self) -> f64 {
        self.mu_rel
    }

    /// Calculates the inverse of the total mobility 1/λ(s)
    pub fn total_mobility_inverse(&self, s: f64) -> f64 {
        1.0 / (s * s / self.mu_rel + (1.0 - s) * (1.0 - s))
    }

    /// Calculates the derivative of the inverse of the total mobility d(1/λ)/ds
    pub fn total_mobility_inverse_deriv(&self, s: f64) -> f64 {
        let lambda = s * s / self.mu_rel + (1.0 - s) * (1.0 - s);
        let d_lambda = 2.0 * s / self.mu_rel - 2.0 * (1.0 - s);
        -d_lambda / (lambda * lambda)
    }

    /// Calculates the fractional flow function F(s)
    pub fn fractional_flow(&self, s: f64) -> f64 {
        let den = s * s + self.mu_rel * (1.0 - s) * (1.0 - s);
        s * s / den
    }

    /// Calculates the derivative of the fractional flow function dF/ds
    ///
    /// ```text
    /// dF     2 μ_rel s (1 - s)
    /// —— = ————————————————————————
    /// ds   (s² + μ_rel (1 - s)²)²
    /// ```
    pub fn fractional_flow_deriv(&self, s: f64) -> f64 {
        let den = s * s + self.mu_rel * (1.0 - s) * (1.0 - s);
        2.0 * self.mu_rel * s * (1.0 - s) / (den * den)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

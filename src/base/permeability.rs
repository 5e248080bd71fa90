use serde::{Deserialize, Serialize};

/// Defines the (intrinsic) permeability field K(x)
///
/// The field is symmetric positive-definite, spatially varying, and constant in time.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub enum Permeability {
    /// Constant isotropic permeability K = k I
    Isotropic(f64),

    /// Constant anisotropic permeability tensor
    Tensor { kxx: f64, kyy: f64, kxy: f64 },

    /// Curved high-permeability channel crossing the unit square horizontally
    ///
    /// ```text
    ///                 1
    /// K⁻¹ = ——————————————————————————————————————— I
    ///       max(exp(-((y - 0.5 - 0.1 sin(10 x))/0.1)²), 0.01)
    /// ```
    Channel,
}

impl Permeability {
    /// Returns an error message if the parameters do not define an SPD tensor
    pub fn validate(&self) -> Option<String> {
        match self {
            Permeability::Isotropic(k) => {
                if !(*k > 0.0) || !k.is_finite() {
                    return Some(format!("isotropic permeability = {:?} is incorrect; it must be > 0.0", k));
                }
            }
            Permeability::Tensor { kxx, kyy, kxy } => {
                let det = kxx * kyy - kxy * kxy;
                if !(*kxx > 0.0) || !(det > 0.0) || !det.is_finite() {
                    return Some(format!(
                        "permeability tensor (kxx = {:?}, kyy = {:?}, kxy = {:?}) is not positive-definite",
                        kxx, kyy, kxy
                    ));
                }
            }
            Permeability::Channel => (),
        }
        None
    }

    /// Calculates the inverse of the permeability tensor at a point
    pub fn inverse(&self, x: &[f64]) -> [[f64; 2]; 2] {
        match self {
            Permeability::Isotropic(k) => [[1.0 / k, 0.0], [0.0, 1.0 / k]],
            Permeability::Tensor { kxx, kyy, kxy } => {
                let det = kxx * kyy - kxy * kxy;
                [[kyy / det, -kxy / det], [-kxy / det, kxx / det]]
            }
            Permeability::Channel => {
                let d = (x[1] - 0.5 - 0.1 * f64::sin(10.0 * x[0])) / 0.1;
                let k = f64::max(f64::exp(-d * d), 0.01);
                [[1.0 / k, 0.0], [0.0, 1.0 / k]]
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Permeability;
    use russell_lab::approx_eq;

    #[test]
    fn validate_works() {
        assert_eq!(Permeability::Isotropic(1.0).validate(), None);
        assert_eq!(Permeability::Channel.validate(), None);
        assert_eq!(
            Permeability::Isotropic(0.0).validate(),
            Some("isotropic permeability = 0.0 is incorrect; it must be > 0.0".to_string())
        );
        let p = Permeability::Tensor {
            kxx: 1.0,
            kyy: 1.0,
            kxy: 2.0,
        };
        assert_eq!(
            p.validate(),
            Some("permeability tensor (kxx = 1.0, kyy = 1.0, kxy = 2.0) is not positive-definite".to_string())
        );
    }

    #[test]
    fn inverse_works() {
        let kinv = Permeability::Isotropic(4.0).inverse(&[0.3, 0.2]);
        assert_eq!(kinv, [[0.25, 0.0], [0.0, 0.25]]);

        let p = Permeability::Tensor {
            kxx: 2.0,
            kyy: 3.0,
            kxy: 1.0,
        };
        let kinv = p.inverse(&[0.0, 0.0]);
        // K K⁻¹ = I
        approx_eq(2.0 * kinv[0][0] + 1.0 * kinv[1][0], 1.0, 1e-15);
        approx_eq(2.0 * kinv[0][1] + 1.0 * kinv[1][1], 0.0, 1e-15);
        approx_eq(1.0 * kinv[0][0] + 3.0 * kinv[1][0], 0.0, 1e-15);
        approx_eq(1.0 * kinv[0][1] + 3.0 * kinv[1][1], 1.0, 1e-15);
    }

    #[test]
    fn channel_works() {
        // center of the channel at x = 0
        let kinv = Permeability::Channel.inverse(&[0.0, 0.5]);
        approx_eq(kinv[0][0], 1.0, 1e-15);
        assert_eq!(kinv[0][1], 0.0);
        // far from the channel the permeability is clipped at 0.01
        let kinv = Permeability::Channel.inverse(&[0.0, 0.0]);
        approx_eq(kinv[1][1], 100.0, 1e-12);
        // the channel follows y = 0.5 + 0.1 sin(10 x)
        let x = 0.3;
        let kinv = Permeability::Channel.inverse(&[x, 0.5 + 0.1 * f64::sin(10.0 * x)]);
        approx_eq(kinv[0][0], 1.0, 1e-14);
    }
}

use crate::base::Config;
use crate::StrError;
use russell_lab::{vec_norm, Norm, Vector};

/// Controls the convergence of the Newton-Raphson iterations within a time step
///
/// The iterations converge when `‖R‖∞ < tol_rr_abs` or when `‖R‖∞ < tol_rr_rel · ‖R₀‖∞`,
/// where `R₀` is the residual at the first iteration of the time step.
pub struct ControlConvergence<'a> {
    config: &'a Config,
    iteration: usize,
    norm_rr0: f64,
    norm_rr_prev: f64,
    norm_rr: f64,
    norm_mdu: f64,
    converged_on_norm_rr: bool,
    diverging_on_norm_rr: bool,
    n_iterations_total: usize,
}

impl<'a> ControlConvergence<'a> {
    /// Allocates a new instance
    pub fn new(config: &'a Config) -> Self {
        ControlConvergence {
            config,
            iteration: 0,
            norm_rr0: 0.0,
            norm_rr_prev: 0.0,
            norm_rr: 0.0,
            norm_mdu: 0.0,
            converged_on_norm_rr: false,
            diverging_on_norm_rr: false,
            n_iterations_total: 0,
        }
    }

    /// Resets convergence flags for a new time step
    pub fn reset(&mut self) {
        self.iteration = 0;
        self.norm_mdu = 0.0;
        self.converged_on_norm_rr = false;
        self.diverging_on_norm_rr = false;
    }

    /// Returns whether the iterations have converged
    pub fn converged(&self) -> bool {
        self.converged_on_norm_rr
    }

    /// Returns the current norm of the residual vector
    pub fn norm_rr(&self) -> f64 {
        self.norm_rr
    }

    /// Returns the total number of linear solves (over all time steps)
    pub fn n_iterations_total(&self) -> usize {
        self.n_iterations_total
    }

    /// Analyzes the convergence based on the residual vector
    ///
    /// Returns an error if NaN or Inf values are found in R.
    pub(crate) fn analyze_rr(&mut self, iteration: usize, rr: &Vector) -> Result<(), StrError> {
        // record iteration index
        self.iteration = iteration;

        // compute the norm of R
        self.norm_rr = vec_norm(rr, Norm::Max);
        if iteration == 0 {
            self.norm_rr0 = self.norm_rr;
        }

        // check for NaN or Inf
        let found_nan_or_inf = !self.norm_rr.is_finite();

        // check convergence
        self.converged_on_norm_rr = if found_nan_or_inf {
            false
        } else {
            self.norm_rr < self.config.tol_rr_abs || self.norm_rr < self.config.tol_rr_rel * self.norm_rr0
        };

        // check if diverging
        self.diverging_on_norm_rr = if found_nan_or_inf || iteration == 0 {
            false
        } else {
            self.norm_rr > self.norm_rr_prev
        };

        // record the norm at subsequent iterations
        self.norm_rr_prev = self.norm_rr;

        // done
        if found_nan_or_inf {
            Err("found NaN or Inf in the residual vector")
        } else {
            Ok(())
        }
    }

    /// Records the norm of the Newton update
    pub(crate) fn analyze_mdu(&mut self, mdu: &Vector) {
        self.norm_mdu = vec_norm(mdu, Norm::Max);
        self.n_iterations_total += 1;
    }

    /// Prints the header before time stepping
    pub fn print_header(&self) {
        if self.config.verbose_timesteps || self.config.verbose_iterations {
            println!("\nTPFLOW === TIME STEPPING AND CONVERGENCE STATISTICS ===========================");
            println!("\nLegend:");
            println!("✅ : converged");
            println!("🔹 : converging");
            println!("🎈 : diverging");
            println!("\"iter\" means iteration\n");
            println!("{}", "─".repeat(64));
            println!(
                "{:8} {:>11} {:>11} {:>5} {:>9} {:>9}",
                "timestep", "t", "Δt", "iter", "‖mdu‖∞", "‖R‖∞"
            );
            println!("{}", "─".repeat(64));
        }
    }

    /// Prints time step information
    pub(crate) fn print_timestep(&self, timestep: usize, t: f64, dt: f64) {
        if self.config.verbose_timesteps {
            println!("{:>8} {:>11.6e} {:>11.6e}", timestep, t, dt);
        }
    }

    /// Prints iteration information
    pub(crate) fn print_iteration(&self) {
        if self.config.verbose_iterations {
            let icon = if self.converged_on_norm_rr {
                "✅"
            } else if self.diverging_on_norm_rr {
                "🎈"
            } else {
                "🔹"
            };
            if self.iteration == 0 {
                println!(
                    "{:>8} {:>11} {:>11} {:>5} {:>9} {:>9.2e} {}",
                    "·", "·", "·", self.iteration, "·", self.norm_rr, icon
                );
            } else {
                println!(
                    "{:>8} {:>11} {:>11} {:>5} {:>9.2e} {:>9.2e} {}",
                    "·", "·", "·", self.iteration, self.norm_mdu, self.norm_rr, icon
                );
            }
        }
    }

    /// Prints the horizontal line at the end of the analysis
    pub(crate) fn print_footer(&self) {
        if self.config.verbose_timesteps || self.config.verbose_iterations {
            println!("{}", "─".repeat(64));
            println!("total number of iterations = {}", self.n_iterations_total);
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::ControlConvergence;
    use crate::base::Config;
    use russell_lab::Vector;

    #[test]
    fn analyze_rr_works() {
        let mut config = Config::new();
        config.set_tol_rr(1e-10, 1e-3);
        let mut control = ControlConvergence::new(&config);
        control.reset();

        control.analyze_rr(0, &Vector::from(&[1.0, -2.0])).unwrap();
        assert_eq!(control.norm_rr(), 2.0);
        assert!(!control.converged());

        control.analyze_rr(1, &Vector::from(&[0.5, 0.1])).unwrap();
        assert!(!control.converged());
        assert!(!control.diverging_on_norm_rr);

        control.analyze_rr(2, &Vector::from(&[0.6, 0.1])).unwrap();
        assert!(control.diverging_on_norm_rr);

        // relative criterion: 1e-3 · 2.0
        control.analyze_rr(3, &Vector::from(&[1.9e-3, 0.0])).unwrap();
        assert!(control.converged());

        // absolute criterion
        control.reset();
        control.analyze_rr(0, &Vector::from(&[1e-11, 0.0])).unwrap();
        assert!(control.converged());

        assert_eq!(
            control.analyze_rr(1, &Vector::from(&[f64::NAN, 0.0])).err(),
            Some("found NaN or Inf in the residual vector")
        );
        assert!(!control.converged());
    }

    #[test]
    fn analyze_mdu_works() {
        let config = Config::new();
        let mut control = ControlConvergence::new(&config);
        control.analyze_mdu(&Vector::from(&[0.5, -3.0]));
        control.analyze_mdu(&Vector::from(&[0.1, 0.0]));
        assert_eq!(control.norm_mdu, 0.1);
        assert_eq!(control.n_iterations_total(), 2);
    }
}

//! Bounded scalar iterations.

use crate::error::SolverError;
use tracing::{debug, trace};

/// Scalar Newton configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Converged when the last Newton step is smaller than this (units of x)
    pub step_tol: f64,
    /// Converged when |residual| is at or below this (0 disables the check)
    pub residual_tol: f64,
    /// Relative perturbation used for the finite-difference slope
    pub fd_rel_step: f64,
    /// Largest step as a fraction of |x|
    pub max_step_rel: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            step_tol: 1e-9,
            residual_tol: 0.0,
            fd_rel_step: 1e-6,
            max_step_rel: 0.5,
        }
    }
}

impl NewtonConfig {
    /// Default configuration with the given step tolerance.
    pub fn with_step_tol(step_tol: f64) -> Self {
        Self {
            step_tol,
            ..Self::default()
        }
    }
}

/// Result of a converged scalar iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarRoot {
    pub x: f64,
    /// Residual at `x`
    pub residual: f64,
    pub iterations: usize,
}

/// Newton iteration on `f(x) = 0` with a forward-difference slope.
///
/// Steps are limited to `max_step_rel * |x|`. Errors raised by `f` are
/// propagated unchanged; running out of iterations is
/// [`SolverError::ConvergenceFailed`] converted into the caller's error type.
pub fn newton_scalar<E, F>(
    what: &str,
    x0: f64,
    config: &NewtonConfig,
    mut f: F,
) -> Result<ScalarRoot, E>
where
    E: From<SolverError>,
    F: FnMut(f64) -> Result<f64, E>,
{
    let mut x = x0;
    let mut r = f(x)?;

    for iter in 1..=config.max_iterations {
        if r == 0.0 {
            return Ok(ScalarRoot {
                x,
                residual: r,
                iterations: iter - 1,
            });
        }

        let h = config.fd_rel_step * x.abs().max(1e-9);
        let slope = (f(x + h)? - r) / h;
        if !slope.is_finite() || slope == 0.0 {
            return Err(SolverError::Numeric {
                what: format!("{what}: zero or non-finite slope at x = {x}"),
            }
            .into());
        }

        let mut dx = -r / slope;
        let max_step = config.max_step_rel * x.abs();
        if max_step > 0.0 {
            dx = dx.clamp(-max_step, max_step);
        }
        x += dx;
        r = f(x)?;
        trace!(what, iter, x, residual = r, "newton step");

        if dx.abs() < config.step_tol || r.abs() <= config.residual_tol {
            debug!(what, iterations = iter, x, residual = r, "newton converged");
            return Ok(ScalarRoot {
                x,
                residual: r,
                iterations: iter,
            });
        }
    }

    Err(SolverError::ConvergenceFailed {
        what: what.to_string(),
        iterations: config.max_iterations,
        residual: r,
    }
    .into())
}

/// Fixed-point iteration configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPointConfig {
    pub max_iterations: usize,
    /// Converged when successive iterates differ by less than this
    pub abs_tol: f64,
}

impl Default for FixedPointConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            abs_tol: 1e-4,
        }
    }
}

/// Iterate `x = g(x)` until successive values agree within `abs_tol`.
///
/// The reported residual is the last change `g(x) - x`.
pub fn fixed_point<E, G>(
    what: &str,
    x0: f64,
    config: &FixedPointConfig,
    mut g: G,
) -> Result<ScalarRoot, E>
where
    E: From<SolverError>,
    G: FnMut(f64) -> Result<f64, E>,
{
    let mut x = x0;
    let mut change = f64::INFINITY;
    for iter in 1..=config.max_iterations {
        let next = g(x)?;
        if !next.is_finite() {
            return Err(SolverError::Numeric {
                what: format!("{what}: non-finite iterate"),
            }
            .into());
        }
        change = next - x;
        x = next;
        if change.abs() < config.abs_tol {
            debug!(what, iterations = iter, x, "fixed point converged");
            return Ok(ScalarRoot {
                x,
                residual: change,
                iterations: iter,
            });
        }
    }
    Err(SolverError::ConvergenceFailed {
        what: what.to_string(),
        iterations: config.max_iterations,
        residual: change,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverResult;

    #[test]
    fn simple_quadratic() {
        // x^2 - 4 = 0 from the right
        let root: ScalarRoot =
            newton_scalar("quadratic", 5.0, &NewtonConfig::default(), |x| {
                SolverResult::Ok(x * x - 4.0)
            })
            .unwrap();
        assert!((root.x - 2.0).abs() < 1e-8);
        assert!(root.iterations < 20);
    }

    #[test]
    fn step_is_limited() {
        // A huge first step would cross zero; the clamp keeps x positive.
        let mut xs = Vec::new();
        let root = newton_scalar("log", 1.0, &NewtonConfig::default(), |x: f64| {
            xs.push(x);
            SolverResult::Ok(x.ln() - 5.0)
        })
        .unwrap();
        assert!(xs.iter().all(|x| *x > 0.0));
        assert!((root.x - 5.0_f64.exp()).abs() < 1e-6);
    }

    #[test]
    fn residual_tolerance_stops_early() {
        let config = NewtonConfig {
            step_tol: 0.0,
            residual_tol: 1e-3,
            ..NewtonConfig::default()
        };
        let root = newton_scalar("cubic", 3.0, &config, |x| SolverResult::Ok(x.powi(3) - 8.0))
            .unwrap();
        assert!(root.residual.abs() <= 1e-3);
    }

    #[test]
    fn budget_exhaustion_is_an_error() {
        let config = NewtonConfig {
            max_iterations: 3,
            step_tol: 0.0,
            ..NewtonConfig::default()
        };
        // no real root
        let err = newton_scalar("no root", 1.0, &config, |x| SolverResult::Ok(x * x + 1.0))
            .unwrap_err();
        assert!(matches!(
            err,
            SolverError::ConvergenceFailed { iterations: 3, .. }
        ));
    }

    #[test]
    fn flat_function_is_numeric_error() {
        let err = newton_scalar("flat", 1.0, &NewtonConfig::default(), |_| SolverResult::Ok(1.0))
            .unwrap_err();
        assert!(matches!(err, SolverError::Numeric { .. }));
    }

    #[test]
    fn closure_errors_propagate() {
        let err = newton_scalar("failing", 1.0, &NewtonConfig::default(), |_| {
            SolverResult::<f64>::Err(SolverError::InvalidArg { what: "boom" })
        })
        .unwrap_err();
        assert_eq!(err, SolverError::InvalidArg { what: "boom" });
    }

    #[test]
    fn fixed_point_cosine() {
        let root = fixed_point(
            "cos",
            1.0,
            &FixedPointConfig {
                max_iterations: 200,
                abs_tol: 1e-10,
            },
            |x: f64| SolverResult::Ok(x.cos()),
        )
        .unwrap();
        assert!((root.x - 0.739_085_133_2).abs() < 1e-8);
    }

    #[test]
    fn fixed_point_budget() {
        let err = fixed_point("diverging", 1.0, &FixedPointConfig::default(), |x: f64| {
            SolverResult::Ok(2.0 * x)
        })
        .unwrap_err();
        assert!(matches!(
            err,
            SolverError::ConvergenceFailed { iterations: 20, .. }
        ));
    }
}

//! Box-constrained Levenberg-Marquardt least squares.
//!
//! Each iteration linearizes the residuals, pins parameters that sit on a
//! bound with the descent direction pointing outward, solves the damped
//! normal equations for the remaining ones, and projects the trial point
//! back into the box.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::config::SolverConfig;
use crate::consts::{JTJ_DIAGONAL_FLOOR, MAX_LAMBDA, MIN_LAMBDA};
use crate::error::{CalvalError, Result};

use super::model::{FitModel, ParamBounds};
use super::peak::PeakSamples;

/// Outcome of a converged fit.
#[derive(Clone, Debug)]
pub struct FitReport {
    pub params: Vec<f64>,
    /// Half the sum of squared residuals at `params`.
    pub cost: f64,
    pub iterations: usize,
}

pub fn solve_bounded(
    model: FitModel,
    samples: &PeakSamples,
    initial: &[f64],
    bounds: &ParamBounds,
    config: &SolverConfig,
) -> Result<FitReport> {
    let m = model.n_params();
    let n = samples.len();
    if n < m {
        return Err(CalvalError::InsufficientSamples {
            required: m,
            available: n,
        });
    }
    for (i, &name) in model.param_names().iter().enumerate() {
        let (lo, hi) = (bounds.lower[i], bounds.upper[i]);
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(CalvalError::InfeasibleBounds {
                param: name,
                lower: lo,
                upper: hi,
            });
        }
    }

    let mut params = initial.to_vec();
    bounds.project(&mut params);

    let mut residuals = vec![0.0; n];
    let mut trial_residuals = vec![0.0; n];
    let mut cost = evaluate_cost(model, samples, &params, &mut residuals);
    if !cost.is_finite() {
        return Err(CalvalError::FitNotConverged {
            iterations: 0,
            cost,
        });
    }

    let mut lambda = config.initial_lambda;
    let mut jacobian = DMatrix::<f64>::zeros(n, m);

    for iteration in 1..=config.max_iterations {
        fill_jacobian(model, samples, &params, &mut jacobian);
        let r = DVector::from_column_slice(&residuals);
        let jtj = jacobian.transpose() * &jacobian;
        let grad = jacobian.transpose() * &r;

        let free: Vec<usize> = (0..m)
            .filter(|&i| !is_pinned(params[i], grad[i], bounds.lower[i], bounds.upper[i]))
            .collect();
        let projected_grad = free.iter().map(|&i| grad[i].abs()).fold(0.0, f64::max);

        if cost == 0.0 || free.is_empty() || projected_grad <= config.gtol {
            return Ok(converged(params, cost, iteration, "gradient"));
        }

        loop {
            let Some(delta) = damped_step(&jtj, &grad, &free, lambda) else {
                lambda *= config.lambda_up;
                if lambda > MAX_LAMBDA {
                    return Err(CalvalError::FitNotConverged {
                        iterations: iteration,
                        cost,
                    });
                }
                continue;
            };

            let mut trial = params.clone();
            for (k, &i) in free.iter().enumerate() {
                trial[i] += delta[k];
            }
            bounds.project(&mut trial);

            let step_norm = distance(&trial, &params);
            let small_step = step_norm <= config.xtol * (config.xtol + norm(&params));
            let trial_cost = evaluate_cost(model, samples, &trial, &mut trial_residuals);

            if trial_cost.is_finite() && trial_cost < cost {
                let reduction = cost - trial_cost;
                let previous = cost;
                params = trial;
                cost = trial_cost;
                std::mem::swap(&mut residuals, &mut trial_residuals);
                lambda = (lambda * config.lambda_down).max(MIN_LAMBDA);

                if reduction <= config.ftol * previous {
                    return Ok(converged(params, cost, iteration, "ftol"));
                }
                if small_step {
                    return Ok(converged(params, cost, iteration, "xtol"));
                }
                break;
            }

            // No descent left at a step this small.
            if small_step {
                return Ok(converged(params, cost, iteration, "xtol"));
            }

            lambda *= config.lambda_up;
            if lambda > MAX_LAMBDA {
                return Err(CalvalError::FitNotConverged {
                    iterations: iteration,
                    cost,
                });
            }
        }
    }

    Err(CalvalError::FitNotConverged {
        iterations: config.max_iterations,
        cost,
    })
}

fn converged(params: Vec<f64>, cost: f64, iterations: usize, criterion: &str) -> FitReport {
    debug!(iterations, cost, criterion, "Least-squares fit converged");
    FitReport {
        params,
        cost,
        iterations,
    }
}

/// A parameter on its lower bound with a positive gradient (or on its upper
/// bound with a negative one) would leave the box along the descent direction.
fn is_pinned(p: f64, g: f64, lo: f64, hi: f64) -> bool {
    (p <= lo && g > 0.0) || (p >= hi && g < 0.0)
}

/// Solve `(A + lambda * diag(A)) delta = -g` restricted to the free parameters.
fn damped_step(
    jtj: &DMatrix<f64>,
    grad: &DVector<f64>,
    free: &[usize],
    lambda: f64,
) -> Option<DVector<f64>> {
    let k = free.len();
    let mut a = DMatrix::<f64>::zeros(k, k);
    let mut b = DVector::<f64>::zeros(k);
    for (u, &i) in free.iter().enumerate() {
        b[u] = -grad[i];
        for (v, &j) in free.iter().enumerate() {
            a[(u, v)] = jtj[(i, j)];
        }
        a[(u, u)] += lambda * jtj[(i, i)].max(JTJ_DIAGONAL_FLOOR);
    }

    let delta = match a.clone().cholesky() {
        Some(chol) => chol.solve(&b),
        None => a.lu().solve(&b)?,
    };
    delta.iter().all(|d| d.is_finite()).then_some(delta)
}

fn evaluate_cost(
    model: FitModel,
    samples: &PeakSamples,
    params: &[f64],
    residuals: &mut [f64],
) -> f64 {
    let mut sum = 0.0;
    for (i, r) in residuals.iter_mut().enumerate() {
        *r = model.evaluate(params, samples.x()[i], samples.y()[i]) - samples.z()[i];
        sum += *r * *r;
    }
    0.5 * sum
}

fn fill_jacobian(
    model: FitModel,
    samples: &PeakSamples,
    params: &[f64],
    jacobian: &mut DMatrix<f64>,
) {
    let mut row = vec![0.0; params.len()];
    for i in 0..samples.len() {
        model.gradient(params, samples.x()[i], samples.y()[i], &mut row);
        for (j, &d) in row.iter().enumerate() {
            jacobian[(i, j)] = d;
        }
    }
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

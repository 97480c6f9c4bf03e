//! Nelder–Mead simplex minimizer.
//!
//! The SARIMA likelihood has no cheap analytic gradient once seasonal
//! polynomials are multiplied out, and parameter counts are small (a handful
//! of coefficients), so a derivative-free simplex search is adequate.
//!
//! Standard coefficients are used: reflection 1, expansion 2, contraction 0.5,
//! shrink 0.5. The initial simplex perturbs each coordinate by 5% (or 0.00025
//! when the coordinate is zero).
//!
//! Convergence requires both:
//! - `max |f_i - f_best| <= fatol`
//! - `max |x_i - x_best| <= xatol` (over all vertices and coordinates)

use std::cell::Cell;

use crate::error::AppError;

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

const NONZERO_STEP: f64 = 0.05;
const ZERO_STEP: f64 = 0.00025;

#[derive(Debug, Clone)]
pub struct NelderMead {
    pub max_iter: usize,
    pub xatol: f64,
    pub fatol: f64,
}

/// Located minimum.
#[derive(Debug, Clone)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub fx: f64,
    pub iterations: usize,
    pub evaluations: usize,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iter: 0,
            xatol: 1e-6,
            fatol: 1e-9,
        }
    }
}

impl NelderMead {
    /// Iteration budget actually used: `max_iter`, or `1000 × dim` when unset.
    fn budget(&self, dim: usize) -> usize {
        if self.max_iter > 0 {
            self.max_iter
        } else {
            1000 * dim.max(1)
        }
    }

    /// Minimize `f` starting from `x0`.
    ///
    /// Non-finite objective values are treated as `+∞`. Fails if the starting
    /// point is not finite or the iteration budget runs out before convergence.
    pub fn minimize<F>(&self, mut f: F, x0: &[f64]) -> Result<Minimum, AppError>
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = x0.len();
        let evaluations = Cell::new(0usize);
        let mut eval = |x: &[f64]| {
            evaluations.set(evaluations.get() + 1);
            let v = f(x);
            if v.is_finite() { v } else { f64::INFINITY }
        };

        let f0 = eval(x0);
        if !f0.is_finite() {
            return Err(AppError::estimation(
                "Objective is not finite at the starting values.",
            ));
        }
        if n == 0 {
            return Ok(Minimum {
                x: Vec::new(),
                fx: f0,
                iterations: 0,
                evaluations: evaluations.get(),
            });
        }

        let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        let mut values: Vec<f64> = Vec::with_capacity(n + 1);
        simplex.push(x0.to_vec());
        values.push(f0);
        for i in 0..n {
            let mut x = x0.to_vec();
            x[i] = if x[i] != 0.0 { x[i] * (1.0 + NONZERO_STEP) } else { ZERO_STEP };
            values.push(eval(&x));
            simplex.push(x);
        }

        let budget = self.budget(n);
        let mut iterations = 0usize;

        loop {
            sort_simplex(&mut simplex, &mut values);

            if self.converged(&simplex, &values) {
                return Ok(Minimum {
                    x: simplex.swap_remove(0),
                    fx: values[0],
                    iterations,
                    evaluations: evaluations.get(),
                });
            }
            if iterations >= budget {
                return Err(AppError::estimation(format!(
                    "Optimizer did not converge within {budget} iterations (best objective {:.6}).",
                    values[0]
                )));
            }
            iterations += 1;

            let centroid = centroid(&simplex[..n]);
            let worst = &simplex[n];

            let xr = along(&centroid, worst, REFLECT);
            let fr = eval(&xr);

            if fr < values[0] {
                let xe = along(&centroid, worst, REFLECT * EXPAND);
                let fe = eval(&xe);
                if fe < fr {
                    simplex[n] = xe;
                    values[n] = fe;
                } else {
                    simplex[n] = xr;
                    values[n] = fr;
                }
                continue;
            }

            if fr < values[n - 1] {
                simplex[n] = xr;
                values[n] = fr;
                continue;
            }

            // Contraction: outside if the reflected point beats the worst vertex.
            let (xc, fc, accept) = if fr < values[n] {
                let xc = along(&centroid, worst, REFLECT * CONTRACT);
                let fc = eval(&xc);
                (xc, fc, fc <= fr)
            } else {
                let xc = along(&centroid, worst, -CONTRACT);
                let fc = eval(&xc);
                (xc, fc, fc < values[n])
            };

            if accept {
                simplex[n] = xc;
                values[n] = fc;
                continue;
            }

            let best = simplex[0].clone();
            for j in 1..=n {
                for (xi, bi) in simplex[j].iter_mut().zip(best.iter()) {
                    *xi = bi + SHRINK * (*xi - bi);
                }
                values[j] = eval(&simplex[j]);
            }
        }
    }

    fn converged(&self, simplex: &[Vec<f64>], values: &[f64]) -> bool {
        let f_spread = values[1..]
            .iter()
            .map(|v| (v - values[0]).abs())
            .fold(0.0, f64::max);
        if !(f_spread <= self.fatol) {
            return false;
        }
        let x_spread = simplex[1..]
            .iter()
            .flat_map(|x| x.iter().zip(simplex[0].iter()).map(|(a, b)| (a - b).abs()))
            .fold(0.0, f64::max);
        x_spread <= self.xatol
    }
}

fn sort_simplex(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *simplex = order.iter().map(|&i| simplex[i].clone()).collect();
    *values = order.iter().map(|&i| values[i]).collect();
}

fn centroid(points: &[Vec<f64>]) -> Vec<f64> {
    let n = points.len() as f64;
    let mut c = vec![0.0; points[0].len()];
    for p in points {
        for (ci, pi) in c.iter_mut().zip(p.iter()) {
            *ci += pi;
        }
    }
    c.iter_mut().for_each(|ci| *ci /= n);
    c
}

/// `c + coef * (c - worst)`.
fn along(centroid: &[f64], worst: &[f64], coef: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(worst.iter())
        .map(|(c, w)| c + coef * (c - w))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimizes_shifted_quadratic() {
        let nm = NelderMead::default();
        let min = nm
            .minimize(|x| (x[0] - 3.0).powi(2) + 2.0 * (x[1] + 1.0).powi(2) + 5.0, &[0.0, 0.0])
            .unwrap();
        assert!((min.x[0] - 3.0).abs() < 1e-4);
        assert!((min.x[1] + 1.0).abs() < 1e-4);
        assert!((min.fx - 5.0).abs() < 1e-8);
    }

    #[test]
    fn minimizes_rosenbrock() {
        let nm = NelderMead {
            max_iter: 5000,
            ..NelderMead::default()
        };
        let min = nm
            .minimize(
                |x| 100.0 * (x[1] - x[0] * x[0]).powi(2) + (1.0 - x[0]).powi(2),
                &[-1.2, 1.0],
            )
            .unwrap();
        assert!((min.x[0] - 1.0).abs() < 1e-3);
        assert!((min.x[1] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn exhausted_budget_is_an_estimation_error() {
        let nm = NelderMead {
            max_iter: 3,
            ..NelderMead::default()
        };
        let err = nm.minimize(|x| (x[0] - 10.0).powi(2), &[0.0]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Estimation);
    }

    #[test]
    fn non_finite_start_is_rejected() {
        let nm = NelderMead::default();
        assert!(nm.minimize(|_| f64::NAN, &[1.0]).is_err());
    }

    #[test]
    fn zero_dimensional_problem_evaluates_once() {
        let nm = NelderMead::default();
        let min = nm.minimize(|_| 4.0, &[]).unwrap();
        assert_eq!(min.evaluations, 1);
        assert_eq!(min.fx, 4.0);
    }
}

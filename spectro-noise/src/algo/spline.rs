//! Quadratic B-spline interpolation for stitching sampled spectra
//!
//! Implements an interpolating spline of degree 2 through a set of data
//! points. Knot placement follows the FITPACK convention for interpolating
//! splines of even degree: the boundary knots are repeated three times at the
//! first and last abscissa, and the interior knots sit at the midpoints of
//! consecutive samples (skipping the first and last intervals). With `m` data
//! points this gives `m` B-spline coefficients and a square collocation system.
//!
//! The collocation matrix is banded (at most three non-zeros per row) and
//! totally positive, so it is solved with banded Gaussian elimination without
//! pivoting in O(m).
//!
//! # Examples
//!
//! ```rust
//! use spectro_noise::algo::spline::QuadraticSpline;
//!
//! let x = vec![0.0, 1.0, 2.0, 3.0, 4.0];
//! let y = vec![0.0, 1.0, 4.0, 9.0, 16.0];
//! let spline = QuadraticSpline::new(&x, &y).unwrap();
//!
//! // Quadratics are reproduced exactly
//! assert!((spline.evaluate(2.5) - 6.25).abs() < 1e-9);
//!
//! // Outside the data range the spline evaluates to zero
//! assert_eq!(spline.evaluate(5.0), 0.0);
//! ```

use thiserror::Error;

/// Polynomial degree of the spline pieces
pub const SPLINE_DEGREE: usize = 2;

/// Number of bands either side of the diagonal in the collocation system
const HALF_BAND: usize = SPLINE_DEGREE;

/// Stored band width of the collocation system
const BAND_WIDTH: usize = 2 * HALF_BAND + 1;

/// Errors that can occur while fitting a spline
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SplineError {
    #[error("Need at least {required} points for a quadratic spline, got {got}")]
    InsufficientPoints { required: usize, got: usize },

    #[error("X and Y vectors must have same length ({0} vs {1})")]
    MismatchedLengths(usize, usize),

    #[error("X values must be finite and strictly ascending (index {0})")]
    NotAscending(usize),

    #[error("Y value at index {0} is not finite")]
    NonFiniteValue(usize),

    #[error("Collocation system is singular at row {0}")]
    Singular(usize),
}

/// Interpolating quadratic spline in B-spline form.
///
/// Passes exactly through every input point and is continuous with a
/// continuous first derivative. Evaluation outside `[x_first, x_last]`
/// returns 0.0.
#[derive(Debug, Clone)]
pub struct QuadraticSpline {
    /// Knot vector, `coeffs.len() + SPLINE_DEGREE + 1` entries
    knots: Vec<f64>,
    /// B-spline coefficients
    coeffs: Vec<f64>,
}

impl QuadraticSpline {
    /// Fit an interpolating quadratic spline through `(x, y)`.
    ///
    /// # Arguments
    /// * `x` - Abscissae, strictly ascending and finite
    /// * `y` - Ordinates, same length as `x`
    ///
    /// # Errors
    /// Fails when fewer than three points are supplied, the inputs differ in
    /// length, `x` is not strictly ascending or `y` holds non-finite values.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self, SplineError> {
        if x.len() != y.len() {
            return Err(SplineError::MismatchedLengths(x.len(), y.len()));
        }
        let required = SPLINE_DEGREE + 1;
        if x.len() < required {
            return Err(SplineError::InsufficientPoints {
                required,
                got: x.len(),
            });
        }
        for i in 0..x.len() {
            if !x[i].is_finite() || (i > 0 && x[i] <= x[i - 1]) {
                return Err(SplineError::NotAscending(i));
            }
            if !y[i].is_finite() {
                return Err(SplineError::NonFiniteValue(i));
            }
        }

        let knots = interpolation_knots(x);
        let n_coeffs = x.len();

        // Assemble the banded collocation matrix, row i is the basis at x[i]
        let mut band = vec![[0.0; BAND_WIDTH]; n_coeffs];
        for (row, &xi) in x.iter().enumerate() {
            let span = find_span(&knots, n_coeffs, xi);
            let basis = basis_functions(&knots, span, xi);
            for (offset, value) in basis.iter().enumerate() {
                let col = span - SPLINE_DEGREE + offset;
                debug_assert!(col + HALF_BAND >= row && col <= row + HALF_BAND);
                band[row][col + HALF_BAND - row] = *value;
            }
        }

        let mut coeffs = y.to_vec();
        solve_banded(&mut band, &mut coeffs)?;

        Ok(Self { knots, coeffs })
    }

    /// Lower and upper bounds of the fitted abscissa range
    pub fn domain(&self) -> (f64, f64) {
        (self.knots[0], self.knots[self.knots.len() - 1])
    }

    /// Evaluate the spline at `x`.
    ///
    /// Returns 0.0 for values outside the fitted domain (and for NaN).
    pub fn evaluate(&self, x: f64) -> f64 {
        let (lower, upper) = self.domain();
        if !(x >= lower && x <= upper) {
            return 0.0;
        }

        let span = find_span(&self.knots, self.coeffs.len(), x);
        let basis = basis_functions(&self.knots, span, x);
        basis
            .iter()
            .enumerate()
            .map(|(offset, b)| b * self.coeffs[span - SPLINE_DEGREE + offset])
            .sum()
    }
}

/// Build the FITPACK interpolation knot vector for an even-degree spline.
fn interpolation_knots(x: &[f64]) -> Vec<f64> {
    let m = x.len();
    let mut knots = Vec::with_capacity(m + SPLINE_DEGREE + 1);
    knots.extend(std::iter::repeat(x[0]).take(SPLINE_DEGREE + 1));
    knots.extend(x[1..m - 1].windows(2).map(|w| 0.5 * (w[0] + w[1])));
    knots.extend(std::iter::repeat(x[m - 1]).take(SPLINE_DEGREE + 1));
    knots
}

/// Index `l` of the knot span with `knots[l] <= x < knots[l + 1]`.
///
/// The right end of the domain maps onto the last non-empty span.
fn find_span(knots: &[f64], n_coeffs: usize, x: f64) -> usize {
    let span = knots.partition_point(|&k| k <= x).saturating_sub(1);
    span.clamp(SPLINE_DEGREE, n_coeffs - 1)
}

/// Non-zero B-spline basis values `N[span-2..=span]` at `x` (Cox-de Boor).
fn basis_functions(knots: &[f64], span: usize, x: f64) -> [f64; SPLINE_DEGREE + 1] {
    let mut n = [0.0; SPLINE_DEGREE + 1];
    let mut left = [0.0; SPLINE_DEGREE + 1];
    let mut right = [0.0; SPLINE_DEGREE + 1];
    n[0] = 1.0;

    for j in 1..=SPLINE_DEGREE {
        left[j] = x - knots[span + 1 - j];
        right[j] = knots[span + j] - x;
        let mut saved = 0.0;
        for r in 0..j {
            let temp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }

    n
}

/// Solve the banded system in place; `rhs` holds the solution on return.
fn solve_banded(band: &mut [[f64; BAND_WIDTH]], rhs: &mut [f64]) -> Result<(), SplineError> {
    let n = rhs.len();

    // Forward elimination
    for k in 0..n {
        let pivot = band[k][HALF_BAND];
        if pivot == 0.0 || !pivot.is_finite() {
            return Err(SplineError::Singular(k));
        }
        for i in (k + 1)..n.min(k + HALF_BAND + 1) {
            let factor = band[i][k + HALF_BAND - i] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in k..n.min(k + HALF_BAND + 1) {
                let upper = band[k][j + HALF_BAND - k];
                band[i][j + HALF_BAND - i] -= factor * upper;
            }
            rhs[i] -= factor * rhs[k];
        }
    }

    // Back substitution
    for k in (0..n).rev() {
        let mut acc = rhs[k];
        for j in (k + 1)..n.min(k + HALF_BAND + 1) {
            acc -= band[k][j + HALF_BAND - k] * rhs[j];
        }
        rhs[k] = acc / band[k][HALF_BAND];
    }

    Ok(())
}

//! Miscellaneous mathematical and utility algorithms.
//!
//! This module provides general-purpose numerical helpers shared by the
//! background models:
//!
//! - **Linear interpolation**: 1D interpolation that clamps to the table edges
//! - **Ordering checks**: validation of strictly ascending sample axes

use thiserror::Error;

/// Errors that can occur during interpolation operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpError {
    #[error("Input vectors must have at least 1 point")]
    InsufficientData,
    #[error("Input vectors must have the same length ({0} vs {1})")]
    MismatchedLengths(usize, usize),
    #[error("X values must be sorted in strictly ascending order (index {0})")]
    UnsortedData(usize),
    #[error("Value {0} is not finite")]
    NonFinite(f64),
}

/// Check that `xs` is finite and strictly ascending.
///
/// Returns the index of the first offending sample on failure.
pub fn check_ascending(xs: &[f64]) -> Result<(), InterpError> {
    if let Some(bad) = xs.iter().find(|v| !v.is_finite()) {
        return Err(InterpError::NonFinite(*bad));
    }
    for i in 1..xs.len() {
        if xs[i] <= xs[i - 1] {
            return Err(InterpError::UnsortedData(i));
        }
    }
    Ok(())
}

/// Performs linear interpolation on 1D data using binary search for efficiency.
///
/// Values of `x` below `xs[0]` return `ys[0]` and values above the last
/// sample return the last `ys` value. No extrapolation is performed.
///
/// The table is assumed to have been validated with [`check_ascending`];
/// callers interpolating many points against one table should validate once.
///
/// # Arguments
///
/// * `x` - The x-coordinate at which to interpolate
/// * `xs` - Array of x-coordinates (strictly ascending)
/// * `ys` - Array of corresponding y-values (must match length of xs)
///
/// # Examples
///
/// ```rust
/// use spectro_noise::algo::misc::interp;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let x_coords = vec![0.0, 1.0, 2.0, 3.0];
/// let y_values = vec![0.0, 1.0, 4.0, 9.0];
///
/// assert_eq!(interp(1.5, &x_coords, &y_values)?, 2.5);
/// assert_eq!(interp(-1.0, &x_coords, &y_values)?, 0.0);
/// assert_eq!(interp(10.0, &x_coords, &y_values)?, 9.0);
/// # Ok(())
/// # }
/// ```
pub fn interp(x: f64, xs: &[f64], ys: &[f64]) -> Result<f64, InterpError> {
    if xs.len() != ys.len() {
        return Err(InterpError::MismatchedLengths(xs.len(), ys.len()));
    }

    if xs.is_empty() {
        return Err(InterpError::InsufficientData);
    }

    if !x.is_finite() {
        return Err(InterpError::NonFinite(x));
    }

    let last = xs.len() - 1;
    if x <= xs[0] {
        return Ok(ys[0]);
    }
    if x >= xs[last] {
        return Ok(ys[last]);
    }

    // First index with xs[idx] > x, guaranteed to be in 1..=last here
    let idx = xs.partition_point(|&probe| probe <= x);
    let i1 = idx - 1;
    let i2 = idx;

    let x1 = xs[i1];
    let x2 = xs[i2];
    let y1 = ys[i1];
    let y2 = ys[i2];

    if x == x1 {
        return Ok(y1);
    }

    let t = (x - x1) / (x2 - x1);
    Ok(y1 + t * (y2 - y1))
}

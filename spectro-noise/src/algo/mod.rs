//! Numerical algorithms shared by the background models
//!
//! This module provides table interpolation and spline stitching used to
//! resample tabulated and piecewise spectra onto a wavelength grid.

pub mod misc;
pub mod spline;

pub use misc::{interp, InterpError};
pub use spline::{QuadraticSpline, SplineError};

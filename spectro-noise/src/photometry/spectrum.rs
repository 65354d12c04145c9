//! Spectral sampling primitives for background modeling
//!
//! This module provides the physical constants used by the radiometry code
//! and the validated wavelength grid every spectral array is aligned with.

use ndarray::Array1;
use thiserror::Error;

use crate::units::{Length, LengthExt};

/// Constants in CGS units
pub struct CGS {}

impl CGS {
    /// Planck's constant
    /// Units: 6.62607015e-27 erg⋅s (erg-seconds in CGS)
    pub const PLANCK_CONSTANT: f64 = 6.62607015e-27;

    /// Speed of light in vacuum
    /// Units: 2.99792458e10 cm/s (centimeters per second in CGS)
    pub const SPEED_OF_LIGHT: f64 = 2.99792458e10;

    /// Boltzmann constant
    /// Units: 1.380649e-16 erg/K
    pub const BOLTZMANN_CONSTANT: f64 = 1.380649e-16;
}

/// Errors produced when building a wavelength grid
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("Wavelength grid must contain at least one sample")]
    Empty,

    #[error("Wavelength at index {index} is not finite: {value}")]
    NonFinite { index: usize, value: f64 },

    #[error("Wavelength at index {index} must be positive, got {value} nm")]
    NonPositive { index: usize, value: f64 },

    #[error("Wavelengths must be strictly increasing (index {index}: {value} nm)")]
    NotAscending { index: usize, value: f64 },

    #[error("Invalid grid parameters: {0}")]
    InvalidParameters(String),
}

/// Convert a wavelength in nanometers to the energy of one photon in erg.
///
/// E = h * c / λ, where λ is in cm
pub fn wavelength_to_ergs(wavelength_nm: f64) -> f64 {
    let wavelength_cm = Length::from_nanometers(wavelength_nm).as_centimeters();
    CGS::PLANCK_CONSTANT * CGS::SPEED_OF_LIGHT / wavelength_cm
}

/// Ordered, strictly increasing wavelength samples in nanometers.
///
/// Every spectral array produced by this crate is aligned 1:1 with a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct WavelengthGrid {
    wavelengths_nm: Vec<f64>,
}

impl WavelengthGrid {
    /// Build a grid from explicit samples.
    ///
    /// # Errors
    /// Returns a [`GridError`] if the grid is empty, holds non-finite or
    /// non-positive samples, or is not strictly increasing.
    pub fn new(wavelengths_nm: Vec<f64>) -> Result<Self, GridError> {
        if wavelengths_nm.is_empty() {
            return Err(GridError::Empty);
        }

        for (index, &value) in wavelengths_nm.iter().enumerate() {
            if !value.is_finite() {
                return Err(GridError::NonFinite { index, value });
            }
            if value <= 0.0 {
                return Err(GridError::NonPositive { index, value });
            }
            if index > 0 && value <= wavelengths_nm[index - 1] {
                return Err(GridError::NotAscending { index, value });
            }
        }

        Ok(Self { wavelengths_nm })
    }

    /// Evenly spaced grid of `n_samples` points from `start_nm` to `end_nm` inclusive.
    pub fn linear(start_nm: f64, end_nm: f64, n_samples: usize) -> Result<Self, GridError> {
        if n_samples == 0 {
            return Err(GridError::Empty);
        }
        if n_samples == 1 {
            return Self::new(vec![start_nm]);
        }
        if !(end_nm > start_nm) {
            return Err(GridError::InvalidParameters(format!(
                "end ({end_nm} nm) must exceed start ({start_nm} nm)"
            )));
        }

        let step = (end_nm - start_nm) / (n_samples - 1) as f64;
        Self::new((0..n_samples).map(|i| start_nm + step * i as f64).collect())
    }

    /// Grid with constant resolving power per sample, λ / Δλ = `samples_per_unit_ln`.
    ///
    /// Samples are spaced uniformly in ln(λ), which is how echelle spectra are
    /// sampled: Δλ = λ / (R * npix) gives `samples_per_unit_ln = R * npix`.
    pub fn log_uniform(
        start_nm: f64,
        end_nm: f64,
        samples_per_unit_ln: f64,
    ) -> Result<Self, GridError> {
        if !(start_nm > 0.0) || !(end_nm > start_nm) {
            return Err(GridError::InvalidParameters(format!(
                "need 0 < start < end, got {start_nm}..{end_nm} nm"
            )));
        }
        if !(samples_per_unit_ln > 0.0) || !samples_per_unit_ln.is_finite() {
            return Err(GridError::InvalidParameters(format!(
                "sampling density must be positive, got {samples_per_unit_ln}"
            )));
        }

        let span = (end_nm / start_nm).ln();
        let n_samples = (span * samples_per_unit_ln).floor() as usize + 1;
        let step = 1.0 / samples_per_unit_ln;
        Self::new(
            (0..n_samples)
                .map(|i| start_nm * (step * i as f64).exp())
                .collect(),
        )
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.wavelengths_nm.len()
    }

    /// Always false for a constructed grid, provided for API symmetry
    pub fn is_empty(&self) -> bool {
        self.wavelengths_nm.is_empty()
    }

    /// Wavelength samples in nanometers
    pub fn as_slice(&self) -> &[f64] {
        &self.wavelengths_nm
    }

    /// Iterate over wavelength samples in nanometers
    pub fn iter(&self) -> impl Iterator<Item = &f64> + '_ {
        self.wavelengths_nm.iter()
    }

    /// First and last wavelength in nanometers
    pub fn bounds(&self) -> (f64, f64) {
        (
            self.wavelengths_nm[0],
            self.wavelengths_nm[self.wavelengths_nm.len() - 1],
        )
    }

    /// Evaluate `f` at every sample, producing an aligned spectral array
    pub fn map<F>(&self, f: F) -> Array1<f64>
    where
        F: FnMut(&f64) -> f64,
    {
        Array1::from_iter(self.wavelengths_nm.iter().map(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wavelength_to_ergs() {
        // 1 micron photon carries ~1.986e-12 erg
        assert_relative_eq!(wavelength_to_ergs(1000.0), 1.98644586e-12, epsilon = 1e-19);

        // Energy scales inversely with wavelength
        assert_relative_eq!(
            wavelength_to_ergs(500.0),
            2.0 * wavelength_to_ergs(1000.0),
            epsilon = 1e-20
        );
    }

    #[test]
    fn test_grid_validation() {
        assert!(WavelengthGrid::new(vec![1000.0, 1500.0, 2000.0]).is_ok());
        assert_eq!(WavelengthGrid::new(vec![]), Err(GridError::Empty));
        assert_eq!(
            WavelengthGrid::new(vec![1000.0, 900.0]),
            Err(GridError::NotAscending {
                index: 1,
                value: 900.0
            })
        );
        assert_eq!(
            WavelengthGrid::new(vec![1000.0, 1000.0]),
            Err(GridError::NotAscending {
                index: 1,
                value: 1000.0
            })
        );
        assert_eq!(
            WavelengthGrid::new(vec![-5.0, 10.0]),
            Err(GridError::NonPositive {
                index: 0,
                value: -5.0
            })
        );
        assert!(matches!(
            WavelengthGrid::new(vec![1000.0, f64::NAN]),
            Err(GridError::NonFinite { index: 1, .. })
        ));
    }

    #[test]
    fn test_single_sample_grid() {
        let grid = WavelengthGrid::new(vec![1500.0]).unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.bounds(), (1500.0, 1500.0));
    }

    #[test]
    fn test_linear_grid() {
        let grid = WavelengthGrid::linear(1000.0, 2000.0, 11).unwrap();
        assert_eq!(grid.len(), 11);
        assert_relative_eq!(grid.as_slice()[1], 1100.0, epsilon = 1e-9);
        assert_relative_eq!(grid.as_slice()[10], 2000.0, epsilon = 1e-9);

        assert_eq!(WavelengthGrid::linear(1000.0, 2000.0, 0), Err(GridError::Empty));
        assert!(WavelengthGrid::linear(2000.0, 1000.0, 5).is_err());
    }

    #[test]
    fn test_log_uniform_grid() {
        let density = 1000.0;
        let grid = WavelengthGrid::log_uniform(1000.0, 1100.0, density).unwrap();
        let samples = grid.as_slice();

        // Constant λ/Δλ between neighbours
        for pair in samples.windows(2) {
            let resolution = pair[0] / (pair[1] - pair[0]);
            assert_relative_eq!(resolution, density, max_relative = 1e-3);
        }
        assert!(grid.bounds().1 <= 1100.0);
    }

    #[test]
    fn test_map_aligns_with_grid() {
        let grid = WavelengthGrid::new(vec![1.0, 2.0, 3.0]).unwrap();
        let doubled = grid.map(|w| 2.0 * w);
        assert_eq!(doubled.to_vec(), vec![2.0, 4.0, 6.0]);
    }
}

//! Single-exposure noise budget for a spectrograph detector.
//!
//! Combines four independent noise sources in quadrature for every sample of
//! an extracted 1D spectrum:
//!
//! - **Shot noise**: √flux
//! - **Background noise**: √(instrument + sky)
//! - **Read noise**: max(6 e⁻, σ_read / √n_ramp), the ramp average floored at
//!   the detector read-noise floor
//! - **Dark noise**: √(n_ramp × dark × n_pix)
//!
//! Every quantity entering the quadrature sum is in electrons for the whole
//! exposure. The background models produce per-second rates, so they go
//! through [`BackgroundRates::integrate`] first.
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//! use ndarray::array;
//! use spectro_noise::hardware::noise_budget::{sum_total_noise, Background, NoiseBudgetInputs};
//!
//! let inputs = NoiseBudgetInputs {
//!     flux: array![10_000.0],
//!     exposure: Duration::from_secs(60),
//!     ramps: 4,
//!     instrument_background: Background::Uniform(50.0),
//!     sky_background: Background::Uniform(30.0),
//!     dark_current: 0.01,
//!     read_noise: 12.0,
//!     pixels: 3.0,
//! };
//! let noise = sum_total_noise(&inputs).unwrap();
//! assert!((noise[0] - 100.58).abs() < 0.01);
//! ```

use std::time::Duration;

use ndarray::Array1;
use thiserror::Error;

/// Detector read-noise floor in electrons
pub const READ_NOISE_FLOOR_E: f64 = 6.0;

/// Longest supported single-frame exposure
pub const MAX_EXPOSURE: Duration = Duration::from_secs(900);

/// Largest supported number of up-the-ramp reads
pub const MAX_RAMPS: u32 = 16;

/// Invalid inputs to the noise budget
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NoiseBudgetError {
    #[error("Exposure time must lie in (0, {max:?}], got {got:?}")]
    InvalidExposure { got: Duration, max: Duration },

    #[error("Ramp count must lie in [1, {max}], got {got}")]
    InvalidRampCount { got: u32, max: u32 },

    #[error("{name} must be non-negative and finite, got {value} at index {index}")]
    NegativeInput {
        name: &'static str,
        index: usize,
        value: f64,
    },

    #[error("{name} has {got} samples but the flux has {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        got: usize,
    },
}

fn check_non_negative(name: &'static str, index: usize, value: f64) -> Result<(), NoiseBudgetError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(NoiseBudgetError::NegativeInput { name, index, value })
    }
}

/// Background contribution, either constant or sampled on the flux grid
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    /// Same value for every sample
    Uniform(f64),
    /// One value per flux sample
    PerSample(Array1<f64>),
}

impl Background {
    /// Value at flux sample `index`
    pub fn value_at(&self, index: usize) -> f64 {
        match self {
            Background::Uniform(value) => *value,
            Background::PerSample(values) => values[index],
        }
    }

    fn validate(&self, name: &'static str, expected: usize) -> Result<(), NoiseBudgetError> {
        match self {
            Background::Uniform(value) => check_non_negative(name, 0, *value),
            Background::PerSample(values) => {
                if values.len() != expected {
                    return Err(NoiseBudgetError::LengthMismatch {
                        name,
                        expected,
                        got: values.len(),
                    });
                }
                values
                    .iter()
                    .enumerate()
                    .try_for_each(|(index, &value)| check_non_negative(name, index, value))
            }
        }
    }

    /// Multiply every value by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        match self {
            Background::Uniform(value) => Background::Uniform(value * factor),
            Background::PerSample(values) => Background::PerSample(values * factor),
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Uniform(0.0)
    }
}

impl From<f64> for Background {
    fn from(value: f64) -> Self {
        Background::Uniform(value)
    }
}

impl From<Array1<f64>> for Background {
    fn from(values: Array1<f64>) -> Self {
        Background::PerSample(values)
    }
}

impl From<Vec<f64>> for Background {
    fn from(values: Vec<f64>) -> Self {
        Background::PerSample(Array1::from_vec(values))
    }
}

/// Background rates from the sky and instrument models
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackgroundRates {
    /// Instrument thermal background per second
    pub instrument: Background,
    /// Sky background per second
    pub sky: Background,
}

/// Exposure-integrated backgrounds ready for the noise budget
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntegratedBackground {
    pub instrument: Background,
    pub sky: Background,
}

impl BackgroundRates {
    pub fn new(instrument: impl Into<Background>, sky: impl Into<Background>) -> Self {
        Self {
            instrument: instrument.into(),
            sky: sky.into(),
        }
    }

    /// Integrate both rates over `exposure`.
    ///
    /// Detected photons are counted one-for-one as electrons; apply
    /// throughput and quantum efficiency to the rates beforehand.
    pub fn integrate(&self, exposure: Duration) -> IntegratedBackground {
        let seconds = exposure.as_secs_f64();
        IntegratedBackground {
            instrument: self.instrument.scaled(seconds),
            sky: self.sky.scaled(seconds),
        }
    }
}

/// Inputs to the single-exposure noise budget
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseBudgetInputs {
    /// Source spectrum in electrons
    pub flux: Array1<f64>,
    /// Frame exposure time, (0, 900 s]
    pub exposure: Duration,
    /// Number of up-the-ramp reads, [1, 16]
    pub ramps: u32,
    /// Instrument background in electrons over the exposure
    pub instrument_background: Background,
    /// Sky background in electrons over the exposure
    pub sky_background: Background,
    /// Dark current in electrons per pixel per ramp
    pub dark_current: f64,
    /// Single-read noise in electrons
    pub read_noise: f64,
    /// Cross-dispersion pixels summed into each spectral sample
    pub pixels: f64,
}

impl NoiseBudgetInputs {
    /// Replace both backgrounds with exposure-integrated values
    pub fn with_background(self, background: IntegratedBackground) -> Self {
        Self {
            instrument_background: background.instrument,
            sky_background: background.sky,
            ..self
        }
    }

    /// Check every invariant of the budget inputs
    pub fn validate(&self) -> Result<(), NoiseBudgetError> {
        if self.exposure.is_zero() || self.exposure > MAX_EXPOSURE {
            return Err(NoiseBudgetError::InvalidExposure {
                got: self.exposure,
                max: MAX_EXPOSURE,
            });
        }
        if self.ramps == 0 || self.ramps > MAX_RAMPS {
            return Err(NoiseBudgetError::InvalidRampCount {
                got: self.ramps,
                max: MAX_RAMPS,
            });
        }

        self.flux
            .iter()
            .enumerate()
            .try_for_each(|(index, &value)| check_non_negative("flux", index, value))?;
        let n = self.flux.len();
        self.instrument_background
            .validate("instrument background", n)?;
        self.sky_background.validate("sky background", n)?;
        check_non_negative("dark current", 0, self.dark_current)?;
        check_non_negative("read noise", 0, self.read_noise)?;
        check_non_negative("pixel count", 0, self.pixels)?;
        Ok(())
    }
}

/// Individual noise terms and their quadrature sum, all in electrons
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseComponents {
    /// Source shot noise per sample
    pub shot: Array1<f64>,
    /// Background shot noise per sample
    pub background: Array1<f64>,
    /// Effective read noise, identical for every sample
    pub read: f64,
    /// Dark-current noise, identical for every sample
    pub dark: f64,
    /// Total noise per sample
    pub total: Array1<f64>,
}

/// Read noise after averaging `ramps` reads, never below the detector floor
pub fn effective_read_noise(read_noise: f64, ramps: u32) -> f64 {
    (read_noise / f64::from(ramps).sqrt()).max(READ_NOISE_FLOOR_E)
}

/// Dark-current noise accumulated over `ramps` reads of `pixels` pixels
pub fn dark_noise(dark_current: f64, ramps: u32, pixels: f64) -> f64 {
    (f64::from(ramps) * dark_current * pixels).sqrt()
}

/// Break down the single-exposure noise budget by source.
///
/// # Errors
/// Any violated input invariant is reported as a [`NoiseBudgetError`]; no
/// partial result is produced.
pub fn noise_components(inputs: &NoiseBudgetInputs) -> Result<NoiseComponents, NoiseBudgetError> {
    inputs.validate()?;

    let shot = inputs.flux.mapv(f64::sqrt);
    let background = Array1::from_iter((0..inputs.flux.len()).map(|i| {
        (inputs.instrument_background.value_at(i) + inputs.sky_background.value_at(i)).sqrt()
    }));
    let read = effective_read_noise(inputs.read_noise, inputs.ramps);
    let dark = dark_noise(inputs.dark_current, inputs.ramps, inputs.pixels);

    let detector_variance = read * read + dark * dark;
    let total = ndarray::Zip::from(&shot)
        .and(&background)
        .map_collect(|&s, &b| (s * s + b * b + detector_variance).sqrt());

    log::debug!(
        "Noise budget over {} samples: read {:.3} e-, dark {:.3} e- ({} ramps, {:.1} s)",
        total.len(),
        read,
        dark,
        inputs.ramps,
        inputs.exposure.as_secs_f64()
    );

    Ok(NoiseComponents {
        shot,
        background,
        read,
        dark,
        total,
    })
}

/// Total single-exposure noise in electrons at each flux sample
pub fn sum_total_noise(inputs: &NoiseBudgetInputs) -> Result<Array1<f64>, NoiseBudgetError> {
    noise_components(inputs).map(|components| components.total)
}

/// Read noise of `pixels` pixels combined in quadrature, √(n_pix × σ²)
pub fn read_noise(read_noise: f64, pixels: f64) -> Result<f64, NoiseBudgetError> {
    check_non_negative("read noise", 0, read_noise)?;
    check_non_negative("pixel count", 0, pixels)?;
    Ok((pixels * read_noise * read_noise).sqrt())
}

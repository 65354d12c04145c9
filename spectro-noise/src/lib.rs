//! Spectrograph noise budget
//!
//! Models the background light reaching a high-resolution spectrograph
//! detector and combines it with detector noise into a per-sample noise
//! estimate for a single exposure.
//!
//! - [`photometry`]: sky and instrument thermal background rates, including
//!   the tracking camera variants
//! - [`hardware`]: spectrograph geometry, optical-train emissivities and the
//!   detector noise budget
//! - [`algo`]: table interpolation and spline stitching
//! - [`units`]: typed physical units

pub mod algo;
pub mod hardware;
pub mod photometry;
pub mod shared_args;
pub mod units;

pub use hardware::noise_budget::{
    noise_components, read_noise, sum_total_noise, Background, BackgroundRates,
    NoiseBudgetError, NoiseBudgetInputs, NoiseComponents,
};
pub use hardware::{EmissivityProvider, OpticalTrain, SpectrographConfig};
pub use photometry::{
    instrument_background, sky_background, BackgroundError, ObservingConditions, WavelengthGrid,
};

//! Hardware models: spectrograph geometry, optical train and detector noise

pub mod emissivity;
pub mod noise_budget;
pub mod telescope;

pub use emissivity::{EmissivityProvider, EmissivityTable, OpticalSurface, OpticalTrain};
pub use noise_budget::{
    noise_components, read_noise, sum_total_noise, Background, BackgroundRates,
    NoiseBudgetError, NoiseBudgetInputs, NoiseComponents,
};
pub use telescope::SpectrographConfig;

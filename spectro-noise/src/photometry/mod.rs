//! Photometry models: spectral sampling, thermal emission and background rates

pub mod background;
pub mod blackbody;
pub mod instrument_background;
pub mod sky_background;
pub mod spectrum;
pub mod tracking;

pub use background::BackgroundError;
pub use blackbody::Blackbody;
pub use instrument_background::{
    instrument_background, instrument_background_spline, REGIME_CROSSOVER_NM,
};
pub use sky_background::{
    sky_background, sky_background_from_table, ObservingConditions, SkyRadianceTable,
    SkyTableError,
};
pub use spectrum::{GridError, WavelengthGrid};
pub use tracking::{
    tracking_instrument_background, tracking_sky_background, tracking_sky_background_from_table,
    TrackingArmConfig,
};

//! Error type shared by the sky and instrument background models

use thiserror::Error;

use super::sky_background::SkyTableError;
use crate::algo::{InterpError, SplineError};
use crate::hardware::emissivity::EmissivityError;
use crate::hardware::telescope::GeometryError;

/// Errors that can occur while computing a background spectrum
#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid optical geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Sky background table: {0}")]
    SkyTable(#[from] SkyTableError),

    #[error("Emissivity provider: {0}")]
    Emissivity(#[from] EmissivityError),

    #[error("Interpolation failed: {0}")]
    Interp(#[from] InterpError),

    #[error("Spline stitching failed: {0}")]
    Spline(#[from] SplineError),
}

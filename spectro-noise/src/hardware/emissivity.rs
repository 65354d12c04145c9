//! Emissivity of the optical train
//!
//! The instrument background model only needs, for each warm surface the
//! light passes, how strongly it emits at each wavelength and how hot it is.
//! That contract is the [`EmissivityProvider`] trait. Emission is tabulated in
//! two regimes: "red" weights for the long-wavelength band (≥ 1400 nm) and
//! "blue" weights for the short-wavelength band, since different parts of the
//! train dominate each band.
//!
//! [`OpticalTrain`] is a gray-body provider (wavelength-independent emissivity
//! per surface) that can be loaded from a JSON description.

use std::fs;
use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::photometry::spectrum::WavelengthGrid;
use crate::units::{Temperature, TemperatureExt};

/// Errors reported by emissivity providers
#[derive(Debug, Error)]
pub enum EmissivityError {
    #[error("Unknown optical surface: {0}")]
    UnknownSurface(String),

    #[error("Emissivity of surface {surface} must lie in [0, 1], got {value}")]
    OutOfRange { surface: String, value: f64 },

    #[error("Temperature of surface {surface} must be positive, got {value} K")]
    InvalidTemperature { surface: String, value: f64 },

    #[error("Surface {surface} returned {got} samples for a {expected} sample grid")]
    LengthMismatch {
        surface: String,
        expected: usize,
        got: usize,
    },

    #[error("Failed to read optical train: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse optical train: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which emissivity weighting to apply to a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// Long-wavelength band, at or above the crossover
    Red,
    /// Short-wavelength band, below the crossover
    Blue,
}

/// Emission properties of one surface sampled on a wavelength grid
#[derive(Debug, Clone)]
pub struct SurfaceEmission {
    /// Emissivity used for the red regime, aligned with the grid
    pub red: Array1<f64>,
    /// Emissivity used for the blue regime, aligned with the grid
    pub blue: Array1<f64>,
    /// Physical temperature of the surface
    pub temperature: Temperature,
}

impl SurfaceEmission {
    /// Emissivity weights for the requested regime
    pub fn weights(&self, regime: Regime) -> &Array1<f64> {
        match regime {
            Regime::Red => &self.red,
            Regime::Blue => &self.blue,
        }
    }
}

/// Ordered per-surface emission for the whole optical train
#[derive(Debug, Clone, Default)]
pub struct EmissivityTable {
    pub surfaces: Vec<SurfaceEmission>,
}

impl EmissivityTable {
    /// Check every surface is sampled on a grid of `expected` points
    pub fn check_alignment(&self, expected: usize) -> Result<(), EmissivityError> {
        for (index, surface) in self.surfaces.iter().enumerate() {
            for got in [surface.red.len(), surface.blue.len()] {
                if got != expected {
                    return Err(EmissivityError::LengthMismatch {
                        surface: format!("#{index}"),
                        expected,
                        got,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Source of optical-train emissivities and temperatures
pub trait EmissivityProvider {
    /// Per-surface red/blue emissivities and temperatures on `grid`
    fn emissivity(&self, grid: &WavelengthGrid) -> Result<EmissivityTable, EmissivityError>;

    /// Emissivity of the named surfaces on `grid`, in the order requested
    fn surface_emissivities(
        &self,
        grid: &WavelengthGrid,
        surfaces: &[&str],
    ) -> Result<Vec<Array1<f64>>, EmissivityError>;
}

/// A gray-body optical surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpticalSurface {
    /// Short identifier, e.g. `tel`, `ao`, `feicom`
    pub name: String,
    /// Physical temperature in Kelvin
    pub temperature_k: f64,
    /// Emissivity applied to the red regime
    pub red_emissivity: f64,
    /// Emissivity applied to the blue regime
    pub blue_emissivity: f64,
}

impl OpticalSurface {
    /// Create a surface with the same emissivity in both regimes
    pub fn gray(name: impl Into<String>, temperature_k: f64, emissivity: f64) -> Self {
        Self {
            name: name.into(),
            temperature_k,
            red_emissivity: emissivity,
            blue_emissivity: emissivity,
        }
    }

    fn validate(&self) -> Result<(), EmissivityError> {
        for value in [self.red_emissivity, self.blue_emissivity] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EmissivityError::OutOfRange {
                    surface: self.name.clone(),
                    value,
                });
            }
        }
        if !(self.temperature_k.is_finite() && self.temperature_k > 0.0) {
            return Err(EmissivityError::InvalidTemperature {
                surface: self.name.clone(),
                value: self.temperature_k,
            });
        }
        Ok(())
    }
}

/// Ordered list of gray-body surfaces from the sky to the detector
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OpticalTrain {
    pub surfaces: Vec<OpticalSurface>,
}

impl OpticalTrain {
    /// Create a train, validating every surface
    pub fn new(surfaces: Vec<OpticalSurface>) -> Result<Self, EmissivityError> {
        surfaces.iter().try_for_each(OpticalSurface::validate)?;
        Ok(Self { surfaces })
    }

    /// Parse a train from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, EmissivityError> {
        let train: OpticalTrain = serde_json::from_str(json)?;
        Self::new(train.surfaces)
    }

    /// Load a train from a JSON file
    pub fn load(path: &Path) -> Result<Self, EmissivityError> {
        let contents = fs::read_to_string(path)?;
        let train = Self::from_json_str(&contents)?;
        log::debug!(
            "Loaded optical train with {} surfaces from {}",
            train.surfaces.len(),
            path.display()
        );
        Ok(train)
    }

    /// Look up a surface by name
    pub fn surface(&self, name: &str) -> Option<&OpticalSurface> {
        self.surfaces.iter().find(|s| s.name == name)
    }
}

impl EmissivityProvider for OpticalTrain {
    fn emissivity(&self, grid: &WavelengthGrid) -> Result<EmissivityTable, EmissivityError> {
        let n = grid.len();
        let surfaces = self
            .surfaces
            .iter()
            .map(|s| SurfaceEmission {
                red: Array1::from_elem(n, s.red_emissivity),
                blue: Array1::from_elem(n, s.blue_emissivity),
                temperature: Temperature::from_kelvin(s.temperature_k),
            })
            .collect();
        Ok(EmissivityTable { surfaces })
    }

    fn surface_emissivities(
        &self,
        grid: &WavelengthGrid,
        surfaces: &[&str],
    ) -> Result<Vec<Array1<f64>>, EmissivityError> {
        // The tracking path has no regime split, it uses the red weights
        surfaces
            .iter()
            .map(|name| {
                self.surface(name)
                    .map(|s| Array1::from_elem(grid.len(), s.red_emissivity))
                    .ok_or_else(|| EmissivityError::UnknownSurface((*name).to_string()))
            })
            .collect()
    }
}

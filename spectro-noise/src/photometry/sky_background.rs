//! Sky background model
//!
//! Converts a tabulated Maunakea sky emission spectrum into the photon rate
//! collected by one spectrograph pixel. The tables (Gemini observatory sky
//! models, photons s⁻¹ arcsec⁻² nm⁻¹ m⁻²) are selected by airmass and water
//! vapor column and named `mk_skybg_zm_<pwv>_<airmass>_ph.dat`.
//!
//! The sky is resampled onto the requested grid with linear interpolation.
//! Wavelengths outside the table take the nearest tabulated value.

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array1;
use thiserror::Error;

use super::background::BackgroundError;
use super::spectrum::WavelengthGrid;
use crate::algo::misc::{check_ascending, interp, InterpError};
use crate::hardware::telescope::{require_positive, GeometryError, SpectrographConfig};

/// Errors raised while reading a sky radiance table
#[derive(Debug, Error)]
pub enum SkyTableError {
    #[error("Failed to read sky table {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed sky table at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Sky table contains no data rows")]
    Empty,

    #[error("Invalid sky table columns: {0}")]
    Columns(#[from] InterpError),

    #[error("Sky radiance at row {index} must be finite and non-negative, got {value}")]
    InvalidRadiance { index: usize, value: f64 },
}

/// Atmospheric conditions selecting a sky table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservingConditions {
    /// Airmass label of the sky table
    pub airmass: f64,
    /// Precipitable water vapor label of the sky table
    pub pwv: f64,
}

impl Default for ObservingConditions {
    fn default() -> Self {
        Self {
            airmass: 1.5,
            pwv: 1.5,
        }
    }
}

impl ObservingConditions {
    /// Create observing conditions from airmass and water vapor labels
    pub fn new(airmass: f64, pwv: f64) -> Self {
        Self { airmass, pwv }
    }

    /// Require a positive, finite airmass and water vapor column
    pub fn validate(&self) -> Result<(), GeometryError> {
        require_positive("airmass", self.airmass)?;
        require_positive("water vapor column", self.pwv)?;
        Ok(())
    }

    /// File name of the sky table for these conditions
    ///
    /// Integral values are written without a decimal point, so the Gemini
    /// tables `mk_skybg_zm_16_15_ph.dat` are selected with `pwv = 16`,
    /// `airmass = 15`.
    pub fn sky_table_filename(&self) -> String {
        format!("mk_skybg_zm_{}_{}_ph.dat", self.pwv, self.airmass)
    }

    /// Full path of the sky table under `sky_dir`
    pub fn sky_table_path(&self, sky_dir: &Path) -> PathBuf {
        sky_dir.join(self.sky_table_filename())
    }
}

/// Two-column sky emission table: wavelength (nm) and photon radiance
#[derive(Debug, Clone, PartialEq)]
pub struct SkyRadianceTable {
    wavelengths_nm: Vec<f64>,
    /// Photons s⁻¹ arcsec⁻² nm⁻¹ m⁻²
    radiance: Vec<f64>,
}

impl SkyRadianceTable {
    /// Build a table from columns, requiring ascending wavelengths and
    /// finite, non-negative radiance
    pub fn new(wavelengths_nm: Vec<f64>, radiance: Vec<f64>) -> Result<Self, SkyTableError> {
        if wavelengths_nm.is_empty() {
            return Err(SkyTableError::Empty);
        }
        if wavelengths_nm.len() != radiance.len() {
            return Err(InterpError::MismatchedLengths(wavelengths_nm.len(), radiance.len()).into());
        }
        check_ascending(&wavelengths_nm)?;
        if let Some((index, &value)) = radiance
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(SkyTableError::InvalidRadiance { index, value });
        }
        Ok(Self {
            wavelengths_nm,
            radiance,
        })
    }

    /// Parse whitespace-delimited text; blank lines and `#` comments are skipped
    ///
    /// Only the first two columns are used, extra columns are ignored.
    pub fn parse(contents: &str) -> Result<Self, SkyTableError> {
        let mut wavelengths_nm = Vec::new();
        let mut radiance = Vec::new();

        for (index, raw) in contents.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let mut columns = line.split_whitespace().map(|field| {
                field.parse::<f64>().map_err(|e| SkyTableError::Parse {
                    line: index + 1,
                    message: format!("{field:?}: {e}"),
                })
            });

            match (columns.next(), columns.next()) {
                (Some(wavelength), Some(value)) => {
                    wavelengths_nm.push(wavelength?);
                    radiance.push(value?);
                }
                _ => {
                    return Err(SkyTableError::Parse {
                        line: index + 1,
                        message: "expected two columns".to_string(),
                    })
                }
            }
        }

        Self::new(wavelengths_nm, radiance)
    }

    /// Read and parse a sky table file
    pub fn load(path: &Path) -> Result<Self, SkyTableError> {
        let contents = fs::read_to_string(path).map_err(|source| SkyTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&contents)?;
        log::debug!(
            "Loaded sky table {} ({} rows, {:.1}-{:.1} nm)",
            path.display(),
            table.len(),
            table.bounds().0,
            table.bounds().1
        );
        Ok(table)
    }

    /// Load the table matching `conditions` from `sky_dir`
    pub fn load_for(sky_dir: &Path, conditions: &ObservingConditions) -> Result<Self, SkyTableError> {
        Self::load(&conditions.sky_table_path(sky_dir))
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.wavelengths_nm.len()
    }

    /// True when the table holds no rows (never the case once constructed)
    pub fn is_empty(&self) -> bool {
        self.wavelengths_nm.is_empty()
    }

    /// First and last tabulated wavelength in nanometers
    pub fn bounds(&self) -> (f64, f64) {
        (
            self.wavelengths_nm[0],
            self.wavelengths_nm[self.wavelengths_nm.len() - 1],
        )
    }

    /// Photon radiance at `wavelength_nm`, clamped to the table edges
    pub fn radiance_at(&self, wavelength_nm: f64) -> Result<f64, InterpError> {
        interp(wavelength_nm, &self.wavelengths_nm, &self.radiance)
    }

    /// Resample the table onto `grid`
    pub fn resample(&self, grid: &WavelengthGrid) -> Result<Array1<f64>, InterpError> {
        let (lower, upper) = self.bounds();
        let clamped = grid.iter().filter(|&&w| w < lower || w > upper).count();
        if clamped > 0 {
            log::warn!(
                "{clamped} of {} samples fall outside the sky table ({lower:.1}-{upper:.1} nm), using edge values",
                grid.len()
            );
        }

        grid.iter()
            .map(|&w| self.radiance_at(w))
            .collect::<Result<Vec<f64>, _>>()
            .map(Array1::from_vec)
    }
}

/// Sky photons per second collected by one pixel at each grid sample.
///
/// Loads the table for `conditions` from `sky_dir` on every call.
///
/// # Errors
/// Fails if the table cannot be read or parsed, or the geometry is invalid.
pub fn sky_background(
    grid: &WavelengthGrid,
    spectrograph: &SpectrographConfig,
    conditions: &ObservingConditions,
    sky_dir: &Path,
) -> Result<Array1<f64>, BackgroundError> {
    conditions.validate()?;
    let table = SkyRadianceTable::load_for(sky_dir, conditions)?;
    sky_background_from_table(grid, spectrograph, &table)
}

/// Sky photons per second per pixel from an already loaded table.
///
/// rate = radiance × area × Ω(λ) × Δλ, with the diffraction-limited beam
/// solid angle Ω and the per-pixel spectral width Δλ.
pub fn sky_background_from_table(
    grid: &WavelengthGrid,
    spectrograph: &SpectrographConfig,
    table: &SkyRadianceTable,
) -> Result<Array1<f64>, BackgroundError> {
    spectrograph.validate()?;
    log::debug!(
        "Sky background for {} over {} samples, FWHM {:.4}\" at {:.0} nm",
        spectrograph.name,
        grid.len(),
        spectrograph.reference_fwhm_arcsec(),
        spectrograph.reference_wavelength_nm()
    );

    let radiance = table.resample(grid)?;
    let area_m2 = spectrograph.collecting_area_m2;
    let collection = grid.map(|&w| {
        area_m2 * spectrograph.diffraction_solid_angle_arcsec2(w) * spectrograph.pixel_width_nm(w)
    });

    Ok(radiance * collection)
}

//! Telescope and spectrograph geometry for background modeling.
//!
//! Background light enters the spectrograph through one resolution element:
//! its angular size on the sky sets the solid angle that collects sky and
//! thermal radiance, and its spectral width sets how much of that radiance
//! lands on one detector pixel.
//!
//! # Physics Models
//!
//! - **Diffraction-limited FWHM**: θ ≈ λ/D (radians), reported in arcseconds
//! - **Beam solid angle**: Ω = 1.13 θ², the Gaussian-beam area for a FWHM θ
//! - **Pixel spectral width**: Δλ = λ / R / npix
//!
//! # Examples
//!
//! ```rust
//! use spectro_noise::hardware::telescope::models::HISPEC;
//!
//! let spectrograph = HISPEC.clone();
//! let fwhm = spectrograph.diffraction_fwhm_arcsec(2000.0);
//! let width = spectrograph.pixel_width_nm(2000.0);
//! assert!(fwhm > 0.04 && fwhm < 0.042);
//! assert!((width - 2000.0 / 100_000.0 / 3.0).abs() < 1e-12);
//! ```

use thiserror::Error;

use crate::units::{square_meters_to_cm2, AngleExt, Length, LengthExt, PlaneAngle};

/// Area correction for a Gaussian beam, Ω = 1.13 × FWHM²
pub const GAUSSIAN_BEAM_FACTOR: f64 = 1.13;

/// Errors raised when validating optical configuration values
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },
}

/// Check a configuration value is finite and strictly positive
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, GeometryError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GeometryError::NotPositive { name, value })
    }
}

/// Solid angle of a Gaussian beam with the given FWHM.
///
/// # Returns
/// Solid angle in square arcseconds
pub fn beam_solid_angle_arcsec2(fwhm_arcsec: f64) -> f64 {
    fwhm_arcsec * fwhm_arcsec * GAUSSIAN_BEAM_FACTOR
}

/// Telescope feeding a cross-dispersed spectrograph.
///
/// Collects the geometry needed to turn a sky or thermal radiance into a
/// photon rate per detector pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrographConfig {
    /// Instrument name or identifier
    pub name: String,
    /// Primary mirror diameter
    pub diameter: Length,
    /// Collecting area in square meters (net of central obscuration)
    pub collecting_area_m2: f64,
    /// Reference (design) wavelength
    pub reference_wavelength: Length,
    /// Spectral resolving power λ/Δλ
    pub resolving_power: f64,
    /// Pixels sampling one resolution element
    pub pixels_per_resolution_element: f64,
}

impl SpectrographConfig {
    /// Create a new spectrograph configuration
    pub fn new(
        name: impl Into<String>,
        diameter_m: f64,
        collecting_area_m2: f64,
        reference_wavelength_nm: f64,
        resolving_power: f64,
        pixels_per_resolution_element: f64,
    ) -> Self {
        Self {
            name: name.into(),
            diameter: Length::from_meters(diameter_m),
            collecting_area_m2,
            reference_wavelength: Length::from_nanometers(reference_wavelength_nm),
            resolving_power,
            pixels_per_resolution_element,
        }
    }

    /// Validate that every geometric quantity is physically meaningful
    pub fn validate(&self) -> Result<(), GeometryError> {
        require_positive("telescope diameter", self.diameter.as_meters())?;
        require_positive("collecting area", self.collecting_area_m2)?;
        require_positive(
            "reference wavelength",
            self.reference_wavelength.as_nanometers(),
        )?;
        require_positive("resolving power", self.resolving_power)?;
        require_positive(
            "pixels per resolution element",
            self.pixels_per_resolution_element,
        )?;
        Ok(())
    }

    /// Create a copy with a different resolving power
    pub fn with_resolving_power(&self, resolving_power: f64) -> Self {
        Self {
            resolving_power,
            ..self.clone()
        }
    }

    /// Create a copy with a different pixel sampling
    pub fn with_pixels_per_resolution_element(&self, npix: f64) -> Self {
        Self {
            pixels_per_resolution_element: npix,
            ..self.clone()
        }
    }

    /// Collecting area in square centimeters
    pub fn collecting_area_cm2(&self) -> f64 {
        square_meters_to_cm2(self.collecting_area_m2)
    }

    /// Diffraction-limited FWHM at `wavelength_nm`, θ = λ/D
    ///
    /// # Returns
    /// Angular FWHM in arcseconds
    pub fn diffraction_fwhm_arcsec(&self, wavelength_nm: f64) -> f64 {
        let wavelength_m = Length::from_nanometers(wavelength_nm).as_meters();
        PlaneAngle::from_radians(wavelength_m / self.diameter.as_meters()).as_arcseconds()
    }

    /// Reference wavelength in nanometers
    pub fn reference_wavelength_nm(&self) -> f64 {
        self.reference_wavelength.as_nanometers()
    }

    /// Diffraction-limited FWHM at the reference wavelength
    pub fn reference_fwhm_arcsec(&self) -> f64 {
        self.diffraction_fwhm_arcsec(self.reference_wavelength_nm())
    }

    /// Gaussian-beam solid angle of the diffraction-limited PSF
    ///
    /// # Returns
    /// Solid angle in square arcseconds
    pub fn diffraction_solid_angle_arcsec2(&self, wavelength_nm: f64) -> f64 {
        beam_solid_angle_arcsec2(self.diffraction_fwhm_arcsec(wavelength_nm))
    }

    /// Spectral width covered by one detector pixel, Δλ = λ / R / npix
    ///
    /// # Returns
    /// Width in nanometers
    pub fn pixel_width_nm(&self, wavelength_nm: f64) -> f64 {
        wavelength_nm / self.resolving_power / self.pixels_per_resolution_element
    }
}

impl Default for SpectrographConfig {
    fn default() -> Self {
        models::HISPEC.clone()
    }
}

/// Predefined spectrograph configurations
pub mod models {
    use super::*;
    use once_cell::sync::Lazy;

    /// HISPEC on a 10 m segmented telescope (R = 100,000, 3 pixel sampling)
    pub static HISPEC: Lazy<SpectrographConfig> =
        Lazy::new(|| SpectrographConfig::new("HISPEC", 10.0, 76.0, 2000.0, 100_000.0, 3.0));

    /// KPIC fiber-fed to NIRSPEC on the same telescope (R = 35,000)
    pub static KPIC: Lazy<SpectrographConfig> =
        Lazy::new(|| SpectrographConfig::new("KPIC", 10.0, 76.0, 2200.0, 35_000.0, 3.0));
}

#[cfg(test)]
mod tests {
    use super::models::{HISPEC, KPIC};
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_diffraction_fwhm() {
        // 2 μm over 10 m = 2e-7 rad = 0.04125 arcsec
        let fwhm = HISPEC.diffraction_fwhm_arcsec(2000.0);
        assert_relative_eq!(fwhm, 2.0e-7 * 206_264.806_247, epsilon = 1e-9);
        assert_relative_eq!(HISPEC.reference_fwhm_arcsec(), fwhm, epsilon = 1e-15);
    }

    #[test]
    fn test_fwhm_scales_with_wavelength() {
        let short = HISPEC.diffraction_fwhm_arcsec(1000.0);
        let long = HISPEC.diffraction_fwhm_arcsec(2000.0);
        assert_relative_eq!(long / short, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solid_angle() {
        assert_relative_eq!(beam_solid_angle_arcsec2(1.0), 1.13, epsilon = 1e-15);
        assert_relative_eq!(beam_solid_angle_arcsec2(0.5), 0.2825, epsilon = 1e-15);

        let fwhm = HISPEC.diffraction_fwhm_arcsec(1500.0);
        assert_relative_eq!(
            HISPEC.diffraction_solid_angle_arcsec2(1500.0),
            fwhm * fwhm * GAUSSIAN_BEAM_FACTOR,
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_pixel_width() {
        assert_relative_eq!(
            HISPEC.pixel_width_nm(1500.0),
            1500.0 / 100_000.0 / 3.0,
            epsilon = 1e-15
        );
        let coarse = HISPEC.with_pixels_per_resolution_element(1.0);
        assert_relative_eq!(coarse.pixel_width_nm(1500.0), 0.015, epsilon = 1e-15);
    }

    #[test]
    fn test_collecting_area_cm2() {
        assert_relative_eq!(HISPEC.collecting_area_cm2(), 760_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_validate() {
        for config in [&*HISPEC, &*KPIC] {
            assert!(config.validate().is_ok(), "{} should be valid", config.name);
        }

        let broken = HISPEC.with_resolving_power(0.0);
        assert_eq!(
            broken.validate(),
            Err(GeometryError::NotPositive {
                name: "resolving power",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_default_is_hispec() {
        assert_eq!(SpectrographConfig::default(), *HISPEC);
    }
}

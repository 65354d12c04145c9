//! Background models for the tracking camera arm
//!
//! The tracking camera sees the sky through the same telescope but images it
//! rather than dispersing it, so the beam size comes from a measured FWHM and
//! there is no per-pixel spectral bin. Both models return spectral densities
//! in photons s⁻¹ nm⁻¹.

use std::path::Path;

use ndarray::Array1;

use super::background::BackgroundError;
use super::blackbody::Blackbody;
use super::sky_background::{ObservingConditions, SkyRadianceTable};
use super::spectrum::WavelengthGrid;
use crate::hardware::emissivity::EmissivityProvider;
use crate::hardware::telescope::{beam_solid_angle_arcsec2, require_positive};
use crate::units::{arcsec2_to_steradian, square_meters_to_cm2, Temperature, TemperatureExt};

/// Surfaces in front of the tracking camera, sky side first
pub const TRACKING_SURFACES: [&str; 3] = ["tel", "ao", "feicom"];

/// Physical temperature assumed for every tracking-arm surface
pub const TRACKING_SURFACE_TEMPERATURE_K: f64 = 276.0;

/// Geometry of the tracking camera arm
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingArmConfig {
    /// Measured image FWHM in arcseconds
    pub fwhm_arcsec: f64,
    /// Telescope collecting area in square meters
    pub collecting_area_m2: f64,
    /// Temperature of the tracking-arm surfaces
    pub surface_temperature: Temperature,
}

impl TrackingArmConfig {
    /// Tracking arm with a measured FWHM on the default 76 m² aperture
    pub fn new(fwhm_arcsec: f64) -> Self {
        Self {
            fwhm_arcsec,
            collecting_area_m2: 76.0,
            surface_temperature: Temperature::from_kelvin(TRACKING_SURFACE_TEMPERATURE_K),
        }
    }

    pub fn with_collecting_area_m2(self, collecting_area_m2: f64) -> Self {
        Self {
            collecting_area_m2,
            ..self
        }
    }

    pub fn with_surface_temperature(self, surface_temperature: Temperature) -> Self {
        Self {
            surface_temperature,
            ..self
        }
    }

    fn validate(&self) -> Result<(), BackgroundError> {
        require_positive("tracking FWHM", self.fwhm_arcsec)?;
        require_positive("collecting area", self.collecting_area_m2)?;
        require_positive("surface temperature", self.surface_temperature.as_kelvin())?;
        Ok(())
    }

    /// Beam solid angle in square arcseconds
    pub fn solid_angle_arcsec2(&self) -> f64 {
        beam_solid_angle_arcsec2(self.fwhm_arcsec)
    }
}

/// Sky photon density (photons/s/nm) seen by the tracking camera.
///
/// Reads the sky table for `conditions` from `sky_dir` on every call.
pub fn tracking_sky_background(
    grid: &WavelengthGrid,
    arm: &TrackingArmConfig,
    conditions: &ObservingConditions,
    sky_dir: &Path,
) -> Result<Array1<f64>, BackgroundError> {
    conditions.validate()?;
    let table = SkyRadianceTable::load_for(sky_dir, conditions)?;
    tracking_sky_background_from_table(grid, arm, &table)
}

/// Tracking-arm sky density from an already loaded table
pub fn tracking_sky_background_from_table(
    grid: &WavelengthGrid,
    arm: &TrackingArmConfig,
    table: &SkyRadianceTable,
) -> Result<Array1<f64>, BackgroundError> {
    arm.validate()?;
    let radiance = table.resample(grid)?;
    Ok(radiance * (arm.collecting_area_m2 * arm.solid_angle_arcsec2()))
}

/// Thermal photon density (photons/s/nm) from the tracking-arm surfaces.
///
/// Emissivities of [`TRACKING_SURFACES`] come from the provider; every
/// surface sits at the arm's surface temperature.
pub fn tracking_instrument_background<P: EmissivityProvider + ?Sized>(
    grid: &WavelengthGrid,
    arm: &TrackingArmConfig,
    provider: &P,
) -> Result<Array1<f64>, BackgroundError> {
    arm.validate()?;
    let emissivities = provider.surface_emissivities(grid, &TRACKING_SURFACES)?;
    if emissivities.len() != TRACKING_SURFACES.len() {
        return Err(BackgroundError::InvalidInput(format!(
            "expected {} tracking surfaces, provider returned {}",
            TRACKING_SURFACES.len(),
            emissivities.len()
        )));
    }

    let body = Blackbody::new(arm.surface_temperature);
    let scale =
        square_meters_to_cm2(arm.collecting_area_m2) * arcsec2_to_steradian(arm.solid_angle_arcsec2());
    let thermal = grid.map(|&w| body.photon_radiance(w) * scale);

    let mut total: Array1<f64> = Array1::zeros(grid.len());
    for (name, emissivity) in TRACKING_SURFACES.iter().zip(&emissivities) {
        if emissivity.len() != grid.len() {
            return Err(BackgroundError::InvalidInput(format!(
                "surface {name} has {} emissivity samples for {} wavelengths",
                emissivity.len(),
                grid.len()
            )));
        }
        total = total + emissivity * &thermal;
    }

    log::debug!(
        "Tracking thermal background: FWHM {:.3}\", {:.1} K over {} samples",
        arm.fwhm_arcsec,
        arm.surface_temperature.as_kelvin(),
        grid.len()
    );
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::emissivity::{OpticalSurface, OpticalTrain};
    use approx::assert_relative_eq;

    fn train() -> OpticalTrain {
        OpticalTrain::new(vec![
            OpticalSurface::gray("tel", 276.0, 0.05),
            OpticalSurface::gray("ao", 276.0, 0.10),
            OpticalSurface::gray("fiber", 276.0, 0.5),
            OpticalSurface::gray("feicom", 276.0, 0.07),
        ])
        .unwrap()
    }

    #[test]
    fn test_tracking_sky_density() {
        let table = SkyRadianceTable::parse("1000 4.0\n2000 8.0\n").unwrap();
        let grid = WavelengthGrid::new(vec![500.0, 1500.0, 3000.0]).unwrap();
        let arm = TrackingArmConfig::new(0.5);
        let sky = tracking_sky_background_from_table(&grid, &arm, &table).unwrap();

        let scale = 76.0 * 0.25 * 1.13;
        assert_relative_eq!(sky[0], 4.0 * scale, max_relative = 1e-12);
        assert_relative_eq!(sky[1], 6.0 * scale, max_relative = 1e-12);
        assert_relative_eq!(sky[2], 8.0 * scale, max_relative = 1e-12);
    }

    #[test]
    fn test_tracking_sky_rejects_bad_conditions() {
        let dir = tempfile::tempdir().unwrap();
        let grid = WavelengthGrid::linear(1000.0, 2000.0, 3).unwrap();
        let arm = TrackingArmConfig::new(0.5);

        for conditions in [
            ObservingConditions::new(0.0, 1.5),
            ObservingConditions::new(1.5, -1.0),
            ObservingConditions::new(f64::NAN, 1.5),
        ] {
            // A readable table exists, so only the conditions can fail
            std::fs::write(conditions.sky_table_path(dir.path()), "1000 4.0\n2000 8.0\n").unwrap();
            let result = tracking_sky_background(&grid, &arm, &conditions, dir.path());
            assert!(
                matches!(result, Err(BackgroundError::Geometry(_))),
                "{conditions:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_tracking_thermal_uses_named_surfaces() {
        let grid = WavelengthGrid::linear(1500.0, 2500.0, 5).unwrap();
        let arm = TrackingArmConfig::new(0.3);
        let thermal = tracking_instrument_background(&grid, &arm, &train()).unwrap();

        let omega_sr = arcsec2_to_steradian(0.3 * 0.3 * 1.13);
        for (i, &w) in grid.iter().enumerate() {
            // The 0.5 emissivity "fiber" surface is not in the tracking path
            let expected = (0.05 + 0.10 + 0.07)
                * Blackbody::from_kelvin(276.0).photon_radiance(w)
                * 76.0e4
                * omega_sr;
            assert_relative_eq!(thermal[i], expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_temperature_override() {
        let grid = WavelengthGrid::linear(2000.0, 2400.0, 3).unwrap();
        let cold = TrackingArmConfig::new(0.3);
        let warm = cold
            .clone()
            .with_surface_temperature(Temperature::from_kelvin(290.0));

        let cold_bg = tracking_instrument_background(&grid, &cold, &train()).unwrap();
        let warm_bg = tracking_instrument_background(&grid, &warm, &train()).unwrap();
        for i in 0..grid.len() {
            assert!(warm_bg[i] > cold_bg[i]);
        }
    }

    #[test]
    fn test_missing_surface() {
        let grid = WavelengthGrid::linear(2000.0, 2400.0, 3).unwrap();
        let partial = OpticalTrain::new(vec![OpticalSurface::gray("tel", 276.0, 0.05)]).unwrap();
        let result = tracking_instrument_background(&grid, &TrackingArmConfig::new(0.3), &partial);
        assert!(matches!(result, Err(BackgroundError::Emissivity(_))));
    }

    #[test]
    fn test_invalid_fwhm() {
        let grid = WavelengthGrid::linear(2000.0, 2400.0, 3).unwrap();
        let result = tracking_instrument_background(&grid, &TrackingArmConfig::new(0.0), &train());
        assert!(matches!(result, Err(BackgroundError::Geometry(_))));
    }
}

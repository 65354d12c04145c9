//! Instrument thermal background model
//!
//! Every warm surface between the sky and the detector glows as a gray body.
//! Its photon radiance B_λ(T)/(hc/λ), weighted by emissivity and collected
//! over the diffraction-limited beam, the telescope area and one pixel's
//! spectral width, gives a thermal photon rate per pixel.
//!
//! The surfaces that matter differ on either side of 1.4 μm, so the train is
//! accumulated twice: once with "red" emissivities and once with "blue"
//! emissivities. Samples at or above the crossover take the red total, samples
//! below take the blue total, and a quadratic interpolating spline through the
//! combined points produces one continuous spectrum.

use ndarray::Array1;

use super::background::BackgroundError;
use super::blackbody::Blackbody;
use super::spectrum::WavelengthGrid;
use crate::algo::spline::{QuadraticSpline, SPLINE_DEGREE};
use crate::hardware::emissivity::{EmissivityProvider, EmissivityTable, Regime};
use crate::hardware::telescope::SpectrographConfig;
use crate::units::arcsec2_to_steradian;

/// Wavelength separating the blue and red emissivity regimes
pub const REGIME_CROSSOVER_NM: f64 = 1400.0;

/// Regime whose emissivity weighting applies at `wavelength_nm`
pub fn regime_at(wavelength_nm: f64) -> Regime {
    if wavelength_nm >= REGIME_CROSSOVER_NM {
        Regime::Red
    } else {
        Regime::Blue
    }
}

/// Unit-emissivity thermal photon rate (photons/s/pixel) of each surface.
///
/// Blackbody evaluation is shared by both regime passes.
fn surface_thermal_rates(
    grid: &WavelengthGrid,
    spectrograph: &SpectrographConfig,
    table: &EmissivityTable,
) -> Vec<Array1<f64>> {
    let area_cm2 = spectrograph.collecting_area_cm2();
    let collection = grid.map(|&w| {
        area_cm2
            * arcsec2_to_steradian(spectrograph.diffraction_solid_angle_arcsec2(w))
            * spectrograph.pixel_width_nm(w)
    });

    table
        .surfaces
        .iter()
        .map(|surface| {
            let body = Blackbody::new(surface.temperature);
            grid.map(|&w| body.photon_radiance(w)) * &collection
        })
        .collect()
}

/// Sum the surface rates weighted by one regime's emissivities
fn accumulate_regime(
    table: &EmissivityTable,
    surface_rates: &[Array1<f64>],
    regime: Regime,
    n_samples: usize,
) -> Array1<f64> {
    table
        .surfaces
        .iter()
        .zip(surface_rates)
        .fold(Array1::zeros(n_samples), |total, (surface, rate)| {
            total + surface.weights(regime) * rate
        })
}

/// Fit the stitched red/blue thermal background as a quadratic spline.
///
/// The returned spline evaluates to 0 outside the grid bounds.
///
/// # Errors
/// `InvalidInput` for grids of fewer than three samples. Provider failures
/// and invalid geometry are propagated.
pub fn instrument_background_spline<P: EmissivityProvider + ?Sized>(
    grid: &WavelengthGrid,
    spectrograph: &SpectrographConfig,
    provider: &P,
) -> Result<QuadraticSpline, BackgroundError> {
    let n = grid.len();
    if n <= SPLINE_DEGREE {
        return Err(BackgroundError::InvalidInput(format!(
            "instrument background needs at least {} wavelength samples, got {n}",
            SPLINE_DEGREE + 1
        )));
    }
    spectrograph.validate()?;

    let table = provider.emissivity(grid)?;
    table.check_alignment(n)?;
    log::debug!(
        "Instrument background for {}: {} surfaces over {} samples",
        spectrograph.name,
        table.surfaces.len(),
        n
    );

    let surface_rates = surface_thermal_rates(grid, spectrograph, &table);
    let red = accumulate_regime(&table, &surface_rates, Regime::Red, n);
    let blue = accumulate_regime(&table, &surface_rates, Regime::Blue, n);

    // Blue samples precede red ones on an ascending grid, so the stitched
    // abscissae are the grid itself
    let stitched: Vec<f64> = grid
        .iter()
        .enumerate()
        .map(|(i, &w)| match regime_at(w) {
            Regime::Red => red[i],
            Regime::Blue => blue[i],
        })
        .collect();

    Ok(QuadraticSpline::new(grid.as_slice(), &stitched)?)
}

/// Instrument thermal background (photons/s/pixel) at each grid sample.
pub fn instrument_background<P: EmissivityProvider + ?Sized>(
    grid: &WavelengthGrid,
    spectrograph: &SpectrographConfig,
    provider: &P,
) -> Result<Array1<f64>, BackgroundError> {
    let spline = instrument_background_spline(grid, spectrograph, provider)?;
    Ok(grid.map(|&w| spline.evaluate(w)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::emissivity::{OpticalSurface, OpticalTrain};
    use crate::hardware::telescope::models::HISPEC;
    use approx::assert_relative_eq;

    fn gray_train(emissivity: f64) -> OpticalTrain {
        OpticalTrain::new(vec![
            OpticalSurface::gray("tel", 276.0, emissivity),
            OpticalSurface::gray("ao", 280.0, emissivity),
        ])
        .unwrap()
    }

    fn split_train() -> OpticalTrain {
        OpticalTrain::new(vec![
            OpticalSurface {
                name: "tel".to_string(),
                temperature_k: 276.0,
                red_emissivity: 0.3,
                blue_emissivity: 0.1,
            },
            OpticalSurface {
                name: "ao".to_string(),
                temperature_k: 285.0,
                red_emissivity: 0.05,
                blue_emissivity: 0.2,
            },
        ])
        .unwrap()
    }

    /// Direct (unsplined) thermal rate of a gray train
    fn direct_rate(train: &OpticalTrain, wavelength_nm: f64) -> f64 {
        let omega = arcsec2_to_steradian(HISPEC.diffraction_solid_angle_arcsec2(wavelength_nm));
        train
            .surfaces
            .iter()
            .map(|s| {
                s.red_emissivity
                    * Blackbody::from_kelvin(s.temperature_k).photon_radiance(wavelength_nm)
                    * HISPEC.collecting_area_cm2()
                    * omega
                    * HISPEC.pixel_width_nm(wavelength_nm)
            })
            .sum()
    }

    #[test]
    fn test_regime_boundary() {
        assert_eq!(regime_at(1399.999), Regime::Blue);
        assert_eq!(regime_at(1400.0), Regime::Red);
        assert_eq!(regime_at(2000.0), Regime::Red);
    }

    #[test]
    fn test_passes_through_samples() {
        let train = gray_train(0.1);
        let grid = WavelengthGrid::linear(1800.0, 2400.0, 61).unwrap();
        let background = instrument_background(&grid, &HISPEC, &train).unwrap();

        for (i, &w) in grid.iter().enumerate() {
            assert_relative_eq!(background[i], direct_rate(&train, w), max_relative = 1e-9);
        }
    }

    #[test]
    fn test_continuity_at_crossover() {
        let train = gray_train(0.1);
        let grid = WavelengthGrid::linear(1300.0, 1500.0, 201).unwrap();
        let spline = instrument_background_spline(&grid, &HISPEC, &train).unwrap();

        let below = spline.evaluate(1399.5);
        let above = spline.evaluate(1400.5);
        assert!(below > 0.0 && above > below);
        assert_relative_eq!(below, direct_rate(&train, 1399.5), max_relative = 1e-3);
        assert_relative_eq!(above, direct_rate(&train, 1400.5), max_relative = 1e-3);
    }

    #[test]
    fn test_split_regimes_stitch_continuously() {
        let train = split_train();
        let grid = WavelengthGrid::linear(1300.0, 1500.0, 201).unwrap();
        let spline = instrument_background_spline(&grid, &HISPEC, &train).unwrap();

        let rate = |w: f64, s: &OpticalSurface| {
            Blackbody::from_kelvin(s.temperature_k).photon_radiance(w)
                * HISPEC.collecting_area_cm2()
                * arcsec2_to_steradian(HISPEC.diffraction_solid_angle_arcsec2(w))
                * HISPEC.pixel_width_nm(w)
        };
        let blue_sum =
            |w: f64| -> f64 { train.surfaces.iter().map(|s| s.blue_emissivity * rate(w, s)).sum() };
        let red_sum =
            |w: f64| -> f64 { train.surfaces.iter().map(|s| s.red_emissivity * rate(w, s)).sum() };

        // The two regimes disagree at the crossover, so the stitch has a step to absorb
        assert!(blue_sum(REGIME_CROSSOVER_NM) > 1.3 * red_sum(REGIME_CROSSOVER_NM));

        // Last blue sample and first red sample on the 1 nm grid
        let last_blue = grid.as_slice()[99];
        let first_red = grid.as_slice()[100];
        assert_eq!(regime_at(last_blue), Regime::Blue);
        assert_eq!(first_red, REGIME_CROSSOVER_NM);
        assert_relative_eq!(spline.evaluate(last_blue), blue_sum(last_blue), max_relative = 1e-9);
        assert_relative_eq!(spline.evaluate(first_red), red_sum(first_red), max_relative = 1e-9);

        // Far from the crossover the spline follows each regime's own sum
        assert_relative_eq!(spline.evaluate(1320.0), blue_sum(1320.0), max_relative = 1e-9);
        assert_relative_eq!(spline.evaluate(1480.0), red_sum(1480.0), max_relative = 1e-9);

        let eps = 1e-7;
        let below = spline.evaluate(REGIME_CROSSOVER_NM - eps);
        let above = spline.evaluate(REGIME_CROSSOVER_NM + eps);
        assert_relative_eq!(below, above, max_relative = 1e-4);
        assert_relative_eq!(above, red_sum(REGIME_CROSSOVER_NM), max_relative = 1e-4);
    }

    #[test]
    fn test_regime_weights_applied() {
        let train = split_train();
        let grid = WavelengthGrid::new(vec![1200.0, 1300.0, 1500.0, 1600.0]).unwrap();
        let background = instrument_background(&grid, &HISPEC, &train).unwrap();

        let rate = |w: f64, s: &OpticalSurface| {
            Blackbody::from_kelvin(s.temperature_k).photon_radiance(w)
                * HISPEC.collecting_area_cm2()
                * arcsec2_to_steradian(HISPEC.diffraction_solid_angle_arcsec2(w))
                * HISPEC.pixel_width_nm(w)
        };
        let blue_1300: f64 = train
            .surfaces
            .iter()
            .map(|s| s.blue_emissivity * rate(1300.0, s))
            .sum();
        let red_1500: f64 = train
            .surfaces
            .iter()
            .map(|s| s.red_emissivity * rate(1500.0, s))
            .sum();

        assert_relative_eq!(background[1], blue_1300, max_relative = 1e-9);
        assert_relative_eq!(background[2], red_1500, max_relative = 1e-9);
    }

    #[test]
    fn test_zero_outside_domain() {
        let train = gray_train(0.1);
        let grid = WavelengthGrid::linear(1500.0, 2500.0, 21).unwrap();
        let spline = instrument_background_spline(&grid, &HISPEC, &train).unwrap();

        assert_eq!(spline.domain(), (1500.0, 2500.0));
        assert_eq!(spline.evaluate(1499.0), 0.0);
        assert_eq!(spline.evaluate(2600.0), 0.0);
        assert!(spline.evaluate(2000.0) > 0.0);
    }

    #[test]
    fn test_short_grid_rejected() {
        let train = gray_train(0.1);
        let grid = WavelengthGrid::new(vec![1500.0, 2000.0]).unwrap();
        let result = instrument_background(&grid, &HISPEC, &train);
        assert!(matches!(result, Err(BackgroundError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_train_is_dark() {
        let train = OpticalTrain::default();
        let grid = WavelengthGrid::linear(1500.0, 2500.0, 11).unwrap();
        let background = instrument_background(&grid, &HISPEC, &train).unwrap();
        assert!(background.iter().all(|&v| v == 0.0));
    }
}

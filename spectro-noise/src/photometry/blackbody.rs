//! Thermal emission from optical surfaces
//!
//! Planck spectral radiance of a surface at a physical temperature, and its
//! conversion into a photon radiance suitable for counting detected photons.

use super::spectrum::{wavelength_to_ergs, CGS};
use crate::units::{Length, LengthExt, Temperature, TemperatureExt};

/// An ideal blackbody emitter at a fixed physical temperature
#[derive(Debug, Clone, Copy)]
pub struct Blackbody {
    /// Temperature in Kelvin
    temperature_k: f64,
}

impl Blackbody {
    /// Create a blackbody emitter at the given temperature
    pub fn new(temperature: Temperature) -> Self {
        Self {
            temperature_k: temperature.as_kelvin(),
        }
    }

    /// Create a blackbody emitter from a temperature in Kelvin
    pub fn from_kelvin(temperature_k: f64) -> Self {
        Self { temperature_k }
    }

    /// Temperature in Kelvin
    pub fn temperature_k(&self) -> f64 {
        self.temperature_k
    }

    /// Calculate spectral radiance using Planck's law in CGS units
    ///
    /// # Arguments
    ///
    /// * `wavelength_nm` - Wavelength in nanometers
    ///
    /// # Returns
    ///
    /// Spectral radiance in erg⋅s⁻¹⋅cm⁻²⋅sr⁻¹⋅cm⁻¹. Returns 0.0 for
    /// non-positive wavelength or temperature.
    pub fn spectral_radiance(&self, wavelength_nm: f64) -> f64 {
        if wavelength_nm <= 0.0 || self.temperature_k <= 0.0 {
            return 0.0;
        }

        let wavelength_cm = Length::from_nanometers(wavelength_nm).as_centimeters();
        let numerator = 2.0 * CGS::PLANCK_CONSTANT * CGS::SPEED_OF_LIGHT * CGS::SPEED_OF_LIGHT;
        let exponent = (CGS::PLANCK_CONSTANT * CGS::SPEED_OF_LIGHT)
            / (wavelength_cm * CGS::BOLTZMANN_CONSTANT * self.temperature_k);

        // exp_m1 keeps precision in the Rayleigh-Jeans limit; overflow yields 0
        let denominator = wavelength_cm.powi(5) * exponent.exp_m1();

        numerator / denominator
    }

    /// Photon spectral radiance at `wavelength_nm`
    ///
    /// # Returns
    ///
    /// Photons⋅s⁻¹⋅cm⁻²⋅sr⁻¹⋅nm⁻¹
    pub fn photon_radiance(&self, wavelength_nm: f64) -> f64 {
        if wavelength_nm <= 0.0 {
            return 0.0;
        }

        // Per cm of wavelength -> per nm of wavelength
        let cm_per_nm = Length::from_nanometers(1.0).as_centimeters();
        let radiance_per_nm = self.spectral_radiance(wavelength_nm) * cm_per_nm;
        radiance_per_nm / wavelength_to_ergs(wavelength_nm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wien_peak() {
        // Wien's displacement: λ_max = 2.897771955e-3 m K / T
        let body = Blackbody::from_kelvin(276.0);
        let peak_nm = 2.897771955e6 / 276.0;

        let at_peak = body.spectral_radiance(peak_nm);
        assert!(at_peak > body.spectral_radiance(peak_nm * 0.95));
        assert!(at_peak > body.spectral_radiance(peak_nm * 1.05));
    }

    #[test]
    fn test_known_radiance() {
        // B_λ(2 μm, 276 K) = 2hc²/λ⁵ / (exp(hc/λkT) - 1)
        let body = Blackbody::new(Temperature::from_kelvin(276.0));
        let wavelength_cm: f64 = 2.0e-4;
        let hc = CGS::PLANCK_CONSTANT * CGS::SPEED_OF_LIGHT;
        let expected = 2.0 * hc * CGS::SPEED_OF_LIGHT
            / wavelength_cm.powi(5)
            / ((hc / (wavelength_cm * CGS::BOLTZMANN_CONSTANT * 276.0)).exp() - 1.0);

        assert_relative_eq!(
            body.spectral_radiance(2000.0),
            expected,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_photon_radiance_conversion() {
        let body = Blackbody::from_kelvin(290.0);
        let wavelength_nm = 2200.0;

        let energy = body.spectral_radiance(wavelength_nm) * 1e-7;
        let photons = body.photon_radiance(wavelength_nm);
        assert_relative_eq!(
            photons * wavelength_to_ergs(wavelength_nm),
            energy,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_hotter_is_brighter() {
        let cold = Blackbody::from_kelvin(250.0);
        let warm = Blackbody::from_kelvin(290.0);
        for wavelength_nm in [1000.0, 1500.0, 2000.0, 2500.0] {
            assert!(warm.photon_radiance(wavelength_nm) > cold.photon_radiance(wavelength_nm));
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        let body = Blackbody::from_kelvin(276.0);
        assert_eq!(body.spectral_radiance(0.0), 0.0);
        assert_eq!(body.photon_radiance(-10.0), 0.0);
        assert_eq!(Blackbody::from_kelvin(0.0).spectral_radiance(2000.0), 0.0);

        // Deep Wien tail underflows to zero rather than NaN
        let radiance = body.spectral_radiance(10.0);
        assert!(radiance.is_finite());
        assert_eq!(radiance, 0.0);
    }
}

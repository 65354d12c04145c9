//! Type-safe physical units for background and noise modeling
//!
//! This module provides strongly-typed units using the `uom` crate to prevent
//! unit confusion between the nanometer wavelength axis, the meter-scale
//! telescope geometry and the centimeter-based CGS radiometry.

use uom::si::angle::{radian, second};
use uom::si::f64::*;
use uom::si::area::{square_centimeter, square_meter};
use uom::si::length::{centimeter, meter, nanometer};
use uom::si::thermodynamic_temperature::kelvin;

/// Type alias for temperature with convenient methods
pub type Temperature = ThermodynamicTemperature;

/// Type alias for length measurements with convenient methods
pub type Length = uom::si::f64::Length;

/// Type alias for plane angles (FWHM, plate scales)
pub type PlaneAngle = Angle;

/// Extension trait for temperature conversions
pub trait TemperatureExt {
    /// Create temperature from Kelvin
    fn from_kelvin(kelvin: f64) -> Self;

    /// Get temperature in Kelvin
    fn as_kelvin(&self) -> f64;
}

/// Extension trait for length conversions used by the spectrograph models
pub trait LengthExt {
    /// Create length from nanometers (wavelengths)
    fn from_nanometers(nm: f64) -> Self;

    /// Get length in nanometers
    fn as_nanometers(&self) -> f64;

    /// Get length in centimeters (CGS radiometry)
    fn as_centimeters(&self) -> f64;

    /// Create length from meters (telescope geometry)
    fn from_meters(m: f64) -> Self;

    /// Get length in meters
    fn as_meters(&self) -> f64;
}

/// Extension trait for angular quantities
pub trait AngleExt {
    /// Create an angle from radians
    fn from_radians(rad: f64) -> Self;

    /// Get the angle in radians
    fn as_radians(&self) -> f64;

    /// Create an angle from arcseconds
    fn from_arcseconds(arcsec: f64) -> Self;

    /// Get the angle in arcseconds
    fn as_arcseconds(&self) -> f64;
}

impl TemperatureExt for Temperature {
    fn from_kelvin(kelvin_value: f64) -> Self {
        Temperature::new::<kelvin>(kelvin_value)
    }

    fn as_kelvin(&self) -> f64 {
        self.get::<kelvin>()
    }
}

impl LengthExt for Length {
    fn from_nanometers(nm: f64) -> Self {
        Length::new::<nanometer>(nm)
    }

    fn as_nanometers(&self) -> f64 {
        self.get::<nanometer>()
    }

    fn as_centimeters(&self) -> f64 {
        self.get::<centimeter>()
    }

    fn from_meters(m: f64) -> Self {
        Length::new::<meter>(m)
    }

    fn as_meters(&self) -> f64 {
        self.get::<meter>()
    }
}

impl AngleExt for PlaneAngle {
    fn from_radians(rad: f64) -> Self {
        Angle::new::<radian>(rad)
    }

    fn as_radians(&self) -> f64 {
        self.get::<radian>()
    }

    fn from_arcseconds(arcsec: f64) -> Self {
        Angle::new::<second>(arcsec)
    }

    fn as_arcseconds(&self) -> f64 {
        self.get::<second>()
    }
}

/// Convert a solid angle in square arcseconds to steradians
pub fn arcsec2_to_steradian(solid_angle_arcsec2: f64) -> f64 {
    let rad_per_arcsec = PlaneAngle::from_arcseconds(1.0).as_radians();
    solid_angle_arcsec2 * rad_per_arcsec * rad_per_arcsec
}

/// Convert a collecting area in square meters to square centimeters
pub fn square_meters_to_cm2(area_m2: f64) -> f64 {
    Area::new::<square_meter>(area_m2).get::<square_centimeter>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_temperature_conversions() {
        let temp_k = Temperature::from_kelvin(276.0);
        assert_relative_eq!(temp_k.as_kelvin(), 276.0, epsilon = 1e-12);
    }

    #[test]
    fn test_length_conversions() {
        let wavelength = Length::from_nanometers(2000.0);
        assert_relative_eq!(wavelength.as_nanometers(), 2000.0, epsilon = 1e-9);
        assert_relative_eq!(wavelength.as_centimeters(), 2.0e-4, epsilon = 1e-12);
        assert_relative_eq!(wavelength.as_meters(), 2.0e-6, epsilon = 1e-15);

        let diameter = Length::from_meters(10.0);
        assert_relative_eq!(diameter.as_centimeters(), 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_radian_to_arcsec() {
        // 206264.806... arcseconds per radian
        let angle = PlaneAngle::from_radians(1.0);
        assert_relative_eq!(angle.as_arcseconds(), 206_264.806_247, epsilon = 1e-3);

        let back = PlaneAngle::from_arcseconds(angle.as_arcseconds());
        assert_relative_eq!(back.as_radians(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_arcsec2_to_steradian() {
        // One steradian is (206264.8)^2 square arcseconds
        let arcsec_per_rad: f64 = 206_264.806_247_096_36;
        assert_relative_eq!(
            arcsec2_to_steradian(arcsec_per_rad * arcsec_per_rad),
            1.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_area_conversion() {
        assert_relative_eq!(square_meters_to_cm2(76.0), 760_000.0, max_relative = 1e-12);
        assert_relative_eq!(square_meters_to_cm2(1.0e-4), 1.0, max_relative = 1e-12);
    }
}

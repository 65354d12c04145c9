//! Command line arguments shared by the noise budget tools

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::hardware::telescope::{models, SpectrographConfig};
use crate::photometry::sky_background::ObservingConditions;

/// Parse duration string with units (e.g., "60s", "1500ms", "2.5m")
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();

    let (num_str, unit) = if let Some(num) = s.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = s.strip_suffix('s') {
        (num, "s")
    } else if let Some(num) = s.strip_suffix('m') {
        (num, "m")
    } else {
        // Default to seconds if no unit specified
        (s, "s")
    };

    let value: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid numeric value: {}", num_str))?;

    if !value.is_finite() || value < 0.0 {
        return Err("Duration must be a non-negative number".to_string());
    }

    let seconds = match unit {
        "ms" => value / 1000.0,
        "s" => value,
        "m" => value * 60.0,
        _ => return Err(format!("Unknown time unit: {}", unit)),
    };

    Duration::try_from_secs_f64(seconds).map_err(|e| format!("Invalid duration {s:?}: {e}"))
}

/// Exposure time argument accepting unit suffixes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationArg(pub Duration);

impl std::str::FromStr for DurationArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s).map(DurationArg)
    }
}

impl std::fmt::Display for DurationArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total_ms = self.0.as_millis();

        if total_ms >= 1000 && total_ms % 1000 == 0 {
            write!(f, "{}s", total_ms / 1000)
        } else if total_ms >= 1000 {
            write!(f, "{:.3}s", self.0.as_secs_f64())
        } else {
            write!(f, "{}ms", total_ms)
        }
    }
}

impl Default for DurationArg {
    fn default() -> Self {
        DurationArg(Duration::from_secs(60))
    }
}

/// Predefined spectrograph configurations selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SpectrographModel {
    /// HISPEC, R = 100,000 (default)
    Hispec,
    /// KPIC feeding NIRSPEC, R = 35,000
    Kpic,
}

impl std::fmt::Display for SpectrographModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpectrographModel::Hispec => write!(f, "hispec"),
            SpectrographModel::Kpic => write!(f, "kpic"),
        }
    }
}

impl SpectrographModel {
    /// Get the corresponding SpectrographConfig for the selected model
    pub fn to_config(&self) -> &'static SpectrographConfig {
        match self {
            SpectrographModel::Hispec => &models::HISPEC,
            SpectrographModel::Kpic => &models::KPIC,
        }
    }
}

/// Observing setup shared by the noise budget binaries
#[derive(Parser, Debug, Clone)]
pub struct SharedObservingArgs {
    /// Spectrograph model
    #[arg(long, value_enum, default_value_t = SpectrographModel::Hispec)]
    pub spectrograph: SpectrographModel,

    /// Override the resolving power of the selected spectrograph
    #[arg(long)]
    pub resolving_power: Option<f64>,

    /// Frame exposure time (e.g., "60s", "1500ms", "2m")
    #[arg(long, default_value = "60s")]
    pub exposure: DurationArg,

    /// Airmass label of the sky table
    #[arg(long, default_value_t = 1.5)]
    pub airmass: f64,

    /// Precipitable water vapor label of the sky table
    #[arg(long, default_value_t = 1.5)]
    pub pwv: f64,

    /// Directory holding mk_skybg_zm_<pwv>_<airmass>_ph.dat tables
    #[arg(long, default_value = "data/sky")]
    pub sky_dir: PathBuf,

    /// JSON description of the optical train
    #[arg(long, default_value = "data/optical_train.json")]
    pub optical_train: PathBuf,
}

impl SharedObservingArgs {
    /// Selected spectrograph with any resolving power override applied
    pub fn spectrograph_config(&self) -> SpectrographConfig {
        let base = self.spectrograph.to_config();
        match self.resolving_power {
            Some(resolving_power) => base.with_resolving_power(resolving_power),
            None => base.clone(),
        }
    }

    /// Observing conditions selecting the sky table
    pub fn conditions(&self) -> ObservingConditions {
        ObservingConditions::new(self.airmass, self.pwv)
    }
}

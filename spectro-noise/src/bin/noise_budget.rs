//! Single-exposure noise budget calculator
//!
//! Computes the sky and instrument thermal backgrounds collected by one pixel
//! of the selected spectrograph, integrates them over the exposure and
//! combines them with shot, read and dark noise for a flat source spectrum.
//! Prints one row per wavelength sample.

use clap::Parser;
use ndarray::Array1;
use serde::Serialize;
use spectro_noise::hardware::emissivity::OpticalTrain;
use spectro_noise::hardware::noise_budget::{
    noise_components, BackgroundRates, NoiseBudgetInputs,
};
use spectro_noise::photometry::{instrument_background, sky_background, WavelengthGrid};
use spectro_noise::shared_args::SharedObservingArgs;

#[derive(Parser, Debug)]
#[command(
    name = "Noise Budget",
    about = "Per-sample noise budget for one spectrograph exposure",
    long_about = None
)]
struct Args {
    #[command(flatten)]
    shared: SharedObservingArgs,

    /// First wavelength of the grid in nanometers
    #[arg(long, default_value_t = 980.0)]
    start_nm: f64,

    /// Last wavelength of the grid in nanometers
    #[arg(long, default_value_t = 2460.0)]
    end_nm: f64,

    /// Number of evenly spaced wavelength samples
    #[arg(long, default_value_t = 25)]
    samples: usize,

    /// Sample log-uniformly at this many points per unit ln λ instead
    #[arg(long)]
    samples_per_ln: Option<f64>,

    /// Source signal per sample in electrons
    #[arg(long, default_value_t = 10_000.0)]
    flux: f64,

    /// Number of up-the-ramp reads
    #[arg(long, default_value_t = 4)]
    ramps: u32,

    /// Dark current in electrons per pixel
    #[arg(long, default_value_t = 0.01)]
    dark_current: f64,

    /// Single-read noise in electrons
    #[arg(long, default_value_t = 12.0)]
    read_noise: f64,

    /// Cross-dispersion pixels summed per sample
    #[arg(long, default_value_t = 3.0)]
    pixels: f64,

    /// Emit JSON instead of a text table
    #[arg(long)]
    json: bool,
}

/// One wavelength sample of the budget, all noise terms in electrons
#[derive(Debug, Serialize)]
struct BudgetRow {
    wavelength_nm: f64,
    sky_e: f64,
    instrument_e: f64,
    shot: f64,
    background: f64,
    read: f64,
    dark: f64,
    total: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let spectrograph = args.shared.spectrograph_config();
    let exposure = args.shared.exposure.0;
    let conditions = args.shared.conditions();

    let grid = match args.samples_per_ln {
        Some(density) => WavelengthGrid::log_uniform(args.start_nm, args.end_nm, density)?,
        None => WavelengthGrid::linear(args.start_nm, args.end_nm, args.samples)?,
    };
    log::info!(
        "{} samples over {:.1}-{:.1} nm",
        grid.len(),
        grid.bounds().0,
        grid.bounds().1
    );
    let train = OpticalTrain::load(&args.shared.optical_train)?;

    let sky = sky_background(&grid, &spectrograph, &conditions, &args.shared.sky_dir)?;
    let instrument = instrument_background(&grid, &spectrograph, &train)?;
    let integrated = BackgroundRates::new(instrument, sky).integrate(exposure);

    let inputs = NoiseBudgetInputs {
        flux: Array1::from_elem(grid.len(), args.flux),
        exposure,
        ramps: args.ramps,
        instrument_background: Default::default(),
        sky_background: Default::default(),
        dark_current: args.dark_current,
        read_noise: args.read_noise,
        pixels: args.pixels,
    }
    .with_background(integrated);
    let components = noise_components(&inputs)?;

    let rows: Vec<BudgetRow> = grid
        .iter()
        .enumerate()
        .map(|(i, &wavelength_nm)| BudgetRow {
            wavelength_nm,
            sky_e: inputs.sky_background.value_at(i),
            instrument_e: inputs.instrument_background.value_at(i),
            shot: components.shot[i],
            background: components.background[i],
            read: components.read,
            dark: components.dark,
            total: components.total[i],
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Noise Budget: {}", spectrograph.name);
    println!("===================");
    println!(
        "R = {:.0}, exposure {}, {} ramps, airmass {}, PWV {}",
        spectrograph.resolving_power,
        args.shared.exposure,
        args.ramps,
        conditions.airmass,
        conditions.pwv
    );
    println!();
    println!(
        "{:>10} {:>12} {:>12} {:>10} {:>10} {:>8} {:>8} {:>10}",
        "λ (nm)", "sky (e-)", "inst (e-)", "shot", "bkg", "read", "dark", "total"
    );
    println!("{}", "-".repeat(88));
    for row in &rows {
        println!(
            "{:>10.2} {:>12.4e} {:>12.4e} {:>10.3} {:>10.3} {:>8.3} {:>8.3} {:>10.3}",
            row.wavelength_nm,
            row.sky_e,
            row.instrument_e,
            row.shot,
            row.background,
            row.read,
            row.dark,
            row.total
        );
    }

    Ok(())
}

//! Command-line spectrum synthesis: mode table in, broadened spectrum out.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rusty_spectra::data::filter::ModeFilter;
use rusty_spectra::data::loader::load_file;
use rusty_spectra::export::{write_spectrum, OutputFormat};
use rusty_spectra::peak_table::{group_modes, ModeGroup};
use rusty_spectra::{FrequencyUnit, Lineshape, SpectrumAxis, SpectrumConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "synthesize")]
#[command(about = "Simulate a broadened vibrational spectrum from a mode table", long_about = None)]
struct Args {
    /// Mode table (.csv, .json, .parquet, .dat)
    #[arg(value_name = "MODES")]
    modes: PathBuf,

    /// JSON spectrum config; command-line options override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Lineshape: lorentzian or gaussian
    #[arg(long, value_name = "SHAPE")]
    lineshape: Option<Lineshape>,

    /// Instrument width in the input unit (FWHM unless --sigma)
    #[arg(long, value_name = "WIDTH")]
    width: Option<f64>,

    /// Treat widths as Gaussian standard deviations rather than FWHM
    #[arg(long)]
    sigma: bool,

    /// Ignore per-mode linewidths in the table
    #[arg(long)]
    no_linewidths: bool,

    /// Axis start, in the input unit
    #[arg(long, requires_all = ["end", "resolution"])]
    start: Option<f64>,

    /// Axis end, in the input unit
    #[arg(long, requires_all = ["start", "resolution"])]
    end: Option<f64>,

    /// Axis step, in the input unit
    #[arg(long, requires_all = ["start", "end"])]
    resolution: Option<f64>,

    /// Unit of the frequencies in the mode table: thz, inv_cm, mev, um
    #[arg(long, value_name = "UNIT", default_value = "inv_cm")]
    from_unit: FrequencyUnit,

    /// Unit of the output x-axis: thz, inv_cm, mev
    #[arg(long, value_name = "UNIT")]
    unit: Option<FrequencyUnit>,

    /// Drop modes with negative (imaginary) frequencies
    #[arg(long)]
    exclude_imaginary: bool,

    /// Drop modes below this intensity
    #[arg(long, value_name = "INTENSITY")]
    min_intensity: Option<f64>,

    /// Scale the spectrum to unit maximum
    #[arg(long)]
    normalise: bool,

    /// Output format (default: from the output extension, else dat)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// JSON list of {"symbol", "band_indices"} groups for a peak table
    #[arg(long, value_name = "FILE", requires = "peak_table")]
    groups: Option<PathBuf>,

    /// Where to write the peak table
    #[arg(long, value_name = "FILE", requires = "groups")]
    peak_table: Option<PathBuf>,
}

impl Args {
    /// Config file (or defaults) with command-line overrides applied.
    fn spectrum_config(&self) -> Result<SpectrumConfig> {
        let mut config = match &self.config {
            Some(path) => SpectrumConfig::from_json_file(path)?,
            None => SpectrumConfig::default(),
        };
        if let Some(shape) = self.lineshape {
            config.lineshape = shape;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if self.sigma {
            config.width_is_fwhm = false;
        }
        if self.no_linewidths {
            config.use_linewidths = false;
        }
        if let (Some(start), Some(end), Some(resolution)) = (self.start, self.end, self.resolution)
        {
            config.axis = Some(SpectrumAxis::new(start, end, resolution)?);
        }
        if self.unit.is_some() {
            config.unit = self.unit;
        }
        Ok(config)
    }

    fn mode_filter(&self) -> ModeFilter {
        ModeFilter {
            exclude_imaginary: self.exclude_imaginary,
            min_intensity: self.min_intensity,
            frequency_range: None,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = args.spectrum_config()?;
    let modes = load_file(&args.modes, args.from_unit)
        .with_context(|| format!("loading {}", args.modes.display()))?;

    if let (Some(groups_path), Some(table_path)) = (&args.groups, &args.peak_table) {
        let text = std::fs::read_to_string(groups_path)
            .with_context(|| format!("reading {}", groups_path.display()))?;
        let groups: Vec<ModeGroup> = serde_json::from_str(&text).context("parsing groups JSON")?;
        let table = group_modes(&modes, &groups)?;
        std::fs::write(table_path, table.render())
            .with_context(|| format!("writing {}", table_path.display()))?;
        log::info!("Wrote {} peaks to {}", table.peaks.len(), table_path.display());
    }

    let filter = args.mode_filter();
    let modes = if filter.is_noop() {
        modes
    } else {
        let kept = filter.apply(&modes);
        log::info!("{} of {} modes pass the filter", kept.len(), modes.len());
        kept
    };

    let spectrum = config.synthesize(&modes)?;
    let spectrum = if args.normalise {
        spectrum.normalised()
    } else {
        spectrum
    };
    let unit = config.output_unit(modes.unit);

    match &args.output {
        Some(path) => {
            let format = args.format.unwrap_or_else(|| OutputFormat::from_path(path));
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_spectrum(std::io::BufWriter::new(file), &spectrum, unit, format)?;
            log::info!("Wrote {} samples to {}", spectrum.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_spectrum(&mut lock, &spectrum, unit, args.format.unwrap_or(OutputFormat::Dat))?;
            lock.flush()?;
        }
    }

    Ok(())
}

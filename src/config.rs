use std::path::Path;

use anyhow::Context;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::data::model::{ModeSet, Spectrum};
use crate::error::Result;
use crate::synthesis::{synthesize, BroadeningKernel, Lineshape, SpectrumAxis};
use crate::units::{fwhm_to_sigma, linear_factor, FrequencyUnit};

/// Padding either side of the outermost modes for an automatic axis, in widths.
const AUTO_AXIS_PADDING: f64 = 5.0;

/// Samples per width for an automatic axis.
const AUTO_AXIS_SAMPLES_PER_WIDTH: f64 = 20.0;

// ---------------------------------------------------------------------------
// SpectrumConfig
// ---------------------------------------------------------------------------

/// Everything needed to turn a [`ModeSet`] into a [`Spectrum`].
///
/// `width` and `axis` are expressed in the unit of the mode set being
/// synthesised; `unit` only relabels and rescales the output x-axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    pub lineshape: Lineshape,
    /// Instrument width, used for modes without a linewidth of their own.
    pub width: f64,
    /// Widths (instrument and per-mode) are FWHM and are converted to σ for
    /// the Gaussian lineshape.
    pub width_is_fwhm: bool,
    /// Use per-mode linewidths when the mode set carries them.
    pub use_linewidths: bool,
    /// Sampling grid; `None` picks one from the mode frequencies.
    pub axis: Option<SpectrumAxis>,
    /// Output x-axis unit; `None` keeps the mode set's unit.
    pub unit: Option<FrequencyUnit>,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            lineshape: Lineshape::Lorentzian,
            width: 5.0,
            width_is_fwhm: true,
            use_linewidths: true,
            axis: None,
            unit: None,
        }
    }
}

impl SpectrumConfig {
    /// Read a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: SpectrumConfig =
            serde_json::from_str(&text).context("parsing config JSON")?;
        info!("Loaded spectrum config from {}", path.display());
        Ok(config)
    }

    /// Output unit for a mode set in `input` units.
    pub fn output_unit(&self, input: FrequencyUnit) -> FrequencyUnit {
        self.unit.unwrap_or(input)
    }

    /// Explicit axis, or one spanning the modes with some padding.
    ///
    /// The instrument width sizes the automatic axis, so a bad width is
    /// reported as `InvalidKernel` here rather than as a degenerate axis.
    pub fn resolve_axis(&self, modes: &ModeSet) -> Result<SpectrumAxis> {
        self.kernel().validate()?;
        if let Some(axis) = self.axis {
            return Ok(axis);
        }
        let widest = modes
            .modes
            .iter()
            .filter_map(|m| if self.use_linewidths { m.linewidth() } else { None })
            .fold(self.width, f64::max);
        let resolution = self.width / AUTO_AXIS_SAMPLES_PER_WIDTH;
        let (start, end) = match modes.frequency_range() {
            Some((lo, hi)) => (lo - AUTO_AXIS_PADDING * widest, hi + AUTO_AXIS_PADDING * widest),
            None => (0.0, 2.0 * AUTO_AXIS_PADDING * self.width),
        };
        SpectrumAxis::new(start, end, resolution)
    }

    /// The kernel actually handed to the synthesizer, after FWHM → σ.
    pub fn kernel(&self) -> BroadeningKernel {
        BroadeningKernel {
            shape: self.lineshape,
            width: self.effective_width(self.width),
        }
    }

    fn effective_width(&self, width: f64) -> f64 {
        match self.lineshape {
            Lineshape::Gaussian if self.width_is_fwhm => fwhm_to_sigma(width),
            _ => width,
        }
    }

    /// Synthesise the spectrum of `modes` under this configuration.
    pub fn synthesize(&self, modes: &ModeSet) -> Result<Spectrum> {
        let kernel = self.kernel();
        kernel.validate()?;
        let axis = self.resolve_axis(modes)?;
        let x_scale = linear_factor(modes.unit, self.output_unit(modes.unit))?;

        let prepared = modes
            .modes
            .iter()
            .map(|m| {
                let linewidth = if self.use_linewidths {
                    m.linewidth().map(|w| self.effective_width(w))
                } else {
                    None
                };
                m.with_linewidth(linewidth)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "axis [{}, {}] step {} {}, x scale {x_scale}",
            axis.start, axis.end, axis.resolution, modes.unit
        );
        synthesize(&prepared, &axis, &kernel, x_scale)
    }
}

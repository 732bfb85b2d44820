//! Spectrum synthesis: discrete modes → broadened, sampled spectrum.
//!
//! ```text
//!   &[Mode] ──┐
//!             │   for every sample x on the axis:
//!   axis   ───┼──▶   y(x) = Σ_i  I_i · kernel(x − f_i, w_i)
//!   kernel ───┘
//!                                       │
//!                                       ▼  x · x_scale
//!                                   Spectrum
//! ```
//!
//! Both kernels are normalised to unit area, so the area under the spectrum
//! tracks the summed intensity. Tails are never truncated.

use std::f64::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::model::{Mode, Spectrum};
use crate::error::{Result, SpectrumError};

// ---------------------------------------------------------------------------
// SpectrumAxis
// ---------------------------------------------------------------------------

/// Largest grid an axis may describe.
pub const MAX_SAMPLES: usize = 10_000_000;

/// Uniform sampling grid `start, start + resolution, …` up to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumAxis {
    pub start: f64,
    pub end: f64,
    pub resolution: f64,
}

impl SpectrumAxis {
    /// Build and validate an axis.
    pub fn new(start: f64, end: f64, resolution: f64) -> Result<Self> {
        let axis = SpectrumAxis {
            start,
            end,
            resolution,
        };
        axis.validate()?;
        Ok(axis)
    }

    /// Check `start < end`, `resolution > 0` and that the grid holds between
    /// 2 and [`MAX_SAMPLES`] samples.
    pub fn validate(&self) -> Result<()> {
        let SpectrumAxis {
            start,
            end,
            resolution,
        } = *self;
        if !(start.is_finite() && end.is_finite() && resolution.is_finite()) {
            return Err(SpectrumError::InvalidAxis(format!(
                "non-finite axis ({start}, {end}, {resolution})"
            )));
        }
        if start >= end {
            return Err(SpectrumError::InvalidAxis(format!(
                "start ({start}) must be below end ({end})"
            )));
        }
        if resolution <= 0.0 {
            return Err(SpectrumError::InvalidAxis(format!(
                "resolution must be positive, got {resolution}"
            )));
        }
        let steps = self.steps();
        if !steps.is_finite() || steps >= MAX_SAMPLES as f64 {
            return Err(SpectrumError::InvalidAxis(format!(
                "[{start}, {end}] at resolution {resolution} exceeds {MAX_SAMPLES} samples"
            )));
        }
        if self.num_samples() < 2 {
            return Err(SpectrumError::InvalidAxis(format!(
                "resolution {resolution} leaves fewer than 2 samples in [{start}, {end}]"
            )));
        }
        Ok(())
    }

    /// Number of grid points. `end` is included when it lies on the grid.
    /// Saturates at `usize::MAX` for axes that [`validate`](Self::validate)
    /// would reject as too large.
    pub fn num_samples(&self) -> usize {
        let steps = self.steps();
        if !steps.is_finite() || steps >= usize::MAX as f64 {
            return usize::MAX;
        }
        // Absorb rounding so that e.g. (0, 1, 0.1) yields 11 points.
        ((steps + 1e-9 * steps.max(1.0)).floor() as usize).saturating_add(1)
    }

    fn steps(&self) -> f64 {
        (self.end - self.start) / self.resolution
    }

    /// The sample points.
    pub fn points(&self) -> Vec<f64> {
        (0..self.num_samples())
            .map(|i| self.start + i as f64 * self.resolution)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Broadening kernels
// ---------------------------------------------------------------------------

/// Lineshape used to broaden each stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lineshape {
    /// `width` is the FWHM.
    Lorentzian,
    /// `width` is the standard deviation σ.
    Gaussian,
}

impl Lineshape {
    pub const ALL: [Lineshape; 2] = [Lineshape::Lorentzian, Lineshape::Gaussian];

    pub fn name(self) -> &'static str {
        match self {
            Lineshape::Lorentzian => "Lorentzian",
            Lineshape::Gaussian => "Gaussian",
        }
    }

    /// Unit-area lineshape evaluated at offset `dx` from the centre.
    pub fn evaluate(self, dx: f64, width: f64) -> f64 {
        match self {
            Lineshape::Lorentzian => {
                let half = 0.5 * width;
                width / (2.0 * PI) / (dx * dx + half * half)
            }
            Lineshape::Gaussian => {
                (-(dx * dx) / (2.0 * width * width)).exp() / (width * (2.0 * PI).sqrt())
            }
        }
    }
}

impl std::str::FromStr for Lineshape {
    type Err = SpectrumError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lorentzian" | "lorentz" => Ok(Lineshape::Lorentzian),
            "gaussian" | "gauss" => Ok(Lineshape::Gaussian),
            other => Err(SpectrumError::InvalidKernel(format!(
                "unknown lineshape '{other}'"
            ))),
        }
    }
}

/// A lineshape with its instrument width. Per-mode linewidths, when present,
/// take precedence over `width`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BroadeningKernel {
    pub shape: Lineshape,
    pub width: f64,
}

impl BroadeningKernel {
    pub fn lorentzian(width: f64) -> Self {
        BroadeningKernel {
            shape: Lineshape::Lorentzian,
            width,
        }
    }

    pub fn gaussian(width: f64) -> Self {
        BroadeningKernel {
            shape: Lineshape::Gaussian,
            width,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_width(self.width)
    }

    /// Width to use for `mode`.
    fn width_for(&self, mode: &Mode) -> f64 {
        mode.linewidth().unwrap_or(self.width)
    }
}

fn check_width(width: f64) -> Result<()> {
    if !width.is_finite() || width <= 0.0 {
        return Err(SpectrumError::InvalidKernel(format!(
            "width must be positive and finite, got {width}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Broaden `modes` onto `axis` with `kernel`, then multiply x by `x_scale`.
///
/// An empty mode slice gives an all-zero spectrum. Negative frequencies are
/// broadened like any other.
pub fn synthesize(
    modes: &[Mode],
    axis: &SpectrumAxis,
    kernel: &BroadeningKernel,
    x_scale: f64,
) -> Result<Spectrum> {
    axis.validate()?;
    kernel.validate()?;
    if !x_scale.is_finite() || x_scale == 0.0 {
        return Err(SpectrumError::InvalidAxis(format!(
            "x scale factor must be finite and non-zero, got {x_scale}"
        )));
    }

    let widths: Vec<f64> = modes.iter().map(|m| kernel.width_for(m)).collect();
    for &w in &widths {
        check_width(w)?;
    }

    debug!(
        "synthesizing {} modes on {} samples with {} kernel (width {})",
        modes.len(),
        axis.num_samples(),
        kernel.shape.name(),
        kernel.width
    );

    let points = axis.points();
    let y: Vec<f64> = points
        .iter()
        .map(|&x| {
            modes
                .iter()
                .zip(&widths)
                .map(|(m, &w)| m.intensity() * kernel.shape.evaluate(x - m.frequency(), w))
                .sum::<f64>()
        })
        .collect();

    let x = points.into_iter().map(|x| x * x_scale).collect();
    Ok(Spectrum { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_sample_count() {
        assert_eq!(SpectrumAxis::new(0.0, 1.0, 0.1).unwrap().num_samples(), 11);
        assert_eq!(SpectrumAxis::new(0.0, 1.0, 0.3).unwrap().num_samples(), 4);
        assert_eq!(SpectrumAxis::new(0.0, 1.0, 1.0).unwrap().num_samples(), 2);
        let pts = SpectrumAxis::new(-1.0, 1.0, 0.5).unwrap().points();
        assert_eq!(pts, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn axis_too_coarse() {
        assert!(matches!(
            SpectrumAxis::new(0.0, 1.0, 2.0),
            Err(SpectrumError::InvalidAxis(_))
        ));
    }

    #[test]
    fn axis_too_fine() {
        for (start, end, resolution) in [
            (0.0, 1e300, 1e-300),
            (-1e308, 1e308, 1.0),
            (0.0, 1e12, 1.0),
        ] {
            assert!(
                matches!(
                    SpectrumAxis::new(start, end, resolution),
                    Err(SpectrumError::InvalidAxis(ref msg)) if msg.contains("exceeds")
                ),
                "({start}, {end}, {resolution})"
            );
        }
        let huge = SpectrumAxis {
            start: 0.0,
            end: 1e300,
            resolution: 1e-300,
        };
        assert_eq!(huge.num_samples(), usize::MAX);
        assert!(SpectrumAxis::new(0.0, 1000.0, 1e-3).is_ok());
    }

    #[test]
    fn axis_rejects_nan() {
        assert!(SpectrumAxis::new(f64::NAN, 1.0, 0.1).is_err());
        assert!(SpectrumAxis::new(0.0, 1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn kernel_width_validation() {
        let axis = SpectrumAxis::new(0.0, 10.0, 1.0).unwrap();
        for w in [0.0, -1.0, f64::NAN] {
            let err = synthesize(&[], &axis, &BroadeningKernel::gaussian(w), 1.0);
            assert!(matches!(err, Err(SpectrumError::InvalidKernel(_))), "width {w}");
        }
    }

    #[test]
    fn per_mode_linewidth_overrides_instrument_width() {
        let axis = SpectrumAxis::new(-10.0, 10.0, 0.5).unwrap();
        let own = Mode::new(0.0, 1.0, Some(4.0)).unwrap();
        let plain = Mode::new(0.0, 1.0, None).unwrap();
        let kernel = BroadeningKernel::lorentzian(1.0);

        let a = synthesize(&[own], &axis, &kernel, 1.0).unwrap();
        let b = synthesize(&[plain], &axis, &BroadeningKernel::lorentzian(4.0), 1.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn x_scale_only_touches_x() {
        let axis = SpectrumAxis::new(0.0, 4.0, 1.0).unwrap();
        let modes = [Mode::new(2.0, 3.0, None).unwrap()];
        let kernel = BroadeningKernel::gaussian(1.0);
        let plain = synthesize(&modes, &axis, &kernel, 1.0).unwrap();
        let scaled = synthesize(&modes, &axis, &kernel, 10.0).unwrap();
        assert_eq!(plain.y, scaled.y);
        assert_eq!(scaled.x, vec![0.0, 10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn gaussian_peak_value() {
        let axis = SpectrumAxis::new(-5.0, 5.0, 1.0).unwrap();
        let modes = [Mode::new(0.0, 2.0, None).unwrap()];
        let sp = synthesize(&modes, &axis, &BroadeningKernel::gaussian(0.5), 1.0).unwrap();
        let centre = sp.y[5];
        let expected = 2.0 / (0.5 * (2.0 * PI).sqrt());
        assert!((centre - expected).abs() < 1e-12);
    }

    #[test]
    fn parses_lineshape() {
        assert_eq!("Gaussian".parse::<Lineshape>().unwrap(), Lineshape::Gaussian);
        assert_eq!("lorentz".parse::<Lineshape>().unwrap(), Lineshape::Lorentzian);
        assert!("voigt".parse::<Lineshape>().is_err());
    }
}

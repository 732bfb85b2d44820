use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpectrumError};

// ---------------------------------------------------------------------------
// Conversion constants
// ---------------------------------------------------------------------------

/// THz → cm⁻¹  (= THz / (c / cm))
pub const THZ_TO_INV_CM: f64 = 33.3564095198152;

/// THz → meV  (= h · THz, h in meV·ps)
pub const THZ_TO_MEV: f64 = 4.135667696;

/// THz → µm⁻¹
pub const THZ_TO_INV_UM: f64 = THZ_TO_INV_CM / 1.0e4;

// ---------------------------------------------------------------------------
// FrequencyUnit
// ---------------------------------------------------------------------------

/// Units a mode frequency or a spectrum x-axis can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyUnit {
    Thz,
    InvCm,
    Mev,
    /// Wavelength in µm. Reciprocal in frequency, so never a linear axis scale.
    Um,
}

impl FrequencyUnit {
    pub const ALL: [FrequencyUnit; 4] = [
        FrequencyUnit::Thz,
        FrequencyUnit::InvCm,
        FrequencyUnit::Mev,
        FrequencyUnit::Um,
    ];

    /// Label used in plot axes and output file headers.
    pub fn label(self) -> &'static str {
        match self {
            FrequencyUnit::Thz => "THz",
            FrequencyUnit::InvCm => "cm^-1",
            FrequencyUnit::Mev => "meV",
            FrequencyUnit::Um => "um",
        }
    }

    /// Whether values in this unit are proportional to frequency.
    pub fn is_linear(self) -> bool {
        !matches!(self, FrequencyUnit::Um)
    }

    fn to_thz(self, value: f64) -> f64 {
        match self {
            FrequencyUnit::Thz => value,
            FrequencyUnit::InvCm => value / THZ_TO_INV_CM,
            FrequencyUnit::Mev => value / THZ_TO_MEV,
            FrequencyUnit::Um => 1.0 / (value * THZ_TO_INV_UM),
        }
    }

    fn from_thz(self, thz: f64) -> f64 {
        match self {
            FrequencyUnit::Thz => thz,
            FrequencyUnit::InvCm => thz * THZ_TO_INV_CM,
            FrequencyUnit::Mev => thz * THZ_TO_MEV,
            FrequencyUnit::Um => 1.0 / (thz * THZ_TO_INV_UM),
        }
    }
}

impl fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FrequencyUnit {
    type Err = SpectrumError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thz" => Ok(FrequencyUnit::Thz),
            "inv_cm" | "cm-1" | "cm^-1" | "wavenumber" => Ok(FrequencyUnit::InvCm),
            "mev" => Ok(FrequencyUnit::Mev),
            "um" => Ok(FrequencyUnit::Um),
            _ => Err(SpectrumError::UnsupportedUnit(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Convert a single value from `from` to `to`, going through THz.
pub fn convert(value: f64, from: FrequencyUnit, to: FrequencyUnit) -> f64 {
    if from == to {
        return value;
    }
    to.from_thz(from.to_thz(value))
}

/// Convert a slice of values from `from` to `to`.
pub fn convert_all(values: &[f64], from: FrequencyUnit, to: FrequencyUnit) -> Vec<f64> {
    values.iter().map(|&v| convert(v, from, to)).collect()
}

/// Scale factor taking an x-axis in `from` to `to`.
///
/// Only defined between linear units; wavelength axes are rejected.
pub fn linear_factor(from: FrequencyUnit, to: FrequencyUnit) -> Result<f64> {
    for unit in [from, to] {
        if !unit.is_linear() {
            return Err(SpectrumError::UnsupportedUnit(format!(
                "{unit} is not a linear frequency scale"
            )));
        }
    }
    Ok(convert(1.0, from, to))
}

/// Convert a Gaussian FWHM to its standard deviation.
pub fn fwhm_to_sigma(fwhm: f64) -> f64 {
    fwhm / (2.0 * (2.0 * std::f64::consts::LN_2).sqrt())
}

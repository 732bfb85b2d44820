use serde::{Deserialize, Serialize};

use crate::error::{Result, SpectrumError};
use crate::units::FrequencyUnit;

// ---------------------------------------------------------------------------
// Mode – one vibrational degree of freedom
// ---------------------------------------------------------------------------

/// A single vibrational mode: frequency, spectroscopic intensity and an
/// optional linewidth (FWHM, same units as the frequency).
///
/// Fields are private so every `Mode` in circulation has passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Mode {
    frequency: f64,
    intensity: f64,
    linewidth: Option<f64>,
}

impl Mode {
    /// Build a mode, rejecting non-finite values and non-positive linewidths.
    ///
    /// Negative frequencies (imaginary modes) are accepted; excluding them is
    /// the caller's decision, see [`crate::data::filter`].
    pub fn new(frequency: f64, intensity: f64, linewidth: Option<f64>) -> Result<Self> {
        if !frequency.is_finite() {
            return Err(SpectrumError::InvalidMode(format!(
                "frequency must be finite, got {frequency}"
            )));
        }
        if !intensity.is_finite() {
            return Err(SpectrumError::InvalidMode(format!(
                "intensity must be finite, got {intensity}"
            )));
        }
        if let Some(w) = linewidth {
            if !w.is_finite() || w <= 0.0 {
                return Err(SpectrumError::InvalidKernel(format!(
                    "linewidth must be positive and finite, got {w}"
                )));
            }
        }
        Ok(Mode {
            frequency,
            intensity,
            linewidth,
        })
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn linewidth(&self) -> Option<f64> {
        self.linewidth
    }

    /// Same mode with the linewidth replaced (or removed).
    pub fn with_linewidth(self, linewidth: Option<f64>) -> Result<Self> {
        Mode::new(self.frequency, self.intensity, linewidth)
    }
}

#[derive(Deserialize)]
struct RawMode {
    frequency: f64,
    intensity: f64,
    #[serde(default)]
    linewidth: Option<f64>,
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawMode::deserialize(deserializer)?;
        Mode::new(raw.frequency, raw.intensity, raw.linewidth).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// ModeSet – the loaded mode table
// ---------------------------------------------------------------------------

/// An ordered collection of modes plus the unit their frequencies are in.
///
/// Order is kept so the modes can be correlated with peak tables and
/// band indices; it has no effect on synthesis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeSet {
    pub modes: Vec<Mode>,
    pub unit: FrequencyUnit,
    /// Optional per-mode labels (ir. rep. symbols), same length as `modes`.
    pub labels: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct RawModeSet {
    modes: Vec<Mode>,
    unit: FrequencyUnit,
    #[serde(default)]
    labels: Option<Vec<String>>,
}

impl<'de> Deserialize<'de> for ModeSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawModeSet::deserialize(deserializer)?;
        let set = ModeSet::new(raw.modes, raw.unit);
        match raw.labels {
            Some(labels) => set.with_labels(labels).map_err(serde::de::Error::custom),
            None => Ok(set),
        }
    }
}

impl ModeSet {
    pub fn new(modes: Vec<Mode>, unit: FrequencyUnit) -> Self {
        ModeSet {
            modes,
            unit,
            labels: None,
        }
    }

    /// Attach per-mode labels. Fails if the count does not match.
    pub fn with_labels(mut self, labels: Vec<String>) -> Result<Self> {
        if labels.len() != self.modes.len() {
            return Err(SpectrumError::InconsistentModeData(format!(
                "{} labels for {} modes",
                labels.len(),
                self.modes.len()
            )));
        }
        self.labels = Some(labels);
        Ok(self)
    }

    /// Number of modes.
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Whether any mode carries its own linewidth.
    pub fn has_linewidths(&self) -> bool {
        self.modes.iter().any(|m| m.linewidth().is_some())
    }

    /// Lowest and highest frequency, `None` for an empty set.
    pub fn frequency_range(&self) -> Option<(f64, f64)> {
        self.modes.iter().map(Mode::frequency).fold(None, |acc, f| match acc {
            None => Some((f, f)),
            Some((lo, hi)) => Some((lo.min(f), hi.max(f))),
        })
    }

    /// Label of mode `i`, `"?"` when the set has no label for it.
    pub fn label(&self, i: usize) -> &str {
        self.labels
            .as_ref()
            .and_then(|labels| labels.get(i))
            .map_or("?", String::as_str)
    }

    /// Keep only the modes at `indices`, carrying labels along.
    ///
    /// Indices past the end are skipped. Labels stay aligned with the kept
    /// modes even if `labels` was edited to a different length.
    pub fn select(&self, indices: &[usize]) -> ModeSet {
        let kept: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.modes.len())
            .collect();
        ModeSet {
            modes: kept.iter().map(|&i| self.modes[i]).collect(),
            unit: self.unit,
            labels: self
                .labels
                .as_ref()
                .map(|_| kept.iter().map(|&i| self.label(i).to_string()).collect()),
        }
    }
}

// ---------------------------------------------------------------------------
// Spectrum – sampled continuous output
// ---------------------------------------------------------------------------

/// A sampled spectrum. `x` and `y` always have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Sample points (x).
    pub x: Vec<f64>,
    /// Intensity at each sample point (y).
    pub y: Vec<f64>,
}

impl Spectrum {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the spectrum has no samples.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Largest absolute intensity.
    pub fn max_abs(&self) -> f64 {
        self.y.iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()))
    }

    /// Copy scaled so that the largest |y| is 1. An all-zero spectrum is
    /// returned unchanged.
    pub fn normalised(&self) -> Spectrum {
        let max = self.max_abs();
        if max < f64::EPSILON {
            return self.clone();
        }
        Spectrum {
            x: self.x.clone(),
            y: self.y.iter().map(|&v| v / max).collect(),
        }
    }

    /// Trapezoidal integral of y over x.
    pub fn integrate(&self) -> f64 {
        self.x
            .windows(2)
            .zip(self.y.windows(2))
            .map(|(x, y)| 0.5 * (x[1] - x[0]) * (y[0] + y[1]))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_validation() {
        assert!(Mode::new(100.0, 1.0, None).is_ok());
        assert!(Mode::new(-35.0, 0.0, Some(2.0)).is_ok());
        assert!(matches!(
            Mode::new(f64::NAN, 1.0, None),
            Err(SpectrumError::InvalidMode(_))
        ));
        assert!(matches!(
            Mode::new(100.0, f64::INFINITY, None),
            Err(SpectrumError::InvalidMode(_))
        ));
        assert!(matches!(
            Mode::new(100.0, 1.0, Some(0.0)),
            Err(SpectrumError::InvalidKernel(_))
        ));
        assert!(matches!(
            Mode::new(100.0, 1.0, Some(-1.0)),
            Err(SpectrumError::InvalidKernel(_))
        ));
    }

    #[test]
    fn mode_deserialize_validates() {
        let ok: Mode = serde_json::from_str(r#"{"frequency": 1.0, "intensity": 2.0}"#).unwrap();
        assert_eq!(ok.linewidth(), None);
        let bad = serde_json::from_str::<Mode>(
            r#"{"frequency": 1.0, "intensity": 2.0, "linewidth": -3.0}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn select_keeps_labels_aligned() {
        let modes = vec![
            Mode::new(10.0, 1.0, None).unwrap(),
            Mode::new(20.0, 2.0, None).unwrap(),
            Mode::new(30.0, 3.0, None).unwrap(),
        ];
        let set = ModeSet::new(modes, FrequencyUnit::InvCm)
            .with_labels(vec!["A".into(), "B".into(), "E".into()])
            .unwrap();
        let sub = set.select(&[0, 2]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.modes[1].frequency(), 30.0);
        assert_eq!(sub.labels.unwrap(), vec!["A".to_string(), "E".to_string()]);
        assert_eq!(set.frequency_range(), Some((10.0, 30.0)));
    }

    #[test]
    fn label_count_mismatch() {
        let set = ModeSet::new(vec![Mode::new(1.0, 1.0, None).unwrap()], FrequencyUnit::Thz);
        assert!(set.with_labels(vec![]).is_err());
    }

    #[test]
    fn mode_set_deserialize_checks_labels() {
        let ok: ModeSet = serde_json::from_str(
            r#"{"modes": [{"frequency": 1.0, "intensity": 1.0}], "unit": "thz", "labels": ["A1"]}"#,
        )
        .unwrap();
        assert_eq!(ok.label(0), "A1");

        let unlabelled: ModeSet =
            serde_json::from_str(r#"{"modes": [], "unit": "inv_cm"}"#).unwrap();
        assert!(unlabelled.labels.is_none());

        let short = serde_json::from_str::<ModeSet>(
            r#"{"modes": [{"frequency": 1.0, "intensity": 1.0},
                          {"frequency": 2.0, "intensity": 1.0}],
                "unit": "thz", "labels": ["A1"]}"#,
        );
        let err = short.unwrap_err().to_string();
        assert!(err.contains("1 labels for 2 modes"), "{err}");
    }

    #[test]
    fn select_tolerates_short_labels() {
        let mut set = ModeSet::new(
            vec![
                Mode::new(10.0, 1.0, None).unwrap(),
                Mode::new(20.0, 2.0, None).unwrap(),
            ],
            FrequencyUnit::InvCm,
        );
        set.labels = Some(vec!["A".into()]);
        let sub = set.select(&[1, 0, 7]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.labels.unwrap(), vec!["?".to_string(), "A".to_string()]);
    }

    #[test]
    fn normalise_and_integrate() {
        let sp = Spectrum {
            x: vec![0.0, 1.0, 2.0],
            y: vec![0.0, -4.0, 2.0],
        };
        assert_eq!(sp.normalised().y, vec![0.0, -1.0, 0.5]);
        assert_eq!(sp.integrate(), -2.0 + -1.0);

        let zero = Spectrum {
            x: vec![0.0, 1.0],
            y: vec![0.0, 0.0],
        };
        assert_eq!(zero.normalised(), zero);
    }
}

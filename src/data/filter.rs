use serde::{Deserialize, Serialize};

use super::model::ModeSet;

// ---------------------------------------------------------------------------
// Mode filter: which modes reach the synthesizer
// ---------------------------------------------------------------------------

/// Caller-side selection of modes. The synthesizer itself never filters, so
/// policies such as dropping imaginary modes live here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeFilter {
    /// Drop modes with negative (imaginary) frequencies.
    pub exclude_imaginary: bool,
    /// Drop modes whose intensity is below this value.
    pub min_intensity: Option<f64>,
    /// Keep only modes with `lo <= frequency <= hi`.
    pub frequency_range: Option<(f64, f64)>,
}

impl ModeFilter {
    /// Whether no criterion is active.
    pub fn is_noop(&self) -> bool {
        !self.exclude_imaginary && self.min_intensity.is_none() && self.frequency_range.is_none()
    }

    /// Filtered copy of `modes`, labels kept aligned.
    pub fn apply(&self, modes: &ModeSet) -> ModeSet {
        modes.select(&filtered_indices(modes, self))
    }
}

/// Return indices of modes that pass every active criterion.
pub fn filtered_indices(modes: &ModeSet, filter: &ModeFilter) -> Vec<usize> {
    modes
        .modes
        .iter()
        .enumerate()
        .filter(|(_, m)| {
            if filter.exclude_imaginary && m.frequency() < 0.0 {
                return false;
            }
            if let Some(min) = filter.min_intensity {
                if m.intensity() < min {
                    return false;
                }
            }
            if let Some((lo, hi)) = filter.frequency_range {
                if m.frequency() < lo || m.frequency() > hi {
                    return false;
                }
            }
            true
        })
        .map(|(i, _)| i)
        .collect()
}

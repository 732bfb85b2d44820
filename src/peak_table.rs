//! Peak tables: modes collapsed into degenerate groups.
//!
//! Groups are supplied by the caller as `(symbol, band indices)` pairs with
//! 1-based band indices, the way symmetry tools report ir. rep. assignments.
//! Working out the assignment itself is not done here.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::data::model::ModeSet;
use crate::error::{Result, SpectrumError};
use crate::units::FrequencyUnit;

/// One caller-supplied group of band indices sharing a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeGroup {
    pub symbol: String,
    /// 1-based indices into the mode set.
    pub band_indices: Vec<usize>,
}

/// A row of the peak table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub symbol: String,
    pub frequency: f64,
    pub intensity: f64,
    pub linewidth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakTable {
    pub unit: FrequencyUnit,
    pub peaks: Vec<Peak>,
}

/// Collapse `modes` into one peak per group.
///
/// Every band index must appear in exactly one group. Single-member groups
/// are copied through; larger groups get the mean frequency, the summed
/// intensity and the mean linewidth.
pub fn group_modes(modes: &ModeSet, groups: &[ModeGroup]) -> Result<PeakTable> {
    let num_modes = modes.len();
    let mut seen = BTreeSet::new();

    for group in groups {
        for &index in &group.band_indices {
            if !seen.insert(index) {
                return Err(SpectrumError::DuplicateBandIndex(index));
            }
            if index < 1 || index > num_modes {
                return Err(SpectrumError::BandIndexOutOfRange { index, num_modes });
            }
        }
    }
    if seen.len() != num_modes {
        return Err(SpectrumError::IncompleteGrouping {
            referenced: seen.len(),
            num_modes,
        });
    }

    let with_linewidths = modes.has_linewidths();
    let peaks = groups
        .iter()
        .filter(|g| !g.band_indices.is_empty())
        .map(|group| {
            let members: Vec<_> = group.band_indices.iter().map(|&i| modes.modes[i - 1]).collect();
            let n = members.len() as f64;
            let frequency = members.iter().map(|m| m.frequency()).sum::<f64>() / n;
            let intensity = members.iter().map(|m| m.intensity()).sum::<f64>();
            let linewidth = if with_linewidths {
                let widths: Option<Vec<f64>> = members.iter().map(|m| m.linewidth()).collect();
                widths.map(|w| w.iter().sum::<f64>() / n)
            } else {
                None
            };
            Peak {
                symbol: group.symbol.clone(),
                frequency,
                intensity,
                linewidth,
            }
        })
        .collect();

    Ok(PeakTable {
        unit: modes.unit,
        peaks,
    })
}

impl PeakTable {
    /// Fixed-width text table, one row per peak.
    pub fn render(&self) -> String {
        let with_linewidths = self.peaks.iter().any(|p| p.linewidth.is_some());
        let freq_header = format!("v [{}]", self.unit.label());

        let mut out = format!("{:<8}  {:>14}  {:>14}", "Ir. Rep.", freq_header, "I [AU]");
        if with_linewidths {
            out.push_str(&format!("  {:>14}", format!("G [{}]", self.unit.label())));
        }
        out.push('\n');

        for p in &self.peaks {
            let mut row = format!("{:<8}  {:>14.2}  {:>14.4}", p.symbol, p.frequency, p.intensity);
            if with_linewidths {
                let cell = match p.linewidth {
                    Some(w) => format!("{w:>14.3}"),
                    None => format!("{:>14}", "-"),
                };
                row.push_str("  ");
                row.push_str(&cell);
            }
            out.push_str(&row);
            out.push('\n');
        }
        out
    }
}

use std::path::Path;

use rusty_spectra::data::filter::ModeFilter;
use rusty_spectra::data::loader::load_file;
use rusty_spectra::{FrequencyUnit, ModeSet, Spectrum, SpectrumConfig};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Loaded datasets
// ---------------------------------------------------------------------------

/// One mode table opened by the user, with its current synthesised spectrum.
pub struct LoadedModes {
    /// Display name (file stem).
    pub name: String,
    pub modes: ModeSet,
    /// Modes after the current filter.
    pub visible: ModeSet,
    /// Result of the last synthesis; `None` if it failed.
    pub spectrum: Option<Spectrum>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Mode tables opened so far.
    pub datasets: Vec<LoadedModes>,

    /// Unit new files are read in.
    pub input_unit: FrequencyUnit,

    /// Synthesis settings shared by every dataset.
    pub config: SpectrumConfig,

    /// Which modes reach the synthesizer.
    pub filter: ModeFilter,

    /// Dataset name → colour.
    pub color_map: ColorMap,

    /// Draw the unbroadened stick spectrum as well.
    pub show_sticks: bool,

    /// Scale every spectrum to unit maximum.
    pub normalise: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            datasets: Vec::new(),
            input_unit: FrequencyUnit::InvCm,
            config: SpectrumConfig {
                unit: Some(FrequencyUnit::InvCm),
                ..Default::default()
            },
            filter: ModeFilter::default(),
            color_map: ColorMap::new(&[]),
            show_sticks: true,
            normalise: false,
            status_message: None,
        }
    }
}

impl AppState {
    /// Load a mode table and add it to the plot.
    pub fn open(&mut self, path: &Path) {
        match load_file(path, self.input_unit) {
            Ok(modes) => {
                let name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("modes")
                    .to_string();
                self.add_dataset(name, modes);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded mode set and synthesise its spectrum.
    pub fn add_dataset(&mut self, name: String, modes: ModeSet) {
        self.datasets.push(LoadedModes {
            name,
            visible: modes.clone(),
            modes,
            spectrum: None,
        });
        self.rebuild_color_map();
        self.resynthesize();
    }

    /// Drop the dataset at `index`.
    pub fn remove_dataset(&mut self, index: usize) {
        if index < self.datasets.len() {
            self.datasets.remove(index);
            self.rebuild_color_map();
        }
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.datasets.clear();
        self.rebuild_color_map();
        self.status_message = None;
    }

    fn rebuild_color_map(&mut self) {
        let names: Vec<&str> = self.datasets.iter().map(|d| d.name.as_str()).collect();
        self.color_map = ColorMap::new(&names);
    }

    /// Unit of the plotted x-axis.
    pub fn output_unit(&self) -> FrequencyUnit {
        self.config.output_unit(self.input_unit)
    }

    /// Re-apply the filter and re-run synthesis for every dataset after a
    /// settings change. The first failure is reported in the status line.
    pub fn resynthesize(&mut self) {
        self.status_message = None;
        for ds in &mut self.datasets {
            ds.visible = self.filter.apply(&ds.modes);
            match self.config.synthesize(&ds.visible) {
                Ok(spectrum) => ds.spectrum = Some(spectrum),
                Err(e) => {
                    log::warn!("Synthesis failed for {}: {e}", ds.name);
                    ds.spectrum = None;
                    if self.status_message.is_none() {
                        self.status_message = Some(format!("{}: {e}", ds.name));
                    }
                }
            }
        }
    }

    /// Total number of modes loaded and passing the filter.
    pub fn mode_counts(&self) -> (usize, usize) {
        self.datasets.iter().fold((0, 0), |(all, vis), ds| {
            (all + ds.modes.len(), vis + ds.visible.len())
        })
    }
}

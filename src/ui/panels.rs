use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use rusty_spectra::{FrequencyUnit, Lineshape, SpectrumAxis};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – broadening, axis and filter widgets
// ---------------------------------------------------------------------------

/// Render the left settings panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            changed |= broadening_section(ui, state);
            ui.separator();
            changed |= axis_section(ui, state);
            ui.separator();
            changed |= filter_section(ui, state);
            ui.separator();
            datasets_section(ui, state);
        });

    // Re-run synthesis after any setting changed.
    if changed {
        state.resynthesize();
    }
}

fn broadening_section(ui: &mut Ui, state: &mut AppState) -> bool {
    let mut changed = false;
    ui.heading("Broadening");

    let current = state.config.lineshape;
    egui::ComboBox::from_id_salt("lineshape")
        .selected_text(current.name())
        .show_ui(ui, |ui: &mut Ui| {
            for shape in Lineshape::ALL {
                if ui.selectable_label(current == shape, shape.name()).clicked() {
                    state.config.lineshape = shape;
                    changed = true;
                }
            }
        });

    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Width [{}]", state.input_unit.label()));
        changed |= ui
            .add(
                egui::DragValue::new(&mut state.config.width)
                    .speed(0.1)
                    .range(1e-3..=f64::MAX),
            )
            .changed();
    });
    changed |= ui
        .checkbox(&mut state.config.width_is_fwhm, "Widths are FWHM")
        .changed();
    changed |= ui
        .checkbox(&mut state.config.use_linewidths, "Use per-mode linewidths")
        .changed();

    changed
}

fn axis_section(ui: &mut Ui, state: &mut AppState) -> bool {
    let mut changed = false;
    ui.heading("Axis");

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Read files in");
        unit_combo(ui, "input_unit", &mut state.input_unit, true);
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Plot in");
        let mut unit = state.output_unit();
        if unit_combo(ui, "output_unit", &mut unit, false) {
            state.config.unit = Some(unit);
            changed = true;
        }
    });

    let mut manual = state.config.axis.is_some();
    if ui.checkbox(&mut manual, "Manual range").changed() {
        state.config.axis = if manual {
            let first = state.datasets.first().map(|d| &d.visible);
            first
                .and_then(|m| state.config.resolve_axis(m).ok())
                .or_else(|| SpectrumAxis::new(0.0, 1000.0, 1.0).ok())
        } else {
            None
        };
        changed = true;
    }

    if let Some(axis) = &mut state.config.axis {
        for (label, value) in [
            ("Start", &mut axis.start),
            ("End", &mut axis.end),
            ("Step", &mut axis.resolution),
        ] {
            ui.horizontal(|ui: &mut Ui| {
                ui.label(label);
                changed |= ui.add(egui::DragValue::new(value).speed(1.0)).changed();
            });
        }
    }

    changed
}

/// Unit selector; returns whether the selection changed.
fn unit_combo(ui: &mut Ui, id: &str, unit: &mut FrequencyUnit, allow_wavelength: bool) -> bool {
    let mut changed = false;
    egui::ComboBox::from_id_salt(id)
        .selected_text(unit.label())
        .show_ui(ui, |ui: &mut Ui| {
            for candidate in FrequencyUnit::ALL {
                if !allow_wavelength && !candidate.is_linear() {
                    continue;
                }
                if ui
                    .selectable_label(*unit == candidate, candidate.label())
                    .clicked()
                {
                    *unit = candidate;
                    changed = true;
                }
            }
        });
    changed
}

fn filter_section(ui: &mut Ui, state: &mut AppState) -> bool {
    let mut changed = false;
    ui.heading("Modes");

    changed |= ui
        .checkbox(&mut state.filter.exclude_imaginary, "Exclude imaginary modes")
        .changed();

    let mut thresholded = state.filter.min_intensity.is_some();
    if ui.checkbox(&mut thresholded, "Minimum intensity").changed() {
        state.filter.min_intensity = thresholded.then_some(0.0);
        changed = true;
    }
    if let Some(min) = &mut state.filter.min_intensity {
        changed |= ui.add(egui::DragValue::new(min).speed(0.01)).changed();
    }

    changed
}

fn datasets_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Datasets");

    if state.datasets.is_empty() {
        ui.label("No mode table loaded.");
        return;
    }

    let mut remove = None;
    for (i, ds) in state.datasets.iter().enumerate() {
        let color = state.color_map.color_for(&ds.name);
        let header = format!("{}  ({}/{})", ds.name, ds.visible.len(), ds.modes.len());

        egui::CollapsingHeader::new(RichText::new(header).strong().color(color))
            .id_salt(i)
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                if ui.small_button("Remove").clicked() {
                    remove = Some(i);
                }
                let labelled = ds.visible.labels.is_some();
                for (j, m) in ds.visible.modes.iter().enumerate() {
                    let label = if labelled { ds.visible.label(j) } else { "" };
                    let text = format!(
                        "{:>10.2}  {:>10.4}  {label}",
                        m.frequency(),
                        m.intensity()
                    );
                    let mut rich = RichText::new(text).monospace();
                    if m.frequency() < 0.0 {
                        rich = rich.color(Color32::RED);
                    }
                    ui.label(rich);
                }
            });
    }

    if let Some(i) = remove {
        state.remove_dataset(i);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export spectra…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
            if ui.button("Clear").clicked() {
                state.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        if !state.datasets.is_empty() {
            let (all, visible) = state.mode_counts();
            ui.label(format!(
                "{} tables loaded, {visible}/{all} modes used",
                state.datasets.len()
            ));
        }

        ui.separator();

        if ui.selectable_label(state.normalise, "Normalise").clicked() {
            state.normalise = !state.normalise;
        }
        if ui.selectable_label(state.show_sticks, "Sticks").clicked() {
            state.show_sticks = !state.show_sticks;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open mode table")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv", "dat", "txt"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Text", &["dat", "txt"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

/// Write every synthesised spectrum into a chosen folder, one file each.
pub fn export_dialog(state: &mut AppState) {
    let Some(dir) = rfd::FileDialog::new()
        .set_title("Export spectra to folder")
        .pick_folder()
    else {
        return;
    };

    let unit = state.output_unit();
    for ds in &state.datasets {
        let Some(spectrum) = &ds.spectrum else {
            continue;
        };
        let spectrum = if state.normalise {
            spectrum.normalised()
        } else {
            spectrum.clone()
        };
        let path = dir.join(format!("{}_spectrum.csv", ds.name));
        if let Err(e) = rusty_spectra::export::save(&path, &spectrum, unit) {
            log::error!("Failed to export {}: {e}", path.display());
            state.status_message = Some(format!("Error: {e}"));
            return;
        }
    }
}

use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints};

use rusty_spectra::units::linear_factor;

use crate::state::AppState;

/// Stick width as a fraction of the plotted x-range.
const STICK_WIDTH_FRACTION: f64 = 0.002;

// ---------------------------------------------------------------------------
// Spectrum plot (central panel)
// ---------------------------------------------------------------------------

/// Render the simulated spectra in the central panel.
pub fn spectrum_plot(ui: &mut Ui, state: &AppState) {
    if state.datasets.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a mode table to simulate a spectrum  (File → Open…)");
        });
        return;
    }

    let unit = state.output_unit();

    Plot::new("spectrum_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label(format!("v [{}]", unit.label()))
        .y_axis_label("Intensity [AU]")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for ds in &state.datasets {
                let color = state.color_map.color_for(&ds.name);

                let Some(spectrum) = &ds.spectrum else {
                    continue;
                };
                let spectrum = if state.normalise {
                    spectrum.normalised()
                } else {
                    spectrum.clone()
                };

                let points: PlotPoints = spectrum
                    .x
                    .iter()
                    .zip(spectrum.y.iter())
                    .map(|(&xi, &yi)| [xi, yi])
                    .collect();

                plot_ui.line(Line::new(points).name(&ds.name).color(color).width(1.5));

                if !state.show_sticks || ds.visible.is_empty() {
                    continue;
                }

                // Sticks share the spectrum's x scaling; heights are the raw
                // intensities, or scaled to unit maximum alongside the curve.
                let Ok(x_scale) = linear_factor(ds.visible.unit, unit) else {
                    continue;
                };
                let stick_max = ds
                    .visible
                    .modes
                    .iter()
                    .fold(0.0_f64, |acc, m| acc.max(m.intensity().abs()));
                let height_scale = if state.normalise && stick_max > f64::EPSILON {
                    1.0 / stick_max
                } else {
                    1.0
                };
                let x_range = match (spectrum.x.first(), spectrum.x.last()) {
                    (Some(a), Some(b)) => (b - a).abs(),
                    _ => 1.0,
                };

                let bars: Vec<Bar> = ds
                    .visible
                    .modes
                    .iter()
                    .map(|m| {
                        Bar::new(m.frequency() * x_scale, m.intensity() * height_scale)
                            .width(x_range * STICK_WIDTH_FRACTION)
                    })
                    .collect();

                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name(format!("{} (modes)", ds.name))
                        .color(color),
                );
            }
        });
}

use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::state::{AppState, RemoteAssets};

/// Fill of the continent outlines.
const BASEMAP_COLOR: Color32 = Color32::LIGHT_GRAY;
/// Landing markers.
const POINT_COLOR: Color32 = Color32::from_rgb(106, 90, 205);

fn no_dataset(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Open a landings file to begin  (File → Open…)");
    });
}

// ---------------------------------------------------------------------------
// Mass vs Year
// ---------------------------------------------------------------------------

/// One line per selected recclass, mass over year.
pub fn mass_vs_year(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        return no_dataset(ui);
    }

    ui.heading(&state.charts.title);
    if state.selection.is_empty() {
        ui.weak("No recclass selected.");
    } else if state.charts.line_series.is_empty() {
        ui.weak("No meteorites match the current filters.");
    }

    Plot::new("mass_vs_year")
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Mass (g)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(|name, value| {
            state
                .charts
                .line_series
                .iter()
                .find(|series| series.recclass == name)
                .and_then(|series| series.tooltip(series.nearest(value.x, value.y)?))
                .unwrap_or_else(|| format!("Year {:.0}\nMass {:.1} g", value.x, value.y))
        })
        .show(ui, |plot_ui| {
            for series in &state.charts.line_series {
                let points: PlotPoints = series.points.clone().into();
                let line = Line::new(points)
                    .name(&series.recclass)
                    .color(state.color_map.color_for(&series.recclass))
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Mass vs Count
// ---------------------------------------------------------------------------

/// Horizontal bar per mass bin, with the counts repeated as a table.
pub fn mass_vs_count(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        return no_dataset(ui);
    }

    ui.weak(format!(
        "Landings grouped by mass range ({}).",
        state.bin_preset.label()
    ));

    let labels: Vec<String> = state.charts.bins.iter().map(|b| b.bin.to_string()).collect();
    let bars: Vec<Bar> = state
        .charts
        .bins
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Bar::new(i as f64, row.count as f64)
                .name(&labels[i])
                .fill(state.gradient.color_for(row.count))
                .width(0.8)
        })
        .collect();

    let axis_labels = labels.clone();
    Plot::new("mass_vs_count")
        .height(ui.available_height() * 0.6)
        .x_axis_label("Count")
        .y_axis_label("Mass range (g)")
        .y_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() < 1e-6 && i >= 0.0 {
                axis_labels.get(i as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name("Count"));
        });

    ui.separator();
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(140.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Mass range (g)");
            });
            header.col(|ui| {
                ui.strong("Count");
            });
        })
        .body(|mut body| {
            for (label, row) in labels.iter().zip(&state.charts.bins) {
                body.row(18.0, |mut table_row| {
                    table_row.col(|ui| {
                        ui.label(label);
                    });
                    table_row.col(|ui| {
                        ui.label(row.count.to_string());
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Landings on an equirectangular world map.
pub fn location(ui: &mut Ui, state: &AppState, assets: &RemoteAssets) {
    if state.dataset.is_none() {
        return no_dataset(ui);
    }

    if assets.basemap.is_pending() {
        ui.horizontal(|ui: &mut Ui| {
            ui.spinner();
            ui.weak("Loading basemap…");
        });
    } else if let Some(reason) = assets.basemap.unavailable_reason() {
        ui.label(RichText::new(format!("Basemap unavailable: {reason}")).weak());
    }

    let landed: Vec<(&str, [f64; 2])> = state
        .charts
        .map_points
        .iter()
        .filter_map(|p| Some((p.name.as_str(), p.plottable()?)))
        .collect();
    let positions: PlotPoints = landed.iter().map(|(_, xy)| *xy).collect();

    Plot::new("location_map")
        .data_aspect(1.0)
        .include_x(-180.0)
        .include_x(180.0)
        .include_y(-90.0)
        .include_y(90.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .label_formatter(|_series, value| {
            let nearest = landed.iter().min_by(|a, b| {
                let da = (a.1[0] - value.x).powi(2) + (a.1[1] - value.y).powi(2);
                let db = (b.1[0] - value.x).powi(2) + (b.1[1] - value.y).powi(2);
                da.total_cmp(&db)
            });
            match nearest {
                Some((name, [lon, lat])) => format!("{name}\nlon {lon:.3}\nlat {lat:.3}"),
                None => format!("lon {:.3}\nlat {:.3}", value.x, value.y),
            }
        })
        .show(ui, |plot_ui| {
            if let Some(basemap) = assets.basemap.ready() {
                for ring in basemap.features.iter().flat_map(|f| &f.rings) {
                    let outline: PlotPoints = ring.clone().into();
                    plot_ui.line(Line::new(outline).color(BASEMAP_COLOR).width(1.0));
                }
            }
            plot_ui.points(
                Points::new(positions)
                    .radius(1.5)
                    .color(POINT_COLOR)
                    .name("Landings"),
            );
        });
}

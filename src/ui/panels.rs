use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::binning::BinPreset;
use crate::data::model::Fall;
use crate::data::pipeline::FilterScope;
use crate::remote::{AnimationSummary, AssetSlot};
use crate::state::{AppState, RemoteAssets, Tab};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, assets: &RemoteAssets) {
    animation_banner(ui, &assets.animation);
    ui.add_space(4.0);

    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Widgets record what was clicked; the state is updated afterwards so
    // the dataset borrow can stay shared.
    let mut toggled_class: Option<String> = None;
    let mut select_all = false;
    let mut select_none = false;

    // ---- Recclass multi-select ----
    let header_text = format!(
        "Recclass  ({}/{})",
        state.selection.recclasses().len(),
        dataset.recclasses.len()
    );
    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt("recclass_filter")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                select_all = ui.small_button("All").clicked();
                select_none = ui.small_button("None").clicked();
            });

            ScrollArea::vertical()
                .id_salt("recclass_scroll")
                .max_height(260.0)
                .auto_shrink([false, true])
                .show(ui, |ui: &mut Ui| {
                    for class in &dataset.recclasses {
                        let mut checked = state.selection.recclasses().contains(class);
                        let text = RichText::new(class).color(state.color_map.color_for(class));
                        if ui.checkbox(&mut checked, text).changed() {
                            toggled_class = Some(class.clone());
                        }
                    }
                });
        });

    if select_all {
        state.select_all_recclasses();
    } else if select_none {
        state.select_no_recclasses();
    } else if let Some(class) = toggled_class {
        state.toggle_recclass(&class);
    }

    // ---- Fall multi-select ----
    ui.separator();
    ui.strong("Fall");
    ui.horizontal(|ui: &mut Ui| {
        for fall in Fall::ALL {
            let mut checked = state.selection.falls.contains(&fall);
            if ui.checkbox(&mut checked, fall.as_str()).changed() {
                state.toggle_fall(fall);
            }
        }
    });

    // ---- Year range ----
    ui.separator();
    ui.strong("Years");
    let (min, max) = state.config.year_bounds;
    let (mut lo, mut hi) = state.selection.year_range;
    if ui
        .add(Slider::new(&mut lo, min..=max).step_by(1.0).text("from"))
        .changed()
    {
        state.set_year_lo(lo);
    }
    if ui
        .add(Slider::new(&mut hi, min..=max).step_by(1.0).text("to"))
        .changed()
    {
        state.set_year_hi(hi);
    }

    // ---- Histogram bins and scope ----
    ui.separator();
    ui.strong("Mass bins");
    let mut chosen: Option<BinPreset> = None;
    egui::ComboBox::from_id_salt("bin_preset")
        .selected_text(state.bin_preset.label())
        .show_ui(ui, |ui: &mut Ui| {
            for preset in state.config.available_presets() {
                if ui
                    .selectable_label(state.bin_preset == preset, preset.label())
                    .clicked()
                {
                    chosen = Some(preset);
                }
            }
        });
    if let Some(preset) = chosen {
        state.set_bin_preset(preset);
    }

    let mut all_charts = state.filter_scope == FilterScope::AllCharts;
    if ui
        .checkbox(&mut all_charts, "Apply filters to all tabs")
        .changed()
    {
        state.set_filter_scope(if all_charts {
            FilterScope::AllCharts
        } else {
            FilterScope::LineChartOnly
        });
    }
}

fn animation_banner(ui: &mut Ui, slot: &AssetSlot<AnimationSummary>) {
    match slot {
        AssetSlot::Idle => {}
        AssetSlot::Pending { .. } => {
            ui.horizontal(|ui: &mut Ui| {
                ui.spinner();
                ui.weak("Loading animation…");
            });
        }
        AssetSlot::Ready(summary) => {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new("☄").size(32.0));
                ui.weak(summary.banner_text());
            });
        }
        AssetSlot::Unavailable(reason) => {
            ui.weak(format!("Animation unavailable: {reason}"));
        }
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
            if let Some(path) = state.source_path.clone() {
                if ui.button("Reload").clicked() {
                    state.load(&path);
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} meteorites loaded, {} selected",
                ds.len(),
                state.charts.filtered_count
            ));
            if let Some((first, last)) = ds.year_extent {
                ui.weak(format!("years {first}–{last}"));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Page header
// ---------------------------------------------------------------------------

pub const PAGE_TITLE: &str = "Exploring Meteorite Mass and Year by Recclass and Fall Type";

const INTRO: &str = "Explore how meteorite mass, year of landing, recclass and fall type \
relate to each other. Narrow the data with the recclass and fall type selectors and the year \
range slider on the left. The first tab follows mass over the years as a line chart. The second \
groups landings into mass ranges. The third places every landing on a world map.";

/// Dashboard title and introduction above the tab strip.
pub fn page_header(ui: &mut Ui) {
    ui.heading(RichText::new(PAGE_TITLE).strong());
    ui.label(INTRO);
}

/// Fixed heading and explanatory text of the active tab, if it has any.
pub fn tab_intro(ui: &mut Ui, tab: Tab) {
    if let Some(heading) = tab.heading() {
        ui.heading(heading);
    }
    for paragraph in tab.about() {
        ui.label(*paragraph);
    }
}

/// Tab strip above the central panel.
pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, tab.label());
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open meteorite landings")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}

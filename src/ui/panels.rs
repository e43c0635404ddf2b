use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::decile::Deciles;
use crate::data::export::EXPORT_FILE_NAME;
use crate::data::model::Attribute;
use crate::state::AppState;
use crate::ui::{plot, tables};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔎 Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for attribute in Attribute::ALL {
                let all_values = dataset.values(attribute);
                let n_selected = state.criteria.selected(attribute).len();
                let header_text =
                    format!("Select {attribute}  ({n_selected}/{})", all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(attribute.column_name())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(attribute);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(attribute);
                            }
                        });

                        for value in all_values {
                            let mut checked = state.criteria.selected(attribute).contains(value);
                            if ui.checkbox(&mut checked, value.as_str()).changed() {
                                state.toggle_filter_value(attribute, value);
                            }
                        }
                    });
            }
        });
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
            if ui
                .add_enabled(state.source.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                if let Err(e) = state.reload() {
                    log::error!("Failed to reload file: {e:#}");
                    state.status_message = Some(format!("Error: {e:#}"));
                }
                ui.close_menu();
            }
            let can_export = state
                .report
                .as_ref()
                .is_some_and(|r| r.deciles.breakdown().is_some());
            if ui
                .add_enabled(can_export, egui::Button::new("Export CSV…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(report)) = (&state.dataset, &state.report) {
            ui.label(format!(
                "{} customers loaded, {} matching",
                ds.len(),
                report.kpis.count
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – KPIs, deciles, detail, download
// ---------------------------------------------------------------------------

/// Render the dashboard body for the current report.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    let mut download = false;
    let view: &AppState = state;
    let Some(report) = &view.report else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a customer file to begin  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("📊 Customer Decile Analysis Dashboard");
            ui.add_space(8.0);

            ui.columns(3, |cols| {
                kpi(&mut cols[0], "Total Customers", report.kpis.count_label());
                kpi(&mut cols[1], "Total Sales", report.kpis.total_label());
                kpi(&mut cols[2], "Average Sales", report.kpis.avg_label());
            });

            ui.separator();

            match &report.deciles {
                Deciles::InsufficientData { .. } => {
                    ui.label(
                        RichText::new("⚠ Not enough customers to create 10 equal deciles.")
                            .color(Color32::from_rgb(230, 160, 30)),
                    );
                }
                Deciles::Assigned(breakdown) => {
                    ui.strong("📋 Decile Summary");
                    tables::summary_table(ui, &breakdown.summary, &view.palette);
                    ui.add_space(12.0);

                    ui.strong("📊 Total Sales by Decile");
                    plot::decile_chart(ui, &breakdown.summary, &view.palette);
                    ui.add_space(12.0);

                    ui.strong("📑 Detailed Data with Deciles");
                    if let Some(ds) = &view.dataset {
                        tables::detail_table(ui, &ds.columns, &breakdown.ranked, &view.palette);
                    }
                    ui.add_space(8.0);

                    download = ui.button("⬇ Download Filtered Data").clicked();
                }
            }
        });

    if download {
        save_file_dialog(state);
    }
}

fn kpi(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(26.0).strong());
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open customer data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.open(&path) {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save decile report")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_to(&path) {
            Ok(rows) => {
                log::info!("Exported {rows} rows to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export report: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

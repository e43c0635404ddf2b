use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::DecilePalette;
use crate::data::decile::{DecileSummaryRow, RankedRecord};
use crate::data::export::DECILE_COLUMN;
use crate::data::report::format_thousands;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Decile summary
// ---------------------------------------------------------------------------

/// One row per populated decile: totals, counts, averages.
pub fn summary_table(ui: &mut Ui, summary: &[DecileSummaryRow], palette: &DecilePalette) {
    ui.push_id("decile_summary", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(60.0))
            .columns(Column::remainder().at_least(100.0), 3)
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for title in ["Decile", "Total_Sales", "Customer_Count", "Avg_Sales"] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, summary.len(), |mut row| {
                    let s = &summary[row.index()];
                    row.col(|ui: &mut Ui| {
                        let text = RichText::new(s.decile.to_string())
                            .color(palette.color_for(s.decile))
                            .strong();
                        ui.label(text);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format_thousands(s.total_sales, 2));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(s.customer_count.to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format_thousands(s.avg_sales, 2));
                    });
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Ranked detail
// ---------------------------------------------------------------------------

/// Every matched record in ranked order, source columns plus `Decile`.
pub fn detail_table(
    ui: &mut Ui,
    columns: &[String],
    ranked: &[RankedRecord],
    palette: &DecilePalette,
) {
    ui.push_id("decile_detail", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(360.0)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(80.0).clip(true), columns.len())
            .column(Column::remainder().at_least(50.0))
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for title in columns.iter().map(String::as_str).chain([DECILE_COLUMN]) {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, ranked.len(), |mut row| {
                    let r = &ranked[row.index()];
                    for text in r.record.cells(columns) {
                        row.col(|ui: &mut Ui| {
                            ui.label(text);
                        });
                    }
                    row.col(|ui: &mut Ui| {
                        let text = RichText::new(r.decile.to_string())
                            .color(palette.color_for(r.decile));
                        ui.label(text);
                    });
                });
            });
    });
}

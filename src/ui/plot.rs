use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Plot};

use crate::color::DecilePalette;
use crate::data::decile::DecileSummaryRow;

// ---------------------------------------------------------------------------
// Decile bar chart
// ---------------------------------------------------------------------------

/// Total sales per decile, one coloured bar each.
pub fn decile_chart(ui: &mut Ui, summary: &[DecileSummaryRow], palette: &DecilePalette) {
    ui.label("Decile-wise Sales Distribution");

    let bars: Vec<Bar> = summary
        .iter()
        .map(|row| {
            Bar::new(f64::from(row.decile), row.total_sales)
                .name(format!("Decile {}", row.decile))
                .fill(palette.color_for(row.decile))
                .width(0.7)
        })
        .collect();

    Plot::new("decile_chart")
        .height(280.0)
        .x_axis_label("Decile (1 = Highest Sales)")
        .y_axis_label("Total Sales")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Total Sales"));
        });
}

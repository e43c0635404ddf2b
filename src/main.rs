use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use decile_dashboard::app::DecileDashboardApp;
use decile_dashboard::cli::{report_json, report_text};
use decile_dashboard::data::{build_report, export_csv};
use decile_dashboard::state::AppState;
use decile_dashboard::Args;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.is_headless() {
        run_headless(&args)
    } else {
        run_gui(&args)
    }
}

/// Print (and optionally export) one report without opening a window.
fn run_headless(args: &Args) -> Result<()> {
    let path = args
        .data
        .as_deref()
        .context("a data file is required in headless mode")?;

    let mut state = AppState::default();
    state.open(path)?;
    let dataset = state
        .dataset
        .clone()
        .context("dataset missing after load")?;

    let report = build_report(&dataset, &args.criteria(&dataset));

    if args.json {
        println!("{}", report_json(&report)?);
    } else {
        print!("{}", report_text(&report));
    }

    if let Some(out) = &args.export {
        let Some(breakdown) = report.deciles.breakdown() else {
            anyhow::bail!(
                "not enough customers to create 10 equal deciles; nothing written to {}",
                out.display()
            );
        };
        let bytes = export_csv(&dataset.columns, &breakdown.ranked).context("writing CSV")?;
        std::fs::write(out, bytes).with_context(|| format!("writing {}", out.display()))?;
        log::info!("Exported {} rows to {}", breakdown.ranked.len(), out.display());
    }

    Ok(())
}

fn run_gui(args: &Args) -> Result<()> {
    let mut state = AppState::default();
    if let Some(path) = &args.data {
        match state.open(path) {
            Ok(()) => {
                if !args.brands.is_empty() || !args.regions.is_empty() {
                    if let Some(ds) = state.dataset.clone() {
                        state.criteria = args.criteria(&ds);
                        state.refilter();
                    }
                }
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Customer Decile Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(DecileDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

//! CLI logic for the AHU family builder.
//!
//! This module loads a catalogue, builds the family and exports its views to
//! SVG.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, path::Path};

use log::{info, warn};

use ahu::{AhuError, FamilyBuilder};

use error_adapter::{Reportable, warning_reportables};

/// Run the AHU CLI application
///
/// This function processes the input catalogue through the build pipeline
/// and writes one SVG per exported view.
///
/// With `--view`, only that view is written, to the output path. Otherwise
/// every view of the document is written next to the output path as
/// `<stem>-<view>.svg`.
///
/// # Errors
///
/// Returns `AhuError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Catalogue errors
/// - Layout and annotation errors
/// - Export errors
pub fn run(args: &Args) -> Result<(), AhuError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing catalogue"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let builder = FamilyBuilder::new(app_config);
    let catalogue = builder.parse(&source)?;
    for reportable in warning_reportables(catalogue.warnings(), &source) {
        warn!("{}", render_report(&reportable));
    }

    let family = builder.build(&catalogue)?;

    match &args.view {
        Some(view) => builder.export_svg(&family, view, &args.output)?,
        None => {
            for view in family.document().views() {
                let output = output_for_view(&args.output, view.name());
                builder.export_svg(&family, view.name(), &output)?;
            }
        }
    }

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}

/// Render a reportable with miette's graphical handler.
pub fn render_report(reportable: &Reportable<'_>) -> String {
    let reporter = miette::GraphicalReportHandler::new();
    let mut writer = String::new();
    if reporter.render_report(&mut writer, reportable).is_err() {
        return reportable.to_string();
    }
    writer
}

/// `out/plant.svg` and `Front` give `out/plant-front.svg`.
fn output_for_view(output: &str, view: &str) -> String {
    let path = Path::new(output);
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_else(|| "svg".to_string());
    let view = view.to_lowercase().replace(' ', "-");
    path.with_file_name(format!("{stem}-{view}.{extension}"))
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_for_view() {
        assert_eq!(output_for_view("out.svg", "Front"), "out-front.svg");
        assert_eq!(
            output_for_view("plots/plant.svg", "Elevation 1"),
            "plots/plant-elevation-1.svg"
        );
        assert_eq!(output_for_view("plant", "Top"), "plant-top.svg");
    }
}

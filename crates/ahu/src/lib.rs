//! AHU - Builds annotated 3-D families of air-handling units.
//!
//! A family is assembled from a segment catalogue in three passes over one
//! host document: the layout engine places every segment of the intake and
//! exhaust chains, duct connectors are stamped onto flexible dampers, and the
//! annotation engine dimensions and labels the result in the front and top
//! views.

pub mod annotate;
pub mod config;
pub mod connector;
pub mod error;
pub mod export;
pub mod layout;

pub use ahu_catalogue::Catalogue;
pub use ahu_core::{document, geometry, host, identifier, segment, sketch};

pub use error::AhuError;

use log::{debug, info, trace};

use ahu_core::{document::Document, host::Host};

use annotate::{AnnotationEngine, AnnotationSummary};
use config::AppConfig;
use export::{
    Exporter,
    svg::{Svg, SvgRenderer},
};
use layout::{LayoutEngine, LayoutOutput};

/// Builder for loading catalogues and assembling families.
///
/// # Examples
///
/// ```rust,no_run
/// use ahu::{FamilyBuilder, config::AppConfig};
///
/// let source = r#"{"intake": [
///     {"id": "a", "category": "block", "lengthTotal": 300, "heightTotal": 100, "widthTotal": 600}
/// ]}"#;
///
/// let builder = FamilyBuilder::new(AppConfig::default());
///
/// // Load and validate the catalogue
/// let catalogue = builder.parse(source)
///     .expect("Failed to parse");
///
/// // Lay out and annotate a fresh document
/// let family = builder.build(&catalogue)
///     .expect("Failed to build");
///
/// // Render the front view
/// let svg = builder.render_svg(&family, "Front")
///     .expect("Failed to render");
/// ```
#[derive(Default)]
pub struct FamilyBuilder {
    config: AppConfig,
}

impl FamilyBuilder {
    /// Create a new family builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a catalogue from its JSON source.
    ///
    /// Warnings (for instance unknown segment categories) are kept on the
    /// returned catalogue for the caller to report.
    ///
    /// # Errors
    ///
    /// Returns [`AhuError::Catalogue`] with every error diagnostic and the
    /// source text they point into.
    pub fn parse(&self, source: &str) -> Result<Catalogue, AhuError> {
        info!("Parsing catalogue");

        let catalogue = ahu_catalogue::parse(source)
            .map_err(|err| AhuError::new_catalogue_error(err, source))?;
        for warning in catalogue.warnings() {
            debug!(warning:%; "Catalogue warning");
        }

        debug!("Catalogue parsed successfully");
        trace!(catalogue:?; "Parsed catalogue");

        Ok(catalogue)
    }

    /// Assemble a family from `catalogue` in a fresh document.
    ///
    /// # Errors
    ///
    /// Returns [`AhuError::Config`] if a configured view is missing, and
    /// [`AhuError::Host`] if the document rejects an operation. Nothing of a
    /// failed build is kept.
    pub fn build(&self, catalogue: &Catalogue) -> Result<Family, AhuError> {
        let mut document = Document::new();
        let (layout, summary) = self.build_into(&mut document, catalogue)?;
        Ok(Family {
            document,
            layout,
            summary,
        })
    }

    /// Assemble a family into an existing host document.
    pub fn build_into<H: Host>(
        &self,
        host: &mut H,
        catalogue: &Catalogue,
    ) -> Result<(LayoutOutput, AnnotationSummary), AhuError> {
        info!(
            intake = catalogue.intake().len(),
            exhaust = catalogue.exhaust().len();
            "Building family"
        );

        let layout = LayoutEngine::new(self.config.layout()).build_geometry(host, catalogue)?;
        let connectors = connector::attach_duct_connectors(host, &layout)?;
        debug!(connectors = connectors.len(); "Connectors attached");

        let summary = AnnotationEngine::new(self.config.annotation()).add_annotations(host, &layout)?;

        info!("Family built successfully");
        Ok((layout, summary))
    }

    /// Render one view of a built family to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns [`AhuError::Config`] if the document has no view named
    /// `view_name`.
    pub fn render_svg(&self, family: &Family, view_name: &str) -> Result<String, AhuError> {
        let view = family
            .document
            .view(view_name)
            .ok_or_else(|| AhuError::Config(format!("view `{view_name}` does not exist in the document")))?;

        let renderer = SvgRenderer::new(self.config.export(), self.config.annotation().text_size());
        let svg = renderer.render(&family.document, &view)?;

        info!(view = view_name; "SVG rendered successfully");
        Ok(svg.to_string())
    }

    /// Render one view of a built family to an SVG file.
    ///
    /// # Errors
    ///
    /// Returns [`AhuError::Config`] for an unknown view and
    /// [`AhuError::Export`] if the file cannot be written.
    pub fn export_svg(
        &self,
        family: &Family,
        view_name: &str,
        file_name: &str,
    ) -> Result<(), AhuError> {
        let view = family
            .document
            .view(view_name)
            .ok_or_else(|| AhuError::Config(format!("view `{view_name}` does not exist in the document")))?;

        let exporter = Svg::new(file_name, self.config.export(), self.config.annotation().text_size());
        exporter.export_view(&family.document, &view)?;

        info!(view = view_name, file_name; "SVG exported successfully");
        Ok(())
    }
}

/// A built family: the document and what the engines reported.
#[derive(Debug, Clone)]
pub struct Family {
    document: Document,
    layout: LayoutOutput,
    summary: AnnotationSummary,
}

impl Family {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn layout(&self) -> &LayoutOutput {
        &self.layout
    }

    pub fn summary(&self) -> AnnotationSummary {
        self.summary
    }
}

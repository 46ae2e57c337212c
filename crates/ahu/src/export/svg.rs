use std::{fs::File, io::Write};

use log::{debug, error, info};
use svg::Document as SvgDocument;

use ahu_core::{document::Document, host::View};

use crate::{config::ExportConfig, export};

mod renderer;

pub use renderer::SvgRenderer;

/// SVG exporter writing one view per file.
pub struct Svg<'a> {
    file_name: String,
    renderer: SvgRenderer<'a>,
}

impl<'a> Svg<'a> {
    pub fn new(file_name: &str, config: &'a ExportConfig, text_size: f64) -> Self {
        Self {
            file_name: file_name.to_string(),
            renderer: SvgRenderer::new(config, text_size),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Writes an SVG document to the exporter's file.
    pub fn write_document(&self, doc: SvgDocument) -> Result<(), export::Error> {
        info!(file_name = self.file_name; "Creating SVG file");
        let f = match File::create(&self.file_name) {
            Ok(file) => file,
            Err(err) => {
                error!(file_name = self.file_name, err:err; "Failed to create SVG file");
                return Err(export::Error::Io(err));
            }
        };

        if let Err(err) = write!(&f, "{doc}") {
            error!(file_name = self.file_name, err:err; "Failed to write SVG content");
            return Err(export::Error::Io(err));
        }

        Ok(())
    }
}

impl export::Exporter for Svg<'_> {
    fn export_view(&self, document: &Document, view: &View) -> Result<(), export::Error> {
        let doc = self.renderer.render(document, view)?;
        debug!(view = view.name(); "SVG document rendered");

        self.write_document(doc)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ahu_core::host::Host;

    use super::*;
    use crate::export::Exporter;

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("front.svg");
        let config = ExportConfig::default();
        let document = Document::new();
        let view = document.view("Front").unwrap();

        let exporter = Svg::new(path.to_str().unwrap(), &config, 80.0);
        exporter.export_view(&document, &view).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("front.svg");
        let config = ExportConfig::default();
        let document = Document::new();
        let view = document.view("Front").unwrap();

        let exporter = Svg::new(path.to_str().unwrap(), &config, 80.0);
        let result = exporter.export_view(&document, &view);
        assert!(matches!(result, Err(export::Error::Io(_))));
    }
}

//! Error types for family builds.
//!
//! This module provides the main error type [`AhuError`] which wraps the
//! error conditions of loading, layout, annotation and export.

use std::io;

use thiserror::Error;

use ahu_catalogue::error::CatalogueError;
use ahu_core::host::HostError;

/// The main error type for family builds.
///
/// # Diagnostic Variants
///
/// The `Catalogue` variant keeps the catalogue source next to the
/// diagnostics so callers can render labelled snippets.
#[derive(Debug, Error)]
pub enum AhuError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Catalogue { err: CatalogueError, src: String },

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Annotation error: {0}")]
    Annotation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<crate::export::Error> for AhuError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl AhuError {
    /// Create a new `Catalogue` error with the associated source text.
    pub fn new_catalogue_error(err: CatalogueError, src: impl Into<String>) -> Self {
        Self::Catalogue {
            err,
            src: src.into(),
        }
    }
}

pub mod svg;

use ahu_core::{
    document::Document,
    host::{HostError, View},
};

/// Writes one view of a finished document to some output format.
pub trait Exporter {
    fn export_view(&self, document: &Document, view: &View) -> Result<(), Error>;
}

#[derive(Debug)]
pub enum Error {
    Render(String),
    Host(HostError),
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Host(err) => write!(f, "Document error: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Host(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<HostError> for Error {
    fn from(err: HostError) -> Self {
        Self::Host(err)
    }
}

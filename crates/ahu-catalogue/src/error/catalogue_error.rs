//! The [`CatalogueError`] type wrapping loader diagnostics.

use std::fmt;

use crate::error::Diagnostic;

/// Error returned when a catalogue cannot be loaded.
///
/// Wraps every error diagnostic found, so all problems are reported at once.
#[derive(Debug)]
pub struct CatalogueError {
    diagnostics: Vec<Diagnostic>,
}

impl CatalogueError {
    /// Create a new catalogue error from diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl fmt::Display for CatalogueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.diagnostics.first() {
            write!(f, "{}", first)?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for CatalogueError {}

impl From<Diagnostic> for CatalogueError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for CatalogueError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_from_diagnostic() {
        let err: CatalogueError = Diagnostic::error("bad").with_code(ErrorCode::E100).into();

        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.to_string(), "error[E100]: bad");
    }

    #[test]
    fn test_display_multiple() {
        let err: CatalogueError = vec![
            Diagnostic::error("first"),
            Diagnostic::error("second"),
            Diagnostic::error("third"),
        ]
        .into();

        assert_eq!(err.to_string(), "error: first (+2 more)");
    }
}

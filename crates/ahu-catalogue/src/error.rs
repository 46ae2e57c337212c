//! Error and diagnostic system for the catalogue loader.
//!
//! Loading either succeeds with a [`crate::Catalogue`] (possibly carrying
//! warnings) or fails with a [`CatalogueError`] wrapping every error
//! [`Diagnostic`] found. Diagnostics carry an [`ErrorCode`], labelled source
//! spans and optional help text.
//!
//! # Example
//!
//! ```
//! # use ahu_catalogue::{Span, error::{Diagnostic, ErrorCode}};
//!
//! let diag = Diagnostic::error("segment `fan-1` has non-positive height")
//!     .with_code(ErrorCode::E201)
//!     .with_label(Span::new(10..17), "this segment")
//!     .with_help("heights and widths must be greater than zero");
//! ```

mod catalogue_error;
mod diagnostic;
mod error_code;
mod label;
mod severity;

pub use catalogue_error::CatalogueError;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use severity::Severity;

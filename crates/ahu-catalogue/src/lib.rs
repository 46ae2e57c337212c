//! Catalogue loader for air-handling unit families.
//!
//! Turns the configurator's JSON drawing into a validated, normalized
//! [`Catalogue`]: two ordered chains of [`SegmentDescriptor`]s plus the global
//! flags the layout engine needs.
//!
//! Normalization follows the configurator's conventions:
//!
//! - exhaust segments whose identifiers already appear in the intake chain are
//!   dropped (the intake owns them)
//! - when the intake service side is `left` and both chains contain a
//!   `utilization_cross` segment, the tails after the cross segments are
//!   swapped between the chains
//! - the raw export wrapper `{ design, serviceSideIntake, result: { drawing } }`
//!   is unwrapped and cost/specification keys are stripped
//!
//! # Example
//!
//! ```
//! let catalogue = ahu_catalogue::parse(r#"{
//!     "intake": [
//!         { "id": "a", "category": "block", "lengthTotal": 300, "heightTotal": 100, "widthTotal": 600 }
//!     ],
//!     "isIntakeBelow": true
//! }"#).unwrap();
//!
//! assert_eq!(catalogue.intake().len(), 1);
//! assert!(catalogue.exhaust().is_empty());
//! ```

pub mod error;

mod raw;
mod span;

pub use span::Span;

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use ahu_core::{
    identifier::Id,
    segment::{SegmentCategory, SegmentDescriptor, ServiceSide},
};

use error::{CatalogueError, Diagnostic, ErrorCode};

/// A validated catalogue ready for the layout engine.
#[derive(Debug, Clone)]
pub struct Catalogue {
    intake: Vec<SegmentDescriptor>,
    exhaust: Vec<SegmentDescriptor>,
    intake_is_below: bool,
    service_side_intake: ServiceSide,
    service_side_exhaust: ServiceSide,
    frame_height: f64,
    warnings: Vec<Diagnostic>,
}

impl Catalogue {
    /// Creates a catalogue from already-normalized chains.
    ///
    /// Defaults: intake above, both service sides `right`, no frame.
    pub fn new(intake: Vec<SegmentDescriptor>, exhaust: Vec<SegmentDescriptor>) -> Self {
        Self {
            intake,
            exhaust,
            intake_is_below: false,
            service_side_intake: ServiceSide::default(),
            service_side_exhaust: ServiceSide::default(),
            frame_height: 0.0,
            warnings: Vec::new(),
        }
    }

    pub fn with_intake_below(mut self, intake_is_below: bool) -> Self {
        self.intake_is_below = intake_is_below;
        self
    }

    pub fn with_service_sides(mut self, intake: ServiceSide, exhaust: ServiceSide) -> Self {
        self.service_side_intake = intake;
        self.service_side_exhaust = exhaust;
        self
    }

    pub fn with_frame_height(mut self, frame_height: f64) -> Self {
        self.frame_height = frame_height;
        self
    }

    pub fn intake(&self) -> &[SegmentDescriptor] {
        &self.intake
    }

    pub fn exhaust(&self) -> &[SegmentDescriptor] {
        &self.exhaust
    }

    pub fn intake_is_below(&self) -> bool {
        self.intake_is_below
    }

    pub fn service_side_intake(&self) -> ServiceSide {
        self.service_side_intake
    }

    pub fn service_side_exhaust(&self) -> ServiceSide {
        self.service_side_exhaust
    }

    /// External frame depth in millimetres (0 when absent).
    pub fn frame_height(&self) -> f64 {
        self.frame_height
    }

    /// Non-fatal diagnostics found while loading.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

/// Parses, validates and normalizes a catalogue document.
///
/// # Errors
///
/// Returns a [`CatalogueError`] carrying every error diagnostic found: JSON
/// syntax (`E0xx`), structure (`E1xx`) or validation (`E2xx`) problems.
pub fn parse(source: &str) -> Result<Catalogue, CatalogueError> {
    let raw = raw::read(source)?;

    let mut diagnostics = Vec::new();
    validate_chain("intake", &raw.intake, source, &mut diagnostics);
    validate_chain("exhaust", &raw.exhaust, source, &mut diagnostics);

    let (errors, warnings): (Vec<_>, Vec<_>) = diagnostics
        .into_iter()
        .partition(|diag| diag.severity().is_error());
    if !errors.is_empty() {
        return Err(CatalogueError::new(errors));
    }

    let mut intake = raw.intake;
    let mut exhaust = raw.exhaust;
    remove_shared_from_exhaust(&intake, &mut exhaust);
    if raw.service_side_intake == ServiceSide::Left {
        swap_tails_after_cross(&mut intake, &mut exhaust);
    }

    info!(
        intake = intake.len(),
        exhaust = exhaust.len(),
        warnings = warnings.len();
        "Catalogue loaded"
    );

    Ok(Catalogue {
        intake,
        exhaust,
        intake_is_below: raw.is_intake_below,
        service_side_intake: raw.service_side_intake,
        service_side_exhaust: raw.service_side_exhaust,
        frame_height: raw.frame_height.max(0.0),
        warnings,
    })
}

fn validate_chain(
    chain: &str,
    segments: &[SegmentDescriptor],
    source: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    // How many times each id has been seen so far in this chain's source,
    // used to point labels at the right occurrence.
    let mut seen: HashMap<Id, usize> = HashMap::new();

    for segment in segments {
        let id = segment.id().to_string();
        let occurrence = seen.entry(segment.id()).or_insert(0);
        let span = Span::of_quoted(source, &id, *occurrence);

        if *occurrence > 0 {
            let mut diag =
                Diagnostic::error(format!("segment `{id}` appears more than once in {chain}"))
                    .with_code(ErrorCode::E200)
                    .with_optional_label(span, "duplicate")
                    .with_help("segment identifiers must be unique within a chain");
            if let Some(first) = Span::of_quoted(source, &id, 0) {
                diag = diag.with_secondary_label(first, "first defined here");
            }
            diagnostics.push(diag);
        }
        *occurrence += 1;

        for (dimension, value) in [("height", segment.height()), ("width", segment.width())] {
            if value <= 0.0 {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "segment `{id}` has non-positive {dimension} ({value})"
                    ))
                    .with_code(ErrorCode::E201)
                    .with_optional_label(span, "this segment")
                    .with_help("heights and widths must be greater than zero"),
                );
            }
        }

        if segment.length() < 0.0 {
            diagnostics.push(
                Diagnostic::error(format!(
                    "segment `{id}` has negative length ({})",
                    segment.length()
                ))
                .with_code(ErrorCode::E202)
                .with_optional_label(span, "this segment"),
            );
        }

        if segment.category() == SegmentCategory::Unknown {
            diagnostics.push(
                Diagnostic::warning(format!("segment `{id}` has an unknown category"))
                    .with_code(ErrorCode::E203)
                    .with_optional_label(span, "this segment")
                    .with_help("it is laid out as a plain block without stubs"),
            );
        }
    }
}

/// Drops exhaust segments the intake chain already owns.
fn remove_shared_from_exhaust(intake: &[SegmentDescriptor], exhaust: &mut Vec<SegmentDescriptor>) {
    let intake_ids: HashSet<Id> = intake.iter().map(SegmentDescriptor::id).collect();
    let before = exhaust.len();
    exhaust.retain(|segment| !intake_ids.contains(&segment.id()));
    if exhaust.len() != before {
        debug!(removed = before - exhaust.len(); "Removed intake-owned segments from exhaust");
    }
}

/// Swaps everything after the `utilization_cross` segment between chains.
fn swap_tails_after_cross(
    intake: &mut Vec<SegmentDescriptor>,
    exhaust: &mut Vec<SegmentDescriptor>,
) {
    let is_cross = |segment: &SegmentDescriptor| {
        segment.category() == SegmentCategory::UtilizationCross
    };
    let (Some(intake_cross), Some(exhaust_cross)) = (
        intake.iter().position(is_cross),
        exhaust.iter().position(is_cross),
    ) else {
        return;
    };

    let intake_tail = intake.split_off(intake_cross + 1);
    let exhaust_tail = exhaust.split_off(exhaust_cross + 1);
    debug!(
        intake_tail = intake_tail.len(),
        exhaust_tail = exhaust_tail.len();
        "Swapping chain tails after cross-flow heat recovery"
    );
    intake.extend(exhaust_tail);
    exhaust.extend(intake_tail);
}

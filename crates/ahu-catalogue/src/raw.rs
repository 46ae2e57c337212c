//! Wire shapes of the catalogue document and the export wrapper.

use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};

use ahu_core::segment::{SegmentDescriptor, ServiceSide};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
};

/// Keys carrying cost and specification data that the builder never reads.
const NOISE_KEYS: [&str; 8] = [
    "partsSpec",
    "automaticSpec",
    "priceTotal",
    "massTotal",
    "partsSpecSkeleton",
    "partsSpecStands",
    "partsSpecPanels",
    "partsSpecFrame",
];

/// The catalogue document as written by the configurator.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCatalogue {
    #[serde(default)]
    pub intake: Vec<SegmentDescriptor>,
    #[serde(default)]
    pub exhaust: Vec<SegmentDescriptor>,
    #[serde(default)]
    pub is_intake_below: bool,
    #[serde(default)]
    pub service_side_intake: ServiceSide,
    #[serde(default)]
    pub service_side_exhaust: ServiceSide,
    #[serde(default)]
    pub frame_height: f64,
}

/// Reads a catalogue document, unwrapping the raw export wrapper
/// `{ design, serviceSideIntake, result: { drawing } }` when present.
pub(crate) fn read(source: &str) -> Result<RawCatalogue, Diagnostic> {
    let value: Value = serde_json::from_str(source).map_err(|err| json_error(source, &err))?;

    let Value::Object(root) = value else {
        return Err(Diagnostic::error("catalogue must be a JSON object")
            .with_code(ErrorCode::E100)
            .with_label(Span::new(0..source.len().min(1)), "expected `{`"));
    };

    if !root.contains_key("result") {
        // Plain catalogue: deserialize from text so errors keep their location.
        return serde_json::from_str(source).map_err(|err| json_error(source, &err));
    }

    debug!("Unwrapping export document");
    let drawing = unwrap_export(root)?;
    serde_json::from_value(drawing).map_err(|err| {
        Diagnostic::error(format!("invalid drawing: {err}"))
            .with_code(ErrorCode::E100)
            .with_optional_label(Span::of_quoted(source, "drawing", 0), "in this drawing")
    })
}

fn unwrap_export(mut root: Map<String, Value>) -> Result<Value, Diagnostic> {
    let is_intake_below = root
        .get("design")
        .and_then(|design| design.get("isIntakeBelow"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let service_side = root
        .remove("serviceSideIntake")
        .filter(Value::is_string)
        .unwrap_or_else(|| Value::String("right".to_string()));

    let drawing = root
        .get_mut("result")
        .and_then(|result| result.get_mut("drawing"))
        .map(Value::take);
    let Some(Value::Object(mut drawing)) = drawing else {
        return Err(Diagnostic::error("export document has no `result.drawing` object")
            .with_code(ErrorCode::E101)
            .with_help("export the unit drawing, or pass the drawing object itself"));
    };

    strip_noise(&mut drawing);
    drawing.insert("isIntakeBelow".to_string(), Value::Bool(is_intake_below));
    drawing.insert("serviceSideIntake".to_string(), service_side);
    Ok(Value::Object(drawing))
}

/// Recursively removes cost and specification keys.
pub(crate) fn strip_noise(object: &mut Map<String, Value>) {
    for key in NOISE_KEYS {
        object.remove(key);
    }
    for value in object.values_mut() {
        strip_value(value);
    }
}

fn strip_value(value: &mut Value) {
    match value {
        Value::Object(object) => strip_noise(object),
        Value::Array(items) => items.iter_mut().for_each(strip_value),
        _ => {}
    }
}

fn json_error(source: &str, err: &serde_json::Error) -> Diagnostic {
    use serde_json::error::Category;

    let span = Span::at_line_column(source, err.line(), err.column());
    let (code, label) = match err.classify() {
        Category::Syntax => (ErrorCode::E001, "invalid JSON here"),
        Category::Eof => (ErrorCode::E002, "input ends here"),
        Category::Data | Category::Io => (ErrorCode::E100, "unexpected value"),
    };
    Diagnostic::error(err.to_string())
        .with_code(code)
        .with_label(span, label)
}

//! Configuration types for family builds.
//!
//! This module provides configuration structures that control how segment
//! chains are laid out, annotated and exported. All types implement
//! [`serde::Deserialize`] for loading from external sources; every field is
//! optional and falls back to the value listed on its accessor.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`LayoutConfig`] - Frame, stub and frame-hole sizes.
//! - [`AnnotationConfig`] - Dimension offsets, callout placement and view names.
//! - [`ExportConfig`] - SVG margins, stroke and background.
//!
//! # Example
//!
//! ```
//! # use ahu::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.annotation().front_view(), "Front");
//! assert!(config.layout().min_frame_depth() > 0.0);
//! ```

use serde::Deserialize;

/// Top-level configuration combining the layout, annotation and export sections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    annotation: AnnotationConfig,

    #[serde(default)]
    export: ExportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, annotation: AnnotationConfig, export: ExportConfig) -> Self {
        Self {
            layout,
            annotation,
            export,
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn annotation(&self) -> &AnnotationConfig {
        &self.annotation
    }

    pub fn export(&self) -> &ExportConfig {
        &self.export
    }
}

/// Geometry settings for the layout engine. All lengths are millimetres.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct LayoutConfig {
    min_frame_depth: f64,
    stub_length: f64,
    window_rim: f64,
    wide_slot_length: f64,
    end_slot_length: f64,
    end_slot_inset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_frame_depth: 50.0,
            stub_length: 60.0,
            window_rim: 15.0,
            wide_slot_length: 120.0,
            end_slot_length: 80.0,
            end_slot_inset: 100.0,
        }
    }
}

impl LayoutConfig {
    /// Smallest frame depth that produces frame overlays (default 50).
    pub fn min_frame_depth(&self) -> f64 {
        self.min_frame_depth
    }

    /// How far pipe and window stubs protrude from the service face (default 60).
    pub fn stub_length(&self) -> f64 {
        self.stub_length
    }

    /// Ring thickness around an inspection window (default 15).
    pub fn window_rim(&self) -> f64 {
        self.window_rim
    }

    /// Length of the single slot in medium frame segments (default 120).
    pub fn wide_slot_length(&self) -> f64 {
        self.wide_slot_length
    }

    /// Length of each of the two slots in long frame segments (default 80).
    pub fn end_slot_length(&self) -> f64 {
        self.end_slot_length
    }

    /// Distance from a long frame segment's end to its slot centre (default 100).
    pub fn end_slot_inset(&self) -> f64 {
        self.end_slot_inset
    }

    pub fn with_min_frame_depth(mut self, depth: f64) -> Self {
        self.min_frame_depth = depth;
        self
    }
}

/// Settings for the annotation engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AnnotationConfig {
    offset_step: f64,
    gap_epsilon: f64,
    label_dx: f64,
    label_dz: f64,
    text_size: f64,
    front_view: String,
    top_view: String,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            offset_step: 150.0,
            gap_epsilon: 0.1,
            label_dx: 40.0,
            label_dz: 40.0,
            text_size: 80.0,
            front_view: "Front".to_string(),
            top_view: "Top".to_string(),
        }
    }
}

impl AnnotationConfig {
    /// Distance between successive dimension lines (default 150).
    pub fn offset_step(&self) -> f64 {
        self.offset_step
    }

    /// Smallest separation between neighbours that gets a gap dimension (default 0.1).
    pub fn gap_epsilon(&self) -> f64 {
        self.gap_epsilon
    }

    /// Callout text offset to the right of a segment's top-left corner (default 40).
    pub fn label_dx(&self) -> f64 {
        self.label_dx
    }

    /// Callout text offset below a segment's top-left corner (default 40).
    pub fn label_dz(&self) -> f64 {
        self.label_dz
    }

    /// Height of callout text in model units (default 80).
    pub fn text_size(&self) -> f64 {
        self.text_size
    }

    /// Name of the elevation view (default `Front`).
    pub fn front_view(&self) -> &str {
        &self.front_view
    }

    /// Name of the plan view (default `Top`).
    pub fn top_view(&self) -> &str {
        &self.top_view
    }

    pub fn with_view_names(mut self, front: impl Into<String>, top: impl Into<String>) -> Self {
        self.front_view = front.into();
        self.top_view = top.into();
        self
    }
}

/// Settings for SVG export.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ExportConfig {
    margin: f64,
    stroke_width: f64,
    background_color: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            margin: 200.0,
            stroke_width: 3.0,
            background_color: None,
        }
    }
}

impl ExportConfig {
    /// Empty border around the drawing, in model units (default 200).
    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    /// Background fill as an SVG color string, or `None` for transparent.
    pub fn background_color(&self) -> Option<&str> {
        self.background_color.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"layout": {"stub_length": 90}, "annotation": {"front_view": "Elevation 1"}}"#,
        )
        .unwrap();

        assert_eq!(config.layout().stub_length(), 90.0);
        assert_eq!(config.layout().min_frame_depth(), 50.0);
        assert_eq!(config.annotation().front_view(), "Elevation 1");
        assert_eq!(config.annotation().top_view(), "Top");
        assert_eq!(config.export().background_color(), None);
    }
}

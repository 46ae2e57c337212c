//! Orthographic SVG rendering of a document view.
//!
//! Model coordinates are projected onto the view's screen axes with the
//! vertical axis flipped, so one SVG unit is one millimetre. Faces turned
//! towards the viewer are painted farthest first; faces seen edge-on are
//! traced as thin outlines on top so holes and silhouettes stay visible.

use log::{debug, trace};
use svg::{Document as SvgDocument, node::element as svg_element};

use ahu_core::{
    document::{Document, DuctConnector},
    geometry::{Point3, Vector3},
    host::{Dimension, Face, Host, View, ViewKind},
};

use crate::{config::ExportConfig, export};

const FACE_FILL: &str = "#e8edf2";
const FACE_STROKE: &str = "#2e3436";
const EDGE_STROKE: &str = "#8a9399";
const REGION_FILL: &str = "#9ec5e8";
const DIMENSION_STROKE: &str = "#1a5fb4";
const CONNECTOR_FILL: &str = "#f6d32d";

/// Depth a duct connector is drawn out from its face.
const CONNECTOR_DEPTH: f64 = 50.0;

/// A point on the SVG canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScreenPoint {
    x: f64,
    y: f64,
}

/// Extents of everything drawn so far.
#[derive(Debug, Clone, Copy)]
struct Extent {
    min: ScreenPoint,
    max: ScreenPoint,
}

impl Extent {
    fn of(point: ScreenPoint) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    fn include(self, point: ScreenPoint) -> Self {
        Self {
            min: ScreenPoint {
                x: self.min.x.min(point.x),
                y: self.min.y.min(point.y),
            },
            max: ScreenPoint {
                x: self.max.x.max(point.x),
                y: self.max.y.max(point.y),
            },
        }
    }
}

/// Renders document views to in-memory SVG documents.
#[derive(Debug, Clone, Copy)]
pub struct SvgRenderer<'a> {
    config: &'a ExportConfig,
    text_size: f64,
}

impl<'a> SvgRenderer<'a> {
    pub fn new(config: &'a ExportConfig, text_size: f64) -> Self {
        Self { config, text_size }
    }

    /// Draws the solids and the annotations of `view`.
    ///
    /// # Errors
    ///
    /// Returns [`export::Error::Host`] if the document cannot resolve a face,
    /// for instance while a transaction is still open.
    pub fn render(&self, document: &Document, view: &View) -> Result<SvgDocument, export::Error> {
        let kind = view.kind();
        let direction = kind.view_direction();
        let mut extent: Option<Extent> = None;
        let mut include = |point: ScreenPoint| {
            extent = Some(extent.map_or(Extent::of(point), |e| e.include(point)));
        };

        let mut facing: Vec<Face> = Vec::new();
        let mut edge_on: Vec<Face> = Vec::new();
        for element in document.elements() {
            for face in document.faces(element)? {
                let alignment = face.normal().dot(direction);
                if alignment < -0.5 {
                    facing.push(face);
                } else if alignment.abs() < 0.1 {
                    edge_on.push(face);
                }
            }
        }
        // Farthest first.
        facing.sort_by(|a, b| {
            let depth = |face: &Face| face.origin().to_vector().dot(direction);
            depth(b).total_cmp(&depth(a))
        });

        let mut nodes: Vec<Box<dyn svg::Node>> = Vec::new();
        for face in &facing {
            let points = project_all(kind, face.contour());
            points.iter().copied().for_each(&mut include);
            nodes.push(Box::new(
                svg_element::Polygon::new()
                    .set("points", polygon_points(&points))
                    .set("fill", FACE_FILL)
                    .set("stroke", FACE_STROKE)
                    .set("stroke-width", self.config.stroke_width())
                    .set("stroke-linejoin", "round"),
            ));
        }
        for face in &edge_on {
            let points = project_all(kind, face.contour());
            nodes.push(Box::new(
                svg_element::Polygon::new()
                    .set("points", polygon_points(&points))
                    .set("fill", "none")
                    .set("stroke", EDGE_STROKE)
                    .set("stroke-width", self.config.stroke_width() / 2.0),
            ));
        }

        for region in document.filled_regions(view.id()) {
            let center = project(kind, region.center());
            let (half_w, half_h) = (region.length() / 2.0, region.height() / 2.0);
            include(ScreenPoint {
                x: center.x - half_w,
                y: center.y - half_h,
            });
            include(ScreenPoint {
                x: center.x + half_w,
                y: center.y + half_h,
            });
            nodes.push(Box::new(
                svg_element::Rectangle::new()
                    .set("x", center.x - half_w)
                    .set("y", center.y - half_h)
                    .set("width", region.length())
                    .set("height", region.height())
                    .set("fill", REGION_FILL)
                    .set("fill-opacity", 0.35),
            ));
        }

        for connector in document.duct_connectors() {
            let corners = connector_corners(connector).map(|corner| project(kind, corner));
            let Some(bounds) = corners.iter().copied().map(Extent::of).reduce(|a, b| a.include(b.min))
            else {
                continue;
            };
            include(bounds.min);
            include(bounds.max);
            nodes.push(Box::new(
                svg_element::Rectangle::new()
                    .set("x", bounds.min.x)
                    .set("y", bounds.min.y)
                    .set("width", bounds.max.x - bounds.min.x)
                    .set("height", bounds.max.y - bounds.min.y)
                    .set("fill", CONNECTOR_FILL)
                    .set("stroke", FACE_STROKE)
                    .set("stroke-width", self.config.stroke_width()),
            ));
        }

        let dimensions = document.dimensions(view.id())?;
        for dimension in &dimensions {
            let (dimension_nodes, points) = self.render_dimension(kind, dimension);
            points.into_iter().for_each(&mut include);
            nodes.extend(dimension_nodes);
        }

        for note in document.text_notes(view.id()) {
            let position = project(kind, note.position());
            let size = note.style().size();
            include(position);
            if note.style().bordered() {
                let width = note.text().chars().count() as f64 * size * 0.6 + size * 0.4;
                let height = size * 1.2;
                nodes.push(Box::new(
                    svg_element::Rectangle::new()
                        .set("x", position.x - width / 2.0)
                        .set("y", position.y - height / 2.0)
                        .set("width", width)
                        .set("height", height)
                        .set("fill", "white")
                        .set("stroke", FACE_STROKE)
                        .set("stroke-width", self.config.stroke_width()),
                ));
            }
            nodes.push(Box::new(
                svg_element::Text::new(note.text())
                    .set("x", position.x)
                    .set("y", position.y)
                    .set("text-anchor", "middle")
                    .set("dominant-baseline", "central")
                    .set("font-family", "sans-serif")
                    .set("font-size", size),
            ));
        }

        let margin = self.config.margin();
        let extent = extent.unwrap_or(Extent::of(ScreenPoint { x: 0.0, y: 0.0 }));
        let width = extent.max.x - extent.min.x + 2.0 * margin;
        let height = extent.max.y - extent.min.y + 2.0 * margin;
        let (x, y) = (extent.min.x - margin, extent.min.y - margin);
        trace!(view = view.name(), width, height; "SVG view box");

        let mut doc = SvgDocument::new()
            .set("viewBox", (x, y, width, height))
            .set("width", width)
            .set("height", height);

        if let Some(color) = self.config.background_color() {
            doc = doc.add(
                svg_element::Rectangle::new()
                    .set("x", x)
                    .set("y", y)
                    .set("width", width)
                    .set("height", height)
                    .set("fill", color),
            );
        }

        debug!(
            view = view.name(),
            faces = facing.len(),
            dimensions = dimensions.len();
            "Rendering view"
        );
        for node in nodes {
            doc = doc.add(node);
        }
        Ok(doc)
    }

    /// Line, ticks and one label per measured segment.
    fn render_dimension(
        &self,
        kind: ViewKind,
        dimension: &Dimension,
    ) -> (Vec<Box<dyn svg::Node>>, Vec<ScreenPoint>) {
        let line = dimension.line();
        let points: Vec<ScreenPoint> = dimension
            .positions()
            .iter()
            .map(|position| project(kind, line.origin() + line.direction() * *position))
            .collect();
        let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) else {
            return (Vec::new(), points);
        };

        let mut nodes: Vec<Box<dyn svg::Node>> = Vec::new();
        let stroke = self.config.stroke_width() / 2.0;
        nodes.push(Box::new(
            svg_element::Line::new()
                .set("x1", first.x)
                .set("y1", first.y)
                .set("x2", last.x)
                .set("y2", last.y)
                .set("stroke", DIMENSION_STROKE)
                .set("stroke-width", stroke),
        ));

        let along = {
            let (dx, dy) = (last.x - first.x, last.y - first.y);
            let length = dx.hypot(dy);
            if length > 0.0 {
                (dx / length, dy / length)
            } else {
                (1.0, 0.0)
            }
        };
        // Perpendicular, pointing up the screen (or left for vertical lines).
        let mut across = (-along.1, along.0);
        if across.1 > 0.0 || (across.1 == 0.0 && across.0 > 0.0) {
            across = (-across.0, -across.1);
        }

        let tick = self.text_size * 0.25;
        for point in &points {
            nodes.push(Box::new(
                svg_element::Line::new()
                    .set("x1", point.x - across.0 * tick)
                    .set("y1", point.y - across.1 * tick)
                    .set("x2", point.x + across.0 * tick)
                    .set("y2", point.y + across.1 * tick)
                    .set("stroke", DIMENSION_STROKE)
                    .set("stroke-width", stroke),
            ));
        }

        let mut angle = along.1.atan2(along.0).to_degrees();
        if angle > 90.0 {
            angle -= 180.0;
        } else if angle <= -90.0 {
            angle += 180.0;
        }
        for (pair, value) in points.windows(2).zip(dimension.segment_values()) {
            let x = (pair[0].x + pair[1].x) / 2.0 + across.0 * self.text_size * 0.5;
            let y = (pair[0].y + pair[1].y) / 2.0 + across.1 * self.text_size * 0.5;
            nodes.push(Box::new(
                svg_element::Text::new(format_length(value))
                    .set("x", x)
                    .set("y", y)
                    .set("text-anchor", "middle")
                    .set("font-family", "sans-serif")
                    .set("font-size", self.text_size)
                    .set("fill", DIMENSION_STROKE)
                    .set("transform", format!("rotate({angle} {x} {y})")),
            ));
        }

        (nodes, points)
    }
}

fn project(kind: ViewKind, point: Point3) -> ScreenPoint {
    let (horizontal, vertical) = kind.screen_axes();
    let vector = point.to_vector();
    ScreenPoint {
        x: vector.dot(horizontal),
        y: -vector.dot(vertical),
    }
}

fn project_all(kind: ViewKind, points: &[Point3]) -> Vec<ScreenPoint> {
    points.iter().map(|point| project(kind, *point)).collect()
}

fn polygon_points(points: &[ScreenPoint]) -> String {
    points
        .iter()
        .map(|point| format!("{},{}", point.x, point.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Corners of the box a connector occupies in front of its face.
fn connector_corners(connector: &DuctConnector) -> [Point3; 8] {
    let normal = connector.normal();
    let across = if normal.is_parallel(Vector3::Z) {
        Vector3::X
    } else {
        Vector3::Z.cross(normal).normalize().unwrap_or(Vector3::Y)
    };
    let up = normal.cross(across).normalize().unwrap_or(Vector3::Z);
    let half_w = across * (connector.width() / 2.0);
    let half_h = up * (connector.height() / 2.0);
    let out = normal * CONNECTOR_DEPTH;
    let o = connector.origin();
    [
        o - half_w - half_h,
        o + half_w - half_h,
        o + half_w + half_h,
        o - half_w + half_h,
        o - half_w - half_h + out,
        o + half_w - half_h + out,
        o + half_w + half_h + out,
        o - half_w + half_h + out,
    ]
}

/// Whole millimetres when the value is close to one, else one decimal.
fn format_length(value: f64) -> String {
    if (value - value.round()).abs() < 0.05 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use ahu_core::{
        geometry::{Axis, Point2},
        host::{GeomRef, TextStyle},
        sketch::{Loop, Profile, SketchPlane},
    };

    use super::*;

    /// Trimmed contents of every `<text>` node.
    fn text_nodes(svg: &str) -> Vec<String> {
        svg.split("<text")
            .skip(1)
            .filter_map(|chunk| {
                let body = &chunk[chunk.find('>')? + 1..];
                let end = body.find("</text>")?;
                Some(body[..end].trim().to_string())
            })
            .collect()
    }

    fn box_document() -> Document {
        let mut doc = Document::new();
        doc.begin_transaction("box").unwrap();
        doc.extrude(
            &Profile::new(Loop::rectangle(Point2::new(0.0, 0.0), 300.0, 200.0)),
            &SketchPlane::elevation(0.0),
            600.0,
        )
        .unwrap();
        doc.commit_transaction().unwrap();
        doc
    }

    #[test]
    fn test_project_flips_vertical_axis() {
        let point = Point3::new(10.0, 20.0, 30.0);
        assert_eq!(
            project(ViewKind::Elevation, point),
            ScreenPoint { x: 10.0, y: -30.0 }
        );
        assert_eq!(
            project(ViewKind::Plan, point),
            ScreenPoint { x: 10.0, y: -20.0 }
        );
    }

    #[test]
    fn test_front_face_is_painted() {
        let doc = box_document();
        let config = ExportConfig::default();
        let view = doc.view("Front").unwrap();

        let rendered = SvgRenderer::new(&config, 80.0)
            .render(&doc, &view)
            .unwrap()
            .to_string();

        assert_eq!(rendered.matches("<polygon").count(), 5);
        assert!(rendered.contains(FACE_FILL));
        // 300 x 200 plus a 200 margin on each side.
        assert!(rendered.contains(r#"viewBox="-200 -400 700 600""#));
    }

    #[test]
    fn test_annotations_are_drawn() {
        let mut doc = box_document();
        let config = ExportConfig::default();
        let view = doc.view("Front").unwrap();
        let faces = doc.faces(ahu_core::host::ElementId::new(1)).unwrap();
        let left = faces
            .iter()
            .find(|face| face.normal().is_almost_equal(-Vector3::X))
            .unwrap()
            .reference();
        let right = faces
            .iter()
            .find(|face| face.normal().is_almost_equal(Vector3::X))
            .unwrap()
            .reference();

        doc.begin_transaction("annotate").unwrap();
        doc.create_dimension(
            view.id(),
            Axis::new(Point3::new(0.0, 0.0, -150.0), Vector3::X),
            &[left, right],
        )
        .unwrap();
        doc.create_text_note(view.id(), Point3::new(40.0, 0.0, 160.0), "7", TextStyle::new(80.0, true))
            .unwrap();
        doc.create_filled_region(view.id(), Point3::new(150.0, 0.0, 100.0), 300.0, 200.0)
            .unwrap();
        doc.commit_transaction().unwrap();

        let rendered = SvgRenderer::new(&config, 80.0)
            .render(&doc, &view)
            .unwrap()
            .to_string();

        let labels = text_nodes(&rendered);
        assert!(labels.iter().any(|label| label == "300"), "{labels:?}");
        assert!(labels.iter().any(|label| label == "7"), "{labels:?}");
        assert!(rendered.contains(REGION_FILL));
        assert!(matches!(left, GeomRef::Face { .. }));
    }

    #[test]
    fn test_background_color() {
        let doc = Document::new();
        let config: ExportConfig = serde_json::from_str(r##"{"background_color": "#ffffff"}"##).unwrap();
        let view = doc.view("Top").unwrap();

        let rendered = SvgRenderer::new(&config, 80.0)
            .render(&doc, &view)
            .unwrap()
            .to_string();
        assert!(rendered.contains(r##"fill="#ffffff""##));
    }

    #[test]
    fn test_open_transaction_is_reported() {
        let mut doc = box_document();
        let config = ExportConfig::default();
        let view = doc.view("Front").unwrap();
        doc.begin_transaction("move").unwrap();
        doc.translate(&[ahu_core::host::ElementId::new(1)], Vector3::X)
            .unwrap();

        let result = SvgRenderer::new(&config, 80.0).render(&doc, &view);
        assert!(matches!(result, Err(export::Error::Host(_))));
    }

    #[test]
    fn test_format_length() {
        assert_eq!(format_length(700.0), "700");
        assert_eq!(format_length(34.99), "35");
        assert_eq!(format_length(12.5), "12.5");
    }
}

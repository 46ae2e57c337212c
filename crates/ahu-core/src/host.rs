//! The CAD host surface the layout and annotation engines drive.
//!
//! The engines never own geometry: they ask a [`Host`] to extrude outlines,
//! read back the resulting faces and edges, and place dimensions and notes
//! that reference those same faces. All mutations happen inside a named
//! transaction; geometry created or moved inside the open transaction is
//! *pending regeneration* and cannot be queried until the transaction is
//! committed.

use std::fmt;

use thiserror::Error;

use crate::{
    geometry::{Axis, Bounds3, Point3, Vector3},
    sketch::{Profile, SketchPlane},
};

/// Handle of a solid created by [`Host::extrude`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Handle of an annotation object (dimension, text note, filled region or
/// duct connector).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(u32);

impl AnnotationId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "annotation#{}", self.0)
    }
}

/// Handle of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(u32);

impl ViewId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }
}

/// Projection of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Looking along +Y at the XZ plane.
    Elevation,
    /// Looking down -Z at the XY plane.
    Plan,
}

impl ViewKind {
    /// Direction the viewer looks along.
    pub fn view_direction(self) -> Vector3 {
        match self {
            Self::Elevation => Vector3::Y,
            Self::Plan => -Vector3::Z,
        }
    }

    /// Model axes mapped to the view's horizontal and vertical screen axes.
    pub fn screen_axes(self) -> (Vector3, Vector3) {
        match self {
            Self::Elevation => (Vector3::X, Vector3::Z),
            Self::Plan => (Vector3::X, Vector3::Y),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    id: ViewId,
    name: String,
    kind: ViewKind,
}

impl View {
    pub fn new(id: ViewId, name: impl Into<String>, kind: ViewKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }
}

/// A reference to a face or edge of an element, usable by dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeomRef {
    Face { element: ElementId, index: usize },
    Edge { element: ElementId, index: usize },
}

impl GeomRef {
    pub fn element(self) -> ElementId {
        match self {
            Self::Face { element, .. } | Self::Edge { element, .. } => element,
        }
    }
}

/// A planar face of a solid.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    reference: GeomRef,
    normal: Vector3,
    origin: Point3,
    contour: Vec<Point3>,
    area: f64,
}

impl Face {
    pub fn new(
        reference: GeomRef,
        normal: Vector3,
        origin: Point3,
        contour: Vec<Point3>,
        area: f64,
    ) -> Self {
        Self {
            reference,
            normal,
            origin,
            contour,
            area,
        }
    }

    pub fn reference(&self) -> GeomRef {
        self.reference
    }

    /// Outward unit normal.
    pub fn normal(&self) -> Vector3 {
        self.normal
    }

    /// Centroid of the face contour.
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Outer boundary, in order.
    pub fn contour(&self) -> &[Point3] {
        &self.contour
    }

    pub fn area(&self) -> f64 {
        self.area
    }
}

/// A straight edge of a solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    reference: GeomRef,
    start: Point3,
    end: Point3,
}

impl Edge {
    pub fn new(reference: GeomRef, start: Point3, end: Point3) -> Self {
        Self {
            reference,
            start,
            end,
        }
    }

    pub fn reference(&self) -> GeomRef {
        self.reference
    }

    pub fn start(&self) -> Point3 {
        self.start
    }

    pub fn end(&self) -> Point3 {
        self.end
    }

    pub fn midpoint(&self) -> Point3 {
        self.start + (self.end - self.start) * 0.5
    }
}

/// A dimension as resolved by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    id: AnnotationId,
    view: ViewId,
    line: Axis,
    references: Vec<GeomRef>,
    positions: Vec<f64>,
}

impl Dimension {
    pub fn new(
        id: AnnotationId,
        view: ViewId,
        line: Axis,
        references: Vec<GeomRef>,
        positions: Vec<f64>,
    ) -> Self {
        Self {
            id,
            view,
            line,
            references,
            positions,
        }
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn line(&self) -> Axis {
        self.line
    }

    pub fn references(&self) -> &[GeomRef] {
        &self.references
    }

    /// Coordinates of each reference projected onto the dimension line.
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Measured value of a single-segment dimension.
    ///
    /// Multi-reference (string) dimensions have no single value and return
    /// `None`; see [`Dimension::segment_values`].
    pub fn value(&self) -> Option<f64> {
        match self.positions.as_slice() {
            [a, b] => Some((b - a).abs()),
            _ => None,
        }
    }

    /// Values of each consecutive pair of references.
    pub fn segment_values(&self) -> Vec<f64> {
        self.positions
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).abs())
            .collect()
    }
}

/// Visual style of a text note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    size: f64,
    bordered: bool,
}

impl TextStyle {
    pub fn new(size: f64, bordered: bool) -> Self {
        Self { size, bordered }
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn bordered(&self) -> bool {
        self.bordered
    }
}

/// Errors reported by a [`Host`].
#[derive(Debug, Error, PartialEq)]
pub enum HostError {
    #[error("no transaction is open")]
    NoTransaction,

    #[error("transaction `{0}` is already open")]
    TransactionOpen(String),

    #[error("{0} is pending regeneration; commit the transaction first")]
    PendingRegeneration(ElementId),

    #[error("unknown {0}")]
    UnknownElement(ElementId),

    #[error("unknown {0}")]
    UnknownAnnotation(AnnotationId),

    #[error("{0:?} does not exist")]
    UnknownReference(GeomRef),

    #[error("unknown view")]
    UnknownView,

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// The collaborator surface of a CAD document.
pub trait Host {
    /// Opens a named transaction. Only one may be open at a time.
    fn begin_transaction(&mut self, name: &str) -> Result<(), HostError>;

    /// Commits the open transaction and regenerates its geometry.
    fn commit_transaction(&mut self) -> Result<(), HostError>;

    /// Extrudes `profile` drawn on `plane` by `depth` along the plane normal.
    fn extrude(
        &mut self,
        profile: &Profile,
        plane: &SketchPlane,
        depth: f64,
    ) -> Result<ElementId, HostError>;

    /// Planar faces of a regenerated element.
    fn faces(&self, element: ElementId) -> Result<Vec<Face>, HostError>;

    /// Straight edges of a regenerated element.
    fn edges(&self, element: ElementId) -> Result<Vec<Edge>, HostError>;

    /// Triangle mesh of a regenerated element.
    fn tessellate(&self, element: ElementId) -> Result<Vec<[Point3; 3]>, HostError>;

    /// Axis-aligned bounds of a regenerated element.
    fn bounds(&self, element: ElementId) -> Result<Bounds3, HostError> {
        let triangles = self.tessellate(element)?;
        Bounds3::from_points(triangles.into_iter().flatten())
            .ok_or_else(|| HostError::Degenerate(format!("{element} has no geometry")))
    }

    /// Rotates elements by `angle` radians about `axis`.
    fn rotate(&mut self, elements: &[ElementId], axis: Axis, angle: f64)
    -> Result<(), HostError>;

    fn translate(&mut self, elements: &[ElementId], offset: Vector3) -> Result<(), HostError>;

    /// Looks a view up by name.
    fn view(&self, name: &str) -> Option<View>;

    /// Creates a dimension between `references`, drawn along `line` in `view`.
    fn create_dimension(
        &mut self,
        view: ViewId,
        line: Axis,
        references: &[GeomRef],
    ) -> Result<AnnotationId, HostError>;

    /// Dimensions currently present in `view`.
    fn dimensions(&self, view: ViewId) -> Result<Vec<Dimension>, HostError>;

    fn delete_annotations(&mut self, ids: &[AnnotationId]) -> Result<(), HostError>;

    fn create_text_note(
        &mut self,
        view: ViewId,
        position: Point3,
        text: &str,
        style: TextStyle,
    ) -> Result<AnnotationId, HostError>;

    /// Places a `length × height` filled rectangle centred on `center`.
    fn create_filled_region(
        &mut self,
        view: ViewId,
        center: Point3,
        length: f64,
        height: f64,
    ) -> Result<AnnotationId, HostError>;

    /// Attaches a rectangular duct connector to a face.
    fn create_duct_connector(
        &mut self,
        face: GeomRef,
        width: f64,
        height: f64,
    ) -> Result<AnnotationId, HostError>;
}

//! An in-memory [`Host`] document.
//!
//! Solids are prisms: a profile's tessellated loops swept along the sketch
//! plane normal. Faces are numbered bottom cap, top cap, then one side face
//! per loop edge (outer loop first, then each hole). Edges are numbered per
//! loop as bottom ring, top ring, then the lateral edges.
//!
//! Elements created or moved inside the open transaction are *dirty* until
//! [`Host::commit_transaction`]; face and edge queries on them fail with
//! [`HostError::PendingRegeneration`].

use std::collections::{BTreeMap, HashSet};

use log::{debug, trace};

use crate::{
    geometry::{Axis, EPSILON, Point3, Transform, Vector3},
    host::{
        AnnotationId, Dimension, Edge, ElementId, Face, GeomRef, Host, HostError, TextStyle,
        View, ViewId, ViewKind,
    },
    sketch::{Loop, Profile, SketchPlane},
};

/// Names of the views every fresh document carries.
pub const DEFAULT_VIEWS: [(&str, ViewKind); 2] =
    [("Front", ViewKind::Elevation), ("Top", ViewKind::Plan)];

#[derive(Debug, Clone)]
struct SolidLoop {
    points: Vec<Point3>,
    /// `+1` when the side-face normal `edge × (u × v)` points out of the solid.
    outward: f64,
    area: f64,
}

#[derive(Debug, Clone)]
struct Solid {
    loops: Vec<SolidLoop>,
    extrusion: Vector3,
    plane_normal: Vector3,
    transform: Transform,
}

impl Solid {
    fn from_profile(
        profile: &Profile,
        plane: &SketchPlane,
        depth: f64,
    ) -> Result<Self, HostError> {
        if depth.abs() < EPSILON {
            return Err(HostError::Degenerate("zero extrusion depth".to_string()));
        }
        let uv_normal = plane.u_axis().cross(plane.v_axis());

        let mut loops = Vec::new();
        for (index, sketch_loop) in profile.loops().enumerate() {
            let loop_ = Self::solid_loop(sketch_loop, plane, index > 0)?;
            loops.push(loop_);
        }

        Ok(Self {
            loops,
            extrusion: plane.normal() * depth,
            plane_normal: uv_normal,
            transform: Transform::IDENTITY,
        })
    }

    fn solid_loop(
        sketch_loop: &Loop,
        plane: &SketchPlane,
        is_hole: bool,
    ) -> Result<SolidLoop, HostError> {
        if !sketch_loop.is_closed() {
            return Err(HostError::Degenerate("profile loop is not closed".to_string()));
        }
        let points: Vec<Point3> = sketch_loop
            .tessellate()
            .into_iter()
            .map(|point| plane.to_model(point))
            .collect();
        if points.len() < 3 {
            return Err(HostError::Degenerate(
                "profile loop has fewer than three points".to_string(),
            ));
        }

        let signed_area = sketch_loop.signed_area();
        let winding = if signed_area >= 0.0 { 1.0 } else { -1.0 };
        Ok(SolidLoop {
            points,
            outward: if is_hole { -winding } else { winding },
            area: signed_area.abs(),
        })
    }

    fn outer(&self) -> &SolidLoop {
        &self.loops[0]
    }

    fn net_area(&self) -> f64 {
        let holes: f64 = self.loops.iter().skip(1).map(|l| l.area).sum();
        (self.outer().area - holes).max(0.0)
    }

    fn faces(&self, element: ElementId) -> Vec<Face> {
        let t = &self.transform;
        let direction = self.extrusion.normalize().unwrap_or(Vector3::Y);
        let mut faces = Vec::new();

        let bottom: Vec<Point3> = self.outer().points.iter().map(|p| t.apply_point(*p)).collect();
        let top: Vec<Point3> = self
            .outer()
            .points
            .iter()
            .map(|p| t.apply_point(*p + self.extrusion))
            .collect();

        for (contour, normal) in [(bottom, -direction), (top, direction)] {
            let index = faces.len();
            faces.push(planar_face(element, index, contour, t.apply_vector(normal), self.net_area()));
        }

        let height = self.extrusion.length();
        for loop_ in &self.loops {
            for (a, b) in ring(&loop_.points) {
                let edge = b - a;
                let Some(normal) = (edge.cross(self.plane_normal) * loop_.outward).normalize()
                else {
                    continue;
                };
                let contour: Vec<Point3> = [a, b, b + self.extrusion, a + self.extrusion]
                    .into_iter()
                    .map(|p| t.apply_point(p))
                    .collect();
                let index = faces.len();
                faces.push(planar_face(
                    element,
                    index,
                    contour,
                    t.apply_vector(normal),
                    edge.length() * height,
                ));
            }
        }
        faces
    }

    fn edges(&self, element: ElementId) -> Vec<Edge> {
        let t = &self.transform;
        let mut segments = Vec::new();
        for loop_ in &self.loops {
            for (a, b) in ring(&loop_.points) {
                segments.push((a, b));
            }
            for (a, b) in ring(&loop_.points) {
                segments.push((a + self.extrusion, b + self.extrusion));
            }
            for point in &loop_.points {
                segments.push((*point, *point + self.extrusion));
            }
        }

        segments
            .into_iter()
            .enumerate()
            .map(|(index, (a, b))| {
                Edge::new(
                    GeomRef::Edge { element, index },
                    t.apply_point(a),
                    t.apply_point(b),
                )
            })
            .collect()
    }

    fn tessellate(&self) -> Vec<[Point3; 3]> {
        let t = &self.transform;
        let mut triangles = Vec::new();
        let outer = &self.outer().points;

        // Fan triangulation of both caps; holes are ignored for the mesh.
        for offset in [Vector3::ZERO, self.extrusion] {
            let first = outer[0] + offset;
            for pair in outer[1..].windows(2) {
                triangles.push([first, pair[0] + offset, pair[1] + offset]);
            }
        }
        for loop_ in &self.loops {
            for (a, b) in ring(&loop_.points) {
                let (a2, b2) = (a + self.extrusion, b + self.extrusion);
                triangles.push([a, b, b2]);
                triangles.push([a, b2, a2]);
            }
        }

        triangles
            .into_iter()
            .map(|triangle| triangle.map(|p| t.apply_point(p)))
            .collect()
    }
}

fn ring(points: &[Point3]) -> impl Iterator<Item = (Point3, Point3)> + '_ {
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| (*a, *b))
}

fn planar_face(
    element: ElementId,
    index: usize,
    contour: Vec<Point3>,
    normal: Vector3,
    area: f64,
) -> Face {
    let origin = Point3::centroid(contour.iter().copied()).unwrap_or(Point3::ORIGIN);
    Face::new(GeomRef::Face { element, index }, normal, origin, contour, area)
}

/// A text note placed in a view.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNote {
    id: AnnotationId,
    view: ViewId,
    position: Point3,
    text: String,
    style: TextStyle,
}

impl TextNote {
    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn position(&self) -> Point3 {
        self.position
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> TextStyle {
        self.style
    }
}

/// A filled rectangle placed in a view.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledRegion {
    id: AnnotationId,
    view: ViewId,
    center: Point3,
    length: f64,
    height: f64,
}

impl FilledRegion {
    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn center(&self) -> Point3 {
        self.center
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// A rectangular duct connector attached to a face.
#[derive(Debug, Clone, PartialEq)]
pub struct DuctConnector {
    id: AnnotationId,
    face: GeomRef,
    origin: Point3,
    normal: Vector3,
    width: f64,
    height: f64,
}

impl DuctConnector {
    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn face(&self) -> GeomRef {
        self.face
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn normal(&self) -> Vector3 {
        self.normal
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

#[derive(Debug, Clone)]
enum Annotation {
    Dimension(Dimension),
    TextNote(TextNote),
    FilledRegion(FilledRegion),
    DuctConnector(DuctConnector),
}

/// In-memory family document.
#[derive(Debug, Clone)]
pub struct Document {
    solids: Vec<Solid>,
    views: Vec<View>,
    annotations: BTreeMap<AnnotationId, Annotation>,
    next_annotation: u32,
    transaction: Option<String>,
    committed: Vec<String>,
    dirty: HashSet<ElementId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document with the `Front` and `Top` views.
    pub fn new() -> Self {
        Self::with_views(&DEFAULT_VIEWS)
    }

    /// Creates an empty document with the given views.
    pub fn with_views(views: &[(&str, ViewKind)]) -> Self {
        let views = views
            .iter()
            .zip(0u32..)
            .map(|((name, kind), id)| View::new(ViewId::new(id), *name, *kind))
            .collect();
        Self {
            solids: Vec::new(),
            views,
            annotations: BTreeMap::new(),
            next_annotation: 1,
            transaction: None,
            committed: Vec::new(),
            dirty: HashSet::new(),
        }
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Every element handle, in creation order.
    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        (0..self.solids.len()).map(|index| ElementId::new(index as u32 + 1))
    }

    /// Names of committed transactions, oldest first.
    pub fn committed_transactions(&self) -> &[String] {
        &self.committed
    }

    pub fn is_pending(&self, element: ElementId) -> bool {
        self.dirty.contains(&element)
    }

    pub fn text_notes(&self, view: ViewId) -> impl Iterator<Item = &TextNote> {
        self.annotations.values().filter_map(move |a| match a {
            Annotation::TextNote(note) if note.view == view => Some(note),
            _ => None,
        })
    }

    pub fn filled_regions(&self, view: ViewId) -> impl Iterator<Item = &FilledRegion> {
        self.annotations.values().filter_map(move |a| match a {
            Annotation::FilledRegion(region) if region.view == view => Some(region),
            _ => None,
        })
    }

    pub fn duct_connectors(&self) -> impl Iterator<Item = &DuctConnector> {
        self.annotations.values().filter_map(|a| match a {
            Annotation::DuctConnector(connector) => Some(connector),
            _ => None,
        })
    }

    fn require_transaction(&self) -> Result<(), HostError> {
        if self.transaction.is_none() {
            return Err(HostError::NoTransaction);
        }
        Ok(())
    }

    fn solid(&self, element: ElementId) -> Result<&Solid, HostError> {
        (element.value() as usize)
            .checked_sub(1)
            .and_then(|index| self.solids.get(index))
            .ok_or(HostError::UnknownElement(element))
    }

    fn solid_mut(&mut self, element: ElementId) -> Result<&mut Solid, HostError> {
        (element.value() as usize)
            .checked_sub(1)
            .and_then(|index| self.solids.get_mut(index))
            .ok_or(HostError::UnknownElement(element))
    }

    /// Returns the solid only when it has been regenerated.
    fn regenerated(&self, element: ElementId) -> Result<&Solid, HostError> {
        let solid = self.solid(element)?;
        if self.dirty.contains(&element) {
            return Err(HostError::PendingRegeneration(element));
        }
        Ok(solid)
    }

    fn require_view(&self, view: ViewId) -> Result<(), HostError> {
        if self.views.iter().any(|v| v.id() == view) {
            Ok(())
        } else {
            Err(HostError::UnknownView)
        }
    }

    fn resolve_face(&self, reference: GeomRef) -> Result<Face, HostError> {
        let GeomRef::Face { element, index } = reference else {
            return Err(HostError::UnknownReference(reference));
        };
        self.regenerated(element)?
            .faces(element)
            .into_iter()
            .nth(index)
            .ok_or(HostError::UnknownReference(reference))
    }

    /// Model-space position a dimension measures to.
    fn reference_point(&self, reference: GeomRef) -> Result<Point3, HostError> {
        match reference {
            GeomRef::Face { .. } => self.resolve_face(reference).map(|face| face.origin()),
            GeomRef::Edge { element, index } => self
                .regenerated(element)?
                .edges(element)
                .get(index)
                .map(Edge::midpoint)
                .ok_or(HostError::UnknownReference(reference)),
        }
    }

    fn insert_annotation(&mut self, build: impl FnOnce(AnnotationId) -> Annotation) -> AnnotationId {
        let id = AnnotationId::new(self.next_annotation);
        self.next_annotation += 1;
        self.annotations.insert(id, build(id));
        id
    }

    fn transform_elements(
        &mut self,
        elements: &[ElementId],
        transform: Transform,
    ) -> Result<(), HostError> {
        self.require_transaction()?;
        for element in elements {
            self.solid(*element)?;
        }
        for element in elements {
            let solid = self.solid_mut(*element)?;
            solid.transform = solid.transform.then(&transform);
            self.dirty.insert(*element);
        }
        Ok(())
    }
}

impl Host for Document {
    fn begin_transaction(&mut self, name: &str) -> Result<(), HostError> {
        if let Some(open) = &self.transaction {
            return Err(HostError::TransactionOpen(open.clone()));
        }
        debug!(transaction = name; "Begin transaction");
        self.transaction = Some(name.to_string());
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<(), HostError> {
        let name = self.transaction.take().ok_or(HostError::NoTransaction)?;
        debug!(transaction = name, regenerated = self.dirty.len(); "Commit transaction");
        self.dirty.clear();
        self.committed.push(name);
        Ok(())
    }

    fn extrude(
        &mut self,
        profile: &Profile,
        plane: &SketchPlane,
        depth: f64,
    ) -> Result<ElementId, HostError> {
        self.require_transaction()?;
        let solid = Solid::from_profile(profile, plane, depth)?;
        self.solids.push(solid);
        let element = ElementId::new(self.solids.len() as u32);
        self.dirty.insert(element);
        trace!(element:%, depth, holes = profile.holes().len(); "Extruded profile");
        Ok(element)
    }

    fn faces(&self, element: ElementId) -> Result<Vec<Face>, HostError> {
        Ok(self.regenerated(element)?.faces(element))
    }

    fn edges(&self, element: ElementId) -> Result<Vec<Edge>, HostError> {
        Ok(self.regenerated(element)?.edges(element))
    }

    fn tessellate(&self, element: ElementId) -> Result<Vec<[Point3; 3]>, HostError> {
        Ok(self.regenerated(element)?.tessellate())
    }

    fn rotate(
        &mut self,
        elements: &[ElementId],
        axis: Axis,
        angle: f64,
    ) -> Result<(), HostError> {
        trace!(count = elements.len(), angle; "Rotate elements");
        self.transform_elements(elements, Transform::rotation(axis, angle))
    }

    fn translate(&mut self, elements: &[ElementId], offset: Vector3) -> Result<(), HostError> {
        trace!(count = elements.len(), offset:?; "Translate elements");
        self.transform_elements(elements, Transform::translation(offset))
    }

    fn view(&self, name: &str) -> Option<View> {
        self.views.iter().find(|view| view.name() == name).cloned()
    }

    fn create_dimension(
        &mut self,
        view: ViewId,
        line: Axis,
        references: &[GeomRef],
    ) -> Result<AnnotationId, HostError> {
        self.require_transaction()?;
        self.require_view(view)?;
        if references.len() < 2 {
            return Err(HostError::Degenerate(
                "a dimension needs at least two references".to_string(),
            ));
        }
        let positions = references
            .iter()
            .map(|reference| self.reference_point(*reference).map(|p| line.project(p)))
            .collect::<Result<Vec<_>, _>>()?;

        let references = references.to_vec();
        Ok(self.insert_annotation(|id| {
            Annotation::Dimension(Dimension::new(id, view, line, references, positions))
        }))
    }

    fn dimensions(&self, view: ViewId) -> Result<Vec<Dimension>, HostError> {
        self.require_view(view)?;
        Ok(self
            .annotations
            .values()
            .filter_map(|a| match a {
                Annotation::Dimension(dimension) if dimension.view() == view => {
                    Some(dimension.clone())
                }
                _ => None,
            })
            .collect())
    }

    fn delete_annotations(&mut self, ids: &[AnnotationId]) -> Result<(), HostError> {
        self.require_transaction()?;
        if let Some(missing) = ids.iter().find(|id| !self.annotations.contains_key(id)) {
            return Err(HostError::UnknownAnnotation(*missing));
        }
        for id in ids {
            self.annotations.remove(id);
        }
        Ok(())
    }

    fn create_text_note(
        &mut self,
        view: ViewId,
        position: Point3,
        text: &str,
        style: TextStyle,
    ) -> Result<AnnotationId, HostError> {
        self.require_transaction()?;
        self.require_view(view)?;
        let text = text.to_string();
        Ok(self.insert_annotation(|id| {
            Annotation::TextNote(TextNote {
                id,
                view,
                position,
                text,
                style,
            })
        }))
    }

    fn create_filled_region(
        &mut self,
        view: ViewId,
        center: Point3,
        length: f64,
        height: f64,
    ) -> Result<AnnotationId, HostError> {
        self.require_transaction()?;
        self.require_view(view)?;
        Ok(self.insert_annotation(|id| {
            Annotation::FilledRegion(FilledRegion {
                id,
                view,
                center,
                length,
                height,
            })
        }))
    }

    fn create_duct_connector(
        &mut self,
        face: GeomRef,
        width: f64,
        height: f64,
    ) -> Result<AnnotationId, HostError> {
        self.require_transaction()?;
        let resolved = self.resolve_face(face)?;
        Ok(self.insert_annotation(|id| {
            Annotation::DuctConnector(DuctConnector {
                id,
                face,
                origin: resolved.origin(),
                normal: resolved.normal(),
                width,
                height,
            })
        }))
    }
}

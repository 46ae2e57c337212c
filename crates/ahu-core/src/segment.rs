//! Segment descriptors: the catalogue's physical modules and their children.
//!
//! A [`SegmentDescriptor`] is one module in a chain (intake or exhaust). Its
//! [`ChildComponent`]s carry the functional type tags the layout engine
//! dispatches on (end-elements, plate heat recovery, fan discharge direction)
//! and the service panels from which [`CutInfo`] is derived.
//!
//! All lengths are millimetres.

use std::fmt;

use log::trace;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{geometry::EPSILON, identifier::Id};

/// Functional category of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SegmentCategory {
    #[default]
    Block,
    Arrow,
    /// `utilization`: generic heat recovery.
    Utilization,
    /// `utilization_cross`: cross-flow plate heat recovery.
    UtilizationCross,
    /// `utilization_separate`: run-around (separate) heat recovery.
    UtilizationSeparate,
    Recirculator,
    EndElement,
    Unknown,
}

impl SegmentCategory {
    /// Returns `true` for every heat-recovery category.
    pub fn is_heat_recovery(self) -> bool {
        matches!(
            self,
            Self::Utilization | Self::UtilizationCross | Self::UtilizationSeparate
        )
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Arrow => "arrow",
            Self::Utilization => "utilization",
            Self::UtilizationCross => "utilization_cross",
            Self::UtilizationSeparate => "utilization_separate",
            Self::Recirculator => "recirculator",
            Self::EndElement => "end",
            Self::Unknown => "unknown",
        }
    }
}

impl From<&str> for SegmentCategory {
    /// Catalogue categories are matched by substring, most specific first.
    fn from(tag: &str) -> Self {
        if tag.contains("utilization_cross") {
            Self::UtilizationCross
        } else if tag.contains("utilization_separate") {
            Self::UtilizationSeparate
        } else if tag.contains("utilization") {
            Self::Utilization
        } else if tag.contains("recirculator") {
            Self::Recirculator
        } else if tag.contains("arrow") {
            Self::Arrow
        } else if tag.contains("block") {
            Self::Block
        } else if tag.starts_with("end") {
            Self::EndElement
        } else {
            Self::Unknown
        }
    }
}

impl From<String> for SegmentCategory {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<SegmentCategory> for String {
    fn from(category: SegmentCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for SegmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type tag of a child component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentKind {
    AirValve,
    FlexibleDamper,
    Visor,
    AirFilter,
    Fan,
    NoiseSuppressor,
    WaterHeater,
    WaterCooler,
    FreonCooler,
    ElectricHeater,
    PlateUtilizer,
    RotorUtilizer,
    RecyclingCamera,
    InterimCoolant,
    MultifuncSection,
    SteamHumidifier,
    AdiabaticHumidifier,
    UvDisinfectant,
    Frame,
    /// Outdoor air port.
    Oda,
    /// Extract air port.
    Eta,
    /// Supply air port.
    Sup,
    /// Exhaust air port.
    Eha,
    Unknown,
}

impl ComponentKind {
    const TAGS: [(&'static str, ComponentKind); 23] = [
        ("airValve", Self::AirValve),
        ("flexibleDamper", Self::FlexibleDamper),
        ("visor", Self::Visor),
        ("airFilter", Self::AirFilter),
        ("noiseSuppressor", Self::NoiseSuppressor),
        ("waterHeater", Self::WaterHeater),
        ("waterCooler", Self::WaterCooler),
        ("freonCooler", Self::FreonCooler),
        ("electricHeater", Self::ElectricHeater),
        ("plateUtilizer", Self::PlateUtilizer),
        ("rotorUtilizer", Self::RotorUtilizer),
        ("recyclingCamera", Self::RecyclingCamera),
        ("interimCoolant", Self::InterimCoolant),
        ("multifuncSection", Self::MultifuncSection),
        ("steamHumidifier", Self::SteamHumidifier),
        ("adiabaticHumidifier", Self::AdiabaticHumidifier),
        ("uvDisinfectant", Self::UvDisinfectant),
        ("frame", Self::Frame),
        ("fan", Self::Fan),
        ("ODA", Self::Oda),
        ("ETA", Self::Eta),
        ("SUP", Self::Sup),
        ("EHA", Self::Eha),
    ];

    /// Returns `true` for the children that make a segment an end-element.
    pub fn is_end_element(self) -> bool {
        matches!(self, Self::AirValve | Self::FlexibleDamper)
    }

    /// Returns `true` for children that may declare a discharge direction.
    pub fn can_discharge(self) -> bool {
        matches!(self, Self::Fan | Self::MultifuncSection)
    }

    fn as_str(self) -> &'static str {
        Self::TAGS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map_or("unknown", |(tag, _)| *tag)
    }
}

impl From<&str> for ComponentKind {
    /// Tags are matched by substring so suffixed variants (`fan_ec`,
    /// `airFilterPocket`) resolve to their family.
    fn from(tag: &str) -> Self {
        Self::TAGS
            .iter()
            .find(|(known, _)| tag.contains(*known))
            .map_or(Self::Unknown, |(_, kind)| *kind)
    }
}

impl From<String> for ComponentKind {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<ComponentKind> for String {
    fn from(kind: ComponentKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a fan or multi-function section blows its air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DischargeDirection {
    /// `axe`: straight along the chain.
    Axial,
    Up,
    Down,
    /// Towards the chain's service side.
    ServiceSide,
    /// Towards the side opposite the service side.
    Side,
}

impl DischargeDirection {
    /// Parses a catalogue tag; unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "axe" => Some(Self::Axial),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "service_side" => Some(Self::ServiceSide),
            "side" => Some(Self::Side),
            _ => None,
        }
    }

    pub fn is_lateral(self) -> bool {
        matches!(self, Self::ServiceSide | Self::Side)
    }
}

/// Which long face of the unit carries service doors and connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceSide {
    /// Front face (y = 0).
    Left,
    /// Back face (y = width).
    #[default]
    Right,
}

impl ServiceSide {
    /// Outward depth direction of the service face: -1 for left, +1 for right.
    pub fn sign(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// A service panel: transverse size and the longitudinal sub-panel sizes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    #[serde(rename = "sizeY", default)]
    transverse: f64,
    #[serde(rename = "sizesX", default)]
    edges: Vec<f64>,
}

impl Panel {
    pub fn new(transverse: f64, edges: Vec<f64>) -> Self {
        Self { transverse, edges }
    }

    pub fn transverse(&self) -> f64 {
        self.transverse
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }
}

/// A round pipe connection, in the child's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pipe {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(rename = "d", default)]
    diameter: f64,
}

impl Pipe {
    pub fn new(x: f64, y: f64, diameter: f64) -> Self {
        Self { x, y, diameter }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }
}

/// An inspection window; same shape as a [`Pipe`] but rendered as a ring.
pub type Window = Pipe;

/// A functional child of a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildComponent {
    id: Id,
    #[serde(rename = "type")]
    kind: ComponentKind,
    #[serde(rename = "lengthTotal", default)]
    length: f64,
    #[serde(rename = "heightTotal", default)]
    height: f64,
    #[serde(rename = "widthTotal", default)]
    width: f64,
    #[serde(default)]
    service_panels: Vec<Panel>,
    #[serde(default)]
    pipes: Vec<Pipe>,
    #[serde(default)]
    window: Option<Window>,
    #[serde(
        rename = "exhaustDirection",
        default,
        deserialize_with = "deserialize_direction",
        skip_serializing
    )]
    discharge: Option<DischargeDirection>,
}

impl ChildComponent {
    pub fn new(id: &str, kind: ComponentKind, length: f64, height: f64, width: f64) -> Self {
        Self {
            id: Id::new(id),
            kind,
            length,
            height,
            width,
            service_panels: Vec::new(),
            pipes: Vec::new(),
            window: None,
            discharge: None,
        }
    }

    pub fn with_service_panels(mut self, panels: Vec<Panel>) -> Self {
        self.service_panels = panels;
        self
    }

    pub fn with_pipe(mut self, pipe: Pipe) -> Self {
        self.pipes.push(pipe);
        self
    }

    pub fn with_window(mut self, window: Window) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_discharge(mut self, direction: DischargeDirection) -> Self {
        self.discharge = Some(direction);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn service_panels(&self) -> &[Panel] {
        &self.service_panels
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }

    /// Discharge direction; only meaningful on fans and multi-function sections.
    pub fn discharge(&self) -> Option<DischargeDirection> {
        self.discharge.filter(|_| self.kind.can_discharge())
    }
}

fn deserialize_direction<'de, D>(deserializer: D) -> Result<Option<DischargeDirection>, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = Option::<String>::deserialize(deserializer)?;
    Ok(tag.as_deref().and_then(DischargeDirection::from_tag))
}

/// Missing, `null` and negative indices all mean "no callout".
fn deserialize_display_index<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let index = Option::<i64>::deserialize(deserializer)?;
    Ok(index.and_then(|index| u32::try_from(index).ok()))
}

/// Plate heat-recovery cut: which end corners are notched and how deep.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CutInfo {
    has_left_cut: bool,
    has_right_cut: bool,
    depth: f64,
}

impl CutInfo {
    /// No cut on either side.
    pub const NONE: CutInfo = CutInfo {
        has_left_cut: false,
        has_right_cut: false,
        depth: 0.0,
    };

    pub fn new(has_left_cut: bool, has_right_cut: bool, depth: f64) -> Self {
        if (!has_left_cut && !has_right_cut) || depth <= 0.0 {
            return Self::NONE;
        }
        Self {
            has_left_cut,
            has_right_cut,
            depth,
        }
    }

    pub fn has_left_cut(&self) -> bool {
        self.has_left_cut
    }

    pub fn has_right_cut(&self) -> bool {
        self.has_right_cut
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// Depth applied on the left end (0 when not cut).
    pub fn left_depth(&self) -> f64 {
        if self.has_left_cut { self.depth } else { 0.0 }
    }

    /// Depth applied on the right end (0 when not cut).
    pub fn right_depth(&self) -> f64 {
        if self.has_right_cut { self.depth } else { 0.0 }
    }

    pub fn is_cut(&self) -> bool {
        self.has_left_cut || self.has_right_cut
    }
}

/// Derives the plate heat-recovery cut from a segment's children.
///
/// The first `plateUtilizer` child is inspected. Its first service panel is
/// the top row and its last the bottom row; the difference between their
/// leading sub-panels is the left cut, between their trailing sub-panels the
/// right cut. Contradictory data (a negative difference, or a cut deeper than
/// half the child's length) yields [`CutInfo::NONE`].
pub fn derive_cut_info(children: &[ChildComponent]) -> CutInfo {
    let Some(plate) = children
        .iter()
        .find(|child| child.kind() == ComponentKind::PlateUtilizer)
    else {
        return CutInfo::NONE;
    };

    let panels = plate.service_panels();
    if panels.len() < 2 {
        return CutInfo::NONE;
    }
    let (top, bottom) = (&panels[0], &panels[panels.len() - 1]);
    let (Some(top_first), Some(top_last), Some(bottom_first), Some(bottom_last)) = (
        top.edges().first(),
        top.edges().last(),
        bottom.edges().first(),
        bottom.edges().last(),
    ) else {
        return CutInfo::NONE;
    };

    let left = top_first - bottom_first;
    let right = bottom_last - top_last;
    if left < -EPSILON || right < -EPSILON {
        trace!(child:% = plate.id(), left, right; "Contradictory panel edges, no cut");
        return CutInfo::NONE;
    }

    let has_left_cut = left > EPSILON;
    let has_right_cut = right > EPSILON;
    let depth = left.max(right);
    if depth > plate.length() / 2.0 {
        trace!(child:% = plate.id(), depth; "Cut deeper than half the plate, no cut");
        return CutInfo::NONE;
    }

    CutInfo::new(has_left_cut, has_right_cut, depth)
}

/// One physical module of a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentDescriptor {
    id: Id,
    #[serde(default)]
    category: SegmentCategory,
    #[serde(default, deserialize_with = "deserialize_display_index")]
    display_index: Option<u32>,
    #[serde(rename = "lengthTotal", default)]
    length: f64,
    #[serde(rename = "heightTotal", default)]
    height: f64,
    #[serde(rename = "widthTotal", default)]
    width: f64,
    #[serde(default)]
    top_panels: Vec<Panel>,
    #[serde(default)]
    floor_panels: Vec<Panel>,
    #[serde(default)]
    back_panels: Vec<Panel>,
    #[serde(default)]
    children: Vec<ChildComponent>,
    #[serde(skip)]
    cut_info: CutInfo,
}

impl SegmentDescriptor {
    pub fn new(id: &str, category: SegmentCategory, length: f64, height: f64, width: f64) -> Self {
        Self {
            id: Id::new(id),
            category,
            display_index: None,
            length,
            height,
            width,
            top_panels: Vec::new(),
            floor_panels: Vec::new(),
            back_panels: Vec::new(),
            children: Vec::new(),
            cut_info: CutInfo::NONE,
        }
    }

    pub fn with_child(mut self, child: ChildComponent) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_display_index(mut self, index: u32) -> Self {
        self.display_index = Some(index);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn category(&self) -> SegmentCategory {
        self.category
    }

    pub fn display_index(&self) -> Option<u32> {
        self.display_index
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn top_panels(&self) -> &[Panel] {
        &self.top_panels
    }

    pub fn floor_panels(&self) -> &[Panel] {
        &self.floor_panels
    }

    pub fn back_panels(&self) -> &[Panel] {
        &self.back_panels
    }

    pub fn children(&self) -> &[ChildComponent] {
        &self.children
    }

    pub fn cut_info(&self) -> CutInfo {
        self.cut_info
    }

    /// Recomputes [`CutInfo`] from the children.
    pub fn refresh_cut_info(&mut self) -> CutInfo {
        self.cut_info = derive_cut_info(&self.children);
        self.cut_info
    }

    pub fn has_child(&self, kind: ComponentKind) -> bool {
        self.children.iter().any(|child| child.kind() == kind)
    }

    /// Segments that define a chain's height and width envelope.
    pub fn is_envelope(&self) -> bool {
        !self.category.is_heat_recovery() && self.category != SegmentCategory::Recirculator
    }

    /// Air valves and flexible dampers sit at the chain ends and are centred.
    pub fn is_end_element(&self) -> bool {
        self.category == SegmentCategory::EndElement
            || self.children.iter().any(|child| child.kind().is_end_element())
    }

    pub fn is_flexible_damper(&self) -> bool {
        self.has_child(ComponentKind::FlexibleDamper)
    }

    /// Segments containing a plate heat-recovery child.
    pub fn is_plate_heat_recovery(&self) -> bool {
        self.has_child(ComponentKind::PlateUtilizer)
    }

    /// Segments that carry pipe and window stubs.
    pub fn carries_stubs(&self) -> bool {
        matches!(
            self.category,
            SegmentCategory::Block | SegmentCategory::UtilizationCross
        )
    }

    /// Index and child of the first fan or multi-function section that
    /// discharges somewhere other than straight along the chain.
    pub fn discharging_child(&self) -> Option<(usize, &ChildComponent, DischargeDirection)> {
        self.children.iter().enumerate().find_map(|(index, child)| {
            child
                .discharge()
                .filter(|direction| *direction != DischargeDirection::Axial)
                .map(|direction| (index, child, direction))
        })
    }

    /// Local X offset of the child at `index` from the segment start.
    pub fn child_offset(&self, index: usize) -> f64 {
        self.children.iter().take(index).map(ChildComponent::length).sum()
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn plate(top: Vec<f64>, bottom: Vec<f64>) -> ChildComponent {
        ChildComponent::new("plate", ComponentKind::PlateUtilizer, 1200.0, 1000.0, 800.0)
            .with_service_panels(vec![Panel::new(500.0, top), Panel::new(500.0, bottom)])
    }

    #[test]
    fn test_category_from_tag() {
        assert_eq!(SegmentCategory::from("block"), SegmentCategory::Block);
        assert_eq!(
            SegmentCategory::from("utilization_cross"),
            SegmentCategory::UtilizationCross
        );
        assert_eq!(
            SegmentCategory::from("utilization"),
            SegmentCategory::Utilization
        );
        assert_eq!(
            SegmentCategory::from("recirculator"),
            SegmentCategory::Recirculator
        );
        assert_eq!(SegmentCategory::from("mystery"), SegmentCategory::Unknown);
    }

    #[test]
    fn test_component_kind_from_tag() {
        assert_eq!(ComponentKind::from("fan"), ComponentKind::Fan);
        assert_eq!(
            ComponentKind::from("flexibleDamper"),
            ComponentKind::FlexibleDamper
        );
        assert_eq!(ComponentKind::from("ODA"), ComponentKind::Oda);
        assert_eq!(ComponentKind::from("airFilterPocket"), ComponentKind::AirFilter);
        assert_eq!(ComponentKind::from("teapot"), ComponentKind::Unknown);
        assert_eq!(ComponentKind::WaterHeater.to_string(), "waterHeater");
    }

    #[test]
    fn test_discharge_only_on_fans() {
        let fan = ChildComponent::new("f", ComponentKind::Fan, 1.0, 1.0, 1.0)
            .with_discharge(DischargeDirection::Up);
        let filter = ChildComponent::new("g", ComponentKind::AirFilter, 1.0, 1.0, 1.0)
            .with_discharge(DischargeDirection::Up);

        assert_eq!(fan.discharge(), Some(DischargeDirection::Up));
        assert_eq!(filter.discharge(), None);
    }

    #[test]
    fn test_cut_info_without_plate_is_none() {
        let children = vec![ChildComponent::new(
            "fan",
            ComponentKind::Fan,
            500.0,
            500.0,
            500.0,
        )];
        assert_eq!(derive_cut_info(&children), CutInfo::NONE);
    }

    #[test]
    fn test_cut_info_symmetric_panels_is_none() {
        let children = vec![plate(vec![300.0, 600.0, 300.0], vec![300.0, 600.0, 300.0])];
        assert_eq!(derive_cut_info(&children), CutInfo::NONE);
    }

    #[test]
    fn test_cut_info_left_cut() {
        let children = vec![plate(vec![450.0, 600.0, 150.0], vec![300.0, 600.0, 150.0])];
        let cut = derive_cut_info(&children);

        assert!(cut.has_left_cut());
        assert!(!cut.has_right_cut());
        assert_approx_eq!(f64, cut.depth(), 150.0);
        assert_approx_eq!(f64, cut.right_depth(), 0.0);
    }

    #[test]
    fn test_cut_info_both_sides_takes_larger() {
        let children = vec![plate(vec![400.0, 600.0, 100.0], vec![300.0, 600.0, 250.0])];
        let cut = derive_cut_info(&children);

        assert!(cut.has_left_cut());
        assert!(cut.has_right_cut());
        assert_approx_eq!(f64, cut.depth(), 150.0);
    }

    #[test]
    fn test_cut_info_contradictory_is_none() {
        // Negative left difference.
        let negative = vec![plate(vec![100.0, 600.0, 300.0], vec![300.0, 600.0, 400.0])];
        assert_eq!(derive_cut_info(&negative), CutInfo::NONE);

        // Deeper than half the plate length (1200 / 2).
        let too_deep = vec![plate(vec![900.0, 300.0], vec![100.0, 300.0])];
        assert_eq!(derive_cut_info(&too_deep), CutInfo::NONE);
    }

    #[test]
    fn test_cut_info_needs_two_panels() {
        let child = ChildComponent::new("plate", ComponentKind::PlateUtilizer, 1200.0, 1.0, 1.0)
            .with_service_panels(vec![Panel::new(1.0, vec![400.0])]);
        assert_eq!(derive_cut_info(&[child]), CutInfo::NONE);
    }

    #[test]
    fn test_segment_predicates() {
        let damper = SegmentDescriptor::new("d", SegmentCategory::Block, 200.0, 80.0, 600.0)
            .with_child(ChildComponent::new(
                "fd",
                ComponentKind::FlexibleDamper,
                200.0,
                80.0,
                600.0,
            ));
        let recovery =
            SegmentDescriptor::new("r", SegmentCategory::Utilization, 900.0, 1600.0, 800.0);

        assert!(damper.is_end_element());
        assert!(damper.is_flexible_damper());
        assert!(damper.is_envelope());
        assert!(!recovery.is_envelope());
        assert!(!recovery.carries_stubs());
    }

    #[test]
    fn test_discharging_child_and_offset() {
        let segment = SegmentDescriptor::new("s", SegmentCategory::Block, 1000.0, 500.0, 500.0)
            .with_child(ChildComponent::new("a", ComponentKind::AirFilter, 300.0, 1.0, 1.0))
            .with_child(
                ChildComponent::new("b", ComponentKind::Fan, 700.0, 1.0, 1.0)
                    .with_discharge(DischargeDirection::Side),
            );

        let (index, child, direction) = segment.discharging_child().unwrap();
        assert_eq!(index, 1);
        assert_eq!(child.id(), "b");
        assert_eq!(direction, DischargeDirection::Side);
        assert_approx_eq!(f64, segment.child_offset(1), 300.0);
    }

    // ===== Property Test Functions =====

    fn check_cut_depth_bounded(top: Vec<f64>, bottom: Vec<f64>) -> Result<(), TestCaseError> {
        let children = vec![plate(top, bottom)];
        let cut = derive_cut_info(&children);

        prop_assert!(cut.depth() >= 0.0);
        prop_assert!(cut.depth() <= 600.0);
        if !cut.is_cut() {
            prop_assert_eq!(cut.depth(), 0.0);
        }
        Ok(())
    }

    fn check_no_plate_never_cuts(lengths: Vec<f64>) -> Result<(), TestCaseError> {
        let children: Vec<_> = lengths
            .iter()
            .enumerate()
            .map(|(i, length)| {
                ChildComponent::new(&format!("c{i}"), ComponentKind::Fan, *length, 1.0, 1.0)
                    .with_service_panels(vec![
                        Panel::new(1.0, vec![*length]),
                        Panel::new(1.0, vec![0.0]),
                    ])
            })
            .collect();

        prop_assert_eq!(derive_cut_info(&children), CutInfo::NONE);
        Ok(())
    }

    // ===== Proptest Wrappers =====

    proptest! {
        #[test]
        fn cut_depth_bounded(
            top in prop::collection::vec(0.0..1000.0f64, 1..5),
            bottom in prop::collection::vec(0.0..1000.0f64, 1..5),
        ) {
            check_cut_depth_bounded(top, bottom)?;
        }

        #[test]
        fn no_plate_never_cuts(lengths in prop::collection::vec(1.0..2000.0f64, 0..6)) {
            check_no_plate_never_cuts(lengths)?;
        }
    }
}

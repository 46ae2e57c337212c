//! Turning terminal end-element runs towards a fan's discharge.
//!
//! Air valves and flexible dampers at either end of a chain normally continue
//! straight along X. When the nearest real segment has a fan or
//! multi-function section that blows up, down or sideways, the run is
//! rotated a quarter turn and moved onto that discharge face.

use std::f64::consts::FRAC_PI_2;

use log::{debug, warn};

use ahu_core::{
    geometry::{Axis, Bounds3, Point3, Vector3},
    host::{ElementId, Face, Host, HostError},
    segment::{DischargeDirection, ServiceSide},
};

use super::PositionedElement;

/// Which end of a chain a run sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Boundary {
    Start,
    End,
}

/// A run of end elements to swing round onto a discharge face.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Reorientation {
    boundary: Boundary,
    /// Indices of the end elements, outermost first.
    run: Vec<usize>,
    target: usize,
    child_index: usize,
    direction: DischargeDirection,
}

/// Finds the run at `boundary`, looking at no more than two segments.
pub(super) fn plan(chain: &[PositionedElement], boundary: Boundary) -> Option<Reorientation> {
    let order: Vec<usize> = match boundary {
        Boundary::Start => (0..chain.len()).collect(),
        Boundary::End => (0..chain.len()).rev().collect(),
    };

    let run: Vec<usize> = order
        .iter()
        .take(2)
        .take_while(|&&index| chain[index].descriptor().is_end_element())
        .copied()
        .collect();
    if run.is_empty() {
        return None;
    }

    let target = *order.get(run.len())?;
    let descriptor = chain[target].descriptor();
    if descriptor.is_end_element() {
        return None;
    }
    let (child_index, _, direction) = descriptor.discharging_child()?;

    Some(Reorientation {
        boundary,
        run,
        target,
        child_index,
        direction,
    })
}

/// Rotation axis direction and angle for a run.
///
/// Up and down turn about the depth axis (Y); sideways discharges turn about
/// the vertical axis (Z). The sign flips between the two boundaries so the
/// run's free end always points away from the target.
pub(super) fn rotation(
    boundary: Boundary,
    direction: DischargeDirection,
    service_side: ServiceSide,
) -> Option<(Vector3, f64)> {
    let towards = match boundary {
        Boundary::Start => 1.0,
        Boundary::End => -1.0,
    };
    match direction {
        DischargeDirection::Axial => None,
        DischargeDirection::Up => Some((Vector3::Y, towards * FRAC_PI_2)),
        DischargeDirection::Down => Some((Vector3::Y, -towards * FRAC_PI_2)),
        DischargeDirection::ServiceSide | DischargeDirection::Side => {
            let sign = lateral_sign(direction, service_side);
            Some((Vector3::Z, -towards * sign * FRAC_PI_2))
        }
    }
}

/// Unit vector the discharge points along.
pub(super) fn discharge_vector(
    direction: DischargeDirection,
    service_side: ServiceSide,
) -> Option<Vector3> {
    match direction {
        DischargeDirection::Axial => None,
        DischargeDirection::Up => Some(Vector3::Z),
        DischargeDirection::Down => Some(-Vector3::Z),
        DischargeDirection::ServiceSide | DischargeDirection::Side => {
            Some(Vector3::Y * lateral_sign(direction, service_side))
        }
    }
}

/// +1 for +Y, -1 for -Y.
fn lateral_sign(direction: DischargeDirection, service_side: ServiceSide) -> f64 {
    match direction {
        DischargeDirection::ServiceSide => service_side.sign(),
        _ => service_side.opposite().sign(),
    }
}

/// Reorients every qualifying run of both chains.
///
/// All rotations happen in one transaction. It is committed before the
/// translations are computed, because those need the rotated geometry.
pub(super) fn reorient_end_runs<H: Host>(
    host: &mut H,
    chains: [(&[PositionedElement], ServiceSide); 2],
) -> Result<usize, HostError> {
    let plans: Vec<(&[PositionedElement], ServiceSide, Reorientation)> = chains
        .iter()
        .flat_map(|&(chain, side)| {
            [Boundary::Start, Boundary::End]
                .into_iter()
                .filter_map(move |boundary| plan(chain, boundary))
                .map(move |plan| (chain, side, plan))
        })
        .collect();
    if plans.is_empty() {
        return Ok(0);
    }

    // Pivots are read before anything moves.
    let mut rotations = Vec::with_capacity(plans.len());
    for (chain, side, plan) in &plans {
        let Some((axis, angle)) = rotation(plan.boundary, plan.direction, *side) else {
            continue;
        };
        let pivot = run_bounds(host, chain, &plan.run)?.center();
        rotations.push((run_elements(chain, &plan.run), Axis::new(pivot, axis), angle));
    }

    host.begin_transaction("Reorient end segments")?;
    for (elements, axis, angle) in &rotations {
        host.rotate(elements, *axis, *angle)?;
    }
    host.commit_transaction()?;

    let mut translations = Vec::with_capacity(plans.len());
    for (chain, side, plan) in &plans {
        match alignment_offset(host, chain, *side, plan)? {
            Some(offset) => translations.push((run_elements(chain, &plan.run), offset)),
            None => warn!(
                target_segment:% = chain[plan.target].descriptor().id();
                "Target has no discharge face, run left rotated in place"
            ),
        }
    }

    host.begin_transaction("Align end segments")?;
    for (elements, offset) in &translations {
        host.translate(elements, *offset)?;
    }
    host.commit_transaction()?;

    debug!(runs = plans.len(); "End segments reoriented");
    Ok(plans.len())
}

/// Bodies and attachments of the run.
fn run_elements(chain: &[PositionedElement], run: &[usize]) -> Vec<ElementId> {
    run.iter()
        .flat_map(|&index| chain[index].all_elements())
        .collect()
}

/// Bounds of the run's bodies.
fn run_bounds<H: Host>(
    host: &H,
    chain: &[PositionedElement],
    run: &[usize],
) -> Result<Bounds3, HostError> {
    let mut bounds: Option<Bounds3> = None;
    for &index in run {
        let body = host.bounds(chain[index].element())?;
        bounds = Some(bounds.map_or(body, |b| b.merge(body)));
    }
    bounds.ok_or_else(|| HostError::Degenerate("empty run".to_string()))
}

/// Offset that puts the rotated run against the target's discharge face.
///
/// Along the discharge direction the run's near side meets the face; across
/// it the run is centred on the face, or on the discharging child when that
/// child is not the target's first.
fn alignment_offset<H: Host>(
    host: &H,
    chain: &[PositionedElement],
    side: ServiceSide,
    plan: &Reorientation,
) -> Result<Option<Vector3>, HostError> {
    let Some(direction) = discharge_vector(plan.direction, side) else {
        return Ok(None);
    };
    let target = &chain[plan.target];
    let faces = host.faces(target.element())?;
    let Some(face) = discharge_face(&faces, direction) else {
        return Ok(None);
    };

    let mut anchor = face.origin();
    let descriptor = target.descriptor();
    if plan.child_index > 0 {
        let child = &descriptor.children()[plan.child_index];
        let child_center =
            target.start_x() + descriptor.child_offset(plan.child_index) + child.length() / 2.0;
        anchor = anchor.with_x(child_center);
    }

    let bounds = run_bounds(host, chain, &plan.run)?;
    let near_side = corners(bounds)
        .into_iter()
        .map(|corner| corner.to_vector().dot(direction))
        .fold(f64::INFINITY, f64::min);
    let along = anchor.to_vector().dot(direction) - near_side;

    let to_anchor = anchor - bounds.center();
    let across = to_anchor - direction * to_anchor.dot(direction);
    Ok(Some(across + direction * along))
}

/// Outermost face whose normal matches `direction`.
fn discharge_face(faces: &[Face], direction: Vector3) -> Option<&Face> {
    faces
        .iter()
        .filter(|face| face.normal().is_almost_equal(direction))
        .max_by(|a, b| {
            a.origin()
                .to_vector()
                .dot(direction)
                .total_cmp(&b.origin().to_vector().dot(direction))
                .then(a.area().total_cmp(&b.area()))
        })
}

fn corners(bounds: Bounds3) -> [Point3; 8] {
    let (min, max) = (bounds.min(), bounds.max());
    [
        min,
        min.with_x(max.x()),
        min.with_y(max.y()),
        min.with_z(max.z()),
        max,
        max.with_x(min.x()),
        max.with_y(min.y()),
        max.with_z(min.z()),
    ]
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use ahu_core::{
        document::Document,
        segment::{ChildComponent, ComponentKind, SegmentCategory, SegmentDescriptor},
    };

    use super::*;
    use crate::{
        config::LayoutConfig,
        layout::{
            Chain,
            chain::{AlignmentTable, ChainContext, FrameSpan, lay_intake},
            envelope::{Band, Envelope},
            frame::FramePlacement,
        },
    };

    fn valve(id: &str) -> SegmentDescriptor {
        SegmentDescriptor::new(id, SegmentCategory::Block, 200.0, 300.0, 600.0).with_child(
            ChildComponent::new(id, ComponentKind::AirValve, 200.0, 300.0, 600.0),
        )
    }

    fn fan(id: &str, direction: DischargeDirection) -> SegmentDescriptor {
        SegmentDescriptor::new(id, SegmentCategory::Block, 800.0, 500.0, 600.0)
            .with_child(ChildComponent::new("filter", ComponentKind::AirFilter, 300.0, 500.0, 600.0))
            .with_child(
                ChildComponent::new("fan", ComponentKind::Fan, 500.0, 500.0, 600.0)
                    .with_discharge(direction),
            )
    }

    fn lay(doc: &mut Document, segments: &[SegmentDescriptor]) -> Vec<PositionedElement> {
        let config = LayoutConfig::default();
        let context = ChainContext {
            config: &config,
            chain: Chain::Intake,
            band: Band::new(0.0, 500.0),
            envelope: Envelope::new(500.0, 600.0),
            service_side: ServiceSide::Right,
            frame: FrameSpan::new(FramePlacement::Omitted, 0.0),
        };
        doc.begin_transaction("layout").unwrap();
        let placed = lay_intake(doc, &context, segments, &mut AlignmentTable::new()).unwrap();
        doc.commit_transaction().unwrap();
        placed
    }

    #[test]
    fn test_plan_needs_discharging_target() {
        let mut doc = Document::new();
        let chain = lay(
            &mut doc,
            &[valve("v"), fan("f", DischargeDirection::Up), valve("w")],
        );

        let start = plan(&chain, Boundary::Start).unwrap();
        assert_eq!(start.run, [0]);
        assert_eq!(start.target, 1);
        assert_eq!(start.child_index, 1);

        let end = plan(&chain, Boundary::End).unwrap();
        assert_eq!(end.run, [2]);

        let axial = lay(&mut doc, &[valve("v"), fan("f", DischargeDirection::Axial)]);
        assert_eq!(plan(&axial, Boundary::Start), None);
    }

    #[test]
    fn test_plan_looks_at_two_segments() {
        let mut doc = Document::new();
        let chain = lay(
            &mut doc,
            &[valve("a"), valve("b"), valve("c"), fan("f", DischargeDirection::Up)],
        );

        assert_eq!(plan(&chain, Boundary::Start), None);
    }

    #[test]
    fn test_rotation_signs() {
        let (axis, angle) =
            rotation(Boundary::Start, DischargeDirection::Up, ServiceSide::Right).unwrap();
        assert_eq!(axis, Vector3::Y);
        assert_approx_eq!(f64, angle, FRAC_PI_2);

        let (axis, angle) =
            rotation(Boundary::End, DischargeDirection::ServiceSide, ServiceSide::Left).unwrap();
        assert_eq!(axis, Vector3::Z);
        assert_approx_eq!(f64, angle, -FRAC_PI_2);

        assert_eq!(
            discharge_vector(DischargeDirection::Side, ServiceSide::Right),
            Some(-Vector3::Y)
        );
    }

    #[test]
    fn test_run_lands_on_top_face() {
        let mut doc = Document::new();
        let chain = lay(&mut doc, &[valve("v"), fan("f", DischargeDirection::Up)]);
        let empty: Vec<PositionedElement> = Vec::new();

        let runs = reorient_end_runs(
            &mut doc,
            [(&chain[..], ServiceSide::Right), (&empty[..], ServiceSide::Right)],
        )
        .unwrap();
        assert_eq!(runs, 1);

        let valve = doc.bounds(chain[0].element()).unwrap();
        let fan = doc.bounds(chain[1].element()).unwrap();
        // Standing on the fan, centred over the fan child (300..800 of 800).
        assert_approx_eq!(f64, valve.min().z(), fan.max().z(), epsilon = 1e-6);
        assert_approx_eq!(f64, valve.center().x(), fan.min().x() + 550.0, epsilon = 1e-6);
        assert_approx_eq!(f64, valve.height(), 200.0, epsilon = 1e-6);
        assert_eq!(
            &doc.committed_transactions()[1..],
            ["Reorient end segments", "Align end segments"]
        );
    }

    #[test]
    fn test_run_moves_to_service_side() {
        let mut doc = Document::new();
        let chain = lay(
            &mut doc,
            &[fan("f", DischargeDirection::ServiceSide), valve("v")],
        );
        let empty: Vec<PositionedElement> = Vec::new();

        reorient_end_runs(
            &mut doc,
            [(&chain[..], ServiceSide::Right), (&empty[..], ServiceSide::Right)],
        )
        .unwrap();

        let valve = doc.bounds(chain[1].element()).unwrap();
        let fan = doc.bounds(chain[0].element()).unwrap();
        assert_approx_eq!(f64, valve.min().y(), fan.max().y(), epsilon = 1e-6);
        assert_approx_eq!(f64, valve.center().z(), fan.center().z(), epsilon = 1e-6);
    }
}

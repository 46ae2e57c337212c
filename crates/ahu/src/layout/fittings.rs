//! Pipe and window stubs on the service face.

use log::trace;

use ahu_core::{
    geometry::{EPSILON, Point2, Vector3},
    host::{ElementId, Host, HostError},
    segment::{SegmentDescriptor, ServiceSide},
    sketch::{Loop, Profile, SketchPlane},
};

use crate::config::LayoutConfig;

/// Sketch plane on the segment's service face, extruding outwards.
///
/// Segments span Y = 0..width: the left service face is Y = 0, the right one
/// Y = width.
pub(super) fn service_plane(segment: &SegmentDescriptor, side: ServiceSide) -> SketchPlane {
    match side {
        ServiceSide::Left => SketchPlane::elevation_towards(0.0, -Vector3::Y),
        ServiceSide::Right => SketchPlane::elevation_towards(segment.width(), Vector3::Y),
    }
}

/// Outlines of every pipe and window stub of a segment placed at
/// (`start_x`, `base_z`).
///
/// Pipe positions are relative to their child's start, which is found by
/// summing the lengths of the children before it.
pub(super) fn stub_profiles(
    segment: &SegmentDescriptor,
    start_x: f64,
    base_z: f64,
    config: &LayoutConfig,
) -> Vec<Profile> {
    let mut profiles = Vec::new();
    let mut child_x = start_x;

    for child in segment.children() {
        for pipe in child.pipes() {
            if pipe.diameter() <= EPSILON {
                continue;
            }
            let center = Point2::new(child_x + pipe.x(), base_z + pipe.y());
            profiles.push(Profile::new(Loop::circle(center, pipe.diameter() / 2.0)));
        }

        if let Some(window) = child.window().filter(|window| window.diameter() > EPSILON) {
            let center = Point2::new(child_x + window.x(), base_z + window.y());
            let radius = window.diameter() / 2.0;
            profiles.push(
                Profile::new(Loop::circle(center, radius + config.window_rim()))
                    .with_hole(Loop::circle(center, radius)),
            );
        }

        child_x += child.length();
    }

    profiles
}

/// Extrudes the segment's stubs out of its service face.
pub(super) fn add_stubs<H: Host>(
    host: &mut H,
    segment: &SegmentDescriptor,
    start_x: f64,
    base_z: f64,
    side: ServiceSide,
    config: &LayoutConfig,
) -> Result<Vec<ElementId>, HostError> {
    let plane = service_plane(segment, side);
    stub_profiles(segment, start_x, base_z, config)
        .iter()
        .map(|profile| {
            let element = host.extrude(profile, &plane, config.stub_length())?;
            trace!(segment:% = segment.id(), element:%; "Stub extruded");
            Ok(element)
        })
        .collect()
}

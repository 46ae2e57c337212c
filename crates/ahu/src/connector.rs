//! Duct connectors on flexible-damper segments.

use std::cmp::Ordering;

use log::{debug, warn};

use ahu_core::{
    geometry::EPSILON,
    host::{AnnotationId, Face, GeomRef, Host},
};

use crate::{error::AhuError, layout::LayoutOutput};

/// Attaches one duct connector to the outer end face of every segment with a
/// flexible-damper child, sized to the segment's width and height.
pub fn attach_duct_connectors<H: Host>(
    host: &mut H,
    layout: &LayoutOutput,
) -> Result<Vec<AnnotationId>, AhuError> {
    let mut targets: Vec<(GeomRef, f64, f64)> = Vec::new();
    for positioned in layout
        .elements()
        .filter(|positioned| positioned.descriptor().is_flexible_damper())
    {
        let faces = host.faces(positioned.element())?;
        let descriptor = positioned.descriptor();
        match outermost_end_face(&faces) {
            Some(face) => targets.push((face.reference(), descriptor.width(), descriptor.height())),
            None => warn!(
                segment:% = descriptor.id();
                "Flexible damper has no end face, skipping duct connector"
            ),
        }
    }

    if targets.is_empty() {
        return Ok(Vec::new());
    }

    host.begin_transaction("Attach duct connectors")?;
    let connectors = targets
        .iter()
        .map(|&(face, width, height)| host.create_duct_connector(face, width, height))
        .collect::<Result<Vec<_>, _>>()?;
    host.commit_transaction()?;

    debug!(count = connectors.len(); "Duct connectors attached");
    Ok(connectors)
}

/// The X-facing face furthest from X = 0; near-ties go to the larger face.
pub(crate) fn outermost_end_face(faces: &[Face]) -> Option<&Face> {
    faces
        .iter()
        .filter(|face| face.normal().x().abs() > 0.99)
        .max_by(|a, b| {
            let (ax, bx) = (a.origin().x().abs(), b.origin().x().abs());
            if (ax - bx).abs() <= EPSILON {
                a.area().total_cmp(&b.area())
            } else if ax < bx {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        })
}

//! Index-number callouts.

use log::debug;

use ahu_core::{
    geometry::{EPSILON, Point3, Vector3},
    host::{Host, TextStyle, View},
};

use super::AnnotationSummary;
use crate::{config::AnnotationConfig, error::AhuError, layout::LayoutOutput};

/// Corner with the lowest X, then the highest Z.
pub(super) fn top_left(contour: &[Point3]) -> Option<Point3> {
    contour.iter().copied().reduce(|best, point| {
        let further_left = point.x() < best.x() - EPSILON;
        let same_column_higher = (point.x() - best.x()).abs() <= EPSILON && point.z() > best.z();
        if further_left || same_column_higher {
            point
        } else {
            best
        }
    })
}

struct Callout {
    text: String,
    position: Point3,
    center: Point3,
    length: f64,
    height: f64,
}

/// Labels every segment that has a display index.
///
/// The label sits just inside the top-left corner of the segment's front
/// face; a filled region of the segment's size is centred on the face.
pub(super) fn annotate<H: Host>(
    host: &mut H,
    config: &AnnotationConfig,
    layout: &LayoutOutput,
    view: &View,
    summary: &mut AnnotationSummary,
) -> Result<(), AhuError> {
    let offset = Vector3::new(config.label_dx(), 0.0, -config.label_dz());
    let mut callouts = Vec::new();

    for positioned in layout.elements() {
        let descriptor = positioned.descriptor();
        let Some(index) = descriptor.display_index() else {
            continue;
        };

        let faces = host.faces(positioned.element())?;
        let Some(front) = faces
            .iter()
            .filter(|face| face.normal().is_almost_equal(-Vector3::Y))
            .max_by(|a, b| a.area().total_cmp(&b.area()))
        else {
            debug!(segment:% = descriptor.id(); "No front face, skipping callout");
            continue;
        };
        let (Some(corner), Some(center)) = (
            top_left(front.contour()),
            Point3::centroid(front.contour().iter().copied()),
        ) else {
            continue;
        };

        callouts.push(Callout {
            text: index.to_string(),
            position: corner + offset,
            center,
            length: descriptor.length(),
            height: descriptor.height(),
        });
    }

    if callouts.is_empty() {
        return Ok(());
    }

    let style = TextStyle::new(config.text_size(), true);
    host.begin_transaction("Index callouts")?;
    for callout in &callouts {
        host.create_filled_region(view.id(), callout.center, callout.length, callout.height)?;
        host.create_text_note(view.id(), callout.position, &callout.text, style)?;
    }
    host.commit_transaction()?;

    summary.callouts += callouts.len();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_left_prefers_lowest_x_then_highest_z() {
        let contour = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(300.0, 0.0, 0.0),
            Point3::new(300.0, 0.0, 100.0),
            Point3::new(0.0, 0.0, 100.0),
        ];
        assert_eq!(top_left(&contour), Some(Point3::new(0.0, 0.0, 100.0)));
    }

    #[test]
    fn test_top_left_of_pinched_outline() {
        let contour = [
            Point3::new(-100.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 20.0),
            Point3::new(100.0, 0.0, 0.0),
            Point3::new(100.0, 0.0, 100.0),
            Point3::new(0.0, 0.0, 80.0),
            Point3::new(-100.0, 0.0, 100.0),
        ];
        assert_eq!(top_left(&contour), Some(Point3::new(-100.0, 0.0, 100.0)));
        assert_eq!(top_left(&[]), None);
    }
}

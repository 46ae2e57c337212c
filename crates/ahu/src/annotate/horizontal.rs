//! Length dimensions along the chain axis.

use log::{debug, warn};

use ahu_core::{
    geometry::{Axis, Bounds3, Point3, Vector3},
    host::{Face, GeomRef, Host, View, ViewKind},
};

use super::{AnnotationSummary, extreme_face, remove_zero_dimensions};
use crate::{
    config::AnnotationConfig,
    error::AhuError,
    layout::{Chain, LayoutOutput},
};

/// The two X-facing end faces of one segment.
#[derive(Debug, Clone)]
pub(super) struct EndFaces {
    left: Face,
    right: Face,
}

impl EndFaces {
    fn of(faces: &[Face]) -> Option<Self> {
        Some(Self {
            left: extreme_face(faces, -Vector3::X)?.clone(),
            right: extreme_face(faces, Vector3::X)?.clone(),
        })
    }

    fn left_x(&self) -> f64 {
        self.left.origin().x()
    }

    fn right_x(&self) -> f64 {
        self.right.origin().x()
    }
}

/// References of every dimension in one batch, and the offset level of each.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct HorizontalPlan {
    pub dimensions: Vec<(Vec<GeomRef>, f64)>,
}

/// Plans the dimensions of a chain whose segments' end faces are `ends`.
///
/// A chain with fewer than two measurable segments gets nothing. Otherwise the
/// overall span goes two steps out. With a partner chain every segment
/// and every gap of at least `gap_epsilon` gets its own dimension one step
/// out; a lone chain gets one continuous string instead.
pub(super) fn plan(
    mut ends: Vec<EndFaces>,
    other_chain_empty: bool,
    gap_epsilon: f64,
) -> HorizontalPlan {
    let mut dimensions = Vec::new();
    if ends.len() < 2 {
        return HorizontalPlan { dimensions };
    }
    ends.sort_by(|a, b| a.left_x().total_cmp(&b.left_x()));

    let leftmost = ends.iter().min_by(|a, b| a.left_x().total_cmp(&b.left_x()));
    let rightmost = ends.iter().max_by(|a, b| a.right_x().total_cmp(&b.right_x()));
    let (Some(leftmost), Some(rightmost)) = (leftmost, rightmost) else {
        return HorizontalPlan { dimensions };
    };
    dimensions.push((
        vec![leftmost.left.reference(), rightmost.right.reference()],
        2.0,
    ));

    if other_chain_empty {
        let string: Vec<GeomRef> = ends
            .first()
            .map(|first| first.left.reference())
            .into_iter()
            .chain(ends.iter().map(|end| end.right.reference()))
            .collect();
        dimensions.push((string, 1.0));
        return HorizontalPlan { dimensions };
    }

    for end in &ends {
        dimensions.push((vec![end.left.reference(), end.right.reference()], 1.0));
    }
    for pair in ends.windows(2) {
        let gap = pair[1].left_x() - pair[0].right_x();
        if gap >= gap_epsilon {
            dimensions.push((
                vec![pair[0].right.reference(), pair[1].left.reference()],
                1.0,
            ));
        }
    }

    HorizontalPlan { dimensions }
}

/// Dimensions one chain in one view.
pub(super) fn annotate_chain<H: Host>(
    host: &mut H,
    config: &AnnotationConfig,
    layout: &LayoutOutput,
    chain: Chain,
    view: &View,
    bounds: Bounds3,
    summary: &mut AnnotationSummary,
) -> Result<(), AhuError> {
    let segments = layout.chain(chain);
    if segments.len() < 2 {
        return Ok(());
    }

    let mut ends = Vec::with_capacity(segments.len());
    for positioned in segments {
        match EndFaces::of(&host.faces(positioned.element())?) {
            Some(end) => ends.push(end),
            None => warn!(
                segment:% = positioned.descriptor().id();
                "Segment has no end faces, leaving it out of the length dimensions"
            ),
        }
    }

    let other_chain_empty = layout.chain(chain.other()).is_empty();
    let HorizontalPlan { dimensions } = plan(ends, other_chain_empty, config.gap_epsilon());

    // The upper chain is dimensioned above (or behind, in plan); the lower
    // or only chain below (or in front).
    let outer = !other_chain_empty && ((chain == Chain::Intake) != layout.intake_is_below());
    let line = |level: f64| {
        let offset = level * config.offset_step();
        match view.kind() {
            ViewKind::Elevation => {
                let z = if outer {
                    bounds.max().z() + offset
                } else {
                    bounds.min().z() - offset
                };
                Axis::new(Point3::new(0.0, 0.0, z), Vector3::X)
            }
            ViewKind::Plan => {
                let y = if outer {
                    bounds.max().y().max(layout.max_width()) + offset
                } else {
                    bounds.min().y().min(0.0) - offset
                };
                Axis::new(Point3::new(0.0, y, 0.0), Vector3::X)
            }
        }
    };

    host.begin_transaction(&format!("Horizontal dimensions ({chain}, {})", view.name()))?;
    let mut created = Vec::with_capacity(dimensions.len());
    for (references, level) in &dimensions {
        created.push(host.create_dimension(view.id(), line(*level), references)?);
    }
    host.commit_transaction()?;

    summary.dimensions += created.len();
    summary.removed_zero += remove_zero_dimensions(host, view.id(), &created)?;
    debug!(
        chain:%,
        view = view.name(),
        count = created.len();
        "Horizontal dimensions placed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use ahu_core::host::ElementId;

    use super::*;

    fn end_faces(element: u32, left: f64, right: f64) -> EndFaces {
        let face = |index, x: f64, normal: Vector3| {
            Face::new(
                GeomRef::Face {
                    element: ElementId::new(element),
                    index,
                },
                normal,
                Point3::new(x, 0.0, 0.0),
                Vec::new(),
                1.0,
            )
        };
        EndFaces {
            left: face(0, left, -Vector3::X),
            right: face(1, right, Vector3::X),
        }
    }

    fn count_at(plan: &HorizontalPlan, level: f64) -> usize {
        plan.dimensions.iter().filter(|(_, l)| *l == level).count()
    }

    #[test]
    fn test_lone_chain_gets_string() {
        let plan = plan(
            vec![end_faces(2, 300.0, 700.0), end_faces(1, 0.0, 300.0)],
            true,
            0.1,
        );

        assert_eq!(plan.dimensions.len(), 2);
        let (overall, level) = &plan.dimensions[0];
        assert_eq!(*level, 2.0);
        assert_eq!(overall[0].element(), ElementId::new(1));
        assert_eq!(overall[1].element(), ElementId::new(2));
        assert_eq!(plan.dimensions[1].0.len(), 3);
    }

    #[test]
    fn test_gap_threshold() {
        let plan = plan(
            vec![
                end_faces(1, 0.0, 300.0),
                end_faces(2, 300.05, 500.0),
                end_faces(3, 500.1, 800.0),
            ],
            false,
            0.1,
        );

        // Overall, three segments and only the 0.1 gap.
        assert_eq!(count_at(&plan, 2.0), 1);
        assert_eq!(count_at(&plan, 1.0), 4);
    }

    #[test]
    fn test_empty_chain_plans_nothing() {
        assert!(plan(Vec::new(), false, 0.1).dimensions.is_empty());
    }

    #[test]
    fn test_single_segment_plans_nothing() {
        assert!(plan(vec![end_faces(1, 0.0, 300.0)], false, 0.1).dimensions.is_empty());
        assert!(plan(vec![end_faces(1, 0.0, 300.0)], true, 0.1).dimensions.is_empty());
    }

    // ===== Property Test Functions =====

    fn check_gap_dimensions_follow_epsilon(gaps: Vec<f64>) -> Result<(), TestCaseError> {
        let mut ends = Vec::with_capacity(gaps.len() + 1);
        let mut x = 0.0;
        for (index, gap) in gaps.iter().enumerate() {
            ends.push(end_faces(index as u32 + 1, x, x + 100.0));
            x += 100.0 + gap;
        }
        ends.push(end_faces(gaps.len() as u32 + 1, x, x + 100.0));

        let plan = plan(ends, false, 0.1);
        let wide_gaps = gaps.iter().filter(|gap| **gap >= 0.1).count();
        prop_assert_eq!(count_at(&plan, 1.0), gaps.len() + 1 + wide_gaps);
        prop_assert_eq!(count_at(&plan, 2.0), 1);
        Ok(())
    }

    // ===== Proptest Wrappers =====

    proptest! {
        #[test]
        fn gap_dimensions_follow_epsilon(
            gaps in prop::collection::vec(prop_oneof![0.0..0.09f64, 0.11..50.0f64], 1..8),
        ) {
            check_gap_dimensions_follow_epsilon(gaps)?;
        }
    }
}

//! Height dimensions in the elevation view.
//!
//! Each chain gets two dimensions left of its leftmost face: the full height
//! of its tallest segment three steps out, and two steps out either the
//! flexible damper's edge-to-edge height or the height of its lowest
//! segment. One more dimension, one step out, spans both chains.

use log::{debug, warn};

use ahu_core::{
    geometry::{Axis, EPSILON, Point3, Vector3},
    host::{Edge, Face, GeomRef, Host, HostError, View},
};

use super::{AnnotationSummary, extreme_face, remove_zero_dimensions};
use crate::{
    config::AnnotationConfig,
    error::AhuError,
    layout::{Chain, LayoutOutput, PositionedElement},
};

/// Top and bottom faces of one segment.
#[derive(Debug, Clone)]
struct Heights {
    index: usize,
    bottom: Face,
    top: Face,
}

impl Heights {
    fn of(index: usize, faces: &[Face]) -> Option<Self> {
        Some(Self {
            index,
            bottom: extreme_face(faces, -Vector3::Z)?.clone(),
            top: extreme_face(faces, Vector3::Z)?.clone(),
        })
    }

    fn separation(&self) -> f64 {
        self.top.origin().z() - self.bottom.origin().z()
    }
}

/// Face data of one chain, read before any annotation is created.
struct ChainHeights {
    measured: Vec<Heights>,
    all: Vec<Heights>,
    damper_edges: Option<(Edge, Edge)>,
    left_x: f64,
}

/// A planned dimension: its references and the X of its line.
type Planned = (Vec<GeomRef>, f64);

pub(super) fn annotate<H: Host>(
    host: &mut H,
    config: &AnnotationConfig,
    layout: &LayoutOutput,
    view: &View,
    summary: &mut AnnotationSummary,
) -> Result<(), AhuError> {
    let step = config.offset_step();
    let mut planned: Vec<Planned> = Vec::new();
    let mut chains = Vec::with_capacity(2);

    for chain in [Chain::Intake, Chain::Exhaust] {
        let Some(heights) = read_chain(host, layout.chain(chain), chain == Chain::Intake)? else {
            continue;
        };

        let largest = heights
            .measured
            .iter()
            .max_by(|a, b| a.separation().total_cmp(&b.separation()));
        if let Some(largest) = largest {
            planned.push((
                vec![largest.bottom.reference(), largest.top.reference()],
                heights.left_x - 3.0 * step,
            ));
        }

        if let Some((bottom, top)) = &heights.damper_edges {
            planned.push((
                vec![bottom.reference(), top.reference()],
                heights.left_x - 2.0 * step,
            ));
        } else if let Some(smallest) = heights
            .measured
            .iter()
            .min_by(|a, b| a.separation().total_cmp(&b.separation()))
        {
            planned.push((
                vec![smallest.bottom.reference(), smallest.top.reference()],
                heights.left_x - 2.0 * step,
            ));
        }

        chains.push((chain, heights));
    }

    if let [(first, first_heights), (_, second_heights)] = chains.as_slice() {
        let (below, above) = if (*first == Chain::Intake) == layout.intake_is_below() {
            (first_heights, second_heights)
        } else {
            (second_heights, first_heights)
        };
        let lowest = below
            .all
            .iter()
            .min_by(|a, b| a.bottom.origin().z().total_cmp(&b.bottom.origin().z()));
        let highest = above
            .all
            .iter()
            .max_by(|a, b| a.top.origin().z().total_cmp(&b.top.origin().z()));
        if let (Some(lowest), Some(highest)) = (lowest, highest) {
            planned.push((
                vec![lowest.bottom.reference(), highest.top.reference()],
                below.left_x.min(above.left_x) - step,
            ));
        }
    }

    if planned.is_empty() {
        return Ok(());
    }

    host.begin_transaction("Vertical dimensions")?;
    let mut created = Vec::with_capacity(planned.len());
    for (references, x) in &planned {
        let line = Axis::new(Point3::new(*x, 0.0, 0.0), Vector3::Z);
        created.push(host.create_dimension(view.id(), line, references)?);
    }
    host.commit_transaction()?;

    summary.dimensions += created.len();
    summary.removed_zero += remove_zero_dimensions(host, view.id(), &created)?;
    debug!(count = created.len(); "Vertical dimensions placed");
    Ok(())
}

/// Reads the faces and edges a chain's height dimensions need.
///
/// For the intake chain the single tallest segment is left out of the
/// candidates; its height is already the chain envelope.
fn read_chain<H: Host>(
    host: &H,
    segments: &[PositionedElement],
    skip_tallest: bool,
) -> Result<Option<ChainHeights>, HostError> {
    if segments.is_empty() {
        return Ok(None);
    }

    let tallest = skip_tallest
        .then(|| {
            segments
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| {
                    a.descriptor()
                        .height()
                        .total_cmp(&b.descriptor().height())
                })
                .map(|(index, _)| index)
        })
        .flatten();

    let mut all = Vec::with_capacity(segments.len());
    let mut left_x = f64::INFINITY;
    for (index, positioned) in segments.iter().enumerate() {
        let faces = host.faces(positioned.element())?;
        left_x = left_x.min(host.bounds(positioned.element())?.min().x());
        match Heights::of(index, &faces) {
            Some(heights) => all.push(heights),
            None => warn!(
                segment:% = positioned.descriptor().id();
                "Segment has no top or bottom face, leaving it out of the height dimensions"
            ),
        }
    }
    let measured = all
        .iter()
        .filter(|heights| Some(heights.index) != tallest)
        .cloned()
        .collect();

    let damper_edges = match segments
        .iter()
        .find(|positioned| positioned.descriptor().is_flexible_damper())
    {
        Some(damper) => extreme_edges(&host.edges(damper.element())?),
        None => None,
    };

    Ok(Some(ChainHeights {
        measured,
        all,
        damper_edges,
        left_x,
    }))
}

/// Lowest and highest level edges.
fn extreme_edges(edges: &[Edge]) -> Option<(Edge, Edge)> {
    let level = || {
        edges
            .iter()
            .filter(|edge| (edge.start().z() - edge.end().z()).abs() < EPSILON)
    };
    let bottom = level().min_by(|a, b| a.midpoint().z().total_cmp(&b.midpoint().z()))?;
    let top = level().max_by(|a, b| a.midpoint().z().total_cmp(&b.midpoint().z()))?;
    (top.midpoint().z() - bottom.midpoint().z() > EPSILON).then_some((*bottom, *top))
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use ahu_core::host::ElementId;

    use super::*;

    fn edge(index: usize, z0: f64, z1: f64) -> Edge {
        Edge::new(
            GeomRef::Edge {
                element: ElementId::new(1),
                index,
            },
            Point3::new(0.0, 0.0, z0),
            Point3::new(100.0, 0.0, z1),
        )
    }

    #[test]
    fn test_extreme_edges_ignore_sloped() {
        let edges = [
            edge(0, 10.0, 10.0),
            edge(1, -50.0, 200.0),
            edge(2, 90.0, 90.0),
            edge(3, 50.0, 50.0),
        ];
        let (bottom, top) = extreme_edges(&edges).unwrap();

        assert_approx_eq!(f64, bottom.midpoint().z(), 10.0);
        assert_approx_eq!(f64, top.midpoint().z(), 90.0);
    }

    #[test]
    fn test_extreme_edges_need_height() {
        assert!(extreme_edges(&[edge(0, 5.0, 5.0)]).is_none());
        assert!(extreme_edges(&[]).is_none());
    }
}

//! Horizontal placement of the intake and exhaust chains.

use indexmap::IndexMap;
use log::{debug, trace};

use ahu_core::{
    geometry::{EPSILON, Point2},
    host::{ElementId, Host, HostError},
    identifier::Id,
    segment::{CutInfo, SegmentDescriptor, ServiceSide, derive_cut_info},
    sketch::{Loop, Profile, SketchPlane},
};

use super::{
    Chain, PositionedElement,
    envelope::{Band, Envelope, total_length},
    fittings,
    frame::{self, FramePlacement},
};
use crate::config::LayoutConfig;

/// Frame overlay settings for one chain.
#[derive(Debug, Clone, Copy)]
pub(super) struct FrameSpan {
    placement: FramePlacement,
    depth: f64,
}

impl FrameSpan {
    pub(super) fn new(placement: FramePlacement, depth: f64) -> Self {
        Self { placement, depth }
    }

    fn applies(&self) -> bool {
        self.placement == FramePlacement::Beneath && self.depth > EPSILON
    }
}

/// Per-chain placement parameters.
pub(super) struct ChainContext<'a> {
    pub config: &'a LayoutConfig,
    pub chain: Chain,
    pub band: Band,
    pub envelope: Envelope,
    pub service_side: ServiceSide,
    pub frame: FrameSpan,
}

/// Where an intake child landed: the owning segment's start, length and cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Alignment {
    pub start_x: f64,
    pub length: f64,
    pub cut: CutInfo,
    /// Index of the owning segment in the intake output.
    pub segment: usize,
}

/// Intake child id to placement, in intake order.
pub(super) type AlignmentTable = IndexMap<Id, Alignment>;

impl ChainContext<'_> {
    /// Extrudes one segment with its stubs and frame overlay.
    fn place<H: Host>(
        &self,
        host: &mut H,
        segment: &SegmentDescriptor,
        start_x: f64,
    ) -> Result<PositionedElement, HostError> {
        let mut descriptor = segment.clone();
        descriptor.refresh_cut_info();
        let base_z = self.band.base_z(&descriptor);

        let profile = segment_profile(&descriptor, start_x, base_z, self.envelope.height());
        let element = host.extrude(&profile, &SketchPlane::elevation(0.0), descriptor.width())?;

        let mut attachments = Vec::new();
        if descriptor.carries_stubs() {
            attachments.extend(fittings::add_stubs(
                host,
                &descriptor,
                start_x,
                base_z,
                self.service_side,
                self.config,
            )?);
        }
        if self.frame.applies() {
            attachments.push(self.add_frame(host, start_x, descriptor.length(), descriptor.width())?);
        }

        debug!(
            chain:% = self.chain,
            segment:% = descriptor.id(),
            start_x,
            base_z,
            element:%;
            "Segment placed"
        );

        Ok(PositionedElement {
            chain: self.chain,
            element,
            descriptor,
            attachments,
            start_x,
            base_z,
        })
    }

    /// Frame overlay hanging below the chain's band.
    fn add_frame<H: Host>(
        &self,
        host: &mut H,
        start_x: f64,
        length: f64,
        width: f64,
    ) -> Result<ElementId, HostError> {
        let profile = frame::frame_profile(
            start_x,
            length,
            self.band.bottom(),
            self.frame.depth,
            self.config,
        );
        let element = host.extrude(&profile, &SketchPlane::elevation(0.0), width)?;
        trace!(start_x, length, element:%; "Frame overlay extruded");
        Ok(element)
    }

    /// Lays `segments` left to right from `start_x`.
    ///
    /// A plate heat-recovery segment with a left cut starts `cut_depth` early so
    /// its left neighbour nests into the notch; one with a right cut pulls the
    /// next segment back by the same amount.
    fn lay_run<H: Host>(
        &self,
        host: &mut H,
        segments: &[SegmentDescriptor],
        start_x: f64,
        mut on_placed: impl FnMut(&PositionedElement, usize),
    ) -> Result<Vec<PositionedElement>, HostError> {
        let mut x = start_x;
        let mut placed = Vec::with_capacity(segments.len());
        for segment in segments {
            let cut = derive_cut_info(segment.children());
            x -= cut.left_depth();
            let positioned = self.place(host, segment, x)?;
            on_placed(&positioned, placed.len());
            x += segment.length() - cut.right_depth();
            placed.push(positioned);
        }
        Ok(placed)
    }
}

/// Lays the intake chain centred on X = 0 and records every child's placement.
pub(super) fn lay_intake<H: Host>(
    host: &mut H,
    context: &ChainContext<'_>,
    segments: &[SegmentDescriptor],
    alignments: &mut AlignmentTable,
) -> Result<Vec<PositionedElement>, HostError> {
    let start_x = -total_length(segments) / 2.0;
    context.lay_run(host, segments, start_x, |positioned, index| {
        let descriptor = positioned.descriptor();
        for child in descriptor.children() {
            alignments.entry(child.id()).or_insert(Alignment {
                start_x: positioned.start_x(),
                length: descriptor.length(),
                cut: descriptor.cut_info(),
                segment: index,
            });
        }
    })
}

/// Lays the exhaust chain against the intake.
///
/// The first exhaust segment with a child already placed by the intake is the
/// pivot. It and the contiguous shared segments after it belong to the intake
/// and are not extruded again; the segments before the pivot end at the
/// pivot's X and those after the shared block run rightwards from its end.
/// Both runs nest plate cuts the same way the intake does. Without a pivot the chain is centred on its own.
///
/// When this chain is the one that gets frame overlays, the shared span gets
/// them too, sized from the intake segments and attached to them.
pub(super) fn lay_exhaust<H: Host>(
    host: &mut H,
    context: &ChainContext<'_>,
    segments: &[SegmentDescriptor],
    alignments: &AlignmentTable,
    intake: &mut [PositionedElement],
) -> Result<Vec<PositionedElement>, HostError> {
    let alignment_of = |segment: &SegmentDescriptor| {
        segment
            .children()
            .iter()
            .find_map(|child| alignments.get(&child.id()))
            .copied()
    };

    let Some(pivot) = segments
        .iter()
        .position(|segment| alignment_of(segment).is_some())
    else {
        debug!(segments = segments.len(); "Exhaust shares nothing with intake, centring it");
        let start_x = -total_length(segments) / 2.0;
        return context.lay_run(host, segments, start_x, |_, _| {});
    };

    let shared_end = pivot
        + segments[pivot..]
            .iter()
            .take_while(|segment| alignment_of(*segment).is_some())
            .count();
    let shared = &segments[pivot..shared_end];

    // Several exhaust segments may map onto the same intake segment.
    let mut spans: Vec<Alignment> = shared.iter().filter_map(alignment_of).collect();
    spans.dedup_by_key(|alignment| alignment.segment);

    let pivot_x = spans.first().map_or(0.0, |alignment| alignment.start_x);
    let shared_length: f64 = spans.iter().map(|alignment| alignment.length).sum();
    let own_cuts: Vec<CutInfo> = shared
        .iter()
        .map(|segment| derive_cut_info(segment.children()))
        .collect();
    let left_cut = spans
        .iter()
        .map(|alignment| alignment.cut)
        .chain(own_cuts.iter().copied())
        .map(|cut| cut.left_depth())
        .fold(0.0, f64::max);
    let right_cut = spans
        .iter()
        .map(|alignment| alignment.cut)
        .chain(own_cuts.iter().copied())
        .map(|cut| cut.right_depth())
        .fold(0.0, f64::max);

    debug!(
        pivot,
        shared = shared.len(),
        pivot_x,
        shared_length,
        left_cut,
        right_cut;
        "Exhaust anchored to intake"
    );

    // The left run ends inside the pivot's left notch.
    let left_run = &segments[..pivot];
    let left_advance: f64 = left_run
        .iter()
        .map(|segment| {
            let cut = derive_cut_info(segment.children());
            segment.length() - cut.left_depth() - cut.right_depth()
        })
        .sum();
    let mut placed =
        context.lay_run(host, left_run, pivot_x + left_cut - left_advance, |_, _| {})?;

    let right_start = pivot_x + shared_length - right_cut;
    placed.extend(context.lay_run(host, &segments[shared_end..], right_start, |_, _| {})?);

    if context.frame.applies() {
        for alignment in &spans {
            let Some(owner) = intake.get_mut(alignment.segment) else {
                continue;
            };
            let frame = context.add_frame(
                host,
                alignment.start_x,
                alignment.length,
                owner.descriptor().width(),
            )?;
            owner.attachments.push(frame);
        }
    }

    Ok(placed)
}

/// Sketch outline of a segment body.
pub(super) fn segment_profile(
    segment: &SegmentDescriptor,
    start_x: f64,
    base_z: f64,
    envelope_height: f64,
) -> Profile {
    let origin = Point2::new(start_x, base_z);
    let (length, height) = (segment.length(), segment.height());

    if segment.is_flexible_damper() {
        return Profile::new(pinched_outline(origin, length, height));
    }
    let cut = segment.cut_info();
    if cut.is_cut() {
        return Profile::new(notched_outline(origin, length, height, envelope_height, cut));
    }
    Profile::new(Loop::rectangle(origin, length, height))
}

/// Six-point outline of a flexible damper, waisted at mid-length.
fn pinched_outline(origin: Point2, length: f64, height: f64) -> Loop {
    let inset = height / 5.0;
    Loop::polygon(&[
        origin,
        origin.offset(length / 2.0, inset),
        origin.offset(length, 0.0),
        origin.offset(length, height),
        origin.offset(length / 2.0, height - inset),
        origin.offset(0.0, height),
    ])
}

/// Rectangle with its cut top corners notched by `cut_depth × envelope height`.
///
/// A notch as tall as the segment removes the whole end strip, leaving a
/// shorter rectangle.
fn notched_outline(
    origin: Point2,
    length: f64,
    height: f64,
    envelope_height: f64,
    cut: CutInfo,
) -> Loop {
    let notch = envelope_height.min(height);
    let (left, right) = (cut.left_depth(), cut.right_depth());
    let (x0, x1) = (origin.u(), origin.u() + length);
    let (z0, z1) = (origin.v(), origin.v() + height);

    if notch >= height - EPSILON {
        return Loop::rectangle(Point2::new(x0 + left, z0), length - left - right, height);
    }

    let mut points = vec![Point2::new(x0, z0), Point2::new(x1, z0)];
    if right > 0.0 {
        points.extend([
            Point2::new(x1, z1 - notch),
            Point2::new(x1 - right, z1 - notch),
            Point2::new(x1 - right, z1),
        ]);
    } else {
        points.push(Point2::new(x1, z1));
    }
    if left > 0.0 {
        points.extend([
            Point2::new(x0 + left, z1),
            Point2::new(x0 + left, z1 - notch),
            Point2::new(x0, z1 - notch),
        ]);
    } else {
        points.push(Point2::new(x0, z1));
    }

    Loop::polygon(&points)
}

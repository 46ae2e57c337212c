//! Layout engine: turns two segment chains into solids.
//!
//! The engine walks the intake chain left to right from `-total_length / 2`,
//! recording where every child component landed. The exhaust chain is then
//! anchored to the first segment it shares with the intake (or centred on its
//! own when it shares nothing), and finally terminal runs of end elements are
//! swung round to follow their fan's discharge direction.
//!
//! All geometry lives in the [`Host`]; the engine only keeps the
//! [`PositionedElement`] handles it needs to hand to the annotation engine.

mod chain;
mod envelope;
mod fittings;
mod frame;
mod reorient;

use std::fmt;

use log::{debug, info};

use ahu_catalogue::Catalogue;
use ahu_core::{
    host::{ElementId, Host},
    segment::SegmentDescriptor,
};

pub use envelope::{Band, Envelope, total_length};
pub use frame::{FrameHoles, FramePlacement, FrameQuery, LengthBucket};

use crate::{config::LayoutConfig, error::AhuError};

use chain::{ChainContext, FrameSpan};

/// One of the two airflow paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Intake,
    Exhaust,
}

impl Chain {
    pub fn other(self) -> Self {
        match self {
            Self::Intake => Self::Exhaust,
            Self::Exhaust => Self::Intake,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intake => write!(f, "intake"),
            Self::Exhaust => write!(f, "exhaust"),
        }
    }
}

/// A segment solid together with the descriptor it was built from.
#[derive(Debug, Clone)]
pub struct PositionedElement {
    chain: Chain,
    element: ElementId,
    descriptor: SegmentDescriptor,
    attachments: Vec<ElementId>,
    start_x: f64,
    base_z: f64,
}

impl PositionedElement {
    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// The segment body.
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Descriptor with its cut info filled in.
    pub fn descriptor(&self) -> &SegmentDescriptor {
        &self.descriptor
    }

    /// Stubs and frame overlays that move with the body.
    pub fn attachments(&self) -> &[ElementId] {
        &self.attachments
    }

    /// X of the body's left end as first placed, before any reorientation.
    pub fn start_x(&self) -> f64 {
        self.start_x
    }

    /// Z of the body's underside as first placed.
    pub fn base_z(&self) -> f64 {
        self.base_z
    }

    /// Body followed by its attachments.
    pub fn all_elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::once(self.element).chain(self.attachments.iter().copied())
    }
}

/// Everything the annotation engine needs from a layout.
#[derive(Debug, Clone, Default)]
pub struct LayoutOutput {
    intake: Vec<PositionedElement>,
    exhaust: Vec<PositionedElement>,
    intake_envelope: Envelope,
    exhaust_envelope: Envelope,
    intake_is_below: bool,
    reoriented_runs: usize,
}

impl LayoutOutput {
    /// Intake segments in chain order.
    pub fn intake(&self) -> &[PositionedElement] {
        &self.intake
    }

    /// Exhaust segments in chain order, without the ones owned by the intake.
    pub fn exhaust(&self) -> &[PositionedElement] {
        &self.exhaust
    }

    pub fn chain(&self, chain: Chain) -> &[PositionedElement] {
        match chain {
            Chain::Intake => &self.intake,
            Chain::Exhaust => &self.exhaust,
        }
    }

    /// Intake then exhaust segments.
    pub fn elements(&self) -> impl Iterator<Item = &PositionedElement> {
        self.intake.iter().chain(self.exhaust.iter())
    }

    pub fn intake_is_below(&self) -> bool {
        self.intake_is_below
    }

    pub fn intake_max_height(&self) -> f64 {
        self.intake_envelope.height()
    }

    pub fn exhaust_max_height(&self) -> f64 {
        self.exhaust_envelope.height()
    }

    pub fn max_width(&self) -> f64 {
        self.intake_envelope.width().max(self.exhaust_envelope.width())
    }

    /// Number of end-element runs turned to follow a discharge direction.
    pub fn reoriented_runs(&self) -> usize {
        self.reoriented_runs
    }
}

/// Builds segment geometry in a [`Host`].
#[derive(Debug, Clone, Copy)]
pub struct LayoutEngine<'a> {
    config: &'a LayoutConfig,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self { config }
    }

    /// Extrudes both chains of `catalogue` into `host`.
    ///
    /// Runs as a sequence of committed transactions: the intake chain, the
    /// exhaust chain, then the rotate and translate halves of end-segment
    /// reorientation.
    ///
    /// # Errors
    ///
    /// Returns [`AhuError::Host`] if the host rejects an operation.
    pub fn build_geometry<H: Host>(
        &self,
        host: &mut H,
        catalogue: &Catalogue,
    ) -> Result<LayoutOutput, AhuError> {
        let intake = catalogue.intake();
        let exhaust = catalogue.exhaust();
        let (intake_envelope, exhaust_envelope) =
            envelope::resolve(Envelope::of_chain(intake), Envelope::of_chain(exhaust));
        let stacked = !intake.is_empty() && !exhaust.is_empty();
        let (intake_band, exhaust_band) = Band::pair(
            intake_envelope.height(),
            exhaust_envelope.height(),
            catalogue.intake_is_below(),
            stacked,
        );
        debug!(
            intake_height = intake_envelope.height(),
            exhaust_height = exhaust_envelope.height(),
            intake_bottom = intake_band.bottom(),
            exhaust_bottom = exhaust_band.bottom();
            "Resolved chain envelopes"
        );

        let lower_chain = if catalogue.intake_is_below() {
            Chain::Intake
        } else {
            Chain::Exhaust
        };
        let frame_depth = catalogue.frame_height();
        let frame_placement = |side: Chain, other_empty: bool| {
            FrameQuery {
                lower_chain,
                side,
                other_chain_empty: other_empty,
                depth_qualifies: frame_depth >= self.config.min_frame_depth(),
            }
            .placement()
        };

        let intake_context = ChainContext {
            config: self.config,
            chain: Chain::Intake,
            band: intake_band,
            envelope: intake_envelope,
            service_side: catalogue.service_side_intake(),
            frame: FrameSpan::new(frame_placement(Chain::Intake, exhaust.is_empty()), frame_depth),
        };
        let exhaust_context = ChainContext {
            config: self.config,
            chain: Chain::Exhaust,
            band: exhaust_band,
            envelope: exhaust_envelope,
            service_side: catalogue.service_side_exhaust(),
            frame: FrameSpan::new(frame_placement(Chain::Exhaust, intake.is_empty()), frame_depth),
        };

        let mut output = LayoutOutput {
            intake_envelope,
            exhaust_envelope,
            intake_is_below: catalogue.intake_is_below(),
            ..LayoutOutput::default()
        };

        let mut alignments = chain::AlignmentTable::new();
        if !intake.is_empty() {
            host.begin_transaction("Build intake geometry")?;
            output.intake = chain::lay_intake(host, &intake_context, intake, &mut alignments)?;
            host.commit_transaction()?;
        }

        if !exhaust.is_empty() {
            host.begin_transaction("Build exhaust geometry")?;
            output.exhaust = chain::lay_exhaust(
                host,
                &exhaust_context,
                exhaust,
                &alignments,
                &mut output.intake,
            )?;
            host.commit_transaction()?;
        }

        output.reoriented_runs = reorient::reorient_end_runs(
            host,
            [
                (&output.intake[..], catalogue.service_side_intake()),
                (&output.exhaust[..], catalogue.service_side_exhaust()),
            ],
        )?;

        info!(
            intake = output.intake.len(),
            exhaust = output.exhaust.len(),
            reoriented = output.reoriented_runs,
            max_width = output.max_width();
            "Layout built"
        );

        Ok(output)
    }
}

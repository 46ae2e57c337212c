//! Chain envelopes and vertical bands.

use ahu_core::segment::SegmentDescriptor;

/// Height and width of a chain's tallest and widest envelope segments.
///
/// Heat-recovery and recirculator segments span both chains and are left out.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Envelope {
    height: f64,
    width: f64,
}

impl Envelope {
    pub fn new(height: f64, width: f64) -> Self {
        Self { height, width }
    }

    /// Envelope of `chain`, or `None` when it has no envelope segments.
    pub fn of_chain(chain: &[SegmentDescriptor]) -> Option<Self> {
        chain
            .iter()
            .filter(|segment| segment.is_envelope())
            .fold(None, |envelope: Option<Self>, segment| {
                let current = envelope.unwrap_or_default();
                Some(Self {
                    height: current.height.max(segment.height()),
                    width: current.width.max(segment.width()),
                })
            })
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn width(&self) -> f64 {
        self.width
    }
}

/// Fills a missing envelope from the other chain; zero when both are missing.
pub(super) fn resolve(intake: Option<Envelope>, exhaust: Option<Envelope>) -> (Envelope, Envelope) {
    let intake_envelope = intake.or(exhaust).unwrap_or_default();
    let exhaust_envelope = exhaust.unwrap_or(intake_envelope);
    (intake_envelope, exhaust_envelope)
}

/// Sum of segment lengths.
pub fn total_length(chain: &[SegmentDescriptor]) -> f64 {
    chain.iter().map(SegmentDescriptor::length).sum()
}

/// The vertical slot a chain occupies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    bottom: f64,
    height: f64,
}

impl Band {
    pub fn new(bottom: f64, height: f64) -> Self {
        Self { bottom, height }
    }

    /// Bands for both chains.
    ///
    /// Stacked chains meet at Z = 0, the intake below or above per
    /// `intake_is_below`. A lone chain is centred on Z = 0.
    pub fn pair(
        intake_height: f64,
        exhaust_height: f64,
        intake_is_below: bool,
        stacked: bool,
    ) -> (Self, Self) {
        if !stacked {
            return (
                Self::new(-intake_height / 2.0, intake_height),
                Self::new(-exhaust_height / 2.0, exhaust_height),
            );
        }

        if intake_is_below {
            (
                Self::new(-intake_height, intake_height),
                Self::new(0.0, exhaust_height),
            )
        } else {
            (
                Self::new(0.0, intake_height),
                Self::new(-exhaust_height, exhaust_height),
            )
        }
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    pub fn top(&self) -> f64 {
        self.bottom + self.height
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Z of the segment's underside.
    ///
    /// End elements are centred in the band. Everything else sits on the band
    /// bottom, except segments taller than the band which are pushed down by
    /// the excess so their tops stay level with the band top.
    pub fn base_z(&self, segment: &SegmentDescriptor) -> f64 {
        if segment.is_end_element() {
            return self.bottom + (self.height - segment.height()) / 2.0;
        }
        self.bottom - (segment.height() - self.height).max(0.0)
    }
}

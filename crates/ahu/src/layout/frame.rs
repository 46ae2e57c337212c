//! External frame overlays.
//!
//! Whether a segment gets a frame overlay is a pure decision over four
//! facts ([`FrameQuery`]); the cut-outs punched into the overlay depend only
//! on the segment length ([`LengthBucket`]).

use ahu_core::{
    geometry::{EPSILON, Point2},
    sketch::{Loop, Profile},
};

use super::Chain;
use crate::config::LayoutConfig;

/// Inputs of the frame placement decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameQuery {
    /// Chain that sits below the other one.
    pub lower_chain: Chain,
    /// Chain the segment belongs to.
    pub side: Chain,
    pub other_chain_empty: bool,
    /// Whether the global frame depth reaches the configured minimum.
    pub depth_qualifies: bool,
}

/// Outcome of a [`FrameQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePlacement {
    /// Overlay the frame under the segment.
    Beneath,
    Omitted,
}

impl FrameQuery {
    /// The frame runs under the lower chain only, or under a lone chain.
    pub fn placement(self) -> FramePlacement {
        if !self.depth_qualifies {
            return FramePlacement::Omitted;
        }

        match (self.lower_chain, self.side, self.other_chain_empty) {
            (_, _, true) => FramePlacement::Beneath,
            (Chain::Intake, Chain::Intake, false) | (Chain::Exhaust, Chain::Exhaust, false) => {
                FramePlacement::Beneath
            }
            (Chain::Intake, Chain::Exhaust, false) | (Chain::Exhaust, Chain::Intake, false) => {
                FramePlacement::Omitted
            }
        }
    }
}

/// Segment length classes that pick the frame cut-outs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthBucket {
    /// Under 200 mm: one keyhole.
    Short,
    /// 200 to 500 mm: one wide slot.
    Medium,
    /// 500 mm and over: two slots near the ends.
    Long,
}

impl LengthBucket {
    pub fn classify(length: f64) -> Self {
        if length < 200.0 {
            Self::Short
        } else if length < 500.0 {
            Self::Medium
        } else {
            Self::Long
        }
    }
}

/// Cut-outs of one frame overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameHoles {
    None,
    Keyhole(Loop),
    WideSlot(Loop),
    EndSlots(Loop, Loop),
}

impl FrameHoles {
    /// Holes for a frame span `[start_x, start_x + length]` whose vertical
    /// centre is `center_z` and whose depth is `depth`.
    pub fn for_span(
        start_x: f64,
        length: f64,
        center_z: f64,
        depth: f64,
        config: &LayoutConfig,
    ) -> Self {
        let center = Point2::new(start_x + length / 2.0, center_z);
        match LengthBucket::classify(length) {
            LengthBucket::Short => {
                let head_radius = (depth * 0.2).min(length * 0.25);
                if head_radius <= EPSILON {
                    return Self::None;
                }
                Self::Keyhole(Loop::keyhole(center, head_radius, head_radius, depth * 0.6))
            }
            LengthBucket::Medium => Self::WideSlot(Loop::obround(
                center,
                config.wide_slot_length().min(length * 0.6),
                depth * 0.4,
            )),
            LengthBucket::Long => {
                let inset = config.end_slot_inset().min(length / 4.0);
                let slot = config.end_slot_length().min(inset * 1.5);
                let left = Point2::new(start_x + inset, center_z);
                let right = Point2::new(start_x + length - inset, center_z);
                Self::EndSlots(
                    Loop::obround(left, slot, depth * 0.4),
                    Loop::obround(right, slot, depth * 0.4),
                )
            }
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Keyhole(_) | Self::WideSlot(_) => 1,
            Self::EndSlots(..) => 2,
        }
    }

    fn into_loops(self) -> Vec<Loop> {
        match self {
            Self::None => Vec::new(),
            Self::Keyhole(hole) | Self::WideSlot(hole) => vec![hole],
            Self::EndSlots(left, right) => vec![left, right],
        }
    }
}

/// Frame overlay outline: a `length × depth` plate hanging below `top_z`,
/// with its length-bucket cut-outs.
pub(super) fn frame_profile(
    start_x: f64,
    length: f64,
    top_z: f64,
    depth: f64,
    config: &LayoutConfig,
) -> Profile {
    let outer = Loop::rectangle(Point2::new(start_x, top_z - depth), length, depth);
    FrameHoles::for_span(start_x, length, top_z - depth / 2.0, depth, config)
        .into_loops()
        .into_iter()
        .fold(Profile::new(outer), Profile::with_hole)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(
        lower_chain: Chain,
        side: Chain,
        other_chain_empty: bool,
        depth_qualifies: bool,
    ) -> FrameQuery {
        FrameQuery {
            lower_chain,
            side,
            other_chain_empty,
            depth_qualifies,
        }
    }

    #[test]
    fn test_frame_placement_table() {
        use Chain::{Exhaust, Intake};
        use FramePlacement::{Beneath, Omitted};

        let table = [
            (Intake, Intake, false, false, Omitted),
            (Intake, Intake, false, true, Beneath),
            (Intake, Intake, true, false, Omitted),
            (Intake, Intake, true, true, Beneath),
            (Intake, Exhaust, false, false, Omitted),
            (Intake, Exhaust, false, true, Omitted),
            (Intake, Exhaust, true, false, Omitted),
            (Intake, Exhaust, true, true, Beneath),
            (Exhaust, Intake, false, false, Omitted),
            (Exhaust, Intake, false, true, Omitted),
            (Exhaust, Intake, true, false, Omitted),
            (Exhaust, Intake, true, true, Beneath),
            (Exhaust, Exhaust, false, false, Omitted),
            (Exhaust, Exhaust, false, true, Beneath),
            (Exhaust, Exhaust, true, false, Omitted),
            (Exhaust, Exhaust, true, true, Beneath),
        ];

        for (lower, side, other_empty, qualifies, expected) in table {
            assert_eq!(
                query(lower, side, other_empty, qualifies).placement(),
                expected,
                "lower={lower} side={side} other_empty={other_empty} qualifies={qualifies}"
            );
        }
    }

    #[test]
    fn test_length_bucket_boundaries() {
        assert_eq!(LengthBucket::classify(0.0), LengthBucket::Short);
        assert_eq!(LengthBucket::classify(199.9), LengthBucket::Short);
        assert_eq!(LengthBucket::classify(200.0), LengthBucket::Medium);
        assert_eq!(LengthBucket::classify(499.9), LengthBucket::Medium);
        assert_eq!(LengthBucket::classify(500.0), LengthBucket::Long);
    }

    #[test]
    fn test_hole_counts_follow_bucket() {
        let config = LayoutConfig::default();

        assert_eq!(FrameHoles::for_span(0.0, 150.0, 0.0, 100.0, &config).count(), 1);
        assert_eq!(FrameHoles::for_span(0.0, 300.0, 0.0, 100.0, &config).count(), 1);
        assert_eq!(FrameHoles::for_span(0.0, 900.0, 0.0, 100.0, &config).count(), 2);
        assert_eq!(FrameHoles::for_span(0.0, 0.0, 0.0, 100.0, &config).count(), 0);
    }

    #[test]
    fn test_end_slots_stay_inside_span() {
        let config = LayoutConfig::default();
        let FrameHoles::EndSlots(left, right) =
            FrameHoles::for_span(-450.0, 900.0, -50.0, 100.0, &config)
        else {
            panic!("expected two slots");
        };

        for hole in [left, right] {
            for point in hole.tessellate() {
                assert!(point.u() > -450.0 && point.u() < 450.0);
                assert!(point.v() > -100.0 && point.v() < 0.0);
            }
        }
    }

    #[test]
    fn test_frame_profile_hangs_below_top() {
        let config = LayoutConfig::default();
        let profile = frame_profile(0.0, 300.0, -75.0, 100.0, &config);
        let outer = profile.outer().tessellate();

        let min_v = outer.iter().map(|p| p.v()).fold(f64::INFINITY, f64::min);
        let max_v = outer.iter().map(|p| p.v()).fold(f64::NEG_INFINITY, f64::max);
        assert_eq!((min_v, max_v), (-175.0, -75.0));
        assert_eq!(profile.holes().len(), 1);
    }
}

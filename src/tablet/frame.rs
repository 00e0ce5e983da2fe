//! Per-frame snapshot state the dispatch state machine diffs against on every flush.

use super::axis::TabletAxis;
use super::tool::ToolKind;
use bitflags::bitflags;

bitflags! {
    /// Status flags carried on a [`Snapshot`], tracked between flushes.
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub struct Status: u8 {
        /// At least one axis has a pending value since the last flush. Level-triggered, cleared
        /// once the axis notification for the frame is emitted.
        const AXES_UPDATED = 1 << 0;
        /// The stylus tip is physically touching the tablet surface. Level-triggered, mirrors the
        /// last `BTN_TOUCH` value seen.
        const STYLUS_IN_CONTACT = 1 << 1;
        /// The in-proximity tool just left proximity. Edge-triggered: set by `update_tool`,
        /// consumed by the very next flush.
        const TOOL_LEFT_PROXIMITY = 1 << 2;
    }
}

/// A point-in-time snapshot of tool identity, button state, and axis values.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tool_type: ToolKind,
    pub tool_serial: u32,
    pub stylus_buttons: u32,
    pub pad_buttons: u32,
    pub axis_values: [f64; TabletAxis::COUNT],
    pub status: Status,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            tool_type: ToolKind::None,
            tool_serial: 0,
            stylus_buttons: 0,
            pad_buttons: 0,
            axis_values: [0.0; TabletAxis::COUNT],
            status: Status::empty(),
        }
    }
}

/// The current/previous snapshot pair a [`super::TabletDispatch`] diffs against between flushes.
///
/// `pending_raw` holds not-yet-normalized axis values as they arrive; normalization against the
/// device's current [`super::AxisInfo`] happens lazily, at flush time.
#[derive(Debug, Default)]
pub struct FrameState {
    pub current: Snapshot,
    pub previous: Snapshot,
    pub changed_axes: super::axis::AxisSet,
    pub pending_raw: [i32; TabletAxis::COUNT],
}

/// Bits newly set in `current` relative to `previous`.
pub fn pressed(current_mask: u32, previous_mask: u32) -> u32 {
    current_mask & !previous_mask
}

/// Bits newly cleared in `current` relative to `previous`.
pub fn released(current_mask: u32, previous_mask: u32) -> u32 {
    previous_mask & !current_mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_and_released_are_disjoint() {
        let previous = 0b0110;
        let current = 0b1010;
        assert_eq!(pressed(current, previous), 0b1000);
        assert_eq!(released(current, previous), 0b0100);
    }
}

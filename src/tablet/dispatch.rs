//! The tablet dispatch state machine: classifies raw events, accumulates frame state, and emits
//! ordered semantic notifications on `SYN_REPORT`.

use std::time::SystemTime;

use crate::{AbsoluteAxisCode, InputEvent, InputEventKind, KeyCode, MiscCode, SynchronizationCode};

use super::axis::{AxisInfo, AxisSet, AxisSource, TabletAxis};
use super::frame::{pressed, released, FrameState, Status};
use super::tool::{ToolHandle, ToolKind, ToolRegistry};

const STYLUS_BUTTON_BASE: u16 = KeyCode::BTN_TOUCH.0;
const STYLUS_BUTTON_COUNT: u16 = 3; // BTN_TOUCH, BTN_STYLUS, BTN_STYLUS2
const PAD_BUTTON_BASE: u16 = KeyCode::BTN_0.0;
const PAD_BUTTON_COUNT: u16 = 7; // BTN_0..=BTN_6

/// Whether a button notification is reporting a press or a release.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Receives the ordered notifications a [`TabletDispatch`] produces on each `SYN_REPORT`.
///
/// All callbacks take the flush's timestamp, taken verbatim from the `SYN_REPORT` event that
/// triggered it.
pub trait TabletEventSink {
    /// The in-proximity tool just left proximity; all transient state has been reset.
    fn proximity_out(&mut self, time: SystemTime);
    /// A new tool has entered proximity, or the current tool's identity changed.
    fn tool_update(&mut self, time: SystemTime, tool: ToolHandle);
    /// One or more axes changed value this frame.
    fn axis(&mut self, time: SystemTime, changed: AxisSet, values: [f64; TabletAxis::COUNT]);
    /// A stylus or pad button changed state.
    fn button(&mut self, time: SystemTime, code: u16, state: ButtonState);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ButtonGroup {
    Stylus,
    Pad,
}

/// Normalizes a raw axis sample against the device's reported range.
///
/// `X`/`Y`/`Distance` pass through unchanged. `Pressure` is rescaled, nominally into `[0, 1]`.
/// `TiltX`/`TiltY` are rescaled, nominally into `[-1, 1]`. Both rescaled formulas add
/// `info.minimum` rather than subtract it: that mirrors the reference behavior this core
/// replicates, bug and all, rather than the textbook min-max normalization one might expect. For
/// an axis whose reported `minimum` is nonzero this pushes the result outside its nominal range;
/// that is preserved verbatim, not clamped away, since no consumer here opts into a correction.
fn normalize(axis: TabletAxis, raw: i32, info: AxisInfo) -> f64 {
    let span = (info.maximum - info.minimum + 1) as f64;
    match axis {
        TabletAxis::X | TabletAxis::Y | TabletAxis::Distance => raw as f64,
        TabletAxis::Pressure => (raw as f64 + info.minimum as f64) / span,
        TabletAxis::TiltX | TabletAxis::TiltY => {
            let v = (raw as f64 + info.minimum as f64) / span;
            2.0 * v - 1.0
        }
    }
}

/// Per-device tablet event dispatch state machine.
///
/// Owns an [`AxisSource`] for static axis metadata, a [`ToolRegistry`] for tool identity, and the
/// [`FrameState`] accumulated between `SYN_REPORT`s. Generic over the axis source so it can be
/// driven in tests without a real device node; [`super::TabletDevice`] supplies
/// [`crate::raw_stream::RawDevice`] as `S` for real use.
#[derive(Debug)]
pub struct TabletDispatch<S: AxisSource> {
    source: S,
    frame: FrameState,
    registry: ToolRegistry,
}

impl<S: AxisSource> TabletDispatch<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            frame: FrameState::default(),
            registry: ToolRegistry::new(),
        }
    }

    /// The axis source this dispatch was built with.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the axis source, for device wrappers that need to drive I/O through it.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Feeds one raw input event through the state machine.
    ///
    /// While the most recently announced tool has left proximity (edge recorded by
    /// [`Status::TOOL_LEFT_PROXIMITY`]), every non-synchronization event is dropped: the proximity
    /// flush already reset transient state, and the device is expected to resync with a fresh
    /// tool announcement before reporting anything else.
    pub fn process(&mut self, event: InputEvent, sink: &mut dyn TabletEventSink) {
        let kind = event.kind();
        let is_sync = matches!(kind, InputEventKind::Synchronization(_));

        if !is_sync && self.frame.current.status.contains(Status::TOOL_LEFT_PROXIMITY) {
            return;
        }

        match kind {
            InputEventKind::AbsAxis(code) => self.process_abs(code, event.value()),
            InputEventKind::Key(code) => self.process_key(code, event.value()),
            InputEventKind::Misc(code) => self.process_misc(code, event.value()),
            InputEventKind::Synchronization(code) => {
                if code == SynchronizationCode::SYN_REPORT {
                    self.flush(event.timestamp(), sink);
                }
            }
            _ => {
                log::error!(
                    "tablet: unexpected event type {:?} reached the dispatch core",
                    event.event_type()
                );
            }
        }
    }

    /// Releases every tool this dispatch has interned. Call when the owning device is removed.
    pub fn destroy(&mut self) {
        self.registry.destroy_all();
    }

    fn process_abs(&mut self, code: AbsoluteAxisCode, value: i32) {
        match TabletAxis::from_code(code) {
            Some(axis) => {
                self.frame.pending_raw[axis as usize] = value;
                self.frame.changed_axes.set(axis);
                self.frame.current.status.insert(Status::AXES_UPDATED);
            }
            None => log::info!("tablet: dropping unknown absolute axis code {code:?}"),
        }
    }

    fn process_key(&mut self, code: KeyCode, value: i32) {
        if let Some(kind) = ToolKind::from_code(code) {
            self.update_tool(kind, value != 0);
            return;
        }

        let raw = code.code();
        if raw == KeyCode::BTN_TOUCH.code() {
            self.set_button(ButtonGroup::Stylus, raw, value != 0);
            self.frame.current.status.set(Status::STYLUS_IN_CONTACT, value != 0);
        } else if (STYLUS_BUTTON_BASE..STYLUS_BUTTON_BASE + STYLUS_BUTTON_COUNT).contains(&raw) {
            self.set_button(ButtonGroup::Stylus, raw, value != 0);
        } else if (PAD_BUTTON_BASE..PAD_BUTTON_BASE + PAD_BUTTON_COUNT).contains(&raw) {
            self.set_button(ButtonGroup::Pad, raw, value != 0);
        } else {
            log::info!("tablet: dropping unknown key code {code:?}");
        }
    }

    fn process_misc(&mut self, code: MiscCode, value: i32) {
        if code == MiscCode::MSC_SERIAL {
            self.frame.current.tool_serial = value as u32;
        } else {
            log::info!("tablet: dropping unknown misc code {code:?}");
        }
    }

    fn set_button(&mut self, group: ButtonGroup, code: u16, down: bool) {
        let (mask, base) = match group {
            ButtonGroup::Stylus => (&mut self.frame.current.stylus_buttons, STYLUS_BUTTON_BASE),
            ButtonGroup::Pad => (&mut self.frame.current.pad_buttons, PAD_BUTTON_BASE),
        };
        let bit = 1u32 << (code - base) as u32;
        if down {
            *mask |= bit;
        } else {
            *mask &= !bit;
        }
    }

    /// `BTN_TOOL_*` key handler: a tool announces or withdraws proximity.
    ///
    /// Enabling a different tool than the one currently tracked overwrites it outright (the
    /// kernel is not expected to announce two tools in proximity at once). Disabling the
    /// currently tracked tool clears it to [`ToolKind::None`] and arms
    /// [`Status::TOOL_LEFT_PROXIMITY`] for the next flush.
    fn update_tool(&mut self, kind: ToolKind, enabled: bool) {
        if enabled && kind != self.frame.current.tool_type {
            self.frame.current.tool_type = kind;
        } else if !enabled && kind == self.frame.current.tool_type {
            self.frame.current.tool_type = ToolKind::None;
            self.frame.current.status.insert(Status::TOOL_LEFT_PROXIMITY);
        }
    }

    fn normalized_pending(&self, axis: TabletAxis) -> f64 {
        let raw = self.frame.pending_raw[axis as usize];
        let info = self
            .source
            .axis_info(axis)
            .unwrap_or(AxisInfo { minimum: 0, maximum: 0, resolution: 0 });
        normalize(axis, raw, info)
    }

    /// Enforces the mutual-exclusion rules between `Distance` and `Pressure` before normalization.
    ///
    /// A stylus hovering close enough to register both distance and pressure in the same frame is
    /// read as noise from one of the two axes, not a genuine simultaneous reading; a pressure
    /// reading with no contact is read the same way.
    fn sanitize(&mut self) {
        let distance_set = self.frame.changed_axes.test(TabletAxis::Distance);
        let pressure_set = self.frame.changed_axes.test(TabletAxis::Pressure);

        let both_nonzero = distance_set
            && pressure_set
            && self.normalized_pending(TabletAxis::Distance) != 0.0
            && self.normalized_pending(TabletAxis::Pressure) != 0.0;

        if both_nonzero {
            self.frame.changed_axes.clear(TabletAxis::Distance);
        } else if pressure_set && !self.frame.current.status.contains(Status::STYLUS_IN_CONTACT) {
            self.frame.changed_axes.clear(TabletAxis::Pressure);
        }
    }

    fn emit_buttons(mask: u32, base: u16, time: SystemTime, sink: &mut dyn TabletEventSink, state: ButtonState) {
        for i in 0u32..32 {
            if mask & (1u32 << i) != 0 {
                sink.button(time, base + i as u16, state);
            }
        }
    }

    /// Runs on `SYN_REPORT`: emits this frame's notifications in the fixed order compositors rely
    /// on (button presses, then tool identity, then axes, then button releases) and rolls
    /// `current` into `previous`.
    fn flush(&mut self, time: SystemTime, sink: &mut dyn TabletEventSink) {
        if self.frame.current.status.contains(Status::TOOL_LEFT_PROXIMITY) {
            sink.proximity_out(time);
            self.frame.changed_axes.clear_all();
            self.frame.current.axis_values = [0.0; TabletAxis::COUNT];
            self.frame.current.stylus_buttons = 0;
            self.frame.current.pad_buttons = 0;
            self.frame.current.status = Status::empty();
            self.frame.previous = self.frame.current.clone();
            return;
        }

        let pressed_stylus = pressed(self.frame.current.stylus_buttons, self.frame.previous.stylus_buttons);
        let pressed_pad = pressed(self.frame.current.pad_buttons, self.frame.previous.pad_buttons);
        Self::emit_buttons(pressed_stylus, STYLUS_BUTTON_BASE, time, sink, ButtonState::Pressed);
        Self::emit_buttons(pressed_pad, PAD_BUTTON_BASE, time, sink, ButtonState::Pressed);

        if self.frame.current.tool_type != self.frame.previous.tool_type
            && self.frame.current.tool_type != ToolKind::None
        {
            if let Some(handle) = self
                .registry
                .intern(self.frame.current.tool_type, self.frame.current.tool_serial)
            {
                sink.tool_update(time, handle);
            }
        }

        if self.frame.current.status.contains(Status::AXES_UPDATED) {
            self.sanitize();
            let axes: Vec<TabletAxis> = self.frame.changed_axes.iter().collect();
            for axis in axes {
                match self.source.axis_info(axis) {
                    Some(info) => {
                        let raw = self.frame.pending_raw[axis as usize];
                        self.frame.current.axis_values[axis as usize] = normalize(axis, raw, info);
                    }
                    None => {
                        log::error!("BUG: tablet: axis {axis:?} changed but device reports no AxisInfo for it");
                        self.frame.changed_axes.clear(axis);
                    }
                }
            }
            sink.axis(time, self.frame.changed_axes, self.frame.current.axis_values);
            self.frame.current.status.remove(Status::AXES_UPDATED);
            self.frame.changed_axes.clear_all();
        }

        let released_stylus = released(self.frame.current.stylus_buttons, self.frame.previous.stylus_buttons);
        let released_pad = released(self.frame.current.pad_buttons, self.frame.previous.pad_buttons);
        Self::emit_buttons(released_stylus, STYLUS_BUTTON_BASE, time, sink, ButtonState::Released);
        Self::emit_buttons(released_pad, PAD_BUTTON_BASE, time, sink, ButtonState::Released);

        self.frame.previous = self.frame.current.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyCode;

    /// A fixed bamboo-tablet-shaped axis source, matching `litest-wacom-bamboo-tablet.c` in the
    /// retrieval pack: ABS_X 0..14720, ABS_Y 0..9200, ABS_PRESSURE 0..1023, ABS_DISTANCE 0..31.
    struct FakeTablet;

    impl AxisSource for FakeTablet {
        fn axis_info(&self, axis: TabletAxis) -> Option<AxisInfo> {
            let (minimum, maximum) = match axis {
                TabletAxis::X => (0, 14720),
                TabletAxis::Y => (0, 9200),
                TabletAxis::Pressure => (0, 1023),
                TabletAxis::Distance => (0, 31),
                TabletAxis::TiltX | TabletAxis::TiltY => return None,
            };
            Some(AxisInfo { minimum, maximum, resolution: 0 })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<String>,
        last_axis_values: Option<[f64; TabletAxis::COUNT]>,
    }

    impl TabletEventSink for RecordingSink {
        fn proximity_out(&mut self, _time: SystemTime) {
            self.events.push("proximity_out".into());
        }
        fn tool_update(&mut self, _time: SystemTime, tool: ToolHandle) {
            self.events.push(format!("tool_update({:?}, {})", tool.kind(), tool.serial()));
        }
        fn axis(&mut self, _time: SystemTime, changed: AxisSet, values: [f64; TabletAxis::COUNT]) {
            let changed: Vec<_> = changed.iter().collect();
            self.events.push(format!("axis({changed:?})"));
            self.last_axis_values = Some(values);
        }
        fn button(&mut self, _time: SystemTime, code: u16, state: ButtonState) {
            self.events.push(format!("button({code}, {state:?})"));
        }
    }

    fn abs(dispatch: &mut TabletDispatch<FakeTablet>, sink: &mut RecordingSink, code: AbsoluteAxisCode, value: i32) {
        dispatch.process(InputEvent::new_now(crate::EventType::ABSOLUTE.0, code.code(), value), sink);
    }

    fn key(dispatch: &mut TabletDispatch<FakeTablet>, sink: &mut RecordingSink, code: KeyCode, value: i32) {
        dispatch.process(InputEvent::new_now(crate::EventType::KEY.0, code.code(), value), sink);
    }

    fn sync(dispatch: &mut TabletDispatch<FakeTablet>, sink: &mut RecordingSink) {
        dispatch.process(
            InputEvent::new_now(crate::EventType::SYNCHRONIZATION.0, SynchronizationCode::SYN_REPORT.code(), 0),
            sink,
        );
    }

    #[test]
    fn proximity_in_motion_and_out() {
        let mut dispatch = TabletDispatch::new(FakeTablet);
        let mut sink = RecordingSink::default();

        key(&mut dispatch, &mut sink, KeyCode::BTN_TOOL_PEN, 1);
        abs(&mut dispatch, &mut sink, AbsoluteAxisCode::ABS_X, 100);
        abs(&mut dispatch, &mut sink, AbsoluteAxisCode::ABS_Y, 200);
        sync(&mut dispatch, &mut sink);

        assert_eq!(sink.events, vec!["tool_update(Pen, 0)".to_string(), "axis([X, Y])".to_string()]);
        assert_eq!(sink.last_axis_values.unwrap()[TabletAxis::X as usize], 100.0);
        assert_eq!(sink.last_axis_values.unwrap()[TabletAxis::Y as usize], 200.0);

        sink.events.clear();
        abs(&mut dispatch, &mut sink, AbsoluteAxisCode::ABS_X, 150);
        sync(&mut dispatch, &mut sink);
        assert_eq!(sink.events, vec!["axis([X])".to_string()]);

        sink.events.clear();
        key(&mut dispatch, &mut sink, KeyCode::BTN_TOOL_PEN, 0);
        sync(&mut dispatch, &mut sink);
        assert_eq!(sink.events, vec!["proximity_out".to_string()]);
    }

    #[test]
    fn pressure_suppressed_while_hovering() {
        let mut dispatch = TabletDispatch::new(FakeTablet);
        let mut sink = RecordingSink::default();

        key(&mut dispatch, &mut sink, KeyCode::BTN_TOOL_PEN, 1);
        sync(&mut dispatch, &mut sink);
        sink.events.clear();

        abs(&mut dispatch, &mut sink, AbsoluteAxisCode::ABS_PRESSURE, 50);
        sync(&mut dispatch, &mut sink);

        assert!(sink.events.is_empty(), "pressure without contact must not produce an axis notification");
    }

    #[test]
    fn distance_suppressed_during_contact() {
        let mut dispatch = TabletDispatch::new(FakeTablet);
        let mut sink = RecordingSink::default();

        key(&mut dispatch, &mut sink, KeyCode::BTN_TOOL_PEN, 1);
        key(&mut dispatch, &mut sink, KeyCode::BTN_TOUCH, 1);
        sync(&mut dispatch, &mut sink);
        sink.events.clear();

        abs(&mut dispatch, &mut sink, AbsoluteAxisCode::ABS_DISTANCE, 5);
        abs(&mut dispatch, &mut sink, AbsoluteAxisCode::ABS_PRESSURE, 50);
        sync(&mut dispatch, &mut sink);

        assert_eq!(sink.events, vec!["axis([Pressure])".to_string()]);
    }

    #[test]
    fn tool_identity_preserved_across_proximity_cycles() {
        let mut dispatch = TabletDispatch::new(FakeTablet);
        let mut sink = RecordingSink::default();

        key(&mut dispatch, &mut sink, KeyCode::BTN_TOOL_PEN, 1);
        sync(&mut dispatch, &mut sink);
        key(&mut dispatch, &mut sink, KeyCode::BTN_TOOL_PEN, 0);
        sync(&mut dispatch, &mut sink);

        key(&mut dispatch, &mut sink, KeyCode::BTN_TOOL_PEN, 1);
        sync(&mut dispatch, &mut sink);

        assert_eq!(dispatch.registry.len(), 1);
    }

    #[test]
    fn button_press_then_tool_then_axis_then_release_ordering() {
        let mut dispatch = TabletDispatch::new(FakeTablet);
        let mut sink = RecordingSink::default();

        key(&mut dispatch, &mut sink, KeyCode::BTN_TOOL_PEN, 1);
        sync(&mut dispatch, &mut sink);
        sink.events.clear();

        key(&mut dispatch, &mut sink, KeyCode::BTN_STYLUS, 1);
        abs(&mut dispatch, &mut sink, AbsoluteAxisCode::ABS_X, 1);
        key(&mut dispatch, &mut sink, KeyCode::BTN_STYLUS, 0);
        sync(&mut dispatch, &mut sink);

        assert_eq!(
            sink.events,
            vec![
                format!("button({}, Pressed)", KeyCode::BTN_STYLUS.code()),
                "axis([X])".to_string(),
                format!("button({}, Released)", KeyCode::BTN_STYLUS.code()),
            ]
        );
    }

    #[test]
    fn proximity_gate_drops_events_until_resync() {
        let mut dispatch = TabletDispatch::new(FakeTablet);
        let mut sink = RecordingSink::default();

        key(&mut dispatch, &mut sink, KeyCode::BTN_TOOL_PEN, 1);
        sync(&mut dispatch, &mut sink);
        key(&mut dispatch, &mut sink, KeyCode::BTN_TOOL_PEN, 0);
        sync(&mut dispatch, &mut sink);
        sink.events.clear();

        // Stray axis motion the kernel emits after proximity-out, before the device resyncs.
        abs(&mut dispatch, &mut sink, AbsoluteAxisCode::ABS_X, 999);
        sync(&mut dispatch, &mut sink);

        assert!(sink.events.is_empty());
        assert!(!dispatch.frame.current.status.contains(Status::AXES_UPDATED));
    }
}

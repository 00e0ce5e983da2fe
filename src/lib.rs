//! `evdev` provides bindings to the generic input event interface in Linux. The events supported
//! are divided into several categories, most of which are represented by an enum or bitset of
//! some kind. Each event generated by the system falls into one of these categories, and within
//! the category has a "code" specific to that event. For example, moving a mouse (or, often,
//! a touchpad) will generate `REL_X`/`REL_Y` events, and pressing a key on a keyboard will
//! generate a matching `KEY_*` event.
//!
//! Typical usage:
//!
//! ```no_run
//! use evdev::Device;
//! let mut d = Device::open("/dev/input/event0")?;
//! loop {
//!     for ev in d.fetch_events().unwrap() {
//!         println!("{:?}", ev);
//!     }
//! }
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! This library is intended to be used to support the creation of virtual input devices, as well
//! as reading and processing events from physical and virtual devices. In addition to the raw
//! `RawDevice`/`Device` bindings, `evdev::tablet` implements the dispatch core used by
//! compositors to turn those raw events into coalesced tablet notifications (proximity, tool
//! identity, axis, button), the part of this crate that benefits from a dedicated state machine
//! rather than the generic `DeviceState` tracking used for keyboards, mice and touchscreens.

#[macro_use]
pub mod attribute_set;
pub mod compat;
pub mod constants;
pub mod device_state;
pub mod error;
pub mod event_variants;
pub mod ff;
pub mod inputid;
pub mod raw_stream;
pub mod sync_device;
pub mod sys;
pub mod tablet;
pub mod uinput;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub use crate::attribute_set::{AttributeSet, AttributeSetRef, EvdevEnum};
pub use crate::constants::*;
pub use crate::device_state::DeviceState;
pub use crate::error::Error;
pub use crate::event_variants::{
    AbsoluteAxisEvent, FFEvent, FFStatusEvent, KeyEvent, LedEvent, MiscEvent, OtherEvent,
    PowerEvent, RelativeAxisEvent, RepeatEvent, SoundEvent, SwitchEvent, SynchronizationEvent,
};
pub use crate::ff::{FFCondition, FFEffectData, FFEffectKind, FFEnvelope, FFReplay, FFTrigger, FFWaveform};
pub use crate::inputid::{BusType, InputId};
pub use crate::raw_stream::{FFEffect, RawDevice};
pub use crate::sync_device::Device;
pub use crate::uinput::{UInputEvent, VirtualDevice, VirtualDeviceBuilder};

use crate::compat::{input_absinfo, input_event, uinput_abs_setup};

/// A single input event, as read from (or written to) a device node.
///
/// `InputEvent` is a thin, `repr(transparent)` wrapper over the kernel's `struct input_event`:
/// a timestamp, a type, a code, and a value. Use [`InputEvent::kind`] / [`InputEvent::destructure`]
/// to recover the typed event code for a given [`EventType`], or convert to one of the
/// `*Event` newtypes in [`event_variants`] when the type is already known.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct InputEvent(pub(crate) input_event);

impl InputEvent {
    /// Create a new input event, using a raw event type and code.
    pub fn new(type_: u16, code: u16, value: i32) -> Self {
        InputEvent(input_event {
            time: libc::timeval {
                tv_sec: 0,
                tv_usec: 0,
            },
            type_,
            code,
            value,
        })
    }

    /// Create a new input event with the current time as its timestamp.
    pub fn new_now(type_: u16, code: u16, value: i32) -> Self {
        InputEvent(input_event {
            time: systime_to_timeval(&SystemTime::now()),
            type_,
            code,
            value,
        })
    }

    /// Returns the timestamp associated with the event.
    #[inline]
    pub fn timestamp(&self) -> SystemTime {
        timeval_to_systime(&self.0.time)
    }

    /// Returns the type of event this describes, e.g. Key, Switch, etc.
    #[inline]
    pub fn event_type(&self) -> EventType {
        EventType(self.0.type_)
    }

    /// Returns the raw "code" field directly from input_event.
    #[inline]
    pub fn code(&self) -> u16 {
        self.0.code
    }

    /// A convenience function to return `self.code()` wrapped in a typed newtype determined by
    /// the type of this event.
    ///
    /// This is useful if you want to match events by specific key codes or axes. Note that this
    /// does not capture the event value, just the type and code.
    #[inline]
    pub fn kind(&self) -> InputEventKind {
        let code = self.code();
        match self.event_type() {
            EventType::SYNCHRONIZATION => InputEventKind::Synchronization(SynchronizationCode(code)),
            EventType::KEY => InputEventKind::Key(KeyCode(code)),
            EventType::RELATIVE => InputEventKind::RelAxis(RelativeAxisCode(code)),
            EventType::ABSOLUTE => InputEventKind::AbsAxis(AbsoluteAxisCode(code)),
            EventType::MISC => InputEventKind::Misc(MiscCode(code)),
            EventType::SWITCH => InputEventKind::Switch(SwitchCode(code)),
            EventType::LED => InputEventKind::Led(LedCode(code)),
            EventType::SOUND => InputEventKind::Sound(SoundCode(code)),
            EventType::REPEAT => InputEventKind::Repeat(RepeatCode(code)),
            EventType::FORCEFEEDBACK => InputEventKind::ForceFeedback(FFEffectCode(code)),
            EventType::POWER => InputEventKind::Power(PowerCode(code)),
            EventType::FORCEFEEDBACKSTATUS => InputEventKind::ForceFeedbackStatus(FFStatusCode(code)),
            EventType::UINPUT => InputEventKind::UInput(UInputCode(code)),
            other => InputEventKind::Other(OtherCode(other.0, code)),
        }
    }

    /// Returns the raw "value" field directly from input_event.
    ///
    /// For keys and switches the values 0 and 1 map to pressed and not pressed respectively.
    /// For axes, the values depend on the hardware and driver implementation.
    #[inline]
    pub fn value(&self) -> i32 {
        self.0.value
    }

    /// A convenience function which packages this event's type, code and value together, each
    /// wrapped in the newtype appropriate to this event's [`EventType`].
    #[inline]
    pub fn destructure(self) -> EventSummary {
        match self.kind() {
            InputEventKind::Synchronization(code) => {
                EventSummary::Synchronization(SynchronizationEvent::from_event(self), code, self.value())
            }
            InputEventKind::Key(code) => EventSummary::Key(KeyEvent::from_event(self), code, self.value()),
            InputEventKind::RelAxis(code) => {
                EventSummary::RelativeAxis(RelativeAxisEvent::from_event(self), code, self.value())
            }
            InputEventKind::AbsAxis(code) => {
                EventSummary::AbsoluteAxis(AbsoluteAxisEvent::from_event(self), code, self.value())
            }
            InputEventKind::Misc(code) => EventSummary::Misc(MiscEvent::from_event(self), code, self.value()),
            InputEventKind::Switch(code) => {
                EventSummary::Switch(SwitchEvent::from_event(self), code, self.value())
            }
            InputEventKind::Led(code) => EventSummary::Led(LedEvent::from_event(self), code, self.value()),
            InputEventKind::Sound(code) => EventSummary::Sound(SoundEvent::from_event(self), code, self.value()),
            InputEventKind::Repeat(code) => {
                EventSummary::Repeat(RepeatEvent::from_event(self), code, self.value())
            }
            InputEventKind::ForceFeedback(code) => {
                EventSummary::ForceFeedback(FFEvent::from_event(self), code, self.value())
            }
            InputEventKind::Power(code) => EventSummary::Power(PowerEvent::from_event(self), code, self.value()),
            InputEventKind::ForceFeedbackStatus(code) => {
                EventSummary::ForceFeedbackStatus(FFStatusEvent::from_event(self), code, self.value())
            }
            InputEventKind::UInput(code) => {
                EventSummary::UInput(event_variants::UInputEvent::from_event(self), code, self.value())
            }
            InputEventKind::Other(code) => EventSummary::Other(OtherEvent(self), code, self.value()),
        }
    }
}

impl std::fmt::Debug for InputEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut debug = f.debug_struct("InputEvent");
        debug.field("time", &self.timestamp());
        debug.field("type", &self.event_type());
        debug.field("code", &self.code());
        debug.field("value", &self.value()).finish()
    }
}

impl AsRef<input_event> for InputEvent {
    fn as_ref(&self) -> &input_event {
        &self.0
    }
}

impl From<input_event> for InputEvent {
    fn from(raw: input_event) -> Self {
        Self(raw)
    }
}

/// The typed code carried by an [`InputEvent`], determined by its [`EventType`].
///
/// See [`InputEvent::kind`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum InputEventKind {
    Synchronization(SynchronizationCode),
    Key(KeyCode),
    RelAxis(RelativeAxisCode),
    AbsAxis(AbsoluteAxisCode),
    Misc(MiscCode),
    Switch(SwitchCode),
    Led(LedCode),
    Sound(SoundCode),
    Repeat(RepeatCode),
    ForceFeedback(FFEffectCode),
    Power(PowerCode),
    ForceFeedbackStatus(FFStatusCode),
    UInput(UInputCode),
    /// An event type this crate has no named newtype for, carrying both the raw type and code.
    Other(OtherCode),
}

/// An [`InputEvent`], already downcast to its specific newtype and paired with its typed code
/// and raw value, for use in a single `match` rather than a chain of `if let`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventSummary {
    Synchronization(SynchronizationEvent, SynchronizationCode, i32),
    Key(KeyEvent, KeyCode, i32),
    RelativeAxis(RelativeAxisEvent, RelativeAxisCode, i32),
    AbsoluteAxis(AbsoluteAxisEvent, AbsoluteAxisCode, i32),
    Misc(MiscEvent, MiscCode, i32),
    Switch(SwitchEvent, SwitchCode, i32),
    Led(LedEvent, LedCode, i32),
    Sound(SoundEvent, SoundCode, i32),
    Repeat(RepeatEvent, RepeatCode, i32),
    ForceFeedback(FFEvent, FFEffectCode, i32),
    Power(PowerEvent, PowerCode, i32),
    ForceFeedbackStatus(FFStatusEvent, FFStatusCode, i32),
    UInput(event_variants::UInputEvent, UInputCode, i32),
    Other(OtherEvent, OtherCode, i32),
}

pub(crate) fn systime_to_timeval(time: &SystemTime) -> libc::timeval {
    let (sign, dur) = match time.duration_since(UNIX_EPOCH) {
        Ok(dur) => (1, dur),
        Err(e) => (-1, e.duration()),
    };

    libc::timeval {
        tv_sec: sign * dur.as_secs() as libc::time_t,
        tv_usec: dur.subsec_micros() as libc::suseconds_t,
    }
}

pub(crate) fn timeval_to_systime(tv: &libc::timeval) -> SystemTime {
    let dur = Duration::from_secs(tv.tv_sec.unsigned_abs())
        + Duration::from_micros(tv.tv_usec.unsigned_abs() as u64);
    if tv.tv_sec >= 0 {
        UNIX_EPOCH + dur
    } else {
        UNIX_EPOCH - dur
    }
}

/// Static metadata about an absolute axis, as read from the kernel via `EVIOCGABS`.
///
/// Wraps the kernel's `struct input_absinfo` (`value`, `minimum`, `maximum`, `fuzz`, `flat`,
/// `resolution`) behind named accessors.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub struct AbsInfo(pub(crate) input_absinfo);

impl AbsInfo {
    /// Builds an `AbsInfo` out of its constituent fields, useful for describing a virtual
    /// device's absolute axes before it is created.
    pub fn new(value: i32, minimum: i32, maximum: i32, fuzz: i32, flat: i32, resolution: i32) -> Self {
        Self(input_absinfo {
            value,
            minimum,
            maximum,
            fuzz,
            flat,
            resolution,
        })
    }

    /// The axis's last known value.
    pub fn value(&self) -> i32 {
        self.0.value
    }
    /// The lowest value this axis can report.
    pub fn minimum(&self) -> i32 {
        self.0.minimum
    }
    /// The highest value this axis can report.
    pub fn maximum(&self) -> i32 {
        self.0.maximum
    }
    /// The noise threshold reported by the driver.
    pub fn fuzz(&self) -> i32 {
        self.0.fuzz
    }
    /// The size of the "flat" dead zone around the rest position, if any.
    pub fn flat(&self) -> i32 {
        self.0.flat
    }
    /// The resolution of this axis, typically in units per millimeter or per radian.
    pub fn resolution(&self) -> i32 {
        self.0.resolution
    }
}

/// Delay and period, in milliseconds, between autorepeated key events while a key is held down.
#[repr(C)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AutoRepeat {
    pub delay: u32,
    pub period: u32,
}

/// Describes an absolute axis to add to a [`uinput::VirtualDeviceBuilder`], pairing a
/// [`AbsoluteAxisCode`] with the [`AbsInfo`] the kernel should report for it.
#[repr(transparent)]
pub struct UinputAbsSetup(pub(crate) uinput_abs_setup);

impl UinputAbsSetup {
    /// Create a new `UinputAbsSetup`.
    pub fn new(code: AbsoluteAxisCode, absinfo: AbsInfo) -> Self {
        Self(uinput_abs_setup {
            code: code.0,
            absinfo: absinfo.0,
        })
    }

    /// The axis this setup describes.
    pub fn code(&self) -> AbsoluteAxisCode {
        AbsoluteAxisCode(self.0.code)
    }

    /// The static metadata to report for this axis.
    pub fn absinfo(&self) -> AbsInfo {
        AbsInfo(self.0.absinfo)
    }
}

/// Number of events read from a device node in a single batched `read(2)` call.
pub(crate) const EVENT_BATCH_SIZE: usize = 32;

/// Reinterprets a slice of `InputEvent` as the raw bytes the kernel expects on the wire.
///
/// # Safety
/// `InputEvent` is `repr(transparent)` over `input_event`, which is itself a plain-old-data
/// `repr(C)` struct, so this is a safe reinterpretation of initialized memory.
pub(crate) unsafe fn cast_to_bytes<T: Sized>(events: &[T]) -> &[u8] {
    std::slice::from_raw_parts(events.as_ptr() as *const u8, std::mem::size_of_val(events))
}

pub(crate) fn write_events(
    fd: std::os::fd::BorrowedFd<'_>,
    events: &[InputEvent],
) -> std::io::Result<()> {
    let bytes = unsafe { cast_to_bytes(events) };
    nix::unistd::write(fd, bytes).map_err(std::io::Error::from)?;
    Ok(())
}

/// Crawls `/dev/input` for evdev devices, returning those that could be opened.
///
/// Will not bubble up any errors in opening devices or traversing the directory. Instead returns
/// an empty iterator or omits the devices that could not be opened.
pub fn enumerate() -> EnumerateDevices {
    EnumerateDevices(raw_stream::enumerate())
}

/// An iterator over currently connected evdev devices, yielded by [`enumerate`].
pub struct EnumerateDevices(raw_stream::EnumerateDevices);

impl Iterator for EnumerateDevices {
    type Item = (PathBuf, Device);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, raw) = self.0.next()?;
        Some((path, Device::from_raw_device(raw)))
    }
}

//! A dispatch core for tablet input devices.
//!
//! Tablets report motion, pressure, tilt and tool identity as loose streams of `EV_ABS`/`EV_KEY`/
//! `EV_MSC` events that only become meaningful once coalesced at `SYN_REPORT`: a single physical
//! gesture (say, the pen touching down while moving) spans several raw events that must be
//! reassembled into one coherent update before a compositor can act on it. [`TabletDispatch`] is
//! that reassembly: it tracks per-frame state across a device's lifetime and, on every
//! `SYN_REPORT`, emits an ordered sequence of notifications through a [`TabletEventSink`] —
//! button presses, tool identity changes, axis updates, then button releases.
//!
//! [`TabletDevice`] pairs the dispatch core with a real [`crate::raw_stream::RawDevice`] for
//! callers that just want notifications off a device node; [`TabletDispatch`] itself is generic
//! over [`AxisSource`] and has no I/O dependency, so it can be driven directly in tests.

mod axis;
mod device;
mod dispatch;
mod frame;
mod tool;

pub use axis::{AxisInfo, AxisSet, AxisSource, TabletAxis};
pub use device::{TabletDevice, TabletNotification};
pub use dispatch::{ButtonState, TabletDispatch, TabletEventSink};
pub use tool::{ToolHandle, ToolKind, ToolRegistry};

//! A thin device wrapper that feeds a device node's events through [`TabletDispatch`] and
//! exposes the resulting notifications as an iterator.

use std::io;
use std::path::Path;
use std::time::SystemTime;

use crate::raw_stream::RawDevice;
use crate::{InputId, Error};

use super::axis::{AxisInfo, AxisSet, AxisSource, TabletAxis};
use super::dispatch::{ButtonState, TabletDispatch, TabletEventSink};
use super::tool::ToolHandle;

impl AxisSource for RawDevice {
    fn axis_info(&self, axis: TabletAxis) -> Option<AxisInfo> {
        let code = axis.code();
        let (_, info) = self.get_absinfo().ok()?.find(|(c, _)| *c == code)?;
        Some(AxisInfo {
            minimum: info.minimum(),
            maximum: info.maximum(),
            resolution: info.resolution(),
        })
    }
}

/// One coalesced notification produced by a [`TabletDevice`] flush.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TabletNotification {
    ProximityOut { time: SystemTime },
    ToolUpdate { time: SystemTime, tool: ToolHandle },
    Axis { time: SystemTime, changed: AxisSet, values: [f64; TabletAxis::COUNT] },
    Button { time: SystemTime, code: u16, state: ButtonState },
}

#[derive(Default)]
struct RecordingSink {
    notifications: Vec<TabletNotification>,
}

impl TabletEventSink for RecordingSink {
    fn proximity_out(&mut self, time: SystemTime) {
        self.notifications.push(TabletNotification::ProximityOut { time });
    }
    fn tool_update(&mut self, time: SystemTime, tool: ToolHandle) {
        self.notifications.push(TabletNotification::ToolUpdate { time, tool });
    }
    fn axis(&mut self, time: SystemTime, changed: AxisSet, values: [f64; TabletAxis::COUNT]) {
        self.notifications.push(TabletNotification::Axis { time, changed, values });
    }
    fn button(&mut self, time: SystemTime, code: u16, state: ButtonState) {
        self.notifications.push(TabletNotification::Button { time, code, state });
    }
}

/// A tablet device node, dispatched through [`TabletDispatch`] on every read.
///
/// Wraps a [`RawDevice`] rather than the synchronized [`crate::Device`]: the tablet dispatch core
/// already performs its own frame-level coalescing, so the `DeviceState`/`SYN_DROPPED` tracking
/// `Device` adds on top is neither needed nor wanted here.
pub struct TabletDevice {
    dispatch: TabletDispatch<RawDevice>,
}

impl TabletDevice {
    /// Opens the device node at `path` and wraps it for tablet dispatch.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let raw = RawDevice::open(path)?;
        Ok(Self { dispatch: TabletDispatch::new(raw) })
    }

    /// The device's reported name, if any.
    pub fn name(&self) -> Option<&str> {
        self.dispatch.source().name()
    }

    /// The device's bus type, vendor, product and version.
    pub fn input_id(&self) -> InputId {
        self.dispatch.source().input_id()
    }

    /// Reads whatever events are currently available and runs them through the dispatch core,
    /// returning the notifications produced by any completed frames.
    ///
    /// A frame that has not yet seen `SYN_REPORT` produces no notifications; its state carries
    /// over to the next call.
    pub fn fetch_notifications(&mut self) -> Result<std::vec::IntoIter<TabletNotification>, Error> {
        let events: Vec<_> = self.dispatch.source_mut().fetch_events()?.collect();
        let mut sink = RecordingSink::default();
        for event in events {
            self.dispatch.process(event, &mut sink);
        }
        Ok(sink.notifications.into_iter())
    }
}

impl Drop for TabletDevice {
    fn drop(&mut self) {
        self.dispatch.destroy();
    }
}

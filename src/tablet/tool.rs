//! Interning table for tablet tool identities (kind + serial number).

use crate::KeyCode;

/// A physical pointing instrument kind, as announced by a `BTN_TOOL_*` key.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum ToolKind {
    #[default]
    None,
    Pen,
    Eraser,
    Brush,
    Pencil,
    Airbrush,
    Finger,
    Mouse,
    Lens,
}

impl ToolKind {
    /// Maps a `BTN_TOOL_*` key code to the tool kind it announces.
    ///
    /// Returns `None` for any key this core does not treat as a tool announcement.
    pub fn from_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::BTN_TOOL_PEN => Some(ToolKind::Pen),
            KeyCode::BTN_TOOL_RUBBER => Some(ToolKind::Eraser),
            KeyCode::BTN_TOOL_BRUSH => Some(ToolKind::Brush),
            KeyCode::BTN_TOOL_PENCIL => Some(ToolKind::Pencil),
            KeyCode::BTN_TOOL_AIRBRUSH => Some(ToolKind::Airbrush),
            KeyCode::BTN_TOOL_FINGER => Some(ToolKind::Finger),
            KeyCode::BTN_TOOL_MOUSE => Some(ToolKind::Mouse),
            KeyCode::BTN_TOOL_LENS => Some(ToolKind::Lens),
            _ => None,
        }
    }
}

/// A stable, `Copy` identity for a tool interned by a [`ToolRegistry`].
///
/// Identifies an entry by `(kind, serial)` rather than by pointer or slot index: sink
/// implementations are expected to consume a handle synchronously (e.g. to look up or create a
/// compositor-side tool object) and are not required to retain it past the call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ToolHandle {
    kind: ToolKind,
    serial: u32,
}

impl ToolHandle {
    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn serial(&self) -> u32 {
        self.serial
    }
}

#[derive(Debug)]
struct ToolEntry {
    kind: ToolKind,
    serial: u32,
    refcount: u32,
}

/// Per-device table of interned `(ToolKind, serial)` pairs.
///
/// A tool that re-enters proximity with the same kind and serial resolves to the same
/// [`ToolHandle`] it held the first time. Lookups are a linear scan: in practice a tablet has a
/// handful of distinct tools in flight at once, never more.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    entries: Vec<ToolEntry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Finds or creates the entry for `(kind, serial)`, returning a handle to it.
    ///
    /// Returns `None` if a new entry was needed but the registry failed to allocate for it; per
    /// this core's error semantics that means skipping the tool-update notification for this
    /// frame, not a panic or a propagated error.
    pub fn intern(&mut self, kind: ToolKind, serial: u32) -> Option<ToolHandle> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.kind == kind && e.serial == serial) {
            entry.refcount += 1;
            return Some(ToolHandle { kind, serial });
        }

        if self.entries.try_reserve(1).is_err() {
            log::error!("tablet: failed to allocate a tool registry entry for {kind:?}/{serial}");
            return None;
        }
        self.entries.push(ToolEntry { kind, serial, refcount: 1 });
        Some(ToolHandle { kind, serial })
    }

    /// Releases one reference to the entry `handle` identifies, dropping it once unreferenced.
    pub fn release(&mut self, handle: ToolHandle) {
        if let Some(pos) = self
            .entries
            .iter()
            .position(|e| e.kind == handle.kind && e.serial == handle.serial)
        {
            self.entries[pos].refcount = self.entries[pos].refcount.saturating_sub(1);
            if self.entries[pos].refcount == 0 {
                self.entries.remove(pos);
            }
        }
    }

    /// Drops every entry, regardless of refcount. Called when the owning device is torn down.
    pub fn destroy_all(&mut self) {
        self.entries.clear();
    }

    /// Number of tools currently interned.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no tools are currently interned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_kind_and_serial_resolve_to_equal_handles() {
        let mut registry = ToolRegistry::new();
        let a = registry.intern(ToolKind::Pen, 42).unwrap();
        let b = registry.intern(ToolKind::Pen, 42).unwrap();
        assert_eq!(a, b);

        let c = registry.intern(ToolKind::Eraser, 42).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn release_drops_entry_at_zero_refcount() {
        let mut registry = ToolRegistry::new();
        let handle = registry.intern(ToolKind::Pen, 1).unwrap();
        registry.intern(ToolKind::Pen, 1).unwrap();

        registry.release(handle);
        assert_eq!(registry.entries.len(), 1);
        registry.release(handle);
        assert!(registry.entries.is_empty());
    }

    #[test]
    fn destroy_all_clears_regardless_of_refcount() {
        let mut registry = ToolRegistry::new();
        registry.intern(ToolKind::Pen, 1).unwrap();
        registry.intern(ToolKind::Eraser, 2).unwrap();
        registry.destroy_all();
        assert!(registry.entries.is_empty());
    }
}

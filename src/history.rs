use std::collections::VecDeque;

use crate::error::SurfaceResult;
use crate::snapshot::EncodedImage;
use crate::surface::Surface;

/// Default number of snapshots kept for undo/redo
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// One captured state of the canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Monotonic capture number within the session, survives eviction
    pub sequence: u64,
    pub snapshot: EncodedImage,
}

/// Bounded undo/redo buffer of canvas snapshots.
///
/// Entries live in a ring buffer; the cursor is a logical index into it that is
/// rebased whenever the oldest entry is evicted.
#[derive(Debug)]
pub struct HistoryBuffer {
    entries: VecDeque<HistoryEntry>,
    cursor: Option<usize>,
    capacity: usize,
    next_sequence: u64,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    /// Creates an empty history holding at most `capacity` snapshots (min. 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            cursor: None,
            capacity,
            next_sequence: 0,
        }
    }

    /// Snapshot `surface` and make it the current entry.
    ///
    /// Anything after the cursor (the redo future) is discarded first. When the
    /// buffer is full the oldest entry is evicted.
    pub fn capture<S: Surface>(&mut self, surface: &S) -> SurfaceResult<&HistoryEntry> {
        let snapshot = surface.encode()?;

        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        let discarded = self.entries.len() - keep;
        if discarded > 0 {
            log::debug!("Discarding {} redo entries", discarded);
            self.entries.truncate(keep);
        }

        self.entries.push_back(HistoryEntry {
            sequence: self.next_sequence,
            snapshot,
        });
        self.next_sequence += 1;

        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                log::debug!("History full, evicted snapshot #{}", evicted.sequence);
            }
        }

        let last = self.entries.len() - 1;
        self.cursor = Some(last);
        Ok(&self.entries[last])
    }

    /// Step back one entry and restore it. Returns false when already at the start.
    pub fn undo<S: Surface>(&mut self, surface: &mut S) -> SurfaceResult<bool> {
        match self.cursor {
            Some(cursor) if cursor > 0 => self.move_to(cursor - 1, surface).map(|()| true),
            _ => Ok(false),
        }
    }

    /// Step forward one entry and restore it. Returns false when already at the end.
    pub fn redo<S: Surface>(&mut self, surface: &mut S) -> SurfaceResult<bool> {
        match self.cursor {
            Some(cursor) if cursor + 1 < self.entries.len() => {
                self.move_to(cursor + 1, surface).map(|()| true)
            }
            _ => Ok(false),
        }
    }

    /// Overwrite `surface` with the content of `entry`
    pub fn restore<S: Surface>(entry: &HistoryEntry, surface: &mut S) -> SurfaceResult<()> {
        surface.decode_into(&entry.snapshot)
    }

    // The cursor only moves once the surface holds the target entry
    fn move_to<S: Surface>(&mut self, index: usize, surface: &mut S) -> SurfaceResult<()> {
        Self::restore(&self.entries[index], surface)?;
        log::debug!(
            "History cursor {:?} -> {} (snapshot #{})",
            self.cursor,
            index,
            self.entries[index].sequence
        );
        self.cursor = Some(index);
        Ok(())
    }

    /// Index of the displayed entry, `None` when nothing was captured yet
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.cursor.map(|cursor| &self.entries[cursor])
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if there is an earlier snapshot to go back to
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    /// Returns true if there is a later snapshot to go forward to
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor + 1 < self.entries.len())
    }
}

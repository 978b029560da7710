//! Forward-only position within the review order.

use serde::{Deserialize, Serialize};

/// Where the cursor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "position")]
pub enum CursorState {
    /// On the unit at this 0-based index.
    Active(usize),
    /// Past the last unit. The cursor never enters this state on its own:
    /// advancing from the last index is a no-op.
    Complete,
}

/// Position in a sequence of `len` units. Moves forward only and is clamped
/// to the last index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCursor {
    position: usize,
    len: usize,
}

impl SessionCursor {
    /// Cursor at index 0 of a sequence of `len` units.
    ///
    /// `len` must be non-zero.
    #[must_use]
    pub fn new(len: usize) -> Self {
        debug_assert!(len > 0);
        Self { position: 0, len }
    }

    /// Cursor at `position`, clamped to the last index.
    #[must_use]
    pub fn at(position: usize, len: usize) -> Self {
        debug_assert!(len > 0);
        Self {
            position: position.min(len.saturating_sub(1)),
            len,
        }
    }

    /// Current 0-based index.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of units in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the cursor is on the last unit.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.position + 1 >= self.len
    }

    /// Whether [`advance`](Self::advance) would move.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        !self.is_last()
    }

    /// Move to the next unit. Returns `false` (and stays put) on the last one.
    pub fn advance(&mut self) -> bool {
        if self.can_advance() {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CursorState {
        if self.position < self.len {
            CursorState::Active(self.position)
        } else {
            CursorState::Complete
        }
    }
}

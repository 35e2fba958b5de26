//! Readers and writers as the engine sees them.

use arbiter_types::{Priority, ReaderId, WriterId};

/// A writer contending for exclusive access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Writer {
    pub id: WriterId,
    pub priority: Priority,
    pub active: bool,
}

impl Writer {
    pub fn new(id: WriterId, priority: Priority) -> Self {
        Self {
            id,
            priority,
            active: false,
        }
    }
}

/// Reader state. Readers have no control of their own; the engine moves
/// them between these on ticks and transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReaderState {
    #[default]
    Waiting,
    Reading,
}

/// A reader sharing access with other readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reader {
    pub id: ReaderId,
    pub priority: Priority,
    pub state: ReaderState,
}

impl Reader {
    pub fn new(id: ReaderId, priority: Priority) -> Self {
        Self {
            id,
            priority,
            state: ReaderState::Waiting,
        }
    }

    pub fn is_reading(&self) -> bool {
        self.state == ReaderState::Reading
    }
}

//! Core types shared by the arbitration engine and the resource ring.
//!
//! Everything here is plain data: identifiers, priorities and the
//! arbitration mode. No type in this crate owns behaviour beyond parsing,
//! formatting and drawing random priorities.

mod identifiers;
mod mode;
mod overrides;
mod priority;

pub use identifiers::{ReaderId, ResourceId, WorkerId, WriterId};
pub use mode::{Mode, ParseModeError};
pub use overrides::PriorityOverrides;
pub use priority::{Priority, PriorityOutOfRange};

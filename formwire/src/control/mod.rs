//! Control - the per-field handle the rest of formwire reads and writes.

mod events;
mod state;

pub use events::{ControlEvent, ControlStatus, Emit};
pub use state::{Control, ControlId};

//! Step progress events and their fan-out to connected observers.

mod broadcaster;
mod event;

pub use broadcaster::{ObserverId, ProgressBroadcaster};
pub use event::ProgressEvent;

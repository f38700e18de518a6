//! Override watch.
//!
//! A one-shot latch tripped by live human input. The first pointer motion or
//! key press sets the flag and it stays set until a new watch is started.
//! Autonomous work consults the flag before acting.

#[cfg(feature = "input-hook")]
mod rdev_source;

#[cfg(feature = "input-hook")]
pub use rdev_source::RdevSource;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

/// Input observed by the watch. Event payloads are irrelevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerMotion,
    KeyPress,
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Failed to start input listener: {0}")]
    Listener(String),
}

#[derive(Default)]
struct Latch {
    overridden: AtomicBool,
    listening: AtomicBool,
}

/// Where input listeners push events.
#[derive(Clone)]
pub struct EventSink {
    latch: Arc<Latch>,
}

impl EventSink {
    pub fn observe(&self, event: InputEvent) {
        if !self.latch.listening.load(Ordering::Acquire) {
            return;
        }
        if !self.latch.overridden.swap(true, Ordering::AcqRel) {
            info!("Human input detected ({:?}), override engaged", event);
        }
    }
}

/// A source of OS input events, started once per watch.
pub trait InputSource {
    fn start(self, sink: EventSink) -> Result<(), WatchError>;
}

/// A running watch.
pub struct OverrideHandle {
    latch: Arc<Latch>,
}

impl OverrideHandle {
    pub fn overridden(&self) -> bool {
        self.latch.overridden.load(Ordering::Acquire)
    }

    /// Sink for feeding events by hand.
    pub fn sink(&self) -> EventSink {
        EventSink {
            latch: self.latch.clone(),
        }
    }

    /// Stop reacting to input. The flag keeps its current value.
    pub fn stop(&self) {
        if self.latch.listening.swap(false, Ordering::AcqRel) {
            debug!("Override watch stopped");
        }
    }
}

pub struct OverrideWatch;

impl OverrideWatch {
    /// Start a watch fed by `source`.
    pub fn start(source: impl InputSource) -> Result<OverrideHandle, WatchError> {
        let handle = Self::start_detached();
        source.start(handle.sink())?;
        info!("Override watch started");
        Ok(handle)
    }

    /// Start a watch with no listener attached; events arrive only through
    /// [`OverrideHandle::sink`].
    pub fn start_detached() -> OverrideHandle {
        let latch = Arc::new(Latch::default());
        latch.listening.store(true, Ordering::Release);
        OverrideHandle { latch }
    }
}

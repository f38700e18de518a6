//! OS input hook backed by `rdev`.

use rdev::EventType;
use tracing::error;

use super::{EventSink, InputEvent, InputSource, WatchError};

/// Global pointer and keyboard hook.
///
/// `rdev::listen` blocks its thread for the life of the process, so the
/// listener thread is never joined; after [`super::OverrideHandle::stop`]
/// it keeps running but its events are ignored.
pub struct RdevSource;

impl InputSource for RdevSource {
    fn start(self, sink: EventSink) -> Result<(), WatchError> {
        std::thread::Builder::new()
            .name("override-watch".to_string())
            .spawn(move || {
                let result = rdev::listen(move |event| match event.event_type {
                    EventType::MouseMove { .. } => sink.observe(InputEvent::PointerMotion),
                    EventType::KeyPress(_) => sink.observe(InputEvent::KeyPress),
                    _ => {}
                });
                if let Err(e) = result {
                    error!("Input listener stopped: {:?}", e);
                }
            })
            .map_err(|e| WatchError::Listener(e.to_string()))?;
        Ok(())
    }
}

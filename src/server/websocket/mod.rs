//! Progress channel for observers.

mod handler;

pub use handler::ws_handler;

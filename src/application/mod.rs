//! Application services: rendering and the fragment loader.

pub mod error;
pub mod guide;
pub mod loader;
pub mod ports;
pub mod render;

//! Foundation utilities shared across the engine
//!
//! Math types, frame timing, and logging setup. Everything here is
//! backend-agnostic and has no dependency on the rendering modules.

pub mod logging;
pub mod math;
pub mod time;

#![forbid(unsafe_code)]

//! Core: geometry primitives and the logging facade shared by every Guidepost crate.

pub mod geometry;
pub mod logging;

#[cfg(feature = "tracing")]
pub use logging::trace;

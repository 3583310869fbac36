#![forbid(unsafe_code)]

//! Guidepost demo: a headless, scripted walkthrough over the in-memory
//! dashboard host. Every transition is printed as one JSON object per line.

pub mod cli;
pub mod script;

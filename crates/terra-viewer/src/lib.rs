//! Interactive point-cloud globe viewer.
//!
//! Windowing, GPU pipelines and asset loading around the `terra` core.

pub mod app;
pub mod assets;
pub mod config;
pub mod input;
pub mod renderer;
pub mod ui;

//! Terra core: everything the globe needs that does not touch the GPU.
//!
//! The viewer crate uploads what this crate builds ([`geometry`],
//! [`starfield`]), packs [`shading::TerrainUniforms`] every frame and drives
//! the loop through [`frame::FrameDriver`].

pub mod camera;
pub mod frame;
pub mod geometry;
pub mod raycast;
pub mod sampler;
pub mod shading;
pub mod starfield;

pub use camera::{OrbitControls, PerspectiveCamera};
pub use frame::{FrameDriver, FrameScheduler, FrameSink, GlobeScene};
pub use geometry::{PointSample, SphereMesh};
pub use sampler::{InteractionState, SurfaceSampler};
pub use starfield::{StarFieldGenerator, StarFieldParams, StarSample};

//! Cubist engine crate.
//!
//! A minimal render pipeline for one spinning cube: a graphics context
//! wrapper over wgpu, a WGSL shader program builder, the cube model, a
//! renderer, an animation driver and an off-thread image loader, tied
//! together by [`scene::Scene`] and driven by the winit runtime in [`window`].

pub mod animation;
pub mod assets;
pub mod core;
pub mod device;
pub mod graphics;
pub mod model;
pub mod render;
pub mod scene;
pub mod shader;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;

//! A small fixed-function 3D scene: one cube over a tiled floor, with
//! adjustable color, lighting, fog, textures and a fake floor reflection.
//!
//! [`state::SceneState`] holds every parameter, [`renderer::FrameRenderer`]
//! turns it into a [`renderer::Frame`] display list, and
//! [`graphics::Rasterizer`] executes that list into pixels.

pub mod config;
pub mod geometry;
pub mod graphics;
pub mod input;
pub mod math;
pub mod renderer;
pub mod state;
pub mod texture;
pub mod vertex;
pub mod viewer;
pub mod widget;

//! render_wgpu: thin renderer glue for the dome viewer.
//!
//! Owns the wgpu surface/device, the dome and floor meshes, the media
//! texture, and the present pass. All simulation state lives in
//! `viewer_core`; this crate only turns a pose plus panel adjustments into
//! frames.

pub mod gfx;
pub use gfx::Renderer;

// Root app shell and re-exports for workspace crates used by bins.
pub use data_runtime;
pub use nav_static;
pub use platform_winit;
pub use render_wgpu;
pub use ux_panel;
pub use viewer_core as viewer;

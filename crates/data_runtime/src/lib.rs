//! data_runtime: config schemas and loaders for the dome viewer.
//!
//! TOML lives under `data/config/`; every loader falls back to defaults when
//! the file is absent and honors env-var overrides for quick tuning.

pub mod configs {
    pub mod controls;
    pub mod display;
}

use std::path::PathBuf;

/// Resolve the workspace `data/` root so loaders work from any crate dir.
#[must_use]
pub fn data_root() -> PathBuf {
    let here = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let ws = here.join("../../data");
    if ws.is_dir() { ws } else { here.join("data") }
}

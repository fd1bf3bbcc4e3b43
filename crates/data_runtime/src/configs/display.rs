//! Display/projection configuration loaded from data/config/display.toml.

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayCfg {
    pub fov_deg: Option<f32>,
    pub dome_radius_m: Option<f32>,
    /// Dome tilt toward the audience, degrees (planetarium-style domes are
    /// often tilted 15-30).
    pub dome_tilt_deg: Option<f32>,
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
    /// Media shown at startup; absent means the built-in test pattern.
    pub media_path: Option<String>,
    pub vsync: Option<bool>,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self {
            fov_deg: Some(70.0),
            dome_radius_m: Some(8.0),
            dome_tilt_deg: Some(0.0),
            brightness: Some(0.0),
            contrast: Some(1.0),
            saturation: Some(1.0),
            media_path: None,
            vsync: Some(true),
        }
    }
}

pub fn load_default() -> Result<DisplayCfg> {
    let path = crate::data_root().join("config/display.toml");
    let mut cfg = if path.is_file() {
        let txt =
            std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        toml::from_str::<DisplayCfg>(&txt).context("parse display TOML")?
    } else {
        DisplayCfg::default()
    };
    if let Ok(v) = std::env::var("DOME_FOV_DEG") {
        cfg.fov_deg = v.parse().ok();
    }
    if let Ok(v) = std::env::var("DOME_MEDIA") {
        cfg.media_path = Some(v);
    }
    if let Ok(v) = std::env::var("DOME_VSYNC") {
        cfg.vsync = v.parse().ok();
    }
    Ok(cfg)
}

//! Controls configuration loaded from data/config/controls.toml.

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ControlsCfg {
    pub sensitivity_deg_per_px: Option<f32>,
    pub invert_y: Option<bool>,
    pub min_pitch_deg: Option<f32>,
    pub max_pitch_deg: Option<f32>,
    pub base_speed_mps: Option<f32>,
    /// Touch/on-screen intents move this much faster than keyboard.
    pub touch_speed_mult: Option<f32>,
    /// Held-rotate yaw rate as a multiple of base speed.
    pub turn_scale: Option<f32>,
    pub eye_height_m: Option<f32>,
    pub fly_mode: Option<bool>,
    /// Upper bound on per-frame elapsed time; long stalls (tab suspend,
    /// debugger) otherwise turn into one huge step through the surface.
    pub max_frame_dt_s: Option<f32>,
    pub search_half_extent_m: Option<[f32; 3]>,
}

impl Default for ControlsCfg {
    fn default() -> Self {
        Self {
            sensitivity_deg_per_px: Some(0.15),
            invert_y: Some(false),
            min_pitch_deg: Some(-90.0),
            max_pitch_deg: Some(90.0),
            base_speed_mps: Some(3.0),
            touch_speed_mult: Some(2.0),
            turn_scale: Some(0.5),
            eye_height_m: Some(1.7),
            fly_mode: Some(false),
            max_frame_dt_s: Some(0.1),
            search_half_extent_m: Some([2.0, 4.0, 2.0]),
        }
    }
}

pub fn load_default() -> Result<ControlsCfg> {
    let path = crate::data_root().join("config/controls.toml");
    let mut cfg = if path.is_file() {
        let txt =
            std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        toml::from_str::<ControlsCfg>(&txt).context("parse controls TOML")?
    } else {
        ControlsCfg::default()
    };
    // Env overrides for quick tuning (optional)
    if let Ok(s) = std::env::var("DOME_SENS_DEG") {
        cfg.sensitivity_deg_per_px = s.parse().ok();
    }
    if let Ok(v) = std::env::var("DOME_INVERT_Y") {
        cfg.invert_y = v.parse().ok();
    }
    if let Ok(v) = std::env::var("DOME_BASE_SPEED") {
        cfg.base_speed_mps = v.parse().ok();
    }
    if let Ok(v) = std::env::var("DOME_EYE_HEIGHT") {
        cfg.eye_height_m = v.parse().ok();
    }
    if let Ok(v) = std::env::var("DOME_FLY") {
        cfg.fly_mode = v.parse().ok();
    }
    if let Ok(v) = std::env::var("DOME_MAX_DT") {
        cfg.max_frame_dt_s = v.parse().ok();
    }
    Ok(cfg)
}

//! Drag-look integration: pointer deltas into the persistent orientation.

use crate::input::sanitize_delta;
use crate::systems::orientation::Orientation;

#[derive(Clone, Copy, Debug)]
pub struct MouselookConfig {
    /// Degrees of rotation per pixel of pointer travel.
    pub sensitivity_deg_per_px: f32,
    pub invert_y: bool,
    pub min_pitch_deg: f32,
    pub max_pitch_deg: f32,
}

impl Default for MouselookConfig {
    fn default() -> Self {
        Self {
            sensitivity_deg_per_px: 0.15,
            invert_y: false,
            min_pitch_deg: -90.0,
            max_pitch_deg: 90.0,
        }
    }
}

/// Apply one drag move event's pixel delta to the orientation.
///
/// Dragging right looks right (yaw decreases with +dx on a -Z-forward
/// basis), dragging down looks down unless `invert_y`. Pitch is clamped
/// every update so no sequence of deltas can flip the view over the poles.
/// Non-finite deltas are rejected at the boundary and leave the orientation
/// untouched.
pub fn apply_pointer_delta(cfg: &MouselookConfig, ori: &mut Orientation, dx: f32, dy: f32) {
    let (dx, dy) = sanitize_delta(dx, dy);
    let to_rad = cfg.sensitivity_deg_per_px.to_radians();
    ori.yaw -= dx * to_rad;
    let dy = if cfg.invert_y { -dy } else { dy };
    ori.pitch = (ori.pitch - dy * to_rad).clamp(
        cfg.min_pitch_deg.to_radians(),
        cfg.max_pitch_deg.to_radians(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_is_clamped_for_any_magnitude() {
        let mut o = Orientation::default();
        let cfg = MouselookConfig {
            sensitivity_deg_per_px: 1.0,
            ..Default::default()
        };
        apply_pointer_delta(&cfg, &mut o, 0.0, -1.0e9);
        assert!(o.pitch <= cfg.max_pitch_deg.to_radians() + 1e-6);
        apply_pointer_delta(&cfg, &mut o, 0.0, 1.0e9);
        assert!(o.pitch >= cfg.min_pitch_deg.to_radians() - 1e-6);
    }

    #[test]
    fn invert_y_flips_sign() {
        let mut a = Orientation::default();
        let mut b = Orientation::default();
        let mut cfg = MouselookConfig {
            sensitivity_deg_per_px: 0.5,
            ..Default::default()
        };
        apply_pointer_delta(&cfg, &mut a, 0.0, 5.0);
        cfg.invert_y = true;
        apply_pointer_delta(&cfg, &mut b, 0.0, 5.0);
        assert!((a.pitch.abs() - b.pitch.abs()).abs() < 1e-6);
        assert!(a.pitch < 0.0 && b.pitch > 0.0);
    }

    #[test]
    fn nan_delta_leaves_orientation_untouched() {
        let mut o = Orientation {
            yaw: 0.4,
            pitch: -0.2,
            roll: 0.0,
        };
        let before = o;
        apply_pointer_delta(&MouselookConfig::default(), &mut o, f32::NAN, f32::NAN);
        assert!(o == before);
    }

    #[test]
    fn yaw_accumulates_and_is_unbounded() {
        let mut o = Orientation::default();
        let cfg = MouselookConfig {
            sensitivity_deg_per_px: 1.0,
            ..Default::default()
        };
        for _ in 0..720 {
            apply_pointer_delta(&cfg, &mut o, 1.0, 0.0);
        }
        assert!(o.yaw < -std::f32::consts::TAU);
    }
}

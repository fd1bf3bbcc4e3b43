//! Per-frame movement resolution against the walkable surface.

use glam::Vec3;

use crate::input::InputState;
use crate::systems::orientation::Orientation;
use crate::walkable::WalkableQuery;

#[derive(Clone, Copy, Debug)]
pub struct MovementConfig {
    /// Ground speed (m/s) for keyboard intents.
    pub base_speed_mps: f32,
    /// Speed multiplier for touch/on-screen intents; coarse touch travel is
    /// compensated to feel comparable to keyboard.
    pub touch_speed_mult: f32,
    /// Eye height above the feet point (m). The feet point is always exactly
    /// this far below the eye.
    pub eye_height_m: f32,
    /// Half-extent of the walkable search box centered on the feet point.
    pub search_half_extent_m: Vec3,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            base_speed_mps: 3.0,
            touch_speed_mult: 2.0,
            eye_height_m: 1.7,
            search_half_extent_m: Vec3::new(2.0, 4.0, 2.0),
        }
    }
}

/// Sum the displacement for this frame from both source channels.
///
/// Keyboard intents contribute `base_speed * dt`, touch/on-screen intents
/// `touch_speed_mult * base_speed * dt`, along the orientation's forward and
/// right axes. Vertical intents contribute world-up motion only in fly mode.
#[must_use]
pub fn displacement(
    input: InputState,
    ori: &Orientation,
    cfg: &MovementConfig,
    fly_mode: bool,
    dt: f32,
) -> Vec3 {
    let fwd = ori.forward();
    let right = ori.right();
    let mut acc = Vec3::ZERO;
    for (intents, mult) in [(input.keyboard, 1.0), (input.touch, cfg.touch_speed_mult)] {
        let step = cfg.base_speed_mps * mult * dt;
        if intents.forward {
            acc += fwd * step;
        }
        if intents.backward {
            acc -= fwd * step;
        }
        if intents.right {
            acc += right * step;
        }
        if intents.left {
            acc -= right * step;
        }
        if fly_mode {
            if intents.up {
                acc += Vec3::Y * step;
            }
            if intents.down {
                acc -= Vec3::Y * step;
            }
        }
    }
    acc
}

/// Resolve the eye position for this frame.
///
/// Fly mode applies the displacement directly. Grounded mode projects the
/// candidate onto the walkable surface via the feet point: on success the
/// returned point is authoritative (X/Z move, Y glued to the surface plus
/// eye height). If the direct candidate is off the surface, two axis slides
/// are tried from the original position — X only, then Z only — and the
/// first success wins; if both fail the viewer does not move this frame.
/// Frames with zero displacement never touch the query. With no index
/// available the displacement applies unconstrained.
#[must_use]
pub fn resolve(
    pos: Vec3,
    ori: &Orientation,
    input: InputState,
    fly_mode: bool,
    nav: Option<&dyn WalkableQuery>,
    cfg: &MovementConfig,
    dt: f32,
) -> Vec3 {
    let disp = displacement(input, ori, cfg, fly_mode, dt);
    if fly_mode {
        return pos + disp;
    }
    if disp == Vec3::ZERO {
        return pos;
    }
    let Some(nav) = nav else {
        return pos + disp;
    };

    let candidates = [
        Vec3::new(pos.x + disp.x, pos.y, pos.z + disp.z),
        Vec3::new(pos.x + disp.x, pos.y, pos.z),
        Vec3::new(pos.x, pos.y, pos.z + disp.z),
    ];
    for candidate in candidates {
        let feet = candidate - Vec3::Y * cfg.eye_height_m;
        if let Some(hit) = nav.nearest_walkable(feet, cfg.search_half_extent_m) {
            return Vec3::new(hit.x, hit.y + cfg.eye_height_m, hit.z);
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Intents;
    use approx::assert_abs_diff_eq;

    #[test]
    fn opposing_intents_cancel_exactly() {
        let input = InputState {
            keyboard: Intents {
                forward: true,
                backward: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let d = displacement(
            input,
            &Orientation::default(),
            &MovementConfig::default(),
            false,
            0.1,
        );
        assert_eq!(d, Vec3::ZERO);
    }

    #[test]
    fn touch_channel_is_boosted() {
        let fwd = Intents {
            forward: true,
            ..Default::default()
        };
        let cfg = MovementConfig::default();
        let o = Orientation::default();
        let kb = displacement(
            InputState {
                keyboard: fwd,
                ..Default::default()
            },
            &o,
            &cfg,
            false,
            0.1,
        );
        let tp = displacement(
            InputState {
                touch: fwd,
                ..Default::default()
            },
            &o,
            &cfg,
            false,
            0.1,
        );
        assert_abs_diff_eq!(
            tp.length(),
            cfg.touch_speed_mult * kb.length(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn vertical_intents_ignored_when_grounded() {
        let input = InputState {
            keyboard: Intents {
                up: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let d = displacement(
            input,
            &Orientation::default(),
            &MovementConfig::default(),
            false,
            0.1,
        );
        assert_eq!(d, Vec3::ZERO);
    }
}

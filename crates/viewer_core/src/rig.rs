//! Owned simulation state for the first-person viewer and its frame step.

use glam::{Quat, Vec3};

use crate::input::InputState;
use crate::systems::mouselook::{self, MouselookConfig};
use crate::systems::movement::{self, MovementConfig};
use crate::systems::orientation::Orientation;
use crate::systems::turn::{self, TurnParams};
use crate::walkable::WalkableQuery;

#[derive(Clone, Copy, Debug)]
pub struct StepConfig {
    pub mouselook: MouselookConfig,
    pub movement: MovementConfig,
    /// Yaw rate (rad/s) for held rotate intents.
    pub turn_rate_rad_per_s: f32,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            mouselook: MouselookConfig::default(),
            movement: MovementConfig::default(),
            turn_rate_rad_per_s: 1.5,
        }
    }
}

/// First-person rig: eye position plus authoritative orientation.
///
/// Created once at startup and mutated only by event handlers (look deltas,
/// external resets) and the once-per-frame `step`. Until the scene signals
/// ready, every update is a no-op so an uninitialized camera never moves.
#[derive(Debug, Clone, Copy)]
pub struct Rig {
    pub pos: Vec3,
    pub orientation: Orientation,
    pub fly_mode: bool,
    ready: bool,
}

impl Rig {
    #[must_use]
    pub fn new(pos: Vec3) -> Self {
        Self {
            pos,
            orientation: Orientation::default(),
            fly_mode: false,
            ready: false,
        }
    }

    #[must_use]
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// Gate for all movement/orientation updates; set once the scene (and
    /// the walkable surface derived from it) has loaded.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Render rotation for the camera host.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.orientation.quat()
    }

    /// Feet point for walkable queries: eye minus eye height, exactly.
    #[must_use]
    pub fn feet(&self, eye_height_m: f32) -> Vec3 {
        self.pos - Vec3::Y * eye_height_m
    }

    /// External transform reset (scene load, panel "reset view"): adopt the
    /// new pose and re-derive the authoritative orientation so later drag
    /// deltas compose with it instead of the stale base.
    pub fn teleport(&mut self, pos: Vec3, rot: Quat) {
        self.pos = pos;
        self.orientation.sync_from(rot);
    }

    /// Re-derive orientation from an externally set rotation only.
    pub fn sync_rotation(&mut self, rot: Quat) {
        self.orientation.sync_from(rot);
    }

    /// Apply a drag move event's pixel delta immediately (event-driven, not
    /// per-frame, so look stays responsive between redraws).
    pub fn apply_look(&mut self, cfg: &MouselookConfig, dx: f32, dy: f32) {
        if !self.ready {
            return;
        }
        mouselook::apply_pointer_delta(cfg, &mut self.orientation, dx, dy);
    }

    /// One simulated frame: held-rotate yaw, then movement resolution.
    ///
    /// Callable without a display loop; the platform invokes it once per
    /// redraw with the wall-clock dt.
    pub fn step(
        &mut self,
        input: &InputState,
        nav: Option<&dyn WalkableQuery>,
        cfg: &StepConfig,
        dt: f32,
    ) {
        if !self.ready {
            return;
        }
        self.orientation.yaw += turn::turn_delta(
            input.keyboard,
            input.touch,
            TurnParams {
                dt,
                rate_rad_per_s: cfg.turn_rate_rad_per_s,
            },
        );
        self.pos = movement::resolve(
            self.pos,
            &self.orientation,
            *input,
            self.fly_mode,
            nav,
            &cfg.movement,
            dt,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Intents;

    #[test]
    fn not_ready_ignores_everything() {
        let mut rig = Rig::new(Vec3::ZERO);
        let cfg = StepConfig::default();
        rig.apply_look(&cfg.mouselook, 100.0, 100.0);
        let input = InputState {
            keyboard: Intents {
                forward: true,
                ..Default::default()
            },
            ..Default::default()
        };
        rig.step(&input, None, &cfg, 0.1);
        assert_eq!(rig.pos, Vec3::ZERO);
        assert!((rig.orientation.yaw).abs() < 1e-9);
    }

    #[test]
    fn feet_is_exactly_eye_height_below() {
        let rig = Rig::new(Vec3::new(1.0, 3.0, -2.0));
        let feet = rig.feet(1.7);
        assert!((feet.y - 1.3).abs() < 1e-6);
        assert!((feet.x - 1.0).abs() < 1e-6 && (feet.z + 2.0).abs() < 1e-6);
    }

    #[test]
    fn teleport_resyncs_orientation() {
        let mut rig = Rig::new(Vec3::ZERO);
        rig.set_ready(true);
        let rot = Quat::from_rotation_y(1.0);
        rig.teleport(Vec3::new(5.0, 1.7, 5.0), rot);
        assert!((rig.orientation.yaw - 1.0).abs() < 1e-4);
        assert_eq!(rig.pos, Vec3::new(5.0, 1.7, 5.0));
    }
}

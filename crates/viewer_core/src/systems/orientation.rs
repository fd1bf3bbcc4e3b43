//! Persistent viewer orientation and its render-ready rotation.

use glam::{EulerRot, Quat, Vec3};

/// Authoritative look orientation: yaw/pitch/roll in radians.
///
/// Yaw is unbounded (wraps naturally through the trig in the basis vectors);
/// pitch stays within [-FRAC_PI_2, FRAC_PI_2] so the view never flips over
/// the poles; roll is carried along untouched by first-person look so an
/// externally tilted camera keeps its tilt.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Orientation {
    /// Render rotation, composed yaw then pitch then roll (YXZ order) so
    /// roll stays independent of look direction.
    #[must_use]
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }

    /// World-space forward (the viewer's local -Z axis).
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.quat() * Vec3::NEG_Z
    }

    /// World-space right (the viewer's local +X axis).
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.quat() * Vec3::X
    }

    /// Re-derive yaw/pitch/roll from an externally set rotation.
    ///
    /// Called whenever the camera transform changes outside the integrator
    /// (scene load, teleport, discrete reset) so subsequent incremental
    /// updates compose with the new base instead of snapping back.
    pub fn sync_from(&mut self, rot: Quat) {
        let (yaw, pitch, roll) = rot.to_euler(EulerRot::YXZ);
        self.yaw = yaw;
        self.pitch = pitch.clamp(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);
        self.roll = roll;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identity_faces_neg_z() {
        let o = Orientation::default();
        let f = o.forward();
        assert_abs_diff_eq!(f.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(f.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn quarter_yaw_turns_forward_to_neg_x() {
        let o = Orientation {
            yaw: std::f32::consts::FRAC_PI_2,
            ..Default::default()
        };
        let f = o.forward();
        assert_abs_diff_eq!(f.x, -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(f.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn sync_roundtrips_euler() {
        let mut o = Orientation::default();
        let rot = Quat::from_euler(EulerRot::YXZ, 1.2, -0.7, 0.1);
        o.sync_from(rot);
        assert_abs_diff_eq!(o.yaw, 1.2, epsilon = 1e-4);
        assert_abs_diff_eq!(o.pitch, -0.7, epsilon = 1e-4);
        assert_abs_diff_eq!(o.roll, 0.1, epsilon = 1e-4);
    }

    #[test]
    fn right_is_orthogonal_to_forward() {
        let o = Orientation {
            yaw: 0.8,
            pitch: 0.3,
            roll: 0.0,
        };
        assert_abs_diff_eq!(o.forward().dot(o.right()), 0.0, epsilon = 1e-5);
    }
}

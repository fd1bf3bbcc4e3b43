//! Camera utilities: first-person view/projection from the rig pose.

use glam::{Mat4, Quat, Vec3};

pub struct Camera {
    pub eye: Vec3,
    pub rotation: Quat,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    #[must_use]
    pub fn first_person(eye: Vec3, rotation: Quat, aspect: f32, fovy: f32) -> Self {
        Self {
            eye,
            rotation,
            aspect,
            fovy,
            znear: 0.05,
            zfar: 200.0,
        }
    }

    #[must_use]
    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::from_rotation_translation(self.rotation, self.eye).inverse();
        let proj = Mat4::perspective_rh(self.fovy, self.aspect.max(1e-3), self.znear, self.zfar);
        proj * view
    }
}

//! Dome interior geometry: hemispherical screen plus a walkable floor disk.

use glam::{Mat3, Vec3};

use crate::gfx::types::MeshCpu;

#[derive(Clone, Copy, Debug)]
pub struct DomeParams {
    pub radius_m: f32,
    /// Tilt of the dome toward the audience, degrees.
    pub tilt_deg: f32,
    /// Latitude subdivisions of the hemisphere.
    pub rings: u32,
    /// Longitude subdivisions.
    pub segments: u32,
}

impl Default for DomeParams {
    fn default() -> Self {
        Self {
            radius_m: 8.0,
            tilt_deg: 0.0,
            rings: 32,
            segments: 64,
        }
    }
}

/// CPU geometry for one dome scene. The floor doubles as the walkable
/// surface the navigation index is built from.
#[derive(Debug, Clone)]
pub struct DomeScene {
    pub dome: MeshCpu,
    pub floor: MeshCpu,
}

/// Fisheye ("domemaster") texture coordinates for a unit direction on the
/// hemisphere: zenith maps to the image center, the springline to the rim.
fn domemaster_uv(dir: Vec3) -> [f32; 2] {
    let zenith = dir.y.clamp(-1.0, 1.0).acos();
    let r = 0.5 * zenith / std::f32::consts::FRAC_PI_2;
    let azimuth = dir.x.atan2(-dir.z);
    [0.5 + r * azimuth.sin(), 0.5 - r * azimuth.cos()]
}

/// Hemispherical screen, wound to face the interior viewer.
#[must_use]
pub fn dome_mesh(p: &DomeParams) -> MeshCpu {
    let tilt = Mat3::from_rotation_x(p.tilt_deg.to_radians());
    let mut mesh = MeshCpu::default();
    let rings = p.rings.max(2);
    let segments = p.segments.max(3);

    for ring in 0..=rings {
        let zenith = std::f32::consts::FRAC_PI_2 * (ring as f32) / (rings as f32);
        for seg in 0..=segments {
            let azimuth = std::f32::consts::TAU * (seg as f32) / (segments as f32);
            let dir = Vec3::new(
                zenith.sin() * azimuth.sin(),
                zenith.cos(),
                -zenith.sin() * azimuth.cos(),
            );
            mesh.uvs.push(domemaster_uv(dir));
            let dir = tilt * dir;
            mesh.positions.push((dir * p.radius_m).to_array());
            // Interior surface: normals point inward.
            mesh.normals.push((-dir).to_array());
        }
    }

    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            // Inward-facing winding.
            mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }
    mesh
}

/// Flat floor disk at y = 0; this is the walkable surface.
#[must_use]
pub fn floor_mesh(p: &DomeParams) -> MeshCpu {
    let mut mesh = MeshCpu::default();
    let segments = p.segments.max(3);
    mesh.positions.push([0.0, 0.0, 0.0]);
    mesh.normals.push([0.0, 1.0, 0.0]);
    mesh.uvs.push([0.5, 0.5]);
    for seg in 0..=segments {
        let azimuth = std::f32::consts::TAU * (seg as f32) / (segments as f32);
        let (s, c) = azimuth.sin_cos();
        mesh.positions.push([p.radius_m * s, 0.0, -p.radius_m * c]);
        mesh.normals.push([0.0, 1.0, 0.0]);
        mesh.uvs.push([0.5 + 0.5 * s, 0.5 - 0.5 * c]);
    }
    for seg in 1..=segments {
        // Counter-clockwise seen from above (+Y).
        mesh.indices.extend_from_slice(&[0, seg + 1, seg]);
    }
    mesh
}

#[must_use]
pub fn build_scene(p: &DomeParams) -> DomeScene {
    DomeScene {
        dome: dome_mesh(p),
        floor: floor_mesh(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn dome_vertices_sit_on_the_radius() {
        let p = DomeParams::default();
        let m = dome_mesh(&p);
        m.validate().expect("valid mesh");
        for pos in &m.positions {
            let d = Vec3::from_array(*pos).length();
            assert_abs_diff_eq!(d, p.radius_m, epsilon = 1e-3);
        }
    }

    #[test]
    fn dome_uvs_stay_in_unit_square() {
        let m = dome_mesh(&DomeParams::default());
        for uv in &m.uvs {
            assert!((0.0..=1.0).contains(&uv[0]) && (0.0..=1.0).contains(&uv[1]));
        }
    }

    #[test]
    fn floor_is_flat_and_walkable_up() {
        let p = DomeParams::default();
        let m = floor_mesh(&p);
        m.validate().expect("valid mesh");
        for (pos, n) in m.positions.iter().zip(&m.normals) {
            assert_abs_diff_eq!(pos[1], 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(n[1], 1.0, epsilon = 1e-6);
        }
        // Fan triangulation covers every rim segment.
        assert_eq!(m.indices.len() as u32, p.segments.max(3) * 3);
    }

    #[test]
    fn floor_winding_faces_up() {
        let m = floor_mesh(&DomeParams::default());
        let tri = &m.indices[0..3];
        let a = Vec3::from_array(m.positions[tri[0] as usize]);
        let b = Vec3::from_array(m.positions[tri[1] as usize]);
        let c = Vec3::from_array(m.positions[tri[2] as usize]);
        let n = (b - a).cross(c - a);
        assert!(n.y > 0.0);
    }

    #[test]
    fn zenith_maps_to_image_center() {
        let uv = domemaster_uv(Vec3::Y);
        assert_abs_diff_eq!(uv[0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(uv[1], 0.5, epsilon = 1e-6);
    }
}

//! GPU-facing plain-old-data types and the CPU mesh container.

use anyhow::Result;

/// Per-frame uniforms shared by every draw.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    /// x = brightness, y = contrast, z = saturation, w unused.
    pub grade: [f32; 4],
}

/// Per-draw uniforms: flat tint and media blend flag.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Model {
    pub tint: [f32; 4],
    /// x = 1.0 to sample the media texture, 0.0 for flat tint.
    pub flags: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// A single CPU mesh buffer (positions, normals, uvs, indices).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshCpu {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshCpu {
    /// Validate CPU mesh invariants before upload.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.positions.len() == self.normals.len(),
            "pos/normal len mismatch"
        );
        anyhow::ensure!(self.positions.len() == self.uvs.len(), "pos/uv len mismatch");
        anyhow::ensure!(
            self.indices.len().is_multiple_of(3),
            "indices not multiple of 3"
        );
        let max = self.positions.len() as u32;
        anyhow::ensure!(
            self.indices.iter().all(|i| *i < max),
            "index out of bounds"
        );
        Ok(())
    }

    /// Interleave into the GPU vertex layout.
    #[must_use]
    pub fn vertices(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), t)| Vertex {
                pos: *p,
                normal: *n,
                uv: *t,
            })
            .collect()
    }
}

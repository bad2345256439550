//! GPU-side vertex types for point rendering

use bytemuck::{Pod, Zeroable};

/// One particle: world position and color blend ratio.
///
/// Drawn instanced; the vertex shader expands each instance into a quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct PointInstance {
    pub position: [f32; 3],
    pub color_ratio: f32,
}

impl PointInstance {
    pub const fn new(x: f32, y: f32, z: f32, color_ratio: f32) -> Self {
        Self {
            position: [x, y, z],
            color_ratio,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}

/// Interleave field buffers into `out`, reusing its allocation
pub fn fill_instances(out: &mut Vec<PointInstance>, positions: &[f32], color_ratios: &[f32]) {
    out.clear();
    out.extend(
        positions
            .chunks_exact(3)
            .zip(color_ratios)
            .map(|(p, &ratio)| PointInstance::new(p[0], p[1], p[2], ratio)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<PointInstance>(), 16);
    }

    #[test]
    fn test_fill_instances_interleaves() {
        let mut out = Vec::with_capacity(8);
        fill_instances(&mut out, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[0.25, 0.75]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].position, [4.0, 5.0, 6.0]);
        assert_eq!(out[1].color_ratio, 0.75);

        let cap = out.capacity();
        fill_instances(&mut out, &[0.0, 0.0, 0.0], &[0.5]);
        assert_eq!(out.len(), 1);
        assert_eq!(out.capacity(), cap);
    }
}

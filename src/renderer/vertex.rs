//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Ink-on-paper palette
pub mod colors {
    /// Rice paper, #f1e6c8
    pub const PAPER: [f32; 4] = [0.945, 0.902, 0.784, 1.0];
    /// Slate ink, rgb(15, 23, 42)
    pub const INK: [f32; 4] = [0.059, 0.090, 0.165, 1.0];
    /// Seal-stamp vermilion
    pub const VERMILION: [f32; 4] = [0.82, 0.20, 0.13, 1.0];
    pub const GOLD: [f32; 4] = [0.85, 0.66, 0.22, 1.0];

    pub const DOKKAEBI: [f32; 4] = [0.16, 0.20, 0.30, 1.0];
    pub const GHOST: [f32; 4] = [0.42, 0.47, 0.56, 1.0];
    pub const GATE: [f32; 4] = [0.10, 0.10, 0.12, 1.0];
    pub const WRAITH: [f32; 4] = [0.33, 0.16, 0.30, 1.0];

    /// Same color with a different alpha
    pub fn with_alpha(c: [f32; 4], a: f32) -> [f32; 4] {
        [c[0], c[1], c[2], a.clamp(0.0, 1.0)]
    }

    /// Linear blend between two colors
    pub fn mix(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
        let t = t.clamp(0.0, 1.0);
        [
            a[0] + (b[0] - a[0]) * t,
            a[1] + (b[1] - a[1]) * t,
            a[2] + (b[2] - a[2]) * t,
            a[3] + (b[3] - a[3]) * t,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::colors::*;

    #[test]
    fn test_mix_endpoints() {
        assert_eq!(mix(PAPER, INK, 0.0), PAPER);
        let clamped = mix(PAPER, INK, 7.0);
        for i in 0..4 {
            assert!((clamped[i] - INK[i]).abs() < 1e-6);
        }
        assert_eq!(with_alpha(INK, 2.0)[3], 1.0);
    }
}

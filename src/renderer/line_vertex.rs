#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub(crate) position: [f32; 3],
    pub(crate) color: [f32; 3],
}

impl LineVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Square grid on the XZ plane, `size` wide with `divisions` cells per side.
/// The two lines through the origin get `center_color`.
pub fn grid_lines(
    size: f32,
    divisions: u32,
    center_color: [f32; 3],
    line_color: [f32; 3],
) -> Vec<LineVertex> {
    let half = size / 2.0;
    let step = size / divisions as f32;
    let center = divisions / 2;

    let mut vertices = Vec::with_capacity((divisions as usize + 1) * 4);
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let color = if i == center { center_color } else { line_color };

        vertices.push(LineVertex {
            position: [-half, 0.0, k],
            color,
        });
        vertices.push(LineVertex {
            position: [half, 0.0, k],
            color,
        });
        vertices.push(LineVertex {
            position: [k, 0.0, -half],
            color,
        });
        vertices.push(LineVertex {
            position: [k, 0.0, half],
            color,
        });
    }
    vertices
}

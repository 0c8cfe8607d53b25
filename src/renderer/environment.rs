use half::f16;
use log::debug;

use crate::asset::loader::HdrImage;

const F16_MAX: f32 = 65504.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

/// Full mip chain down to 1x1, each level a 2x2 box filter of the previous
/// one. Rough surfaces sample the blurrier levels.
pub fn build_mip_chain(image: &HdrImage) -> Vec<MipLevel> {
    let mut levels = vec![MipLevel {
        width: image.width.max(1),
        height: image.height.max(1),
        pixels: image.pixels.clone(),
    }];

    while let Some(prev) = levels.last() {
        if prev.width == 1 && prev.height == 1 {
            break;
        }
        let next = downsample(prev);
        levels.push(next);
    }
    levels
}

fn downsample(src: &MipLevel) -> MipLevel {
    let width = (src.width / 2).max(1);
    let height = (src.height / 2).max(1);
    let at = |x: u32, y: u32| -> [f32; 4] {
        let x = x.min(src.width - 1);
        let y = y.min(src.height - 1);
        src.pixels
            .get((y * src.width + x) as usize)
            .copied()
            .unwrap_or([0.0, 0.0, 0.0, 1.0])
    };

    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let samples = [
                at(x * 2, y * 2),
                at(x * 2 + 1, y * 2),
                at(x * 2, y * 2 + 1),
                at(x * 2 + 1, y * 2 + 1),
            ];
            let mut sum = [0.0f32; 4];
            for s in samples {
                for c in 0..4 {
                    sum[c] += s[c];
                }
            }
            pixels.push(sum.map(|c| c / 4.0));
        }
    }
    MipLevel {
        width,
        height,
        pixels,
    }
}

fn to_f16_bytes(pixels: &[[f32; 4]]) -> Vec<u8> {
    pixels
        .iter()
        .flat_map(|p| p.iter())
        .flat_map(|&c| {
            let c = if c.is_finite() { c.clamp(0.0, F16_MAX) } else { 0.0 };
            f16::from_f32(c).to_bits().to_le_bytes()
        })
        .collect()
}

/// Equirectangular environment on the GPU, `Rgba16Float` with mips.
/// The view keeps its texture alive.
pub struct EnvironmentMap {
    pub view: wgpu::TextureView,
    pub mip_count: u32,
}

impl EnvironmentMap {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, image: &HdrImage) -> Self {
        let levels = build_mip_chain(image);
        let mip_count = levels.len() as u32;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Environment Texture"),
            size: wgpu::Extent3d {
                width: levels[0].width,
                height: levels[0].height,
                depth_or_array_layers: 1,
            },
            mip_level_count: mip_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba16Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip, level) in levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &to_f16_bytes(&level.pixels),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(8 * level.width),
                    rows_per_image: Some(level.height),
                },
                wgpu::Extent3d {
                    width: level.width,
                    height: level.height,
                    depth_or_array_layers: 1,
                },
            );
        }
        debug!(
            "Uploaded environment {}x{} with {} mips",
            levels[0].width, levels[0].height, mip_count
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { view, mip_count }
    }

    /// Flat gray sky used until the real map arrives.
    pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let image = HdrImage {
            pixels: vec![[0.5, 0.5, 0.5, 1.0]],
            width: 1,
            height: 1,
        };
        Self::upload(device, queue, &image)
    }

    pub fn max_lod(&self) -> f32 {
        self.mip_count.saturating_sub(1) as f32
    }
}

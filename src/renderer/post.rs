use bytemuck::{Pod, Zeroable};

use crate::settings::PostSettings;

/// Keeps the contrast divisor `1 - contrast` away from zero.
const MAX_CONTRAST: f32 = 0.999;

/// Tone mapping and color grading parameters for post.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PostUniform {
    pub exposure: f32,
    pub brightness: f32,
    pub contrast: f32,
    /// 1.0 when the swapchain is not an sRGB format.
    pub encode_srgb: f32,
}

impl PostUniform {
    pub fn new(exposure: f32, post: &PostSettings, surface_is_srgb: bool) -> Self {
        Self {
            exposure: exposure.max(0.0),
            brightness: post.brightness.clamp(-1.0, 1.0),
            contrast: post.contrast.clamp(-1.0, MAX_CONTRAST),
            encode_srgb: if surface_is_srgb { 0.0 } else { 1.0 },
        }
    }
}

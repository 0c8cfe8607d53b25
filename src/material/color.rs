/// sRGB transfer function inverse, per channel.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// 8-bit sRGB color to linear RGB.
pub fn srgb8_to_linear(rgb: [u8; 3]) -> [f32; 3] {
    rgb.map(|c| srgb_to_linear(c as f32 / 255.0))
}

pub const LIGHT_GRAY: [u8; 3] = [0xd3, 0xd3, 0xd3];
pub const GRAY: [u8; 3] = [0x80, 0x80, 0x80];
pub const BLUE: [u8; 3] = [0x00, 0x00, 0xff];

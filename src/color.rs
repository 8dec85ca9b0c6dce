//! Color and pixel output

pub use glam::Vec3A as Color;

/// Exponent applied to each channel when encoding 8-bit output.
pub const GAMMA: f32 = 0.6;

/// Maps a linear channel value to a byte: clamp to `[0, 1]`, raise to [GAMMA],
/// scale by 255 and truncate.
#[inline]
pub fn encode_channel(value: f32) -> u8 {
    // NaN clamps to NaN and casts to 0
    (255.0 * value.clamp(0.0, 1.0).powf(GAMMA)) as u8
}

// conversion for sdr pixels
pub trait VecExt<P: image::Pixel> {
    fn to_pixel(self) -> P;
}

impl VecExt<image::Rgb<u8>> for Color {
    fn to_pixel(self) -> image::Rgb<u8> {
        image::Rgb::<u8>(self.to_array().map(encode_channel))
    }
}

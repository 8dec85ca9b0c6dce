//! Linear RGB framebuffer and image file output.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use thiserror::Error;

use crate::color::{encode_channel, Color, VecExt};

/// Failure to write a rendered image.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write image file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Row-major buffer of `width * height` linear RGB values, row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Framebuffer {
    /// Creates a black framebuffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Value of the pixel in column `x` of row `y`.
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Gamma-encoded bytes, three per pixel, in buffer order.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| c.to_array().map(encode_channel))
            .collect()
    }

    /// Writes the buffer as a binary PPM (`P6`) image.
    ///
    /// Written by hand rather than through [image]'s PNM encoder to pin the exact
    /// `P6\n<w> <h>\n255\n` header followed by raw RGB bytes.
    pub fn write_ppm<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        write!(writer, "P6\n{} {}\n255\n", self.width, self.height)?;
        writer.write_all(&self.to_rgb_bytes())?;
        writer.flush()
    }

    pub fn to_image(&self) -> image::RgbImage {
        image::ImageBuffer::from_fn(self.width, self.height, |x, y| {
            self.pixels[y as usize * self.width as usize + x as usize].to_pixel()
        })
    }

    /// Saves the buffer to `path`, choosing the format from the file extension.
    ///
    /// `.ppm` files are written directly; other formats go through [image].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        let path = path.as_ref();
        let is_ppm = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("ppm"));

        if is_ppm {
            self.write_ppm(BufWriter::new(File::create(path)?))?;
        } else {
            self.to_image().save(path)?;
        }

        log::info!("wrote {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

//! Render a [Framebuffer] given a [Scene] and a [Camera].
//!
//! The image rows are split into contiguous bands, one per worker, each with its
//! own random number generator. Bands write to disjoint slices of the
//! framebuffer, so the only shared mutable state is the progress counter.

use std::{
    ops::Range,
    sync::atomic::{AtomicUsize, Ordering},
    time::Instant,
};

use indicatif::ProgressBar;
use rand::{rngs::SmallRng, SeedableRng};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    camera::Camera, color::Color, framebuffer::Framebuffer, scene::Scene,
    utils::progress::get_progressbar,
};

/// Image Renderer storing image dimensions, samples per pixel and scheduling options
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    width: u32,
    height: u32,
    samples_per_pixel: u32,
    threads: Option<usize>,
    seed: Option<u64>,
}

/// One band of rows and the framebuffer slice it owns.
struct Band<'a> {
    index: usize,
    rows: Range<u32>,
    pixels: &'a mut [Color],
}

/// Splits `height` rows into `count` contiguous bands of `height / count` rows,
/// the last band also taking the remainder.
pub fn row_bands(height: u32, count: usize) -> Vec<Range<u32>> {
    let count = (count.max(1) as u32).min(height.max(1));
    let rows_per_band = height / count;
    (0..count)
        .map(|band| {
            let start = band * rows_per_band;
            let end = if band == count - 1 {
                height
            } else {
                start + rows_per_band
            };
            start..end
        })
        .collect()
}

/// Number of workers when none is requested.
fn default_thread_count() -> usize {
    #[cfg(feature = "parallel")]
    {
        rayon::current_num_threads()
    }
    #[cfg(not(feature = "parallel"))]
    {
        std::thread::available_parallelism().map_or(1, |n| n.get())
    }
}

impl Renderer {
    /// Creates a new [Renderer].
    pub fn new(width: u32, height: u32, samples_per_pixel: u32) -> Self {
        Self {
            width,
            height,
            samples_per_pixel: samples_per_pixel.max(1),
            threads: None,
            seed: None,
        }
    }

    /// Uses `threads` bands instead of one per worker thread.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }

    /// Seeds every band's generator from `seed`, making renders reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Averages `samples_per_pixel` radiance estimates through the center of
    /// every pixel in the band.
    fn render_band(
        &self,
        scene: &Scene,
        camera: &Camera,
        band: Band<'_>,
        base_seed: u64,
        completed: &AtomicUsize,
        progress_bar: &ProgressBar,
    ) {
        let mut rng = SmallRng::seed_from_u64(base_seed.wrapping_add(band.index as u64));
        let row_len = self.width as usize;

        for (j, row) in band.rows.zip(band.pixels.chunks_exact_mut(row_len)) {
            for (i, pixel) in (0..self.width).zip(row.iter_mut()) {
                let ray = camera.get_ray(i, j, self.width, self.height);
                let sum: Color = (0..self.samples_per_pixel)
                    .map(|_| scene.cast_ray(&ray, 0, &mut rng))
                    .sum();
                *pixel = sum / self.samples_per_pixel as f32;
            }

            let done = completed.fetch_add(row_len, Ordering::Relaxed) + row_len;
            progress_bar.set_position(done as u64);
        }
    }

    /// Generates an image of `scene` as seen from `camera`.
    ///
    /// The scene must have had its BVH built. Progress is shown on the commandline.
    pub fn render(&self, scene: &Scene, camera: &Camera) -> Framebuffer {
        let mut framebuffer = Framebuffer::new(self.width, self.height);
        if self.width == 0 || self.height == 0 {
            return framebuffer;
        }

        let base_seed = self.seed.unwrap_or_else(rand::random);
        let rows = row_bands(
            self.height,
            self.threads.unwrap_or_else(default_thread_count),
        );
        log::info!(
            "rendering {}x{} at {} spp in {} bands",
            self.width,
            self.height,
            self.samples_per_pixel,
            rows.len()
        );

        // hand every band its own slice of the buffer
        let mut bands = Vec::with_capacity(rows.len());
        let mut rest = framebuffer.pixels_mut();
        for (index, rows) in rows.into_iter().enumerate() {
            let len = (rows.end - rows.start) as usize * self.width as usize;
            let (pixels, tail) = rest.split_at_mut(len);
            rest = tail;
            bands.push(Band {
                index,
                rows,
                pixels,
            });
        }

        let total = self.width as usize * self.height as usize;
        let progress_bar = get_progressbar(total as u64).with_prefix("Rendering");
        let completed = AtomicUsize::new(0);
        let start = Instant::now();

        #[cfg(feature = "parallel")]
        bands.into_par_iter().for_each(|band| {
            self.render_band(scene, camera, band, base_seed, &completed, &progress_bar)
        });
        #[cfg(not(feature = "parallel"))]
        bands.into_iter().for_each(|band| {
            self.render_band(scene, camera, band, base_seed, &completed, &progress_bar)
        });

        progress_bar.finish_and_clear();
        log::info!(
            "rendered {} pixels in {:.2?}",
            completed.load(Ordering::Relaxed),
            start.elapsed()
        );

        framebuffer
    }
}

//! Definition of command line arguments

use clap::Parser;

pub use clap_verbosity_flag::Verbosity;

use crate::{
    scene::{DEFAULT_MAX_DEPTH, DEFAULT_RUSSIAN_ROULETTE},
    scenes::SceneType,
};

/// Parses the commandline arguments into an [Arguments] struct
pub fn parse_args() -> Arguments {
    Arguments::parse()
}

/// Argument definitions for [clap::Parser]
#[derive(Parser, Debug)]
#[clap(version, about)]
pub struct Arguments {
    /// The path to the file to write the resulting image into
    #[clap(
        short,
        long,
        value_parser = valid_image_file,
        default_value = "cornellbox.ppm",
        value_name = "FILE"
    )]
    pub output: std::path::PathBuf,

    /// The width of the generated image
    #[clap(
        short = 'w',
        long = "width",
        value_parser = valid_count::<u32>,
        default_value_t = 48,
        value_name = "NUM"
    )]
    pub image_width: u32,

    /// The height of the generated image
    #[clap(
        short = 'H',
        long = "height",
        value_parser = valid_count::<u32>,
        default_value_t = 64,
        value_name = "NUM"
    )]
    pub image_height: u32,

    /// samples per pixel
    ///
    /// A higher count of samples leads to less noise due to more paths averaged for a pixel
    #[clap(
        short = 'n',
        long = "samples",
        value_parser = valid_count::<u32>,
        default_value_t = 16,
        value_name = "NUM"
    )]
    pub samples_per_pixel: u32,

    /// maximum number of segments in a light path
    #[clap(
        short,
        long = "depth",
        value_parser = valid_count::<u32>,
        default_value_t = DEFAULT_MAX_DEPTH,
        value_name = "NUM"
    )]
    pub max_depth: u32,

    /// probability of extending a light path past each bounce
    #[clap(
        short,
        long,
        value_parser = valid_probability,
        default_value_t = DEFAULT_RUSSIAN_ROULETTE,
        value_name = "P"
    )]
    pub russian_roulette: f32,

    /// vertical field of view in degrees, overriding the scene's camera
    #[clap(long, value_parser = valid_fov, value_name = "DEGREES")]
    pub fov: Option<f32>,

    /// number of row bands rendered in parallel, one per worker thread by default
    #[clap(short, long, value_parser = valid_count::<usize>, value_name = "NUM")]
    pub threads: Option<usize>,

    /// The hardcoded scene to use
    #[clap(short, long, value_enum, default_value_t = SceneType::CornellBox)]
    pub scene: SceneType,

    /// The seed used for psuedorandom number generation
    #[clap(long)]
    pub seed: Option<u64>,

    #[clap(flatten)]
    pub verbosity: self::Verbosity,
}

/// Checks whether the given integer value is greater than 0
fn valid_count<T>(s: &str) -> Result<T, String>
where
    T: num_traits::PrimInt + std::str::FromStr,
    <T as std::str::FromStr>::Err: std::fmt::Display,
{
    match s.parse::<T>() {
        Ok(count) => {
            if count > T::zero() {
                Ok(count)
            } else {
                Err("count must be greater than 0".to_string())
            }
        }
        Err(e) => Err(e.to_string()),
    }
}

/// Checks whether the given value lies in `(0, 1]`
fn valid_probability(s: &str) -> Result<f32, String> {
    let p = s.parse::<f32>().map_err(|e| e.to_string())?;
    if p > 0.0 && p <= 1.0 {
        Ok(p)
    } else {
        Err("probability must be in (0, 1]".to_string())
    }
}

/// Checks whether the given angle lies in `(0, 180)`
fn valid_fov(s: &str) -> Result<f32, String> {
    let fov = s.parse::<f32>().map_err(|e| e.to_string())?;
    if fov > 0.0 && fov < 180.0 {
        Ok(fov)
    } else {
        Err("field of view must be between 0 and 180 degrees".to_string())
    }
}

/// Checks whether the given output file is valid
///
/// Checks the following properties:
/// * a valid path (always the case)
/// * a supported image format
fn valid_image_file(s: &str) -> Result<std::path::PathBuf, String> {
    let path = std::path::PathBuf::from(s);
    match image::ImageFormat::from_path(&path).and_then(valid_image_format) {
        Ok(_) => Ok(path),
        Err(e) => Err(e.to_string()),
    }
}

/// Helper func for [valid_image_file] to check against compiled image formats
///
/// Since [image::ImageOutputFormat] conditionally compiles the supported formats,
/// use that existing functionality instead of manually parsing which formats
/// this crate supports against the feature flags of this crate.
fn valid_image_format(format: image::ImageFormat) -> image::ImageResult<()> {
    use image::{error, ImageOutputFormat};
    match ImageOutputFormat::from(format) {
        ImageOutputFormat::Unsupported(_) => Err(error::ImageError::Unsupported(
            error::UnsupportedError::from(error::ImageFormatHint::from(format)),
        )),
        _ => Ok(()),
    }
}

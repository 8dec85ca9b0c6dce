mod bounds;
mod utils;

// public: acceleration structure
pub mod bvh;
// public: pinhole camera
pub mod camera;
// public: commandline parser
pub mod cli;
// public: color alias and encoding
pub mod color;
// public: render output
pub mod framebuffer;
// public: `Hittable` trait and primitives
pub mod hittables;
// public: light records
pub mod light;
// public: surface material
pub mod material;
// public: rays
pub mod ray;
// public: renderer functionality
pub mod render;
// public: scene container and estimator
pub mod scene;
// public: scene selection
pub mod scenes;

pub use bounds::BoundingBox;

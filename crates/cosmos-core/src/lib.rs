pub mod audio;
pub mod blobs;
pub mod camera;
pub mod clock;
pub mod cluster;
pub mod constants;
pub mod error;
pub mod flock;
pub mod lights;
pub mod noise;
pub mod scene;
pub mod shell;

pub use audio::*;
pub use blobs::*;
pub use camera::*;
pub use clock::*;
pub use cluster::*;
pub use constants::*;
pub use error::ConfigError;
pub use flock::*;
pub use lights::*;
pub use noise::*;
pub use scene::*;
pub use shell::*;

// Shaders bundled as string constants
pub static CLUSTER_WGSL: &str = include_str!("../shaders/cluster.wgsl");
pub static PARTICLES_WGSL: &str = include_str!("../shaders/particles.wgsl");
pub static BLOBS_WGSL: &str = include_str!("../shaders/blobs.wgsl");

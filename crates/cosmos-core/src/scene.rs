use crate::audio::{AudioFrame, SpectrumSource};
use crate::blobs::{BlobField, BlobParams};
use crate::clock::FrameTime;
use crate::cluster::{ClusterParams, SphereCluster};
use crate::error::ConfigError;
use crate::flock::{Flock, FlockParams};
use crate::lights::{orbit_lights, OrbitLight, LIGHT_COUNT};

/// Parameters for every simulator in the scene.
#[derive(Clone, Debug, Default)]
pub struct SceneParams {
    pub cluster: ClusterParams,
    pub flock: FlockParams,
    pub blobs: BlobParams,
}

impl SceneParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cluster.validate()?;
        self.flock.validate()?;
        self.blobs.validate()
    }
}

/// Everything advanced by the per-frame callback.
///
/// The host owns the clock and calls [`Scene::step`] once per display
/// refresh; the scene never draws, it only exposes buffers.
pub struct Scene {
    pub cluster: SphereCluster,
    pub flock: Flock,
    pub blobs: BlobField,
    lights: [OrbitLight; LIGHT_COUNT],
    time: FrameTime,
    ticks: u64,
    audio_ready: bool,
}

impl Scene {
    pub fn new(params: SceneParams, seed: u64) -> Result<Self, ConfigError> {
        params.validate()?;
        // Derive per-simulator seeds so each stream is independent but reproducible
        let mix = |i: u64| seed ^ (i + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let scene = Self {
            cluster: SphereCluster::new(params.cluster, mix(0))?,
            flock: Flock::new(params.flock, mix(1))?,
            blobs: BlobField::new(params.blobs, mix(2))?,
            lights: orbit_lights(0.0),
            time: FrameTime::default(),
            ticks: 0,
            audio_ready: false,
        };
        log::info!("[scene] seed={seed}");
        Ok(scene)
    }

    pub fn step(&mut self, time: FrameTime, audio: Option<AudioFrame<'_>>) {
        let ready = audio.is_some_and(|a| !a.spectrum().is_empty());
        if ready != self.audio_ready {
            if ready {
                log::info!("[scene] audio available at t={:.2}s", time.elapsed);
            } else {
                log::info!("[scene] audio lost at t={:.2}s, holding cluster", time.elapsed);
            }
            self.audio_ready = ready;
        }
        self.cluster.step(time, audio);
        self.flock.step(time);
        self.blobs.step(time);
        self.lights = orbit_lights(time.elapsed);
        self.time = time;
        self.ticks += 1;
    }

    /// Refresh `source`, sample it once, and step.
    pub fn step_with_source<S: SpectrumSource + ?Sized>(&mut self, time: FrameTime, source: &mut S) {
        source.refresh();
        let frame = source.frame();
        self.step(time, frame);
    }

    pub fn lights(&self) -> &[OrbitLight; LIGHT_COUNT] {
        &self.lights
    }

    pub fn time(&self) -> FrameTime {
        self.time
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn audio_ready(&self) -> bool {
        self.audio_ready
    }
}

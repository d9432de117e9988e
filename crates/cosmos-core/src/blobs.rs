//! Small 2D N-body system feeding a metaball field shader.
//!
//! Blobs attract each other, drift toward a wandering target, occasionally
//! split when large, and merge when they touch. The live population always
//! stays within `1..=max_count`, and the GPU sees a fixed-size array with
//! unused entries parked off-screen.

use crate::clock::FrameTime;
use crate::constants::*;
use crate::error::{self, ConfigError};
use glam::Vec2;
use rand::prelude::*;
use smallvec::SmallVec;

#[derive(Clone, Debug)]
pub struct BlobParams {
    pub initial_count: usize,
    /// Population cap, never above [`BLOB_CAPACITY`].
    pub max_count: usize,
    pub attraction_range: f32,
    pub attraction_strength: f32,
    pub merge_distance: f32,
    pub split_threshold: f32,
    pub split_chance: f32,
    pub max_speed: f32,
    pub drift_strength: f32,
    /// Half-extent of the square domain.
    pub bounds: f32,
    pub max_radius: f32,
    /// Velocity decay per reference frame.
    pub damping: f32,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            initial_count: BLOB_CAPACITY,
            max_count: BLOB_CAPACITY,
            attraction_range: BLOB_ATTRACTION_RANGE,
            attraction_strength: BLOB_ATTRACTION_STRENGTH,
            merge_distance: BLOB_MERGE_DISTANCE,
            split_threshold: BLOB_SPLIT_THRESHOLD,
            split_chance: BLOB_SPLIT_CHANCE,
            max_speed: BLOB_MAX_SPEED,
            drift_strength: BLOB_DRIFT_STRENGTH,
            bounds: BLOB_BOUNDS,
            max_radius: BLOB_MAX_RADIUS,
            damping: BLOB_DAMPING,
        }
    }
}

impl BlobParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        error::at_least("initial_count", self.initial_count, 1)?;
        error::within("initial_count", self.initial_count, self.max_count)?;
        error::within("max_count", self.max_count, BLOB_CAPACITY)?;
        error::non_negative("attraction_range", self.attraction_range)?;
        error::non_negative("attraction_strength", self.attraction_strength)?;
        error::non_negative("merge_distance", self.merge_distance)?;
        error::positive("split_threshold", self.split_threshold)?;
        error::probability("split_chance", self.split_chance)?;
        error::positive("max_speed", self.max_speed)?;
        error::non_negative("drift_strength", self.drift_strength)?;
        error::positive("bounds", self.bounds)?;
        error::positive("max_radius", self.max_radius)?;
        error::probability("damping", self.damping)?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blob {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Index into [`BLOB_COLORS`].
    pub color: usize,
}

impl Blob {
    /// Combine `self` with `other`; `self` keeps its color.
    ///
    /// Position is the radius-weighted mean, velocity the plain mean, and the
    /// radius `min((r1 + r2) * 0.6, radius_cap)`.
    pub fn merged(&self, other: &Blob, radius_cap: f32) -> Blob {
        let total = self.radius + other.radius;
        let position = if total > 0.0 {
            (self.position * self.radius + other.position * other.radius) / total
        } else {
            (self.position + other.position) * 0.5
        };
        Blob {
            position,
            velocity: (self.velocity + other.velocity) * 0.5,
            radius: (total * 0.6).min(radius_cap),
            color: self.color,
        }
    }
}

/// Uniform block read by the metaball shader.
///
/// Each `blobs` entry is `(x / bounds, y / bounds, radius / bounds * 1.5, color)`;
/// `params` is `(time, live_count, 0, 0)`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlobUniforms {
    pub blobs: [[f32; 4]; BLOB_CAPACITY],
    pub params: [f32; 4],
}

/// Target point all blobs drift toward at `elapsed` seconds.
pub fn drift_target(elapsed: f32) -> Vec2 {
    Vec2::new(
        (elapsed * 0.03).sin() * 0.5 + (elapsed * 0.07).sin() * 0.3,
        (elapsed * 0.04).cos() * 0.5 + (elapsed * 0.06).cos() * 0.3,
    )
}

const PARKED: Vec2 = Vec2::new(-20.0, -20.0);
const PARKED_RADIUS: f32 = 0.001;

pub struct BlobField {
    params: BlobParams,
    blobs: SmallVec<[Blob; BLOB_CAPACITY]>,
    uniforms: BlobUniforms,
    rng: StdRng,
}

impl BlobField {
    pub fn new(params: BlobParams, seed: u64) -> Result<Self, ConfigError> {
        params.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let spread = params.bounds * 1.5;
        let blobs = (0..params.initial_count)
            .map(|i| Blob {
                position: Vec2::new(
                    (rng.gen::<f32>() - 0.5) * spread,
                    (rng.gen::<f32>() - 0.5) * spread,
                ),
                velocity: Vec2::ZERO,
                radius: 0.4 + rng.gen::<f32>() * 0.5,
                color: i % BLOB_COLORS.len(),
            })
            .collect::<SmallVec<[Blob; BLOB_CAPACITY]>>();
        log::info!("[blobs] live={} max={}", blobs.len(), params.max_count);
        Ok(Self::assemble(params, blobs, rng))
    }

    /// Build a field from explicit blobs (1..=max_count of them).
    pub fn from_blobs(params: BlobParams, blobs: &[Blob], seed: u64) -> Result<Self, ConfigError> {
        params.validate()?;
        error::at_least("blobs", blobs.len(), 1)?;
        error::within("blobs", blobs.len(), params.max_count)?;
        let blobs = blobs.iter().copied().collect();
        Ok(Self::assemble(params, blobs, StdRng::seed_from_u64(seed)))
    }

    fn assemble(params: BlobParams, blobs: SmallVec<[Blob; BLOB_CAPACITY]>, rng: StdRng) -> Self {
        let mut field = Self {
            params,
            blobs,
            uniforms: BlobUniforms {
                blobs: [[0.0; 4]; BLOB_CAPACITY],
                params: [0.0; 4],
            },
            rng,
        };
        field.write_uniforms(0.0);
        field
    }

    pub fn params(&self) -> &BlobParams {
        &self.params
    }

    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn uniforms(&self) -> &BlobUniforms {
        &self.uniforms
    }

    pub fn step(&mut self, time: FrameTime) {
        let t = time.elapsed;
        let frame_scale = time.frame_scale();
        let dt = frame_scale / REFERENCE_FPS;
        let damping = self.params.damping.powf(frame_scale);
        let target = drift_target(t);
        let p = &self.params;

        // Blobs spawned by a split join the loop in the same tick.
        let mut i = 0;
        while i < self.blobs.len() {
            let me = self.blobs[i];
            let mut force = Vec2::ZERO;
            for (j, other) in self.blobs.iter().enumerate() {
                if i == j {
                    continue;
                }
                let delta = other.position - me.position;
                let d = delta.length() + DISTANCE_EPSILON;
                if d < p.attraction_range && d > 0.5 {
                    force += delta / d * (p.attraction_strength / (d * d));
                }
            }
            force += (target - me.position) * p.drift_strength;
            force += Vec2::new(self.rng.gen::<f32>() - 0.5, self.rng.gen::<f32>() - 0.5) * 0.0002;

            let mut velocity = me.velocity + force * dt;
            let speed = velocity.length();
            if speed > p.max_speed {
                velocity *= p.max_speed / speed;
            }
            velocity *= damping;
            let position = (me.position + velocity * frame_scale)
                .clamp(Vec2::splat(-p.bounds), Vec2::splat(p.bounds));

            let mut blob = Blob {
                position,
                velocity,
                ..me
            };

            if blob.radius > p.split_threshold
                && self.blobs.len() < p.max_count
                && self.rng.gen::<f32>() < p.split_chance
            {
                blob.radius *= 0.7;
                let offset = Vec2::new(self.rng.gen::<f32>() - 0.5, self.rng.gen::<f32>() - 0.5) * 2.0;
                let child = Blob {
                    position: (blob.position + offset)
                        .clamp(Vec2::splat(-p.bounds), Vec2::splat(p.bounds)),
                    velocity: blob.velocity * 0.5,
                    radius: blob.radius * 0.8,
                    color: self.blobs.len() % BLOB_COLORS.len(),
                };
                self.blobs.push(child);
                log::debug!(
                    "[blobs] split {} r={:.2} -> live={}",
                    i,
                    blob.radius,
                    self.blobs.len()
                );
            }
            self.blobs[i] = blob;
            i += 1;
        }

        self.merge_close_pairs();
        self.write_uniforms(t);
    }

    /// Merge pass, scanning from the back. A survivor at `i` absorbs the first
    /// blob `j < i` closer than the merge distance, then the scan moves on.
    pub fn merge_close_pairs(&mut self) {
        let merge_distance = self.params.merge_distance;
        let cap = self.params.max_radius;
        let mut i = self.blobs.len();
        while i > 0 {
            i -= 1;
            if i >= self.blobs.len() {
                continue;
            }
            for j in (0..i).rev() {
                let a = self.blobs[i];
                let b = self.blobs[j];
                let d = a.position.distance(b.position);
                if d < merge_distance && d > DISTANCE_EPSILON {
                    self.blobs[i] = a.merged(&b, cap);
                    self.blobs.remove(j);
                    log::debug!("[blobs] merged {} into {} -> live={}", j, i, self.blobs.len());
                    break;
                }
            }
        }
    }

    fn write_uniforms(&mut self, elapsed: f32) {
        let bounds = self.params.bounds;
        for (slot, out) in self.uniforms.blobs.iter_mut().enumerate() {
            let (position, radius, color) = match self.blobs.get(slot) {
                Some(b) => (b.position, b.radius, b.color as f32),
                None => (PARKED, PARKED_RADIUS, 0.0),
            };
            *out = [
                position.x / bounds,
                position.y / bounds,
                radius / bounds * 1.5,
                color,
            ];
        }
        self.uniforms.params = [elapsed, self.blobs.len() as f32, 0.0, 0.0];
    }
}

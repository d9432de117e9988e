//! Boid-style point cloud drifting around a slowly wandering flow center.

use crate::clock::FrameTime;
use crate::constants::*;
use crate::error::{self, ConfigError};
use glam::Vec3;
use rand::prelude::*;

#[derive(Clone, Debug)]
pub struct FlockParams {
    pub count: usize,
    /// Half-extent of the domain in x and z; y spans half of this.
    pub bounds: f32,
    pub perception: f32,
    pub cohesion: f32,
    pub separation: f32,
    pub alignment: f32,
    pub attraction: f32,
    pub max_speed: f32,
    pub jitter: f32,
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            count: FLOCK_COUNT,
            bounds: FLOCK_BOUNDS,
            perception: FLOCK_PERCEPTION,
            cohesion: FLOCK_COHESION,
            separation: FLOCK_SEPARATION,
            alignment: FLOCK_ALIGNMENT,
            attraction: FLOCK_ATTRACTION,
            max_speed: FLOCK_MAX_SPEED,
            jitter: FLOCK_JITTER,
        }
    }
}

impl FlockParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        error::at_least("count", self.count, 1)?;
        error::positive("bounds", self.bounds)?;
        error::positive("perception", self.perception)?;
        error::non_negative("cohesion", self.cohesion)?;
        error::non_negative("separation", self.separation)?;
        error::non_negative("alignment", self.alignment)?;
        error::non_negative("attraction", self.attraction)?;
        error::positive("max_speed", self.max_speed)?;
        error::non_negative("jitter", self.jitter)?;
        Ok(())
    }

    /// Half-extents of the wraparound domain.
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.bounds, self.bounds * 0.5, self.bounds)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Per-particle record handed to the point renderer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub scale: f32,
    pub color: [f32; 3],
    pub opacity: f32,
}

/// Attractor the whole flock drifts toward at `elapsed` seconds.
pub fn flow_center(elapsed: f32) -> Vec3 {
    Vec3::new((elapsed * 0.15).sin() * 2.0, 0.0, (elapsed * 0.12).cos() * 2.0)
}

/// Cosmetic size/opacity oscillation, derived from time only.
pub fn particle_scale(elapsed: f32, index: usize) -> f32 {
    0.6 + (elapsed * 0.5 + index as f32 * 0.1).sin() * 0.2
}

pub fn particle_opacity(elapsed: f32, index: usize) -> f32 {
    0.4 + (elapsed * 0.3 + index as f32 * 0.15).sin() * 0.15
}

/// Wrap a coordinate that crossed an edge onto the opposite edge.
#[inline]
fn wrap_axis(v: f32, half: f32) -> f32 {
    if v < -half {
        half
    } else if v > half {
        -half
    } else {
        v
    }
}

pub struct Flock {
    params: FlockParams,
    particles: Vec<Particle>,
    instances: Vec<ParticleInstance>,
    rng: StdRng,
}

impl Flock {
    pub fn new(params: FlockParams, seed: u64) -> Result<Self, ConfigError> {
        params.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let half = params.half_extents();
        let particles = (0..params.count)
            .map(|_| Particle {
                position: Vec3::new(
                    rng.gen_range(-half.x..half.x),
                    rng.gen_range(-half.y..half.y),
                    rng.gen_range(-half.z..half.z),
                ),
                velocity: Vec3::new(
                    (rng.gen::<f32>() - 0.5) * 0.02,
                    (rng.gen::<f32>() - 0.5) * 0.02,
                    (rng.gen::<f32>() - 0.5) * 0.02,
                ),
            })
            .collect::<Vec<_>>();
        let instances = particles
            .iter()
            .enumerate()
            .map(|(i, p)| ParticleInstance {
                position: p.position.to_array(),
                scale: 0.7,
                color: PARTICLE_COLORS[i % PARTICLE_COLORS.len()],
                opacity: 0.5,
            })
            .collect::<Vec<_>>();
        log::info!("[flock] particles={} bounds={:.1}", params.count, params.bounds);
        Ok(Self {
            params,
            particles,
            instances,
            rng,
        })
    }

    pub fn params(&self) -> &FlockParams {
        &self.params
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Advance one tick. Particles are updated in place in index order, so
    /// later particles react to the already-moved earlier ones.
    pub fn step(&mut self, time: FrameTime) {
        let t = time.elapsed;
        let frame_scale = time.frame_scale();
        let p = &self.params;
        let half = p.half_extents();
        let flow = flow_center(t);
        let separation_radius = p.perception * 0.5;

        for i in 0..self.particles.len() {
            let Particle { position, velocity } = self.particles[i];
            let mut centroid = Vec3::ZERO;
            let mut heading = Vec3::ZERO;
            let mut push = Vec3::ZERO;
            let mut count = 0u32;
            let mut close = 0u32;

            for (j, other) in self.particles.iter().enumerate() {
                if i == j {
                    continue;
                }
                let offset = other.position - position;
                let d = offset.length();
                if d < p.perception {
                    centroid += other.position;
                    heading += other.velocity;
                    count += 1;
                    if d < separation_radius && d > DISTANCE_EPSILON {
                        push -= offset / d / d;
                        close += 1;
                    }
                }
            }

            let mut force = (flow - position) * p.attraction;
            if count > 0 {
                let n = count as f32;
                force += (centroid / n - position) * p.cohesion;
                force += (heading / n - velocity) * p.alignment;
            }
            if close > 0 {
                force += push * p.separation;
            }
            force += Vec3::new(
                self.rng.gen::<f32>() - 0.5,
                self.rng.gen::<f32>() - 0.5,
                self.rng.gen::<f32>() - 0.5,
            ) * p.jitter;

            let mut velocity = velocity + force * frame_scale;
            let speed = velocity.length();
            if speed > p.max_speed {
                velocity *= p.max_speed / speed;
            }
            let moved = position + velocity * frame_scale;
            let position = Vec3::new(
                wrap_axis(moved.x, half.x),
                wrap_axis(moved.y, half.y),
                wrap_axis(moved.z, half.z),
            );
            self.particles[i] = Particle { position, velocity };

            let instance = &mut self.instances[i];
            instance.position = position.to_array();
            instance.scale = particle_scale(t, i);
            instance.opacity = particle_opacity(t, i);
        }
    }
}

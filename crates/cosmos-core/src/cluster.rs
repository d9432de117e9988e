//! Audio-driven branch growth inside an expanding sphere.
//!
//! The cluster is a fan of polyline branches rooted at the center. Each tick
//! the bounding sphere grows linearly with elapsed time and drags every
//! non-root point outward with it; tips attract each other, points pulse and
//! writhe under noise, tips extend while the audio is loud enough, and now and
//! then a new branch sprouts from an existing tip. Every growth path is gated
//! by a cap (points per branch, arc length, branch count, vertex capacity), so
//! the structure stays bounded for any input and any session length.

use crate::audio::AudioFrame;
use crate::clock::FrameTime;
use crate::constants::*;
use crate::error::{self, ConfigError};
use crate::noise::noise_vec3;
use glam::{Mat4, Vec3};
use rand::prelude::*;

/// Tuning for [`SphereCluster`].
#[derive(Clone, Debug)]
pub struct ClusterParams {
    /// World-space offset of the cluster center.
    pub position: Vec3,
    pub radius_start: f32,
    /// Sphere radius growth in units per second.
    pub expansion_rate: f32,
    pub rotation_speed_y: f32,
    pub initial_branches: usize,
    pub initial_reach: f32,
    /// Arc length cap as a fraction of the current sphere radius.
    pub max_line_length_ratio: f32,
    pub max_branches: usize,
    pub max_points_per_branch: usize,
    /// Vertex capacity of the segment output buffer.
    pub max_total_points: usize,
    pub growth_rate: f32,
    pub min_growth: f32,
    /// Per-tick branching probability before mid-band scaling.
    pub branch_chance: f32,
    pub attraction_range: f32,
    pub attraction_strength: f32,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            radius_start: CLUSTER_RADIUS_START,
            expansion_rate: CLUSTER_EXPANSION_RATE,
            rotation_speed_y: CLUSTER_ROTATION_Y_RAD_PER_SEC,
            initial_branches: CLUSTER_INITIAL_BRANCHES,
            initial_reach: CLUSTER_INITIAL_REACH,
            max_line_length_ratio: MAX_LINE_LENGTH_RATIO,
            max_branches: MAX_BRANCHES,
            max_points_per_branch: MAX_POINTS_PER_BRANCH,
            max_total_points: MAX_TOTAL_POINTS,
            growth_rate: GROWTH_RATE,
            min_growth: MIN_GROWTH,
            branch_chance: BRANCH_CHANCE,
            attraction_range: TIP_ATTRACTION_RANGE,
            attraction_strength: TIP_ATTRACTION_STRENGTH,
        }
    }
}

impl ClusterParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        error::positive("radius_start", self.radius_start)?;
        error::non_negative("expansion_rate", self.expansion_rate)?;
        error::positive("initial_reach", self.initial_reach)?;
        error::positive("max_line_length_ratio", self.max_line_length_ratio)?;
        error::non_negative("growth_rate", self.growth_rate)?;
        error::non_negative("min_growth", self.min_growth)?;
        error::probability("branch_chance", self.branch_chance)?;
        error::non_negative("attraction_range", self.attraction_range)?;
        error::non_negative("attraction_strength", self.attraction_strength)?;
        error::finite("rotation_speed_y", self.rotation_speed_y)?;
        error::at_least("initial_branches", self.initial_branches, 1)?;
        error::within("initial_branches", self.initial_branches, self.max_branches)?;
        error::at_least("max_points_per_branch", self.max_points_per_branch, 2)?;
        error::at_least("max_total_points", self.max_total_points, 2)?;
        // a full branch budget must fit in the vertex buffer's per-branch share
        error::within(
            "max_points_per_branch",
            self.max_points_per_branch,
            self.max_total_points / self.max_branches,
        )?;
        Ok(())
    }
}

/// One polyline: `points[0]` is the root, the last point is the tip.
#[derive(Clone, Debug, Default)]
pub struct Branch {
    points: Vec<Vec3>,
}

impl Branch {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    fn reset(&mut self, root: Vec3, next: Vec3) {
        self.points.clear();
        self.points.push(root);
        self.points.push(next);
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn root(&self) -> Vec3 {
        self.points.first().copied().unwrap_or(Vec3::ZERO)
    }

    pub fn tip(&self) -> Vec3 {
        self.points.last().copied().unwrap_or(Vec3::ZERO)
    }

    pub fn arc_length(&self) -> f32 {
        arc_length(&self.points)
    }
}

/// Sum of distances between consecutive points.
pub fn arc_length(points: &[Vec3]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Radially project `p` onto the sphere of `radius` about the origin when it
/// lies outside; points inside (and the degenerate origin) pass through.
#[inline]
pub fn clamp_to_sphere(p: Vec3, radius: f32) -> Vec3 {
    let r = p.length();
    if r > radius && r > 0.0001 {
        p * (radius / r)
    } else {
        p
    }
}

/// Per-tick forcing amounts derived from the audio frame.
#[derive(Clone, Copy, Debug)]
struct Drive {
    intensity: f32,
    pulse_amount: f32,
    writhe_amount: f32,
    growth: f32,
    branch_chance: f32,
}

impl Drive {
    fn from_audio(audio: &AudioFrame<'_>, params: &ClusterParams) -> Self {
        let bands = audio.bands();
        let level = audio.level();
        let intensity = level * 0.3 + 0.6;
        Self {
            intensity,
            pulse_amount: (0.003 + bands.bass * 0.008) * intensity,
            writhe_amount: (0.002 + bands.high * 0.005) * intensity,
            growth: (level * 0.2 + bands.mid * 0.25) * params.growth_rate,
            branch_chance: params.branch_chance * (1.0 + bands.mid * 0.5),
        }
    }
}

pub struct SphereCluster {
    params: ClusterParams,
    // Pre-allocated branch slots; only `slots[..live]` are part of the structure.
    slots: Vec<Branch>,
    live: usize,
    tips: Vec<Vec3>,
    segments: Vec<Vec3>,
    vertex_count: usize,
    radius: f32,
    // Radius the points were last stretched to; lags `radius` by less than
    // RESCALE_EPSILON so sub-threshold growth is applied once it adds up.
    rescaled_radius: f32,
    rotation_y: f32,
    rng: StdRng,
}

impl SphereCluster {
    pub fn new(params: ClusterParams, seed: u64) -> Result<Self, ConfigError> {
        params.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut slots = (0..params.max_branches)
            .map(|_| Branch::with_capacity(params.max_points_per_branch))
            .collect::<Vec<_>>();
        let fan = params.initial_branches;
        for (i, slot) in slots.iter_mut().take(fan).enumerate() {
            let theta = i as f32 / fan as f32 * std::f32::consts::TAU;
            let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
            let dir = Vec3::new(
                phi.sin() * theta.cos(),
                phi.sin() * theta.sin(),
                phi.cos(),
            );
            slot.reset(Vec3::ZERO, dir * params.initial_reach);
        }
        let mut cluster = Self {
            tips: Vec::with_capacity(params.max_branches),
            segments: vec![Vec3::ZERO; params.max_total_points],
            vertex_count: 0,
            radius: params.radius_start,
            rescaled_radius: params.radius_start,
            rotation_y: 0.0,
            slots,
            live: fan,
            rng,
            params,
        };
        cluster.emit_segments();
        log::info!(
            "[cluster] branches={} radius={:.2} capacity={} vertices",
            cluster.live,
            cluster.radius,
            cluster.segments.len()
        );
        Ok(cluster)
    }

    pub fn params(&self) -> &ClusterParams {
        &self.params
    }

    /// Sphere radius prescribed by the expansion law at `elapsed` seconds.
    pub fn radius_at(&self, elapsed: f32) -> f32 {
        self.params.radius_start + self.params.expansion_rate * elapsed.max(0.0)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn max_line_length(&self) -> f32 {
        self.radius * self.params.max_line_length_ratio
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Cluster placement for the renderer: translation then Y rotation.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.params.position) * Mat4::from_rotation_y(self.rotation_y)
    }

    /// Places a unit shell (see [`icosphere_edges`]) on the bounding sphere.
    ///
    /// [`icosphere_edges`]: crate::shell::icosphere_edges
    pub fn shell_matrix(&self) -> Mat4 {
        self.model_matrix() * Mat4::from_scale(Vec3::splat(self.radius))
    }

    pub fn branches(&self) -> &[Branch] {
        &self.slots[..self.live]
    }

    pub fn total_points(&self) -> usize {
        self.branches().iter().map(Branch::len).sum()
    }

    /// Flattened segment endpoints; only the first [`vertex_count`] are valid.
    ///
    /// [`vertex_count`]: SphereCluster::vertex_count
    pub fn segments(&self) -> &[Vec3] {
        &self.segments[..self.vertex_count]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn segment_count(&self) -> usize {
        self.vertex_count / 2
    }

    pub fn vertex_capacity(&self) -> usize {
        self.segments.len()
    }

    /// Multiply every non-root point by `ratio`. Roots stay where they are.
    pub fn rescale(&mut self, ratio: f32) {
        for branch in &mut self.slots[..self.live] {
            for p in branch.points.iter_mut().skip(1) {
                *p *= ratio;
            }
        }
    }

    /// Advance one tick. Without audio the cluster holds its state entirely.
    pub fn step(&mut self, time: FrameTime, audio: Option<AudioFrame<'_>>) {
        let Some(audio) = audio.filter(|a| !a.spectrum().is_empty()) else {
            return;
        };
        let drive = Drive::from_audio(&audio, &self.params);
        let t = time.elapsed;
        let frame_scale = time.frame_scale();

        let radius = self.radius_at(t).max(self.radius);
        self.radius = radius;
        self.rotation_y = (self.rotation_y
            + self.params.rotation_speed_y * frame_scale / REFERENCE_FPS)
            % std::f32::consts::TAU;

        let ratio = radius / self.rescaled_radius;
        if ratio > RESCALE_EPSILON {
            self.rescale(ratio);
            self.rescaled_radius = radius;
        }

        self.attract_tips(&drive, radius, frame_scale);
        self.pulse_and_grow(&drive, t, radius, frame_scale);
        self.maybe_branch(&drive, radius);
        self.emit_segments();
    }

    fn attract_tips(&mut self, drive: &Drive, radius: f32, frame_scale: f32) {
        self.tips.clear();
        self.tips
            .extend(self.slots[..self.live].iter().map(Branch::tip));
        let range = self.params.attraction_range;
        let strength = self.params.attraction_strength * drive.intensity;
        for i in 0..self.tips.len() {
            let pt = self.tips[i];
            let mut force = Vec3::ZERO;
            for (j, &other) in self.tips.iter().enumerate() {
                if i == j {
                    continue;
                }
                let delta = other - pt;
                let mut d = delta.length();
                if d <= 0.0 {
                    d = DISTANCE_EPSILON;
                }
                if d < range && d > 0.02 {
                    force += delta / d * (strength / (d + 0.1));
                }
            }
            let moved = clamp_to_sphere(pt + force * frame_scale, radius);
            // later tips see this tip's new position
            self.tips[i] = moved;
            if let Some(tip) = self.slots[i].points.last_mut() {
                *tip = moved;
            }
        }
    }

    fn pulse_and_grow(&mut self, drive: &Drive, t: f32, radius: f32, frame_scale: f32) {
        let pulse_phase = t * 0.25;
        let max_len = radius * self.params.max_line_length_ratio;
        let max_points = self.params.max_points_per_branch;
        let min_growth = self.params.min_growth;

        for branch in &mut self.slots[..self.live] {
            let pts = &mut branch.points;
            for (i, p) in pts.iter_mut().enumerate().skip(1) {
                let mut dist = p.length();
                if dist <= 0.0 {
                    dist = DISTANCE_EPSILON;
                }
                let pulse = (pulse_phase + i as f32 * 0.2).sin() * drive.pulse_amount;
                *p += *p / dist * pulse * frame_scale;
                *p += noise_vec3(*p, 2.0, t * 0.5, 10.0) * drive.writhe_amount * frame_scale;
                *p = clamp_to_sphere(*p, radius);
            }

            let n = pts.len();
            let length = arc_length(pts);
            if n >= 2 && n < max_points && length < max_len && drive.growth > min_growth {
                let tip = pts[n - 1];
                let heading = tip - pts[n - 2];
                let heading_len = heading.length();
                let dir = heading / if heading_len > 0.0 { heading_len } else { 0.001 };
                let wobble = noise_vec3(tip, 3.0, t * 0.3, 50.0) * 0.4;
                let next = clamp_to_sphere(tip + (dir + wobble) * drive.growth, radius);
                if length + next.distance(tip) <= max_len {
                    pts.push(next);
                }
            }

            // Pulsing, writhing and the expansion stretch can lengthen a branch
            // past its budget; pull it back toward its root.
            let length = arc_length(pts);
            if length > max_len && length > 0.0 {
                let shrink = max_len / length;
                let root = pts[0];
                for p in pts.iter_mut().skip(1) {
                    *p = root + (*p - root) * shrink;
                }
            }
        }
    }

    fn maybe_branch(&mut self, drive: &Drive, radius: f32) {
        if self.live >= self.params.max_branches || self.live == 0 {
            return;
        }
        if self.rng.gen::<f32>() >= drive.branch_chance {
            return;
        }
        let source = self.rng.gen_range(0..self.live);
        let tip = self.slots[source].tip();
        let max_len = radius * self.params.max_line_length_ratio;
        if tip.length() <= 0.1 || self.slots[source].arc_length() >= max_len * 0.8 {
            return;
        }
        let theta = self.rng.gen::<f32>() * std::f32::consts::TAU;
        let phi = (2.0 * self.rng.gen::<f32>() - 1.0).acos();
        let dir = Vec3::new(
            phi.sin() * theta.cos(),
            phi.sin() * theta.sin(),
            phi.cos(),
        );
        let reach = (drive.growth * 2.0).max(0.01);
        let next = clamp_to_sphere(tip + dir * reach, radius);
        self.slots[self.live].reset(tip, next);
        self.live += 1;
        log::debug!(
            "[cluster] branch {} sprouted from {} at r={:.2}",
            self.live - 1,
            source,
            tip.length()
        );
    }

    fn emit_segments(&mut self) {
        let capacity = self.segments.len();
        let mut idx = 0;
        'branches: for branch in &self.slots[..self.live] {
            for pair in branch.points.windows(2) {
                if idx + 2 > capacity {
                    break 'branches;
                }
                self.segments[idx] = pair[0];
                self.segments[idx + 1] = pair[1];
                idx += 2;
            }
        }
        self.vertex_count = idx;
    }
}

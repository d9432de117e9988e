//! Deterministic hash noise used as an organic forcing term.
//!
//! Every function here is pure: the same coordinates always produce the same
//! value, so simulators can share them freely. Callers that want motion over
//! time fold the elapsed time into one of the coordinates.

use glam::Vec3;

pub const DEFAULT_OCTAVES: u32 = 3;

/// Hash-like value in \[0, 1) for a pair of reals. Not spatially smooth.
#[inline]
pub fn noise1(x: f32, y: f32) -> f32 {
    let n = (x * 12.9898 + y * 78.233).sin() * 43758.5453;
    let f = n - n.floor();
    // tiny negative n rounds up to exactly 1.0 in f32
    if f >= 1.0 {
        0.0
    } else {
        f
    }
}

/// Octave sum of [`noise1`]: frequency doubles and amplitude halves per
/// octave, normalized by the total amplitude. Zero octaves yields 0.
pub fn smooth_noise(x: f32, y: f32, octaves: u32) -> f32 {
    let mut value = 0.0;
    let mut freq = 1.0;
    let mut amp = 1.0;
    let mut max = 0.0;
    for _ in 0..octaves {
        value += noise1(x * freq, y * freq) * amp;
        max += amp;
        freq *= 2.0;
        amp *= 0.5;
    }
    if max > 0.0 {
        value / max
    } else {
        0.0
    }
}

/// Mean of three [`smooth_noise`] slices over the axis pairs.
#[inline]
pub fn noise3(x: f32, y: f32, z: f32) -> f32 {
    (smooth_noise(x, y, DEFAULT_OCTAVES)
        + smooth_noise(y, z, DEFAULT_OCTAVES)
        + smooth_noise(z, x, DEFAULT_OCTAVES))
        / 3.0
}

/// Centered pseudo-3D noise vector in roughly \[-0.5, 0.5\] per axis.
///
/// Each axis samples [`noise3`] with the coordinates rotated and shifted by
/// `offset`, and `time` advances a different coordinate per axis, so the three
/// components stay uncorrelated.
pub fn noise_vec3(p: Vec3, freq: f32, time: f32, offset: f32) -> Vec3 {
    let q = p * freq;
    Vec3::new(
        noise3(q.x + time, q.y, q.z) - 0.5,
        noise3(q.y + offset, q.z + time, q.x) - 0.5,
        noise3(q.z + 2.0 * offset, q.x + time, q.y) - 0.5,
    )
}

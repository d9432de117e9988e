// Shared simulation/visual tuning constants used by the core and the native frontend.

// Spectrum layout
pub const SPECTRUM_BINS: usize = 128; // bins delivered by the spectral feature reader
pub const ANALYSER_WINDOW: usize = 256; // PCM samples per analysis window
pub const BASS_BINS: std::ops::Range<usize> = 0..8;
pub const MID_BINS: std::ops::Range<usize> = 8..40;
pub const HIGH_BINS: std::ops::Range<usize> = 40..128;
pub const DB_FLOOR: f32 = -100.0; // dB mapped to 0
pub const DB_RANGE: f32 = 100.0; // dB span mapped onto 0..1

// Sphere cluster
pub const CLUSTER_RADIUS_START: f32 = 2.0;
pub const CLUSTER_RADIUS_AT_3MIN: f32 = 38.0;
pub const CLUSTER_EXPANSION_RATE: f32 = (CLUSTER_RADIUS_AT_3MIN - CLUSTER_RADIUS_START) / 180.0;
pub const CLUSTER_ROTATION_Y_RAD_PER_SEC: f32 = 0.0028;
pub const CLUSTER_INITIAL_BRANCHES: usize = 12;
pub const CLUSTER_INITIAL_REACH: f32 = 0.03; // distance of the first fan point from center
pub const MAX_LINE_LENGTH_RATIO: f32 = 0.95;
pub const MAX_BRANCHES: usize = 100;
pub const MAX_POINTS_PER_BRANCH: usize = 80;
pub const MAX_TOTAL_POINTS: usize = 12000; // vertex capacity of the segment buffer
pub const GROWTH_RATE: f32 = 0.022;
pub const MIN_GROWTH: f32 = 0.001; // growth below this is treated as silence
pub const BRANCH_CHANCE: f32 = 0.008;
pub const TIP_ATTRACTION_RANGE: f32 = 1.0;
pub const TIP_ATTRACTION_STRENGTH: f32 = 0.0006;
pub const RESCALE_EPSILON: f32 = 1.0001; // sphere growth ratio that triggers a rescale

// Flocking particles
pub const FLOCK_COUNT: usize = 180;
pub const FLOCK_BOUNDS: f32 = 18.0; // half-extent in x/z, y uses half of this
pub const FLOCK_PERCEPTION: f32 = 4.0;
pub const FLOCK_COHESION: f32 = 0.0008;
pub const FLOCK_SEPARATION: f32 = 0.025;
pub const FLOCK_ALIGNMENT: f32 = 0.015;
pub const FLOCK_ATTRACTION: f32 = 0.00015;
pub const FLOCK_MAX_SPEED: f32 = 0.08;
pub const FLOCK_JITTER: f32 = 0.002;

pub const PARTICLE_COLORS: [[f32; 3]; 4] = [
    [0.0, 0.9, 1.0], // cyan
    [0.66, 0.33, 0.97], // violet
    [0.02, 0.71, 0.83], // teal
    [0.6, 0.2, 0.95], // purple
];

// Metaball blobs
pub const BLOB_CAPACITY: usize = 10; // size of the shader's blob array
pub const BLOB_ATTRACTION_RANGE: f32 = 4.0;
pub const BLOB_ATTRACTION_STRENGTH: f32 = 0.00004;
pub const BLOB_MERGE_DISTANCE: f32 = 1.2;
pub const BLOB_SPLIT_THRESHOLD: f32 = 2.2;
pub const BLOB_SPLIT_CHANCE: f32 = 0.00005;
pub const BLOB_MAX_SPEED: f32 = 0.008;
pub const BLOB_DRIFT_STRENGTH: f32 = 0.00015;
pub const BLOB_BOUNDS: f32 = 8.0;
pub const BLOB_MAX_RADIUS: f32 = 2.5;
pub const BLOB_DAMPING: f32 = 0.995;

pub const BLOB_COLORS: [[f32; 3]; 5] = [
    [0.0, 0.9, 1.0],
    [0.6, 0.2, 0.95],
    [0.02, 0.7, 0.85],
    [0.5, 0.3, 1.0],
    [0.1, 0.85, 0.9],
];

// Integration
pub const REFERENCE_FPS: f32 = 60.0; // forces are tuned per 1/60 s frame
pub const MAX_FRAME_DELTA_SEC: f32 = 0.1; // longer gaps (tab switch, debugger) are clamped
pub const DISTANCE_EPSILON: f32 = 0.01;

// Camera
pub const CAMERA_EYE: [f32; 3] = [0.0, 0.0, 55.0];
pub const CAMERA_FOVY_DEG: f32 = 50.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 2000.0;

// Cluster shell
pub const SHELL_DETAIL: u32 = 2; // icosahedron edge subdivisions
pub const SHELL_COLOR: [f32; 4] = [0.333, 0.333, 0.333, 0.4]; // #555555 at 40%

use glam::Vec3;

pub const LIGHT_ORBIT_RADIUS: f32 = 10.0;
pub const LIGHT_HEIGHT: f32 = 4.0;
pub const LIGHT_COUNT: usize = 4;

/// A colored point light circling the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitLight {
    pub position: Vec3,
    pub color: [f32; 3],
    pub intensity: f32,
    /// Distance at which the light's contribution reaches zero.
    pub range: f32,
}

struct Orbit {
    phase: f32,
    radius_factor: f32,
    height_factor: f32,
    bob_rate: f32,
    bob_amount: f32,
    bob_cosine: bool,
    color: [f32; 3],
    intensity: f32,
    range: f32,
}

const ORBITS: [Orbit; LIGHT_COUNT] = [
    Orbit {
        phase: 0.0,
        radius_factor: 1.0,
        height_factor: 1.0,
        bob_rate: 0.5,
        bob_amount: 0.8,
        bob_cosine: false,
        color: [0.0, 0.898, 1.0], // #00e5ff
        intensity: 0.8,
        range: 28.0,
    },
    Orbit {
        phase: std::f32::consts::FRAC_PI_2,
        radius_factor: 0.8,
        height_factor: 0.7,
        bob_rate: 0.7,
        bob_amount: 0.6,
        bob_cosine: true,
        color: [0.659, 0.333, 0.969], // #a855f7
        intensity: 0.6,
        range: 24.0,
    },
    Orbit {
        phase: std::f32::consts::PI,
        radius_factor: 0.9,
        height_factor: 1.2,
        bob_rate: 0.6,
        bob_amount: 0.5,
        bob_cosine: false,
        color: [0.024, 0.714, 0.831], // #06b6d4
        intensity: 0.5,
        range: 22.0,
    },
    Orbit {
        phase: std::f32::consts::PI * 1.5,
        radius_factor: 0.7,
        height_factor: 0.9,
        bob_rate: 0.8,
        bob_amount: 0.7,
        bob_cosine: true,
        color: [0.925, 0.282, 0.6], // #ec4899
        intensity: 0.4,
        range: 20.0,
    },
];

/// Positions of the four orbiting lights at `elapsed` seconds.
pub fn orbit_lights(elapsed: f32) -> [OrbitLight; LIGHT_COUNT] {
    let slow = elapsed * 0.12;
    let medium = elapsed * 0.18;
    ORBITS.map(|o| {
        let angle = slow + o.phase;
        let bob_arg = medium * o.bob_rate;
        let bob = if o.bob_cosine {
            bob_arg.cos()
        } else {
            bob_arg.sin()
        };
        OrbitLight {
            position: Vec3::new(
                angle.sin() * LIGHT_ORBIT_RADIUS * o.radius_factor,
                LIGHT_HEIGHT * o.height_factor + bob * o.bob_amount,
                angle.cos() * LIGHT_ORBIT_RADIUS * o.radius_factor,
            ),
            color: o.color,
            intensity: o.intensity,
            range: o.range,
        }
    })
}

use cosmos_core::*;
use glam::Vec3;
use std::time::Duration;

#[test]
fn clock_accumulates_host_deltas() {
    let mut clock = Clock::new();
    let a = clock.tick(Duration::from_millis(16));
    let b = clock.tick(Duration::from_millis(34));
    assert!((a.delta - 0.016).abs() < 1e-6);
    assert!((b.elapsed - 0.05).abs() < 1e-6);
    assert!((clock.elapsed() - 0.05).abs() < 1e-6);
}

#[test]
fn frame_scale_is_clamped() {
    assert!((FrameTime::new(0.0, 1.0 / 60.0).frame_scale() - 1.0).abs() < 1e-5);
    assert!((FrameTime::new(0.0, 5.0).frame_scale() - MAX_FRAME_DELTA_SEC * REFERENCE_FPS).abs() < 1e-5);
    assert_eq!(FrameTime::new(0.0, -0.5).frame_scale(), 0.0);
    assert_eq!(FrameTime::new(0.0, f32::NAN).frame_scale(), 0.0);
    assert_eq!(FrameTime::new(0.0, f32::INFINITY).frame_scale(), 0.0);
}

#[test]
fn scene_builds_with_defaults() {
    let scene = Scene::new(SceneParams::default(), 42).unwrap();
    assert_eq!(scene.cluster.branches().len(), CLUSTER_INITIAL_BRANCHES);
    assert_eq!(scene.flock.len(), FLOCK_COUNT);
    assert_eq!(scene.blobs.len(), BLOB_CAPACITY);
    assert_eq!(scene.ticks(), 0);
    assert!(!scene.audio_ready());
}

#[test]
fn invalid_params_are_rejected() {
    let mut params = SceneParams::default();
    params.flock.max_speed = 0.0;
    assert!(Scene::new(params, 1).is_err());
}

#[test]
fn missing_audio_holds_cluster_but_not_the_rest() {
    let mut scene = Scene::new(SceneParams::default(), 42).unwrap();
    let segments = scene.cluster.segments().to_vec();
    let particles = scene.flock.particles().to_vec();
    let mut clock = Clock::new();
    for _ in 0..60 {
        let time = clock.tick(Duration::from_millis(16));
        scene.step(time, None);
    }
    assert_eq!(scene.cluster.segments(), segments.as_slice());
    assert_ne!(scene.flock.particles(), particles.as_slice());
    assert_eq!(scene.ticks(), 60);
    assert!(!scene.audio_ready());
}

#[test]
fn audio_readiness_follows_the_source() {
    let mut scene = Scene::new(SceneParams::default(), 42).unwrap();
    let mut source = StaticSpectrum::uniform(200, 0.8);
    let mut clock = Clock::new();
    let before = scene.cluster.total_points();
    for _ in 0..60 {
        scene.step_with_source(clock.tick(Duration::from_millis(16)), &mut source);
    }
    assert!(scene.audio_ready());
    assert!(scene.cluster.total_points() > before);

    source.spectrum.clear();
    scene.step_with_source(clock.tick(Duration::from_millis(16)), &mut source);
    assert!(!scene.audio_ready());
    assert!((scene.time().elapsed - clock.elapsed()).abs() < 1e-6);
}

#[test]
fn same_seed_same_scene() {
    let mut a = Scene::new(SceneParams::default(), 5).unwrap();
    let mut b = Scene::new(SceneParams::default(), 5).unwrap();
    let mut source = StaticSpectrum::uniform(150, 0.6);
    for i in 0..120 {
        let time = FrameTime::new(i as f32 / 60.0, 1.0 / 60.0);
        a.step_with_source(time, &mut source);
        b.step_with_source(time, &mut source);
    }
    assert_eq!(a.cluster.segments(), b.cluster.segments());
    assert_eq!(a.flock.particles(), b.flock.particles());
    assert_eq!(a.blobs.blobs(), b.blobs.blobs());
}

#[test]
fn different_seeds_give_different_scenes() {
    let a = Scene::new(SceneParams::default(), 5).unwrap();
    let b = Scene::new(SceneParams::default(), 6).unwrap();
    assert_ne!(a.flock.particles(), b.flock.particles());
}

#[test]
fn lights_orbit_at_their_radii() {
    let lights = orbit_lights(0.0);
    assert_eq!(lights.len(), LIGHT_COUNT);
    // first light starts on +z, second a quarter turn ahead on +x
    assert!((lights[0].position - Vec3::new(0.0, LIGHT_HEIGHT, LIGHT_ORBIT_RADIUS)).length() < 1e-4);
    assert!(lights[1].position.x > 7.9 && lights[1].position.z.abs() < 1e-4);
    for t in [0.0f32, 3.0, 60.0, 600.0] {
        for (l, start) in orbit_lights(t).iter().zip(&lights) {
            let planar = Vec3::new(l.position.x, 0.0, l.position.z).length();
            let expected = Vec3::new(start.position.x, 0.0, start.position.z).length();
            assert!((planar - expected).abs() < 1e-3);
            assert!(l.intensity > 0.0 && l.range > 0.0);
        }
    }
}

#[test]
fn scene_lights_follow_time() {
    let mut scene = Scene::new(SceneParams::default(), 1).unwrap();
    let time = FrameTime::new(12.0, 1.0 / 60.0);
    scene.step(time, None);
    assert_eq!(scene.lights(), &orbit_lights(12.0));
}

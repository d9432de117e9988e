use cosmos_core::*;
use glam::Vec2;

const DT: f32 = 1.0 / 60.0;

fn blob(x: f32, y: f32, radius: f32, color: usize) -> Blob {
    Blob {
        position: Vec2::new(x, y),
        velocity: Vec2::ZERO,
        radius,
        color,
    }
}

#[test]
fn default_field_is_full() {
    let field = BlobField::new(BlobParams::default(), 3).unwrap();
    assert_eq!(field.len(), BLOB_CAPACITY);
    for b in field.blobs() {
        assert!((0.4..=0.9).contains(&b.radius));
        assert!(b.position.abs().max_element() <= BLOB_BOUNDS * 0.75);
    }
}

#[test]
fn rejects_more_blobs_than_the_shader_holds() {
    let params = BlobParams {
        max_count: BLOB_CAPACITY + 1,
        ..BlobParams::default()
    };
    assert!(matches!(
        params.validate(),
        Err(ConfigError::OverCapacity { name: "max_count", .. })
    ));
    let params = BlobParams {
        initial_count: 3,
        max_count: 2,
        ..BlobParams::default()
    };
    assert!(BlobField::new(params, 0).is_err());
    assert!(BlobField::from_blobs(BlobParams::default(), &[], 0).is_err());
}

#[test]
fn merged_blob_is_radius_weighted() {
    let a = blob(0.0, 0.0, 1.0, 0);
    let b = Blob {
        velocity: Vec2::new(0.004, 0.0),
        ..blob(3.0, 0.0, 2.0, 4)
    };
    let m = a.merged(&b, 10.0);
    assert!((m.position - Vec2::new(2.0, 0.0)).length() < 1e-6);
    assert!((m.velocity - Vec2::new(0.002, 0.0)).length() < 1e-7);
    assert!((m.radius - 1.8).abs() < 1e-6);
    assert_eq!(m.color, 0);
    assert!((a.merged(&b, 1.5).radius - 1.5).abs() < 1e-6);
}

#[test]
fn touching_blobs_merge_into_one() {
    let params = BlobParams {
        merge_distance: 2.5,
        ..BlobParams::default()
    };
    let mut field =
        BlobField::from_blobs(params, &[blob(0.0, 0.0, 1.0, 0), blob(2.0, 0.0, 1.0, 3)], 1)
            .unwrap();
    field.merge_close_pairs();
    assert_eq!(field.len(), 1);
    let m = field.blobs()[0];
    assert!((m.position - Vec2::new(1.0, 0.0)).length() < 1e-6);
    assert!((m.radius - 1.2).abs() < 1e-6);
    assert_eq!(m.color, 3);
}

#[test]
fn merged_radius_is_capped() {
    let params = BlobParams {
        merge_distance: 2.5,
        ..BlobParams::default()
    };
    let mut field =
        BlobField::from_blobs(params, &[blob(0.0, 0.0, 2.0, 0), blob(1.0, 0.0, 2.5, 1)], 1)
            .unwrap();
    field.merge_close_pairs();
    assert_eq!(field.len(), 1);
    assert!((field.blobs()[0].radius - BLOB_MAX_RADIUS).abs() < 1e-6);
}

#[test]
fn far_apart_blobs_do_not_merge() {
    let mut field = BlobField::from_blobs(
        BlobParams::default(),
        &[blob(-5.0, 0.0, 1.0, 0), blob(5.0, 0.0, 1.0, 1)],
        1,
    )
    .unwrap();
    field.merge_close_pairs();
    assert_eq!(field.len(), 2);
}

#[test]
fn large_blob_splits_when_room() {
    let params = BlobParams {
        split_chance: 1.0,
        split_threshold: 2.0,
        merge_distance: 0.0,
        ..BlobParams::default()
    };
    let mut field = BlobField::from_blobs(params, &[blob(0.0, 0.0, 2.4, 0)], 5).unwrap();
    field.step(FrameTime::new(0.0, DT));
    assert_eq!(field.len(), 2);
    let parent = field.blobs()[0];
    let child = field.blobs()[1];
    assert!((parent.radius - 2.4 * 0.7).abs() < 1e-5);
    assert!((child.radius - 2.4 * 0.7 * 0.8).abs() < 1e-5);
    assert_eq!(child.color, 1);

    // neither is above threshold any more
    field.step(FrameTime::new(DT, DT));
    assert_eq!(field.len(), 2);
}

#[test]
fn full_field_never_splits() {
    let params = BlobParams {
        split_chance: 1.0,
        split_threshold: 1.0,
        merge_distance: 0.0,
        max_count: 2,
        initial_count: 2,
        ..BlobParams::default()
    };
    let mut field =
        BlobField::from_blobs(params, &[blob(-4.0, 0.0, 2.0, 0), blob(4.0, 0.0, 2.0, 1)], 5)
            .unwrap();
    for i in 0..60 {
        field.step(FrameTime::new(i as f32 * DT, DT));
    }
    assert_eq!(field.len(), 2);
}

#[test]
fn population_and_positions_stay_bounded() {
    let params = BlobParams {
        split_chance: 0.05,
        split_threshold: 1.0,
        ..BlobParams::default()
    };
    let mut field = BlobField::new(params, 13).unwrap();
    for i in 0..3000 {
        field.step(FrameTime::new(i as f32 * DT, DT));
        assert!(!field.is_empty());
        assert!(field.len() <= BLOB_CAPACITY);
        for b in field.blobs() {
            assert!(b.position.abs().max_element() <= BLOB_BOUNDS + 1e-5);
            assert!(b.velocity.length() <= BLOB_MAX_SPEED + 1e-6);
            assert!(b.radius <= BLOB_MAX_RADIUS + 1e-5);
        }
    }
}

#[test]
fn lone_blob_drifts_toward_target() {
    let mut field =
        BlobField::from_blobs(BlobParams::default(), &[blob(6.0, 6.0, 0.5, 0)], 2).unwrap();
    let start = field.blobs()[0].position.distance(drift_target(0.0));
    for i in 0..600 {
        field.step(FrameTime::new(i as f32 * DT, DT));
    }
    let t = 599.0 * DT;
    let end = field.blobs()[0].position.distance(drift_target(t));
    assert!(end < start - 0.5, "drifted from {start} to {end}");
}

#[test]
fn uniforms_park_unused_slots() {
    let field = BlobField::from_blobs(
        BlobParams::default(),
        &[blob(4.0, -2.0, 1.0, 2), blob(0.0, 0.0, 0.5, 1)],
        1,
    )
    .unwrap();
    let u = field.uniforms();
    assert_eq!(u.blobs[0], [0.5, -0.25, 1.0 / BLOB_BOUNDS * 1.5, 2.0]);
    for slot in &u.blobs[2..] {
        assert!(slot[0] < -2.0 && slot[1] < -2.0);
        assert!(slot[2] < 0.001);
    }
    assert_eq!(u.params[1], 2.0);
    assert_eq!(std::mem::size_of::<BlobUniforms>(), (BLOB_CAPACITY + 1) * 16);
}

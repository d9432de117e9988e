use cosmos_core::*;
use glam::{Vec3, Vec4Swizzles};

#[test]
fn default_camera_frames_the_origin() {
    let camera = Camera::scene_default(16.0 / 9.0);
    let clip = camera.view_proj() * Vec3::ZERO.extend(1.0);
    let ndc = clip.xyz() / clip.w;
    assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
    assert!(ndc.z > 0.0 && ndc.z < 1.0);
}

#[test]
fn expanded_cluster_fits_vertically() {
    let camera = Camera::scene_default(1.0);
    let top = camera.view_proj() * Vec3::new(0.0, CLUSTER_RADIUS_AT_3MIN * 0.5, 0.0).extend(1.0);
    assert!((top.y / top.w).abs() < 1.0);
}

#[test]
fn billboard_axes_face_the_viewer() {
    let camera = Camera::scene_default(1.0);
    let (right, up) = camera.billboard_axes();
    assert!((right - Vec3::X).length() < 1e-6);
    assert!((up - Vec3::Y).length() < 1e-6);
}

#[test]
fn bad_aspect_falls_back_to_square() {
    assert_eq!(Camera::scene_default(0.0).aspect, 1.0);
    assert_eq!(Camera::scene_default(f32::NAN).aspect, 1.0);
}

#[test]
fn constants_are_consistent() {
    assert!((CLUSTER_RADIUS_START + CLUSTER_EXPANSION_RATE * 180.0 - CLUSTER_RADIUS_AT_3MIN).abs() < 1e-3);
    assert!(MAX_BRANCHES * MAX_POINTS_PER_BRANCH <= MAX_TOTAL_POINTS);
    assert_eq!(BASS_BINS.end, MID_BINS.start);
    assert_eq!(MID_BINS.end, HIGH_BINS.start);
    assert_eq!(HIGH_BINS.end, SPECTRUM_BINS);
    assert_eq!(ANALYSER_WINDOW, SPECTRUM_BINS * 2);
}

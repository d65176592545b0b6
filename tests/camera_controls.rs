use glam::{Vec2, Vec3};
use metaworkspace::camera3d::{CameraController, CameraGesture, CameraLimits};
use metaworkspace::config::{AppConfig, CameraConfig};
use proptest::prelude::*;
use std::f32::consts::{FRAC_PI_2, TAU};

fn controller() -> CameraController {
    CameraController::from_config(&CameraConfig::default())
}

#[test]
fn oversize_zoom_in_lands_exactly_on_min_distance() {
    let mut camera = CameraController::new(Vec3::ZERO, 15.0, CameraLimits::new(5.0, 30.0));
    camera.zoom(1_000.0);
    assert_eq!(camera.distance(), 5.0);
}

#[test]
fn stock_camera_starts_at_ten_eight_ten() {
    let camera = controller();
    assert!((camera.position() - Vec3::new(10.0, 8.0, 10.0)).length() < 1e-4);
    assert_eq!(camera.target(), Vec3::ZERO);
    let view = camera.to_camera(60f32.to_radians(), 0.1, 1000.0).view_projection((1280, 720));
    assert!(view.is_finite());
}

#[test]
fn non_finite_gestures_are_ignored() {
    let mut camera = controller();
    let before = camera.state();
    camera.apply(CameraGesture::Orbit(Vec2::new(f32::NAN, 1.0)));
    camera.apply(CameraGesture::Pan(Vec2::new(f32::INFINITY, 0.0)));
    camera.apply(CameraGesture::Zoom(f32::NAN));
    assert_eq!(camera.state(), before);
}

#[test]
fn overflowing_sensitivity_in_config_keeps_camera_finite() {
    let config: AppConfig =
        serde_json::from_str(r#"{ "camera": { "rotate_sensitivity": 1e39, "pan_speed": 1e39 } }"#).expect("parse config");
    assert!(config.camera.rotate_sensitivity.is_infinite());
    let mut camera = CameraController::from_config(&config.camera);
    camera.apply(CameraGesture::Orbit(Vec2::new(1.0, 0.0)));
    camera.apply(CameraGesture::Pan(Vec2::new(1.0, 1.0)));
    let state = camera.state();
    assert!(state.azimuth.is_finite() && state.polar.is_finite());
    assert!(camera.target().is_finite());
}

fn rate() -> impl Strategy<Value = f32> {
    prop_oneof![
        Just(f32::INFINITY),
        Just(f32::NEG_INFINITY),
        Just(f32::NAN),
        Just(f32::MAX),
        -10.0f32..10.0,
    ]
}

fn gesture() -> impl Strategy<Value = CameraGesture> {
    prop_oneof![
        (-2_000.0f32..2_000.0, -2_000.0f32..2_000.0).prop_map(|(x, y)| CameraGesture::Orbit(Vec2::new(x, y))),
        (-50.0f32..50.0).prop_map(CameraGesture::Zoom),
        (-500.0f32..500.0, -500.0f32..500.0).prop_map(|(x, y)| CameraGesture::Pan(Vec2::new(x, y))),
    ]
}

proptest! {
    #[test]
    fn gesture_sequences_respect_limits(gestures in prop::collection::vec(gesture(), 1..64)) {
        let mut camera = controller();
        for gesture in gestures {
            camera.apply(gesture);
            let state = camera.state();
            prop_assert!(state.distance >= 5.0 && state.distance <= 30.0, "distance {}", state.distance);
            prop_assert!(state.polar >= 0.0 && state.polar <= FRAC_PI_2, "polar {}", state.polar);
            prop_assert!(state.azimuth >= 0.0 && state.azimuth < TAU, "azimuth {}", state.azimuth);
            prop_assert!(camera.position().is_finite());
        }
    }

    #[test]
    fn pan_never_changes_orientation(dx in -500.0f32..500.0, dy in -500.0f32..500.0) {
        let mut camera = controller();
        let before = camera.state();
        camera.pan(Vec2::new(dx, dy));
        let after = camera.state();
        prop_assert_eq!(before.azimuth, after.azimuth);
        prop_assert_eq!(before.polar, after.polar);
        prop_assert_eq!(before.distance, after.distance);
    }

    #[test]
    fn any_tuning_respects_limits(
        rotate in rate(),
        zoom in rate(),
        pan in rate(),
        gestures in prop::collection::vec(gesture(), 1..32),
    ) {
        let config = CameraConfig { rotate_sensitivity: rotate, zoom_factor: zoom, pan_speed: pan, ..CameraConfig::default() };
        let mut camera = CameraController::from_config(&config);
        for gesture in gestures {
            camera.apply(gesture);
            let state = camera.state();
            prop_assert!(state.distance >= 5.0 && state.distance <= 30.0, "distance {}", state.distance);
            prop_assert!(state.polar >= 0.0 && state.polar <= FRAC_PI_2, "polar {}", state.polar);
            prop_assert!(state.azimuth >= 0.0 && state.azimuth < TAU, "azimuth {}", state.azimuth);
            prop_assert!(camera.target().is_finite());
        }
    }
}

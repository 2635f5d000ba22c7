use std::f64::consts::PI;

use rstest::{fixture, rstest};
use waypoint_updater::core::{
    Mode, PathStore, Point2D, SharedState, VehiclePose, Waypoint, hyperplane_value,
    stop_line_from_raw,
};
use waypoint_updater::{NavigationConfig, TrafficLightConfig, UpdaterError, WaypointUpdater};

fn straight_path(n: usize) -> Vec<Waypoint> {
    (0..n)
        .map(|i| Waypoint::new(i as f64, 0.0, 0.0, 5.0))
        .collect()
}

// Counter-clockwise loop, as driven on a closed track
fn circular_path(n: usize, radius: f64) -> Vec<Waypoint> {
    (0..n)
        .map(|i| {
            let a = 2.0 * PI * i as f64 / n as f64;
            Waypoint::new(radius * a.cos(), radius * a.sin(), 0.0, 10.0)
        })
        .collect()
}

#[fixture]
fn straight_store() -> PathStore {
    let store = PathStore::new();
    store.update(straight_path(60));
    store
}

#[rstest]
#[case::on_waypoint(10.0, 0.0, 10)]
#[case::just_before(9.6, 0.3, 10)]
#[case::just_past(10.4, -0.2, 11)]
#[case::beside_first(0.0, 0.5, 0)]
fn test_closest_ahead_on_straight_path(
    straight_store: PathStore,
    #[case] x: f64,
    #[case] y: f64,
    #[case] expected: usize,
) {
    let closest = straight_store.closest_ahead_index(&Point2D::new(x, y));
    assert_eq!(closest, Ok(expected));
}

#[test]
fn test_closest_ahead_wraps_past_last_waypoint() {
    let store = PathStore::new();
    let path = circular_path(100, 50.0);
    store.update(path.clone());

    // Slightly past the last waypoint towards waypoint 0
    let last = path[99].planar();
    let first = path[0].planar();
    let pose = last + (first - last) * 0.2;
    assert_eq!(store.closest_ahead_index(&pose), Ok(0));
}

#[test]
fn test_closest_ahead_never_behind_vehicle() {
    let store = PathStore::new();
    store.update(circular_path(120, 80.0));
    let points = store.index().expect("index built").points().to_vec();

    for k in 0..720 {
        let a = k as f64 * 0.5_f64.to_radians();
        let r = 74.0 + (k % 13) as f64;
        let pose = Point2D::new(r * a.cos(), r * a.sin());
        let idx = store.closest_ahead_index(&pose).unwrap();
        assert!(
            hyperplane_value(&points, idx, &pose) <= 0.0,
            "pose {:?} returned waypoint {} behind the vehicle",
            pose,
            idx
        );
    }
}

#[test]
fn test_queries_before_first_path_fail() {
    let store = PathStore::new();
    assert!(!store.is_index_built());
    assert_eq!(
        store.closest_ahead_index(&Point2D::new(0.0, 0.0)),
        Err(UpdaterError::IndexNotBuilt)
    );
    assert_eq!(
        store.nearest(&Point2D::new(0.0, 0.0)),
        Err(UpdaterError::IndexNotBuilt)
    );

    store.update(Vec::new());
    assert!(!store.is_index_built());
    assert!(store.waypoints().is_none());
}

#[rstest]
#[case::nan_x(f64::NAN, 0.0)]
#[case::nan_y(4.0, f64::NAN)]
#[case::infinite(f64::INFINITY, 0.0)]
fn test_non_finite_pose_has_no_closest(straight_store: PathStore, #[case] x: f64, #[case] y: f64) {
    let pose = Point2D::new(x, y);
    assert_eq!(straight_store.closest_ahead_index(&pose), Err(UpdaterError::NotReady));
    assert_eq!(straight_store.nearest(&pose), Err(UpdaterError::NotReady));
}

#[test]
fn test_tick_skips_nan_pose_and_recovers() {
    let state = SharedState::new();
    state.path_handle().update(straight_path(60));
    state.pose_handle().update(VehiclePose::new(f64::NAN, 0.0, 0.0));
    let lights = TrafficLightConfig {
        stop_line_positions: vec![[55.0, 2.0]],
    };
    let mut updater =
        WaypointUpdater::new(state.clone(), &NavigationConfig::default(), &lights).unwrap();

    assert!(updater.tick().is_none());
    assert_eq!(updater.get_status().mode, Mode::Ready);
    assert_eq!(updater.get_status().last_closest_idx, None);

    state.pose_handle().update(VehiclePose::new(10.0, 0.0, 0.0));
    let lane = updater.tick().expect("lane after a finite pose");
    assert_eq!(lane[0].position.x, 10.0);
}

#[rstest]
fn test_index_is_built_once(straight_store: PathStore) {
    // Same path shifted far away: output list changes, index does not
    let shifted: Vec<Waypoint> = (0..60)
        .map(|i| Waypoint::new(i as f64, 1000.0, 0.0, 7.0))
        .collect();
    straight_store.update(shifted);

    let waypoints = straight_store.waypoints().unwrap();
    assert_eq!(waypoints[0].position.y, 1000.0);
    assert_eq!(waypoints[0].speed, 7.0);
    assert_eq!(
        straight_store.index().unwrap().points()[0],
        Point2D::new(0.0, 0.0)
    );
    assert_eq!(straight_store.nearest(&Point2D::new(20.2, 0.0)), Ok(20));
}

#[rstest]
#[case(-1, None)]
#[case(-42, None)]
#[case(0, Some(0))]
#[case(291, Some(291))]
fn test_stop_line_from_raw(#[case] raw: i32, #[case] expected: Option<usize>) {
    assert_eq!(stop_line_from_raw(raw), expected);
}

#[test]
fn test_snapshot_becomes_ready_with_pose_and_path() {
    let state = SharedState::new();
    assert_eq!(state.snapshot().mode(), Mode::NotReady);

    state.pose_handle().update(VehiclePose::new(3.0, 0.0, 0.0));
    assert_eq!(state.snapshot().mode(), Mode::NotReady);

    state.path_handle().update(straight_path(20));
    let snapshot = state.snapshot();
    assert_eq!(snapshot.mode(), Mode::Ready);
    assert_eq!(snapshot.waypoints.unwrap().len(), 20);
    assert_eq!(snapshot.stop_line, None);
}

#[test]
fn test_stop_line_is_last_writer_wins() {
    let state = SharedState::new();
    let handle = state.stop_line_handle();

    handle.update(Some(12));
    assert_eq!(state.snapshot().stop_line, Some(12));
    handle.update(Some(30));
    assert_eq!(state.snapshot().stop_line, Some(30));
    handle.update(stop_line_from_raw(-1));
    assert_eq!(state.snapshot().stop_line, None);
}

#[test]
fn test_handles_update_from_other_threads() {
    let state = SharedState::new();
    let pose = state.pose_handle();
    let path = state.path_handle();

    let writers = vec![
        std::thread::spawn(move || {
            for i in 0..100 {
                pose.update(VehiclePose::new(i as f64, 0.0, 0.0));
            }
        }),
        std::thread::spawn(move || path.update(straight_path(100))),
    ];
    for writer in writers {
        writer.join().unwrap();
    }

    let snapshot = state.snapshot();
    assert_eq!(snapshot.pose.unwrap().position.x, 99.0);
    assert!(state.path().is_index_built());
}

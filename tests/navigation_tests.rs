use rstest::{fixture, rstest};
use waypoint_updater::navigation::{DecelerationPlanner, LookaheadWindow, WindowSelector};
use waypoint_updater::{NavigationConfig, Waypoint};

const EPS: f64 = 1e-9;

// Waypoints one unit apart along x, each with the same nominal speed
fn straight_path(n: usize, speed: f64) -> Vec<Waypoint> {
    (0..n)
        .map(|i| Waypoint::new(i as f64, 0.0, 0.0, speed))
        .collect()
}

fn path_indices(window: &LookaheadWindow) -> Vec<usize> {
    window
        .waypoints
        .iter()
        .map(|wp| wp.position.x as usize)
        .collect()
}

#[fixture]
fn track() -> Vec<Waypoint> {
    straight_path(60, 5.0)
}

#[fixture]
fn planner() -> DecelerationPlanner {
    DecelerationPlanner::new(&NavigationConfig::default())
}

#[rstest]
#[case(0, vec![0, 1, 2, 3, 4])]
#[case(3, vec![3, 4, 5, 6, 7])]
#[case(5, vec![5, 6, 7, 8, 9])]
#[case(6, vec![6, 7, 8, 9, 10])]
#[case(8, vec![8, 9, 10, 0, 1])]
#[case(9, vec![9, 10, 0, 1, 2])]
#[case(10, vec![0, 1, 2, 3, 4])]
fn test_window_order_and_wrap(#[case] closest: usize, #[case] expected: Vec<usize>) {
    let path = straight_path(11, 5.0);
    let window = WindowSelector::new(5).select(closest, &path);
    assert_eq!(path_indices(&window), expected);
}

#[rstest]
fn test_window_length_is_lookahead(track: Vec<Waypoint>) {
    let selector = WindowSelector::new(50);
    for closest in 0..track.len() {
        let window = selector.select(closest, &track);
        assert_eq!(window.waypoints.len(), 50, "closest={}", closest);
    }
}

#[rstest]
fn test_window_tail_wraps_to_path_start(track: Vec<Waypoint>) {
    let window = WindowSelector::new(50).select(30, &track);

    let indices = path_indices(&window);
    assert_eq!(indices[..30], (30..60).collect::<Vec<_>>()[..]);
    assert_eq!(indices[30..], (0..20).collect::<Vec<_>>()[..]);
    assert_eq!(window.closest_idx, 30);
    assert_eq!(window.farthest_idx, 80);
}

#[rstest]
fn test_window_on_last_waypoint_restarts_at_zero(track: Vec<Waypoint>) {
    let window = WindowSelector::new(50).select(59, &track);
    assert_eq!(window.closest_idx, 0);
    assert_eq!(window.farthest_idx, 50);
    assert_eq!(path_indices(&window), (0..50).collect::<Vec<_>>());
}

#[test]
fn test_window_shorter_path_returns_whole_path() {
    let path = straight_path(10, 5.0);
    let window = WindowSelector::new(50).select(4, &path);
    assert_eq!(path_indices(&window), vec![4, 5, 6, 7, 8, 9, 0, 1, 2, 3]);

    let empty = WindowSelector::new(50).select(0, &[]);
    assert!(empty.waypoints.is_empty());
}

#[rstest]
fn test_braking_scenario_on_straight_track(track: Vec<Waypoint>, planner: DecelerationPlanner) {
    let window = WindowSelector::new(50).select(10, &track);
    assert!(planner.braking_engaged(&window, Some(15), 59));
    assert_eq!(planner.stop_index(10, 15), 2);

    let plan = planner.plan(&window, Some(15), 59);
    assert!(plan.braking);
    let lane = plan.waypoints;
    assert_eq!(lane.len(), 50);
    assert!((lane[0].speed - 2.0_f64.sqrt()).abs() < EPS);
    assert!((lane[1].speed - 1.02).abs() < EPS);
    for wp in &lane[2..] {
        assert_eq!(wp.speed, 0.0);
    }
    // Poses are carried over untouched
    assert!(
        lane.iter()
            .zip(&window.waypoints)
            .all(|(out, base)| out.position == base.position)
    );
}

#[rstest]
#[case::no_stop_line(None, 59)]
#[case::stop_line_beyond_window(Some(60), 59)]
#[case::stop_line_far_beyond_window(Some(75), 59)]
#[case::past_last_light(Some(15), 9)]
fn test_cruise_speeds_pass_through(
    track: Vec<Waypoint>,
    planner: DecelerationPlanner,
    #[case] stop_line: Option<usize>,
    #[case] last_stop_idx: usize,
) {
    let window = WindowSelector::new(50).select(10, &track);
    assert!(!planner.braking_engaged(&window, stop_line, last_stop_idx));
    let plan = planner.plan(&window, stop_line, last_stop_idx);
    assert!(!plan.braking);
    assert_eq!(plan.waypoints, window.waypoints);
}

#[rstest]
fn test_zero_at_stop_and_speed_ceiling(planner: DecelerationPlanner) {
    // Mixed nominal speeds so the ceiling actually bites
    let path: Vec<Waypoint> = (0..80)
        .map(|i| Waypoint::new(i as f64 * 2.0, 0.0, 0.0, 2.0 + (i % 5) as f64))
        .collect();
    let selector = WindowSelector::new(50);

    for closest in [0, 7, 20] {
        for stop_line in closest..closest + 50 {
            let window = selector.select(closest, &path);
            let lane = planner.plan(&window, Some(stop_line), 79).waypoints;
            let stop_idx = planner.stop_index(closest, stop_line);

            for (i, (out, base)) in lane.iter().zip(&window.waypoints).enumerate() {
                assert!(out.speed >= 0.0);
                assert!(out.speed <= base.speed);
                if i >= stop_idx {
                    assert_eq!(out.speed, 0.0, "closest={} stop={} i={}", closest, stop_line, i);
                }
            }
        }
    }
}

#[rstest]
fn test_stop_line_inside_margin_stops_immediately(track: Vec<Waypoint>, planner: DecelerationPlanner) {
    let window = WindowSelector::new(50).select(10, &track);
    let plan = planner.plan(&window, Some(12), 59);
    assert_eq!(planner.stop_index(10, 12), 0);
    assert!(plan.braking);
    assert!(plan.waypoints.iter().all(|wp| wp.speed == 0.0));
}

#[rstest]
fn test_plan_is_idempotent(track: Vec<Waypoint>, planner: DecelerationPlanner) {
    let window = WindowSelector::new(50).select(20, &track);
    let first = planner.plan(&window, Some(40), 59);
    let second = planner.plan(&window, Some(40), 59);
    assert_eq!(first, second);
}

#[test]
fn test_braking_on_short_path_stays_in_bounds() {
    let path = straight_path(10, 5.0);
    let window = WindowSelector::new(50).select(2, &path);
    let planner = DecelerationPlanner::new(&NavigationConfig::default());

    let lane = planner.plan(&window, Some(8), 9).waypoints;
    assert_eq!(lane.len(), 10);
    assert!(lane.iter().all(|wp| wp.speed <= 5.0));
}

#[test]
fn test_arc_length_uses_3d_distance() {
    let path = vec![
        Waypoint::new(0.0, 0.0, 0.0, 5.0),
        Waypoint::new(3.0, 4.0, 0.0, 5.0),
        Waypoint::new(3.0, 4.0, 12.0, 5.0),
    ];
    assert!((waypoint_updater::core::arc_length(&path, 0, 2) - 17.0).abs() < EPS);
    assert_eq!(waypoint_updater::core::arc_length(&path, 2, 1), 0.0);
    assert_eq!(waypoint_updater::core::arc_length(&path, 1, 1), 0.0);
}

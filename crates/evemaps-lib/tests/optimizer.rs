mod common;

use std::collections::HashSet;

use common::{islanded_universe, route_request};
use evemaps_lib::test_helpers::{amarr_corridor, trade_lane};
use evemaps_lib::{find_path, plan_route, CancelToken, Error, Jump, SearchConstraints};

fn step_names(plan: &evemaps_lib::RoutePlan) -> Vec<&str> {
    plan.steps.iter().map(|step| step.name.as_str()).collect()
}

#[test]
fn direct_route_reports_two_jumps() {
    let universe = trade_lane();
    let request = route_request("Jita", "Urlen");

    let plan = plan_route(&universe, &request, &[], &CancelToken::new()).unwrap();
    assert_eq!(step_names(&plan), vec!["Jita", "Perimeter", "Urlen"]);
    assert_eq!(plan.jumps, 2);
}

#[test]
fn steps_count_jumps_cumulatively_from_the_origin() {
    let universe = trade_lane();
    let request = route_request("Jita", "Urlen");

    let plan = plan_route(&universe, &request, &[], &CancelToken::new()).unwrap();
    let taken: Vec<usize> = plan.steps.iter().map(|step| step.jumps).collect();
    assert_eq!(taken, vec![0, 1, 2]);
}

#[test]
fn jump_count_always_matches_the_step_sequence() {
    let universe = amarr_corridor();
    let mut request = route_request("Amarr", "Niarja");
    request.waypoints = vec!["Madirmilire".to_string(), "Ashab".to_string()];
    request.keep_waypoint_order = true;

    let plan = plan_route(&universe, &request, &[], &CancelToken::new()).unwrap();
    assert_eq!(plan.jumps, plan.steps.len() - 1);
}

#[test]
fn forced_waypoint_order_revisits_junction_systems() {
    let universe = amarr_corridor();
    let mut request = route_request("Amarr", "Niarja");
    request.waypoints = vec!["Madirmilire".to_string(), "Ashab".to_string()];
    request.keep_waypoint_order = true;

    let plan = plan_route(&universe, &request, &[], &CancelToken::new()).unwrap();
    assert_eq!(
        step_names(&plan),
        vec!["Amarr", "Ashab", "Madirmilire", "Ashab", "Madirmilire", "Niarja"]
    );
    assert_eq!(plan.jumps, 5);
}

#[test]
fn forced_order_is_the_stitched_pairwise_legs() {
    let universe = amarr_corridor();
    let mut request = route_request("Amarr", "Niarja");
    request.waypoints = vec!["Madirmilire".to_string(), "Ashab".to_string()];
    request.keep_waypoint_order = true;

    let stops = [
        universe.resolve("Amarr").unwrap(),
        universe.resolve("Madirmilire").unwrap(),
        universe.resolve("Ashab").unwrap(),
        universe.resolve("Niarja").unwrap(),
    ];
    let mut stitched = vec![stops[0]];
    for pair in stops.windows(2) {
        let leg = find_path(
            &universe,
            pair[0],
            pair[1],
            &SearchConstraints::new(),
            &CancelToken::new(),
        )
        .unwrap();
        stitched.extend_from_slice(&leg[1..]);
    }

    let plan = plan_route(&universe, &request, &[], &CancelToken::new()).unwrap();
    let taken: Vec<_> = plan.steps.iter().map(|step| step.id).collect();
    assert_eq!(taken, stitched);
}

#[test]
fn optimized_order_never_loses_to_the_forced_order() {
    let universe = amarr_corridor();
    let mut forced = route_request("Amarr", "Niarja");
    forced.waypoints = vec!["Madirmilire".to_string(), "Ashab".to_string()];
    forced.keep_waypoint_order = true;

    let mut optimized = forced.clone();
    optimized.keep_waypoint_order = false;

    let forced_plan = plan_route(&universe, &forced, &[], &CancelToken::new()).unwrap();
    let optimized_plan = plan_route(&universe, &optimized, &[], &CancelToken::new()).unwrap();

    assert_eq!(
        step_names(&optimized_plan),
        vec!["Amarr", "Ashab", "Madirmilire", "Niarja"]
    );
    assert_eq!(optimized_plan.jumps, 3);
    assert!(optimized_plan.jumps <= forced_plan.jumps);
}

#[test]
fn unknown_origin_fails_with_suggestions() {
    let universe = trade_lane();
    let request = route_request("Jiat", "Urlen");

    let error = plan_route(&universe, &request, &[], &CancelToken::new()).unwrap_err();
    match error {
        Error::UnknownSystem { name, suggestions } => {
            assert_eq!(name, "Jiat");
            assert!(suggestions.contains(&"Jita".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unknown_waypoint_fails_the_whole_request() {
    let universe = trade_lane();
    let mut request = route_request("Jita", "Urlen");
    request.waypoints = vec!["Nowhere".to_string()];

    let error = plan_route(&universe, &request, &[], &CancelToken::new()).unwrap_err();
    assert!(matches!(error, Error::UnknownSystem { .. }));
}

#[test]
fn unreachable_destination_is_an_empty_plan_not_an_error() {
    let universe = islanded_universe();
    let request = route_request("Jita", "Island");

    let plan = plan_route(&universe, &request, &[], &CancelToken::new()).unwrap();
    assert!(plan.is_unreachable());
    assert_eq!(plan.jumps, 0);
    assert!(plan.steps.is_empty());
}

#[test]
fn unreachable_waypoint_disqualifies_every_ordering() {
    let universe = islanded_universe();
    let mut request = route_request("Jita", "Urlen");
    request.waypoints = vec!["Island".to_string()];

    let plan = plan_route(&universe, &request, &[], &CancelToken::new()).unwrap();
    assert!(plan.is_unreachable());
}

#[test]
fn avoided_destination_means_no_route() {
    let universe = trade_lane();
    let mut request = route_request("Jita", "Urlen");
    request.avoid_systems = vec!["Urlen".to_string()];

    let plan = plan_route(&universe, &request, &[], &CancelToken::new()).unwrap();
    assert!(plan.is_unreachable());
}

#[test]
fn avoided_ids_block_like_named_systems() {
    let universe = trade_lane();
    let mut request = route_request("Jita", "Urlen");
    request.avoid_ids = HashSet::from([2]);

    let plan = plan_route(&universe, &request, &[], &CancelToken::new()).unwrap();
    assert!(plan.is_unreachable());
}

#[test]
fn overlay_connections_shorten_the_plan() {
    let universe = trade_lane();
    let request = route_request("Jita", "Urlen");
    let overlay = [Jump::gate(1, 3), Jump::gate(3, 1)];

    let plan = plan_route(&universe, &request, &overlay, &CancelToken::new()).unwrap();
    assert_eq!(step_names(&plan), vec!["Jita", "Urlen"]);
    assert_eq!(plan.jumps, 1);
}

#[test]
fn resolution_is_case_insensitive_end_to_end() {
    let universe = trade_lane();
    let request = route_request("jita", "URLEN");

    let plan = plan_route(&universe, &request, &[], &CancelToken::new()).unwrap();
    assert_eq!(plan.jumps, 2);
}

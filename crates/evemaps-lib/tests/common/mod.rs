//! Fixtures shared across the integration tests.

#![allow(dead_code)]

use evemaps_lib::routing::RouteRequest;
use evemaps_lib::test_helpers::{link, system};
use evemaps_lib::{SystemId, Universe};

/// Request with every optional knob left at its default.
pub fn route_request(origin: &str, destination: &str) -> RouteRequest {
    RouteRequest {
        origin: origin.to_string(),
        destination: destination.to_string(),
        ..RouteRequest::default()
    }
}

/// Diamond of four systems with two equal-length lanes from 1 to 4.
pub fn braided_universe() -> Universe {
    let systems = vec![
        system(1, "Entry", 0.0, 0.0, 0.0),
        system(2, "NorthLane", 0.01, 0.01, 0.0),
        system(3, "SouthLane", 0.01, -0.01, 0.0),
        system(4, "Exit", 0.02, 0.0, 0.0),
    ];
    let mut jumps = link(1, 2);
    jumps.extend(link(1, 3));
    jumps.extend(link(2, 4));
    jumps.extend(link(3, 4));
    Universe::from_parts(systems, jumps)
}

/// Trade lane plus a disconnected island system.
pub fn islanded_universe() -> Universe {
    let systems = vec![
        system(1, "Jita", 0.0, 0.0, 0.0),
        system(2, "Perimeter", 0.01, 0.0, 0.0),
        system(3, "Urlen", 0.02, 0.0, 0.0),
        system(9, "Island", 0.5, 0.5, 0.0),
    ];
    let mut jumps = link(1, 2);
    jumps.extend(link(2, 3));
    Universe::from_parts(systems, jumps)
}

/// Line of `length` systems with ids 1..=length.
pub fn chain_universe(length: SystemId) -> Universe {
    let mut systems = Vec::with_capacity(length as usize);
    for id in 1..=length {
        systems.push(system(id, &format!("Chain-{id}"), id as f64 * 0.001, 0.0, 0.0));
    }
    let mut jumps = Vec::new();
    for id in 1..length {
        jumps.extend(link(id, id + 1));
    }
    Universe::from_parts(systems, jumps)
}

//! Shared fixtures for the service integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::{Value, json};
use tempfile::TempDir;

use evemaps_lib::{Jump, OverlayFlags, OverlayProvider, ShipSize, SystemId};
use evemaps_service::{AppState, ServiceConfig, build_router};

/// Running test server plus the tempdir backing its datasets.
pub struct TestService {
    pub server: TestServer,
    _data: TempDir,
}

fn system_record(id: SystemId, name: &str, security: f64, x: f64) -> Value {
    json!({
        "name": name,
        "id": id,
        "security": security,
        "region": "The Forge",
        "x": x,
        "y": 0.0,
        "z": 0.0,
    })
}

fn gate(from: SystemId, to: SystemId) -> Value {
    json!({"from": from, "to": to})
}

/// Three linked trade systems plus an unreachable low-sec island.
///
/// Jita(1) - Perimeter(2) - Urlen(3) are high security; Island(9) has no
/// gates and sits roughly 25 light-years from Jita.
pub fn trade_universe() -> Value {
    json!({
        "solarSystems": [
            system_record(1, "Jita", 0.95, 0.0),
            system_record(2, "Perimeter", 0.9, 0.01),
            system_record(3, "Urlen", 0.9, 0.02),
            system_record(9, "Island", 0.2, 0.5),
        ],
        "jumps": [
            gate(1, 2), gate(2, 1),
            gate(2, 3), gate(3, 2),
        ],
    })
}

/// Status tags for [`trade_universe`]: an incursion in Perimeter and a
/// Triglavian-held island.
pub fn trade_statuses() -> Value {
    json!([
        {"nodeId": 2, "status": "incursion"},
        {"nodeId": 9, "status": "triglavian"},
    ])
}

/// A straight chain J-01 - J-02 - ... of the given length.
pub fn chain_universe(length: usize) -> Value {
    let systems: Vec<Value> = (1..=length)
        .map(|i| {
            system_record(
                i as SystemId,
                &format!("J-{i:02}"),
                0.3,
                i as f64 * 0.01,
            )
        })
        .collect();
    let mut jumps = Vec::new();
    for i in 1..length {
        jumps.push(gate(i as SystemId, (i + 1) as SystemId));
        jumps.push(gate((i + 1) as SystemId, i as SystemId));
    }
    json!({"solarSystems": systems, "jumps": jumps})
}

/// Overlay provider stub serving a fixed set of connections whenever any
/// overlay class is requested.
pub struct StubOverlay {
    pub edges: Vec<Jump>,
}

impl StubOverlay {
    pub fn wormhole(from: SystemId, to: SystemId, size: ShipSize) -> Jump {
        Jump {
            from,
            to,
            max_ship_size: Some(size),
        }
    }
}

#[async_trait]
impl OverlayProvider for StubOverlay {
    async fn connections(&self, flags: OverlayFlags) -> evemaps_lib::Result<Vec<Jump>> {
        if !flags.any() {
            return Ok(Vec::new());
        }
        Ok(self.edges.clone())
    }
}

/// Build a service over the given datasets and overlay providers.
pub fn build_service(
    universe: Value,
    statuses: Option<Value>,
    providers: Vec<Arc<dyn OverlayProvider>>,
) -> TestService {
    let data = tempfile::tempdir().expect("create dataset directory");
    let universe_path = data.path().join("universe.json");
    std::fs::write(&universe_path, universe.to_string()).expect("write universe dataset");

    let status_path = statuses.map(|records| {
        let path = data.path().join("status.json");
        std::fs::write(&path, records.to_string()).expect("write status dataset");
        path
    });

    let config = ServiceConfig {
        universe_path,
        status_path,
        ..ServiceConfig::default()
    };
    let state = AppState::with_providers(config, providers).expect("build application state");
    let server = TestServer::new(build_router(state)).expect("start test server");

    TestService {
        server,
        _data: data,
    }
}

/// Trade-lane service with status tags and no overlay providers.
pub fn trade_service() -> TestService {
    build_service(trade_universe(), Some(trade_statuses()), Vec::new())
}

/// Trade-lane service with a stub wormhole provider.
pub fn trade_service_with_overlay(edges: Vec<Jump>) -> TestService {
    build_service(
        trade_universe(),
        Some(trade_statuses()),
        vec![Arc::new(StubOverlay { edges })],
    )
}

/// Chain service for admission control tests.
pub fn chain_service(length: usize) -> TestService {
    build_service(chain_universe(length), None, Vec::new())
}

/// Service whose universe dataset is missing on disk.
pub fn broken_service() -> TestService {
    let data = tempfile::tempdir().expect("create dataset directory");
    let config = ServiceConfig {
        universe_path: data.path().join("missing.json"),
        status_path: None,
        ..ServiceConfig::default()
    };
    let state = AppState::with_providers(config, Vec::new()).expect("build application state");
    let server = TestServer::new(build_router(state)).expect("start test server");

    TestService {
        server,
        _data: data,
    }
}

//! Builders shared by unit and integration tests.

use crate::universe::{Jump, Position, SolarSystem, SystemId, Universe};

/// Build a system in The Forge with open security.
pub fn system(id: SystemId, name: &str, x: f64, y: f64, z: f64) -> SolarSystem {
    system_with_security(id, name, x, y, z, 0.0)
}

pub fn system_with_security(
    id: SystemId,
    name: &str,
    x: f64,
    y: f64,
    z: f64,
    security: f64,
) -> SolarSystem {
    SolarSystem {
        id,
        name: name.to_string(),
        security,
        region: "The Forge".to_string(),
        position: Position { x, y, z },
    }
}

/// Both directions of a stargate link.
pub fn link(from: SystemId, to: SystemId) -> Vec<Jump> {
    vec![Jump::gate(from, to), Jump::gate(to, from)]
}

/// Jita (1), Perimeter (2) and Urlen (3) joined in a line.
pub fn trade_lane() -> Universe {
    let systems = vec![
        system(1, "Jita", 0.0, 0.0, 0.0),
        system(2, "Perimeter", 0.01, 0.0, 0.0),
        system(3, "Urlen", 0.02, 0.0, 0.0),
    ];
    let mut jumps = link(1, 2);
    jumps.extend(link(2, 3));
    Universe::from_parts(systems, jumps)
}

/// Amarr (1), Ashab (2), Madirmilire (3) and Niarja (4) joined in a line.
pub fn amarr_corridor() -> Universe {
    let systems = vec![
        system(1, "Amarr", 0.0, 0.0, 0.0),
        system(2, "Ashab", 0.01, 0.0, 0.0),
        system(3, "Madirmilire", 0.02, 0.0, 0.0),
        system(4, "Niarja", 0.03, 0.0, 0.0),
    ];
    let mut jumps = link(1, 2);
    jumps.extend(link(2, 3));
    jumps.extend(link(3, 4));
    Universe::from_parts(systems, jumps)
}

use std::fs;
use std::sync::Arc;

use serde_json::json;
use tempfile::NamedTempFile;

use evemaps_lib::{
    find_path, load_universe, CancelToken, Error, Result, SearchConstraints, StatusStore,
    UniverseStore,
};

fn trade_document() -> serde_json::Value {
    json!({
        "solarSystems": [
            {"name": "Jita", "id": 1, "security": 0.95, "region": "The Forge",
             "x": 0.0, "y": 0.0, "z": 0.0},
            {"name": "Perimeter", "id": 2, "security": 0.9, "region": "The Forge",
             "x": 0.01, "y": 0.0, "z": 0.0},
            {"name": "Urlen", "id": 3, "security": 0.9, "region": "The Forge",
             "x": 0.02, "y": 0.0, "z": 0.0},
        ],
        "jumps": [
            {"from": 1, "to": 2}, {"from": 2, "to": 1},
            {"from": 2, "to": 3}, {"from": 3, "to": 2},
        ],
    })
}

#[test]
fn load_document_and_find_a_route() -> Result<()> {
    let file = NamedTempFile::new()?;
    fs::write(file.path(), trade_document().to_string())?;

    let universe = load_universe(file.path())?;
    assert_eq!(universe.len(), 3);
    assert_eq!(universe.resolve("Perimeter")?, 2);
    assert_eq!(universe.edges_from(2).len(), 2);

    let path = find_path(
        &universe,
        1,
        3,
        &SearchConstraints::new(),
        &CancelToken::new(),
    );
    assert_eq!(path, Some(vec![1, 2, 3]));

    Ok(())
}

#[test]
fn store_memoizes_the_first_load() -> Result<()> {
    let file = NamedTempFile::new()?;
    fs::write(file.path(), trade_document().to_string())?;

    let store = UniverseStore::new(file.path());
    assert!(!store.is_loaded());

    let first = store.get()?;
    let second = store.get()?;
    assert!(store.is_loaded());
    assert!(Arc::ptr_eq(&first, &second), "second get reuses the load");

    Ok(())
}

#[test]
fn store_recovers_once_the_dataset_appears() -> Result<()> {
    let directory = tempfile::tempdir()?;
    let path = directory.path().join("universe.json");
    let store = UniverseStore::new(&path);

    assert!(matches!(store.get(), Err(Error::DataUnavailable { .. })));
    assert!(!store.is_loaded());

    fs::write(&path, trade_document().to_string())?;
    let universe = store.get()?;
    assert_eq!(universe.len(), 3);

    Ok(())
}

#[test]
fn missing_document_reports_its_path() {
    let error = load_universe("/nonexistent/universe.json".as_ref()).unwrap_err();
    match error {
        Error::DataUnavailable { path, .. } => {
            assert_eq!(path.to_str(), Some("/nonexistent/universe.json"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn malformed_document_is_rejected() -> Result<()> {
    let file = NamedTempFile::new()?;
    fs::write(file.path(), "{\"solarSystems\": 42}")?;

    assert!(matches!(
        load_universe(file.path()),
        Err(Error::DataUnavailable { .. })
    ));

    Ok(())
}

#[test]
fn status_document_loads_from_disk() -> Result<()> {
    let file = NamedTempFile::new()?;
    let records = json!([
        {"nodeId": 2, "status": "incursion"},
        {"nodeId": 7, "status": "triglavian"},
    ]);
    fs::write(file.path(), records.to_string())?;

    let store = StatusStore::new(Some(file.path()))?;
    assert_eq!(store.len(), 2);
    assert!(store.avoid_ids(true, false).contains(&2));
    assert!(store.avoid_ids(false, true).contains(&7));

    Ok(())
}

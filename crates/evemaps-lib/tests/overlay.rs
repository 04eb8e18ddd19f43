use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use evemaps_lib::{EveScoutProvider, OverlayFlags, OverlayProvider, ShipSize};

#[derive(Clone)]
struct Feed {
    body: Value,
    hits: Arc<AtomicUsize>,
}

async fn signatures(State(feed): State<Feed>) -> Json<Value> {
    feed.hits.fetch_add(1, Ordering::SeqCst);
    Json(feed.body.clone())
}

async fn spawn_feed(body: Value) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let feed = Feed {
        body,
        hits: Arc::clone(&hits),
    };
    let app = Router::new()
        .route("/signatures", get(signatures))
        .with_state(feed);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{address}/"), hits)
}

fn signature(out_id: i64, out_name: &str, in_id: i64, size: &str) -> Value {
    json!({
        "id": out_id * 10,
        "signature_type": "wormhole",
        "out_system_id": out_id,
        "out_system_name": out_name,
        "in_system_id": in_id,
        "in_region_name": "The Forge",
        "max_ship_size": size,
    })
}

const THERA: OverlayFlags = OverlayFlags {
    use_thera: true,
    use_turnur: false,
};

const TURNUR: OverlayFlags = OverlayFlags {
    use_thera: false,
    use_turnur: true,
};

#[tokio::test]
async fn fetched_signatures_are_cached() {
    let (base_url, hits) = spawn_feed(json!([signature(100, "Thera", 7, "large")])).await;
    let provider = EveScoutProvider::with_base_url(base_url).unwrap();

    let first = provider.connections(THERA).await.unwrap();
    let second = provider.connections(THERA).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(hits.load(Ordering::SeqCst), 1, "second call hits the cache");
}

#[tokio::test]
async fn expired_cache_refetches_from_the_feed() {
    let (base_url, hits) = spawn_feed(json!([signature(100, "Thera", 7, "large")])).await;
    let provider = EveScoutProvider::with_base_url(base_url)
        .unwrap()
        .with_ttl(Duration::from_millis(10));

    provider.connections(THERA).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    provider.connections(THERA).await.unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn network_filters_apply_to_the_cached_fetch() {
    let (base_url, hits) = spawn_feed(json!([
        signature(100, "Thera", 7, "medium"),
        signature(200, "Turnur", 8, "capital"),
    ]))
    .await;
    let provider = EveScoutProvider::with_base_url(base_url).unwrap();

    let thera_edges = provider.connections(THERA).await.unwrap();
    assert_eq!(thera_edges.len(), 2);
    assert!(thera_edges.iter().all(|edge| edge.from == 7 || edge.to == 7));

    let turnur_edges = provider.connections(TURNUR).await.unwrap();
    assert_eq!(turnur_edges.len(), 2);
    assert!(turnur_edges.iter().all(|edge| edge.from == 8 || edge.to == 8));

    assert_eq!(hits.load(Ordering::SeqCst), 1, "filtering never refetches");
}

#[tokio::test]
async fn wire_ship_sizes_become_capacity_classes() {
    let (base_url, _hits) = spawn_feed(json!([signature(100, "Thera", 7, "xlarge")])).await;
    let provider = EveScoutProvider::with_base_url(base_url).unwrap();

    let edges = provider.connections(THERA).await.unwrap();
    assert!(edges
        .iter()
        .all(|edge| edge.max_ship_size == Some(ShipSize::Xlarge)));
}

#[tokio::test]
async fn failing_feed_surfaces_as_an_error() {
    // Nothing listens on this port.
    let provider = EveScoutProvider::with_base_url("http://127.0.0.1:1/").unwrap();
    let result = provider.connections(THERA).await;
    assert!(result.is_err());
}

//! Integration tests for the restaurant API.
//!
//! These tests drive the real axum router and service against an in-memory
//! engine that honours the provider contract. It upserts documents by id and
//! evaluates the serialized query body the way the engine would: terms matched
//! against name and tags, and a point-in-polygon coverage filter on numeric
//! GeoJSON coordinates.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use restaurant_search_api::errors::ApiErrorResponse;
use restaurant_search_api::server::create_app;
use restaurant_search_repository::{
    RestaurantIndexProvider, RestaurantQuery, RestaurantSearchService,
    RestaurantSearchServiceConfig, SearchIndexError,
};
use restaurant_search_shared::{DeliveryArea, Position, Restaurant, SearchResult};
use serde_json::{json, Value};
use tower::ServiceExt;

// In-memory engine for testing
#[derive(Default)]
struct InMemoryEngine {
    documents: Mutex<HashMap<String, Value>>,
    bulk_calls: AtomicUsize,
    search_calls: AtomicUsize,
    fail_bulk: bool,
    fail_search: bool,
}

impl InMemoryEngine {
    fn failing_bulk() -> Self {
        Self {
            fail_bulk: true,
            ..Default::default()
        }
    }

    fn failing_search() -> Self {
        Self {
            fail_search: true,
            ..Default::default()
        }
    }

    fn insert_raw(&self, id: &str, source: Value) {
        self.documents
            .lock()
            .unwrap()
            .insert(id.to_string(), source);
    }

    fn bulk_calls(&self) -> usize {
        self.bulk_calls.load(Ordering::SeqCst)
    }

    fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn document_count(&self) -> usize {
        self.documents.lock().unwrap().len()
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

// An analyzed term with no tokens matches nothing
fn text_matches(term: &str, source: &Value) -> bool {
    let wanted = tokens(term);

    let mut haystack = tokens(source["name"].as_str().unwrap_or(""));
    if let Some(tags) = source["tags"].as_array() {
        for tag in tags.iter().filter_map(Value::as_str) {
            haystack.extend(tokens(tag));
        }
    }

    wanted.iter().any(|t| haystack.contains(t))
}

fn ring_contains(ring: &[Position], lng: f64, lat: f64) -> bool {
    let mut inside = false;
    let mut j = ring.len().saturating_sub(1);
    for i in 0..ring.len() {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if (yi > lat) != (yj > lat) && lng < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn area_covers(source: &Value, lng: f64, lat: f64) -> bool {
    let Ok(area) = serde_json::from_value::<DeliveryArea>(source["delivery_area"].clone()) else {
        return false;
    };
    match area.coordinates.split_first() {
        Some((outer, holes)) => {
            ring_contains(outer, lng, lat) && !holes.iter().any(|h| ring_contains(h, lng, lat))
        }
        None => false,
    }
}

#[async_trait]
impl RestaurantIndexProvider for InMemoryEngine {
    async fn ping(&self) -> Result<(), SearchIndexError> {
        Ok(())
    }

    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        Ok(())
    }

    async fn bulk_upsert_documents(
        &self,
        restaurants: &[Restaurant],
    ) -> Result<(), SearchIndexError> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_bulk {
            return Err(SearchIndexError::bulk_index("es_rejected_execution_exception"));
        }

        let mut documents = self.documents.lock().unwrap();
        for restaurant in restaurants {
            documents.insert(restaurant.id.clone(), serde_json::to_value(restaurant)?);
        }
        Ok(())
    }

    async fn search_documents(
        &self,
        query: &RestaurantQuery,
        size: usize,
    ) -> Result<Vec<Value>, SearchIndexError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(SearchIndexError::search("search_phase_execution_exception"));
        }

        let body = serde_json::to_value(query)?;
        let term = body["bool"]["must"][0]["multi_match"]["query"]
            .as_str()
            .ok_or_else(|| SearchIndexError::search("parsing_exception: missing multi_match"))?;
        let shape = &body["bool"]["filter"][0]["geo_shape"]["delivery_area"];
        if shape["relation"] != "intersects" || shape["shape"]["type"] != "point" {
            return Err(SearchIndexError::search("parsing_exception: unexpected geo_shape"));
        }
        let coordinates = shape["shape"]["coordinates"]
            .as_array()
            .filter(|c| c.len() == 2)
            .ok_or_else(|| SearchIndexError::search("parse_exception: missing coordinates"))?;
        let (Some(lng), Some(lat)) = (coordinates[0].as_f64(), coordinates[1].as_f64()) else {
            return Err(SearchIndexError::search(
                "parse_exception: geo coordinates must be numbers",
            ));
        };

        let documents = self.documents.lock().unwrap();
        let mut hits: Vec<(&String, &Value)> = documents
            .iter()
            .filter(|(_, source)| area_covers(source, lng, lat) && text_matches(term, source))
            .collect();
        hits.sort_by(|a, b| a.0.cmp(b.0));

        Ok(hits
            .into_iter()
            .take(size)
            .map(|(_, source)| source.clone())
            .collect())
    }
}

fn build_app(engine: Arc<InMemoryEngine>) -> Router {
    let service = RestaurantSearchService::with_config(
        engine,
        RestaurantSearchServiceConfig::default().with_max_batch_size(100),
    );
    create_app(Arc::new(service))
}

async fn post_restaurants(app: &Router, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/restaurants")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn search(app: &Router, uri: &str) -> SearchResult {
    let (status, body) = get(app, uri).await;
    assert_eq!(status, StatusCode::OK, "body: {}", String::from_utf8_lossy(&body));
    serde_json::from_slice(&body).unwrap()
}

fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ApiErrorResponse>(body).unwrap().error
}

fn ids(result: &SearchResult) -> Vec<&str> {
    result.restaurants.iter().map(|r| r.id.as_str()).collect()
}

fn square(min: f64, max: f64) -> DeliveryArea {
    DeliveryArea::polygon(vec![[min, min], [min, max], [max, max], [max, min], [min, min]])
}

#[tokio::test]
async fn test_ingest_then_search_scenario() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let payload = json!([{
        "id": "r1",
        "name": "Pizza Place",
        "tags": ["pizza"],
        "delivery_area": {
            "type": "Polygon",
            "coordinates": [[[0, 0], [0, 1], [1, 1], [1, 0], [0, 0]]]
        }
    }]);
    let (status, body) = post_restaurants(&app, payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let inside = search(&app, "/search?q=pizza&lat=0.5&lng=0.5").await;
    assert_eq!(ids(&inside), vec!["r1"]);

    let outside = search(&app, "/search?q=pizza&lat=5&lng=5").await;
    assert!(outside.is_empty());
}

#[tokio::test]
async fn test_search_response_envelope() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine);

    let (status, body) = get(&app, "/search?q=pizza&lat=0.5&lng=0.5").await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value, json!({ "Restaurants": [] }));
}

#[tokio::test]
async fn test_reingest_same_id_keeps_latest_only() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let first = Restaurant::new("r1", "Pizza Place", square(0.0, 1.0)).with_tags(["pizza"]);
    let second = Restaurant {
        rating: 5,
        ..Restaurant::new("r1", "Burger Barn", square(0.0, 1.0)).with_tags(["burger"])
    };

    for restaurant in [&first, &second] {
        let (status, _) =
            post_restaurants(&app, serde_json::to_string(&vec![restaurant]).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(engine.document_count(), 1);

    let stale = search(&app, "/search?q=pizza&lat=0.5&lng=0.5").await;
    assert!(stale.is_empty());

    let latest = search(&app, "/search?q=burger&lat=0.5&lng=0.5").await;
    assert_eq!(latest.restaurants, vec![second]);
}

#[tokio::test]
async fn test_invalid_json_never_reaches_engine() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let payloads = vec![
        "",
        "not json",
        "{\"id\": \"r1\"}",
        "[{\"id\": \"r1\", \"price\": \"cheap\"}]",
        "[{\"id\": \"r1\", \"open\": \"yes\"}]",
        "[{\"id\": \"r1\", \"delivery_area\": {\"coordinates\": [[[0]]]}}]",
        "[{\"id\": \"r1\"}",
    ];

    for payload in payloads {
        let (status, body) = post_restaurants(&app, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {}", payload);
        assert!(
            error_message(&body).starts_with("Invalid JSON"),
            "payload: {}",
            payload
        );
    }

    assert_eq!(engine.bulk_calls(), 0);
}

#[tokio::test]
async fn test_ingest_without_content_type() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/restaurants")
        .body(Body::from(r#"[{"id": "r1", "name": "Pizza Place"}]"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(engine.document_count(), 1);
}

#[tokio::test]
async fn test_batch_over_limit_is_rejected() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let batch: Vec<Restaurant> = (0..101)
        .map(|i| Restaurant::new(format!("r{}", i), "Diner", square(0.0, 1.0)))
        .collect();
    let (status, _) = post_restaurants(&app, serde_json::to_string(&batch).unwrap()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(engine.bulk_calls(), 0);
}

#[tokio::test]
async fn test_empty_batch_is_accepted() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let (status, _) = post_restaurants(&app, "[]").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(engine.bulk_calls(), 0);
}

#[tokio::test]
async fn test_bulk_failure_is_bad_request() {
    let engine = Arc::new(InMemoryEngine::failing_bulk());
    let app = build_app(engine.clone());

    let batch = vec![Restaurant::new("r1", "Pizza Place", square(0.0, 1.0))];
    let (status, body) = post_restaurants(&app, serde_json::to_string(&batch).unwrap()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Restaurant creation failed");
    assert_eq!(engine.bulk_calls(), 1);
}

#[tokio::test]
async fn test_missing_location_is_bad_request() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let uris = vec![
        "/search",
        "/search?q=pizza",
        "/search?q=pizza&lat=0.5",
        "/search?q=pizza&lng=0.5",
        "/search?lat=0.5",
        "/search?lng=0.5",
        "/search?q=&lat=&lng=0.5",
        "/search?q=pizza&lat=0.5&lng=",
    ];

    for uri in uris {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {}", uri);
        assert_eq!(error_message(&body), "No location params", "uri: {}", uri);
    }

    assert_eq!(engine.search_calls(), 0);
}

#[tokio::test]
async fn test_coverage_filter_beats_text_score() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let batch = vec![
        Restaurant::new("near", "Corner Cafe", square(0.0, 1.0)).with_tags(["pizza"]),
        Restaurant::new("far", "Pizza Pizza Pizza", square(10.0, 11.0))
            .with_tags(["pizza", "pizza slices"]),
    ];
    let (status, _) = post_restaurants(&app, serde_json::to_string(&batch).unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    let result = search(&app, "/search?q=pizza&lat=0.5&lng=0.5").await;
    assert_eq!(ids(&result), vec!["near"]);
}

#[tokio::test]
async fn test_text_filter_within_coverage() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let batch = vec![
        Restaurant::new("r1", "Pizza Place", square(0.0, 1.0)),
        Restaurant::new("r2", "Sushi Bar", square(0.0, 1.0)),
    ];
    let (status, _) = post_restaurants(&app, serde_json::to_string(&batch).unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    let result = search(&app, "/search?q=sushi&lat=0.5&lng=0.5").await;
    assert_eq!(ids(&result), vec!["r2"]);

    let result = search(&app, "/search?q=pizza%20sushi&lat=0.5&lng=0.5").await;
    assert_eq!(ids(&result), vec!["r1", "r2"]);
}

#[tokio::test]
async fn test_empty_term_matches_nothing() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let batch = vec![Restaurant::new("r1", "Pizza Place", square(0.0, 1.0))];
    let (status, _) = post_restaurants(&app, serde_json::to_string(&batch).unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    for uri in [
        "/search?lat=0.5&lng=0.5",
        "/search?q=&lat=0.5&lng=0.5",
        "/search?q=%20%20&lat=0.5&lng=0.5",
    ] {
        let result = search(&app, uri).await;
        assert!(result.is_empty(), "uri: {}", uri);
    }
    assert_eq!(engine.search_calls(), 3);
}

#[tokio::test]
async fn test_ingest_accepts_null_fields() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let payload = json!([{
        "id": "r1",
        "name": "Pizza Place",
        "url": null,
        "tags": null,
        "food_tags": null,
        "delivery_area": {
            "type": "Polygon",
            "coordinates": [[[0, 0], [0, 1], [1, 1], [1, 0], [0, 0]]]
        }
    }]);
    let (status, _) = post_restaurants(&app, payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let result = search(&app, "/search?q=pizza&lat=0.5&lng=0.5").await;
    assert_eq!(ids(&result), vec!["r1"]);
    assert!(result.restaurants[0].tags.is_empty());
}

#[tokio::test]
async fn test_stored_document_with_null_fields_is_returned() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let mut stored = serde_json::to_value(Restaurant::new("r1", "Pizza Place", square(0.0, 1.0)))
        .unwrap();
    stored["tags"] = Value::Null;
    stored["food_tags"] = Value::Null;
    engine.insert_raw("r1", stored);

    let result = search(&app, "/search?q=pizza&lat=0.5&lng=0.5").await;
    assert_eq!(ids(&result), vec!["r1"]);
}

#[tokio::test]
async fn test_query_point_is_longitude_first() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    // A tall, thin strip: lng in [0, 1], lat in [0, 10]
    let strip = DeliveryArea::polygon(vec![
        [0.0, 0.0],
        [1.0, 0.0],
        [1.0, 10.0],
        [0.0, 10.0],
        [0.0, 0.0],
    ]);
    let batch = vec![Restaurant::new("r1", "Noodle House", strip)];
    let (status, _) = post_restaurants(&app, serde_json::to_string(&batch).unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    let inside = search(&app, "/search?lat=5&lng=0.5").await;
    assert_eq!(ids(&inside), vec!["r1"]);

    let swapped = search(&app, "/search?lat=0.5&lng=5").await;
    assert!(swapped.is_empty());
}

#[tokio::test]
async fn test_round_trip_preserves_every_field() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let restaurant = Restaurant {
        id: "r42".to_string(),
        name: "Trattoria Roma".to_string(),
        url: "https://example.com/roma".to_string(),
        image_url: "https://example.com/roma.jpg".to_string(),
        address: "1 Via Appia".to_string(),
        open: true,
        tags: vec!["pasta".to_string(), "pizza".to_string()],
        food_tags: vec!["vegetarian".to_string()],
        price: 3,
        rating: -1,
        delivery_area: DeliveryArea {
            geometry_type: "Polygon".to_string(),
            coordinates: vec![
                vec![[-1.0, -1.0], [-1.0, 2.0], [2.0, 2.0], [2.0, -1.0], [-1.0, -1.0]],
                vec![[1.5, 1.5], [1.5, 1.8], [1.8, 1.8], [1.5, 1.5]],
            ],
        },
    };

    let (status, _) =
        post_restaurants(&app, serde_json::to_string(&vec![&restaurant]).unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    let result = search(&app, "/search?q=pasta&lat=0.25&lng=0.75").await;
    assert_eq!(result.restaurants, vec![restaurant]);
}

#[tokio::test]
async fn test_malformed_stored_document_is_skipped() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let good = Restaurant::new("good", "Pizza Place", square(0.0, 1.0));
    let (status, _) = post_restaurants(&app, serde_json::to_string(&vec![&good]).unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    let mut corrupted = serde_json::to_value(&good).unwrap();
    corrupted["id"] = json!("corrupted");
    corrupted["rating"] = json!("five stars");
    engine.insert_raw("corrupted", corrupted);

    let result = search(&app, "/search?q=pizza&lat=0.5&lng=0.5").await;
    assert_eq!(ids(&result), vec!["good"]);
}

#[tokio::test]
async fn test_engine_rejects_malformed_coordinates() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let (status, body) = get(&app, "/search?q=pizza&lat=north&lng=0.5").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(&body), "Query failed");
    assert_eq!(engine.search_calls(), 1);
}

#[tokio::test]
async fn test_engine_query_failure_is_server_error() {
    let engine = Arc::new(InMemoryEngine::failing_search());
    let app = build_app(engine.clone());

    let (status, body) = get(&app, "/search?q=pizza&lat=0.5&lng=0.5").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(&body), "Query failed");
}

#[tokio::test]
async fn test_search_term_with_query_syntax_is_plain_text() {
    let engine = Arc::new(InMemoryEngine::default());
    let app = build_app(engine.clone());

    let batch = vec![Restaurant::new("r1", "Pizza Place", square(0.0, 1.0))];
    let (status, _) = post_restaurants(&app, serde_json::to_string(&batch).unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    // q = `"}}, "match_all": {` percent-encoded
    let result = search(
        &app,
        "/search?q=%22%7D%7D%2C%20%22match_all%22%3A%20%7B&lat=0.5&lng=0.5",
    )
    .await;
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_health() {
    let app = build_app(Arc::new(InMemoryEngine::default()));

    let (status, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

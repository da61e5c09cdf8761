//! Full pipeline against a mock backend: presign, proxy download, presigned
//! PUT, resource update, fallback escalation, and generation polling all go
//! over real HTTP.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, patch, post, put},
};
use bytes::Bytes;
use fabula::{
    Event, FabulaConfig, GenerationEvent, Pipeline, ResourceKind, UploadEvent,
    api::GenerateOptions,
    generate::PollOptions,
    upload::{RetryPolicy, UploadError},
};
use fabula_test_utils::{TestHttpServer, png_fixture};
use serde_json::{Value, json};
use url::Url;

const SOURCE_BYTES: usize = 100_000;

#[derive(Clone, Default)]
struct World {
    remaining_put_failures: Arc<AtomicU32>,
    put_bodies: Arc<Mutex<Vec<(String, Bytes)>>>,
    patches: Arc<Mutex<Vec<(String, u32, Value)>>>,
    proxied: Arc<Mutex<Vec<String>>>,
    fallbacks: Arc<AtomicU32>,
    presigns: Arc<AtomicU32>,
    book_polls: Arc<AtomicU32>,
}

fn host_base(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .expect("test requests carry a Host header");
    format!("http://{host}")
}

async fn presign(
    State(world): State<World>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    world.presigns.fetch_add(1, Ordering::SeqCst);
    let key = body["key"].as_str().expect("presign request carries a key");
    let base = host_base(&headers);
    Json(json!({
        "uploadUrl": format!("{base}/put/{key}"),
        "publicUrl": format!("{base}/cdn/{key}"),
    }))
}

async fn proxy(
    State(world): State<World>,
    Query(params): Query<HashMap<String, String>>,
) -> Vec<u8> {
    let source = params.get("url").cloned().unwrap_or_default();
    world.proxied.lock().unwrap().push(source);
    png_fixture(SOURCE_BYTES).to_vec()
}

async fn put_object(
    State(world): State<World>,
    Path(key): Path<String>,
    body: Bytes,
) -> StatusCode {
    let failed = world
        .remaining_put_failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failed {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    world.put_bodies.lock().unwrap().push((key, body));
    StatusCode::OK
}

async fn patch_resource(
    State(world): State<World>,
    Path((book_id, scene)): Path<(String, u32)>,
    Json(body): Json<Value>,
) -> StatusCode {
    world.patches.lock().unwrap().push((book_id, scene, body));
    StatusCode::OK
}

async fn fallback_upload(
    State(world): State<World>,
    headers: HeaderMap,
    Path((_book_id, scene)): Path<(String, u32)>,
    Json(_body): Json<Value>,
) -> Json<Value> {
    world.fallbacks.fetch_add(1, Ordering::SeqCst);
    let base = host_base(&headers);
    Json(json!({ "r2Url": format!("{base}/cdn/fallback/{scene}.png") }))
}

async fn start_generation(Path(book_id): Path<String>) -> Json<Value> {
    Json(json!({ "bookId": book_id, "message": "generation started" }))
}

async fn book_status(State(world): State<World>) -> Json<Value> {
    let poll = world.book_polls.fetch_add(1, Ordering::SeqCst) + 1;
    if poll >= 2 {
        Json(json!({
            "_id": "book-1",
            "status": "completed",
            "scenes": [
                { "sceneNumber": 1, "imageStatus": "completed" },
                { "sceneNumber": 2, "imageStatus": "completed" }
            ]
        }))
    } else {
        Json(json!({
            "_id": "book-1",
            "status": "generating",
            "scenes": [
                { "sceneNumber": 1, "imageStatus": "completed" },
                { "sceneNumber": 2, "imageStatus": "generating" }
            ]
        }))
    }
}

fn router(world: World) -> Router {
    Router::new()
        .route("/r2/presigned-url", post(presign))
        .route("/r2/proxy", get(proxy))
        .route("/put/{*key}", put(put_object))
        .route("/book/{id}/scene/{n}/resource", patch(patch_resource))
        .route("/book/{id}/scene/{n}/fallback-upload", post(fallback_upload))
        .route("/book/{id}/generate", post(start_generation))
        .route("/book/{id}", get(book_status))
        .with_state(world)
}

fn pipeline_for(server: &TestHttpServer) -> Pipeline {
    Pipeline::new(
        FabulaConfig::new(server.base_url().clone())
            // Keep test wall-time short; semantics are covered by the unit
            // tests under paused time.
            .with_retry(RetryPolicy::new(3, Duration::from_millis(10)))
            .with_poll(PollOptions {
                interval: Duration::from_millis(50),
                max_polls: 10,
            }),
    )
}

fn source_url() -> Url {
    Url::parse("https://media.example.com/generated/scene-1.png").unwrap()
}

#[tokio::test]
async fn upload_relocates_a_resource_end_to_end() {
    let world = World::default();
    let server = TestHttpServer::new(router(world.clone())).await;
    let pipeline = pipeline_for(&server);
    let mut events = pipeline.subscribe();

    let storage_url = pipeline
        .upload_scene_resource("book-1", 1, &source_url(), ResourceKind::Image)
        .await
        .unwrap();

    // The durable URL is the presigned target's public URL.
    assert!(storage_url.path().starts_with("/cdn/storybook/images/image_1_"));

    // The proxy was asked for the original source.
    assert_eq!(
        world.proxied.lock().unwrap().as_slice(),
        &[source_url().to_string()]
    );

    // The object arrived intact under the minted key.
    {
        let puts = world.put_bodies.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert!(puts[0].0.starts_with("storybook/images/image_1_"));
        assert_eq!(puts[0].1, png_fixture(SOURCE_BYTES));
    }

    // The backend was told exactly once.
    {
        let patches = world.patches.lock().unwrap();
        assert_eq!(patches.len(), 1);
        let (book_id, scene, body) = &patches[0];
        assert_eq!(book_id, "book-1");
        assert_eq!(*scene, 1);
        assert_eq!(body["type"], "image");
        assert_eq!(body["r2Url"], storage_url.as_str());
    }
    assert_eq!(world.fallbacks.load(Ordering::SeqCst), 0);

    // Lifecycle events reached the subscriber, progress included.
    let mut saw_started = false;
    let mut saw_progress_at_total = false;
    let mut saw_completed = false;
    while let Ok(event) = events.try_recv() {
        match event {
            Event::Upload(UploadEvent::Started { .. }) => saw_started = true,
            Event::Upload(UploadEvent::Progress { loaded, total, .. }) => {
                saw_progress_at_total |= loaded == total && total == SOURCE_BYTES as u64;
            }
            Event::Upload(UploadEvent::Completed { storage_url: url, .. }) => {
                assert_eq!(url, storage_url);
                saw_completed = true;
            }
            _ => {}
        }
    }
    assert!(saw_started && saw_progress_at_total && saw_completed);
}

#[tokio::test]
async fn client_failures_escalate_to_the_server_side_upload() {
    let world = World::default();
    world
        .remaining_put_failures
        .store(u32::MAX, Ordering::SeqCst);
    let server = TestHttpServer::new(router(world.clone())).await;
    let pipeline = pipeline_for(&server);

    let storage_url = pipeline
        .upload_scene_resource("book-1", 2, &source_url(), ResourceKind::Image)
        .await
        .unwrap();

    assert_eq!(storage_url.path(), "/cdn/fallback/2.png");
    assert_eq!(world.presigns.load(Ordering::SeqCst), 3);
    assert_eq!(world.fallbacks.load(Ordering::SeqCst), 1);
    assert!(world.patches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_fallback_endpoint_is_a_terminal_failure() {
    let world = World::default();
    world
        .remaining_put_failures
        .store(u32::MAX, Ordering::SeqCst);
    // No fallback route: the compensating call 404s.
    let router = Router::new()
        .route("/r2/presigned-url", post(presign))
        .route("/r2/proxy", get(proxy))
        .route("/put/{*key}", put(put_object))
        .with_state(world.clone());
    let server = TestHttpServer::new(router).await;
    let pipeline = pipeline_for(&server);

    let error = pipeline
        .upload_scene_resource("book-1", 2, &source_url(), ResourceKind::Image)
        .await
        .unwrap_err();

    assert!(matches!(error, UploadError::Failed { .. }));
}

#[tokio::test]
async fn generation_polls_to_completion_with_progress() {
    let world = World::default();
    let server = TestHttpServer::new(router(world.clone())).await;
    let pipeline = pipeline_for(&server);
    let mut events = pipeline.subscribe();

    pipeline
        .generate_and_wait(
            "book-1",
            GenerateOptions {
                generate_audio: false,
                ..GenerateOptions::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(world.book_polls.load(Ordering::SeqCst), 2);

    let mut saw_half = false;
    let mut saw_completed = false;
    while let Ok(event) = events.try_recv() {
        match event {
            Event::Generation(GenerationEvent::Progress {
                completed_scenes: 1,
                total_scenes: 2,
                percent,
            }) => saw_half |= percent == 50.0,
            Event::Generation(GenerationEvent::Completed) => saw_completed = true,
            _ => {}
        }
    }
    assert!(saw_half && saw_completed);
}

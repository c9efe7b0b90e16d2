use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use verity_registry::Registry;

use crate::server::{build_router, AppState};

fn test_router() -> Router {
    let registry = Arc::new(Registry::default());
    build_router(Arc::new(AppState::new(registry, "test-node")))
}

async fn get(router: &Router, path: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(router: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn fingerprints_json(tag: &str) -> Value {
    json!({
        "perceptual": format!("phash{tag}"),
        "transform": format!("dct{tag}"),
        "histogram": format!("hist{tag}"),
        "model_derived": format!("ai{tag}"),
    })
}

async fn register(router: &Router, principal: &str, handle: &str) {
    let (status, _) = post_json(
        router,
        "/identity/register",
        json!({
            "principal_id": principal,
            "handle": handle,
            "bio": "Web3 Developer",
            "avatar_ref": "profile-pic",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_and_lookup_identity() {
    let router = test_router();

    let (status, body) = post_json(
        &router,
        "/identity/register",
        json!({
            "principal_id": "addrA",
            "handle": "sachin",
            "bio": "Web3 Developer",
            "avatar_ref": "profile-pic",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["handle"], "sachin");
    assert_eq!(body["reputation_score"], 100);

    let (status, body) = get(&router, "/identity/addrA").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["principal_id"], "addrA");
    assert_eq!(body["bio"], "Web3 Developer");
}

#[tokio::test]
async fn test_register_conflicts_map_to_409() {
    let router = test_router();
    register(&router, "addrA", "sachin").await;

    let (status, body) = post_json(
        &router,
        "/identity/register",
        json!({"principal_id": "addrB", "handle": "sachin"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "handle_taken");

    let (status, body) = post_json(
        &router,
        "/identity/register",
        json!({"principal_id": "addrA", "handle": "other"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "already_registered");
}

#[tokio::test]
async fn test_empty_handle_maps_to_400() {
    let router = test_router();
    let (status, body) = post_json(
        &router,
        "/identity/register",
        json!({"principal_id": "addrA", "handle": "   "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "empty_handle");
}

#[tokio::test]
async fn test_unknown_identity_maps_to_404() {
    let router = test_router();
    let (status, body) = get(&router, "/identity/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "identity_not_found");
}

#[tokio::test]
async fn test_profile_update_and_page() {
    let router = test_router();
    register(&router, "addrA", "sachin").await;

    let (status, body) = post_json(
        &router,
        "/identity/addrA/profile",
        json!({"bio": "Building provenance tools"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bio"], "Building provenance tools");
    // avatar_ref untouched when omitted
    assert_eq!(body["avatar_ref"], "profile-pic");

    for i in 0..3 {
        let (status, _) = post_json(
            &router,
            "/content/genuine",
            json!({
                "content_id": format!("video{i}"),
                "uploader_id": "addrA",
                "fingerprints": fingerprints_json(&i.to_string()),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get(&router, "/identity/addrA/profile?offset=0&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let contents = body["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 2);
    // Newest first.
    assert_eq!(contents[0]["content_id"], "video2");
}

#[tokio::test]
async fn test_genuine_submission_rewards_uploader() {
    let router = test_router();
    register(&router, "addrA", "sachin").await;

    let (status, body) = post_json(
        &router,
        "/content/genuine",
        json!({
            "content_id": "video123",
            "uploader_id": "addrA",
            "fingerprints": fingerprints_json("123"),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classification"], "genuine");
    assert_eq!(body["is_permissioned_derivative"], false);
    assert_eq!(body["original_owner_id"], "addrA");

    let (status, body) = get(&router, "/identity/addrA/reputation").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reputation_score"], 105);
}

#[tokio::test]
async fn test_invalid_fingerprints_map_to_400() {
    let router = test_router();
    register(&router, "addrA", "sachin").await;

    let mut prints = fingerprints_json("123");
    prints["histogram"] = json!("");
    let (status, body) = post_json(
        &router,
        "/content/genuine",
        json!({"content_id": "video123", "uploader_id": "addrA", "fingerprints": prints}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_fingerprints");
}

#[tokio::test]
async fn test_deepfake_report_penalizes_matched_uploader() {
    let router = test_router();
    register(&router, "addrA", "sachin").await;
    register(&router, "addrB", "rahul").await;

    let (status, _) = post_json(
        &router,
        "/content/genuine",
        json!({
            "content_id": "video123",
            "uploader_id": "addrA",
            "fingerprints": fingerprints_json("123"),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        &router,
        "/content/deepfake",
        json!({
            "content_id": "fake456",
            "reporter_id": "addrB",
            "fingerprints": fingerprints_json("123"),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classification"], "deepfake");

    let (_, body) = get(&router, "/identity/addrA/reputation").await;
    assert_eq!(body["reputation_score"], 85);
}

#[tokio::test]
async fn test_reuse_chain_over_http() {
    let router = test_router();
    register(&router, "addrA", "sachin").await;
    register(&router, "addrB", "rahul").await;

    let (status, _) = post_json(
        &router,
        "/content/genuine",
        json!({
            "content_id": "video789",
            "uploader_id": "addrA",
            "fingerprints": fingerprints_json("789"),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        &router,
        "/content/video789/reuse/request",
        json!({"requester_id": "addrB"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");

    let (status, body) = post_json(
        &router,
        "/content/video789/reuse/grant",
        json!({
            "requester_id": "addrB",
            "new_content_id": "remix789",
            "caller_id": "addrA",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content_id"], "remix789");
    assert_eq!(body["uploader_id"], "addrB");
    assert_eq!(body["original_owner_id"], "addrA");
    assert_eq!(body["is_permissioned_derivative"], true);
    assert_eq!(body["classification"], "genuine");

    let (status, body) = get(&router, "/content/remix789").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fingerprints"]["perceptual"], "phash789");

    // Granting earns the owner the reuse reward on top of the upload reward.
    let (_, body) = get(&router, "/identity/addrA/reputation").await;
    assert_eq!(body["reputation_score"], 115);
}

#[tokio::test]
async fn test_non_owner_grant_maps_to_403() {
    let router = test_router();
    register(&router, "addrA", "sachin").await;
    register(&router, "addrB", "rahul").await;

    let (status, _) = post_json(
        &router,
        "/content/genuine",
        json!({
            "content_id": "video789",
            "uploader_id": "addrA",
            "fingerprints": fingerprints_json("789"),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(
        &router,
        "/content/video789/reuse/request",
        json!({"requester_id": "addrB"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        &router,
        "/content/video789/reuse/grant",
        json!({
            "requester_id": "addrB",
            "new_content_id": "remix789",
            "caller_id": "addrB",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "not_authorized");

    // The derivative must not exist after a refused grant.
    let (status, _) = get(&router, "/content/remix789").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reject_resolves_request() {
    let router = test_router();
    register(&router, "addrA", "sachin").await;
    register(&router, "addrB", "rahul").await;

    let (status, _) = post_json(
        &router,
        "/content/genuine",
        json!({
            "content_id": "video789",
            "uploader_id": "addrA",
            "fingerprints": fingerprints_json("789"),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(
        &router,
        "/content/video789/reuse/request",
        json!({"requester_id": "addrB"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        &router,
        "/content/video789/reuse/reject",
        json!({"requester_id": "addrB", "caller_id": "addrA"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");
}

#[tokio::test]
async fn test_event_feed_replays_in_order() {
    let router = test_router();
    register(&router, "addrA", "sachin").await;
    register(&router, "addrB", "rahul").await;

    let (status, _) = post_json(
        &router,
        "/content/genuine",
        json!({
            "content_id": "video789",
            "uploader_id": "addrA",
            "fingerprints": fingerprints_json("789"),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&router, "/events").await;
    assert_eq!(status, StatusCode::OK);
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["seq"], 1);
    assert_eq!(events[0]["kind"], "identity_registered");
    assert_eq!(events[2]["kind"], "genuine_content_recorded");

    let (_, body) = get(&router, "/events?since=2").await;
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["seq"], 3);
}

#[tokio::test]
async fn test_health_and_version() {
    let router = test_router();
    register(&router, "addrA", "sachin").await;

    let (status, body) = get(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["node_id"], "test-node");
    assert_eq!(body["identities"], 1);

    let (status, body) = get(&router, "/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

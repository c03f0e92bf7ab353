use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use whispr_api::{AppStateInner, router};
use whispr_gateway::Dispatcher;
use whispr_store::WhisprBuilder;
use whispr_store::persist::MemorySnapshotStore;
use whispr_store::random::ScriptedRandom;

async fn app() -> Router {
    let dispatcher = Dispatcher::new();
    let whispr = WhisprBuilder::new(MemorySnapshotStore::new())
        .random(ScriptedRandom::new().with_chances([true]))
        .notifier(dispatcher.clone())
        .open()
        .await
        .unwrap();
    router(AppStateInner::new(whispr, dispatcher))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    caller: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder.header("x-whispr-id", caller);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_confession(app: &Router, author: &str, content: &str) -> Value {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/confessions",
        None,
        Some(json!({
            "content": content,
            "authorId": author,
            "authorAlias": "Client Alias",
            "category": "rant",
            "isAfterDark": false,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["name"], "whispr");
}

#[tokio::test]
async fn profile_lifecycle() {
    let app = app().await;
    let (status, profile) = call(&app, Method::POST, "/api/profiles", None, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(profile["karma"], 10);
    assert_eq!(profile["karmaLevel"], "low");
    let id = profile["id"].as_str().unwrap().to_string();

    let (status, updated) = call(
        &app,
        Method::PATCH,
        &format!("/api/profiles/{id}"),
        None,
        Some(json!({"alias": "Quiet Comet", "avatarIndex": 99})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["alias"], "Quiet Comet");
    assert_eq!(updated["avatarIndex"], 11);

    let (status, regenerated) =
        call(&app, Method::POST, &format!("/api/profiles/{id}/regenerate"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(regenerated["alias"], "Quiet Comet");

    let (status, _) = call(&app, Method::GET, "/api/profiles/nobody", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn confession_uses_profile_and_grants_karma() {
    let app = app().await;
    let (_, profile) = call(&app, Method::POST, "/api/profiles", None, None).await;
    let id = profile["id"].as_str().unwrap();

    let confession = create_confession(&app, id, "the library at 2am is a vibe").await;
    assert_eq!(confession["authorAlias"], profile["alias"]);
    assert_eq!(confession["commentCount"], 0);
    assert_eq!(confession["reactions"]["fire"], json!([]));

    let (_, after) = call(&app, Method::GET, &format!("/api/profiles/{id}"), None, None).await;
    assert_eq!(after["karma"], 15);
    assert_eq!(after["confessionsCount"], 1);
}

#[tokio::test]
async fn invalid_confession_is_bad_request() {
    let app = app().await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/confessions",
        None,
        Some(json!({"content": "a", "authorId": "u1", "category": "rant"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("short"));
}

#[tokio::test]
async fn delete_confession_requires_the_author() {
    let app = app().await;
    let confession = create_confession(&app, "author-1", "delete me later").await;
    let uri = format!("/api/confessions/{}", confession["id"].as_str().unwrap());

    let (status, _) = call(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(&app, Method::DELETE, &uri, Some("intruder"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::DELETE, &format!("{uri}?userId=%20"), Some("  "), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    // Blank header falls back to the query parameter
    let (status, _) = call(&app, Method::DELETE, &format!("{uri}?userId=author-1"), Some(" "), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = call(&app, Method::GET, "/api/confessions", None, None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn reaction_route_reports_added_flag() {
    let app = app().await;
    let confession = create_confession(&app, "author-1", "react if you agree").await;
    let uri = format!("/api/confessions/{}/reactions", confession["id"].as_str().unwrap());

    let (status, body) = call(
        &app,
        Method::POST,
        &uri,
        None,
        Some(json!({"userId": "reader", "reactionType": "laugh"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], true);
    assert_eq!(body["confession"]["reactions"]["laugh"], json!(["reader"]));

    let (status, own) = call(
        &app,
        Method::POST,
        &uri,
        None,
        Some(json!({"userId": "author-1", "reactionType": "fire"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own["added"], false);
    assert_eq!(own["confession"]["reactions"]["fire"], json!([]));

    let (status, _) = call(
        &app,
        Method::POST,
        &uri,
        None,
        Some(json!({"userId": "reader", "reactionType": "yawn"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn crushes_are_private_to_the_sender() {
    let app = app().await;
    let (status, crush) = call(
        &app,
        Method::POST,
        "/api/crushes",
        None,
        Some(json!({"fromUserId": "u1", "toAlias": "Velvet Storm", "message": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(crush["isMutual"], true);
    assert_eq!(crush["isRevealed"], false);

    let (status, _) = call(&app, Method::GET, "/api/crushes", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, others) = call(&app, Method::GET, "/api/crushes", Some("u2"), None).await;
    assert_eq!(others, json!([]));
    let (_, mine) = call(&app, Method::GET, "/api/crushes", Some("u1"), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let reveal = format!("/api/crushes/{}/reveal", crush["id"].as_str().unwrap());
    let (status, _) = call(&app, Method::POST, &reveal, Some("u2"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, revealed) = call(&app, Method::POST, &reveal, Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(revealed["isRevealed"], true);

    let (status, duplicate) = call(
        &app,
        Method::POST,
        "/api/crushes",
        None,
        Some(json!({"fromUserId": "u1", "toAlias": "velvet storm"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(duplicate["message"].is_string());
}

#[tokio::test]
async fn market_listing_and_sold_toggle() {
    let app = app().await;
    let (status, item) = call(
        &app,
        Method::POST,
        "/api/market",
        None,
        Some(json!({
            "title": "TI-84 Plus",
            "description": "works",
            "price": 34.999,
            "category": "electronics",
            "condition": "good",
            "sellerId": "seller",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["price"], 35.0);
    let id = item["id"].as_str().unwrap();

    let toggle = format!("/api/market/{id}/toggle-sold");
    let (status, _) = call(&app, Method::POST, &toggle, None, Some(json!({"sellerId": "buyer"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, sold) = call(&app, Method::POST, &toggle, None, Some(json!({"sellerId": "seller"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sold["isSold"], true);

    let (_, filtered) = call(&app, Method::GET, "/api/market?category=textbooks", None, None).await;
    assert_eq!(filtered, json!([]));
    let (_, all) = call(&app, Method::GET, "/api/market?limit=0", None, None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn comments_track_parent_count() {
    let app = app().await;
    let confession = create_confession(&app, "author-1", "what should I major in").await;
    let cid = confession["id"].as_str().unwrap();
    let uri = format!("/api/confessions/{cid}/comments");

    let (status, comment) = call(
        &app,
        Method::POST,
        &uri,
        None,
        Some(json!({"content": "philosophy", "authorId": "c1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["parentType"], "confession");
    assert_eq!(comment["likes"], 0);

    let (_, listed) = call(&app, Method::GET, &uri, None, None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let (_, feed) = call(&app, Method::GET, "/api/confessions", None, None).await;
    assert_eq!(feed[0]["commentCount"], 1);

    let delete = format!("/api/comments/{}", comment["id"].as_str().unwrap());
    let (status, _) = call(&app, Method::DELETE, &delete, None, Some(json!({"authorId": "c2"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::DELETE, &delete, None, Some(json!({"authorId": "c1"}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, feed) = call(&app, Method::GET, "/api/confessions", None, None).await;
    assert_eq!(feed[0]["commentCount"], 0);
}

#[tokio::test]
async fn comment_on_missing_parent_is_not_found() {
    let app = app().await;
    let uri = format!("/api/market/{}/comments", uuid_like());
    let (status, _) = call(
        &app,
        Method::POST,
        &uri,
        None,
        Some(json!({"content": "still for sale?", "authorId": "c1"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn uuid_like() -> &'static str {
    "6f1c2a8e-4b7d-4e55-9c1a-2f3b4c5d6e7f"
}

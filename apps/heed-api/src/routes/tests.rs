use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use heed_domain::feed::FeedConfig;
use heed_domain::ingestion::IngestionConfig;
use heed_media::ImageTranscoder;
use heed_s3::MemoryObjectStore;
use heed_store::MemoryPostRepository;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use serde_json::Value;
use std::io::Cursor;
use std::time::Duration;
use tower::ServiceExt;

use super::create_router;
use crate::auth::tests::{token, token_with, SECRET};
use crate::auth::JwtAuthGate;
use crate::AppState;

const BOUNDARY: &str = "heed-test-boundary";

struct TestApp {
    router: Router,
    objects: MemoryObjectStore,
    posts: MemoryPostRepository,
}

fn test_app() -> TestApp {
    let objects = MemoryObjectStore::new("http://localhost:5000/media");
    let posts = MemoryPostRepository::new();
    let state = AppState::new(
        ImageTranscoder::default(),
        objects.clone().into(),
        posts.clone().into(),
        JwtAuthGate::new(SECRET),
        IngestionConfig {
            retry_backoff: Duration::from_millis(1),
            ..Default::default()
        },
        FeedConfig::default(),
    );

    TestApp {
        router: create_router(state),
        objects,
        posts,
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 90]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .unwrap();
    buffer.into_inner()
}

fn form(fields: &[(&str, &str)], images: &[Vec<u8>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (i, data) in images.iter().enumerate() {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"images\"; filename=\"photo{i}.png\"\r\n\
                 Content-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn create_request(
    bearer: Option<&str>,
    fields: &[(&str, &str)],
    images: &[Vec<u8>],
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/posts")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
    }
    builder.body(Body::from(form(fields, images))).unwrap()
}

fn like_request(post_id: &str, bearer: &str) -> Request<Body> {
    Request::builder()
        .method(Method::PUT)
        .uri(format!("/api/posts/{post_id}/like"))
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .body(Body::empty())
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn create_post(app: &TestApp, owner: &str, fields: &[(&str, &str)]) -> Value {
    let (status, body) = send(
        &app.router,
        create_request(Some(&token(owner, "general")), fields, &[png(64, 48)]),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn test_business_post_with_price_is_created() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        create_request(
            Some(&token("shop-1", "business")),
            &[("title", "Lamp"), ("description", "Brass lamp"), ("price", "25")],
            &[png(800, 600)],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["price"], 25.0);
    assert_eq!(body["images"].as_array().unwrap().len(), 1);
    assert_eq!(body["likes"], 0);
    assert_eq!(body["allowComments"], true);
    assert_eq!(body["allowLikes"], true);
    assert_eq!(body["owner"]["id"], "shop-1");
    assert_eq!(body["owner"]["role"], "business");

    let high = body["images"][0]["high"].as_str().unwrap();
    let low = body["images"][0]["low"].as_str().unwrap();
    assert!(high.starts_with("http://localhost:5000/media/posts/shop-1/"));
    assert!(high.ends_with("-high.jpg"));
    assert!(low.ends_with("-low.jpg"));
    assert_eq!(app.objects.len(), 2);
    assert_eq!(app.posts.len(), 1);
}

#[tokio::test]
async fn test_price_from_general_user_is_rejected_without_side_effects() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        create_request(
            Some(&token("u-1", "general")),
            &[("title", "Chair"), ("description", "Wood chair"), ("price", "50")],
            &[png(64, 64), png(64, 64)],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only business accounts can add a price");
    assert!(app.objects.is_empty());
    assert!(app.posts.is_empty());
}

#[tokio::test]
async fn test_five_images_are_rejected() {
    let app = test_app();
    let images: Vec<Vec<u8>> = (0..5).map(|_| png(16, 16)).collect();

    let (status, body) = send(
        &app.router,
        create_request(
            Some(&token("u-1", "general")),
            &[("title", "Chair"), ("description", "Wood chair")],
            &images,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("1 to 4 images"));
    assert!(app.objects.is_empty());
}

#[tokio::test]
async fn test_missing_fields_and_images_are_rejected() {
    let app = test_app();
    let bearer = token("u-1", "general");

    let (status, body) = send(
        &app.router,
        create_request(Some(&bearer), &[("description", "No title")], &[png(8, 8)]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");

    let (status, _) = send(
        &app.router,
        create_request(Some(&bearer), &[("title", "T"), ("description", "D")], &[]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        create_request(
            Some(&bearer),
            &[("title", "T"), ("description", "D"), ("allowLikes", "sometimes")],
            &[png(8, 8)],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_corrupt_image_is_a_generic_server_error() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        create_request(
            Some(&token("u-1", "general")),
            &[("title", "Chair"), ("description", "Wood chair")],
            &[b"not an image at all".to_vec()],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert!(app.posts.is_empty());
}

#[tokio::test]
async fn test_create_requires_valid_token() {
    let app = test_app();
    let fields = [("title", "Chair"), ("description", "Wood chair")];

    let (status, _) = send(&app.router, create_request(None, &fields, &[png(8, 8)])).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = token_with(SECRET, "u-1", "general", -3600);
    let (status, _) = send(
        &app.router,
        create_request(Some(&expired), &fields, &[png(8, 8)]),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = token_with("not-the-secret", "u-1", "general", 3600);
    let (status, body) = send(
        &app.router,
        create_request(Some(&forged), &fields, &[png(8, 8)]),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().starts_with("Unauthorized"));
    assert!(app.posts.is_empty());
}

#[tokio::test]
async fn test_feed_pages_newest_first() {
    let app = test_app();
    for title in ["First", "Second", "Third"] {
        create_post(&app, "u-1", &[("title", title), ("description", "d")]).await;
    }

    let (status, page1) = send(&app.router, get_request("/api/posts?page=1&limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = page1
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Third", "Second"]);

    let (_, page2) = send(&app.router, get_request("/api/posts?page=2&limit=2")).await;
    assert_eq!(page2.as_array().unwrap().len(), 1);
    assert_eq!(page2[0]["title"], "First");

    let (_, all) = send(&app.router, get_request("/api/posts")).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_invalid_pagination_is_rejected() {
    let app = test_app();

    let (status, _) = send(&app.router, get_request("/api/posts?page=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app.router, get_request("/api/posts?limit=many")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_get_post_by_id() {
    let app = test_app();
    let created = create_post(&app, "u-1", &[("title", "Desk"), ("description", "Oak")]).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&app.router, get_request(&format!("/api/posts/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Desk");

    let (status, _) = send(&app.router, get_request("/api/posts/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        get_request("/api/posts/01912d68-783e-7a3c-9f6f-2f0d8c1c7b11"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_mine_returns_only_callers_posts() {
    let app = test_app();
    create_post(&app, "alice", &[("title", "A1"), ("description", "d")]).await;
    create_post(&app, "bob", &[("title", "B1"), ("description", "d")]).await;
    create_post(&app, "alice", &[("title", "A2"), ("description", "d")]).await;

    let request = Request::builder()
        .uri("/api/posts/mine")
        .header(header::AUTHORIZATION, format!("Bearer {}", token("alice", "general")))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["A2", "A1"]);

    let (status, _) = send(&app.router, get_request("/api/posts/mine")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_like_then_unlike() {
    let app = test_app();
    let created = create_post(&app, "owner", &[("title", "Chair"), ("description", "d")]).await;
    let id = created["id"].as_str().unwrap();
    let bearer = token("fan", "general");

    let (status, liked) = send(&app.router, like_request(id, &bearer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(liked["liked"], true);
    assert_eq!(liked["likes"], 1);
    assert_eq!(liked["message"], "Post liked");
    assert_eq!(liked["postId"], id);

    let (_, post) = send(&app.router, get_request(&format!("/api/posts/{id}"))).await;
    assert_eq!(post["likedBy"], serde_json::json!(["fan"]));

    let (status, unliked) = send(&app.router, like_request(id, &bearer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unliked["liked"], false);
    assert_eq!(unliked["likes"], 0);
    assert_eq!(unliked["message"], "Post unliked");
}

#[tokio::test]
async fn test_like_on_post_with_likes_disabled_is_forbidden() {
    let app = test_app();
    let created = create_post(
        &app,
        "owner",
        &[("title", "Chair"), ("description", "d"), ("allowLikes", "false")],
    )
    .await;
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["allowLikes"], false);

    let (status, body) = send(&app.router, like_request(id, &token("fan", "general"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Likes are disabled for this post");

    let (_, post) = send(&app.router, get_request(&format!("/api/posts/{id}"))).await;
    assert_eq!(post["likes"], 0);
    assert_eq!(post["likedBy"], serde_json::json!([]));
}

#[tokio::test]
async fn test_like_errors() {
    let app = test_app();
    let bearer = token("fan", "general");

    let (status, _) = send(
        &app.router,
        like_request("01912d68-783e-7a3c-9f6f-2f0d8c1c7b11", &bearer),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/posts/01912d68-783e-7a3c-9f6f-2f0d8c1c7b11/like")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_likes_from_two_users_are_both_kept() {
    let app = test_app();
    let created = create_post(&app, "owner", &[("title", "Chair"), ("description", "d")]).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (first, second) = tokio::join!(
        send(&app.router, like_request(&id, &token("user-a", "general"))),
        send(&app.router, like_request(&id, &token("user-b", "general"))),
    );
    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);

    let (_, post) = send(&app.router, get_request(&format!("/api/posts/{id}"))).await;
    assert_eq!(post["likes"], 2);
    let mut liked_by: Vec<&str> = post["likedBy"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u.as_str().unwrap())
        .collect();
    liked_by.sort_unstable();
    assert_eq!(liked_by, vec!["user-a", "user-b"]);
}

#[tokio::test]
async fn test_memory_images_are_served() {
    let app = test_app();
    let created = create_post(&app, "u-1", &[("title", "Chair"), ("description", "d")]).await;
    let low = created["images"][0]["low"].as_str().unwrap();
    let path = low.trim_start_matches("http://localhost:5000");

    let response = app.router.clone().oneshot(get_request(path)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");

    let response = app
        .router
        .clone()
        .oneshot(get_request("/media/posts/nobody/missing.jpg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = test_app();

    let response = app.router.clone().oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, doc) = send(&app.router, get_request("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/posts/{id}/like"].is_object());
}

// HTTP-level tests over the in-memory state.
//
// Each test mounts the full route table with `actix_web::test` and talks to
// it as a client would, without binding a socket.

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test};
use serde_json::{Value, json};

use api_server::config::UploadConfig;
use api_server::configure_app;
use api_server::state::AppState;

async fn app() -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
    let upload = UploadConfig {
        dir: std::env::temp_dir().join(format!("sapien-test-{}", uuid::Uuid::new_v4())),
        ..Default::default()
    };
    test::init_service(App::new().configure(configure_app(AppState::in_memory(upload)))).await
}

async fn send<S>(app: &S, req: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

fn prompt_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Reviews code for bugs",
        "content": "Review the following code",
        "category": "Development",
        "resultType": "text",
        "tags": "Code, Review",
        "worksBestWith": ["GPT-4", "Claude-3"]
    })
}

fn user_body(username: &str, email: &str) -> Value {
    json!({
        "name": "Ada Lovelace",
        "username": username,
        "email": email,
        "password": "secret1",
        "avatar": "https://example.com/ada.png",
        "bio": "First programmer"
    })
}

async fn create_prompt<S>(app: &S, title: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/prompts")
            .set_json(prompt_body(title)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_user<S>(app: &S, username: &str, email: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/users")
            .set_json(user_body(username, email)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[actix_rt::test]
async fn health_reports_disconnected_without_database() {
    let app = app().await;
    let (status, body) = send(&app, test::TestRequest::get().uri("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Hello from Sapien!");
    assert_eq!(body["database"], "disconnected");
}

#[actix_rt::test]
async fn create_prompt_normalizes_lists() {
    let app = app().await;
    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/prompts")
            .set_json(prompt_body("Code Reviewer")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["tags"], json!(["code", "review"]));
    assert_eq!(data["worksBestWith"], json!(["GPT-4", "Claude-3"]));
    assert_eq!(data["version"], 1);
    assert_eq!(data["versionString"], "v1");
    assert_eq!(data["createdBy"], "system");
    assert_eq!(data["isActive"], true);
}

#[actix_rt::test]
async fn create_prompt_lists_every_missing_field() {
    let app = app().await;
    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/prompts")
            .set_json(json!({ "title": "Only a title" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation error");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(
        fields,
        vec!["category", "content", "description", "resultType"]
    );
}

#[actix_rt::test]
async fn get_prompt_counts_views() {
    let app = app().await;
    let id = create_prompt(&app, "Viewed").await;

    for expected in 1..=2 {
        let (status, body) = send(
            &app,
            test::TestRequest::get().uri(&format!("/api/prompts/{id}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["views"], expected);
    }
}

#[actix_rt::test]
async fn malformed_and_unknown_ids() {
    let app = app().await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/prompts/not-an-id")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid Prompt ID");

    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/prompts/{missing}")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Prompt not found");
}

#[actix_rt::test]
async fn update_bumps_version_on_content_change() {
    let app = app().await;
    let id = create_prompt(&app, "Versioned").await;

    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/prompts/{id}"))
            .set_json(json!({ "content": "A better prompt" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], 2);
    assert_eq!(body["data"]["updatedBy"], "system");

    let (_, body) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/prompts/{id}/versions")),
    )
    .await;
    assert_eq!(
        body["data"],
        json!({ "currentVersion": 2, "versionString": "v2" })
    );
}

#[actix_rt::test]
async fn like_and_use_return_counters() {
    let app = app().await;
    let id = create_prompt(&app, "Counted").await;

    let (_, body) = send(
        &app,
        test::TestRequest::patch().uri(&format!("/api/prompts/{id}/like")),
    )
    .await;
    assert_eq!(body["data"], json!({ "likes": 1 }));

    let (_, body) = send(
        &app,
        test::TestRequest::patch().uri(&format!("/api/prompts/{id}/use")),
    )
    .await;
    assert_eq!(body["data"], json!({ "uses": 1 }));
}

#[actix_rt::test]
async fn soft_then_permanent_delete() {
    let app = app().await;
    let id = create_prompt(&app, "Doomed").await;

    let (status, body) = send(
        &app,
        test::TestRequest::delete().uri(&format!("/api/prompts/{id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], false);

    let (status, body) = send(
        &app,
        test::TestRequest::delete().uri(&format!("/api/prompts/{id}?permanent=true")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("data").is_none());

    let (status, _) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/prompts/{id}/versions")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn list_paginates_and_rejects_bad_paging() {
    let app = app().await;
    for i in 0..3 {
        create_prompt(&app, &format!("Prompt {i}")).await;
    }

    let (status, body) = send(
        &app,
        test::TestRequest::get().uri("/api/prompts?page=1&limit=2&sortBy=title&sortOrder=asc"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["title"], "Prompt 0");
    assert_eq!(
        body["pagination"],
        json!({ "page": 1, "limit": 2, "total": 3, "pages": 2 })
    );

    let (status, _) = send(&app, test::TestRequest::get().uri("/api/prompts?page=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        test::TestRequest::get().uri("/api/prompts?page=9223372036854775807&limit=100"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "page");

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/prompts?sortBy=bogus")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn discovery_routes_are_not_shadowed_by_id() {
    let app = app().await;
    create_prompt(&app, "Code helper").await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/prompts/categories")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(["Development"]));
    assert_eq!(body["count"], 1);

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/prompts/tag/CODE")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/prompts/search?q=code")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, test::TestRequest::get().uri("/api/prompts/search?q=rev")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/prompts/search")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Search query is required");
}

#[actix_rt::test]
async fn users_conflict_and_hide_password() {
    let app = app().await;
    let id = create_user(&app, "ada", "ada@example.com").await;

    let (status, body) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/users/{id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("passwordHash").is_none());

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/users")
            .set_json(user_body("ada", "other@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        test::TestRequest::get().uri("/api/users/username/ada"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ada@example.com");
}

#[actix_rt::test]
async fn login_checks_password() {
    let app = app().await;
    create_user(&app, "ada", "ada@example.com").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/api/login").set_json(json!({
            "email": "ada@example.com",
            "loginMode": "email",
            "password": "secret1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "ada");

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/api/login").set_json(json!({
            "email": "ada@example.com",
            "loginMode": "email",
            "password": "wrong"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/api/login").set_json(json!({
            "email": "ada@example.com",
            "loginMode": "github"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "GitHub user not found");
}

#[actix_rt::test]
async fn comment_lifecycle() {
    let app = app().await;
    let user_id = create_user(&app, "ada", "ada@example.com").await;
    let prompt_id = create_prompt(&app, "Discussed").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/api/comments").set_json(json!({
            "user": user_id,
            "prompt": prompt_id,
            "content": "  Great prompt  "
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["content"], "Great prompt");
    assert_eq!(body["data"]["user"]["username"], "ada");
    let comment_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/comments/prompt/{prompt_id}")),
    )
    .await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["user"]["name"], "Ada Lovelace");

    let (status, body) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/comments/{comment_id}"))
            .set_json(json!({ "content": "Edited" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isEdited"], true);

    let (_, body) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/comments/prompt/{prompt_id}/stats")),
    )
    .await;
    assert_eq!(body["data"], json!({ "total": 1, "recent": 1 }));

    let (status, body) = send(
        &app,
        test::TestRequest::delete().uri(&format!("/api/comments/{comment_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], comment_id);
}

#[actix_rt::test]
async fn comment_on_missing_prompt_is_not_found() {
    let app = app().await;
    let user_id = create_user(&app, "ada", "ada@example.com").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/api/comments").set_json(json!({
            "user": user_id,
            "prompt": uuid::Uuid::new_v4(),
            "content": "hello"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Prompt not found");
}

#[actix_rt::test]
async fn comment_longer_than_1000_chars_is_rejected() {
    let app = app().await;
    let user_id = create_user(&app, "ada", "ada@example.com").await;
    let prompt_id = create_prompt(&app, "Discussed").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/api/comments").set_json(json!({
            "user": user_id,
            "prompt": prompt_id,
            "content": "x".repeat(1001)
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation error");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|detail| detail["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["content"]);

    let (_, body) = send(
        &app,
        test::TestRequest::get().uri(&format!("/api/comments/prompt/{prompt_id}")),
    )
    .await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[actix_rt::test]
async fn home_counts_active_prompts() {
    let app = app().await;
    create_user(&app, "ada", "ada@example.com").await;
    create_prompt(&app, "Kept").await;
    let gone = create_prompt(&app, "Gone").await;
    send(
        &app,
        test::TestRequest::delete().uri(&format!("/api/prompts/{gone}")),
    )
    .await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/home")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({ "creators": 1, "prompts": 1, "comments": 0 })
    );
}

#[actix_rt::test]
async fn multipart_create_stores_cover_image() {
    let app = app().await;
    let boundary = "sapienboundary";
    let mut payload = String::new();
    for (name, value) in [
        ("title", "Painter"),
        ("description", "Paints things"),
        ("content", "Paint a cat"),
        ("category", "Art"),
        ("resultType", "image"),
        ("tags", "art, cats"),
    ] {
        payload.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    payload.push_str(&format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"coverImage\"; filename=\"cat.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{boundary}--\r\n"
    ));

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/prompts")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            ))
            .set_payload(payload),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let cover = body["data"]["coverImage"].as_str().unwrap();
    assert!(cover.starts_with("/uploads/cover-images/"));
    assert!(cover.ends_with(".png"));
    assert_eq!(body["data"]["tags"], json!(["art", "cats"]));
}

#[actix_rt::test]
async fn multipart_rejects_non_images() {
    let app = app().await;
    let boundary = "sapienboundary";
    let payload = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"coverImage\"; filename=\"doc.pdf\"\r\nContent-Type: application/pdf\r\n\r\n%PDF\r\n--{boundary}--\r\n"
    );

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/prompts")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            ))
            .set_payload(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Only image files (JPEG, PNG, GIF, WebP) are allowed"
    );
}

//! Integration tests for the site backend.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::{multipart, Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::auth::TokenKeys;
use crate::config::{AdminCredentials, Config, Environment};
use crate::db::{open_store, Filter, Store};
use crate::mail::MemoryMailer;
use crate::models::User;
use crate::uploads::{UploadStore, MAX_RESUME_BYTES};
use crate::{create_router, AppState};

const JWT_SECRET: &str = "test-jwt-secret";
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "cloudbooking2024";
const INDEX_HTML: &str = "<!doctype html><div id=\"root\"></div>";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    store: Arc<Store>,
    mailer: Arc<MemoryMailer>,
    upload_dir: PathBuf,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::build(MemoryMailer::new(), true).await
    }

    async fn build(mailer: MemoryMailer, with_admin: bool) -> Self {
        Self::build_with_env(mailer, with_admin, Environment::Development).await
    }

    async fn build_with_env(mailer: MemoryMailer, with_admin: bool, environment: Environment) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let static_dir = temp_dir.path().join("dist");
        std::fs::create_dir_all(static_dir.join("assets")).expect("Failed to create static dir");
        std::fs::write(static_dir.join("index.html"), INDEX_HTML).unwrap();
        std::fs::write(static_dir.join("assets/app.js"), "console.log('app');").unwrap();
        let database_url = format!("sqlite://{}", temp_dir.path().join("test.sqlite").display());
        let upload_dir = temp_dir.path().join("uploads");

        let pool = open_store(&database_url).await.expect("Failed to open store");
        let store = Arc::new(Store::new(pool));
        let uploads = Arc::new(UploadStore::open(&upload_dir).await.expect("Failed to open uploads"));
        let mailer = Arc::new(mailer);

        let config = Config {
            database_url,
            jwt_secret: JWT_SECRET.to_string(),
            token_ttl: Duration::from_secs(86_400),
            admin: with_admin.then(|| AdminCredentials {
                username: ADMIN_USERNAME.to_string(),
                password: ADMIN_PASSWORD.to_string(),
            }),
            smtp: None,
            admin_email: Some("owner@example.com".to_string()),
            cors_origins: vec!["http://localhost:3000".to_string()],
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            environment,
            static_dir,
            upload_dir: upload_dir.clone(),
            log_level: "warn".to_string(),
        };

        let state = AppState {
            store: store.clone(),
            tokens: Arc::new(TokenKeys::new(JWT_SECRET, config.token_ttl)),
            mailer: mailer.clone(),
            uploads,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            store,
            mailer,
            upload_dir,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn login(&self) -> String {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({"username": ADMIN_USERNAME, "password": ADMIN_PASSWORD}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn create(&self, token: &str, path: &str, body: Value) -> Value {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201, "create {}", path);
        resp.json().await.unwrap()
    }

    async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }
}

fn leftover_uploads(fixture: &TestFixture) -> usize {
    std::fs::read_dir(&fixture.upload_dir).unwrap().count()
}

fn contact_body() -> Value {
    json!({
        "firstName": "Grace",
        "lastName": "Hopper",
        "email": "grace@example.com",
        "phone": "555-0100",
        "subject": "Demo",
        "message": "Hi"
    })
}

fn pdf_part(name: &str) -> multipart::Part {
    multipart::Part::bytes(b"%PDF-1.4 resume".to_vec())
        .file_name(name.to_string())
        .mime_str("application/pdf")
        .unwrap()
}

fn application_form(resume: multipart::Part) -> multipart::Form {
    multipart::Form::new()
        .text("name", "Ada Lovelace")
        .text("email", "ada@example.com")
        .text("phone", "555-0100")
        .text("position", "Backend Engineer")
        .text("coverLetter", "I like engines.")
        .part("resume", resume)
}

// ============================================================================
// Operational routes
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture.client.get(fixture.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");

    let resp = fixture.client.get(fixture.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.text().await.unwrap(),
        "Cloud Booking Solutions API is running"
    );
}

#[tokio::test]
async fn test_unknown_route() {
    let fixture = TestFixture::new().await;

    for path in ["/api/nope", "/nope"] {
        let (status, body) = fixture.get_json(path).await;
        assert_eq!(status, 404, "{}", path);
        assert_eq!(body["message"], "Route not found");
        assert_eq!(body["code"], "NOT_FOUND");
    }
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_login() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/login"))
        .json(&json!({"username": ADMIN_USERNAME, "password": ADMIN_PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Login successful");

    let claims = TokenKeys::new(JWT_SECRET, Duration::from_secs(60))
        .verify(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub, "admin");
    assert_eq!(claims.username, ADMIN_USERNAME);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let fixture = TestFixture::new().await;

    for body in [
        json!({"username": ADMIN_USERNAME, "password": "wrong"}),
        json!({"username": "root", "password": ADMIN_PASSWORD}),
        json!({}),
    ] {
        let resp = fixture
            .client
            .post(fixture.url("/api/auth/login"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "Invalid credentials");
        assert!(body.get("token").is_none());
    }
}

#[tokio::test]
async fn test_login_without_configured_admin() {
    let fixture = TestFixture::build(MemoryMailer::new(), false).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/login"))
        .json(&json!({"username": ADMIN_USERNAME, "password": ADMIN_PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_gate_rejections() {
    let fixture = TestFixture::new().await;
    let body = json!({"title": "T", "description": "D", "image": "/s.png"});

    // No credential
    let resp = fixture
        .client
        .post(fixture.url("/api/service"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["message"], "No token, authorization denied");
    assert_eq!(err["code"], "UNAUTHORIZED");

    // Expired credential
    let now = Utc::now().timestamp();
    let expired = TokenKeys::new(JWT_SECRET, Duration::from_secs(60))
        .issue_with_window("admin", "admin", now - 7200, now - 3600)
        .unwrap();
    let resp = fixture
        .client
        .post(fixture.url("/api/service"))
        .bearer_auth(&expired)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["message"], "Token has expired");

    // Signed with another secret
    let forged = TokenKeys::new("other-secret", Duration::from_secs(60))
        .issue("admin", "admin")
        .unwrap();
    let resp = fixture
        .client
        .post(fixture.url("/api/service"))
        .bearer_auth(&forged)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["message"], "Token is not valid");

    // Nothing was written
    let (_, services) = fixture.get_json("/api/service").await;
    assert_eq!(services.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_verify_user_and_logout() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/auth/verify"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["valid"], true);
    assert_eq!(body["user"]["sub"], "admin");

    let resp = fixture
        .client
        .get(fixture.url("/api/auth/user"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["id"], "admin");
    assert_eq!(body["isAdmin"], true);

    let resp = fixture
        .client
        .get(fixture.url("/api/auth/verify"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Logged out successfully");
}

#[tokio::test]
async fn test_register() {
    let fixture = TestFixture::new().await;
    let register = |body: Value| {
        fixture
            .client
            .post(fixture.url("/api/auth/register"))
            .json(&body)
            .send()
    };

    let resp = register(json!({"username": "editor", "password": "pw123456"}))
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "User created successfully");

    for taken in ["editor", ADMIN_USERNAME] {
        let resp = register(json!({"username": taken, "password": "x"}))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "Username already exists");
    }

    let resp = register(json!({"username": "nopass"})).await.unwrap();
    assert_eq!(resp.status(), 400);

    let user: User = fixture
        .store
        .find_one(&Filter::eq("username", "editor"))
        .await
        .unwrap()
        .unwrap();
    assert!(bcrypt::verify("pw123456", &user.password_hash).unwrap());

    // A credential for the stored account resolves to its profile
    let token = TokenKeys::new(JWT_SECRET, Duration::from_secs(60))
        .issue(&user.id, &user.username)
        .unwrap();
    let resp = fixture
        .client
        .get(fixture.url("/api/auth/user"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["username"], "editor");
    assert_eq!(body["isAdmin"], false);
    assert!(body.get("passwordHash").is_none());
}

// ============================================================================
// Content CRUD
// ============================================================================

#[tokio::test]
async fn test_team_crud_round_trip() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let created = fixture
        .create(
            &token,
            "/api/team",
            json!({
                "name": "Grace",
                "role": "CTO",
                "image": "/img/grace.png",
                "socialLinks": {"linkedin": "https://linkedin.com/in/grace"}
            }),
        )
        .await;
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["type"], "expert");
    assert_eq!(created["socialLinks"]["linkedin"], "https://linkedin.com/in/grace");

    let (status, fetched) = fixture.get_json(&format!("/api/team/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(fetched, created);

    // Partial update keeps the untouched fields
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/team/{}", id)))
        .bearer_auth(&token)
        .json(&json!({"role": "CEO", "socialLinks": {"github": "https://github.com/grace"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["name"], "Grace");
    assert_eq!(updated["role"], "CEO");
    assert_eq!(updated["socialLinks"]["linkedin"], "https://linkedin.com/in/grace");
    assert_eq!(updated["socialLinks"]["github"], "https://github.com/grace");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/team/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (status, body) = fixture.get_json(&format!("/api/team/{}", id)).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Team member not found");

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/team/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_team_type_filter() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    for (name, kind) in [("A", "expert"), ("B", "intern"), ("C", "intern")] {
        fixture
            .create(
                &token,
                "/api/team",
                json!({"name": name, "role": "R", "image": "/i.png", "type": kind}),
            )
            .await;
    }

    let (_, interns) = fixture.get_json("/api/team?type=intern").await;
    let names: Vec<&str> = interns
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["C", "B"]);
}

#[tokio::test]
async fn test_create_validation() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/blog"))
        .bearer_auth(&token)
        .json(&json!({"title": "No body"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, posts) = fixture.get_json("/api/blog").await;
    assert_eq!(posts.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_blog_publish_flow() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let draft = fixture
        .create(
            &token,
            "/api/blog",
            json!({"title": "Hello", "excerpt": "Short", "content": "Long form"}),
        )
        .await;
    assert_eq!(draft["status"], "Draft");
    let id = draft["id"].as_str().unwrap();

    let (_, published) = fixture.get_json("/api/blog/published").await;
    assert_eq!(published.as_array().unwrap().len(), 0);

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/blog/{}", id)))
        .bearer_auth(&token)
        .json(&json!({"status": "Published"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let post: Value = resp.json().await.unwrap();
    assert_eq!(post["status"], "Published");
    assert_eq!(post["title"], "Hello");
    assert_eq!(post["content"], "Long form");

    let (_, published) = fixture.get_json("/api/blog/published").await;
    assert_eq!(published.as_array().unwrap().len(), 1);
    let (_, drafts) = fixture.get_json("/api/blog?status=Draft").await;
    assert_eq!(drafts.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_list_order_and_count() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let mut ids = Vec::new();
    for i in 0..5 {
        let career = fixture
            .create(
                &token,
                "/api/career",
                json!({"title": format!("Job {}", i), "description": "D"}),
            )
            .await;
        ids.push(career["id"].as_str().unwrap().to_string());
    }

    for id in &ids[1..3] {
        let resp = fixture
            .client
            .delete(fixture.url(&format!("/api/career/{}", id)))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let (_, careers) = fixture.get_json("/api/career").await;
    let titles: Vec<&str> = careers
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Job 4", "Job 3", "Job 0"]);
}

#[tokio::test]
async fn test_category_routes() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    for (title, category) in [("Cloud", "hosting"), ("Audit", "security"), ("VPS", "hosting")] {
        fixture
            .create(
                &token,
                "/api/service",
                json!({
                    "title": title,
                    "description": "D",
                    "image": "/s.png",
                    "category": category,
                    "features": [{"title": "Fast", "description": "Very"}]
                }),
            )
            .await;
    }
    fixture
        .create(
            &token,
            "/api/career",
            json!({"title": "SRE", "description": "D", "category": "ops", "requirements": ["Linux"]}),
        )
        .await;

    let (_, hosting) = fixture.get_json("/api/service/category/hosting").await;
    assert_eq!(hosting.as_array().unwrap().len(), 2);
    let (_, security) = fixture.get_json("/api/service?category=security").await;
    assert_eq!(security.as_array().unwrap().len(), 1);
    assert_eq!(security[0]["features"][0]["title"], "Fast");

    let (_, ops) = fixture.get_json("/api/career/category/ops").await;
    assert_eq!(ops.as_array().unwrap().len(), 1);
    assert_eq!(ops[0]["requirements"][0], "Linux");
    let (_, none) = fixture.get_json("/api/career/category/sales").await;
    assert_eq!(none.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_malformed_id() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/service/not-a-key").await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Service not found");
    assert_eq!(body["code"], "INVALID_ID");
}

// ============================================================================
// Gallery
// ============================================================================

#[tokio::test]
async fn test_gallery_variants() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    // A video without its URL is rejected
    let resp = fixture
        .client
        .post(fixture.url("/api/gallery"))
        .bearer_auth(&token)
        .json(&json!({"title": "Demo", "description": "D", "type": "video", "imageUrl": "/x.png"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "videoUrl is required");

    let video = fixture
        .create(
            &token,
            "/api/gallery",
            json!({"title": "Demo", "description": "D", "type": "video", "videoUrl": "https://v.example/1"}),
        )
        .await;
    assert_eq!(video["type"], "video");
    assert_eq!(video["videoUrl"], "https://v.example/1");
    assert!(video.get("imageUrl").is_none());

    // Typed route forces the type
    let image = fixture
        .create(
            &token,
            "/api/gallery/images",
            json!({"title": "Office", "description": "D", "type": "video", "imageUrl": "/office.png"}),
        )
        .await;
    assert_eq!(image["type"], "image");

    let (_, videos) = fixture.get_json("/api/gallery/videos").await;
    assert_eq!(videos.as_array().unwrap().len(), 1);
    let (_, images) = fixture.get_json("/api/gallery/type/image").await;
    assert_eq!(images.as_array().unwrap().len(), 1);
    let (_, all) = fixture.get_json("/api/gallery").await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, _) = fixture.get_json("/api/gallery/type/audio").await;
    assert_eq!(status, 400);

    // Switching to image without an image URL violates the variant
    let video_id = video["id"].as_str().unwrap();
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/gallery/{}", video_id)))
        .bearer_auth(&token)
        .json(&json!({"type": "image"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Type-scoped delete refuses the wrong type
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/gallery/images/{}", video_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Image not found");

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/gallery/videos/{}", video_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Video deleted");

    let (_, all) = fixture.get_json("/api/gallery").await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

// ============================================================================
// Contact and applications
// ============================================================================

#[tokio::test]
async fn test_contact() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/contact"))
        .json(&json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "email": "grace@example.com",
            "phone": "555-0100",
            "subject": "Demo",
            "message": "Please call me"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Message sent successfully.");

    let sent = fixture.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "owner@example.com");
    assert_eq!(sent[0].subject, "Contact Form: Demo");
    assert!(sent[0].body.contains("Please call me"));

    let resp = fixture
        .client
        .post(fixture.url("/api/contact"))
        .json(&json!({"firstName": "Grace", "email": "grace@example.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "All fields are required.");
    assert_eq!(fixture.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_contact_mail_failure() {
    let fixture = TestFixture::build(MemoryMailer::failing(), true).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/contact"))
        .json(&json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "email": "grace@example.com",
            "phone": "555-0100",
            "subject": "Demo",
            "message": "Hi"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Failed to send message.");
    assert_eq!(body["code"], "MAIL_ERROR");
    // Development mode exposes the upstream detail
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_career_application() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/career/apply"))
        .multipart(application_form(pdf_part("My CV.pdf")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Application submitted successfully.");

    let sent = fixture.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Job Application: Backend Engineer");
    assert!(sent[0].body.contains("Ada Lovelace"));
    let attachment = sent[0].attachment.as_ref().unwrap();
    assert_eq!(attachment.filename, "My_CV.pdf");
    assert_eq!(attachment.content_type, "application/pdf");
    assert_eq!(attachment.bytes, b"%PDF-1.4 resume");

    // The stored upload is removed after sending
    assert_eq!(leftover_uploads(&fixture), 0);
}

#[tokio::test]
async fn test_career_application_rejections() {
    let fixture = TestFixture::new().await;

    let word_doc = multipart::Part::bytes(b"PK\x03\x04".to_vec())
        .file_name("cv.docx")
        .mime_str("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        .unwrap();
    let resp = fixture
        .client
        .post(fixture.url("/api/career/apply"))
        .multipart(application_form(word_doc))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Invalid file type. Only PDF files are allowed for resumes."
    );

    let missing_position = multipart::Form::new()
        .text("name", "Ada")
        .text("email", "ada@example.com")
        .text("phone", "555")
        .part("resume", pdf_part("cv.pdf"));
    let resp = fixture
        .client
        .post(fixture.url("/api/career/apply"))
        .multipart(missing_position)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let no_resume = multipart::Form::new()
        .text("name", "Ada")
        .text("email", "ada@example.com")
        .text("phone", "555")
        .text("position", "Engineer");
    let resp = fixture
        .client
        .post(fixture.url("/api/career/apply"))
        .multipart(no_resume)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    assert!(fixture.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_career_application_mail_failure_removes_upload() {
    let fixture = TestFixture::build(MemoryMailer::failing(), true).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/career/apply"))
        .multipart(application_form(pdf_part("cv.pdf")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Failed to send message.");

    assert_eq!(leftover_uploads(&fixture), 0);
}

#[tokio::test]
async fn test_career_application_size_limit() {
    let fixture = TestFixture::new().await;

    let oversized = multipart::Part::bytes(vec![b'%'; MAX_RESUME_BYTES + 1])
        .file_name("big.pdf")
        .mime_str("application/pdf")
        .unwrap();
    let resp = fixture
        .client
        .post(fixture.url("/api/career/apply"))
        .multipart(application_form(oversized))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Resume exceeds the 2MB size limit");

    // Exactly at the limit is accepted
    let at_limit = multipart::Part::bytes(vec![b'%'; MAX_RESUME_BYTES])
        .file_name("max.pdf")
        .mime_str("application/pdf")
        .unwrap();
    let resp = fixture
        .client
        .post(fixture.url("/api/career/apply"))
        .multipart(application_form(at_limit))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    assert_eq!(fixture.mailer.sent().len(), 1);
    assert_eq!(leftover_uploads(&fixture), 0);
}

#[tokio::test]
async fn test_career_application_pdf_with_parameters() {
    let fixture = TestFixture::new().await;

    let resume = multipart::Part::bytes(b"%PDF-1.4 resume".to_vec())
        .file_name("cv.pdf")
        .mime_str("application/pdf; name=cv.pdf")
        .unwrap();
    let resp = fixture
        .client
        .post(fixture.url("/api/career/apply"))
        .multipart(application_form(resume))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(fixture.mailer.sent().len(), 1);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_register_same_username() {
    let fixture = TestFixture::new().await;

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let client = fixture.client.clone();
        let url = fixture.url("/api/auth/register");
        tasks.spawn(async move {
            client
                .post(url)
                .json(&json!({"username": "dup", "password": "pw123456"}))
                .send()
                .await
                .unwrap()
                .status()
        });
    }

    let mut created = 0;
    let mut rejected = 0;
    while let Some(status) = tasks.join_next().await {
        match status.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::BAD_REQUEST => rejected += 1,
            other => panic!("unexpected status {}", other),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(rejected, 7);

    let users: Vec<User> = fixture.store.list(None).await.unwrap();
    assert_eq!(users.iter().filter(|u| u.username == "dup").count(), 1);
}

// ============================================================================
// Service and career round trips
// ============================================================================

#[tokio::test]
async fn test_service_crud_round_trip() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let created = fixture
        .create(
            &token,
            "/api/service",
            json!({
                "title": "Cloud Hosting",
                "description": "Managed hosting",
                "image": "/img/cloud.png",
                "category": "hosting",
                "features": [{"title": "Backups", "description": "Nightly"}]
            }),
        )
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, fetched) = fixture.get_json(&format!("/api/service/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(fetched, created);

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/service/{}", id)))
        .bearer_auth(&token)
        .json(&json!({"description": "Fully managed hosting"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["description"], "Fully managed hosting");
    assert_eq!(updated["title"], "Cloud Hosting");
    assert_eq!(updated["image"], "/img/cloud.png");
    assert_eq!(updated["category"], "hosting");
    assert_eq!(updated["features"], created["features"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (_, fetched) = fixture.get_json(&format!("/api/service/{}", id)).await;
    assert_eq!(fetched, updated);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/service/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Service deleted successfully");

    let (status, body) = fixture.get_json(&format!("/api/service/{}", id)).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Service not found");
}

#[tokio::test]
async fn test_career_crud_round_trip() {
    let fixture = TestFixture::new().await;
    let token = fixture.login().await;

    let created = fixture
        .create(
            &token,
            "/api/career",
            json!({
                "title": "SRE",
                "description": "Keep it running",
                "requirements": ["Linux", "On-call"],
                "category": "ops"
            }),
        )
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, fetched) = fixture.get_json(&format!("/api/career/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(fetched, created);

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/career/{}", id)))
        .bearer_auth(&token)
        .json(&json!({"title": "Senior SRE"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["title"], "Senior SRE");
    assert_eq!(updated["description"], "Keep it running");
    assert_eq!(updated["requirements"], json!(["Linux", "On-call"]));
    assert_eq!(updated["category"], "ops");

    let (_, by_category) = fixture.get_json("/api/career/category/%20ops%20").await;
    assert_eq!(by_category.as_array().unwrap().len(), 1);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/career/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Career item deleted successfully");

    let (status, body) = fixture.get_json(&format!("/api/career/{}", id)).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Career item not found");
}

// ============================================================================
// Production mode
// ============================================================================

#[tokio::test]
async fn test_production_hides_error_detail() {
    let fixture =
        TestFixture::build_with_env(MemoryMailer::failing(), true, Environment::Production).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/contact"))
        .json(&contact_body())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Failed to send message.");
    assert_eq!(body["code"], "MAIL_ERROR");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_production_serves_frontend_bundle() {
    let fixture =
        TestFixture::build_with_env(MemoryMailer::new(), true, Environment::Production).await;

    let resp = fixture
        .client
        .get(fixture.url("/assets/app.js"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "console.log('app');");

    // Client-side routes fall back to index.html
    let resp = fixture.client.get(fixture.url("/about")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), INDEX_HTML);

    // API misses still answer in JSON
    let (status, body) = fixture.get_json("/api/nope").await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Route not found");

    let resp = fixture.client.get(fixture.url("/health")).send().await.unwrap();
    assert_eq!(resp.text().await.unwrap(), "OK");
}

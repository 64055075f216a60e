use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use recipebook::{
    AppState,
    ai::{FakeProvider, LlmProvider},
    config::Config,
    database::MemoryStore,
    operations::account::ensure_admin_account,
    routes,
};
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
}

fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some("integration-secret".to_string()),
        _ => None,
    })
    .unwrap()
}

fn app_with(ai: Option<Arc<dyn LlmProvider>>) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        store: store.clone(),
        config: Arc::new(test_config()),
        ai,
    };
    TestApp {
        router: routes::router(state),
        store,
    }
}

fn app() -> TestApp {
    app_with(None)
}

impl TestApp {
    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(format!("/api{uri}"));
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Registers a user and returns `(token, user_id)`.
    async fn register(&self, email: &str) -> (String, String) {
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({ "email": email, "password": "hunter22", "name": "Cook" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let data = &body["resp_data"];
        (
            data["token"].as_str().unwrap().to_string(),
            data["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    async fn create_recipe(&self, token: &str, name: &str, is_public: bool) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/recipes",
                Some(token),
                Some(json!({
                    "name": name,
                    "ingredients": ["tomato", "basil"],
                    "instructions": "Mix.",
                    "cuisine_type": "Italian",
                    "is_public": is_public,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["resp_data"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn ping_uses_success_envelope() {
    let app = app();
    let (status, body) = app.call(Method::GET, "/ping", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["msg"], "success");
    assert_eq!(body["resp_data"], "pong");
}

#[tokio::test]
async fn register_login_and_me() {
    let app = app();
    let (token, user_id) = app.register("Alice@Example.com").await;

    let (status, body) = app.call(Method::GET, "/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["id"], user_id);
    assert_eq!(body["resp_data"]["email"], "alice@example.com");
    assert!(body["resp_data"].get("password_hash").is_none());

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "hunter22" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["resp_data"]["token"].is_string());

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "wrong-one" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);
    assert!(body.get("resp_data").is_none());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app();
    app.register("dup@example.com").await;
    let (status, body) = app
        .call(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "DUP@example.com", "password": "hunter22" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1006);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = app();
    let (status, body) = app.call(Method::GET, "/recipes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);

    let (status, _) = app
        .call(Method::GET, "/recipes", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn share_then_upgrade_to_edit() {
    let app = app();
    let (owner, _) = app.register("owner@example.com").await;
    let (viewer, viewer_id) = app.register("viewer@example.com").await;
    let recipe_id = app.create_recipe(&owner, "Soup", false).await;
    let path = format!("/recipes/{recipe_id}");

    let (status, body) = app.call(Method::GET, &path, Some(&viewer), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1004);

    let share_path = format!("{path}/share");
    let (status, _) = app
        .call(
            Method::POST,
            &share_path,
            Some(&owner),
            Some(json!({ "shared_with_email": "viewer@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.call(Method::GET, &path, Some(&viewer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["name"], "Soup");
    assert_eq!(body["resp_data"]["can_edit"], false);

    let rename = Some(json!({ "name": "Stew" }));
    let (status, body) = app
        .call(Method::PATCH, &path, Some(&viewer), rename.clone())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 1003);

    // Viewers cannot manage shares, and re-granting keeps a single row.
    let (status, _) = app.call(Method::GET, &share_path, Some(&viewer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    app.call(
        Method::POST,
        &share_path,
        Some(&owner),
        Some(json!({ "shared_with_email": "viewer@example.com", "can_edit": true })),
    )
    .await;
    let (_, body) = app.call(Method::GET, &share_path, Some(&owner), None).await;
    let shares = body["resp_data"].as_array().unwrap();
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0]["shared_with_id"], viewer_id);
    assert_eq!(shares[0]["can_edit"], true);

    let (status, body) = app.call(Method::PATCH, &path, Some(&viewer), rename).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["name"], "Stew");

    let (status, _) = app.call(Method::DELETE, &path, Some(&viewer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("{share_path}?user_id={viewer_id}"),
            Some(&owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.call(Method::GET, &path, Some(&viewer), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_recipe_takes_engagement_with_it() {
    let app = app();
    let (owner, _) = app.register("chef@example.com").await;
    let (fan, _) = app.register("fan@example.com").await;
    let recipe_id = app.create_recipe(&owner, "Pizza", true).await;
    let path = format!("/recipes/{recipe_id}");

    for _ in 0..2 {
        let (status, body) = app
            .call(Method::POST, &format!("{path}/likes"), Some(&fan), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resp_data"]["count"], 1);
        assert_eq!(body["resp_data"]["liked"], true);
    }
    let (status, _) = app
        .call(
            Method::POST,
            &format!("{path}/comments"),
            Some(&fan),
            Some(json!({ "text": "  lovely  " })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    app.call(Method::POST, &format!("{path}/favorite"), Some(&fan), None)
        .await;

    let (_, body) = app.call(Method::GET, "/favorites", Some(&fan), None).await;
    assert_eq!(body["resp_data"].as_array().unwrap().len(), 1);

    let (status, _) = app.call(Method::DELETE, &path, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call(Method::GET, &path, Some(&fan), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = app.call(Method::GET, "/favorites", Some(&fan), None).await;
    assert!(body["resp_data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn friend_request_lifecycle() {
    let app = app();
    let (alice, alice_id) = app.register("alice@example.com").await;
    let (bob, bob_id) = app.register("bob@example.com").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/friends",
            Some(&alice),
            Some(json!({ "email": "bob@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let request_id = body["resp_data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .call(
            Method::POST,
            "/friends",
            Some(&bob),
            Some(json!({ "user_id": alice_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app
        .call(
            Method::GET,
            &format!("/friend-requests/status?user_id={alice_id}"),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(body["resp_data"]["status"], "received");

    // Only the addressee can accept.
    let accept = format!("/friend-requests/{request_id}/accept");
    let (status, _) = app.call(Method::POST, &accept, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call(Method::POST, &accept, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);

    for (token, other) in [(&alice, &bob_id), (&bob, &alice_id)] {
        let (_, body) = app.call(Method::GET, "/friends", Some(token), None).await;
        let friends = body["resp_data"].as_array().unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(&friends[0]["friend"]["id"], other);
    }

    let (_, body) = app
        .call(Method::GET, "/notifications", Some(&alice), None)
        .await;
    let notifications = body["resp_data"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    let notification_id = notifications[0]["id"].as_str().unwrap().to_string();

    let mark = format!("/notifications/{notification_id}");
    let (status, _) = app
        .call(Method::PATCH, &mark, Some(&bob), Some(json!({ "read": true })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = app
        .call(Method::PATCH, &mark, Some(&alice), Some(json!({ "read": true })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["read"], true);

    let (status, _) = app
        .call(Method::DELETE, &format!("/friends/{alice_id}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.call(Method::GET, "/friends", Some(&alice), None).await;
    assert!(body["resp_data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn admin_routes_are_guarded() {
    let app = app();
    let (member, member_id) = app.register("member@example.com").await;

    let (status, body) = app
        .call(Method::GET, "/admin/users", Some(&member), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 1003);

    ensure_admin_account(app.store.as_ref(), "root@example.com", "rootpass")
        .await
        .unwrap();
    let (_, body) = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "root@example.com", "password": "rootpass" })),
        )
        .await;
    let admin = body["resp_data"]["token"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(Method::GET, "/admin/users", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .call(
            Method::PATCH,
            &format!("/admin/users/{member_id}"),
            Some(&admin),
            Some(json!({ "disabled": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // A disabled account is locked out of existing sessions.
    let (status, _) = app.call(Method::GET, "/me", Some(&member), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn ai_generation_without_provider_is_unavailable() {
    let app = app();
    let (token, _) = app.register("cook@example.com").await;
    let (status, body) = app
        .call(
            Method::POST,
            "/ai/generate",
            Some(&token),
            Some(json!({ "prompt": "something with lentils" })),
        )
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], 5003);
}

#[tokio::test]
async fn ai_generation_and_suggestions_with_fake_provider() {
    let fake = FakeProvider::new()
        .with_response(
            "lentils",
            "```json\n{\"name\": \"Lentil Dal\", \"ingredients\": [\"lentils\"], \"instructions\": \"Simmer.\", \"cuisineType\": \"Indian\", \"prepTimeMinutes\": 5, \"cookTimeMinutes\": 30}\n```",
        )
        .with_response("Ingredients", "1. Shakshuka\n2. Egg fried rice");
    let app = app_with(Some(Arc::new(fake)));
    let (token, _) = app.register("cook@example.com").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/ai/generate",
            Some(&token),
            Some(json!({ "prompt": "something with lentils" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["resp_data"]["name"], "Lentil Dal");
    assert_eq!(body["resp_data"]["cook_time_minutes"], 30);

    let (status, body) = app
        .call(
            Method::POST,
            "/ai/suggest",
            Some(&token),
            Some(json!({ "ingredients": "eggs, rice" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["resp_data"]["source"], "ai");
    assert_eq!(
        body["resp_data"]["suggestions"],
        json!(["Shakshuka", "Egg fried rice"])
    );
}

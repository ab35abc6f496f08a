use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use rusqlite::Connection;
use serde_json::{json, Value};
use tower::ServiceExt;
use tuiter_backend::api::{self, AppState};
use tuiter_backend::config::{HttpConfig, TuiterConfig, TuiterPaths};
use tuiter_backend::database::Database;

struct TestApp {
    router: Router,
}

struct Reply {
    status: StatusCode,
    body: Value,
    session_cookie: Option<String>,
}

impl TestApp {
    fn new() -> Self {
        let database = Database::from_connection(Connection::open_in_memory().expect("db"), true);
        database.ensure_migrations().expect("migrations");
        let config = TuiterConfig::new(0, TuiterPaths::default(), HttpConfig::default());
        Self {
            router: api::build_router(AppState::new(config, database)),
        }
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let session_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find(|value| value.starts_with("tuiter.sid="))
            .and_then(|value| value.split(';').next())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        Reply {
            status,
            body,
            session_cookie,
        }
    }

    async fn get(&self, uri: &str) -> Reply {
        self.call(Method::GET, uri, None, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> Reply {
        self.call(Method::POST, uri, Some(body), None).await
    }

    async fn create_user(&self, username: &str) -> String {
        let reply = self
            .post(
                "/api/users",
                json!({
                    "username": username,
                    "password": "hunter2",
                    "email": format!("{username}@example.com"),
                }),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{:?}", reply.body);
        reply.body["_id"].as_str().expect("user id").to_string()
    }

    async fn create_tuit(&self, uid: &str, text: &str, posted_on: &str) -> String {
        let reply = self
            .post(
                &format!("/api/users/{uid}/tuits"),
                json!({ "tuit": text, "postedOn": posted_on }),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{:?}", reply.body);
        reply.body["_id"].as_str().expect("tuit id").to_string()
    }
}

#[tokio::test]
async fn welcome_and_health_respond() {
    let app = TestApp::new();
    let welcome = app.get("/").await;
    assert_eq!(welcome.status, StatusCode::OK);
    assert_eq!(welcome.body, Value::String("Welcome!".into()));

    let health = app.get("/health").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "ok");
}

#[tokio::test]
async fn user_crud_round_trip() {
    let app = TestApp::new();
    let uid = app.create_user("alice").await;

    let fetched = app.get(&format!("/api/users/{uid}")).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["username"], "alice");
    assert!(fetched.body.get("password").is_none());

    let updated = app
        .call(
            Method::PUT,
            &format!("/api/users/{uid}"),
            Some(json!({ "firstName": "Alice" })),
            None,
        )
        .await;
    assert_eq!(
        updated.body,
        json!({"acknowledged": true, "matchedCount": 1, "modifiedCount": 1})
    );
    assert_eq!(app.get(&format!("/api/users/{uid}")).await.body["firstName"], "Alice");

    let duplicate = app
        .post(
            "/api/users",
            json!({"username": "alice", "password": "x", "email": "a@example.com"}),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.body["error"], "conflict");

    let deleted = app.get(&format!("/api/users/id/{uid}/delete")).await;
    assert_eq!(deleted.body, json!({"acknowledged": true, "deletedCount": 1}));

    let missing = app.get(&format!("/api/users/{uid}")).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "not_found");
}

#[tokio::test]
async fn bulk_and_username_deletes() {
    let app = TestApp::new();
    app.create_user("alice").await;
    app.create_user("bob").await;
    app.create_user("carol").await;

    let by_name = app
        .call(Method::DELETE, "/api/users/username/bob", None, None)
        .await;
    assert_eq!(by_name.body["deletedCount"], 1);

    let all = app.get("/api/users/delete").await;
    assert_eq!(all.body["deletedCount"], 2);
    assert_eq!(app.get("/api/users").await.body, json!([]));
}

#[tokio::test]
async fn bookmarking_twice_keeps_one_record() {
    let app = TestApp::new();
    let uid = app.create_user("alice").await;
    let tid = app.create_tuit(&uid, "keep", "2024-01-01T00:00:00Z").await;

    let first = app.post(&format!("/api/users/{uid}/bookmarks/{tid}"), json!({})).await;
    let second = app.post(&format!("/api/users/{uid}/bookmarks/{tid}"), json!({})).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["_id"], second.body["_id"]);

    let listed = app.get(&format!("/api/users/{uid}/bookmarks")).await;
    let bookmarks = listed.body.as_array().expect("array");
    assert_eq!(bookmarks.len(), 1);
    assert_eq!(bookmarks[0]["tuit"]["tuit"], "keep");
    assert_eq!(bookmarks[0]["bookMarkedBy"], uid.as_str());

    let removed = app
        .call(
            Method::DELETE,
            &format!("/api/users/{uid}/unbookmarks/{tid}"),
            None,
            None,
        )
        .await;
    assert_eq!(removed.body["deletedCount"], 1);
    assert_eq!(app.get(&format!("/api/tuits/{tid}/bookmarks")).await.body, json!([]));
}

#[tokio::test]
async fn unfollowing_a_stranger_deletes_nothing() {
    let app = TestApp::new();
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;

    let reply = app
        .call(
            Method::DELETE,
            &format!("/api/users/{alice}/unfollowing/{bob}"),
            None,
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({"acknowledged": true, "deletedCount": 0}));

    let follow = app
        .post(&format!("/api/users/{alice}/following/{bob}"), json!({}))
        .await;
    assert_eq!(follow.body["userFollower"], alice.as_str());
    assert_eq!(follow.body["userFollowing"], bob.as_str());

    let followers = app.get(&format!("/api/users/{bob}/followers")).await;
    assert_eq!(followers.body[0]["userFollower"]["username"], "alice");

    let self_follow = app
        .post(&format!("/api/users/{alice}/following/{alice}"), json!({}))
        .await;
    assert_eq!(self_follow.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_tuits_are_newest_first() {
    let app = TestApp::new();
    let uid = app.create_user("alice").await;
    let oldest = app.create_tuit(&uid, "one", "2024-01-01T00:00:00Z").await;
    let newest = app.create_tuit(&uid, "three", "2024-03-01T00:00:00Z").await;
    let middle = app.create_tuit(&uid, "two", "2024-02-01T00:00:00Z").await;

    let reply = app.get(&format!("/api/users/{uid}/tuits")).await;
    let ids: Vec<&str> = reply
        .body
        .as_array()
        .expect("array")
        .iter()
        .map(|tuit| tuit["_id"].as_str().expect("id"))
        .collect();
    assert_eq!(ids, vec![newest.as_str(), middle.as_str(), oldest.as_str()]);
    assert_eq!(reply.body[0]["postedBy"]["username"], "alice");
    assert_eq!(reply.body[0]["postedOn"], "2024-03-01T00:00:00.000Z");
}

#[tokio::test]
async fn like_and_dislike_exclude_each_other() {
    let app = TestApp::new();
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let tid = app.create_tuit(&alice, "hot take", "2024-01-01T00:00:00Z").await;

    let liked = app
        .call(Method::PUT, &format!("/api/users/{bob}/likes/{tid}"), None, None)
        .await;
    assert_eq!(liked.body["reaction"], "like");
    assert_eq!(liked.body["stats"]["likes"], 1);

    let disliked = app
        .call(Method::PUT, &format!("/api/users/{bob}/dislikes/{tid}"), None, None)
        .await;
    assert_eq!(disliked.body["reaction"], "dislike");
    assert_eq!(disliked.body["stats"]["likes"], 0);
    assert_eq!(disliked.body["stats"]["dislikes"], 1);

    assert_eq!(app.get(&format!("/api/users/{bob}/likes")).await.body, json!([]));
    assert_eq!(app.get(&format!("/api/users/{bob}/likes/{tid}")).await.body, Value::Null);
    let dislikes = app.get(&format!("/api/users/{bob}/dislikes")).await;
    assert_eq!(dislikes.body.as_array().map(Vec::len), Some(1));
    assert_eq!(dislikes.body[0]["dislikedBy"], bob.as_str());

    let tuit = app.get(&format!("/api/tuits/{tid}")).await;
    assert_eq!(tuit.body["stats"]["likes"], 0);
    assert_eq!(tuit.body["stats"]["dislikes"], 1);

    let undone = app
        .call(Method::PUT, &format!("/api/users/{bob}/dislikes/{tid}"), None, None)
        .await;
    assert_eq!(undone.body["reaction"], Value::Null);
    assert_eq!(app.get(&format!("/api/tuits/{tid}/dislikes")).await.body, json!([]));
}

#[tokio::test]
async fn deleted_message_leaves_both_views() {
    let app = TestApp::new();
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;

    let sent = app
        .post(
            &format!("/api/users/{alice}/messages/{bob}"),
            json!({ "message": "hi bob" }),
        )
        .await;
    assert_eq!(sent.status, StatusCode::OK);
    let mid = sent.body["_id"].as_str().expect("message id").to_string();

    let received = app.get(&format!("/api/users/{bob}/messages/receive")).await;
    assert_eq!(received.body[0]["message"], "hi bob");
    assert_eq!(received.body[0]["messageSentBy"]["username"], "alice");

    let deleted = app
        .call(
            Method::DELETE,
            &format!("/api/users/{alice}/messages/{mid}"),
            None,
            None,
        )
        .await;
    assert_eq!(deleted.body["deletedCount"], 1);

    assert_eq!(
        app.get(&format!("/api/users/{alice}/messages/sent")).await.body,
        json!([])
    );
    assert_eq!(
        app.get(&format!("/api/users/{bob}/messages/receive")).await.body,
        json!([])
    );
}

#[tokio::test]
async fn me_resolves_only_with_a_session() {
    let app = TestApp::new();

    let anonymous = app.get("/api/users/me").await;
    assert_eq!(anonymous.status, StatusCode::NOT_FOUND);
    assert_eq!(anonymous.body["message"], "user not found: me");

    let signup = app
        .post(
            "/api/auth/signup",
            json!({"username": "alice", "password": "hunter2", "email": "a@example.com"}),
        )
        .await;
    assert_eq!(signup.status, StatusCode::OK);
    let cookie = signup.session_cookie.expect("session cookie");
    let uid = signup.body["_id"].as_str().expect("id").to_string();

    let me = app.call(Method::GET, "/api/users/me", None, Some(&cookie)).await;
    assert_eq!(me.body["_id"], uid.as_str());

    let posted = app
        .call(
            Method::POST,
            "/api/users/my/tuits",
            Some(json!({ "tuit": "from my session" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(posted.body["postedBy"], uid.as_str());

    let mine = app.get(&format!("/api/users/{uid}/tuits")).await;
    assert_eq!(mine.body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn auth_flow_uses_hashed_credentials() {
    let app = TestApp::new();
    app.create_user("alice").await;

    let wrong = app
        .post("/api/auth/login", json!({"username": "alice", "password": "nope"}))
        .await;
    assert_eq!(wrong.status, StatusCode::FORBIDDEN);

    let plain = app
        .post("/api/login", json!({"username": "alice", "password": "hunter2"}))
        .await;
    assert_eq!(plain.status, StatusCode::OK);
    assert!(plain.session_cookie.is_none());

    let login = app
        .post("/api/auth/login", json!({"username": "alice", "password": "hunter2"}))
        .await;
    let cookie = login.session_cookie.expect("session cookie");

    let profile = app
        .call(Method::POST, "/api/auth/profile", None, Some(&cookie))
        .await;
    assert_eq!(profile.body["username"], "alice");

    let taken = app
        .post(
            "/api/auth/signup",
            json!({"username": "alice", "password": "x", "email": "x@example.com"}),
        )
        .await;
    assert_eq!(taken.status, StatusCode::FORBIDDEN);

    let logout = app
        .call(Method::POST, "/api/auth/logout", None, Some(&cookie))
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let after = app
        .call(Method::POST, "/api/auth/profile", None, Some(&cookie))
        .await;
    assert_eq!(after.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn tuit_routes_report_missing_and_counts() {
    let app = TestApp::new();
    let uid = app.create_user("alice").await;

    assert_eq!(app.get("/api/tuits/ghost").await.status, StatusCode::NOT_FOUND);

    let no_author = app.post("/api/tuits", json!({ "tuit": "orphan" })).await;
    assert_eq!(no_author.status, StatusCode::BAD_REQUEST);

    let created = app
        .post("/api/tuits", json!({ "tuit": "hello", "postedBy": uid }))
        .await;
    assert_eq!(created.status, StatusCode::OK);
    let tid = created.body["_id"].as_str().expect("id").to_string();

    let updated = app
        .call(
            Method::PUT,
            &format!("/api/tuits/{tid}"),
            Some(json!({ "tuit": "edited" })),
            None,
        )
        .await;
    assert_eq!(updated.body["modifiedCount"], 1);
    assert_eq!(app.get("/api/tuits").await.body[0]["tuit"], "edited");

    let gone = app
        .call(Method::DELETE, &format!("/api/tuits/{tid}"), None, None)
        .await;
    assert_eq!(gone.body["deletedCount"], 1);
    let again = app
        .call(Method::DELETE, &format!("/api/tuits/{tid}"), None, None)
        .await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body["deletedCount"], 0);
}

#[tokio::test]
async fn deleting_a_liker_refreshes_tuit_counters() {
    let app = TestApp::new();
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let tid = app.create_tuit(&alice, "likeable", "2024-01-01T00:00:00Z").await;

    app.call(Method::PUT, &format!("/api/users/{bob}/likes/{tid}"), None, None)
        .await;
    assert_eq!(app.get(&format!("/api/tuits/{tid}")).await.body["stats"]["likes"], 1);

    let deleted = app
        .call(Method::DELETE, &format!("/api/users/{bob}"), None, None)
        .await;
    assert_eq!(deleted.body["deletedCount"], 1);

    assert_eq!(app.get(&format!("/api/tuits/{tid}/likes")).await.body, json!([]));
    assert_eq!(app.get(&format!("/api/tuits/{tid}")).await.body["stats"]["likes"], 0);
}

#[tokio::test]
async fn malformed_bodies_use_the_error_shape() {
    let app = TestApp::new();

    let mistyped = app.post("/api/users", json!({ "username": 5 })).await;
    assert_eq!(mistyped.status, StatusCode::BAD_REQUEST);
    assert_eq!(mistyped.body["error"], "validation");
    assert!(mistyped.body["message"].is_string());

    let uid = app.create_user("alice").await;
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/users/{uid}/tuits"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let response = app.router.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json error body");
    assert_eq!(body["error"], "validation");
}

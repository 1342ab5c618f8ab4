use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use barscore::config::Config;
use barscore::db::migrator::DEFAULT_API_KEY;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn spawn_app() -> Router {
    spawn_app_with(|_| {}).await
}

async fn spawn_app_with(configure: impl FnOnce(&mut Config)) -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;
    configure(&mut config);

    let state = barscore::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    barscore::api::router(state).await
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    api_key: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("X-Api-Key", key);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn send_image(
    app: &Router,
    uri: &str,
    content_type: &str,
    bytes: Vec<u8>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("PUT")
        .uri(uri)
        .header("X-Api-Key", DEFAULT_API_KEY)
        .header("Content-Type", content_type)
        .body(Body::from(bytes))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn rate(app: &Router, battler_id: i64, api_key: &str, attribute: i64, score: f64) {
    let (status, body) = send(
        app,
        "PUT",
        &format!("/api/battlers/{battler_id}/ratings"),
        Some(api_key),
        Some(json!({ "ratings": [{ "attribute_id": attribute, "score": score }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

async fn register_fan(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": username, "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["role"], "fan");
    body["data"]["api_key"].as_str().unwrap().to_string()
}

async fn create_battler(app: &Router, name: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/battlers",
        Some(DEFAULT_API_KEY),
        Some(json!({ "name": name, "league": "KOTD", "tags": ["Punchlines"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

async fn first_writing_attribute(app: &Router) -> i64 {
    let (status, body) = send(app, "GET", "/api/attributes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|group| group["category"] == "writing")
        .and_then(|group| group["attributes"][0]["id"].as_i64())
        .unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn test_auth_endpoints() {
    let app = spawn_app().await;

    let (status, _) = send(&app, "GET", "/api/system/status", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/system/status", Some("wrong-key"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) =
        send(&app, "GET", "/api/system/status", Some(DEFAULT_API_KEY), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["counts"]["users"], 1);
}

#[tokio::test]
async fn test_register_and_login() {
    let app = spawn_app().await;
    let api_key = register_fan(&app, "bars_fan").await;

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(api_key.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "bars_fan");

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "bars_fan", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "bars_fan", "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["api_key"], api_key.as_str());

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "bars_fan", "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_fan_cannot_manage_battlers() {
    let app = spawn_app().await;
    let fan_key = register_fan(&app, "viewer").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/battlers",
        Some(fan_key.as_str()),
        Some(json!({ "name": "Nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "POST", "/api/battlers", None, Some(json!({ "name": "Nope" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_battler_crud() {
    let app = spawn_app().await;
    let id = create_battler(&app, "Loaded Lux").await;

    let (status, body) = send(&app, "GET", &format!("/api/battlers/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["battler"]["name"], "Loaded Lux");
    assert_eq!(body["data"]["scores"]["total"], 0.0);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/battlers/{id}"),
        Some(DEFAULT_API_KEY),
        Some(json!({ "name": "Loaded Lux", "league": "URL" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["league"], "URL");

    let (status, body) = send(&app, "GET", "/api/battlers?search=lux", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/battlers/{id}"),
        Some(DEFAULT_API_KEY),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &format!("/api/battlers/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ratings_flow_into_leaderboard() {
    let app = spawn_app().await;
    let id = create_battler(&app, "Rum Nitty").await;
    let attribute = first_writing_attribute(&app).await;
    let fan_key = register_fan(&app, "rater").await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/battlers/{id}/ratings"),
        Some(DEFAULT_API_KEY),
        Some(json!({ "ratings": [{ "attribute_id": attribute, "score": 8.0 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["stored"], 1);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/battlers/{id}/ratings"),
        Some(fan_key.as_str()),
        Some(json!({ "ratings": [{ "attribute_id": attribute, "score": 4.0 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // admin weight 5, fan weight 1, shown to two places
    let expected = ((8.0 * 5.0 + 4.0) / 6.0 * 100.0_f64).round() / 100.0;

    let (_, detail) = send(&app, "GET", &format!("/api/battlers/{id}"), None, None).await;
    let total = detail["data"]["scores"]["total"].as_f64().unwrap();
    assert!((total - expected).abs() < 1e-6, "total was {total}");
    assert_eq!(detail["data"]["scores"]["rater_count"], 2);

    let (status, board) = send(&app, "GET", "/api/leaderboard", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let entry = &board["data"][0];
    assert_eq!(entry["battler_id"].as_i64(), Some(id));
    assert_eq!(entry["rank"], 1);
    assert!((entry["total"].as_f64().unwrap() - total).abs() < 1e-9);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/battlers/{id}/ratings"),
        Some(fan_key.as_str()),
        Some(json!({ "ratings": [{ "attribute_id": attribute, "score": 11.0 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_badge_toggle_twice_restores_state() {
    let app = spawn_app().await;
    let id = create_battler(&app, "Geechi Gotti").await;
    let fan_key = register_fan(&app, "badger").await;

    let (_, badges) = send(&app, "GET", "/api/badges", None, None).await;
    let badge = badges["data"][0]["positive"][0]["id"].as_i64().unwrap();
    let uri = format!("/api/battlers/{id}/badges/{badge}/toggle");

    let (status, first) = send(&app, "POST", &uri, Some(fan_key.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["selected"], true);
    assert_eq!(first["data"]["battler_count"], 1);

    let (status, second) = send(&app, "POST", &uri, Some(fan_key.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["selected"], false);
    assert_eq!(second["data"]["battler_count"], 0);
    assert_eq!(second["data"]["total_count"], 0);
}

#[tokio::test]
async fn test_role_weights_update_and_reset() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/admin/role-weights",
        Some(DEFAULT_API_KEY),
        Some(json!({ "media": 4.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["weights"]["media"], 4.0);
    assert_eq!(body["data"]["weights"]["fan"], 1.0);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/admin/role-weights",
        Some(DEFAULT_API_KEY),
        Some(json!({ "fan": -1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/role-weights/reset",
        Some(DEFAULT_API_KEY),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["weights"], body["data"]["defaults"]);
    assert_eq!(body["data"]["weights"]["league_owner"], 3.0);
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let app = spawn_app().await;
    let fan_key = register_fan(&app, "curious").await;

    let (status, _) = send(&app, "GET", "/api/admin/role-weights", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/admin/role-weights", Some(fan_key.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "POST", "/api/admin/news/generate", Some(fan_key.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/api/admin/users", Some(DEFAULT_API_KEY), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_role_grant_applies_immediately() {
    let app = spawn_app().await;
    let fan_key = register_fan(&app, "promoted").await;

    let (_, me) = send(&app, "GET", "/api/auth/me", Some(fan_key.as_str()), None).await;
    let user_id = me["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/admin/users/{user_id}/role"),
        Some(DEFAULT_API_KEY),
        Some(json!({ "role": "league_owner" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "league_owner");

    let (status, _) = send(
        &app,
        "POST",
        "/api/battlers",
        Some(fan_key.as_str()),
        Some(json!({ "name": "Granted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_news_is_public_only_when_published() {
    let app = spawn_app().await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/admin/news",
        Some(DEFAULT_API_KEY),
        Some(json!({
            "title": "Summer Madness card announced",
            "summary": "Headliners confirmed",
            "content": "Full card details.",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{created}");
    let id = created["data"]["id"].as_i64().unwrap();

    let (_, list) = send(&app, "GET", "/api/news", None, None).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 0);
    let (status, _) = send(&app, "GET", &format!("/api/news/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/admin/news/{id}/publish"),
        Some(DEFAULT_API_KEY),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(&app, "GET", "/api/news", None, None).await;
    assert_eq!(list["data"][0]["title"], "Summer Madness card announced");

    // pipeline is disabled by default
    let (status, _) = send(&app, "POST", "/api/admin/news/generate", Some(DEFAULT_API_KEY), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_battler_list_rejects_out_of_range_page() {
    let app = spawn_app().await;
    create_battler(&app, "Pat Stay").await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/battlers?page=18446744073709551615",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, "GET", "/api/battlers?page=1000000", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_leaderboard_category_and_min_ratings() {
    let app = spawn_app().await;
    let attribute = first_writing_attribute(&app).await;
    let fan_key = register_fan(&app, "judge").await;

    let solo = create_battler(&app, "Solo").await;
    let pair = create_battler(&app, "Pair").await;
    create_battler(&app, "Unrated").await;

    rate(&app, solo, DEFAULT_API_KEY, attribute, 9.0).await;
    rate(&app, pair, DEFAULT_API_KEY, attribute, 6.0).await;
    rate(&app, pair, fan_key.as_str(), attribute, 6.0).await;

    let (status, board) = send(&app, "GET", "/api/leaderboard", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = board["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Solo", "Pair"]);

    let (_, board) = send(&app, "GET", "/api/leaderboard?min_ratings=2", None, None).await;
    assert_eq!(board["data"].as_array().unwrap().len(), 1);
    assert_eq!(board["data"][0]["battler_id"].as_i64(), Some(pair));
    assert_eq!(board["data"][0]["rank"], 1);

    let (_, board) = send(&app, "GET", "/api/leaderboard?category=writing", None, None).await;
    assert_eq!(board["data"][0]["score"], 9.0);

    let (_, board) = send(&app, "GET", "/api/leaderboard?category=personal", None, None).await;
    assert_eq!(board["data"].as_array().unwrap().len(), 0);

    let (status, _) = send(&app, "GET", "/api/leaderboard?category=flow", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, top) = send(&app, "GET", "/api/analytics/top-battlers?limit=1", None, None).await;
    assert_eq!(top["data"].as_array().unwrap().len(), 1);
    assert_eq!(top["data"][0]["name"], "Solo");
}

#[tokio::test]
async fn test_analytics_views_after_refresh() {
    let app = spawn_app().await;
    let attribute = first_writing_attribute(&app).await;
    let fan_key = register_fan(&app, "viewer").await;
    let id = create_battler(&app, "Danny Myers").await;

    rate(&app, id, fan_key.as_str(), attribute, 7.5).await;
    rate(&app, id, DEFAULT_API_KEY, attribute, 9.0).await;

    let (_, badges) = send(&app, "GET", "/api/badges", None, None).await;
    let badge = badges["data"][0]["positive"][0]["id"].as_i64().unwrap();
    send(
        &app,
        "POST",
        &format!("/api/battlers/{id}/badges/{badge}/toggle"),
        Some(fan_key.as_str()),
        None,
    )
    .await;

    let (status, _) = send(&app, "POST", "/api/admin/analytics/refresh", Some(fan_key.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, report) = send(
        &app,
        "POST",
        "/api/admin/analytics/refresh",
        Some(DEFAULT_API_KEY),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["data"]["views"].as_array().unwrap().len(), 5);

    let (status, statuses) = send(&app, "GET", "/api/analytics/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(statuses["data"].as_array().unwrap().len(), 5);

    let (_, frequency) = send(&app, "GET", "/api/analytics/badges", None, None).await;
    assert_eq!(frequency["data"][0]["badge_id"].as_i64(), Some(badge));
    assert_eq!(frequency["data"][0]["assignment_count"], 1);

    let (_, buckets) = send(
        &app,
        "GET",
        &format!("/api/analytics/rating-distribution?attribute_id={attribute}"),
        None,
        None,
    )
    .await;
    let buckets: Vec<(i64, i64)> = buckets["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| (b["bucket"].as_i64().unwrap(), b["count"].as_i64().unwrap()))
        .collect();
    assert_eq!(buckets, [(7, 1), (9, 1)]);

    let (status, _) = send(
        &app,
        "GET",
        "/api/analytics/rating-distribution?attribute_id=0",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, activity) = send(&app, "GET", "/api/analytics/role-activity", None, None).await;
    let rows = activity["data"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
    let fan = rows.iter().find(|r| r["role"] == "fan").unwrap();
    assert_eq!(fan["rating_count"], 1);
    assert_eq!(fan["badge_count"], 1);
    let admin = rows.iter().find(|r| r["role"] == "admin").unwrap();
    assert_eq!(admin["rating_count"], 1);
    assert_eq!(admin["badge_count"], 0);
}

#[tokio::test]
async fn test_clearing_ratings_resets_scores() {
    let app = spawn_app().await;
    let attribute = first_writing_attribute(&app).await;
    let fan_key = register_fan(&app, "changed_mind").await;
    let id = create_battler(&app, "Chilla Jones").await;

    rate(&app, id, fan_key.as_str(), attribute, 6.0).await;
    let (_, detail) = send(&app, "GET", &format!("/api/battlers/{id}"), None, None).await;
    assert_eq!(detail["data"]["scores"]["total"], 6.0);

    let uri = format!("/api/battlers/{id}/ratings");
    let (status, _) = send(&app, "DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "DELETE", &uri, Some(fan_key.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = send(&app, "GET", &format!("/api/battlers/{id}"), None, None).await;
    assert_eq!(detail["data"]["scores"]["total"], 0.0);

    let (_, board) = send(&app, "GET", "/api/leaderboard", None, None).await;
    assert_eq!(board["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_rating_breakdown_by_role() {
    let app = spawn_app().await;
    let attribute = first_writing_attribute(&app).await;
    let first = register_fan(&app, "first_fan").await;
    let second = register_fan(&app, "second_fan").await;
    let third = register_fan(&app, "third_fan").await;
    let id = create_battler(&app, "Arsonal").await;

    rate(&app, id, first.as_str(), attribute, 7.0).await;
    rate(&app, id, second.as_str(), attribute, 7.0).await;
    rate(&app, id, third.as_str(), attribute, 6.0).await;
    rate(&app, id, DEFAULT_API_KEY, attribute, 9.0).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/battlers/{id}/ratings/breakdown"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let entry = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["attribute_id"].as_i64() == Some(attribute))
        .unwrap();
    assert_eq!(entry["rating_count"], 4);

    let roles = entry["roles"].as_array().unwrap();
    assert_eq!(roles.len(), 2);
    assert_eq!(roles[0]["role"], "fan");
    assert_eq!(roles[0]["average"], 6.67);
    assert_eq!(roles[0]["rating_count"], 3);
    assert_eq!(roles[0]["weight"], 1.0);
    assert_eq!(roles[1]["role"], "admin");
    assert_eq!(roles[1]["weight"], 5.0);

    // (20/3 * 1 + 9 * 5) / 6
    assert_eq!(entry["weighted"], 8.61);

    let unrated = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["attribute_id"].as_i64() != Some(attribute))
        .unwrap();
    assert_eq!(unrated["weighted"], Value::Null);

    let (status, _) = send(&app, "GET", "/api/battlers/9999/ratings/breakdown", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_weight_change_recomputes_scores() {
    let app = spawn_app().await;
    let attribute = first_writing_attribute(&app).await;
    let fan_key = register_fan(&app, "weighed").await;
    let id = create_battler(&app, "Tsu Surf").await;

    rate(&app, id, fan_key.as_str(), attribute, 2.0).await;
    rate(&app, id, DEFAULT_API_KEY, attribute, 8.0).await;

    // (2 * 1 + 8 * 5) / 6
    let (_, detail) = send(&app, "GET", &format!("/api/battlers/{id}"), None, None).await;
    assert_eq!(detail["data"]["scores"]["total"], 7.0);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/admin/role-weights",
        Some(DEFAULT_API_KEY),
        Some(json!({ "fan": 5.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = send(&app, "GET", &format!("/api/battlers/{id}"), None, None).await;
    assert_eq!(detail["data"]["scores"]["total"], 5.0);

    let (_, board) = send(&app, "GET", "/api/leaderboard", None, None).await;
    assert_eq!(board["data"][0]["total"], 5.0);

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/role-weights/reset",
        Some(DEFAULT_API_KEY),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = send(&app, "GET", &format!("/api/battlers/{id}"), None, None).await;
    assert_eq!(detail["data"]["scores"]["total"], 7.0);
}

#[tokio::test]
async fn test_configured_role_weights_seed_database() {
    let app = spawn_app_with(|config| {
        config
            .ratings
            .default_role_weights
            .insert("media".to_string(), 6.0);
    })
    .await;

    let (status, body) = send(&app, "GET", "/api/admin/role-weights", Some(DEFAULT_API_KEY), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["weights"]["media"], 6.0);
    assert_eq!(body["data"]["defaults"]["media"], 2.0);

    let (_, body) = send(
        &app,
        "POST",
        "/api/admin/role-weights/reset",
        Some(DEFAULT_API_KEY),
        None,
    )
    .await;
    assert_eq!(body["data"]["weights"]["media"], 2.0);
}

#[tokio::test]
async fn test_media_crud() {
    let app = spawn_app().await;
    let id = create_battler(&app, "Shotgun Suge").await;
    let fan_key = register_fan(&app, "no_media").await;

    let item = json!({
        "battler_id": id,
        "title": "Suge vs Rum Nitty",
        "url": "https://www.youtube.com/watch?v=abc123",
        "kind": "video",
    });

    let (status, _) = send(&app, "POST", "/api/media", Some(fan_key.as_str()), Some(item.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, bad) = send(
        &app,
        "POST",
        "/api/media",
        Some(DEFAULT_API_KEY),
        Some(json!({ "title": "Bad link", "url": "javascript:alert(1)", "kind": "video" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{bad}");

    let (status, _) = send(
        &app,
        "POST",
        "/api/media",
        Some(DEFAULT_API_KEY),
        Some(json!({ "title": "Bad kind", "url": "https://example.com", "kind": "podcast" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = send(&app, "POST", "/api/media", Some(DEFAULT_API_KEY), Some(item)).await;
    assert_eq!(status, StatusCode::OK, "{created}");
    let media_id = created["data"]["id"].as_i64().unwrap();

    let (_, listed) = send(&app, "GET", &format!("/api/media?battler_id={id}"), None, None).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    let (_, listed) = send(&app, "GET", "/api/media?kind=audio", None, None).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 0);

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/media/{media_id}"),
        Some(DEFAULT_API_KEY),
        Some(json!({
            "title": "Full battle",
            "url": "https://example.com/battle",
            "kind": "VIDEO",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["title"], "Full battle");
    assert_eq!(updated["data"]["kind"], "video");

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/media/{media_id}"),
        Some(DEFAULT_API_KEY),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = send(&app, "GET", "/api/media", None, None).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_image_upload_validation_and_cleanup() {
    let dir = std::env::temp_dir().join(format!("barscore-api-{}", uuid::Uuid::new_v4()));
    let images_path = dir.to_str().unwrap().to_string();
    let app = spawn_app_with(|config| {
        config.general.images_path = images_path;
        config.general.max_image_bytes = 64;
    })
    .await;
    let id = create_battler(&app, "Bender").await;
    let uri = format!("/api/battlers/{id}/image");

    let (status, body) = send_image(&app, &uri, "image/gif", b"GIF89a".to_vec()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, _) = send_image(&app, &uri, "image/png", vec![0_u8; 65]).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (status, body) = send_image(&app, &uri, "image/png", vec![0_u8; 64]).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["image_path"], format!("/images/battler_{id}.png"));
    assert!(dir.join(format!("battler_{id}.png")).exists());

    let (status, _) = send(&app, "DELETE", &format!("/api/battlers/{id}"), Some(DEFAULT_API_KEY), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!dir.join(format!("battler_{id}.png")).exists());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_deleting_battler_updates_badge_frequency() {
    let app = spawn_app().await;
    let id = create_battler(&app, "Hollow Da Don").await;
    let fan_key = register_fan(&app, "badge_fan").await;

    let (_, badges) = send(&app, "GET", "/api/badges", None, None).await;
    let badge = badges["data"][0]["positive"][0]["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/battlers/{id}/badges/{badge}/toggle"),
        Some(fan_key.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let count_for = |body: &Value| {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|b| b["badge_id"].as_i64() == Some(badge))
            .map_or(0, |b| b["assignment_count"].as_i64().unwrap())
    };

    let (_, frequency) = send(&app, "GET", "/api/analytics/badges", None, None).await;
    assert_eq!(count_for(&frequency), 1);

    send(&app, "DELETE", &format!("/api/battlers/{id}"), Some(DEFAULT_API_KEY), None).await;

    let (_, frequency) = send(&app, "GET", "/api/analytics/badges", None, None).await;
    assert_eq!(count_for(&frequency), 0);
}

#[tokio::test]
async fn test_home_feed_and_tags() {
    let app = spawn_app().await;
    let attribute = first_writing_attribute(&app).await;
    let rated = create_battler(&app, "Murda Mook").await;
    create_battler(&app, "Newcomer").await;
    rate(&app, rated, DEFAULT_API_KEY, attribute, 8.0).await;

    let (status, home) = send(&app, "GET", "/api/home", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(home["data"]["top_battlers"][0]["name"], "Murda Mook");
    assert_eq!(home["data"]["newest_battlers"].as_array().unwrap().len(), 2);
    assert_eq!(home["data"]["news"].as_array().unwrap().len(), 0);
    assert_eq!(home["data"]["recent_media"].as_array().unwrap().len(), 0);

    let (status, tags) = send(&app, "GET", "/api/tags", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let tags = tags["data"].as_array().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0]["name"], "punchlines");
    assert_eq!(tags[0]["battler_count"], 2);

    let (_, filtered) = send(&app, "GET", "/api/battlers?tag=punchlines", None, None).await;
    assert_eq!(filtered["data"]["total"], 2);
}

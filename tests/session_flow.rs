mod support;

use chrono::Local;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use support::{spawn_app, test_state, MemoryBackend, TOKEN};

async fn login(client: &Client, base_url: &str) -> Value {
    let response = client
        .post(format!("{base_url}/api/session"))
        .json(&json!({ "access_token": TOKEN }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.unwrap()
}

async fn post_json(client: &Client, url: String, body: Value) -> reqwest::Response {
    client.post(url).json(&body).send().await.unwrap()
}

#[tokio::test]
async fn select_and_record_updates_todays_view() {
    let backend = MemoryBackend::health_and_run();
    let base_url = spawn_app(test_state(backend.clone())).await;
    let client = Client::new();
    let today = Local::now().date_naive().to_string();

    let page = login(&client, &base_url).await;
    assert_eq!(page["activity"]["kind"], "no_activity");
    assert_eq!(page["activity"]["message"], "No points earned today.");
    assert_eq!(page["chart"][0]["points"], 0);

    let page: Value = post_json(
        &client,
        format!("{base_url}/api/select/category"),
        json!({ "category_id": "1" }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert_eq!(page["selection"]["habit_list_visible"], true);
    assert_eq!(page["selection"]["record_visible"], false);
    assert_eq!(page["selection"]["options"][0]["name"], "Run");

    let page: Value = post_json(
        &client,
        format!("{base_url}/api/select/habit"),
        json!({ "habit_id": "10" }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert_eq!(page["selection"]["record_visible"], true);

    let response = client
        .post(format!("{base_url}/api/record"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let recorded: Value = response.json().await.unwrap();
    assert_eq!(recorded["habit_name"], "Run");
    assert_eq!(recorded["entry"]["recorded_points"], 5);
    assert_eq!(recorded["entry"]["date"], today.as_str());

    let entries = backend.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].recorded_points, 5);

    let page: Value = client
        .get(format!("{base_url}/api/view"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["activity"]["kind"], "groups");
    let group = &page["activity"]["groups"][0];
    assert_eq!(group["category"], "1");
    assert_eq!(group["label"], "Health: 5 total points");
    assert_eq!(group["habits"], json!(["Run; 5 points"]));
    assert_eq!(page["chart"][0]["points"], 5);
    assert_eq!(page["selection"]["category"], Value::Null);
    assert_eq!(page["selection"]["record_visible"], false);
}

#[tokio::test]
async fn record_without_selection_writes_nothing() {
    let backend = MemoryBackend::health_and_run();
    let base_url = spawn_app(test_state(backend.clone())).await;
    let client = Client::new();
    login(&client, &base_url).await;

    let response = client
        .post(format!("{base_url}/api/record"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.text().await.unwrap(), "Please select a habit first");
    assert_eq!(backend.insert_calls(), 0);
}

#[tokio::test]
async fn failed_write_keeps_selection_for_retry() {
    let backend = MemoryBackend::health_and_run();
    backend.store.lock().unwrap().fail_inserts = true;
    let base_url = spawn_app(test_state(backend.clone())).await;
    let client = Client::new();
    login(&client, &base_url).await;

    post_json(&client, format!("{base_url}/api/select/category"), json!({ "category_id": "1" })).await;
    post_json(&client, format!("{base_url}/api/select/habit"), json!({ "habit_id": "10" })).await;

    let response = client
        .post(format!("{base_url}/api/record"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        response.text().await.unwrap(),
        "Error recording habit: insert rejected"
    );

    let page: Value = client
        .get(format!("{base_url}/api/view"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["selection"]["selected_habit"], "10");
    assert_eq!(page["selection"]["record_visible"], true);
    assert_eq!(page["recording"], false);
}

#[tokio::test]
async fn unknown_token_requires_login() {
    let backend = MemoryBackend::health_and_run();
    let base_url = spawn_app(test_state(backend)).await;
    let client = Client::new();

    let response = post_json(
        &client,
        format!("{base_url}/api/session"),
        json!({ "access_token": "expired" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(format!("{base_url}/api/view"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn date_change_fetches_the_selected_date() {
    let backend = MemoryBackend::health_and_run();
    let base_url = spawn_app(test_state(backend.clone())).await;
    let client = Client::new();
    login(&client, &base_url).await;

    let page: Value = post_json(
        &client,
        format!("{base_url}/api/date"),
        json!({ "date": "2026-01-05" }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert_eq!(page["selected_date"], "2026-01-05");
    assert_eq!(page["heading"], "Logged Points for Monday, January 5, 2026");
    assert_eq!(
        page["activity"]["message"],
        "No points earned on Monday, January 5, 2026."
    );
    let fetched = backend.log_fetches();
    assert_eq!(fetched.last().unwrap().to_string(), "2026-01-05");

    let response = post_json(&client, format!("{base_url}/api/date"), json!({ "date": "05/01/2026" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn category_fetch_failure_is_shown_inline() {
    let backend = MemoryBackend::health_and_run();
    backend.store.lock().unwrap().fail_categories = true;
    let base_url = spawn_app(test_state(backend)).await;
    let client = Client::new();

    let page = login(&client, &base_url).await;
    assert_eq!(
        page["categories_error"],
        "Error loading categories: categories unavailable"
    );
    assert_eq!(page["categories"], json!([]));
    assert_eq!(page["activity"]["kind"], "no_activity");
}

#[tokio::test]
async fn form_posts_drive_the_html_page() {
    let backend = MemoryBackend::health_and_run();
    let base_url = spawn_app(test_state(backend.clone())).await;
    let client = Client::new();

    let html = client.get(format!("{base_url}/")).send().await.unwrap().text().await.unwrap();
    assert!(html.contains("Send login link"));

    let html = client
        .post(format!("{base_url}/login"))
        .form(&[("email", "runner@example.com")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Check your email for the login link!"));
    assert_eq!(
        backend.store.lock().unwrap().login_links[0],
        (
            "runner@example.com".to_string(),
            "http://localhost/auth/callback".to_string()
        )
    );

    login(&client, &base_url).await;

    let html = client
        .post(format!("{base_url}/select/category"))
        .form(&[("category_id", "1")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("habit_dropdown"));
    assert!(!html.contains("record_habit_button"));

    let html = client
        .post(format!("{base_url}/select/habit"))
        .form(&[("habit_id", "10")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("record_habit_button"));

    let html = client
        .post(format!("{base_url}/record"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Habit &quot;Run&quot; recorded successfully! (5 points)"));
    assert!(html.contains("Health: 5 total points"));
    assert!(!html.contains("habit_dropdown"));

    let html = client
        .post(format!("{base_url}/logout"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Send login link"));
}

async fn choose_run(client: &Client, base_url: &str) {
    post_json(client, format!("{base_url}/api/select/category"), json!({ "category_id": "1" })).await;
    post_json(client, format!("{base_url}/api/select/habit"), json!({ "habit_id": "10" })).await;
}

#[tokio::test]
async fn rejected_login_link_keeps_the_live_session() {
    let backend = MemoryBackend::health_and_run();
    let base_url = spawn_app(test_state(backend.clone())).await;
    let client = Client::new();
    login(&client, &base_url).await;

    let response = post_json(
        &client,
        format!("{base_url}/api/session"),
        json!({ "access_token": "stale-link" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(format!("{base_url}/api/view"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page: Value = response.json().await.unwrap();
    assert_eq!(page["user_email"], "runner@example.com");
    assert_eq!(backend.access_token().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn expired_token_on_log_fetch_ends_the_session() {
    let backend = MemoryBackend::health_and_run();
    let base_url = spawn_app(test_state(backend.clone())).await;
    let client = Client::new();
    login(&client, &base_url).await;
    backend.expire_token();

    let response = post_json(&client, format!("{base_url}/api/date"), json!({ "date": "2026-01-05" })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.text().await.unwrap(),
        "Your session has expired. Please log in again."
    );
    assert_eq!(backend.access_token(), None);

    let response = client
        .get(format!("{base_url}/api/view"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.text().await.unwrap(), "login required");
}

#[tokio::test]
async fn expired_token_on_insert_requires_login() {
    let backend = MemoryBackend::health_and_run();
    let base_url = spawn_app(test_state(backend.clone())).await;
    let client = Client::new();
    login(&client, &base_url).await;
    choose_run(&client, &base_url).await;
    backend.expire_token();

    let response = client
        .post(format!("{base_url}/api/record"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.text().await.unwrap(),
        "Your session has expired. Please log in again."
    );
    assert_eq!(backend.insert_calls(), 1);
    assert!(backend.entries().is_empty());

    let response = client
        .get(format!("{base_url}/api/view"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(backend.access_token(), None);
}

#[tokio::test]
async fn expired_token_sends_the_page_back_to_login() {
    let backend = MemoryBackend::health_and_run();
    let base_url = spawn_app(test_state(backend.clone())).await;
    let client = Client::new();
    login(&client, &base_url).await;
    choose_run(&client, &base_url).await;
    backend.expire_token();

    let html = client
        .post(format!("{base_url}/record"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Your session has expired. Please log in again."));
    assert!(html.contains("Send login link"));
    assert!(!html.contains("record_habit_button"));
}

#[tokio::test]
async fn record_uses_the_viewers_date() {
    let backend = MemoryBackend::health_and_run();
    let base_url = spawn_app(test_state(backend.clone())).await;
    let client = Client::new();
    login(&client, &base_url).await;
    choose_run(&client, &base_url).await;

    let response = post_json(&client, format!("{base_url}/api/record"), json!({ "today": "2026/01/04" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.insert_calls(), 0);

    let response = post_json(&client, format!("{base_url}/api/record"), json!({ "today": "2026-01-04" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let recorded: Value = response.json().await.unwrap();
    assert_eq!(recorded["entry"]["date"], "2026-01-04");

    choose_run(&client, &base_url).await;
    let html = client
        .post(format!("{base_url}/record"))
        .form(&[("today", "2026-01-03")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("recorded successfully"));

    let dates: Vec<String> = backend.entries().iter().map(|entry| entry.date.to_string()).collect();
    assert_eq!(dates, ["2026-01-04", "2026-01-03"]);
}

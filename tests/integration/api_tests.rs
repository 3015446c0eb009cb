//! API integration tests

use bookshelf_api::{create_router, AppState};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

/// Start a server with an empty catalog on an ephemeral port
async fn spawn_app() -> String {
    let app = create_router(AppState::new());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });

    format!("http://{}", addr)
}

fn book(name: &str, page_count: i32, read_page: i32, reading: bool) -> Value {
    json!({
        "name": name,
        "year": 2020,
        "author": "A",
        "summary": "S",
        "publisher": "P",
        "pageCount": page_count,
        "readPage": read_page,
        "reading": reading
    })
}

async fn create_book(client: &Client, base: &str, body: &Value) -> String {
    let response = client
        .post(format!("{}/books", base))
        .json(body)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"]["bookId"].as_str().expect("No book ID").to_string()
}

async fn list_names(client: &Client, base: &str, query: &str) -> Vec<String> {
    let response = client
        .get(format!("{}/books{}", base, query))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "success");
    body["data"]["books"]
        .as_array()
        .expect("books is not an array")
        .iter()
        .map(|b| b["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let base = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/health", base))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["books"], 0);

    create_book(&client, &base, &book("Bumi Manusia", 500, 0, false)).await;

    let body: Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["books"], 1);
}

#[tokio::test]
async fn test_list_with_repeated_query_keys() {
    let base = spawn_app().await;
    let client = Client::new();

    create_book(&client, &base, &book("Arah Langkah", 100, 10, true)).await;
    create_book(&client, &base, &book("Bumi Manusia", 500, 0, false)).await;

    // the first non-empty value of a repeated key is used
    assert_eq!(list_names(&client, &base, "?name=arah&name=bumi").await, vec!["Arah Langkah"]);
    assert_eq!(list_names(&client, &base, "?name=&name=bumi").await, vec!["Bumi Manusia"]);
    assert_eq!(
        list_names(&client, &base, "?reading=1&reading=0").await,
        vec!["Arah Langkah"]
    );
}

#[tokio::test]
async fn test_negative_page_counters_round_trip() {
    let base = spawn_app().await;
    let client = Client::new();

    let id = create_book(&client, &base, &json!({ "name": "N", "pageCount": 10, "readPage": -1 })).await;

    let body: Value = client
        .get(format!("{}/books/{}", base, id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let book = &body["data"]["book"];
    assert_eq!(book["pageCount"], 10);
    assert_eq!(book["readPage"], -1);
    assert_eq!(book["finished"], false);
}

#[tokio::test]
async fn test_create_and_get_book() {
    let base = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/books", base))
        .json(&book("Dunia Tanpa Koma", 200, 200, false))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Buku berhasil ditambahkan");
    let id = body["data"]["bookId"].as_str().expect("No book ID");
    assert_eq!(id.len(), 16);

    let response = client
        .get(format!("{}/books/{}", base, id))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    let book = &body["data"]["book"];
    assert_eq!(book["id"], id);
    assert_eq!(book["name"], "Dunia Tanpa Koma");
    assert_eq!(book["year"], 2020);
    assert_eq!(book["pageCount"], 200);
    assert_eq!(book["readPage"], 200);
    assert_eq!(book["finished"], true);
    assert_eq!(book["reading"], false);
    assert_eq!(book["insertedAt"], book["updatedAt"]);
    assert!(book["insertedAt"].as_str().unwrap_or_default().ends_with('Z'));
}

#[tokio::test]
async fn test_create_rejects_invalid_books() {
    let base = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/books", base))
        .json(&book("X", 100, 150, false))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert_eq!(
        body["message"],
        "Gagal menambahkan buku. readPage tidak boleh lebih besar dari pageCount"
    );

    let response = client
        .post(format!("{}/books", base))
        .json(&json!({ "pageCount": 10, "readPage": 1 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Gagal menambahkan buku. Mohon isi nama buku");

    assert!(list_names(&client, &base, "").await.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let base = spawn_app().await;

    let response = Client::new()
        .post(format!("{}/books", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_get_unknown_book() {
    let base = spawn_app().await;

    let response = Client::new()
        .get(format!("{}/books/nonexistent-id", base))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Buku tidak ditemukan");
}

#[tokio::test]
async fn test_list_filters() {
    let base = spawn_app().await;
    let client = Client::new();

    create_book(&client, &base, &book("Dunia Tanpa Koma", 200, 200, false)).await;
    create_book(&client, &base, &book("Laut Bercerita", 300, 20, true)).await;
    create_book(&client, &base, &book("Bumi Manusia", 500, 0, false)).await;

    assert_eq!(
        list_names(&client, &base, "").await,
        vec!["Dunia Tanpa Koma", "Laut Bercerita", "Bumi Manusia"]
    );
    assert_eq!(list_names(&client, &base, "?name=DUNIA").await, vec!["Dunia Tanpa Koma"]);
    assert_eq!(list_names(&client, &base, "?reading=1").await, vec!["Laut Bercerita"]);
    assert_eq!(
        list_names(&client, &base, "?reading=0").await,
        vec!["Dunia Tanpa Koma", "Bumi Manusia"]
    );
    assert_eq!(list_names(&client, &base, "?finished=1").await, vec!["Dunia Tanpa Koma"]);
    // name wins over the other filters
    assert_eq!(
        list_names(&client, &base, "?name=bumi&reading=1&finished=1").await,
        vec!["Bumi Manusia"]
    );
    // empty values are ignored
    assert_eq!(list_names(&client, &base, "?name=&finished=0").await.len(), 2);

    let response = client
        .get(format!("{}/books", base))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let summary = body["data"]["books"][0].as_object().expect("No summary");
    assert_eq!(summary.len(), 3);
    assert_eq!(summary["publisher"], "P");
}

#[tokio::test]
async fn test_update_book() {
    let base = spawn_app().await;
    let client = Client::new();
    let id = create_book(&client, &base, &book("Laut", 300, 20, true)).await;

    let before: Value = client
        .get(format!("{}/books/{}", base, id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let response = client
        .put(format!("{}/books/{}", base, id))
        .json(&book("Laut Bercerita", 300, 300, false))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Buku berhasil diperbarui");

    let after: Value = client
        .get(format!("{}/books/{}", base, id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let (before, after) = (&before["data"]["book"], &after["data"]["book"]);
    assert_eq!(after["id"], before["id"]);
    assert_eq!(after["insertedAt"], before["insertedAt"]);
    assert!(after["updatedAt"].as_str() >= before["updatedAt"].as_str());
    assert_eq!(after["name"], "Laut Bercerita");
    assert_eq!(after["finished"], true);
    assert_eq!(after["reading"], false);
}

#[tokio::test]
async fn test_update_failures() {
    let base = spawn_app().await;
    let client = Client::new();
    let id = create_book(&client, &base, &book("Laut", 300, 20, true)).await;

    let response = client
        .put(format!("{}/books/{}", base, id))
        .json(&book("", 300, 20, true))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Gagal memperbarui buku. Mohon isi nama buku");

    // validation runs before the id lookup
    let response = client
        .put(format!("{}/books/unknown", base))
        .json(&book("Laut", 10, 20, true))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["message"],
        "Gagal memperbarui buku. readPage tidak boleh lebih besar dari pageCount"
    );

    let response = client
        .put(format!("{}/books/unknown", base))
        .json(&book("Laut", 30, 20, true))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Gagal memperbarui buku. Id tidak ditemukan");
}

#[tokio::test]
async fn test_delete_book() {
    let base = spawn_app().await;
    let client = Client::new();
    let first = create_book(&client, &base, &book("First", 1, 0, false)).await;
    create_book(&client, &base, &book("Second", 1, 0, false)).await;

    let response = client
        .delete(format!("{}/books/{}", base, first))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Buku berhasil dihapus");

    assert_eq!(list_names(&client, &base, "").await, vec!["Second"]);

    let response = client
        .get(format!("{}/books/{}", base, first))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .delete(format!("{}/books/{}", base, first))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Buku gagal dihapus. Id tidak ditemukan");
}

//! API integration tests
//!
//! Require a running server with an empty database.

use reqwest::{multipart, Client};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const SERVER_URL: &str = "http://localhost:8080";

/// Helper to create a category and return its id
async fn create_category(client: &Client, name: &str) -> i64 {
    let response = client
        .post(format!("{}/categories", BASE_URL))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No category ID")
}

fn book_form(title: &str, price: i64, categories: &str) -> multipart::Form {
    multipart::Form::new()
        .text("title", title.to_string())
        .text("price", price.to_string())
        .text("description", "Integration test book")
        .text("categories", categories.to_string())
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_create_update_and_delete_book() {
    let client = Client::new();
    let fiction = create_category(&client, "Fiction").await;
    let classics = create_category(&client, "Classics").await;

    // Create with a cover image
    let form = book_form("Dune", 4500, &fiction.to_string()).part(
        "image",
        multipart::Part::bytes(b"first cover".to_vec()).file_name("cover.png"),
    );
    let response = client
        .post(format!("{}/books", BASE_URL))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.expect("Failed to parse response");
    let book_id = book["id"].as_i64().expect("No book ID");
    let image_path = book["image_path"].as_str().expect("No image path").to_string();
    assert_eq!(book["categories"], json!([{ "id": fiction, "name": "Fiction" }]));

    let image = client
        .get(format!("{}{}", SERVER_URL, image_path))
        .send()
        .await
        .expect("Failed to fetch image");
    assert!(image.status().is_success());

    // Update categories, keep the image
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .multipart(book_form("Dune", 5000, &classics.to_string()))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["image_path"], book["image_path"]);
    assert_eq!(updated["categories"], json!([{ "id": classics, "name": "Classics" }]));

    // Delete
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let image = client
        .get(format!("{}{}", SERVER_URL, image_path))
        .send()
        .await
        .expect("Failed to fetch image");
    assert_eq!(image.status(), 404);

    // Cleanup
    for id in [fiction, classics] {
        let _ = client
            .delete(format!("{}/categories/{}", BASE_URL, id))
            .send()
            .await;
    }
}

#[tokio::test]
#[ignore]
async fn test_create_book_with_unknown_category() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .multipart(book_form("Ghost", 100, "999999"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
#[ignore]
async fn test_delete_missing_book() {
    let client = Client::new();

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, i32::MAX))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_category_crud() {
    let client = Client::new();
    let id = create_category(&client, "Poetry").await;

    let response = client
        .put(format!("{}/categories/{}", BASE_URL, id))
        .json(&json!({ "name": "Verse" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["name"], "Verse");

    let response = client
        .delete(format!("{}/categories/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/categories/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

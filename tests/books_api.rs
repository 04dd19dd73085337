mod common;

use axum::http::{StatusCode, header};
use http_body_util::BodyExt;
use serde_json::json;

use common::{TestApp, blank_pdf, empty_request, upload_request};

#[tokio::test]
async fn upload_records_book_progress_and_quota() {
    let app = TestApp::new();
    let token = app.token_for("anna").await;
    let pdf = blank_pdf(12);

    let (status, book) = app
        .send(upload_request(&token, "Deutsch lernen", "deutsch.pdf", &pdf))
        .await;
    assert_eq!(status, StatusCode::OK, "{book}");
    assert_eq!(book["title"], "Deutsch lernen");
    assert_eq!(book["filename"], "deutsch.pdf");
    assert_eq!(book["total_pages"], 12);
    assert_eq!(book["storage_type"], "app");
    assert_eq!(book["target_language"], "German");
    assert_eq!(book["chapters"], json!([]));
    assert_eq!(book["file_size_bytes"], pdf.len() as i64);
    let id = book["id"].as_i64().unwrap();

    let (_, quota) = app.get("/storage/quota", &token).await;
    assert_eq!(quota["used_bytes"], pdf.len() as i64);
    assert_eq!(quota["file_count"], 1);

    let (status, progress) = app.get(&format!("/books/{id}/progress"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["current_page"], 1);
    assert_eq!(progress["next_unprocessed_page"], 1);
    assert_eq!(progress["pages_processed"], json!([]));

    let (_, books) = app.get("/books", &token).await;
    assert_eq!(books.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn upload_rejects_non_pdf_and_unreadable_files() {
    let app = TestApp::new();
    let token = app.token_for("anna").await;

    let (status, body) = app
        .send(upload_request(&token, "Notes", "notes.txt", b"plain text"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only PDF files are accepted");

    let (status, _) = app
        .send(upload_request(&token, "Broken", "broken.pdf", b"%PDF-1.5 garbage"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, quota) = app.get("/storage/quota", &token).await;
    assert_eq!(quota["file_count"], 0);
    assert_eq!(quota["used_bytes"], 0);
}

#[tokio::test]
async fn upload_stops_at_the_file_limit() {
    let app = TestApp::new();
    let token = app.token_for("anna").await;

    for i in 0..5 {
        let (status, _) = app.upload_book(&token, &format!("Book {i}"), 1).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = app.upload_book(&token, "One too many", 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("File limit reached (5 files)"));
}

#[tokio::test]
async fn download_returns_the_stored_pdf() {
    let app = TestApp::new();
    let token = app.token_for("anna").await;
    let pdf = blank_pdf(3);

    let (_, book) = app
        .send(upload_request(&token, "Short", "short.pdf", &pdf))
        .await;
    let id = book["id"].as_i64().unwrap();

    let response = app
        .send_raw(empty_request("GET", &format!("/books/{id}/download"), Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"short.pdf\""
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), pdf.as_slice());
}

#[tokio::test]
async fn chapters_and_metadata_can_be_edited() {
    let app = TestApp::new();
    let token = app.token_for("anna").await;
    let (_, book) = app.upload_book(&token, "Grammatik", 20).await;
    let id = book["id"].as_i64().unwrap();

    let chapters = json!([
        { "name": "Artikel", "start_page": 1, "end_page": 8 },
        { "name": "Verben", "start_page": 9, "end_page": 20 },
    ]);
    let (status, updated) = app
        .put(&format!("/books/{id}/chapters"), &token, &chapters)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["chapters"], chapters);

    let (status, updated) = app
        .put(&format!("/books/{id}"), &token, &json!({ "title": "Grammatik A1", "native_language": "Italian" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Grammatik A1");
    assert_eq!(updated["native_language"], "Italian");
    assert_eq!(updated["chapters"], chapters);

    let backwards = json!([{ "name": "Broken", "start_page": 5, "end_page": 2 }]);
    assert_eq!(
        app.put(&format!("/books/{id}/chapters"), &token, &backwards).await.0,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.put(&format!("/books/{id}"), &token, &json!({ "chapters": [{ "name": "Zero", "start_page": 0, "end_page": 2 }] }))
            .await
            .0,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn progress_position_can_be_moved() {
    let app = TestApp::new();
    let token = app.token_for("anna").await;
    let (_, book) = app.upload_book(&token, "Lesebuch", 10).await;
    let id = book["id"].as_i64().unwrap();

    let (status, progress) = app
        .put(&format!("/books/{id}/progress"), &token, &json!({ "current_page": 4, "current_chapter": "Intro" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["current_page"], 4);
    assert_eq!(progress["current_chapter"], "Intro");
    assert_eq!(progress["next_unprocessed_page"], 4);

    assert_eq!(
        app.put(&format!("/books/{id}/progress"), &token, &json!({ "current_page": 0 })).await.0,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn books_are_scoped_to_their_owner() {
    let app = TestApp::new();
    let anna = app.token_for("anna").await;
    let ben = app.token_for("ben").await;
    let (_, book) = app.upload_book(&anna, "Private", 2).await;
    let id = book["id"].as_i64().unwrap();

    for uri in [
        format!("/books/{id}"),
        format!("/books/{id}/progress"),
        format!("/books/{id}/download"),
    ] {
        let (status, _) = app.get(&uri, &ben).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
    assert_eq!(app.delete(&format!("/books/{id}"), &ben).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_book_and_restores_quota() {
    let app = TestApp::new();
    let token = app.token_for("anna").await;
    let (_, book) = app.upload_book(&token, "Temporary", 4).await;
    let id = book["id"].as_i64().unwrap();

    let (status, body) = app.delete(&format!("/books/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Book and associated data deleted successfully");

    assert_eq!(app.get(&format!("/books/{id}"), &token).await.0, StatusCode::NOT_FOUND);
    assert_eq!(app.get(&format!("/books/{id}/progress"), &token).await.0, StatusCode::NOT_FOUND);

    let (_, quota) = app.get("/storage/quota", &token).await;
    assert_eq!(quota["used_bytes"], 0);
    assert_eq!(quota["file_count"], 0);
}

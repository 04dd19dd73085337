mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::TestApp;

fn ids(cards: &Value) -> Vec<i64> {
    cards
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn card_crud_round() {
    let app = TestApp::new();
    let token = app.token_for("anna").await;

    let (status, created) = app
        .post(
            "/cards",
            &token,
            &json!({
                "front": "der Hund",
                "back": "the dog",
                "tags": ["animals"],
                "examples": [{ "sentence": "Der Hund bellt.", "translation": "The dog barks." }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{created}");
    assert_eq!(created["hardness_level"], "medium");
    assert!(created["last_visited"].is_null());
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = app.get(&format!("/cards/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["front"], "der Hund");
    assert!(!fetched["last_visited"].is_null());

    let (status, updated) = app
        .put(&format!("/cards/{id}"), &token, &json!({ "back": "the hound", "hardness_level": "hard" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["back"], "the hound");
    assert_eq!(updated["front"], "der Hund");
    assert_eq!(updated["hardness_level"], "hard");

    let (status, body) = app.delete(&format!("/cards/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Card deleted successfully");

    let (status, body) = app.get(&format!("/cards/{id}"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Card not found");
}

#[tokio::test]
async fn cards_are_scoped_to_their_owner() {
    let app = TestApp::new();
    let anna = app.token_for("anna").await;
    let ben = app.token_for("ben").await;

    let id = app.create_card(&anna, "die Katze", "the cat").await;

    assert_eq!(app.get(&format!("/cards/{id}"), &ben).await.0, StatusCode::NOT_FOUND);
    assert_eq!(
        app.put(&format!("/cards/{id}"), &ben, &json!({ "back": "stolen" })).await.0,
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.delete(&format!("/cards/{id}"), &ben).await.0, StatusCode::NOT_FOUND);

    let (_, listed) = app.get("/cards", &ben).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn card_list_pages_and_filters_by_tag() {
    let app = TestApp::new();
    let token = app.token_for("anna").await;

    let mut created = Vec::new();
    for i in 0..4 {
        created.push(app.create_card(&token, &format!("front {i}"), "back").await);
    }
    let (status, tagged) = app
        .post("/cards", &token, &json!({ "front": "tagged", "back": "b", "tags": ["verbs"] }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, page) = app.get("/cards?skip=1&limit=2", &token).await;
    assert_eq!(ids(&page), created[1..3].to_vec());

    let (_, filtered) = app.get("/cards?tag=verbs", &token).await;
    assert_eq!(ids(&filtered), vec![tagged["id"].as_i64().unwrap()]);

    let (_, other_case) = app.get("/cards?tag=Verbs", &token).await;
    assert!(other_case.as_array().unwrap().is_empty());
    let (_, partial) = app.get("/cards?tag=verb", &token).await;
    assert!(partial.as_array().unwrap().is_empty());

    assert_eq!(app.get("/cards?limit=0", &token).await.0, StatusCode::BAD_REQUEST);
    assert_eq!(app.get("/cards?skip=-1", &token).await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_card_payloads_are_400() {
    let app = TestApp::new();
    let token = app.token_for("anna").await;

    assert_eq!(
        app.post("/cards", &token, &json!({ "front": "", "back": "x" })).await.0,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.post("/cards", &token, &json!({ "front": "x" })).await.0,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(app.get("/cards/not-a-number", &token).await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deck_keeps_card_order_and_drops_foreign_and_duplicate_ids() {
    let app = TestApp::new();
    let anna = app.token_for("anna").await;
    let ben = app.token_for("ben").await;

    let a = app.create_card(&anna, "eins", "one").await;
    let b = app.create_card(&anna, "zwei", "two").await;
    let c = app.create_card(&anna, "drei", "three").await;
    let foreign = app.create_card(&ben, "vier", "four").await;

    let (status, deck) = app
        .post(
            "/decks",
            &anna,
            &json!({ "name": "Numbers", "card_ids": [c, a, foreign, c, 9999, b] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{deck}");
    assert_eq!(deck["name"], "Numbers");
    assert_eq!(ids(&deck["cards"]), vec![c, a, b]);
    let deck_id = deck["id"].as_i64().unwrap();

    let (status, updated) = app
        .put(&format!("/decks/{deck_id}"), &anna, &json!({ "card_ids": [b, a] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&updated["cards"]), vec![b, a]);
    assert_eq!(updated["name"], "Numbers");

    let (status, renamed) = app
        .put(&format!("/decks/{deck_id}"), &anna, &json!({ "name": "Zahlen" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Zahlen");
    assert_eq!(ids(&renamed["cards"]), vec![b, a]);

    assert_eq!(app.get(&format!("/decks/{deck_id}"), &ben).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_card_removes_it_from_decks_and_deleting_a_deck_keeps_cards() {
    let app = TestApp::new();
    let token = app.token_for("anna").await;

    let a = app.create_card(&token, "rot", "red").await;
    let b = app.create_card(&token, "blau", "blue").await;
    let (_, deck) = app
        .post("/decks", &token, &json!({ "name": "Colours", "card_ids": [a, b] }))
        .await;
    let deck_id = deck["id"].as_i64().unwrap();

    app.delete(&format!("/cards/{a}"), &token).await;
    let (_, deck) = app.get(&format!("/decks/{deck_id}"), &token).await;
    assert_eq!(ids(&deck["cards"]), vec![b]);

    let (status, body) = app.delete(&format!("/decks/{deck_id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Deck deleted successfully");
    assert_eq!(app.get(&format!("/cards/{b}"), &token).await.0, StatusCode::OK);

    let (_, decks) = app.get("/decks", &token).await;
    assert!(decks.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn search_pages_through_matches_with_a_cursor() {
    let app = TestApp::new();
    let anna = app.token_for("anna").await;
    let ben = app.token_for("ben").await;

    let mut matching = Vec::new();
    for i in 0..5 {
        matching.push(app.create_card(&anna, &format!("Haus {i}"), "house").await);
        app.create_card(&anna, &format!("Baum {i}"), "tree").await;
    }
    app.create_card(&ben, "Haus", "not anna's").await;

    let (status, first) = app.get("/search/cards?query=haus&limit=2", &anna).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&first["results"]), matching[0..2].to_vec());
    let cursor = first["next_cursor"].as_str().unwrap().to_string();
    assert_eq!(cursor, matching[2].to_string());

    let (_, second) = app
        .get(&format!("/search/cards?query=haus&limit=2&cursor={cursor}"), &anna)
        .await;
    assert_eq!(ids(&second["results"]), matching[2..4].to_vec());

    let cursor = second["next_cursor"].as_str().unwrap().to_string();
    let (_, last) = app
        .get(&format!("/search/cards?query=haus&limit=2&cursor={cursor}"), &anna)
        .await;
    assert_eq!(ids(&last["results"]), matching[4..].to_vec());
    assert!(last["next_cursor"].is_null());
}

#[tokio::test]
async fn search_matches_back_and_escapes_wildcards() {
    let app = TestApp::new();
    let token = app.token_for("anna").await;

    let plain = app.create_card(&token, "Apfel", "apple").await;
    let percent = app.create_card(&token, "Rabatt", "50% off").await;

    let (_, body) = app.get("/search/cards?query=APPLE", &token).await;
    assert_eq!(ids(&body["results"]), vec![plain]);

    let (_, body) = app.get("/search/cards?query=%25", &token).await;
    assert_eq!(ids(&body["results"]), vec![percent]);
}

#[tokio::test]
async fn search_rejects_blank_queries_and_bad_cursors() {
    let app = TestApp::new();
    let token = app.token_for("anna").await;

    assert_eq!(app.get("/search/cards?query=%20%20", &token).await.0, StatusCode::BAD_REQUEST);
    assert_eq!(app.get("/search/cards", &token).await.0, StatusCode::BAD_REQUEST);
    assert_eq!(
        app.get("/search/cards?query=a&cursor=abc", &token).await.0,
        StatusCode::BAD_REQUEST
    );
}
